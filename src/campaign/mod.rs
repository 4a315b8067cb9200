//! The campaign module drives a fuzzing run: corpus iteration, the runner
//! state machine and the crash archive.

pub mod archive;
pub mod config;
pub mod corpus;
pub mod runner;

pub use archive::{artifact_id, CrashArchiver, CrashArtifact};
pub use config::CampaignConfig;
pub use corpus::{Corpus, CorpusEntry, CorpusItem};
pub use runner::{
    CampaignFailure, CampaignOutcome, CampaignReport, CampaignRunner, CampaignState, CampaignTally,
};
