//! # Campaign Runner
//!
//! Sends each corpus input to the device and judges the answer. The run is
//! an explicit state machine:
//!
//! ```text
//! Idle --start--> Running --step--> Running
//!                         --step--> Stopped    (first Timeout or StructuralMismatch)
//!                         --step--> Exhausted  (corpus consumed)
//! ```
//!
//! There are no retries and no resynchronisation: the first bad round ends
//! the campaign, leaving the offending input in the crash archive.

use crate::campaign::archive::{CrashArchiver, CrashArtifact};
use crate::campaign::config::CampaignConfig;
use crate::campaign::corpus::{Corpus, CorpusEntry};
use crate::error::FuzzError;
use crate::logging::{log_error, log_frame_hex, log_info};
use crate::ubx::classify::{classify, MismatchKind, Verdict};
use crate::ubx::reader::{FramedReader, ReadOutcome};
use crate::ubx::serial::Transport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignState {
    Idle,
    Running,
    /// Halted on the first failing round.
    Stopped,
    /// Every corpus item concluded with ACK or NAK.
    Exhausted,
}

impl CampaignState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignState::Stopped | CampaignState::Exhausted)
    }
}

/// Pass/total counters for one campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignTally {
    /// Rounds answered with ACK-ACK or ACK-NAK.
    pub successful: usize,
    /// Corpus files found at start.
    pub total: usize,
}

impl fmt::Display for CampaignTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} successfully concluded tests",
            self.successful, self.total
        )
    }
}

/// How a finished campaign ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignOutcome {
    Stopped,
    Exhausted,
}

/// The round that stopped the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignFailure {
    /// Corpus filename of the input.
    pub item: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub outcome: CampaignOutcome,
    pub tally: CampaignTally,
    pub failure: Option<CampaignFailure>,
    pub artifacts: Vec<CrashArtifact>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct CampaignRunner {
    corpus: Corpus,
    archiver: CrashArchiver,
    reader: FramedReader,
    state: CampaignState,
    tally: CampaignTally,
    pending: VecDeque<CorpusEntry>,
    failure: Option<CampaignFailure>,
    artifacts: Vec<CrashArtifact>,
    started_at: Option<DateTime<Utc>>,
}

impl CampaignRunner {
    /// Validates the configuration and both directories and returns an idle
    /// runner. Nothing touches the device until [`run`](Self::run).
    pub fn new(config: &CampaignConfig) -> Result<Self, FuzzError> {
        config.validate()?;
        let corpus = Corpus::open(&config.corpus_dir)?;
        let archiver = CrashArchiver::new(&config.crashes_dir)?;
        Ok(Self::with_parts(
            corpus,
            archiver,
            FramedReader::new(config.serial.timeout()),
        ))
    }

    pub fn with_parts(corpus: Corpus, archiver: CrashArchiver, reader: FramedReader) -> Self {
        CampaignRunner {
            corpus,
            archiver,
            reader,
            state: CampaignState::Idle,
            tally: CampaignTally::default(),
            pending: VecDeque::new(),
            failure: None,
            artifacts: Vec::new(),
            started_at: None,
        }
    }

    pub fn state(&self) -> CampaignState {
        self.state
    }

    pub fn tally(&self) -> CampaignTally {
        self.tally
    }

    pub fn failure(&self) -> Option<&CampaignFailure> {
        self.failure.as_ref()
    }

    pub fn artifacts(&self) -> &[CrashArtifact] {
        &self.artifacts
    }

    /// `Idle -> Running`: lists the corpus and resets the tally.
    pub async fn start(&mut self) -> Result<(), FuzzError> {
        if self.state != CampaignState::Idle {
            return Err(FuzzError::InvalidState(format!(
                "cannot start a campaign in state {:?}",
                self.state
            )));
        }

        let entries = self.corpus.entries().await?;
        self.tally = CampaignTally {
            successful: 0,
            total: entries.len(),
        };
        self.pending = entries.into();
        self.failure = None;
        self.artifacts.clear();
        self.started_at = Some(Utc::now());
        self.state = CampaignState::Running;

        log_info(&format!(
            "starting campaign over {} inputs from {}",
            self.tally.total,
            self.corpus.dir().display()
        ));
        Ok(())
    }

    /// Runs one round with the next corpus item and returns the new state.
    pub async fn step<T>(&mut self, transport: &mut T) -> Result<CampaignState, FuzzError>
    where
        T: Transport + ?Sized,
    {
        if self.state != CampaignState::Running {
            return Err(FuzzError::InvalidState(format!(
                "cannot step a campaign in state {:?}",
                self.state
            )));
        }

        let Some(entry) = self.pending.pop_front() else {
            self.state = CampaignState::Exhausted;
            return Ok(self.state);
        };
        let item = entry.load().await?;

        transport.write(&item.bytes).await?;
        let outcome = self.reader.read_frame(transport).await?;
        if let ReadOutcome::Frame(frame) = &outcome {
            log_frame_hex("response", frame.as_bytes());
        }
        let verdict = classify(&outcome);
        log_info(&format!("File {} {verdict}", entry.path.display()));

        if verdict.is_pass() {
            self.tally.successful += 1;
            return Ok(self.state);
        }

        self.artifacts.push(self.archiver.archive(&item.bytes).await?);
        if let (
            ReadOutcome::Frame(frame),
            Verdict::StructuralMismatch {
                kind: MismatchKind::UnknownResponse,
            },
        ) = (&outcome, verdict)
        {
            self.artifacts
                .push(self.archiver.archive(frame.as_bytes()).await?);
        }

        self.failure = Some(CampaignFailure {
            item: item.name,
            verdict,
        });
        self.state = CampaignState::Stopped;
        Ok(self.state)
    }

    /// Drives the campaign to a terminal state, then releases the transport.
    pub async fn run<T>(&mut self, mut transport: T) -> Result<CampaignReport, FuzzError>
    where
        T: Transport,
    {
        self.start().await?;
        while !self.state.is_terminal() {
            if let Err(e) = self.step(&mut transport).await {
                log_error(&format!("campaign aborted: {e}"));
                return Err(e);
            }
        }
        drop(transport);

        let report = self.report()?;
        log_info(&report.tally.to_string());
        Ok(report)
    }

    /// Summary of a finished campaign.
    pub fn report(&self) -> Result<CampaignReport, FuzzError> {
        let outcome = match self.state {
            CampaignState::Stopped => CampaignOutcome::Stopped,
            CampaignState::Exhausted => CampaignOutcome::Exhausted,
            state => {
                return Err(FuzzError::InvalidState(format!(
                    "no report for a campaign in state {state:?}"
                )))
            }
        };

        let finished_at = Utc::now();
        Ok(CampaignReport {
            outcome,
            tally: self.tally,
            failure: self.failure.clone(),
            artifacts: self.artifacts.clone(),
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        })
    }
}
