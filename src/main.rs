use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use ubx_fuzz::{init_logger, log_info, run_campaign, CampaignConfig};

#[derive(Parser)]
#[command(name = "ubx-fuzz")]
#[command(about = "Replay a fuzzing corpus against a UBX receiver and keep the crashes")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Serial port of the receiver
    #[arg(short, long)]
    port: Option<String>,
    #[arg(short, long)]
    baud: Option<u32>,
    /// Per-stage read timeout in seconds
    #[arg(short, long)]
    timeout: Option<f64>,
    /// Directory holding the fuzzer's inputs
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Directory crash artifacts are written to
    #[arg(long)]
    crashes: Option<PathBuf>,
    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn campaign_config(&self) -> anyhow::Result<CampaignConfig> {
        let mut config = match &self.config {
            Some(path) => CampaignConfig::load(path)?,
            None => CampaignConfig::default(),
        };
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(timeout) = self.timeout {
            config.serial.timeout_secs = timeout;
        }
        if let Some(corpus) = &self.corpus {
            config.corpus_dir = corpus.clone();
        }
        if let Some(crashes) = &self.crashes {
            config.crashes_dir = crashes.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = cli.campaign_config()?;
    let report = run_campaign(&config)
        .await
        .with_context(|| format!("campaign on {} failed", config.serial.port))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.tally);
    }
    if let Some(failure) = &report.failure {
        log_info(&format!("stopped at {}: {}", failure.item, failure.verdict));
    }

    Ok(())
}
