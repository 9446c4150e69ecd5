//! Frame Evolve CLI: developer harness for the upload lifecycle.
//!
//! Configuration comes from `FRAME_EVOLVE_*` environment variables (or `.env`).
//! Logs go to stderr, controlled by `RUST_LOG`.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use frame_evolve_core::constants::{APP_NAME, APP_VERSION};
use frame_evolve_core::{
    ErrorMetadata, FileDetails, FileHandle, QueueItemStatus, QueueSummary, ResourceSensor,
    StatusView, UploadConfig, UploadEvent, UploadOutcome, UploadState,
};
use frame_evolve_infra::{
    init_telemetry, ResourceMonitor, SimulatedResourceSensor, SystemResourceSensor,
};
use frame_evolve_processing::FileValidator;
use frame_evolve_upload::UploadController;

#[derive(Parser)]
#[command(name = "frame-evolve", version, about = "Frame Evolve upload lifecycle harness")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FileArgs {
    /// File name shown in the UI (the file is never opened)
    name: String,
    /// Size in bytes
    #[arg(long)]
    size: u64,
    /// Declared media type, e.g. video/mp4
    #[arg(long = "type")]
    declared_type: String,
}

impl FileArgs {
    fn handle(&self) -> FileHandle {
        FileHandle::new(self.name.clone(), self.size, self.declared_type.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check a file against the configured formats and size limit
    Validate {
        #[command(flatten)]
        file: FileArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a simulated upload end to end
    Simulate {
        #[command(flatten)]
        file: FileArgs,
        /// Seed for reproducible progress and failures
        #[arg(long)]
        seed: Option<u64>,
        /// Cancel the upload after this many milliseconds
        #[arg(long)]
        cancel_after_ms: Option<u64>,
        /// Print every event as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sample system resource usage
    Monitor {
        /// Number of readings to print
        #[arg(long, default_value = "3")]
        samples: usize,
        /// Use simulated readings instead of the host's
        #[arg(long)]
        simulated: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(cli.json_logs).map_err(|e| anyhow!("Failed to initialize telemetry: {e}"))?;

    let mut config = UploadConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Validate { file, json } => validate(&config, file.handle(), json),
        Commands::Simulate {
            file,
            seed,
            cancel_after_ms,
            json,
        } => {
            if seed.is_some() {
                config.rng_seed = seed;
            }
            simulate(&config, file.handle(), cancel_after_ms, json).await
        }
        Commands::Monitor { samples, simulated } => monitor(&config, samples, simulated).await,
    }
}

fn validate(config: &UploadConfig, file: FileHandle, json: bool) -> anyhow::Result<()> {
    let validator = FileValidator::new(config.constraints());
    let result = validator.validate(&file);

    if json {
        let value = match &result {
            Ok(()) => json!({ "accepted": true }),
            Err(e) => json!({
                "accepted": false,
                "reason": e.reason(),
                "code": e.error_code(),
                "message": e.user_message(),
            }),
        };
        return print_json(&value);
    }

    match result {
        Ok(()) => println!("accepted: {} ({})", file.name, file.type_label()),
        Err(e) => println!("rejected: {} ({})", e.reason(), e.user_message()),
    }
    Ok(())
}

async fn simulate(
    config: &UploadConfig,
    file: FileHandle,
    cancel_after_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let controller =
        UploadController::from_config(config).context("Invalid upload configuration")?;
    let mut events = controller.subscribe();

    if !json {
        println!("{} {}", APP_NAME, APP_VERSION);
    }

    let session_id = match controller.select_file(file).await {
        Ok(id) => id,
        Err(e) => {
            let view = StatusView::from_snapshot(&controller.snapshot().await);
            if json {
                print_json(&view)?;
            } else {
                println!("{}", view.render_line());
            }
            return Err(anyhow!(e.client_message()));
        }
    };

    if let Some(ms) = cancel_after_ms {
        let handle = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if let Err(e) = handle.cancel().await {
                tracing::debug!(error = %e, "Cancel ignored");
            }
        });
    }

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event receiver lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if json {
            print_json(&event)?;
        }

        match event {
            UploadEvent::Snapshot(snapshot) => {
                if !json {
                    println!("{}", StatusView::from_snapshot(&snapshot).render_line());
                }
                if snapshot.state == UploadState::Idle && snapshot.session_id > session_id {
                    break;
                }
            }
            UploadEvent::Finished(outcome) => {
                if !json {
                    print_outcome(&outcome);
                }
                break;
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &UploadOutcome) {
    if let UploadOutcome::Completed { file, metadata, .. } = outcome {
        for line in FileDetails::new(file, metadata.as_ref()).render_lines() {
            println!("{}", line);
        }
    }

    let summary = QueueSummary::from_items(&[QueueItemStatus::from(outcome)]);
    println!("Queue: {} ({})", summary.indicator(), summary.describe());
}

async fn monitor(config: &UploadConfig, samples: usize, simulated: bool) -> anyhow::Result<()> {
    let sensor: Arc<dyn ResourceSensor> = if simulated {
        Arc::new(SimulatedResourceSensor::new(config.rng_seed))
    } else {
        Arc::new(SystemResourceSensor::new())
    };

    let monitor = ResourceMonitor::spawn(sensor, config.monitor_interval());
    let mut readings = monitor.subscribe();

    for _ in 0..samples {
        readings
            .changed()
            .await
            .context("Resource monitor stopped")?;
        let reading = *readings.borrow_and_update();
        if let Some(reading) = reading {
            println!("{}", reading.describe());
        }
    }

    monitor.shutdown().await;
    Ok(())
}
