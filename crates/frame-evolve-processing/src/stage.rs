//! Processing stage run after the upload reaches 100%.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use frame_evolve_core::{FileHandle, MediaMetadata, ProcessingError, SimulationConfig};

/// Work performed on an uploaded file before the session completes.
#[async_trait]
pub trait ProcessingStage: Send + Sync {
    async fn process(
        &self,
        file: &FileHandle,
        metadata: Option<&MediaMetadata>,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessingError>;

    /// How long processing is expected to take, reported as the remaining-time
    /// estimate while the session is processing.
    fn expected_duration(&self) -> Duration;
}

/// Waits a fixed delay, then fails with probability `failure_rate`.
pub struct SimulatedProcessingStage {
    delay: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedProcessingStage {
    pub fn new(delay: Duration, failure_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.processing_delay,
            config.processing_failure_rate,
            config.rng_seed,
        )
    }

    fn roll_failure(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random::<f64>() < self.failure_rate
    }
}

impl Default for SimulatedProcessingStage {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

#[async_trait]
impl ProcessingStage for SimulatedProcessingStage {
    async fn process(
        &self,
        file: &FileHandle,
        _metadata: Option<&MediaMetadata>,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessingError> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProcessingError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {}
        }

        if self.roll_failure() {
            tracing::debug!(file_name = %file.name, "Simulated processing fault");
            return Err(ProcessingError::Failed(format!(
                "simulated fault while processing {}",
                file.name
            )));
        }

        Ok(())
    }

    fn expected_duration(&self) -> Duration {
        self.delay
    }
}
