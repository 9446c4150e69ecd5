//! System resource monitoring for the status bar
//!
//! [`ResourceMonitor`] polls a [`ResourceSensor`] on a fixed interval and keeps the
//! most recent reading on a watch channel. A failed read is logged and the previous
//! reading stays in place.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;

use frame_evolve_core::{ResourceReading, ResourceSensor, SensorError};

/// Random readings in the ranges the desktop shell displays by default.
pub struct SimulatedResourceSensor {
    rng: Mutex<StdRng>,
}

impl SimulatedResourceSensor {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for SimulatedResourceSensor {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ResourceSensor for SimulatedResourceSensor {
    async fn read(&self) -> Result<ResourceReading, SensorError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SensorError::Unavailable("simulated sensor poisoned".to_string()))?;

        let cpu = rng.random_range(10.0..=30.0);
        let memory = rng.random_range(60.0..=90.0);
        let disk = rng.random_range(85.0..=95.0);
        Ok(ResourceReading::new(cpu, memory, disk))
    }
}

/// Readings of the host machine via `sysinfo`.
#[derive(Clone)]
pub struct SystemResourceSensor {
    system: Arc<Mutex<System>>,
}

impl SystemResourceSensor {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu();
        Self {
            system: Arc::new(Mutex::new(system)),
        }
    }

    fn read_blocking(&self) -> Result<ResourceReading, SensorError> {
        let mut system = self.system.lock().map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire system lock for resource reading");
            SensorError::Unavailable("system mutex poisoned".to_string())
        })?;

        system.refresh_memory();
        system.refresh_cpu();

        let total_memory = system.total_memory();
        let memory_percent = if total_memory == 0 {
            0.0
        } else {
            system.used_memory() as f64 / total_memory as f64 * 100.0
        };

        let cpus = system.cpus();
        let cpu_percent = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|cpu| cpu.cpu_usage()).sum::<f32>() as f64 / cpus.len() as f64
        };
        drop(system);

        let disks = Disks::new_with_refreshed_list();
        let (total, available) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (total + disk.total_space(), available + disk.available_space())
            });
        let disk_percent = if total == 0 {
            0.0
        } else {
            total.saturating_sub(available) as f64 / total as f64 * 100.0
        };

        Ok(ResourceReading::new(cpu_percent, memory_percent, disk_percent))
    }
}

impl Default for SystemResourceSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceSensor for SystemResourceSensor {
    async fn read(&self) -> Result<ResourceReading, SensorError> {
        let sensor = self.clone();
        tokio::task::spawn_blocking(move || sensor.read_blocking())
            .await
            .map_err(|e| SensorError::Unavailable(format!("spawn_blocking for resource reading: {e}")))?
    }
}

/// Background service polling a sensor.
pub struct ResourceMonitor {
    latest: watch::Receiver<Option<ResourceReading>>,
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ResourceMonitor {
    pub fn spawn(sensor: Arc<dyn ResourceSensor>, poll_interval: Duration) -> Self {
        let (latest_tx, latest) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            Self::worker_loop(sensor, poll_interval, latest_tx, shutdown_rx).await;
        });

        Self {
            latest,
            shutdown_tx,
            handle,
        }
    }

    async fn worker_loop(
        sensor: Arc<dyn ResourceSensor>,
        poll_interval: Duration,
        latest_tx: watch::Sender<Option<ResourceReading>>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut ticker = interval(poll_interval);

        tracing::info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Resource monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sensor.read().await {
                        Ok(reading) => {
                            tracing::debug!(
                                cpu_percent = reading.cpu_percent,
                                memory_percent = reading.memory_percent,
                                disk_percent = reading.disk_percent,
                                "Resource reading"
                            );
                            latest_tx.send_replace(Some(reading));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Resource sensor read failed, keeping previous reading");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Resource monitor shutting down");
                    break;
                }
            }
        }
    }

    /// Most recent successful reading, if any.
    pub fn latest(&self) -> Option<ResourceReading> {
        *self.latest.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ResourceReading>> {
        self.latest.clone()
    }

    /// Stop polling and wait for the worker to exit.
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(error = %e, "Failed to send shutdown signal to resource monitor");
        }
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Resource monitor task ended abnormally");
        }
    }
}
