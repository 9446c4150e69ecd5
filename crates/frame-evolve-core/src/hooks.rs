//! Hooks and traits for host integration
//!
//! The status bar shows CPU, memory and disk usage supplied by the host. The core
//! only depends on the [`ResourceSensor`] trait; the infra crate provides a real
//! implementation and a simulated one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// One sample of system resource usage, each value a percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceReading {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub taken_at: DateTime<Utc>,
}

impl ResourceReading {
    pub fn new(cpu_percent: f64, memory_percent: f64, disk_percent: f64) -> Self {
        Self {
            cpu_percent: clamp_percent(cpu_percent),
            memory_percent: clamp_percent(memory_percent),
            disk_percent: clamp_percent(disk_percent),
            taken_at: Utc::now(),
        }
    }

    /// Status bar text, e.g. `CPU 12% · RAM 71% · Disk 88%`.
    pub fn describe(&self) -> String {
        format!(
            "CPU {:.0}% · RAM {:.0}% · Disk {:.0}%",
            self.cpu_percent, self.memory_percent, self.disk_percent
        )
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Source of system resource readings, polled by the status bar.
#[async_trait]
pub trait ResourceSensor: Send + Sync {
    async fn read(&self) -> Result<ResourceReading, SensorError>;
}
