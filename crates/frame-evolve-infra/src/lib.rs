//! Frame Evolve infrastructure
//!
//! Shared runtime plumbing used by the binary:
//! - Telemetry initialisation
//! - System-resource sensors and the polling resource monitor

pub mod monitor;
pub mod telemetry;

pub use monitor::{ResourceMonitor, SimulatedResourceSensor, SystemResourceSensor};
pub use telemetry::init_telemetry;
