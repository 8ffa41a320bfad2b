//! Veritas Runtime
//!
//! Wires the pure aggregation core to its collaborators:
//! - **Engine**: profile selection, telemetry, fire-and-forget persistence
//! - **Telemetry**: one structured record per aggregation call
//! - **Store**: lookup of the latest score record and diagnostics attachment
//! - **Config**: engine settings loaded from TOML

pub mod config;
pub mod engine;
pub mod store;
pub mod telemetry;

pub use config::*;
pub use engine::*;
pub use store::*;
pub use telemetry::*;
