pub mod config;
pub mod error;
pub mod interchange;
pub mod scorecard;
pub mod telemetry;
