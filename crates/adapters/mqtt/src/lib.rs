//! # farmhub-adapter-mqtt
//!
//! MQTT adapter — the broker-facing edge of the system.
//!
//! ## Responsibilities
//! - Subscribe to the device telemetry feed and hand each frame to the
//!   ingestion pipeline
//! - Queue actuator commands and publish them on per-device command
//!   topics, implementing the `CommandSink` port
//! - Reconnect with a fixed delay whenever the broker connection drops
//!
//! ## Dependency rule
//! Depends on `farmhub-app` (for the ports and the pipeline) and
//! `farmhub-domain`. Never imported by them.

pub mod config;
pub mod error;
pub mod ingest;
pub mod publish;
pub mod topic;

pub use config::MqttConfig;
pub use error::MqttError;
pub use ingest::ConnectionStatus;
pub use publish::CommandPublisher;
