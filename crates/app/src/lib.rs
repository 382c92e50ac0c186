//! # farmhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ReadingCache` — latest-value cache for sensor readings
//!   - `TimeSeriesStore` — append-only history of readings
//!   - `RuleRepository` — load rules, write back trigger timestamps
//!   - `CommandSink` — non-blocking handoff of actuator commands
//!   - `ExpressionMatcher` — pluggable boolean-expression evaluation
//!   - `Notifier` — outbound notifications
//! - Define **use-cases** as structs generic over the ports:
//!   - `ReadingPipeline` — decode, normalize, fan out to both sinks
//!   - `RuleEngine` — cooldown, context, evaluate, dispatch
//!   - `ActionDispatcher` — run a matched rule's actions in order
//!   - `scheduler::run` — fixed-interval evaluation loop
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `farmhub-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod dispatch;
pub mod engine;
pub mod pipeline;
pub mod ports;
pub mod scheduler;
