//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod cache;
pub mod command;
pub mod evaluator;
pub mod notifier;
pub mod rules;
pub mod timeseries;

pub use cache::ReadingCache;
pub use command::{Command, CommandSink};
pub use evaluator::ExpressionMatcher;
pub use notifier::Notifier;
pub use rules::RuleRepository;
pub use timeseries::TimeSeriesStore;
