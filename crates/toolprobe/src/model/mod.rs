pub mod expectation;
pub mod ids;
pub mod invocation;
pub mod mode;
pub mod run;

pub use expectation::*;
pub use ids::RunId;
pub use invocation::*;
pub use mode::*;
pub use run::*;

pub use crate::scenario::{Scenario, Step};

/// Literal every usage banner written by a generator tool must start with.
pub const USAGE_BANNER: &str = "Usage: ";
