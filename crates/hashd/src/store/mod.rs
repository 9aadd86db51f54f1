//! In-memory result storage.
//!
//! [`ResultStore`] owns every completed digest and the latency log it was
//! produced with; [`StatsSnapshot`] is the derived view over that log.

mod results;
mod stats;

pub use results::*;
pub use stats::*;
