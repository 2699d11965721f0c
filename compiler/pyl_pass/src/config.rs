//! Optimization levels and the settings passes read.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString};

/// Optimization tier. Each level enables every pass of the levels below it.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Deserialize,
)]
pub enum OptLevel {
    O0,
    #[default]
    O1,
    O2,
    O3,
}

impl OptLevel {
    pub const ALL: [OptLevel; 4] = [OptLevel::O0, OptLevel::O1, OptLevel::O2, OptLevel::O3];
}

/// Settings shared by every pass of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct PassConfig {
    pub level: OptLevel,
    /// Upper bound on `iterations * body length` for loop unfolding.
    pub loop_unfold_budget: usize,
    /// Nested simulated calls before evaluation gives up.
    pub max_predict_depth: usize,
    /// Statements one top-level simulated call may execute.
    pub eval_step_budget: usize,
    /// Longest string, bytes or tuple a name load may be replaced with.
    pub inline_literal_limit: usize,
    /// C compiler handed to the native toolchain; probed when absent.
    pub compiler: Option<PathBuf>,
    pub native_timeout: Duration,
}

impl Default for PassConfig {
    fn default() -> Self {
        PassConfig {
            level: OptLevel::default(),
            loop_unfold_budget: 1000,
            max_predict_depth: 100,
            eval_step_budget: 10_000,
            inline_literal_limit: 64,
            compiler: None,
            native_timeout: Duration::from_secs(300),
        }
    }
}

impl PassConfig {
    pub fn with_level(level: OptLevel) -> Self {
        PassConfig {
            level,
            ..PassConfig::default()
        }
    }
}

#[cfg(test)]
mod tests;
