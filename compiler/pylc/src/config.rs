//! Run configuration.
//!
//! Settings come from an optional `pylang.toml`; command line flags are
//! applied on top by [`crate::cli`].
//!
//! ```toml
//! level = "O2"
//! loop_unfold_budget = 500
//! compiler = "/usr/bin/clang"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pyl_pass::{OptLevel, PassConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything a run can be told.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub level: OptLevel,
    pub loop_unfold_budget: usize,
    /// Cycles before the fixed point is declared unreachable.
    pub max_cycles: usize,
    pub max_predict_depth: usize,
    pub eval_step_budget: usize,
    pub inline_literal_limit: usize,
    pub compiler: Option<PathBuf>,
    pub native_timeout_secs: u64,
    pub output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let passes = PassConfig::default();
        PipelineConfig {
            level: passes.level,
            loop_unfold_budget: passes.loop_unfold_budget,
            max_cycles: 100,
            max_predict_depth: passes.max_predict_depth,
            eval_step_budget: passes.eval_step_budget,
            inline_literal_limit: passes.inline_literal_limit,
            compiler: None,
            native_timeout_secs: passes.native_timeout.as_secs(),
            output: PathBuf::from("out"),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// The part of the configuration passes see.
    pub fn pass_config(&self) -> PassConfig {
        PassConfig {
            level: self.level,
            loop_unfold_budget: self.loop_unfold_budget,
            max_predict_depth: self.max_predict_depth,
            eval_step_budget: self.eval_step_budget,
            inline_literal_limit: self.inline_literal_limit,
            compiler: self.compiler.clone(),
            native_timeout: Duration::from_secs(self.native_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests;
