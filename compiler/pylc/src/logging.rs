//! Tracing setup for the `pylang` binary.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use clap::ValueEnum;

static TRACING_INIT: Once = Once::new();

/// Verbosity tiers of the command line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Filter directive for this tier. `tracing` has nothing above
    /// `ERROR`, so critical shares it.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    pub level: LogLevel,
    /// Write log lines here instead of stderr.
    pub file: Option<PathBuf>,
    /// Render span nesting as a tree.
    pub tree: bool,
}

/// Install the global subscriber. Only the first call has an effect.
///
/// `RUST_LOG`, when set, takes precedence over `options.level`.
pub fn init_tracing(options: &LogOptions) -> io::Result<()> {
    let file = options.file.as_ref().map(File::create).transpose()?;
    let level = options.level;
    let tree = options.tree;
    TRACING_INIT.call_once(move || {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
        let hierarchical = tree.then(|| tracing_tree::HierarchicalLayer::new(2).with_targets(true));
        let (to_file, to_stderr) = match file {
            Some(file) => (
                Some(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                ),
                None,
            ),
            None if !tree => (
                None,
                Some(fmt::layer().with_target(true).with_level(true).with_writer(io::stderr)),
            ),
            None => (None, None),
        };
        let _ = tracing_subscriber::registry()
            .with(hierarchical)
            .with(to_file)
            .with(to_stderr)
            .with(filter)
            .try_init();
    });
    Ok(())
}

#[cfg(test)]
mod tests;
