//! Driver for the pylang optimizer.
//!
//! A [`Pipeline`] owns the units of one run and the passes registered for
//! it. Passes are applied in registration order, cycle after cycle, until
//! a whole cycle over every unit reports no rewrite; the post passes
//! (native conversion) then run once per unit.
//!
//! - [`config`]: settings file and the [`pyl_pass::PassConfig`] it yields
//! - [`decode`]: the character encodings a unit may be written in
//! - [`input`]: which files a run reads and where their output goes
//! - [`native`]: compiling marked functions into extension modules
//! - [`logging`]: tracing subscriber setup
//! - [`cli`]: the `pylang` command line

pub mod cli;
pub mod config;
pub mod decode;
mod error;
pub mod input;
pub mod logging;
pub mod native;
mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use error::{DecodeError, PipelineError};
pub use logging::{init_tracing, LogLevel, LogOptions};
pub use native::{CompileError, CythonCompiler, NativeCompiler, NativeConvertor};
pub use pipeline::Pipeline;
