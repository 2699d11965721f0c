//! The `pylang` command line.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use pyl_diagnostic::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use pyl_pass::OptLevel;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, PipelineConfig};
use crate::error::PipelineError;
use crate::input::discover;
use crate::logging::{init_tracing, LogLevel, LogOptions};
use crate::pipeline::Pipeline;

#[derive(Debug, Parser)]
#[command(name = "pylang")]
#[command(version, about = "Optimizing source-to-source compiler for Python programs")]
pub struct Cli {
    /// Source files to optimize
    pub files: Vec<PathBuf>,

    /// Optimization level, 0 to 3
    #[arg(short = 'O', long = "opt-level", value_parser = parse_level)]
    pub level: Option<OptLevel>,

    /// Source file to optimize (repeatable)
    #[arg(short = 'f', long = "file")]
    pub file: Vec<PathBuf>,

    /// Directory searched recursively for `.py` files (repeatable)
    #[arg(short = 'd', long = "dir")]
    pub dir: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// C compiler for native conversion
    #[arg(long)]
    pub compiler: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub log_level: LogLevel,

    /// Write log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Render log spans as a tree
    #[arg(long)]
    pub trace_tree: bool,

    /// Settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub color: Color,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<Color> for ColorMode {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => ColorMode::Auto,
            Color::Always => ColorMode::Always,
            Color::Never => ColorMode::Never,
        }
    }
}

/// `-O2` and `--opt-level O2` alike.
fn parse_level(arg: &str) -> Result<OptLevel, String> {
    let name = if arg.starts_with('O') {
        arg.to_owned()
    } else {
        format!("O{arg}")
    };
    name.parse()
        .map_err(|_| format!("unknown optimization level `{arg}`, expected 0, 1, 2 or 3"))
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("cannot open log file: {0}")]
    Log(#[source] io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Pipeline(PipelineError::CycleLimit { .. }) => 2,
            _ => 1,
        }
    }
}

/// What a completed run wrote.
#[derive(Debug)]
pub struct Summary {
    pub written: Vec<PathBuf>,
    pub warnings: usize,
}

impl Cli {
    /// Settings file values with the flags given on the command line
    /// applied on top.
    pub fn config(&self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        if let Some(compiler) = &self.compiler {
            config.compiler = Some(compiler.clone());
        }
        Ok(config)
    }

    fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level,
            file: self.log_file.clone(),
            tree: self.trace_tree,
        }
    }
}

/// Optimize every input and write the results.
pub fn execute(cli: &Cli) -> Result<Summary, CliError> {
    let config = cli.config()?;
    debug!(?config, "configuration");

    let files: Vec<PathBuf> = cli.files.iter().chain(&cli.file).cloned().collect();
    let inputs = discover(&files, &cli.dir);
    if inputs.is_empty() {
        warn!("no input files");
    }

    let mut pipeline = Pipeline::from_config(&config).with_default_passes();
    for input in &inputs {
        pipeline.add_file(input);
    }
    let outputs = pipeline.transform();
    report(&pipeline, cli.color.into());
    let outputs = outputs?;

    let mut written = Vec::with_capacity(outputs.len());
    for unit in &outputs {
        let path = unit.write_to(&config.output).map_err(|source| PipelineError::Write {
            path: config.output.join(unit.path()),
            source,
        })?;
        debug!(path = %path.display(), "written");
        written.push(path);
    }
    info!(units = written.len(), output = %config.output.display(), "done");
    Ok(Summary {
        written,
        warnings: pipeline.diagnostics().warning_count(),
    })
}

/// Render the run's diagnostics on stderr.
fn report(pipeline: &Pipeline, mode: ColorMode) {
    let diagnostics = pipeline.diagnostics();
    if diagnostics.is_empty() {
        return;
    }
    let mut emitter = TerminalEmitter::with_color_mode(io::stderr(), mode, io::stderr().is_terminal());
    for diagnostic in diagnostics.iter() {
        let source = diagnostic.file.as_deref().and_then(|file| pipeline.source_text(file));
        emitter.emit(diagnostic, source);
    }
    emitter.emit_summary(diagnostics.error_count(), diagnostics.warning_count());
    emitter.flush();
}

/// Entry point of the binary.
pub fn run(cli: &Cli) -> ExitCode {
    if let Err(err) = init_tracing(&cli.log_options()) {
        let err = CliError::Log(err);
        eprintln!("error: {err}");
        return ExitCode::from(err.exit_code());
    }
    match execute(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests;
