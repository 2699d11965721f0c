//! `pylang` binary.

use std::process::ExitCode;

use clap::Parser;
use pylc::cli::{run, Cli};

fn main() -> ExitCode {
    run(&Cli::parse())
}
