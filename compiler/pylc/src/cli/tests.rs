#![allow(clippy::unwrap_used)]

use std::fs;

use pretty_assertions::assert_eq;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pylang").chain(args.iter().copied())).unwrap()
}

#[test]
fn levels_accept_both_spellings() {
    assert_eq!(parse(&["-O2"]).level, Some(OptLevel::O2));
    assert_eq!(parse(&["--opt-level", "O3"]).level, Some(OptLevel::O3));
    assert_eq!(parse(&[]).level, None);
    assert!(Cli::try_parse_from(["pylang", "-O7"]).is_err());
}

#[test]
fn inputs_and_logging_flags() {
    let cli = parse(&["a.py", "-f", "b.py", "-d", "src", "-d", "lib", "--log-level", "debug", "--trace-tree"]);
    assert_eq!(cli.files, [PathBuf::from("a.py")]);
    assert_eq!(cli.file, [PathBuf::from("b.py")]);
    assert_eq!(cli.dir, [PathBuf::from("src"), PathBuf::from("lib")]);
    assert_eq!(cli.log_level, LogLevel::Debug);
    assert!(cli.trace_tree);
    assert_eq!(cli.color, Color::Auto);
}

#[test]
fn flags_override_the_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("pylang.toml");
    fs::write(&settings, "level = \"O2\"\noutput = \"build\"\nmax_cycles = 5\n").unwrap();

    let cli = parse(&["--config", settings.to_str().unwrap(), "-O3"]);
    let config = cli.config().unwrap();
    assert_eq!(config.level, OptLevel::O3);
    assert_eq!(config.output, PathBuf::from("build"));
    assert_eq!(config.max_cycles, 5);

    let cli = parse(&["--config", settings.to_str().unwrap(), "-o", "elsewhere", "--compiler", "cc"]);
    let config = cli.config().unwrap();
    assert_eq!(config.level, OptLevel::O2);
    assert_eq!(config.output, PathBuf::from("elsewhere"));
    assert_eq!(config.compiler, Some(PathBuf::from("cc")));
}

#[test]
fn runs_write_beneath_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("pkg")).unwrap();
    fs::write(src.join("pkg/a.py"), "if True:\n    x = 1\nelse:\n    x = 2\n").unwrap();
    fs::write(src.join("b.py"), "def (:\n").unwrap();
    let out = dir.path().join("out");

    let cli = parse(&["-O1", "-d", src.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    let summary = execute(&cli).unwrap();

    assert_eq!(summary.written.len(), 2);
    assert_eq!(fs::read_to_string(out.join("pkg/a.py")).unwrap(), "x = 1\n");
    assert_eq!(fs::read_to_string(out.join("b.py")).unwrap(), "def (:\n");
}

#[test]
fn bad_settings_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("pylang.toml");
    fs::write(&settings, "bogus = 1\n").unwrap();
    let cli = parse(&["--config", settings.to_str().unwrap()]);
    let err = execute(&cli).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn cycle_limit_exits_with_two() {
    let err = CliError::from(PipelineError::CycleLimit { cycles: 100 });
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.to_string(), "no fixed point after 100 cycles");
}
