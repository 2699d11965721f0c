use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_file_gives_defaults() {
    let config = PipelineConfig::from_toml("").unwrap_or_default();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.pass_config(), PassConfig::default());
}

#[test]
fn values_override_defaults() {
    let config = PipelineConfig::from_toml("level = \"O3\"\nmax_cycles = 7\ncompiler = \"/usr/bin/cc\"\n");
    let Ok(config) = config else {
        panic!("config should parse: {config:?}");
    };
    assert_eq!(config.level, OptLevel::O3);
    assert_eq!(config.max_cycles, 7);
    assert_eq!(config.pass_config().compiler, Some(PathBuf::from("/usr/bin/cc")));
    assert_eq!(config.loop_unfold_budget, 1000);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(matches!(
        PipelineConfig::from_toml("optimise = true\n"),
        Err(ConfigError::Parse(_))
    ));
    assert!(PipelineConfig::from_toml("level = \"O9\"\n").is_err());
}

#[test]
fn missing_file_reports_its_path() {
    let err = PipelineConfig::load(Path::new("/nonexistent/pylang.toml"));
    let Err(ConfigError::Read { path, .. }) = err else {
        panic!("expected a read error");
    };
    assert_eq!(path, PathBuf::from("/nonexistent/pylang.toml"));
}
