use clap::{CommandFactory, FromArgMatches, Parser};
use speechscore::catalog::Category;
use speechscore::config::EngineConfig;
use speechscore::error::ScoreError;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    config: EngineConfig,
}

fn parse_cli(args: &[&str]) -> (EngineConfig, clap::ArgMatches) {
    let matches = TestCli::command().get_matches_from(args);
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config, matches)
}

#[test]
fn test_estimate_factor_defaults() {
    let factors = EngineConfig::default().get_estimate_factors().unwrap();
    assert_eq!(factors.len(), 6);
    assert_eq!(factors[&Category::Nervousness], 0.85);
    assert_eq!(factors[&Category::UltimateLevel], 0.75);
}

#[test]
fn test_estimate_factor_custom() {
    let config = EngineConfig {
        estimate_factors: "1.0, 1.0, 1.0, 1.0, 1.0, 0.5".to_string(),
        ..Default::default()
    };
    let factors = config.get_estimate_factors().unwrap();
    assert_eq!(factors[&Category::Voice], 1.0);
    assert_eq!(factors[&Category::UltimateLevel], 0.5);
}

#[test]
fn test_estimate_factor_partial_is_rejected() {
    let config = EngineConfig {
        estimate_factors: "0.5, 0.5, 0.5".to_string(),
        ..Default::default()
    };
    let err = config.get_estimate_factors().unwrap_err();
    assert!(err.to_string().contains("requires 6 values"));
}

#[test]
fn test_estimate_factor_garbage_is_rejected() {
    let config = EngineConfig {
        estimate_factors: "bad,data,here,1,1,1".to_string(),
        ..Default::default()
    };
    let err = config.get_estimate_factors().unwrap_err();
    assert!(matches!(err, ScoreError::Config(ref m) if m.contains("Invalid number")));
}

#[test]
fn test_estimate_factor_negative_is_rejected() {
    let config = EngineConfig {
        estimate_factors: "1,1,1,1,1,-1".to_string(),
        ..Default::default()
    };
    assert!(config.get_estimate_factors().is_err());
}

#[test]
fn test_load_from_file_fills_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "custom_divider": 0.8 }}"#).unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.custom_divider, Some(0.8));
    assert_eq!(config.estimate_factors, EngineConfig::default().estimate_factors);
    assert_eq!(config.ranges, EngineConfig::default().ranges);
}

#[test]
fn test_load_from_file_with_ranges() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "ranges": [
            {{ "category": "Voice", "firstId": 1, "lastId": 50 }},
            {{ "category": "Language", "firstId": 51, "lastId": 60 }}
        ] }}"#
    )
    .unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.ranges.category_for(42), Category::Voice);
    assert_eq!(config.ranges.category_for(70), Category::Unknown);
}

#[test]
fn test_load_from_file_rejects_overlapping_ranges() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "ranges": [
            {{ "category": "Voice", "firstId": 1, "lastId": 50 }},
            {{ "category": "Language", "firstId": 50, "lastId": 60 }}
        ] }}"#
    )
    .unwrap();

    assert!(matches!(
        EngineConfig::load_from_file(file.path()),
        Err(ScoreError::Config(_))
    ));
}

#[test]
fn test_load_from_missing_file() {
    let err = EngineConfig::load_from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ScoreError::Config(_)));
}

#[test]
fn test_merge_only_overrides_explicit_flags() {
    let mut file_config = EngineConfig {
        estimate_factors: "1,1,1,1,1,1".to_string(),
        custom_divider: Some(0.8),
        ..Default::default()
    };

    let (cli_config, matches) = parse_cli(&["test", "--custom-divider", "1.25"]);
    file_config.merge_from_cli(&cli_config, &matches);

    assert_eq!(file_config.custom_divider, Some(1.25));
    // Not on the command line, so the file value survives the CLI default.
    assert_eq!(file_config.estimate_factors, "1,1,1,1,1,1");
}

#[test]
fn test_merge_without_flags_keeps_file_values() {
    let mut file_config = EngineConfig {
        custom_divider: Some(0.8),
        ..Default::default()
    };
    let (cli_config, matches) = parse_cli(&["test"]);
    file_config.merge_from_cli(&cli_config, &matches);
    assert_eq!(file_config.custom_divider, Some(0.8));
}
