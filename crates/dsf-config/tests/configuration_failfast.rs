//! Integration tests for fail-fast configuration loading.

use std::ffi::OsString;
use std::fs;

use dsf_config::Config;
use ortho_config::OrthoConfig as _;
use rstest::rstest;
use tempfile::TempDir;

fn load_with_file(contents: &str) -> Result<Config, String> {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("dsf.toml");
    fs::write(&path, contents).expect("write config");
    let args = vec![
        OsString::from("dsfctl"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];
    Config::load_from_iter(args).map_err(|error| error.to_string())
}

#[rstest]
#[case::relative_socket("socket = \"dcs.sock\"\n")]
#[case::tcp_socket("socket = \"tcp://127.0.0.1:9000\"\n")]
#[case::unknown_format("log_format = \"yaml\"\n")]
#[case::broken_toml("socket = \n")]
fn malformed_configuration_is_rejected(#[case] contents: &str) {
    assert!(load_with_file(contents).is_err());
}

#[test]
fn file_values_are_applied() {
    let config = load_with_file("log_filter = \"dsf_client=debug\"\nlog_format = \"json\"\n")
        .expect("config loads");
    assert_eq!(config.log_filter(), "dsf_client=debug");
    assert_eq!(config.log_format(), dsf_config::LogFormat::Json);
}
