//! Log-file output test. Kept in its own binary because the tracing
//! subscriber can only be installed once per process.

use datalib_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

#[test]
fn log_file_receives_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cli.log");
    let config = LogConfig {
        level_filter: LevelFilter::INFO,
        use_env_filter: false,
        format: LogFormat::Compact,
        log_file: Some(path.clone()),
        with_ansi: false,
        with_target: true,
    };
    init_logging(&config).expect("init logging");

    tracing::info!(target: "datalib_cli", "hello from the log file test");
    tracing::debug!(target: "datalib_cli", "filtered out at info level");

    let contents = std::fs::read_to_string(&path).expect("read log file");
    assert!(contents.contains("hello from the log file test"));
    assert!(!contents.contains("filtered out at info level"));
}
