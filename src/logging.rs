//! Logger setup for applications embedding the editor core

use crate::config::EditorConfig;

/// Installs `env_logger` using the configured filter unless `RUST_LOG` is set.
///
/// Calling this more than once is harmless; later calls keep the first logger.
pub fn init(config: &EditorConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_filter.as_str());
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}

/// Flushes buffered log output, for use on teardown
pub fn flush() {
    log::logger().flush();
}
