//! Logger setup for the `log` facade.

use log::LevelFilter;

/// Installs `env_logger` at `level`. `RUST_LOG`, when set, takes precedence.
///
/// Returns false if a logger was already installed.
pub fn init_logging(level: LevelFilter) -> bool {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_millis();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.try_init().is_ok()
}

/// Logger for unit and integration tests.
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_ignored() {
        init_test_logging();
        assert!(!init_logging(LevelFilter::Info));
    }
}
