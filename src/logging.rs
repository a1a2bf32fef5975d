use tracing_subscriber::{fmt, EnvFilter};

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Filter from `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVES`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the stdout subscriber shared by the binaries.
pub fn init() {
    fmt::Subscriber::builder().with_env_filter(env_filter()).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this crate that touches RUST_LOG.
    #[test]
    fn filter_reads_rust_log_then_falls_back() {
        std::env::set_var("RUST_LOG", "solar_combiner=debug");
        assert_eq!(env_filter().to_string(), "solar_combiner=debug");

        std::env::remove_var("RUST_LOG");
        assert_eq!(env_filter().to_string(), DEFAULT_DIRECTIVES);
    }
}
