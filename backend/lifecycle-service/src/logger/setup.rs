//! Setup logging subsystem.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::config;

/// Handle to the logging subsystem. Logs are flushed as long as this guard
/// is alive, so it must be held for the lifetime of the application.
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Setup logging from the log config section. Crates named in
/// `crates_to_filter` log at the configured console level, everything else
/// is capped at WARN unless an explicit filtering directive overrides it.
pub fn setup(
    config: &config::Log,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> TelemetryGuard {
    let mut guards = Vec::new();

    let subscriber = tracing_subscriber::registry();

    if config.console.enabled {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let console_filter = get_envfilter(
            config.console.filtering_directive.as_ref(),
            config::Level(tracing::Level::WARN),
            config.console.level,
            &crates_to_filter,
        );

        match config.console.log_format {
            config::LogFormat::Default => {
                let logging_layer = fmt::layer()
                    .with_timer(fmt::time::time())
                    .pretty()
                    .with_writer(non_blocking)
                    .with_filter(console_filter);
                subscriber.with(logging_layer).init();
            }
            config::LogFormat::Json => {
                let logging_layer = fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(console_filter);
                subscriber.with(logging_layer).init();
            }
        }
    } else {
        subscriber.init();
    }

    TelemetryGuard {
        _log_guards: guards,
    }
}

fn get_envfilter(
    filtering_directive: Option<&String>,
    default_log_level: config::Level,
    filter_log_level: config::Level,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> EnvFilter {
    filtering_directive
        .map(|directive| EnvFilter::builder().parse_lossy(directive))
        .unwrap_or_else(|| {
            crates_to_filter.as_ref().iter().fold(
                EnvFilter::default().add_directive(default_log_level.into_level().into()),
                |env_filter, crate_name| {
                    // Note: Exceptionally using `expect()` here, since this
                    // kind of invalid directive would be caught at compile
                    // time by unit tests
                    #[allow(clippy::expect_used)]
                    env_filter.add_directive(
                        format!("{crate_name}={}", filter_log_level.into_level())
                            .parse()
                            .expect("Invalid EnvFilter directive format"),
                    )
                },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_directives_parse_at_every_level() {
        for level in [
            tracing::Level::ERROR,
            tracing::Level::WARN,
            tracing::Level::INFO,
            tracing::Level::DEBUG,
            tracing::Level::TRACE,
        ] {
            let filter = get_envfilter(
                None,
                config::Level(tracing::Level::WARN),
                config::Level(level),
                ["lifecycle_service", "external_services"],
            );
            assert!(filter.to_string().contains("lifecycle_service"));
        }
    }

    #[test]
    fn explicit_directive_wins_over_crate_list() {
        let directive = "lifecycle_service=trace".to_string();
        let filter = get_envfilter(
            Some(&directive),
            config::Level(tracing::Level::WARN),
            config::Level(tracing::Level::INFO),
            ["lifecycle_service"],
        );
        assert_eq!(filter.to_string(), "lifecycle_service=trace");
    }
}
