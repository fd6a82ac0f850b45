use crate::core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configured level for this crate and the HTTP trace layer; dependencies stay at warn
pub fn default_directives(config: &LoggingConfig) -> String {
    format!("warn,userdir={0},tower_http={0}", config.level)
}

pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    if config.console || config.format == "console" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_line_number(true)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_level_to_crate() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            console: false,
        };

        let directives = default_directives(&config);
        assert_eq!(directives, "warn,userdir=debug,tower_http=debug");
        assert!(directives.parse::<EnvFilter>().is_ok());
    }
}
