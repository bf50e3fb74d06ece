use std::backtrace::Backtrace;

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Environment, LoggingConfig};

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// directive; production output drops ANSI colors.
pub fn init_tracing(logging: &LoggingConfig, environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.rust_log.as_str()));
    let installed = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!environment.is_production())
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    set_panic_hook(environment);
}

fn set_panic_hook(environment: Environment) {
    std::panic::set_hook(Box::new(move |info| {
        let message = if let Some(message) = info.payload().downcast_ref::<&str>() {
            *message
        } else if let Some(message) = info.payload().downcast_ref::<String>() {
            message.as_str()
        } else {
            "unknown panic"
        };

        let location = info
            .location()
            .map(|location| location.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        if environment.is_production() {
            tracing::error!(panic = %message, location = %location, "panic");
        } else {
            let backtrace = Backtrace::capture();
            tracing::error!(
                panic = %message,
                location = %location,
                backtrace = %backtrace,
                "panic"
            );
        }
    }));
}
