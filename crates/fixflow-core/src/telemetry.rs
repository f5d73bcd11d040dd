//! Tracing subscriber setup for hosts embedding fixflow.
//!
//! The library itself only emits events; a host calls [`init_from_settings`]
//! (or [`init_tracing`]) once at startup. `RUST_LOG` always wins over the
//! configured level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::FixflowSettings;

/// Install the global subscriber.
///
/// Returns `false` when a global subscriber was already set; the existing
/// one is left in place.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false);

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };
    installed.is_ok()
}

/// Parse a level name such as `"debug"`; unknown names yield `None`.
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}

/// Install the global subscriber from loaded settings.
pub fn init_from_settings(settings: &FixflowSettings) -> bool {
    let level = parse_level(&settings.log_level).unwrap_or(Level::INFO);
    init_tracing(settings.log_json, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("chatty"), None);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let settings = FixflowSettings {
            log_json: true,
            ..Default::default()
        };
        init_from_settings(&settings);
        assert!(!init_tracing(false, Level::DEBUG));
    }
}
