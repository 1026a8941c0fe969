//! Logger initialization for hosts that don't bring their own `log` backend.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` once. `filter` uses the `env_logger` syntax (e.g.
/// "info" or "mapscene_gl=debug"); without one, `RUST_LOG` is honored and the
/// level falls back to info.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if let Some(filter) = filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        builder.init();
        log::debug!("logging initialized");
    });
}
