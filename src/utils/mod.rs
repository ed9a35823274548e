pub mod build_info;
pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".quote_composer";
const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "tables.json";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("quote_composer=info"));

        // A host application may already own the global subscriber.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.quote_composer`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("QUOTE_COMPOSER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Location of the persisted configuration file inside `base`.
pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Default location of the JSON table store inside `base`.
pub fn store_file_in(base: &std::path::Path) -> PathBuf {
    base.join(STORE_FILE)
}
