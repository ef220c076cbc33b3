//! Logger setup for the CLI

use env_logger::{Builder, Env};

/// Initialise `env_logger`. `RUST_LOG` takes precedence; otherwise
/// `--verbose` selects debug output and the default is warnings only.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // a second init (e.g. from tests) is harmless
    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}
