use std::str::FromStr;
use tracing::Level;

/// Install the global fmt subscriber. `verbose` forces debug output.
///
/// Unknown level names fall back to `info`. Calling this twice is harmless;
/// the second subscriber is simply not installed.
pub fn init_logging(level: &str, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::from_str(level).unwrap_or(Level::INFO)
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
