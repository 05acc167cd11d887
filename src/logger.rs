use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Log to the terminal at the level named by `MWAPI_LOG_LEVEL` (default `info`).
///
/// Connection pool chatter from the http stack is left out.
pub fn init() -> Result<(), SetLoggerError> {
    let level = dotenv::var("MWAPI_LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    TermLogger::init(
        level,
        ConfigBuilder::default()
            .add_filter_ignore_str("hyper")
            .add_filter_ignore_str("rustls")
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}
