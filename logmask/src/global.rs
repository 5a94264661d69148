//! The process-wide logger and free-function shortcuts.
//!
//! ```no_run
//! use logmask::{Logger, MsgType, NO_DATA};
//!
//! logmask::init(Logger::builder().service_name("checkout")).unwrap();
//! logmask::info("trace-1", "cart", MsgType::Event, "cart created", NO_DATA);
//! ```

use std::{error::Error as StdError, sync::OnceLock};

use crate::{
    config::Config,
    error::Result,
    inspect::Inspect,
    logger::{Logger, LoggerBuilder},
    record::MsgType,
};

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Installs the process-wide logger.
///
/// Only the first successful call installs anything; later calls, including
/// concurrent ones, get the logger that won. Configuration errors are
/// reported only if nothing has been installed yet.
pub fn init(builder: LoggerBuilder) -> Result<&'static Logger> {
    if let Some(logger) = GLOBAL.get() {
        return Ok(logger);
    }
    let logger = builder.build()?;
    Ok(GLOBAL.get_or_init(|| logger))
}

/// The process-wide logger.
///
/// If [`init`] was never called, a logger configured from the environment
/// (see [`Config::from_env`]) is installed, falling back to plain defaults
/// when that configuration is invalid.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| {
        Config::from_env()
            .map(LoggerBuilder::from_config)
            .and_then(LoggerBuilder::build)
            .unwrap_or_else(|_| Logger::fallback())
    })
}

#[track_caller]
pub fn debug(trace_id: &str, module: &str, msg_type: MsgType, msg: &str, data: &dyn Inspect) {
    global().debug(trace_id, module, msg_type, msg, data);
}

#[track_caller]
pub fn info(trace_id: &str, module: &str, msg_type: MsgType, msg: &str, data: &dyn Inspect) {
    global().info(trace_id, module, msg_type, msg, data);
}

#[track_caller]
pub fn warning(trace_id: &str, module: &str, msg: &str, data: &dyn Inspect) {
    global().warning(trace_id, module, msg, data);
}

#[track_caller]
pub fn error(trace_id: &str, module: &str, err: &dyn StdError) {
    global().error(trace_id, module, err);
}

#[track_caller]
pub fn fatal(trace_id: &str, module: &str, err: &dyn StdError) -> ! {
    global().fatal(trace_id, module, err)
}

/// Flushes the process-wide logger.
pub fn sync() -> std::io::Result<()> {
    global().sync()
}
