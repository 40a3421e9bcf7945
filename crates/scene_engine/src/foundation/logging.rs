//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system, honouring `RUST_LOG`
pub fn init() {
    init_with_default_filter("info");
}

/// Initialize the logging system with a fallback filter used when `RUST_LOG` is unset
///
/// Calling this more than once is harmless; later calls leave the first logger in place.
pub fn init_with_default_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already initialised");
    }
}
