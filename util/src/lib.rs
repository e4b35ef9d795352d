//! Utility library for the steering control software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
#[macro_use]
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod time;

// ---------------------------------------------------------------------------
// MACROS
// ---------------------------------------------------------------------------

/// Log an error, rate limited by the given
/// [`logger::LogEvery`] counter.
///
/// The first occurrence is always logged.
#[macro_export]
macro_rules! error_every {
    ($counter:expr, $($arg:tt)+) => ({
        if $counter.tick() {
            log::error!($($arg)+);
        }
    });
}
