//! Session management
//!
//! A session is one run of an executable. Each session gets its own directory
//! under `$CTRL_SW_ROOT/<sessions_dir>`, holding the log file of the run. The
//! session epoch, the time the session started, is the zero of the log
//! timestamps.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Format of the epoch in session directory names, see
/// https://docs.rs/chrono/0.4/chrono/format/strftime/index.html
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Directories and files of the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (CTRL_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("A session has already been started in this process")]
    AlreadyStarted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session of this process, in the `sessions_dir` directory of
    /// the software root.
    ///
    /// Sets the session epoch, so may only be called once per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(|_| SessionError::AlreadyStarted)?;
        let epoch = SESSION_EPOCH.get().ok_or(SessionError::AlreadyStarted)?;

        Self::create(&root.join(sessions_dir), exec_name, epoch)
    }

    /// Create the directory `{exec_name}_{timestamp}` inside `sessions_path`.
    fn create(
        sessions_path: &Path,
        exec_name: &str,
        epoch: &DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let session_root = sessions_path.join(format!(
            "{}_{}",
            exec_name,
            epoch.format(TIMESTAMP_FORMAT)
        ));

        fs::create_dir_all(&session_root)
            .map_err(|e| SessionError::CannotCreateDir(session_root.clone(), e))?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// Returns `NaN` if the session has not been started yet, so that it can be
/// used as a log timestamp before initialisation.
pub fn get_elapsed_seconds() -> f64 {
    SESSION_EPOCH
        .get()
        .and_then(|e| time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(std::f64::NAN)
}

/// The session's epoch, or `None` if no session has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_session_dir() {
        let sessions_path = std::env::temp_dir().join("ctrl_sw_session_test");
        let epoch = Utc.ymd(2021, 3, 4).and_hms(5, 6, 7);

        let session = Session::create(&sessions_path, "test_exec", &epoch).unwrap();

        assert_eq!(
            session.session_root,
            sessions_path.join("test_exec_20210304_050607")
        );
        assert!(session.session_root.is_dir());
        assert_eq!(
            session.log_file_path,
            session.session_root.join("test_exec.log")
        );

        // Creating it again is fine
        assert!(Session::create(&sessions_path, "test_exec", &epoch).is_ok());

        fs::remove_dir_all(&sessions_path).ok();
    }
}
