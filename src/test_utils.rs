use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{pop_error_handler, push_error_handler};
use crate::errors::CplErrType;

/// A struct that contains a temporary directory and a path to a file in that directory.
pub struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

impl TempFixture {
    /// Creates a temporary directory and path to a non-existent file with given `name`.
    /// Useful for writing results to during testing
    ///
    /// Returns the struct `TempFixture` that contains the temp dir (for clean-up on `drop`)
    /// as well as the empty file path.
    pub fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Path of a sibling of the fixture file with another extension.
    pub fn with_extension(&self, extension: &str) -> PathBuf {
        self.temp_path.with_extension(extension)
    }
}

impl AsRef<Path> for TempFixture {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Scoped value for temporarily suppressing thread-local log messages.
///
/// Useful for tests that expect errors and want to keep the output log clean
/// of distracting yet expected error messages.
pub(crate) struct SuppressErrorLog {
    // Make !Sync and !Send, and force use of `new`.
    _private: PhantomData<*mut ()>,
}

impl SuppressErrorLog {
    pub(crate) fn new() -> Self {
        push_error_handler(|_, _, _| {});
        SuppressErrorLog {
            _private: PhantomData,
        }
    }
}

impl Drop for SuppressErrorLog {
    fn drop(&mut self) {
        pop_error_handler();
    }
}

/// Run `f`, returning its result along with the messages it emitted on the
/// current thread.
pub(crate) fn collect_errors<R, F: FnOnce() -> R>(f: F) -> (R, Vec<(CplErrType, String)>) {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    push_error_handler(move |class, _, msg| {
        sink.lock().unwrap().push((class, msg.to_string()));
    });
    let result = f();
    pop_error_handler();
    let collected = messages.lock().unwrap().clone();
    (result, collected)
}
