//! Configuration options and the diagnostics channel.
//!
//! The library can be configured at runtime using environment variables or
//! by using functions in this module. Options set by calling functions in this
//! module override options set in environment variables.
//!
//! ```
//! use ogr_shape::config::*;
//!
//! set_config_option("SHAPE_RESTORE_SHX", "YES").unwrap();
//! assert_eq!(get_config_option("SHAPE_RESTORE_SHX", "NO").unwrap(), "YES");
//!
//! clear_config_option("SHAPE_RESTORE_SHX").unwrap();
//! assert_eq!(get_config_option("SHAPE_RESTORE_SHX", "NO").unwrap(), "NO");
//! ```
//!
//! Non-fatal conditions (numeric overflow during a field coercion, a subtype
//! reset, a truncated DBF value, ...) do not fail the call that raised them.
//! They are sent to [`cpl_error`], which remembers the last message of the
//! current thread and forwards it to the active error handler. Without a
//! handler, messages go to `tracing`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::errors::{CplErrType, OgrError, Result};

static CONFIG_OPTIONS: Lazy<Mutex<HashMap<String, String>>> = Lazy::new(Default::default);

thread_local! {
    static THREAD_LOCAL_OPTIONS: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
    static LAST_ERROR: RefCell<Option<(CplErrType, i32, String)>> = const { RefCell::new(None) };
    static HANDLER_STACK: RefCell<Vec<Box<ErrorCallbackType>>> = RefCell::new(Vec::new());
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(|c| c == '=' || c == '\0') {
        return Err(OgrError::BadArgument(format!(
            "Invalid configuration key: '{key}'"
        )));
    }
    Ok(())
}

fn lock_options() -> std::sync::MutexGuard<'static, HashMap<String, String>> {
    match CONFIG_OPTIONS.lock() {
        Ok(guard) => guard,
        // a panic while holding the lock cannot leave the map half-written
        Err(poison_error) => poison_error.into_inner(),
    }
}

/// Set a library configuration option
pub fn set_config_option(key: &str, value: &str) -> Result<()> {
    check_key(key)?;
    lock_options().insert(key.to_string(), value.to_string());
    Ok(())
}

/// Get the value of a library configuration option
///
/// Thread local options take precedence over global ones, which take precedence
/// over environment variables. If the option is not found anywhere, `default`
/// is returned.
pub fn get_config_option(key: &str, default: &str) -> Result<String> {
    Ok(find_config_option(key)?.unwrap_or_else(|| default.to_string()))
}

/// Like [`get_config_option`], telling an unset option apart from one set to
/// an empty value.
pub fn find_config_option(key: &str) -> Result<Option<String>> {
    check_key(key)?;
    if let Some(value) = THREAD_LOCAL_OPTIONS.with(|opts| opts.borrow().get(key).cloned()) {
        return Ok(Some(value));
    }
    if let Some(value) = lock_options().get(key).cloned() {
        return Ok(Some(value));
    }
    Ok(std::env::var(key).ok())
}

/// Clear the value of a library configuration option
pub fn clear_config_option(key: &str) -> Result<()> {
    check_key(key)?;
    lock_options().remove(key);
    Ok(())
}

/// Set a library configuration option
/// with **thread local** scope
pub fn set_thread_local_config_option(key: &str, value: &str) -> Result<()> {
    check_key(key)?;
    THREAD_LOCAL_OPTIONS.with(|opts| {
        opts.borrow_mut().insert(key.to_string(), value.to_string());
    });
    Ok(())
}

/// Clear the value of a library configuration option
/// with **thread local** scope
pub fn clear_thread_local_config_option(key: &str) -> Result<()> {
    check_key(key)?;
    THREAD_LOCAL_OPTIONS.with(|opts| {
        opts.borrow_mut().remove(key);
    });
    Ok(())
}

/// Interpret a configuration value as a boolean.
///
/// `NO`, `FALSE`, `OFF` and `0` (case insensitive) are false, everything else is true.
pub fn test_bool(value: &str) -> bool {
    !(value.eq_ignore_ascii_case("NO")
        || value.eq_ignore_ascii_case("FALSE")
        || value.eq_ignore_ascii_case("OFF")
        || value == "0")
}

/// Fetch a boolean configuration option, falling back to `default`.
pub fn get_config_bool(key: &str, default: bool) -> bool {
    match get_config_option(key, if default { "YES" } else { "NO" }) {
        Ok(value) => test_bool(&value),
        Err(_) => default,
    }
}

type ErrorCallbackType = dyn FnMut(CplErrType, i32, &str) + 'static + Send;

/// Static variable that holds the current error callback function
static ERROR_CALLBACK: Lazy<Mutex<Option<Box<ErrorCallbackType>>>> = Lazy::new(Default::default);

/// Set a custom error handler.
/// Could be overwritten by pushing a thread-local error handler.
///
/// The function must be `Send` and `Sync` since it is potentially called from multiple threads.
pub fn set_error_handler<F>(callback: F)
where
    F: FnMut(CplErrType, i32, &str) + 'static + Send + Sync,
{
    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    callback_lock.replace(Box::new(callback));
}

/// Remove a custom error handler.
pub fn remove_error_handler() {
    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    callback_lock.take();
}

/// Push a handler that receives messages emitted on the current thread until
/// the matching [`pop_error_handler`].
pub fn push_error_handler<F>(callback: F)
where
    F: FnMut(CplErrType, i32, &str) + 'static + Send,
{
    HANDLER_STACK.with(|stack| stack.borrow_mut().push(Box::new(callback)));
}

/// Remove the innermost handler installed with [`push_error_handler`].
pub fn pop_error_handler() {
    HANDLER_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Emit a message on the diagnostics channel.
///
/// The message becomes the thread's last error, then goes to the innermost
/// pushed handler, the global handler, or `tracing`, in that order.
pub fn cpl_error(class: CplErrType, number: i32, msg: &str) {
    if class != CplErrType::Debug {
        LAST_ERROR.with(|last| *last.borrow_mut() = Some((class, number, msg.to_string())));
    }

    let handled = HANDLER_STACK.with(|stack| match stack.borrow_mut().last_mut() {
        Some(callback) => {
            callback(class, number, msg);
            true
        }
        None => false,
    });
    if handled {
        return;
    }

    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };
    match callback_lock.as_mut() {
        Some(callback) => callback(class, number, msg),
        None => match class {
            CplErrType::None => {}
            CplErrType::Debug => tracing::debug!(number, "{msg}"),
            CplErrType::Warning => tracing::warn!(number, "{msg}"),
            CplErrType::Failure | CplErrType::Fatal => tracing::error!(number, "{msg}"),
        },
    }
}

/// The last non-debug message emitted on this thread, if any.
pub fn last_error() -> Option<(CplErrType, i32, String)> {
    LAST_ERROR.with(|last| last.borrow().clone())
}

/// Forget the last message emitted on this thread.
pub fn error_reset() {
    LAST_ERROR.with(|last| *last.borrow_mut() = None);
}

/// Turn the last message of this thread into an [`OgrError`], resetting it.
pub fn last_cpl_err() -> Option<OgrError> {
    let last = last_error();
    error_reset();
    last.map(|(class, number, msg)| OgrError::CplError { class, number, msg })
}
