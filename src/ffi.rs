//! FFI bindings for FitTrack Trends
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `trends_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::dashboard::{dashboard_json, parse_day};
use crate::snapshot::Snapshot;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Dashboard API
// ============================================================================

/// Build the dashboard JSON for a snapshot.
///
/// # Safety
/// - `snapshot_json`, `range` and `today` must be valid null-terminated C strings.
/// - `range` is one of `7d`, `30d`, `90d`, `1y`, `all`; `today` is `yyyy-MM-dd`.
/// - `config_json` may be NULL for the default configuration.
/// - Returns a newly allocated string that must be freed with `trends_free_string`.
/// - Returns NULL on error; call `trends_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trends_dashboard_json(
    snapshot_json: *const c_char,
    range: *const c_char,
    today: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let snapshot_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    let range_str = match cstr_to_string(range) {
        Some(s) => s,
        None => {
            set_last_error("Invalid range string pointer");
            return ptr::null_mut();
        }
    };

    let today_str = match cstr_to_string(today) {
        Some(s) => s,
        None => {
            set_last_error("Invalid today string pointer");
            return ptr::null_mut();
        }
    };

    let config_str = if config_json.is_null() {
        None
    } else {
        match cstr_to_string(config_json) {
            Some(s) => Some(s),
            None => {
                set_last_error("Invalid config string");
                return ptr::null_mut();
            }
        }
    };

    match dashboard_json(&snapshot_str, &range_str, &today_str, config_str.as_deref()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Validate a snapshot and return its record issues as a JSON array.
///
/// # Safety
/// - `snapshot_json` and `today` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `trends_free_string`.
/// - Returns NULL on error; call `trends_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trends_validate_json(
    snapshot_json: *const c_char,
    today: *const c_char,
    utc_offset_minutes: i32,
) -> *mut c_char {
    clear_last_error();

    let (Some(snapshot_str), Some(today_str)) =
        (cstr_to_string(snapshot_json), cstr_to_string(today))
    else {
        set_last_error("Invalid string pointer");
        return ptr::null_mut();
    };

    let config = EngineConfig {
        utc_offset_minutes,
        ..Default::default()
    };

    let result = Snapshot::from_json(&snapshot_str).and_then(|snapshot| {
        let today = parse_day(&today_str)?;
        let issues = snapshot.validate(today, config.offset()?);
        Ok(serde_json::to_string(&issues)?)
    });

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by trends functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a trends function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn trends_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next trends function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn trends_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn trends_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
