//! FFI bindings for the fitness tracker
//!
//! This module provides C-compatible functions for driving a tracker from the
//! host application shell. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `fitness_free_string`.
//!
//! A tracker handle is not thread-safe; call it from the thread that receives
//! sensor callbacks.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::config::TrackerConfig;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::tracker::StepTracker;
use crate::types::DisplayFrame;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Serialize a frame, or record the error and return NULL
fn frame_to_cstr(frame: &DisplayFrame) -> *mut c_char {
    match serde_json::to_string(frame) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return Some(Utc::now());
    }
    DateTime::<Utc>::from_timestamp_millis(millis)
}

// ============================================================================
// Tracker API
// ============================================================================

/// Opaque handle to a StepTracker
pub struct TrackerHandle {
    tracker: StepTracker,
}

/// Create a tracker.
///
/// # Safety
/// - `config_json` may be NULL (defaults) or a valid null-terminated C string.
/// - `state_path` may be NULL (volatile state) or a valid null-terminated path
///   to the JSON state file.
/// - `sensor_available` is non-zero when the device has a step counter.
/// - Must be freed with `fitness_tracker_free`.
/// - Returns NULL on error; call `fitness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_new(
    config_json: *const c_char,
    state_path: *const c_char,
    sensor_available: i32,
) -> *mut TrackerHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        Some(json) => match TrackerConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => TrackerConfig::default(),
    };

    let store: Box<dyn KeyValueStore> = match cstr_to_string(state_path) {
        Some(path) => match JsonFileStore::open(path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => Box::new(MemoryStore::new()),
    };

    match StepTracker::new(config, store, sensor_available != 0) {
        Ok(tracker) => Box::into_raw(Box::new(TrackerHandle { tracker })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_free(tracker: *mut TrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Feed a cumulative step count from the platform sensor.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - `timestamp_ms` is Unix epoch milliseconds; 0 means "now".
/// - Returns a newly allocated frame JSON that must be freed with
///   `fitness_free_string`.
/// - Returns NULL when the event was not handled (not listening) or on error;
///   on error `fitness_last_error` is set.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_on_step_count(
    tracker: *mut TrackerHandle,
    cumulative: f64,
    timestamp_ms: i64,
) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracker;

    let Some(at) = timestamp_from_millis(timestamp_ms) else {
        set_last_error("Timestamp out of range");
        return ptr::null_mut();
    };

    match handle.tracker.on_step_count(cumulative, at) {
        Ok(Some(frame)) => frame_to_cstr(&frame),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset the session and return the cleared frame.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - Returns a newly allocated string that must be freed with `fitness_free_string`.
/// - Returns NULL on error; call `fitness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_reset(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracker;

    match handle.tracker.reset() {
        Ok(frame) => frame_to_cstr(&frame),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Start listening. Returns 1 when listening, 0 when there is no sensor,
/// -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_resume(tracker: *mut TrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    let handle = &mut *tracker;
    i32::from(handle.tracker.resume())
}

/// Stop listening and persist offsets. Returns 0 on success, -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_pause(tracker: *mut TrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    let handle = &mut *tracker;

    match handle.tracker.pause() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Report the permission prompt outcome (non-zero = granted).
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_permission_result(
    tracker: *mut TrackerHandle,
    granted: i32,
) {
    if let Some(handle) = tracker.as_mut() {
        handle.tracker.on_permission_result(granted != 0);
    }
}

/// Drain queued notices as a JSON array of `{kind, message}` objects.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - Returns a newly allocated string that must be freed with `fitness_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_take_notices(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &mut *tracker;
    let notices: Vec<serde_json::Value> = handle
        .tracker
        .take_notices()
        .into_iter()
        .map(|n| serde_json::json!({ "kind": n, "message": n.message() }))
        .collect();

    string_to_cstr(&serde_json::Value::Array(notices).to_string())
}

/// Latest display frame as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - Returns a newly allocated string that must be freed with `fitness_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_frame(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &*tracker;
    frame_to_cstr(handle.tracker.last_frame())
}

/// Save session offsets to JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - Returns a newly allocated string that must be freed with `fitness_free_string`.
/// - Returns NULL on error; call `fitness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_save_state(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    let handle = &*tracker;

    match handle.tracker.state_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load session offsets from JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `fitness_tracker_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `fitness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fitness_tracker_load_state(
    tracker: *mut TrackerHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }

    let handle = &mut *tracker;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.tracker.load_state_json(&json_str) {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by tracker functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a tracker function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fitness_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next tracker call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn fitness_last_error() -> *const c_char {
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
pub unsafe extern "C" fn fitness_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        fitness_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_tracker_lifecycle() {
        unsafe {
            let tracker = fitness_tracker_new(ptr::null(), ptr::null(), 1);
            assert!(!tracker.is_null());
            assert_eq!(fitness_tracker_resume(tracker), 1);

            let frame = take_string(fitness_tracker_on_step_count(tracker, 1000.0, 1_705_305_600_000));
            let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(frame["steps"], 1000);
            assert_eq!(frame["calories_text"], "Calories: 28.0 kcal");

            let reset = take_string(fitness_tracker_reset(tracker));
            assert!(reset.contains("\"steps\":0"));

            assert_eq!(fitness_tracker_pause(tracker), 0);
            assert!(fitness_tracker_on_step_count(tracker, 1200.0, 0).is_null());
            assert!(fitness_last_error().is_null());

            let state = take_string(fitness_tracker_save_state(tracker));
            assert!(state.contains("previousTotalSteps"));

            let tracker2 = fitness_tracker_new(ptr::null(), ptr::null(), 1);
            let state_c = CString::new(state).unwrap();
            assert_eq!(fitness_tracker_load_state(tracker2, state_c.as_ptr()), 0);

            fitness_tracker_free(tracker);
            fitness_tracker_free(tracker2);
        }
    }

    #[test]
    fn test_ffi_notices() {
        unsafe {
            let tracker = fitness_tracker_new(ptr::null(), ptr::null(), 0);
            assert_eq!(fitness_tracker_resume(tracker), 0);
            fitness_tracker_permission_result(tracker, 0);

            let notices = take_string(fitness_tracker_take_notices(tracker));
            let notices: serde_json::Value = serde_json::from_str(&notices).unwrap();
            assert_eq!(notices[0]["kind"], "no_step_sensor");
            assert_eq!(notices[1]["kind"], "permission_denied");

            fitness_tracker_free(tracker);
        }
    }

    #[test]
    fn test_ffi_config_and_frame() {
        unsafe {
            let config = CString::new(r#"{"widgets": {"progress": true}}"#).unwrap();
            let tracker = fitness_tracker_new(config.as_ptr(), ptr::null(), 1);
            assert!(!tracker.is_null());

            let frame = take_string(fitness_tracker_frame(tracker));
            let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(frame["cause"], "startup");
            assert_eq!(frame["progress_percent"], 0);

            fitness_tracker_free(tracker);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let config = CString::new(r#"{"daily_goal": 0}"#).unwrap();
            let tracker = fitness_tracker_new(config.as_ptr(), ptr::null(), 1);
            assert!(tracker.is_null());

            let error = fitness_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("daily_goal"));

            let config = CString::new(r#"{"history_capacity": 1000000000000000}"#).unwrap();
            assert!(fitness_tracker_new(config.as_ptr(), ptr::null(), 1).is_null());
            let error_str = CStr::from_ptr(fitness_last_error()).to_str().unwrap();
            assert!(error_str.contains("history_capacity"));

            let tracker = fitness_tracker_new(ptr::null(), ptr::null(), 1);
            fitness_tracker_resume(tracker);
            assert!(fitness_tracker_on_step_count(tracker, -3.0, 0).is_null());
            assert!(!fitness_last_error().is_null());
            fitness_tracker_free(tracker);

            assert!(fitness_tracker_reset(ptr::null_mut()).is_null());
            assert_eq!(fitness_tracker_pause(ptr::null_mut()), -1);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = fitness_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
