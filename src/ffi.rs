//! FFI bindings for Synheart Screen
//!
//! This module provides C-compatible functions for driving a screening from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `screen_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use crate::config::ScreeningConfig;
use crate::error::ScreeningError;
use crate::pipeline::evaluate_json;
use crate::session::ScreeningSession;

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

/// Narrow C integers to a question index / response value
fn to_ordinal(raw: i32) -> Option<u8> {
    u8::try_from(raw).ok()
}

/// Map a unit result to the C status convention (0 ok, -1 error)
fn status(result: Result<(), ScreeningError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Evaluate a complete JSON answer sheet and return the result JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string holding an object keyed
///   by question index, e.g. `{"1": 3, "2": 2, ...}`.
/// - Returns a newly allocated string that must be freed with `screen_free_string`.
/// - Returns NULL on error; call `screen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screen_evaluate_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match evaluate_json(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the canonical question catalog as JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `screen_free_string`.
/// - Returns NULL on error; call `screen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screen_catalog_json() -> *mut c_char {
    clear_last_error();

    match ScreeningConfig::default().catalog().to_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session API
// ============================================================================

/// Opaque handle to a ScreeningSession
pub struct ScreenSessionHandle {
    session: ScreeningSession,
}

/// Start a session with the canonical EPDS configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated session.
/// - Must be freed with `screen_session_free`.
#[no_mangle]
pub unsafe extern "C" fn screen_session_new() -> *mut ScreenSessionHandle {
    clear_last_error();

    let handle = Box::new(ScreenSessionHandle {
        session: ScreeningSession::default(),
    });
    Box::into_raw(handle)
}

/// Start a session with a JSON configuration (catalog + recommendations).
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Must be freed with `screen_session_free`.
/// - Returns NULL on error; call `screen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screen_session_new_with_config(
    config_json: *const c_char,
) -> *mut ScreenSessionHandle {
    clear_last_error();

    let json_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    match ScreeningConfig::from_json(&json_str) {
        Ok(config) => {
            let handle = Box::new(ScreenSessionHandle {
                session: ScreeningSession::new(Arc::new(config)),
            });
            Box::into_raw(handle)
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a session.
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn screen_session_free(session: *mut ScreenSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Record an answer.
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - Returns 0 on success, -1 on error.
/// - On error, call `screen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screen_session_answer(
    session: *mut ScreenSessionHandle,
    index: i32,
    value: i32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    let handle = &mut *session;

    let (index, value) = match (to_ordinal(index), to_ordinal(value)) {
        (Some(i), Some(v)) => (i, v),
        _ => {
            set_last_error(&format!(
                "Response out of range: question {index} = {value} (expected question 1-10, value 0-3)"
            ));
            return -1;
        }
    };

    status(handle.session.answer(index, value))
}

/// Remove an answer.
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn screen_session_clear(session: *mut ScreenSessionHandle, index: i32) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    let handle = &mut *session;

    match to_ordinal(index) {
        Some(i) => status(handle.session.clear(i)),
        None => {
            set_last_error(&format!("Invalid question index: {index} (expected 1-10)"));
            -1
        }
    }
}

/// Completion fraction (0-1).
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - Returns -1.0 for a NULL session.
#[no_mangle]
pub unsafe extern "C" fn screen_session_progress(session: *const ScreenSessionHandle) -> f64 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1.0;
    }

    (*session).session.progress()
}

/// Live crisis check on the current answers.
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - Returns 1 if the crisis item is triggered, 0 if not, -1 for a NULL session.
#[no_mangle]
pub unsafe extern "C" fn screen_session_crisis_alert(session: *const ScreenSessionHandle) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    i32::from((*session).session.crisis_alert())
}

/// Finalize the session and return the result JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `screen_session_new*`.
/// - Returns a newly allocated string that must be freed with `screen_free_string`.
/// - Returns NULL on error (incomplete sheet, already finalized); call
///   `screen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screen_session_finalize(session: *mut ScreenSessionHandle) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }

    let handle = &mut *session;

    match handle
        .session
        .finalize()
        .and_then(|result| result.to_json().map_err(ScreeningError::from))
    {
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

/// Free a string returned by Screen functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Screen function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn screen_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Screen function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn screen_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Screen library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn screen_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_sheet_json() -> CString {
        CString::new(
            r#"{"1": 0, "2": 0, "3": 3, "4": 3, "5": 3, "6": 3, "7": 3, "8": 3, "9": 3, "10": 0}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_evaluate_json() {
        let json = complete_sheet_json();

        unsafe {
            let result = screen_evaluate_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let payload: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(payload["totalScore"], 27);
            assert_eq!(payload["riskLevel"], "HIGH");

            screen_free_string(result);
        }
    }

    #[test]
    fn test_ffi_catalog_json() {
        unsafe {
            let catalog = screen_catalog_json();
            assert!(!catalog.is_null());

            let catalog_str = CStr::from_ptr(catalog).to_str().unwrap();
            let questions: serde_json::Value = serde_json::from_str(catalog_str).unwrap();
            assert_eq!(questions.as_array().unwrap().len(), 10);
            assert_eq!(questions[9]["crisis_item"], true);

            screen_free_string(catalog);
        }
    }

    #[test]
    fn test_ffi_session_lifecycle() {
        unsafe {
            let session = screen_session_new();
            assert!(!session.is_null());
            assert_eq!(screen_session_progress(session), 0.0);

            for index in 1..=9 {
                assert_eq!(screen_session_answer(session, index, 0), 0);
            }
            assert_eq!(screen_session_crisis_alert(session), 0);

            // Incomplete sheet cannot be finalized
            assert!(screen_session_finalize(session).is_null());
            assert!(!screen_last_error().is_null());

            assert_eq!(screen_session_answer(session, 10, 2), 0);
            assert_eq!(screen_session_crisis_alert(session), 1);
            assert_eq!(screen_session_progress(session), 1.0);

            let result = screen_session_finalize(session);
            assert!(!result.is_null());
            let payload: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(payload["riskLevel"], "CRISIS");
            assert_eq!(payload["requiresImmediateAttention"], true);
            screen_free_string(result);

            // Terminal state rejects further work
            assert_eq!(screen_session_answer(session, 1, 1), -1);
            assert!(screen_session_finalize(session).is_null());

            screen_session_free(session);
        }
    }

    #[test]
    fn test_ffi_session_with_config() {
        let config = CString::new(ScreeningConfig::default().to_json().unwrap()).unwrap();
        let bad_config = CString::new(r#"{"catalog": []}"#).unwrap();

        unsafe {
            let session = screen_session_new_with_config(config.as_ptr());
            assert!(!session.is_null());
            assert_eq!(screen_session_answer(session, 3, 1), 0);
            assert_eq!(screen_session_clear(session, 3), 0);
            assert_eq!(screen_session_progress(session), 0.0);
            screen_session_free(session);

            assert!(screen_session_new_with_config(bad_config.as_ptr()).is_null());
            assert!(!screen_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let session = screen_session_new();

            assert_eq!(screen_session_answer(session, 11, 0), -1);
            assert_eq!(screen_session_answer(session, 1, -1), -1);
            assert_eq!(screen_session_answer(session, 1, 4), -1);
            let error_str = CStr::from_ptr(screen_last_error()).to_str().unwrap();
            assert!(error_str.contains("out of range"));

            assert_eq!(screen_session_answer(ptr::null_mut(), 1, 0), -1);
            assert_eq!(screen_session_progress(ptr::null()), -1.0);

            let invalid_json = CString::new("not json").unwrap();
            assert!(screen_evaluate_json(invalid_json.as_ptr()).is_null());
            let error_str = CStr::from_ptr(screen_last_error()).to_str().unwrap();
            assert!(!error_str.is_empty());

            screen_session_free(session);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = screen_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
