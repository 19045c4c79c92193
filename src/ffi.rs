//! C-ABI FFI bindings for cross-language integration.
//!
//! The C surface takes a JSON document description and hands back the
//! rendered pages as JSON, so any language with a C FFI (C#, Python,
//! Node.js) can drive the engine.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::render::JsonFormat;

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct NotesetterResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `notesetter_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `notesetter_free_result`.
    pub error: *mut c_char,
}

impl NotesetterResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, NotesetterResult> {
    if ptr.is_null() {
        return Err(NotesetterResult::error(format!("{} cannot be null", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| NotesetterResult::error(format!("Invalid UTF-8 {}", what.to_lowercase())))
}

/// Render a JSON document description to JSON pages.
///
/// # Safety
///
/// The `json` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `notesetter_free_result`.
#[no_mangle]
pub unsafe extern "C" fn notesetter_render_json(
    json: *const c_char,
    pretty: bool,
) -> NotesetterResult {
    let json = match read_str(json, "Document") {
        Ok(s) => s,
        Err(result) => return result,
    };

    let format = if pretty {
        JsonFormat::Pretty
    } else {
        JsonFormat::Compact
    };

    match crate::render_json(json, format) {
        Ok(output) => NotesetterResult::success(output),
        Err(e) => NotesetterResult::error(e.to_string()),
    }
}

/// Validate a JSON document description without laying it out.
///
/// On success `data` holds a small JSON summary of the document.
///
/// # Safety
///
/// The `json` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `notesetter_free_result`.
#[no_mangle]
pub unsafe extern "C" fn notesetter_validate_json(json: *const c_char) -> NotesetterResult {
    let json = match read_str(json, "Document") {
        Ok(s) => s,
        Err(result) => return result,
    };

    match crate::parse_document(json) {
        Ok(doc) => {
            let summary = serde_json::json!({
                "valid": true,
                "title": doc.meta.title,
                "block_count": doc.block_count(),
            });
            NotesetterResult::success(summary.to_string())
        }
        Err(e) => NotesetterResult::error(e.to_string()),
    }
}

/// Free a result returned by any notesetter function.
///
/// # Safety
///
/// The `result` must have been returned by a notesetter function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn notesetter_free_result(result: NotesetterResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by notesetter.
///
/// # Safety
///
/// The `ptr` must have been allocated by notesetter.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn notesetter_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the notesetter library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn notesetter_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
