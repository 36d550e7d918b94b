//! C-ABI FFI bindings for cross-language integration.
//!
//! This module exposes HTML to RTF conversion to C, C#, Python and other
//! languages that can call into a shared library.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::{Html2Rtf, RenderOptions};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct Html2RtfResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Freed by `html2rtf_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Freed by `html2rtf_free_result`.
    pub error: *mut c_char,
}

impl Html2RtfResult {
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

impl From<crate::Result<String>> for Html2RtfResult {
    fn from(result: crate::Result<String>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

unsafe fn read_str<'a>(value: *const c_char, what: &str) -> Result<&'a str, Html2RtfResult> {
    if value.is_null() {
        return Err(Html2RtfResult::error(format!("{} cannot be null", what)));
    }
    CStr::from_ptr(value)
        .to_str()
        .map_err(|_| Html2RtfResult::error(format!("Invalid UTF-8 {}", what.to_lowercase())))
}

fn converter(protected: bool) -> Html2Rtf {
    Html2Rtf::new().with_options(RenderOptions::new().with_protection(protected))
}

/// Convert an HTML string to an RTF document.
///
/// # Safety
///
/// The `html` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2rtf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2rtf_convert(html: *const c_char, protected: bool) -> Html2RtfResult {
    let html = match read_str(html, "HTML") {
        Ok(s) => s,
        Err(result) => return result,
    };

    converter(protected).convert(html).map(|r| r.content).into()
}

/// Convert an HTML file to an RTF document. Relative image references
/// resolve against the file's directory.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2rtf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2rtf_convert_file(
    path: *const c_char,
    protected: bool,
) -> Html2RtfResult {
    let path = match read_str(path, "Path") {
        Ok(s) => s,
        Err(result) => return result,
    };

    converter(protected)
        .convert_file(Path::new(path))
        .map(|r| r.content)
        .into()
}

/// Convert an HTML string and return the conversion counters as JSON.
///
/// # Safety
///
/// The `html` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `html2rtf_free_result`.
#[no_mangle]
pub unsafe extern "C" fn html2rtf_get_stats(html: *const c_char) -> Html2RtfResult {
    let html = match read_str(html, "HTML") {
        Ok(s) => s,
        Err(result) => return result,
    };

    converter(false)
        .convert(html)
        .and_then(|r| {
            serde_json::to_string(&r.stats).map_err(|e| crate::Error::Other(e.to_string()))
        })
        .into()
}

/// Free a result returned by any html2rtf function.
///
/// # Safety
///
/// The `result` must have been returned by an html2rtf function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn html2rtf_free_result(result: Html2RtfResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Get the version of the html2rtf library.
///
/// The returned string is statically allocated and must not be freed.
#[no_mangle]
pub extern "C" fn html2rtf_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
