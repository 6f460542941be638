// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Pancanvas return `error::Result<T>`.  No panics
// in production paths; startup errors surface as a modal dialog, runtime
// errors inside the window procedure are logged.

use thiserror::Error;

/// Every error that Pancanvas can produce.
#[derive(Debug, Error)]
pub enum PancanvasError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// Reading the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for `Config`.
    #[error("malformed settings: {0}")]
    Config(#[from] serde_json::Error),

    /// A colour string that is not of the form `#RRGGBB`.
    #[error("invalid colour {0:?} (expected \"#RRGGBB\")")]
    InvalidColor(String),
}

// Convert a windows-crate error (HRESULT) directly so that `?` can be used on
// `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for PancanvasError {
    fn from(e: windows::core::Error) -> Self {
        // Win32 errors appear as 0x8007xxxx HRESULTs; reinterpret the bits.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PancanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_display_is_hex() {
        let e = PancanvasError::Win32 { function: "CreateCompatibleDC", code: 8 };
        assert_eq!(e.to_string(), "CreateCompatibleDC failed (error 0x00000008)");
    }

    #[test]
    fn io_error_converts_and_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: PancanvasError = io.into();
        assert!(matches!(e, PancanvasError::Io(_)));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn invalid_color_display_quotes_input() {
        let e = PancanvasError::InvalidColor("green".to_owned());
        assert_eq!(e.to_string(), "invalid colour \"green\" (expected \"#RRGGBB\")");
    }
}
