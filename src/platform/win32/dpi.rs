#![allow(unsafe_code)]

use windows::Win32::UI::HiDpi::{
    GetDpiForSystem, SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

use crate::geometry::Size;

pub(crate) const BASE_DPI: u32 = 96;

/// Scale a size given at 96 DPI to `dpi`, saturating at the `i32` range.
pub(crate) fn scale(size: Size, dpi: u32) -> Size {
    let s = |px: i32| {
        let scaled = i64::from(px) * i64::from(dpi) / i64::from(BASE_DPI);
        scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    };
    Size::new(s(size.width), s(size.height))
}

/// Opt into Per-Monitor v2 DPI awareness so GDI blits are not bitmap-scaled
/// by the system.  MUST be called before any window is created.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    // Fails harmlessly when awareness was already set by a manifest.
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        log::debug!("DPI awareness not changed: {e}");
    }
}

/// Primary-monitor DPI, used to size the window before it exists.
pub(crate) fn system_dpi() -> u32 {
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    match unsafe { GetDpiForSystem() } {
        0 => BASE_DPI,
        v => v,
    }
}
