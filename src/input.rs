// ── Window message decoding ───────────────────────────────────────────────────
//
// Turns the raw (message, WPARAM, LPARAM) triple received by the workspace
// window into a typed `Input`.  Kept free of the `windows` crate so the
// unpacking rules are unit-tested on every platform; the numeric message
// ids are checked against the crate's constants under `cfg(windows)`.

use crate::geometry::{Point, Size};

pub(crate) const WM_CREATE: u32 = 0x0001;
pub(crate) const WM_DESTROY: u32 = 0x0002;
pub(crate) const WM_SIZE: u32 = 0x0005;
pub(crate) const WM_ERASEBKGND: u32 = 0x0014;
pub(crate) const WM_MOUSEMOVE: u32 = 0x0200;
pub(crate) const WM_LBUTTONDOWN: u32 = 0x0201;
pub(crate) const WM_LBUTTONUP: u32 = 0x0202;
pub(crate) const WM_MOUSEWHEEL: u32 = 0x020A;
pub(crate) const WM_CAPTURECHANGED: u32 = 0x0215;

/// `MK_LBUTTON` bit of the mouse-message `WPARAM`.
pub(crate) const MK_LBUTTON: usize = 0x0001;

/// A workspace-relevant window message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    Create,
    EraseBackground,
    /// New client size.
    Resize(Size),
    /// Left button pressed at a client position.
    Press(Point),
    Motion { pos: Point, left_button: bool },
    Release,
    Wheel,
    /// Mouse capture moved; `to_self` when this window is the new owner.
    CaptureChanged { to_self: bool },
    Destroy,
}

/// Decode a message sent to the window `own`.  Returns `None` for messages
/// the workspace leaves to the default hooks.
pub(crate) fn decode(msg: u32, wparam: usize, lparam: isize, own: isize) -> Option<Input> {
    let input = match msg {
        WM_CREATE => Input::Create,
        WM_DESTROY => Input::Destroy,
        WM_SIZE => Input::Resize(Size::from_packed(lparam)),
        WM_ERASEBKGND => Input::EraseBackground,
        WM_MOUSEMOVE => Input::Motion {
            pos: Point::from_packed(lparam),
            left_button: wparam & MK_LBUTTON != 0,
        },
        WM_LBUTTONDOWN => Input::Press(Point::from_packed(lparam)),
        WM_LBUTTONUP => Input::Release,
        WM_MOUSEWHEEL => Input::Wheel,
        // lparam is the window gaining capture, or null.
        WM_CAPTURECHANGED => Input::CaptureChanged { to_self: lparam == own },
        _ => return None,
    };
    Some(input)
}
