// ── Geometry & colour value types ─────────────────────────────────────────────
//
// Plain value types shared by the workspace model and the GDI layer.
// No Win32 imports; usable from any module.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PancanvasError;

/// A position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Point {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Unpack a mouse-message `LPARAM`: signed x in the low word, signed y
    /// in the high word.  Coordinates go negative while the mouse is
    /// captured and outside the client area.
    pub(crate) const fn from_packed(raw: isize) -> Self {
        Self::new((raw & 0xFFFF) as u16 as i16 as i32, ((raw >> 16) & 0xFFFF) as u16 as i16 as i32)
    }
}

/// Width and height in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Size {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Size {
    pub(crate) const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Unpack a `WM_SIZE` `LPARAM`: unsigned width in the low word, unsigned
    /// height in the high word.
    pub(crate) const fn from_packed(raw: isize) -> Self {
        Self::new((raw & 0xFFFF) as i32, ((raw >> 16) & 0xFFFF) as i32)
    }
}

/// An axis-aligned rectangle, right/bottom exclusive, same layout as `RECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Rect {
    pub(crate) left: i32,
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
}

impl Rect {
    pub(crate) const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// The rectangle anchored at the origin with the given size.
    pub(crate) const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub(crate) const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub(crate) const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub(crate) const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Move all four edges by `(dx, dy)`.  Size is preserved.
    ///
    /// The origin stops where the far edge would leave the `i32` range, so
    /// the rectangle keeps its size however far it is dragged.
    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        let size = self.size();
        self.left = shift_origin(self.left, dx, size.width);
        self.top = shift_origin(self.top, dy, size.height);
        self.right = self.left + size.width;
        self.bottom = self.top + size.height;
    }
}

/// `origin + delta`, clamped so that `origin + extent` still fits in `i32`.
fn shift_origin(origin: i32, delta: i32, extent: i32) -> i32 {
    let extent = i64::from(extent);
    let lo = i64::from(i32::MIN).max(i64::from(i32::MIN) - extent);
    let hi = i64::from(i32::MAX).min(i64::from(i32::MAX) - extent);
    // Within i32 by construction of lo/hi.
    (i64::from(origin) + i64::from(delta)).clamp(lo, hi) as i32
}

// ── Colour ────────────────────────────────────────────────────────────────────

/// A 24-bit RGB colour.
///
/// Serialised as `"#RRGGBB"` in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct Color {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Color {
    pub(crate) const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// GDI `COLORREF` layout: `0x00BBGGRR`.
    pub(crate) const fn to_colorref(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = PancanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PancanvasError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = PancanvasError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_keeps_size() {
        let mut r = Rect::new(0, 0, 1024, 1024);
        r.translate(50, 30);
        assert_eq!(r, Rect::new(50, 30, 1074, 1054));
        r.translate(-80, -10);
        assert_eq!(r, Rect::new(-30, 20, 994, 1044));
        assert_eq!(r.size(), Size::new(1024, 1024));
    }

    #[test]
    fn translate_keeps_size_at_extremes() {
        let mut r = Rect::new(0, 0, 1024, 1024);
        r.translate(i32::MAX, i32::MIN);
        assert_eq!(r, Rect::new(i32::MAX - 1024, i32::MIN, i32::MAX, i32::MIN + 1024));
        assert_eq!(r.size(), Size::new(1024, 1024));

        r.translate(i32::MAX, i32::MIN);
        assert_eq!(r.size(), Size::new(1024, 1024));

        // Dragging back moves from the clamped origin.
        r.translate(-(i32::MAX - 1024), 0);
        assert_eq!(r.left, 0);
        assert_eq!(r.size(), Size::new(1024, 1024));
    }

    #[test]
    fn from_size_is_origin_anchored() {
        assert_eq!(Rect::from_size(Size::new(800, 600)), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn packed_point_is_sign_extended() {
        assert_eq!(Point::from_packed(0x0082_0096), Point::new(150, 130));
        // x = -10, y = -2 as produced by GET_X_LPARAM / GET_Y_LPARAM.
        assert_eq!(Point::from_packed(0xFFFE_FFF6_u32 as isize), Point::new(-10, -2));
    }

    #[test]
    fn packed_size_is_unsigned() {
        assert_eq!(Size::from_packed(0x0258_0320), Size::new(800, 600));
        assert_eq!(Size::from_packed(0xFFFF_FFFF_u32 as isize), Size::new(65535, 65535));
        assert_eq!(Size::from_packed(0), Size::new(0, 0));
    }

    #[test]
    fn colorref_is_bgr() {
        assert_eq!(Color::rgb(200, 255, 200).to_colorref(), 0x00C8_FFC8);
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_colorref(), 0x0056_3412);
    }

    #[test]
    fn color_parses_hex() {
        assert_eq!("#C8FFC8".parse::<Color>().ok(), Some(Color::rgb(200, 255, 200)));
        assert_eq!("#0a0B0c".parse::<Color>().ok(), Some(Color::rgb(10, 11, 12)));
    }

    #[test]
    fn color_rejects_malformed() {
        for bad in ["C8FFC8", "#C8FFC", "#C8FFC8FF", "#GGGGGG", "", "#"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn color_display_is_upper_hex() {
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#FF0010");
    }
}
