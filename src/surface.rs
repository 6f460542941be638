// ── Drawing-surface abstraction ───────────────────────────────────────────────
//
// The workspace model draws through these traits so it never touches a
// device context directly.  `platform::win32::gdi` provides the GDI
// implementation; the unit tests provide a recording one.

use crate::{
    error::Result,
    geometry::{Color, Rect, Size},
};

/// An owned offscreen surface: the backbuffer and the canvas are both one.
pub(crate) trait DrawingSurface {
    /// Current dimensions in device pixels.
    fn size(&self) -> Size;

    /// Clear the whole surface to `color`.
    fn fill_with_color(&mut self, color: Color) -> Result<()>;

    /// Reallocate at `size`.  Prior content is discarded and the old storage
    /// is released before the new storage is acquired.
    fn resize(&mut self, size: Size) -> Result<()>;

    /// Copy `src` from `source` into `dest` on this surface, scaling with a
    /// smoothing filter when the rectangles differ in size.  `dest` is not
    /// clipped; out-of-range coordinates are left to the platform.
    fn stretch_from(&mut self, dest: Rect, source: &Self, src: Rect) -> Result<()>;
}

/// Allocates surfaces compatible with some reference device.
pub(crate) trait SurfaceFactory {
    type Surface: DrawingSurface;

    fn create_surface(&mut self, size: Size) -> Result<Self::Surface>;
}
