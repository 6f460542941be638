// ── GDI drawing surfaces ──────────────────────────────────────────────────────
//
// The GDI side of `surface::DrawingSurface`: an offscreen memory DC with a
// compatible bitmap selected into it.  The backbuffer and the canvas are both
// a `GdiSurface`.
//
// Ownership: every GDI object created here is owned by exactly one RAII value
// and released in its `Drop`.
//   • `WindowDc`     – GetDC / ReleaseDC
//   • `PaintSession` – BeginPaint / EndPaint
//   • `GdiSurface`   – CreateCompatibleDC + CreateCompatibleBitmap /
//                      SelectObject (restore) + DeleteObject + DeleteDC

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::{COLORREF, HWND, RECT},
    Graphics::Gdi::{
        BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreateSolidBrush,
        DeleteDC, DeleteObject, EndPaint, FillRect, GetDC, ReleaseDC, SelectObject,
        SetBrushOrgEx, SetStretchBltMode, StretchBlt, HBITMAP, HDC, HGDIOBJ, HALFTONE,
        PAINTSTRUCT, SRCCOPY,
    },
};

use super::window::last_error;
use crate::{
    error::{PancanvasError, Result},
    geometry::{Color, Rect, Size},
    surface::{DrawingSurface, SurfaceFactory},
};

// ── WindowDc ──────────────────────────────────────────────────────────────────

/// A device context borrowed from a window with `GetDC`.
///
/// `HWND::default()` yields the screen DC.
pub(crate) struct WindowDc {
    hwnd: HWND,
    hdc: HDC,
}

impl WindowDc {
    pub(crate) fn acquire(hwnd: HWND) -> Result<Self> {
        // SAFETY: GetDC accepts any window handle owned by this thread, or
        // null for the screen.  The DC is released exactly once in Drop.
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_invalid() {
            return Err(last_error("GetDC"));
        }
        Ok(Self { hwnd, hdc })
    }

    pub(crate) fn hdc(&self) -> HDC {
        self.hdc
    }
}

impl Drop for WindowDc {
    fn drop(&mut self) {
        // SAFETY: hdc came from GetDC(hwnd) and has not been released.
        unsafe {
            ReleaseDC(self.hwnd, self.hdc);
        }
    }
}

// ── PaintSession ──────────────────────────────────────────────────────────────

/// One `BeginPaint` / `EndPaint` bracket for WM_PAINT.
pub(crate) struct PaintSession {
    hwnd: HWND,
    ps: PAINTSTRUCT,
}

impl PaintSession {
    pub(crate) fn begin(hwnd: HWND) -> Self {
        let mut ps = PAINTSTRUCT::default();
        // SAFETY: hwnd is the window receiving WM_PAINT; ps is a valid
        // out-pointer.  EndPaint is always paired in Drop, even if the
        // returned DC is null, so the update region is validated.
        unsafe {
            BeginPaint(hwnd, &mut ps);
        }
        Self { hwnd, ps }
    }

    /// The display DC clipped to the update region.  May be invalid if
    /// `BeginPaint` failed.
    pub(crate) fn hdc(&self) -> HDC {
        self.ps.hdc
    }
}

impl Drop for PaintSession {
    fn drop(&mut self) {
        // SAFETY: ps was filled in by BeginPaint for this same hwnd.
        unsafe {
            let _ = EndPaint(self.hwnd, &self.ps);
        }
    }
}

// ── GdiSurface ────────────────────────────────────────────────────────────────

/// An offscreen bitmap and the memory DC it is selected into.
pub(crate) struct GdiSurface {
    dc: HDC,
    bitmap: HBITMAP,
    /// The 1×1 stock bitmap the DC came with; restored before deletion.
    stock: HGDIOBJ,
    size: Size,
}

impl GdiSurface {
    /// Allocate a surface of `size` compatible with `reference`.
    pub(crate) fn init(reference: HDC, size: Size) -> Result<Self> {
        // SAFETY: reference is a live DC owned by the caller for this call.
        let dc = unsafe { CreateCompatibleDC(reference) };
        if dc.is_invalid() {
            return Err(last_error("CreateCompatibleDC"));
        }

        let mut surface = Self {
            dc,
            bitmap: HBITMAP::default(),
            stock: HGDIOBJ::default(),
            size: Size::default(),
        };
        // On failure `surface` is dropped here, deleting the DC.
        surface.allocate(reference, size)?;
        Ok(surface)
    }

    /// The memory DC, for use as a blit source or destination.
    pub(crate) fn dc(&self) -> HDC {
        self.dc
    }

    /// Copy the whole surface 1:1 onto `target` at the origin.
    pub(crate) fn present(&self, target: HDC) -> Result<()> {
        // SAFETY: target is a live paint DC; self.dc holds a selected bitmap
        // of self.size (or the stock 1×1 after a failed resize).
        unsafe {
            BitBlt(
                target,
                0,
                0,
                self.size.width,
                self.size.height,
                self.dc,
                0,
                0,
                SRCCOPY,
            )
        }
        .map_err(|e| PancanvasError::Win32 {
            function: "BitBlt",
            code: e.code().0 as u32,
        })
    }

    /// Release the current bitmap (if any), then create and select a new one.
    fn allocate(&mut self, reference: HDC, size: Size) -> Result<()> {
        self.release_bitmap();

        // SAFETY: reference is a live colour DC.  Using the memory DC here
        // instead would produce a monochrome bitmap.
        let bitmap = unsafe { CreateCompatibleBitmap(reference, size.width, size.height) };
        if bitmap.is_invalid() {
            return Err(last_error("CreateCompatibleBitmap"));
        }

        // SAFETY: self.dc is our memory DC and bitmap is not selected anywhere
        // else.  The previously selected object is the stock bitmap (or our
        // own bitmap, already deselected by release_bitmap above).
        let previous = unsafe { SelectObject(self.dc, HGDIOBJ::from(bitmap)) };
        if self.stock.is_invalid() {
            self.stock = previous;
        }
        self.bitmap = bitmap;
        self.size = size;
        Ok(())
    }

    fn release_bitmap(&mut self) {
        if self.bitmap.is_invalid() {
            return;
        }
        // SAFETY: the stock object is re-selected first so the bitmap is no
        // longer in use when it is deleted.
        unsafe {
            SelectObject(self.dc, self.stock);
            let _ = DeleteObject(HGDIOBJ::from(self.bitmap));
        }
        self.bitmap = HBITMAP::default();
        self.size = Size::default();
    }
}

impl DrawingSurface for GdiSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn fill_with_color(&mut self, color: Color) -> Result<()> {
        // SAFETY: CreateSolidBrush has no preconditions; the brush is deleted
        // below after its single use.
        let brush = unsafe { CreateSolidBrush(COLORREF(color.to_colorref())) };
        if brush.is_invalid() {
            return Err(last_error("CreateSolidBrush"));
        }

        let rect = RECT {
            left: 0,
            top: 0,
            right: self.size.width,
            bottom: self.size.height,
        };
        // SAFETY: self.dc is a live memory DC; rect and brush outlive the call.
        unsafe {
            FillRect(self.dc, &rect, brush);
            let _ = DeleteObject(HGDIOBJ::from(brush));
        }
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<()> {
        // The memory DC is monochrome, so the new bitmap must be made
        // compatible with the screen instead.
        let screen = WindowDc::acquire(HWND::default())?;
        self.allocate(screen.hdc(), size)
    }

    fn stretch_from(&mut self, dest: Rect, source: &Self, src: Rect) -> Result<()> {
        // SAFETY: both DCs are live memory DCs owned by their surfaces.
        // Coordinates are passed through unclipped; GDI clips to the bitmap.
        let ok = unsafe {
            SetStretchBltMode(self.dc, HALFTONE);
            // HALFTONE requires the brush origin to be reset afterwards.
            let _ = SetBrushOrgEx(self.dc, 0, 0, None);
            StretchBlt(
                self.dc,
                dest.left,
                dest.top,
                dest.width(),
                dest.height(),
                source.dc(),
                src.left,
                src.top,
                src.width(),
                src.height(),
                SRCCOPY,
            )
        };
        if !ok.as_bool() {
            return Err(last_error("StretchBlt"));
        }
        Ok(())
    }
}

impl Drop for GdiSurface {
    fn drop(&mut self) {
        self.release_bitmap();
        // SAFETY: dc came from CreateCompatibleDC, has the stock bitmap
        // selected again, and is deleted exactly once.
        unsafe {
            let _ = DeleteDC(self.dc);
        }
    }
}

// ── GdiFactory ────────────────────────────────────────────────────────────────

/// Creates `GdiSurface`s compatible with one window's DC.
pub(crate) struct GdiFactory<'a> {
    reference: &'a WindowDc,
}

impl<'a> GdiFactory<'a> {
    pub(crate) fn new(reference: &'a WindowDc) -> Self {
        Self { reference }
    }
}

impl SurfaceFactory for GdiFactory<'_> {
    type Surface = GdiSurface;

    fn create_surface(&mut self, size: Size) -> Result<GdiSurface> {
        GdiSurface::init(self.reference.hdc(), size)
    }
}
