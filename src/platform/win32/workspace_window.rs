// ── Workspace window ──────────────────────────────────────────────────────────
//
// The concrete window: decodes Win32 messages into `Workspace` calls and
// carries out the returned effects (capture, invalidation, presentation).
//
//   WM_CREATE          backbuffer at client size, canvas 1024×1024
//   WM_PAINT           compose into the backbuffer, blit to the window
//   WM_ERASEBKGND      suppressed; the backbuffer covers every pixel
//   WM_SIZE            backbuffer follows the client size
//   WM_LBUTTONDOWN     capture the mouse, start dragging
//   WM_MOUSEMOVE       pan while dragging
//   WM_LBUTTONUP       end dragging, release capture
//   WM_CAPTURECHANGED  capture taken away: end dragging
//   WM_DESTROY         release the canvas and the backbuffer

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{InvalidateRect, HDC},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::{ReleaseCapture, SetCapture},
            WindowsAndMessaging::{
                AdjustWindowRectEx, GetClientRect, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, HMENU,
                SW_SHOW, WINDOW_EX_STYLE, WNDCLASS_STYLES, WS_OVERLAPPEDWINDOW,
            },
        },
    },
};

use super::{
    dpi,
    gdi::{GdiFactory, GdiSurface, WindowDc},
    window::{dispatch_hooks, run_message_loop, CreateParams, Window, WindowProc},
};
use crate::{
    config::Config,
    error::{PancanvasError, Result},
    geometry::{Point, Size},
    input::{self, Input},
    surface::DrawingSurface,
    workspace::{Effect, Palette, Workspace},
};

/// Atom name of the workspace window class.
const CLASS_NAME: &str = "PancanvasWorkspace";

// ── Launcher ──────────────────────────────────────────────────────────────────

/// Create the workspace window from `config`, show it, and drive the message
/// loop until it is closed.
pub(crate) fn run(config: &Config) -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::init();

    // SAFETY: a null module name returns the .exe's own HMODULE, valid for
    // the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(PancanvasError::from)?;
    let instance = HINSTANCE(hmodule.0);

    let client = dpi::scale(config.client_size(), dpi::system_dpi());
    let params = CreateParams {
        ex_style: WINDOW_EX_STYLE(0),
        class_name: CLASS_NAME,
        title: &config.title,
        style: WS_OVERLAPPEDWINDOW,
        position: Point::new(CW_USEDEFAULT, CW_USEDEFAULT),
        size: outer_size(client),
        parent: HWND::default(),
        menu: HMENU::default(),
        instance,
    };

    let window = Window::create(&params, WorkspaceWindow::new(config.palette()))?;
    window.show(SW_SHOW);
    window.update();

    log::info!("window {:?} shown", window.hwnd().0);
    #[cfg(debug_assertions)]
    log::debug!("visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    run_message_loop()
}

/// Outer window size for a `WS_OVERLAPPEDWINDOW` with the given client area.
fn outer_size(client: Size) -> Size {
    let mut rect = RECT {
        left: 0,
        top: 0,
        right: client.width,
        bottom: client.height,
    };
    // SAFETY: rect is a valid in/out pointer.  On failure the client size is
    // used as is.
    match unsafe { AdjustWindowRectEx(&mut rect, WS_OVERLAPPEDWINDOW, false, WINDOW_EX_STYLE(0)) } {
        Ok(()) => Size::new(rect.right - rect.left, rect.bottom - rect.top),
        Err(_) => client,
    }
}

fn client_size(hwnd: HWND) -> Result<Size> {
    let mut rect = RECT::default();
    // SAFETY: hwnd is our window; rect is a valid out-pointer.
    unsafe { GetClientRect(hwnd, &mut rect) }.map_err(PancanvasError::from)?;
    Ok(Size::new(rect.right - rect.left, rect.bottom - rect.top))
}

// ── WorkspaceWindow ───────────────────────────────────────────────────────────

pub(crate) struct WorkspaceWindow {
    hwnd: HWND,
    workspace: Workspace<GdiSurface>,
}

impl WorkspaceWindow {
    pub(crate) fn new(palette: Palette) -> Self {
        Self {
            hwnd: HWND::default(),
            workspace: Workspace::new(palette),
        }
    }

    fn on_create(&mut self, hwnd: HWND) -> Result<()> {
        self.hwnd = hwnd;
        let client = client_size(hwnd)?;
        let dc = WindowDc::acquire(hwnd)?;
        self.workspace.create(&mut GdiFactory::new(&dc), client)?;
        log::info!(
            "workspace ready: client {}x{}, canvas {:?}",
            client.width,
            client.height,
            self.workspace.canvas().map(DrawingSurface::size)
        );
        Ok(())
    }

    fn on_size(&mut self, size: Size) {
        if let Err(e) = self.workspace.resize(size) {
            log::error!("backbuffer resize to {}x{} failed: {e}", size.width, size.height);
        }
    }

    fn on_destroy(&mut self) {
        let released = self.workspace.destroy();
        log::info!(
            "workspace {:?}; canvas released: {released}",
            self.workspace.lifecycle()
        );
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::Nothing => {}
            Effect::BeginCapture => {
                // SAFETY: hwnd is our window, on this thread, with the button
                // down; SetCapture returns the previous capture owner, unused.
                unsafe { SetCapture(self.hwnd) };
            }
            Effect::EndCapture => {
                // SAFETY: releasing capture is always allowed; fails only if
                // we did not hold it, which is harmless.
                let _ = unsafe { ReleaseCapture() };
            }
            Effect::Repaint => {
                // SAFETY: hwnd is our window.  None invalidates the whole
                // client area; no erase, the backbuffer covers it.
                let _ = unsafe { InvalidateRect(self.hwnd, None, false) };
            }
        }
    }
}

impl WindowProc for WorkspaceWindow {
    fn class_style(&self) -> WNDCLASS_STYLES {
        CS_HREDRAW | CS_VREDRAW
    }

    fn suppress_erase(&self) -> bool {
        true
    }

    fn handle_message(
        &mut self,
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> Option<LRESULT> {
        let Some(input) = input::decode(msg, wparam.0, lparam.0, hwnd.0 as isize) else {
            return dispatch_hooks(self, hwnd, msg, wparam, lparam);
        };

        match input {
            Input::Create => match self.on_create(hwnd) {
                Ok(()) => return Some(LRESULT(0)),
                Err(e) => {
                    log::error!("workspace creation failed: {e}");
                    // -1 makes CreateWindowExW fail.
                    return Some(LRESULT(-1));
                }
            },

            // The backbuffer covers every pixel.
            Input::EraseBackground => return Some(LRESULT(1)),

            Input::Resize(size) => self.on_size(size),

            // Zoom is not implemented; the wheel is consumed.
            Input::Wheel => {}

            Input::Press(pos) => {
                let effect = self.workspace.press(pos);
                self.apply(effect);
            }

            Input::Motion { pos, left_button } => {
                let effect = self.workspace.motion(pos, left_button);
                if effect == Effect::Repaint {
                    log::trace!("pan -> {:?}", self.workspace.blt_rect());
                }
                self.apply(effect);
            }

            Input::Release => {
                let effect = self.workspace.release();
                self.apply(effect);
            }

            Input::CaptureChanged { to_self } => {
                if !to_self && self.workspace.is_dragging() {
                    log::debug!("mouse capture lost mid-drag");
                    self.workspace.capture_lost();
                }
            }

            Input::Destroy => self.on_destroy(),
        }
        Some(LRESULT(0))
    }

    fn on_paint(&mut self, hdc: HDC) {
        match self.workspace.compose() {
            Ok(Some(backbuffer)) => {
                if let Err(e) = backbuffer.present(hdc) {
                    log::error!("present failed: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => log::error!("composing frame failed: {e}"),
        }
    }
}
