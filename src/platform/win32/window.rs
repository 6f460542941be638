// ── Window base ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register a window class, once per class name per process.
//   • Create a window bound to a `WindowProc` implementation.
//   • Route every message for that window to its instance through a single
//     process-wide window procedure.
//   • Run the Win32 message loop until the last window is gone.
//   • Expose a safe error-dialog helper for use by main().
//
// Instance routing: `Window::create` boxes the handler into a `Slot` and
// passes the pointer as the CreateWindowExW creation parameter.  The router
// stores it in GWLP_USERDATA on WM_NCCREATE and frees it on WM_NCDESTROY.

#![allow(unsafe_code)]

use std::{cell::{Cell, RefCell}, ffi::c_void};

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{UpdateWindow, HBRUSH, HDC},
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, GetWindowLongPtrW,
            LoadCursorW, LoadIconW, MessageBoxW, PostQuitMessage, RegisterClassExW,
            SetWindowLongPtrW, ShowWindow, TranslateMessage, CREATESTRUCTW, CS_HREDRAW,
            CS_VREDRAW, GWLP_USERDATA, HMENU, IDC_ARROW, IDI_APPLICATION, MB_ICONERROR, MB_OK,
            MSG, SHOW_WINDOW_CMD, WINDOW_EX_STYLE, WINDOW_STYLE, WM_KEYDOWN, WM_NCCREATE,
            WM_ERASEBKGND, WM_NCDESTROY, WM_PAINT, WNDCLASSEXW, WNDCLASS_STYLES,
        },
    },
};

use super::gdi::PaintSession;
use crate::{
    error::{PancanvasError, Result},
    geometry::{Point, Size},
    registry::WindowRegistry,
};

// ── Per-thread routing state ──────────────────────────────────────────────────

thread_local! {
    static REGISTRY: RefCell<WindowRegistry> = RefCell::new(WindowRegistry::new());

    /// Set by the router when WM_NCCREATE takes ownership of a `Slot`.
    static ADOPTED: Cell<bool> = const { Cell::new(false) };
}

// ── WindowProc ────────────────────────────────────────────────────────────────

/// Per-window message handling.
///
/// `handle_message` returns `Some(result)` when the message was handled and
/// `None` to let `DefWindowProcW` process it.  The default implementation
/// only routes WM_PAINT and WM_KEYDOWN to the hooks below.
///
/// Implementations must not destroy their own window synchronously from
/// inside `handle_message`.
pub(crate) trait WindowProc {
    /// Class style used when this window's class is first registered.
    fn class_style(&self) -> WNDCLASS_STYLES {
        CS_HREDRAW | CS_VREDRAW
    }

    /// Answer WM_ERASEBKGND with 1 even when it arrives while the handler is
    /// busy (BeginPaint sends it from inside WM_PAINT).  Read once at
    /// creation.
    fn suppress_erase(&self) -> bool {
        false
    }

    fn handle_message(
        &mut self,
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> Option<LRESULT> {
        dispatch_hooks(self, hwnd, msg, wparam, lparam)
    }

    /// Draw into the paint DC.  Called between BeginPaint and EndPaint.
    fn on_paint(&mut self, _hdc: HDC) {}

    fn on_key_down(&mut self, _vkey: WPARAM, _info: LPARAM) {}
}

/// Route WM_PAINT and WM_KEYDOWN to the `WindowProc` hooks.
///
/// Overriding implementations call this for messages they do not handle
/// themselves.
pub(crate) fn dispatch_hooks<W: WindowProc + ?Sized>(
    window: &mut W,
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> Option<LRESULT> {
    match msg {
        WM_PAINT => {
            let session = PaintSession::begin(hwnd);
            if !session.hdc().is_invalid() {
                window.on_paint(session.hdc());
            }
            Some(LRESULT(0))
        }
        WM_KEYDOWN => {
            window.on_key_down(wparam, lparam);
            Some(LRESULT(0))
        }
        _ => None,
    }
}

struct Slot {
    handler: RefCell<Box<dyn WindowProc>>,
    suppress_erase: bool,
}

impl Slot {
    fn new(handler: Box<dyn WindowProc>) -> Self {
        Self {
            suppress_erase: handler.suppress_erase(),
            handler: RefCell::new(handler),
        }
    }

    /// Result for a message that arrives while the handler is already
    /// borrowed.  `None` defers to DefWindowProcW.
    fn busy_result(&self, msg: u32) -> Option<LRESULT> {
        (msg == WM_ERASEBKGND && self.suppress_erase).then_some(LRESULT(1))
    }
}

// ── Window ────────────────────────────────────────────────────────────────────

/// Everything CreateWindowExW needs apart from the handler.
pub(crate) struct CreateParams<'a> {
    pub(crate) ex_style: WINDOW_EX_STYLE,
    pub(crate) class_name: &'a str,
    pub(crate) title: &'a str,
    pub(crate) style: WINDOW_STYLE,
    /// May use `CW_USEDEFAULT` for either coordinate.
    pub(crate) position: Point,
    /// Outer window size.
    pub(crate) size: Size,
    pub(crate) parent: HWND,
    pub(crate) menu: HMENU,
    pub(crate) instance: HINSTANCE,
}

/// A created platform window.  Destroyed by the user closing it.
pub(crate) struct Window {
    hwnd: HWND,
}

impl Window {
    /// Register `params.class_name` if needed and create a window whose
    /// messages are handled by `handler`.
    pub(crate) fn create<W: WindowProc + 'static>(params: &CreateParams<'_>, handler: W) -> Result<Self> {
        let class = to_wide(params.class_name);
        register_class(params.instance, params.class_name, &class, handler.class_style())?;

        let title = to_wide(params.title);
        let slot = Box::into_raw(Box::new(Slot::new(Box::new(handler))));
        ADOPTED.with(|a| a.set(false));

        // SAFETY: class was registered above; class and title are
        // null-terminated UTF-16 buffers that outlive the call.  slot is a
        // leaked Box whose ownership passes to the router at WM_NCCREATE.
        let created = unsafe {
            CreateWindowExW(
                params.ex_style,
                PCWSTR(class.as_ptr()),
                PCWSTR(title.as_ptr()),
                params.style,
                params.position.x,
                params.position.y,
                params.size.width,
                params.size.height,
                params.parent,
                params.menu,
                params.instance,
                Some(slot as *const c_void),
            )
        };

        match created {
            Ok(hwnd) => {
                // Only fully created windows count as live: one destroyed
                // during creation must not end the message loop.
                if REGISTRY.with(|r| r.borrow_mut().attach(hwnd.0 as isize)) {
                    log::debug!("first window attached");
                }
                log::debug!("created {:?} window {:?}", params.class_name, hwnd.0);
                Ok(Self { hwnd })
            }
            Err(e) => {
                if !ADOPTED.with(Cell::get) {
                    // SAFETY: the router never saw the slot, so it is still
                    // exclusively ours.  If it had been adopted, WM_NCDESTROY
                    // has already freed it.
                    drop(unsafe { Box::from_raw(slot) });
                }
                Err(PancanvasError::Win32 {
                    function: "CreateWindowExW",
                    code: e.code().0 as u32,
                })
            }
        }
    }

    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Returns whether the window was previously visible.
    pub(crate) fn show(&self, cmd: SHOW_WINDOW_CMD) -> bool {
        // SAFETY: hwnd is a window created by this thread.
        unsafe { ShowWindow(self.hwnd, cmd) }.as_bool()
    }

    /// Force an immediate WM_PAINT if the update region is not empty.
    pub(crate) fn update(&self) -> bool {
        // SAFETY: hwnd is a window created by this thread.
        unsafe { UpdateWindow(self.hwnd) }.as_bool()
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(
    instance: HINSTANCE,
    name: &str,
    class: &[u16],
    style: WNDCLASS_STYLES,
) -> Result<()> {
    if !REGISTRY.with(|r| r.borrow_mut().claim_class(name)) {
        return Ok(());
    }

    let registered = register_class_once(instance, class, style);
    if registered.is_err() {
        REGISTRY.with(|r| r.borrow_mut().release_class(name));
    }
    registered
}

fn register_class_once(instance: HINSTANCE, class: &[u16], style: WNDCLASS_STYLES) -> Result<()> {
    // SAFETY: IDI_APPLICATION / IDC_ARROW are built-in resources; a null
    // instance selects the system resources.
    let icon = unsafe { LoadIconW(HINSTANCE::default(), IDI_APPLICATION) }.map_err(PancanvasError::from)?;
    // SAFETY: as above; IDC_ARROW is a predefined system cursor.
    let cursor = unsafe { LoadCursorW(HINSTANCE::default(), IDC_ARROW) }.map_err(PancanvasError::from)?;

    let wndclass = WNDCLASSEXW {
        // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style,
        lpfnWndProc: Some(route_message),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: instance,
        hIcon: icon,
        hCursor: cursor,
        // No class brush: windows that want a background paint it themselves.
        hbrBackground: HBRUSH::default(),
        lpszMenuName: PCWSTR::null(),
        lpszClassName: PCWSTR(class.as_ptr()),
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised; class is a null-terminated
    // UTF-16 string that outlives the call (the system copies it).
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }
    Ok(())
}

// ── Message routing ───────────────────────────────────────────────────────────

// SAFETY: route_message is registered as lpfnWndProc for every class created
// through `Window::create`.  Windows guarantees the arguments are valid for
// the duration of the call.
unsafe extern "system" fn route_message(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        // SAFETY: for WM_NCCREATE, lparam points at the CREATESTRUCTW of the
        // window being created.
        let create = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        let slot = create.lpCreateParams as *mut Slot;
        if !slot.is_null() {
            // SAFETY: slot came from Box::into_raw in Window::create.
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, slot as isize) };
            ADOPTED.with(|a| a.set(true));
        }
    }

    // SAFETY: GWLP_USERDATA is either 0 or a Slot pointer stored above that
    // stays valid until WM_NCDESTROY below.
    let slot = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const Slot;
    let handled = if slot.is_null() {
        None
    } else {
        // SAFETY: see above; only shared access, mutation goes through RefCell.
        let slot = unsafe { &*slot };
        match slot.handler.try_borrow_mut() {
            Ok(mut handler) => handler.handle_message(hwnd, msg, wparam, lparam),
            // Sent to us re-entrantly (e.g. WM_CAPTURECHANGED from inside
            // ReleaseCapture, WM_ERASEBKGND from inside BeginPaint) while
            // the handler is busy.
            Err(_) => slot.busy_result(msg),
        }
    };

    // SAFETY: hwnd and message parameters are valid — provided by Windows.
    let result = handled.unwrap_or_else(|| unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) });

    if msg == WM_NCDESTROY {
        // SAFETY: last message this window receives; the pointer is cleared
        // before the Slot is freed so nothing can observe it dangling.
        let slot = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) } as *mut Slot;
        if !slot.is_null() {
            // SAFETY: slot came from Box::into_raw in Window::create and was
            // adopted at WM_NCCREATE; GWLP_USERDATA no longer refers to it
            // and no borrow of the handler is live at this point.
            drop(unsafe { Box::from_raw(slot) });
        }
        let (last, live) = REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            (r.detach(hwnd.0 as isize), r.live_windows())
        });
        log::debug!("window {:?} detached, {live} still open", hwnd.0);
        if last {
            log::info!("last window destroyed; leaving message loop");
            // SAFETY: posts WM_QUIT to this thread's queue; always safe.
            unsafe { PostQuitMessage(0) };
        }
    }

    result
}

// ── Message loop ──────────────────────────────────────────────────────────────

/// Pump messages until WM_QUIT.
pub(crate) fn run_message_loop() -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Show a modal error dialog with the given message.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide = to_wide(message);
    let title_wide = to_wide("Pancanvas: fatal error");

    // SAFETY: both buffers are null-terminated and live for the call.
    // A null owner makes the dialog top-level.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

/// Capture the current Win32 last-error code and wrap it.
///
/// Call immediately after the failing function; any later API call may
/// overwrite the thread-local error state.
pub(crate) fn last_error(function: &'static str) -> PancanvasError {
    // SAFETY: GetLastError only reads thread-local state.
    let code = unsafe { GetLastError() };
    PancanvasError::Win32 {
        function,
        code: code.0,
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
