// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 / GDI
// FFI).  Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// Off Windows only the platform-neutral core is built (for its tests).
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod error;
mod geometry;
mod input;
mod mouse;
#[cfg(windows)]
mod platform;
mod registry;
mod surface;
mod workspace;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load();
    log::info!("starting {:?}", config.title);

    #[cfg(windows)]
    {
        if let Err(e) = platform::win32::workspace_window::run(&config) {
            log::error!("startup failed: {e}");
            // The only visible output path in a release GUI build.
            platform::win32::window::show_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        log::error!("pancanvas needs Windows (Win32 windowing and GDI)");
        std::process::exit(1);
    }
}
