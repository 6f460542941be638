// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The rest of the codebase (workspace, surface, config) is platform-neutral.
// All Win32 FFI is confined to the `win32` sub-module and never leaks outward.

pub mod win32;
