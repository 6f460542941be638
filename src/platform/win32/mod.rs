// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the codebase where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment that states which
// invariant makes the operation sound.

#![allow(unsafe_code)]

pub mod gdi; // memory-DC surfaces, DC and paint guards
pub mod window; // window base: class registration, routing, message loop
pub mod workspace_window; // the pannable-canvas window and launcher

pub(crate) mod dpi;
