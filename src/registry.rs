// ── Process-wide window registry ──────────────────────────────────────────────
//
// Pure bookkeeping behind the Win32 window procedure: which window classes
// this process has registered, and which top-level windows are still alive.
// `platform::win32::window` keeps one instance per UI thread; it comes into
// use with the first window and the message loop ends when the last window
// is unregistered.

use std::collections::HashSet;

/// Class and window bookkeeping for one UI thread.
#[derive(Debug, Default)]
pub(crate) struct WindowRegistry {
    classes: HashSet<String>,
    windows: HashSet<isize>,
}

impl WindowRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `class` is seen, i.e. when the caller
    /// must actually register it with the platform.
    pub(crate) fn claim_class(&mut self, class: &str) -> bool {
        if self.classes.contains(class) {
            return false;
        }
        self.classes.insert(class.to_owned())
    }

    /// Forget a class whose platform registration failed, so it can be retried.
    pub(crate) fn release_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    /// Record a window once its creation has succeeded.  Returns `true` if
    /// it is the first live window.
    ///
    /// A window destroyed while still being created is never attached, so
    /// its destruction cannot end the message loop.
    pub(crate) fn attach(&mut self, handle: isize) -> bool {
        self.windows.insert(handle);
        self.windows.len() == 1
    }

    /// Forget a destroyed window.  Returns `true` if it was the last live
    /// window, meaning the message loop should end.
    pub(crate) fn detach(&mut self, handle: isize) -> bool {
        self.windows.remove(&handle) && self.windows.is_empty()
    }

    pub(crate) fn live_windows(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_is_claimed_once() {
        let mut reg = WindowRegistry::new();
        assert!(reg.claim_class("PancanvasWorkspace"));
        assert!(!reg.claim_class("PancanvasWorkspace"));
        assert!(reg.claim_class("Other"));
    }

    #[test]
    fn released_class_can_be_claimed_again() {
        let mut reg = WindowRegistry::new();
        assert!(reg.claim_class("PancanvasWorkspace"));
        reg.release_class("PancanvasWorkspace");
        assert!(reg.claim_class("PancanvasWorkspace"));
    }

    #[test]
    fn last_detach_signals_teardown() {
        let mut reg = WindowRegistry::new();
        assert!(reg.attach(0x10));
        assert!(!reg.attach(0x20));
        assert_eq!(reg.live_windows(), 2);

        assert!(!reg.detach(0x10));
        assert!(reg.detach(0x20));
        assert_eq!(reg.live_windows(), 0);
    }

    #[test]
    fn aborted_creation_does_not_signal_teardown() {
        let mut reg = WindowRegistry::new();
        // The only window failed in WM_CREATE and was destroyed before
        // creation returned.
        assert!(!reg.detach(0x10));
        assert_eq!(reg.live_windows(), 0);

        // A later window still starts and ends the loop normally.
        assert!(reg.attach(0x20));
        assert!(reg.detach(0x20));
    }

    #[test]
    fn detaching_unknown_handle_is_not_teardown() {
        let mut reg = WindowRegistry::new();
        assert!(!reg.detach(0x30));
        reg.attach(0x40);
        assert!(!reg.detach(0x30));
        assert_eq!(reg.live_windows(), 1);
    }
}
