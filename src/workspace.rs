// ── Workspace model ───────────────────────────────────────────────────────────
//
// The platform-independent half of the workspace window.  Owns the
// backbuffer, the canvas and the pan rectangle, and turns window events into
// `Effect`s that `platform::win32::workspace_window` carries out.
//
// Lifecycle: Uninitialized → Created → Destroyed.  Drawing events that arrive
// while no surfaces exist (before create, after destroy) are no-ops.

use crate::{
    error::Result,
    geometry::{Color, Point, Rect, Size},
    mouse::MouseTracker,
    surface::{DrawingSurface, SurfaceFactory},
};

/// Fixed dimensions of the pannable canvas.
pub(crate) const CANVAS_SIZE: Size = Size::new(1024, 1024);

/// Colours used when composing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    /// Fill behind the canvas, visible wherever the canvas has been panned away.
    pub(crate) background: Color,
    /// Initial fill of the canvas itself.
    pub(crate) canvas: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(200, 255, 200),
            canvas: Color::rgb(255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Uninitialized,
    Created,
    Destroyed,
}

/// Follow-up the platform layer must perform after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Nothing,
    /// Route all mouse input to this window, even outside its bounds.
    BeginCapture,
    EndCapture,
    /// Invalidate the whole client area without erasing.
    Repaint,
}

pub(crate) struct Workspace<S> {
    lifecycle: Lifecycle,
    palette: Palette,
    backbuffer: Option<S>,
    canvas: Option<Box<S>>,
    blt_rect: Rect,
    mouse: MouseTracker,
    dragging: bool,
}

impl<S: DrawingSurface> Workspace<S> {
    pub(crate) fn new(palette: Palette) -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            palette,
            backbuffer: None,
            canvas: None,
            blt_rect: Rect::from_size(CANVAS_SIZE),
            mouse: MouseTracker::new(),
            dragging: false,
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Where the canvas is currently stretched into the backbuffer.
    pub(crate) fn blt_rect(&self) -> Rect {
        self.blt_rect
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub(crate) fn backbuffer(&self) -> Option<&S> {
        self.backbuffer.as_ref()
    }

    pub(crate) fn canvas(&self) -> Option<&S> {
        self.canvas.as_deref()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Allocate the backbuffer at `client` size and the canvas at
    /// `CANVAS_SIZE`, and reset the pan rectangle.
    ///
    /// Nothing is stored unless both allocations succeed.
    pub(crate) fn create<F>(&mut self, factory: &mut F, client: Size) -> Result<()>
    where
        F: SurfaceFactory<Surface = S>,
    {
        let backbuffer = factory.create_surface(client)?;
        let mut canvas = Box::new(factory.create_surface(CANVAS_SIZE)?);
        canvas.fill_with_color(self.palette.canvas)?;

        self.backbuffer = Some(backbuffer);
        self.canvas = Some(canvas);
        self.blt_rect = Rect::from_size(CANVAS_SIZE);
        self.lifecycle = Lifecycle::Created;

        log::info!(
            "workspace created: backbuffer {}x{}, canvas {}x{}",
            client.width,
            client.height,
            CANVAS_SIZE.width,
            CANVAS_SIZE.height
        );
        Ok(())
    }

    /// Release the canvas and the backbuffer.
    ///
    /// Returns `true` if a canvas was actually released; calling this again,
    /// or without a prior `create`, releases nothing.
    pub(crate) fn destroy(&mut self) -> bool {
        let released = self.canvas.take().is_some();
        self.backbuffer = None;
        self.dragging = false;
        self.lifecycle = Lifecycle::Destroyed;
        log::debug!("workspace destroyed (canvas released: {released})");
        released
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    /// Compose the next frame into the backbuffer and return it for
    /// presentation.  `None` when there is nothing to present.
    pub(crate) fn compose(&mut self) -> Result<Option<&S>> {
        let Some(backbuffer) = self.backbuffer.as_mut() else {
            return Ok(None);
        };

        backbuffer.fill_with_color(self.palette.background)?;
        if let Some(canvas) = self.canvas.as_deref() {
            backbuffer.stretch_from(self.blt_rect, canvas, Rect::from_size(CANVAS_SIZE))?;
        }

        Ok(Some(&*backbuffer))
    }

    /// Track a new client size.  Only the backbuffer follows it; the pan
    /// rectangle is untouched.
    pub(crate) fn resize(&mut self, client: Size) -> Result<()> {
        match self.backbuffer.as_mut() {
            Some(backbuffer) => {
                log::trace!("backbuffer resized to {}x{}", client.width, client.height);
                backbuffer.resize(client)
            }
            None => Ok(()),
        }
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    /// Left button pressed: start a drag measured from `pos`.
    pub(crate) fn press(&mut self, pos: Point) -> Effect {
        self.mouse.anchor(pos);
        self.dragging = true;
        Effect::BeginCapture
    }

    /// Cursor moved.  Pans only while a drag is active and the left button is
    /// still reported held.
    pub(crate) fn motion(&mut self, pos: Point, left_button: bool) -> Effect {
        self.mouse.update(pos);
        if !(self.dragging && left_button) {
            return Effect::Nothing;
        }

        self.blt_rect.translate(self.mouse.dx(), self.mouse.dy());
        Effect::Repaint
    }

    /// Left button released: end the drag.
    pub(crate) fn release(&mut self) -> Effect {
        if !self.dragging {
            return Effect::Nothing;
        }
        self.dragging = false;
        log::debug!("drag ended, canvas at {:?}", self.blt_rect);
        Effect::EndCapture
    }

    /// Capture was taken away by someone else (Alt+Tab, a modal dialog).
    pub(crate) fn capture_lost(&mut self) {
        self.dragging = false;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::error::PancanvasError;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Alloc(Size),
        Fill(Size, Color),
        Resize(Size),
        Stretch { dest: Rect, src: Rect, from: Size },
        Release(Size),
    }

    type Journal = Rc<RefCell<Vec<Op>>>;

    struct MockSurface {
        size: Size,
        journal: Journal,
    }

    impl DrawingSurface for MockSurface {
        fn size(&self) -> Size {
            self.size
        }

        fn fill_with_color(&mut self, color: Color) -> Result<()> {
            self.journal.borrow_mut().push(Op::Fill(self.size, color));
            Ok(())
        }

        fn resize(&mut self, size: Size) -> Result<()> {
            self.size = size;
            self.journal.borrow_mut().push(Op::Resize(size));
            Ok(())
        }

        fn stretch_from(&mut self, dest: Rect, source: &Self, src: Rect) -> Result<()> {
            self.journal
                .borrow_mut()
                .push(Op::Stretch { dest, src, from: source.size });
            Ok(())
        }
    }

    impl Drop for MockSurface {
        fn drop(&mut self) {
            self.journal.borrow_mut().push(Op::Release(self.size));
        }
    }

    #[derive(Default)]
    struct MockFactory {
        journal: Journal,
        /// Fail the n-th allocation (0-based).
        fail_at: Option<usize>,
        allocated: usize,
    }

    impl SurfaceFactory for MockFactory {
        type Surface = MockSurface;

        fn create_surface(&mut self, size: Size) -> Result<MockSurface> {
            let n = self.allocated;
            self.allocated += 1;
            if self.fail_at == Some(n) {
                return Err(PancanvasError::Win32 { function: "CreateCompatibleBitmap", code: 8 });
            }
            self.journal.borrow_mut().push(Op::Alloc(size));
            Ok(MockSurface { size, journal: Rc::clone(&self.journal) })
        }
    }

    fn created(client: Size) -> (Workspace<MockSurface>, Journal) {
        let mut factory = MockFactory::default();
        let mut ws = Workspace::new(Palette::default());
        ws.create(&mut factory, client).expect("create");
        factory.journal.borrow_mut().clear();
        (ws, factory.journal)
    }

    fn releases_of(journal: &Journal, size: Size) -> usize {
        journal
            .borrow()
            .iter()
            .filter(|op| **op == Op::Release(size))
            .count()
    }

    const ORIGIN: Rect = Rect::new(0, 0, 1024, 1024);

    #[test]
    fn create_initialises_surfaces_and_pan_rect() {
        let mut factory = MockFactory::default();
        let mut ws = Workspace::new(Palette::default());
        assert_eq!(ws.lifecycle(), Lifecycle::Uninitialized);

        ws.create(&mut factory, Size::new(800, 600)).expect("create");

        assert_eq!(ws.lifecycle(), Lifecycle::Created);
        assert_eq!(ws.backbuffer().map(DrawingSurface::size), Some(Size::new(800, 600)));
        assert_eq!(ws.canvas().map(DrawingSurface::size), Some(CANVAS_SIZE));
        assert_eq!(ws.blt_rect(), ORIGIN);
        assert_eq!(
            *factory.journal.borrow(),
            vec![
                Op::Alloc(Size::new(800, 600)),
                Op::Alloc(CANVAS_SIZE),
                Op::Fill(CANVAS_SIZE, Palette::default().canvas),
            ]
        );
    }

    #[test]
    fn failed_canvas_allocation_leaves_workspace_uninitialised() {
        let mut factory = MockFactory { fail_at: Some(1), ..MockFactory::default() };
        let mut ws: Workspace<MockSurface> = Workspace::new(Palette::default());

        assert!(ws.create(&mut factory, Size::new(800, 600)).is_err());
        assert_eq!(ws.lifecycle(), Lifecycle::Uninitialized);
        assert!(ws.backbuffer().is_none());
        // The backbuffer allocated before the failure must not leak.
        assert_eq!(releases_of(&factory.journal, Size::new(800, 600)), 1);
    }

    #[test]
    fn drag_scenario_pans_then_stops_after_release() {
        let (mut ws, _journal) = created(Size::new(800, 600));

        assert_eq!(ws.motion(Point::new(100, 100), false), Effect::Nothing);
        assert_eq!(ws.press(Point::new(100, 100)), Effect::BeginCapture);
        assert_eq!(ws.motion(Point::new(150, 130), true), Effect::Repaint);
        assert_eq!(ws.blt_rect(), Rect::new(50, 30, 1074, 1054));

        assert_eq!(ws.release(), Effect::EndCapture);
        assert_eq!(ws.motion(Point::new(200, 200), false), Effect::Nothing);
        assert_eq!(ws.blt_rect(), Rect::new(50, 30, 1074, 1054));
    }

    #[test]
    fn pan_equals_sum_of_drag_displacements() {
        let (mut ws, _journal) = created(Size::new(640, 480));
        let path = [(10, 5), (-3, 40), (250, -17), (-1000, 0), (7, 7), (0, -300)];

        let mut pos = Point::new(320, 240);
        ws.press(pos);
        let (mut sum_x, mut sum_y) = (0, 0);
        for (i, (dx, dy)) in path.into_iter().enumerate() {
            pos = Point::new(pos.x + dx, pos.y + dy);
            ws.motion(pos, true);
            sum_x += dx;
            sum_y += dy;

            // Unrelated events in between must not disturb the pan.
            if i % 2 == 0 {
                ws.resize(Size::new(300 + i as i32, 200)).expect("resize");
                ws.compose().expect("compose");
            }
        }

        let mut expected = ORIGIN;
        expected.translate(sum_x, sum_y);
        assert_eq!(ws.blt_rect(), expected);
    }

    #[test]
    fn moves_without_active_drag_do_not_pan() {
        let (mut ws, _journal) = created(Size::new(800, 600));

        // Button held but pressed outside the window: no capture, no drag.
        assert_eq!(ws.motion(Point::new(10, 10), true), Effect::Nothing);
        assert_eq!(ws.motion(Point::new(90, 90), true), Effect::Nothing);
        assert_eq!(ws.blt_rect(), ORIGIN);

        // Capture lost mid-drag ends the drag.
        ws.press(Point::new(90, 90));
        ws.capture_lost();
        assert_eq!(ws.motion(Point::new(120, 120), true), Effect::Nothing);
        assert_eq!(ws.blt_rect(), ORIGIN);
        assert_eq!(ws.release(), Effect::Nothing);
    }

    #[test]
    fn pan_rect_is_never_clamped() {
        let (mut ws, _journal) = created(Size::new(800, 600));
        ws.press(Point::new(0, 0));
        ws.motion(Point::new(-5000, 9000), true);
        assert_eq!(ws.blt_rect(), Rect::new(-5000, 9000, -3976, 10024));
    }

    #[test]
    fn runaway_drag_keeps_canvas_size() {
        let (mut ws, _journal) = created(Size::new(800, 600));
        // Full-width drags far beyond the i32 range.
        for _ in 0..70_000 {
            ws.press(Point::new(-32_768, 0));
            ws.motion(Point::new(32_767, 0), true);
            ws.release();
        }
        assert_eq!(ws.blt_rect().right, i32::MAX);
        assert_eq!(ws.blt_rect().size(), CANVAS_SIZE);

        ws.press(Point::new(0, 0));
        assert_eq!(ws.motion(Point::new(-100, 0), true), Effect::Repaint);
        ws.release();
        assert_eq!(ws.blt_rect().left, i32::MAX - 1024 - 100);
        assert_eq!(ws.blt_rect().size(), CANVAS_SIZE);
    }

    #[test]
    fn resize_tracks_client_but_keeps_pan_size() {
        let (mut ws, journal) = created(Size::new(800, 600));
        ws.press(Point::new(0, 0));
        ws.motion(Point::new(12, 34), true);

        ws.resize(Size::new(1920, 1080)).expect("resize");

        assert_eq!(ws.backbuffer().map(DrawingSurface::size), Some(Size::new(1920, 1080)));
        assert_eq!(ws.blt_rect(), Rect::new(12, 34, 1036, 1058));
        assert_eq!(ws.blt_rect().size(), CANVAS_SIZE);
        assert_eq!(ws.canvas().map(DrawingSurface::size), Some(CANVAS_SIZE));
        assert_eq!(*journal.borrow(), vec![Op::Resize(Size::new(1920, 1080))]);
    }

    #[test]
    fn compose_fills_background_then_stretches_canvas_at_pan_rect() {
        let (mut ws, journal) = created(Size::new(800, 600));
        ws.press(Point::new(0, 0));
        ws.motion(Point::new(50, 30), true);

        let presented = ws.compose().expect("compose").map(DrawingSurface::size);

        assert_eq!(presented, Some(Size::new(800, 600)));
        assert_eq!(
            *journal.borrow(),
            vec![
                Op::Fill(Size::new(800, 600), Palette::default().background),
                Op::Stretch {
                    dest: Rect::new(50, 30, 1074, 1054),
                    src: ORIGIN,
                    from: CANVAS_SIZE,
                },
            ]
        );
    }

    #[test]
    fn compose_before_create_presents_nothing() {
        let mut ws: Workspace<MockSurface> = Workspace::new(Palette::default());
        assert!(ws.compose().expect("compose").is_none());
        ws.resize(Size::new(10, 10)).expect("resize without backbuffer");
    }

    #[test]
    fn destroy_releases_canvas_exactly_once() {
        let (mut ws, journal) = created(Size::new(800, 600));

        assert!(ws.destroy());
        assert!(!ws.destroy());

        assert_eq!(ws.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(releases_of(&journal, CANVAS_SIZE), 1);
        assert_eq!(releases_of(&journal, Size::new(800, 600)), 1);
        drop(ws);
        assert_eq!(releases_of(&journal, CANVAS_SIZE), 1);
    }

    #[test]
    fn destroy_without_create_releases_nothing() {
        let mut ws: Workspace<MockSurface> = Workspace::new(Palette::default());
        assert!(!ws.destroy());
        assert!(ws.canvas().is_none());
        assert!(ws.compose().expect("compose").is_none());
    }
}
