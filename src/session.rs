use crate::{
    editor::ShapeEditor,
    engine::BezierEngine,
    error::BeztoysResult,
    shape::BezierShape,
    toys::{Annotations, Toy, ToyCtx},
};

/// Session-level toggles, collected explicitly instead of living in globals.
#[derive(Clone, Copy, Debug)]
pub struct UiConfig {
    /// When set, recomputation runs every frame instead of only on edits.
    pub animation_enabled: bool,
    /// Momentary suppression of animation (a held key), overriding the above.
    pub pause_override: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            animation_enabled: true,
            pause_override: false,
        }
    }
}

/// Ordered toy collection with a circularly wrapping selection cursor.
pub struct ToyRack {
    toys: Vec<Box<dyn Toy>>,
    current: usize,
}

impl ToyRack {
    /// Panics on an empty catalog; the registry is fixed at startup.
    pub fn new(toys: Vec<Box<dyn Toy>>) -> Self {
        assert!(!toys.is_empty(), "toy rack needs at least one toy");
        Self { toys, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.toys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toys.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &dyn Toy {
        self.toys[self.current].as_ref()
    }

    pub fn current_mut(&mut self) -> &mut dyn Toy {
        self.toys[self.current].as_mut()
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.toys.len();
    }

    pub fn retreat(&mut self) {
        self.current = (self.current + self.toys.len() - 1) % self.toys.len();
    }

    pub fn names(&self) -> Vec<&str> {
        self.toys.iter().map(|t| t.name()).collect()
    }
}

/// Frame orchestrator: owns the editable shape, the derived shape, the toy
/// rack and the engine, and decides once per frame whether to recompute.
pub struct Session {
    shape: BezierShape,
    derived: BezierShape,
    editor: ShapeEditor,
    rack: ToyRack,
    config: UiConfig,
    engine: Box<dyn BezierEngine>,
}

impl Session {
    pub fn new(engine: Box<dyn BezierEngine>, rack: ToyRack) -> Self {
        Self {
            shape: BezierShape::empty_closed(),
            derived: BezierShape::empty_closed(),
            editor: ShapeEditor::new(),
            rack,
            config: UiConfig::default(),
            engine,
        }
    }

    pub fn shape(&self) -> &BezierShape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut BezierShape {
        &mut self.shape
    }

    pub fn derived(&self) -> &BezierShape {
        &self.derived
    }

    pub fn editor_mut(&mut self) -> &mut ShapeEditor {
        &mut self.editor
    }

    pub fn config(&self) -> UiConfig {
        self.config
    }

    pub fn config_mut(&mut self) -> &mut UiConfig {
        &mut self.config
    }

    pub fn rack(&self) -> &ToyRack {
        &self.rack
    }

    pub fn current_toy(&self) -> &dyn Toy {
        self.rack.current()
    }

    pub fn annotations(&self) -> Annotations {
        self.rack.current().annotations()
    }

    /// Editor conveniences, forwarding onto the owned shape.
    pub fn pointer_press(&mut self, pos: kurbo::Point) {
        self.editor.press(pos);
    }

    pub fn pointer_drag(&mut self, pos: kurbo::Point) {
        self.editor.drag(pos);
    }

    pub fn pointer_release(&mut self, pos: kurbo::Point) {
        self.editor.release(pos, &mut self.shape);
    }

    pub fn remove_last_handle(&mut self) {
        self.editor.remove_last(&mut self.shape);
    }

    /// Selection changes mark the shape dirty so the new toy applies on the
    /// next tick instead of waiting for the next edit.
    pub fn next_toy(&mut self) {
        self.rack.advance();
        self.shape.mark_changed();
    }

    pub fn prev_toy(&mut self) {
        self.rack.retreat();
        self.shape.mark_changed();
    }

    /// Runs one frame. Returns whether a recomputation happened.
    ///
    /// Recomputation triggers when the shape changed or animation is live
    /// (enabled and not momentarily paused); otherwise the cached derived
    /// shape is kept as-is. Shapes below two handles never reach the engine.
    /// An engine-reported failure keeps the previous derived shape and leaves
    /// the changed flag set so the next trigger retries.
    #[tracing::instrument(skip(self, ctx), fields(toy = self.rack.current().name()))]
    pub fn tick(&mut self, ctx: &ToyCtx) -> BeztoysResult<bool> {
        let animating = self.config.animation_enabled && !self.config.pause_override;
        if !self.shape.changed() && !animating {
            return Ok(false);
        }

        if !self.shape.is_engine_ready() {
            self.derived.reset();
            self.shape.clear_changed();
            return Ok(true);
        }

        let mut next = BezierShape::empty_closed();
        let toy = self.rack.current_mut();
        match toy.apply(self.engine.as_mut(), ctx, &self.shape, &mut next) {
            Ok(()) => {
                self.derived = next;
                self.shape.clear_changed();
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(toy = toy.name(), error = %err, "toy application failed; keeping previous derived shape");
                Ok(false)
            }
        }
    }
}
