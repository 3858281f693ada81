use kurbo::{CubicBez, Point, Rect};

/// One vertex of a cubic bezier path: an anchor plus its two tangent control
/// points, all in the same coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BezierHandle {
    pub anchor: Point,
    pub in_ctrl: Point,
    pub out_ctrl: Point,
}

impl BezierHandle {
    pub fn new(anchor: Point, in_ctrl: Point, out_ctrl: Point) -> Self {
        Self {
            anchor,
            in_ctrl,
            out_ctrl,
        }
    }

    /// A straight corner: both control points collapsed onto the anchor.
    pub fn corner(anchor: Point) -> Self {
        Self {
            anchor,
            in_ctrl: anchor,
            out_ctrl: anchor,
        }
    }

    /// Symmetric tangent handles: in = anchor + offset, out = anchor - offset.
    pub fn symmetric(anchor: Point, offset: kurbo::Vec2) -> Self {
        Self {
            anchor,
            in_ctrl: anchor + offset,
            out_ctrl: anchor - offset,
        }
    }

    pub fn is_corner(&self) -> bool {
        self.in_ctrl == self.anchor && self.out_ctrl == self.anchor
    }
}

/// An editable multi-segment cubic bezier path.
///
/// Interpreted as closed unless explicitly opened: the last anchor connects
/// back to the first through `last.out_ctrl` and `first.in_ctrl`. The `changed`
/// flag is set on every structural mutation and cleared by the session once the
/// derived shape has been recomputed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BezierShape {
    pub handles: Vec<BezierHandle>,
    pub closed: bool,
    #[serde(skip)]
    changed: bool,
}

impl BezierShape {
    pub fn new(handles: Vec<BezierHandle>, closed: bool) -> Self {
        Self {
            handles,
            closed,
            changed: false,
        }
    }

    /// An empty closed shape, the editor's starting state.
    pub fn empty_closed() -> Self {
        Self {
            handles: Vec::new(),
            closed: true,
            changed: false,
        }
    }

    /// A closed rectangle as four straight corners, wound clockwise in screen
    /// coordinates (y down).
    pub fn from_rect(rect: Rect) -> Self {
        let handles = vec![
            BezierHandle::corner(Point::new(rect.x0, rect.y0)),
            BezierHandle::corner(Point::new(rect.x1, rect.y0)),
            BezierHandle::corner(Point::new(rect.x1, rect.y1)),
            BezierHandle::corner(Point::new(rect.x0, rect.y1)),
        ];
        Self::new(handles, true)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// The engine requires at least two handles; anything shorter must be
    /// skipped before a handle is created.
    pub fn is_engine_ready(&self) -> bool {
        self.handles.len() >= 2
    }

    pub fn push_handle(&mut self, handle: BezierHandle) {
        self.handles.push(handle);
        self.changed = true;
    }

    /// Drops the final handle, if any.
    pub fn pop_handle(&mut self) -> Option<BezierHandle> {
        let popped = self.handles.pop();
        if popped.is_some() {
            self.changed = true;
        }
        popped
    }

    /// Clears all handles, keeping the closed flag.
    pub fn reset(&mut self) {
        if !self.handles.is_empty() {
            self.changed = true;
        }
        self.handles.clear();
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// The cubic segments spanned by consecutive handles, including the
    /// closing segment for closed shapes. Empty below two handles.
    pub fn to_cubics(&self) -> Vec<CubicBez> {
        let n = self.handles.len();
        if n < 2 {
            return Vec::new();
        }
        let mut segs = Vec::with_capacity(if self.closed { n } else { n - 1 });
        for w in self.handles.windows(2) {
            segs.push(CubicBez::new(
                w[0].anchor,
                w[0].out_ctrl,
                w[1].in_ctrl,
                w[1].anchor,
            ));
        }
        if self.closed {
            let last = self.handles[n - 1];
            let first = self.handles[0];
            segs.push(CubicBez::new(
                last.anchor,
                last.out_ctrl,
                first.in_ctrl,
                first.anchor,
            ));
        }
        segs
    }
}
