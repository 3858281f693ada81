use kurbo::Point;

use crate::shape::{BezierHandle, BezierShape};

/// Pointer state machine turning press/drag/release events into shape edits.
///
/// A release at the press position appends a straight corner; a release
/// elsewhere appends symmetric tangent handles derived from the drag vector
/// (in = press + (press - release), out mirrored). Dragging only feeds the
/// visual preview and never mutates the shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShapeEditor {
    pending_press: Option<Point>,
    preview: Option<Point>,
}

impl ShapeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pos: Point) {
        self.pending_press = Some(pos);
        self.preview = None;
    }

    pub fn drag(&mut self, pos: Point) {
        if self.pending_press.is_some() {
            self.preview = Some(pos);
        }
    }

    /// Completes the gesture, appending one handle. A release with no pending
    /// press is ignored.
    pub fn release(&mut self, pos: Point, shape: &mut BezierShape) {
        let Some(press) = self.pending_press.take() else {
            return;
        };
        self.preview = None;

        let handle = if press == pos {
            BezierHandle::corner(pos)
        } else {
            BezierHandle::symmetric(press, press - pos)
        };
        shape.push_handle(handle);
    }

    /// Drops the shape's final handle (the "erase last point" command).
    pub fn remove_last(&mut self, shape: &mut BezierShape) {
        shape.pop_handle();
    }

    /// The handle the current gesture would append, for preview rendering.
    pub fn preview_handle(&self) -> Option<BezierHandle> {
        let press = self.pending_press?;
        let preview = self.preview?;
        Some(BezierHandle::symmetric(press, press - preview))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_release_appends_symmetric_handles() {
        let mut editor = ShapeEditor::new();
        let mut shape = BezierShape::empty_closed();

        editor.press(Point::new(10.0, 10.0));
        editor.drag(Point::new(20.0, 20.0));
        editor.release(Point::new(20.0, 20.0), &mut shape);

        let h = shape.handles[0];
        assert_eq!(h.anchor, Point::new(10.0, 10.0));
        assert_eq!(h.in_ctrl, Point::new(0.0, 0.0));
        assert_eq!(h.out_ctrl, Point::new(20.0, 20.0));
        assert!(shape.changed());
    }

    #[test]
    fn click_in_place_appends_a_corner() {
        let mut editor = ShapeEditor::new();
        let mut shape = BezierShape::empty_closed();

        editor.press(Point::new(5.0, 7.0));
        editor.release(Point::new(5.0, 7.0), &mut shape);

        let h = shape.handles[0];
        assert!(h.is_corner());
        assert_eq!(h.anchor, Point::new(5.0, 7.0));
    }

    #[test]
    fn gesture_state_resets_after_release() {
        let mut editor = ShapeEditor::new();
        let mut shape = BezierShape::empty_closed();

        editor.press(Point::new(0.0, 0.0));
        editor.drag(Point::new(3.0, 4.0));
        assert!(editor.preview_handle().is_some());

        editor.release(Point::new(3.0, 4.0), &mut shape);
        assert!(editor.preview_handle().is_none());

        // A stray release without a press is a no-op.
        editor.release(Point::new(9.0, 9.0), &mut shape);
        assert_eq!(shape.len(), 1);
    }

    #[test]
    fn preview_matches_the_handle_a_release_would_append() {
        let mut editor = ShapeEditor::new();
        editor.press(Point::new(10.0, 10.0));
        editor.drag(Point::new(20.0, 20.0));

        let preview = editor.preview_handle().unwrap();
        assert_eq!(preview.anchor, Point::new(10.0, 10.0));
        assert_eq!(preview.in_ctrl, Point::new(0.0, 0.0));
        assert_eq!(preview.out_ctrl, Point::new(20.0, 20.0));
    }

    #[test]
    fn remove_last_pops_and_marks_changed() {
        let mut editor = ShapeEditor::new();
        let mut shape = BezierShape::empty_closed();
        shape.push_handle(BezierHandle::corner(Point::new(1.0, 1.0)));
        shape.clear_changed();

        editor.remove_last(&mut shape);
        assert!(shape.is_empty());
        assert!(shape.changed());

        shape.clear_changed();
        editor.remove_last(&mut shape);
        assert!(!shape.changed());
    }
}
