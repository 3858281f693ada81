use kurbo::{Point, Rect, Vec2};

use crate::{
    engine::{BezierEngine, CapStyle, EngineShapeId, JoinStyle},
    error::BeztoysResult,
    shape::BezierShape,
};

/// Sends a shape across the engine boundary, returning the scoped handle that
/// owns the engine-side copy.
///
/// The guard exclusively borrows the engine for its whole lifetime, so the
/// handle can neither alias nor outlive the engine, and its `Drop` releases
/// the engine-side shape on every exit path.
pub fn send_to_engine<'e>(
    engine: &'e mut dyn BezierEngine,
    shape: &BezierShape,
) -> BeztoysResult<EngineShape<'e>> {
    let id = engine.create(&shape.handles, shape.closed)?;
    Ok(EngineShape { engine, id })
}

/// Scoped ownership of one engine-side shape.
///
/// All engine operations a toy may need go through this type; a sequence of
/// calls shares the single underlying handle and the handle is destroyed
/// exactly once, when the guard drops.
pub struct EngineShape<'e> {
    engine: &'e mut dyn BezierEngine,
    id: EngineShapeId,
}

impl EngineShape<'_> {
    pub fn offset(&mut self, distance: f64, join: JoinStyle, miter_limit: f64) -> BeztoysResult<()> {
        self.engine.offset(self.id, distance, join, miter_limit)
    }

    /// Outlines the shape in place. Any secondary ring the engine produces is
    /// drained and destroyed before this returns, so a second live handle
    /// never escapes the bridge.
    pub fn outline(
        &mut self,
        half_width: f64,
        join: JoinStyle,
        cap: CapStyle,
        miter_limit: f64,
    ) -> BeztoysResult<Option<BezierShape>> {
        let Some(secondary) = self
            .engine
            .outline(self.id, half_width, join, cap, miter_limit)?
        else {
            return Ok(None);
        };
        let drained = self.engine.read_back(secondary);
        self.engine.destroy(secondary);
        let (handles, closed) = drained?;
        Ok(Some(BezierShape::new(handles, closed)))
    }

    pub fn rotate(&mut self, angle: f64, pivot: Point) -> BeztoysResult<()> {
        self.engine.rotate(self.id, angle, pivot)
    }

    pub fn reverse_winding(&mut self) -> BeztoysResult<()> {
        self.engine.reverse_winding(self.id)
    }

    pub fn bounding_box(&self) -> BeztoysResult<Rect> {
        self.engine.bounding_box(self.id)
    }

    pub fn contains_point(&self, point: Point) -> BeztoysResult<bool> {
        self.engine.contains_point(self.id, point)
    }

    pub fn project_point(&self, point: Point) -> BeztoysResult<Point> {
        self.engine.project_point(self.id, point)
    }

    pub fn position_at(&self, t: f64) -> BeztoysResult<Point> {
        self.engine.position_at(self.id, t)
    }

    pub fn tangent_at(&self, t: f64) -> BeztoysResult<Vec2> {
        self.engine.tangent_at(self.id, t)
    }

    pub fn normal_at(&self, t: f64) -> BeztoysResult<Vec2> {
        self.engine.normal_at(self.id, t)
    }

    pub fn curvature_at(&self, t: f64) -> BeztoysResult<f64> {
        self.engine.curvature_at(self.id, t)
    }

    pub fn self_intersections(
        &self,
        spatial_tol: f64,
        param_tol: f64,
    ) -> BeztoysResult<Vec<f64>> {
        self.engine.self_intersections(self.id, spatial_tol, param_tol)
    }

    /// Appends the engine's current handle sequence into `out` and copies the
    /// closed flag. Callers wanting a full replace pre-clear `out`.
    pub fn drain_into(&self, out: &mut BezierShape) -> BeztoysResult<()> {
        let (handles, closed) = self.engine.read_back(self.id)?;
        out.handles.extend(handles);
        out.closed = closed;
        out.mark_changed();
        Ok(())
    }
}

impl Drop for EngineShape<'_> {
    fn drop(&mut self) {
        self.engine.destroy(self.id);
    }
}
