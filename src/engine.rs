use kurbo::{Point, Rect, Vec2};

use crate::{error::BeztoysResult, shape::BezierHandle};

/// Corner-filling policy used when offsetting or outlining.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JoinStyle {
    Bevel,
    Miter,
    Round,
}

impl JoinStyle {
    /// The next style in the demo's fixed Bevel -> Miter -> Round cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Bevel => Self::Miter,
            Self::Miter => Self::Round,
            Self::Round => Self::Bevel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bevel => "Bevel",
            Self::Miter => "Miter",
            Self::Round => "Round",
        }
    }
}

/// End-cap policy for outlining open paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CapStyle {
    Butt,
    Round,
    Square,
}

/// Names an engine-owned shape. Only the bridge creates and destroys these;
/// a raw id must never outlive its `destroy` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EngineShapeId(pub(crate) u64);

/// The fixed operation contract of the geometry engine.
///
/// The engine keeps an internally owned copy of each created shape; every
/// mutating operation rewrites that copy in place. `create` is documented to
/// fail on fewer than two handles, so callers gate on
/// [`BezierShape::is_engine_ready`](crate::shape::BezierShape::is_engine_ready)
/// before reaching it.
pub trait BezierEngine {
    /// Copies the handle sequence into an engine-owned shape.
    fn create(&mut self, handles: &[BezierHandle], closed: bool) -> BeztoysResult<EngineShapeId>;

    /// Releases the engine-owned shape. The id must not be used afterwards.
    fn destroy(&mut self, id: EngineShapeId);

    /// The engine's current handle sequence and closed flag for `id`. Does not
    /// invalidate the handle.
    fn read_back(&self, id: EngineShapeId) -> BeztoysResult<(Vec<BezierHandle>, bool)>;

    /// Moves every boundary point `distance` along its local normal. With a
    /// clockwise-wound shape (screen coordinates, y down) a positive distance
    /// moves inward and a negative one outward; the engine does not normalize
    /// winding, so callers wanting the documented sign pre-wind clockwise.
    fn offset(
        &mut self,
        id: EngineShapeId,
        distance: f64,
        join: JoinStyle,
        miter_limit: f64,
    ) -> BeztoysResult<()>;

    /// Replaces the shape with a closed ring of `half_width` around it. Closed
    /// inputs may additionally yield an inner ring as a new independently owned
    /// shape; `None` is a valid outcome at every call.
    fn outline(
        &mut self,
        id: EngineShapeId,
        half_width: f64,
        join: JoinStyle,
        cap: CapStyle,
        miter_limit: f64,
    ) -> BeztoysResult<Option<EngineShapeId>>;

    /// Rotates every point about `pivot` by `angle` radians.
    fn rotate(&mut self, id: EngineShapeId, angle: f64, pivot: Point) -> BeztoysResult<()>;

    /// Flips the traversal direction of the shape.
    fn reverse_winding(&mut self, id: EngineShapeId) -> BeztoysResult<()>;

    /// Axis-aligned rectangle enclosing the shape's boundary.
    fn bounding_box(&self, id: EngineShapeId) -> BeztoysResult<Rect>;

    /// Point-in-shape containment (nonzero winding rule).
    fn contains_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<bool>;

    /// The closest point on the shape's boundary to `point`.
    fn project_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<Point>;

    /// Position at parameter `t` in [0,1), spanning the shape uniformly by
    /// segment.
    fn position_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Point>;

    /// Unit tangent at parameter `t`.
    fn tangent_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2>;

    /// Unit normal at parameter `t` (tangent rotated a quarter turn
    /// counterclockwise).
    fn normal_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2>;

    /// Signed curvature at parameter `t`. Magnitudes near zero imply an
    /// unbounded radius of curvature.
    fn curvature_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<f64>;

    /// Parameter values at which the boundary crosses itself; both parameters
    /// of each crossing are reported. `spatial_tol` bounds the distance under
    /// which two boundary points count as touching, `param_tol` the parameter
    /// distance under which two hits count as the same crossing.
    fn self_intersections(
        &self,
        id: EngineShapeId,
        spatial_tol: f64,
        param_tol: f64,
    ) -> BeztoysResult<Vec<f64>>;
}
