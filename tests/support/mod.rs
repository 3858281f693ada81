#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use beztoys::{
    BezierEngine, BezierHandle, BezierShape, BeztoysResult, CapStyle, EngineShapeId, JoinStyle,
    KurboEngine,
};
use kurbo::{Point, Rect, Vec2};

/// xorshift64* generator so shape fuzzing stays deterministic per seed.
pub struct Rng(u64);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        (x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A closed blob with anchors scattered around a circle and random symmetric
/// tangents. Always engine-ready for `handles >= 2`.
pub fn random_shape(rng: &mut Rng, handles: usize) -> BezierShape {
    let center = Point::new(400.0, 300.0);
    let mut out = BezierShape::empty_closed();
    for i in 0..handles {
        let angle = i as f64 / handles as f64 * std::f64::consts::TAU;
        let radius = rng.range(80.0, 200.0);
        let anchor = center + Vec2::new(angle.cos(), angle.sin()) * radius;
        let offset = Vec2::new(rng.range(-40.0, 40.0), rng.range(-40.0, 40.0));
        out.push_handle(BezierHandle::symmetric(anchor, offset));
    }
    out
}

/// Clockwise square in screen coordinates.
pub fn square(origin: Point, side: f64) -> BezierShape {
    BezierShape::new(
        vec![
            BezierHandle::corner(origin),
            BezierHandle::corner(origin + Vec2::new(side, 0.0)),
            BezierHandle::corner(origin + Vec2::new(side, side)),
            BezierHandle::corner(origin + Vec2::new(0.0, side)),
        ],
        true,
    )
}

/// Shared counters observable after the engine has been boxed into a session.
#[derive(Clone, Default)]
pub struct EngineCounters {
    pub created: Rc<Cell<usize>>,
    pub destroyed: Rc<Cell<usize>>,
}

impl EngineCounters {
    pub fn outstanding(&self) -> isize {
        self.created.get() as isize - self.destroyed.get() as isize
    }
}

/// Delegating engine that records every handle creation and destruction,
/// including secondary handles returned by outline.
pub struct CountingEngine {
    inner: KurboEngine,
    counters: EngineCounters,
}

impl CountingEngine {
    pub fn new(counters: EngineCounters) -> Self {
        Self {
            inner: KurboEngine::new(),
            counters,
        }
    }
}

impl BezierEngine for CountingEngine {
    fn create(&mut self, handles: &[BezierHandle], closed: bool) -> BeztoysResult<EngineShapeId> {
        let id = self.inner.create(handles, closed)?;
        self.counters.created.set(self.counters.created.get() + 1);
        Ok(id)
    }

    fn destroy(&mut self, id: EngineShapeId) {
        self.counters.destroyed.set(self.counters.destroyed.get() + 1);
        self.inner.destroy(id);
    }

    fn read_back(&self, id: EngineShapeId) -> BeztoysResult<(Vec<BezierHandle>, bool)> {
        self.inner.read_back(id)
    }

    fn offset(
        &mut self,
        id: EngineShapeId,
        distance: f64,
        join: JoinStyle,
        miter_limit: f64,
    ) -> BeztoysResult<()> {
        self.inner.offset(id, distance, join, miter_limit)
    }

    fn outline(
        &mut self,
        id: EngineShapeId,
        half_width: f64,
        join: JoinStyle,
        cap: CapStyle,
        miter_limit: f64,
    ) -> BeztoysResult<Option<EngineShapeId>> {
        let secondary = self.inner.outline(id, half_width, join, cap, miter_limit)?;
        if secondary.is_some() {
            self.counters.created.set(self.counters.created.get() + 1);
        }
        Ok(secondary)
    }

    fn rotate(&mut self, id: EngineShapeId, angle: f64, pivot: Point) -> BeztoysResult<()> {
        self.inner.rotate(id, angle, pivot)
    }

    fn reverse_winding(&mut self, id: EngineShapeId) -> BeztoysResult<()> {
        self.inner.reverse_winding(id)
    }

    fn bounding_box(&self, id: EngineShapeId) -> BeztoysResult<Rect> {
        self.inner.bounding_box(id)
    }

    fn contains_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<bool> {
        self.inner.contains_point(id, point)
    }

    fn project_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<Point> {
        self.inner.project_point(id, point)
    }

    fn position_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Point> {
        self.inner.position_at(id, t)
    }

    fn tangent_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2> {
        self.inner.tangent_at(id, t)
    }

    fn normal_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2> {
        self.inner.normal_at(id, t)
    }

    fn curvature_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<f64> {
        self.inner.curvature_at(id, t)
    }

    fn self_intersections(
        &self,
        id: EngineShapeId,
        spatial_tol: f64,
        param_tol: f64,
    ) -> BeztoysResult<Vec<f64>> {
        self.inner.self_intersections(id, spatial_tol, param_tol)
    }
}
