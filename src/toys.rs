use std::f64::consts::TAU;

use kurbo::{Point, Rect, Size, Vec2};

use crate::{
    bridge::send_to_engine,
    engine::{BezierEngine, CapStyle, JoinStyle},
    error::BeztoysResult,
    shape::BezierShape,
};

/// Shared animation period of all time-driven toys, in seconds.
pub const ANIM_CYCLE_SECS: f64 = 10.0;

/// Curvatures below this magnitude are treated as flat; the radius of
/// curvature is unbounded there and must not be derived by division.
pub const CURVATURE_EPS: f64 = 1e-3;

/// Distance at which the bouncing probe counts as having met the pointer.
const POINTER_HIT_TOLERANCE: f64 = 10.0;

/// Tolerances for the self-intersection search (spatial, parametric).
const SELF_INTERSECT_TOL: f64 = 1e-3;
/// Fixed offset applied before searching for self-intersections.
const SELF_INTERSECT_OFFSET: f64 = 30.0;

/// Per-frame inputs, threaded explicitly so tests can inject synthetic time
/// and pointer state.
#[derive(Clone, Copy, Debug)]
pub struct ToyCtx {
    /// Seconds since the session started.
    pub elapsed: f64,
    pub viewport: Size,
    pub pointer: Point,
}

impl ToyCtx {
    pub fn new(elapsed: f64, viewport: Size, pointer: Point) -> Self {
        Self {
            elapsed,
            viewport,
            pointer,
        }
    }

    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width * 0.5, self.viewport.height * 0.5)
    }
}

/// Fraction of the way through the current `interval`-second cycle, in [0,1).
pub fn modulo_time(elapsed: f64, interval: f64) -> f64 {
    (elapsed / interval).rem_euclid(1.0)
}

/// Sine wave with period `interval` seconds, in [-1,1].
pub fn sine_time(elapsed: f64, interval: f64) -> f64 {
    (elapsed * TAU / interval).sin()
}

/// Wraps a raw boundary parameter into [0,1) before a position lookup.
/// Intersection solvers may report values outside the unit range.
pub fn normalize_t(raw: f64) -> f64 {
    raw.abs().fract()
}

/// A point a toy wants surfaced alongside the derived shape.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LabeledPoint {
    pub label: String,
    pub pos: Point,
    /// Containment result, when the point is a hit-test probe.
    pub hit: Option<bool>,
}

/// A line segment a toy wants surfaced (tangents, normals, projections).
#[derive(Clone, Debug, serde::Serialize)]
pub struct LabeledSegment {
    pub label: String,
    pub from: Point,
    pub to: Point,
}

/// Auxiliary derived output of one toy application. Fully replaced on every
/// apply; never merged across frames.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Annotations {
    pub extra_shape: Option<BezierShape>,
    pub points: Vec<LabeledPoint>,
    pub segments: Vec<LabeledSegment>,
}

/// One named transformation of the demo gallery.
///
/// Constructed once at startup and kept alive until exit; `apply` may mutate
/// internal animated parameters and auxiliary shapes on every frame it runs.
/// All engine access goes through the bridge, and `apply` is only invoked on
/// shapes with at least two handles.
pub trait Toy {
    fn name(&self) -> &str;

    /// Applies the transformation, draining the result into `output` (handed
    /// in pre-cleared by the session).
    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()>;

    /// Human-readable description and current parameter values, one line each.
    fn describe_params(&self) -> Vec<String> {
        Vec::new()
    }

    fn annotations(&self) -> Annotations {
        Annotations::default()
    }
}

/// The built-in catalog, in presentation order.
pub fn builtin_toys() -> Vec<Box<dyn Toy>> {
    vec![
        Box::new(OffsetToy::new()),
        Box::new(OutlineToy::new()),
        Box::new(RotationToy::new()),
        Box::new(ReverseWindingToy),
        Box::new(BoundingBoxToy::new()),
        Box::new(HitTestToy::new(0x00c0_ffee)),
        Box::new(EvaluateToy::new()),
        Box::new(SelfIntersectToy::new()),
    ]
}

/// Animated offset distance and join style shared by the offset and outline
/// toys: the distance swings sinusoidally and the join style steps through
/// its cycle once per period.
#[derive(Clone, Copy, Debug)]
struct OffsetParams {
    distance: f64,
    join: JoinStyle,
    last_cycle: u64,
}

impl OffsetParams {
    fn new() -> Self {
        Self {
            distance: 0.0,
            join: JoinStyle::Bevel,
            last_cycle: 0,
        }
    }

    fn update(&mut self, ctx: &ToyCtx) {
        self.distance = sine_time(ctx.elapsed, ANIM_CYCLE_SECS) * 30.0;
        let cycle = (ctx.elapsed / ANIM_CYCLE_SECS).max(0.0).floor() as u64;
        if cycle != self.last_cycle {
            self.last_cycle = cycle;
            self.join = self.join.cycled();
        }
    }
}

pub struct OffsetToy {
    params: OffsetParams,
}

impl OffsetToy {
    pub fn new() -> Self {
        Self {
            params: OffsetParams::new(),
        }
    }
}

impl Default for OffsetToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for OffsetToy {
    fn name(&self) -> &str {
        "Offset"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        self.params.update(ctx);
        let mut shape = send_to_engine(engine, input)?;
        shape.offset(self.params.distance, self.params.join, 0.0)?;
        shape.drain_into(output)
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Offsets the shape by an amount in pixels.".to_string(),
            "Beware the winding order: counter-clockwise input reverses the direction.".to_string(),
            format!("Offset = {:.2}", self.params.distance),
            format!("Join = {}", self.params.join.label()),
        ]
    }
}

pub struct OutlineToy {
    params: OffsetParams,
    ring: Option<BezierShape>,
}

impl OutlineToy {
    pub fn new() -> Self {
        Self {
            params: OffsetParams::new(),
            ring: None,
        }
    }

    /// The inner ring produced by the last apply, when the engine yielded one.
    pub fn ring(&self) -> Option<&BezierShape> {
        self.ring.as_ref()
    }
}

impl Default for OutlineToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for OutlineToy {
    fn name(&self) -> &str {
        "Outline"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        self.params.update(ctx);
        let mut shape = send_to_engine(engine, input)?;
        // The secondary ring is optional at every call; whatever the engine
        // returned replaces last frame's ring wholesale.
        self.ring = shape.outline(self.params.distance, self.params.join, CapStyle::Butt, 0.0)?;
        shape.drain_into(output)
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Creates an outline of the shape at a given distance.".to_string(),
            format!("Distance = {:.2}", self.params.distance),
            format!("Join = {}", self.params.join.label()),
        ]
    }

    fn annotations(&self) -> Annotations {
        Annotations {
            extra_shape: self.ring.clone(),
            ..Annotations::default()
        }
    }
}

pub struct RotationToy {
    pivot: Point,
    angle: f64,
}

impl RotationToy {
    pub fn new() -> Self {
        Self {
            pivot: Point::ZERO,
            angle: 0.0,
        }
    }
}

impl Default for RotationToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for RotationToy {
    fn name(&self) -> &str {
        "Rotation"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        self.pivot = ctx.viewport_center();
        self.angle = modulo_time(ctx.elapsed, ANIM_CYCLE_SECS) * TAU;
        let mut shape = send_to_engine(engine, input)?;
        shape.rotate(self.angle, self.pivot)?;
        shape.drain_into(output)
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Rotates the shape (in radians) around the viewport center.".to_string(),
            format!("Rotation = {:.3}", self.angle),
            format!("Center = ({:.0}, {:.0})", self.pivot.x, self.pivot.y),
        ]
    }

    fn annotations(&self) -> Annotations {
        Annotations {
            points: vec![LabeledPoint {
                label: "pivot".to_string(),
                pos: self.pivot,
                hit: None,
            }],
            ..Annotations::default()
        }
    }
}

pub struct ReverseWindingToy;

impl Toy for ReverseWindingToy {
    fn name(&self) -> &str {
        "Reverse Winding"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        _ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        let mut shape = send_to_engine(engine, input)?;
        shape.reverse_winding()?;
        shape.drain_into(output)
    }

    fn describe_params(&self) -> Vec<String> {
        vec!["Reverses the shape winding.".to_string()]
    }
}

pub struct BoundingBoxToy {
    bb: Rect,
}

impl BoundingBoxToy {
    pub fn new() -> Self {
        Self { bb: Rect::ZERO }
    }

    pub fn rect(&self) -> Rect {
        self.bb
    }
}

impl Default for BoundingBoxToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for BoundingBoxToy {
    fn name(&self) -> &str {
        "Bounding Box"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        _ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        let shape = send_to_engine(engine, input)?;
        self.bb = shape.bounding_box()?;
        // The output is a synthesized rectangle, not a drain of the handle;
        // the guard still destroys the handle when it drops.
        *output = BezierShape::from_rect(self.bb);
        output.mark_changed();
        Ok(())
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Calculates the bounding box that contains the shape.".to_string(),
            format!("Position = ({:.1}, {:.1})", self.bb.x0, self.bb.y0),
            format!("Size = ({:.1}, {:.1})", self.bb.width(), self.bb.height()),
        ]
    }
}

pub struct HitTestToy {
    sim_pos: Point,
    sim_vel: Vec2,
    sim_speed: f64,
    rng: u64,
    pointer_pos: Point,
    pointer_hit: bool,
    sim_hit: bool,
    pointer_proj: Point,
    sim_proj: Point,
}

impl HitTestToy {
    pub fn new(seed: u64) -> Self {
        Self {
            sim_pos: Point::new(100.0, 100.0),
            sim_vel: Vec2::new(2.4, 1.8),
            sim_speed: 3.0,
            rng: seed | 1,
            pointer_pos: Point::ZERO,
            pointer_hit: false,
            sim_hit: false,
            pointer_proj: Point::ZERO,
            sim_proj: Point::ZERO,
        }
    }

    pub fn probe_pos(&self) -> Point {
        self.sim_pos
    }

    /// xorshift64* over the toy's own state: deterministic per seed, no
    /// ambient entropy.
    fn next_unit(&mut self) -> f64 {
        let mut x = self.rng;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng = x;
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

impl Toy for HitTestToy {
    fn name(&self) -> &str {
        "Hit Test"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        self.sim_pos += self.sim_vel;
        if (self.sim_pos - ctx.pointer).hypot() <= POINTER_HIT_TOLERANCE {
            let angle = self.next_unit() * TAU;
            self.sim_vel = Vec2::new(angle.sin(), angle.cos()) * self.sim_speed;
        } else {
            if self.sim_pos.x < 0.0 || self.sim_pos.x > ctx.viewport.width {
                self.sim_vel.x *= -1.0;
            }
            if self.sim_pos.y < 0.0 || self.sim_pos.y > ctx.viewport.height {
                self.sim_vel.y *= -1.0;
            }
        }

        self.pointer_pos = ctx.pointer;
        let shape = send_to_engine(engine, input)?;
        self.sim_hit = shape.contains_point(self.sim_pos)?;
        self.pointer_hit = shape.contains_point(self.pointer_pos)?;
        self.pointer_proj = shape.project_point(self.pointer_pos)?;
        self.sim_proj = shape.project_point(self.sim_pos)?;

        // The source passes through unchanged as the primary output.
        output.clone_from(input);
        output.mark_changed();
        Ok(())
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Checks if a point is contained in the shape.".to_string(),
            "Also finds the closest point on the curve, aka. projection.".to_string(),
            format!("Pointer hit = {}", self.pointer_hit),
            format!("Probe hit = {}", self.sim_hit),
        ]
    }

    fn annotations(&self) -> Annotations {
        Annotations {
            points: vec![
                LabeledPoint {
                    label: "probe".to_string(),
                    pos: self.sim_pos,
                    hit: Some(self.sim_hit),
                },
                LabeledPoint {
                    label: "pointer".to_string(),
                    pos: self.pointer_pos,
                    hit: Some(self.pointer_hit),
                },
            ],
            segments: vec![
                LabeledSegment {
                    label: "probe projection".to_string(),
                    from: self.sim_pos,
                    to: self.sim_proj,
                },
                LabeledSegment {
                    label: "pointer projection".to_string(),
                    from: self.pointer_pos,
                    to: self.pointer_proj,
                },
            ],
            ..Annotations::default()
        }
    }
}

pub struct EvaluateToy {
    t: f64,
    pos: Point,
    tangent: Vec2,
    normal: Vec2,
    curvature: f64,
}

impl EvaluateToy {
    pub fn new() -> Self {
        Self {
            t: 0.0,
            pos: Point::ZERO,
            tangent: Vec2::ZERO,
            normal: Vec2::ZERO,
            curvature: 0.0,
        }
    }

    /// Radius of curvature at the sampled parameter, unless the boundary is
    /// locally flat (near-zero curvature means an unbounded radius).
    pub fn radius_of_curvature(&self) -> Option<f64> {
        (self.curvature.abs() > CURVATURE_EPS).then(|| 1.0 / self.curvature)
    }
}

impl Default for EvaluateToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for EvaluateToy {
    fn name(&self) -> &str {
        "Evaluate"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        self.t = modulo_time(ctx.elapsed, ANIM_CYCLE_SECS);
        let shape = send_to_engine(engine, input)?;
        self.pos = shape.position_at(self.t)?;
        self.tangent = shape.tangent_at(self.t)?;
        self.normal = shape.normal_at(self.t)?;
        self.curvature = shape.curvature_at(self.t)?;

        output.clone_from(input);
        output.mark_changed();
        Ok(())
    }

    fn describe_params(&self) -> Vec<String> {
        let radius = match self.radius_of_curvature() {
            Some(r) => format!("{r:.1}"),
            None => "unbounded".to_string(),
        };
        vec![
            "Evaluates a t-value position.".to_string(),
            format!("TValue = {:.3}", self.t),
            format!("Position = ({:.1}, {:.1})", self.pos.x, self.pos.y),
            format!("Curvature radius = {radius}"),
        ]
    }

    fn annotations(&self) -> Annotations {
        const VECTOR_SCALE: f64 = 20.0;
        let mut points = vec![LabeledPoint {
            label: "evaluated".to_string(),
            pos: self.pos,
            hit: None,
        }];
        let mut segments = vec![
            LabeledSegment {
                label: "tangent".to_string(),
                from: self.pos,
                to: self.pos + self.tangent * VECTOR_SCALE,
            },
            LabeledSegment {
                label: "normal".to_string(),
                from: self.pos - self.normal * VECTOR_SCALE * 0.5,
                to: self.pos + self.normal * VECTOR_SCALE * 0.5,
            },
        ];
        if let Some(radius) = self.radius_of_curvature() {
            let center = self.pos + self.normal * radius;
            points.push(LabeledPoint {
                label: "curvature center".to_string(),
                pos: center,
                hit: None,
            });
            segments.push(LabeledSegment {
                label: "curvature radius".to_string(),
                from: self.pos,
                to: center,
            });
        }
        Annotations {
            points,
            segments,
            ..Annotations::default()
        }
    }
}

pub struct SelfIntersectToy {
    distance: f64,
    join: JoinStyle,
    t_values: Vec<f64>,
    crossings: Vec<Point>,
}

impl SelfIntersectToy {
    pub fn new() -> Self {
        Self {
            distance: SELF_INTERSECT_OFFSET,
            join: JoinStyle::Bevel,
            t_values: Vec::new(),
            crossings: Vec::new(),
        }
    }

    pub fn crossings(&self) -> &[Point] {
        &self.crossings
    }

    pub fn t_values(&self) -> &[f64] {
        &self.t_values
    }
}

impl Default for SelfIntersectToy {
    fn default() -> Self {
        Self::new()
    }
}

impl Toy for SelfIntersectToy {
    fn name(&self) -> &str {
        "Self Intersect"
    }

    fn apply(
        &mut self,
        engine: &mut dyn BezierEngine,
        _ctx: &ToyCtx,
        input: &BezierShape,
        output: &mut BezierShape,
    ) -> BeztoysResult<()> {
        let mut shape = send_to_engine(engine, input)?;
        shape.offset(self.distance, self.join, 0.0)?;

        // The intersection queries run on the offset shape, so the one handle
        // stays alive across the drain and every lookup below.
        shape.drain_into(output)?;

        self.t_values = shape.self_intersections(SELF_INTERSECT_TOL, SELF_INTERSECT_TOL)?;
        self.crossings.clear();
        for &raw in &self.t_values {
            self.crossings.push(shape.position_at(normalize_t(raw))?);
        }
        Ok(())
    }

    fn describe_params(&self) -> Vec<String> {
        vec![
            "Finds self intersections in an offset to detect errors.".to_string(),
            "Also demonstrates how to retrieve a pos from a t-value.".to_string(),
            format!("Offset = {:.1}", self.distance),
            format!("Join = {}", self.join.label()),
            format!("Amount of self intersections: {}", self.crossings.len()),
        ]
    }

    fn annotations(&self) -> Annotations {
        Annotations {
            points: self
                .crossings
                .iter()
                .map(|p| LabeledPoint {
                    label: "crossing".to_string(),
                    pos: *p,
                    hit: None,
                })
                .collect(),
            ..Annotations::default()
        }
    }
}
