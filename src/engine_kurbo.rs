use std::collections::HashMap;

use kurbo::{
    Affine, BezPath, CubicBez, ParamCurve, ParamCurveDeriv, ParamCurveNearest, Point, Rect,
    Shape as _, Vec2,
};

use crate::{
    engine::{BezierEngine, CapStyle, EngineShapeId, JoinStyle},
    error::{BeztoysError, BeztoysResult},
    shape::{BezierHandle, BezierShape},
};

const EPS: f64 = 1e-9;
/// Gap below which two offset segment ends are fused into one anchor instead
/// of getting a join inserted.
const JOIN_MERGE_EPS: f64 = 1e-6;
/// Miter ratio applied when the caller passes a non-positive limit.
const DEFAULT_MITER_LIMIT: f64 = 4.0;
/// Accuracy for closest-point solves.
const NEAREST_ACCURACY: f64 = 1e-6;
/// Polyline samples per segment for the self-intersection search.
const INTERSECT_SAMPLES: usize = 32;

struct ShapeRec {
    shape: BezierShape,
}

impl ShapeRec {
    fn cubics(&self) -> Vec<CubicBez> {
        self.shape.to_cubics()
    }

    fn bez_path(&self) -> BezPath {
        let segs = self.cubics();
        let mut path = BezPath::new();
        let Some(first) = segs.first() else {
            return path;
        };
        path.move_to(first.p0);
        for seg in &segs {
            path.curve_to(seg.p1, seg.p2, seg.p3);
        }
        if self.shape.closed {
            path.close_path();
        }
        path
    }
}

/// In-crate geometry engine over kurbo curve primitives.
///
/// Shapes are stored in a slab keyed by [`EngineShapeId`]; every id handed out
/// stays valid until `destroy`.
pub struct KurboEngine {
    shapes: HashMap<u64, ShapeRec>,
    next_id: u64,
}

impl KurboEngine {
    pub fn new() -> Self {
        Self {
            shapes: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of engine-owned shapes currently alive. Zero between frames when
    /// the bridge discipline holds.
    pub fn live_shapes(&self) -> usize {
        self.shapes.len()
    }

    fn rec(&self, id: EngineShapeId) -> BeztoysResult<&ShapeRec> {
        self.shapes
            .get(&id.0)
            .ok_or_else(|| BeztoysError::engine(format!("unknown shape id {}", id.0)))
    }

    fn rec_mut(&mut self, id: EngineShapeId) -> BeztoysResult<&mut ShapeRec> {
        self.shapes
            .get_mut(&id.0)
            .ok_or_else(|| BeztoysError::engine(format!("unknown shape id {}", id.0)))
    }

    fn insert(&mut self, shape: BezierShape) -> EngineShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes.insert(id, ShapeRec { shape });
        EngineShapeId(id)
    }

    /// Maps a global parameter to the segment it falls on and the local
    /// parameter within that segment.
    fn locate(&self, id: EngineShapeId, t: f64) -> BeztoysResult<(CubicBez, f64)> {
        let segs = self.rec(id)?.cubics();
        if segs.is_empty() {
            return Err(BeztoysError::engine("shape has no segments"));
        }
        let n = segs.len() as f64;
        let scaled = t.clamp(0.0, 1.0) * n;
        let mut idx = scaled.floor() as usize;
        let mut local = scaled - idx as f64;
        if idx >= segs.len() {
            idx = segs.len() - 1;
            local = 1.0;
        }
        Ok((segs[idx], local))
    }
}

impl Default for KurboEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BezierEngine for KurboEngine {
    fn create(&mut self, handles: &[BezierHandle], closed: bool) -> BeztoysResult<EngineShapeId> {
        if handles.len() < 2 {
            return Err(BeztoysError::engine(
                "shape needs at least 2 handles to be created",
            ));
        }
        Ok(self.insert(BezierShape::new(handles.to_vec(), closed)))
    }

    fn destroy(&mut self, id: EngineShapeId) {
        self.shapes.remove(&id.0);
    }

    fn read_back(&self, id: EngineShapeId) -> BeztoysResult<(Vec<BezierHandle>, bool)> {
        let rec = self.rec(id)?;
        Ok((rec.shape.handles.clone(), rec.shape.closed))
    }

    fn offset(
        &mut self,
        id: EngineShapeId,
        distance: f64,
        join: JoinStyle,
        miter_limit: f64,
    ) -> BeztoysResult<()> {
        if distance.abs() < EPS {
            return Ok(());
        }
        let rec = self.rec_mut(id)?;
        let handles = offset_handles(&rec.shape, distance, join, miter_limit)?;
        rec.shape = BezierShape::new(handles, rec.shape.closed);
        Ok(())
    }

    fn outline(
        &mut self,
        id: EngineShapeId,
        half_width: f64,
        join: JoinStyle,
        cap: CapStyle,
        miter_limit: f64,
    ) -> BeztoysResult<Option<EngineShapeId>> {
        let w = half_width.abs();
        let source = self.rec(id)?.shape.clone();

        if source.closed {
            // Outward ring stays the primary result, the inward ring becomes a
            // new engine-owned shape with its winding flipped so the pair
            // bounds the stroked band.
            let outer = offset_handles(&source, -w, join, miter_limit)?;
            let inner = reversed_handles(&offset_handles(&source, w, join, miter_limit)?);
            self.rec_mut(id)?.shape = BezierShape::new(outer, true);
            let secondary = self.insert(BezierShape::new(inner, true));
            return Ok(Some(secondary));
        }

        // Open path: one closed ring going out along one side and back along
        // the other, with caps across the two ends.
        let forward = offset_handles(&source, w, join, miter_limit)?;
        let backward = reversed_handles(&offset_handles(&source, -w, join, miter_limit)?);
        let ring = cap_ring(forward, backward, cap, w);
        self.rec_mut(id)?.shape = BezierShape::new(ring, true);
        Ok(None)
    }

    fn rotate(&mut self, id: EngineShapeId, angle: f64, pivot: Point) -> BeztoysResult<()> {
        let rec = self.rec_mut(id)?;
        let xform = Affine::rotate_about(angle, pivot);
        for h in &mut rec.shape.handles {
            h.anchor = xform * h.anchor;
            h.in_ctrl = xform * h.in_ctrl;
            h.out_ctrl = xform * h.out_ctrl;
        }
        Ok(())
    }

    fn reverse_winding(&mut self, id: EngineShapeId) -> BeztoysResult<()> {
        let rec = self.rec_mut(id)?;
        rec.shape.handles = reversed_handles(&rec.shape.handles);
        Ok(())
    }

    fn bounding_box(&self, id: EngineShapeId) -> BeztoysResult<Rect> {
        let rec = self.rec(id)?;
        if rec.shape.handles.is_empty() {
            return Err(BeztoysError::engine("shape has no handles"));
        }
        Ok(rec.bez_path().bounding_box())
    }

    fn contains_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<bool> {
        Ok(self.rec(id)?.bez_path().contains(point))
    }

    fn project_point(&self, id: EngineShapeId, point: Point) -> BeztoysResult<Point> {
        let segs = self.rec(id)?.cubics();
        if segs.is_empty() {
            return Err(BeztoysError::engine("shape has no segments"));
        }
        let mut best: Option<(f64, Point)> = None;
        for seg in &segs {
            let hit = seg.nearest(point, NEAREST_ACCURACY);
            let pos = seg.eval(hit.t);
            if best.is_none_or(|(d, _)| hit.distance_sq < d) {
                best = Some((hit.distance_sq, pos));
            }
        }
        Ok(best.map(|(_, p)| p).unwrap_or(point))
    }

    fn position_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Point> {
        let (seg, local) = self.locate(id, t)?;
        Ok(seg.eval(local))
    }

    fn tangent_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2> {
        let (seg, local) = self.locate(id, t)?;
        Ok(segment_tangent(&seg, local))
    }

    fn normal_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<Vec2> {
        let (seg, local) = self.locate(id, t)?;
        Ok(rot90(segment_tangent(&seg, local)))
    }

    fn curvature_at(&self, id: EngineShapeId, t: f64) -> BeztoysResult<f64> {
        let (seg, local) = self.locate(id, t)?;
        let d1 = seg.deriv().eval(local).to_vec2();
        let d2 = seg.deriv().deriv().eval(local).to_vec2();
        let speed2 = d1.hypot2();
        let denom = speed2 * speed2.sqrt();
        if denom < EPS {
            // Degenerate speed: direction is undefined, report flat.
            return Ok(0.0);
        }
        Ok(d1.cross(d2) / denom)
    }

    fn self_intersections(
        &self,
        id: EngineShapeId,
        spatial_tol: f64,
        param_tol: f64,
    ) -> BeztoysResult<Vec<f64>> {
        let rec = self.rec(id)?;
        let segs = rec.cubics();
        if segs.is_empty() {
            return Ok(Vec::new());
        }

        // Flatten to a polyline with global parameters attached.
        let n = segs.len();
        let mut pts: Vec<(f64, Point)> = Vec::with_capacity(n * INTERSECT_SAMPLES + 1);
        for (i, seg) in segs.iter().enumerate() {
            for s in 0..INTERSECT_SAMPLES {
                let local = s as f64 / INTERSECT_SAMPLES as f64;
                let t = (i as f64 + local) / n as f64;
                pts.push((t, seg.eval(local)));
            }
        }
        pts.push((1.0, segs[n - 1].eval(1.0)));

        let edges = pts.len() - 1;
        // The parametric merge window is never below two sample spacings, so
        // a crossing straddling a sample boundary is not reported twice.
        let merge_tol = param_tol.max(2.0 / edges as f64);

        let mut crossings: Vec<(f64, f64, Point)> = Vec::new();
        for a in 0..edges {
            for b in (a + 2)..edges {
                if rec.shape.closed && a == 0 && b == edges - 1 {
                    // Wrap-adjacent pair shares the seam vertex.
                    continue;
                }
                let Some((ta, tb, pos)) =
                    edge_crossing(pts[a], pts[a + 1], pts[b], pts[b + 1])
                else {
                    continue;
                };
                let duplicate = crossings.iter().any(|&(xa, xb, xp)| {
                    let params_close =
                        (ta - xa).abs() <= merge_tol && (tb - xb).abs() <= merge_tol;
                    let pos_close = (pos - xp).hypot() <= spatial_tol
                        && (ta - xa).abs() <= 2.0 * merge_tol
                        && (tb - xb).abs() <= 2.0 * merge_tol;
                    params_close || pos_close
                });
                if !duplicate {
                    crossings.push((ta, tb, pos));
                }
            }
        }

        let mut out: Vec<f64> = Vec::with_capacity(crossings.len() * 2);
        for (ta, tb, _) in crossings {
            out.push(ta);
            out.push(tb);
        }
        out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(out)
    }
}

/// Unit tangent of a segment at a local parameter, falling back to the chord
/// when the derivative collapses (corner handles).
fn segment_tangent(seg: &CubicBez, local: f64) -> Vec2 {
    let d = seg.deriv().eval(local).to_vec2();
    normalized_or(d, seg.p3 - seg.p0)
}

fn normalized_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > EPS {
        return v / len;
    }
    let flen = fallback.hypot();
    if flen > EPS {
        fallback / flen
    } else {
        Vec2::new(1.0, 0.0)
    }
}

/// Quarter turn counterclockwise (in math orientation).
fn rot90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Parametric line-line intersection: `p1 + t*d1` with `p2 + u*d2`.
fn line_intersect(p1: Point, d1: Vec2, p2: Point, d2: Vec2) -> Option<Point> {
    let cross = d1.cross(d2);
    if cross.abs() < EPS {
        return None;
    }
    let dp = p2 - p1;
    let t = dp.cross(d2) / cross;
    Some(p1 + d1 * t)
}

/// Bounded crossing of two polyline edges carrying global parameters.
/// Endpoint-exclusive on the far side so shared vertices do not double-count.
fn edge_crossing(
    a0: (f64, Point),
    a1: (f64, Point),
    b0: (f64, Point),
    b1: (f64, Point),
) -> Option<(f64, f64, Point)> {
    let da = a1.1 - a0.1;
    let db = b1.1 - b0.1;
    let cross = da.cross(db);
    if cross.abs() < EPS {
        return None;
    }
    let dp = b0.1 - a0.1;
    let t = dp.cross(db) / cross;
    let u = dp.cross(da) / cross;
    if !(0.0..1.0).contains(&t) || !(0.0..1.0).contains(&u) {
        return None;
    }
    let ta = a0.0 + (a1.0 - a0.0) * t;
    let tb = b0.0 + (b1.0 - b0.0) * u;
    Some((ta, tb, a0.1 + da * t))
}

/// Per-segment Tiller-Hanson offset: displace the control polygon legs along
/// their normals and re-intersect them for the interior control points.
fn offset_cubic(seg: &CubicBez, d: f64) -> CubicBez {
    let chord = seg.p3 - seg.p0;
    let l0 = normalized_or(seg.p1 - seg.p0, chord);
    let l1 = normalized_or(seg.p2 - seg.p1, chord);
    let l2 = normalized_or(seg.p3 - seg.p2, chord);

    let n0 = rot90(l0);
    let n1 = rot90(l1);
    let n2 = rot90(l2);

    let q0 = seg.p0 + n0 * d;
    let q3 = seg.p3 + n2 * d;

    let q1 = line_intersect(seg.p0 + n0 * d, l0, seg.p1 + n1 * d, l1)
        .unwrap_or(seg.p1 + n0 * d);
    let q2 = line_intersect(seg.p1 + n1 * d, l1, seg.p2 + n2 * d, l2)
        .unwrap_or(seg.p2 + n2 * d);

    CubicBez::new(q0, q1, q2, q3)
}

/// Emits the handle(s) for the junction between two consecutive offset
/// segments, inserting the requested join when their ends do not meet.
fn push_join(
    out: &mut Vec<BezierHandle>,
    prev: &CubicBez,
    next: &CubicBez,
    corner: Point,
    d: f64,
    join: JoinStyle,
    miter_limit: f64,
) {
    let e = prev.p3;
    let s = next.p0;
    if (e - s).hypot() < JOIN_MERGE_EPS {
        out.push(BezierHandle::new(e.midpoint(s), prev.p2, next.p1));
        return;
    }

    match join {
        JoinStyle::Bevel => {
            out.push(BezierHandle::new(e, prev.p2, e));
            out.push(BezierHandle::new(s, s, next.p1));
        }
        JoinStyle::Miter => {
            let ta = normalized_or(prev.p3 - prev.p2, prev.p3 - prev.p0);
            let tb = normalized_or(next.p1 - next.p0, next.p3 - next.p0);
            let limit = if miter_limit > 0.0 {
                miter_limit
            } else {
                DEFAULT_MITER_LIMIT
            };
            if let Some(m) = line_intersect(e, ta, s, tb) {
                let ratio = (m - corner).hypot() / d.abs().max(EPS);
                if ratio <= limit {
                    out.push(BezierHandle::new(e, prev.p2, e));
                    out.push(BezierHandle::corner(m));
                    out.push(BezierHandle::new(s, s, next.p1));
                    return;
                }
            }
            // Spike too long or tangents parallel: bevel.
            out.push(BezierHandle::new(e, prev.p2, e));
            out.push(BezierHandle::new(s, s, next.p1));
        }
        JoinStyle::Round => {
            let va = e - corner;
            let vb = s - corner;
            let theta = f64::atan2(va.cross(vb), va.dot(vb));
            if theta.abs() < EPS || va.hypot() < EPS || vb.hypot() < EPS {
                out.push(BezierHandle::new(e, prev.p2, e));
                out.push(BezierHandle::new(s, s, next.p1));
                return;
            }
            // Single-cubic arc approximation around the original corner.
            let h = (4.0 / 3.0) * (theta / 4.0).tan() * va.hypot();
            let ua = va / va.hypot();
            let ub = vb / vb.hypot();
            out.push(BezierHandle::new(e, prev.p2, e + rot90(ua) * h));
            out.push(BezierHandle::new(s, s - rot90(ub) * h, next.p1));
        }
    }
}

/// Offsets a whole shape, stitching segment offsets with the join policy.
fn offset_handles(
    shape: &BezierShape,
    d: f64,
    join: JoinStyle,
    miter_limit: f64,
) -> BeztoysResult<Vec<BezierHandle>> {
    let segs = shape.to_cubics();
    if segs.is_empty() {
        return Err(BeztoysError::engine("shape has no segments to offset"));
    }
    if d.abs() < EPS {
        return Ok(shape.handles.clone());
    }

    let offs: Vec<CubicBez> = segs.iter().map(|s| offset_cubic(s, d)).collect();
    let n = offs.len();
    let mut handles = Vec::with_capacity(shape.handles.len() + n);

    if shape.closed {
        for i in 0..n {
            let prev = &offs[(i + n - 1) % n];
            let next = &offs[i];
            push_join(&mut handles, prev, next, segs[i].p0, d, join, miter_limit);
        }
    } else {
        let first = &offs[0];
        handles.push(BezierHandle::new(first.p0, first.p0, first.p1));
        for i in 0..n - 1 {
            push_join(
                &mut handles,
                &offs[i],
                &offs[i + 1],
                segs[i].p3,
                d,
                join,
                miter_limit,
            );
        }
        let last = &offs[n - 1];
        handles.push(BezierHandle::new(last.p3, last.p2, last.p3));
    }

    Ok(handles)
}

/// Reverses traversal direction: handle order flips and in/out controls swap.
fn reversed_handles(handles: &[BezierHandle]) -> Vec<BezierHandle> {
    handles
        .iter()
        .rev()
        .map(|h| BezierHandle::new(h.anchor, h.out_ctrl, h.in_ctrl))
        .collect()
}

/// Joins the two offset sides of an open path into one closed ring, applying
/// the cap style across both ends.
fn cap_ring(
    mut forward: Vec<BezierHandle>,
    mut backward: Vec<BezierHandle>,
    cap: CapStyle,
    w: f64,
) -> Vec<BezierHandle> {
    match cap {
        // Straight cut across the end: consecutive corner-ish anchors already
        // produce the connecting line.
        CapStyle::Butt => {}
        CapStyle::Square => {
            extend_end(&mut forward, w);
            extend_start(&mut forward, w);
            extend_end(&mut backward, w);
            extend_start(&mut backward, w);
        }
        CapStyle::Round => {
            if let (Some(fe), Some(bs)) = (forward.last_mut(), backward.first_mut()) {
                round_cap(fe, bs, w);
            }
            // Close the seam between the backward end and the forward start.
            if !backward.is_empty() && !forward.is_empty() {
                let last = backward.len() - 1;
                let (be, fs) = (&mut backward[last], &mut forward[0]);
                round_cap(be, fs, w);
            }
        }
    }
    forward.extend(backward);
    forward
}

fn extend_end(handles: &mut [BezierHandle], w: f64) {
    if handles.len() < 2 {
        return;
    }
    let dir = normalized_or(
        handles[handles.len() - 1].anchor - handles[handles.len() - 2].anchor,
        Vec2::new(1.0, 0.0),
    );
    let h = handles.last_mut().expect("len checked");
    h.anchor += dir * w;
    h.in_ctrl += dir * w;
    h.out_ctrl = h.anchor;
}

fn extend_start(handles: &mut [BezierHandle], w: f64) {
    if handles.len() < 2 {
        return;
    }
    let dir = normalized_or(
        handles[0].anchor - handles[1].anchor,
        Vec2::new(-1.0, 0.0),
    );
    let h = &mut handles[0];
    h.anchor += dir * w;
    h.out_ctrl += dir * w;
    h.in_ctrl = h.anchor;
}

/// Bulges the connecting segment between the two sides into a half-circle
/// approximation (kappa = 4/3 for a 180 degree arc).
fn round_cap(end: &mut BezierHandle, start: &mut BezierHandle, w: f64) {
    let across = start.anchor - end.anchor;
    let out_dir = rot90(normalized_or(across, Vec2::new(1.0, 0.0)));
    let k = (4.0 / 3.0) * w;
    end.out_ctrl = end.anchor - out_dir * k;
    start.in_ctrl = start.anchor - out_dir * k;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clockwise unit square scaled to 100, in screen coordinates (y down).
    fn square(engine: &mut KurboEngine) -> EngineShapeId {
        let handles = vec![
            BezierHandle::corner(Point::new(0.0, 0.0)),
            BezierHandle::corner(Point::new(100.0, 0.0)),
            BezierHandle::corner(Point::new(100.0, 100.0)),
            BezierHandle::corner(Point::new(0.0, 100.0)),
        ];
        engine.create(&handles, true).unwrap()
    }

    fn bowtie(engine: &mut KurboEngine) -> EngineShapeId {
        let handles = vec![
            BezierHandle::corner(Point::new(0.0, 0.0)),
            BezierHandle::corner(Point::new(100.0, 100.0)),
            BezierHandle::corner(Point::new(100.0, 0.0)),
            BezierHandle::corner(Point::new(0.0, 100.0)),
        ];
        engine.create(&handles, true).unwrap()
    }

    #[test]
    fn create_rejects_short_shapes() {
        let mut engine = KurboEngine::new();
        assert!(engine.create(&[], true).is_err());
        assert!(
            engine
                .create(&[BezierHandle::corner(Point::new(1.0, 1.0))], true)
                .is_err()
        );
        assert_eq!(engine.live_shapes(), 0);
    }

    #[test]
    fn destroy_releases_shapes() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        assert_eq!(engine.live_shapes(), 1);
        engine.destroy(id);
        assert_eq!(engine.live_shapes(), 0);
        assert!(engine.read_back(id).is_err());
    }

    #[test]
    fn bounding_box_of_square() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        let bb = engine.bounding_box(id).unwrap();
        assert!((bb.x0 - 0.0).abs() < 1e-9);
        assert!((bb.y1 - 100.0).abs() < 1e-9);
        engine.destroy(id);
    }

    #[test]
    fn contains_and_projection() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        assert!(engine.contains_point(id, Point::new(50.0, 50.0)).unwrap());
        assert!(!engine.contains_point(id, Point::new(150.0, 50.0)).unwrap());

        let proj = engine.project_point(id, Point::new(50.0, -20.0)).unwrap();
        assert!((proj.x - 50.0).abs() < 1e-6);
        assert!(proj.y.abs() < 1e-6);
        engine.destroy(id);
    }

    #[test]
    fn parametric_evaluation_on_square() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);

        let p = engine.position_at(id, 0.125).unwrap();
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);

        let tan = engine.tangent_at(id, 0.125).unwrap();
        assert!((tan.x - 1.0).abs() < 1e-9);
        assert!(tan.y.abs() < 1e-9);

        let nrm = engine.normal_at(id, 0.125).unwrap();
        assert!(nrm.x.abs() < 1e-9);
        assert!((nrm.y - 1.0).abs() < 1e-9);

        // Straight edges are flat.
        assert_eq!(engine.curvature_at(id, 0.125).unwrap(), 0.0);
        engine.destroy(id);
    }

    #[test]
    fn reverse_winding_twice_is_identity() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        let (before, _) = engine.read_back(id).unwrap();
        engine.reverse_winding(id).unwrap();
        let (reversed, _) = engine.read_back(id).unwrap();
        assert_ne!(before, reversed);
        engine.reverse_winding(id).unwrap();
        let (after, _) = engine.read_back(id).unwrap();
        assert_eq!(before, after);
        engine.destroy(id);
    }

    #[test]
    fn rotate_half_turn_about_center() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        engine
            .rotate(id, std::f64::consts::PI, Point::new(50.0, 50.0))
            .unwrap();
        let (handles, _) = engine.read_back(id).unwrap();
        assert!((handles[0].anchor.x - 100.0).abs() < 1e-9);
        assert!((handles[0].anchor.y - 100.0).abs() < 1e-9);
        engine.destroy(id);
    }

    #[test]
    fn offset_positive_moves_inward_for_clockwise() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        engine.offset(id, 10.0, JoinStyle::Bevel, 0.0).unwrap();
        let (handles, _) = engine.read_back(id).unwrap();
        // The displaced top edge now runs along y = 10.
        assert!(
            handles
                .iter()
                .any(|h| h.anchor.y > 9.0 && h.anchor.y < 11.0)
        );
        engine.destroy(id);
    }

    #[test]
    fn offset_negative_grows_clockwise_shapes() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        engine.offset(id, -10.0, JoinStyle::Bevel, 0.0).unwrap();
        let bb = engine.bounding_box(id).unwrap();
        assert!(bb.x0 < -9.0);
        assert!(bb.y1 > 109.0);
        engine.destroy(id);
    }

    #[test]
    fn outline_of_closed_shape_yields_secondary() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        let secondary = engine
            .outline(id, 5.0, JoinStyle::Bevel, CapStyle::Butt, 0.0)
            .unwrap();
        let sec = secondary.expect("closed input should yield an inner ring");
        assert_eq!(engine.live_shapes(), 2);

        // Outer ring grew, inner ring shrank.
        let outer = engine.bounding_box(id).unwrap();
        let inner = engine.bounding_box(sec).unwrap();
        assert!(outer.x0 < 0.0);
        assert!(inner.x0 > outer.x0);
        assert!(inner.width() < outer.width());

        engine.destroy(sec);
        engine.destroy(id);
        assert_eq!(engine.live_shapes(), 0);
    }

    #[test]
    fn outline_of_open_path_has_no_secondary() {
        let mut engine = KurboEngine::new();
        let handles = vec![
            BezierHandle::corner(Point::new(0.0, 0.0)),
            BezierHandle::corner(Point::new(100.0, 0.0)),
        ];
        let id = engine.create(&handles, false).unwrap();
        let secondary = engine
            .outline(id, 5.0, JoinStyle::Bevel, CapStyle::Butt, 0.0)
            .unwrap();
        assert!(secondary.is_none());
        let (ring, closed) = engine.read_back(id).unwrap();
        assert!(closed);
        assert!(ring.len() >= 4);
        engine.destroy(id);
    }

    #[test]
    fn bowtie_self_intersections_land_in_the_middle() {
        let mut engine = KurboEngine::new();
        let id = bowtie(&mut engine);
        let ts = engine.self_intersections(id, 1e-3, 1e-3).unwrap();
        assert!(!ts.is_empty());
        assert_eq!(ts.len() % 2, 0);
        for t in &ts {
            assert!((0.0..1.0).contains(t));
            let p = engine.position_at(id, *t).unwrap();
            // Straight edges make the crossing exact at (50, 50).
            assert!((p.x - 50.0).abs() < 1.0, "x={}", p.x);
            assert!((p.y - 50.0).abs() < 1.0, "y={}", p.y);
        }
        engine.destroy(id);
    }

    #[test]
    fn square_has_no_self_intersections() {
        let mut engine = KurboEngine::new();
        let id = square(&mut engine);
        let ts = engine.self_intersections(id, 1e-3, 1e-3).unwrap();
        assert!(ts.is_empty(), "unexpected crossings: {ts:?}");
        engine.destroy(id);
    }
}
