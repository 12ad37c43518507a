use crate::config::{CURVE_POINT_DISTANCE, TRACE_SPACING, TRACE_TOLERANCE};
use crate::parsing::beatmap::{PathKind, PathSection, Pos};
use cgmath::{MetricSpace, Vector2};

/// A slider path resampled into equal-arc-length segments. Consumers index it
/// by traversal progress and assume constant speed along the path.
#[derive(Debug, Clone)]
pub struct Curve {
    pub points: Vec<Pos>,
    pub length: f64,
}

impl Curve {
    /// Position at `progress` in [0, 1] over a single forward traversal.
    pub fn point_at(&self, progress: f64) -> Pos {
        let segments = self.points.len() - 1;
        if segments == 0 {
            return self.points[0];
        }
        let scaled = progress.clamp(0.0, 1.0) * segments as f64;
        let index = (scaled as usize).min(segments - 1);
        let frac = (scaled - index as f64) as f32;
        self.points[index] + (self.points[index + 1] - self.points[index]) * frac
    }

    pub fn start_point(&self) -> Pos {
        self.points[0]
    }

    pub fn end_point(&self) -> Pos {
        *self.points.last().expect("curve has at least one point")
    }
}

fn chord(a: Pos, b: Pos) -> f64 {
    a.distance(b) as f64
}

/// De Casteljau evaluation of an arbitrary-degree bezier section.
fn bezier_point(points: &[Pos], t: f32) -> Pos {
    let mut scratch: Vec<Pos> = points.to_vec();
    for level in (1..scratch.len()).rev() {
        for i in 0..level {
            scratch[i] = scratch[i] + (scratch[i + 1] - scratch[i]) * t;
        }
    }
    scratch[0]
}

/// Flattens one bezier section into the trace polyline. Steps start at t+0.01
/// and are grown/bisected until each chord lands within TRACE_TOLERANCE of
/// TRACE_SPACING, which bounds polyline error without a fixed sampling rate.
fn trace_bezier(points: &[Pos], trace: &mut Vec<Pos>) {
    let start = bezier_point(points, 0.0);
    if trace.last() != Some(&start) {
        trace.push(start);
    }

    let mut t = 0.0f64;
    while t < 1.0 {
        let anchor = bezier_point(points, t as f32);
        let mut step = 0.01f64;
        let mut candidate = (t + step).min(1.0);
        let mut len = chord(anchor, bezier_point(points, candidate as f32));

        while len < TRACE_SPACING - TRACE_TOLERANCE && candidate < 1.0 {
            step *= 2.0;
            candidate = (t + step).min(1.0);
            len = chord(anchor, bezier_point(points, candidate as f32));
        }
        let mut guard = 0;
        while len > TRACE_SPACING + TRACE_TOLERANCE && guard < 32 {
            step /= 2.0;
            candidate = t + step;
            len = chord(anchor, bezier_point(points, candidate as f32));
            guard += 1;
        }

        trace.push(bezier_point(points, candidate as f32));
        t = candidate;
    }
}

fn trace_linear(points: &[Pos], trace: &mut Vec<Pos>) {
    for &point in points {
        if trace.last() != Some(&point) {
            trace.push(point);
        }
    }
}

/// Center of the circle through three points, from the perpendicular-bisector
/// intersection. Collinear inputs divide by ~0 and yield non-finite
/// coordinates, which the caller treats as a degenerate section.
fn circumcenter(a: Pos, b: Pos, c: Pos) -> Pos {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let asq = a.x * a.x + a.y * a.y;
    let bsq = b.x * b.x + b.y * b.y;
    let csq = c.x * c.x + c.y * c.y;
    let ux = (asq * (b.y - c.y) + bsq * (c.y - a.y) + csq * (a.y - b.y)) / d;
    let uy = (asq * (c.x - b.x) + bsq * (a.x - c.x) + csq * (b.x - a.x)) / d;
    Vector2::new(ux, uy)
}

/// Traces a pass-through circular arc. The swept length comes from the
/// slider's declared pixel length rather than the raw 3-point geometry, since
/// authored lengths may truncate or extend the true arc.
fn trace_pass_through(points: &[Pos], arc_length: f64, trace: &mut Vec<Pos>) -> bool {
    let (a, b, c) = (points[0], points[1], points[2]);
    let center = circumcenter(a, b, c);
    if !center.x.is_finite() || !center.y.is_finite() {
        return false;
    }

    let radius = chord(a, center);
    if radius <= f64::EPSILON {
        return false;
    }

    // Arc direction follows point ordering.
    let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
    let direction = if cross < 0.0 { -1.0f64 } else { 1.0 };

    let start_angle = ((a.y - center.y) as f64).atan2((a.x - center.x) as f64);
    let swept = arc_length / radius * direction;
    let steps = ((arc_length / TRACE_SPACING).ceil() as usize).max(2);

    if trace.last() != Some(&a) {
        trace.push(a);
    }
    for i in 1..=steps {
        let angle = start_angle + swept * i as f64 / steps as f64;
        trace.push(Vector2::new(
            center.x + (radius * angle.cos()) as f32,
            center.y + (radius * angle.sin()) as f32,
        ));
    }
    true
}

/// Walks the trace polyline and interpolates a point at every equal
/// arc-length checkpoint. Traces that overshoot the declared length are
/// clipped; traces that fall short are extended along their final direction.
fn resample_equidistant(trace: &[Pos], target_length: f64) -> Curve {
    let segments = ((target_length / CURVE_POINT_DISTANCE).round() as usize).max(1);
    let checkpoint = target_length / segments as f64;

    let mut points = Vec::with_capacity(segments + 1);
    points.push(trace[0]);

    let mut trace_index = 0usize;
    let mut traversed = 0.0f64;
    let mut next_target = checkpoint;

    for _ in 1..=segments {
        loop {
            if trace_index + 1 >= trace.len() {
                break;
            }
            let segment_len = chord(trace[trace_index], trace[trace_index + 1]);
            if traversed + segment_len >= next_target {
                break;
            }
            traversed += segment_len;
            trace_index += 1;
        }

        if trace_index + 1 < trace.len() {
            let from = trace[trace_index];
            let to = trace[trace_index + 1];
            let segment_len = chord(from, to);
            let frac = if segment_len > 0.0 {
                ((next_target - traversed) / segment_len) as f32
            } else {
                0.0
            };
            points.push(from + (to - from) * frac);
        } else {
            // Trace exhausted: extend along the last available direction.
            let last = *trace.last().expect("trace is non-empty");
            let direction = trace
                .iter()
                .rev()
                .find(|p| **p != last)
                .map(|prev| {
                    let delta = last - *prev;
                    let len = (delta.x * delta.x + delta.y * delta.y).sqrt();
                    if len > 0.0 { delta / len } else { Vector2::new(0.0, 0.0) }
                })
                .unwrap_or_else(|| Vector2::new(0.0, 0.0));
            let overshoot = (next_target - trace_length(trace)) as f32;
            points.push(last + direction * overshoot.max(0.0));
        }

        next_target += checkpoint;
    }

    Curve {
        points,
        length: target_length,
    }
}

fn trace_length(trace: &[Pos]) -> f64 {
    trace.windows(2).map(|pair| chord(pair[0], pair[1])).sum()
}

/// Resolves a slider's path sections into a constant-arc-length point path of
/// the declared pixel length.
pub fn resolve(sections: &[PathSection], pixel_length: f64) -> Curve {
    let mut trace: Vec<Pos> = Vec::new();

    for section in sections {
        if section.points.len() < 2 || section.points.windows(2).all(|p| p[0] == p[1]) {
            // Zero-length section: contributes nothing to the trace.
            continue;
        }
        match section.kind {
            PathKind::Linear => trace_linear(&section.points, &mut trace),
            PathKind::Bezier => trace_bezier(&section.points, &mut trace),
            PathKind::PassThrough => {
                if !trace_pass_through(&section.points, pixel_length, &mut trace) {
                    // Degenerate arc (collinear control points): fall back.
                    trace_bezier(&section.points, &mut trace);
                }
            }
        }
    }

    if trace.is_empty() {
        let fallback = sections
            .first()
            .and_then(|s| s.points.first().copied())
            .unwrap_or_else(|| Vector2::new(0.0, 0.0));
        trace.push(fallback);
    }

    resample_equidistant(&trace, pixel_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(kind: PathKind, points: &[(f32, f32)]) -> PathSection {
        PathSection {
            kind,
            points: points.iter().map(|&(x, y)| Vector2::new(x, y)).collect(),
        }
    }

    fn resampled_length(curve: &Curve) -> f64 {
        curve
            .points
            .windows(2)
            .map(|pair| chord(pair[0], pair[1]))
            .sum()
    }

    #[test]
    fn linear_path_matches_declared_length() {
        let sections = [section(PathKind::Linear, &[(0.0, 0.0), (300.0, 0.0)])];
        let curve = resolve(&sections, 300.0);
        assert!((resampled_length(&curve) - 300.0).abs() < 0.5);
        assert_eq!(curve.points.len(), 101);
    }

    #[test]
    fn overshooting_trace_is_clipped() {
        // Declared length shorter than the geometry: path must stop at 100px.
        let sections = [section(PathKind::Linear, &[(0.0, 0.0), (300.0, 0.0)])];
        let curve = resolve(&sections, 100.0);
        assert!((resampled_length(&curve) - 100.0).abs() < 0.5);
        let end = curve.end_point();
        assert!((end.x - 100.0).abs() < 0.5);
    }

    #[test]
    fn short_trace_is_extended() {
        let sections = [section(PathKind::Linear, &[(0.0, 0.0), (50.0, 0.0)])];
        let curve = resolve(&sections, 80.0);
        assert!((resampled_length(&curve) - 80.0).abs() < 0.5);
        assert!((curve.end_point().x - 80.0).abs() < 0.5);
    }

    #[test]
    fn bezier_length_invariant() {
        let sections = [section(
            PathKind::Bezier,
            &[(0.0, 0.0), (100.0, 200.0), (200.0, 0.0)],
        )];
        // Quadratic arc is longer than 200px of chord; declare something the
        // geometry can cover.
        let curve = resolve(&sections, 250.0);
        assert!((resampled_length(&curve) - 250.0).abs() < 0.5);
        assert!((curve.length - 250.0).abs() < 1e-9);
    }

    #[test]
    fn pass_through_arc_follows_declared_length() {
        // Quarter circle of radius 100 centered at origin, extended to a half
        // circle by the declared length.
        let sections = [section(
            PathKind::PassThrough,
            &[(100.0, 0.0), (70.71068, 70.71068), (0.0, 100.0)],
        )];
        let half_circumference = std::f64::consts::PI * 100.0;
        let curve = resolve(&sections, half_circumference);
        assert!((resampled_length(&curve) - half_circumference).abs() < 0.5);
        // Half turn from (100, 0) lands at (-100, 0).
        let end = curve.end_point();
        assert!((end.x + 100.0).abs() < 1.5, "end.x = {}", end.x);
        assert!(end.y.abs() < 1.5, "end.y = {}", end.y);
    }

    #[test]
    fn collinear_pass_through_falls_back() {
        let sections = [section(
            PathKind::PassThrough,
            &[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)],
        )];
        let curve = resolve(&sections, 100.0);
        assert!((resampled_length(&curve) - 100.0).abs() < 0.5);
        assert!((curve.end_point().x - 100.0).abs() < 0.5);
        assert!(curve.end_point().y.abs() < 0.5);
    }

    #[test]
    fn point_at_interpolates_by_arc_length() {
        let sections = [section(PathKind::Linear, &[(0.0, 0.0), (200.0, 0.0)])];
        let curve = resolve(&sections, 200.0);
        let mid = curve.point_at(0.5);
        assert!((mid.x - 100.0).abs() < 0.5);
        assert!(chord(curve.point_at(0.0), curve.start_point()) < 1e-4);
        assert!(chord(curve.point_at(1.0), curve.end_point()) < 1e-4);
    }
}
