//! Placement and text of dimension labels.

use floorplan_core::DEFAULT_SCALE;
use kurbo::{Point, Rect};

/// Parameter range `[t0, t1]` of the part of segment `a → b` inside `rect`
/// (Liang–Barsky). `None` when the segment misses the rect entirely.
pub fn clip_segment(a: Point, b: Point, rect: Rect) -> Option<(f64, f64)> {
    let d = b - a;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let edges = [
        (-d.x, a.x - rect.x0),
        (d.x, rect.x1 - a.x),
        (-d.y, a.y - rect.y0),
        (d.y, rect.y1 - a.y),
    ];
    for (p, q) in edges {
        if p.abs() < f64::EPSILON {
            // Parallel to this edge: outside means no overlap.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// Where to draw the dimension label of segment `a → b`.
///
/// The segment midpoint when it is inside `visible`; otherwise the midpoint of
/// the visible part, kept at least `margin` from both endpoints. `None` when
/// no part of the segment is visible.
pub fn dimension_anchor(a: Point, b: Point, visible: Rect, margin: f64) -> Option<Point> {
    let mid = a.midpoint(b);
    if visible.x0 <= mid.x && mid.x <= visible.x1 && visible.y0 <= mid.y && mid.y <= visible.y1 {
        return Some(mid);
    }
    let (t0, t1) = clip_segment(a, b, visible)?;

    let length = (b - a).hypot();
    if length < f64::EPSILON {
        return None;
    }
    let m = margin.max(0.0) / length;
    let t = (t0 + t1) / 2.0;
    let t = if m >= 0.5 { 0.5 } else { t.clamp(m, 1.0 - m) };
    Some(a.lerp(b, t))
}

/// Format a world-space length as metres using the plan scale.
pub fn format_length(world_length: f64, scale: f64) -> String {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        DEFAULT_SCALE
    };
    format!("{:.2} m", world_length / scale)
}
