//! # Team Shape Module
//!
//! Convex hull of the players' average positions, used as a proxy for how
//! spread out or compact a team is.

use serde::Serialize;

use crate::models::events::PitchPoint;

/// Minimum number of distinct points that can enclose an area.
pub const MIN_HULL_POINTS: usize = 3;

/// Geometric summary of a team's average positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamShape {
    /// Hull boundary, counter-clockwise, no repeated closing vertex
    pub hull: Vec<PitchPoint>,
    /// Hull area in squared pitch units
    pub area: f64,
    /// Spread across the pitch (y-axis)
    pub width: f64,
    /// Spread along the pitch (x-axis)
    pub depth: f64,
    /// Mean of all input points
    pub centroid: PitchPoint,
}

impl TeamShape {
    /// Returns `None` when the points do not enclose an area.
    pub fn from_points(points: &[PitchPoint]) -> Option<Self> {
        let hull = convex_hull(points)?;

        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let n = points.len() as f64;
        let centroid = PitchPoint::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );

        Some(TeamShape {
            area: polygon_area(&hull),
            hull,
            width: max_y - min_y,
            depth: max_x - min_x,
            centroid,
        })
    }
}

/// z-component of (a - o) x (b - o); positive for a counter-clockwise turn.
fn cross(o: PitchPoint, a: PitchPoint, b: PitchPoint) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull by Andrew's monotone chain.
///
/// Non-finite points are ignored. Returns `None` for fewer than three
/// distinct points or when every point lies on one line.
pub fn convex_hull(points: &[PitchPoint]) -> Option<Vec<PitchPoint>> {
    let mut pts: Vec<PitchPoint> = points.iter().copied().filter(PitchPoint::is_finite).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();

    if pts.len() < MIN_HULL_POINTS {
        return None;
    }

    let mut lower: Vec<PitchPoint> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<PitchPoint> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    // Last point of each chain is the first of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < MIN_HULL_POINTS {
        // Collinear input collapses to a segment
        return None;
    }
    Some(lower)
}

/// Shoelace area of a simple polygon.
pub fn polygon_area(vertices: &[PitchPoint]) -> f64 {
    if vertices.len() < MIN_HULL_POINTS {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}
