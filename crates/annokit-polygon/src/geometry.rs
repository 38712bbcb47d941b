//! Polygon geometry helpers used by the drawing modes.

use annokit_core::Point;
use std::cmp::Ordering;

/// All points of `segments`, in drawing order
pub fn flatten(segments: &[Vec<Point>]) -> Vec<Point> {
    segments.iter().flatten().copied().collect()
}

/// Number of distinct points
pub fn distinct_count(points: &[Point]) -> usize {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        other => other,
    });
    sorted.dedup();
    sorted.len()
}

/// Whether `points` can form a polygon: at least three distinct vertices
///
/// Self-intersection is allowed.
pub fn is_valid_polygon(points: &[Point]) -> bool {
    points.len() >= 3 && distinct_count(points) >= 3
}

/// Whether clicking at `cursor` closes the path
///
/// Requires at least one committed segment, a valid polygon from the
/// committed points plus the in-progress `lasso`, and `cursor` within
/// `radius` of the very first point.
pub fn can_path_be_closed(segments: &[Vec<Point>], lasso: &[Point], cursor: Point, radius: f64) -> bool {
    if segments.is_empty() {
        return false;
    }
    let mut points = flatten(segments);
    points.extend_from_slice(lasso);
    if !is_valid_polygon(&points) {
        return false;
    }
    points
        .first()
        .is_some_and(|first| first.distance_to(&cursor) <= radius)
}

/// Remove the point nearest to `cursor` within `radius`
///
/// Segments emptied by the removal are dropped. Returns `None` if no point
/// lies within `radius`.
pub fn erase_nearest(segments: &[Vec<Point>], cursor: Point, radius: f64) -> Option<Vec<Vec<Point>>> {
    let radius_sq = radius * radius;
    let (seg, idx, _) = segments
        .iter()
        .enumerate()
        .flat_map(|(s, segment)| {
            segment
                .iter()
                .enumerate()
                .map(move |(i, point)| (s, i, point.distance_squared(&cursor)))
        })
        .filter(|(_, _, d)| *d <= radius_sq)
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    let mut erased = segments.to_vec();
    erased[seg].remove(idx);
    erased.retain(|segment| !segment.is_empty());
    Some(erased)
}

/// Drop a closing point that repeats the first one
pub fn remove_trailing_duplicate(points: &mut Vec<Point>) {
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
}

/// Ramer-Douglas-Peucker simplification
///
/// Keeps the end points and every point deviating more than `tolerance`
/// from the simplified line.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (index, distance) = (start + 1..end)
            .map(|i| (i, segment_distance(points[i], points[start], points[end])))
            .fold((start, 0.0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });
        if distance > tolerance {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let length_sq = a.distance_squared(&b);
    if length_sq == 0.0 {
        return point.distance_to(&a);
    }
    let t = (((point.x - a.x) * (b.x - a.x) + (point.y - a.y) * (b.y - a.y)) / length_sq)
        .clamp(0.0, 1.0);
    point.distance_to(&Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)))
}
