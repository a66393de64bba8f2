// Convex hull of panel points (Andrew's monotone chain).
// Output is counter-clockwise in a y-up frame (clockwise on screen), with
// collinear points removed. Fewer than 3 vertices means the input was degenerate.

use crate::types::GridPoint;

/// Cross product of OA x OB; > 0 for a counter-clockwise turn.
#[inline]
pub fn cross(o: GridPoint, a: GridPoint, b: GridPoint) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Push `p` onto a chain, popping while the last turn is not strictly CCW.
#[inline]
fn push_ccw(chain: &mut Vec<GridPoint>, p: GridPoint) {
    while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0 {
        chain.pop();
    }
    chain.push(p);
}

pub fn convex_hull(points: &[GridPoint]) -> Vec<GridPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_unstable_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));

    let mut lower = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        push_ccw(&mut lower, p);
    }

    let mut upper = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        push_ccw(&mut upper, p);
    }

    // Each chain ends where the other starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
