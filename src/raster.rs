// Even-odd scanline fill of a closed polygon onto the panel grid.
// For every integer row y, edges crossing y (half-open: one end <= y, the
// other > y) give fractional x crossings; sorted crossings pair into spans and
// every integer x in [ceil(x0), floor(x1)] is covered.
//
// Odd crossing counts: the unpaired trailing crossing is ignored. With the
// half-open test a closed polygon always crosses a row an even number of
// times, so this only guards against malformed input.

use crate::grid::PanelLayout;
use crate::types::{GridPoint, Mask};

/// Twice the signed area (shoelace). Zero for degenerate polygons.
pub fn doubled_area(poly: &[GridPoint]) -> i64 {
    if poly.len() < 3 {
        return 0;
    }
    let n = poly.len();
    let mut acc = 0i64;
    for i in 0..n {
        let (a, b) = (poly[i], poly[(i + 1) % n]);
        acc += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    acc
}

/// X positions where the polygon's edges cross row `y`, sorted ascending.
fn row_crossings(poly: &[GridPoint], y: i32, xs: &mut Vec<f64>) {
    xs.clear();
    let n = poly.len();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
            let t = (y - a.y) as f64 / (b.y - a.y) as f64;
            xs.push(a.x as f64 + t * (b.x - a.x) as f64);
        }
    }
    xs.sort_unstable_by(f64::total_cmp);
}

/// Logical cells covered by `poly`, row by row (y ascending, x ascending).
pub fn scanline_fill(poly: &[GridPoint]) -> Vec<GridPoint> {
    let mut out = Vec::new();
    if doubled_area(poly) == 0 {
        return out;
    }

    let min_y = poly.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = poly.iter().map(|p| p.y).max().unwrap_or(-1);

    let mut xs = Vec::with_capacity(poly.len());
    for y in min_y..=max_y {
        row_crossings(poly, y, &mut xs);

        // chunks_exact drops an odd trailing crossing
        for span in xs.chunks_exact(2) {
            let start = span[0].ceil() as i32;
            let end = span[1].floor() as i32;
            for x in start..=end {
                out.push(GridPoint::new(x, y));
            }
        }
    }
    out
}

/// Fill the hull and address each covered cell for the controller.
pub fn rasterize_hull(hull: &[GridPoint], layout: &PanelLayout) -> Mask {
    scanline_fill(hull)
        .into_iter()
        .map(|p| layout.address(p.x, p.y))
        .collect()
}
