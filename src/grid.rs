// Panel geometry: canvas pixels -> logical cells -> physical LED addresses.
// The panel is W x H cells, wired as vertical 8-wide strips. Inside a strip the
// column index runs right-to-left, so logical x=0 is (strip 0, col 7).

use crate::types::{GridCell, GridPoint, Point2D};

/// Size and wiring of the LED panel, plus how big one cell is on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub width: i32,       // cells across (W)
    pub height: i32,      // cells down (H)
    pub cell_size: i32,   // canvas pixels per cell edge
    pub strip_width: i32, // cells per physical strip
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self { width: 24, height: 32, cell_size: 20, strip_width: 8 }
    }
}

impl PanelLayout {
    pub fn canvas_width(&self) -> usize {
        (self.width * self.cell_size) as usize
    }

    pub fn canvas_height(&self) -> usize {
        (self.height * self.cell_size) as usize
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    #[inline]
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// Physical address of logical cell (x, y).
    #[inline]
    pub fn address(&self, x: i32, y: i32) -> GridCell {
        GridCell {
            row: y,
            col: self.strip_width - 1 - x.rem_euclid(self.strip_width),
            strip: x.div_euclid(self.strip_width),
        }
    }

    /// Inverse of [`address`](Self::address): back to the logical (x, y).
    #[inline]
    pub fn logical(&self, cell: GridCell) -> GridPoint {
        GridPoint::new(cell.strip * self.strip_width + (self.strip_width - 1 - cell.col), cell.row)
    }

    /// Canvas pixel at the center of logical cell (x, y).
    #[inline]
    pub fn cell_center(&self, x: i32, y: i32) -> (usize, usize) {
        (
            (x * self.cell_size + self.cell_size / 2) as usize,
            (y * self.cell_size + self.cell_size / 2) as usize,
        )
    }
}

/// Buckets canvas points into logical panel cells.
#[derive(Debug, Clone, Copy)]
pub struct GridMapper {
    pub canvas_w: f32,
    pub canvas_h: f32,
    pub grid_w: i32,
    pub grid_h: i32,
}

impl GridMapper {
    pub fn new(layout: &PanelLayout) -> Self {
        Self {
            canvas_w: layout.canvas_width() as f32,
            canvas_h: layout.canvas_height() as f32,
            grid_w: layout.width,
            grid_h: layout.height,
        }
    }

    /// Logical cell under canvas point `p`, unclamped.
    #[inline]
    pub fn to_grid(&self, p: Point2D) -> GridPoint {
        GridPoint::new(
            (p.x / self.canvas_w * self.grid_w as f32).floor() as i32,
            (p.y / self.canvas_h * self.grid_h as f32).floor() as i32,
        )
    }
}
