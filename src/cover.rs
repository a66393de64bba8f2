// "Object-fit: cover" placement of a source image on the canvas.
// The source is scaled uniformly until it fills the canvas, the overflowing
// axis is cropped evenly on both sides, and the result is shown mirrored so
// the panel behaves like a mirror for the person standing in front of it.

use crate::types::{FrameBuffer, Point2D};

/// Placement of the scaled source inside the destination canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverState {
    pub offset_x: f32,
    pub offset_y: f32,
    pub draw_w: f32,
    pub draw_h: f32,
    pub scale: f32,
}

/// Cover placement for one (source size, canvas size) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverTransform {
    pub state: CoverState,
    pub dest_w: f32,
    pub dest_h: f32,
    /// Flip about the canvas' vertical center. Rendering and point mapping
    /// both read this flag so overlays land on the mirrored image.
    pub mirror: bool,
}

impl CoverTransform {
    /// Compute the cover placement of a `sw`x`sh` source on a `dw`x`dh` canvas.
    pub fn compute(sw: f32, sh: f32, dw: f32, dh: f32, mirror: bool) -> Self {
        let src_aspect = sw / sh;
        let dest_aspect = dw / dh;

        let (draw_w, draw_h) = if src_aspect > dest_aspect {
            // Source is wider: fit height, crop left/right
            (dh * src_aspect, dh)
        } else {
            // Source is taller (or equal): fit width, crop top/bottom
            (dw, dw / src_aspect)
        };

        let state = CoverState {
            offset_x: (dw - draw_w) / 2.0,
            offset_y: (dh - draw_h) / 2.0,
            draw_w,
            draw_h,
            scale: draw_w / sw,
        };

        Self { state, dest_w: dw, dest_h: dh, mirror }
    }

    /// Cover placement for a frame onto a canvas frame, mirrored.
    pub fn for_frames(src: &FrameBuffer, canvas_w: usize, canvas_h: usize) -> Self {
        Self::compute(src.width as f32, src.height as f32, canvas_w as f32, canvas_h as f32, true)
    }

    /// Map a source-image point to canvas coordinates.
    pub fn map_point(&self, p: Point2D) -> Point2D {
        let s = &self.state;
        let x = p.x * s.scale + s.offset_x;
        let y = p.y * s.scale + s.offset_y;
        if self.mirror {
            Point2D::new(self.dest_w - x, y)
        } else {
            Point2D::new(x, y)
        }
    }

    /// Draw `src` into `canvas` under this placement (nearest-neighbour).
    /// Every canvas pixel is written; cropping means no letterbox is left.
    pub fn render(&self, src: &FrameBuffer, canvas: &mut FrameBuffer) {
        if src.width == 0 || src.height == 0 {
            return;
        }
        let s = &self.state;
        let max_x = (src.width - 1) as f32;
        let max_y = (src.height - 1) as f32;

        for dy in 0..canvas.height {
            let sy = ((dy as f32 + 0.5 - s.offset_y) / s.scale).clamp(0.0, max_y) as usize;
            let row_ofs = dy * canvas.width;
            let src_row = sy * src.width;

            for dx in 0..canvas.width {
                // Undo the mirror first, then the scale/offset
                let ux = if self.mirror { canvas.width - 1 - dx } else { dx };
                let sx = ((ux as f32 + 0.5 - s.offset_x) / s.scale).clamp(0.0, max_x) as usize;
                canvas.pixels[row_ofs + dx] = src.pixels[src_row + sx];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn wider_source_fits_height() {
        // 640x480 camera onto the 480x640 portrait canvas
        let t = CoverTransform::compute(640.0, 480.0, 480.0, 640.0, true);
        assert!(approx(t.state.draw_h, 640.0));
        assert!(approx(t.state.draw_w, 640.0 * 640.0 / 480.0));
        assert!(approx(t.state.offset_y, 0.0));
        assert!(t.state.offset_x < 0.0);
        assert!(approx(t.state.scale, t.state.draw_w / 640.0));
    }

    #[test]
    fn taller_source_fits_width() {
        let t = CoverTransform::compute(100.0, 400.0, 200.0, 200.0, false);
        assert!(approx(t.state.draw_w, 200.0));
        assert!(approx(t.state.draw_h, 800.0));
        assert!(approx(t.state.offset_x, 0.0));
        assert!(approx(t.state.offset_y, -300.0));
        assert!(approx(t.state.scale, 2.0));
    }

    #[test]
    fn center_maps_to_center_when_aspects_match() {
        let t = CoverTransform::compute(320.0, 240.0, 640.0, 480.0, true);
        let c = t.map_point(Point2D::new(160.0, 120.0));
        assert!(approx(c.x, 320.0));
        assert!(approx(c.y, 240.0));
    }

    #[test]
    fn mirror_flips_x_only() {
        let t = CoverTransform::compute(100.0, 100.0, 100.0, 100.0, true);
        let p = t.map_point(Point2D::new(10.0, 20.0));
        assert!(approx(p.x, 90.0));
        assert!(approx(p.y, 20.0));

        let plain = CoverTransform { mirror: false, ..t };
        let q = plain.map_point(Point2D::new(10.0, 20.0));
        assert!(approx(q.x, 10.0));
        assert!(approx(q.y, 20.0));
    }

    #[test]
    fn render_mirrors_the_source() {
        // 2x1 source: red on the left, blue on the right
        let src = FrameBuffer { width: 2, height: 1, pixels: vec![0x00FF_0000, 0x0000_00FF] };
        let mut canvas = FrameBuffer::new(2, 1);
        let t = CoverTransform::for_frames(&src, 2, 1);
        t.render(&src, &mut canvas);
        assert_eq!(canvas.pixels, vec![0x0000_00FF, 0x00FF_0000]);
    }

    #[test]
    fn render_crops_overflowing_axis() {
        // 4x2 source onto a 2x2 canvas: height drives, the middle two columns show.
        let src = FrameBuffer { width: 4, height: 2, pixels: vec![1, 2, 3, 4, 5, 6, 7, 8] };
        let mut canvas = FrameBuffer::new(2, 2);
        let t = CoverTransform::compute(4.0, 2.0, 2.0, 2.0, false);
        t.render(&src, &mut canvas);
        assert_eq!(canvas.pixels, vec![2, 3, 6, 7]);
    }
}
