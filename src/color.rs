// Canvas color correction and per-cell sampling for the LED panel.
// The webcam runs blue on these LEDs, so red/green get a small boost and blue
// is cut (user-tunable). Brightness is applied last, at sampling time.

use crate::grid::PanelLayout;
use crate::types::{FrameBuffer, Rgb};

pub const BLUE_MULT_RANGE: (f32, f32) = (0.60, 1.00);
pub const BRIGHTNESS_RANGE: (f32, f32) = (0.0, 2.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBalance {
    pub red_mult: f32,
    pub green_mult: f32,
    pub blue_mult: f32,
}

impl Default for ColorBalance {
    fn default() -> Self {
        Self { red_mult: 1.05, green_mult: 1.02, blue_mult: 0.85 }
    }
}

#[inline]
fn scale_channel(c: u8, mult: f32) -> u8 {
    (c as f32 * mult).round().clamp(0.0, 255.0) as u8
}

impl ColorBalance {
    /// Multiply every pixel per channel, saturating at 255.
    pub fn apply_in_place(&self, fb: &mut FrameBuffer) {
        for px in &mut fb.pixels {
            let c = Rgb::from_packed(*px);
            *px = Rgb::new(
                scale_channel(c.r, self.red_mult),
                scale_channel(c.g, self.green_mult),
                scale_channel(c.b, self.blue_mult),
            )
            .to_packed();
        }
    }

    /// Nudge the blue cut, staying inside its allowed range.
    pub fn adjust_blue(&mut self, delta: f32) {
        self.blue_mult = (self.blue_mult + delta).clamp(BLUE_MULT_RANGE.0, BLUE_MULT_RANGE.1);
    }
}

/// One RGB sample per panel cell, row-major (y outer, x inner).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFrame {
    pub width: i32,
    pub height: i32,
    pub samples: Vec<Rgb>,
}

impl PixelFrame {
    /// Sample the canvas at each cell center and scale by `brightness`.
    pub fn sample(canvas: &FrameBuffer, layout: &PanelLayout, brightness: f32) -> Self {
        let mut samples = Vec::with_capacity(layout.cell_count());
        for y in 0..layout.height {
            for x in 0..layout.width {
                let (cx, cy) = layout.cell_center(x, y);
                let c = Rgb::from_packed(canvas.get(cx, cy).unwrap_or(0));
                samples.push(Rgb::new(
                    scale_channel(c.r, brightness),
                    scale_channel(c.g, brightness),
                    scale_channel(c.b, brightness),
                ));
            }
        }
        Self { width: layout.width, height: layout.height, samples }
    }

    #[inline]
    pub fn at(&self, x: i32, y: i32) -> Rgb {
        self.samples[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_saturates_and_cuts_blue() {
        let mut fb = FrameBuffer { width: 2, height: 1, pixels: vec![0x00FF_FFFF, 0x0064_6464] };
        ColorBalance::default().apply_in_place(&mut fb);

        assert_eq!(Rgb::from_packed(fb.pixels[0]), Rgb::new(255, 255, 217));
        // 100 * 1.05 = 105, 100 * 1.02 = 102, 100 * 0.85 = 85
        assert_eq!(Rgb::from_packed(fb.pixels[1]), Rgb::new(105, 102, 85));
    }

    #[test]
    fn blue_adjustment_is_clamped() {
        let mut bal = ColorBalance::default();
        bal.adjust_blue(1.0);
        assert_eq!(bal.blue_mult, 1.0);
        bal.adjust_blue(-5.0);
        assert_eq!(bal.blue_mult, 0.6);
    }

    #[test]
    fn sampling_reads_cell_centers_row_major() {
        let layout = PanelLayout { width: 2, height: 2, cell_size: 4, strip_width: 2 };
        let mut canvas = FrameBuffer::new(8, 8);
        // Paint only the center pixel of each cell
        canvas.pixels[2 * 8 + 2] = 0x0001_0203;
        canvas.pixels[2 * 8 + 6] = 0x0004_0506;
        canvas.pixels[6 * 8 + 2] = 0x0007_0809;
        canvas.pixels[6 * 8 + 6] = 0x000A_0B0C;

        let frame = PixelFrame::sample(&canvas, &layout, 1.0);
        assert_eq!(
            frame.samples,
            vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::new(7, 8, 9), Rgb::new(10, 11, 12)]
        );
        assert_eq!(frame.at(1, 0), Rgb::new(4, 5, 6));
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let layout = PanelLayout { width: 1, height: 1, cell_size: 2, strip_width: 1 };
        let canvas = FrameBuffer { width: 2, height: 2, pixels: vec![0x00C8_6402; 4] };

        let dim = PixelFrame::sample(&canvas, &layout, 0.5);
        assert_eq!(dim.samples[0], Rgb::new(100, 50, 1));

        let bright = PixelFrame::sample(&canvas, &layout, 2.0);
        assert_eq!(bright.samples[0], Rgb::new(255, 200, 4));

        let off = PixelFrame::sample(&canvas, &layout, 0.0);
        assert_eq!(off.samples[0], Rgb::default());
    }
}
