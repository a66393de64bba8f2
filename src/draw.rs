// Window + software drawing utilities.
// The window shows what the panel shows: one flat square per LED, an optional
// red overlay where the face mask is, and a small HUD line.

use crate::color::PixelFrame;
use crate::error::Error;
use crate::grid::PanelLayout;
use crate::types::{FrameBuffer, GridCell, Rgb};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

/// Inputs gathered once per frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Controls {
    pub connect_serial: bool,
    pub toggle_fallback: bool,
    pub toggle_debug: bool,
    pub brightness_delta: f32,
    pub blue_delta: f32,
}

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Open a window of the canvas size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// False once the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// S: connect serial, F: fallback on/off, D: mask overlay,
    /// Up/Down: brightness, Left/Right: blue cut.
    pub fn controls(&self) -> Controls {
        let step = |up: Key, down: Key, amount: f32| {
            let mut d = 0.0;
            if self.window.is_key_pressed(up, KeyRepeat::Yes) { d += amount; }
            if self.window.is_key_pressed(down, KeyRepeat::Yes) { d -= amount; }
            d
        };
        Controls {
            connect_serial: self.pressed_once(Key::S),
            toggle_fallback: self.pressed_once(Key::F),
            toggle_debug: self.pressed_once(Key::D),
            brightness_delta: step(Key::Up, Key::Down, 0.1),
            blue_delta: step(Key::Right, Key::Left, 0.05),
        }
    }
}

/* ---------- Software drawing: cells, overlay, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Alpha-blend `color` over the pixel at (x,y); `alpha` is 0..=255.
#[inline]
fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Rgb, alpha: u8) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    let old = Rgb::from_packed(fb.pixels[idx]);
    let a = alpha as u32;
    let mix = |o: u8, n: u8| ((o as u32 * (255 - a) + n as u32 * a + 127) / 255) as u8;
    fb.pixels[idx] = Rgb::new(mix(old.r, color.r), mix(old.g, color.g), mix(old.b, color.b)).to_packed();
}

fn fill_rect(fb: &mut FrameBuffer, x0: i32, y0: i32, w: i32, h: i32, color: u32) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            put_pixel(fb, x, y, color);
        }
    }
}

/// Paint each panel cell as a flat square of its sampled color.
pub fn draw_led_preview(fb: &mut FrameBuffer, frame: &PixelFrame, layout: &PanelLayout) {
    let s = layout.cell_size;
    for y in 0..frame.height {
        for x in 0..frame.width {
            fill_rect(fb, x * s, y * s, s, s, frame.at(x, y).to_packed());
        }
    }
}

/// Tint every masked cell with a translucent color.
pub fn draw_mask_overlay(fb: &mut FrameBuffer, mask: &[GridCell], layout: &PanelLayout, color: Rgb, alpha: u8) {
    let s = layout.cell_size;
    for &cell in mask {
        let p = layout.logical(cell);
        for y in p.y * s..(p.y + 1) * s {
            for x in p.x * s..(p.x + 1) * s {
                blend_pixel(fb, x, y, color, alpha);
            }
        }
    }
}

/* ---------- 5x7 bitmap font (just the characters the HUD uses) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase letters for LIVE / FALLBACK / SERIAL ON|OFF / FPS / BRI / BLU
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),

        // Punctuation: space, vertical bar, colon, dot
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (shadow, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + shadow, y + ry as i32 + shadow, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs (6 px advance).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}
