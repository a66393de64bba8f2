// Line protocol understood by the LED controller.
//
//   FRAME:<row>,<col>,<strip>,<r>,<g>,<b>,<row>,...\n   every cell, y outer / x inner
//   FACE:<row>,<col>,<strip>;<row>,<col>,<strip>;...\n  mask cells only, may be empty
//
// All fields are plain decimal integers.

use std::fmt::Write;

use crate::color::PixelFrame;
use crate::grid::PanelLayout;
use crate::types::GridCell;

pub const FRAME_PREFIX: &str = "FRAME:";
pub const FACE_PREFIX: &str = "FACE:";

/// Full-panel color line.
pub fn encode_frame(frame: &PixelFrame, layout: &PanelLayout) -> String {
    // ~6 fields of up to 3 digits + comma per cell
    let mut out = String::with_capacity(FRAME_PREFIX.len() + frame.samples.len() * 24 + 1);
    out.push_str(FRAME_PREFIX);

    let mut first = true;
    for y in 0..frame.height {
        for x in 0..frame.width {
            let cell = layout.address(x, y);
            let c = frame.at(x, y);
            if !first {
                out.push(',');
            }
            first = false;
            // Writing into a String cannot fail
            let _ = write!(out, "{},{},{},{},{},{}", cell.row, cell.col, cell.strip, c.r, c.g, c.b);
        }
    }

    out.push('\n');
    out
}

/// Face silhouette line.
pub fn encode_face(mask: &[GridCell]) -> String {
    let mut out = String::with_capacity(FACE_PREFIX.len() + mask.len() * 9 + 1);
    out.push_str(FACE_PREFIX);

    for (i, cell) in mask.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{},{},{}", cell.row, cell.col, cell.strip);
    }

    out.push('\n');
    out
}
