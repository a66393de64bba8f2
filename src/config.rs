// Runtime settings: optional TOML file, then command-line overrides.
// Every field has a default, so running with no file at all works.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::color::{BLUE_MULT_RANGE, BRIGHTNESS_RANGE, ColorBalance};
use crate::error::{Error, Result};
use crate::grid::PanelLayout;

/// Largest canvas edge, in pixels, a panel config may ask for.
pub const MAX_CANVAS_SIDE: i32 = 8192;

#[derive(Debug, Parser)]
#[command(name = "led-face-mask", about = "Drive an LED panel with a face silhouette from a webcam")]
pub struct Cli {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Serial port of the LED controller (default: first port found)
    #[arg(long)]
    pub port: Option<String>,

    /// Camera index
    #[arg(long)]
    pub camera: Option<u32>,

    /// Still image shown when nobody is in front of the camera
    #[arg(long)]
    pub fallback_image: Option<PathBuf>,

    /// Precomputed keypoints (JSON) for the fallback image
    #[arg(long)]
    pub fallback_keypoints: Option<PathBuf>,

    /// JSON file kept up to date by the live landmark detector
    #[arg(long)]
    pub live_keypoints: Option<PathBuf>,

    /// Start with the face mask overlay visible
    #[arg(long)]
    pub debug_face: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub strip_width: i32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let p = PanelLayout::default();
        Self { width: p.width, height: p.height, cell_size: p.cell_size, strip_width: p.strip_width }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: 640, height: 480 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub send_interval_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { port: None, baud_rate: 115_200, send_interval_ms: 50 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub no_face_threshold: u32,
    pub image: Option<PathBuf>,
    pub keypoints: Option<PathBuf>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { enabled: true, no_face_threshold: 20, image: None, keypoints: None }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub red_mult: f32,
    pub green_mult: f32,
    pub blue_mult: f32,
    pub brightness: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let c = ColorBalance::default();
        Self { red_mult: c.red_mult, green_mult: c.green_mult, blue_mult: c.blue_mult, brightness: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub live_keypoints: Option<PathBuf>,
    /// Run the detector every N frame ticks.
    pub interval_ticks: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { live_keypoints: None, interval_ticks: 3 }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub panel: PanelConfig,
    pub camera: CameraConfig,
    pub serial: SerialConfig,
    pub fallback: FallbackConfig,
    pub color: ColorConfig,
    pub detection: DetectionConfig,
    #[serde(skip)]
    pub debug_face: bool,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Parse: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Load the file named on the command line (if any), then apply the flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = &cli.port {
            self.serial.port = Some(port.clone());
        }
        if let Some(index) = cli.camera {
            self.camera.index = index;
        }
        if let Some(path) = &cli.fallback_image {
            self.fallback.image = Some(path.clone());
        }
        if let Some(path) = &cli.fallback_keypoints {
            self.fallback.keypoints = Some(path.clone());
        }
        if let Some(path) = &cli.live_keypoints {
            self.detection.live_keypoints = Some(path.clone());
        }
        self.debug_face |= cli.debug_face;
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.panel;
        if p.width <= 0 || p.height <= 0 || p.cell_size <= 0 {
            return Err(Error::Config("panel width, height and cell_size must be positive".into()));
        }
        if p.strip_width <= 0 || p.width % p.strip_width != 0 {
            return Err(Error::Config(format!(
                "panel width {} must be a multiple of strip_width {}",
                p.width, p.strip_width
            )));
        }
        for (name, cells) in [("width", p.width), ("height", p.height)] {
            if cells.checked_mul(p.cell_size).is_none_or(|px| px > MAX_CANVAS_SIDE) {
                return Err(Error::Config(format!(
                    "panel {name} {cells} x cell_size {} exceeds {MAX_CANVAS_SIDE} px",
                    p.cell_size
                )));
            }
        }

        let c = &self.color;
        if !(BLUE_MULT_RANGE.0..=BLUE_MULT_RANGE.1).contains(&c.blue_mult) {
            return Err(Error::Config(format!("blue_mult {} outside 0.60..=1.00", c.blue_mult)));
        }
        if !(BRIGHTNESS_RANGE.0..=BRIGHTNESS_RANGE.1).contains(&c.brightness) {
            return Err(Error::Config(format!("brightness {} outside 0.0..=2.0", c.brightness)));
        }
        if [c.red_mult, c.green_mult].iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(Error::Config("color multipliers must be finite and not negative".into()));
        }

        if self.serial.send_interval_ms == 0 {
            return Err(Error::Config("send_interval_ms must be at least 1".into()));
        }
        if self.detection.interval_ticks == 0 {
            return Err(Error::Config("detection interval_ticks must be at least 1".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> PanelLayout {
        PanelLayout {
            width: self.panel.width,
            height: self.panel.height,
            cell_size: self.panel.cell_size,
            strip_width: self.panel.strip_width,
        }
    }

    pub fn color_balance(&self) -> ColorBalance {
        ColorBalance {
            red_mult: self.color.red_mult,
            green_mult: self.color.green_mult,
            blue_mult: self.color.blue_mult,
        }
    }
}
