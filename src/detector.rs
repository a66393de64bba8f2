// Landmark detection seam.
// The actual face-mesh model runs out of process and drops its results into
// a JSON file; we pick them up whenever the file changes. Same JSON shape for
// the precomputed fallback keypoints:
//
//   [ { "keypoints": [ { "x": 312.5, "y": 201.0 }, ... ] }, ... ]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Face, FrameBuffer};

pub trait LandmarkDetector {
    /// Faces visible in `frame`, keypoints in `frame` pixel coordinates.
    /// Empty when nobody is there.
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<Face>>;
}

/// Parse the keypoint JSON document.
pub fn parse_faces(json: &str) -> Result<Vec<Face>> {
    serde_json::from_str(json).map_err(|e| Error::Keypoints(format!("Parse: {e}")))
}

/// Load a keypoint JSON file.
pub fn load_faces(path: &Path) -> Result<Vec<Face>> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Keypoints(format!("Read {}: {e}", path.display())))?;
    parse_faces(&text)
}

/// Polls a JSON file written by an external landmark process.
pub struct KeypointFileDetector {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    cached: Vec<Face>,
}

impl KeypointFileDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), last_modified: None, cached: Vec::new() }
    }
}

impl LandmarkDetector for KeypointFileDetector {
    fn detect(&mut self, _frame: &FrameBuffer) -> Result<Vec<Face>> {
        // A missing file just means "no face yet"
        let modified = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => {
                self.cached.clear();
                self.last_modified = None;
                return Ok(Vec::new());
            }
        };

        if self.last_modified != Some(modified) {
            self.cached = load_faces(&self.path)?;
            self.last_modified = Some(modified);
            debug!(faces = self.cached.len(), "Keypoint file reloaded");
        }
        Ok(self.cached.clone())
    }
}

/// Stand-in when no live keypoint source is configured: never sees a face,
/// so the fallback takes over once the no-face threshold passes.
pub struct NoDetector;

impl LandmarkDetector for NoDetector {
    fn detect(&mut self, _frame: &FrameBuffer) -> Result<Vec<Face>> {
        Ok(Vec::new())
    }
}
