// Face silhouette on the panel: cached detections -> panel cells.
//
// `DetectionState` is owned by the frame loop and updated whenever a detector
// result arrives; `compute_face_mask` is a pure function of that state, the
// current cover placement and the panel layout, so it can run on every tick.

use tracing::info;

use crate::cover::CoverTransform;
use crate::grid::{GridMapper, PanelLayout};
use crate::hull::convex_hull;
use crate::raster::rasterize_hull;
use crate::types::{Face, FrameBuffer, GridPoint, Keypoint, Mask};

pub const DEFAULT_NO_FACE_THRESHOLD: u32 = 20;

/// Latest detector output plus the live/fallback switching bookkeeping.
#[derive(Debug, Clone)]
pub struct DetectionState {
    pub faces: Vec<Face>,
    pub fallback_keypoints: Option<Vec<Keypoint>>,
    pub fallback_enabled: bool,
    pub use_fallback: bool,
    pub no_face_count: u32,
    pub no_face_threshold: u32,
}

impl Default for DetectionState {
    fn default() -> Self {
        Self::new(true, DEFAULT_NO_FACE_THRESHOLD)
    }
}

impl DetectionState {
    pub fn new(fallback_enabled: bool, no_face_threshold: u32) -> Self {
        Self {
            faces: Vec::new(),
            fallback_keypoints: None,
            fallback_enabled,
            use_fallback: false,
            no_face_count: 0,
            no_face_threshold,
        }
    }

    pub fn fallback_ready(&self) -> bool {
        self.fallback_keypoints.is_some()
    }

    /// Record one live detection result.
    /// After more than `no_face_threshold` empty results in a row the
    /// fallback takes over (if enabled and loaded); any face switches back.
    pub fn on_live_result(&mut self, faces: Vec<Face>) {
        let was_fallback = self.use_fallback;

        if faces.is_empty() {
            self.no_face_count = self.no_face_count.saturating_add(1);
            self.use_fallback = self.fallback_enabled
                && self.no_face_count > self.no_face_threshold
                && self.fallback_ready();
        } else {
            self.no_face_count = 0;
            self.use_fallback = false;
        }
        self.faces = faces;

        if was_fallback != self.use_fallback {
            info!(fallback = self.use_fallback, "Keypoint source switched");
        }
    }

    /// Record the one-shot detection on the fallback image.
    /// Only the first face is kept; an empty result leaves the fallback unavailable.
    pub fn on_fallback_result(&mut self, faces: Vec<Face>) {
        if let Some(face) = faces.into_iter().next() {
            if !face.keypoints.is_empty() {
                info!(points = face.keypoints.len(), "Fallback keypoints ready");
                self.fallback_keypoints = Some(face.keypoints);
            }
        }
    }

    /// Turning the fallback off also forgets the no-face streak.
    pub fn set_fallback_enabled(&mut self, enabled: bool) {
        self.fallback_enabled = enabled;
        if !enabled {
            self.use_fallback = false;
            self.no_face_count = 0;
        }
    }

    /// Keypoints for this tick: the fallback set, or the first live face.
    pub fn active_keypoints(&self) -> &[Keypoint] {
        if self.use_fallback {
            self.fallback_keypoints.as_deref().unwrap_or(&[])
        } else {
            self.faces.first().map(|f| f.keypoints.as_slice()).unwrap_or(&[])
        }
    }

    /// Image to render this tick: the fallback portrait while it is active,
    /// otherwise the live frame. None when the camera gave nothing and the
    /// fallback is not showing.
    pub fn active_source<'a>(
        &self,
        live: Option<&'a FrameBuffer>,
        fallback: Option<&'a FrameBuffer>,
    ) -> Option<&'a FrameBuffer> {
        match fallback {
            Some(img) if self.use_fallback && self.fallback_enabled => Some(img),
            _ => live,
        }
    }
}

/// Map keypoints through the cover placement onto the panel, dropping the
/// ones that land off the panel.
pub fn keypoints_to_grid(
    keypoints: &[Keypoint],
    cover: &CoverTransform,
    layout: &PanelLayout,
) -> Vec<GridPoint> {
    let mapper = GridMapper::new(layout);
    keypoints
        .iter()
        .map(|&k| mapper.to_grid(cover.map_point(k)))
        .filter(|&p| layout.contains(p))
        .collect()
}

/// Panel cells covered by the active face. Empty when there is no face or the
/// usable points do not span an area.
pub fn compute_face_mask(
    state: &DetectionState,
    cover: &CoverTransform,
    layout: &PanelLayout,
) -> Mask {
    let points = keypoints_to_grid(state.active_keypoints(), cover, layout);
    if points.len() < 3 {
        return Mask::new();
    }

    let hull = convex_hull(&points);
    if hull.len() < 3 {
        return Mask::new();
    }
    rasterize_hull(&hull, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn face(raw: &[(f32, f32)]) -> Face {
        Face { keypoints: raw.iter().map(|&(x, y)| Keypoint::new(x, y)).collect() }
    }

    // Source the same size as the canvas, no mirror: canvas == source pixels.
    fn identity_cover(layout: &PanelLayout) -> CoverTransform {
        let (w, h) = (layout.canvas_width() as f32, layout.canvas_height() as f32);
        CoverTransform::compute(w, h, w, h, false)
    }

    #[test]
    fn no_face_yields_empty_mask() {
        let layout = PanelLayout::default();
        let state = DetectionState::default();
        assert!(compute_face_mask(&state, &identity_cover(&layout), &layout).is_empty());
    }

    #[test]
    fn fewer_than_three_points_yields_empty_mask() {
        let layout = PanelLayout::default();
        let mut state = DetectionState::default();
        state.on_live_result(vec![face(&[(50.0, 50.0), (200.0, 50.0)])]);
        assert!(compute_face_mask(&state, &identity_cover(&layout), &layout).is_empty());
    }

    #[test]
    fn off_panel_points_are_dropped_before_the_hull() {
        let layout = PanelLayout::default();
        let mut state = DetectionState::default();
        // Two on the panel, one far outside -> only two usable points
        state.on_live_result(vec![face(&[(50.0, 50.0), (200.0, 50.0), (-900.0, 900.0)])]);
        assert!(compute_face_mask(&state, &identity_cover(&layout), &layout).is_empty());
    }

    #[test]
    fn collinear_face_yields_empty_mask() {
        let layout = PanelLayout::default();
        let mut state = DetectionState::default();
        state.on_live_result(vec![face(&[(45.0, 45.0), (105.0, 105.0), (165.0, 165.0)])]);
        assert!(compute_face_mask(&state, &identity_cover(&layout), &layout).is_empty());
    }

    #[test]
    fn triangle_face_fills_its_cells() {
        let layout = PanelLayout::default();
        let mut state = DetectionState::default();
        // Cell centers (2,2), (10,2), (6,10) with 20px cells
        state.on_live_result(vec![face(&[(50.0, 50.0), (210.0, 50.0), (130.0, 210.0)])]);

        let mask = compute_face_mask(&state, &identity_cover(&layout), &layout);
        assert!(!mask.is_empty());
        let row2: Vec<i32> = mask
            .iter()
            .filter(|c| c.row == 2)
            .map(|&c| layout.logical(c).x)
            .collect();
        assert_eq!(row2, (2..=10).collect::<Vec<_>>());
        assert!(mask.iter().all(|c| (2..=10).contains(&c.row)));
    }

    #[test]
    fn mirrored_cover_flips_the_mask() {
        let layout = PanelLayout::default();
        let (w, h) = (layout.canvas_width() as f32, layout.canvas_height() as f32);
        let mirrored = CoverTransform::compute(w, h, w, h, true);

        let mut state = DetectionState::default();
        // Small square at the left edge of the source
        state.on_live_result(vec![face(&[(5.0, 5.0), (45.0, 5.0), (45.0, 45.0), (5.0, 45.0)])]);

        let mask = compute_face_mask(&state, &mirrored, &layout);
        assert!(!mask.is_empty());
        // ...ends up on the right side of the panel
        assert!(mask.iter().all(|&c| layout.logical(c).x >= 20));
    }

    #[test]
    fn fallback_kicks_in_after_threshold() {
        let mut state = DetectionState::new(true, 2);
        state.on_fallback_result(vec![face(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)])]);

        state.on_live_result(vec![]);
        state.on_live_result(vec![]);
        assert!(!state.use_fallback, "threshold must be exceeded, not met");
        state.on_live_result(vec![]);
        assert!(state.use_fallback);
        assert_eq!(state.active_keypoints().len(), 3);

        state.on_live_result(vec![face(&[(9.0, 9.0)])]);
        assert!(!state.use_fallback);
        assert_eq!(state.no_face_count, 0);
        assert_eq!(state.active_keypoints(), &[Keypoint::new(9.0, 9.0)]);
    }

    #[test]
    fn fallback_needs_reference_and_enable_flag() {
        let mut state = DetectionState::new(true, 0);
        state.on_live_result(vec![]);
        assert!(!state.use_fallback, "no reference loaded yet");

        state.on_fallback_result(vec![face(&[(1.0, 1.0)])]);
        state.on_live_result(vec![]);
        assert!(state.use_fallback);

        state.set_fallback_enabled(false);
        assert!(!state.use_fallback);
        assert_eq!(state.no_face_count, 0);
        state.on_live_result(vec![]);
        assert!(!state.use_fallback);
        assert!(state.active_keypoints().is_empty());
    }

    #[test]
    fn empty_fallback_detection_is_ignored() {
        let mut state = DetectionState::default();
        state.on_fallback_result(vec![]);
        state.on_fallback_result(vec![Face::default()]);
        assert!(!state.fallback_ready());
    }

    fn fallback_state() -> DetectionState {
        let mut state = DetectionState::new(true, 0);
        state.on_fallback_result(vec![face(&[(5.0, 15.0), (55.0, 15.0), (55.0, 65.0), (5.0, 65.0)])]);
        state.on_live_result(vec![]);
        assert!(state.use_fallback);
        state
    }

    #[test]
    fn active_source_follows_the_fallback_switch() {
        let live = FrameBuffer::new(640, 480);
        let still = FrameBuffer::new(240, 320);

        let state = DetectionState::default();
        assert!(std::ptr::eq(state.active_source(Some(&live), Some(&still)).unwrap(), &live));
        assert!(state.active_source(None, Some(&still)).is_none());

        let mut state = fallback_state();
        assert!(std::ptr::eq(state.active_source(Some(&live), Some(&still)).unwrap(), &still));
        // A dropped camera frame still leaves the portrait to show
        assert!(std::ptr::eq(state.active_source(None, Some(&still)).unwrap(), &still));

        state.set_fallback_enabled(false);
        assert!(std::ptr::eq(state.active_source(Some(&live), Some(&still)).unwrap(), &live));
        assert!(state.active_source(None, Some(&still)).is_none());
    }

    #[test]
    fn fallback_keypoints_use_the_fallback_cover() {
        let layout = PanelLayout::default();
        let (cw, ch) = (layout.canvas_width(), layout.canvas_height());
        let live = FrameBuffer::new(640, 480);
        let still = FrameBuffer::new(240, 320);
        let state = fallback_state();

        let source = state.active_source(Some(&live), Some(&still)).unwrap();
        let cover = CoverTransform::for_frames(source, cw, ch);
        let live_cover = CoverTransform::for_frames(&live, cw, ch);
        assert_ne!(cover, live_cover);
        assert_eq!(cover.state.scale, 2.0);

        // Portrait pixels x 5..55 land mirrored in cells 18..=23, y 15..65 in rows 1..6
        let mask = compute_face_mask(&state, &cover, &layout);
        assert_eq!(mask.len(), 30);
        for c in &mask {
            let p = layout.logical(*c);
            assert!((18..=23).contains(&p.x), "{p:?}");
            assert!((1..=5).contains(&p.y), "{p:?}");
        }

        // Under the camera placement the same points fall off the panel
        assert!(compute_face_mask(&state, &live_cover, &layout).is_empty());
    }

    proptest! {
        #[test]
        fn mask_is_idempotent_and_on_panel(
            raw in prop::collection::vec((-50.0f32..530.0, -50.0f32..690.0), 0..70)
        ) {
            let layout = PanelLayout::default();
            let cover = CoverTransform::compute(640.0, 480.0, 480.0, 640.0, true);
            let mut state = DetectionState::default();
            state.on_live_result(vec![face(&raw)]);

            let first = compute_face_mask(&state, &cover, &layout);
            let second = compute_face_mask(&state, &cover, &layout);
            prop_assert_eq!(&first, &second);

            for c in first {
                prop_assert!(layout.contains(layout.logical(c)));
                prop_assert!((0..8).contains(&c.col));
                prop_assert!((0..3).contains(&c.strip));
            }
        }
    }
}
