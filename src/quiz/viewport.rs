//! Map viewport bookkeeping.
//!
//! Pan/zoom is view-only state: it never touches the quiz state, but the
//! engine adjusts it when a new target should be brought into view.

/// Lowest zoom level (whole world).
pub const MIN_ZOOM: f64 = 1.0;
/// Highest zoom level.
pub const MAX_ZOOM: f64 = 12.0;
/// Multiplicative zoom step per user intent.
pub const ZOOM_STEP: f64 = 1.5;

/// Current map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Center as longitude/latitude, matching the renderer's convention.
    pub center: [f64; 2],
    /// Current zoom level in [`MIN_ZOOM`], [`MAX_ZOOM`].
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: MIN_ZOOM,
        }
    }
}

impl Viewport {
    /// One zoom step in.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    /// One zoom step out.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Back to the whole-world view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Centers on a latitude/longitude pair, raising zoom to at least
    /// `min_zoom` without lowering an already-closer view.
    pub fn focus(&mut self, latlng: [f64; 2], min_zoom: f64) {
        let [lat, lng] = latlng;
        self.center = [lng, lat];
        self.zoom = self.zoom.max(min_zoom.clamp(MIN_ZOOM, MAX_ZOOM));
    }
}
