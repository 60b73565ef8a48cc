use crate::{
    core::{RegionBounds, Viewport},
    region::{RegionSpec, ScrollRange},
};

/// Snap threshold for scrub smoothing; below this the smoothed value locks
/// onto the raw value so catch-up terminates.
const SMOOTH_SNAP: f64 = 1e-4;

/// Converts raw scroll offsets into a region's progress in [0,1] and owns
/// the region's pin state and scrub smoothing.
///
/// The raw mapping is a pure function of (scroll offset, resolved range):
/// re-entering a previously visited range reproduces the same
/// progress-to-state mapping with no drift. Smoothing is explicit state,
/// reset on every rebind.
#[derive(Clone, Debug)]
pub struct ProgressSource {
    spec: RegionSpec,
    range: ScrollRange,
    raw: f64,
    smoothed: f64,
    entered: bool,
}

impl ProgressSource {
    pub fn new(spec: RegionSpec, bounds: RegionBounds, viewport: Viewport) -> Self {
        let range = spec.resolve(bounds, viewport);
        let raw = range.progress(viewport.scroll_y);
        Self {
            spec,
            range,
            raw,
            smoothed: raw,
            entered: raw > 0.0,
        }
    }

    /// Re-resolve the trigger range against fresh bounds and viewport
    /// metrics. Run on resize and on re-mount so stale cached bounds are
    /// never reused; smoothing restarts from the new raw value.
    pub fn rebind(&mut self, bounds: RegionBounds, viewport: Viewport) {
        self.range = self.spec.resolve(bounds, viewport);
        self.raw = self.range.progress(viewport.scroll_y);
        self.smoothed = self.raw;
        self.entered = self.entered || self.raw > 0.0;
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.raw = self.range.progress(scroll_y);
        if self.raw > 0.0 {
            self.entered = true;
        }
    }

    /// Advance scrub smoothing by `dt` seconds of wall-clock time. Without
    /// a smoothing factor the smoothed value tracks raw exactly.
    pub fn advance(&mut self, dt: f64) {
        match self.spec.scrub.smoothing_secs() {
            None => self.smoothed = self.raw,
            Some(tau) => {
                let dt = dt.max(0.0);
                let k = 1.0 - (-dt / tau).exp();
                self.smoothed += (self.raw - self.smoothed) * k;
                if (self.raw - self.smoothed).abs() < SMOOTH_SNAP {
                    self.smoothed = self.raw;
                }
            }
        }
    }

    /// Progress driving the timeline: smoothed when a catch-up factor is
    /// configured, raw otherwise.
    pub fn progress(&self) -> f64 {
        if self.spec.scrub.smoothing_secs().is_some() {
            self.smoothed
        } else {
            self.raw
        }
    }

    pub fn raw_progress(&self) -> f64 {
        self.raw
    }

    /// True once the region has been entered (raw progress left zero);
    /// drives clock-bound playback for non-scrubbed regions.
    pub fn has_entered(&self) -> bool {
        self.entered
    }

    pub fn is_scrubbed(&self) -> bool {
        self.spec.scrub.is_scrubbed()
    }

    pub fn pinned(&self) -> bool {
        self.spec.pinned
    }

    /// Vertical translation in pixels that holds a pinned region fixed on
    /// screen while progress runs 0 to 1, and hands it back to normal flow
    /// once progress reaches 1. Always 0 for unpinned regions.
    ///
    /// Computed from the current resolved range on every query, so a
    /// resize that moves the region out of relevance releases the pin with
    /// the next reconcile.
    pub fn pin_translation(&self, scroll_y: f64) -> f64 {
        if !self.spec.pinned {
            return 0.0;
        }
        let span = self.range.span();
        if span <= 0.0 {
            return 0.0;
        }
        (scroll_y - self.range.start).clamp(0.0, span)
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }
}
