use crate::error::{ScrublineError, ScrublineResult};

/// 2D value used for mask positions and sizes, in percent units.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Process-wide read-only scroll/viewport snapshot observed by every
/// progress source. Nothing in the engine mutates it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Vertical scroll offset in document pixels.
    pub scroll_y: f64,
    /// Viewport width in pixels, drives variant selection.
    pub width: f64,
    /// Viewport height in pixels, drives anchor resolution.
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, width: f64, height: f64) -> ScrublineResult<Self> {
        if !(scroll_y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(ScrublineError::validation("viewport metrics must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(ScrublineError::validation(
                "viewport width/height must be > 0",
            ));
        }
        Ok(Self {
            scroll_y,
            width,
            height,
        })
    }

    pub fn with_scroll(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }
}

/// Document-space placement of a region's boundary markers, measured by the
/// host layout layer at mount and again on resize.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionBounds {
    /// Distance from document top to the region's top edge, in pixels.
    pub top: f64,
    /// Region height in pixels.
    pub height: f64,
}

impl RegionBounds {
    pub fn new(top: f64, height: f64) -> ScrublineResult<Self> {
        if !(top.is_finite() && height.is_finite()) {
            return Err(ScrublineError::validation("region bounds must be finite"));
        }
        if height < 0.0 {
            return Err(ScrublineError::validation("region height must be >= 0"));
        }
        Ok(Self { top, height })
    }
}

/// Handle to an animatable element supplied by the host at mount.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a media element whose duration is unknown until its metadata
/// event fires.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_rejects_degenerate_sizes() {
        assert!(Viewport::new(0.0, 0.0, 768.0).is_err());
        assert!(Viewport::new(0.0, 1280.0, -1.0).is_err());
        assert!(Viewport::new(f64::NAN, 1280.0, 768.0).is_err());
        assert!(Viewport::new(0.0, 1280.0, 768.0).is_ok());
    }

    #[test]
    fn region_bounds_allow_zero_height() {
        assert!(RegionBounds::new(100.0, 0.0).is_ok());
        assert!(RegionBounds::new(100.0, -5.0).is_err());
    }
}
