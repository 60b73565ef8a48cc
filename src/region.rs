use crate::{
    core::{RegionBounds, Viewport},
    error::{ScrublineError, ScrublineResult},
};

/// Scroll-trigger anchor: the scroll position at which a fraction of the
/// region's height meets a fraction of the viewport's height.
///
/// The string form is `"<element> <viewport>"` where each side is `top`,
/// `center`, `bottom` or `<n>%` — e.g. `"top top"`, `"top 80%"`,
/// `"5% center"`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Anchor {
    /// Fraction of the region height, 0 = top edge, 1 = bottom edge.
    pub element: f64,
    /// Fraction of the viewport height, 0 = top edge, 1 = bottom edge.
    pub viewport: f64,
}

impl Anchor {
    pub fn new(element: f64, viewport: f64) -> ScrublineResult<Self> {
        if !(element.is_finite() && viewport.is_finite()) {
            return Err(ScrublineError::validation("anchor fractions must be finite"));
        }
        Ok(Self { element, viewport })
    }

    pub fn parse(s: &str) -> ScrublineResult<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ScrublineError::validation(format!(
                "anchor '{s}' must be '<element> <viewport>'"
            )));
        };
        Self::new(parse_fraction(element)?, parse_fraction(viewport)?)
    }

    /// Scroll offset in document pixels at which this anchor is met.
    pub fn resolve(self, bounds: RegionBounds, viewport: Viewport) -> f64 {
        bounds.top + self.element * bounds.height - self.viewport * viewport.height
    }
}

fn parse_fraction(token: &str) -> ScrublineResult<f64> {
    match token.trim().to_ascii_lowercase().as_str() {
        "top" => Ok(0.0),
        "center" => Ok(0.5),
        "bottom" => Ok(1.0),
        t => {
            let Some(num) = t.strip_suffix('%') else {
                return Err(ScrublineError::validation(format!(
                    "anchor token '{token}' must be top/center/bottom or '<n>%'"
                )));
            };
            let pct: f64 = num
                .parse()
                .map_err(|_| ScrublineError::validation(format!("bad anchor percent '{token}'")))?;
            if !pct.is_finite() {
                return Err(ScrublineError::validation(format!(
                    "bad anchor percent '{token}'"
                )));
            }
            Ok(pct / 100.0)
        }
    }
}

impl TryFrom<String> for Anchor {
    type Error = ScrublineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Anchor> for String {
    fn from(a: Anchor) -> Self {
        format!("{} {}", fmt_fraction(a.element), fmt_fraction(a.viewport))
    }
}

fn fmt_fraction(f: f64) -> String {
    if f == 0.0 {
        "top".to_owned()
    } else if f == 0.5 {
        "center".to_owned()
    } else if f == 1.0 {
        "bottom".to_owned()
    } else {
        format!("{}%", f * 100.0)
    }
}

/// End of a region's trigger range: either a second anchor or a relative
/// extent past the start (string form `"+=<n>%"`, percent of viewport
/// height).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RangeEnd {
    Anchor(Anchor),
    Offset { viewport_pct: f64 },
}

impl RangeEnd {
    pub fn parse(s: &str) -> ScrublineResult<Self> {
        let t = s.trim();
        if let Some(rest) = t.strip_prefix("+=") {
            let Some(num) = rest.trim().strip_suffix('%') else {
                return Err(ScrublineError::validation(format!(
                    "relative range end '{s}' must be '+=<n>%'"
                )));
            };
            let pct: f64 = num.parse().map_err(|_| {
                ScrublineError::validation(format!("bad relative range end '{s}'"))
            })?;
            if !pct.is_finite() || pct < 0.0 {
                return Err(ScrublineError::validation(format!(
                    "relative range end '{s}' must be a non-negative percent"
                )));
            }
            return Ok(Self::Offset { viewport_pct: pct });
        }
        Ok(Self::Anchor(Anchor::parse(t)?))
    }
}

impl TryFrom<String> for RangeEnd {
    type Error = ScrublineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RangeEnd> for String {
    fn from(e: RangeEnd) -> Self {
        match e {
            RangeEnd::Anchor(a) => a.into(),
            RangeEnd::Offset { viewport_pct } => format!("+={viewport_pct}%"),
        }
    }
}

/// Scrub binding for a region's timeline.
///
/// JSON form matches the configuration surface: `true` links playback
/// position directly to progress, `false` plays on wall-clock once the
/// region is entered, a number links with that many seconds of catch-up
/// smoothing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Scrub {
    Linked(bool),
    Smooth(f64),
}

impl Scrub {
    pub fn is_scrubbed(self) -> bool {
        !matches!(self, Self::Linked(false))
    }

    pub fn smoothing_secs(self) -> Option<f64> {
        match self {
            Self::Smooth(secs) => Some(secs),
            Self::Linked(_) => None,
        }
    }

    pub fn validate(self) -> ScrublineResult<()> {
        if let Self::Smooth(secs) = self
            && !(secs.is_finite() && secs > 0.0)
        {
            return Err(ScrublineError::validation(
                "scrub smoothing seconds must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Declarative scroll-trigger range for one region.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionSpec {
    pub start: Anchor,
    pub end: RangeEnd,
    /// Hold the region fixed on screen while progress runs 0 to 1.
    #[serde(default)]
    pub pinned: bool,
    pub scrub: Scrub,
}

impl RegionSpec {
    pub fn validate(&self) -> ScrublineResult<()> {
        self.scrub.validate()
    }

    /// Resolve the trigger range into document-pixel scroll offsets.
    ///
    /// Re-run on every resize and on re-mount; resolved ranges are never
    /// cached across viewport changes.
    pub fn resolve(&self, bounds: RegionBounds, viewport: Viewport) -> ScrollRange {
        let start = self.start.resolve(bounds, viewport);
        let end = match self.end {
            RangeEnd::Anchor(a) => a.resolve(bounds, viewport),
            RangeEnd::Offset { viewport_pct } => {
                start + viewport_pct / 100.0 * viewport.height
            }
        };
        ScrollRange { start, end }
    }
}

/// Resolved scroll range in document pixels. May be degenerate
/// (`end <= start`) when the region is shorter than its anchors imply; such
/// ranges behave as a step function around `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

impl ScrollRange {
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    /// Raw progress of `scroll_y` through the range, clamped to [0,1].
    pub fn progress(self, scroll_y: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return if scroll_y < self.start { 0.0 } else { 1.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }
}
