use crate::{
    error::{ScrublineError, ScrublineResult},
    region::RegionSpec,
    timeline::TimelineSpec,
    tween::InitialValues,
};

/// Viewport-width predicate in integer CSS pixels, both bounds inclusive.
/// `None` leaves that side unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Breakpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

impl Breakpoint {
    /// Matches every width.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn min(width: u32) -> Self {
        Self {
            min_width: Some(width),
            max_width: None,
        }
    }

    pub fn max(width: u32) -> Self {
        Self {
            min_width: None,
            max_width: Some(width),
        }
    }

    pub fn matches(self, width_px: u32) -> bool {
        self.min_width.is_none_or(|min| width_px >= min)
            && self.max_width.is_none_or(|max| width_px <= max)
    }

    pub fn validate(self) -> ScrublineResult<()> {
        if let (Some(min), Some(max)) = (self.min_width, self.max_width)
            && min > max
        {
            return Err(ScrublineError::validation(
                "breakpoint min_width must be <= max_width",
            ));
        }
        Ok(())
    }
}

/// One responsive configuration: predicate plus the complete region,
/// initial state and timeline it selects.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantDef {
    pub name: String,
    pub breakpoint: Breakpoint,
    pub region: RegionSpec,
    #[serde(default)]
    pub initial: InitialValues,
    pub timeline: TimelineSpec,
}

impl VariantDef {
    pub fn validate(&self) -> ScrublineResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScrublineError::validation("variant name must be non-empty"));
        }
        self.breakpoint.validate()?;
        self.region.validate()?;
        self.initial.validate()?;
        self.timeline.validate()
    }
}

/// Ordered variant list; the first matching predicate wins. Construction
/// requires the predicates to cover every viewport width, so selection can
/// never come up empty at runtime.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<VariantDef>", into = "Vec<VariantDef>")]
pub struct VariantSet {
    variants: Vec<VariantDef>,
}

impl VariantSet {
    pub fn new(variants: Vec<VariantDef>) -> ScrublineResult<Self> {
        if variants.is_empty() {
            return Err(ScrublineError::validation(
                "variant set must have at least one variant",
            ));
        }
        for v in &variants {
            v.validate()?;
        }

        // Exhaustiveness: the union of [min, max] intervals must cover
        // every integer width. Overlaps are fine, first match wins.
        let mut intervals: Vec<(u64, Option<u64>)> = variants
            .iter()
            .map(|v| {
                (
                    u64::from(v.breakpoint.min_width.unwrap_or(0)),
                    v.breakpoint.max_width.map(u64::from),
                )
            })
            .collect();
        intervals.sort_by_key(|(min, _)| *min);

        let mut covered_below: u64 = 0; // all widths < covered_below are covered
        let mut unbounded = false;
        for (min, max) in intervals {
            if min > covered_below {
                return Err(ScrublineError::validation(format!(
                    "variant predicates leave widths {}..={} unmatched",
                    covered_below,
                    min - 1
                )));
            }
            match max {
                None => unbounded = true,
                Some(max) => covered_below = covered_below.max(max + 1),
            }
        }
        if !unbounded {
            return Err(ScrublineError::validation(format!(
                "variant predicates leave widths >= {covered_below} unmatched"
            )));
        }

        Ok(Self { variants })
    }

    pub fn variants(&self) -> &[VariantDef] {
        &self.variants
    }

    /// Index of the first variant matching `width_px`. Total for every
    /// width thanks to the construction-time coverage check.
    pub fn select_index(&self, width_px: u32) -> ScrublineResult<usize> {
        self.variants
            .iter()
            .position(|v| v.breakpoint.matches(width_px))
            .ok_or_else(|| {
                ScrublineError::evaluation(format!("no variant matches width {width_px}px"))
            })
    }

    pub fn select(&self, width_px: u32) -> ScrublineResult<&VariantDef> {
        Ok(&self.variants[self.select_index(width_px)?])
    }
}

impl TryFrom<Vec<VariantDef>> for VariantSet {
    type Error = ScrublineError;

    fn try_from(variants: Vec<VariantDef>) -> Result<Self, Self::Error> {
        Self::new(variants)
    }
}

impl From<VariantSet> for Vec<VariantDef> {
    fn from(set: VariantSet) -> Self {
        set.variants
    }
}
