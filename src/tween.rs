use std::collections::BTreeMap;

use crate::{
    core::{MediaId, TargetId, Vec2},
    ease::Ease,
    error::{ScrublineError, ScrublineResult},
};

/// Animatable visual property.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    Scale,
    Width,
    X,
    Y,
    MarginTop,
    MaskPosition,
    MaskSize,
    MediaTime,
    /// Vertical translation holding a pinned region on screen; written only
    /// by the region's own section controller.
    PinOffset,
}

impl Property {
    fn accepts(self, kind: ValueKind) -> bool {
        match self {
            Self::Opacity | Self::Scale => kind == ValueKind::Scalar,
            Self::Width => matches!(kind, ValueKind::Percent | ValueKind::Px),
            Self::X | Self::Y => matches!(kind, ValueKind::Px | ValueKind::Percent),
            Self::MarginTop => matches!(kind, ValueKind::Vh | ValueKind::Px | ValueKind::Percent),
            Self::MaskPosition => kind == ValueKind::Point,
            Self::MaskSize => matches!(kind, ValueKind::Percent | ValueKind::Point),
            Self::MediaTime => kind == ValueKind::Secs,
            Self::PinOffset => kind == ValueKind::Px,
        }
    }
}

/// Unit-tagged property value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Dimensionless (opacity, scale).
    Scalar(f64),
    Px(f64),
    Percent(f64),
    /// Percent of viewport height.
    Vh(f64),
    /// Media playback seconds.
    Secs(f64),
    /// Percent pair (mask position / size).
    Point(Vec2),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Px,
    Percent,
    Vh,
    Secs,
    Point,
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Value {
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Px(_) => ValueKind::Px,
            Self::Percent(_) => ValueKind::Percent,
            Self::Vh(_) => ValueKind::Vh,
            Self::Secs(_) => ValueKind::Secs,
            Self::Point(_) => ValueKind::Point,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Self::Scalar(v) | Self::Px(v) | Self::Percent(v) | Self::Vh(v) | Self::Secs(v) => {
                v.is_finite()
            }
            Self::Point(p) => p.x.is_finite() && p.y.is_finite(),
        }
    }

    /// Interpolate between two values of the same kind. Kind agreement is
    /// enforced when a timeline is built; a mismatch here holds `a`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        match (a, b) {
            (Self::Scalar(x), Self::Scalar(y)) => Self::Scalar(f64::lerp(&x, &y, t)),
            (Self::Px(x), Self::Px(y)) => Self::Px(f64::lerp(&x, &y, t)),
            (Self::Percent(x), Self::Percent(y)) => Self::Percent(f64::lerp(&x, &y, t)),
            (Self::Vh(x), Self::Vh(y)) => Self::Vh(f64::lerp(&x, &y, t)),
            (Self::Secs(x), Self::Secs(y)) => Self::Secs(f64::lerp(&x, &y, t)),
            (Self::Point(x), Self::Point(y)) => Self::Point(Vec2::lerp(&x, &y, t)),
            _ => a,
        }
    }
}

/// Where a step starts on the timeline's local axis.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Immediately after the previous step ends.
    #[default]
    Sequential,
    /// Simultaneous with the previous step's start.
    WithPrevious,
}

fn default_weight() -> f64 {
    1.0
}

/// One declared property tween.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepSpec {
    pub target: TargetId,
    pub property: Property,
    pub to: Value,
    /// Start value; when absent, chained from the initial-values table or
    /// from an earlier step on the same (target, property).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default)]
    pub ease: Ease,
    /// Relative weight on the timeline's local axis (scrub-bound) or
    /// seconds (clock-bound).
    #[serde(default = "default_weight")]
    pub duration: f64,
    #[serde(default)]
    pub position: StepPosition,
}

impl StepSpec {
    pub fn validate(&self) -> ScrublineResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ScrublineError::validation(format!(
                "step on '{}' has non-positive duration",
                self.target
            )));
        }
        if !self.to.is_finite() {
            return Err(ScrublineError::validation(format!(
                "step on '{}' has a non-finite target value",
                self.target
            )));
        }
        if !self.property.accepts(self.to.kind()) {
            return Err(ScrublineError::validation(format!(
                "step on '{}': value unit does not fit property {:?}",
                self.target, self.property
            )));
        }
        if let Some(from) = self.from {
            if from.kind() != self.to.kind() {
                return Err(ScrublineError::validation(format!(
                    "step on '{}': from/to units differ",
                    self.target
                )));
            }
            if !from.is_finite() {
                return Err(ScrublineError::validation(format!(
                    "step on '{}' has a non-finite start value",
                    self.target
                )));
            }
        }
        Ok(())
    }
}

/// A media scrub declared before the asset's duration is known; the end
/// value (`MediaTime` seconds) is bound by the readiness gate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaStepSpec {
    pub media: MediaId,
    #[serde(default)]
    pub ease: Ease,
    #[serde(default = "default_weight")]
    pub duration: f64,
    #[serde(default)]
    pub position: StepPosition,
}

impl MediaStepSpec {
    pub fn validate(&self) -> ScrublineResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ScrublineError::validation(format!(
                "media step on '{}' has non-positive duration",
                self.media
            )));
        }
        Ok(())
    }
}

/// Destination of a property write.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteTarget {
    Element(TargetId),
    Media(MediaId),
}

impl std::fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element(t) => t.fmt(f),
            Self::Media(m) => m.fmt(f),
        }
    }
}

/// One reconciled property write emitted toward the host sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PropertyWrite {
    pub target: WriteTarget,
    pub property: Property,
    pub value: Value,
}

/// Explicit initial values for every animated (target, property) pair: the
/// "set initial state" contract that makes replay after remount visually
/// identical to first mount.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InitialValues(BTreeMap<TargetId, BTreeMap<Property, Value>>);

impl InitialValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: TargetId, property: Property, value: Value) {
        self.0.entry(target).or_default().insert(property, value);
    }

    pub fn get(&self, target: &TargetId, property: Property) -> Option<Value> {
        self.0.get(target).and_then(|m| m.get(&property)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Writes applied before any tween runs, in stable (target, property)
    /// order.
    pub fn writes(&self) -> Vec<PropertyWrite> {
        self.0
            .iter()
            .flat_map(|(target, props)| {
                props.iter().map(|(property, value)| PropertyWrite {
                    target: WriteTarget::Element(target.clone()),
                    property: *property,
                    value: *value,
                })
            })
            .collect()
    }

    pub fn validate(&self) -> ScrublineResult<()> {
        for (target, props) in &self.0 {
            for (property, value) in props {
                if !value.is_finite() {
                    return Err(ScrublineError::validation(format!(
                        "initial value for '{target}' is non-finite"
                    )));
                }
                if !property.accepts(value.kind()) {
                    return Err(ScrublineError::validation(format!(
                        "initial value for '{target}': unit does not fit property {property:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}
