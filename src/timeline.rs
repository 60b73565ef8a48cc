use std::collections::{BTreeMap, BTreeSet};

use crate::{
    core::{MediaId, TargetId},
    ease::Ease,
    error::{ScrublineError, ScrublineResult},
    tween::{InitialValues, MediaStepSpec, Property, PropertyWrite, StepPosition, StepSpec, Value,
        WriteTarget},
};

/// Declarative timeline: property tweens in execution order, plus media
/// scrubs whose end value is bound later by the readiness gate.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineSpec {
    pub steps: Vec<TimelineEntry>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEntry {
    Tween(StepSpec),
    MediaScrub(MediaStepSpec),
}

impl TimelineSpec {
    pub fn validate(&self) -> ScrublineResult<()> {
        for entry in &self.steps {
            match entry {
                TimelineEntry::Tween(s) => s.validate()?,
                TimelineEntry::MediaScrub(s) => s.validate()?,
            }
        }
        Ok(())
    }
}

/// Everything the timeline needs from its section at bind time.
#[derive(Clone, Copy, Debug)]
pub struct BindContext<'a> {
    /// Element handles registered by the section; a step whose target is
    /// absent degrades to an inert no-op.
    pub targets: &'a BTreeSet<TargetId>,
    /// Media handles rendered by the section.
    pub media: &'a BTreeSet<MediaId>,
    /// Start values for from-chaining.
    pub initial: &'a InitialValues,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepState {
    Active,
    /// Target absent at bind time; occupies its axis span but never writes.
    MissingTarget,
    /// Media scrub queued until the asset reports its duration.
    AwaitingMedia,
}

#[derive(Clone, Debug)]
struct LaidStep {
    target: WriteTarget,
    property: Property,
    from: Value,
    to: Value,
    ease: Ease,
    start: f64,
    end: f64,
    state: StepState,
}

impl LaidStep {
    fn local_progress(&self, t: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if t < self.start { 0.0 } else { 1.0 };
        }
        ((t - self.start) / span).clamp(0.0, 1.0)
    }
}

/// A bound timeline. Sampling is a pure function of playback position:
/// seeking backward or forward reproduces the exact prior state, and
/// discontinuous progress jumps are safe because no side effects
/// accumulate.
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    laid: Vec<LaidStep>,
    total: f64,
    media_durations: BTreeMap<MediaId, f64>,
    known_targets: BTreeSet<TargetId>,
    known_media: BTreeSet<MediaId>,
}

impl Timeline {
    /// Validate, resolve start values and lay the steps onto the local
    /// axis. Sequential steps start at the end of the previous step; steps
    /// marked `WithPrevious` share the previous step's start. Durations are
    /// weights on the axis (seconds, for clock-bound playback).
    #[tracing::instrument(skip_all, fields(steps = spec.steps.len()))]
    pub fn build(spec: &TimelineSpec, ctx: BindContext<'_>) -> ScrublineResult<Self> {
        spec.validate()?;
        ctx.initial.validate()?;

        for entry in &spec.steps {
            match entry {
                TimelineEntry::Tween(s) => {
                    if !ctx.targets.contains(&s.target) {
                        tracing::warn!(target = %s.target, "step target missing at bind time, step is a no-op");
                    }
                }
                TimelineEntry::MediaScrub(s) => {
                    if !ctx.media.contains(&s.media) {
                        tracing::warn!(media = %s.media, "media step references unregistered media, step is a no-op");
                    }
                }
            }
        }

        let mut tl = Self {
            entries: spec.steps.clone(),
            laid: Vec::new(),
            total: 0.0,
            media_durations: BTreeMap::new(),
            known_targets: ctx.targets.clone(),
            known_media: ctx.media.clone(),
        };
        tl.lay_out(ctx.initial)?;
        Ok(tl)
    }

    /// Recompute the laid axis from the declared entries. Media scrubs
    /// without a known duration are queued: they occupy no axis span and
    /// are transparent to the cursor, so they produce zero writes and do
    /// not shift their neighbours until attached.
    fn lay_out(&mut self, initial: &InitialValues) -> ScrublineResult<()> {
        let mut laid = Vec::with_capacity(self.entries.len());
        let mut last_value: BTreeMap<(WriteTarget, Property), Value> = BTreeMap::new();
        let mut prev_start = 0.0_f64;
        let mut prev_end = 0.0_f64;

        for entry in &self.entries {
            let (target, property, from, to, ease, duration, position, state) = match entry {
                TimelineEntry::Tween(s) => {
                    let target = WriteTarget::Element(s.target.clone());
                    let key = (target.clone(), s.property);
                    let from = match s.from {
                        Some(v) => v,
                        None => match last_value
                            .get(&key)
                            .copied()
                            .or_else(|| initial.get(&s.target, s.property))
                        {
                            Some(v) => v,
                            None => {
                                return Err(ScrublineError::timeline(format!(
                                    "step on '{}' ({:?}) has no start value: set an initial value or an explicit 'from'",
                                    s.target, s.property
                                )));
                            }
                        },
                    };
                    if from.kind() != s.to.kind() {
                        return Err(ScrublineError::timeline(format!(
                            "step on '{}' ({:?}): start and end units differ",
                            s.target, s.property
                        )));
                    }
                    let state = if self.known_targets.contains(&s.target) {
                        StepState::Active
                    } else {
                        StepState::MissingTarget
                    };
                    (
                        target, s.property, from, s.to, s.ease, s.duration, s.position, state,
                    )
                }
                TimelineEntry::MediaScrub(s) => {
                    let target = WriteTarget::Media(s.media.clone());
                    let known = self.known_media.contains(&s.media);
                    let duration_secs = self.media_durations.get(&s.media).copied();
                    let (to, state) = match (known, duration_secs) {
                        (false, _) => (Value::Secs(0.0), StepState::MissingTarget),
                        (true, None) => (Value::Secs(0.0), StepState::AwaitingMedia),
                        (true, Some(d)) => (Value::Secs(d), StepState::Active),
                    };
                    (
                        target,
                        Property::MediaTime,
                        Value::Secs(0.0),
                        to,
                        s.ease,
                        s.duration,
                        s.position,
                        state,
                    )
                }
            };

            if state == StepState::AwaitingMedia {
                laid.push(LaidStep {
                    target,
                    property,
                    from,
                    to,
                    ease,
                    start: prev_start,
                    end: prev_start,
                    state,
                });
                continue;
            }

            let start = match position {
                StepPosition::Sequential => prev_end,
                StepPosition::WithPrevious => prev_start,
            };
            let end = start + duration;
            last_value.insert((target.clone(), property), to);
            laid.push(LaidStep {
                target,
                property,
                from,
                to,
                ease,
                start,
                end,
                state,
            });
            prev_start = start;
            prev_end = end;
        }

        self.total = laid.iter().fold(0.0_f64, |acc, s| acc.max(s.end));
        self.laid = laid;
        Ok(())
    }

    /// Local axis length: the sum of sequential weights (seconds for
    /// clock-bound playback).
    pub fn total(&self) -> f64 {
        self.total
    }

    /// True while at least one media scrub is still waiting for metadata.
    pub fn has_pending_media(&self) -> bool {
        self.laid.iter().any(|s| s.state == StepState::AwaitingMedia)
    }

    /// Media handles still waiting for metadata, for gate bookkeeping.
    pub fn pending_media(&self) -> BTreeSet<MediaId> {
        self.laid
            .iter()
            .filter(|s| s.state == StepState::AwaitingMedia)
            .filter_map(|s| match &s.target {
                WriteTarget::Media(m) => Some(m.clone()),
                WriteTarget::Element(_) => None,
            })
            .collect()
    }

    /// Finalize queued media scrubs for `media` with the now-known
    /// duration and attach them to the execution graph. Returns `true`
    /// when a step was attached; repeated events for the same asset are
    /// ignored.
    pub fn media_ready(
        &mut self,
        media: &MediaId,
        duration_secs: f64,
        initial: &InitialValues,
    ) -> ScrublineResult<bool> {
        if !(duration_secs.is_finite() && duration_secs >= 0.0) {
            return Err(ScrublineError::evaluation(format!(
                "media '{media}' reported invalid duration {duration_secs}"
            )));
        }
        if self.media_durations.contains_key(media) {
            return Ok(false);
        }
        let referenced = self.laid.iter().any(|s| {
            s.state == StepState::AwaitingMedia && s.target == WriteTarget::Media(media.clone())
        });
        if !referenced {
            return Ok(false);
        }
        self.media_durations.insert(media.clone(), duration_secs);
        self.lay_out(initial)?;
        Ok(true)
    }

    /// Full property state at `progress` in [0,1] (scrub-bound playback).
    pub fn sample(&self, progress: f64) -> Vec<PropertyWrite> {
        self.sample_time(progress.clamp(0.0, 1.0) * self.total)
    }

    /// Full property state after `elapsed` seconds (clock-bound playback).
    pub fn sample_at(&self, elapsed_secs: f64) -> Vec<PropertyWrite> {
        self.sample_time(elapsed_secs.clamp(0.0, self.total))
    }

    fn sample_time(&self, t: f64) -> Vec<PropertyWrite> {
        let mut writes = Vec::with_capacity(self.laid.len());
        for step in &self.laid {
            if step.state != StepState::Active {
                continue;
            }
            let eased = step.ease.apply(step.local_progress(t));
            writes.push(PropertyWrite {
                target: step.target.clone(),
                property: step.property,
                value: Value::lerp(step.from, step.to, eased),
            });
        }
        writes
    }
}
