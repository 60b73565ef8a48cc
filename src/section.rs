use std::collections::{BTreeMap, BTreeSet};

use crate::{
    core::{MediaId, RegionBounds, TargetId, Viewport},
    error::{ScrublineError, ScrublineResult},
    media::MediaGate,
    progress::ProgressSource,
    timeline::{BindContext, Timeline},
    tween::{Property, PropertyWrite, Value, WriteTarget},
    variant::VariantSet,
};

/// Declarative description of one scroll-driven section: the element and
/// media handles it renders, plus its responsive variants (each variant
/// carries a complete region, initial state and timeline).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionDef {
    pub name: String,
    pub targets: BTreeSet<TargetId>,
    #[serde(default)]
    pub media: BTreeSet<MediaId>,
    /// Element receiving the pin translation while the region is pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_target: Option<TargetId>,
    pub variants: VariantSet,
}

impl SectionDef {
    pub fn validate(&self) -> ScrublineResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScrublineError::validation("section name must be non-empty"));
        }
        if let Some(pin) = &self.pin_target
            && !self.targets.contains(pin)
        {
            return Err(ScrublineError::validation(format!(
                "section '{}': pin target '{pin}' is not a registered target",
                self.name
            )));
        }
        Ok(())
    }
}

/// Per-section runtime: resolves the applicable variant on mount, owns the
/// region's progress source, timeline and media gate, and guards every
/// write behind an active flag so a torn-down section stays silent.
#[derive(Clone, Debug)]
pub struct SectionController {
    def: SectionDef,
    active: bool,
    variant_idx: usize,
    progress: ProgressSource,
    timeline: Timeline,
    gate: MediaGate,
    /// Durations learned from the gate; survive variant rebuilds because
    /// the media element instance does.
    known_durations: BTreeMap<MediaId, f64>,
    clock_elapsed: f64,
    pin_engaged: bool,
}

impl SectionController {
    /// Activate the section: select the variant for the current viewport,
    /// apply its initial property values (returned as writes to run before
    /// any tween) and bind the timeline to the region.
    pub fn mount(
        def: SectionDef,
        bounds: RegionBounds,
        viewport: Viewport,
    ) -> ScrublineResult<(Self, Vec<PropertyWrite>)> {
        def.validate()?;
        let variant_idx = def.variants.select_index(width_px(viewport))?;
        let mut gate = MediaGate::new();
        let known_durations = BTreeMap::new();
        let (progress, timeline, writes) =
            bind_variant(&def, variant_idx, bounds, viewport, &mut gate, &known_durations)?;
        Ok((
            Self {
                def,
                active: true,
                variant_idx,
                progress,
                timeline,
                gate,
                known_durations,
                clock_elapsed: 0.0,
                pin_engaged: false,
            },
            writes,
        ))
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn variant_name(&self) -> &str {
        &self.def.variants.variants()[self.variant_idx].name
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        if !self.active {
            return;
        }
        self.progress.on_scroll(scroll_y);
    }

    /// Handle a viewport change: re-measure the region and, when the
    /// matching predicate flips, rebuild the section under the new variant
    /// (old bindings torn down before any new write; the returned writes
    /// are the fresh initial state).
    pub fn on_resize(
        &mut self,
        bounds: RegionBounds,
        viewport: Viewport,
    ) -> ScrublineResult<Vec<PropertyWrite>> {
        if !self.active {
            return Ok(Vec::new());
        }
        let idx = self.def.variants.select_index(width_px(viewport))?;
        if idx != self.variant_idx {
            tracing::debug!(
                section = %self.def.name,
                from = %self.variant_name(),
                to = %self.def.variants.variants()[idx].name,
                "variant flip"
            );
            self.gate.cancel_all();
            let (progress, timeline, writes) =
                bind_variant(&self.def, idx, bounds, viewport, &mut self.gate, &self.known_durations)?;
            self.variant_idx = idx;
            self.progress = progress;
            self.timeline = timeline;
            self.clock_elapsed = 0.0;
            return Ok(writes);
        }
        self.progress.rebind(bounds, viewport);
        Ok(Vec::new())
    }

    /// Deliver a media metadata event. Returns `true` when a queued step
    /// attached.
    pub fn media_ready(&mut self, media: &MediaId, duration_secs: f64) -> ScrublineResult<bool> {
        if !self.active {
            return Ok(false);
        }
        let Some(duration) = self.gate.fire(media, duration_secs)? else {
            return Ok(false);
        };
        self.known_durations.insert(media.clone(), duration);
        let variant = &self.def.variants.variants()[self.variant_idx];
        self.timeline.media_ready(media, duration, &variant.initial)
    }

    /// Reconcile one frame: advance smoothing / clock playback and emit the
    /// full property state for the current playback position. An inactive
    /// section emits nothing.
    pub fn reconcile(&mut self, scroll_y: f64, dt: f64) -> Vec<PropertyWrite> {
        if !self.active {
            return Vec::new();
        }
        self.progress.advance(dt);

        let mut writes = Vec::new();
        if self.progress.pinned()
            && let Some(pin) = &self.def.pin_target
        {
            let translation = self.progress.pin_translation(scroll_y);
            self.pin_engaged = translation > 0.0 && self.progress.raw_progress() < 1.0;
            writes.push(PropertyWrite {
                target: WriteTarget::Element(pin.clone()),
                property: Property::PinOffset,
                value: Value::Px(translation),
            });
        }

        if self.progress.is_scrubbed() {
            writes.extend(self.timeline.sample(self.progress.progress()));
        } else if self.progress.has_entered() {
            self.clock_elapsed += dt.max(0.0);
            writes.extend(self.timeline.sample_at(self.clock_elapsed));
        }
        writes
    }

    /// Deactivate: cancel media subscriptions and listeners synchronously
    /// and release the pin. Returns the writes that reset the pin channel;
    /// after this the controller never emits again.
    pub fn unmount(&mut self) -> Vec<PropertyWrite> {
        if !self.active {
            return Vec::new();
        }
        self.active = false;
        self.gate.cancel_all();

        let mut writes = Vec::new();
        if self.pin_engaged
            && let Some(pin) = &self.def.pin_target
        {
            writes.push(PropertyWrite {
                target: WriteTarget::Element(pin.clone()),
                property: Property::PinOffset,
                value: Value::Px(0.0),
            });
        }
        self.pin_engaged = false;
        writes
    }
}

/// Build one variant's bindings: progress source on its region, timeline
/// bound to the section's targets, media steps attached from already-known
/// durations or subscribed on the gate. Returns the variant's initial-state
/// writes.
fn bind_variant(
    def: &SectionDef,
    idx: usize,
    bounds: RegionBounds,
    viewport: Viewport,
    gate: &mut MediaGate,
    known_durations: &BTreeMap<MediaId, f64>,
) -> ScrublineResult<(ProgressSource, Timeline, Vec<PropertyWrite>)> {
    let variant = &def.variants.variants()[idx];
    let mut timeline = Timeline::build(
        &variant.timeline,
        BindContext {
            targets: &def.targets,
            media: &def.media,
            initial: &variant.initial,
        },
    )?;

    for media in timeline.pending_media() {
        match known_durations.get(&media) {
            Some(d) => {
                timeline.media_ready(&media, *d, &variant.initial)?;
            }
            None => gate.register(media),
        }
    }

    let progress = ProgressSource::new(variant.region.clone(), bounds, viewport);
    Ok((progress, timeline, variant.initial.writes()))
}

fn width_px(viewport: Viewport) -> u32 {
    viewport.width.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ease::Ease,
        region::{Anchor, RangeEnd, RegionSpec, Scrub},
        timeline::{TimelineEntry, TimelineSpec},
        tween::{InitialValues, StepPosition, StepSpec},
        variant::{Breakpoint, VariantDef, VariantSet},
    };

    fn fade_variant(name: &str, breakpoint: Breakpoint, margin_vh: f64) -> VariantDef {
        let wrap = TargetId::new("wrap");
        let mut initial = InitialValues::new();
        initial.set(wrap.clone(), Property::Opacity, Value::Scalar(0.0));
        initial.set(wrap.clone(), Property::MarginTop, Value::Vh(margin_vh));
        VariantDef {
            name: name.to_owned(),
            breakpoint,
            region: RegionSpec {
                start: Anchor::parse("top top").unwrap(),
                end: RangeEnd::parse("+=150%").unwrap(),
                pinned: true,
                scrub: Scrub::Linked(true),
            },
            initial,
            timeline: TimelineSpec {
                steps: vec![TimelineEntry::Tween(StepSpec {
                    target: wrap,
                    property: Property::Opacity,
                    to: Value::Scalar(1.0),
                    from: None,
                    ease: Ease::InOutQuad,
                    duration: 1.0,
                    position: StepPosition::Sequential,
                })],
            },
        }
    }

    fn def() -> SectionDef {
        SectionDef {
            name: "reveal".to_owned(),
            targets: [TargetId::new("wrap")].into_iter().collect(),
            media: BTreeSet::new(),
            pin_target: Some(TargetId::new("wrap")),
            variants: VariantSet::new(vec![
                fade_variant("desktop", Breakpoint::min(769), -100.0),
                fade_variant("mobile", Breakpoint::max(768), -40.0),
            ])
            .unwrap(),
        }
    }

    fn viewport(scroll: f64, width: f64) -> Viewport {
        Viewport::new(scroll, width, 800.0).unwrap()
    }

    fn bounds() -> RegionBounds {
        RegionBounds::new(2000.0, 800.0).unwrap()
    }

    #[test]
    fn mount_applies_initial_state_before_any_tween() {
        let (_, writes) = SectionController::mount(def(), bounds(), viewport(0.0, 1280.0)).unwrap();
        assert!(writes.iter().any(|w| w.property == Property::Opacity
            && w.value == Value::Scalar(0.0)));
        assert!(writes.iter().any(|w| w.property == Property::MarginTop
            && w.value == Value::Vh(-100.0)));
    }

    #[test]
    fn variant_flip_rebuilds_with_fresh_initial_state() {
        let (mut s, _) = SectionController::mount(def(), bounds(), viewport(0.0, 1280.0)).unwrap();
        assert_eq!(s.variant_name(), "desktop");

        let writes = s.on_resize(bounds(), viewport(0.0, 600.0)).unwrap();
        assert_eq!(s.variant_name(), "mobile");
        assert!(writes.iter().any(|w| w.property == Property::MarginTop
            && w.value == Value::Vh(-40.0)));

        // Same variant again: no initial-state replay.
        assert!(s.on_resize(bounds(), viewport(0.0, 500.0)).unwrap().is_empty());
    }

    #[test]
    fn unmounted_section_emits_nothing() {
        let (mut s, _) = SectionController::mount(def(), bounds(), viewport(0.0, 1280.0)).unwrap();
        s.on_scroll(2400.0);
        assert!(!s.reconcile(2400.0, 0.016).is_empty());

        let release = s.unmount();
        assert!(release.iter().any(|w| w.property == Property::PinOffset
            && w.value == Value::Px(0.0)));

        // Scroll events after teardown: zero writes.
        s.on_scroll(2600.0);
        assert!(s.reconcile(2600.0, 0.016).is_empty());
        assert!(s.unmount().is_empty());
        assert!(!s.is_active());
    }

    #[test]
    fn pin_target_must_be_registered() {
        let mut d = def();
        d.pin_target = Some(TargetId::new("ghost"));
        assert!(SectionController::mount(d, bounds(), viewport(0.0, 1280.0)).is_err());
    }

    #[test]
    fn remount_replays_identically() {
        let (mut first, w1) =
            SectionController::mount(def(), bounds(), viewport(0.0, 1280.0)).unwrap();
        first.on_scroll(2600.0);
        let mid1 = first.reconcile(2600.0, 0.016);
        first.unmount();

        let (mut second, w2) =
            SectionController::mount(def(), bounds(), viewport(0.0, 1280.0)).unwrap();
        second.on_scroll(2600.0);
        let mid2 = second.reconcile(2600.0, 0.016);

        assert_eq!(w1, w2);
        assert_eq!(mid1, mid2);
    }

    #[test]
    fn clock_bound_timeline_plays_on_entry() {
        let mut d = def();
        let mut variants: Vec<VariantDef> = d.variants.variants().to_vec();
        for v in &mut variants {
            v.region.scrub = Scrub::Linked(false);
            v.region.pinned = false;
            for step in &mut v.timeline.steps {
                if let TimelineEntry::Tween(s) = step {
                    s.ease = Ease::Linear;
                }
            }
        }
        d.pin_target = None;
        d.variants = VariantSet::new(variants).unwrap();

        let (mut s, _) = SectionController::mount(d, bounds(), viewport(0.0, 1280.0)).unwrap();

        // Not entered yet: silent.
        assert!(s.reconcile(0.0, 0.5).is_empty());

        // Entering starts wall-clock playback regardless of scroll speed.
        s.on_scroll(2100.0);
        let early = s.reconcile(2100.0, 0.25);
        let late = s.reconcile(2100.0, 0.5);
        let opacity = |ws: &[PropertyWrite]| {
            ws.iter()
                .find(|w| w.property == Property::Opacity)
                .map(|w| w.value)
                .unwrap()
        };
        assert_eq!(opacity(&early), Value::Scalar(0.25));
        assert_eq!(opacity(&late), Value::Scalar(0.75));

        // Clamps at the end.
        let done = s.reconcile(2100.0, 10.0);
        assert_eq!(opacity(&done), Value::Scalar(1.0));
    }
}
