use std::collections::BTreeSet;

use crate::{
    core::{MediaId, TargetId},
    ease::Ease,
    error::ScrublineResult,
    region::{Anchor, RangeEnd, RegionSpec, Scrub},
    section::SectionDef,
    timeline::{TimelineEntry, TimelineSpec},
    tween::{InitialValues, MediaStepSpec, Property, StepPosition, StepSpec, Value},
    variant::{Breakpoint, VariantDef, VariantSet},
};

/// Builder for one responsive variant: region, initial state and steps in
/// execution order.
pub struct VariantBuilder {
    name: String,
    breakpoint: Breakpoint,
    region: Option<RegionSpec>,
    initial: InitialValues,
    steps: Vec<TimelineEntry>,
}

impl VariantBuilder {
    pub fn new(name: impl Into<String>, breakpoint: Breakpoint) -> Self {
        Self {
            name: name.into(),
            breakpoint,
            region: None,
            initial: InitialValues::new(),
            steps: Vec::new(),
        }
    }

    /// Bind the variant to a scroll region using the anchor grammar, e.g.
    /// `region("top top", "+=200%", true, Scrub::Linked(true))`.
    pub fn region(
        mut self,
        start: &str,
        end: &str,
        pinned: bool,
        scrub: Scrub,
    ) -> ScrublineResult<Self> {
        self.region = Some(RegionSpec {
            start: Anchor::parse(start)?,
            end: RangeEnd::parse(end)?,
            pinned,
            scrub,
        });
        Ok(self)
    }

    /// Explicit initial value for an animated property, applied before any
    /// tween runs.
    pub fn set(mut self, target: impl Into<String>, property: Property, value: Value) -> Self {
        self.initial.set(TargetId::new(target), property, value);
        self
    }

    /// Sequential unit-weight tween.
    pub fn tween(
        self,
        target: impl Into<String>,
        property: Property,
        to: Value,
        ease: Ease,
    ) -> Self {
        self.step(StepSpec {
            target: TargetId::new(target),
            property,
            to,
            from: None,
            ease,
            duration: 1.0,
            position: StepPosition::Sequential,
        })
    }

    /// Unit-weight tween starting together with the previous step.
    pub fn tween_with_previous(
        self,
        target: impl Into<String>,
        property: Property,
        to: Value,
        ease: Ease,
    ) -> Self {
        self.step(StepSpec {
            target: TargetId::new(target),
            property,
            to,
            from: None,
            ease,
            duration: 1.0,
            position: StepPosition::WithPrevious,
        })
    }

    /// Fully specified step.
    pub fn step(mut self, step: StepSpec) -> Self {
        self.steps.push(TimelineEntry::Tween(step));
        self
    }

    /// Media scrub whose end value is bound by the readiness gate.
    pub fn media_scrub(
        mut self,
        media: impl Into<String>,
        duration: f64,
        ease: Ease,
        position: StepPosition,
    ) -> Self {
        self.steps.push(TimelineEntry::MediaScrub(MediaStepSpec {
            media: MediaId::new(media),
            ease,
            duration,
            position,
        }));
        self
    }

    pub fn build(self) -> ScrublineResult<VariantDef> {
        let region = self.region.ok_or_else(|| {
            crate::error::ScrublineError::validation(format!(
                "variant '{}' has no region binding",
                self.name
            ))
        })?;
        let def = VariantDef {
            name: self.name,
            breakpoint: self.breakpoint,
            region,
            initial: self.initial,
            timeline: TimelineSpec { steps: self.steps },
        };
        def.validate()?;
        Ok(def)
    }
}

/// Builder for a section definition.
pub struct SectionBuilder {
    name: String,
    targets: BTreeSet<TargetId>,
    media: BTreeSet<MediaId>,
    pin_target: Option<TargetId>,
    variants: Vec<VariantDef>,
}

impl SectionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: BTreeSet::new(),
            media: BTreeSet::new(),
            pin_target: None,
            variants: Vec::new(),
        }
    }

    /// Register a rendered element handle.
    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.targets.insert(TargetId::new(id));
        self
    }

    /// Register a rendered media handle.
    pub fn media(mut self, id: impl Into<String>) -> Self {
        self.media.insert(MediaId::new(id));
        self
    }

    /// Element that receives the pin translation (registered as a target
    /// automatically).
    pub fn pin(mut self, id: impl Into<String>) -> Self {
        let id = TargetId::new(id);
        self.targets.insert(id.clone());
        self.pin_target = Some(id);
        self
    }

    pub fn variant(mut self, variant: VariantDef) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn build(self) -> ScrublineResult<SectionDef> {
        let def = SectionDef {
            name: self.name,
            targets: self.targets,
            media: self.media,
            pin_target: self.pin_target,
            variants: VariantSet::new(self.variants)?,
        };
        def.validate()?;
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_create_expected_structure() {
        let variant = VariantBuilder::new("desktop", Breakpoint::min(769))
            .region("top top", "+=200%", true, Scrub::Linked(true))
            .unwrap()
            .set("title", Property::Opacity, Value::Scalar(1.0))
            .set("bg", Property::Scale, Value::Scalar(1.25))
            .tween("title", Property::Opacity, Value::Scalar(0.0), Ease::InOutQuad)
            .tween("bg", Property::Scale, Value::Scalar(1.0), Ease::InOutQuad)
            .build()
            .unwrap();
        assert_eq!(variant.timeline.steps.len(), 2);
        assert!(variant.region.pinned);

        let catch_all = VariantBuilder::new("mobile", Breakpoint::max(768))
            .region("top top", "+=100%", true, Scrub::Linked(true))
            .unwrap()
            .set("title", Property::Opacity, Value::Scalar(1.0))
            .tween("title", Property::Opacity, Value::Scalar(0.0), Ease::InOutQuad)
            .build()
            .unwrap();

        let section = SectionBuilder::new("hero")
            .target("title")
            .target("bg")
            .pin("hero-root")
            .variant(variant)
            .variant(catch_all)
            .build()
            .unwrap();
        assert_eq!(section.name, "hero");
        assert!(section.targets.contains(&TargetId::new("hero-root")));
        assert_eq!(section.variants.variants().len(), 2);
    }

    #[test]
    fn variant_without_region_is_rejected() {
        let err = VariantBuilder::new("desktop", Breakpoint::any())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("no region binding"));
    }

    #[test]
    fn non_exhaustive_section_is_rejected() {
        let only_desktop = VariantBuilder::new("desktop", Breakpoint::min(769))
            .region("top top", "+=100%", false, Scrub::Linked(true))
            .unwrap()
            .build()
            .unwrap();
        assert!(
            SectionBuilder::new("hero")
                .variant(only_desktop)
                .build()
                .is_err()
        );
    }
}
