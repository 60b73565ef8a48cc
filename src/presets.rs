//! Higher-level section presets layered over the core builders: the three
//! scroll choreographies that cover a typical full-viewport landing page
//! (masked hero reveal, pinned video scrub, parallax content panel).

use crate::{
    core::Vec2,
    dsl::{SectionBuilder, VariantBuilder},
    ease::Ease,
    error::ScrublineResult,
    region::Scrub,
    section::SectionDef,
    tween::{Property, StepPosition, Value},
    variant::Breakpoint,
};

/// Widest viewport still treated as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// Mask geometry for the hero reveal, in percent units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaskSettings {
    pub position: Vec2,
    pub size_pct: f64,
}

/// Hero choreography options. The mask starts tight around the title art
/// (different geometry per viewport class, the visual scale differs) and
/// opens to `reveal` as the region scrubs.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaskedHeroOpts {
    pub desktop_mask: MaskSettings,
    pub mobile_mask: MaskSettings,
    pub reveal: MaskSettings,
}

impl Default for MaskedHeroOpts {
    fn default() -> Self {
        Self {
            desktop_mask: MaskSettings {
                position: Vec2::new(50.0, 15.0),
                size_pct: 33.0,
            },
            mobile_mask: MaskSettings {
                position: Vec2::new(50.0, 25.0),
                size_pct: 50.0,
            },
            reveal: MaskSettings {
                position: Vec2::new(50.0, 50.0),
                size_pct: 4000.0,
            },
        }
    }
}

/// Pinned hero: title art fades out, the background scales to full width,
/// then the mask opens over the reveal logo. Region scrubs over two
/// viewport heights.
pub fn masked_hero(name: &str, opts: &MaskedHeroOpts) -> ScrublineResult<SectionDef> {
    let variant = |variant_name: &str, breakpoint: Breakpoint, mask: MaskSettings| {
        VariantBuilder::new(variant_name, breakpoint)
            .region("top top", "+=200%", true, Scrub::Linked(true))?
            .set("mask-wrapper", Property::MaskPosition, Value::Point(mask.position))
            .set("mask-wrapper", Property::MaskSize, Value::Percent(mask.size_pct))
            .set("mask-logo", Property::MarginTop, Value::Vh(-100.0))
            .set("mask-logo", Property::Opacity, Value::Scalar(0.0))
            .set("entrance-message", Property::MarginTop, Value::Vh(0.0))
            .set("hero-text", Property::Opacity, Value::Scalar(1.0))
            .set("hero-bg", Property::Scale, Value::Scalar(1.25))
            .set("hero-bg", Property::Width, Value::Percent(80.0))
            .tween("hero-text", Property::Opacity, Value::Scalar(0.0), Ease::InOutCubic)
            .tween("hero-bg", Property::Scale, Value::Scalar(1.0), Ease::InOutCubic)
            .tween_with_previous("hero-bg", Property::Width, Value::Percent(100.0), Ease::InOutCubic)
            .tween(
                "mask-wrapper",
                Property::MaskPosition,
                Value::Point(opts.reveal.position),
                Ease::InOutQuad,
            )
            .tween_with_previous(
                "mask-wrapper",
                Property::MaskSize,
                Value::Percent(opts.reveal.size_pct),
                Ease::InOutQuad,
            )
            .tween_with_previous("mask-logo", Property::Opacity, Value::Scalar(1.0), Ease::InOutQuad)
            .build()
    };

    SectionBuilder::new(name)
        .pin("mask-wrapper")
        .target("mask-logo")
        .target("entrance-message")
        .target("hero-text")
        .target("hero-bg")
        .variant(variant(
            "desktop",
            Breakpoint::min(MOBILE_MAX_WIDTH + 1),
            opts.desktop_mask,
        )?)
        .variant(variant("mobile", Breakpoint::max(MOBILE_MAX_WIDTH), opts.mobile_mask)?)
        .build()
}

/// Pinned video reveal: the wrapper fades in while the media scrubs from
/// start to end. Desktop gets the longer scroll range and a heavier media
/// weight; mobile is tightened to its shorter scroll distance.
pub fn video_reveal(name: &str, wrapper: &str, media: &str) -> ScrublineResult<SectionDef> {
    let variant = |variant_name: &str,
                   breakpoint: Breakpoint,
                   end: &str,
                   margin_vh: f64,
                   media_weight: f64| {
        VariantBuilder::new(variant_name, breakpoint)
            .region("top top", end, true, Scrub::Linked(true))?
            .set(wrapper, Property::Opacity, Value::Scalar(0.0))
            .set(wrapper, Property::MarginTop, Value::Vh(margin_vh))
            .tween(wrapper, Property::Opacity, Value::Scalar(1.0), Ease::InOutQuad)
            .media_scrub(media, media_weight, Ease::InOutQuad, StepPosition::WithPrevious)
            .build()
    };

    SectionBuilder::new(name)
        .pin(wrapper)
        .media(media)
        .variant(variant(
            "desktop",
            Breakpoint::min(MOBILE_MAX_WIDTH + 1),
            "+=150%",
            -100.0,
            3.0,
        )?)
        .variant(variant(
            "mobile",
            Breakpoint::max(MOBILE_MAX_WIDTH),
            "+=110%",
            -40.0,
            2.0,
        )?)
        .build()
}

/// Unpinned content panel entered over the previous section: the previous
/// media layer fades out while image boxes drift upward, with smoothed
/// scrubbing so fast scrolling settles gently.
pub fn parallax_panel(
    name: &str,
    fade_target: &str,
    shift_targets: &[&str],
) -> ScrublineResult<SectionDef> {
    let mut variant = VariantBuilder::new("all", Breakpoint::any())
        .region("top 80%", "5% center", false, Scrub::Smooth(2.0))?
        .set(fade_target, Property::Opacity, Value::Scalar(1.0))
        .tween(fade_target, Property::Opacity, Value::Scalar(0.0), Ease::InOutQuad);
    for target in shift_targets {
        variant = variant
            .set(*target, Property::Y, Value::Px(0.0))
            .tween_with_previous(*target, Property::Y, Value::Px(-200.0), Ease::InOutQuad);
    }

    let mut section = SectionBuilder::new(name).target(fade_target);
    for target in shift_targets {
        section = section.target(*target);
    }
    section.variant(variant.build()?).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{MediaId, RegionBounds, TargetId, Viewport},
        section::SectionController,
        tween::WriteTarget,
    };

    fn viewport(scroll: f64, width: f64) -> Viewport {
        Viewport::new(scroll, width, 800.0).unwrap()
    }

    #[test]
    fn masked_hero_scrubs_fade_then_scale_then_mask() {
        let def = masked_hero("hero", &MaskedHeroOpts::default()).unwrap();
        let (mut hero, initial) =
            SectionController::mount(def, RegionBounds::new(0.0, 800.0).unwrap(), viewport(0.0, 1280.0))
                .unwrap();
        assert!(initial.iter().any(|w| w.property == Property::MaskSize
            && w.value == Value::Percent(33.0)));

        // Region is 0..1600px of scroll over a three-unit axis: fade, then
        // scale (width alongside), then the mask reveal.
        hero.on_scroll(800.0);
        let writes = hero.reconcile(800.0, 0.016);
        let text = WriteTarget::Element(TargetId::new("hero-text"));
        let fade = writes
            .iter()
            .find(|w| w.target == text && w.property == Property::Opacity)
            .unwrap();
        assert_eq!(fade.value, Value::Scalar(0.0));
        let bg = WriteTarget::Element(TargetId::new("hero-bg"));
        let scale = writes
            .iter()
            .find(|w| w.target == bg && w.property == Property::Scale)
            .unwrap();
        assert_eq!(
            scale.value,
            Value::Scalar(1.25 + (1.0 - 1.25) * Ease::InOutCubic.apply(0.5))
        );
        let mask = WriteTarget::Element(TargetId::new("mask-wrapper"));
        let size_mid = writes
            .iter()
            .find(|w| w.target == mask && w.property == Property::MaskSize)
            .unwrap();
        assert_eq!(size_mid.value, Value::Percent(33.0));

        hero.on_scroll(1600.0);
        let done = hero.reconcile(1600.0, 0.016);
        let mask = WriteTarget::Element(TargetId::new("mask-wrapper"));
        let size = done
            .iter()
            .find(|w| w.target == mask && w.property == Property::MaskSize)
            .unwrap();
        assert_eq!(size.value, Value::Percent(4000.0));
    }

    #[test]
    fn video_reveal_variants_carry_distinct_weights() {
        let def = video_reveal("second-video", "video-wrap", "video").unwrap();
        let bounds = RegionBounds::new(0.0, 800.0).unwrap();

        let (mut desktop, init_d) =
            SectionController::mount(def.clone(), bounds, viewport(0.0, 1280.0)).unwrap();
        assert_eq!(desktop.variant_name(), "desktop");
        assert!(init_d.iter().any(|w| w.value == Value::Vh(-100.0)));

        let (mobile, init_m) =
            SectionController::mount(def, bounds, viewport(0.0, 400.0)).unwrap();
        assert_eq!(mobile.variant_name(), "mobile");
        assert!(init_m.iter().any(|w| w.value == Value::Vh(-40.0)));

        // Media attaches with its desktop weight of 3: once ready, the
        // opacity fade shares the start and the scrub spans the full axis.
        let media = MediaId::new("video");
        assert!(desktop.media_ready(&media, 12.0).unwrap());
        desktop.on_scroll(600.0); // +=150% of 800px => halfway
        let writes = desktop.reconcile(600.0, 0.016);
        let time = writes
            .iter()
            .find(|w| w.target == WriteTarget::Media(media.clone()))
            .unwrap();
        assert_eq!(
            time.value,
            Value::Secs(12.0 * Ease::InOutQuad.apply(0.5))
        );
    }

    #[test]
    fn parallax_panel_smooths_and_shifts() {
        let def = parallax_panel("bio", "first-video", &["img-1", "img-2"]).unwrap();
        let (mut panel, initial) = SectionController::mount(
            def,
            RegionBounds::new(4000.0, 1600.0).unwrap(),
            viewport(0.0, 1280.0),
        )
        .unwrap();
        assert!(initial.iter().any(|w| w.property == Property::Y
            && w.value == Value::Px(0.0)));

        // A jump lands short of raw progress on the first frame: smoothing.
        panel.on_scroll(4200.0);
        let writes = panel.reconcile(4200.0, 0.016);
        let fade = writes
            .iter()
            .find(|w| w.property == Property::Opacity)
            .unwrap();
        let Value::Scalar(v) = fade.value else {
            panic!("expected scalar opacity");
        };
        assert!(v > 0.99, "first smoothed frame barely moves, got {v}");
    }
}
