use scrubline::{
    Breakpoint, Ease, Engine, Property, RecordingSink, RegionBounds, Scrub, Value, Viewport,
    dsl::{SectionBuilder, VariantBuilder},
    section::SectionDef,
};

fn hero_def() -> SectionDef {
    SectionBuilder::new("hero")
        .pin("hero-root")
        .target("title")
        .target("bg")
        .variant(
            VariantBuilder::new("all", Breakpoint::any())
                .region("top top", "+=200%", true, Scrub::Linked(true))
                .unwrap()
                .set("title", Property::Opacity, Value::Scalar(1.0))
                .set("bg", Property::Scale, Value::Scalar(1.25))
                .set("bg", Property::Width, Value::Percent(80.0))
                .tween("title", Property::Opacity, Value::Scalar(0.0), Ease::InOutQuad)
                .tween("bg", Property::Scale, Value::Scalar(1.0), Ease::InOutQuad)
                .tween_with_previous("bg", Property::Width, Value::Percent(100.0), Ease::InOutQuad)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn state_at(engine: &mut Engine, scroll: f64) -> Vec<scrubline::PropertyWrite> {
    let mut sink = RecordingSink::new();
    engine.on_scroll(scroll);
    engine.tick(0.016, &mut sink);
    sink.take()
}

#[test]
fn replaying_a_progress_value_yields_identical_state() {
    let mut engine = Engine::new(Viewport::new(0.0, 1280.0, 800.0).unwrap());
    let mut sink = RecordingSink::new();
    engine
        .mount(hero_def(), RegionBounds::new(0.0, 800.0).unwrap(), &mut sink)
        .unwrap();

    // 0 -> p -> 0 -> p, including a discontinuous jump past the region.
    let at_p_first = state_at(&mut engine, 700.0);
    let _ = state_at(&mut engine, 0.0);
    let _ = state_at(&mut engine, 5000.0);
    let at_p_second = state_at(&mut engine, 700.0);
    assert_eq!(at_p_first, at_p_second);
}

#[test]
fn sequential_fade_then_scale_scenario() {
    let mut engine = Engine::new(Viewport::new(0.0, 1280.0, 800.0).unwrap());
    let mut sink = RecordingSink::new();
    engine
        .mount(hero_def(), RegionBounds::new(0.0, 800.0).unwrap(), &mut sink)
        .unwrap();

    let find = |writes: &[scrubline::PropertyWrite], target: &str, property: Property| {
        writes
            .iter()
            .find(|w| w.target.to_string() == target && w.property == property)
            .map(|w| w.value)
            .unwrap()
    };

    // Progress 0: everything at its initial value.
    let start = state_at(&mut engine, 0.0);
    assert_eq!(find(&start, "title", Property::Opacity), Value::Scalar(1.0));
    assert_eq!(find(&start, "bg", Property::Scale), Value::Scalar(1.25));
    assert_eq!(find(&start, "bg", Property::Width), Value::Percent(80.0));

    // Midpoint of the fade step (progress 0.25 of a two-unit axis): opacity
    // mid-ease, scale untouched. The trigger range is 2 viewport heights.
    let mid_fade = state_at(&mut engine, 400.0);
    assert_eq!(
        find(&mid_fade, "title", Property::Opacity),
        Value::Scalar(1.0 - Ease::InOutQuad.apply(0.5))
    );
    assert_eq!(find(&mid_fade, "bg", Property::Scale), Value::Scalar(1.25));

    // Step boundary (progress 0.5): fade complete, scale still untouched.
    let boundary = state_at(&mut engine, 800.0);
    assert_eq!(find(&boundary, "title", Property::Opacity), Value::Scalar(0.0));
    assert_eq!(find(&boundary, "bg", Property::Scale), Value::Scalar(1.25));

    // Progress 1: fade done, scale and width at their end values.
    let done = state_at(&mut engine, 1600.0);
    assert_eq!(find(&done, "title", Property::Opacity), Value::Scalar(0.0));
    assert_eq!(find(&done, "bg", Property::Scale), Value::Scalar(1.0));
    assert_eq!(find(&done, "bg", Property::Width), Value::Percent(100.0));
}

#[test]
fn simultaneous_steps_share_their_start() {
    let mut engine = Engine::new(Viewport::new(0.0, 1280.0, 800.0).unwrap());
    let mut sink = RecordingSink::new();
    engine
        .mount(hero_def(), RegionBounds::new(0.0, 800.0).unwrap(), &mut sink)
        .unwrap();

    // Scale and width are declared simultaneous: at every probed progress
    // they sit at the same eased fraction of their respective spans.
    for scroll in [800.0, 1000.0, 1200.0, 1400.0, 1600.0] {
        let writes = state_at(&mut engine, scroll);
        let scale = writes
            .iter()
            .find(|w| w.target.to_string() == "bg" && w.property == Property::Scale)
            .unwrap();
        let width = writes
            .iter()
            .find(|w| w.target.to_string() == "bg" && w.property == Property::Width)
            .unwrap();
        let Value::Scalar(s) = scale.value else {
            panic!("expected scalar scale")
        };
        let Value::Percent(w) = width.value else {
            panic!("expected percent width")
        };
        let scale_frac = (1.25 - s) / 0.25;
        let width_frac = (w - 80.0) / 20.0;
        assert!((scale_frac - width_frac).abs() < 1e-12, "at scroll {scroll}");
    }
}
