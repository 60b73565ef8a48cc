use std::collections::BTreeMap;
use std::sync::Once;

use crate::{
    core::{MediaId, RegionBounds, Viewport},
    error::ScrublineResult,
    section::{SectionController, SectionDef},
    sink::PropertySink,
};

static BOOTSTRAP: Once = Once::new();

/// Process-wide one-time initialization. Safe to call from multiple mount
/// paths; only the first call does anything. `Engine::new` runs it
/// implicitly.
pub fn bootstrap() {
    BOOTSTRAP.call_once(|| {
        tracing::debug!(
            version = env!("CARGO_PKG_VERSION"),
            "scroll timeline runtime initialized"
        );
    });
}

/// Host-side layout measurement, consulted when viewport metrics change.
/// `None` means the section's markers cannot be measured right now; the
/// section keeps its previous bounds and a warning is logged.
pub trait LayoutHost {
    fn measure(&mut self, section: &str) -> Option<RegionBounds>;
}

/// Fixed name-to-bounds table; convenient for tests and static pages.
#[derive(Clone, Debug, Default)]
pub struct StaticLayout {
    bounds: BTreeMap<String, RegionBounds>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: impl Into<String>, bounds: RegionBounds) {
        self.bounds.insert(section.into(), bounds);
    }
}

impl LayoutHost for StaticLayout {
    fn measure(&mut self, section: &str) -> Option<RegionBounds> {
        self.bounds.get(section).copied()
    }
}

/// Stable handle to a mounted section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId(u64);

/// Single-threaded cooperative frame loop. Scroll, resize and media
/// metadata events record inputs; `tick` reconciles every active section
/// into property writes through the sink. Sections are independent: one
/// section failing to bind or rebuild never affects the others, and no
/// ordering is guaranteed (or needed) across sections.
pub struct Engine {
    viewport: Viewport,
    sections: BTreeMap<SectionId, SectionController>,
    next_id: u64,
}

impl Engine {
    pub fn new(viewport: Viewport) -> Self {
        bootstrap();
        Self {
            viewport,
            sections: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Mount a section with its measured bounds. The variant's initial
    /// property values are applied through the sink before any tween runs.
    pub fn mount(
        &mut self,
        def: SectionDef,
        bounds: RegionBounds,
        sink: &mut dyn PropertySink,
    ) -> ScrublineResult<SectionId> {
        let (controller, writes) = SectionController::mount(def, bounds, self.viewport)?;
        let id = SectionId(self.next_id);
        self.next_id += 1;
        tracing::debug!(section = controller.name(), variant = controller.variant_name(), "section mounted");
        self.sections.insert(id, controller);
        for w in &writes {
            sink.apply(w);
        }
        Ok(id)
    }

    /// Unmount a section: pins released, media subscriptions cancelled,
    /// listeners detached, all synchronously. Returns `false` for an
    /// unknown id.
    pub fn unmount(&mut self, id: SectionId, sink: &mut dyn PropertySink) -> bool {
        let Some(mut controller) = self.sections.remove(&id) else {
            return false;
        };
        for w in controller.unmount() {
            sink.apply(&w);
        }
        tracing::debug!(section = controller.name(), "section unmounted");
        true
    }

    /// Record a new scroll offset. State is reconciled on the next `tick`.
    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.viewport = self.viewport.with_scroll(scroll_y);
        for controller in self.sections.values_mut() {
            controller.on_scroll(scroll_y);
        }
    }

    /// Record new viewport metrics: every section re-measures its bounds
    /// and re-evaluates its variant predicate. Variant flips apply their
    /// fresh initial state through the sink immediately; a section whose
    /// rebuild fails is logged and skipped, the rest proceed.
    pub fn on_resize(
        &mut self,
        viewport: Viewport,
        layout: &mut dyn LayoutHost,
        sink: &mut dyn PropertySink,
    ) {
        self.viewport = viewport;
        for controller in self.sections.values_mut() {
            let Some(bounds) = layout.measure(controller.name()) else {
                tracing::warn!(section = controller.name(), "layout measure failed on resize, keeping stale bounds");
                continue;
            };
            match controller.on_resize(bounds, viewport) {
                Ok(writes) => {
                    for w in &writes {
                        sink.apply(w);
                    }
                }
                Err(err) => {
                    tracing::error!(section = controller.name(), error = %err, "section resize failed");
                }
            }
        }
    }

    /// Deliver a media metadata event to every section watching the asset.
    pub fn media_ready(&mut self, media: &MediaId, duration_secs: f64) {
        for controller in self.sections.values_mut() {
            match controller.media_ready(media, duration_secs) {
                Ok(true) => {
                    tracing::debug!(section = controller.name(), media = %media, "media step attached");
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(section = controller.name(), media = %media, error = %err, "media event failed");
                }
            }
        }
    }

    /// Advance one frame: smoothing and clock playback move by `dt`
    /// seconds, then every active section's full property state is written
    /// to the sink.
    #[tracing::instrument(skip_all, fields(sections = self.sections.len()))]
    pub fn tick(&mut self, dt: f64, sink: &mut dyn PropertySink) {
        let scroll_y = self.viewport.scroll_y;
        for controller in self.sections.values_mut() {
            for w in controller.reconcile(scroll_y, dt) {
                sink.apply(&w);
            }
        }
    }
}
