use std::collections::BTreeMap;

use crate::{
    core::MediaId,
    error::{ScrublineError, ScrublineResult},
};

#[derive(Clone, Copy, Debug, PartialEq)]
enum GateState {
    Pending,
    Ready(f64),
}

/// One-shot metadata subscriptions for the media assets a section renders.
///
/// Steps that depend on a media duration stay queued in the timeline until
/// the gate fires for that asset; the subscription is explicitly cancelled
/// on teardown so a remount starts from a clean slate instead of leaking
/// the callback.
#[derive(Clone, Debug, Default)]
pub struct MediaGate {
    watched: BTreeMap<MediaId, GateState>,
}

impl MediaGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an asset's metadata event. Idempotent; re-registering
    /// a ready asset keeps its duration.
    pub fn register(&mut self, media: MediaId) {
        self.watched.entry(media).or_insert(GateState::Pending);
    }

    /// Deliver the metadata event. Returns the duration the first time a
    /// watched, pending asset reports; repeated or unwatched events return
    /// `None`.
    pub fn fire(&mut self, media: &MediaId, duration_secs: f64) -> ScrublineResult<Option<f64>> {
        if !(duration_secs.is_finite() && duration_secs >= 0.0) {
            return Err(ScrublineError::evaluation(format!(
                "media '{media}' reported invalid duration {duration_secs}"
            )));
        }
        match self.watched.get_mut(media) {
            Some(state @ GateState::Pending) => {
                *state = GateState::Ready(duration_secs);
                Ok(Some(duration_secs))
            }
            Some(GateState::Ready(_)) => Ok(None),
            None => Ok(None),
        }
    }

    pub fn duration(&self, media: &MediaId) -> Option<f64> {
        match self.watched.get(media) {
            Some(GateState::Ready(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn is_pending(&self, media: &MediaId) -> bool {
        matches!(self.watched.get(media), Some(GateState::Pending))
    }

    /// Cancel every subscription synchronously. Assets that never reported
    /// metadata are surfaced as warnings so the degradation is diagnosable
    /// rather than silent.
    pub fn cancel_all(&mut self) {
        for (media, state) in &self.watched {
            if *state == GateState::Pending {
                tracing::warn!(media = %media, "media metadata never arrived, dependent steps stayed inert");
            }
        }
        self.watched.clear();
    }
}
