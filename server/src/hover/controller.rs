//! Hover query controller
//!
//! Turns a high-frequency stream of pointer samples into a throttled sequence of pixel
//! lookups and folds their asynchronous outcomes back into a single [`HoverDisplayState`].
//!
//! The controller is a two-state machine:
//!
//! ```text
//! Idle     --move-->  Tracking   (position set, lookup issued)
//! Tracking --move-->  Tracking   (position set, lookup issued if the throttle window elapsed)
//! Tracking --leave--> Idle       (position/result cleared, in-flight generation invalidated)
//! ```
//!
//! Lookups are identified by a generation counter. Only the most recently issued lookup that
//! is still pending can change the display; anything else resolving later is stale.

use metrics::counter;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::types::{HoverDisplayState, LookupError, PixelQuery, PixelResult, PointerSample};

/// Whether the pointer is currently over the map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Idle,
    Tracking,
}

/// What happened to a lookup outcome handed to [`HoverQueryController::on_resolved`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome belonged to the pending lookup and the result was applied
    Applied,
    /// The pending lookup failed; loading cleared, previous result kept
    Failed,
    /// Superseded, already resolved, or the pointer left since it was issued
    Stale,
}

/// Hover state machine for a single map surface
#[derive(Debug)]
pub struct HoverQueryController {
    throttle_interval_ms: u64,
    phase: PointerPhase,
    state: HoverDisplayState,
    /// Generation handed to the next issued lookup
    next_seq: u64,
    /// Generation of the lookup whose outcome may still be applied
    pending_seq: Option<u64>,
    last_issued_at_ms: Option<u64>,
}

impl HoverQueryController {
    pub fn new(throttle_interval: Duration) -> Self {
        Self {
            throttle_interval_ms: throttle_interval.as_millis() as u64,
            phase: PointerPhase::Idle,
            state: HoverDisplayState::default(),
            next_seq: 1,
            pending_seq: None,
            last_issued_at_ms: None,
        }
    }

    /// Current display state
    pub fn state(&self) -> &HoverDisplayState {
        &self.state
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == PointerPhase::Tracking
    }

    /// Generation of the lookup the controller is waiting on, if any
    pub fn pending_seq(&self) -> Option<u64> {
        self.pending_seq
    }

    /// Handle a pointer-move sample
    ///
    /// The screen position is always updated. Returns the lookup to issue when the sample
    /// enters the surface or the throttle window has elapsed since the last issued lookup.
    pub fn on_move(&mut self, sample: PointerSample) -> Option<PixelQuery> {
        self.state.screen_position = Some(sample.screen_position);

        let entering = self.phase == PointerPhase::Idle;
        self.phase = PointerPhase::Tracking;

        let window_elapsed = match self.last_issued_at_ms {
            None => true,
            Some(last) if sample.timestamp_ms < last => {
                // Clock stepped back: restart the window from this sample
                debug!(
                    "Pointer timestamp went back from {} to {} ms, restarting throttle window",
                    last, sample.timestamp_ms
                );
                self.last_issued_at_ms = Some(sample.timestamp_ms);
                false
            }
            Some(last) => sample.timestamp_ms - last >= self.throttle_interval_ms,
        };
        if !entering && !window_elapsed {
            return None;
        }

        let query = PixelQuery {
            seq: self.next_seq,
            lat: sample.geo_position.lat,
            lon: sample.geo_position.lon,
            issued_at_ms: sample.timestamp_ms,
        };
        self.next_seq += 1;
        self.pending_seq = Some(query.seq);
        self.last_issued_at_ms = Some(sample.timestamp_ms);
        self.state.loading = true;

        counter!("landcover_hover_lookups_total").increment(1);
        debug!(
            "Issuing pixel lookup #{} at ({:.5}, {:.5})",
            query.seq, query.lat, query.lon
        );

        Some(query)
    }

    /// Handle the pointer leaving the map surface
    pub fn on_leave(&mut self) {
        if self.phase == PointerPhase::Idle {
            return;
        }
        self.phase = PointerPhase::Idle;
        self.state = HoverDisplayState::default();
        if let Some(seq) = self.pending_seq.take() {
            debug!("Pointer left surface, abandoning lookup #{}", seq);
        }
    }

    /// Apply the outcome of lookup `seq`
    pub fn on_resolved(
        &mut self,
        seq: u64,
        outcome: Result<PixelResult, LookupError>,
    ) -> Resolution {
        if self.pending_seq != Some(seq) {
            counter!("landcover_hover_lookups_stale_total").increment(1);
            trace!(
                "Dropping stale pixel lookup #{} (pending: {:?})",
                seq, self.pending_seq
            );
            return Resolution::Stale;
        }

        self.pending_seq = None;
        self.state.loading = false;

        match outcome {
            Ok(result) => {
                self.state.result = Some(result);
                Resolution::Applied
            }
            Err(e) => {
                counter!("landcover_hover_lookups_failed_total").increment(1);
                warn!("Pixel lookup #{} failed: {}", seq, e);
                Resolution::Failed
            }
        }
    }
}
