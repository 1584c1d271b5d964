//! Event loop driving a [`HoverQueryController`]
//!
//! One task owns the controller. Pointer events and lookup outcomes are both delivered to it
//! over channels, so every state transition happens on that task in arrival order and the
//! controller itself needs no locking. The derived display state is published on a `watch`
//! channel for whoever renders it.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::controller::{HoverQueryController, Resolution};
use super::service::PixelLookup;
use super::types::{HoverDisplayState, LookupError, PixelQuery, PixelResult, PointerSample};
use crate::config::HoverConfig;

/// Input to a hover session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverEvent {
    Move(PointerSample),
    Leave,
}

type LookupOutcome = (u64, Result<PixelResult, LookupError>);

/// Handle to a running hover session
///
/// Dropping the handle closes the event channel, which stops the session task and aborts
/// any lookup still in flight.
pub struct HoverSession {
    events: mpsc::Sender<HoverEvent>,
    display: watch::Receiver<HoverDisplayState>,
    task: JoinHandle<()>,
}

impl HoverSession {
    /// Spawn a session on the current tokio runtime
    pub fn spawn(lookup: Arc<dyn PixelLookup>, config: &HoverConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        let (display_tx, display_rx) = watch::channel(HoverDisplayState::default());
        let controller = HoverQueryController::new(config.throttle_interval);

        let task = tokio::spawn(run(controller, lookup, events_rx, display_tx));

        Self {
            events: events_tx,
            display: display_rx,
            task,
        }
    }

    /// Queue a pointer event; returns false once the session has stopped
    pub async fn send(&self, event: HoverEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Latest published display state
    pub fn current(&self) -> HoverDisplayState {
        self.display.borrow().clone()
    }

    /// Receiver that observes every published display state
    pub fn subscribe(&self) -> watch::Receiver<HoverDisplayState> {
        self.display.clone()
    }

    /// Stop the session and wait for its task to finish
    pub async fn shutdown(self) {
        let Self { events, task, .. } = self;
        drop(events);
        let _ = task.await;
    }
}

async fn run(
    mut controller: HoverQueryController,
    lookup: Arc<dyn PixelLookup>,
    mut events: mpsc::Receiver<HoverEvent>,
    display: watch::Sender<HoverDisplayState>,
) {
    let (outcome_tx, mut outcomes) = mpsc::channel::<LookupOutcome>(16);
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(HoverEvent::Move(sample)) => {
                    if let Some(query) = controller.on_move(sample) {
                        if let Some(previous) = in_flight.take() {
                            previous.abort();
                        }
                        in_flight = Some(spawn_lookup(query, lookup.clone(), outcome_tx.clone()));
                    }
                }
                Some(HoverEvent::Leave) => {
                    controller.on_leave();
                    if let Some(previous) = in_flight.take() {
                        previous.abort();
                    }
                }
                None => break,
            },
            Some((seq, outcome)) = outcomes.recv() => {
                if controller.on_resolved(seq, outcome) != Resolution::Stale {
                    in_flight = None;
                }
            }
        }

        display.send_if_modified(|current| {
            if current != controller.state() {
                *current = controller.state().clone();
                true
            } else {
                false
            }
        });
    }

    if let Some(previous) = in_flight.take() {
        previous.abort();
    }
    debug!("Hover session stopped");
}

fn spawn_lookup(
    query: PixelQuery,
    lookup: Arc<dyn PixelLookup>,
    outcomes: mpsc::Sender<LookupOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = lookup.query_pixel(query.lat, query.lon).await;
        if outcomes.send((query.seq, outcome)).await.is_err() {
            trace!("Session gone before lookup #{} resolved", query.seq);
        }
    })
}
