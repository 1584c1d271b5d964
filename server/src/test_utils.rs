//! Test Utilities Module
//!
//! Fixtures and a scriptable pixel lookup shared by the unit tests.
//! This module is only compiled when running tests.

#![cfg(test)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot, watch};

use crate::hover::service::PixelLookup;
use crate::hover::types::{
    GeoPoint, HoverDisplayState, LookupError, PeriodClass, PixelResult, PointerSample,
    ScreenPoint,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Pointer sample at a screen position; the geo position is derived from it
pub fn sample_at(x: f64, y: f64, timestamp_ms: u64) -> PointerSample {
    PointerSample::new(
        ScreenPoint { x, y },
        GeoPoint {
            lat: 13.6 + y * 1e-4,
            lon: 79.4 + x * 1e-4,
        },
        timestamp_ms,
    )
}

/// A pixel that was forest in 2018 and built-up in 2023
pub fn forest_to_built_up() -> PixelResult {
    PixelResult::new(
        PeriodClass::classified(1, "Forest", 0.92),
        PeriodClass::classified(5, "Built-up", 0.81),
    )
}

/// Wait until the display state satisfies `pred`, panicking after two seconds
pub async fn wait_for_state(
    rx: &mut watch::Receiver<HoverDisplayState>,
    pred: impl FnMut(&HoverDisplayState) -> bool,
) -> HoverDisplayState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("Timed out waiting for display state")
        .expect("Hover session dropped its display channel")
        .clone()
}

// ============================================================================
// Scripted Pixel Lookup
// ============================================================================

type Reply = Result<PixelResult, LookupError>;

/// `PixelLookup` whose calls block until the test releases them
///
/// Calls are numbered from 1 in the order they reach the lookup.
#[derive(Default)]
pub struct ScriptedLookup {
    calls: AtomicU64,
    waiters: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls that reached the lookup
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` calls were made
    pub async fn wait_for_calls(&self, n: u64) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Timed out waiting for pixel lookups");
    }

    /// Resolve call `n`, waiting for it to be made first
    ///
    /// Releasing a call whose caller was cancelled is a no-op.
    pub async fn release(&self, n: u64, reply: Reply) {
        self.wait_for_calls(n).await;
        let waiter = self.waiters.lock().await.remove(&n);
        if let Some(tx) = waiter {
            let _ = tx.send(reply);
        }
    }
}

#[async_trait]
impl PixelLookup for ScriptedLookup {
    async fn query_pixel(&self, _lat: f64, _lon: f64) -> Result<PixelResult, LookupError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.waiters.lock().await;
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            waiters.insert(n, tx);
        }
        rx.await
            .unwrap_or_else(|_| Err(LookupError::Transport("script dropped".into())))
    }
}
