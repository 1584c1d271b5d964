//! Render-side view of the hover state
//!
//! The controller keeps whatever the pixel service returned. Whether that is worth drawing is
//! decided here: a result whose class name is a sentinel for either period renders exactly
//! like no result, so the tooltip does not flash while the cursor is outside the AOI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::{HoverDisplayState, Period, PixelResult, ScreenPoint};
use crate::config::DEFAULT_NO_DATA_LABELS;

/// Sentinel class names meaning "nothing classified here"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoDataLabels(BTreeSet<String>);

impl NoDataLabels {
    pub fn new(labels: BTreeSet<String>) -> Self {
        Self(labels)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.0.contains(class_name)
    }
}

impl Default for NoDataLabels {
    fn default() -> Self {
        Self(
            DEFAULT_NO_DATA_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl PixelResult {
    /// True when both periods carry a real class name
    ///
    /// A missing class name (e.g. the service reported a sampling error) counts as a sentinel.
    pub fn is_displayable(&self, labels: &NoDataLabels) -> bool {
        Period::ALL.iter().all(|&period| {
            self.period(period)
                .class_name
                .as_deref()
                .is_some_and(|name| !labels.contains(name))
        })
    }

    /// True when the two periods were assigned different classes
    pub fn change_detected(&self) -> bool {
        self.period_2018.class_id != self.period_2023.class_id
    }
}

/// What the tooltip renders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoverView {
    pub screen_position: Option<ScreenPoint>,
    pub loading: bool,
    /// Present only for displayable results
    pub result: Option<PixelResult>,
    pub change_detected: bool,
}

impl HoverView {
    pub fn from_state(state: &HoverDisplayState, labels: &NoDataLabels) -> Self {
        let result = state
            .result
            .as_ref()
            .filter(|r| r.is_displayable(labels))
            .cloned();
        let change_detected = result.as_ref().is_some_and(PixelResult::change_detected);

        Self {
            screen_position: state.screen_position,
            loading: state.loading,
            result,
            change_detected,
        }
    }

    /// Whether a tooltip should be drawn at all
    pub fn is_visible(&self) -> bool {
        self.screen_position.is_some() && self.result.is_some()
    }
}
