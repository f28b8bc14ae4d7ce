//! Headless replay of scripted viewer actions
//!
//! A script is a YAML list of steps:
//!
//! ```yaml
//! - action: slot
//!   slot: right
//! - action: click
//!   series: 0
//!   point: 1
//! - action: relayout
//!   x: [0.0, 4.0]
//! - action: reset_orientation
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::layout::AxisRange;
use crate::log_rejected;
use crate::selection::{PointRef, SelectionError};
use crate::state::{Action, RelayoutEvent, Transition, ViewerState};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Slot is kept as text so unknown names reach the controller's check
    Slot { slot: String },
    Click { series: usize, point: usize },
    Relayout {
        #[serde(default)]
        x: Option<[f64; 2]>,
        #[serde(default)]
        y: Option<[f64; 2]>,
    },
    ResetOrientation,
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub index: usize,
    pub outcome: Result<Transition, SelectionError>,
}

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_yaml::from_str(content)?)
}

/// Apply every step in order. A rejected step leaves the state untouched
/// and replay continues with the next one.
pub fn run(state: &mut ViewerState, steps: &[Step]) -> Vec<StepResult> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let outcome = apply_step(state, step);
            match &outcome {
                Ok(t) => debug!("step {}: {:?}", index, t),
                Err(e) => {
                    log_rejected!(e, step = index);
                }
            }
            StepResult { index, outcome }
        })
        .collect()
}

fn apply_step(state: &mut ViewerState, step: &Step) -> Result<Transition, SelectionError> {
    let range = |r: &Option<[f64; 2]>| r.map(|[a, b]| AxisRange::new(a, b));
    match step {
        Step::Slot { slot } => state.select_slot_named(slot),
        Step::Click { series, point } => state.apply(Action::PointClicked(PointRef::new(*series, *point))),
        Step::Relayout { x, y } => state.apply(Action::Relayout(RelayoutEvent {
            x_range: range(x),
            y_range: range(y),
        })),
        Step::ResetOrientation => state.apply(Action::ResetOrientation),
    }
}
