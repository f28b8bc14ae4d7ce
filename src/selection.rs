//! Image slots and the marker edits that follow a point selection
//!
//! Each slot (left/right) owns at most one point, and a point belongs to at
//! most one slot. The selected point of a slot is the only point whose
//! highlight differs from its base color.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::marker::{HexColor, Markers};

/// Outline color of the point shown in the left panel
pub const LEFT_HIGHLIGHT: HexColor = HexColor::rgb(0x14, 0x96, 0xBB);
/// Outline color of the point shown in the right panel
pub const RIGHT_HIGHLIGHT: HexColor = HexColor::rgb(0x00, 0x00, 0x00);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("Could not select a point: unknown image slot '{0}'")]
    UnknownSlot(String),
    #[error("Could not select a point: series {0} does not exist")]
    SeriesOutOfRange(usize),
    #[error("Could not select a point: series {series} has no point {point}")]
    PointOutOfRange { series: usize, point: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Left,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];

    pub fn highlight_color(self) -> HexColor {
        match self {
            Slot::Left => LEFT_HIGHLIGHT,
            Slot::Right => RIGHT_HIGHLIGHT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Slot::Left),
            "right" => Ok(Slot::Right),
            other => Err(SelectionError::UnknownSlot(other.to_string())),
        }
    }
}

/// Address of a point: series (curve) index and point index within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRef {
    pub series: usize,
    pub point: usize,
}

impl PointRef {
    pub fn new(series: usize, point: usize) -> Self {
        Self { series, point }
    }
}

impl fmt::Display for PointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.series, self.point)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub selection: Option<PointRef>,
    pub image_url: String,
}

/// Both slots plus the one that the next click will fill
#[derive(Debug, Clone, PartialEq)]
pub struct Slots {
    left: SlotState,
    right: SlotState,
    active: Slot,
}

impl Slots {
    pub fn new(placeholder_url: &str) -> Self {
        let empty = SlotState {
            selection: None,
            image_url: placeholder_url.to_string(),
        };
        Self {
            left: empty.clone(),
            right: empty,
            active: Slot::default(),
        }
    }

    pub fn active(&self) -> Slot {
        self.active
    }

    pub(crate) fn set_active(&mut self, slot: Slot) {
        self.active = slot;
    }

    pub fn get(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }

    fn get_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        }
    }

    /// Slot currently showing `point`, if any
    pub fn owner_of(&self, point: PointRef) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|&slot| self.get(slot).selection == Some(point))
    }

    /// Un-highlight the point held by `slot`. The slot keeps its image until
    /// a new selection replaces it.
    pub(crate) fn clear_previous(&mut self, slot: Slot, markers: &mut Markers) {
        if let Some(prev) = self.get(slot).selection {
            if let Some(style) = markers.get_mut(prev.series) {
                style.restore(prev.point);
            }
        }
    }

    /// Record `point` as the selection of `slot` and highlight it
    pub(crate) fn set_selected(&mut self, slot: Slot, point: PointRef, markers: &mut Markers) {
        self.get_mut(slot).selection = Some(point);
        if let Some(style) = markers.get_mut(point.series) {
            style.highlight(point.point, slot.highlight_color());
        }
    }

    pub(crate) fn set_image_url(&mut self, slot: Slot, url: String) {
        self.get_mut(slot).image_url = url;
    }
}

/// `<static_base>/img/<file>`
pub fn resolve_image_url(static_base: &str, image_file: &str) -> String {
    format!("{}/img/{}", static_base.trim_end_matches('/'), image_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::Dataset;

    #[test]
    fn test_slot_parsing() {
        assert_eq!("left".parse::<Slot>(), Ok(Slot::Left));
        assert_eq!("right".parse::<Slot>(), Ok(Slot::Right));
        assert_eq!(
            "middle".parse::<Slot>(),
            Err(SelectionError::UnknownSlot("middle".to_string()))
        );
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(resolve_image_url("public", "234.png"), "public/img/234.png");
        assert_eq!(resolve_image_url("/static/", "a.png"), "/static/img/a.png");
        assert_eq!(resolve_image_url("", "a.png"), "/img/a.png");
    }

    #[test]
    fn test_owner_of_tracks_both_slots() {
        let dataset = Dataset::builtin(&Config::default());
        let mut markers = Markers::from_dataset(&dataset);
        let mut slots = Slots::new("placeholder");

        slots.set_selected(Slot::Left, PointRef::new(0, 1), &mut markers);
        slots.set_selected(Slot::Right, PointRef::new(2, 0), &mut markers);

        assert_eq!(slots.owner_of(PointRef::new(0, 1)), Some(Slot::Left));
        assert_eq!(slots.owner_of(PointRef::new(2, 0)), Some(Slot::Right));
        assert_eq!(slots.owner_of(PointRef::new(1, 1)), None);
        assert_eq!(markers.highlighted_count(), 2);
    }

    #[test]
    fn test_clear_previous_restores_marker() {
        let dataset = Dataset::builtin(&Config::default());
        let mut markers = Markers::from_dataset(&dataset);
        let mut slots = Slots::new("placeholder");

        slots.set_selected(Slot::Right, PointRef::new(1, 3), &mut markers);
        assert_eq!(markers.get(1).unwrap().highlight_color(3), Some(RIGHT_HIGHLIGHT));

        slots.clear_previous(Slot::Right, &mut markers);
        let style = markers.get(1).unwrap();
        assert_eq!(style.highlight_color(3), style.base_color(3));
        assert_eq!(markers.highlighted_count(), 0);
    }
}
