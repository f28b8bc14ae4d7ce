//! Viewer State - Single Source of Truth (SSOT)
//!
//! Owns the dataset, the marker styles both plots read, the two image slots
//! and both layouts. Every change goes through [`ViewerState::apply`], which
//! validates the action before touching anything.

use tracing::{debug, info};

use crate::config::Config;
use crate::dataset::{Dataset, Series};
use crate::layout::{build_2d_layout, build_3d_layout, AxisRange, Camera, Layout2D, Layout3D, PlotConfig};
use crate::marker::{MarkerStyle, Markers};
use crate::selection::{resolve_image_url, PointRef, SelectionError, Slot, SlotState, Slots};

/// Axis change reported by the 2D plot. A missing axis means "unchanged",
/// as on the initial draw or a double-click reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelayoutEvent {
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
}

impl RelayoutEvent {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn ranges(x: AxisRange, y: AxisRange) -> Self {
        Self {
            x_range: Some(x),
            y_range: Some(y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PointClicked(PointRef),
    SelectSlot(Slot),
    Relayout(RelayoutEvent),
    /// Put the 3D camera back to its default orientation
    ResetOrientation,
}

/// What an applied action changed
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Clicked point is already shown by `owner`; nothing changed
    AlreadySelected { owner: Slot },
    Selected {
        slot: Slot,
        point: PointRef,
        image_url: String,
    },
    ActiveSlot(Slot),
    /// 3D layout re-derived from the 2D ranges with the default camera
    SceneSynced { revision: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Scatter2D,
    Scatter3D,
}

/// One series as a plot sees it. The marker style is borrowed from the
/// state, so the 2D and 3D traces of a series read the same styling.
#[derive(Debug, Clone, Copy)]
pub struct Trace<'a> {
    pub kind: PlotKind,
    pub index: usize,
    pub series: &'a Series,
    pub marker: &'a MarkerStyle,
}

pub struct ViewerState {
    dataset: Dataset,
    markers: Markers,
    slots: Slots,
    layout_2d: Layout2D,
    layout_3d: Layout3D,
    plot_config: PlotConfig,
    static_base: String,
}

impl ViewerState {
    pub fn new(dataset: Dataset, config: &Config) -> Self {
        let markers = Markers::from_dataset(&dataset);
        info!(
            "Viewer state ready: {} series, {} points",
            dataset.series().len(),
            dataset.total_points()
        );

        Self {
            markers,
            dataset,
            slots: Slots::new(&config.placeholder_url),
            layout_2d: build_2d_layout(None, None, 0),
            layout_3d: build_3d_layout(None, None, 0, None),
            plot_config: PlotConfig::default(),
            static_base: config.static_base.clone(),
        }
    }

    /// Apply one user action. On error nothing has been modified.
    pub fn apply(&mut self, action: Action) -> Result<Transition, SelectionError> {
        match action {
            Action::PointClicked(point) => self.click(point),
            Action::SelectSlot(slot) => {
                debug!("Active slot -> {}", slot);
                self.slots.set_active(slot);
                Ok(Transition::ActiveSlot(slot))
            }
            Action::Relayout(event) => Ok(self.relayout(event)),
            Action::ResetOrientation => {
                debug!("Resetting 3D orientation");
                Ok(self.relayout(RelayoutEvent::initial()))
            }
        }
    }

    /// Select the active slot by name ("left" / "right")
    pub fn select_slot_named(&mut self, name: &str) -> Result<Transition, SelectionError> {
        let slot = name.parse::<Slot>()?;
        self.apply(Action::SelectSlot(slot))
    }

    fn click(&mut self, point: PointRef) -> Result<Transition, SelectionError> {
        let image_file = self.validate(point)?.image_file.clone();

        if let Some(owner) = self.slots.owner_of(point) {
            debug!("Point {} already shown in {} slot, ignoring", point, owner);
            return Ok(Transition::AlreadySelected { owner });
        }

        let slot = self.slots.active();
        self.slots.clear_previous(slot, &mut self.markers);
        self.slots.set_selected(slot, point, &mut self.markers);

        let image_url = resolve_image_url(&self.static_base, &image_file);
        self.slots.set_image_url(slot, image_url.clone());

        // Keep the current axes and camera, force both plots to redraw
        let camera = self.layout_3d.scene.camera;
        self.layout_2d = build_2d_layout(
            self.layout_2d.x_axis.range,
            self.layout_2d.y_axis.range,
            self.layout_2d.revision + 1,
        );
        self.layout_3d = self.layout_2d.mirror_3d(self.layout_3d.revision + 1, Some(camera));

        info!("Point {} -> {} slot ({})", point, slot, image_url);
        Ok(Transition::Selected { slot, point, image_url })
    }

    fn validate(&self, point: PointRef) -> Result<&crate::dataset::Point, SelectionError> {
        let series = self
            .dataset
            .series()
            .get(point.series)
            .ok_or(SelectionError::SeriesOutOfRange(point.series))?;
        series.points.get(point.point).ok_or(SelectionError::PointOutOfRange {
            series: point.series,
            point: point.point,
        })
    }

    fn relayout(&mut self, event: RelayoutEvent) -> Transition {
        let x = event.x_range.or(self.layout_2d.x_axis.range);
        let y = event.y_range.or(self.layout_2d.y_axis.range);

        if event.x_range.is_some() || event.y_range.is_some() {
            // The 2D plot already shows these bounds; record them without a redraw
            self.layout_2d = build_2d_layout(x, y, self.layout_2d.revision);
        }

        let revision = self.layout_3d.revision + 1;
        self.layout_3d = build_3d_layout(x.map(AxisRange::reversed), y, revision, None);
        debug!("3D scene synced to 2D axes: x={:?} y={:?} rev={}", x, y, revision);
        Transition::SceneSynced { revision }
    }

    /// Camera moved by direct manipulation of the 3D plot. The renderer
    /// already shows it, so no revision bump.
    pub fn set_camera(&mut self, camera: Camera) {
        self.layout_3d.scene.camera = camera;
    }

    pub fn traces(&self, kind: PlotKind) -> Vec<Trace<'_>> {
        self.dataset
            .series()
            .iter()
            .zip(self.markers.iter())
            .enumerate()
            .map(|(index, (series, marker))| Trace {
                kind,
                index,
                series,
                marker,
            })
            .collect()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn slot(&self, slot: Slot) -> &SlotState {
        self.slots.get(slot)
    }

    pub fn active_slot(&self) -> Slot {
        self.slots.active()
    }

    pub fn layout_2d(&self) -> &Layout2D {
        &self.layout_2d
    }

    pub fn layout_3d(&self) -> &Layout3D {
        &self.layout_3d
    }

    pub fn plot_config(&self) -> &PlotConfig {
        &self.plot_config
    }
}
