//! Native GUI viewer using egui
//!
//! 2D/3D scatter tabs on the left, instructions and the two image slots on
//! the right. The view holds the only long-lived reference to the
//! [`ViewerState`]; every interaction becomes an [`Action`] applied after
//! the frame's widgets are laid out.

use eframe::egui;
use egui_plot::{
    Legend, Line, Plot, PlotBounds, PlotMemory, PlotPoint, PlotPoints, PlotResponse, PlotTransform, Points,
};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::images::{ImageCache, PANEL_SIZE};
use crate::layout::{AxisRange, Camera};
use crate::log_rejected;
use crate::marker::{HexColor, MarkerStyle, DEFAULT_SIZE, OUTLINE_WIDTH};
use crate::pick::{nearest, PICK_RADIUS};
use crate::projection::{box_edges, data_extent, dolly, orbit, Projector};
use crate::selection::{PointRef, Slot};
use crate::dataset::Dataset;
use crate::state::{Action, PlotKind, RelayoutEvent, Trace, ViewerState};

/// Half-width of the fixed 3D viewport in projected units
const SCENE_EXTENT: f64 = 1.6;
const ORBIT_SPEED: f64 = 0.01;
const DOLLY_SPEED: f64 = 0.002;
/// Relative tolerance when comparing plot bounds to the recorded ranges
const BOUNDS_EPS: f64 = 1e-9;

const INSTRUCTIONS: [&str; 5] = [
    "Click on a button and click on any point on the plot to load its corresponding image.",
    "Drag the 2D plot to pan and scroll to zoom, double click to zoom back out.",
    "Right-drag the 3D plot to rotate it, scroll to move closer.",
    "Switch between 2D and 3D plots with the tabs in the upper left.",
    "Click on the legend to toggle which data curves are visible.",
];

/// Run the native GUI viewer
pub fn run_viewer(state: ViewerState) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 950.0])
            .with_title("Data Visualization"),
        ..Default::default()
    };

    eframe::run_native(
        "Scatter Viewer",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Plot2D,
    Plot3D,
}

struct ViewerApp {
    state: ViewerState,
    tab: Tab,
    images: ImageCache,
    extent: [AxisRange; 3],
    /// Set once the 2D plot has reported its first draw
    initialized: bool,
    /// Blocking notification; input is ignored until acknowledged
    pending_error: Option<String>,
}

fn color32(c: HexColor) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

fn slot_button_color(slot: Slot) -> egui::Color32 {
    match slot {
        Slot::Left => egui::Color32::from_rgb(0x00, 0x7B, 0xFF),
        Slot::Right => egui::Color32::from_rgb(0x6C, 0x75, 0x7D),
    }
}

/// Draw one marker: the outline in the highlight color, the base color inset
fn marker_points(name: &str, pos: [f64; 2], style: &MarkerStyle, point: usize) -> [Points; 2] {
    let size = style.size(point).unwrap_or(DEFAULT_SIZE);
    let radius = size / 2.0;
    let base = style.base_color(point).map(color32).unwrap_or(egui::Color32::GRAY);
    let outline = style.highlight_color(point).map(color32).unwrap_or(base);
    [
        Points::new(vec![pos]).radius(radius).color(outline).filled(true).name(name),
        Points::new(vec![pos])
            .radius((radius - OUTLINE_WIDTH / 2.0).max(1.0))
            .color(base)
            .filled(true)
            .name(name),
    ]
}

/// Drawn at default size with no visible outline
fn is_plain(style: &MarkerStyle, point: usize) -> bool {
    style.size(point) == Some(DEFAULT_SIZE) && !style.is_highlighted(point)
}

fn range_changed(recorded: Option<AxisRange>, current: AxisRange) -> bool {
    match recorded {
        None => true,
        Some(r) => {
            let eps = BOUNDS_EPS * (current.end - current.start).abs().max(1.0);
            !r.approx_eq(&current, eps)
        }
    }
}

/// Resolve a click at `pointer` against points placed by `transform`
fn pick(
    transform: &PlotTransform,
    pointer: egui::Pos2,
    placed: impl IntoIterator<Item = (PointRef, [f64; 2])>,
) -> Option<PointRef> {
    let candidates = placed
        .into_iter()
        .map(|(point, [x, y])| (point, transform.position_from_point(&PlotPoint::new(x, y))));
    nearest(candidates, pointer, PICK_RADIUS)
}

/// Series the user has switched off in the plot's legend
fn hidden_series(ctx: &egui::Context, plot_id: egui::Id) -> HashSet<String> {
    PlotMemory::load(ctx, plot_id)
        .map(|mem| mem.hidden_items.into_iter().collect())
        .unwrap_or_default()
}

fn is_visible(trace: &Trace<'_>, hidden: &HashSet<String>) -> bool {
    !hidden.contains(&trace.series.name)
}

/// Readout for the point under the pointer, coordinates as the plot kind shows them
fn hover_label(dataset: &Dataset, point: PointRef, kind: PlotKind) -> Option<String> {
    let name = &dataset.series().get(point.series)?.name;
    let p = dataset.point(point.series, point.point)?;
    Some(match kind {
        PlotKind::Scatter2D => format!("{}\nx: {:.3}\ny: {:.3}", name, p.x, p.y),
        PlotKind::Scatter3D => format!("{}\nx: {:.3}\ny: {:.3}\nz: {:.3}", name, p.x, p.y, p.z),
    })
}

/// Hover shows the nearest point, a click selects it
fn pointer_actions(
    response: &PlotResponse<()>,
    dataset: &Dataset,
    kind: PlotKind,
    placed: &[(PointRef, [f64; 2])],
    actions: &mut Vec<Action>,
) {
    if let Some(pointer) = response.response.hover_pos() {
        if let Some(text) = pick(&response.transform, pointer, placed.iter().copied())
            .and_then(|point| hover_label(dataset, point, kind))
        {
            response.response.clone().on_hover_text_at_pointer(text);
        }
    }

    if response.response.clicked() {
        if let Some(pointer) = response.response.interact_pointer_pos() {
            if let Some(point) = pick(&response.transform, pointer, placed.iter().copied()) {
                actions.push(Action::PointClicked(point));
            }
        }
    }
}

impl ViewerApp {
    fn new(cc: &eframe::CreationContext<'_>, state: ViewerState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        let extent = data_extent(state.dataset());

        Self {
            state,
            tab: Tab::Plot2D,
            images: ImageCache::default(),
            extent,
            initialized: false,
            pending_error: None,
        }
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            if self.pending_error.is_some() {
                debug!("Dropping {:?} while an error is shown", action);
                continue;
            }
            match self.state.apply(action) {
                Ok(transition) => debug!("{:?}", transition),
                Err(e) => {
                    log_rejected!(e);
                    self.pending_error = Some(e.to_string());
                }
            }
        }
    }

    fn show_2d(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let layout = self.state.layout_2d();
        let traces = self.state.traces(PlotKind::Scatter2D);

        let plot_id = ui.make_persistent_id("scatter_2d");
        let plot = Plot::new("scatter_2d")
            .id(plot_id)
            .width(layout.width)
            .height(layout.height)
            .legend(Legend::default())
            .allow_double_click_reset(true)
            .show_x(false)
            .show_y(false)
            .x_axis_label("x")
            .y_axis_label("y");

        let response = plot.show(ui, |plot_ui| {
            for trace in &traces {
                let name = trace.series.name.as_str();
                let normal: Vec<[f64; 2]> = trace
                    .series
                    .points
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| is_plain(trace.marker, i))
                    .map(|(_, p)| [p.x, p.y])
                    .collect();
                plot_ui.points(
                    Points::new(normal)
                        .radius(DEFAULT_SIZE / 2.0)
                        .color(color32(trace.series.color))
                        .filled(true)
                        .name(name),
                );

                // Selected points on top, with their outline
                for (i, p) in trace.series.points.iter().enumerate() {
                    if !is_plain(trace.marker, i) {
                        for item in marker_points(name, [p.x, p.y], trace.marker, i) {
                            plot_ui.points(item);
                        }
                    }
                }
            }
        });

        let bounds = response.transform.bounds();
        let x = AxisRange::new(bounds.min()[0], bounds.max()[0]);
        let y = AxisRange::new(bounds.min()[1], bounds.max()[1]);
        if !self.initialized {
            self.initialized = true;
            actions.push(Action::Relayout(RelayoutEvent::initial()));
        } else if range_changed(layout.x_axis.range, x) || range_changed(layout.y_axis.range, y) {
            actions.push(Action::Relayout(RelayoutEvent::ranges(x, y)));
        }

        let hidden = hidden_series(ui.ctx(), plot_id);
        let placed: Vec<(PointRef, [f64; 2])> = traces
            .iter()
            .filter(|t| is_visible(t, &hidden))
            .flat_map(|t| {
                t.series
                    .points
                    .iter()
                    .enumerate()
                    .map(move |(i, p)| (PointRef::new(t.index, i), [p.x, p.y]))
            })
            .collect();
        pointer_actions(&response, self.state.dataset(), PlotKind::Scatter2D, &placed, actions);
    }

    fn show_3d(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) -> Option<Camera> {
        let layout = self.state.layout_3d();
        let projector = Projector::new(layout, self.extent);
        let traces = self.state.traces(PlotKind::Scatter3D);

        // Far points first so nearer markers draw over them
        let mut placed = Vec::new();
        for trace in &traces {
            for (i, p) in trace.series.points.iter().enumerate() {
                if let Some(proj) = projector.project(p.x, p.y, p.z) {
                    placed.push((trace, i, proj));
                }
            }
        }
        placed.sort_by(|a, b| b.2.depth.total_cmp(&a.2.depth));

        let plot_id = ui.make_persistent_id("scatter_3d");
        let plot = Plot::new("scatter_3d")
            .id(plot_id)
            .width(layout.width)
            .height(layout.height)
            .legend(Legend::default())
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false);

        let response = plot.show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [-SCENE_EXTENT, -SCENE_EXTENT],
                [SCENE_EXTENT, SCENE_EXTENT],
            ));

            for (a, b) in box_edges() {
                if let (Some(pa), Some(pb)) = (projector.project_normalized(a), projector.project_normalized(b)) {
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![pa.pos, pb.pos]))
                            .color(egui::Color32::LIGHT_GRAY)
                            .width(1.0),
                    );
                }
            }

            for (trace, i, proj) in &placed {
                for item in marker_points(&trace.series.name, proj.pos, trace.marker, *i) {
                    plot_ui.points(item);
                }
            }
        });

        let hidden = hidden_series(ui.ctx(), plot_id);
        let candidates: Vec<(PointRef, [f64; 2])> = placed
            .iter()
            .filter(|(t, _, _)| is_visible(t, &hidden))
            .map(|(t, i, proj)| (PointRef::new(t.index, *i), proj.pos))
            .collect();
        pointer_actions(&response, self.state.dataset(), PlotKind::Scatter3D, &candidates, actions);

        let mut camera = layout.scene.camera;
        let mut moved = false;
        if response.response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.response.drag_delta();
            camera = orbit(&camera, -delta.x as f64 * ORBIT_SPEED, delta.y as f64 * ORBIT_SPEED);
            moved = true;
        }
        if response.response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y) as f64;
            if scroll != 0.0 {
                camera = dolly(&camera, 1.0 - scroll * DOLLY_SPEED);
                moved = true;
            }
        }
        moved.then_some(camera)
    }

    fn show_slot(&mut self, ui: &mut egui::Ui, slot: Slot, actions: &mut Vec<Action>) {
        let active = self.state.active_slot() == slot;
        let color = slot_button_color(slot);
        let text = egui::RichText::new("Click, then select a point")
            .color(if active { egui::Color32::WHITE } else { color });
        let button = egui::Button::new(text)
            .min_size(egui::vec2(PANEL_SIZE[0], 28.0))
            .fill(if active { color } else { egui::Color32::TRANSPARENT })
            .stroke(egui::Stroke::new(1.0, color));
        if ui.add(button).clicked() && !active {
            actions.push(Action::SelectSlot(slot));
        }

        ui.add_space(6.0);
        let url = self.state.slot(slot).image_url.clone();
        match self.images.texture(ui.ctx(), &url) {
            Some(texture) => {
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(&texture))
                        .max_size(egui::vec2(PANEL_SIZE[0], PANEL_SIZE[1]))
                        .rounding(6.0),
                )
                .on_hover_text(url.as_str());
            }
            None => {
                egui::Frame::none()
                    .fill(egui::Color32::from_gray(200))
                    .rounding(6.0)
                    .show(ui, |ui| {
                        ui.set_min_size(egui::vec2(PANEL_SIZE[0], PANEL_SIZE[1]));
                        ui.centered_and_justified(|ui| {
                            ui.label(egui::RichText::new("START").size(28.0).color(egui::Color32::from_gray(90)));
                        });
                    })
                    .response
                    .on_hover_text(url.as_str());
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions: Vec<Action> = Vec::new();
        let mut camera: Option<Camera> = None;
        let blocked = self.pending_error.is_some();

        egui::TopBottomPanel::top("title_panel").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Data Visualization");
            });
        });

        // Right panel - instructions and image slots
        egui::SidePanel::right("slots_panel")
            .resizable(false)
            .min_width(2.0 * PANEL_SIZE[0] + 40.0)
            .show(ctx, |ui| {
                if blocked {
                    ui.disable();
                }

                egui::Frame::group(ui.style()).show(ui, |ui| {
                    for line in INSTRUCTIONS {
                        ui.label(format!("• {}", line));
                    }
                    ui.add_space(8.0);
                    if ui.button("Reset 3D Plot Orientation").clicked() {
                        actions.push(Action::ResetOrientation);
                    }
                });

                ui.add_space(12.0);
                ui.horizontal_top(|ui| {
                    for slot in Slot::ALL {
                        ui.vertical(|ui| self.show_slot(ui, slot, &mut actions));
                        ui.add_space(12.0);
                    }
                });
            });

        // Central panel - plot tabs
        egui::CentralPanel::default().show(ctx, |ui| {
            if blocked {
                ui.disable();
            }

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Plot2D, "2D Plot");
                ui.selectable_value(&mut self.tab, Tab::Plot3D, "3D Plot");
            });
            ui.separator();

            match self.tab {
                Tab::Plot2D => self.show_2d(ui, &mut actions),
                Tab::Plot3D => camera = self.show_3d(ui, &mut actions),
            }
        });

        if let Some(message) = self.pending_error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message.as_str());
                    if ui.button("OK").clicked() {
                        info!("Error acknowledged: {}", message);
                        self.pending_error = None;
                    }
                });
        }

        if let Some(camera) = camera {
            self.state.set_camera(camera);
        }
        self.dispatch(actions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_changed() {
        let r = AxisRange::new(0.0, 10.0);
        assert!(range_changed(None, r));
        assert!(!range_changed(Some(r), AxisRange::new(0.0, 10.0 + 1e-12)));
        assert!(range_changed(Some(r), AxisRange::new(0.5, 10.0)));
    }

    #[test]
    fn test_hidden_series_are_not_pickable() {
        let config = crate::config::Config::default();
        let state = ViewerState::new(Dataset::builtin(&config), &config);
        let traces = state.traces(PlotKind::Scatter2D);
        let hidden: HashSet<String> = ["Cluster B".to_string()].into_iter().collect();

        let visible: Vec<usize> = traces
            .iter()
            .filter(|t| is_visible(t, &hidden))
            .map(|t| t.index)
            .collect();
        assert_eq!(visible, vec![0, 2]);
        assert!(traces.iter().all(|t| is_visible(t, &HashSet::new())));
    }

    #[test]
    fn test_hover_label_matches_plot_kind() {
        let config = crate::config::Config::default();
        let dataset = Dataset::builtin(&config);
        let p = dataset.point(1, 0).unwrap().clone();

        let label = hover_label(&dataset, PointRef::new(1, 0), PlotKind::Scatter2D).unwrap();
        assert_eq!(label, format!("Cluster B\nx: {:.3}\ny: {:.3}", p.x, p.y));

        let label = hover_label(&dataset, PointRef::new(1, 0), PlotKind::Scatter3D).unwrap();
        assert!(label.ends_with(&format!("z: {:.3}", p.z)));

        assert_eq!(hover_label(&dataset, PointRef::new(3, 0), PlotKind::Scatter2D), None);
        assert_eq!(hover_label(&dataset, PointRef::new(0, 99), PlotKind::Scatter3D), None);
    }

    #[test]
    fn test_plain_marker() {
        let mut style = MarkerStyle::uniform(2, HexColor::rgb(0, 0, 0));
        assert!(is_plain(&style, 0));
        // Right highlight equals this base color, but the size still marks it
        style.highlight(1, Slot::Right.highlight_color());
        assert!(!is_plain(&style, 1));
    }
}
