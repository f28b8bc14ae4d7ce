//! Layout builder - axis ranges, camera and revision for both plots
//!
//! Layouts serialize with the field names a Plotly renderer expects, so the
//! same values drive the native view and the JSON export.

use serde::{Serialize, Serializer};

/// Width and height of both plots
pub const PLOT_SIZE: f32 = 750.0;

/// An axis range in display order. `start > end` renders the axis reversed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Same span, opposite direction
    pub fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min() && v <= self.max()
    }

    /// Equal within `eps`, used to ignore float jitter from the plot widget
    pub fn approx_eq(&self, other: &AxisRange, eps: f64) -> bool {
        (self.start - other.start).abs() <= eps && (self.end - other.end).abs() <= eps
    }
}

impl Serialize for AxisRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

/// `None` means autorange; serialized as an empty array
fn serialize_range<S: Serializer>(range: &Option<AxisRange>, serializer: S) -> Result<S::Ok, S::Error> {
    match range {
        Some(r) => r.serialize(serializer),
        None => Vec::<f64>::new().serialize(serializer),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Axis {
    #[serde(serialize_with = "serialize_range")]
    pub range: Option<AxisRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation of the 3D scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub center: Vec3,
    pub eye: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 0.0, 0.0),
            eye: Vec3::new(0.0, 0.1, -2.5),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverMode {
    Closest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout2D {
    pub width: f32,
    pub height: f32,
    pub title: String,
    #[serde(rename = "hovermode")]
    pub hover_mode: HoverMode,
    #[serde(rename = "datarevision")]
    pub revision: u64,
    #[serde(rename = "xaxis")]
    pub x_axis: Axis,
    #[serde(rename = "yaxis")]
    pub y_axis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    #[serde(rename = "aspectmode")]
    pub aspect_mode: &'static str,
    #[serde(rename = "xaxis")]
    pub x_axis: Axis,
    #[serde(rename = "yaxis")]
    pub y_axis: Axis,
    #[serde(rename = "zaxis")]
    pub z_axis: Axis,
    pub camera: Camera,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout3D {
    pub width: f32,
    pub height: f32,
    pub title: String,
    #[serde(rename = "hovermode")]
    pub hover_mode: HoverMode,
    #[serde(rename = "datarevision")]
    pub revision: u64,
    pub scene: Scene,
}

/// Static renderer options
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub display_mode_bar: bool,
    pub responsive: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            display_mode_bar: false,
            responsive: true,
        }
    }
}

/// Build the 2D layout. Ranges are used verbatim.
pub fn build_2d_layout(x_range: Option<AxisRange>, y_range: Option<AxisRange>, revision: u64) -> Layout2D {
    Layout2D {
        width: PLOT_SIZE,
        height: PLOT_SIZE,
        title: "2D Plot".to_string(),
        hover_mode: HoverMode::Closest,
        revision,
        x_axis: Axis { range: x_range },
        y_axis: Axis { range: y_range },
    }
}

/// Build the 3D layout.
///
/// `x_range` must already be reversed (max to min) so the scene, viewed from
/// the default eye at negative z, keeps the same left-to-right order as the
/// 2D plot. Without a camera the default orientation is used.
pub fn build_3d_layout(
    x_range: Option<AxisRange>,
    y_range: Option<AxisRange>,
    revision: u64,
    camera: Option<Camera>,
) -> Layout3D {
    Layout3D {
        width: PLOT_SIZE,
        height: PLOT_SIZE,
        title: "3D Plot".to_string(),
        hover_mode: HoverMode::Closest,
        revision,
        scene: Scene {
            aspect_mode: "auto",
            x_axis: Axis { range: x_range },
            y_axis: Axis { range: y_range },
            z_axis: Axis { range: None },
            camera: camera.unwrap_or_default(),
        },
    }
}

impl Layout2D {
    /// 3D layout mirroring this one's ranges, x reversed
    pub fn mirror_3d(&self, revision: u64, camera: Option<Camera>) -> Layout3D {
        build_3d_layout(
            self.x_axis.range.map(AxisRange::reversed),
            self.y_axis.range,
            revision,
            camera,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2d_layout_is_verbatim() {
        let x = AxisRange::new(-1.0, 4.0);
        let y = AxisRange::new(0.0, 2.0);
        let layout = build_2d_layout(Some(x), Some(y), 7);
        assert_eq!(layout.x_axis.range, Some(x));
        assert_eq!(layout.y_axis.range, Some(y));
        assert_eq!(layout.revision, 7);
        assert_eq!(layout.width, 750.0);
        assert_eq!(layout.hover_mode, HoverMode::Closest);
        assert_eq!(layout, build_2d_layout(Some(x), Some(y), 7));
    }

    #[test]
    fn test_3d_layout_default_camera() {
        let layout = build_3d_layout(None, None, 0, None);
        let cam = layout.scene.camera;
        assert_eq!(cam.center, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(cam.eye, Vec3::new(0.0, 0.1, -2.5));
        assert_eq!(cam.up, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(layout.scene.z_axis.range, None);
    }

    #[test]
    fn test_3d_layout_keeps_given_camera() {
        let cam = Camera {
            center: Vec3::new(1.0, 0.0, 0.0),
            eye: Vec3::new(2.0, 2.0, 2.0),
            up: Vec3::new(0.0, 0.0, 1.0),
        };
        let layout = build_3d_layout(None, None, 3, Some(cam));
        assert_eq!(layout.scene.camera, cam);
        assert_eq!(layout.revision, 3);
    }

    #[test]
    fn test_mirror_reverses_x_only() {
        let layout = build_2d_layout(Some(AxisRange::new(0.0, 10.0)), Some(AxisRange::new(-5.0, 5.0)), 1);
        let mirrored = layout.mirror_3d(4, None);
        assert_eq!(mirrored.scene.x_axis.range, Some(AxisRange::new(10.0, 0.0)));
        assert_eq!(mirrored.scene.y_axis.range, Some(AxisRange::new(-5.0, 5.0)));
        assert_eq!(mirrored.revision, 4);
    }

    #[test]
    fn test_serializes_plotly_field_names() {
        let layout = build_3d_layout(Some(AxisRange::new(3.0, 1.0)), None, 2, None);
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["datarevision"], 2);
        assert_eq!(json["hovermode"], "closest");
        assert_eq!(json["scene"]["xaxis"]["range"], serde_json::json!([3.0, 1.0]));
        assert_eq!(json["scene"]["yaxis"]["range"], serde_json::json!([]));
        assert_eq!(json["scene"]["camera"]["eye"]["z"], -2.5);

        let config = serde_json::to_value(PlotConfig::default()).unwrap();
        assert_eq!(config, serde_json::json!({"displayModeBar": false, "responsive": true}));
    }
}
