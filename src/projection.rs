//! Scene projection for the 3D plot
//!
//! Each axis is normalized into [-1, 1] using its layout range (or the data
//! extent when the axis autoranges), then viewed from the layout camera with
//! a simple perspective divide.

use crate::dataset::Dataset;
use crate::layout::{AxisRange, Camera, Layout3D, Vec3};

/// Scales the perspective divide so the unit cube fills about [-1, 1] from
/// the default eye distance
const FOCAL: f64 = 2.5;
/// Points closer to the eye than this are culled
const NEAR: f64 = 0.05;
const MIN_DISTANCE: f64 = 0.5;
const MAX_DISTANCE: f64 = 10.0;
/// Closest the orbit may get to the up axis, in radians
const POLE_MARGIN: f64 = 0.05;

fn add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

fn scale(a: Vec3, s: f64) -> Vec3 {
    Vec3::new(a.x * s, a.y * s, a.z * s)
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

fn length(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

fn normalize(a: Vec3) -> Vec3 {
    let len = length(a);
    if len < 1e-12 {
        a
    } else {
        scale(a, 1.0 / len)
    }
}

/// Rotate `v` around unit `axis` by `angle` (Rodrigues)
fn rotate(v: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    add(
        add(scale(v, cos), scale(cross(axis, v), sin)),
        scale(axis, dot(axis, v) * (1.0 - cos)),
    )
}

/// Orthonormal view basis of a camera
struct Basis {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Basis {
    fn of(camera: &Camera) -> Self {
        let forward = normalize(sub(camera.center, camera.eye));
        let right = normalize(cross(forward, camera.up));
        let up = cross(right, forward);
        Self { right, up, forward }
    }
}

/// A point in plot space plus its distance along the view direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pos: [f64; 2],
    pub depth: f64,
}

/// Maps a value from `range` onto [-1, 1], honoring reversed ranges
fn normalize_axis(v: f64, range: AxisRange) -> f64 {
    let span = range.end - range.start;
    if span.abs() < 1e-12 {
        return 0.0;
    }
    (v - range.start) / span * 2.0 - 1.0
}

/// Min/max of each coordinate over the whole dataset
pub fn data_extent(dataset: &Dataset) -> [AxisRange; 3] {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for p in dataset.series().iter().flat_map(|s| s.points.iter()) {
        for (i, v) in [p.x, p.y, p.z].into_iter().enumerate() {
            min[i] = min[i].min(v);
            max[i] = max[i].max(v);
        }
    }
    std::array::from_fn(|i| {
        if min[i].is_finite() {
            AxisRange::new(min[i], max[i])
        } else {
            AxisRange::new(-1.0, 1.0)
        }
    })
}

pub struct Projector {
    camera: Camera,
    basis: Basis,
    /// Ranges used for normalization
    ranges: [AxisRange; 3],
    /// Explicit layout ranges; points outside them are clipped
    clip: [Option<AxisRange>; 2],
}

impl Projector {
    pub fn new(layout: &Layout3D, extent: [AxisRange; 3]) -> Self {
        let scene = &layout.scene;
        let x = scene.x_axis.range;
        let y = scene.y_axis.range;
        let z = scene.z_axis.range;
        Self {
            camera: scene.camera,
            basis: Basis::of(&scene.camera),
            ranges: [
                x.unwrap_or(extent[0]),
                y.unwrap_or(extent[1]),
                z.unwrap_or(extent[2]),
            ],
            clip: [x, y],
        }
    }

    /// Project a data point, or `None` if it is clipped or behind the eye
    pub fn project(&self, x: f64, y: f64, z: f64) -> Option<Projected> {
        let inside = |r: Option<AxisRange>, v: f64| r.map_or(true, |r| r.contains(v));
        if !inside(self.clip[0], x) || !inside(self.clip[1], y) {
            return None;
        }
        self.project_normalized([
            normalize_axis(x, self.ranges[0]),
            normalize_axis(y, self.ranges[1]),
            normalize_axis(z, self.ranges[2]),
        ])
    }

    /// Project a point already in normalized scene space
    pub fn project_normalized(&self, n: [f64; 3]) -> Option<Projected> {
        let d = sub(Vec3::new(n[0], n[1], n[2]), self.camera.eye);
        let depth = dot(d, self.basis.forward);
        if depth < NEAR {
            return None;
        }
        Some(Projected {
            pos: [
                dot(d, self.basis.right) / depth * FOCAL,
                dot(d, self.basis.up) / depth * FOCAL,
            ],
            depth,
        })
    }
}

/// Corners of the normalized scene box, paired into its 12 edges
pub fn box_edges() -> Vec<([f64; 3], [f64; 3])> {
    let mut edges = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            edges.push(([-1.0, a, b], [1.0, a, b]));
            edges.push(([a, -1.0, b], [a, 1.0, b]));
            edges.push(([a, b, -1.0], [a, b, 1.0]));
        }
    }
    edges
}

/// Orbit the eye around the center: `yaw` about the up vector, `pitch`
/// raises the eye toward the up vector. Pitch stops short of the poles.
pub fn orbit(camera: &Camera, yaw: f64, pitch: f64) -> Camera {
    let up = normalize(camera.up);
    let offset = rotate(sub(camera.eye, camera.center), up, yaw);

    let polar = dot(normalize(offset), up).clamp(-1.0, 1.0).acos();
    let target = (polar - pitch).clamp(POLE_MARGIN, std::f64::consts::PI - POLE_MARGIN);
    let axis = cross(offset, up);
    let offset = if length(axis) < 1e-12 {
        offset
    } else {
        rotate(offset, normalize(axis), polar - target)
    };

    Camera {
        eye: add(camera.center, offset),
        ..*camera
    }
}

/// Move the eye toward (`factor < 1`) or away from the center
pub fn dolly(camera: &Camera, factor: f64) -> Camera {
    let offset = sub(camera.eye, camera.center);
    let distance = length(offset);
    if distance < 1e-12 {
        return *camera;
    }
    let target = (distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    Camera {
        eye: add(camera.center, scale(offset, target / distance)),
        ..*camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_3d_layout;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn unit_extent() -> [AxisRange; 3] {
        [AxisRange::new(-1.0, 1.0); 3]
    }

    #[test]
    fn test_center_projects_to_origin() {
        let layout = build_3d_layout(None, None, 0, None);
        let p = Projector::new(&layout, unit_extent()).project(0.0, 0.0, 0.0).unwrap();
        assert!(approx(p.pos[0], 0.0));
        assert!(p.pos[1].abs() < 0.2);
        assert!(approx(p.depth, length(Camera::default().eye)));
    }

    #[test]
    fn test_reversed_x_keeps_2d_orientation() {
        // Smaller x should land on the left, as in the 2D plot
        let layout = build_3d_layout(Some(AxisRange::new(1.0, -1.0)), None, 0, None);
        let projector = Projector::new(&layout, unit_extent());
        let low = projector.project(-0.5, 0.0, 0.0).unwrap();
        let high = projector.project(0.5, 0.0, 0.0).unwrap();
        assert!(low.pos[0] < high.pos[0]);
    }

    #[test]
    fn test_points_outside_range_are_clipped() {
        let layout = build_3d_layout(Some(AxisRange::new(2.0, 0.0)), Some(AxisRange::new(0.0, 1.0)), 0, None);
        let projector = Projector::new(&layout, unit_extent());
        assert!(projector.project(1.0, 0.5, 0.0).is_some());
        assert!(projector.project(3.0, 0.5, 0.0).is_none());
        assert!(projector.project(1.0, -0.5, 0.0).is_none());
        // z always autoranges
        assert!(projector.project(1.0, 0.5, 100.0).is_some());
    }

    #[test]
    fn test_orbit_keeps_distance_and_center() {
        let cam = Camera::default();
        let moved = orbit(&cam, 0.7, 0.3);
        assert_eq!(moved.center, cam.center);
        assert_eq!(moved.up, cam.up);
        assert!(approx(length(sub(moved.eye, moved.center)), length(sub(cam.eye, cam.center))));
        assert!(!approx(moved.eye.x, cam.eye.x));
    }

    #[test]
    fn test_orbit_stops_at_pole() {
        let cam = Camera::default();
        let moved = orbit(&cam, 0.0, std::f64::consts::PI);
        let offset = normalize(sub(moved.eye, moved.center));
        let polar = dot(offset, cam.up).acos();
        assert!((polar - POLE_MARGIN).abs() < 1e-6);

        let lowered = orbit(&cam, 0.0, -0.2);
        assert!(lowered.eye.y < cam.eye.y);
    }

    #[test]
    fn test_dolly_clamps_distance() {
        let cam = Camera::default();
        let near = dolly(&cam, 0.01);
        assert!(approx(length(sub(near.eye, near.center)), MIN_DISTANCE));
        let far = dolly(&cam, 100.0);
        assert!(approx(length(sub(far.eye, far.center)), MAX_DISTANCE));
    }

    #[test]
    fn test_box_has_twelve_edges() {
        assert_eq!(box_edges().len(), 12);
    }

    #[test]
    fn test_data_extent() {
        let dataset = Dataset::builtin(&crate::config::Config::default());
        let [x, y, _z] = data_extent(&dataset);
        assert!(x.min() < x.max());
        assert!(y.min() < y.max());
        assert_eq!(data_extent(&Dataset::new(vec![]))[0], AxisRange::new(-1.0, 1.0));
    }
}
