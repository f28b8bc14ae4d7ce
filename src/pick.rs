//! Click picking - "closest" hover mode
//!
//! Resolves a pointer position to the nearest drawn point in screen space.

use egui::Pos2;

use crate::selection::PointRef;

/// Pointer must land within this many screen points of a marker center
pub const PICK_RADIUS: f32 = 12.0;

/// Nearest candidate to `pointer` within `max_distance`, if any
pub fn nearest<I>(candidates: I, pointer: Pos2, max_distance: f32) -> Option<PointRef>
where
    I: IntoIterator<Item = (PointRef, Pos2)>,
{
    candidates
        .into_iter()
        .map(|(point, pos)| (point, pos.distance_sq(pointer)))
        .filter(|&(_, d2)| d2 <= max_distance * max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(point, _)| point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_closest_within_radius() {
        let candidates = vec![
            (PointRef::new(0, 0), Pos2::new(10.0, 10.0)),
            (PointRef::new(0, 1), Pos2::new(14.0, 10.0)),
            (PointRef::new(1, 0), Pos2::new(100.0, 100.0)),
        ];
        assert_eq!(
            nearest(candidates.clone(), Pos2::new(13.0, 10.0), PICK_RADIUS),
            Some(PointRef::new(0, 1))
        );
        assert_eq!(
            nearest(candidates.clone(), Pos2::new(95.0, 100.0), PICK_RADIUS),
            Some(PointRef::new(1, 0))
        );
        assert_eq!(nearest(candidates, Pos2::new(50.0, 50.0), PICK_RADIUS), None);
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(nearest(Vec::new(), Pos2::ZERO, PICK_RADIUS), None);
    }
}
