use crate::guide::model::{GuideModel, Point};
use crate::guide::state::DragTarget;

/// Picks the entity a pointer-down at `point` would grab. The cue's ghost
/// circle wins over any pocket; among pockets the lowest index wins.
pub fn hit_test(model: &GuideModel, point: Point, grab_radius: f32) -> Option<DragTarget> {
    let cue = model.cue();
    if point.distance_sq(cue.position) <= cue.ghost_radius * cue.ghost_radius {
        return Some(DragTarget::Cue);
    }

    let grab_sq = grab_radius * grab_radius;
    model
        .pockets()
        .iter()
        .position(|pocket| point.distance_sq(pocket.center) <= grab_sq)
        .map(DragTarget::Pocket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::model::{
        CueMarker, Pocket, PocketKind, ScreenSize, DEFAULT_GHOST_RADIUS, DEFAULT_GRAB_RADIUS,
    };

    fn layout() -> GuideModel {
        GuideModel::default_layout(ScreenSize::new(1920, 1080), DEFAULT_GHOST_RADIUS)
    }

    #[test]
    fn cue_hit_includes_ghost_circle_boundary() {
        let model = layout();
        assert_eq!(
            hit_test(&model, Point::new(976.0, 540.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Cue)
        );
        assert_eq!(
            hit_test(&model, Point::new(977.0, 540.0), DEFAULT_GRAB_RADIUS),
            None
        );
    }

    #[test]
    fn pocket_grab_zone_is_ten_pixels() {
        let model = layout();
        assert_eq!(
            hit_test(&model, Point::new(126.0, 128.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Pocket(0))
        );
        assert_eq!(
            hit_test(&model, Point::new(131.0, 120.0), DEFAULT_GRAB_RADIUS),
            None
        );
        assert_eq!(
            hit_test(&model, Point::new(1800.0, 965.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Pocket(5))
        );
    }

    #[test]
    fn cue_wins_over_overlapping_pocket() {
        let model = GuideModel::new(
            CueMarker {
                position: Point::new(100.0, 100.0),
                ghost_radius: 16.0,
            },
            vec![Pocket::new(Point::new(108.0, 100.0), 40.0, PocketKind::Side)],
        );
        for x in 98..=116 {
            let p = Point::new(x as f32, 100.0);
            assert_eq!(
                hit_test(&model, p, DEFAULT_GRAB_RADIUS),
                Some(DragTarget::Cue),
                "point {p:?} should grab the cue"
            );
        }
        assert_eq!(
            hit_test(&model, Point::new(117.0, 100.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Pocket(0))
        );
    }

    #[test]
    fn overlapping_pockets_resolve_to_lowest_index() {
        let model = GuideModel::new(
            CueMarker {
                position: Point::new(1000.0, 1000.0),
                ghost_radius: 4.0,
            },
            vec![
                Pocket::new(Point::new(50.0, 50.0), 20.0, PocketKind::Corner),
                Pocket::new(Point::new(54.0, 50.0), 20.0, PocketKind::Corner),
            ],
        );
        assert_eq!(
            hit_test(&model, Point::new(53.0, 50.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Pocket(0))
        );
        assert_eq!(
            hit_test(&model, Point::new(63.0, 50.0), DEFAULT_GRAB_RADIUS),
            Some(DragTarget::Pocket(1))
        );
    }
}
