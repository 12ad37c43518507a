use crate::config::{MIN_DELTA_TIME_MS, NORMALIZED_RADIUS};
use crate::game::processing::ProcessedHitObject;
use cgmath::MetricSpace;

/// One leg of a (prev_prev, prev, base) triangle over consecutive objects.
/// Carries everything the skills read: a radius-normalized jump distance and
/// the clock-rate-adjusted gap to the previous object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DifficultyObject {
    pub(crate) start_time: f64,
    pub(crate) delta_time: f64,
    pub(crate) distance: f64,
    pub(crate) is_spinner: bool,
}

impl DifficultyObject {
    fn new(
        base: &ProcessedHitObject,
        prev: &ProcessedHitObject,
        radius: f64,
        clock_rate: f64,
    ) -> Self {
        let mut scale = NORMALIZED_RADIUS / radius;
        if radius < 30.0 {
            // Tiny circles get a small extra reward beyond plain normalization.
            scale *= 1.0 + (30.0 - radius).min(5.0) / 50.0;
        }

        let raw_distance = base.base_pos.distance(prev.base_pos) as f64;
        // Floor the gap at 40ms: anything denser reads as a 375 BPM stream.
        let delta_time =
            ((base.start_time - prev.start_time) / clock_rate).max(MIN_DELTA_TIME_MS);

        Self {
            start_time: base.start_time / clock_rate,
            delta_time,
            distance: raw_distance * scale,
            is_spinner: base.is_spinner(),
        }
    }
}

/// Builds one difficulty object per hit object. The first object stands in
/// for its own predecessors, so the opening jump of the map still gets a
/// well-defined (zero-distance) triangle.
pub(crate) fn build_difficulty_objects(
    objects: &[ProcessedHitObject],
    radius: f64,
    clock_rate: f64,
) -> Vec<DifficultyObject> {
    objects
        .iter()
        .enumerate()
        .map(|(i, base)| {
            let prev = if i == 0 { base } else { &objects[i - 1] };
            DifficultyObject::new(base, prev, radius, clock_rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::processing::process;
    use crate::game::processing::tests::{circle_at, test_beatmap};

    #[test]
    fn delta_time_is_floored() {
        let map = test_beatmap(vec![
            circle_at(0.0, 0.0, 0.0, false),
            circle_at(100.0, 0.0, 10.0, false),
        ]);
        let processed = process(&map);
        let objects = build_difficulty_objects(&processed.objects, 32.0, 1.0);
        assert!((objects[1].delta_time - MIN_DELTA_TIME_MS).abs() < 1e-9);
    }

    #[test]
    fn distance_is_radius_normalized() {
        let map = test_beatmap(vec![
            circle_at(0.0, 0.0, 0.0, false),
            circle_at(104.0, 0.0, 500.0, false),
        ]);
        let processed = process(&map);

        // Reference radius: distance passes through unchanged.
        let objects = build_difficulty_objects(&processed.objects, 52.0, 1.0);
        assert!((objects[1].distance - 104.0).abs() < 1e-4);

        // Smaller circles scale distances up; below 30px the bonus kicks in.
        let objects = build_difficulty_objects(&processed.objects, 26.0, 1.0);
        let expected = 104.0 * (52.0 / 26.0) * (1.0 + 4.0 / 50.0);
        assert!((objects[1].distance - expected).abs() < 1e-4);
    }

    #[test]
    fn clock_rate_compresses_time() {
        let map = test_beatmap(vec![
            circle_at(0.0, 0.0, 0.0, false),
            circle_at(100.0, 0.0, 600.0, false),
        ]);
        let processed = process(&map);
        let objects = build_difficulty_objects(&processed.objects, 52.0, 1.5);
        assert!((objects[1].delta_time - 400.0).abs() < 1e-9);
        assert!((objects[1].start_time - 400.0).abs() < 1e-9);
    }
}
