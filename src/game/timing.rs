use crate::config::{
    DEFAULT_BEAT_DURATION_MS, DEFAULT_SAMPLE_VOLUME, VELOCITY_PERCENT_MAX, VELOCITY_PERCENT_MIN,
};
use crate::core::samples::SampleSet;
use crate::parsing::beatmap::TimingPoint;
use log::warn;

/// Timing state in effect at some instant: what the active uninherited point
/// defines, refined by any inherited points since.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext {
    pub beat_duration: f64,
    /// Slider-velocity multiplier as a percentage; 100 = nominal.
    pub velocity_percent: f64,
    pub sample_set: SampleSet,
    pub sample_volume: u8,
    pub kiai: bool,
}

impl Default for TimingContext {
    fn default() -> Self {
        Self {
            beat_duration: DEFAULT_BEAT_DURATION_MS,
            velocity_percent: 100.0,
            sample_set: SampleSet::Normal,
            sample_volume: DEFAULT_SAMPLE_VOLUME,
            kiai: false,
        }
    }
}

/// Forward-only cursor over a beatmap's timing points. Both the points and
/// the objects queried against them are time-ordered, so a full processing
/// pass is O(points + objects); the cursor never rescans from the start.
#[derive(Debug, Clone)]
pub struct TimingTrack<'a> {
    points: &'a [TimingPoint],
    cursor: usize,
    context: TimingContext,
}

impl<'a> TimingTrack<'a> {
    pub fn new(points: &'a [TimingPoint]) -> Self {
        let mut context = TimingContext::default();
        match points.first() {
            Some(first) => apply_point(&mut context, first),
            None => warn!("Beatmap has no timing points; using a default {}ms beat.", DEFAULT_BEAT_DURATION_MS),
        }
        // The first point is active from time zero; the cursor starts past it.
        Self {
            points,
            cursor: 1,
            context,
        }
    }

    /// Advances through every point at or before `time` and returns the
    /// resulting context. `time` must not go backwards between calls.
    pub fn advance_to(&mut self, time: f64) -> &TimingContext {
        while let Some(point) = self.points.get(self.cursor) {
            if point.offset > time {
                break;
            }
            apply_point(&mut self.context, point);
            self.cursor += 1;
        }
        &self.context
    }

    pub fn context(&self) -> &TimingContext {
        &self.context
    }
}

fn apply_point(context: &mut TimingContext, point: &TimingPoint) {
    if point.is_inherited() {
        context.velocity_percent =
            (-point.ms_per_beat).clamp(VELOCITY_PERCENT_MIN, VELOCITY_PERCENT_MAX);
    } else {
        context.beat_duration = point.ms_per_beat;
        context.velocity_percent = 100.0;
    }
    context.sample_set = point.sample_set;
    context.sample_volume = point.sample_volume;
    context.kiai = point.kiai;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(offset: f64, ms_per_beat: f64) -> TimingPoint {
        TimingPoint {
            offset,
            ms_per_beat,
            meter: 4,
            sample_set: SampleSet::Normal,
            sample_volume: 100,
            kiai: false,
        }
    }

    #[test]
    fn inherited_point_scales_velocity_not_tempo() {
        let points = [point(0.0, 500.0), point(4000.0, -50.0)];
        let mut track = TimingTrack::new(&points);

        let ctx = track.advance_to(4500.0);
        assert!((ctx.beat_duration - 500.0).abs() < 1e-9);
        assert!((ctx.velocity_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn uninherited_point_resets_velocity() {
        let points = [point(0.0, 500.0), point(1000.0, -25.0), point(2000.0, 300.0)];
        let mut track = TimingTrack::new(&points);

        let ctx = track.advance_to(1500.0);
        assert!((ctx.velocity_percent - 25.0).abs() < 1e-9);

        let ctx = track.advance_to(2500.0);
        assert!((ctx.beat_duration - 300.0).abs() < 1e-9);
        assert!((ctx.velocity_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_percent_is_clamped() {
        let points = [point(0.0, 500.0), point(100.0, -2000.0), point(200.0, -5.0)];
        let mut track = TimingTrack::new(&points);

        let ctx = track.advance_to(150.0);
        assert!((ctx.velocity_percent - 1000.0).abs() < 1e-9);
        let ctx = track.advance_to(250.0);
        assert!((ctx.velocity_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn point_at_query_time_applies() {
        let points = [point(0.0, 500.0), point(1000.0, -50.0)];
        let mut track = TimingTrack::new(&points);
        // Boundary: a point exactly at the object's time is in effect.
        let ctx = track.advance_to(1000.0);
        assert!((ctx.velocity_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_track_uses_defaults() {
        let mut track = TimingTrack::new(&[]);
        let ctx = track.advance_to(10_000.0);
        assert!((ctx.beat_duration - DEFAULT_BEAT_DURATION_MS).abs() < 1e-9);
        assert!((ctx.velocity_percent - 100.0).abs() < 1e-9);
    }
}
