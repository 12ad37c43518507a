use crate::config::STACK_OFFSET_PX;
use crate::core::samples::SampleSet;
use crate::game::timing::TimingTrack;
use crate::parsing::beatmap::{
    Beatmap, BreakPeriod, ComboColour, Difficulty, HitObject, HitObjectKind, Pos,
};
use crate::parsing::curve::{self, Curve};
use cgmath::Vector2;
use log::{debug, warn};

const Z_INDEX_BASE: i32 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct ComboInfo {
    /// Monotonically increasing across the map; advances by the colour-skip
    /// amount on every new-combo flag.
    pub combo_index: u32,
    /// 1-based position within the current combo.
    pub index_in_combo: u32,
    pub is_last_in_combo: bool,
    pub colour_index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct HitSoundInfo {
    pub sample_set: SampleSet,
    pub addition_set: SampleSet,
    /// Raw bitmask from the source object: whistle/finish/clap.
    pub sounds: u8,
    pub volume: u8,
}

#[derive(Debug, Clone)]
pub enum ProcessedKind {
    Circle,
    Slider {
        curve: Curve,
        repeat_count: u32,
        pixel_length: f64,
        /// Traversal velocity in px/ms.
        velocity: f64,
        /// Completion values in (0, repeat_count) whose fractional cycle
        /// position lies strictly inside (0, 1); one entry per tick crossing.
        tick_completions: Vec<f64>,
        ticks_per_cycle: u32,
    },
    Spinner,
}

/// A fully resolved hit object. Created once by processing; only
/// `stack_height` is written afterwards (by the stacking resolver), and all
/// shifted geometry is recomputed from the base fields on read.
#[derive(Debug, Clone)]
pub struct ProcessedHitObject {
    pub id: usize,
    pub base_pos: Pos,
    pub start_time: f64,
    pub end_time: f64,
    pub base_end_pos: Pos,
    pub combo: ComboInfo,
    pub hit_sound: HitSoundInfo,
    pub kiai: bool,
    pub stack_height: i32,
    pub z_index: i32,
    pub kind: ProcessedKind,
}

impl ProcessedHitObject {
    pub fn is_spinner(&self) -> bool {
        matches!(self.kind, ProcessedKind::Spinner)
    }

    pub fn is_slider(&self) -> bool {
        matches!(self.kind, ProcessedKind::Slider { .. })
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    fn stack_shift(&self) -> Pos {
        let offset = self.stack_height as f32 * STACK_OFFSET_PX;
        Vector2::new(offset, offset)
    }

    /// Base position shifted by the visual stack offset. Timing and hit
    /// logic keep using `base_pos`.
    pub fn stacked_pos(&self) -> Pos {
        self.base_pos - self.stack_shift()
    }

    pub fn stacked_end_pos(&self) -> Pos {
        self.base_end_pos - self.stack_shift()
    }

    /// Path position at a traversal completion in [0, repeat_count]; odd
    /// cycles run the curve backwards. Non-sliders sit at their base position.
    pub fn position_at(&self, completion: f64) -> Pos {
        match &self.kind {
            ProcessedKind::Slider {
                curve, repeat_count, ..
            } => {
                let completion = completion.clamp(0.0, *repeat_count as f64);
                let cycle = (completion.floor() as u32).min(repeat_count.saturating_sub(1));
                let mut progress = completion - cycle as f64;
                if cycle % 2 == 1 {
                    progress = 1.0 - progress;
                }
                curve.point_at(progress)
            }
            _ => self.base_pos,
        }
    }

    pub fn stacked_position_at(&self, completion: f64) -> Pos {
        self.position_at(completion) - self.stack_shift()
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedBeatmap {
    pub objects: Vec<ProcessedHitObject>,
    pub difficulty: Difficulty,
    pub stack_leniency: f32,
    pub combo_colours: Vec<ComboColour>,
    pub breaks: Vec<BreakPeriod>,
}

impl ProcessedBeatmap {
    pub fn max_combo(&self) -> u32 {
        self.objects
            .iter()
            .map(|object| match &object.kind {
                ProcessedKind::Slider {
                    repeat_count,
                    tick_completions,
                    ..
                } => 1 + repeat_count + tick_completions.len() as u32,
                _ => 1,
            })
            .sum()
    }
}

/// Traversal velocity in px/ms for the current timing context.
fn slider_velocity(difficulty: &Difficulty, beat_duration: f64, velocity_percent: f64) -> f64 {
    100.0 * difficulty.slider_multiplier * (100.0 / velocity_percent) / beat_duration
}

/// Completion fractions at which slider ticks fall. Steps from zero by one
/// tick's worth of travel; integer completions are repeat boundaries, not
/// ticks, so only fractional cycle positions strictly inside (0, 1) survive.
/// The 4-decimal rounding keeps float sums from registering phantom ticks at
/// exactly 0 or 1.
fn tick_completions(
    velocity: f64,
    beat_duration: f64,
    tick_rate: f64,
    pixel_length: f64,
    repeat_count: u32,
) -> Vec<f64> {
    let step = velocity * (beat_duration / tick_rate) / pixel_length;
    if !step.is_finite() || step <= 0.0 {
        warn!("Degenerate slider tick step {step}; slider gets no ticks.");
        return Vec::new();
    }

    let mut completions = Vec::new();
    let mut completion = step;
    while completion < repeat_count as f64 {
        let cycle_position = (completion.fract() * 10_000.0).round() / 10_000.0;
        if cycle_position > 0.0 && cycle_position < 1.0 {
            completions.push(completion);
        }
        completion += step;
    }
    completions
}

fn resolve_sample_set(raw: u8, inherited: SampleSet) -> SampleSet {
    SampleSet::from_id(raw).unwrap_or(inherited)
}

struct ComboCursor {
    combo_index: u32,
    index_in_combo: u32,
    palette_len: usize,
    colour_index: usize,
}

impl ComboCursor {
    fn new(palette_len: usize) -> Self {
        Self {
            combo_index: 0,
            index_in_combo: 0,
            palette_len: palette_len.max(1),
            colour_index: 0,
        }
    }

    fn advance(&mut self, object: &HitObject) -> ComboInfo {
        // The first object always opens a combo, flagged or not.
        if object.combo.new_combo || self.combo_index == 0 {
            let advance = (object.combo.colour_skip + 1).max(1);
            self.combo_index += advance;
            self.colour_index = (self.colour_index + advance as usize) % self.palette_len;
            self.index_in_combo = 1;
        } else {
            self.index_in_combo += 1;
        }

        ComboInfo {
            combo_index: self.combo_index,
            index_in_combo: self.index_in_combo,
            is_last_in_combo: false,
            colour_index: self.colour_index,
        }
    }
}

pub fn process(beatmap: &Beatmap) -> ProcessedBeatmap {
    let difficulty = beatmap.difficulty;
    let mut track = TimingTrack::new(&beatmap.timing_points);
    let mut combo = ComboCursor::new(beatmap.combo_colours.len());

    let mut objects: Vec<ProcessedHitObject> = Vec::with_capacity(beatmap.hit_objects.len());

    for (id, raw) in beatmap.hit_objects.iter().enumerate() {
        let context = *track.advance_to(raw.start_time);
        let combo_info = combo.advance(raw);

        let sample_set = resolve_sample_set(raw.sample_set, context.sample_set);
        let hit_sound = HitSoundInfo {
            sample_set,
            addition_set: resolve_sample_set(raw.addition_set, sample_set),
            sounds: raw.hit_sound,
            volume: context.sample_volume,
        };

        let (kind, end_time, base_end_pos) = match &raw.kind {
            HitObjectKind::Circle => (ProcessedKind::Circle, raw.start_time, raw.pos),
            HitObjectKind::Spinner { end_time } => (ProcessedKind::Spinner, *end_time, raw.pos),
            HitObjectKind::Slider {
                sections,
                repeat_count,
                pixel_length,
            } => {
                let curve = curve::resolve(sections, *pixel_length);
                let velocity =
                    slider_velocity(&difficulty, context.beat_duration, context.velocity_percent);
                let duration = if velocity.is_finite() && velocity > 0.0 {
                    *repeat_count as f64 * pixel_length / velocity
                } else {
                    warn!("Slider at {}ms has degenerate velocity; duration zeroed.", raw.start_time);
                    0.0
                };
                let completions = tick_completions(
                    velocity,
                    context.beat_duration,
                    difficulty.slider_tick_rate,
                    *pixel_length,
                    *repeat_count,
                );
                let ticks_per_cycle =
                    completions.iter().filter(|c| **c < 1.0).count() as u32;
                let end_pos = if repeat_count % 2 == 1 {
                    curve.end_point()
                } else {
                    curve.start_point()
                };
                (
                    ProcessedKind::Slider {
                        // The resampled curve is clipped to the declared
                        // length, so it is the authoritative one.
                        pixel_length: curve.length,
                        curve,
                        repeat_count: *repeat_count,
                        velocity,
                        tick_completions: completions,
                        ticks_per_cycle,
                    },
                    raw.start_time + duration,
                    end_pos,
                )
            }
        };

        objects.push(ProcessedHitObject {
            id,
            base_pos: raw.pos,
            start_time: raw.start_time,
            end_time,
            base_end_pos,
            combo: combo_info,
            hit_sound,
            kiai: context.kiai,
            stack_height: 0,
            z_index: 0,
            kind,
        });
    }

    mark_combo_ends(&mut objects);
    assign_z_indices(&mut objects);

    debug!(
        "Processed {} objects across {} combos ({} in kiai time).",
        objects.len(),
        objects.last().map_or(0, |o| o.combo.combo_index),
        objects.iter().filter(|o| o.kiai).count()
    );

    ProcessedBeatmap {
        objects,
        difficulty,
        stack_leniency: beatmap.stack_leniency,
        combo_colours: beatmap.combo_colours.clone(),
        breaks: beatmap.breaks.clone(),
    }
}

fn mark_combo_ends(objects: &mut [ProcessedHitObject]) {
    let count = objects.len();
    for i in 0..count {
        let is_last = match objects.get(i + 1) {
            Some(next) => next.combo.combo_index != objects[i].combo.combo_index,
            None => true,
        };
        objects[i].combo.is_last_in_combo = is_last;
    }
}

/// Later-ending objects (and, among ties, earlier-starting ones) must render
/// on top: sort by (rounded end time asc, start time desc) and hand out a
/// strictly decreasing index from the base.
fn assign_z_indices(objects: &mut [ProcessedHitObject]) {
    let mut order: Vec<usize> = (0..objects.len()).collect();
    order.sort_by(|&a, &b| {
        let end_a = objects[a].end_time.round() as i64;
        let end_b = objects[b].end_time.round() as i64;
        end_a.cmp(&end_b).then_with(|| {
            objects[b]
                .start_time
                .partial_cmp(&objects[a].start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    for (rank, &index) in order.iter().enumerate() {
        objects[index].z_index = Z_INDEX_BASE - rank as i32;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parsing::beatmap::{
        ComboFlag, HitObject, HitObjectKind, PathKind, PathSection, TimingPoint,
        DEFAULT_COMBO_COLOURS,
    };

    pub(crate) fn test_difficulty() -> Difficulty {
        Difficulty {
            circle_size: 4.0,
            hp_drain: 5.0,
            overall_difficulty: 5.0,
            approach_rate: 5.0,
            slider_multiplier: 1.0,
            slider_tick_rate: 1.0,
        }
    }

    pub(crate) fn uninherited(offset: f64, ms_per_beat: f64) -> TimingPoint {
        TimingPoint {
            offset,
            ms_per_beat,
            meter: 4,
            sample_set: SampleSet::Soft,
            sample_volume: 70,
            kiai: false,
        }
    }

    pub(crate) fn circle_at(x: f32, y: f32, time: f64, new_combo: bool) -> HitObject {
        HitObject {
            pos: Vector2::new(x, y),
            start_time: time,
            hit_sound: 0,
            combo: ComboFlag {
                new_combo,
                colour_skip: 0,
            },
            sample_set: 0,
            addition_set: 0,
            kind: HitObjectKind::Circle,
        }
    }

    pub(crate) fn horizontal_slider(
        x: f32,
        y: f32,
        time: f64,
        length: f64,
        repeat_count: u32,
    ) -> HitObject {
        HitObject {
            pos: Vector2::new(x, y),
            start_time: time,
            hit_sound: 0,
            combo: ComboFlag::default(),
            sample_set: 0,
            addition_set: 0,
            kind: HitObjectKind::Slider {
                sections: vec![PathSection {
                    kind: PathKind::Linear,
                    points: vec![Vector2::new(x, y), Vector2::new(x + length as f32, y)],
                }],
                repeat_count,
                pixel_length: length,
            },
        }
    }

    pub(crate) fn test_beatmap(objects: Vec<HitObject>) -> Beatmap {
        Beatmap {
            format_version: 14,
            title: "test".into(),
            artist: "test".into(),
            creator: "test".into(),
            version: "test".into(),
            audio_filename: String::new(),
            background_filename: None,
            stack_leniency: 0.7,
            difficulty: test_difficulty(),
            timing_points: vec![uninherited(0.0, 500.0)],
            hit_objects: objects,
            combo_colours: DEFAULT_COMBO_COLOURS.to_vec(),
            breaks: Vec::new(),
        }
    }

    #[test]
    fn slider_end_time_follows_velocity() {
        // beat 500ms, multiplier 1.0, nominal SV: velocity = 100*1*1/500 = 0.2 px/ms.
        let map = test_beatmap(vec![horizontal_slider(0.0, 0.0, 1000.0, 200.0, 1)]);
        let processed = process(&map);
        let slider = &processed.objects[0];
        // 200px / 0.2 px/ms = 1000ms.
        assert!((slider.end_time - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn inherited_point_doubles_velocity() {
        let mut map = test_beatmap(vec![horizontal_slider(0.0, 0.0, 1000.0, 200.0, 1)]);
        map.timing_points.push(TimingPoint {
            ms_per_beat: -50.0,
            ..uninherited(500.0, 500.0)
        });
        let processed = process(&map);
        // -50 reads as a 50% beat fraction: sliders run twice as fast, so
        // velocity 0.4 px/ms and a 500ms duration.
        assert!((processed.objects[0].end_time - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn tick_completions_skip_repeat_boundaries() {
        // velocity 0.2 px/ms, tick interval 500ms => 100px per tick on a
        // 200px slider: one tick at completion 0.5 per cycle, boundaries at
        // 1.0 excluded.
        let map = test_beatmap(vec![horizontal_slider(0.0, 0.0, 1000.0, 200.0, 2)]);
        let processed = process(&map);
        let ProcessedKind::Slider {
            ref tick_completions,
            ticks_per_cycle,
            ..
        } = processed.objects[0].kind
        else {
            panic!("expected slider");
        };
        assert_eq!(tick_completions.len(), 2);
        assert!((tick_completions[0] - 0.5).abs() < 1e-9);
        assert!((tick_completions[1] - 1.5).abs() < 1e-9);
        assert_eq!(ticks_per_cycle, 1);
    }

    #[test]
    fn combo_indices_are_monotonic_and_flag_driven() {
        let mut objects = vec![
            circle_at(0.0, 0.0, 0.0, false),
            circle_at(10.0, 0.0, 100.0, false),
            circle_at(20.0, 0.0, 200.0, true),
            circle_at(30.0, 0.0, 300.0, false),
            circle_at(40.0, 0.0, 400.0, true),
        ];
        objects[4].combo.colour_skip = 2;
        let processed = process(&test_beatmap(objects));

        let combos: Vec<u32> = processed
            .objects
            .iter()
            .map(|o| o.combo.combo_index)
            .collect();
        assert_eq!(combos, vec![1, 1, 2, 2, 5]);
        for pair in processed.objects.windows(2) {
            assert!(pair[1].combo.combo_index >= pair[0].combo.combo_index);
        }

        let in_combo: Vec<u32> = processed
            .objects
            .iter()
            .map(|o| o.combo.index_in_combo)
            .collect();
        assert_eq!(in_combo, vec![1, 2, 1, 2, 1]);

        let last_flags: Vec<bool> = processed
            .objects
            .iter()
            .map(|o| o.combo.is_last_in_combo)
            .collect();
        assert_eq!(last_flags, vec![false, true, false, true, true]);
    }

    #[test]
    fn hit_sounds_inherit_from_timing_point() {
        let mut objects = vec![circle_at(0.0, 0.0, 0.0, false), circle_at(0.0, 0.0, 100.0, false)];
        objects[1].sample_set = 3;
        let processed = process(&test_beatmap(objects));

        // Timing point declares Soft at 70% volume.
        assert_eq!(processed.objects[0].hit_sound.sample_set, SampleSet::Soft);
        assert_eq!(processed.objects[0].hit_sound.addition_set, SampleSet::Soft);
        assert_eq!(processed.objects[0].hit_sound.volume, 70);
        // Explicit override wins; addition inherits the resolved set.
        assert_eq!(processed.objects[1].hit_sound.sample_set, SampleSet::Drum);
        assert_eq!(processed.objects[1].hit_sound.addition_set, SampleSet::Drum);
    }

    #[test]
    fn z_indices_strictly_decrease_in_end_time_order() {
        let map = test_beatmap(vec![
            circle_at(0.0, 0.0, 0.0, false),
            horizontal_slider(0.0, 50.0, 0.0, 200.0, 1),
            circle_at(50.0, 0.0, 500.0, false),
        ]);
        let processed = process(&map);

        // End times: circle 0, circle 500, slider 1000.
        // Ties broken by later start first; ranks: obj0, obj2, obj1.
        assert!(processed.objects[0].z_index > processed.objects[2].z_index);
        assert!(processed.objects[2].z_index > processed.objects[1].z_index);

        let mut seen: Vec<i32> = processed.objects.iter().map(|o| o.z_index).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), processed.objects.len());
    }

    #[test]
    fn repeat_slider_end_position_returns_to_start() {
        let map = test_beatmap(vec![horizontal_slider(10.0, 20.0, 0.0, 200.0, 2)]);
        let processed = process(&map);
        let slider = &processed.objects[0];
        assert!((slider.base_end_pos.x - 10.0).abs() < 0.5);
        assert!((slider.position_at(2.0).x - 10.0).abs() < 0.5);
        assert!((slider.position_at(1.0).x - 210.0).abs() < 0.5);
        assert!((slider.position_at(0.5).x - 110.0).abs() < 0.5);
    }
}
