mod object;
mod skill;

use crate::config::STAR_SCALING_FACTOR;
use crate::game::processing::ProcessedBeatmap;
use log::debug;
use object::build_difficulty_objects;
use serde::Serialize;
use skill::{SkillKind, process_skill};

/// Scalar difficulty attributes for one beatmap at one clock rate.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DifficultyAttributes {
    pub aim_strain: f64,
    pub speed_strain: f64,
    pub star_rating: f64,
}

pub fn calculate(map: &ProcessedBeatmap) -> DifficultyAttributes {
    calculate_with_clock_rate(map, 1.0)
}

/// Strain-decay skill model over the resolved object list. `clock_rate`
/// compresses the timeline for rate-changing mods (1.5 = DT).
pub fn calculate_with_clock_rate(map: &ProcessedBeatmap, clock_rate: f64) -> DifficultyAttributes {
    if map.objects.is_empty() {
        return DifficultyAttributes::default();
    }

    let radius = map.difficulty.circle_radius() as f64;
    let objects = build_difficulty_objects(&map.objects, radius, clock_rate);

    let aim_strain = process_skill(SkillKind::Aim, &objects).sqrt() * STAR_SCALING_FACTOR;
    let speed_strain = process_skill(SkillKind::Speed, &objects).sqrt() * STAR_SCALING_FACTOR;

    // The bonus term widens the rating when one skill dominates the other.
    let star_rating = aim_strain + speed_strain + (aim_strain - speed_strain).abs() / 2.0;

    debug!(
        "Difficulty: aim {:.3}, speed {:.3}, stars {:.3} (clock rate {:.2}).",
        aim_strain, speed_strain, star_rating, clock_rate
    );

    DifficultyAttributes {
        aim_strain,
        speed_strain,
        star_rating,
    }
}
