use crate::config::{STRAIN_DECAY_WEIGHT, STRAIN_SECTION_MS};
use crate::difficulty::object::DifficultyObject;

const AIM_DECAY_BASE: f64 = 0.15;
const AIM_MULTIPLIER: f64 = 26.25;
const SPEED_DECAY_BASE: f64 = 0.3;
const SPEED_MULTIPLIER: f64 = 1400.0;

// Speed value breakpoints, in normalized distance units.
const SINGLE_SPACING: f64 = 125.0;
const STREAM_SPACING: f64 = 110.0;
const ALMOST_DIAMETER: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkillKind {
    Aim,
    Speed,
}

/// An exponentially-decaying strain accumulator with per-400ms peak
/// tracking. Peaks carry decayed strain across section boundaries instead of
/// resetting, so a sustained pattern reads as sustained.
#[derive(Debug)]
pub(crate) struct Skill {
    kind: SkillKind,
    decay_base: f64,
    multiplier: f64,
    current_strain: f64,
    current_peak: f64,
    peaks: Vec<f64>,
}

impl Skill {
    pub(crate) fn new(kind: SkillKind) -> Self {
        let (decay_base, multiplier) = match kind {
            SkillKind::Aim => (AIM_DECAY_BASE, AIM_MULTIPLIER),
            SkillKind::Speed => (SPEED_DECAY_BASE, SPEED_MULTIPLIER),
        };
        Self {
            kind,
            decay_base,
            multiplier,
            current_strain: 0.0,
            current_peak: 0.0,
            peaks: Vec::new(),
        }
    }

    fn decay(&self, delta_ms: f64) -> f64 {
        self.decay_base.powf(delta_ms / 1000.0)
    }

    fn strain_value(&self, object: &DifficultyObject) -> f64 {
        if object.is_spinner {
            return 0.0;
        }
        match self.kind {
            SkillKind::Aim => object.distance.powf(0.99),
            SkillKind::Speed => speed_value(object.distance) / object.delta_time,
        }
    }

    pub(crate) fn process(&mut self, object: &DifficultyObject) {
        self.current_strain *= self.decay(object.delta_time);
        self.current_strain += self.strain_value(object) * self.multiplier;
        self.current_peak = self.current_peak.max(self.current_strain);
    }

    /// Closes the current 400ms section and opens the next one at the strain
    /// level decayed from `last_object_time` to the new section's start.
    pub(crate) fn start_new_section(&mut self, section_start: f64, last_object_time: f64) {
        self.peaks.push(self.current_peak);
        self.current_peak = self.current_strain * self.decay(section_start - last_object_time);
    }

    pub(crate) fn finish(&mut self) {
        self.peaks.push(self.current_peak);
    }

    /// Descending peak sum weighted by 0.9^rank: consistent difficulty
    /// outweighs isolated spikes.
    pub(crate) fn difficulty_value(&self) -> f64 {
        let mut peaks = self.peaks.clone();
        peaks.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut total = 0.0;
        let mut weight = 1.0;
        for peak in peaks {
            total += peak * weight;
            weight *= STRAIN_DECAY_WEIGHT;
        }
        total
    }
}

/// Runs one skill over the whole object sequence, chopping it into fixed
/// sections as it goes.
pub(crate) fn process_skill(kind: SkillKind, objects: &[DifficultyObject]) -> f64 {
    let mut skill = Skill::new(kind);
    let Some(first) = objects.first() else {
        return 0.0;
    };

    let mut section_end =
        (first.start_time / STRAIN_SECTION_MS).floor() * STRAIN_SECTION_MS + STRAIN_SECTION_MS;
    let mut last_time = first.start_time;

    for object in objects {
        while object.start_time > section_end {
            skill.start_new_section(section_end, last_time);
            section_end += STRAIN_SECTION_MS;
        }
        skill.process(object);
        last_time = object.start_time;
    }
    skill.finish();
    skill.difficulty_value()
}

fn speed_value(distance: f64) -> f64 {
    if distance > SINGLE_SPACING {
        2.5
    } else if distance > STREAM_SPACING {
        1.6 + 0.9 * (distance - STREAM_SPACING) / (SINGLE_SPACING - STREAM_SPACING)
    } else if distance > ALMOST_DIAMETER {
        1.2 + 0.4 * (distance - ALMOST_DIAMETER) / (STREAM_SPACING - ALMOST_DIAMETER)
    } else if distance > ALMOST_DIAMETER / 2.0 {
        0.95 + 0.25 * (distance - ALMOST_DIAMETER / 2.0) / (ALMOST_DIAMETER / 2.0)
    } else {
        0.95
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(start_time: f64, delta_time: f64, distance: f64) -> DifficultyObject {
        DifficultyObject {
            start_time,
            delta_time,
            distance,
            is_spinner: false,
        }
    }

    #[test]
    fn speed_value_is_piecewise_monotonic() {
        let samples = [0.0, 40.0, 60.0, 95.0, 115.0, 130.0, 500.0];
        let mut last = 0.0;
        for d in samples {
            let v = speed_value(d);
            assert!(v >= last, "speed value dipped at distance {}", d);
            last = v;
        }
        assert!((speed_value(500.0) - 2.5).abs() < 1e-9);
        assert!((speed_value(10.0) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn strain_decays_between_objects() {
        let mut skill = Skill::new(SkillKind::Aim);
        skill.process(&object(0.0, 40.0, 100.0));
        let first = skill.current_strain;
        skill.process(&object(2000.0, 2000.0, 0.0));
        assert!(skill.current_strain < first * 0.05);
    }

    #[test]
    fn spinners_add_no_strain() {
        let mut skill = Skill::new(SkillKind::Speed);
        skill.process(&DifficultyObject {
            start_time: 0.0,
            delta_time: 40.0,
            distance: 0.0,
            is_spinner: true,
        });
        assert!(skill.current_strain.abs() < 1e-12);
    }

    #[test]
    fn section_carryover_reflects_decay_not_reset() {
        let mut skill = Skill::new(SkillKind::Aim);
        skill.process(&object(100.0, 40.0, 100.0));
        let strain = skill.current_strain;
        skill.start_new_section(400.0, 100.0);
        // New section opens at the decayed strain, not at zero.
        assert!(skill.current_peak > 0.0);
        assert!(skill.current_peak < strain);
    }

    #[test]
    fn peak_weighting_prefers_consistency() {
        let mut consistent = Skill::new(SkillKind::Aim);
        consistent.peaks = vec![100.0, 100.0, 100.0];
        let mut spiky = Skill::new(SkillKind::Aim);
        spiky.peaks = vec![150.0, 10.0, 10.0];
        assert!(consistent.difficulty_value() > spiky.difficulty_value());
    }
}
