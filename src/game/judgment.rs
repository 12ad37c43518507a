use crate::config::COMBO_BONUS_DIVISOR;
use crate::parsing::beatmap::Difficulty;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum JudgeTier {
    Miss,
    Meh,
    Good,
    Perfect,
}

impl JudgeTier {
    pub fn value(self) -> u32 {
        match self {
            JudgeTier::Perfect => 300,
            JudgeTier::Good => 100,
            JudgeTier::Meh => 50,
            JudgeTier::Miss => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        self != JudgeTier::Miss
    }
}

/// OD-derived hit windows in ms. `meh` doubles as the miss horizon: a press
/// lands a tier strictly inside it, and a pending object auto-misses once
/// the clock reaches it.
#[derive(Debug, Clone, Copy)]
pub struct HitWindows {
    pub perfect: f64,
    pub good: f64,
    pub meh: f64,
}

impl HitWindows {
    pub fn from_overall_difficulty(od: f32) -> Self {
        let od = od as f64;
        Self {
            perfect: 79.5 - 6.0 * od,
            good: 139.5 - 8.0 * od,
            meh: 199.5 - 10.0 * od,
        }
    }

    pub fn miss_horizon(&self) -> f64 {
        self.meh
    }

    /// Tier for an absolute timing error. All boundaries are exclusive; an
    /// error at exactly the meh window is already a miss.
    pub fn tier_for(&self, abs_error: f64) -> JudgeTier {
        if abs_error < self.perfect {
            JudgeTier::Perfect
        } else if abs_error < self.good {
            JudgeTier::Good
        } else if abs_error < self.meh {
            JudgeTier::Meh
        } else {
            JudgeTier::Miss
        }
    }
}

/// Step function of CS+HP+OD feeding the combo bonus term.
pub fn difficulty_multiplier(difficulty: &Difficulty) -> u32 {
    let sum = difficulty.circle_size + difficulty.hp_drain + difficulty.overall_difficulty;
    if sum <= 5.0 {
        2
    } else if sum <= 12.0 {
        3
    } else if sum <= 17.0 {
        4
    } else if sum <= 24.0 {
        5
    } else {
        6
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum JudgmentEventKind {
    Circle,
    SliderHead,
    SliderTick,
    SliderRepeat,
    Slider,
    Spinner,
}

/// One judged moment, streamed to the HUD and hit-sound layers.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct JudgmentEvent {
    pub object_id: usize,
    pub kind: JudgmentEventKind,
    pub tier: JudgeTier,
    pub time_delta_ms: f64,
}

/// Running score/combo/accuracy state. Mutated incrementally as judgments
/// arrive and never rolled back: a miss zeroes the combo but leaves score
/// and the accuracy history intact.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub total_weighted: u64,
    pub total_count: u32,
}

impl ScoreState {
    pub fn accuracy(&self) -> f64 {
        if self.total_count == 0 {
            1.0
        } else {
            self.total_weighted as f64 / (self.total_count as f64 * 300.0)
        }
    }

    fn bump_combo(&mut self) {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    fn combo_bonus(&self, base: u32, difficulty_multiplier: u32, mod_multiplier: f64) -> u64 {
        let bonus = base as f64 * self.combo.saturating_sub(1) as f64
            * difficulty_multiplier as f64
            * mod_multiplier
            / COMBO_BONUS_DIVISOR;
        bonus.max(0.0) as u64
    }

    /// A tier-valued judgment: the combo moves first (incremented on hits,
    /// zeroed on a miss), then the score lands with the bonus for the combo
    /// this hit just reached.
    pub fn apply_tier(&mut self, tier: JudgeTier, difficulty_multiplier: u32, mod_multiplier: f64) {
        if tier.is_hit() {
            self.bump_combo();
        } else {
            self.combo = 0;
        }
        self.record_tier(tier, difficulty_multiplier, mod_multiplier);
    }

    /// A slider's aggregate judgment. The traversal already moved the combo
    /// through the head/tick/end contributions, so this only scores, counts
    /// accuracy, and breaks the combo on a full miss.
    pub fn apply_slider_aggregate(
        &mut self,
        tier: JudgeTier,
        difficulty_multiplier: u32,
        mod_multiplier: f64,
    ) {
        if !tier.is_hit() {
            self.combo = 0;
        }
        self.record_tier(tier, difficulty_multiplier, mod_multiplier);
    }

    fn record_tier(&mut self, tier: JudgeTier, difficulty_multiplier: u32, mod_multiplier: f64) {
        let base = tier.value();
        self.score += base as u64 + self.combo_bonus(base, difficulty_multiplier, mod_multiplier);
        self.total_weighted += base as u64;
        self.total_count += 1;
    }

    /// Combo-independent contribution (slider ticks, repeats, heads): flat
    /// score, combo advances, accuracy untouched.
    pub fn apply_combo_independent(&mut self, value: u32) {
        self.score += value as u64;
        self.bump_combo();
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }
}
