// Playfield
pub const PLAYFIELD_WIDTH: f32 = 512.0;
pub const PLAYFIELD_HEIGHT: f32 = 384.0;
pub const PLAYFIELD_CENTER_X: f32 = PLAYFIELD_WIDTH / 2.0;
pub const PLAYFIELD_CENTER_Y: f32 = PLAYFIELD_HEIGHT / 2.0;

// Supported beatmap format version. Older/newer versions parse with a warning.
pub const BEATMAP_FORMAT_VERSION: i32 = 14;

// Curve flattening
pub const TRACE_SPACING: f64 = 3.0;
pub const TRACE_TOLERANCE: f64 = 0.25;
pub const CURVE_POINT_DISTANCE: f64 = 3.0;

// Stacking
pub const STACK_DISTANCE: f32 = 3.0;
pub const STACK_OFFSET_PX: f32 = 4.0;
pub const DEFAULT_STACK_LENIENCY: f32 = 0.7;

// Timing fallbacks
pub const DEFAULT_BEAT_DURATION_MS: f64 = 500.0;
pub const DEFAULT_SAMPLE_VOLUME: u8 = 100;
pub const VELOCITY_PERCENT_MIN: f64 = 10.0;
pub const VELOCITY_PERCENT_MAX: f64 = 1000.0;

// Strain model
pub const STRAIN_SECTION_MS: f64 = 400.0;
pub const STRAIN_DECAY_WEIGHT: f64 = 0.9;
pub const STAR_SCALING_FACTOR: f64 = 0.0675;
pub const MIN_DELTA_TIME_MS: f64 = 40.0;
pub const NORMALIZED_RADIUS: f64 = 52.0;

// Scoring
pub const SCORE_TICK: u32 = 10;
pub const SCORE_REPEAT: u32 = 30;
pub const SCORE_SLIDER_HEAD: u32 = 30;
pub const COMBO_BONUS_DIVISOR: f64 = 25.0;

// Judgment engine
pub const SPINNER_MAX_TURN_PER_MS: f64 = 0.05;
pub const SEEK_DISCONTINUITY_MS: f64 = 1000.0;
