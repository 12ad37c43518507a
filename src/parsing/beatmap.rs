use crate::config::{BEATMAP_FORMAT_VERSION, DEFAULT_SAMPLE_VOLUME, DEFAULT_STACK_LENIENCY};
use crate::core::samples::SampleSet;
use cgmath::Vector2;
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str;

pub type Pos = Vector2<f32>;

// Hit object type bitmask.
const TYPE_CIRCLE: u32 = 1;
const TYPE_SLIDER: u32 = 2;
const TYPE_NEW_COMBO: u32 = 4;
const TYPE_SPINNER: u32 = 8;
const TYPE_COLOUR_SKIP_SHIFT: u32 = 4;
const TYPE_COLOUR_SKIP_MASK: u32 = 0x7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Linear,
    Bezier,
    PassThrough,
}

#[derive(Debug, Clone)]
pub struct PathSection {
    pub kind: PathKind,
    pub points: Vec<Pos>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboFlag {
    pub new_combo: bool,
    pub colour_skip: u32,
}

#[derive(Debug, Clone)]
pub enum HitObjectKind {
    Circle,
    Slider {
        sections: Vec<PathSection>,
        repeat_count: u32,
        pixel_length: f64,
    },
    Spinner {
        end_time: f64,
    },
}

#[derive(Debug, Clone)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    /// Bitmask: bit 1 whistle, bit 2 finish, bit 3 clap. Normal always plays.
    pub hit_sound: u8,
    pub combo: ComboFlag,
    /// 0 = inherit from the active timing point.
    pub sample_set: u8,
    /// 0 = inherit from the resolved sample set.
    pub addition_set: u8,
    pub kind: HitObjectKind,
}

impl HitObject {
    pub fn is_circle(&self) -> bool {
        matches!(self.kind, HitObjectKind::Circle)
    }

    pub fn is_slider(&self) -> bool {
        matches!(self.kind, HitObjectKind::Slider { .. })
    }

    pub fn is_spinner(&self) -> bool {
        matches!(self.kind, HitObjectKind::Spinner { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimingPoint {
    pub offset: f64,
    /// Positive: beat duration in ms (uninherited). Negative: inherited, the
    /// magnitude is a slider-velocity percentage.
    pub ms_per_beat: f64,
    pub meter: u32,
    pub sample_set: SampleSet,
    pub sample_volume: u8,
    pub kiai: bool,
}

impl TimingPoint {
    pub fn is_inherited(&self) -> bool {
        self.ms_per_beat < 0.0
    }

    pub fn bpm(&self) -> f64 {
        if self.ms_per_beat > 0.0 {
            60_000.0 / self.ms_per_beat
        } else {
            0.0
        }
    }
}

impl fmt::Display for TimingPoint {
    /// Writes the point back in the source line format. Integral offsets are
    /// emitted without a fractional part so a parse/serialize round trip is
    /// byte-stable for legacy maps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset.fract() == 0.0 {
            write!(f, "{}", self.offset as i64)?;
        } else {
            write!(f, "{}", self.offset)?;
        }
        write!(
            f,
            ",{},{},{},0,{},{},{}",
            self.ms_per_beat,
            self.meter,
            self.sample_set.id(),
            self.sample_volume,
            u8::from(!self.is_inherited()),
            u8::from(self.kiai),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fallback palette used when a map carries no [Colours] section.
pub const DEFAULT_COMBO_COLOURS: [ComboColour; 4] = [
    ComboColour { r: 255, g: 192, b: 0 },
    ComboColour { r: 0, g: 202, b: 0 },
    ComboColour { r: 18, g: 124, b: 255 },
    ComboColour { r: 242, g: 24, b: 57 },
];

#[derive(Debug, Clone, Copy)]
pub struct BreakPeriod {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Difficulty {
    pub circle_size: f32,
    pub hp_drain: f32,
    pub overall_difficulty: f32,
    pub approach_rate: f32,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,
}

impl Difficulty {
    pub fn circle_radius(&self) -> f32 {
        32.0 * (1.0 - 0.7 * (self.circle_size - 5.0) / 5.0)
    }

    /// Time in ms an object is on screen before its start time.
    pub fn preempt_ms(&self) -> f64 {
        let ar = self.approach_rate as f64;
        if ar <= 5.0 {
            1200.0 + 600.0 * (5.0 - ar) / 5.0
        } else {
            1200.0 - 750.0 * (ar - 5.0) / 5.0
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            circle_size: 5.0,
            hp_drain: 5.0,
            overall_difficulty: 5.0,
            approach_rate: 5.0,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Beatmap {
    pub format_version: i32,
    pub title: String,
    pub artist: String,
    pub creator: String,
    pub version: String,
    pub audio_filename: String,
    pub background_filename: Option<String>,
    pub stack_leniency: f32,
    pub difficulty: Difficulty,
    pub timing_points: Vec<TimingPoint>,
    pub hit_objects: Vec<HitObject>,
    pub combo_colours: Vec<ComboColour>,
    pub breaks: Vec<BreakPeriod>,
}

pub enum ParseError {
    Io(io::Error),
    /// No section header could be located; the input is not a beatmap.
    NoSections,
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "IO Error: {}", e),
            ParseError::NoSections => write!(f, "No section headers found in beatmap"),
        }
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    General,
    Metadata,
    Difficulty,
    Events,
    TimingPoints,
    Colours,
    HitObjects,
    Unknown,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name {
            "General" => Section::General,
            "Metadata" => Section::Metadata,
            "Difficulty" => Section::Difficulty,
            "Events" => Section::Events,
            "TimingPoints" => Section::TimingPoints,
            "Colours" => Section::Colours,
            "HitObjects" => Section::HitObjects,
            _ => Section::Unknown,
        }
    }
}

fn clean_tag(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() && *c != '\u{200b}')
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn parse_or_warn<T: str::FromStr>(value: &str, what: &str, fallback: T) -> T {
    match value.parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Malformed {} value '{}', using default.", what, value);
            fallback
        }
    }
}

fn parse_timing_point(line: &str) -> Option<TimingPoint> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        return None;
    }

    let offset = parts[0].trim().parse::<f64>().ok()?;
    let ms_per_beat = parts[1].trim().parse::<f64>().ok()?;
    if !offset.is_finite() || !ms_per_beat.is_finite() || ms_per_beat == 0.0 {
        return None;
    }

    let meter = parts
        .get(2)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|m| *m > 0)
        .unwrap_or(4);
    let sample_set = parts
        .get(3)
        .and_then(|s| s.trim().parse::<u8>().ok())
        .and_then(SampleSet::from_id)
        .unwrap_or(SampleSet::Normal);
    let sample_volume = parts
        .get(5)
        .and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(DEFAULT_SAMPLE_VOLUME);
    let effects = parts
        .get(7)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0);

    Some(TimingPoint {
        offset,
        ms_per_beat,
        meter,
        sample_set,
        sample_volume,
        kiai: effects & 1 != 0,
    })
}

/// Splits bezier control points into sections at duplicated consecutive
/// points, the format's section separator.
fn split_bezier_sections(points: &[Pos]) -> Vec<PathSection> {
    let mut sections = Vec::new();
    let mut current: Vec<Pos> = vec![points[0]];

    for window in points.windows(2) {
        if window[1] == window[0] && current.len() > 1 {
            sections.push(PathSection {
                kind: PathKind::Bezier,
                points: std::mem::replace(&mut current, vec![window[1]]),
            });
        } else {
            current.push(window[1]);
        }
    }
    if current.len() > 1 {
        sections.push(PathSection {
            kind: PathKind::Bezier,
            points: current,
        });
    }
    sections
}

fn parse_slider_path(head: Pos, definition: &str) -> Option<Vec<PathSection>> {
    let mut parts = definition.split('|');
    let kind_token = parts.next()?.trim();

    let mut points = vec![head];
    for pair in parts {
        let Some((x, y)) = pair.split_once(':') else {
            warn!("Malformed slider path point '{}', skipping.", pair);
            continue;
        };
        let (Ok(x), Ok(y)) = (x.trim().parse::<f32>(), y.trim().parse::<f32>()) else {
            warn!("Malformed slider path point '{}', skipping.", pair);
            continue;
        };
        points.push(Vector2::new(x, y));
    }
    if points.len() < 2 {
        return None;
    }

    let sections = match kind_token {
        "L" => points
            .windows(2)
            .map(|pair| PathSection {
                kind: PathKind::Linear,
                points: pair.to_vec(),
            })
            .collect(),
        "P" if points.len() == 3 => vec![PathSection {
            kind: PathKind::PassThrough,
            points,
        }],
        "B" | "P" => split_bezier_sections(&points),
        other => {
            // Legacy catmull ('C') and anything unrecognized degrade to bezier.
            warn!("Unsupported slider path type '{}', treating as bezier.", other);
            split_bezier_sections(&points)
        }
    };

    if sections.is_empty() { None } else { Some(sections) }
}

fn parse_sample_override(column: Option<&&str>) -> (u8, u8) {
    let Some(column) = column else {
        return (0, 0);
    };
    let mut fields = column.split(':');
    let sample_set = fields
        .next()
        .and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(0);
    let addition_set = fields
        .next()
        .and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(0);
    (sample_set, addition_set)
}

fn parse_hit_object(line: &str) -> Option<HitObject> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 5 {
        return None;
    }

    let x = parts[0].trim().parse::<f32>().ok()?;
    let y = parts[1].trim().parse::<f32>().ok()?;
    let start_time = parts[2].trim().parse::<f64>().ok()?;
    let type_bits = parts[3].trim().parse::<u32>().ok()?;
    let hit_sound = parts[4].trim().parse::<u8>().unwrap_or(0);

    let combo = ComboFlag {
        new_combo: type_bits & TYPE_NEW_COMBO != 0,
        colour_skip: (type_bits >> TYPE_COLOUR_SKIP_SHIFT) & TYPE_COLOUR_SKIP_MASK,
    };
    let pos = Vector2::new(x, y);

    let (kind, sample_column) = if type_bits & TYPE_SLIDER != 0 {
        let sections = parse_slider_path(pos, parts.get(5)?)?;
        let repeat_count = parts
            .get(6)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        let pixel_length = parts
            .get(7)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|len| len.is_finite() && *len > 0.0)
            .unwrap_or(100.0);
        (
            HitObjectKind::Slider {
                sections,
                repeat_count,
                pixel_length,
            },
            parts.get(10),
        )
    } else if type_bits & TYPE_SPINNER != 0 {
        let end_time = parts
            .get(5)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(start_time)
            .max(start_time);
        (HitObjectKind::Spinner { end_time }, parts.get(6))
    } else if type_bits & TYPE_CIRCLE != 0 {
        (HitObjectKind::Circle, parts.get(5))
    } else {
        return None;
    };

    let (sample_set, addition_set) = parse_sample_override(sample_column);

    Some(HitObject {
        pos,
        start_time,
        hit_sound,
        combo,
        sample_set,
        addition_set,
        kind,
    })
}

fn parse_colour(value: &str) -> Option<ComboColour> {
    let mut channels = value.split(',');
    let r = channels.next()?.trim().parse::<u8>().ok()?;
    let g = channels.next()?.trim().parse::<u8>().ok()?;
    let b = channels.next()?.trim().parse::<u8>().ok()?;
    Some(ComboColour { r, g, b })
}

pub fn parse_beatmap_str(text: &str) -> Result<Beatmap, ParseError> {
    let mut map = Beatmap {
        format_version: BEATMAP_FORMAT_VERSION,
        title: String::new(),
        artist: String::new(),
        creator: String::new(),
        version: String::new(),
        audio_filename: String::new(),
        background_filename: None,
        stack_leniency: DEFAULT_STACK_LENIENCY,
        difficulty: Difficulty::default(),
        timing_points: Vec::new(),
        hit_objects: Vec::new(),
        combo_colours: Vec::new(),
        breaks: Vec::new(),
    };

    let mut section = None;
    let mut approach_rate_seen = false;

    for line_untrimmed in text.lines() {
        let line = line_untrimmed.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if section.is_none() && line.starts_with("osu file format v") {
            let version = line
                .trim_start_matches("osu file format v")
                .trim()
                .parse::<i32>()
                .unwrap_or(BEATMAP_FORMAT_VERSION);
            if version != BEATMAP_FORMAT_VERSION {
                warn!(
                    "Beatmap declares format v{}, expected v{}; parsing anyway.",
                    version, BEATMAP_FORMAT_VERSION
                );
            }
            map.format_version = version;
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = Some(Section::from_header(&line[1..line.len() - 1]));
            continue;
        }

        let Some(current) = section else {
            continue;
        };

        match current {
            Section::General => {
                if let Some((key, value)) = parse_key_value(line) {
                    match key {
                        "AudioFilename" => map.audio_filename = clean_tag(value),
                        "StackLeniency" => {
                            map.stack_leniency =
                                parse_or_warn(value, "StackLeniency", DEFAULT_STACK_LENIENCY)
                        }
                        _ => {}
                    }
                }
            }
            Section::Metadata => {
                if let Some((key, value)) = parse_key_value(line) {
                    match key {
                        "Title" => map.title = clean_tag(value),
                        "Artist" => map.artist = clean_tag(value),
                        "Creator" => map.creator = clean_tag(value),
                        "Version" => map.version = clean_tag(value),
                        _ => {}
                    }
                }
            }
            Section::Difficulty => {
                if let Some((key, value)) = parse_key_value(line) {
                    let d = &mut map.difficulty;
                    match key {
                        "CircleSize" => d.circle_size = parse_or_warn(value, key, 5.0),
                        "HPDrainRate" => d.hp_drain = parse_or_warn(value, key, 5.0),
                        "OverallDifficulty" => {
                            d.overall_difficulty = parse_or_warn(value, key, 5.0)
                        }
                        "ApproachRate" => {
                            d.approach_rate = parse_or_warn(value, key, 5.0);
                            approach_rate_seen = true;
                        }
                        "SliderMultiplier" => {
                            d.slider_multiplier = parse_or_warn(value, key, 1.4)
                        }
                        "SliderTickRate" => d.slider_tick_rate = parse_or_warn(value, key, 1.0),
                        _ => {}
                    }
                }
            }
            Section::Events => {
                let parts: Vec<&str> = line.split(',').collect();
                match parts.first().map(|s| s.trim()) {
                    Some("0") => {
                        if map.background_filename.is_none() {
                            map.background_filename = parts
                                .get(2)
                                .map(|name| name.trim().trim_matches('"').to_string())
                                .filter(|name| !name.is_empty());
                        }
                    }
                    Some("2") | Some("Break") => {
                        if let (Some(Ok(start)), Some(Ok(end))) = (
                            parts.get(1).map(|s| s.trim().parse::<f64>()),
                            parts.get(2).map(|s| s.trim().parse::<f64>()),
                        ) {
                            if end > start {
                                map.breaks.push(BreakPeriod { start, end });
                            }
                        }
                    }
                    _ => {}
                }
            }
            Section::TimingPoints => match parse_timing_point(line) {
                Some(point) => map.timing_points.push(point),
                None => warn!("Skipping malformed timing point line '{}'.", line),
            },
            Section::Colours => {
                if let Some((key, value)) = parse_key_value(line) {
                    if key.starts_with("Combo") {
                        match parse_colour(value) {
                            Some(colour) => map.combo_colours.push(colour),
                            None => warn!("Skipping malformed colour line '{}'.", line),
                        }
                    }
                }
            }
            Section::HitObjects => match parse_hit_object(line) {
                Some(object) => map.hit_objects.push(object),
                None => warn!("Skipping malformed hit object line '{}'.", line),
            },
            Section::Unknown => {}
        }
    }

    if section.is_none() {
        return Err(ParseError::NoSections);
    }

    if !approach_rate_seen {
        // Pre-AR format compatibility: AR defaults to OD.
        map.difficulty.approach_rate = map.difficulty.overall_difficulty;
    }
    if map.combo_colours.is_empty() {
        map.combo_colours = DEFAULT_COMBO_COLOURS.to_vec();
    }

    map.timing_points
        .sort_by(|a, b| a.offset.partial_cmp(&b.offset).unwrap_or(std::cmp::Ordering::Equal));
    map.hit_objects.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        "Parsed beatmap '{}' [{}] (format v{}): {} objects, {} timing points.",
        map.title,
        map.version,
        map.format_version,
        map.hit_objects.len(),
        map.timing_points.len()
    );

    Ok(map)
}

pub fn parse_beatmap_file(path: &Path) -> Result<Beatmap, ParseError> {
    info!("Parsing beatmap: {:?}", path);
    let bytes = fs::read(path)?;
    match str::from_utf8(&bytes) {
        Ok(text) => parse_beatmap_str(text),
        Err(e) => {
            warn!("UTF-8 decoding failed for {:?}, trying latin1: {}", path, e);
            let latin1: String = bytes.iter().map(|&b| b as char).collect();
            parse_beatmap_str(&latin1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_MAP: &str = "\
osu file format v14

[General]
AudioFilename: audio.mp3
StackLeniency: 0.5

[Metadata]
Title:Test Song
Artist:Test Artist
Creator:mapper
Version:Insane

[Difficulty]
HPDrainRate:6
CircleSize:4
OverallDifficulty:7
SliderMultiplier:1.8
SliderTickRate:2

[Events]
0,0,\"bg.jpg\",0,0
2,4000,6000

[TimingPoints]
500,400,4,2,0,80,1,0
4500,-50,4,2,0,60,0,1

[HitObjects]
256,192,1000,5,0,0:0:0:0:
100,100,1500,1,8,2:1:0:0:
50,60,2000,2,0,B|150:60|150:160,2,200,0|0|0,0:0|0:0|0:0,0:0:0:0:
256,192,3000,12,0,5000,0:0:0:0:
";

    #[test]
    fn parses_sections_and_defaults_ar_to_od() {
        let map = parse_beatmap_str(MINIMAL_MAP).unwrap();
        assert_eq!(map.title, "Test Song");
        assert_eq!(map.creator, "mapper");
        assert_eq!(map.audio_filename, "audio.mp3");
        assert_eq!(map.background_filename.as_deref(), Some("bg.jpg"));
        assert!((map.stack_leniency - 0.5).abs() < 1e-6);
        // No ApproachRate line: falls back to OD.
        assert!((map.difficulty.approach_rate - 7.0).abs() < 1e-6);
        assert_eq!(map.hit_objects.len(), 4);
        assert_eq!(map.timing_points.len(), 2);
        assert_eq!(map.breaks.len(), 1);
        // No [Colours] section: canonical palette substituted.
        assert_eq!(map.combo_colours.len(), 4);
        assert_eq!(map.combo_colours[0], DEFAULT_COMBO_COLOURS[0]);
    }

    #[test]
    fn decodes_type_bitmask() {
        let map = parse_beatmap_str(MINIMAL_MAP).unwrap();
        let first = &map.hit_objects[0];
        assert!(first.is_circle());
        assert!(first.combo.new_combo);
        assert_eq!(first.combo.colour_skip, 0);

        let slider = &map.hit_objects[2];
        assert!(slider.is_slider());
        let HitObjectKind::Slider {
            repeat_count,
            pixel_length,
            ref sections,
        } = slider.kind
        else {
            panic!("expected slider");
        };
        assert_eq!(repeat_count, 2);
        assert!((pixel_length - 200.0).abs() < 1e-9);
        assert!(!sections.is_empty());

        let spinner = &map.hit_objects[3];
        let HitObjectKind::Spinner { end_time } = spinner.kind else {
            panic!("expected spinner");
        };
        assert!((end_time - 5000.0).abs() < 1e-9);
        assert!(spinner.combo.new_combo);
    }

    #[test]
    fn colour_skip_from_high_nibble() {
        let object = parse_hit_object("0,0,100,52,0").unwrap();
        // 52 = circle | new combo | skip 3.
        assert!(object.combo.new_combo);
        assert_eq!(object.combo.colour_skip, 3);
    }

    #[test]
    fn missing_sample_columns_inherit() {
        let object = parse_hit_object("100,100,500,1,0").unwrap();
        assert_eq!(object.sample_set, 0);
        assert_eq!(object.addition_set, 0);

        let object = parse_hit_object("100,100,500,1,0,3:2:0:0:").unwrap();
        assert_eq!(object.sample_set, 3);
        assert_eq!(object.addition_set, 2);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "[HitObjects]\ngarbage line\n256,192,1000,1,0\nalso,not,valid\n";
        let map = parse_beatmap_str(text).unwrap();
        assert_eq!(map.hit_objects.len(), 1);
    }

    #[test]
    fn input_without_sections_is_fatal() {
        assert!(matches!(
            parse_beatmap_str("just some text\nno sections here\n"),
            Err(ParseError::NoSections)
        ));
    }

    #[test]
    fn timing_point_round_trip() {
        let map = parse_beatmap_str(MINIMAL_MAP).unwrap();
        for point in &map.timing_points {
            let line = point.to_string();
            let reparsed = parse_timing_point(&line).unwrap();
            assert_eq!(reparsed.offset, point.offset);
            assert!((reparsed.bpm() - point.bpm()).abs() < 1e-6);
            assert_eq!(reparsed.ms_per_beat, point.ms_per_beat);
            assert_eq!(reparsed.kiai, point.kiai);
        }
    }

    #[test]
    fn bezier_sections_split_on_duplicate_points() {
        let sections =
            parse_slider_path(Vector2::new(0.0, 0.0), "B|100:0|100:0|100:100").unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].points.len(), 2);
        assert_eq!(sections[1].points.len(), 2);
    }

    #[test]
    fn perfect_curve_with_extra_points_degrades_to_bezier() {
        let sections =
            parse_slider_path(Vector2::new(0.0, 0.0), "P|50:50|100:0|150:50").unwrap();
        assert!(sections.iter().all(|s| s.kind == PathKind::Bezier));

        let sections = parse_slider_path(Vector2::new(0.0, 0.0), "P|50:50|100:0").unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, PathKind::PassThrough);
    }
}
