use crate::game::processing::HitSoundInfo;
use log::warn;
use serde::Serialize;

// Hit-sound addition bits carried on every object.
pub const SOUND_WHISTLE: u8 = 2;
pub const SOUND_FINISH: u8 = 4;
pub const SOUND_CLAP: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleSet {
    Normal,
    Soft,
    Drum,
}

impl SampleSet {
    /// Maps the source format's id. 0 means "inherit" and resolves to `None`
    /// so the caller can fall back to the timing-point set.
    pub fn from_id(id: u8) -> Option<SampleSet> {
        match id {
            1 => Some(SampleSet::Normal),
            2 => Some(SampleSet::Soft),
            3 => Some(SampleSet::Drum),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            SampleSet::Normal => 1,
            SampleSet::Soft => 2,
            SampleSet::Drum => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SampleSet::Normal => "normal",
            SampleSet::Soft => "soft",
            SampleSet::Drum => "drum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitSoundKind {
    Normal,
    Whistle,
    Finish,
    Clap,
}

impl HitSoundKind {
    pub fn name(self) -> &'static str {
        match self {
            HitSoundKind::Normal => "hitnormal",
            HitSoundKind::Whistle => "hitwhistle",
            HitSoundKind::Finish => "hitfinish",
            HitSoundKind::Clap => "hitclap",
        }
    }
}

/// Opaque handle to a loaded, playable sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleHandle(pub u32);

/// Resolves a sample-set name + hitsound kind to a playable sample. Provided
/// by the audio/asset collaborator; the core never touches sample data.
pub trait SampleBank {
    fn resolve(&self, set: SampleSet, kind: HitSoundKind) -> Option<SampleHandle>;
}

/// Expands an object's resolved hit-sound info into the samples to trigger.
/// The normal hit always plays from the object's sample set; addition bits
/// play from the addition set. Missing samples are skipped with a warning;
/// the hit itself is unaffected.
pub fn hit_sounds_for(bank: &dyn SampleBank, info: &HitSoundInfo) -> Vec<SampleHandle> {
    let mut handles = Vec::with_capacity(4);
    let mut resolve = |set: SampleSet, kind: HitSoundKind| match bank.resolve(set, kind) {
        Some(handle) => handles.push(handle),
        None => warn!("Missing sample {}-{}; skipping.", set.name(), kind.name()),
    };

    resolve(info.sample_set, HitSoundKind::Normal);
    if info.sounds & SOUND_WHISTLE != 0 {
        resolve(info.addition_set, HitSoundKind::Whistle);
    }
    if info.sounds & SOUND_FINISH != 0 {
        resolve(info.addition_set, HitSoundKind::Finish);
    }
    if info.sounds & SOUND_CLAP != 0 {
        resolve(info.addition_set, HitSoundKind::Clap);
    }
    handles
}
