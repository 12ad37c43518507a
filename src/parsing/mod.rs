pub mod beatmap;
pub mod curve;
