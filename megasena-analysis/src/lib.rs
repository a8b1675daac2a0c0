pub mod cooccurrence;
pub mod cycles;
pub mod engine;
pub mod frequency;
pub mod generators;
pub mod patterns;
pub mod succession;
