//! TTML subtitle tracks for MP4 authoring
//!
//! Turns an ordered list of TTML documents into the samples, subsample
//! sizes, durations and sample entry fields of an XML subtitle track.
//! Writing the boxes themselves is left to the container writer.

pub mod config;
pub mod document;
pub mod error;
pub mod language;
pub mod resource;
pub mod sample;
pub mod timing;
pub mod track;

#[cfg(test)]
pub(crate) mod tests;

pub use config::{NegativeDurationPolicy, TrackConfig};
pub use document::TtmlDocument;
pub use error::{Result, TtmlError};
pub use resource::{DefaultFetcher, ResourceFetcher};
pub use sample::{Sample, SubsampleLayout};
pub use track::{
    SampleDescription, SubSampleEntry, SubSampleInformation, Track, TrackMetadata, TtmlTrack,
    HANDLER_TYPE, LAYER, TIMESCALE,
};
