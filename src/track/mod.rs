//! Track capability and the data a container writer needs from a track.

pub mod ttml;

use serde::Serialize;

use crate::sample::{Sample, SubsampleLayout};

pub use ttml::TtmlTrack;

/// Handler type of subtitle tracks
pub const HANDLER_TYPE: &str = "subt";

/// Time units per second of subtitle tracks
pub const TIMESCALE: u32 = 30000;

/// Layer of subtitle tracks (in front of video)
pub const LAYER: u16 = 65535;

/// Track header metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    /// ISO 639-3 language code
    pub language: String,
    pub timescale: u32,
    pub layer: u16,
}

/// XML subtitle sample entry fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SampleDescription {
    pub namespaces: Vec<String>,
    pub schema_location: String,
    pub auxiliary_mime_types: Vec<String>,
}

impl SampleDescription {
    /// Namespace list as written into the sample entry
    pub fn namespace(&self) -> String {
        self.namespaces.join(",")
    }

    pub fn auxiliary_mime_types_joined(&self) -> String {
        self.auxiliary_mime_types.join(",")
    }
}

/// Subsample sizes of one sample, as stored in a subsample information table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubSampleEntry {
    pub sample_delta: u32,
    /// Empty for samples without embedded resources
    pub subsample_sizes: Vec<u64>,
}

/// Subsample information table, one entry per sample.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubSampleInformation {
    pub entries: Vec<SubSampleEntry>,
}

impl SubSampleInformation {
    /// Samples made of the document alone get an entry without a size breakdown.
    pub fn from_layouts(layouts: &[SubsampleLayout]) -> Self {
        let entries = layouts
            .iter()
            .map(|layout| SubSampleEntry {
                sample_delta: 1,
                subsample_sizes: if layout.has_resources() {
                    layout.segments().to_vec()
                } else {
                    Vec::new()
                },
            })
            .collect();
        Self { entries }
    }
}

/// Convert a millisecond duration to `timescale` units, truncating.
/// `None` if the result does not fit an `i64`.
pub fn scale_duration(raw_ms: i64, timescale: u32) -> Option<i64> {
    raw_ms.checked_mul(timescale as i64).map(|v| v / 1000)
}

/// What a container writer reads from any track, whatever its media type.
pub trait Track {
    fn name(&self) -> &str;

    /// Four-character handler type
    fn handler(&self) -> &str;

    fn sample_description(&self) -> &SampleDescription;

    fn samples(&self) -> &[Sample];

    fn subsample_information(&self) -> &SubSampleInformation;

    /// Per-sample durations in `track_metadata().timescale` units
    fn sample_durations(&self) -> Vec<i64>;

    fn track_metadata(&self) -> &TrackMetadata;
}
