//! Subtitle track built from a sequence of TTML documents, one sample each.

use std::collections::BTreeSet;

use super::{
    scale_duration, SampleDescription, SubSampleInformation, Track, TrackMetadata, HANDLER_TYPE,
    LAYER, TIMESCALE,
};
use crate::config::{NegativeDurationPolicy, TrackConfig};
use crate::document::TtmlDocument;
use crate::error::{Result, TtmlError};
use crate::language::LanguageValidator;
use crate::resource::{rewrite_images, ResourceFetcher};
use crate::sample::{assemble_sample, Sample, SubsampleLayout};
use crate::timing::latest_timestamp;

/// A TTML subtitle track.
///
/// Sample `i` holds document `i` (images rewritten and embedded) and lasts
/// from the previous document's latest end time to its own.
#[derive(Debug, Clone)]
pub struct TtmlTrack {
    name: String,
    metadata: TrackMetadata,
    description: SampleDescription,
    samples: Vec<Sample>,
    layouts: Vec<SubsampleLayout>,
    subsample_information: SubSampleInformation,
    /// Milliseconds
    durations: Vec<i64>,
    /// `TIMESCALE` units
    scaled_durations: Vec<i64>,
}

impl TtmlTrack {
    /// Build a track from `documents` in order.
    ///
    /// The input documents are not modified. Any error aborts the build.
    pub fn build(
        name: impl Into<String>,
        documents: &[TtmlDocument],
        config: &TrackConfig,
        fetcher: &dyn ResourceFetcher,
    ) -> Result<Self> {
        config.validate()?;
        let name = name.into();
        let first = documents.first().ok_or(TtmlError::NoDocuments)?;

        let mut languages = LanguageValidator::new();
        let mut mime_types: BTreeSet<String> = BTreeSet::new();
        let mut samples = Vec::with_capacity(documents.len());
        let mut layouts = Vec::with_capacity(documents.len());
        let mut durations = Vec::with_capacity(documents.len());
        let mut scaled_durations = Vec::with_capacity(documents.len());
        let mut start_time = 0i64;

        for (index, document) in documents.iter().enumerate() {
            languages.check(index, document)?;

            let latest = latest_timestamp(document)?;
            // A document without timing adds nothing to the timeline.
            let end_time = if latest == 0 { start_time } else { latest };
            let (duration, next_start) =
                advance_timeline(index, start_time, end_time, config.negative_duration)?;
            let scaled = scale_duration(duration, TIMESCALE).ok_or_else(|| {
                TtmlError::MalformedTimestamp(format!(
                    "duration of document {} ({}ms) is out of range for timescale {}",
                    index, duration, TIMESCALE
                ))
            })?;
            durations.push(duration);
            scaled_durations.push(scaled);
            start_time = next_start;

            let rewritten = rewrite_images(document, &config.urn_scheme)?;
            let (sample, layout) = assemble_sample(&rewritten, config.indent, fetcher)?;
            mime_types.extend(rewritten.mime_types().map(str::to_string));

            tracing::debug!(
                "Sample {}: duration={}ms, size={} bytes, resources={}",
                index,
                duration,
                sample.size(),
                rewritten.references.len()
            );
            samples.push(sample);
            layouts.push(layout);
        }

        let metadata = TrackMetadata {
            language: languages.iso3().unwrap_or_default().to_string(),
            timescale: TIMESCALE,
            layer: LAYER,
        };
        let description = SampleDescription {
            namespaces: first.declared_namespaces(),
            schema_location: String::new(),
            auxiliary_mime_types: mime_types.into_iter().collect(),
        };
        let subsample_information = SubSampleInformation::from_layouts(&layouts);

        tracing::info!(
            "Built TTML track '{}': {} samples, language={}, end={}ms",
            name,
            samples.len(),
            metadata.language,
            start_time
        );

        Ok(Self {
            name,
            metadata,
            description,
            samples,
            layouts,
            subsample_information,
            durations,
            scaled_durations,
        })
    }

    /// Sample durations in milliseconds, before scaling
    pub fn raw_durations(&self) -> &[i64] {
        &self.durations
    }

    pub fn subsample_layouts(&self) -> &[SubsampleLayout] {
        &self.layouts
    }
}

/// Duration of a document ending at `end_time` and the start time of the next.
fn advance_timeline(
    index: usize,
    start_time: i64,
    end_time: i64,
    policy: NegativeDurationPolicy,
) -> Result<(i64, i64)> {
    let span = end_time.checked_sub(start_time).ok_or_else(|| {
        TtmlError::MalformedTimestamp(format!(
            "document {} spans {}ms to {}ms, out of range",
            index, start_time, end_time
        ))
    })?;
    if span >= 0 {
        return Ok((span, end_time));
    }
    match policy {
        NegativeDurationPolicy::Reject => Err(TtmlError::NegativeDuration {
            document: index,
            start_ms: start_time,
            end_ms: end_time,
        }),
        NegativeDurationPolicy::Clamp => {
            tracing::warn!(
                "Document {} ends at {}ms, before track time {}ms; using zero duration",
                index,
                end_time,
                start_time
            );
            Ok((0, start_time))
        }
        NegativeDurationPolicy::Allow => Ok((span, end_time)),
    }
}

impl Track for TtmlTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn handler(&self) -> &str {
        HANDLER_TYPE
    }

    fn sample_description(&self) -> &SampleDescription {
        &self.description
    }

    fn samples(&self) -> &[Sample] {
        &self.samples
    }

    fn subsample_information(&self) -> &SubSampleInformation {
        &self.subsample_information
    }

    fn sample_durations(&self) -> Vec<i64> {
        self.scaled_durations.clone()
    }

    fn track_metadata(&self) -> &TrackMetadata {
        &self.metadata
    }
}
