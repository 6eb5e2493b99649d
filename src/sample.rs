//! Sample payloads and their subsample layout.

use bytes::{Bytes, BytesMut};
use std::io::Write;

use crate::error::Result;
use crate::resource::{resolve_reference, ResourceFetcher, RewrittenDocument};

/// One sample: the serialized document followed by its resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    data: Bytes,
}

impl Sample {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)
    }
}

/// Segment sizes of one sample: the document first, then every resource in
/// reference order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubsampleLayout {
    segments: Vec<u64>,
}

impl SubsampleLayout {
    pub fn new(document_size: u64) -> Self {
        Self {
            segments: vec![document_size],
        }
    }

    pub fn push_resource(&mut self, size: u64) {
        self.segments.push(size);
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn document_size(&self) -> u64 {
        self.segments.first().copied().unwrap_or(0)
    }

    pub fn resource_sizes(&self) -> &[u64] {
        self.segments.get(1..).unwrap_or(&[])
    }

    pub fn has_resources(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn total(&self) -> u64 {
        self.segments.iter().sum()
    }
}

/// Serialize the rewritten document and append every referenced resource.
///
/// Each distinct reference is resolved against the document's base URI and
/// fetched once. Any failure aborts the sample.
pub fn assemble_sample(
    rewritten: &RewrittenDocument,
    indent: usize,
    fetcher: &dyn ResourceFetcher,
) -> Result<(Sample, SubsampleLayout)> {
    let xml = rewritten.document.to_pretty_bytes(indent)?;
    let mut layout = SubsampleLayout::new(xml.len() as u64);
    let mut payload = BytesMut::from(&xml[..]);

    for reference in &rewritten.references {
        let location = resolve_reference(
            rewritten.document.base_uri.as_ref(),
            &reference.original_uri,
        )?;
        let data = fetcher.fetch(&location)?;
        tracing::debug!(
            "Embedding {} as {} ({} bytes)",
            location,
            reference.internal_id,
            data.len()
        );
        layout.push_resource(data.len() as u64);
        payload.extend_from_slice(&data);
    }

    Ok((Sample::new(payload.freeze()), layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TtmlDocument;
    use crate::error::TtmlError;
    use crate::resource::{rewrite_images, SMPTE_TT_NAMESPACE};
    use crate::tests::fixtures::MapFetcher;
    use url::Url;

    fn rewritten(body: &str, base: Option<&str>) -> RewrittenDocument {
        let doc = TtmlDocument::parse(
            &format!(
                r#"<tt xmlns:smpte="{}" xml:lang="en"><body>{}</body></tt>"#,
                SMPTE_TT_NAMESPACE, body
            ),
            base.map(|b| Url::parse(b).unwrap()),
        )
        .unwrap();
        rewrite_images(&doc, "ttml-track").unwrap()
    }

    #[test]
    fn test_document_only_sample() {
        let r = rewritten(r#"<p end="00:00:01">hi</p>"#, None);
        let (sample, layout) = assemble_sample(&r, 4, &MapFetcher::new()).unwrap();

        assert_eq!(sample.as_bytes(), &r.document.to_pretty_bytes(4).unwrap()[..]);
        assert_eq!(layout.segments(), &[sample.size()]);
        assert!(!layout.has_resources());
    }

    #[test]
    fn test_resources_appended_in_order() {
        let r = rewritten(
            r#"<div smpte:backgroundImage="b.png"/><div smpte:backgroundImage="img/a.jpg"/><div smpte:backgroundImage="b.png"/>"#,
            Some("http://example.com/subs/doc.xml"),
        );
        let fetcher = MapFetcher::new()
            .with("http://example.com/subs/b.png", b"BBBB")
            .with("http://example.com/subs/img/a.jpg", b"AA");

        let (sample, layout) = assemble_sample(&r, 4, &fetcher).unwrap();
        let xml_len = r.document.to_pretty_bytes(4).unwrap().len() as u64;

        assert_eq!(layout.segments(), &[xml_len, 4, 2]);
        assert_eq!(layout.total(), sample.size());
        assert!(sample.as_bytes().ends_with(b"BBBBAA"));
        assert_eq!(fetcher.fetch_count("http://example.com/subs/b.png"), 1);
    }

    #[test]
    fn test_missing_base_uri_fails() {
        let r = rewritten(r#"<div smpte:backgroundImage="b.png"/>"#, None);
        assert!(matches!(
            assemble_sample(&r, 4, &MapFetcher::new()),
            Err(TtmlError::ResourceResolution { .. })
        ));
    }

    #[test]
    fn test_fetch_failure_fails() {
        let r = rewritten(
            r#"<div smpte:backgroundImage="b.png"/>"#,
            Some("http://example.com/doc.xml"),
        );
        assert!(matches!(
            assemble_sample(&r, 4, &MapFetcher::new()),
            Err(TtmlError::ResourceFetch { .. })
        ));
    }

    #[test]
    fn test_write_to() {
        let sample = Sample::new(Bytes::from_static(b"<tt/>"));
        let mut out = Vec::new();
        sample.write_to(&mut out).unwrap();
        assert_eq!(out, b"<tt/>");
    }
}
