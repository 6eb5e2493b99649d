//! Background image references: discovery, deduplication and renaming.

use std::collections::HashMap;

use crate::document::{AttributePattern, DocumentQuery, TtmlDocument};
use crate::error::Result;

/// SMPTE-TT namespace holding the `backgroundImage` attribute
pub const SMPTE_TT_NAMESPACE: &str = "http://www.smpte-ra.org/schemas/2052-1/2010/smpte-tt";

/// Local name of the image reference attribute
pub const BACKGROUND_IMAGE: &str = "backgroundImage";

/// One distinct image referenced by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Attribute value as found in the source document
    pub original_uri: String,
    /// Identifier written into the rewritten document
    pub internal_id: String,
    pub mime_type: Option<&'static str>,
}

/// A rewritten copy of a document and its distinct image references in
/// first-seen order.
#[derive(Debug, Clone)]
pub struct RewrittenDocument {
    pub document: TtmlDocument,
    pub references: Vec<ImageReference>,
}

impl RewrittenDocument {
    /// MIME types of the referenced images that could be classified
    pub fn mime_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.references.iter().filter_map(|r| r.mime_type)
    }
}

/// Everything from the last `.` on, or an empty string.
pub fn image_extension(uri: &str) -> &str {
    uri.rfind('.').map(|i| &uri[i..]).unwrap_or("")
}

/// MIME type implied by an extension, if it is a known image type.
pub fn classify_mime(extension: &str) -> Option<&'static str> {
    let ext = extension.to_ascii_lowercase();
    if ext.contains("jpg") || ext.contains("jpeg") {
        Some("image/jpeg")
    } else if ext.contains("png") {
        Some("image/png")
    } else {
        None
    }
}

/// Rewrite every background image reference of `document` into an internal
/// `urn:<urn_scheme>:<n><ext>` identifier.
///
/// Numbering starts at 1 for every document. Repeated URIs within the
/// document share one identifier. The input document is left untouched.
pub fn rewrite_images(document: &TtmlDocument, urn_scheme: &str) -> Result<RewrittenDocument> {
    let mut rewritten = document.clone();
    let mut references: Vec<ImageReference> = Vec::new();
    let mut by_uri: HashMap<String, usize> = HashMap::new();

    let pattern = AttributePattern::new(SMPTE_TT_NAMESPACE, BACKGROUND_IMAGE);
    let occurrences = rewritten.rewrite_attributes(&pattern, |uri| {
        if let Some(&i) = by_uri.get(uri) {
            return Ok(references[i].internal_id.clone());
        }

        let extension = image_extension(uri);
        let mime_type = classify_mime(extension);
        if mime_type.is_none() {
            tracing::debug!("No MIME type for image reference '{}'", uri);
        }
        let internal_id = format!("urn:{}:{}{}", urn_scheme, references.len() + 1, extension);

        by_uri.insert(uri.to_string(), references.len());
        references.push(ImageReference {
            original_uri: uri.to_string(),
            internal_id: internal_id.clone(),
            mime_type,
        });
        Ok(internal_id)
    })?;

    tracing::debug!(
        "Rewrote {} image reference(s), {} distinct",
        occurrences,
        references.len()
    );

    Ok(RewrittenDocument {
        document: rewritten,
        references,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> TtmlDocument {
        TtmlDocument::parse(
            &format!(
                r#"<tt xmlns="http://www.w3.org/ns/ttml" xmlns:smpte="{}"><body>{}</body></tt>"#,
                SMPTE_TT_NAMESPACE, body
            ),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("images/bg.png"), ".png");
        assert_eq!(image_extension("a.b/c.JPEG"), ".JPEG");
        assert_eq!(image_extension("noext"), "");
    }

    #[test]
    fn test_classify_mime() {
        assert_eq!(classify_mime(".jpg"), Some("image/jpeg"));
        assert_eq!(classify_mime(".jpeg"), Some("image/jpeg"));
        assert_eq!(classify_mime(".PNG"), Some("image/png"));
        assert_eq!(classify_mime(".gif"), None);
        assert_eq!(classify_mime(""), None);
    }

    #[test]
    fn test_duplicates_share_identifier() {
        let original = doc(
            r#"<div smpte:backgroundImage="a.png"/><div smpte:backgroundImage="b.jpg"/><div smpte:backgroundImage="a.png"/>"#,
        );
        let result = rewrite_images(&original, "ttml-track").unwrap();

        assert_eq!(
            result.references,
            vec![
                ImageReference {
                    original_uri: "a.png".to_string(),
                    internal_id: "urn:ttml-track:1.png".to_string(),
                    mime_type: Some("image/png"),
                },
                ImageReference {
                    original_uri: "b.jpg".to_string(),
                    internal_id: "urn:ttml-track:2.jpg".to_string(),
                    mime_type: Some("image/jpeg"),
                },
            ]
        );

        let body = result.document.root.child_elements().next().unwrap();
        let ids: Vec<_> = body
            .child_elements()
            .map(|d| d.attribute("smpte:backgroundImage").unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["urn:ttml-track:1.png", "urn:ttml-track:2.jpg", "urn:ttml-track:1.png"]
        );
    }

    #[test]
    fn test_input_not_mutated() {
        let original = doc(r#"<div smpte:backgroundImage="a.png"/>"#);
        let snapshot = original.clone();
        let result = rewrite_images(&original, "x").unwrap();
        assert_eq!(original, snapshot);
        assert_ne!(result.document, original);
    }

    #[test]
    fn test_unclassified_reference_kept() {
        let original = doc(r#"<div smpte:backgroundImage="logo.svg"/><div smpte:backgroundImage="raw"/>"#);
        let result = rewrite_images(&original, "x").unwrap();
        assert_eq!(result.references.len(), 2);
        assert_eq!(result.references[0].internal_id, "urn:x:1.svg");
        assert_eq!(result.references[1].internal_id, "urn:x:2");
        assert_eq!(result.mime_types().count(), 0);
    }

    #[test]
    fn test_no_references() {
        let original = doc(r#"<div><p end="00:00:01">text</p></div>"#);
        let result = rewrite_images(&original, "x").unwrap();
        assert!(result.references.is_empty());
        assert_eq!(result.document, original);
    }
}
