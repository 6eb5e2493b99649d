//! Namespace-aware structural selection over a document tree.

use super::model::{Element, QName, XMLNS_NAMESPACE, XML_NAMESPACE};
use super::TtmlDocument;
use crate::error::{Result, TtmlError};

/// Selects elements by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementPattern {
    /// Any element with this local name, in any namespace
    LocalName(String),
}

/// Selects attributes by namespace URI and local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePattern {
    pub namespace: String,
    pub local_name: String,
}

impl AttributePattern {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
        }
    }
}

/// A selected element with its ancestors, outermost first.
#[derive(Debug, Clone)]
pub struct ElementMatch<'a> {
    pub element: &'a Element,
    pub ancestors: Vec<&'a Element>,
}

/// Structural queries a document must answer for track construction.
pub trait DocumentQuery {
    /// All elements matching `pattern`, in document order.
    fn select_elements(&self, pattern: &ElementPattern) -> Result<Vec<ElementMatch<'_>>>;

    /// Replace the value of every attribute matching `pattern`, in document
    /// order, with the result of `rewrite`. Returns the number of matches.
    fn rewrite_attributes<F>(&mut self, pattern: &AttributePattern, rewrite: F) -> Result<usize>
    where
        F: FnMut(&str) -> Result<String>;
}

impl DocumentQuery for TtmlDocument {
    fn select_elements(&self, pattern: &ElementPattern) -> Result<Vec<ElementMatch<'_>>> {
        let ElementPattern::LocalName(local) = pattern;
        if local.is_empty() {
            return Err(TtmlError::QueryEvaluation(
                "element pattern has an empty name".to_string(),
            ));
        }

        let mut scope = NamespaceScope::default();
        let mut ancestors = Vec::new();
        let mut matches = Vec::new();
        collect_elements(
            &self.root,
            local,
            &mut scope,
            &mut ancestors,
            &mut matches,
        )?;
        Ok(matches)
    }

    fn rewrite_attributes<F>(&mut self, pattern: &AttributePattern, mut rewrite: F) -> Result<usize>
    where
        F: FnMut(&str) -> Result<String>,
    {
        if pattern.local_name.is_empty() || pattern.namespace.is_empty() {
            return Err(TtmlError::QueryEvaluation(format!(
                "attribute pattern {{{}}}{} is incomplete",
                pattern.namespace, pattern.local_name
            )));
        }

        let mut scope = NamespaceScope::default();
        rewrite_in(&mut self.root, pattern, &mut scope, &mut rewrite)
    }
}

fn collect_elements<'a>(
    element: &'a Element,
    local: &str,
    scope: &mut NamespaceScope,
    ancestors: &mut Vec<&'a Element>,
    matches: &mut Vec<ElementMatch<'a>>,
) -> Result<()> {
    let mark = scope.enter(element);
    scope.check_bound(&element.name)?;

    if element.name.local == local {
        matches.push(ElementMatch {
            element,
            ancestors: ancestors.clone(),
        });
    }

    ancestors.push(element);
    for child in element.child_elements() {
        collect_elements(child, local, scope, ancestors, matches)?;
    }
    ancestors.pop();

    scope.leave(mark);
    Ok(())
}

fn rewrite_in<F>(
    element: &mut Element,
    pattern: &AttributePattern,
    scope: &mut NamespaceScope,
    rewrite: &mut F,
) -> Result<usize>
where
    F: FnMut(&str) -> Result<String>,
{
    let mark = scope.enter(element);
    let mut count = 0;

    for attr in element.attributes.iter_mut() {
        if attr.namespace_declaration().is_some() {
            continue;
        }
        // Unprefixed attributes are in no namespace.
        let Some(prefix) = attr.name.prefix.as_deref() else {
            continue;
        };
        let namespace = scope.resolve(prefix).ok_or_else(|| {
            TtmlError::QueryEvaluation(format!("unbound prefix in attribute '{}'", attr.name))
        })?;
        if namespace == pattern.namespace && attr.name.local == pattern.local_name {
            attr.value = rewrite(&attr.value)?;
            count += 1;
        }
    }

    for child in element.child_elements_mut() {
        count += rewrite_in(child, pattern, scope, rewrite)?;
    }

    scope.leave(mark);
    Ok(count)
}

/// In-scope prefix bindings while walking the tree.
#[derive(Debug, Default)]
struct NamespaceScope {
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    /// Push the element's declarations; returns a mark for [`leave`](Self::leave).
    fn enter(&mut self, element: &Element) -> usize {
        let mark = self.bindings.len();
        for (prefix, uri) in element.namespace_declarations() {
            self.bindings
                .push((prefix.map(str::to_string), uri.to_string()));
        }
        mark
    }

    fn leave(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        match prefix {
            "xml" => Some(XML_NAMESPACE.to_string()),
            "xmlns" => Some(XMLNS_NAMESPACE.to_string()),
            _ => self
                .bindings
                .iter()
                .rev()
                .find(|(p, _)| p.as_deref() == Some(prefix))
                .map(|(_, uri)| uri.clone()),
        }
    }

    fn check_bound(&self, name: &QName) -> Result<()> {
        match name.prefix.as_deref() {
            Some(prefix) if self.resolve(prefix).is_none() => Err(TtmlError::QueryEvaluation(
                format!("unbound prefix in element <{}>", name),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMPTE: &str = "http://www.smpte-ra.org/schemas/2052-1/2010/smpte-tt";

    fn doc(xml: &str) -> TtmlDocument {
        TtmlDocument::parse(xml, None).unwrap()
    }

    #[test]
    fn test_select_by_local_name_any_namespace() {
        let d = doc(
            r#"<tt:tt xmlns:tt="http://www.w3.org/ns/ttml"><tt:body><tt:p/><p/><div><tt:p/></div></tt:body></tt:tt>"#,
        );
        let matches = d
            .select_elements(&ElementPattern::LocalName("p".to_string()))
            .unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[2].ancestors.len(), 3);
        assert_eq!(matches[2].ancestors[2].name.local, "div");
    }

    #[test]
    fn test_unbound_element_prefix_fails() {
        let d = doc("<tt><foo:p/></tt>");
        assert!(matches!(
            d.select_elements(&ElementPattern::LocalName("p".to_string())),
            Err(TtmlError::QueryEvaluation(_))
        ));
    }

    #[test]
    fn test_empty_pattern_fails() {
        let d = doc("<tt/>");
        assert!(matches!(
            d.select_elements(&ElementPattern::LocalName(String::new())),
            Err(TtmlError::QueryEvaluation(_))
        ));
    }

    #[test]
    fn test_rewrite_resolves_prefix_not_spelling() {
        let mut d = doc(&format!(
            r#"<tt xmlns:s="{SMPTE}" xmlns:smpte="urn:other"><div s:backgroundImage="a.png" smpte:backgroundImage="b.png" backgroundImage="c.png"/></tt>"#
        ));
        let pattern = AttributePattern::new(SMPTE, "backgroundImage");
        let mut seen = Vec::new();
        let count = d
            .rewrite_attributes(&pattern, |v| {
                seen.push(v.to_string());
                Ok(format!("new-{}", v))
            })
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(seen, vec!["a.png".to_string()]);
        let div = d.root.child_elements().next().unwrap();
        assert_eq!(div.attribute("s:backgroundImage"), Some("new-a.png"));
        assert_eq!(div.attribute("smpte:backgroundImage"), Some("b.png"));
    }

    #[test]
    fn test_rewrite_respects_scoping() {
        let mut d = doc(&format!(
            r#"<tt><div xmlns:s="{SMPTE}" s:backgroundImage="a.png"/><div xmlns:s="urn:x" s:backgroundImage="b.png"/></tt>"#
        ));
        let pattern = AttributePattern::new(SMPTE, "backgroundImage");
        let count = d.rewrite_attributes(&pattern, |_| Ok("x".to_string())).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rewrite_unbound_attribute_prefix_fails() {
        let mut d = doc(r#"<tt><div q:backgroundImage="a.png"/></tt>"#);
        let pattern = AttributePattern::new(SMPTE, "backgroundImage");
        assert!(matches!(
            d.rewrite_attributes(&pattern, |v| Ok(v.to_string())),
            Err(TtmlError::QueryEvaluation(_))
        ));
    }

    #[test]
    fn test_rewrite_error_propagates() {
        let mut d = doc(&format!(
            r#"<tt xmlns:smpte="{SMPTE}"><div smpte:backgroundImage="a.png"/></tt>"#
        ));
        let pattern = AttributePattern::new(SMPTE, "backgroundImage");
        let result = d.rewrite_attributes(&pattern, |_| {
            Err(TtmlError::QueryEvaluation("stop".to_string()))
        });
        assert!(result.is_err());
    }
}
