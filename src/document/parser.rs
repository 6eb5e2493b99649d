//! XML source to [`Element`] tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::model::{Attribute, Element, Node};
use crate::error::{Result, TtmlError};

/// Parse an XML document and return its root element.
///
/// Whitespace-only text is dropped so the tree can be re-indented; any other
/// text is kept as written. Nodes outside the root element are discarded.
pub(crate) fn parse_root(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.expand_empty_elements(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(element_from_start(&e)?),
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TtmlError::Xml("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Text(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape()?;
                    if !text.trim().is_empty() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::CData(String::from_utf8_lossy(&e).into_owned()));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                }
            }
            Event::PI(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::ProcessingInstruction(
                        String::from_utf8_lossy(&e).into_owned(),
                    ));
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(TtmlError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| TtmlError::Xml("document has no root element".to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.name().into_inner())?;
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute::new(key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if let Node::Element(element) = node {
                if root.is_some() {
                    return Err(TtmlError::Xml("multiple root elements".to_string()));
                }
                *root = Some(element);
            }
        }
    }
    Ok(())
}

fn utf8(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|e| TtmlError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let root = parse_root(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml" xml:lang="en">
  <body>
    <div>
      <p begin="00:00:01.000" end="00:00:02.000">Hello &amp; welcome</p>
      <p begin="00:00:03.000" end="00:00:04.000"/>
    </div>
  </body>
</tt>"#,
        )
        .unwrap();

        assert_eq!(root.name.local, "tt");
        assert_eq!(root.attribute("xml:lang"), Some("en"));
        let body = root.child_elements().next().unwrap();
        let div = body.child_elements().next().unwrap();
        let ps: Vec<_> = div.child_elements().collect();
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[0].children, vec![Node::Text("Hello & welcome".to_string())]);
        assert!(ps[1].children.is_empty());
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let root = parse_root("<tt>\n   <body/>\n</tt>").unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_comments_kept_inside_root() {
        let root = parse_root("<!-- outside --><tt><!-- inside --></tt>").unwrap();
        assert_eq!(root.children, vec![Node::Comment(" inside ".to_string())]);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(parse_root("<tt><body></tt>"), Err(TtmlError::Xml(_))));
        assert!(matches!(parse_root("<tt>"), Err(TtmlError::Xml(_))));
        assert!(matches!(parse_root(""), Err(TtmlError::Xml(_))));
        assert!(matches!(
            parse_root(r#"<tt a="1" a="2"/>"#),
            Err(TtmlError::Xml(_))
        ));
    }
}
