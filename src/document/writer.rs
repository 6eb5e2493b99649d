//! Indented serialization of an [`Element`] tree.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::model::{Element, Node};
use crate::error::Result;

/// Serialize `root` as a UTF-8 document, indenting `indent` spaces per level.
/// An indent of 0 writes everything on one line.
pub(crate) fn write_pretty(root: &Element, indent: usize) -> Result<Vec<u8>> {
    let mut writer = if indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    } else {
        Writer::new(Vec::new())
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let name = element.name.to_string();
    let mut start = BytesStart::new(name.as_str());
    for attr in &element.attributes {
        let key = attr.name.to_string();
        start.push_attribute((key.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
            Node::ProcessingInstruction(t) => {
                writer.write_event(Event::PI(BytesText::from_escaped(t.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}
