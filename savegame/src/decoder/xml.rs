//! quick-xml driver turning markup into open/close tag events.

use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use std::io::BufRead;

use crate::error::DecodeError;

/// Attributes of one element, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A structural event in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum TagEvent {
    Open { name: String, attributes: Attributes },
    Close { name: String },
}

impl TagEvent {
    pub fn open(name: impl Into<String>, attributes: Attributes) -> Self {
        TagEvent::Open {
            name: name.into(),
            attributes,
        }
    }

    pub fn close(name: impl Into<String>) -> Self {
        TagEvent::Close { name: name.into() }
    }
}

/// Stream `reader` as tag events into `sink`.
///
/// Self-closing elements produce an open immediately followed by a close.
/// Text, comments and processing instructions are skipped. Any markup error,
/// or input ending with elements still open, is fatal.
pub fn read_tag_events<R, F>(reader: R, mut sink: F) -> Result<(), DecodeError>
where
    R: BufRead,
    F: FnMut(TagEvent),
{
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) => {
                depth += 1;
                sink(TagEvent::Open {
                    name: tag_name(e),
                    attributes: read_attributes(e)?,
                });
            }
            XmlEvent::Empty(ref e) => {
                let name = tag_name(e);
                sink(TagEvent::Open {
                    name: name.clone(),
                    attributes: read_attributes(e)?,
                });
                sink(TagEvent::Close { name });
            }
            XmlEvent::End(ref e) => {
                depth = depth.saturating_sub(1);
                sink(TagEvent::Close {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                });
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(DecodeError::Truncated {
            open_elements: depth,
        });
    }
    Ok(())
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn read_attributes(e: &BytesStart<'_>) -> Result<Attributes, quick_xml::Error> {
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push(key, value);
    }
    Ok(attributes)
}
