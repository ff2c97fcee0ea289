//! Pull-based XML event source on top of `quick-xml`.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, SyncError};

/// One parse event, with namespace prefixes stripped from element names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element opened.
    Open(String),
    /// Character data (entities resolved) or a CDATA section.
    Text(String),
    /// An element closed.
    Close(String),
}

/// Streams [`XmlEvent`]s from a buffered reader without building a tree.
///
/// Self-closing elements (`<video/>`) are reported as an `Open` followed by a
/// `Close`. Comments, declarations, processing instructions and doctypes are
/// skipped. Mismatched end tags are reported by the tokenizer; input that ends
/// with elements still open yields [`SyncError::UnexpectedEof`].
pub struct EventReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_close: Option<String>,
    depth: usize,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
            pending_close: None,
            depth: 0,
        }
    }

    /// Number of currently open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Read the next event, or `None` at the end of a well-formed document.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_close.take() {
            self.depth = self.depth.saturating_sub(1);
            return Ok(Some(XmlEvent::Close(name)));
        }

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    self.depth += 1;
                    XmlEvent::Open(decode_name(e.local_name().as_ref())?)
                }
                Event::Empty(e) => {
                    let name = decode_name(e.local_name().as_ref())?;
                    self.depth += 1;
                    self.pending_close = Some(name.clone());
                    XmlEvent::Open(name)
                }
                Event::End(e) => {
                    self.depth = self.depth.saturating_sub(1);
                    XmlEvent::Close(decode_name(e.local_name().as_ref())?)
                }
                Event::Text(e) => XmlEvent::Text(e.unescape()?.into_owned()),
                Event::CData(e) => XmlEvent::Text(std::str::from_utf8(&e)?.to_owned()),
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(SyncError::UnexpectedEof { depth: self.depth });
                    }
                    return Ok(None);
                }
                _ => continue,
            };
            return Ok(Some(event));
        }
    }
}

impl<'a> EventReader<&'a [u8]> {
    /// Stream events from an in-memory document.
    #[must_use]
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

fn decode_name(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(xml: &str) -> Result<Vec<XmlEvent>> {
        EventReader::from_xml(xml).collect()
    }

    fn open(name: &str) -> XmlEvent {
        XmlEvent::Open(name.to_string())
    }

    fn close(name: &str) -> XmlEvent {
        XmlEvent::Close(name.to_string())
    }

    fn text(value: &str) -> XmlEvent {
        XmlEvent::Text(value.to_string())
    }

    #[test]
    fn test_simple_document() {
        let events = collect(r#"<?xml version="1.0"?><object><id type="integer">1</id></object>"#)
            .unwrap();
        assert_eq!(
            events,
            vec![open("object"), open("id"), text("1"), close("id"), close("object")]
        );
    }

    #[test]
    fn test_empty_element_expands() {
        let events = collect("<object><video/></object>").unwrap();
        assert_eq!(
            events,
            vec![open("object"), open("video"), close("video"), close("object")]
        );
    }

    #[test]
    fn test_entities_are_unescaped() {
        let events = collect("<title>Farms &amp; crops</title>").unwrap();
        assert_eq!(events[1], text("Farms & crops"));
    }

    #[test]
    fn test_cdata_is_text() {
        let events = collect("<text><![CDATA[a <b> c]]></text>").unwrap();
        assert_eq!(events[1], text("a <b> c"));
    }

    #[test]
    fn test_comments_are_skipped() {
        let events = collect("<a><!-- note --></a>").unwrap();
        assert_eq!(events, vec![open("a"), close("a")]);
    }

    #[test]
    fn test_namespace_prefix_is_stripped() {
        let events = collect(r#"<r:object xmlns:r="urn:rsr"></r:object>"#).unwrap();
        assert_eq!(events, vec![open("object"), close("object")]);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = collect("<object><id>1</title></object>").unwrap_err();
        assert!(matches!(err, SyncError::Xml(_)));
    }

    #[test]
    fn test_truncated_document() {
        let err = collect("<response><objects><object>").unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnexpectedEof { depth: 3 } | SyncError::Xml(_)
        ));
    }

    #[test]
    fn test_depth_tracking() {
        let mut reader = EventReader::from_xml("<a><b/></a>");
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 1);
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 2);
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 1);
        reader.next_event().unwrap();
        assert_eq!(reader.depth(), 0);
        assert_eq!(reader.next_event().unwrap(), None);
    }
}
