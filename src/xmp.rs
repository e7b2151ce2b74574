//! Embedded XMP lookup.
//!
//! The `<rdf:RDF>` fragment is located directly in the raw file bytes
//! (the payload is embedded verbatim in both JPEG APP1 segments and the
//! TIFF XMP tag) and event-parsed into two lookups: element text by
//! qualified name, and the attributes of the first `rdf:Description`
//! node. Names are matched case-insensitively; DJI and FLIR firmware
//! disagree on attribute capitalization.

use std::collections::BTreeMap;

use memchr::memmem;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::exif::evaldiv;

const RDF_START: &[u8] = b"<rdf:RDF";
const RDF_END: &[u8] = b"</rdf:RDF";

/// Parsed XMP fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpTree {
    /// First text content per lowercased element name.
    elements: BTreeMap<String, String>,
    /// Attributes of the first `rdf:Description` node, lowercased keys.
    description: BTreeMap<String, String>,
}

/// Locates and parses the rdf:RDF span inside `data`. `None` when the
/// file carries no XMP packet.
pub fn extract_xmp(data: &[u8]) -> Option<XmpTree> {
    let start = memmem::find(data, RDF_START)?;
    let end = memmem::find(&data[start..], RDF_END)? + start;
    let span = data.get(start..(end + RDF_END.len() + 1).min(data.len()))?;
    Some(XmpTree::parse(span))
}

impl XmpTree {
    /// Best-effort event parse; malformed trailing content simply ends
    /// the walk.
    pub fn parse(xml: &[u8]) -> XmpTree {
        let mut tree = XmpTree::default();
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                    tree.collect_description(&name, e);
                    stack.push(name);
                }
                Ok(Event::Empty(ref e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                    tree.collect_description(&name, e);
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(ref t)) => {
                    if let (Some(name), Ok(text)) = (stack.last(), t.unescape()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            tree.elements
                                .entry(name.clone())
                                .or_insert_with(|| text.to_owned());
                        }
                    }
                }
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
            buf.clear();
        }
        tree
    }

    fn collect_description(&mut self, name: &str, e: &quick_xml::events::BytesStart) {
        if name != "rdf:description" || !self.description.is_empty() {
            return;
        }
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            self.description.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.description.is_empty()
    }

    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    /// Text of the first element with this (case-insensitive) name.
    pub fn element(&self, name: &str) -> Option<&str> {
        self.elements.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Element text evaluated as a number (`"N/D"` division included).
    pub fn element_number(&self, name: &str) -> Option<f64> {
        evaldiv(self.element(name)?).ok()
    }

    /// Attribute of the first `rdf:Description` node.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.description
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Description attribute as a number, defaulting to 0 when absent or
    /// non-numeric (the convention for DJI attitude attributes).
    pub fn attr_number_or_zero(&self, name: &str) -> f64 {
        self.attr(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}
