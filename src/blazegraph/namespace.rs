//! Extraction of namespace names from Blazegraph's namespace listing.
//!
//! `GET /blazegraph/namespace` answers with an RDF/XML document holding one
//! `rdf:Description` per knowledge base. The name of each knowledge base sits
//! in a `kb:Namespace` element somewhere below its description:
//!
//! ```xml
//! <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!          xmlns:kb="http://www.bigdata.com/rdf#/features/KB/">
//!   <rdf:Description rdf:nodeID="n1">
//!     <kb:Namespace>kb</kb:Namespace>
//!   </rdf:Description>
//! </rdf:RDF>
//! ```
//!
//! Matching is done on the resolved namespace URI, never on the prefix.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use thiserror::Error;

/// RDF syntax namespace that `Description` elements must be bound to.
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Blazegraph KB feature namespace that `Namespace` elements must be bound to.
pub const KB_NS: &str = "http://www.bigdata.com/rdf#/features/KB/";

#[derive(Debug, Error)]
pub enum NamespaceParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unbound namespace prefix `{0}`")]
    UnboundPrefix(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected content outside the root element")]
    StrayContent,

    #[error("document ended inside an unclosed element")]
    Unterminated,
}

pub type Result<T> = std::result::Result<T, NamespaceParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Description,
    Namespace,
    Other,
}

#[derive(Debug, Clone, Copy)]
enum Open {
    /// `rdf:Description`, owning result slot `usize`.
    Description(usize),
    Namespace,
    Other,
}

/// Text being collected for a `kb:Namespace` element.
struct Capture {
    depth: usize,
    text: String,
    slots: Vec<usize>,
    /// Set once a child element opens; only the leading text counts.
    sealed: bool,
}

/// Parse a namespace listing into namespace names, in document order.
///
/// Descriptions without a `kb:Namespace` descendant contribute nothing. The
/// document root is never treated as a description. A name is the text that
/// precedes the first child of its `kb:Namespace` element, kept verbatim.
pub fn parse_namespace_list(input: &[u8]) -> Result<Vec<String>> {
    let mut reader = NsReader::from_reader(input);

    let mut slots: Vec<Option<String>> = Vec::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut seen_root = false;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if stack.is_empty() && seen_root {
                    return Err(NamespaceParseError::StrayContent);
                }
                let mut tag = classify(resolved, e.local_name().as_ref())?;
                if stack.is_empty() {
                    seen_root = true;
                    tag = Tag::Other;
                }
                check_attributes(&reader, e)?;
                if let Some(c) = capture.as_mut() {
                    c.sealed = true;
                }
                let self_closing = matches!(event, Event::Empty(_));

                match tag {
                    Tag::Description => {
                        slots.push(None);
                        let slot = slots.len() - 1;
                        if !self_closing {
                            stack.push(Open::Description(slot));
                        }
                    }
                    Tag::Namespace if capture.is_none() => {
                        let claimed: Vec<usize> = stack
                            .iter()
                            .filter_map(|open| match open {
                                Open::Description(slot) if slots[*slot].is_none() => Some(*slot),
                                _ => None,
                            })
                            .collect();
                        for slot in &claimed {
                            slots[*slot] = Some(String::new());
                        }
                        // <kb:Namespace/> names the empty string.
                        if !self_closing {
                            stack.push(Open::Namespace);
                            capture = Some(Capture {
                                depth: stack.len(),
                                text: String::new(),
                                slots: claimed,
                                sealed: false,
                            });
                        }
                    }
                    Tag::Namespace => {
                        if !self_closing {
                            stack.push(Open::Namespace);
                        }
                    }
                    Tag::Other => {
                        if !self_closing {
                            stack.push(Open::Other);
                        }
                    }
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                if stack.pop().is_none() {
                    return Err(NamespaceParseError::StrayContent);
                }
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let Some(done) = capture.take() {
                        for slot in done.slots {
                            slots[slot] = Some(done.text.clone());
                        }
                    }
                }
            }
            Event::Text(ref e) => {
                if stack.is_empty() {
                    if is_xml_whitespace(e) {
                        continue;
                    }
                    return Err(NamespaceParseError::StrayContent);
                }
                let text = e.unescape()?;
                if let Some(c) = capture.as_mut().filter(|c| !c.sealed) {
                    c.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if stack.is_empty() {
                    return Err(NamespaceParseError::StrayContent);
                }
                if let Some(c) = capture.as_mut().filter(|c| !c.sealed) {
                    c.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(NamespaceParseError::MissingRoot);
    }
    if !stack.is_empty() {
        return Err(NamespaceParseError::Unterminated);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Reject duplicate or valueless attributes, bad entity references in
/// values and attribute prefixes with no binding in scope.
fn check_attributes(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    for attr in start.attributes().with_checks(true) {
        let attr = attr.map_err(quick_xml::Error::from)?;
        attr.unescape_value()?;
        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
            return Err(NamespaceParseError::UnboundPrefix(
                String::from_utf8_lossy(&prefix).into_owned(),
            ));
        }
    }
    Ok(())
}

fn is_xml_whitespace(text: &[u8]) -> bool {
    text.iter().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

fn classify(resolved: ResolveResult<'_>, local: &[u8]) -> Result<Tag> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => {
            if ns == RDF_NS.as_bytes() && local == b"Description" {
                Ok(Tag::Description)
            } else if ns == KB_NS.as_bytes() && local == b"Namespace" {
                Ok(Tag::Namespace)
            } else {
                Ok(Tag::Other)
            }
        }
        ResolveResult::Unbound => Ok(Tag::Other),
        ResolveResult::Unknown(prefix) => Err(NamespaceParseError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}
