//! A small owned element tree built from quick-xml events.
//!
//! Structural documents are a few hundred kilobytes at most, so they are read
//! into memory and queried by local name. Namespace prefixes are dropped from
//! both element and attribute names (`mets:div` -> `div`, `xlink:href` ->
//! `href`).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str, value: &str) -> bool {
        self.attr(name) == Some(value)
    }

    /// Direct character content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// All elements below this one in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: self.children.iter().rev().collect() }
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.name == name)
    }

    /// Text of the first descendant called `name`, if it has any.
    pub fn find_text(&self, name: &str) -> Option<String> {
        self.find(name).map(Element::text).filter(|t| !t.is_empty()).map(str::to_string)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parse `bytes` into the tree rooted at the document element.
pub fn parse(bytes: &[u8]) -> Result<Element, String> {
    let mut reader = Reader::from_reader(bytes);
    let mut open: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} at byte {}", reader.error_position()))?;
        match event {
            Event::Start(tag) => open.push(element(&tag)),
            Event::Empty(tag) => attach(&mut open, &mut root, element(&tag)),
            Event::End(_) => {
                let done = open.pop().ok_or("unexpected closing tag")?;
                attach(&mut open, &mut root, done);
            }
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    match text.unescape() {
                        Ok(value) => current.text.push_str(&value),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !open.is_empty() {
        return Err(format!("unclosed element <{}>", open[open.len() - 1].name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(open: &mut [Element], root: &mut Option<Element>, done: Element) {
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => {
            if root.is_none() {
                *root = Some(done);
            }
        }
    }
}

fn element(tag: &BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
    let attrs = tag
        .attributes()
        .flatten()
        .filter(|attr| attr.key.prefix().map_or(true, |p| p.as_ref() != b"xmlns") && attr.key.as_ref() != b"xmlns")
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            (key, value)
        })
        .collect();
    Element { name, attrs, children: Vec::new(), text: String::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:file ID="F1"><mets:FLocat xlink:href="file://./a.xml"/></mets:file>
  <mets:note>caf&#233; &amp; <![CDATA[<b>]]></mets:note>
</mets:mets>"#;

    #[test]
    fn local_names_and_attributes() {
        let root = parse(DOC.as_bytes()).expect("parse");
        assert_eq!(root.name, "mets");
        let file = root.find("file").expect("file");
        assert!(file.has_attr("ID", "F1"));
        assert_eq!(file.children[0].attr("href"), Some("file://./a.xml"));
        assert_eq!(root.find("note").map(Element::text), Some("café & <b>"));
    }

    #[test]
    fn descendants_are_in_document_order() {
        let root = parse(b"<a><b><c/></b><d/></a>").expect("parse");
        let names: Vec<&str> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "d"]);
    }

    #[test]
    fn rejects_unclosed_documents() {
        assert!(parse(b"<a><b></b>").is_err());
        assert!(parse(b"").is_err());
    }
}
