//! Byte-region location inside raw page files.
//!
//! The page is tokenized with quick-xml while an open-element stack is kept,
//! so an element is always closed by its own end tag even when elements with
//! the same name are nested inside it. Offsets are positions in the raw input
//! bytes: the start is the `<` opening the element, the end is just past the
//! `>` of its closing tag (or of the tag itself for `<X ID=".."/>`).
//!
//! When several elements carry the same `ID`, the one opened first wins.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::types::Region;

const ID_ATTR: &[u8] = b"ID";

/// Why an identifier could not be turned into a region.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionMiss {
    #[error("no element carries this ID")]
    Missing,
    #[error("element is never closed")]
    Unclosed,
    #[error("page is not well-formed: {0}")]
    Malformed(String),
}

/// Locate the first element whose `ID` attribute equals `identifier`.
pub fn locate(bytes: &[u8], identifier: &str) -> Result<Region, RegionMiss> {
    let mut found: Option<Region> = None;
    let outcome = scan(bytes, |id, region| {
        if id == identifier && found.map_or(true, |seen| region.start < seen.start) {
            found = Some(region);
        }
    });
    outcome.resolve(identifier, found)
}

/// Every `ID` of a page mapped to its region, built in a single pass.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    regions: HashMap<String, Region>,
    outcome: ScanOutcome,
}

impl RegionIndex {
    pub fn build(bytes: &[u8]) -> Self {
        let mut regions: HashMap<String, Region> = HashMap::new();
        let outcome = scan(bytes, |id, region| {
            regions
                .entry(id.to_string())
                .and_modify(|seen| {
                    if region.start < seen.start {
                        *seen = region;
                    }
                })
                .or_insert(region);
        });
        Self { regions, outcome }
    }

    pub fn get(&self, identifier: &str) -> Result<Region, RegionMiss> {
        self.outcome.resolve(identifier, self.regions.get(identifier).copied())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// How a scan ended.
#[derive(Debug, Clone, Default)]
struct ScanOutcome {
    /// ID and start of elements still open when the input ended or broke off.
    unclosed: Vec<(String, usize)>,
    error: Option<String>,
}

impl ScanOutcome {
    /// `found` is the earliest closed element with `identifier`; an unclosed
    /// one opened before it takes precedence.
    fn resolve(&self, identifier: &str, found: Option<Region>) -> Result<Region, RegionMiss> {
        let unclosed = self
            .unclosed
            .iter()
            .any(|(id, start)| id == identifier && found.map_or(true, |f| *start < f.start));
        match found {
            _ if unclosed => Err(RegionMiss::Unclosed),
            Some(region) => Ok(region),
            None => match &self.error {
                Some(error) => Err(RegionMiss::Malformed(error.clone())),
                None => Err(RegionMiss::Missing),
            },
        }
    }
}

/// Calls `visit` for every element with an `ID` once its region is complete.
fn scan<F>(bytes: &[u8], mut visit: F) -> ScanOutcome
where
    F: FnMut(&str, Region),
{
    let mut reader = Reader::from_reader(bytes);
    let mut open: Vec<Option<(String, usize)>> = Vec::new();
    let mut error = None;
    loop {
        // the reader stops right before every markup `<`, so this is where a tag starts
        let start = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                error = Some(format!("{e} at byte {}", reader.error_position()));
                break;
            }
        };
        let end = reader.buffer_position() as usize;
        let closed = match event {
            Event::Start(tag) => {
                open.push(element_id(&tag).map(|id| (id, start)));
                None
            }
            Event::Empty(tag) => element_id(&tag).map(|id| (id, start)),
            Event::End(_) => open.pop().flatten(),
            Event::Eof => break,
            _ => None,
        };
        if let Some((id, start)) = closed {
            visit(&id, Region::new(start, end));
        }
    }
    ScanOutcome { unclosed: open.into_iter().flatten().collect(), error }
}

fn element_id(tag: &BytesStart<'_>) -> Option<String> {
    let attr = tag.attributes().flatten().find(|attr| attr.key.as_ref() == ID_ATTR)?;
    let value = match attr.unescape_value() {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto>
  <Layout>
    <TextBlock ID="blk1"><TextLine ID="l1"><String ID="s1" CONTENT="hello"/></TextLine></TextBlock>
    <ComposedBlock ID="cb1"><ComposedBlock ID="cb2"><TextBlock ID="blk2">x</TextBlock></ComposedBlock></ComposedBlock>
  </Layout>
</alto>"#;

    fn slice(region: Region) -> &'static str {
        &PAGE[region.start..region.end]
    }

    #[test]
    fn locates_complete_element() {
        let region = locate(PAGE.as_bytes(), "blk1").expect("blk1");
        let text = slice(region);
        assert!(text.starts_with("<TextBlock ID=\"blk1\">"));
        assert!(text.ends_with("</TextBlock>"));
        assert_eq!(text.matches("<TextBlock").count(), 1);
    }

    #[test]
    fn self_closing_element_is_its_own_region() {
        let region = locate(PAGE.as_bytes(), "s1").expect("s1");
        assert_eq!(slice(region), r#"<String ID="s1" CONTENT="hello"/>"#);
    }

    #[test]
    fn nested_same_name_elements_close_at_their_own_tag() {
        let text = slice(locate(PAGE.as_bytes(), "cb1").expect("cb1"));
        assert!(text.ends_with("</ComposedBlock></ComposedBlock>"));
        let inner = slice(locate(PAGE.as_bytes(), "cb2").expect("cb2"));
        assert!(inner.starts_with("<ComposedBlock ID=\"cb2\">"));
        assert!(inner.ends_with("</TextBlock></ComposedBlock>"));
    }

    #[test]
    fn missing_identifier_is_not_the_whole_file() {
        assert_eq!(locate(PAGE.as_bytes(), "nope"), Err(RegionMiss::Missing));
    }

    #[test]
    fn unclosed_target_is_reported() {
        let page = b"<alto><TextBlock ID=\"b1\"><String/>";
        assert_eq!(locate(page, "b1"), Err(RegionMiss::Unclosed));
    }

    #[test]
    fn index_agrees_with_single_lookups() {
        let index = RegionIndex::build(PAGE.as_bytes());
        for id in ["blk1", "l1", "s1", "cb1", "cb2", "blk2"] {
            assert_eq!(index.get(id), locate(PAGE.as_bytes(), id), "{id}");
        }
        assert_eq!(index.len(), 6);
        assert_eq!(index.get("nope"), Err(RegionMiss::Missing));
    }

    #[test]
    fn raw_lt_in_attribute_does_not_shift_the_start() {
        let page = r#"<alto><TextBlock ID="b" STYLE="a<b">t</TextBlock></alto>"#;
        let region = locate(page.as_bytes(), "b").expect("b");
        assert_eq!(&page[region.start..region.end], r#"<TextBlock ID="b" STYLE="a<b">t</TextBlock>"#);
        assert_eq!(RegionIndex::build(page.as_bytes()).get("b"), Ok(region));
    }

    #[test]
    fn duplicate_ids_resolve_to_the_first_opened() {
        let page = r#"<alto><A ID="x"><B ID="x"/></A></alto>"#;
        let region = locate(page.as_bytes(), "x").expect("x");
        assert_eq!(&page[region.start..region.end], r#"<A ID="x"><B ID="x"/></A>"#);
        assert_eq!(RegionIndex::build(page.as_bytes()).get("x"), Ok(region));

        let unclosed = r#"<alto><A ID="x"><B ID="x"/>"#;
        assert_eq!(locate(unclosed.as_bytes(), "x"), Err(RegionMiss::Unclosed));
        assert_eq!(RegionIndex::build(unclosed.as_bytes()).get("x"), Err(RegionMiss::Unclosed));
    }

    #[test]
    fn offsets_are_bytes_not_chars() {
        let page = "<alto><String CONTENT=\"é\"/><TextBlock ID=\"b\">ü</TextBlock></alto>";
        let region = locate(page.as_bytes(), "b").expect("b");
        assert_eq!(&page.as_bytes()[region.start..region.end], "<TextBlock ID=\"b\">ü</TextBlock>".as_bytes());
    }
}
