//! Structural tree reader for METS documents with embedded MODS sections.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate};

use crate::config::MetsProfile;
use crate::error::{Error, Result};
use crate::files::FileGroup;
use crate::types::{DescriptiveRecord, IssueMetadata, Locator, LogicalUnit, StructuralDocument};
use crate::xml::{self, Element};

pub fn parse(path: &Path, profile: &MetsProfile) -> Result<StructuralDocument> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    parse_bytes(&bytes, path, profile)
}

/// Parse an in-memory METS document; `path` is only used in error messages.
pub fn parse_bytes(bytes: &[u8], path: &Path, profile: &MetsProfile) -> Result<StructuralDocument> {
    let root = xml::parse(bytes).map_err(|reason| Error::malformed(path, reason))?;

    let logical = root
        .find_all("structMap")
        .find(|e| e.has_attr("TYPE", &profile.logical_struct_type))
        .ok_or_else(|| Error::malformed(path, format!("no {} structMap", profile.logical_struct_type)))?;
    let file_grp = root
        .find_all("fileGrp")
        .find(|e| e.has_attr("USE", &profile.text_file_group))
        .ok_or_else(|| Error::malformed(path, format!("no fileGrp with USE=\"{}\"", profile.text_file_group)))?;
    let dmd_secs: Vec<&Element> = root.find_all("dmdSec").collect();
    if dmd_secs.is_empty() {
        return Err(Error::malformed(path, "no dmdSec"));
    }
    let issue_sec = dmd_secs
        .iter()
        .find(|sec| sec.has_attr("ID", &profile.issue_dmd_id))
        .ok_or_else(|| Error::malformed(path, format!("no dmdSec with ID=\"{}\"", profile.issue_dmd_id)))?;

    let files = file_group(file_grp, path)?;
    let issue = issue_metadata(issue_sec, path)?;
    let descriptive = dmd_secs
        .iter()
        .filter_map(|sec| Some((sec.attr("ID")?.to_string(), descriptive(sec, &profile.author_role))))
        .collect();
    let units = logical
        .find_all("div")
        .filter(|div| div.attr("TYPE").is_some_and(|t| profile.unit_types.iter().any(|u| u == t)))
        .map(|div| logical_unit(div, path))
        .collect::<Result<Vec<_>>>()?;

    Ok(StructuralDocument { units, descriptive, files, issue })
}

fn file_group(grp: &Element, path: &Path) -> Result<FileGroup> {
    let mut files = FileGroup::new();
    for file in grp.find_all("file") {
        let Some(id) = file.attr("ID") else { continue };
        let link = file
            .find_all("FLocat")
            .find_map(|loc| loc.attr("href"))
            .ok_or_else(|| Error::malformed(path, format!("file {id} has no FLocat href")))?;
        files.insert(id, link);
    }
    Ok(files)
}

fn logical_unit(div: &Element, path: &Path) -> Result<LogicalUnit> {
    let dmd_id = div.attr("DMDID").map(str::to_string);
    let id = div
        .attr("ID")
        .map(str::to_string)
        .or_else(|| dmd_id.clone())
        .ok_or_else(|| Error::malformed(path, "logical div without ID or DMDID"))?;
    let mut locators = Vec::new();
    for area in div.find_all("fptr").flat_map(|fptr| fptr.find_all("area")) {
        match (area.attr("BEGIN"), area.attr("FILEID")) {
            (Some(begin), Some(file_id)) => locators.push(Locator::new(begin, file_id)),
            _ => return Err(Error::malformed(path, format!("area in {id} lacks BEGIN or FILEID"))),
        }
    }
    if locators.is_empty() {
        return Err(Error::malformed(path, format!("unit {id} references no areas")));
    }
    Ok(LogicalUnit { id, dmd_id, locators })
}

fn descriptive(sec: &Element, author_role: &str) -> DescriptiveRecord {
    let author = sec
        .find_all("name")
        .filter(|name| name.find("roleTerm").map(Element::text) == Some(author_role))
        .map(|name| {
            name.find_all("namePart")
                .map(Element::text)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|author| !author.is_empty())
        .collect();
    DescriptiveRecord {
        author,
        title: texts(sec, "title"),
        subtitle: texts(sec, "subTitle"),
    }
}

fn texts(sec: &Element, name: &str) -> Vec<String> {
    sec.find_all(name)
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn issue_metadata(sec: &Element, path: &Path) -> Result<IssueMetadata> {
    let title_info = sec.find("titleInfo");
    let raw_date = sec
        .find_text("dateIssued")
        .ok_or_else(|| Error::malformed(path, "issue section has no dateIssued"))?;
    let date = normalize_date(&raw_date)
        .ok_or_else(|| Error::malformed(path, format!("unparseable dateIssued '{raw_date}'")))?;
    Ok(IssueMetadata {
        newspaper_title: title_info.and_then(|t| direct_text(t, "title")),
        newspaper_part: title_info.and_then(|t| direct_text(t, "partNumber")),
        date,
    })
}

fn direct_text(parent: &Element, name: &str) -> Option<String> {
    parent
        .children
        .iter()
        .find(|c| c.name == name)
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `1861-01-01` and `1861` become midnight UTC timestamps; full RFC 3339
/// timestamps are kept verbatim.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if DateTime::parse_from_rfc3339(raw).is_ok() {
        return Some(raw.to_string());
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        let year: i32 = raw.parse().ok().filter(|_| raw.len() == 4)?;
        NaiveDate::from_ymd_opt(year, 1, 1)
    })?;
    Some(format!("{}T00:00:00Z", day.format("%Y-%m-%d")))
}
