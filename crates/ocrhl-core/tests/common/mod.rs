#![allow(dead_code)]

use std::fs;
use std::path::Path;

use ocrhl_core::config::IngestConfig;

pub const PAGE1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v2#"><Layout><Page ID="P1"><PrintSpace>
<TextBlock ID="blk1"><TextLine><String CONTENT="Nouvelles"/><String CONTENT="de"/></TextLine></TextBlock>
<TextBlock ID="blk3"><TextLine><String CONTENT="Annonce"/></TextLine></TextBlock>
</PrintSpace></Page></Layout></alto>"#;

pub const PAGE2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v2#"><Layout><Page ID="P2"><PrintSpace>
<TextBlock ID="blk2"><TextLine><String CONTENT="Paris"/></TextLine></TextBlock>
</PrintSpace></Page></Layout></alto>"#;

/// A METS document with the usual issue and article sections around the
/// given logical `div`s.
pub fn mets_document(logical_divs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:mods="http://www.loc.gov/mods/v3" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:dmdSec ID="MODSMD_PRINT"><mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
    <mods:titleInfo><mods:title>L'UNION.</mods:title><mods:partNumber>1</mods:partNumber></mods:titleInfo>
    <mods:originInfo><mods:dateIssued>1861-01-01</mods:dateIssued></mods:originInfo>
  </mods:mods></mets:xmlData></mets:mdWrap></mets:dmdSec>
  <mets:dmdSec ID="MODSMD_ARTICLE1"><mets:mdWrap MDTYPE="MODS"><mets:xmlData><mods:mods>
    <mods:titleInfo><mods:title>Nouvelles</mods:title><mods:subTitle>de Paris</mods:subTitle></mods:titleInfo>
    <mods:name><mods:namePart>Jean</mods:namePart><mods:namePart>Dupont</mods:namePart>
      <mods:role><mods:roleTerm>aut</mods:roleTerm></mods:role></mods:name>
  </mods:mods></mets:xmlData></mets:mdWrap></mets:dmdSec>
  <mets:fileSec>
    <mets:fileGrp USE="Text">
      <mets:file ID="ALTO1"><mets:FLocat LOCTYPE="URL" xlink:href="file://./text/p1.xml"/></mets:file>
      <mets:file ID="ALTO2"><mets:FLocat LOCTYPE="URL" xlink:href="file://./text/p2.xml"/></mets:file>
    </mets:fileGrp>
  </mets:fileSec>
  <mets:structMap TYPE="LOGICAL"><mets:div TYPE="Newspaper">
{logical_divs}
  </mets:div></mets:structMap>
</mets:mets>"#
    )
}

pub fn article_div(id: &str, dmd_id: &str, areas: &[(&str, &str)]) -> String {
    let areas: String = areas
        .iter()
        .map(|(begin, file_id)| format!(r#"<mets:area BEGIN="{begin}" FILEID="{file_id}" BETYPE="IDREF"/>"#))
        .collect();
    format!(r#"<mets:div TYPE="ARTICLE" ID="{id}" DMDID="{dmd_id}"><mets:fptr><mets:seq>{areas}</mets:seq></mets:fptr></mets:div>"#)
}

/// Write one issue directory with its METS file and the two standard pages.
pub fn write_issue(root: &Path, dir_name: &str, mets: &str) {
    let dir = root.join(dir_name);
    fs::create_dir_all(dir.join("text")).expect("create issue dir");
    fs::write(dir.join(format!("{dir_name}-mets.xml")), mets).expect("write mets");
    fs::write(dir.join("text/p1.xml"), PAGE1).expect("write p1");
    fs::write(dir.join("text/p2.xml"), PAGE2).expect("write p2");
}

pub fn ingest_config(root: &Path) -> IngestConfig {
    IngestConfig {
        corpus_root: root.to_path_buf(),
        sort_issues: true,
        ..IngestConfig::default()
    }
}

/// `[start:end]` of the `TextBlock` with `id` inside `page`.
pub fn block_range(page: &str, id: &str) -> (usize, usize) {
    let start = page.find(&format!(r#"<TextBlock ID="{id}""#)).expect("block start");
    let close = "</TextBlock>";
    let end = start + page[start..].find(close).expect("block end") + close.len();
    (start, end)
}
