use ocrhl_core::traits::{submit_in_batches, RecordSink};
use ocrhl_core::ArticleRecord;
use ocrhl_text::{RecordSearchEngine, TantivyRecordIndex};

fn record(id: &str, date: &str, title: &str, author: &[&str], pointer: &str) -> ArticleRecord {
    ArticleRecord {
        id: id.to_string(),
        source: "bnl_lunion".to_string(),
        issue_id: id.rsplit_once('-').map(|(issue, _)| issue.to_string()),
        date: date.to_string(),
        newspaper_title: Some("L'UNION.".to_string()),
        newspaper_part: Some("1".to_string()),
        author: author.iter().map(|a| a.to_string()).collect(),
        title: vec![title.to_string()],
        subtitle: vec![],
        ocr_text: pointer.to_string(),
    }
}

fn corpus() -> Vec<ArticleRecord> {
    vec![
        record("1861-01-01-1", "1861-01-01T00:00:00Z", "Nouvelles de Paris", &["Jean Dupont"], "a/text/p1.xml[10:45]+a/text/p2.xml[5:40]"),
        record("1861-01-01-2", "1861-01-01T00:00:00Z", "Élections municipales", &[], "a/text/p1.xml[50:90]"),
        record("1862-03-04-1", "1862-03-04T00:00:00Z", "Chronique locale", &["Marie Weber"], "b/text/p3.xml[0:12]"),
    ]
}

#[test]
fn tantivy_full_flow() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index_dir = tmp.path().join("tantivy");
    let index = TantivyRecordIndex::create(index_dir.clone()).expect("index");
    let submitted = submit_in_batches(&index, corpus().into_iter().map(Ok), 2).expect("submit");
    assert_eq!(submitted, 3);
    assert_eq!(index.num_docs().expect("count"), 3);

    let engine = RecordSearchEngine::open(index_dir.clone()).expect("engine");
    let hits = engine.search("nouvelles", 10).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "1861-01-01-1");
    assert_eq!(hits[0].pointer, "a/text/p1.xml[10:45]+a/text/p2.xml[5:40]");
    assert_eq!(hits[0].title, vec!["Nouvelles de Paris".to_string()]);

    // accents are folded at index and query time
    let hits = engine.search("elections", 10).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "1861-01-01-2");

    let hits = engine.search("weber", 10).expect("search by author");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].date, "1862-03-04T00:00:00Z");

    let mut years = engine.facet_counts("*", "/bnl_lunion").expect("facets");
    years.sort();
    assert_eq!(years, vec![("/bnl_lunion/1861".to_string(), 2), ("/bnl_lunion/1862".to_string(), 1)]);
}

#[test]
fn resubmitting_replaces_records() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let index_dir = tmp.path().join("tantivy");
    let index = TantivyRecordIndex::create(index_dir.clone()).expect("index");
    index.submit(&corpus()).expect("first");
    drop(index);

    let index = TantivyRecordIndex::open_or_create(index_dir.clone()).expect("reopen");
    index.submit(&corpus()[..1]).expect("second");
    assert_eq!(index.num_docs().expect("count"), 3);
    let engine = RecordSearchEngine::open(index_dir).expect("engine");
    assert_eq!(engine.num_docs(), 3);
}
