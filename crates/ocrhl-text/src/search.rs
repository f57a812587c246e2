use anyhow::Result;
use tantivy::collector::{FacetCollector, TopDocs};
use tantivy::query::{AllQuery, Query, QueryParser};
use tantivy::schema::{Facet, Field, Value};
use tantivy::{Index, TantivyDocument};

use crate::index::RecordFields;
use crate::tantivy_utils::{register_tokenizer, SEARCH_FIELDS};

pub struct RecordSearchEngine {
	index: Index,
	searcher: tantivy::Searcher,
	fields: RecordFields,
}

#[derive(Debug, Clone)]
pub struct RecordHit {
	pub score: f32,
	pub id: String,
	pub date: String,
	pub title: Vec<String>,
	/// Stored pointer, ready for the highlighter.
	pub pointer: String,
}

impl RecordSearchEngine {
	pub fn open(index_dir: std::path::PathBuf) -> Result<Self, anyhow::Error> {
		let index = Index::open_in_dir(&index_dir)?;
		register_tokenizer(&index);
		let reader = index.reader()?; let searcher = reader.searcher();
		let fields = RecordFields::from_schema(&index.schema())?;
		Ok(Self { index, searcher, fields })
	}

	pub fn num_docs(&self) -> u64 { self.searcher.num_docs() }

	pub fn search(&self, query_text: &str, limit: usize) -> Result<Vec<RecordHit>, anyhow::Error> {
		let query = self.parse(query_text)?;
		let top_docs = self.searcher.search(&*query, &TopDocs::with_limit(limit))?;
		let mut results = Vec::new();
		for (score, doc_address) in top_docs {
			let doc: TantivyDocument = self.searcher.doc(doc_address)?;
			results.push(RecordHit {
				score,
				id: first(&doc, self.fields.id),
				date: first(&doc, self.fields.date),
				title: doc.get_all(self.fields.title).filter_map(|v| v.as_str()).map(str::to_string).collect(),
				pointer: first(&doc, self.fields.ocr_text),
			});
		}
		Ok(results)
	}

	/// Hit counts per direct child of `parent` in the `/source/year` facet.
	pub fn facet_counts(&self, query_text: &str, parent: &str) -> Result<Vec<(String, u64)>, anyhow::Error> {
		let query = self.parse(query_text)?;
		let parent = Facet::from_text(parent)?;
		let mut facet_collector = FacetCollector::for_field("source_year");
		facet_collector.add_facet(parent.clone());
		let facet_counts = self.searcher.search(&*query, &facet_collector)?;
		let facets = facet_counts.get(&parent.to_string()).map(|(facet, count)| (facet.to_string(), count)).collect();
		Ok(facets)
	}

	/// `*` matches every record.
	fn parse(&self, query_text: &str) -> Result<Box<dyn Query>, anyhow::Error> {
		if query_text.trim() == "*" { return Ok(Box::new(AllQuery)); }
		let schema = self.index.schema();
		let fields = SEARCH_FIELDS.iter().map(|name| schema.get_field(name)).collect::<tantivy::Result<Vec<_>>>()?;
		let query_parser = QueryParser::for_index(&self.index, fields);
		Ok(query_parser.parse_query(query_text)?)
	}
}

fn first(doc: &TantivyDocument, field: Field) -> String {
	doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string()
}
