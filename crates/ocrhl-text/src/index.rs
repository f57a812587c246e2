use anyhow::Result;
use std::path::{Path, PathBuf};
use tantivy::schema::{Facet, Field, Schema};
use tantivy::{doc, Index, IndexWriter, Term};

use ocrhl_core::traits::RecordSink;
use ocrhl_core::types::ArticleRecord;

use crate::tantivy_utils::{build_schema, register_tokenizer, source_year_facet};

/// Field handles shared by the writer and the search engine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordFields {
	pub id: Field,
	pub source: Field,
	pub issue_id: Field,
	pub date: Field,
	pub newspaper_title: Field,
	pub newspaper_part: Field,
	pub author: Field,
	pub title: Field,
	pub subtitle: Field,
	pub ocr_text: Field,
	pub source_year: Field,
}

impl RecordFields {
	pub(crate) fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
		Ok(Self {
			id: schema.get_field("id")?,
			source: schema.get_field("source")?,
			issue_id: schema.get_field("issue_id")?,
			date: schema.get_field("date")?,
			newspaper_title: schema.get_field("newspaper_title")?,
			newspaper_part: schema.get_field("newspaper_part")?,
			author: schema.get_field("author")?,
			title: schema.get_field("title")?,
			subtitle: schema.get_field("subtitle")?,
			ocr_text: schema.get_field("ocr_text")?,
			source_year: schema.get_field("source_year")?,
		})
	}
}

pub struct TantivyRecordIndex {
	index: Index,
	index_dir: PathBuf,
	fields: RecordFields,
}

impl TantivyRecordIndex {
	/// Create an empty index, replacing whatever is in `index_dir`.
	pub fn create(index_dir: PathBuf) -> Result<Self, anyhow::Error> {
		let schema = build_schema();
		if index_dir.exists() { std::fs::remove_dir_all(&index_dir)?; }
		std::fs::create_dir_all(&index_dir)?;
		let index = Index::create_in_dir(&index_dir, schema.clone())?;
		register_tokenizer(&index);
		let fields = RecordFields::from_schema(&schema)?;
		Ok(Self { index, index_dir, fields })
	}

	/// Open an existing index for appending, or create one if `index_dir` holds none.
	pub fn open_or_create(index_dir: PathBuf) -> Result<Self, anyhow::Error> {
		if !index_dir.join("meta.json").exists() { return Self::create(index_dir); }
		let index = Index::open_in_dir(&index_dir)?;
		register_tokenizer(&index);
		let fields = RecordFields::from_schema(&index.schema())?;
		Ok(Self { index, index_dir, fields })
	}

	pub fn index_dir(&self) -> &Path { &self.index_dir }

	pub fn num_docs(&self) -> Result<u64, anyhow::Error> {
		Ok(self.index.reader()?.searcher().num_docs())
	}

	fn write(&self, records: &[ArticleRecord]) -> tantivy::Result<()> {
		let f = self.fields;
		let mut index_writer: IndexWriter = self.index.writer(50_000_000)?;
		for r in records {
			// re-ingesting an issue replaces its records
			index_writer.delete_term(Term::from_field_text(f.id, &r.id));
			let facet = source_year_facet(&r.source, &r.date);
			let mut document = doc!(
				f.id => r.id.clone(),
				f.source => r.source.clone(),
				f.date => r.date.clone(),
				f.ocr_text => r.ocr_text.clone(),
				f.source_year => Facet::from(facet.as_str()),
			);
			if let Some(issue_id) = &r.issue_id { document.add_text(f.issue_id, issue_id); }
			if let Some(title) = &r.newspaper_title { document.add_text(f.newspaper_title, title); }
			if let Some(part) = &r.newspaper_part { document.add_text(f.newspaper_part, part); }
			for author in &r.author { document.add_text(f.author, author); }
			for title in &r.title { document.add_text(f.title, title); }
			for subtitle in &r.subtitle { document.add_text(f.subtitle, subtitle); }
			index_writer.add_document(document)?;
		}
		index_writer.commit()?;
		tracing::debug!(records = records.len(), index = %self.index_dir.display(), "committed batch");
		Ok(())
	}
}

impl RecordSink for TantivyRecordIndex {
	fn submit(&self, records: &[ArticleRecord]) -> ocrhl_core::Result<()> {
		self.write(records).map_err(|e| ocrhl_core::Error::LocalIndex { path: self.index_dir.clone(), message: e.to_string() })
	}
}
