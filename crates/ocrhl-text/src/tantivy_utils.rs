use tantivy::schema::{Schema, TextFieldIndexing, TextOptions, IndexRecordOption, FacetOptions, STRING, STORED};
use tantivy::tokenizer::{TextAnalyzer, SimpleTokenizer, LowerCaser, AsciiFoldingFilter, StopWordFilter};
use tantivy::Index;

pub const TOKENIZER: &str = "fr_folded";

/// Fields searched by default: the descriptive ones.
pub const SEARCH_FIELDS: [&str; 4] = ["title", "subtitle", "author", "newspaper_title"];

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	schema_builder.add_text_field("id", STRING | STORED);
	schema_builder.add_text_field("source", STRING | STORED);
	schema_builder.add_text_field("issue_id", STRING | STORED);
	schema_builder.add_text_field("date", STRING | STORED);
	schema_builder.add_text_field("newspaper_title", text_options.clone());
	schema_builder.add_text_field("newspaper_part", STRING | STORED);
	schema_builder.add_text_field("author", text_options.clone());
	schema_builder.add_text_field("title", text_options.clone());
	schema_builder.add_text_field("subtitle", text_options);
	// the pointer is opaque to search, only stored for the highlighter
	schema_builder.add_text_field("ocr_text", STORED);
	schema_builder.add_facet_field("source_year", FacetOptions::default());
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","au","aux","avec","ce","ces","dans","de","des","du","elle","en","et","eux","il","je","la","le","les","leur","lui","ma","mais","me","même","mes","moi","mon","ne","nos","notre","nous","on","ou","par","pas","pour","qu","que","qui","sa","se","ses","son","sur","ta","te","tes","toi","ton","tu","un","une","vos","votre","vous","c","d","j","l","m","n","s","t","y","été","est","sont",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TOKENIZER, tokenizer);
}

/// `/<source>/<year>`; records without a leading year land under `/<source>/unknown`.
pub fn source_year_facet(source: &str, date: &str) -> String {
	let year = date.get(..4).filter(|y| y.bytes().all(|b| b.is_ascii_digit())).unwrap_or("unknown");
	format!("/{}/{}", source, year)
}
