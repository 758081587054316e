use anyhow::{Context, Result};
use async_trait::async_trait;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{self, Schema, Value as TantivyValue, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use super::KnowledgeRetriever;
use crate::types::{CorpusChunk, Passage};

const WRITER_MEMORY_BYTES: usize = 15_000_000;

/// In-memory BM25 index over the knowledge base chunks.
pub struct KnowledgeIndex {
    index: Index,
    reader: IndexReader,
    writer: parking_lot::Mutex<IndexWriter>,
    id_field: schema::Field,
    text_field: schema::Field,
    source_field: schema::Field,
}

impl KnowledgeIndex {
    fn build_schema() -> (Schema, schema::Field, schema::Field, schema::Field) {
        let mut sb = Schema::builder();
        let id_field = sb.add_text_field("id", STRING | STORED);
        let text_field = sb.add_text_field("text", TEXT | STORED);
        let source_field = sb.add_text_field("source", STRING | STORED);
        (sb.build(), id_field, text_field, source_field)
    }

    pub fn in_memory() -> Result<Self> {
        let (schema, id_field, text_field, source_field) = Self::build_schema();
        let index = Index::create_in_ram(schema);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .context("Failed to create Tantivy reader")?;

        let writer = index
            .writer_with_num_threads(1, WRITER_MEMORY_BYTES)
            .context("Failed to create Tantivy writer")?;

        Ok(Self {
            index,
            reader,
            writer: parking_lot::Mutex::new(writer),
            id_field,
            text_field,
            source_field,
        })
    }

    /// Build and commit an index holding `chunks`.
    pub fn from_chunks(chunks: &[CorpusChunk]) -> Result<Self> {
        let index = Self::in_memory()?;
        index.index_chunks(chunks)?;
        index.commit()?;
        tracing::info!(chunks = chunks.len(), "Knowledge index built");
        Ok(index)
    }

    pub fn index_chunks(&self, chunks: &[CorpusChunk]) -> Result<()> {
        let writer = self.writer.lock();
        for chunk in chunks {
            writer.add_document(doc!(
                self.id_field => chunk.id.to_string(),
                self.text_field => chunk.text.as_str(),
                self.source_field => chunk.source.as_str(),
            ))?;
        }
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.commit().context("Tantivy commit failed")?;
        self.reader.reload()?;
        Ok(())
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let terms = query_terms(query);
        if terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let query_parser = QueryParser::for_index(&self.index, vec![self.text_field]);
        let parsed_query = query_parser
            .parse_query(&terms)
            .with_context(|| format!("Failed to parse query terms '{}'", terms))?;

        let top_docs = searcher.search(&parsed_query, &TopDocs::with_limit(k))?;

        let mut passages = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc = searcher.doc::<TantivyDocument>(doc_address)?;
            let Some(body) = doc.get_first(self.text_field).and_then(|v| v.as_str()) else {
                continue;
            };
            let source = doc
                .get_first(self.source_field)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            passages.push(Passage {
                body: body.to_string(),
                source,
            });
        }

        Ok(passages)
    }

    pub fn count(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[async_trait]
impl KnowledgeRetriever for KnowledgeIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let passages = self.search(query, k)?;
        tracing::debug!(passages = passages.len(), k, "Knowledge index lookup");
        Ok(passages)
    }
}

/// Lower-cased word terms of a natural-language question, so punctuation and
/// words like "AND"/"OR" are never read as query syntax.
fn query_terms(query: &str) -> String {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
