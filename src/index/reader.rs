use crate::index::schema::Schema;
use crate::index::types::*;
use crate::index::writer::{DOCS_FILE, META_FILE, POSTINGS_FILE, Postings};
use crate::query::SearchQuery;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read-only view of one index generation, fully loaded in memory
pub struct IndexReader {
    pub meta: IndexMeta,
    documents: Vec<Document>,
    /// Field -> term -> ascending doc ids
    postings: FxHashMap<String, FxHashMap<String, Vec<DocId>>>,
}

impl IndexReader {
    /// Open the generation stored in `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        let meta = read_meta(dir)?;
        let documents: Vec<Document> = read_json(&dir.join(DOCS_FILE))?;
        let postings: Postings = read_json(&dir.join(POSTINGS_FILE))?;

        if documents.len() != meta.doc_count as usize {
            anyhow::bail!(
                "Index at {} is inconsistent: meta says {} docs, found {}",
                dir.display(),
                meta.doc_count,
                documents.len()
            );
        }

        let postings = postings
            .into_iter()
            .map(|(field, terms)| (field, terms.into_iter().collect()))
            .collect();

        Ok(Self {
            meta,
            documents,
            postings,
        })
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    /// Ranked search. Every query term must match at least one indexed field.
    /// Results are ordered by descending score, then by doc id, so repeated
    /// searches against the same generation return the same sequence.
    pub fn search(&self, schema: &Schema, query: &SearchQuery, limit: usize) -> Vec<Document> {
        let terms = match query {
            SearchQuery::MatchAll => {
                return self.documents.iter().take(limit).cloned().collect();
            }
            SearchQuery::Terms(terms) => terms,
        };

        let total = self.documents.len().max(1) as f32;
        let mut scores: Option<FxHashMap<DocId, f32>> = None;

        for term in terms {
            let term_scores = self.score_term(schema, term, total);

            scores = Some(match scores {
                None => term_scores,
                Some(mut acc) => {
                    acc.retain(|doc_id, _| term_scores.contains_key(doc_id));
                    for (doc_id, score) in acc.iter_mut() {
                        *score += term_scores[doc_id];
                    }
                    acc
                }
            });

            if scores.as_ref().is_some_and(|s| s.is_empty()) {
                return Vec::new();
            }
        }

        let mut ranked: Vec<(DocId, f32)> = scores.unwrap_or_default().into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(limit)
            .filter_map(|(doc_id, _)| self.documents.get(doc_id as usize).cloned())
            .collect()
    }

    /// Score contribution of one query term for every doc it matches
    fn score_term(&self, schema: &Schema, term: &str, total: f32) -> FxHashMap<DocId, f32> {
        let mut scores: FxHashMap<DocId, f32> = FxHashMap::default();

        for field in schema.indexed_fields() {
            let Some(required) = field.query_terms(term) else {
                continue;
            };
            let Some(field_postings) = self.postings.get(&field.name) else {
                continue;
            };

            let matching = intersect_postings(field_postings, &required);
            if matching.is_empty() {
                continue;
            }

            let idf = (1.0 + total / matching.len() as f32).ln();
            for doc_id in matching {
                *scores.entry(doc_id).or_insert(0.0) += field.boost * idf;
            }
        }

        scores
    }
}

/// Doc ids present in the postings of every required term
fn intersect_postings(postings: &FxHashMap<String, Vec<DocId>>, required: &[String]) -> Vec<DocId> {
    let mut lists: Vec<&Vec<DocId>> = Vec::with_capacity(required.len());
    for term in required {
        match postings.get(term) {
            Some(list) => lists.push(list),
            None => return Vec::new(),
        }
    }

    // Start from the shortest list
    lists.sort_by_key(|l| l.len());
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };

    first
        .iter()
        .copied()
        .filter(|doc_id| rest.iter().all(|l| l.binary_search(doc_id).is_ok()))
        .collect()
}

/// Read just the metadata of a generation
pub fn read_meta(dir: &Path) -> Result<IndexMeta> {
    read_json(&dir.join(META_FILE))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::schema::Field;
    use crate::index::writer::IndexWriter;
    use std::time::Duration;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::keyword("provider").boost(10.0),
            Field::keyword("type").boost(5.0),
            Field::text("cate").boost(2.0),
            Field::text("item"),
            Field::ngram_words("cate_ng", 2, 6).boost(2.0).unstored(),
            Field::ngram_words("item_ng", 2, 6).unstored(),
            Field::stored("desc"),
        ])
    }

    fn doc(provider: &str, ty: &str, cate: &str, item: &str) -> Document {
        Document::new()
            .with("provider", provider)
            .with("type", ty)
            .with("cate", cate)
            .with("cate_ng", cate)
            .with("item", item)
            .with("item_ng", item)
            .with("desc", format!("{item} docs"))
    }

    fn build(docs: &[Document]) -> (tempfile::TempDir, IndexReader) {
        let schema = schema();
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gen");
        let mut writer = IndexWriter::new(CacheKey::new("test"), &schema, Duration::ZERO);
        for d in docs {
            writer.add_document(d);
        }
        writer.write(&dir).unwrap();
        let reader = IndexReader::open(&dir).unwrap();
        (tmp, reader)
    }

    fn items(results: &[Document]) -> Vec<&str> {
        results.iter().map(|d| d.field("item")).collect()
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc("aws", "res", "S3 (Simple Storage)", "s3_bucket"),
            doc("aws", "res", "S3 (Simple Storage)", "s3_bucket_policy"),
            doc("aws", "ds", "IAM", "iam_role"),
            doc("gcp", "res", "Cloud Storage", "storage_bucket"),
        ]
    }

    #[test]
    fn test_match_all_returns_build_order() {
        let (_tmp, reader) = build(&corpus());
        let results = reader.search(&schema(), &SearchQuery::MatchAll, 3);
        assert_eq!(items(&results), vec!["s3_bucket", "s3_bucket_policy", "iam_role"]);
    }

    #[test]
    fn test_all_terms_must_match() {
        let (_tmp, reader) = build(&corpus());
        let results = reader.search(&schema(), &SearchQuery::parse("gcp bucket"), 10);
        assert_eq!(items(&results), vec!["storage_bucket"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let (_tmp, reader) = build(&corpus());
        assert!(reader.search(&schema(), &SearchQuery::parse("lambda"), 10).is_empty());
    }

    #[test]
    fn test_wordless_or_overlong_query_matches_nothing() {
        let (_tmp, reader) = build(&corpus());
        assert!(reader.search(&schema(), &SearchQuery::parse("!!"), 10).is_empty());
        let long = SearchQuery::parse(&"x".repeat(65));
        assert!(reader.search(&schema(), &long, 10).is_empty());
    }

    #[test]
    fn test_partial_word_matches_through_ngrams() {
        let (_tmp, reader) = build(&corpus());
        let results = reader.search(&schema(), &SearchQuery::parse("buck"), 10);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_boosted_keyword_ranks_first() {
        let (_tmp, reader) = build(&corpus());
        // "storage" hits two categories and one item name, the gcp doc in both
        let results = reader.search(&schema(), &SearchQuery::parse("storage"), 10);
        assert_eq!(results[0].field("item"), "storage_bucket");
    }

    #[test]
    fn test_search_is_deterministic() {
        let (_tmp, reader) = build(&corpus());
        let query = SearchQuery::parse("aws s3");
        let first = reader.search(&schema(), &query, 10);
        let second = reader.search(&schema(), &query, 10);
        assert_eq!(first, second);
        assert_eq!(items(&first), vec!["s3_bucket", "s3_bucket_policy"]);
    }

    #[test]
    fn test_results_hold_stored_fields_only() {
        let (_tmp, reader) = build(&corpus());
        let results = reader.search(&schema(), &SearchQuery::parse("iam"), 10);
        assert_eq!(results[0].field("desc"), "iam_role docs");
        assert_eq!(results[0].get("item_ng"), None);
    }

    #[test]
    fn test_limit() {
        let (_tmp, reader) = build(&corpus());
        assert_eq!(reader.search(&schema(), &SearchQuery::parse("aws"), 1).len(), 1);
    }
}
