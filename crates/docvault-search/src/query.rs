//! Elasticsearch wire format for [`BoolQuery`] and the index definition.

use serde_json::{json, Map, Value};

use docvault_core::{BoolQuery, Clause};

fn clause_json(clause: &Clause) -> Value {
    match clause {
        Clause::Term { field, value } => json!({ "term": { field: value } }),
        Clause::Match {
            field,
            query,
            boost,
        } => {
            let mut body = Map::new();
            body.insert("query".to_string(), Value::from(query.as_str()));
            if let Some(boost) = boost {
                body.insert("boost".to_string(), json!(boost));
            }
            json!({ "match": { field: body } })
        }
    }
}

/// Request body for `_search`.
pub fn search_body(query: &BoolQuery) -> Value {
    let mut bool_body = Map::new();
    if !query.must.is_empty() {
        bool_body.insert(
            "must".to_string(),
            Value::Array(query.must.iter().map(clause_json).collect()),
        );
    }
    if !query.should.is_empty() {
        bool_body.insert(
            "should".to_string(),
            Value::Array(query.should.iter().map(clause_json).collect()),
        );
    }
    if let Some(n) = query.minimum_should_match {
        bool_body.insert("minimum_should_match".to_string(), json!(n));
    }

    json!({
        "query": { "bool": bool_body },
        "size": query.size,
    })
}

/// Index settings and mappings with a language-aware analyzer.
///
/// Text fields use a standard tokenizer followed by lowercasing, the
/// language's stop-word list and its stemmer.
pub fn index_definition(language: &str) -> Value {
    let stop = format!("{}_stop", language);
    let stemmer = format!("{}_stemmer", language);
    let analyzer = format!("rebuilt_{}", language);

    json!({
        "settings": {
            "analysis": {
                "filter": {
                    stop.clone(): { "type": "stop", "stopwords": format!("_{}_", language) },
                    stemmer.clone(): { "type": "stemmer", "language": language }
                },
                "analyzer": {
                    analyzer.clone(): {
                        "tokenizer": "standard",
                        "filter": ["lowercase", stop, stemmer]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "document_id": { "type": "keyword" },
                "tenant_id":   { "type": "keyword" },
                "folder_id":   { "type": "keyword" },
                "name":        { "type": "text", "analyzer": analyzer.clone() },
                "text":        { "type": "text", "analyzer": analyzer },
                "mime_type":   { "type": "keyword" },
                "file_size":   { "type": "long" },
                "indexed_at":  { "type": "date" }
            }
        }
    })
}
