//! Typed full-text query model.
//!
//! Mirrors the bool-query shape used by the search index: mandatory
//! filters in `must`, relevance clauses in `should`, and a minimum number of
//! `should` clauses that have to match. Adapters translate this into their
//! own wire format.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// A single leaf clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Clause {
    /// Exact match on a keyword field.
    Term { field: String, value: String },
    /// Analysed full-text match, optionally boosted.
    Match {
        field: String,
        query: String,
        boost: Option<f32>,
    },
}

impl Clause {
    pub fn term(field: impl Into<String>, value: impl ToString) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn matches(field: impl Into<String>, query: impl Into<String>) -> Self {
        Clause::Match {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    /// Set the boost on a `Match` clause. No-op for `Term`.
    pub fn boosted(self, factor: f32) -> Self {
        match self {
            Clause::Match { field, query, .. } => Clause::Match {
                field,
                query,
                boost: Some(factor),
            },
            term => term,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub minimum_should_match: Option<u32>,
    pub size: usize,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self {
            size: defaults::SEARCH_WINDOW,
            ..Default::default()
        }
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn should(mut self, clause: Clause) -> Self {
        self.should.push(clause);
        self
    }

    pub fn minimum_should_match(mut self, n: u32) -> Self {
        self.minimum_should_match = Some(n);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// The document query: tenant (and optionally folder) as mandatory
    /// filters, and a match on the boosted name or the body text.
    pub fn documents(tenant_id: Uuid, folder_id: Option<Uuid>, text: &str) -> Self {
        let mut query = BoolQuery::new().must(Clause::term("tenant_id", tenant_id));
        if let Some(folder_id) = folder_id {
            query = query.must(Clause::term("folder_id", folder_id));
        }
        query
            .should(Clause::matches("name", text).boosted(defaults::NAME_BOOST))
            .should(Clause::matches("text", text))
            .minimum_should_match(1)
    }
}
