//! Public API facade for the SPA.
//!
//! A [`QueryProcessor`] wraps a fully-populated [`Pkb`] and answers PQL
//! queries. It is a plain value: construct one per analyzed program and
//! pass it wherever the test-harness adapter needs it. Populating the
//! PKB is the job of the upstream SIMPLE parser and design extractor.

pub use spa_error::{Result, SpaError};
pub use spa_evaluator::evaluate;
pub use spa_parser::{parse_pql, Query, Tokenizer};
pub use spa_pkb::{CfgAdjacency, Pkb};
pub use spa_types::{IntRef, Interner, Row, Table};

/// Answers PQL queries against one program's knowledge base.
#[derive(Debug)]
pub struct QueryProcessor {
    pkb: Pkb,
}

impl QueryProcessor {
    /// Wrap a populated knowledge base.
    #[must_use]
    pub fn new(pkb: Pkb) -> Self {
        Self { pkb }
    }

    /// The wrapped knowledge base.
    #[must_use]
    pub fn pkb(&self) -> &Pkb {
        &self.pkb
    }

    /// Evaluate a query, surfacing lex and syntax errors to the caller.
    /// Semantic errors are not fatal: the query answers empty.
    pub fn try_evaluate(&self, query_text: &str) -> Result<Vec<String>> {
        let query = parse_pql(query_text)?;
        Ok(evaluate(&self.pkb, &query))
    }

    /// Evaluate a query with the batch-driver recovery policy: a query
    /// that fails to tokenize or parse answers with the empty list and
    /// the run continues.
    #[must_use]
    pub fn evaluate(&self, query_text: &str) -> Vec<String> {
        match self.try_evaluate(query_text) {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(target: "spa", error = %err, "query aborted");
                Vec::new()
            }
        }
    }
}
