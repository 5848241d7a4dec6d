//! Lucene URI search queries and document id handling.

use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// How multiple terms combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum QueryMode {
    /// Any term may match.
    #[default]
    Or,
    /// Every term must match.
    And,
}

impl QueryMode {
    fn operator(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
        }
    }
}

/// A `field:value` URI search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<(String, String)>,
    mode: QueryMode,
}

impl SearchQuery {
    /// An empty query, matching every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// An empty query combining terms with `mode`.
    #[must_use]
    pub fn new(mode: QueryMode) -> Self {
        Self {
            terms: Vec::new(),
            mode,
        }
    }

    /// Add a `field:value` term.
    #[must_use]
    pub fn term(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// Terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    /// Combination mode.
    #[must_use]
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Render the `q` parameter: `k:v` for one term, `(k1:v1)AND(k2:v2)`
    /// for several, `None` when there are no terms.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self.terms.as_slice() {
            [] => None,
            [(field, value)] => Some(format!("{field}:{}", escape(value))),
            terms => Some(
                terms
                    .iter()
                    .map(|(field, value)| format!("({field}:{})", escape(value)))
                    .collect::<Vec<_>>()
                    .join(self.mode.operator()),
            ),
        }
    }
}

/// Quote values containing Lucene syntax characters or whitespace.
fn escape(value: &str) -> String {
    const RESERVED: &[char] = &[
        '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
        '/', ' ',
    ];
    if value.contains(RESERVED) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_owned()
    }
}

/// A document id of the form `doc` or `app.doc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocId {
    /// Owning application, when qualified.
    pub app: Option<String>,
    /// Document name.
    pub doc: String,
}

impl DocId {
    /// Split `app.doc` (or a bare `doc`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocId`] when either part is empty or
    /// outside `[a-zA-Z0-9_-]`, or there is more than one `.`.
    pub fn parse(text: &str) -> StoreResult<Self> {
        let valid = |s: &str| {
            !s.is_empty()
                && s
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
        };

        match text.split_once('.') {
            Some((app, doc)) if valid(app) && valid(doc) => Ok(Self {
                app: Some(app.to_owned()),
                doc: doc.to_owned(),
            }),
            None if valid(text) => Ok(Self {
                app: None,
                doc: text.to_owned(),
            }),
            _ => Err(StoreError::InvalidDocId(text.to_owned())),
        }
    }

    /// An AND query matching this document's `app` and `doc` fields.
    #[must_use]
    pub fn to_query(&self) -> SearchQuery {
        let query = SearchQuery::new(QueryMode::And);
        let query = match &self.app {
            Some(app) => query.term("app", app),
            None => query,
        };
        query.term("doc", &self.doc)
    }
}
