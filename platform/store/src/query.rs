use serde_json::Value;

/// Filter description for [`crate::EntityStore::filter`]: field→value
/// equality predicates, an optional sort field (`-` prefix descends) and an
/// optional result cap.
#[derive(Clone, Debug, Default)]
pub struct Query {
    predicates: Vec<(String, Value)>,
    sort: Option<String>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push((field.into(), value.into()));
        self
    }

    /// Sort by a field name; prefix with `-` for descending order.
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicates(&self) -> &[(String, Value)] {
        &self.predicates
    }

    /// Sort as `(field, descending)`, with the `-` prefix already stripped.
    pub fn sort(&self) -> Option<(&str, bool)> {
        self.sort.as_deref().map(|raw| match raw.strip_prefix('-') {
            Some(field) => (field, true),
            None => (raw, false),
        })
    }

    pub fn cap(&self) -> Option<usize> {
        self.limit
    }
}
