use crate::error::{DblError, Result};

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const MAX_SEARCH_LIMIT: u32 = 500;

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub search: String,
    pub limit: u32,
    pub offset: u32,
    pub sort: Option<String>,
    /// Comma separated list of fields to search in.
    pub fields: Option<String>,
}

impl SearchQuery {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
            sort: None,
            fields: None,
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn sort_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit > MAX_SEARCH_LIMIT {
            return Err(DblError::InvalidParams {
                reason: format!("limit {} exceeds maximum of {MAX_SEARCH_LIMIT}", self.limit),
            });
        }
        Ok(())
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("search", self.search.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(ref sort) = self.sort
            && !sort.is_empty()
        {
            query.push(("sort", sort.clone()));
        }
        if let Some(ref fields) = self.fields
            && !fields.is_empty()
        {
            query.push(("fields", fields.clone()));
        }
        query
    }
}
