use serde::{Deserialize, Serialize};

/// Arguments selecting one page of a collection.
///
/// Forward and backward paging are distinct variants so that a single request can never carry
/// both `first` and `last`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationArgs {
    /// Walk from oldest to newest: up to `first` items after `cursor`, or from the start of the
    /// collection when no cursor is given.
    Forward {
        first: Option<u32>,
        cursor: Option<String>,
    },
    /// Walk from newest to oldest: up to `last` items before `cursor`.
    Backward { last: Option<u32>, cursor: String },
}

impl PaginationArgs {
    pub fn first(first: u32) -> Self {
        Self::Forward {
            first: Some(first),
            cursor: None,
        }
    }

    pub fn after(cursor: impl Into<String>, first: Option<u32>) -> Self {
        Self::Forward {
            first,
            cursor: Some(cursor.into()),
        }
    }

    pub fn before(cursor: impl Into<String>, last: Option<u32>) -> Self {
        Self::Backward {
            last,
            cursor: cursor.into(),
        }
    }

    pub(crate) fn query(&self) -> PaginationQuery<'_> {
        match self {
            Self::Forward { first, cursor } => PaginationQuery {
                first: *first,
                last: None,
                cursor: cursor.as_deref(),
            },
            Self::Backward { last, cursor } => PaginationQuery {
                first: None,
                last: *last,
                cursor: Some(cursor),
            },
        }
    }
}

/// Wire form of [PaginationArgs]. Absent parameters are omitted from the query string.
#[derive(Debug, Serialize)]
pub(crate) struct PaginationQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult<T> {
    pub pagination: PageInfo,
    pub result: Vec<T>,
}

impl<T> PaginationResult<T> {
    /// Arguments for the page after this one, or `None` once `hasNextPage` is false or the
    /// page carries no `endCursor` to continue from.
    ///
    /// The server's flag is authoritative: an empty `result` with `hasNextPage` set still yields
    /// a next page, and a full page without it does not.
    pub fn next_page(&self, first: Option<u32>) -> Option<PaginationArgs> {
        if !self.pagination.has_next_page {
            return None;
        }
        let cursor = self.pagination.end_cursor.clone()?;
        Some(PaginationArgs::Forward {
            first,
            cursor: Some(cursor),
        })
    }

    /// Arguments for the page before this one, or `None` once `hasPreviousPage` is false.
    pub fn previous_page(&self, last: Option<u32>) -> Option<PaginationArgs> {
        if !self.pagination.has_previous_page {
            return None;
        }
        let cursor = self.pagination.start_cursor.clone()?;
        Some(PaginationArgs::Backward { last, cursor })
    }
}
