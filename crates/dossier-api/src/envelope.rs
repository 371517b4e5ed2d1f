//!
//! Shapes the backend wraps its payloads in
//!

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sonic_rs::{JsonValueTrait, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// `{ "data": .. }` envelope
///
/// Fields next to `data` are ignored
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// Payload
    pub data: T,
}

/// Sort direction of list endpoints
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,

    /// Descending
    Desc,
}

/// Pagination, search and filter parameters of list endpoints
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Page to fetch, starting at 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Field to sort by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Sort direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    /// Endpoint-specific filters
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Add an endpoint-specific filter
    #[must_use]
    pub fn filter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// Failure to make sense of a list response
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Body isn't JSON or its items don't match the requested type
    #[error(transparent)]
    Json(#[from] sonic_rs::Error),

    /// Body is JSON but none of the known list shapes
    #[error("Unrecognised list response shape")]
    UnknownShape,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    success: bool,
    data: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paged<T> {
    data: Vec<T>,
    count: Option<u64>,
    total_count: Option<u64>,
}

/// Response of an array-returning endpoint
///
/// The backend isn't consistent about the shape, so the variant is picked by looking at the JSON first
#[derive(Clone, Debug, PartialEq)]
pub enum ListResponse<T> {
    /// `{ "success": .., "data": [..] }`
    Wrapped {
        /// Success flag reported by the server
        success: bool,
        /// Items
        data: Vec<T>,
    },

    /// `{ "data": [..], "count": .., "totalCount": .. }`
    Paged {
        /// Items
        data: Vec<T>,
        /// Amount of items on this page
        count: Option<u64>,
        /// Amount of items across all pages
        total_count: Option<u64>,
    },

    /// `[..]`
    Bare(Vec<T>),
}

impl<T> ListResponse<T>
where
    T: DeserializeOwned,
{
    /// Parse a list response body
    ///
    /// # Errors
    ///
    /// - The body isn't JSON
    /// - The body doesn't match any of the known shapes
    /// - The items don't deserialise into `T`
    pub fn parse(body: &[u8]) -> Result<Self, ShapeError> {
        let value: Value = sonic_rs::from_slice(body)?;

        if value.is_array() {
            return Ok(Self::Bare(sonic_rs::from_slice(body)?));
        }

        if value.get("success").is_some() {
            let Wrapped { success, data } = sonic_rs::from_slice(body)?;
            return Ok(Self::Wrapped { success, data });
        }

        if value.get("data").is_some() {
            let Paged {
                data,
                count,
                total_count,
            } = sonic_rs::from_slice(body)?;

            return Ok(Self::Paged {
                data,
                count,
                total_count,
            });
        }

        Err(ShapeError::UnknownShape)
    }
}

impl<T> ListResponse<T> {
    /// Items of the response
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Wrapped { data, .. } | Self::Paged { data, .. } | Self::Bare(data) => data,
        }
    }

    /// Take the items out of the response
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Wrapped { data, .. } | Self::Paged { data, .. } | Self::Bare(data) => data,
        }
    }

    /// Total amount of items across all pages, if the server reported it
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        match self {
            Self::Paged {
                count, total_count, ..
            } => total_count.or(*count),
            Self::Wrapped { .. } | Self::Bare(..) => None,
        }
    }
}
