//! The uniform result returned by every endpoint operation.
//!
//! # Design
//! `Envelope` is a two-variant tagged union. Successful calls carry the
//! records as raw JSON values (the partner API's record shapes are not
//! modelled), a count, and page metadata for paginated listings. Failures
//! carry the `ApiError` that caused them so callers can still match on the
//! kind; the serialized form only exposes its message.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ApiError;

/// Pagination metadata copied from a paginated listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub per_page: u64,
}

impl PageInfo {
    pub const fn is_last(&self) -> bool {
        self.page == self.total_pages
    }
}

/// Success or error, never both.
///
/// For a single response `total == items.len()`. The aggregate produced by
/// `full_list` reports the running sum across pages.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success {
        total: u64,
        items: Vec<Value>,
        page_info: Option<PageInfo>,
    },
    Error(ApiError),
}

impl Envelope {
    /// `{total: 0, items: []}`, the answer to calls skipped for blank input.
    pub const fn empty() -> Self {
        Envelope::Success {
            total: 0,
            items: Vec::new(),
            page_info: None,
        }
    }

    pub fn from_items(items: Vec<Value>) -> Self {
        Envelope::Success {
            total: items.len() as u64,
            items,
            page_info: None,
        }
    }

    pub fn from_page(items: Vec<Value>, page_info: PageInfo) -> Self {
        Envelope::Success {
            total: items.len() as u64,
            items,
            page_info: Some(page_info),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }

    pub fn total(&self) -> u64 {
        match self {
            Envelope::Success { total, .. } => *total,
            Envelope::Error(_) => 0,
        }
    }

    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Envelope::Success { items, .. } => Some(items),
            Envelope::Error(_) => None,
        }
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        match self {
            Envelope::Success { page_info, .. } => page_info.as_ref(),
            Envelope::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Error(err) => Some(err),
        }
    }

    /// The error message: a JSON string, or the upstream payload verbatim.
    pub fn message(&self) -> Option<Value> {
        self.error().map(ApiError::message)
    }
}

impl From<ApiError> for Envelope {
    fn from(err: ApiError) -> Self {
        Envelope::Error(err)
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Wire<'a> {
    Success {
        total: u64,
        items: &'a [Value],
        #[serde(skip_serializing_if = "Option::is_none")]
        page_info: Option<&'a PageInfo>,
    },
    Error {
        message: Value,
    },
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Envelope::Success {
                total,
                items,
                page_info,
            } => Wire::Success {
                total: *total,
                items,
                page_info: page_info.as_ref(),
            },
            Envelope::Error(err) => Wire::Error {
                message: err.message(),
            },
        };
        wire.serialize(serializer)
    }
}
