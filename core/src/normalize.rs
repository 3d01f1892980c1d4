//! Turns a decoded response body into an [`Envelope`].
//!
//! # Design
//! The partner API answers in three shapes: `{"<singular>": {...}}` for one
//! record, `{"<plural>": [...]}` for collections and search, and a flat
//! object with `page`/`total_pages`/`records` for paginated listings. Errors
//! come back as `{"errors": ...}` in any of them. `normalize` is a pure
//! function of the body, the request kind and the descriptor; nothing else
//! is consulted.

use serde::Deserialize;
use serde_json::Value;

use crate::envelope::{Envelope, PageInfo};
use crate::error::ApiError;
use crate::resource::ResourceDescriptor;

/// What the request asked for, which decides how the body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A single record or a bare collection keyed by resource name.
    Keyed,
    /// One page of a paginated listing.
    Paginated,
}

#[derive(Deserialize)]
struct PageBounds {
    page: u64,
    total_pages: u64,
}

#[derive(Deserialize)]
struct PageCounts {
    total_records: u64,
    records_per_page: u64,
}

pub fn normalize(body: Option<&Value>, kind: RequestKind, descriptor: &ResourceDescriptor) -> Envelope {
    let Some(body) = body.filter(|b| !is_blank(b)) else {
        return ApiError::TransportFailure.into();
    };

    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        return ApiError::Upstream(errors.clone()).into();
    }

    match kind {
        RequestKind::Keyed => normalize_keyed(body, descriptor),
        RequestKind::Paginated => normalize_page(body),
    }
}

fn normalize_keyed(body: &Value, descriptor: &ResourceDescriptor) -> Envelope {
    let Some((key, value)) = body.as_object().and_then(|obj| obj.iter().next()) else {
        return ApiError::EmptyResponse.into();
    };
    if !descriptor.accepts_key(key) || value.is_null() {
        return ApiError::EmptyResponse.into();
    }

    if descriptor.is_singular_key(key) {
        return Envelope::from_items(vec![value.clone()]);
    }
    match value {
        Value::Array(items) => Envelope::from_items(items.clone()),
        _ => ApiError::EmptyResponse.into(),
    }
}

fn normalize_page(body: &Value) -> Envelope {
    let Ok(bounds) = PageBounds::deserialize(body) else {
        tracing::debug!("paginated response without usable page metadata");
        return ApiError::EmptyResponse.into();
    };
    if bounds.page > bounds.total_pages {
        return ApiError::InvalidPage.into();
    }
    let Ok(counts) = PageCounts::deserialize(body) else {
        tracing::debug!("paginated response without record counts");
        return ApiError::EmptyResponse.into();
    };
    let Some(records) = body.get("records").and_then(Value::as_array) else {
        return ApiError::EmptyResponse.into();
    };

    Envelope::from_page(
        records.clone(),
        PageInfo {
            page: bounds.page,
            total_pages: bounds.total_pages,
            total_records: counts.total_records,
            per_page: counts.records_per_page,
        },
    )
}

fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyed(body: Value) -> Envelope {
        normalize(Some(&body), RequestKind::Keyed, &ResourceDescriptor::EMPLOYERS)
    }

    fn paged(body: Value) -> Envelope {
        normalize(Some(&body), RequestKind::Paginated, &ResourceDescriptor::EMPLOYERS)
    }

    #[test]
    fn missing_body_is_transport_failure() {
        let env = normalize(None, RequestKind::Keyed, &ResourceDescriptor::EMPLOYERS);
        assert_eq!(env, Envelope::Error(ApiError::TransportFailure));
        assert_eq!(keyed(json!({})), Envelope::Error(ApiError::TransportFailure));
        assert_eq!(paged(Value::Null), Envelope::Error(ApiError::TransportFailure));
    }

    #[test]
    fn errors_field_passes_through() {
        let payload = json!({"sector_id": ["must exist"]});
        let body = json!({"errors": payload});
        assert_eq!(keyed(body.clone()), Envelope::Error(ApiError::Upstream(payload.clone())));
        assert_eq!(paged(body), Envelope::Error(ApiError::Upstream(payload)));
    }

    #[test]
    fn singular_key_is_wrapped() {
        let record = json!({"id": 7, "name": "Acme"});
        let env = keyed(json!({"employer": record}));
        assert_eq!(env.total(), 1);
        assert_eq!(env.items(), Some(&[record][..]));
        assert!(env.page_info().is_none());
    }

    #[test]
    fn collection_key_is_counted() {
        let env = keyed(json!({"employers": [{"id": 1}, {"id": 2}, {"id": 3}]}));
        assert_eq!(env.total(), 3);
        assert_eq!(env.items().unwrap()[2], json!({"id": 3}));
    }

    #[test]
    fn foreign_or_null_key_is_empty_response() {
        assert_eq!(keyed(json!({"sectors": []})), Envelope::Error(ApiError::EmptyResponse));
        assert_eq!(keyed(json!({"employer": null})), Envelope::Error(ApiError::EmptyResponse));
        assert_eq!(keyed(json!({"employers": "nope"})), Envelope::Error(ApiError::EmptyResponse));
    }

    #[test]
    fn first_key_in_document_order_decides() {
        let body: Value =
            serde_json::from_str(r#"{"employers":[{"id":1}],"meta":{"count":1}}"#).unwrap();
        assert_eq!(keyed(body).total(), 1);
        let body: Value =
            serde_json::from_str(r#"{"meta":{"count":1},"employers":[{"id":1}]}"#).unwrap();
        assert_eq!(keyed(body), Envelope::Error(ApiError::EmptyResponse));
    }

    #[test]
    fn page_copies_metadata() {
        let env = paged(json!({
            "page": 2,
            "total_pages": 4,
            "total_records": 80,
            "records_per_page": 25,
            "records": [{"id": 26}, {"id": 27}]
        }));
        assert_eq!(env.total(), 2);
        assert_eq!(
            env.page_info(),
            Some(&PageInfo {
                page: 2,
                total_pages: 4,
                total_records: 80,
                per_page: 25
            })
        );
    }

    #[test]
    fn page_beyond_total_is_invalid() {
        let env = paged(json!({
            "page": 5,
            "total_pages": 4,
            "total_records": 80,
            "records_per_page": 25,
            "records": []
        }));
        assert_eq!(env, Envelope::Error(ApiError::InvalidPage));
        assert_eq!(env.message(), Some(json!("requested page does not exist")));
    }

    #[test]
    fn page_bound_is_checked_before_other_metadata() {
        let env = paged(json!({"page": 3, "total_pages": 2, "records": []}));
        assert_eq!(env, Envelope::Error(ApiError::InvalidPage));

        let env = paged(json!({"page": 3, "total_pages": 2}));
        assert_eq!(env, Envelope::Error(ApiError::InvalidPage));

        let env = paged(json!({"page": 2, "total_pages": 2, "records": []}));
        assert_eq!(env, Envelope::Error(ApiError::EmptyResponse));
    }

    #[test]
    fn malformed_page_metadata_is_empty_response() {
        let env = paged(json!({
            "page": "two",
            "total_pages": 4,
            "total_records": 80,
            "records_per_page": 25,
            "records": []
        }));
        assert_eq!(env, Envelope::Error(ApiError::EmptyResponse));

        let env = paged(json!({
            "page": 1,
            "total_pages": 4,
            "total_records": 80,
            "records_per_page": 25,
            "records": null
        }));
        assert_eq!(env, Envelope::Error(ApiError::EmptyResponse));
    }
}
