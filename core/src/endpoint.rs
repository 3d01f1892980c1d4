//! Operations on one remote collection.
//!
//! # Design
//! `ResourceEndpoint` borrows a `Session` and a `Transport` and is
//! parameterized by a `ResourceDescriptor`; there is no per-resource type.
//! Each operation exists twice:
//! - `build_*` / `parse_*` produce the request and read the response as
//!   plain data, for callers that run the I/O themselves;
//! - `list`, `get`, `search`, `create`, `page`, `full_list` run the
//!   round-trip through the transport and always return an `Envelope`.
//!
//! Calls are blocking and strictly sequential.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::normalize::{normalize, RequestKind};
use crate::resource::{Pagination, ResourceDescriptor};
use crate::session::Session;
use crate::transport::Transport;
use crate::urls;

#[derive(Serialize)]
struct CreatePayload<'a> {
    employer: NewEmployer<'a>,
}

#[derive(Serialize)]
struct NewEmployer<'a> {
    name: &'a str,
    sector_id: &'a str,
    locations_attributes: Location<'a>,
}

#[derive(Serialize)]
struct Location<'a> {
    country_code: &'a str,
}

#[derive(Debug, Clone)]
pub struct ResourceEndpoint<'a, T> {
    session: &'a Session,
    transport: &'a T,
    descriptor: ResourceDescriptor,
}

impl<'a, T> ResourceEndpoint<'a, T> {
    pub const fn new(session: &'a Session, transport: &'a T, descriptor: ResourceDescriptor) -> Self {
        Self {
            session,
            transport,
            descriptor,
        }
    }

    pub const fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub const fn session(&self) -> &Session {
        self.session
    }

    pub fn build_list(&self) -> HttpRequest {
        self.session.build_get_options(self.descriptor.path)
    }

    /// `None` for a blank id: nothing is fetched and `get` answers with an
    /// empty envelope.
    pub fn build_get(&self, id: &str) -> Option<HttpRequest> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        let path = format!("{}/{id}", self.descriptor.path);
        Some(self.session.build_get_options(&path))
    }

    /// Every key is checked against the whitelist before anything is built;
    /// one unknown key rejects the whole search.
    pub fn build_search<K, V>(&self, params: &BTreeMap<K, V>) -> Result<HttpRequest, ApiError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if params.is_empty() {
            return Err(ApiError::MissingSearchParams);
        }
        for key in params.keys() {
            let key = AsRef::<str>::as_ref(key);
            if !self.descriptor.allows_search_param(key) {
                return Err(ApiError::InvalidSearchParam {
                    param: key.to_string(),
                });
            }
        }

        let query = urls::query_string(
            params
                .iter()
                .map(|(k, v)| (AsRef::<str>::as_ref(k), AsRef::<str>::as_ref(v))),
        );
        let path = urls::with_query(&format!("{}/search", self.descriptor.path), &query);
        Ok(self.session.build_get_options(&path))
    }

    pub fn build_page(&self, page: u32, per_page: u32) -> Result<HttpRequest, ApiError> {
        if page < 1 {
            return Err(ApiError::InvalidPage);
        }
        let query = urls::query_string([
            ("page", page.to_string().as_str()),
            ("per_page", per_page.to_string().as_str()),
        ]);
        let path = urls::with_query(self.descriptor.path, &query);
        Ok(self.session.build_get_options(&path))
    }

    /// `Ok(None)` when any field is blank: creation is silently skipped.
    pub fn build_create(
        &self,
        name: &str,
        sector: &str,
        country: &str,
    ) -> Result<Option<HttpRequest>, ApiError> {
        if !self.descriptor.creatable {
            return Err(ApiError::Unsupported {
                operation: "create",
                resource: self.descriptor.name,
            });
        }
        let (name, sector, country) = (name.trim(), sector.trim(), country.trim());
        if name.is_empty() || sector.is_empty() || country.is_empty() {
            return Ok(None);
        }

        let payload = CreatePayload {
            employer: NewEmployer {
                name,
                sector_id: sector,
                locations_attributes: Location {
                    country_code: country,
                },
            },
        };
        self.session
            .build_post_options(&payload, self.descriptor.path)
            .map(Some)
    }

    /// Read a list, single-record, search or create response.
    pub fn parse_keyed(&self, response: &HttpResponse) -> Envelope {
        normalize(response.json().as_ref(), RequestKind::Keyed, &self.descriptor)
    }

    /// Read one page of a listing, using the descriptor's pagination flavour.
    pub fn parse_page(&self, response: &HttpResponse) -> Envelope {
        normalize(response.json().as_ref(), self.page_kind(), &self.descriptor)
    }

    const fn page_kind(&self) -> RequestKind {
        match self.descriptor.pagination {
            Pagination::PageMetadata => RequestKind::Paginated,
            Pagination::ItemCount => RequestKind::Keyed,
        }
    }
}

impl<T: Transport> ResourceEndpoint<'_, T> {
    pub fn list(&self) -> Envelope {
        self.send(&self.build_list(), RequestKind::Keyed)
    }

    pub fn get(&self, id: &str) -> Envelope {
        match self.build_get(id) {
            Some(request) => self.send(&request, RequestKind::Keyed),
            None => Envelope::empty(),
        }
    }

    pub fn search<K, V>(&self, params: &BTreeMap<K, V>) -> Envelope
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self.build_search(params) {
            Ok(request) => self.send(&request, RequestKind::Keyed),
            Err(err) => err.into(),
        }
    }

    pub fn create(&self, name: &str, sector: &str, country: &str) -> Envelope {
        match self.build_create(name, sector, country) {
            Ok(Some(request)) => self.send(&request, RequestKind::Keyed),
            Ok(None) => Envelope::empty(),
            Err(err) => err.into(),
        }
    }

    pub fn page(&self, page: u32, per_page: u32) -> Envelope {
        match self.build_page(page, per_page) {
            Ok(request) => self.send(&request, self.page_kind()),
            Err(err) => err.into(),
        }
    }

    /// All pages at the descriptor's page size.
    pub fn full_list(&self) -> Envelope {
        self.full_list_with(self.descriptor.page_size)
    }

    /// Fetch pages 1, 2, ... and concatenate their records.
    ///
    /// The loop continues only after a successful page that is not the
    /// last one. It stops on an error page, on a short page, on a page
    /// reporting a different number than requested, or on a page whose
    /// records repeat the previous page's. Whatever was gathered so far
    /// is returned. The failing page's error is dropped, so a failure on the
    /// first page reads as an empty collection.
    pub fn full_list_with(&self, per_page: u32) -> Envelope {
        let per_page = per_page.max(1);
        let mut items = Vec::new();
        let mut total = 0_u64;
        let mut page = 1_u32;
        let mut previous_len = 0_usize;

        loop {
            let Envelope::Success {
                items: batch,
                page_info,
                ..
            } = self.page(page, per_page)
            else {
                tracing::debug!(resource = self.descriptor.name, page, "page failed, stopping");
                break;
            };

            if let Some(info) = page_info.filter(|info| info.page != u64::from(page)) {
                tracing::warn!(
                    resource = self.descriptor.name,
                    requested = page,
                    reported = info.page,
                    "page number mismatch, stopping"
                );
                break;
            }

            if !batch.is_empty() && items[items.len() - previous_len..] == batch[..] {
                tracing::warn!(
                    resource = self.descriptor.name,
                    page,
                    "page repeats the previous one, stopping"
                );
                break;
            }

            let fetched = batch.len();
            total += fetched as u64;
            items.extend(batch);
            previous_len = fetched;

            let last = match page_info {
                Some(info) => info.is_last(),
                None => fetched < per_page as usize,
            };
            if last {
                break;
            }
            let Some(next) = page.checked_add(1) else {
                break;
            };
            page = next;
        }

        tracing::debug!(resource = self.descriptor.name, pages = page, total, "full listing done");
        Envelope::Success {
            total,
            items,
            page_info: None,
        }
    }

    fn send(&self, request: &HttpRequest, kind: RequestKind) -> Envelope {
        self.session.log_request(request);
        match self.transport.execute(request) {
            Ok(response) => normalize(response.json().as_ref(), kind, &self.descriptor),
            Err(err) => {
                tracing::warn!(endpoint = %request.url, error = %err, "request failed");
                ApiError::TransportFailure.into()
            }
        }
    }
}
