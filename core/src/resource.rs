//! Static description of each remote collection.
//!
//! The endpoint engine is generic; everything that differs between
//! employers and sectors lives in a `ResourceDescriptor`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How a full listing knows it has reached the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Responses carry `page`/`total_pages`; stop on the last page.
    PageMetadata,
    /// Responses are bare collections; stop on a short page.
    ItemCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    /// Top-level key of list and search responses.
    pub collection_key: &'static str,
    /// Top-level key wrapping a single record, if the resource has one.
    pub singular_key: Option<&'static str>,
    /// Parameters `search` accepts. Empty means search is always rejected.
    pub search_params: &'static [&'static str],
    pub page_size: u32,
    pub pagination: Pagination,
    pub creatable: bool,
}

impl ResourceDescriptor {
    pub const EMPLOYERS: Self = Self {
        name: "employers",
        path: "employers",
        collection_key: "employers",
        singular_key: Some("employer"),
        search_params: &["employer_name", "country_code"],
        page_size: 25,
        pagination: Pagination::PageMetadata,
        creatable: true,
    };

    pub const SECTORS: Self = Self {
        name: "sectors",
        path: "sectors",
        collection_key: "sectors",
        singular_key: Some("sector"),
        search_params: &[],
        page_size: 15,
        pagination: Pagination::ItemCount,
        creatable: false,
    };

    /// Top-level keys a non-paginated response may use.
    pub fn accepts_key(&self, key: &str) -> bool {
        key == self.collection_key || self.singular_key == Some(key)
    }

    pub fn is_singular_key(&self, key: &str) -> bool {
        self.singular_key == Some(key)
    }

    pub fn allows_search_param(&self, param: &str) -> bool {
        self.search_params.contains(&param)
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// The resources this client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Employers,
    Sectors,
}

impl ResourceKind {
    pub const ALL: [Self; 2] = [ResourceKind::Employers, ResourceKind::Sectors];

    pub const fn descriptor(self) -> ResourceDescriptor {
        match self {
            ResourceKind::Employers => ResourceDescriptor::EMPLOYERS,
            ResourceKind::Sectors => ResourceDescriptor::SECTORS,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Employers => "employers",
            ResourceKind::Sectors => "sectors",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource or auth kind was requested by a name nobody implements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("A context of {0} was not found.")]
pub struct UnknownKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employers" => Ok(ResourceKind::Employers),
            "sectors" => Ok(ResourceKind::Sectors),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}
