//! DNS zones and zone listing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::utils::deserialize_null_default;

/// Opaque identifier of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wraps an ID as returned by the API.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ZoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// TXT record the API expects for verifying ownership of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TxtVerification {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub token: String,
}

/// A DNS zone, as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Zone {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub id: ZoneId,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub created: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub modified: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub legacy_dns_host: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub legacy_ns: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub ns: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub owner: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub paused: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub permission: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub project: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub registrar: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub status: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub ttl: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub verified: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub records_count: u64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub is_secondary_dns: bool,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub txt_verification: TxtVerification,
}

/// One page of zones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zones {
    pub zones: Vec<Zone>,
}

/// Metadata returned with a zone listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub pagination: Pagination,
}

/// Describes the remote collection a listed page belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub page: u32,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub per_page: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub last_page: u32,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub total_entries: u64,
}

/// Filters for listing zones. Zero and empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListZonesOptions {
    /// Page to return. The API starts counting at 1.
    pub page: u32,
    /// Zones per page, at most 100.
    pub per_page: u32,
    /// Exact zone name. The API answers 404 if no zone has this name.
    pub name: String,
    /// Partial zone name.
    pub search_name: String,
}

impl ListZonesOptions {
    pub(crate) fn query(&self) -> Query {
        Query::new()
            .add_if_nonzero("page", self.page)
            .add_if_nonzero("per_page", self.per_page)
            .add_if_nonempty("name", &self.name)
            .add_if_nonempty("search_name", &self.search_name)
    }
}
