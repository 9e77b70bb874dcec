//! DNS records and the options for listing and creating them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::EnumString;

use crate::query::Query;
use crate::utils::deserialize_null_default;
use crate::zone::ZoneId;
use crate::Payload;

/// Record types the Hetzner DNS API supports.
///
/// Types this crate doesn't know yet are kept verbatim in [Type::Other], so
/// a listing containing them still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Type {
    A,
    Aaaa,
    Ns,
    Mx,
    Cname,
    Rp,
    Txt,
    Soa,
    Hinfo,
    Srv,
    Dane,
    Tlsa,
    Ds,
    Caa,
    #[strum(default)]
    Other(String),
}

impl Type {
    /// Gets the string representation of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Type::A => "A",
            Type::Aaaa => "AAAA",
            Type::Ns => "NS",
            Type::Mx => "MX",
            Type::Cname => "CNAME",
            Type::Rp => "RP",
            Type::Txt => "TXT",
            Type::Soa => "SOA",
            Type::Hinfo => "HINFO",
            Type::Srv => "SRV",
            Type::Dane => "DANE",
            Type::Tlsa => "TLSA",
            Type::Ds => "DS",
            Type::Caa => "CAA",
            Type::Other(type_) => type_,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.parse() {
            Ok(type_) => type_,
            Err(_) => Type::Other(s),
        })
    }
}

/// A DNS record, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub type_: Type,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub created: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub modified: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub zone_id: ZoneId,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub value: String,
    /// `None` when the record uses the zone's default TTL.
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Filters for listing records. Zero and empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRecordsOptions {
    pub page: u32,
    pub per_page: u32,
    pub zone_id: ZoneId,
}

impl ListRecordsOptions {
    pub(crate) fn query(&self) -> Query {
        Query::new()
            .add_if_nonzero("page", self.page)
            .add_if_nonzero("per_page", self.per_page)
            .add_if_nonempty("zone_id", self.zone_id.as_str())
    }
}

/// A record to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordOptions {
    pub name: String,
    /// Leave unset to use the zone's default TTL.
    pub ttl: Option<u64>,
    pub type_: Type,
    pub value: String,
    pub zone_id: ZoneId,
}

impl CreateRecordOptions {
    pub(crate) fn payload(&self) -> Payload {
        Payload::new()
            .add("name", self.name.as_str())
            .add_if_some("ttl", self.ttl)
            .add("type", self.type_.as_str())
            .add("value", self.value.as_str())
            .add("zone_id", self.zone_id.as_str())
    }
}
