// # Endpoint
//
// The DNS record unit that sources produce, the planner diffs and
// providers apply.
//
// An endpoint is identified by its `dns_name` alone when desired and
// current lists are matched. `record_type` and `target` are payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label key carrying the id of the controller instance owning a record
pub const OWNER_LABEL_KEY: &str = "owner";

/// Ownership and bookkeeping metadata attached by the registry
pub type Labels = BTreeMap<String, String>;

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Canonical name record
    Cname,
    /// Text record
    Txt,
    /// Service locator record
    Srv,
    /// Mail exchange record
    Mx,
    /// Name server record
    Ns,
    /// Pointer record
    Ptr,
    /// Any type not known to this crate, kept verbatim
    Other(String),
}

impl RecordType {
    /// Canonical upper-case mnemonic
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Other(other) => other,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            "SRV" => RecordType::Srv,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        RecordType::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecordType::from(s))
    }
}

/// Time-to-live of a record
///
/// `Ttl::unconfigured()` means no TTL was requested. This is distinct
/// from an explicit value, even one equal to a provider default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl(Option<u32>);

impl Ttl {
    /// A TTL explicitly set to `secs`
    pub const fn new(secs: u32) -> Self {
        Self(Some(secs))
    }

    /// No TTL requested
    pub const fn unconfigured() -> Self {
        Self(None)
    }

    /// Whether a TTL was explicitly requested
    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// The configured value, if any
    pub fn get(&self) -> Option<u32> {
        self.0
    }
}

impl From<u32> for Ttl {
    fn from(secs: u32) -> Self {
        Ttl::new(secs)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(secs) => write!(f, "{}", secs),
            None => f.write_str("unconfigured"),
        }
    }
}

/// A single DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Fully-qualified domain name
    pub dns_name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record payload (IP literal, hostname, or text)
    pub target: String,
    /// Requested TTL
    #[serde(default)]
    pub ttl: Ttl,
    /// Ownership metadata
    #[serde(default)]
    pub labels: Labels,
}

impl Endpoint {
    /// Create an endpoint with no TTL and no labels
    pub fn new(
        dns_name: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type,
            target: target.into(),
            ttl: Ttl::unconfigured(),
            labels: Labels::new(),
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The owner id recorded in the labels, if any
    pub fn owner(&self) -> Option<&str> {
        self.labels.get(OWNER_LABEL_KEY).map(String::as_str)
    }

    /// Inherit labels from `other`
    ///
    /// Only keys that are absent or empty on `self` are taken over, so
    /// labels the desired side set explicitly survive.
    pub fn merge_labels(&mut self, other: &Labels) {
        for (key, value) in other {
            match self.labels.get(key) {
                Some(existing) if !existing.is_empty() => {}
                _ => {
                    self.labels.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN {} {}",
            self.dns_name, self.ttl, self.record_type, self.target
        )
    }
}
