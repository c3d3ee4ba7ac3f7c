//! Fixed endpoint list

use crate::endpoint::{Endpoint, RecordType, Ttl};
use crate::error::{Error, Result};
use crate::traits::Source;
use async_trait::async_trait;
use std::net::IpAddr;

/// Source returning the same endpoints on every call
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    endpoints: Vec<Endpoint>,
}

impl StaticSource {
    /// Create a source from a list of endpoints
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Parse a comma-separated list of `name:TYPE:target[:ttl]` entries
    ///
    /// Blank entries are skipped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use extdns_core::source::StaticSource;
    ///
    /// let source = StaticSource::parse("foo.example.org:A:1.2.3.4:300,bar.example.org:CNAME:lb.example.org")
    ///     .unwrap();
    /// assert_eq!(source.len(), 2);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let endpoints = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(endpoints))
    }

    /// Number of endpoints
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the source is empty
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn parse_entry(entry: &str) -> Result<Endpoint> {
    let mut parts = entry.splitn(3, ':');
    let (Some(name), Some(record_type), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::config(format!(
            "Invalid endpoint '{}', expected name:TYPE:target[:ttl]",
            entry
        )));
    };

    let (target, ttl) = split_ttl(rest)
        .map_err(|e| Error::config(format!("Invalid TTL in '{}': {}", entry, e)))?;

    if name.is_empty() || target.is_empty() {
        return Err(Error::config(format!(
            "Invalid endpoint '{}', name and target are required",
            entry
        )));
    }

    Ok(Endpoint::new(name, RecordType::from(record_type), target).with_ttl(ttl))
}

/// Split an optional trailing `:ttl` off the target
///
/// IPv6 targets contain colons: a bare IPv6 literal never carries a TTL,
/// the bracketed form `[2001:db8::1]:300` does.
fn split_ttl(rest: &str) -> std::result::Result<(&str, Ttl), std::num::ParseIntError> {
    if let Some(bracketed) = rest.strip_prefix('[') {
        if let Some((target, tail)) = bracketed.split_once(']') {
            return match tail.strip_prefix(':') {
                Some(ttl) => Ok((target, Ttl::new(ttl.parse()?))),
                None => Ok((target, Ttl::unconfigured())),
            };
        }
    }

    if rest.parse::<IpAddr>().is_ok() {
        return Ok((rest, Ttl::unconfigured()));
    }

    match rest.rsplit_once(':') {
        Some((target, ttl)) if !ttl.is_empty() && ttl.bytes().all(|b| b.is_ascii_digit()) => {
            Ok((target, Ttl::new(ttl.parse()?)))
        }
        _ => Ok((rest, Ttl::unconfigured())),
    }
}

#[async_trait]
impl Source for StaticSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        Ok(self.endpoints.clone())
    }
}
