// # Filter Source
//
// Wraps another source and drops endpoints before they reach the planner.
//
// ## Rules
//
// An endpoint survives only if it passes every configured rule:
//
// 1. CIDR exclusion: `A` records whose target parses as an IP inside an
//    excluded network are dropped. Unparseable targets and other record
//    types are kept.
// 2. DNS-name exclusion: literal patterns drop exact matches; `*.suffix`
//    patterns drop names with exactly one label in front of `suffix`.
//    A record literally named `*.suffix` is kept.
// 3. Base-domain inclusion: with suffixes configured, only names under
//    one of them are kept.
//
// Errors from the inner source are returned as they are.

use crate::config::FilterConfig;
use crate::endpoint::{Endpoint, RecordType};
use crate::error::{Error, Result};
use crate::source::DomainFilter;
use crate::traits::Source;
use async_trait::async_trait;
use ipnet::IpNet;
use std::net::IpAddr;
use tracing::debug;

/// A DNS-name exclusion pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsNamePattern {
    /// Exact name
    Exact(String),
    /// `*.suffix`, matching exactly one label in front of `suffix`
    Wildcard {
        /// Everything after `*.`
        suffix: String,
    },
}

impl DnsNamePattern {
    /// Parse a pattern; a leading `*.` makes it a wildcard
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix("*.") {
            Some(suffix) => DnsNamePattern::Wildcard {
                suffix: suffix.to_string(),
            },
            None => DnsNamePattern::Exact(pattern.to_string()),
        }
    }

    /// Whether `name` is excluded by this pattern
    pub fn matches(&self, name: &str) -> bool {
        match self {
            DnsNamePattern::Exact(exact) => name == exact,
            DnsNamePattern::Wildcard { suffix } => {
                // The wildcard record itself is never excluded.
                if name.strip_prefix("*.") == Some(suffix.as_str()) {
                    return false;
                }
                name.strip_suffix(suffix.as_str())
                    .and_then(|prefix| prefix.strip_suffix('.'))
                    .is_some_and(|label| !label.is_empty() && !label.contains('.'))
            }
        }
    }
}

/// Source decorator applying CIDR, DNS-name and base-domain rules
pub struct FilterSource {
    inner: Box<dyn Source>,
    base_domain_filter: DomainFilter,
    exclude_cidrs: Vec<IpNet>,
    exclude_dns: Vec<DnsNamePattern>,
}

impl FilterSource {
    /// Wrap `inner` with the given rules
    pub fn new(
        inner: Box<dyn Source>,
        base_domain_filter: DomainFilter,
        exclude_cidrs: Vec<IpNet>,
        exclude_dns: Vec<String>,
    ) -> Self {
        Self {
            inner,
            base_domain_filter,
            exclude_cidrs,
            exclude_dns: exclude_dns.iter().map(|p| DnsNamePattern::parse(p)).collect(),
        }
    }

    /// Wrap `inner` with the rules from `config`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCidr`] if an ignore range does not parse.
    pub fn from_config(inner: Box<dyn Source>, config: &FilterConfig) -> Result<Self> {
        let exclude_cidrs = parse_cidrs(&config.cidr_ignore)?;
        Ok(Self::new(
            inner,
            config.base_domain_filter.clone(),
            exclude_cidrs,
            config.dns_ignore.clone(),
        ))
    }

    /// Whether `endpoint` passes every configured rule
    pub fn accepts(&self, endpoint: &Endpoint) -> bool {
        if self.excluded_by_cidr(endpoint) {
            debug!("Dropping {}: target in ignored CIDR range", endpoint);
            return false;
        }

        if self.excluded_by_name(endpoint) {
            debug!("Dropping {}: name matches an ignore pattern", endpoint);
            return false;
        }

        if !self.base_domain_filter.matches(&endpoint.dns_name) {
            debug!("Dropping {}: outside base domains", endpoint);
            return false;
        }

        true
    }

    fn excluded_by_cidr(&self, endpoint: &Endpoint) -> bool {
        if endpoint.record_type != RecordType::A || self.exclude_cidrs.is_empty() {
            return false;
        }

        match endpoint.target.parse::<IpAddr>() {
            Ok(ip) => self.exclude_cidrs.iter().any(|net| net.contains(&ip)),
            Err(_) => false,
        }
    }

    fn excluded_by_name(&self, endpoint: &Endpoint) -> bool {
        self.exclude_dns
            .iter()
            .any(|pattern| pattern.matches(&endpoint.dns_name))
    }
}

#[async_trait]
impl Source for FilterSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let endpoints = self.inner.endpoints().await?;
        let total = endpoints.len();

        let filtered: Vec<Endpoint> = endpoints
            .into_iter()
            .filter(|endpoint| self.accepts(endpoint))
            .collect();

        debug!("Filter kept {} of {} endpoints", filtered.len(), total);
        Ok(filtered)
    }
}

/// Parse a list of CIDR ranges
pub fn parse_cidrs<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<IpNet>> {
    cidrs
        .iter()
        .map(|cidr| {
            let cidr = cidr.as_ref().trim();
            cidr.parse::<IpNet>()
                .map_err(|e| Error::invalid_cidr(format!("{}: {}", cidr, e)))
        })
        .collect()
}
