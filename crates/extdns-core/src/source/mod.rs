//! Endpoint sources
//!
//! - [`FilterSource`]: narrows another source's output
//! - [`StaticSource`]: a fixed endpoint list
//! - [`MultiSource`]: concatenates several sources
//! - [`DomainFilter`]: suffix matcher shared with providers

pub mod domain_filter;
pub mod filter;
pub mod multi;
pub mod static_source;

pub use domain_filter::DomainFilter;
pub use filter::{DnsNamePattern, FilterSource, parse_cidrs};
pub use multi::MultiSource;
pub use static_source::StaticSource;
