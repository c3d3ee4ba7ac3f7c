// # Source Trait
//
// Defines the interface for producing desired endpoints.
//
// ## Implementations
//
// - `StaticSource`: a fixed list
// - `MultiSource`: concatenation of several sources
// - `FilterSource`: wraps another source and narrows its output
// - Workload discovery (services, ingresses) lives outside this crate
//
// ## Usage
//
// ```rust,ignore
// use extdns_core::Source;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* Source implementation */;
//
//     for endpoint in source.endpoints().await? {
//         println!("{}", endpoint);
//     }
//
//     Ok(())
// }
// ```

use crate::endpoint::Endpoint;
use async_trait::async_trait;

/// Trait for endpoint producers
///
/// A source is queried once per reconciliation tick. It must return the
/// complete desired list each time, not a delta.
///
/// # Errors
///
/// A source either returns all of its endpoints or an error. Partial
/// results are never returned.
#[async_trait]
pub trait Source: Send + Sync {
    /// Return the endpoints this source wants published
    async fn endpoints(&self) -> Result<Vec<Endpoint>, crate::Error>;
}

#[async_trait]
impl<S: Source + ?Sized> Source for Box<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, crate::Error> {
        (**self).endpoints().await
    }
}

#[async_trait]
impl<S: Source + ?Sized> Source for std::sync::Arc<S> {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, crate::Error> {
        (**self).endpoints().await
    }
}
