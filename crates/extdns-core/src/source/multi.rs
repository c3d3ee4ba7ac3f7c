//! Concatenation of several sources

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::traits::Source;
use async_trait::async_trait;

/// Source returning the endpoints of all children, in order
///
/// The first child error aborts the call; no partial list is returned.
#[derive(Default)]
pub struct MultiSource {
    children: Vec<Box<dyn Source>>,
}

impl MultiSource {
    /// Create a source from a list of children
    pub fn new(children: Vec<Box<dyn Source>>) -> Self {
        Self { children }
    }

    /// Append a child
    pub fn push(&mut self, child: Box<dyn Source>) {
        self.children.push(child);
    }
}

#[async_trait]
impl Source for MultiSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let mut endpoints = Vec::new();
        for child in &self.children {
            endpoints.extend(child.endpoints().await?);
        }
        Ok(endpoints)
    }
}
