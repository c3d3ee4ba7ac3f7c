//! Domain suffix filter
//!
//! Used in two places: as the base-domain inclusion rule of the
//! [`FilterSource`](super::FilterSource), and as the zone filter handed
//! to providers.

use serde::{Deserialize, Serialize};

/// Restricts names to a set of parent domains
///
/// A name matches a suffix if it equals the suffix or ends with `.` and
/// the suffix, so `cluster.example.org` matches `foo.cluster.example.org`
/// but not `foo.example.org` or `fooexample.org`. Comparison is
/// case-sensitive; surrounding whitespace and a trailing root dot are
/// ignored.
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DomainFilter {
    filters: Vec<String>,
}

impl DomainFilter {
    /// Build a filter from a list of suffixes
    ///
    /// Blank entries are ignored.
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = filters
            .into_iter()
            .map(|f| normalize(f.as_ref()))
            .filter(|f| !f.is_empty())
            .collect();
        Self { filters }
    }

    /// A filter that matches everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether at least one suffix is configured
    pub fn is_configured(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Configured suffixes, normalized
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Whether `domain` falls under one of the configured suffixes
    pub fn matches(&self, domain: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        let domain = normalize(domain);
        self.filters.iter().any(|suffix| {
            domain == *suffix
                || domain
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl From<Vec<String>> for DomainFilter {
    fn from(filters: Vec<String>) -> Self {
        Self::new(filters)
    }
}

impl From<DomainFilter> for Vec<String> {
    fn from(filter: DomainFilter) -> Self {
        filter.filters
    }
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_string()
}
