use crate::error::ConfigError;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Domains shipped with the service when no list file is configured.
pub const DEFAULT_DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "10minutemail.com",
    "tempmail.com",
    "dispostable.com",
];

/// Set of known disposable-mail domains.
///
/// Lookups take a shared read lock and never suspend. The whole set can be
/// swapped at runtime with [`DisposableDomains::replace`] or
/// [`DisposableDomains::reload_from_file`], so a refreshed list takes effect
/// without a restart. The service binary reloads `DISPOSABLE_DOMAINS_FILE`
/// on `SIGHUP`.
#[derive(Debug, Default)]
pub struct DisposableDomains {
    domains: RwLock<HashSet<String>>,
}

impl DisposableDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: RwLock::new(normalize(domains)),
        }
    }

    /// The built-in list.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_DISPOSABLE_DOMAINS.iter().copied())
    }

    /// Loads a newline-separated list. Blank lines and `#` comments are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let list = Self::parse_list(&read_list(path)?);
        info!(path = %path.display(), domains = list.len(), "Loaded disposable domain list");
        Ok(list)
    }

    pub fn parse_list(content: &str) -> Self {
        Self::new(list_entries(content))
    }

    /// Re-reads `path` and swaps it in. On error the current set is kept.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let content = read_list(path.as_ref())?;
        Ok(self.replace(list_entries(&content)))
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, domain: &str) -> bool {
        let domain = domain.trim().trim_end_matches('.');
        let guard = self.domains.read();
        if guard.contains(domain) {
            return true;
        }
        guard.contains(&domain.to_lowercase())
    }

    /// Swaps in a new list, returning how many domains it holds.
    pub fn replace<I, S>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = normalize(domains);
        let count = next.len();
        *self.domains.write() = next;
        info!(domains = count, "Replaced disposable domain list");
        count
    }

    pub fn len(&self) -> usize {
        self.domains.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.read().is_empty()
    }
}

fn read_list(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::DisposableList {
        path: path.display().to_string(),
        source,
    })
}

fn list_entries(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
}

fn normalize<I, S>(domains: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    domains
        .into_iter()
        .map(|d| d.as_ref().trim().trim_end_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
