//! In-memory DNS used by pipeline, bulk and route tests.

use crate::error::LookupError;
use crate::validation::dnsmx::{DnsLookup, MxHost};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default, Clone)]
pub struct StaticDns {
    mx: HashMap<String, Vec<MxHost>>,
    txt: HashMap<String, Vec<String>>,
    txt_failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    panic_on: HashSet<String>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl StaticDns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain with one MX host, an SPF record and a DMARC record.
    pub fn with_mail_domain(self, domain: &str) -> Self {
        self.with_mx(domain, &[(10, &format!("mx.{}", domain))])
            .with_txt(domain, &["v=spf1 mx -all"])
            .with_txt(&format!("_dmarc.{}", domain), &["v=DMARC1; p=reject"])
    }

    pub fn with_mx(mut self, domain: &str, hosts: &[(u16, &str)]) -> Self {
        self.mx.insert(
            domain.to_string(),
            hosts
                .iter()
                .map(|(preference, exchange)| MxHost {
                    preference: *preference,
                    exchange: exchange.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_txt(mut self, name: &str, records: &[&str]) -> Self {
        self.txt.insert(
            name.to_string(),
            records.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn with_txt_failure(mut self, name: &str) -> Self {
        self.txt_failures.insert(name.to_string());
        self
    }

    pub fn with_delay(mut self, domain: &str, delay: Duration) -> Self {
        self.delays.insert(domain.to_string(), delay);
        self
    }

    pub fn panicking_on(mut self, domain: &str) -> Self {
        self.panic_on.insert(domain.to_string());
        self
    }

    /// Highest number of MX lookups observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// MX lookups entered so far.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// MX lookups that ran past their delay.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsLookup for StaticDns {
    async fn mx_lookup(&self, domain: &str) -> Result<Vec<MxHost>, LookupError> {
        if self.panic_on.contains(domain) {
            panic!("resolver exploded on {}", domain);
        }

        self.started.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(domain) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        self.mx.get(domain).cloned().ok_or(LookupError::NoRecords)
    }

    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>, LookupError> {
        if self.txt_failures.contains(name) {
            return Err(LookupError::Timeout);
        }
        self.txt.get(name).cloned().ok_or(LookupError::NoRecords)
    }
}
