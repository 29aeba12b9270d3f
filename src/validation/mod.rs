/// Runs many addresses through the pipeline under a concurrency ceiling.
///
/// Results are returned in input order, one entry per input address. A
/// failure while validating one address produces an error-shaped entry for
/// that address and never aborts the batch.
pub mod bulk;

/// Disposable-provider domain set.
///
/// Loaded once at startup from a newline-delimited file or the built-in
/// defaults, and replaceable at runtime.
pub mod disposable;

/// DNS-backed domain intelligence: MX, SPF and DMARC lookups.
///
/// Every lookup failure is folded into a value:
/// 1. MX failures read as "no MX records"
/// 2. SPF reads `false` when the domain has no TXT records and `null` when the lookup itself failed
/// 3. DMARC failures read as `false`
///
/// # Examples
/// ```
/// use email_deliverability::validation::dnsmx::is_spf_record;
///
/// assert!(is_spf_record("v=spf1 include:_spf.example.com ~all"));
/// assert!(!is_spf_record("v=spf10 -all"));
/// ```
pub mod dnsmx;

/// Extracts the domain part of an address.
pub mod domain;

/// Per-address orchestration: syntax, domain checks, optional SMTP probe.
pub mod pipeline;

/// Handshake-only SMTP mailbox probe.
///
/// Connects to the preferred MX host and walks the session up to
/// `RCPT TO`, then quits without sending any message data. The whole
/// exchange runs under a single deadline.
pub mod smtp;

/// Validates address syntax against a practical subset of RFC 5322.
///
/// # Arguments
/// * `email` - A string slice containing the email address to validate
///
/// # Returns
/// `true` if the address has an ASCII local part (dot-atom or quoted string)
/// and a well-formed multi-label domain, `false` otherwise
pub mod syntax;

#[cfg(test)]
pub(crate) mod test_support;
