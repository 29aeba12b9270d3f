/// Returns the lowercased domain of `email`: everything after its last `@`.
///
/// `None` when there is no `@` or nothing follows it. Quoted local parts may
/// contain `@`, so the last separator is the one that counts.
pub fn extract_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim())
        .filter(|domain| !domain.is_empty())
        .map(str::to_lowercase)
}
