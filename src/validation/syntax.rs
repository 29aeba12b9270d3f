/// Validates an email address against the grammar mainstream validators accept.
///
/// The address is split at its last `@`. The local part may be a dot-atom or a
/// quoted string and must be ASCII. The domain must be a fully qualified name
/// with an alphabetic (or punycode) top-level label. Domain literals such as
/// `user@[192.168.0.1]` are rejected.
///
/// # Examples
/// ```
/// use email_deliverability::validation::syntax::is_valid_email;
///
/// assert!(is_valid_email("user.name+tag@example.com"));
/// assert!(is_valid_email("user@exämple.de"));
/// assert!(!is_valid_email("Pelé@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
///
/// # Arguments
/// * `email` - A string slice containing the email address to validate
///
/// # Returns
/// `true` if the email address meets all syntax requirements, `false` otherwise
pub fn is_valid_email(email: &str) -> bool {
    // RFC 5321 path limit
    if email.len() > 254 {
        return false;
    }

    let Some((local_part, domain_part)) = email.rsplit_once('@') else {
        return false;
    };

    if local_part.is_empty() || local_part.len() > 64 {
        return false;
    }

    is_valid_local_part(local_part) && is_valid_domain_name(domain_part)
}

/// Dot-atom or quoted-string, ASCII only.
fn is_valid_local_part(local: &str) -> bool {
    if !local.is_ascii() {
        return false;
    }

    if local.len() >= 2 && local.starts_with('"') && local.ends_with('"') {
        is_valid_quoted_string(&local[1..local.len() - 1])
    } else {
        is_valid_dot_atom(local)
    }
}

/// Quoted-string content (RFC 5322 section 3.4.1), without the surrounding quotes.
fn is_valid_quoted_string(content: &str) -> bool {
    let mut escape = false;

    for c in content.chars() {
        if escape {
            // quoted-pair; CR and LF stay out of the SMTP command line
            if c == '\0' || c == '\r' || c == '\n' {
                return false;
            }
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == '"' || c == '\0' || c == '\r' || c == '\n' {
            return false;
        }
    }
    !escape
}

/// Dot-atom local part (RFC 5322 section 3.4.1).
fn is_valid_dot_atom(s: &str) -> bool {
    s.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c))
    })
}

/// Fully qualified domain name with a top-level label of at least two letters.
fn is_valid_domain_name(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });

    labels_ok && labels.last().is_some_and(|tld| is_valid_tld(tld))
}

fn is_valid_tld(tld: &str) -> bool {
    let lower = tld.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("xn") {
        if rest.len() >= 2 && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return true;
        }
    }
    tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}
