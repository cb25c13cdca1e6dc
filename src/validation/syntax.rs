use std::net::{IpAddr, Ipv6Addr};

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Cheap structural check of an email address, run before any network call.
///
/// Accepts `local-part@domain` where:
/// - there is exactly one `@` outside a quoted local part
/// - the local part is a dot-atom or a quoted string, at most 64 octets
/// - the domain is a host name of two or more labels, or an IP domain literal
/// - the whole address is at most 254 octets
///
/// # Examples
/// ```
/// use smtp_email_validator::validation::syntax::is_syntactically_valid;
///
/// assert!(is_syntactically_valid("user.name+tag@example.com"));
/// assert!(is_syntactically_valid("\"quoted@local\"@example.com"));
/// assert!(!is_syntactically_valid("bad-address"));
/// assert!(!is_syntactically_valid("user@localhost"));
/// ```
pub fn is_syntactically_valid(address: &str) -> bool {
    if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
        return false;
    }

    let Some(split_index) = unquoted_at_position(address) else {
        return false;
    };

    let (local_part, domain_part) = address.split_at(split_index);
    let domain_part = &domain_part[1..];

    local_part.len() <= MAX_LOCAL_PART_LEN
        && is_valid_local_part(local_part)
        && is_valid_domain_part(domain_part)
}

/// Returns the byte index of the only `@` outside quotes, or `None` when
/// there is no such `@` or more than one.
fn unquoted_at_position(address: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escape = false;
    let mut found = None;

    for (i, c) in address.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => escape = true,
            '@' if !in_quotes => {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
            _ => {}
        }
    }

    found
}

fn is_valid_local_part(local: &str) -> bool {
    if local.len() >= 2 && local.starts_with('"') && local.ends_with('"') {
        is_valid_quoted_string(&local[1..local.len() - 1])
    } else {
        is_valid_dot_atom(local)
    }
}

/// Content of a quoted local part: printable characters, with `"` and `\`
/// only allowed when escaped.
fn is_valid_quoted_string(content: &str) -> bool {
    let mut escape = false;

    for c in content.chars() {
        if c.is_control() {
            return false;
        }
        if escape {
            if !matches!(c, '\\' | '"') {
                return false;
            }
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == '"' {
            return false;
        }
    }

    !escape
}

fn is_valid_dot_atom(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c))
        })
}

fn is_valid_domain_part(domain: &str) -> bool {
    match domain.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(literal) => is_valid_domain_literal(literal),
        None => is_valid_host_name(domain) && domain.contains('.'),
    }
}

fn is_valid_domain_literal(literal: &str) -> bool {
    match literal.strip_prefix("IPv6:") {
        Some(ip) => ip.parse::<Ipv6Addr>().is_ok(),
        None => matches!(literal.parse::<IpAddr>(), Ok(IpAddr::V4(_))),
    }
}

/// Host name rules shared with the reachability checker: dot-separated
/// labels of letters, digits and inner hyphens, and a top-level label that
/// is not purely numeric.
pub fn is_valid_host_name(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_DOMAIN_LEN {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let all_labels_valid = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });

    all_labels_valid
        && labels
            .last()
            .is_some_and(|tld| !tld.chars().all(|c| c.is_ascii_digit()))
}
