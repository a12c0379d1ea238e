use url::{ParseError, Url};

/// url_has_allowed_host_and_scheme
///
/// True if `target` is safe to redirect to from a request served for `allowed_host`:
/// a relative reference, or an absolute http(s) URL whose `host[:port]` equals the
/// allowed host. Empty targets, protocol-relative URLs to other hosts, non-http
/// schemes and values containing a control character anywhere are rejected.
/// Backslashes are treated as forward slashes, as browsers do.
pub fn url_has_allowed_host_and_scheme(target: &str, allowed_host: Option<&str>) -> bool {
    let target = target.trim();
    if target.is_empty() {
        return false;
    }
    // Browsers drop tab and newline from URLs, so "/\t/host" would become "//host".
    // Such values cannot go into a Location header either.
    if target.chars().any(char::is_control) {
        return false;
    }
    is_safe(target, allowed_host) && is_safe(&target.replace('\\', "/"), allowed_host)
}

fn is_safe(target: &str, allowed_host: Option<&str>) -> bool {
    // "///host" is treated as an absolute URL by some browsers.
    if target.starts_with("///") {
        return false;
    }

    match Url::parse(target) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https") && host_matches(&url, allowed_host)
        }
        // No scheme at all.
        Err(ParseError::RelativeUrlWithoutBase) => {
            if target.starts_with("//") {
                // Protocol-relative: the host still has to match.
                Url::parse(&format!("http:{}", target))
                    .map(|url| host_matches(&url, allowed_host))
                    .unwrap_or(false)
            } else {
                true
            }
        }
        Err(_) => false,
    }
}

fn host_matches(url: &Url, allowed_host: Option<&str>) -> bool {
    let (Some(host), Some(allowed)) = (url.host_str(), allowed_host) else {
        return false;
    };
    let netloc = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    netloc.eq_ignore_ascii_case(allowed)
}

/// resolve_success_url
///
/// The requested `next` target when it passes the host/scheme check, the default
/// success URL otherwise.
pub fn resolve_success_url(next: Option<&str>, host: Option<&str>, default: &str) -> String {
    match next {
        Some(target) if url_has_allowed_host_and_scheme(target, host) => target.trim().to_string(),
        _ => default.to_string(),
    }
}
