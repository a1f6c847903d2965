//! Target URL construction
//!
//! Turns the typed query and the settings into the one URL requested per
//! invocation. Two modes:
//! - Custom template: `{encoded_query}`, `{query}` and `{query_param_name}`
//!   placeholders are substituted. Without a query placeholder the query is
//!   appended as a query-string parameter.
//! - Components: scheme, host and port from `server_address` (port falling
//!   back to `server_port`), path from `server_path`, one query parameter.

use crate::config::Settings;
use crate::error::ForwardError;
use url::Url;

const ENCODED_QUERY: &str = "{encoded_query}";
const RAW_QUERY: &str = "{query}";
const PARAM_NAME: &str = "{query_param_name}";

/// Build the request URL for `query`
pub fn build_url(query: &str, settings: &Settings) -> Result<String, ForwardError> {
    if settings.uses_template() {
        Ok(from_template(query, settings))
    } else {
        from_components(query, settings)
    }
}

/// Percent-encode with spaces as `+`, as in HTML form encoding
pub fn quote_plus(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}

fn from_template(query: &str, settings: &Settings) -> String {
    let template = settings.custom_url_template.as_str();
    let mut url = substitute(template, query, &settings.query_param_name);

    if !has_scheme(&url) {
        url = format!("http://{}", url);
    }

    if template.contains(RAW_QUERY) || template.contains(ENCODED_QUERY) {
        return url;
    }

    let param = query_param(&settings.query_param_name, query, settings.url_encode_query);
    append_query_param(&url, &param)
}

fn from_components(query: &str, settings: &Settings) -> Result<String, ForwardError> {
    let address = if has_scheme(&settings.server_address) {
        settings.server_address.clone()
    } else {
        format!("http://{}", settings.server_address)
    };

    let invalid = || ForwardError::InvalidAddress(settings.server_address.clone());
    let parsed = Url::parse(&address).map_err(|_| invalid())?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(invalid)?;

    // Url drops ports equal to the scheme default, so look at the raw text first
    let netloc = match explicit_port(&address)
        .or_else(|| parsed.port())
        .or(settings.server_port)
    {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Ok(format!(
        "{}://{}{}?{}",
        parsed.scheme(),
        netloc,
        settings.server_path,
        query_param(&settings.query_param_name, query, settings.url_encode_query)
    ))
}

fn query_param(name: &str, value: &str, encode: bool) -> String {
    if encode {
        format!("{}={}", quote_plus(name), quote_plus(value))
    } else {
        format!("{}={}", name, value)
    }
}

/// Replace placeholders in a single pass so substituted text is never rescanned
fn substitute(template: &str, query: &str, param_name: &str) -> String {
    let mut out = String::with_capacity(template.len() + query.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(ENCODED_QUERY) {
            out.push_str(&quote_plus(query));
            rest = after;
        } else if let Some(after) = tail.strip_prefix(RAW_QUERY) {
            out.push_str(query);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(PARAM_NAME) {
            out.push_str(param_name);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Add `param` to the URL's query string, keeping existing parameters and fragment
fn append_query_param(url: &str, param: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let (base, existing) = match without_fragment.split_once('?') {
        Some((base, qs)) => (base, qs),
        None => (without_fragment, ""),
    };

    let mut result = String::from(base);
    result.push('?');
    if !existing.is_empty() {
        result.push_str(existing.trim_end_matches('&'));
        result.push('&');
    }
    result.push_str(param);
    if let Some(frag) = fragment {
        result.push('#');
        result.push_str(frag);
    }
    result
}

/// Whether `text` starts with `scheme://`
fn has_scheme(text: &str) -> bool {
    match text.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().map_or(false, |c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Port written in the address's authority, if any
fn explicit_port(address: &str) -> Option<u16> {
    let rest = address.split_once("://").map_or(address, |(_, r)| r);
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    host_port
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse().ok())
}
