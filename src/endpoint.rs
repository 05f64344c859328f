use crate::error::{AnalyticsError, Result};

const COLLECT_URL: &str = "http://www.google-analytics.com/collect";
const DEBUG_COLLECT_URL: &str = "https://www.google-analytics.com/debug/collect";

/// Where hits are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Endpoint {
    /// Production collection endpoint: <http://www.google-analytics.com/collect>
    #[default]
    Collect,
    /// Hit validation endpoint: <https://www.google-analytics.com/debug/collect>
    Debug,
    /// Any other collector, built with [`Endpoint::custom`].
    Custom(CustomEndpoint),
}

impl Endpoint {
    /// Validated custom endpoint.
    pub fn custom(url: &str) -> Result<Self> {
        validate_endpoint(url).map(|url| Endpoint::Custom(CustomEndpoint { url }))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::Collect => COLLECT_URL,
            Endpoint::Debug => DEBUG_COLLECT_URL,
            Endpoint::Custom(custom) => custom.as_str(),
        }
    }
}

/// A collector URL that passed [`validate_endpoint`].
///
/// Only [`Endpoint::custom`] creates one:
///
/// ```compile_fail
/// use galog::Endpoint;
/// let _ = Endpoint::Custom(galog::CustomEndpoint { url: "ftp://x/collect?a=1".into() });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEndpoint {
    url: String,
}

impl CustomEndpoint {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

/// Validate a custom collection endpoint URL.
///
/// Rejects:
///   - schemes other than http/https
///   - an empty host
///   - embedded credentials
///   - a query string or fragment (hit parameters are appended as `?v=1&...`)
pub fn validate_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.is_empty() {
        return Err(invalid("'endpoint' is required".to_string()));
    }

    let (scheme, has_credentials) = url_parse(endpoint)?;

    if scheme != "http" && scheme != "https" {
        return Err(invalid(format!(
            "Endpoint must use http or https: {endpoint}"
        )));
    }

    if has_credentials {
        return Err(invalid(
            "Endpoint URL must not contain credentials".to_string(),
        ));
    }

    if endpoint.contains('?') || endpoint.contains('#') {
        return Err(invalid(format!(
            "Endpoint URL must not carry a query string or fragment: {endpoint}"
        )));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

fn invalid(message: String) -> AnalyticsError {
    AnalyticsError::InvalidEndpoint(message)
}

/// Split `scheme://authority/...`, requiring a non-empty host.
/// Returns the lowercased scheme and whether the authority has userinfo.
fn url_parse(endpoint: &str) -> Result<(String, bool)> {
    let (scheme, rest) = endpoint
        .split_once("://")
        .ok_or_else(|| invalid(format!("Invalid endpoint URL: {endpoint}")))?;

    let authority = rest.split('/').next().unwrap_or(rest);
    let (has_credentials, host_port) = match authority.rsplit_once('@') {
        Some((_, hp)) => (true, hp),
        None => (false, authority),
    };

    // IPv6 hosts are bracketed: [::1]:8080
    let host = match host_port.strip_prefix('[') {
        Some(v6) => v6.split(']').next().unwrap_or(v6),
        None => host_port.split(':').next().unwrap_or(host_port),
    };
    if host.is_empty() {
        return Err(invalid(format!("Invalid endpoint URL: {endpoint}")));
    }

    Ok((scheme.to_lowercase(), has_credentials))
}
