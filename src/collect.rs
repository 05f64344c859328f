//! Measurement Protocol (v1) hit construction.
//!
//! Every function here is a pure string builder: no network, no disk.

use std::fmt::Write as _;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::endpoint::Endpoint;
use crate::error::{AnalyticsError, Result};
use crate::identity::Identity;

/// Value of the `ds` (data source) parameter on every hit.
pub const DATA_SOURCE: &str = "galog";

/// Hostname reported on pageviews when none is configured.
pub const DEFAULT_HOSTNAME: &str = "Google.com";

/// Everything except RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query parameter value.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Validate a tracking id. Only emptiness is checked.
pub fn set_tracking_id(tracking_id: Option<&str>) -> Result<String> {
    match tracking_id {
        Some(tid) if !tid.is_empty() => Ok(tid.to_string()),
        _ => Err(AnalyticsError::Validation(
            "'tracking_id' is required".to_string(),
        )),
    }
}

/// Validate a hostname, defaulting to [`DEFAULT_HOSTNAME`].
pub fn set_hostname(hostname: Option<&str>) -> Result<String> {
    match hostname {
        None => Ok(DEFAULT_HOSTNAME.to_string()),
        Some(h) if !h.is_empty() => Ok(h.to_string()),
        Some(_) => Err(AnalyticsError::Validation(
            "'hostname' must be a non-empty string".to_string(),
        )),
    }
}

/// Base collection URL for the default endpoint.
///
/// `http://www.google-analytics.com/collect?v=1&tid=<tid>&ds=galog`
pub fn build_base_url(tracking_id: Option<&str>) -> Result<String> {
    build_base_url_for(&Endpoint::Collect, tracking_id)
}

/// Base collection URL for an arbitrary endpoint.
pub fn build_base_url_for(endpoint: &Endpoint, tracking_id: Option<&str>) -> Result<String> {
    let tid = set_tracking_id(tracking_id)?;
    Ok(format_base_url(endpoint, &tid))
}

pub(crate) fn format_base_url(endpoint: &Endpoint, tracking_id: &str) -> String {
    format!(
        "{}?v=1&tid={}&ds={}",
        endpoint.as_str(),
        encode(tracking_id),
        DATA_SOURCE
    )
}

/// An event hit (`t=event`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: Option<i64>,
}

impl Event {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }
}

impl Default for Event {
    /// `stats` / `calculate`.
    fn default() -> Self {
        Self::new("stats", "calculate")
    }
}

/// A pageview hit (`t=pageview`).
///
/// Exactly one parameter group is emitted:
///   1. no `page_url`: `dh` + `dp`
///   2. `title` given: `dt`
///   3. otherwise: `dl`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pageview {
    pub page_url: Option<String>,
    pub page: Option<String>,
    pub title: Option<String>,
    pub hostname: Option<String>,
    /// Overrides the session user id for this hit only.
    pub user: Option<String>,
}

impl Pageview {
    /// Pageview of a path on the configured host.
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            ..Self::default()
        }
    }

    /// Pageview of a full document URL.
    pub fn url(page_url: impl Into<String>) -> Self {
        Self {
            page_url: Some(page_url.into()),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

fn push_param(url: &mut String, key: &str, value: &str) {
    let _ = write!(url, "&{key}={}", encode(value));
}

/// `&cid=..&uid=..`. Ids in `identity` are already encoded; an unset user
/// id is sent as an empty `uid`.
fn push_identity(url: &mut String, identity: &Identity, user_override: Option<&str>) {
    let _ = write!(url, "&cid={}", identity.client_id);
    match user_override {
        Some(user) => push_param(url, "uid", user),
        None => {
            let _ = write!(url, "&uid={}", identity.user_id.as_deref().unwrap_or(""));
        }
    }
}

/// Event hit URL: base, identity, then `t=event&ec=&ea=[&el=][&ev=]`.
pub fn build_event_url(base_url: &str, identity: &Identity, event: &Event) -> Result<String> {
    if event.category.is_empty() {
        return Err(AnalyticsError::Validation(
            "event 'category' is required".to_string(),
        ));
    }
    if event.action.is_empty() {
        return Err(AnalyticsError::Validation(
            "event 'action' is required".to_string(),
        ));
    }

    let mut url = String::with_capacity(base_url.len() + 128);
    url.push_str(base_url);
    push_identity(&mut url, identity, None);
    url.push_str("&t=event");
    push_param(&mut url, "ec", &event.category);
    push_param(&mut url, "ea", &event.action);
    if let Some(ref label) = event.label {
        push_param(&mut url, "el", label);
    }
    if let Some(value) = event.value {
        push_param(&mut url, "ev", &value.to_string());
    }
    Ok(url)
}

/// Pageview hit URL. `default_hostname` is used when the pageview carries
/// none of its own; an override is checked like [`set_hostname`].
pub fn build_pageview_url(
    base_url: &str,
    identity: &Identity,
    default_hostname: &str,
    pageview: &Pageview,
) -> Result<String> {
    let hostname = match pageview.hostname.as_deref() {
        Some(h) => set_hostname(Some(h))?,
        None => default_hostname.to_string(),
    };


    let mut url = String::with_capacity(base_url.len() + 128);
    url.push_str(base_url);
    url.push_str("&t=pageview");
    push_identity(&mut url, identity, pageview.user.as_deref());

    match (&pageview.page_url, &pageview.title) {
        (None, _) => {
            push_param(&mut url, "dh", &hostname);
            push_param(&mut url, "dp", pageview.page.as_deref().unwrap_or("/"));
        }
        (Some(_), Some(title)) => push_param(&mut url, "dt", title),
        (Some(page_url), None) => push_param(&mut url, "dl", page_url),
    }
    Ok(url)
}
