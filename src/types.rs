use std::path::PathBuf;
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::TransportError;
use crate::transport::SEND_TIMEOUT;

/// Configuration for a session built from explicit values.
#[derive(Debug, Clone)]
pub struct Options {
    /// Analytics property id, e.g. `UA-12345678-1` (required).
    pub tracking_id: String,
    /// Hostname reported on pageviews. Default: `Google.com`.
    pub hostname: Option<String>,
    /// Grant consent without asking. The application then attests that it
    /// obtained consent itself. Default: true.
    pub consent: bool,
    /// Disclosure shown before asking. Default: the built-in message.
    pub message: Option<String>,
    /// Collection endpoint. Default: production collector.
    pub endpoint: Endpoint,
    /// Bound on a single hit. Default: 5s.
    pub timeout: Duration,
    /// Known user id, if any.
    pub user_id: Option<String>,
    /// Client id to reuse. Default: a fresh UUID v4.
    pub client_id: Option<String>,
}

impl Options {
    /// Create options with the tracking id only; all others use defaults.
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            hostname: None,
            consent: true,
            message: None,
            endpoint: Endpoint::Collect,
            timeout: SEND_TIMEOUT,
            user_id: None,
            client_id: None,
        }
    }
}

/// Where a session takes its settings from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A settings file written by [`crate::settings::save`].
    File(PathBuf),
    /// Explicit values; consent is resolved through the prompt.
    Options(Options),
}

/// Outcome of a dispatched hit.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// The collector answered with `status`.
    Sent { status: u16 },
    /// No response: the hit is lost.
    Failed(TransportError),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Delivery::Sent { status } => Some(*status),
            Delivery::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults() {
        let opts = Options::new("UA-1-1");
        assert!(opts.consent);
        assert!(opts.hostname.is_none());
        assert_eq!(opts.endpoint, Endpoint::Collect);
        assert_eq!(opts.timeout, Duration::from_secs(5));
    }

    #[test]
    fn delivery_accessors() {
        let ok = Delivery::Sent { status: 200 };
        assert!(ok.is_sent());
        assert_eq!(ok.status(), Some(200));

        let failed = Delivery::Failed(TransportError::new("refused"));
        assert!(!failed.is_sent());
        assert_eq!(failed.status(), None);
    }
}
