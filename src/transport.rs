use std::time::Duration;

use crate::error::TransportError;

/// Default bound on a single hit.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Performs the one outbound GET of a hit.
///
/// Returns the HTTP status of whatever response came back, or a
/// [`TransportError`] if none did.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<u16, TransportError>;
}

/// Blocking ureq transport.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(SEND_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<u16, TransportError> {
        let result = ureq::get(url).timeout(self.timeout).call();

        match result {
            Ok(resp) => Ok(resp.status()),
            Err(ureq::Error::Status(status, _resp)) => Ok(status),
            Err(ureq::Error::Transport(e)) => Err(TransportError::new(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_transport_error() {
        let transport = UreqTransport::new(Duration::from_secs(1));
        let err = transport.get("http://localhost:9/collect?v=1").unwrap_err();
        assert!(!err.message().is_empty());
    }
}
