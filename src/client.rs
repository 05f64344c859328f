use crate::collect::{
    build_event_url, build_pageview_url, format_base_url, set_hostname, set_tracking_id, Event,
    Pageview,
};
use crate::consent::{request_approval, set_approval_message, ConsentPrompt};
use crate::endpoint::Endpoint;
use crate::error::{AnalyticsError, Result};
use crate::identity::{self, Identity};
use crate::settings::{self, Settings};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Delivery, Options, Source};

use std::path::Path;

/// Caller-owned analytics session.
///
/// Holds the settings, identity and base collection URL that every hit is
/// built from. There is no interior locking: setters take `&mut self`, and
/// callers sharing a session across threads wrap it in a `Mutex`.
pub struct Session {
    settings: Settings,
    identity: Identity,
    message: String,
    endpoint: Endpoint,
    base_url: String,
    transport: Box<dyn Transport>,
}

impl Session {
    /// Build a session from a settings file or from explicit options.
    ///
    /// This must run before any hit is built. With [`Source::File`] the
    /// stored consent is used and `prompt` is not consulted.
    pub fn initialize(source: Source, prompt: &mut dyn ConsentPrompt) -> Result<Self> {
        match source {
            Source::File(path) => Self::from_file(&path),
            Source::Options(opts) => Self::from_options(opts, prompt),
        }
    }

    /// Session from a settings file. The base URL is rebuilt from the
    /// stored tracking id.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = settings::load(path)?;
        set_tracking_id(Some(settings.tracking_id.as_str()))?;
        log::debug!("[galog] Loaded settings from {}", path.display());
        Ok(Self::assemble(
            settings,
            Identity::new(),
            set_approval_message(None),
            Endpoint::Collect,
            Box::new(UreqTransport::default()),
        ))
    }

    /// Session from explicit options; consent is resolved through `prompt`
    /// unless `opts.consent` already grants it.
    pub fn from_options(opts: Options, prompt: &mut dyn ConsentPrompt) -> Result<Self> {
        let tracking_id = set_tracking_id(Some(opts.tracking_id.as_str()))?;
        let hostname = set_hostname(opts.hostname.as_deref())?;
        let message = set_approval_message(opts.message.as_deref());
        let consent = request_approval(Some(message.as_str()), opts.consent, prompt);

        let client_id = identity::set_client_id(opts.client_id.as_deref());
        let identity = identity::set_user_id(opts.user_id.as_deref(), Some(client_id.as_str()));

        Ok(Self::assemble(
            Settings {
                tracking_id,
                hostname,
                consent,
            },
            identity,
            message,
            opts.endpoint,
            Box::new(UreqTransport::new(opts.timeout)),
        ))
    }

    fn assemble(
        settings: Settings,
        identity: Identity,
        message: String,
        endpoint: Endpoint,
        transport: Box<dyn Transport>,
    ) -> Self {
        let base_url = format_base_url(&endpoint, &settings.tracking_id);
        Self {
            settings,
            identity,
            message,
            endpoint,
            base_url,
            transport,
        }
    }

    /// Send hits to a different collector.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self.rebuild_base_url();
        self
    }

    /// Replace the network transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn approval_message(&self) -> &str {
        &self.message
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn has_consent(&self) -> bool {
        self.settings.consent
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    pub fn set_tracking_id(&mut self, tracking_id: &str) -> Result<&str> {
        self.settings.tracking_id = set_tracking_id(Some(tracking_id))?;
        self.rebuild_base_url();
        Ok(&self.settings.tracking_id)
    }

    /// `None` resets the hostname to `Google.com`.
    pub fn set_hostname(&mut self, hostname: Option<&str>) -> Result<&str> {
        self.settings.hostname = set_hostname(hostname)?;
        Ok(&self.settings.hostname)
    }

    /// Set or clear the user id, keeping the current client id.
    pub fn set_user_id(&mut self, user_id: Option<&str>) -> &Identity {
        self.identity.set_user_id(user_id);
        &self.identity
    }

    /// Set the client id, or generate a fresh one with `None`.
    pub fn set_client_id(&mut self, client_id: Option<&str>) -> &str {
        self.identity.set_client_id(client_id)
    }

    pub fn set_approval_message(&mut self, message: Option<&str>) -> &str {
        self.message = set_approval_message(message);
        &self.message
    }

    /// Ask for consent again with the session's approval message.
    pub fn request_approval(
        &mut self,
        prompt: &mut dyn ConsentPrompt,
        consent_default: bool,
    ) -> bool {
        self.settings.consent =
            request_approval(Some(self.message.as_str()), consent_default, prompt);
        self.settings.consent
    }

    /// Merge the session's settings into the file at `path`.
    pub fn save_settings(&self, path: &Path) -> Result<()> {
        settings::save(path, &self.settings.to_partial())
    }

    fn rebuild_base_url(&mut self) {
        self.base_url = format_base_url(&self.endpoint, &self.settings.tracking_id);
    }

    // ------------------------------------------------------------------
    // Hits
    // ------------------------------------------------------------------

    pub fn event_url(&self, event: &Event) -> Result<String> {
        build_event_url(&self.base_url, &self.identity, event)
    }

    pub fn pageview_url(&self, pageview: &Pageview) -> Result<String> {
        build_pageview_url(
            &self.base_url,
            &self.identity,
            &self.settings.hostname,
            pageview,
        )
    }

    /// Dispatch a hit URL.
    ///
    /// Fails without touching the network if the tracking id is unset or
    /// consent has not been granted. A network failure is not an error: it
    /// comes back as [`Delivery::Failed`].
    pub fn send(&self, url: &str) -> Result<Delivery> {
        if self.settings.tracking_id.is_empty() {
            return Err(AnalyticsError::Config(
                "tracking id is not set; initialize the session first".to_string(),
            ));
        }
        if !self.settings.consent {
            return Err(AnalyticsError::Consent);
        }

        match self.transport.get(url) {
            Ok(status) => {
                log::debug!("[galog] Sent hit ({status}): {url}");
                Ok(Delivery::Sent { status })
            }
            Err(e) => {
                log::warn!("[galog] Failed to send hit: {e}");
                Ok(Delivery::Failed(e))
            }
        }
    }

    /// Build and send an event hit.
    pub fn track_event(&self, event: &Event) -> Result<Delivery> {
        let url = self.event_url(event)?;
        self.send(&url)
    }

    /// Build and send a pageview hit.
    pub fn track_pageview(&self, pageview: &Pageview) -> Result<Delivery> {
        let url = self.pageview_url(pageview)?;
        self.send(&url)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("identity", &self.identity)
            .field("endpoint", &self.endpoint)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::PresetPrompt;

    fn session() -> Session {
        let mut opts = Options::new("UA-1234567-1");
        opts.client_id = Some("cid-1".to_string());
        Session::from_options(opts, &mut PresetPrompt(false)).unwrap()
    }

    #[test]
    fn from_options_builds_base_url() {
        let s = session();
        assert_eq!(
            s.base_url(),
            "http://www.google-analytics.com/collect?v=1&tid=UA-1234567-1&ds=galog"
        );
        assert!(s.has_consent());
        assert_eq!(s.settings().hostname, "Google.com");
        assert_eq!(s.identity().client_id, "cid-1");
    }

    #[test]
    fn from_options_rejects_empty_tracking_id() {
        let err = Session::from_options(Options::new(""), &mut PresetPrompt(true)).unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation(_)));
    }

    #[test]
    fn from_options_rejects_empty_hostname() {
        let mut opts = Options::new("UA-1-1");
        opts.hostname = Some(String::new());
        assert!(Session::from_options(opts, &mut PresetPrompt(true)).is_err());
    }

    #[test]
    fn consent_resolved_by_prompt_when_not_preset() {
        let mut opts = Options::new("UA-1-1");
        opts.consent = false;
        let s = Session::from_options(opts.clone(), &mut PresetPrompt(false)).unwrap();
        assert!(!s.has_consent());
        let s = Session::from_options(opts, &mut PresetPrompt(true)).unwrap();
        assert!(s.has_consent());
    }

    #[test]
    fn set_tracking_id_rebuilds_base_url() {
        let mut s = session();
        s.set_tracking_id("UA-7654321-2").unwrap();
        assert!(s.base_url().contains("tid=UA-7654321-2"));
        assert!(s.set_tracking_id("").is_err());
        assert!(s.base_url().contains("tid=UA-7654321-2"));
    }

    #[test]
    fn with_endpoint_rebuilds_base_url() {
        let s = session().with_endpoint(Endpoint::Debug);
        assert!(s
            .base_url()
            .starts_with("https://www.google-analytics.com/debug/collect?v=1&tid="));
    }

    #[test]
    fn hostname_setter_feeds_pageviews() {
        let mut s = session();
        s.set_hostname(Some("app.example.org")).unwrap();
        let url = s.pageview_url(&Pageview::page("/x")).unwrap();
        assert!(url.ends_with("&dh=app.example.org&dp=%2Fx"));
        assert_eq!(s.set_hostname(None).unwrap(), "Google.com");
    }

    #[test]
    fn user_id_appears_on_hits() {
        let mut s = session();
        s.set_user_id(Some("user 42"));
        let url = s.event_url(&Event::default()).unwrap();
        assert!(url.contains("&cid=cid-1&uid=user%2042&t=event"));
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn get(&self, _url: &str) -> std::result::Result<u16, crate::error::TransportError> {
            panic!("no hit may be sent");
        }
    }

    #[test]
    fn send_without_tracking_id_is_config_error() {
        let mut settings = Settings::new("");
        settings.consent = true;
        let s = Session::assemble(
            settings,
            Identity::new(),
            set_approval_message(None),
            Endpoint::Collect,
            Box::new(Unreachable),
        );
        let err = s.send("http://localhost/collect?v=1").unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
        assert!(matches!(
            s.track_event(&Event::default()),
            Err(AnalyticsError::Config(_))
        ));
    }

    #[test]
    fn request_approval_updates_consent() {
        let mut s = session();
        assert!(!s.request_approval(&mut PresetPrompt(false), false));
        assert!(!s.has_consent());
        assert!(s.request_approval(&mut PresetPrompt(false), true));
    }
}
