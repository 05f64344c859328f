//! galog — Measurement Protocol telemetry client
//!
//! Builds event and pageview hits for an analytics collection endpoint and
//! fires each one as a single blocking GET. Nothing is sent until a tracking
//! id is configured and the user has consented. Settings (tracking id,
//! hostname, consent) can be persisted to a flat JSON file.

mod client;
pub mod collect;
pub mod consent;
mod endpoint;
mod error;
pub mod identity;
pub mod settings;
mod transport;
mod types;

pub use client::Session;
pub use collect::{build_base_url, encode, Event, Pageview};
pub use consent::{ConsentPrompt, PresetPrompt, TerminalPrompt};
pub use endpoint::{validate_endpoint, CustomEndpoint, Endpoint};
pub use error::{AnalyticsError, Result, TransportError};
pub use identity::Identity;
pub use settings::Settings;
pub use transport::{Transport, UreqTransport, SEND_TIMEOUT};
pub use types::{Delivery, Options, Source};
