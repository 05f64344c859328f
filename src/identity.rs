use crate::collect::encode;

/// Who a hit is attributed to.
///
/// Both ids are held in their percent-encoded form, ready to be embedded in
/// a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub client_id: String,
}

impl Identity {
    /// Fresh anonymous identity with a random client id.
    pub fn new() -> Self {
        Self {
            user_id: None,
            client_id: set_client_id(None),
        }
    }

    /// Replace the user id. See [`set_user_id`].
    pub fn set_user_id(&mut self, user_id: Option<&str>) {
        *self = set_user_id(user_id, Some(self.client_id.as_str()));
    }

    /// Replace the client id. See [`set_client_id`].
    pub fn set_client_id(&mut self, client_id: Option<&str>) -> &str {
        self.client_id = set_client_id(client_id);
        &self.client_id
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an identity for `user_id`.
///
/// `user_id` is percent-encoded when present and left unset otherwise.
/// The active client id is kept if one is given (it is assumed to be
/// already encoded); otherwise a new one is generated.
pub fn set_user_id(user_id: Option<&str>, active_client_id: Option<&str>) -> Identity {
    let client_id = match active_client_id {
        Some(cid) if !cid.is_empty() => cid.to_string(),
        _ => set_client_id(None),
    };
    Identity {
        user_id: user_id.map(encode),
        client_id,
    }
}

/// Percent-encoded client id: the supplied value, or a random UUID v4.
pub fn set_client_id(client_id: Option<&str>) -> String {
    match client_id {
        Some(cid) => encode(cid),
        None => encode(&uuid::Uuid::new_v4().to_string()),
    }
}
