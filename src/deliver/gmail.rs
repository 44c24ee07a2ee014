use async_trait::async_trait;
use tracing::info;

use crate::api::GmailClient;
use crate::api::models::SendRequest;
use crate::auth::{self, FileTokenStore, TokenSet};
use crate::config::Settings;
use crate::context::AppContext;
use crate::mail::{self, mime};

use super::{DeliveryRequest, Transport, TransportError};

/// Provider-API transport: resolves a credential through the token
/// lifecycle, then submits the raw MIME message to the Gmail send endpoint.
pub struct GmailTransport {
    client: GmailClient,
    profile: String,
    settings: Settings,
    store: FileTokenStore,
}

impl GmailTransport {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            client: ctx.gmail_client.clone(),
            profile: ctx.profile.clone(),
            settings: ctx.settings.clone(),
            store: ctx.token_store.clone(),
        }
    }

    fn build_request(&self, request: &DeliveryRequest, from: Option<String>) -> SendRequest {
        let attachments = request
            .attachment_path
            .as_deref()
            .and_then(mail::load_attachment)
            .into_iter()
            .collect();

        SendRequest {
            from,
            to: mail::split_addresses(&request.recipient),
            cc: request
                .cc
                .as_deref()
                .map(mail::split_addresses)
                .unwrap_or_default(),
            subject: request.subject.clone(),
            body_html: request.body_html.clone(),
            attachments,
        }
    }
}

#[async_trait]
impl Transport for GmailTransport {
    fn name(&self) -> &'static str {
        "gmail-api"
    }

    async fn send(&self, request: &DeliveryRequest) -> Result<(), TransportError> {
        let token = auth::acquire_for_send(&self.profile, &self.settings, &self.store)
            .await
            .map_err(|err| TransportError::CredentialUnavailable(err.to_string()))?;

        let Some(token) = token else {
            return Err(TransportError::CredentialUnavailable(
                "authorization not completed within the wait window".to_string(),
            ));
        };

        let from = from_header(&self.settings, &token);
        let send_request = self.build_request(request, from);
        let raw = mime::build_raw_message(&send_request);

        let result = self
            .client
            .send(&raw, &token.access_token)
            .await
            .map_err(|err| TransportError::Provider(err.to_string()))?;

        info!(id = %result.id, "gmail api accepted message");
        Ok(())
    }
}

fn from_header(settings: &Settings, token: &TokenSet) -> Option<String> {
    let email = settings
        .sender_email
        .clone()
        .or_else(|| token.email.clone())?;

    match settings.sender_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(format!("{name} <{email}>")),
        _ => Some(email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(email: Option<&str>) -> TokenSet {
        TokenSet {
            access_token: "at".to_string(),
            refresh_token: None,
            expires_at_unix: None,
            token_type: None,
            scope: None,
            email: email.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn from_header_prefers_configured_sender() {
        let settings = Settings {
            sender_email: Some("me@example.com".to_string()),
            sender_name: Some("Jane Doe".to_string()),
            ..Settings::default()
        };

        assert_eq!(
            from_header(&settings, &token(Some("other@example.com"))).as_deref(),
            Some("Jane Doe <me@example.com>")
        );
    }

    #[test]
    fn from_header_falls_back_to_token_email() {
        let settings = Settings::default();
        assert_eq!(
            from_header(&settings, &token(Some("me@example.com"))).as_deref(),
            Some("me@example.com")
        );
        assert_eq!(from_header(&settings, &token(None)), None);
    }
}
