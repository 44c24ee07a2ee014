use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::Settings;
use crate::context::AppContext;
use crate::mail;

use super::{DeliveryRequest, Transport, TransportError};

const SMTP_HOST: &str = "smtp.gmail.com";
const SMTP_PORT: u16 = 465;

/// Direct-protocol fallback: an authenticated SMTP session over implicit TLS
/// with the configured sender address and app password. Same HTML body and
/// attachment policy as the provider-API transport.
pub struct SmtpTransport {
    settings: Settings,
}

impl SmtpTransport {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            settings: ctx.settings.clone(),
        }
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, request: &DeliveryRequest) -> Result<(), TransportError> {
        let sender = self
            .settings
            .sender_email()
            .map_err(|err| TransportError::Build(err.to_string()))?
            .to_string();
        let password = self
            .settings
            .smtp_app_password()
            .map_err(|err| TransportError::Build(err.to_string()))?
            .to_string();

        let message = build_message(&self.settings, &sender, request)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)
            .map_err(|err| TransportError::Smtp(err.to_string()))?
            .credentials(Credentials::new(sender, password))
            .port(SMTP_PORT)
            .build();

        transport
            .send(message)
            .await
            .map_err(|err| TransportError::Smtp(err.to_string()))?;

        info!("smtp session accepted message");
        Ok(())
    }
}

fn build_message(
    settings: &Settings,
    sender: &str,
    request: &DeliveryRequest,
) -> Result<Message, TransportError> {
    let from = match settings.sender_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => format!("{name} <{sender}>"),
        _ => sender.to_string(),
    };
    let from: Mailbox = from
        .parse()
        .map_err(|err| TransportError::Build(format!("invalid sender address: {err}")))?;

    let mut builder = Message::builder().from(from).subject(request.subject.clone());

    for to in mail::split_addresses(&request.recipient) {
        let mailbox: Mailbox = to
            .parse()
            .map_err(|err| TransportError::Build(format!("invalid recipient `{to}`: {err}")))?;
        builder = builder.to(mailbox);
    }

    if let Some(cc) = &request.cc {
        for cc in mail::split_addresses(cc) {
            let mailbox: Mailbox = cc
                .parse()
                .map_err(|err| TransportError::Build(format!("invalid cc `{cc}`: {err}")))?;
            builder = builder.cc(mailbox);
        }
    }

    let html_part = SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(request.body_html.clone());

    let attachment = request
        .attachment_path
        .as_deref()
        .and_then(mail::load_attachment);

    let message = match attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.mime_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|err| TransportError::Build(err.to_string()))?;
            let attachment_part =
                AttachmentPart::new(attachment.filename).body(attachment.data, content_type);

            builder.multipart(
                MultiPart::mixed()
                    .singlepart(html_part)
                    .singlepart(attachment_part),
            )
        }
        None => builder.singlepart(html_part),
    }
    .map_err(|err| TransportError::Build(err.to_string()))?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            sender_name: Some("Jane Doe".to_string()),
            ..Settings::default()
        }
    }

    fn request() -> DeliveryRequest {
        DeliveryRequest {
            recipient: "hr@acme.io".to_string(),
            cc: None,
            subject: "Application".to_string(),
            body_html: "Hello<br>World".to_string(),
            attachment_path: None,
        }
    }

    #[test]
    fn builds_html_message() {
        let message = build_message(&settings(), "jane@example.com", &request())
            .expect("message should build");
        let rendered = String::from_utf8(message.formatted()).expect("utf8 message");

        assert!(rendered.contains("jane@example.com"));
        assert!(rendered.contains("Jane Doe"));
        assert!(rendered.contains("To: hr@acme.io"));
        assert!(rendered.contains("Subject: Application"));
        assert!(rendered.contains("text/html"));
    }

    #[test]
    fn comma_joined_recipients_become_separate_mailboxes() {
        let mut request = request();
        request.recipient = "a@x.io, b@y.io".to_string();
        request.cc = Some("c@z.io".to_string());

        let message = build_message(&settings(), "jane@example.com", &request)
            .expect("message should build");
        let rendered = String::from_utf8(message.formatted()).expect("utf8 message");

        assert!(rendered.contains("a@x.io"));
        assert!(rendered.contains("b@y.io"));
        assert!(rendered.contains("Cc: c@z.io"));
    }

    #[test]
    fn malformed_recipient_is_a_build_error() {
        let mut request = request();
        request.recipient = "not an address".to_string();

        match build_message(&settings(), "jane@example.com", &request) {
            Err(TransportError::Build(message)) => assert!(message.contains("not an address")),
            Err(other) => panic!("expected build error, got {other:?}"),
            Ok(_) => panic!("expected build error, got a message"),
        }
    }
}
