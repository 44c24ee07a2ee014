use serde::Serialize;

/// Fully resolved outgoing message, ready for MIME encoding. Recipient and cc
/// lists arrive pre-split; no address validation happens here or upstream,
/// the transport is the final validator.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body_html: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub id: String,
    pub thread_id: Option<String>,
    pub note: String,
}
