use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

use crate::api::models::SendRequest;

/// Builds the url-safe-base64 RFC 2822 payload the Gmail API expects. The
/// body is always HTML-typed; attachments turn the message into
/// multipart/mixed.
pub fn build_raw_message(request: &SendRequest) -> String {
    let mut headers = build_base_headers(request);

    let payload = if request.attachments.is_empty() {
        headers.push("Content-Type: text/html; charset=utf-8".to_string());
        format!("{}\r\n\r\n{}", headers.join("\r\n"), request.body_html)
    } else {
        let boundary = random_boundary();
        headers.push(format!(
            "Content-Type: multipart/mixed; boundary=\"{boundary}\""
        ));
        format!(
            "{}\r\n\r\n{}",
            headers.join("\r\n"),
            multipart_body(request, &boundary)
        )
    };

    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

fn build_base_headers(request: &SendRequest) -> Vec<String> {
    let mut headers = Vec::new();

    if let Some(from) = &request.from {
        headers.push(format!("From: {from}"));
    }

    headers.push(format!("To: {}", request.to.join(", ")));

    if !request.cc.is_empty() {
        headers.push(format!("Cc: {}", request.cc.join(", ")));
    }

    headers.push(format!("Subject: {}", request.subject));
    headers.push("MIME-Version: 1.0".to_string());

    headers
}

fn multipart_body(request: &SendRequest, boundary: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/html; charset=utf-8\r\n\r\n");
    out.push_str(&request.body_html);
    out.push_str("\r\n");

    for attachment in &request.attachments {
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{}\"\r\n",
            attachment.mime_type,
            escape_header_value(&attachment.filename)
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
            escape_header_value(&attachment.filename)
        ));

        let encoded = STANDARD.encode(&attachment.data);
        out.push_str(&fold_base64_lines(&encoded));
        out.push_str("\r\n");
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

fn fold_base64_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 76 + 8);
    let mut start = 0;
    while start < input.len() {
        let end = (start + 76).min(input.len());
        out.push_str(&input[start..end]);
        out.push_str("\r\n");
        start = end;
    }
    out
}

fn random_boundary() -> String {
    let mut bytes = [0_u8; 12];
    rand::thread_rng().fill(&mut bytes);
    let token = STANDARD.encode(bytes);
    format!("jobmail-{token}")
}

fn escape_header_value(value: &str) -> String {
    value.replace('"', "")
}
