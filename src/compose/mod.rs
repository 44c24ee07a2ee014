//! Draft composition and body revision on top of the text-model seam.

use serde::{Deserialize, Serialize};

use crate::ai::prompts::{self, DEFAULT_REVISION_INSTRUCTION};
use crate::ai::TextModel;
use crate::error::AppResult;
use crate::resume::ResumeLink;

pub const PARSE_FAILURE_MESSAGE: &str = "Invalid AI JSON format";

/// Structured outreach draft as returned by the model. Recipient and cc may
/// each hold a single address or a comma-joined list; neither is validated
/// here, the mail transport is the final validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub recipient: Option<String>,
    pub cc: Option<String>,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    /// Returns the trimmed recipient when the draft carries everything a
    /// send needs: recipient, subject and body. `None` marks the draft as
    /// incomplete.
    pub fn sendable_recipient(&self) -> Option<&str> {
        let recipient = self
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())?;

        if self.subject.trim().is_empty() || self.body.trim().is_empty() {
            return None;
        }

        Some(recipient)
    }

    pub fn is_sendable(&self) -> bool {
        self.sendable_recipient().is_some()
    }
}

/// Outcome of one composition round trip. Parse failures are data, not
/// errors: the caller distinguishes "no draft produced" from a transport
/// failure, which propagates as `AppError` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DraftOutcome {
    Draft(EmailDraft),
    ParseFailure { error: String, raw: String },
}

pub async fn compose_draft<M: TextModel + ?Sized>(
    model: &M,
    jd_text: &str,
    resume_text: Option<&str>,
    resume_links: Option<&[ResumeLink]>,
    applicant_name: Option<&str>,
) -> AppResult<DraftOutcome> {
    let links_json = match resume_links {
        Some(links) if !links.is_empty() => Some(serde_json::to_string(links)?),
        _ => None,
    };

    let prompt = prompts::draft_prompt(jd_text, resume_text, links_json.as_deref(), applicant_name);
    let raw = model.generate(&prompt).await?;

    Ok(parse_draft_response(&raw))
}

pub async fn revise_body<M: TextModel + ?Sized>(
    model: &M,
    body: &str,
    instruction: Option<&str>,
    resume_text: Option<&str>,
) -> AppResult<String> {
    let instruction = instruction
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_REVISION_INSTRUCTION);

    let prompt = prompts::revision_prompt(body, instruction, resume_text);
    let revised = model.generate(&prompt).await?;

    Ok(revised.trim().to_string())
}

/// Decodes the model's reply into a draft. Code fences around the JSON object
/// are tolerated; everything else that fails the strict decode becomes a
/// `ParseFailure` carrying the verbatim reply.
pub fn parse_draft_response(raw: &str) -> DraftOutcome {
    let candidate = strip_code_fences(raw);

    match serde_json::from_str::<EmailDraft>(candidate) {
        Ok(mut draft) => {
            draft.body = normalize_breaks(&draft.body);
            DraftOutcome::Draft(draft)
        }
        Err(_) => DraftOutcome::ParseFailure {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            raw: raw.to_string(),
        },
    }
}

fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };

    let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or(stripped)
}

/// Line breaks in the model's body become explicit `<br>` markers so the
/// body renders the same in JSON output and in the HTML-typed message.
fn normalize_breaks(body: &str) -> String {
    body.trim().replace("\r\n", "<br>").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_object() {
        let outcome = parse_draft_response(
            r#"{"recipient":"hr@acme.io","cc":null,"subject":"Rust Engineer Application","body":"Line one\nLine two"}"#,
        );

        match outcome {
            DraftOutcome::Draft(draft) => {
                assert_eq!(draft.recipient.as_deref(), Some("hr@acme.io"));
                assert_eq!(draft.cc, None);
                assert_eq!(draft.subject, "Rust Engineer Application");
                assert_eq!(draft.body, "Line one<br>Line two");
            }
            other => panic!("expected draft, got {other:?}"),
        }
    }

    #[test]
    fn strips_json_code_fences() {
        let outcome = parse_draft_response(
            "```json\n{\"recipient\":null,\"cc\":null,\"subject\":\"S\",\"body\":\"B\"}\n```",
        );
        assert!(matches!(outcome, DraftOutcome::Draft(_)));
    }

    #[test]
    fn strips_anonymous_code_fences() {
        let outcome = parse_draft_response(
            "```\n{\"recipient\":null,\"cc\":null,\"subject\":\"S\",\"body\":\"B\"}\n```",
        );
        assert!(matches!(outcome, DraftOutcome::Draft(_)));
    }

    #[test]
    fn non_json_reply_becomes_parse_failure_with_raw() {
        let outcome = parse_draft_response("Sorry, I cannot help with that.");
        match outcome {
            DraftOutcome::ParseFailure { error, raw } => {
                assert_eq!(error, PARSE_FAILURE_MESSAGE);
                assert_eq!(raw, "Sorry, I cannot help with that.");
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_key_is_a_parse_failure() {
        // subject is absent, so the strict decode rejects the object
        let outcome = parse_draft_response(r#"{"recipient":"a@b.c","body":"hello"}"#);
        assert!(matches!(outcome, DraftOutcome::ParseFailure { .. }));
    }

    #[test]
    fn draft_without_recipient_is_not_sendable() {
        let draft = EmailDraft {
            recipient: None,
            cc: None,
            subject: "S".to_string(),
            body: "B".to_string(),
        };
        assert!(!draft.is_sendable());

        let draft = EmailDraft {
            recipient: Some("dev@example.com".to_string()),
            ..draft
        };
        assert!(draft.is_sendable());
    }
}
