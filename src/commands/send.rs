use serde::Serialize;

use crate::cli::SendArgs;
use crate::compose::{self, DraftOutcome, EmailDraft};
use crate::context::AppContext;
use crate::deliver::{self, DeliveryRequest};
use crate::error::{AppError, AppResult};

use super::{read_job_description, read_resume};

#[derive(Debug, Serialize)]
struct SendReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft: Option<EmailDraft>,
}

pub async fn run(ctx: &AppContext, args: SendArgs) -> AppResult<()> {
    let jd_text = read_job_description(args.jd.as_deref(), args.jd_file.as_deref(), args.stdin)?;
    let resume = read_resume(args.resume.as_deref())?;
    let model = ctx.gemini_client()?;

    let (resume_text, resume_links) = match &resume {
        Some(resume) => (Some(resume.text.as_str()), Some(resume.links.as_slice())),
        None => (None, None),
    };

    let outcome = compose::compose_draft(
        &model,
        &jd_text,
        resume_text,
        resume_links,
        ctx.settings.sender_name.as_deref(),
    )
    .await?;

    // A draft that failed to parse never reaches the delivery layer.
    let draft = match outcome {
        DraftOutcome::Draft(draft) => draft,
        DraftOutcome::ParseFailure { raw, .. } => {
            return Err(AppError::Api(format!(
                "model did not return valid email fields; raw output: {raw}"
            )));
        }
    };

    let Some(recipient) = draft.sendable_recipient().map(ToOwned::to_owned) else {
        let report = SendReport {
            status: "incomplete_fields",
            recipient: None,
            subject: None,
            draft: Some(draft),
        };
        return ctx.output.emit(
            "email not sent; the draft is missing recipient, subject, or body",
            &report,
        );
    };

    let request = DeliveryRequest {
        recipient,
        cc: draft.cc.clone(),
        subject: draft.subject.clone(),
        body_html: draft.body.clone(),
        attachment_path: args.resume.clone(),
    };

    if deliver::deliver(ctx, &request).await {
        let text = format!("email sent to {}", request.recipient);
        let report = SendReport {
            status: "email_sent",
            recipient: Some(request.recipient),
            subject: Some(request.subject),
            draft: None,
        };
        ctx.output.emit(&text, &report)
    } else {
        let report = SendReport {
            status: "delivery_failed",
            recipient: Some(request.recipient),
            subject: Some(request.subject),
            draft: None,
        };
        ctx.output
            .emit("email could not be delivered by any transport", &report)
    }
}
