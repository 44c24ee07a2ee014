use crate::cli::GenerateArgs;
use crate::compose::{self, DraftOutcome, EmailDraft};
use crate::context::AppContext;
use crate::error::AppResult;

use super::{read_job_description, read_resume};

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> AppResult<()> {
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

    let text = match &outcome {
        DraftOutcome::Draft(draft) => format_draft(draft),
        DraftOutcome::ParseFailure { raw, .. } => {
            format!("model reply was not a valid draft; raw output:\n{raw}")
        }
    };

    ctx.output.emit(&text, &outcome)
}

fn format_draft(draft: &EmailDraft) -> String {
    let recipient = draft.recipient.as_deref().unwrap_or("(none found)");
    let cc = draft.cc.as_deref().unwrap_or("(none)");
    let body = draft.body.replace("<br>", "\n");

    format!(
        "to: {recipient}\ncc: {cc}\nsubject: {}\n\n{body}",
        draft.subject
    )
}
