use std::fs;

use serde::Serialize;

use crate::cli::ReviseArgs;
use crate::compose;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

use super::read_resume;

#[derive(Debug, Serialize)]
struct RevisedBody {
    body: String,
}

pub async fn run(ctx: &AppContext, args: ReviseArgs) -> AppResult<()> {
    let body = read_body(&args)?;
    let resume = read_resume(args.resume.as_deref())?;
    let model = ctx.gemini_client()?;

    let revised = compose::revise_body(
        &model,
        &body,
        args.instruction.as_deref(),
        resume.as_ref().map(|resume| resume.text.as_str()),
    )
    .await?;

    ctx.output.emit(
        &revised,
        &RevisedBody {
            body: revised.clone(),
        },
    )
}

fn read_body(args: &ReviseArgs) -> AppResult<String> {
    let body = match (&args.body, &args.body_file) {
        (Some(_), Some(_)) => {
            return Err(AppError::InvalidInput(
                "pass only one body source: --body or --body-file".to_string(),
            ));
        }
        (Some(body), None) => body.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(AppError::InvalidInput(
                "missing body; pass --body or --body-file".to_string(),
            ));
        }
    };

    let body = body.trim().to_string();
    if body.is_empty() {
        return Err(AppError::InvalidInput("body must not be empty".to_string()));
    }

    Ok(body)
}
