pub mod auth;
pub mod generate;
pub mod revise;
pub mod send;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::resume::{self, ExtractedResume};

/// Reads the job description from exactly one of the accepted sources and
/// rejects empty input before any external call is made.
pub(crate) fn read_job_description(
    inline: Option<&str>,
    file: Option<&Path>,
    stdin: bool,
) -> AppResult<String> {
    let mut selected = 0;
    if inline.is_some() {
        selected += 1;
    }
    if file.is_some() {
        selected += 1;
    }
    if stdin {
        selected += 1;
    }

    if selected == 0 {
        return Err(AppError::InvalidInput(
            "missing job description; pass one of --jd, --jd-file, or --stdin".to_string(),
        ));
    }

    if selected > 1 {
        return Err(AppError::InvalidInput(
            "pass only one job description source: --jd, --jd-file, or --stdin".to_string(),
        ));
    }

    let text = if let Some(inline) = inline {
        inline.to_string()
    } else if let Some(path) = file {
        fs::read_to_string(path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::InvalidInput(
            "job description must not be empty".to_string(),
        ));
    }

    Ok(text)
}

/// Extracts the optional resume. Only PDF files are accepted; a malformed
/// document is fatal here, before any model call happens.
pub(crate) fn read_resume(path: Option<&Path>) -> AppResult<Option<ExtractedResume>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(AppError::InvalidInput(format!(
            "only pdf resumes are supported: {}",
            path.display()
        )));
    }

    Ok(Some(resume::extract(path)?))
}
