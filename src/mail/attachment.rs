use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::api::models::Attachment;

/// Hard ceiling on attachment size. Anything larger is skipped and the
/// message goes out without it.
pub const MAX_ATTACHMENT_SIZE: u64 = 25 * 1024 * 1024;

/// Reads an attachment under the shared policy: missing file or oversized
/// content skips the attachment (logged) without failing the send. MIME type
/// comes from the file extension, defaulting to an opaque binary type.
pub fn load_attachment(path: &Path) -> Option<Attachment> {
    if !path.exists() {
        warn!(path = %path.display(), "attachment file does not exist; sending without it");
        return None;
    }

    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot stat attachment; sending without it");
            return None;
        }
    };

    if size > MAX_ATTACHMENT_SIZE {
        warn!(
            path = %path.display(),
            size,
            limit = MAX_ATTACHMENT_SIZE,
            "attachment exceeds the size ceiling; sending without it"
        );
        return None;
    }

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read attachment; sending without it");
            return None;
        }
    };

    let filename = path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    debug!(filename, mime_type, size, "attachment loaded");

    Some(Attachment {
        filename,
        mime_type,
        data,
    })
}
