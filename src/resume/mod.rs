//! Resume PDF extraction: page text plus link annotations with friendly
//! labels for the prompt context.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeLink {
    pub url: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractedResume {
    pub text: String,
    pub links: Vec<ResumeLink>,
}

/// Reads a resume PDF into page text and annotated hyperlinks. Pages without
/// extractable text contribute an empty string; a malformed document is a
/// fatal error for the caller. Pure read, no side effects.
pub fn extract(path: &Path) -> AppResult<ExtractedResume> {
    let doc = Document::load(path)?;

    let mut text = String::new();
    let mut links = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let page_text = doc.extract_text(&[page_number]).unwrap_or_default();
        text.push_str(&page_text);
        text.push('\n');

        collect_page_links(&doc, page_id, &mut links);
    }

    debug!(
        chars = text.len(),
        links = links.len(),
        "extracted resume content"
    );

    Ok(ExtractedResume {
        text: text.trim().to_string(),
        links,
    })
}

fn collect_page_links(doc: &Document, page_id: ObjectId, links: &mut Vec<ResumeLink>) {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return;
    };
    let Ok(annots) = page.get(b"Annots") else {
        return;
    };
    let Some(annots) = resolve(doc, annots).and_then(|obj| obj.as_array().ok()) else {
        return;
    };

    for entry in annots {
        let Some(annot) = resolve(doc, entry).and_then(|obj| obj.as_dict().ok()) else {
            continue;
        };
        let Some(url) = annotation_uri(doc, annot) else {
            continue;
        };
        let label = classify_link(&url);
        links.push(ResumeLink { url, label });
    }
}

/// Resolves an annotation's target URI: a direct `URI` entry wins, otherwise
/// the `A` action dictionary is consulted. Annotations without either are
/// skipped by the caller.
fn annotation_uri(doc: &Document, annot: &Dictionary) -> Option<String> {
    if let Ok(direct) = annot.get(b"URI")
        && let Some(uri) = object_string(doc, direct)
    {
        return Some(uri);
    }

    let action = resolve(doc, annot.get(b"A").ok()?)?.as_dict().ok()?;
    object_string(doc, action.get(b"URI").ok()?)
}

fn object_string(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj)? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Maps a URI to a human-friendly label. Scheme rules outrank host rules;
/// unknown hosts fall back to a capitalized first domain segment. Anything
/// unclassifiable yields `None`, never an error.
pub fn classify_link(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("mailto:") {
        return Some("Email".to_string());
    }
    if lower.starts_with("tel:") {
        return Some("Phone".to_string());
    }

    let parsed = Url::parse(trimmed).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    if host.contains("github.com") {
        return Some("GitHub".to_string());
    }
    if host.contains("linkedin.com") {
        return Some("LinkedIn".to_string());
    }

    let stripped = host.strip_prefix("www.").unwrap_or(&host);
    let segment = stripped.split('.').next().filter(|part| !part.is_empty())?;
    Some(capitalize(segment))
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailto_is_labelled_email() {
        assert_eq!(classify_link("mailto:dev@example.com").as_deref(), Some("Email"));
    }

    #[test]
    fn tel_is_labelled_phone() {
        assert_eq!(classify_link("tel:+15551234567").as_deref(), Some("Phone"));
    }

    #[test]
    fn scheme_rules_outrank_host_rules() {
        // A mailto target mentioning github stays an email link.
        assert_eq!(
            classify_link("mailto:someone@github.com").as_deref(),
            Some("Email")
        );
    }

    #[test]
    fn known_hosts_get_fixed_labels() {
        assert_eq!(
            classify_link("https://github.com/janedoe").as_deref(),
            Some("GitHub")
        );
        assert_eq!(
            classify_link("https://www.linkedin.com/in/janedoe").as_deref(),
            Some("LinkedIn")
        );
    }

    #[test]
    fn unknown_hosts_use_first_domain_segment() {
        assert_eq!(
            classify_link("https://www.acme-widgets.com/careers").as_deref(),
            Some("Acme-widgets")
        );
        assert_eq!(classify_link("https://dev.to/janedoe").as_deref(), Some("Dev"));
    }

    #[test]
    fn unparseable_urls_yield_no_label() {
        assert_eq!(classify_link("not a url"), None);
        assert_eq!(classify_link(""), None);
    }
}
