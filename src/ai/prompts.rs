//! Prompt templates for the two model round trips: structured draft
//! composition and free-text body revision.

pub const DEFAULT_REVISION_INSTRUCTION: &str =
    "rewrite for clarity and concision, same intent";

const RESUME_UNAVAILABLE: &str = "Resume data not available. Use the job description only.";
const LINKS_UNAVAILABLE: &str = "No links available.";

pub fn draft_prompt(
    jd_text: &str,
    resume_text: Option<&str>,
    links_json: Option<&str>,
    applicant_name: Option<&str>,
) -> String {
    let resume_section = resume_text.unwrap_or(RESUME_UNAVAILABLE);
    let links_section = links_json.unwrap_or(LINKS_UNAVAILABLE);
    let name_hint = match applicant_name {
        Some(name) => format!("Sign as {name}."),
        None => "Sign with the applicant's name as it appears in the resume.".to_string(),
    };

    format!(
        "You are an assistant that writes professional job-application emails.\n\
         \n\
         --- JOB DESCRIPTION ---\n\
         {jd_text}\n\
         \n\
         --- RESUME ---\n\
         {resume_section}\n\
         \n\
         --- RESUME LINKS ---\n\
         {links_section}\n\
         \n\
         --- TASK ---\n\
         1. Extract the recipient email address from the job description. Join multiple \
         addresses with commas. Use null when none is present.\n\
         2. Extract any CC addresses the job description asks for, comma-joined. Use null \
         when none is present.\n\
         3. Write a subject line of at most 7 words. Follow any subject instruction given \
         in the job description; otherwise derive it from the job title.\n\
         4. Write a short, professional, personalized body of 2-5 lines, using the resume \
         when available. Avoid template tone and cliche wording.\n\
         5. End the body with a signature block: name, phone number, GitHub link, LinkedIn \
         link, each on its own line with no blank line between them. Take phone and links \
         from the resume; omit any line whose detail is not available. {name_hint}\n\
         6. Respond with exactly one JSON object and nothing else:\n\
         {{\n\
             \"recipient\": \"address or null\",\n\
             \"cc\": \"address or null\",\n\
             \"subject\": \"subject line here\",\n\
             \"body\": \"mail body here\"\n\
         }}\n"
    )
}

pub fn revision_prompt(body: &str, instruction: &str, resume_text: Option<&str>) -> String {
    let resume_section = resume_text.unwrap_or(RESUME_UNAVAILABLE);

    format!(
        "You are revising the body of a job-application email.\n\
         \n\
         --- CURRENT BODY ---\n\
         {body}\n\
         \n\
         --- RESUME ---\n\
         {resume_section}\n\
         \n\
         --- INSTRUCTION ---\n\
         {instruction}\n\
         \n\
         Return only the rewritten body as plain text. Do not add a subject line, a \
         recipient, or any commentary around the text. Keep the sender's intent.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_prompt_embeds_all_sections() {
        let prompt = draft_prompt(
            "Rust engineer at Acme. Apply to jobs@acme.io",
            Some("Six years of systems work."),
            Some(r#"[{"url":"https://github.com/dev","label":"GitHub"}]"#),
            Some("Jane Doe"),
        );

        assert!(prompt.contains("jobs@acme.io"));
        assert!(prompt.contains("Six years of systems work."));
        assert!(prompt.contains("github.com/dev"));
        assert!(prompt.contains("Sign as Jane Doe."));
        assert!(prompt.contains("exactly one JSON object"));
    }

    #[test]
    fn draft_prompt_uses_placeholders_when_resume_is_absent() {
        let prompt = draft_prompt("Some JD", None, None, None);
        assert!(prompt.contains("Resume data not available."));
        assert!(prompt.contains("No links available."));
        assert!(prompt.contains("as it appears in the resume"));
    }

    #[test]
    fn revision_prompt_carries_instruction_and_body() {
        let prompt = revision_prompt("Original body", DEFAULT_REVISION_INSTRUCTION, None);
        assert!(prompt.contains("Original body"));
        assert!(prompt.contains("rewrite for clarity and concision"));
        assert!(prompt.contains("plain text"));
    }
}
