//! Prompt templates for outreach generation.
//!
//! Composition is pure: identical inputs always produce byte-identical
//! prompts, so it can be tested without calling the generation service.

use std::num::NonZeroU32;

use crate::types::context::ContextSummary;
use crate::types::record::ProspectRecord;

/// System role for the initial outreach email.
pub const COLD_EMAIL_SYSTEM: &str =
    "You are a highly skilled B2B sales email writer, focusing on personalization and clear value.";

/// System role for follow-up emails.
pub const FOLLOW_UP_SYSTEM: &str =
    "You are a professional B2B sales email writer, skilled in crafting effective follow-ups.";

/// Initial outreach prompt.
pub const COLD_EMAIL_PROMPT: &str = r#"You are a professional B2B sales email writer.
Craft a compelling, personalized cold email for a B2B prospect.

Here's the prospect's information:
- Company Name: {company_name}
- Head Name: {head_name}
- Head Email: {head_email}
- Company Website: {website}
- LinkedIn URL: {linkedin_url}

Additional information from their website:
- Website Description: {description}
- Website Main Content Snippet: {excerpt}

The email should:
1. Be concise (max 150 words) and professional yet conversational.
2. Show a specific understanding of their business based on the provided data.
3. Present one concrete value proposition for how your product or service could benefit them.
4. End with a single, clear call to action.
5. Avoid generic phrases and boilerplate; make it highly personalized."#;

/// Follow-up prompt.
pub const FOLLOW_UP_PROMPT: &str = r#"You are a professional B2B sales email writer.
Create a concise follow-up email for {head_name} at {company_name}.
It has been {days} days since the last email.

Previous email:
{previous_email}

The follow-up should:
1. Reference the previous email briefly.
2. Add one new piece of value or address a likely objection.
3. Restate a single, clear call to action.
4. Be concise (max 100 words)."#;

/// Format the initial outreach prompt.
///
/// Without context the description and excerpt slots are left empty but
/// still present.
pub fn format_cold_email_prompt(
    record: &ProspectRecord,
    context: Option<&ContextSummary>,
) -> String {
    let (description, excerpt) = context
        .map(|c| (c.description.as_str(), c.excerpt.as_str()))
        .unwrap_or(("", ""));

    render(
        COLD_EMAIL_PROMPT,
        &[
            ("company_name", record.company_name.as_str()),
            ("head_name", record.head_name.as_str()),
            ("head_email", record.head_email.as_str()),
            ("website", record.website.as_str()),
            ("linkedin_url", record.linkedin_url.as_str()),
            ("description", description),
            ("excerpt", excerpt),
        ],
    )
}

/// Format the follow-up prompt from the previously generated email.
pub fn format_follow_up_prompt(
    record: &ProspectRecord,
    previous_email: &str,
    days_since: NonZeroU32,
) -> String {
    let days = days_since.to_string();
    render(
        FOLLOW_UP_PROMPT,
        &[
            ("head_name", record.head_name.as_str()),
            ("company_name", record.company_name.as_str()),
            ("days", days.as_str()),
            ("previous_email", previous_email),
        ],
    )
}

/// Substitute `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so a value containing `{...}`
/// is copied through verbatim. Unknown placeholders are left as-is.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
