//! Text rendering of bot replies for terminal-style surfaces.

use super::responses::{ResponsePayload, Section};

pub fn render_text(payload: &ResponsePayload) -> String {
    match payload {
        ResponsePayload::PlainText(text) => text.clone(),
        ResponsePayload::RichContent(content) => content
            .sections
            .iter()
            .map(render_section)
            .collect::<Vec<String>>()
            .join("\n\n"),
    }
}

fn render_section(section: &Section) -> String {
    match section {
        Section::Paragraph(text) => text.clone(),
        Section::List { heading, items } => {
            let mut lines = Vec::with_capacity(items.len() + 1);
            lines.push(list_heading(heading));
            lines.extend(items.iter().map(|item| format!("• {}", item)));
            lines.join("\n")
        }
        Section::Facts(facts) => facts
            .iter()
            .map(|fact| format!("{}: {}", fact.label, fact.value))
            .collect::<Vec<String>>()
            .join("\n"),
    }
}

/// Headings that already end in punctuation ("Which one?") keep it as is.
fn list_heading(heading: &str) -> String {
    if heading.ends_with(|c: char| matches!(c, ':' | '?' | '!' | '.')) {
        heading.to_string()
    } else {
        format!("{}:", heading)
    }
}
