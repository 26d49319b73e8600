//! Plain-text rendering of conversation entries for the terminal.

use std::fmt::Write as _;

use crate::models::{
    Message, MessageKind, MessageRole, SettingField, TemplateFields, TemplateSummary,
};

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "YOU",
        MessageRole::Assistant => "VOC",
        MessageRole::System => "SYSTEM",
    }
}

/// Render one log entry, including its template or ticket card.
pub fn message(msg: &Message) -> String {
    let mut out = format!("[{}]: {}\n", role_label(msg.role), msg.content);

    match msg.kind {
        MessageKind::Text => {}
        MessageKind::TemplatePreview => {
            let Some(meta) = &msg.metadata else {
                return out;
            };
            let name = meta.template_name.as_deref().unwrap_or("Template");
            let _ = writeln!(out, "  📋 {name}");
            if let Some(fields) = &meta.fields {
                out.push_str(&fields_block(fields));
            }
        }
        MessageKind::TicketCreated => {
            if let Some((key, url)) = msg.ticket() {
                let _ = writeln!(out, "  ✅ Jira 티켓 생성 완료");
                let _ = writeln!(out, "  {key}  {url}");
            }
        }
    }
    out
}

/// Render fields as an indented `name: value` block. Multi-line values are
/// continued under the value column.
pub fn fields_block(fields: &TemplateFields) -> String {
    if fields.is_empty() {
        return "    (no fields)\n".to_string();
    }
    let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in fields.iter() {
        let mut lines = value.lines();
        let first = lines.next().unwrap_or("");
        let _ = writeln!(out, "    {key:<width$} : {first}");
        for line in lines {
            let _ = writeln!(out, "    {:<width$}   {line}", "");
        }
    }
    out
}

pub fn templates(list: &[TemplateSummary]) -> String {
    if list.is_empty() {
        return "No templates found.\n".to_string();
    }
    let mut out = format!("{:<12} {:<24} {:<10} {}\n", "ID", "NAME", "TYPE", "KEYWORDS");
    let _ = writeln!(out, "{}", "-".repeat(70));
    for t in list {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<10} {}",
            t.id,
            t.name,
            t.jira_issue_type,
            t.keywords.join(", ")
        );
        if !t.description.is_empty() {
            let _ = writeln!(out, "{:<12} {}", "", t.description);
        }
    }
    out
}

/// Render the settings table from a value lookup.
pub fn settings(value_of: impl Fn(SettingField) -> String) -> String {
    let mut out = String::new();
    for field in SettingField::ALL {
        let value = value_of(field);
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        let _ = writeln!(out, "{:<18} {:<18} {shown}", field.label(), field.as_str());
    }
    out
}
