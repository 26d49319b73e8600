//! CLI command execution.
//!
//! This is the presentation layer: it reads the store's state and calls its
//! three operations, and never writes conversation state itself.

use std::io::Write;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::admin::{PanelError, SettingsPanel, SAVED_MESSAGE};
use crate::api::{Backend, HttpBackend};
use crate::config::{ClientConfig, ADMIN_PASSWORD_ENV};
use crate::models::{MessageRole, PendingTemplate, SettingField, TemplateFields};
use crate::render;
use crate::store::{ChatState, ChatStore, Dispatch};

use super::args::{split_assignment, AdminAction, Cli, Commands};

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = ClientConfig::resolve(cli.api_url, cli.timeout)?;
    let backend = HttpBackend::new(config)?;
    tracing::debug!(base_url = backend.base_url(), "backend configured");

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(backend).await,
        Commands::Send {
            overrides,
            confirm,
            message,
        } => send_once(backend, &message.join(" "), &overrides, confirm).await,
        Commands::Templates => list_templates(&backend).await,
        Commands::Admin { password, action } => run_admin(&backend, password, action).await,
    }
}

// === Interactive Chat ===

/// One line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Message(&'a str),
    Fields,
    Edit { field: &'a str, value: &'a str },
    Confirm,
    Cancel,
    History,
    Session,
    Open,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line);
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, r)| (n, r.trim_start()));

    match name {
        "fields" => ChatInput::Fields,
        "edit" => match rest.split_once(char::is_whitespace) {
            Some((field, value)) => ChatInput::Edit {
                field,
                value: value.trim(),
            },
            None if !rest.is_empty() => ChatInput::Edit {
                field: rest,
                value: "",
            },
            None => ChatInput::Unknown(trimmed),
        },
        "confirm" => ChatInput::Confirm,
        "cancel" => ChatInput::Cancel,
        "history" => ChatInput::History,
        "session" => ChatInput::Session,
        "open" => ChatInput::Open,
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(trimmed),
    }
}

const CHAT_HELP: &str = "\
Type a complaint to get a ticket proposal.

Commands:
  /fields                Show the proposed ticket fields
  /edit <FIELD> <VALUE>  Change a proposed field (\\n starts a new line)
  /confirm               Create the ticket
  /cancel                Discard the proposal
  /history               Reprint the conversation
  /session               Show the session id
  /open                  Open the last created ticket in the browser
  /quit                  Leave
";

/// Expand `\n` into a line break and `\\` into a backslash, so multi-line
/// values such as a description fit on one input line.
fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Local edit of the pending template, reset whenever a new one is proposed.
#[derive(Debug)]
struct Draft {
    base: PendingTemplate,
    fields: TemplateFields,
}

impl Draft {
    fn of(pending: PendingTemplate) -> Self {
        let fields = pending.fields.clone();
        Self {
            base: pending,
            fields,
        }
    }
}

struct ChatSession<B> {
    store: ChatStore<B>,
    updates: watch::Receiver<ChatState>,
    printed: usize,
    draft: Option<Draft>,
}

impl<B: Backend> ChatSession<B> {
    fn new(store: ChatStore<B>) -> Self {
        let updates = store.subscribe();
        Self {
            store,
            updates,
            printed: 0,
            draft: None,
        }
    }

    /// Print messages appended since the last call and track the proposal.
    fn refresh(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let state = self.updates.borrow_and_update().clone();
        for msg in &state.messages()[self.printed..] {
            // Our own input is already on screen.
            if msg.role != MessageRole::User {
                print!("{}", render::message(msg));
            }
        }
        self.printed = state.messages().len();

        self.draft = match (state.pending(), self.draft.take()) {
            (Some(pending), Some(draft)) if draft.base == *pending => Some(draft),
            (Some(pending), _) => {
                println!("  (/confirm to create, /edit to change a field, /cancel to discard)");
                Some(Draft::of(pending.clone()))
            }
            (None, _) => None,
        };
    }

    /// Handle one line. Returns `false` when the user wants to leave.
    async fn handle(&mut self, line: &str) -> bool {
        match parse_input(line) {
            ChatInput::Message(text) => {
                if !text.trim().is_empty() {
                    println!("…");
                    self.store.send(text).await;
                }
            }
            ChatInput::Fields => match &self.draft {
                Some(draft) => {
                    println!("📋 {}", draft.base.template_name);
                    print!("{}", render::fields_block(&draft.fields));
                }
                None => println!("No ticket proposal yet."),
            },
            ChatInput::Edit { field, value } => match &mut self.draft {
                Some(draft) if draft.fields.contains(field) => {
                    let value = unescape_value(value);
                    if draft.fields.get(field) == Some(value.as_str()) {
                        println!("'{field}' unchanged.");
                    } else {
                        draft.fields.set(field, value);
                        print!("{}", render::fields_block(&draft.fields));
                    }
                }
                Some(draft) => {
                    let known: Vec<_> = draft.fields.iter().map(|(k, _)| k).collect();
                    println!("Unknown field '{field}'. Fields: {}", known.join(", "));
                }
                None => println!("No ticket proposal to edit."),
            },
            ChatInput::Confirm => match &self.draft {
                Some(draft) => {
                    let fields = draft.fields.clone();
                    println!("…");
                    if self.store.confirm(fields).await == Dispatch::Skipped {
                        println!("Nothing to confirm.");
                    }
                }
                None => println!("No ticket proposal to confirm."),
            },
            ChatInput::Cancel => {
                self.store.cancel_pending();
                println!("Proposal discarded.");
            }
            ChatInput::History => {
                for msg in self.store.snapshot().messages() {
                    print!("{}", render::message(msg));
                }
            }
            ChatInput::Session => println!("Session ID: {}", self.store.session_id()),
            ChatInput::Open => match self.store.snapshot().last_ticket() {
                Some((key, url)) => {
                    if let Err(e) = open::that(url) {
                        eprintln!("Warning: could not open {key}: {e}");
                    }
                }
                None => println!("No ticket created yet."),
            },
            ChatInput::Help => print!("{CHAT_HELP}"),
            ChatInput::Quit => return false,
            ChatInput::Unknown(cmd) => println!("Unknown command: {cmd} (try /help)"),
        }
        self.refresh();
        true
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

async fn run_chat(backend: HttpBackend) -> Result<()> {
    let mut session = ChatSession::new(ChatStore::new(backend));

    println!("vocdesk - describe the customer's issue (/help for commands)");
    println!("Session ID: {}", session.store.session_id());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if !session.handle(&line).await {
            break;
        }
        prompt()?;
    }
    println!();
    Ok(())
}

// === One-shot Send ===

async fn send_once(
    backend: HttpBackend,
    message: &str,
    overrides: &[String],
    confirm: bool,
) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Message is required for send command");
    }

    let store = ChatStore::new(backend);
    let outcome = store.send(message).await;
    print_replies(&store.snapshot());
    if outcome == Dispatch::Failed {
        bail!("Chat request failed");
    }

    if !confirm {
        return Ok(());
    }

    let pending = store
        .pending()
        .context("No ticket template was proposed; nothing to confirm")?;
    let fields = apply_overrides(pending.fields, overrides)?;

    let before = store.snapshot().messages().len();
    let outcome = store.confirm(fields).await;
    for msg in &store.snapshot().messages()[before..] {
        print!("{}", render::message(msg));
    }
    if outcome == Dispatch::Failed {
        bail!("Ticket creation failed");
    }
    Ok(())
}

fn print_replies(state: &ChatState) {
    for msg in state.messages() {
        if msg.role != MessageRole::User {
            print!("{}", render::message(msg));
        }
    }
}

/// Apply `FIELD=VALUE` overrides to proposed fields. Only proposed fields can
/// be changed.
fn apply_overrides(mut fields: TemplateFields, overrides: &[String]) -> Result<TemplateFields> {
    for raw in overrides {
        let Some((field, value)) = split_assignment(raw) else {
            bail!("Invalid override '{raw}': expected FIELD=VALUE");
        };
        if !fields.contains(field) {
            let known: Vec<_> = fields.iter().map(|(k, _)| k).collect();
            bail!(
                "Field '{field}' is not in the proposed template. Fields: {}",
                known.join(", ")
            );
        }
        fields.set(field, unescape_value(value));
    }
    Ok(fields)
}

// === Templates ===

async fn list_templates(backend: &HttpBackend) -> Result<()> {
    let templates = backend
        .list_templates()
        .await
        .context("Failed to list templates")?;
    print!("{}", render::templates(&templates));
    Ok(())
}

// === Admin Settings ===

async fn run_admin(
    backend: &HttpBackend,
    password: Option<String>,
    action: AdminAction,
) -> Result<()> {
    let password = password
        .or_else(|| std::env::var(ADMIN_PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .with_context(|| format!("Admin password required: pass --password or set {ADMIN_PASSWORD_ENV}"))?;

    match action {
        AdminAction::Verify => {
            if !matches!(backend.verify_admin_password(&password).await, Ok(true)) {
                bail!(PanelError::InvalidPassword);
            }
            println!("✓ Password accepted");
        }
        AdminAction::Show => {
            let panel = SettingsPanel::unlock(backend, password).await?;
            print!("{}", render::settings(|field| panel.display_value(field)));
        }
        AdminAction::Set { assignments } => {
            let mut panel = SettingsPanel::unlock(backend, password).await?;
            for raw in &assignments {
                let (name, value) = split_assignment(raw)
                    .with_context(|| format!("Invalid setting '{raw}': expected FIELD=VALUE"))?;
                let field = SettingField::parse(name).with_context(|| {
                    let known: Vec<_> = SettingField::ALL.iter().map(|f| f.as_str()).collect();
                    format!("Unknown setting '{name}'. Settings: {}", known.join(", "))
                })?;
                panel.edit(field, value);
            }

            let changed: Vec<_> = panel.draft().fields().iter().map(|f| f.as_str()).collect();
            if panel.save().await? {
                println!("{SAVED_MESSAGE} ({})", changed.join(", "));
                print!("{}", render::settings(|field| panel.settings().get(field).to_string()));
            } else {
                println!("No changes.");
            }
        }
    }
    Ok(())
}
