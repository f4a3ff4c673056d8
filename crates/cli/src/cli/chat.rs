//! `ragchat chat`: interactive REPL command.
//!
//! Opens a readline-based loop that submits each line as a question and
//! streams the numbered answer back.  Slash-commands switch knowledge
//! bases and open the context behind an answer.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use rc_domain::config::Config;
use rc_domain::Error;
use rc_sessions::{ChatSession, Step};

use super::render::{context_lines, history_line, StreamPrinter};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL.
pub async fn chat(config: Arc<Config>, kb: Option<String>) -> anyhow::Result<()> {
    // 1. Open the session and load the directory.  A failed load leaves
    //    the list empty; questions stay blocked until `/kbs` succeeds.
    let mut session = super::new_session(&config)?;
    if let Err(e) = session.load_knowledge_bases().await {
        tracing::warn!(error = %e, "failed to load knowledge bases");
        eprintln!("\x1B[31mcould not load knowledge bases: {e}\x1B[0m");
    }
    super::pick_knowledge_base(&mut session, kb.as_deref())?;

    // 2. Initialize rustyline editor with persistent history.
    let history_path = history_path(&config);
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    // 3. Print welcome message to stderr (keep stdout clean for output).
    eprintln!("ragchat interactive chat ({})", config.backend.strategy_url());
    match session.selected_knowledge_base() {
        Some(name) => eprintln!("Knowledge base: {name}  |  Type /help for commands, Ctrl+D to exit"),
        None => eprintln!("No knowledge base available  |  Type /help for commands, Ctrl+D to exit"),
    }
    eprintln!();

    // 4. REPL loop.
    loop {
        let readline = rl.readline("you> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(&line).ok();

                // ── Slash commands ────────────────────────────────
                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut session).await {
                        break;
                    }
                    continue;
                }

                // ── Question → exchange ───────────────────────────
                if let Err(e) = send_question(&mut session, &line, config.chat.show_context_inline).await {
                    eprintln!("\x1B[31merror: {e}\x1B[0m");
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    // 5. Save history.
    rl.save_history(&history_path).ok();

    eprintln!("Goodbye!");
    Ok(())
}

fn history_path(config: &Config) -> PathBuf {
    config.chat.history_file.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".ragchat")
            .join("chat_history.txt")
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command.  Returns `true` if the REPL should exit.
async fn handle_slash_command(input: &str, session: &mut ChatSession) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd {
        "/exit" | "/quit" => return true,

        "/kb" => match arg {
            Some(name) => match session.select_knowledge_base(name) {
                Ok(()) => eprintln!("Knowledge base set to: {name}"),
                Err(e) => eprintln!("\x1B[31m{e}\x1B[0m  (see /kbs)"),
            },
            None => {
                let current = session.selected_knowledge_base().unwrap_or("(none)");
                eprintln!("Current knowledge base: {current}");
                eprintln!("Usage: /kb <name>");
            }
        },

        "/kbs" => {
            if session.knowledge_bases().is_empty() {
                // Retry a directory load that failed or came back empty.
                if let Err(e) = session.load_knowledge_bases().await {
                    eprintln!("\x1B[31mcould not load knowledge bases: {e}\x1B[0m");
                    return false;
                }
            }
            if session.knowledge_bases().is_empty() {
                eprintln!("No knowledge bases available");
            }
            let selected = session.selected_knowledge_base().map(str::to_owned);
            for name in session.knowledge_bases() {
                let marker = if Some(name) == selected.as_ref() { "*" } else { " " };
                eprintln!("{marker} {name}");
            }
        }

        "/context" => {
            let target = match parse_context_args(arg) {
                Ok(target) => target,
                Err(msg) => {
                    eprintln!("{msg}");
                    eprintln!("Usage: /context [n] [#turn]");
                    return false;
                }
            };
            let opened = match target.turn {
                Some(turn) => session.open_context(turn),
                None => session.open_latest_context(),
            };
            if !opened {
                match target.turn {
                    Some(turn) => eprintln!("No context for turn #{turn}"),
                    None => eprintln!("No context for the latest answer"),
                }
                return false;
            }
            let lines = context_lines(session.context_view(), target.chunk);
            if lines.is_empty() {
                eprintln!("No chunk [{}] in this answer's context", target.chunk.unwrap_or(0));
            }
            for line in lines {
                println!("{line}");
            }
            session.close_context();
        }

        "/history" => {
            for row in session.view() {
                println!("{}", history_line(&row));
            }
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /kb <name>       Switch knowledge base");
            eprintln!("  /kbs             List knowledge bases (* = selected)");
            eprintln!("  /context [n] [#t] Show context chunk [n] (all if omitted) of the latest");
            eprintln!("                   answer, or of turn #t as listed by /history");
            eprintln!("  /history         Show the conversation so far");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
            eprintln!("Ctrl+C while an answer streams cancels it.");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Exchange streaming
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Submit one question and stream the answer to stdout.
async fn send_question(session: &mut ChatSession, question: &str, show_inline: bool) -> anyhow::Result<()> {
    let mut handle = session.submit(question)?;
    let guard = super::cancel_on_ctrl_c(handle.cancel_token());

    let mut printer = StreamPrinter::new();
    let driven = session
        .drive(&mut handle, |session, step| match step {
            Step::Text => {
                if let Some(live) = session.live() {
                    print!("{}", printer.advance(&live.rendered()));
                    std::io::stdout().flush().ok();
                }
            }
            Step::Context => {
                if let Some(live) = session.live() {
                    eprint!("\x1B[2m[{} context chunks]\x1B[0m ", live.context_chunks.len());
                    std::io::stderr().flush().ok();
                }
            }
            _ => {}
        })
        .await;
    guard.abort();

    // Trailing newline + blank separator after the answer.
    println!();
    match driven {
        Ok(()) => {
            if show_inline && session.open_latest_context() {
                for line in context_lines(session.context_view(), None) {
                    println!("\x1B[2m{line}\x1B[0m");
                }
                session.close_context();
            }
            println!();
            Ok(())
        }
        Err(Error::Cancelled) => {
            eprintln!("(answer cancelled)");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// What `/context` should show.
#[derive(Debug, Default, PartialEq, Eq)]
struct ContextTarget {
    /// 1-based chunk index; `None` shows every chunk.
    chunk: Option<usize>,
    /// Transcript index from `/history`; `None` means the latest answer.
    turn: Option<usize>,
}

/// Parse `[n] [#turn]`, in either order.
fn parse_context_args(arg: Option<&str>) -> Result<ContextTarget, String> {
    let mut target = ContextTarget::default();
    for token in arg.unwrap_or_default().split_whitespace() {
        if let Some(turn) = token.strip_prefix('#') {
            let turn = turn.parse().map_err(|_| format!("Bad turn index: {token}"))?;
            if target.turn.replace(turn).is_some() {
                return Err("Only one turn index allowed".into());
            }
        } else {
            let chunk = token.parse().map_err(|_| format!("Bad chunk index: {token}"))?;
            if target.chunk.replace(chunk).is_some() {
                return Err("Only one chunk index allowed".into());
            }
        }
    }
    Ok(target)
}
