//! `ragchat ask`: one-shot question.
//!
//! Loads the knowledge-base directory, sends a single question, streams
//! the numbered answer to stdout, and exits.  Useful for scripting.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use rc_domain::config::Config;
use rc_domain::Error;
use rc_sessions::Step;

use super::render::{context_lines, AskOutput, StreamPrinter};

/// Execute one exchange and print the answer.
pub async fn run(
    config: Arc<Config>,
    question: String,
    kb: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let show_inline = config.chat.show_context_inline;
    let result = ask_once(&config, &question, kb.as_deref(), |delta| {
        if !json_output {
            print!("{delta}");
            std::io::stdout().flush().ok();
        }
    })
    .await;

    let output = match result {
        Ok(output) => output,
        Err(e) if is_cancelled(&e) => {
            println!();
            eprintln!("answer cancelled");
            std::process::exit(130);
        }
        Err(e) => {
            if !json_output {
                println!();
            }
            return Err(e);
        }
    };

    if json_output {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| anyhow::anyhow!("serializing answer: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!();

    if show_inline && !output.context_chunks.is_empty() {
        let mut view = rc_sessions::ContextView::new();
        view.open(&output.context_chunks);
        println!();
        for line in context_lines(&view, None) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Run one exchange against the configured backend.
///
/// `on_delta` receives each newly rendered piece of the answer as it
/// streams in.
pub async fn ask_once<F>(
    config: &Config,
    question: &str,
    kb: Option<&str>,
    mut on_delta: F,
) -> anyhow::Result<AskOutput>
where
    F: FnMut(&str),
{
    let mut session = super::new_session(config)?;
    session
        .load_knowledge_bases()
        .await
        .with_context(|| format!("loading knowledge bases from {}", config.backend.strategy_url()))?;
    super::pick_knowledge_base(&mut session, kb)?;

    let knowledge_base = session
        .selected_knowledge_base()
        .map(str::to_owned)
        .unwrap_or_default();

    let mut handle = session.submit(question)?;
    let guard = super::cancel_on_ctrl_c(handle.cancel_token());

    let mut printer = StreamPrinter::new();
    let driven = session
        .drive(&mut handle, |session, step| {
            if let (Step::Text, Some(live)) = (step, session.live()) {
                let rendered = live.rendered();
                on_delta(printer.advance(&rendered));
            }
        })
        .await;
    guard.abort();
    driven?;

    let answer = session
        .transcript()
        .last()
        .context("answer missing from transcript")?;
    Ok(AskOutput::new(
        &knowledge_base,
        answer.content(),
        answer.context_chunks().map(<[String]>::to_vec).unwrap_or_default(),
    ))
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<Error>(), Some(Error::Cancelled))
}
