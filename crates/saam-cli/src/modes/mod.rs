//! Runtime execution modes.
//!
//! - `run_exec`: one prompt in, streamed reply out on stdout
//! - `run_interactive_chat`: line-based chat loop over the session store

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use saam_core::attachments::{Attachment, media_type_for_path};
use saam_core::config::Config;
use saam_core::dispatch::{DispatchOptions, DispatchOutcome, dispatch_submission};
use saam_core::providers::gemini::{GeminiClient, GeminiConfig};
use saam_core::session::SessionStore;

/// Reads an attachment from disk, inferring the media type from the
/// extension. Unknown extensions still load; content sniffing decides later.
pub fn load_attachment(path: &Path) -> Result<Attachment> {
    let data = std::fs::read(path)
        .with_context(|| format!("read attachment {}", path.display()))?;
    let media_type = media_type_for_path(path).unwrap_or("application/octet-stream");
    Ok(Attachment::new(data, media_type))
}

fn build_client(config: &Config) -> Result<GeminiClient> {
    let gemini = &config.providers.gemini;
    let provider_config = GeminiConfig::from_env(
        config.model.clone(),
        config.max_output_tokens,
        gemini.base_url.as_deref(),
        gemini.api_key.as_deref(),
    )?;
    Ok(GeminiClient::new(provider_config))
}

/// Sends one prompt and prints the reply incrementally.
///
/// # Errors
/// Returns an error (carrying the transcript's error text) when the model
/// call fails, so the process exits non-zero.
pub async fn run_exec(
    prompt: &str,
    attachment: Option<Attachment>,
    config: &Config,
) -> Result<()> {
    tracing::info!(model = %config.model, "exec prompt");
    let client = build_client(config)?;
    let mut store = SessionStore::new();
    let thread_id = store.active_id();

    let outcome = dispatch_submission(
        &mut store,
        thread_id,
        prompt,
        attachment,
        &client,
        DispatchOptions::from(config),
        &mut print_fragment,
    )
    .await;

    match outcome {
        DispatchOutcome::Success => {
            println!();
            Ok(())
        }
        DispatchOutcome::Failure => {
            let detail = store
                .active_thread()
                .and_then(|t| t.messages.last())
                .map_or_else(|| "prompt was not answered".to_string(), |m| m.content.clone());
            anyhow::bail!("{detail}")
        }
    }
}

/// Runs the interactive chat loop until `:q` or EOF.
pub async fn run_interactive_chat(config: &Config) -> Result<()> {
    tracing::info!(model = %config.model, "starting interactive chat");
    let client = build_client(config)?;
    let options = DispatchOptions::from(config);
    let mut store = SessionStore::new();
    let mut pending_attachment: Option<Attachment> = None;

    println!("saam {} interactive chat. :help lists commands.", config.model);

    let stdin = std::io::stdin();
    loop {
        let name = store
            .active_thread()
            .map_or_else(String::new, |t| t.name.clone());
        print!("[{name}]> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            if handle_command(command, &mut store, &mut pending_attachment) == ReplFlow::Quit {
                break;
            }
            continue;
        }

        let thread_id = store.active_id();
        let attachment = pending_attachment.take();
        let outcome = dispatch_submission(
            &mut store,
            thread_id,
            line,
            attachment,
            &client,
            options,
            &mut print_fragment,
        )
        .await;

        match outcome {
            // fragments are already on screen, close the line
            DispatchOutcome::Success => println!(),
            DispatchOutcome::Failure => {
                if let Some(message) = store.active_thread().and_then(|t| t.messages.last()) {
                    println!("{}", message.content);
                }
            }
        }
    }

    Ok(())
}

fn print_fragment(fragment: &str) {
    print!("{fragment}");
    let _ = std::io::stdout().flush();
}

#[derive(Debug, PartialEq, Eq)]
enum ReplFlow {
    Continue,
    Quit,
}

fn handle_command(
    command: &str,
    store: &mut SessionStore,
    pending_attachment: &mut Option<Attachment>,
) -> ReplFlow {
    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "q" | "quit" => return ReplFlow::Quit,
        "help" => print_help(),
        "new" => {
            store.create_thread();
            if let Some(thread) = store.active_thread() {
                println!("Started {}", thread.name);
            }
        }
        "list" => {
            for thread in store.threads() {
                let marker = if thread.id == store.active_id() { "*" } else { " " };
                println!(
                    "{marker} {:>3}  {}  ({} messages)",
                    thread.id,
                    thread.name,
                    thread.messages.len()
                );
            }
        }
        "switch" => match arg.parse::<u64>() {
            Ok(id) => {
                store.select_thread(id);
                if store.active_id() == id {
                    if let Some(thread) = store.active_thread() {
                        println!("Switched to {}", thread.name);
                    }
                } else {
                    println!("No thread with id {id}");
                }
            }
            Err(_) => println!("Usage: :switch <id>"),
        },
        "delete" => match arg.parse::<u64>() {
            Ok(id) => {
                store.delete_thread(id);
                if let Some(thread) = store.active_thread() {
                    println!("Active thread is now {}", thread.name);
                }
            }
            Err(_) => println!("Usage: :delete <id>"),
        },
        "attach" => {
            if arg.is_empty() {
                println!("Usage: :attach <path>");
            } else {
                match load_attachment(Path::new(arg)) {
                    Ok(attachment) => {
                        println!(
                            "Attached {} ({} bytes); it is sent with your next prompt",
                            arg,
                            attachment.data.len()
                        );
                        *pending_attachment = Some(attachment);
                    }
                    Err(err) => println!("{err:#}"),
                }
            }
        }
        _ => println!("Unknown command :{name}. :help lists commands."),
    }

    ReplFlow::Continue
}

fn print_help() {
    println!(":new           start a new chat thread");
    println!(":list          list chat threads");
    println!(":switch <id>   switch to a thread");
    println!(":delete <id>   delete a thread");
    println!(":attach <path> attach a file to the next prompt");
    println!(":q             quit");
}
