// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palaver chat` command implementation.
//!
//! Runs an interactive chat panel with readline history. Every non-blank line
//! counts as activity and plain text is submitted to the completion endpoint.
//! A background listener prints the ended notice when the session times out.

use std::sync::Arc;

use colored::Colorize;
use palaver_client::HttpBackend;
use palaver_config::model::PalaverConfig;
use palaver_core::{PalaverError, Role, Turn};
use palaver_session::{SessionController, SessionEvent};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::render::Renderer;

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Message(&'a str),
    New,
    History,
    Status,
    Quit,
    Unknown(&'a str),
}

pub fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Empty,
        "/new" => Input::New,
        "/history" => Input::History,
        "/status" => Input::Status,
        "/quit" | "/exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Message(text),
    }
}

enum ReadOutcome {
    Line(String),
    Closed,
    Failed(String),
}

/// Builds the HTTP backend and controller from config.
pub fn build_controller(config: &PalaverConfig) -> Result<SessionController, PalaverError> {
    let backend = Arc::new(HttpBackend::new(&config.endpoint)?);
    Ok(SessionController::from_config(backend, config))
}

/// Runs the `palaver chat` interactive panel.
pub async fn run_chat(config: PalaverConfig) -> Result<(), PalaverError> {
    let controller = Arc::new(build_controller(&config)?);
    let renderer = Renderer::new(config.shell.show_timestamps);

    let listener = tokio::spawn(watch_events(
        controller.subscribe(),
        controller.clone(),
        renderer,
    ));

    let (line_tx, mut line_rx) = mpsc::channel::<ReadOutcome>(1);
    let (ack_tx, ack_rx) = mpsc::channel::<()>(1);
    let prompt = format!("{}> ", config.shell.name.cyan());
    let reader = tokio::task::spawn_blocking(move || read_lines(&prompt, line_tx, ack_rx));

    print_welcome(&config);

    while let Some(outcome) = line_rx.recv().await {
        let line = match outcome {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Closed => break,
            ReadOutcome::Failed(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let input = parse_input(&line);
        if matches!(input, Input::History | Input::Status | Input::Unknown(_)) {
            controller.on_activity();
        }

        match input {
            Input::Empty => {}
            Input::Quit => break,
            Input::New => {
                controller.reset();
                print_welcome(&config);
            }
            Input::History => println!("{}", renderer.transcript(&controller.transcript())),
            Input::Status => print_status(&controller),
            Input::Unknown(cmd) => {
                eprintln!(
                    "{}",
                    renderer.hint(&format!(
                        "unknown command {cmd}; try /new, /history, /status or /quit"
                    ))
                );
            }
            Input::Message(text) => match controller.submit(text).await {
                Ok(turn) => println!("{}\n", renderer.turn(&turn)),
                Err(e) => {
                    debug!(error = %e, "submit failed");
                    eprintln!("{}", renderer.error(&e));
                }
            },
        }

        if ack_tx.send(()).await.is_err() {
            break;
        }
    }

    drop(ack_tx);
    listener.abort();
    if let Err(e) = reader.await {
        warn!(error = %e, "readline task did not shut down cleanly");
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Blocking readline loop. Waits for an ack after each line so the prompt
/// only reappears once the previous line has been handled.
fn read_lines(prompt: &str, lines: mpsc::Sender<ReadOutcome>, mut acks: mpsc::Receiver<()>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            let _ = lines.blocking_send(ReadOutcome::Failed(format!(
                "failed to initialize readline: {e}"
            )));
            return;
        }
    };

    loop {
        let outcome = match rl.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                ReadOutcome::Line(line)
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => ReadOutcome::Closed,
            Err(e) => ReadOutcome::Failed(e.to_string()),
        };

        let done = !matches!(outcome, ReadOutcome::Line(_));
        if lines.blocking_send(outcome).is_err() || done {
            return;
        }
        if acks.blocking_recv().is_none() {
            return;
        }
    }
}

async fn watch_events(
    mut events: broadcast::Receiver<SessionEvent>,
    controller: Arc<SessionController>,
    renderer: Renderer,
) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Ended { session_id }) => {
                debug!(session_id = %session_id, "showing ended notice");
                if let Some(notice) = ended_notice(&controller.transcript()) {
                    println!("\n{}", renderer.turn(&notice));
                }
                println!("{}", renderer.hint("Type /new to start a new chat."));
            }
            Ok(SessionEvent::Reset { .. } | SessionEvent::Engaged { .. }) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "session event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// The most recent system turn. A reply that lands after expiry may follow it.
fn ended_notice(turns: &[Turn]) -> Option<Turn> {
    turns.iter().rev().find(|t| t.role() == Role::System).cloned()
}

fn print_welcome(config: &PalaverConfig) {
    println!("{}", config.shell.name.bold().green());
    println!(
        "Type a message to chat. {} starts over, {} exits.\n",
        "/new".yellow(),
        "/quit".yellow()
    );
}

fn print_status(controller: &SessionController) {
    let state = if controller.is_active() {
        "active".green()
    } else {
        "ended".red()
    };
    println!("  session:  {}", controller.session_id());
    println!("  state:    {state}");
    println!("  turns:    {}", controller.transcript().len());
    println!(
        "  timeout:  {}s of inactivity",
        controller.inactivity_timeout().as_secs()
    );
}
