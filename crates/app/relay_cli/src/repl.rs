//! Interactive chat loop.

use relay_client::{
    ChatMessage, ChatSession, ConnectivityEvent, HttpTransport, RejectReason, Role, SubmitOutcome,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::terminal::Terminal;

const HELP: &str = "Commands: /clear  /dismiss  /status  /help  /quit";

/// Forwards a connectivity event to the health monitor. Returns false once
/// the monitor has stopped listening.
async fn signal(events: &mpsc::Sender<ConnectivityEvent>, event: ConnectivityEvent) -> bool {
    match events.send(event).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("health monitor is not listening, dropped {:?}", e.0);
            false
        }
    }
}

/// Slash commands understood by the loop; anything else is a chat message.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    Clear,
    Dismiss,
    Status,
    Help,
    Message(&'a str),
}

pub fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "/clear" => Input::Clear,
        "/dismiss" => Input::Dismiss,
        "/status" => Input::Status,
        "/help" => Input::Help,
        _ => Input::Message(line),
    }
}

pub fn render(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::Error => "error",
    };
    let mut out = format!(
        "[{}] {who}> {}",
        message.timestamp.format("%H:%M"),
        message.content
    );
    if !message.sources.is_empty() {
        out.push_str(&format!("\n    sources: {}", message.sources.join(", ")));
    }
    out
}

pub async fn run(session: ChatSession<HttpTransport>) -> Result<()> {
    let terminal = Terminal::new();

    let (events, events_rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let monitor = tokio::spawn(session.health_monitor().run(events_rx, shutdown.clone()));

    terminal
        .print(&format!("Connected to {} (session {}). {HELP}", session.config().base_url, session.id()))
        .await?;

    let mut shown = 0;
    loop {
        let snapshot = session.snapshot();
        let status = if snapshot.connection_online { "" } else { " (offline)" };
        let Some(line) = terminal.read_line(&format!("you{status}> ")).await? else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => terminal.print(HELP).await?,
            Input::Dismiss => session.dismiss_banner(),
            Input::Status => {
                // A terminal has no visibility events; treat the command as one.
                signal(&events, ConnectivityEvent::VisibilityRegained).await;
                let snap = session.snapshot();
                terminal
                    .print(&format!(
                        "connection: {}, messages: {}, retries used: {}/{}",
                        if snap.connection_online { "online" } else { "offline" },
                        snap.transcript.len(),
                        snap.retry_count,
                        session.config().max_retries
                    ))
                    .await?;
            }
            Input::Clear => {
                if session.clear(&terminal).await {
                    shown = 0;
                    terminal.print("Chat history cleared.").await?;
                }
            }
            Input::Message(text) => {
                let view = session.compose(text);
                if view.over_limit {
                    terminal
                        .print(&format!(
                            "Message too long: {}/{} characters.",
                            view.char_count, view.max
                        ))
                        .await?;
                    continue;
                }
                if !view.can_send {
                    continue;
                }

                terminal.print("assistant is typing...").await?;
                let outcome = session.send(text, &terminal).await;

                let snap = session.snapshot();
                for message in snap.transcript.iter().skip(shown) {
                    if message.role != Role::User {
                        terminal.print(&render(message)).await?;
                    }
                }
                shown = snap.transcript.len();

                match outcome {
                    SubmitOutcome::Failed(_) => {
                        if let Some(banner) = snap.banner {
                            terminal.print(&format!("[!] {banner}  (/dismiss to hide)")).await?;
                        }
                    }
                    SubmitOutcome::Rejected(RejectReason::Busy) => {
                        terminal.print("Still waiting for the previous reply.").await?;
                    }
                    SubmitOutcome::Delivered(_) | SubmitOutcome::Rejected(_) => {}
                }
            }
        }
    }

    shutdown.cancel();
    let _ = monitor.await;
    Ok(())
}
