//! `parley chat`: interactive REPL command.
//!
//! A plain line is sent to the open chat; slash-commands drive the session
//! and channel.  Readline blocks, so it runs on its own thread and feeds
//! lines into the same `select!` loop that applies client events and
//! prints notifications.

use std::path::PathBuf;

use pl_client::{
    ChatClient, ChatClientBuilder, CloseCause, EventReceiver, Notification, NotificationReceiver,
    SendOutcome,
};
use pl_domain::config::Config;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat until `/exit` or end of input.  The session is
/// logged out on the way out so the service sees the user go offline.
pub async fn chat(config: &Config, user: Option<String>) -> anyhow::Result<()> {
    let (mut client, mut events, mut notes) = ChatClientBuilder::from_config(config)?.build()?;

    eprintln!("Parley interactive chat  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    if let Some(user) = user {
        if let Err(e) = client.login(&user).await {
            print_error(&e);
        }
    }

    let mut input = spawn_reader(history_path());

    loop {
        tokio::select! {
            Some(event) = events.recv() => client.handle_event(event).await,
            Some(note) = notes.recv() => render(&note),
            line = input.recv() => match line {
                Some(Input::Line(line)) => {
                    if dispatch(&mut client, &line).await {
                        break;
                    }
                }
                Some(Input::Interrupted) => eprintln!("(Use Ctrl+D or /exit to quit)"),
                Some(Input::Closed) | None => break,
            },
        }
    }

    client.shutdown().await;
    drain(&mut events, &mut notes, &mut client).await;
    eprintln!("Goodbye!");
    Ok(())
}

/// Apply whatever is still queued and print the remaining notifications.
async fn drain(events: &mut EventReceiver, notes: &mut NotificationReceiver, client: &mut ChatClient) {
    while let Ok(event) = events.try_recv() {
        client.handle_event(event).await;
    }
    while let Ok(note) = notes.try_recv() {
        render(&note);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Line reader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".parley")
        .join("history.txt")
}

/// Read lines on a dedicated thread.  The thread stops after forwarding
/// `/exit`, `/quit` or end of input, saving history first.
fn spawn_reader(history: PathBuf) -> mpsc::UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut rl = match rustyline::DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                let _ = tx.send(Input::Closed);
                return;
            }
        };
        if let Some(parent) = history.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let _ = rl.load_history(&history);

        loop {
            let input = match rl.readline("> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(&line).ok();
                    }
                    let done = matches!(parse_line(&line), Some(ReplCommand::Exit));
                    if tx.send(Input::Line(line)).is_err() || done {
                        break;
                    }
                    continue;
                }
                Err(ReadlineError::Interrupted) => Input::Interrupted,
                Err(ReadlineError::Eof) => Input::Closed,
                Err(e) => {
                    eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                    Input::Closed
                }
            };
            let closed = matches!(input, Input::Closed);
            if tx.send(input).is_err() || closed {
                break;
            }
        }

        rl.save_history(&history).ok();
    });

    rx
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Command parsing + dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Register(String),
    Login(String),
    Logout,
    Connect(String),
    Disconnect,
    Online,
    Status,
    Help,
    Exit,
    Send(String),
    Usage(&'static str),
    Unknown(String),
}

/// Parse one input line.  Blank lines parse to nothing.
fn parse_line(line: &str) -> Option<ReplCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('/') {
        return Some(ReplCommand::Send(line.to_owned()));
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let parsed = match (cmd, arg) {
        ("/register", Some(name)) => ReplCommand::Register(name.to_owned()),
        ("/register", None) => ReplCommand::Usage("/register <name>"),
        ("/login", Some(name)) => ReplCommand::Login(name.to_owned()),
        ("/login", None) => ReplCommand::Usage("/login <name>"),
        ("/connect", Some(partner)) => ReplCommand::Connect(partner.to_owned()),
        ("/connect", None) => ReplCommand::Usage("/connect <partner>"),
        ("/logout", _) => ReplCommand::Logout,
        ("/disconnect", _) => ReplCommand::Disconnect,
        ("/online", _) => ReplCommand::Online,
        ("/status", _) => ReplCommand::Status,
        ("/help", _) => ReplCommand::Help,
        ("/exit" | "/quit", _) => ReplCommand::Exit,
        (other, _) => ReplCommand::Unknown(other.to_owned()),
    };
    Some(parsed)
}

/// Run one line against the client.  Returns `true` if the REPL should exit.
async fn dispatch(client: &mut ChatClient, line: &str) -> bool {
    let Some(command) = parse_line(line) else {
        return false;
    };

    match command {
        ReplCommand::Exit => return true,
        ReplCommand::Register(name) => match client.register(&name).await {
            Ok(()) => eprintln!("Registered {name}. Use /login {name} to sign in."),
            Err(e) => print_error(&e),
        },
        ReplCommand::Login(name) => {
            if let Err(e) = client.login(&name).await {
                print_error(&e);
            }
        }
        ReplCommand::Logout => {
            if !client.logout().await {
                eprintln!("Not logged in.");
            }
        }
        ReplCommand::Connect(partner) => {
            if let Err(e) = client.connect(&partner).await {
                print_error(&e);
            }
        }
        ReplCommand::Disconnect => {
            if !client.disconnect() {
                eprintln!("No chat is open.");
            }
        }
        ReplCommand::Online => match client.list_online().await {
            Ok(users) if users.is_empty() => eprintln!("Nobody is online."),
            Ok(users) => eprintln!("Online: {}", users.join(", ")),
            Err(e) => print_error(&e),
        },
        ReplCommand::Status => print_status(client),
        ReplCommand::Send(body) => match client.send(&body) {
            Ok(SendOutcome::Sent) => {}
            Ok(SendOutcome::RejectedEmpty) => eprintln!("Message is empty, nothing sent."),
            Err(e) => print_error(&e),
        },
        ReplCommand::Help => print_help(),
        ReplCommand::Usage(usage) => eprintln!("Usage: {usage}"),
        ReplCommand::Unknown(cmd) => {
            eprintln!("Unknown command: {cmd}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Chat lines go to stdout; everything else is status on stderr.
fn render(note: &Notification) {
    match note {
        Notification::Message(record) => println!("{record}"),
        Notification::ChannelClosed {
            cause: CloseCause::Error(_),
            ..
        }
        | Notification::ProtocolError { .. }
        | Notification::LogoutNotifyFailed { .. } => eprintln!("\x1B[33m{note}\x1B[0m"),
        _ => eprintln!("\x1B[2m{note}\x1B[0m"),
    }
}

fn print_error(e: &impl std::fmt::Display) {
    eprintln!("\x1B[31merror: {e}\x1B[0m");
}

fn print_status(client: &ChatClient) {
    match client.session() {
        Some(session) => eprintln!(
            "Logged in as {} until {}",
            session.identity(),
            session.expires_at().format("%H:%M:%S UTC")
        ),
        None => eprintln!("Not logged in."),
    }
    match client.channel() {
        Some(channel) => eprintln!(
            "Chat with {}: {} ({} message(s))",
            channel.partner(),
            channel.state(),
            channel.inbox().len()
        ),
        None => eprintln!("No chat yet."),
    }
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  /register <name>    Create an account");
    eprintln!("  /login <name>       Log in (replaces the current session)");
    eprintln!("  /logout             Log out and close the chat");
    eprintln!("  /connect <partner>  Open a chat with an online user");
    eprintln!("  /disconnect         Close the chat");
    eprintln!("  /online             List users who are online");
    eprintln!("  /status             Show session and chat state");
    eprintln!("  /exit, /quit        Log out and exit");
    eprintln!("  /help               Show this help");
    eprintln!("Any other line is sent to the open chat.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_sent_verbatim() {
        assert_eq!(
            parse_line("  hello there "),
            Some(ReplCommand::Send("  hello there ".into()))
        );
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn slash_commands_take_one_argument() {
        assert_eq!(
            parse_line("/connect   bob "),
            Some(ReplCommand::Connect("bob".into()))
        );
        assert_eq!(parse_line("/login alice"), Some(ReplCommand::Login("alice".into())));
        assert_eq!(parse_line("/logout"), Some(ReplCommand::Logout));
        assert_eq!(parse_line("/quit"), Some(ReplCommand::Exit));
    }

    #[test]
    fn missing_arguments_print_usage() {
        assert_eq!(
            parse_line("/connect"),
            Some(ReplCommand::Usage("/connect <partner>"))
        );
        assert_eq!(
            parse_line("/register  "),
            Some(ReplCommand::Usage("/register <name>"))
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            parse_line("/dance now"),
            Some(ReplCommand::Unknown("/dance".into()))
        );
    }
}
