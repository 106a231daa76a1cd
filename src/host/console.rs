//! Line-oriented operator console over a `WorkflowHost`.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::batch::Clipboard;
use crate::check::CheckView;
use crate::gateway::Gateway;
use crate::host::render::render_check;
use crate::host::{Credentials, HostError, WorkflowHost};
use crate::lifecycle::{Shutdown, TaskGuard};

const HELP: &[&str] = &[
    "login <username> <password>   open the workflows",
    "logout                        stop polling and clear results",
    "check <ID>                    check one transaction (C… or M… followed by digits)",
    "batch [FILE]                  analyze a CSV file",
    "copy <ROW>                    copy the full hash of a batch row",
    "status                        show the single-check panel",
    "rows                          show the batch table",
    "help                          show this list",
    "quit                          leave the console",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Credentials),
    Logout,
    /// Raw identifier, exactly as typed after the command word.
    Check(String),
    Batch(Option<PathBuf>),
    /// 1-based row number as displayed.
    Copy(usize),
    Status,
    Rows,
    Help,
    Quit,
}

impl Command {
    /// Parse one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return Ok(None);
        }
        let line = line.trim_start();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

        let command = match word {
            "login" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(user), Some(pass), None) => Command::Login(Credentials::new(user, pass)),
                    _ => return Err("usage: login <username> <password>".to_string()),
                }
            }
            "logout" => Command::Logout,
            "check" => Command::Check(rest.to_string()),
            "batch" => {
                let path = rest.trim();
                Command::Batch((!path.is_empty()).then(|| PathBuf::from(path)))
            }
            "copy" => match rest.trim().parse::<usize>() {
                Ok(row) if row > 0 => Command::Copy(row),
                _ => return Err("usage: copy <ROW> (rows are numbered from 1)".to_string()),
            },
            "status" => Command::Status,
            "rows" => Command::Rows,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
        };
        Ok(Some(command))
    }
}

/// Output of one executed command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

impl From<HostError> for Reply {
    fn from(err: HostError) -> Self {
        Reply::line(err.to_string())
    }
}

pub struct Console<G: Gateway, C: Clipboard> {
    host: WorkflowHost<G, C>,
    /// Announces mining while the operator keeps typing.
    watcher: Option<TaskGuard>,
}

impl<G: Gateway, C: Clipboard> Console<G, C> {
    pub fn new(host: WorkflowHost<G, C>) -> Self {
        Self {
            host,
            watcher: None,
        }
    }

    pub fn host(&self) -> &WorkflowHost<G, C> {
        &self.host
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        match self.dispatch(command).await {
            Ok(reply) => reply,
            Err(err) => err.into(),
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Reply, HostError> {
        let reply = match command {
            Command::Help => Reply::lines(HELP.iter().map(|s| s.to_string()).collect()),
            Command::Quit => Reply {
                lines: Vec::new(),
                quit: true,
            },
            Command::Login(credentials) => {
                self.host.login(&credentials)?;
                self.watch_mining()?;
                Reply::line(format!("Logged in as {}.", credentials.username))
            }
            Command::Logout => {
                self.watcher.take();
                self.host.logout();
                Reply::line("Logged out.")
            }
            Command::Check(raw) => {
                // The outcome is already reflected in the view.
                let _ = self.host.check()?.submit(&raw).await;
                Reply::lines(self.host.check_lines()?)
            }
            Command::Batch(path) => {
                let batch = self.host.batch()?;
                let mut lines = Vec::new();
                if let Ok(rows) = batch.submit(path.as_deref()).await {
                    lines.push(format!("{} row(s) analyzed.", rows.len()));
                }
                lines.extend(self.host.batch_lines()?);
                Reply::lines(lines)
            }
            Command::Copy(row) => match self.host.batch()?.copy(row - 1).await {
                Ok(hash) => Reply::line(format!("Copied {hash}")),
                Err(err) => Reply::line(format!("Error: {err}")),
            },
            Command::Status => {
                let lines = self.host.check_lines()?;
                if lines.is_empty() {
                    Reply::line("No transaction checked yet.")
                } else {
                    Reply::lines(lines)
                }
            }
            Command::Rows => {
                let lines = self.host.batch_lines()?;
                if lines.is_empty() {
                    Reply::line("No batch results.")
                } else {
                    Reply::lines(lines)
                }
            }
        };
        Ok(reply)
    }

    fn watch_mining(&mut self) -> Result<(), HostError> {
        let mut updates = self.host.check()?.subscribe();
        let tx_url_base = self.host.tx_url_base().to_string();

        self.watcher = Some(TaskGuard::spawn(async move {
            let mut was_mined = updates.borrow().is_mined();
            while updates.changed().await.is_ok() {
                let view: CheckView = updates.borrow_and_update().clone();
                let mined = view.is_mined();
                if mined && !was_mined {
                    println!();
                    for line in render_check(&view, &tx_url_base) {
                        println!("{line}");
                    }
                }
                was_mined = mined;
            }
        }));
        Ok(())
    }

    /// Read commands until `quit`, end of input or shutdown, then log out.
    pub async fn run<R>(mut self, input: R, shutdown: Shutdown) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut stop = shutdown.subscribe();

        println!("Type 'help' for commands.");
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = stop.recv() => break,
            };
            let Some(line) = line else { break };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    println!("{usage}");
                    continue;
                }
            };

            let reply = tokio::select! {
                reply = self.execute(command) => reply,
                _ = stop.recv() => break,
            };
            for line in &reply.lines {
                println!("{line}");
            }
            if reply.quit {
                break;
            }
        }

        self.watcher.take();
        self.host.logout();
        tracing::info!("Console closed");
        Ok(())
    }
}
