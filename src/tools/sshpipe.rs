//! Terminal remote control: keys pressed in a small menu are sent as shell
//! commands to a persistent `ssh host bash -s` pipe.
//!
//! The configuration is a JSON object of pipes:
//!
//! ```json
//! { "htpc": { "hostname": "htpc.lan",
//!             "commands": { "Volume up": "amixer set Master 2+" },
//!             "keymap": { "key:plus": "Volume up" } } }
//! ```

use crate::config::{CommonArgs, ToolboxConfig};
use crate::core::process::{build_command, spawn_error};
use crate::domain::model::CommandSpec;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::require_file;
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use futures::StreamExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout};

const SETTLE: Duration = Duration::from_millis(200);
const CLOSE_WAIT: Duration = Duration::from_millis(200);
const REDRAW: Duration = Duration::from_millis(100);
const LAYOUT_COLUMN: usize = 14;

#[derive(Debug, Clone, Parser)]
#[command(name = "sshpipe", about = "Send keyboard driven commands over an SSH pipe")]
pub struct SshpipeArgs {
    /// JSON file describing the pipes
    pub config: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipeConfig {
    pub hostname: String,
    /// Description -> shell command.
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    /// Key name (`key:a`, `key:f5`, ...) -> command description.
    #[serde(default)]
    pub keymap: BTreeMap<String, String>,
}

pub fn load_pipes(path: &Path) -> Result<BTreeMap<String, PipeConfig>> {
    require_file(path)?;
    let pipes: BTreeMap<String, PipeConfig> =
        serde_json::from_str(&std::fs::read_to_string(path)?)?;
    if pipes.is_empty() {
        return Err(ToolError::invalid_input(format!(
            "no pipes configured in {}",
            path.display()
        )));
    }
    Ok(pipes)
}

/// Map a configured key name to the key code and its menu label.
pub fn translate_key(name: &str) -> Option<(KeyCode, String)> {
    let key = name.strip_prefix("key:")?;
    let named = |code, label: &str| Some((code, label.to_string()));
    match key {
        "space" => named(KeyCode::Char(' '), "Space"),
        "plus" => named(KeyCode::Char('+'), "Plus"),
        "minus" => named(KeyCode::Char('-'), "Minus"),
        "up" => named(KeyCode::Up, "Up"),
        "down" => named(KeyCode::Down, "Down"),
        "left" => named(KeyCode::Left, "Left"),
        "right" => named(KeyCode::Right, "Right"),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => Some((KeyCode::Char(c), c.to_string())),
                (Some('f'), Some(_)) => {
                    let n: u8 = key[1..].parse().ok()?;
                    (1..=12)
                        .contains(&n)
                        .then(|| (KeyCode::F(n), format!("F{}", n)))
                }
                _ => None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub key: KeyCode,
    pub key_label: String,
    pub description: String,
    pub command: String,
}

/// Key bindings of one pipe. Unknown keys and descriptions without a command
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    bindings: Vec<Binding>,
}

impl Dispatcher {
    pub fn new(pipe: &PipeConfig) -> Self {
        let mut bindings: Vec<Binding> = Vec::new();
        for (name, description) in &pipe.keymap {
            let Some((key, key_label)) = translate_key(name) else {
                tracing::debug!("Ignoring unknown key {}", name);
                continue;
            };
            let Some(command) = pipe.commands.get(description) else {
                tracing::debug!("Ignoring key {} without command", name);
                continue;
            };
            bindings.retain(|b| b.key != key);
            bindings.push(Binding {
                key,
                key_label,
                description: description.clone(),
                command: command.clone(),
            });
        }
        Self { bindings }
    }

    pub fn lookup(&self, key: KeyCode) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.key == key)
    }

    pub fn layout(&self) -> Vec<String> {
        self.bindings
            .iter()
            .map(|b| layout_line(&format!("[{}]:", b.key_label), &b.description))
            .collect()
    }
}

fn layout_line(action: &str, description: &str) -> String {
    format!("{:<width$}{}", action, description, width = LAYOUT_COLUMN)
}

pub fn ssh_spec(hostname: &str) -> CommandSpec {
    CommandSpec::new("ssh").args([hostname, "bash -s"])
}

/// A remote shell reading commands line by line from our stdin.
pub struct SshPipe {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    died: bool,
}

impl SshPipe {
    pub async fn open(spec: &CommandSpec) -> Result<Self> {
        let mut child = build_command(spec)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&spec.program, e))?;

        let mut pipe = Self {
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            child,
            died: false,
        };
        tokio::time::sleep(SETTLE).await;
        if let Err(e) = pipe.exec("echo test").await {
            tracing::debug!("Pipe died on startup: {}", e);
            pipe.died = true;
        }
        Ok(pipe)
    }

    pub fn alive(&mut self) -> bool {
        if self.died {
            return false;
        }
        if !matches!(self.child.try_wait(), Ok(None)) {
            self.died = true;
        }
        !self.died
    }

    pub async fn exec(&mut self, command: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ToolError::invalid_input("pipe is closed"))?;
        stdin.write_all(format!("{}\n", command).as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Ask the remote shell to exit and collect what it printed. A shell that
    /// does not exit in time is killed; the exit code is then `None`.
    pub async fn close(mut self) -> Result<(Option<i32>, Vec<String>)> {
        if !self.alive() {
            return Ok((Some(0), Vec::new()));
        }
        if let Err(e) = self.exec("exit").await {
            tracing::debug!("Failed to send exit: {}", e);
        }
        drop(self.stdin.take());

        match tokio::time::timeout(CLOSE_WAIT, self.child.wait()).await {
            Ok(status) => {
                let code = status?.code();
                let mut output = String::new();
                if let Some(mut stdout) = self.stdout.take() {
                    stdout.read_to_string(&mut output).await?;
                }
                Ok((code, output.lines().map(str::to_string).collect()))
            }
            Err(_) => {
                self.child.kill().await?;
                Ok((None, Vec::new()))
            }
        }
    }
}

pub fn selection_lines(names: &[&String]) -> Vec<String> {
    let mut lines = vec!["Choose a pipe configuration:".to_string(), String::new()];
    lines.extend(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("[{}]: {}", i + 1, name)),
    );
    lines.push(String::new());
    lines.push("[q]: Quit application".to_string());
    lines
}

pub fn pipe_lines(name: &str, hostname: &str, alive: bool, dispatcher: &Dispatcher) -> Vec<String> {
    let mut lines = vec![
        format!("Current pipe selection: {}", name),
        String::new(),
        format!(" Hostname: {}", hostname),
        format!(" Connection state: {}", if alive { "alive" } else { "dead" }),
        String::new(),
    ];
    lines.extend(dispatcher.layout());
    lines.push(String::new());
    lines.push(layout_line("[0]:", "Go back"));
    lines
}

/// Menu selection for a key: a 1-based pipe index from a digit.
pub fn selected_index(key: KeyCode, count: usize) -> Option<usize> {
    let KeyCode::Char(c) = key else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    (1..=count).contains(&digit).then(|| digit - 1)
}

/// Raw mode and the alternate screen for as long as the guard lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(std::io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(std::io::stdout(), Show, LeaveAlternateScreen).ok();
    }
}

fn draw(lines: &[String]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        queue!(out, MoveTo(0, u16::try_from(row).unwrap_or(u16::MAX)), Print(line))?;
    }
    out.flush()?;
    Ok(())
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Next key press; `None` once the terminal stops delivering events.
async fn next_key(events: &mut EventStream) -> Result<Option<KeyEvent>> {
    while let Some(event) = events.next().await {
        if let Event::Key(key) = event? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

pub async fn run(args: SshpipeArgs, _config: ToolboxConfig) -> Result<()> {
    let pipes = load_pipes(&args.config)?;
    let names: Vec<&String> = pipes.keys().collect();

    let _guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();

    loop {
        draw(&selection_lines(&names))?;
        let Some(key) = next_key(&mut events).await? else {
            return Ok(());
        };
        if key.code == KeyCode::Char('q') || is_interrupt(&key) {
            return Ok(());
        }
        if let Some(index) = selected_index(key.code, names.len()) {
            let name = names[index];
            pipe_menu(&mut events, name, &pipes[name]).await?;
        }
    }
}

async fn pipe_menu(events: &mut EventStream, name: &str, pipe: &PipeConfig) -> Result<()> {
    let dispatcher = Dispatcher::new(pipe);
    let mut ssh = SshPipe::open(&ssh_spec(&pipe.hostname)).await?;

    loop {
        draw(&pipe_lines(name, &pipe.hostname, ssh.alive(), &dispatcher))?;
        tokio::select! {
            key = next_key(events) => {
                let Some(key) = key? else { break };
                if key.code == KeyCode::Char('0') || is_interrupt(&key) {
                    break;
                }
                if let Some(binding) = dispatcher.lookup(key.code) {
                    tracing::debug!("Sending '{}'", binding.description);
                    if let Err(e) = ssh.exec(&binding.command).await {
                        tracing::debug!("Failed to send command: {}", e);
                    }
                }
            }
            _ = tokio::time::sleep(REDRAW) => {}
        }
    }

    let (code, _) = ssh.close().await?;
    tracing::debug!("Pipe to {} closed with {:?}", pipe.hostname, code);
    Ok(())
}
