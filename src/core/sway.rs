//! Sway IPC and logind access shared by the display tools.

use crate::utils::error::{Result, ToolError};
use regex::Regex;
use std::ffi::CString;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use swayipc::Connection;
use zbus::zvariant::OwnedObjectPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    pub focused: bool,
}

/// The subset of the sway IPC protocol the tools need.
pub trait OutputControl {
    fn outputs(&mut self) -> Result<Vec<OutputInfo>>;

    /// Run one sway command; the reply must hold a single successful outcome.
    fn command(&mut self, command: &str) -> Result<()>;
}

impl OutputControl for Connection {
    fn outputs(&mut self) -> Result<Vec<OutputInfo>> {
        Ok(self
            .get_outputs()?
            .into_iter()
            .map(|o| OutputInfo {
                name: o.name,
                focused: o.focused,
            })
            .collect())
    }

    fn command(&mut self, command: &str) -> Result<()> {
        let mut outcomes = self.run_command(command)?;
        let failure = |message: String| ToolError::IpcCommandError {
            command: command.to_string(),
            message,
        };
        match (outcomes.pop(), outcomes.is_empty()) {
            (Some(Ok(())), true) => Ok(()),
            (Some(Err(e)), true) => Err(failure(e.to_string())),
            _ => Err(failure("malformed IPC reply".to_string())),
        }
    }
}

/// Connect to the sway instance of the calling session (`SWAYSOCK`).
pub fn connect() -> Result<Connection> {
    Ok(Connection::new()?)
}

pub fn connect_to(socket: &Path) -> Result<Connection> {
    Ok(Connection::from(UnixStream::connect(socket)?))
}

pub fn power_command(output: &str, on: bool) -> String {
    format!("output {} power {}", output, if on { "on" } else { "off" })
}

/// Switch every output on or off. Returns the number of outputs.
pub fn set_power_all<C: OutputControl>(ctl: &mut C, on: bool) -> Result<usize> {
    let names: Vec<String> = ctl.outputs()?.into_iter().map(|o| o.name).collect();
    for name in &names {
        ctl.command(&power_command(name, on))?;
    }
    Ok(names.len())
}

pub fn focused_output<C: OutputControl>(ctl: &mut C) -> Result<Option<String>> {
    Ok(ctl.outputs()?.into_iter().find(|o| o.focused).map(|o| o.name))
}

/// The IPC socket of the sway session of `uid`: the
/// `sway-ipc.<uid>.<pid>.sock` in `<run_dir>/<uid>` with the lowest pid.
pub fn sway_socket(run_dir: &Path, uid: u32) -> Result<Option<PathBuf>> {
    let dir = run_dir.join(uid.to_string());
    if !dir.is_dir() {
        return Ok(None);
    }
    let pattern = Regex::new(&format!(r"^sway-ipc\.{}\.(\d+)\.sock$", uid))?;

    let mut sockets: Vec<(u64, PathBuf)> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let pid = pattern.captures(&name)?.get(1)?.as_str().parse().ok()?;
            Some((pid, e.path()))
        })
        .collect();
    sockets.sort();
    Ok(sockets.into_iter().next().map(|(_, path)| path))
}

pub fn uid_for_user(name: &str) -> Result<u32> {
    let cname = CString::new(name)
        .map_err(|_| ToolError::invalid_input(format!("invalid user name: {:?}", name)))?;
    // SAFETY: getpwnam returns null or a pointer into static storage; pw_uid is
    // copied out before any other passwd call can overwrite it.
    let uid = unsafe {
        let entry = libc::getpwnam(cname.as_ptr());
        if entry.is_null() {
            None
        } else {
            Some((*entry).pw_uid)
        }
    };
    uid.ok_or_else(|| ToolError::not_found(format!("user {}", name)))
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid(2) cannot fail.
    unsafe { libc::getuid() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub uid: u32,
    pub active: bool,
    pub remote: bool,
    pub session_type: String,
}

/// The user of the first active, local, graphical session.
pub fn pick_active_session(sessions: &[SessionInfo]) -> Option<u32> {
    sessions
        .iter()
        .find(|s| {
            s.active && !s.remote && matches!(s.session_type.as_str(), "wayland" | "x11")
        })
        .map(|s| s.uid)
}

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1",
    gen_blocking = false
)]
trait Manager {
    fn list_sessions(&self) -> zbus::Result<Vec<(String, u32, String, String, OwnedObjectPath)>>;
}

#[zbus::proxy(
    interface = "org.freedesktop.login1.Session",
    default_service = "org.freedesktop.login1",
    gen_blocking = false
)]
trait Session {
    #[zbus(property)]
    fn active(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn remote(&self) -> zbus::Result<bool>;

    #[zbus(property, name = "Type")]
    fn session_type(&self) -> zbus::Result<String>;
}

/// Ask logind for the sessions and pick the active local graphical one.
pub async fn active_user() -> Result<Option<u32>> {
    let conn = zbus::Connection::system().await?;
    let manager = ManagerProxy::new(&conn).await?;

    let mut sessions = Vec::new();
    for (id, uid, _user, _seat, path) in manager.list_sessions().await? {
        let session = SessionProxy::builder(&conn)
            .path(path.as_str())?
            .build()
            .await?;
        let info = SessionInfo {
            uid,
            active: session.active().await?,
            remote: session.remote().await?,
            session_type: session.session_type().await?,
        };
        tracing::debug!("Session {}: {:?}", id, info);
        sessions.push(info);
    }
    Ok(pick_active_session(&sessions))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records commands; fails the ones listed in `reject`.
    #[derive(Default)]
    pub struct FakeSway {
        pub outputs: Vec<OutputInfo>,
        pub commands: Vec<String>,
        pub reject: Vec<String>,
    }

    impl FakeSway {
        pub fn with_outputs(names: &[(&str, bool)]) -> Self {
            Self {
                outputs: names
                    .iter()
                    .map(|(name, focused)| OutputInfo {
                        name: name.to_string(),
                        focused: *focused,
                    })
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl OutputControl for FakeSway {
        fn outputs(&mut self) -> Result<Vec<OutputInfo>> {
            Ok(self.outputs.clone())
        }

        fn command(&mut self, command: &str) -> Result<()> {
            self.commands.push(command.to_string());
            if self.reject.iter().any(|r| r == command) {
                return Err(ToolError::IpcCommandError {
                    command: command.to_string(),
                    message: "No output matched".to_string(),
                });
            }
            Ok(())
        }
    }
}
