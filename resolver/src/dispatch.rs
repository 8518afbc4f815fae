//! Dispatch of resolved actions to external programs.
//!
//! [`Dispatcher::plan`] turns each [`ResolvedAction`] into [`Launch`]
//! steps without side effects; [`Dispatcher::dispatch`] hands them to a
//! [`Launcher`]. [`SystemLauncher`] is the process-spawning implementation.

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};
use webalias_core::{CommandProbe, HandlerKind, ResolveError, ResolvedAction};
use webalias_db::{DumpConfig, Settings};

use crate::error::{Error, Result};

/// Process-spawning collaborator used by the [`Dispatcher`].
pub trait Launcher: CommandProbe {
    /// Starts a GUI program with `urls` appended to `command`. Does not wait.
    fn spawn_gui(&self, command: &str, urls: &[String]) -> std::io::Result<()>;

    /// Opens a terminal session titled `title` running the shell `command`.
    /// Does not wait.
    fn spawn_terminal_session(&self, title: &str, command: &str) -> std::io::Result<()>;

    /// Replaces the clipboard contents with `text`.
    fn write_clipboard(&self, text: &str) -> std::io::Result<()>;
}

/// One launcher call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Launch {
    Gui { command: String, urls: Vec<String> },
    Terminal { title: String, command: String },
}

/// Executes resolved actions through a [`Launcher`].
///
/// # Examples
///
/// ```
/// use webalias_core::{EffectiveConfig, ResolvedAction};
/// use webalias_db::Settings;
/// use webalias_resolver::{Dispatcher, Launch};
///
/// let settings = Settings::default();
/// let dispatcher = Dispatcher::new(&settings);
///
/// let mut config = EffectiveConfig::for_handler("term1").unwrap();
/// config.dump = true;
/// config.dump_page_forward = 2;
/// let action = ResolvedAction::new("https://example.com".to_string(), &config);
///
/// assert_eq!(
///     dispatcher.plan(&action).unwrap(),
///     vec![Launch::Terminal {
///         title: "webalias: term1".to_string(),
///         command: "w3m -dump https://example.com | less +48g".to_string(),
///     }]
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    settings: &'a Settings,
}

impl<'a> Dispatcher<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Computes the launcher calls for one action.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::HandlerNotConfigured`] if the action's
    /// handler has no registry entry.
    pub fn plan(&self, action: &ResolvedAction) -> Result<Vec<Launch>> {
        let entry = self
            .settings
            .handlers
            .get(&action.handler_name)
            .ok_or_else(|| ResolveError::HandlerNotConfigured(action.handler_name.clone()))?;
        let title = format!("webalias: {}", action.handler_name);
        let chain = |command: String| match &entry.after {
            Some(after) if !after.trim().is_empty() => format!("{command}; {after}"),
            _ => command,
        };

        let launches = if action.dump {
            action
                .urls
                .iter()
                .map(|url| Launch::Terminal {
                    title: title.clone(),
                    command: chain(dump_command(
                        &entry.command,
                        url,
                        &self.settings.dump,
                        action.dump_page_forward,
                    )),
                })
                .collect()
        } else {
            match action.handler_kind {
                HandlerKind::Gui => vec![Launch::Gui {
                    command: entry.command.clone(),
                    urls: action.urls.clone(),
                }],
                HandlerKind::Terminal => vec![Launch::Terminal {
                    title,
                    command: chain(format!(
                        "{} {}",
                        entry.command,
                        shell_words::join(&action.urls)
                    )),
                }],
            }
        };
        Ok(launches)
    }

    /// Plans and runs every action in order, stopping at the first failure.
    pub fn dispatch(&self, actions: &[ResolvedAction], launcher: &dyn Launcher) -> Result<()> {
        let mut plans = Vec::with_capacity(actions.len());
        for action in actions {
            plans.extend(self.plan(action)?);
        }

        for launch in plans {
            match &launch {
                Launch::Gui { command, urls } => {
                    info!(%command, urls = urls.len(), "opening GUI handler");
                    launcher
                        .spawn_gui(command, urls)
                        .map_err(|source| Error::Launch {
                            target: command.clone(),
                            source,
                        })?;
                }
                Launch::Terminal { title, command } => {
                    info!(%title, %command, "opening terminal session");
                    launcher
                        .spawn_terminal_session(title, command)
                        .map_err(|source| Error::Launch {
                            target: command.clone(),
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }

    /// Writes `urls`, one per line, to the clipboard.
    pub fn copy(&self, urls: &[String], launcher: &dyn Launcher) -> Result<()> {
        debug!(count = urls.len(), "copying URLs to clipboard");
        launcher
            .write_clipboard(&urls.join("\n"))
            .map_err(|source| Error::Launch {
                target: self.settings.clipboard.clone(),
                source,
            })
    }
}

fn dump_command(handler: &str, url: &str, dump: &DumpConfig, page_forward: u32) -> String {
    let mut pager = dump.pager.clone();
    if page_forward > 0 {
        pager.push_str(&format!(" +{}g", page_forward.saturating_mul(dump.page_lines)));
    }
    format!(
        "{handler} {} {} | {pager}",
        dump.flag,
        shell_words::quote(url)
    )
}

/// [`Launcher`] backed by real processes.
///
/// Command templates are split with shell quoting rules before
/// `{title}`/`{command}` are replaced, so a substituted value always stays a
/// single argument.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    terminal: String,
    clipboard: String,
    clipboard_timeout: Duration,
}

impl SystemLauncher {
    pub const DEFAULT_CLIPBOARD_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(terminal: &str, clipboard: &str) -> Self {
        Self {
            terminal: terminal.to_string(),
            clipboard: clipboard.to_string(),
            clipboard_timeout: Self::DEFAULT_CLIPBOARD_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.terminal, &settings.clipboard)
    }

    pub fn with_clipboard_timeout(mut self, timeout: Duration) -> Self {
        self.clipboard_timeout = timeout;
        self
    }

    /// Expands the terminal template for one session.
    pub fn terminal_argv(&self, title: &str, command: &str) -> std::io::Result<Vec<String>> {
        let tokens = split(&self.terminal)?;
        if !tokens.iter().any(|t| t.contains("{command}")) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("terminal template '{}' has no {{command}} placeholder", self.terminal),
            ));
        }
        Ok(tokens
            .into_iter()
            .map(|token| token.replace("{title}", title).replace("{command}", command))
            .collect())
    }
}

impl CommandProbe for SystemLauncher {
    fn command_exists(&self, program: &str) -> bool {
        if program.contains('/') {
            return Path::new(program).is_file();
        }
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Launcher for SystemLauncher {
    fn spawn_gui(&self, command: &str, urls: &[String]) -> std::io::Result<()> {
        let mut argv = split(command)?;
        argv.extend(urls.iter().cloned());
        spawn_detached(&argv)
    }

    fn spawn_terminal_session(&self, title: &str, command: &str) -> std::io::Result<()> {
        spawn_detached(&self.terminal_argv(title, command)?)
    }

    fn write_clipboard(&self, text: &str) -> std::io::Result<()> {
        let argv = split(&self.clipboard)?;
        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        match wait_for_child_with_timeout(&mut child, self.clipboard_timeout)? {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(std::io::Error::other(format!(
                "clipboard command exited with {status}"
            ))),
            None => {
                warn!(command = %self.clipboard, "clipboard command timed out");
                let _ = child.kill();
                let _ = child.wait();
                Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "clipboard command timed out",
                ))
            }
        }
    }
}

/// Splits a command line, rejecting empty ones.
fn split(command: &str) -> std::io::Result<Vec<String>> {
    let argv = shell_words::split(command).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot parse '{command}': {e}"),
        )
    })?;
    if argv.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command line",
        ));
    }
    Ok(argv)
}

fn spawn_detached(argv: &[String]) -> std::io::Result<()> {
    debug!(program = %argv[0], args = argv.len() - 1, "spawning");
    Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

fn wait_for_child_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
