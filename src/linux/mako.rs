//! [`NotificationDaemon`] implementation for mako, driven through `makoctl`.

use crate::traits::{CommandRunner, NotificationDaemon};

/// Default command that prints the notification history.
pub const DEFAULT_HISTORY_COMMAND: &str = "makoctl history";

/// Default dismiss command; the notification id is appended.
pub const DEFAULT_DISMISS_COMMAND: &str = "makoctl dismiss -n";

/// Default command printing the active modes, one per line.
pub const DEFAULT_MODE_COMMAND: &str = "makoctl mode";

/// Default command toggling the do-not-disturb mode.
pub const DEFAULT_DND_TOGGLE_COMMAND: &str = "makoctl mode -t do-not-disturb";

/// Name of mako's do-not-disturb mode.
const DND_MODE: &str = "do-not-disturb";

/// mako backend.
///
/// Every command is configurable so other daemons with a compatible
/// listing (or a wrapper script) can stand in.
pub struct Mako<R: CommandRunner> {
    runner: R,
    history_command: String,
    dismiss_command: String,
    mode_command: String,
    dnd_toggle_command: String,
}

/// Errors that can occur when talking to mako.
#[derive(Debug, thiserror::Error)]
#[error("mako error: {0}")]
pub struct MakoError(String);

impl<R: CommandRunner> Mako<R> {
    /// Create a backend using the stock `makoctl` commands.
    pub fn new(runner: R) -> Self {
        Self::with_commands(runner, DEFAULT_HISTORY_COMMAND, DEFAULT_DISMISS_COMMAND)
    }

    pub fn with_commands(
        runner: R,
        history_command: impl Into<String>,
        dismiss_command: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            history_command: history_command.into(),
            dismiss_command: dismiss_command.into(),
            mode_command: DEFAULT_MODE_COMMAND.into(),
            dnd_toggle_command: DEFAULT_DND_TOGGLE_COMMAND.into(),
        }
    }

    /// Replace the do-not-disturb query and toggle commands.
    pub fn with_mode_commands(mut self, mode: impl Into<String>, toggle: impl Into<String>) -> Self {
        self.mode_command = mode.into();
        self.dnd_toggle_command = toggle.into();
        self
    }

    fn dismiss_command_for(&self, id: u64) -> String {
        format!("{} {}", self.dismiss_command.trim_end(), id)
    }
}

impl<R: CommandRunner> NotificationDaemon for Mako<R> {
    type Error = MakoError;

    fn history(&self) -> Result<String, MakoError> {
        self.runner
            .run(&self.history_command)
            .map_err(|e| MakoError(e.to_string()))
    }

    fn dismiss(&self, id: u64) -> Result<(), MakoError> {
        self.runner
            .spawn(&self.dismiss_command_for(id))
            .map_err(|e| MakoError(e.to_string()))
    }

    fn dnd(&self) -> Result<bool, MakoError> {
        let modes = self
            .runner
            .run(&self.mode_command)
            .map_err(|e| MakoError(e.to_string()))?;
        Ok(modes.contains(DND_MODE))
    }

    fn toggle_dnd(&self) -> Result<(), MakoError> {
        self.runner
            .spawn(&self.dnd_toggle_command)
            .map_err(|e| MakoError(e.to_string()))
    }
}
