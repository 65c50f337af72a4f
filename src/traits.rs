//! Core traits that decouple hubd from any specific shell, notification
//! daemon, or event transport.
//!
//! Every concrete backend (a `bash` runner, mako, a poller thread, a
//! Unix-socket listener, a test harness, …) implements one of these traits.
//! The [`Hub`](crate::hub::Hub) only depends on these abstractions.

use crate::action::HubEvent;
use std::sync::mpsc;

/// Abstraction over running external commands.
pub trait CommandRunner {
    /// The error type produced by this runner.
    type Error: std::error::Error + Send + 'static;

    /// Run `command` to completion and return its standard output.
    fn run(&self, command: &str) -> Result<String, Self::Error>;

    /// Start `command` without waiting for it.
    ///
    /// Only a failure to *start* is reported; the command's exit status is
    /// never observed by the caller.
    fn spawn(&self, command: &str) -> Result<(), Self::Error>;
}

/// Abstraction over a notification daemon that keeps a history, can
/// dismiss entries by id and has a do-not-disturb mode.
pub trait NotificationDaemon {
    /// The error type produced by this daemon.
    type Error: std::error::Error + Send + 'static;

    /// Return the raw history listing, newest first.
    ///
    /// The format is the one understood by
    /// [`parse_history`](crate::notification::parse_history).
    fn history(&self) -> Result<String, Self::Error>;

    /// Ask the daemon to dismiss notification `id`.
    ///
    /// Fire-and-forget: `Ok` only means the request was issued.
    fn dismiss(&self, id: u64) -> Result<(), Self::Error>;

    /// Whether do-not-disturb is currently on.
    fn dnd(&self) -> Result<bool, Self::Error>;

    /// Flip do-not-disturb.  Fire-and-forget, like [`dismiss`](Self::dismiss).
    fn toggle_dnd(&self) -> Result<(), Self::Error>;
}

/// A source of [`HubEvent`]s.
///
/// Implementations listen on some transport, or poll some producer, and
/// forward events into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted, the
///   sink is closed, or an unrecoverable error occurs.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start producing and forward every [`HubEvent`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<HubEvent>) -> Result<(), Self::Error>;
}
