//! **hubd**: the headless half of a desktop hub panel.
//!
//! The panel itself (chips, toggles, the notification list) is drawn by an
//! external widget layer.  hubd feeds it: it polls the notification daemon's
//! history and do-not-disturb mode, the CPU / RAM counters and the status
//! chips ([`status`]), hides the notifications the user has dismissed from
//! the panel, and publishes one JSON snapshot line per change on stdout.
//! User actions come back over a Unix socket.
//!
//! # Architecture
//!
//! * [`traits::NotificationDaemon`] and [`traits::CommandRunner`] abstract
//!   the notification daemon and the shell, so the hub logic is not coupled
//!   to mako or `bash`.
//! * [`traits::EventSource`] abstracts whatever produces events (a poller, a
//!   socket listener, …); each source runs on its own thread and feeds a
//!   single event loop that owns the [`hub::Hub`].
//!
//! Concrete implementations live in [`linux`] (mako, `bash`, `/proc`),
//! [`poll`] (interval pollers) and [`ipc`] (the control socket).

pub mod action;
pub mod config;
pub mod dismissed;
pub mod hub;
pub mod ipc;
pub mod linux;
pub mod notification;
pub mod poll;
pub mod status;
pub mod traits;
