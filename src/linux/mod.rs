//! Linux desktop backends.
//!
//! Concrete implementations of [`CommandRunner`](crate::traits::CommandRunner)
//! (a `bash` runner) and [`NotificationDaemon`](crate::traits::NotificationDaemon)
//! (mako), plus the `/proc` readers behind the CPU and RAM chips.
//!
//! Nothing outside this module should spawn processes or read `/proc`
//! directly.

pub mod mako;
pub mod procfs;
pub mod shell;
