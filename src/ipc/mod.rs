//! Control socket for user actions.
//!
//! The view layer (or a key-bind helper) connects to the socket and sends
//! newline-delimited JSON actions such as `"DismissAll"`.

pub mod listener;
