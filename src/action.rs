//! Actions and events used throughout hubd.
//!
//! [`Action`] is what the user (through the view layer) asks the hub to do;
//! it arrives as newline-delimited JSON on the control socket.
//! [`HubEvent`] is everything the event loop consumes: actions plus the
//! values published by the pollers.

use crate::status::{CalendarEvent, Weather};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Wire format for a notification id: accepts a number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for NotificationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = NotificationId;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer or numeric string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<NotificationId, E> {
                Ok(NotificationId(n))
            }
            fn visit_i64<E>(self, n: i64) -> Result<NotificationId, E>
            where
                E: DeError,
            {
                u64::try_from(n)
                    .map(NotificationId)
                    .map_err(|_| DeError::custom("Dismiss: id must be non-negative"))
            }
            fn visit_str<E>(self, s: &str) -> Result<NotificationId, E>
            where
                E: DeError,
            {
                let n: u64 = s
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("Dismiss: expected non-negative integer"))?;
                Ok(NotificationId(n))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every user action the hub reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Hide every notification currently shown in the panel.
    ///
    /// Only the ids visible at the time the action is handled are hidden;
    /// the daemon's history is left untouched.
    DismissAll,

    /// Dismiss one notification in the daemon and hide it from the panel.
    Dismiss(NotificationId),

    /// Flip the daemon's do-not-disturb mode.
    ToggleDnd,
}

/// Input to the hub's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// A user action from the control socket.
    Action(Action),
    /// Latest raw history listing, or `None` if the source was unavailable
    /// this cycle.
    History(Option<String>),
    /// CPU usage in whole percent.
    Cpu(u8),
    /// RAM usage in whole percent.
    Ram(u8),
    /// Whether the daemon is in do-not-disturb mode.
    Dnd(bool),
    /// Output volume in percent (0..=150).
    Volume(u8),
    /// Screen brightness in percent (0..=100).
    Brightness(u8),
    /// Upcoming calendar events.
    Events(Vec<CalendarEvent>),
    Weather(Weather),
}

impl From<Action> for HubEvent {
    fn from(action: Action) -> Self {
        HubEvent::Action(action)
    }
}
