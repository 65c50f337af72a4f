//! The state owner that ties the parser, the dismissal tracker, and the
//! notification daemon together.
//!
//! [`Hub`] reacts to [`HubEvent`]s by updating its latest values and, when
//! what the panel should show has changed, publishing a [`HubSnapshot`] to
//! the view.

use crate::action::{Action, HubEvent};
use crate::dismissed::DismissalTracker;
use crate::notification::{parse_history, NotificationRecord};
use crate::status::{CalendarEvent, Weather};
use crate::traits::NotificationDaemon;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::mpsc;

/// Everything the view layer needs to render the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubSnapshot {
    pub cpu: u8,
    pub ram: u8,
    /// Do-not-disturb toggle state.
    pub dnd: bool,
    pub volume: u8,
    pub brightness: u8,
    pub weather: Weather,
    /// At most two events starting within the hour.
    pub events: Vec<CalendarEvent>,
    /// Notifications to show, newest first.
    pub notifications: Vec<NotificationRecord>,
}

/// Owns all mutable hub state.
///
/// Lives on the event-loop thread; every mutation of the dismissal set goes
/// through [`handle`](Hub::handle), so the set has a single writer.
///
/// # Typical usage
///
/// ```ignore
/// let tracker = DismissalTracker::load(&path);
/// let mut hub = Hub::new(Mako::new(ShellRunner::new()), tracker, 6);
/// hub.handle(HubEvent::History(Some(raw)));
/// hub.handle(Action::DismissAll.into());
/// ```
pub struct Hub<D: NotificationDaemon> {
    daemon: D,
    tracker: DismissalTracker,
    max_visible: usize,
    /// Last parsed history, unfiltered.
    history: Vec<NotificationRecord>,
    snapshot: HubSnapshot,
    view_tx: Option<mpsc::Sender<HubSnapshot>>,
}

impl<D: NotificationDaemon> Hub<D> {
    pub fn new(daemon: D, tracker: DismissalTracker, max_visible: usize) -> Self {
        Self {
            daemon,
            tracker,
            max_visible,
            history: Vec::new(),
            snapshot: HubSnapshot::default(),
            view_tx: None,
        }
    }

    /// Attach a view channel.
    ///
    /// The current snapshot is sent right away, then again after every event
    /// that changes it.
    pub fn set_view(&mut self, tx: mpsc::Sender<HubSnapshot>) {
        let _ = tx.send(self.snapshot.clone());
        self.view_tx = Some(tx);
    }

    pub fn snapshot(&self) -> &HubSnapshot {
        &self.snapshot
    }

    /// The notifications currently shown.
    pub fn visible(&self) -> &[NotificationRecord] {
        &self.snapshot.notifications
    }

    pub fn tracker(&self) -> &DismissalTracker {
        &self.tracker
    }

    /// Process a single [`HubEvent`].
    ///
    /// Returns `true` if the snapshot changed (and was published).
    pub fn handle(&mut self, event: HubEvent) -> bool {
        let before = self.snapshot.clone();
        match event {
            HubEvent::History(Some(raw)) => {
                self.history = parse_history(&raw);
                debug!("history: {} notification(s)", self.history.len());
                self.refresh_visible();
            }
            HubEvent::History(None) => {
                self.history.clear();
                self.refresh_visible();
            }
            HubEvent::Cpu(pct) => self.snapshot.cpu = pct,
            HubEvent::Ram(pct) => self.snapshot.ram = pct,
            HubEvent::Dnd(on) => self.snapshot.dnd = on,
            HubEvent::Volume(pct) => self.snapshot.volume = pct,
            HubEvent::Brightness(pct) => self.snapshot.brightness = pct,
            HubEvent::Events(events) => self.snapshot.events = events,
            HubEvent::Weather(weather) => self.snapshot.weather = weather,
            HubEvent::Action(Action::DismissAll) => {
                info!("dismiss all ({} shown)", self.snapshot.notifications.len());
                self.tracker.dismiss_all(&self.snapshot.notifications);
                self.refresh_visible();
            }
            HubEvent::Action(Action::Dismiss(id)) => {
                info!("dismiss {}", id);
                self.tracker.dismiss_one(id.0, &self.daemon);
                self.refresh_visible();
            }
            HubEvent::Action(Action::ToggleDnd) => match self.daemon.toggle_dnd() {
                // the next mode poll confirms or corrects this
                Ok(()) => self.snapshot.dnd = !self.snapshot.dnd,
                Err(e) => debug!("dnd toggle failed: {}", e),
            },
        }

        let changed = self.snapshot != before;
        if changed {
            self.publish();
        }
        changed
    }

    fn refresh_visible(&mut self) {
        self.snapshot.notifications = self.tracker.filter_visible(&self.history, self.max_visible);
    }

    fn publish(&mut self) {
        if let Some(tx) = &self.view_tx {
            if tx.send(self.snapshot.clone()).is_err() {
                warn!("view closed, no longer publishing snapshots");
                self.view_tx = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::NotificationId;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_cache_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("hubd-hub-test-{}-{}", std::process::id(), id))
            .join("dismissed.json")
    }

    fn cleanup(path: &std::path::Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[derive(Default)]
    struct MockDaemon {
        dismissed: RefCell<Vec<u64>>,
        dnd_toggles: RefCell<u32>,
        toggle_fails: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock")]
    struct MockError;

    impl NotificationDaemon for MockDaemon {
        type Error = MockError;

        fn history(&self) -> Result<String, MockError> {
            Err(MockError)
        }

        fn dismiss(&self, id: u64) -> Result<(), MockError> {
            self.dismissed.borrow_mut().push(id);
            Ok(())
        }

        fn dnd(&self) -> Result<bool, MockError> {
            Err(MockError)
        }

        fn toggle_dnd(&self) -> Result<(), MockError> {
            *self.dnd_toggles.borrow_mut() += 1;
            if self.toggle_fails {
                Err(MockError)
            } else {
                Ok(())
            }
        }
    }

    fn history(ids: std::ops::Range<u64>) -> HubEvent {
        let raw: String = ids
            .map(|i| format!("Notification {}: message {}\n  App name: app{}\n", i, i, i))
            .collect();
        HubEvent::History(Some(raw))
    }

    fn ids(hub: &Hub<MockDaemon>) -> Vec<u64> {
        hub.visible().iter().map(|r| r.id).collect()
    }

    fn new_hub(path: &std::path::Path) -> Hub<MockDaemon> {
        Hub::new(MockDaemon::default(), DismissalTracker::load(path), 6)
    }

    #[test]
    fn history_is_filtered_and_capped() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        assert!(hub.handle(history(1..10)));
        assert_eq!(ids(&hub), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(hub.visible()[0].app, "app1");
        cleanup(&path);
    }

    #[test]
    fn unavailable_source_clears_list() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        hub.handle(history(1..3));
        assert!(hub.handle(HubEvent::History(None)));
        assert!(hub.visible().is_empty());
        cleanup(&path);
    }

    #[test]
    fn dismiss_all_hides_only_the_shown_snapshot() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        hub.handle(history(1..10));
        hub.handle(Action::DismissAll.into());

        // 7..9 were beyond the visible window when "clear" was pressed
        assert_eq!(ids(&hub), vec![7, 8, 9]);
        for id in 1..=6 {
            assert!(hub.tracker().contains(id));
        }
        assert!(!hub.tracker().contains(7));
        assert!(hub.daemon.dismissed.borrow().is_empty());
        cleanup(&path);
    }

    #[test]
    fn dismissed_ids_stay_hidden_across_polls_and_restarts() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        hub.handle(history(1..4));
        hub.handle(Action::Dismiss(NotificationId(2)).into());
        assert_eq!(ids(&hub), vec![1, 3]);
        assert_eq!(*hub.daemon.dismissed.borrow(), vec![2]);

        // daemon still reports it
        hub.handle(history(1..4));
        assert_eq!(ids(&hub), vec![1, 3]);

        let mut restarted = new_hub(&path);
        restarted.handle(history(1..4));
        assert_eq!(ids(&restarted), vec![1, 3]);
        cleanup(&path);
    }

    #[test]
    fn unchanged_events_are_not_published() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        let (tx, rx) = mpsc::channel();
        hub.set_view(tx);
        assert_eq!(rx.try_recv().unwrap(), HubSnapshot::default());

        assert!(hub.handle(HubEvent::Cpu(30)));
        assert!(!hub.handle(HubEvent::Cpu(30)));
        assert!(hub.handle(history(1..2)));
        assert!(!hub.handle(history(1..2)));

        let published: Vec<HubSnapshot> = rx.try_iter().collect();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].cpu, 30);
        assert_eq!(published[1].notifications.len(), 1);
        cleanup(&path);
    }

    #[test]
    fn snapshot_serializes_for_the_view() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        hub.handle(HubEvent::Ram(55));
        hub.handle(HubEvent::History(Some("Notification 8: Done\n".into())));
        let json = serde_json::to_string(hub.snapshot()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"cpu":0,"ram":55,"dnd":false,"volume":0,"brightness":0,"#,
                r#""weather":{"temp":"--","icon":"☁","desc":"Loading..."},"events":[],"#,
                r#""notifications":[{"id":8,"app":"SYSTEM","summary":"Done"}]}"#
            )
        );
        cleanup(&path);
    }

    #[test]
    fn toggle_dnd_flips_state_and_poll_corrects_it() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        assert!(hub.handle(Action::ToggleDnd.into()));
        assert!(hub.snapshot().dnd);
        assert_eq!(*hub.daemon.dnd_toggles.borrow(), 1);

        // daemon reports the mode did not change after all
        assert!(hub.handle(HubEvent::Dnd(false)));
        assert!(!hub.snapshot().dnd);
        assert!(!hub.handle(HubEvent::Dnd(false)));
        cleanup(&path);
    }

    #[test]
    fn failed_dnd_toggle_leaves_state_alone() {
        let path = tmp_cache_path();
        let daemon = MockDaemon {
            toggle_fails: true,
            ..Default::default()
        };
        let mut hub = Hub::new(daemon, DismissalTracker::load(&path), 6);
        assert!(!hub.handle(Action::ToggleDnd.into()));
        assert!(!hub.snapshot().dnd);
        assert_eq!(*hub.daemon.dnd_toggles.borrow(), 1);
        cleanup(&path);
    }

    #[test]
    fn status_readings_update_snapshot() {
        let path = tmp_cache_path();
        let mut hub = new_hub(&path);
        assert!(hub.handle(HubEvent::Volume(120)));
        assert!(hub.handle(HubEvent::Brightness(35)));
        let events = crate::status::parse_events(r#"[{"title":"Standup","start-time":"09:00"}]"#);
        assert!(hub.handle(HubEvent::Events(events.clone())));
        assert!(hub.handle(HubEvent::Weather(Weather::error())));
        assert!(!hub.handle(HubEvent::Weather(Weather::error())));

        let snap = hub.snapshot();
        assert_eq!(snap.volume, 120);
        assert_eq!(snap.brightness, 35);
        assert_eq!(snap.events, events);
        assert_eq!(snap.weather.desc, "Error");
        cleanup(&path);
    }
}
