//! Periodic [`EventSource`].
//!
//! A [`Poller`] calls its producer immediately, then once per interval, and
//! forwards each result to the event loop.  The loop keeps only the latest
//! value per kind of event, so pollers need no coordination with each other.

use crate::action::HubEvent;
use crate::traits::EventSource;
use log::{debug, info};
use std::convert::Infallible;
use std::sync::mpsc;
use std::time::Duration;

/// Re-invokes a producer on a fixed interval.
pub struct Poller<F> {
    name: &'static str,
    interval: Duration,
    producer: F,
}

impl<F> Poller<F>
where
    F: FnMut() -> HubEvent + Send,
{
    pub fn new(name: &'static str, interval: Duration, producer: F) -> Self {
        Self {
            name,
            interval,
            producer,
        }
    }
}

impl<F> EventSource for Poller<F>
where
    F: FnMut() -> HubEvent + Send,
{
    type Error = Infallible;

    /// Poll until the sink is closed.
    fn run(&mut self, sink: mpsc::Sender<HubEvent>) -> Result<(), Infallible> {
        info!("{} poller every {}ms", self.name, self.interval.as_millis());
        loop {
            let event = (self.producer)();
            if sink.send(event).is_err() {
                debug!("{} poller: sink closed, stopping", self.name);
                return Ok(());
            }
            std::thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_until_sink_closes() {
        let (tx, rx) = mpsc::channel();
        let mut n = 0u8;
        let mut poller = Poller::new("test", Duration::from_millis(5), move || {
            n += 1;
            HubEvent::Cpu(n)
        });
        let handle = std::thread::spawn(move || poller.run(tx));

        assert_eq!(rx.recv().unwrap(), HubEvent::Cpu(1));
        assert_eq!(rx.recv().unwrap(), HubEvent::Cpu(2));
        drop(rx);
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn first_value_is_immediate() {
        let (tx, rx) = mpsc::channel();
        let mut poller = Poller::new("slow", Duration::from_secs(3600), || HubEvent::Ram(40));
        std::thread::spawn(move || poller.run(tx));
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev, HubEvent::Ram(40));
    }

    #[test]
    fn shell_reading_feeds_status_event() {
        use crate::linux::shell::ShellRunner;
        use crate::traits::CommandRunner;

        let (tx, rx) = mpsc::channel();
        let sh = ShellRunner::with_shell("sh");
        let mut poller = Poller::new("brightness", Duration::from_secs(3600), move || {
            let raw = sh.run("echo 'intel_backlight,backlight,900,75%,1200'").unwrap_or_default();
            HubEvent::Brightness(crate::status::parse_brightness(&raw))
        });
        std::thread::spawn(move || poller.run(tx));
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev, HubEvent::Brightness(75));
    }
}
