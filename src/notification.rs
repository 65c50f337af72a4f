//! Parser for the notification daemon's history listing.
//!
//! `makoctl history` prints one block per notification, newest first:
//!
//! ```text
//! Notification 42: Build failed
//!   App name: CI
//!   Urgency: normal
//! Notification 41: Done
//! ```
//!
//! Only the header line and the optional `App name:` field are of interest;
//! everything else is skipped.

use log::debug;
use serde::Serialize;

/// Only the first this-many lines of a history listing are scanned.
pub const MAX_SCAN_LINES: usize = 320;

/// At most this many records are produced from one listing.
pub const MAX_RECORDS: usize = 200;

/// How far past a header (in lines, header excluded) the `App name:` field
/// is searched for.
pub const APP_LOOKAHEAD: usize = 9;

/// App name used when a block carries no `App name:` field.
pub const DEFAULT_APP: &str = "SYSTEM";

const HEADER_PREFIX: &str = "Notification";
const APP_PREFIX: &str = "App name:";

/// One notification as reported by the daemon's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    /// Daemon-assigned id.
    pub id: u64,
    /// Display name of the sending application.
    pub app: String,
    pub summary: String,
}

/// Parse a raw history listing into records, preserving source order.
///
/// Bounded by [`MAX_SCAN_LINES`] and [`MAX_RECORDS`].  A header whose id does
/// not fit a `u64` is dropped; the rest of the listing is still parsed.
pub fn parse_history(raw: &str) -> Vec<NotificationRecord> {
    let lines: Vec<&str> = raw.lines().take(MAX_SCAN_LINES).map(str::trim).collect();
    let mut out = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if out.len() >= MAX_RECORDS {
            break;
        }
        let Some((digits, summary)) = parse_header(line) else {
            continue;
        };
        let Ok(id) = digits.parse::<u64>() else {
            debug!("dropping notification with unparseable id {:?}", digits);
            continue;
        };

        let end = (i + 1 + APP_LOOKAHEAD).min(lines.len());
        let app = lines[i + 1..end]
            .iter()
            .take_while(|l| !l.starts_with("Notification "))
            .find_map(|l| parse_app_name(l))
            .unwrap_or(DEFAULT_APP);

        out.push(NotificationRecord {
            id,
            app: app.to_string(),
            summary: summary.to_string(),
        });
    }
    out
}

/// Match `Notification <digits>: <summary>` on a trimmed line.
///
/// Returns the digit run and the non-empty summary.
fn parse_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(HEADER_PREFIX)?;
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        // at least one whitespace between the keyword and the id
        return None;
    }
    let digits_end = after_ws
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_ws.len());
    if digits_end == 0 {
        return None;
    }
    let (digits, tail) = after_ws.split_at(digits_end);
    let summary = tail.strip_prefix(':')?.trim_start();
    if summary.is_empty() {
        return None;
    }
    Some((digits, summary))
}

/// Match `App name: <name>` on a trimmed line, returning the non-empty name.
fn parse_app_name(line: &str) -> Option<&str> {
    let name = line.strip_prefix(APP_PREFIX)?.trim_start();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: u64, app: &str, summary: &str) -> NotificationRecord {
        NotificationRecord {
            id,
            app: app.into(),
            summary: summary.into(),
        }
    }

    #[test]
    fn app_name_found_or_defaulted() {
        let raw = "Notification 7: Build failed\nApp name: CI\nNotification 8: Done\n";
        assert_eq!(
            parse_history(raw),
            vec![rec(7, "CI", "Build failed"), rec(8, "SYSTEM", "Done")]
        );
    }

    #[test]
    fn indented_makoctl_output() {
        let raw = "\
Notification 12: New message from Alice
  App name: Signal
  Urgency: normal
Notification 11: Battery low
  Urgency: critical
  App name: upower
";
        assert_eq!(
            parse_history(raw),
            vec![
                rec(12, "Signal", "New message from Alice"),
                rec(11, "upower", "Battery low"),
            ]
        );
    }

    #[test]
    fn order_is_preserved_not_sorted() {
        let raw = "Notification 3: c\nNotification 9: a\nNotification 1: b\n";
        let ids: Vec<u64> = parse_history(raw).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 9, 1]);
    }

    #[test]
    fn app_lookahead_stops_at_next_header() {
        let raw = "Notification 1: first\nNotification 2: second\nApp name: Late\n";
        let recs = parse_history(raw);
        assert_eq!(recs[0].app, "SYSTEM");
        assert_eq!(recs[1].app, "Late");
    }

    #[test]
    fn app_lookahead_is_bounded() {
        let mut raw = String::from("Notification 1: far\n");
        for _ in 0..APP_LOOKAHEAD {
            raw.push_str("Urgency: low\n");
        }
        raw.push_str("App name: TooFar\n");
        assert_eq!(parse_history(&raw)[0].app, "SYSTEM");

        let mut raw = String::from("Notification 1: near\n");
        for _ in 0..APP_LOOKAHEAD - 1 {
            raw.push_str("Urgency: low\n");
        }
        raw.push_str("App name: JustInTime\n");
        assert_eq!(parse_history(&raw)[0].app, "JustInTime");
    }

    #[test]
    fn non_header_lines_are_skipped() {
        let raw = "garbage\nNotification x: nope\nNotification 5:\nNotification5: glued\nNotification 6: ok\n";
        assert_eq!(parse_history(raw), vec![rec(6, "SYSTEM", "ok")]);
    }

    #[test]
    fn empty_app_name_falls_back() {
        let raw = "Notification 1: hi\nApp name:   \n";
        assert_eq!(parse_history(raw)[0].app, "SYSTEM");
    }

    #[test]
    fn overflowing_id_drops_only_that_record() {
        let raw = "Notification 99999999999999999999999: huge\nNotification 4: fine\n";
        assert_eq!(parse_history(raw), vec![rec(4, "SYSTEM", "fine")]);
    }

    #[test]
    fn record_count_is_capped() {
        let raw: String = (0..300)
            .map(|i| format!("Notification {}: n\n", i))
            .collect();
        // 300 headers but only 320 lines scanned and 200 records kept
        assert_eq!(parse_history(&raw).len(), MAX_RECORDS);
    }

    #[test]
    fn scan_window_is_capped() {
        let mut raw = "filler\n".repeat(MAX_SCAN_LINES);
        raw.push_str("Notification 1: beyond the window\n");
        assert!(parse_history(&raw).is_empty());

        let mut raw = "filler\n".repeat(MAX_SCAN_LINES - 1);
        raw.push_str("Notification 1: last scanned line\n");
        assert_eq!(parse_history(&raw).len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(parse_history("").is_empty());
    }
}
