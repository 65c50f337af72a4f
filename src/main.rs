//! Entry point for the **hubd** daemon.
//!
//! Spawns every [`EventSource`](hubd::traits::EventSource) on a background
//! thread, processes their events on the main thread, and writes each new
//! [`HubSnapshot`] to stdout as one JSON line.

use hubd::action::HubEvent;
use hubd::config::{self, Config, StatusConfig};
use hubd::dismissed::DismissalTracker;
use hubd::hub::{Hub, HubSnapshot};
use hubd::ipc::listener::UnixSocketListener;
use hubd::linux::mako::Mako;
use hubd::linux::procfs::{self, CpuSampler};
use hubd::linux::shell::ShellRunner;
use hubd::poll::Poller;
use hubd::status;
use hubd::traits::{CommandRunner, EventSource, NotificationDaemon};
use log::{debug, error, info, warn};
use std::io::Write;
use std::sync::mpsc;
use std::time::Duration;

/// Try to load the config from `$XDG_CONFIG_HOME/hubd/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config::config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn mako(config: &Config) -> Mako<ShellRunner> {
    Mako::with_commands(
        ShellRunner::new(),
        config.notifications.history_command.clone(),
        config.notifications.dismiss_command.clone(),
    )
    .with_mode_commands(
        config.notifications.mode_command.clone(),
        config.notifications.dnd_toggle_command.clone(),
    )
}

/// Output of `command`, or an empty string if it could not be run.
fn read_output<R: CommandRunner>(runner: &R, command: &str) -> String {
    runner.run(command).unwrap_or_else(|e| {
        debug!("{}", e);
        String::new()
    })
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();

    let tracker = DismissalTracker::load(config.notifications.dismissed_path());
    let mut hub = Hub::new(mako(&config), tracker, config.notifications.max_visible);
    hub.handle(HubEvent::Weather(status::cached_weather(
        &config.status.weather_cache_path(),
    )));

    let (view_tx, view_rx) = mpsc::channel::<HubSnapshot>();
    std::thread::spawn(move || write_snapshots(view_rx));
    hub.set_view(view_tx);

    let (event_tx, event_rx) = mpsc::channel::<HubEvent>();
    spawn_event_sources(&config, event_tx);

    info!("hubd running");
    for event in event_rx {
        debug!("event: {:?}", event);
        hub.handle(event);
    }
    info!("all event sources closed, exiting");
}

//  Helpers

/// Print every snapshot as a JSON line for the view layer.
fn write_snapshots(rx: mpsc::Receiver<HubSnapshot>) {
    let stdout = std::io::stdout();
    for snapshot in rx {
        let line = match serde_json::to_string(&snapshot) {
            Ok(line) => line,
            Err(e) => {
                error!("failed to encode snapshot: {}", e);
                continue;
            }
        };
        let mut out = stdout.lock();
        if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
            warn!("stdout closed, no longer writing snapshots");
            return;
        }
    }
}

fn spawn_source<S: EventSource + 'static>(name: &'static str, mut source: S, tx: mpsc::Sender<HubEvent>) {
    std::thread::spawn(move || {
        if let Err(e) = source.run(tx) {
            error!("{} source error: {}", name, e);
        }
    });
}

fn spawn_event_sources(config: &Config, tx: mpsc::Sender<HubEvent>) {
    spawn_source(
        "socket",
        UnixSocketListener::new(config::default_socket_path()),
        tx.clone(),
    );

    let daemon = mako(config);
    spawn_source(
        "notifications",
        Poller::new("notifications", config.notifications.poll_interval(), move || {
            HubEvent::History(match daemon.history() {
                Ok(raw) => Some(raw),
                Err(e) => {
                    debug!("history unavailable: {}", e);
                    None
                }
            })
        }),
        tx.clone(),
    );

    let mut cpu = CpuSampler::default();
    spawn_source(
        "cpu",
        Poller::new(
            "cpu",
            Duration::from_millis(config.stats.cpu_interval_ms),
            move || HubEvent::Cpu(cpu.sample()),
        ),
        tx.clone(),
    );

    spawn_source(
        "ram",
        Poller::new(
            "ram",
            Duration::from_millis(config.stats.ram_interval_ms),
            || HubEvent::Ram(procfs::sample_ram("/proc/meminfo")),
        ),
        tx.clone(),
    );

    let daemon = mako(config);
    spawn_source(
        "dnd",
        Poller::new(
            "dnd",
            Duration::from_millis(config.notifications.dnd_interval_ms),
            move || {
                HubEvent::Dnd(daemon.dnd().unwrap_or_else(|e| {
                    debug!("dnd state unavailable: {}", e);
                    false
                }))
            },
        ),
        tx.clone(),
    );

    spawn_status_sources(&config.status, &tx);

    drop(tx);
}

fn spawn_status_sources(cfg: &StatusConfig, tx: &mpsc::Sender<HubEvent>) {
    let runner = ShellRunner::new();

    let (sh, cmd) = (runner.clone(), cfg.volume_command.clone());
    spawn_source(
        "volume",
        Poller::new(
            "volume",
            Duration::from_millis(cfg.volume_interval_ms),
            move || HubEvent::Volume(status::parse_volume(&read_output(&sh, &cmd))),
        ),
        tx.clone(),
    );

    let (sh, cmd) = (runner.clone(), cfg.brightness_command.clone());
    spawn_source(
        "brightness",
        Poller::new(
            "brightness",
            Duration::from_millis(cfg.brightness_interval_ms),
            move || HubEvent::Brightness(status::parse_brightness(&read_output(&sh, &cmd))),
        ),
        tx.clone(),
    );

    let (sh, cmd) = (runner.clone(), cfg.events_command.clone());
    spawn_source(
        "events",
        Poller::new(
            "events",
            Duration::from_millis(cfg.events_interval_ms),
            move || HubEvent::Events(status::parse_events(&read_output(&sh, &cmd))),
        ),
        tx.clone(),
    );

    let (sh, cmd) = (runner, cfg.weather_command.clone());
    spawn_source(
        "weather",
        Poller::new(
            "weather",
            Duration::from_millis(cfg.weather_interval_ms),
            move || HubEvent::Weather(status::parse_weather(&read_output(&sh, &cmd))),
        ),
        tx.clone(),
    );
}
