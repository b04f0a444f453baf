//! Timed triggers that drive the world.
//!
//! The scheduler knows nothing about combat or decay. Each trigger runs in its
//! own task, sleeps until its next fire time and sends the matching command
//! through a [`WorldHandle`]. The task waits for the reply, so a shutdown
//! signal never interrupts a cycle that already started.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::api::{RuntimeError, WorldHandle};
use crate::config::RuntimeConfig;

/// Command a trigger sends when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    BeginResolution,
    BeginInteractive,
    ContestedSweep,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::BeginResolution => "begin_resolution",
            TriggerKind::BeginInteractive => "begin_interactive",
            TriggerKind::ContestedSweep => "contested_sweep",
        }
    }
}

/// When a trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Once a day at a UTC time of day.
    Daily { at: NaiveTime, kind: TriggerKind },
    /// Repeatedly with a fixed period.
    Every { period: Duration, kind: TriggerKind },
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Daily { kind, .. } | Trigger::Every { kind, .. } => *kind,
        }
    }

    /// Next instant strictly after `now` at which the trigger fires.
    pub fn next_fire(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Trigger::Daily { at, .. } => next_daily_fire(now, *at),
            Trigger::Every { period, .. } => {
                let period = TimeDelta::from_std(*period).unwrap_or(TimeDelta::MAX);
                now.checked_add_signed(period).unwrap_or(DateTime::<Utc>::MAX_UTC)
            }
        }
    }

    /// The three triggers a world runs with.
    pub fn defaults(config: &RuntimeConfig) -> Vec<Trigger> {
        vec![
            Trigger::Daily {
                at: config.resolution_time,
                kind: TriggerKind::BeginResolution,
            },
            Trigger::Daily {
                at: config.dawn_time,
                kind: TriggerKind::BeginInteractive,
            },
            Trigger::Every {
                period: config.sweep_interval,
                kind: TriggerKind::ContestedSweep,
            },
        ]
    }
}

/// Next instant strictly after `now` whose UTC time of day is `at`.
pub fn next_daily_fire(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Spawns one task per trigger.
pub struct Scheduler {
    triggers: Vec<Trigger>,
    handle: WorldHandle,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        triggers: Vec<Trigger>,
        handle: WorldHandle,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            triggers,
            handle,
            shutdown,
        }
    }

    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        info!(
            target: "runtime::scheduler",
            triggers = self.triggers.len(),
            "Scheduler started"
        );
        self.triggers
            .into_iter()
            .map(|trigger| {
                let handle = self.handle.clone();
                let shutdown = self.shutdown.clone();
                tokio::spawn(run_trigger(trigger, handle, shutdown))
            })
            .collect()
    }
}

async fn run_trigger(trigger: Trigger, handle: WorldHandle, mut shutdown: watch::Receiver<bool>) {
    let kind = trigger.kind();
    // Last scheduled fire time. Keeps a timer that wakes a little early from
    // firing twice for the same slot.
    let mut last_fired: Option<DateTime<Utc>> = None;
    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Utc::now();
        let next = trigger.next_fire(last_fired.map_or(now, |fired| now.max(fired)));
        let delay = (next - now).to_std().unwrap_or_default();
        debug!(
            target: "runtime::scheduler",
            trigger = kind.as_str(),
            next = %next,
            "Trigger armed"
        );

        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {
                fire(kind, &handle).await;
                last_fired = Some(next);
            }
        }
    }
    info!(target: "runtime::scheduler", trigger = kind.as_str(), "Trigger stopped");
}

async fn fire(kind: TriggerKind, handle: &WorldHandle) {
    let result = match kind {
        TriggerKind::BeginResolution => handle.begin_resolution().await.map(|_| ()),
        TriggerKind::BeginInteractive => handle.begin_interactive().await.map(|_| ()),
        TriggerKind::ContestedSweep => handle.sweep_contested().await.map(|_| ()),
    };
    match result {
        Ok(()) => {}
        Err(RuntimeError::NoWorld) => {
            debug!(
                target: "runtime::scheduler",
                trigger = kind.as_str(),
                "No world yet, nothing to do"
            );
        }
        Err(error) => error!(
            target: "runtime::scheduler",
            trigger = kind.as_str(),
            error = %error,
            "Triggered command failed"
        ),
    }
}
