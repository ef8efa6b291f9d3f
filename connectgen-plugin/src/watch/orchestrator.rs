use std::{future, time::Duration};

use eyre::Result;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
    time::{Instant, sleep_until},
};
use tracing::{debug, error, info};

use super::{ChangeFilter, Reload, ReloadSink, WatchEvent};

/// A regeneration cycle. Runs on the blocking pool, one at a time.
pub trait Regenerate: Send + 'static {
    fn regenerate(&mut self) -> Result<()>;
}

/// Where the orchestrator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No cycle running; a pending deadline may be armed.
    Idle,
    /// A cycle is running.
    Generating,
    /// A cycle is running and a change arrived meanwhile.
    RegenPending,
}

type Cycle<R> = JoinHandle<(R, Result<()>)>;

/// Turns filtered watch events into debounced regenerations.
///
/// Every accepted event while idle pushes the deadline back by the debounce
/// window; the cycle starts once the window passes without events. Events
/// that arrive during a cycle are folded into a single follow-up cycle that
/// starts as soon as the current one ends. Each successful cycle sends one
/// [`Reload::FullReload`].
pub struct Orchestrator<R, S> {
    regenerator: Option<R>,
    filter: ChangeFilter,
    sink: S,
    debounce: Duration,
    state: State,
}

impl<R: Regenerate, S: ReloadSink> Orchestrator<R, S> {
    pub fn new(regenerator: R, filter: ChangeFilter, sink: S, debounce: Duration) -> Self {
        Self {
            regenerator: Some(regenerator),
            filter,
            sink,
            debounce,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Process events until the channel closes and no work is left.
    ///
    /// A deadline armed before the channel closed still fires. Returns the
    /// regenerator, or `None` if a cycle panicked.
    pub async fn run(mut self, mut events: mpsc::Receiver<WatchEvent>) -> Option<R> {
        let mut deadline: Option<Instant> = None;
        let mut cycle: Option<Cycle<R>> = None;
        let mut open = true;

        loop {
            if !open && deadline.is_none() && cycle.is_none() {
                break;
            }

            let timer = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending().await,
                }
            };
            let running = async {
                match cycle.as_mut() {
                    Some(handle) => handle.await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(event) => self.on_event(event, &mut deadline),
                    None => open = false,
                },
                () = timer => {
                    deadline = None;
                    cycle = self.start_cycle();
                }
                joined = running => {
                    cycle = None;
                    if !self.finish_cycle(joined) {
                        return None;
                    }
                    if self.state == State::RegenPending {
                        debug!("Changes arrived during generation, regenerating");
                        cycle = self.start_cycle();
                    } else {
                        self.state = State::Idle;
                    }
                }
            }
        }

        self.regenerator
    }

    fn on_event(&mut self, event: WatchEvent, deadline: &mut Option<Instant>) {
        if !self.filter.accepts(&event) {
            debug!("Ignoring {:?} {}", event.kind, event.path.display());
            return;
        }

        debug!("{:?} {}", event.kind, event.path.display());
        match self.state {
            State::Idle => *deadline = Some(Instant::now() + self.debounce),
            State::Generating | State::RegenPending => self.state = State::RegenPending,
        }
    }

    fn start_cycle(&mut self) -> Option<Cycle<R>> {
        let mut regenerator = self.regenerator.take()?;
        self.state = State::Generating;
        Some(tokio::task::spawn_blocking(move || {
            let result = regenerator.regenerate();
            (regenerator, result)
        }))
    }

    /// Returns false when the regenerator was lost to a panic.
    fn finish_cycle(&mut self, joined: std::result::Result<(R, Result<()>), JoinError>) -> bool {
        match joined {
            Ok((regenerator, result)) => {
                self.regenerator = Some(regenerator);
                match result {
                    Ok(()) => {
                        info!("Regenerated clients, reloading");
                        self.sink.send_reload(Reload::FullReload);
                    }
                    Err(err) => error!("Regeneration failed: {err:#}"),
                }
                true
            }
            Err(err) => {
                error!("Regeneration task failed: {err}");
                false
            }
        }
    }
}
