//! Debounce and cycle scheduling, with stand-in regenerators.

use std::{path::Path, time::Duration};

use connectgen_plugin::watch::{
    ChangeFilter, ChangeKind, Orchestrator, Regenerate, Reload, WatchEvent,
};
use eyre::{Result, bail, eyre};
use tokio::{
    sync::mpsc,
    time::{Instant, sleep},
};

const WINDOW: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Counting {
    calls: usize,
    fail_first: bool,
}

impl Regenerate for Counting {
    fn regenerate(&mut self) -> Result<()> {
        self.calls += 1;
        if self.fail_first && self.calls == 1 {
            bail!("compiler exploded");
        }
        Ok(())
    }
}

fn filter() -> ChangeFilter {
    ChangeFilter::new(Path::new("/project"), Path::new("src/.generated-clients"))
}

fn changed(path: &str) -> WatchEvent {
    WatchEvent::new(ChangeKind::Modified, path)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Reload>) -> Vec<Reload> {
    let mut reloads = Vec::new();
    while let Ok(reload) = rx.try_recv() {
        reloads.push(reload);
    }
    reloads
}

#[tokio::test(start_paused = true)]
async fn test_burst_triggers_one_cycle() {
    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(Orchestrator::new(Counting::default(), filter(), reload_tx, WINDOW).run(rx));

    for _ in 0..3 {
        tx.send(changed("proto/foo.proto")).await.unwrap();
        sleep(Duration::from_millis(30)).await;
    }
    let last = Instant::now() - Duration::from_millis(30);

    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));
    assert!(last.elapsed() >= WINDOW);

    drop(tx);
    let counting = task.await.unwrap().unwrap();
    assert_eq!(counting.calls, 1);
    assert!(drain(&mut reload_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_trigger_separate_cycles() {
    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(Orchestrator::new(Counting::default(), filter(), reload_tx, WINDOW).run(rx));

    tx.send(changed("proto/foo.proto")).await.unwrap();
    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));
    tx.send(changed("proto/bar.proto")).await.unwrap();
    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));

    drop(tx);
    assert_eq!(task.await.unwrap().unwrap().calls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_output_dir_changes_are_ignored() {
    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(Orchestrator::new(Counting::default(), filter(), reload_tx, WINDOW).run(rx));

    tx.send(changed("src/.generated-clients/foo/v1/foo.proto")).await.unwrap();
    tx.send(changed("/project/src/.generated-clients/bar.proto")).await.unwrap();
    tx.send(changed("proto/foo_pb.ts")).await.unwrap();
    tx.send(WatchEvent::new(ChangeKind::Other, "proto/foo.proto")).await.unwrap();
    sleep(WINDOW * 5).await;

    drop(tx);
    assert_eq!(task.await.unwrap().unwrap().calls, 0);
    assert!(drain(&mut reload_rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pending_deadline_fires_after_channel_closes() {
    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(Orchestrator::new(Counting::default(), filter(), reload_tx, WINDOW).run(rx));

    tx.send(changed("proto/foo.proto")).await.unwrap();
    drop(tx);

    assert_eq!(task.await.unwrap().unwrap().calls, 1);
    assert_eq!(drain(&mut reload_rx), vec![Reload::FullReload]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_sends_no_reload() {
    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let counting = Counting {
        fail_first: true,
        ..Counting::default()
    };
    let task = tokio::spawn(Orchestrator::new(counting, filter(), reload_tx, WINDOW).run(rx));

    tx.send(changed("proto/foo.proto")).await.unwrap();
    sleep(WINDOW * 3).await;
    tx.send(changed("proto/foo.proto")).await.unwrap();
    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));

    drop(tx);
    assert_eq!(task.await.unwrap().unwrap().calls, 2);
    assert!(drain(&mut reload_rx).is_empty());
}

/// Blocks each cycle until the test opens the gate.
struct Gated {
    gate: std::sync::mpsc::Receiver<()>,
    started: mpsc::UnboundedSender<()>,
    calls: usize,
}

impl Regenerate for Gated {
    fn regenerate(&mut self) -> Result<()> {
        let _ = self.started.send(());
        self.gate.recv().map_err(|_| eyre!("gate closed"))?;
        self.calls += 1;
        Ok(())
    }
}

#[tokio::test]
async fn test_changes_during_cycle_run_one_follow_up() {
    let (gate_tx, gate_rx) = std::sync::mpsc::channel();
    let (started_tx, mut started_rx) = mpsc::unbounded_channel();
    let gated = Gated {
        gate: gate_rx,
        started: started_tx,
        calls: 0,
    };

    let (tx, rx) = mpsc::channel(16);
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(
        Orchestrator::new(gated, filter(), reload_tx, Duration::from_millis(10)).run(rx),
    );

    tx.send(changed("proto/foo.proto")).await.unwrap();
    started_rx.recv().await.unwrap();

    for name in ["proto/a.proto", "proto/b.proto", "proto/c.proto"] {
        tx.send(changed(name)).await.unwrap();
    }
    sleep(Duration::from_millis(50)).await;

    gate_tx.send(()).unwrap();
    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));

    // The follow-up starts without waiting for a new event.
    started_rx.recv().await.unwrap();
    gate_tx.send(()).unwrap();
    assert_eq!(reload_rx.recv().await, Some(Reload::FullReload));

    drop(tx);
    let gated = task.await.unwrap().unwrap();
    assert_eq!(gated.calls, 2);
    assert!(drain(&mut reload_rx).is_empty());
}
