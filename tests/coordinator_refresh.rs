use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use airco2ntrol::entity::entity_states;
use airco2ntrol::hid::{FrameSource, HidError};
use airco2ntrol::protocol::cipher::encrypt_frame;
use airco2ntrol::protocol::frame::checksum;
use airco2ntrol::protocol::types::*;
use airco2ntrol::{SensorHandle, UpdateCoordinator, UpdateFailed};

fn raw(op: u8, value: u16) -> RawFrame {
    let [hi, lo] = value.to_be_bytes();
    let mut frame = [op, hi, lo, 0, TERMINATOR, 0, 0, 0];
    frame[FRAME_CHECKSUM] = checksum(&frame);
    encrypt_frame(&frame)
}

struct Scripted {
    script: VecDeque<Result<RawFrame, HidError>>,
    reads: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl Scripted {
    fn new(script: Vec<Result<RawFrame, HidError>>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = Self {
            script: script.into(),
            reads: reads.clone(),
            delay: None,
        };
        (source, reads)
    }
}

impl FrameSource for Scripted {
    fn read_frame(&mut self) -> Result<RawFrame, HidError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(HidError::ReadFailed("script exhausted".into())))
    }
}

fn coordinator(source: Scripted, timeout: Option<Duration>) -> UpdateCoordinator {
    UpdateCoordinator::new(SensorHandle::new(source), Duration::from_secs(10), timeout)
}

#[tokio::test]
async fn test_refresh_publishes_readings() {
    let (source, reads) = Scripted::new(vec![
        Ok(raw(OP_TEMPERATURE, 4700)),
        Ok(raw(OP_CARBON_DIOXIDE, 733)),
    ]);
    let coordinator = coordinator(source, None);
    let mut rx = coordinator.subscribe();

    let result = coordinator.first_refresh().await.unwrap();
    assert_eq!(result.carbon_dioxide, Some(733));
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(state.last_update_success);
    assert_eq!(state.data, Some(result));
    assert_eq!(state.consecutive_empty, 0);

    let entities = entity_states(&state);
    assert_eq!(entities[0].state.as_deref(), Some("733"));
    assert_eq!(entities[1].state.as_deref(), Some("20.60"));
    assert!(entities.iter().all(|e| e.available));
}

#[tokio::test]
async fn test_failure_keeps_last_data() {
    let (source, _) = Scripted::new(vec![
        Ok(raw(OP_TEMPERATURE, 4700)),
        Ok(raw(OP_CARBON_DIOXIDE, 733)),
        Err(HidError::ReadFailed("device gone".into())),
    ]);
    let coordinator = coordinator(source, None);
    let first = coordinator.refresh().await.unwrap();

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, UpdateFailed::Hid(HidError::ReadFailed(_))));

    let state = coordinator.state();
    assert!(!state.last_update_success);
    assert_eq!(state.data, Some(first));
    assert!(state.last_error.unwrap().contains("device gone"));
    assert!(entity_states(&coordinator.state()).iter().all(|e| !e.available));
}

#[tokio::test]
async fn test_first_refresh_failure() {
    let (source, reads) = Scripted::new(vec![Err(HidError::ReadFailed("short read".into()))]);
    let coordinator = coordinator(source, None);
    assert!(coordinator.first_refresh().await.is_err());
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.state().data, None);
}

#[tokio::test]
async fn test_empty_results_counted() {
    let script = (0..30).map(|_| Ok([0u8; FRAME_SIZE])).collect();
    let (source, reads) = Scripted::new(script);
    let coordinator = coordinator(source, None);
    for expected in 1..=3 {
        let result = coordinator.refresh().await.unwrap();
        assert!(result.is_empty());
        assert_eq!(coordinator.state().consecutive_empty, expected);
    }
    assert_eq!(reads.load(Ordering::SeqCst), 30);
    // Empty but successful: entities exist without values.
    assert!(coordinator.state().last_update_success);
}

#[tokio::test]
async fn test_poll_timeout() {
    let (mut source, _) = Scripted::new(vec![Ok(raw(OP_CARBON_DIOXIDE, 500))]);
    source.delay = Some(Duration::from_millis(300));
    let coordinator = coordinator(source, Some(Duration::from_millis(20)));

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, UpdateFailed::Timeout(_)));
    assert!(!coordinator.state().last_update_success);
}

/// Blocks every read until the sender half of the gate is dropped.
struct Gated {
    gate: std::sync::mpsc::Receiver<()>,
    reads: Arc<AtomicUsize>,
}

impl FrameSource for Gated {
    fn read_frame(&mut self) -> Result<RawFrame, HidError> {
        let _ = self.gate.recv();
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok([0; FRAME_SIZE])
    }
}

#[tokio::test]
async fn test_timed_out_cycle_blocks_new_cycles() {
    let (open, gate) = std::sync::mpsc::channel::<()>();
    let reads = Arc::new(AtomicUsize::new(0));
    let source = Gated {
        gate,
        reads: reads.clone(),
    };
    let coordinator = UpdateCoordinator::new(
        SensorHandle::new(source),
        Duration::from_secs(10),
        Some(Duration::from_millis(20)),
    );

    assert!(matches!(coordinator.refresh().await, Err(UpdateFailed::Timeout(_))));
    for _ in 0..4 {
        assert!(matches!(coordinator.refresh().await, Err(UpdateFailed::Busy)));
    }
    let state = coordinator.state();
    assert!(!state.last_update_success);
    assert!(state.last_error.unwrap().contains("in flight"));

    // Only the one stuck cycle reaches the device once it wakes up.
    drop(open);
    for _ in 0..200 {
        if reads.load(Ordering::SeqCst) >= 10 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(reads.load(Ordering::SeqCst), 10);

    // With the stuck cycle finished, the next refresh runs a fresh one.
    let outcome = loop {
        match coordinator.refresh().await {
            Err(UpdateFailed::Busy) => tokio::time::sleep(Duration::from_millis(5)).await,
            other => break other,
        }
    };
    assert!(outcome.unwrap().is_empty());
    assert_eq!(reads.load(Ordering::SeqCst), 20);
}

#[tokio::test(start_paused = true)]
async fn test_run_refreshes_every_interval() {
    let (source, reads) = Scripted::new(vec![
        Ok(raw(OP_TEMPERATURE, 4700)),
        Ok(raw(OP_CARBON_DIOXIDE, 733)),
        Err(HidError::ReadFailed("device gone".into())),
        Ok(raw(OP_CARBON_DIOXIDE, 801)),
        Ok(raw(OP_TEMPERATURE, 4710)),
    ]);
    let interval = Duration::from_secs(10);
    let coordinator = UpdateCoordinator::new(SensorHandle::new(source), interval, None);
    let mut rx = coordinator.subscribe();
    let start = tokio::time::Instant::now();
    let within = |tick: u32| {
        let elapsed = start.elapsed();
        elapsed >= interval * tick && elapsed < interval * tick + Duration::from_secs(1)
    };

    let observed = async {
        // No refresh before the first interval has passed.
        assert!(
            tokio::time::timeout(Duration::from_secs(9), rx.changed())
                .await
                .is_err()
        );

        rx.changed().await.unwrap();
        assert!(within(1), "first tick at {:?}", start.elapsed());
        let state = rx.borrow_and_update().clone();
        assert!(state.last_update_success);
        assert_eq!(state.data.unwrap().carbon_dioxide, Some(733));

        rx.changed().await.unwrap();
        assert!(within(2), "second tick at {:?}", start.elapsed());
        let state = rx.borrow_and_update().clone();
        assert!(!state.last_update_success);
        assert!(state.last_error.unwrap().contains("device gone"));

        // The failed tick does not stop the loop.
        rx.changed().await.unwrap();
        assert!(within(3), "third tick at {:?}", start.elapsed());
        let state = rx.borrow_and_update().clone();
        assert!(state.last_update_success);
        assert_eq!(state.data.unwrap().carbon_dioxide, Some(801));
    };

    tokio::select! {
        _ = coordinator.run() => unreachable!("run never returns"),
        _ = observed => {}
    }
    assert_eq!(reads.load(Ordering::SeqCst), 5);
}
