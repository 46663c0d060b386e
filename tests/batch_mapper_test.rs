//! Batch Mapper Tests
//!
//! Synchronous mapping with index-aligned aggregation, delivered asynchronously.

use deferred::{
    call_async_for, BatchOutcome, Deferrer, ItemOutcome, Scheduler, VirtualScheduler,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

type Outcome = BatchOutcome<Option<i32>, &'static str>;

fn times_ten(x: i32) -> ItemOutcome<Option<i32>, &'static str> {
    if x == 0 {
        ItemOutcome::failed("e", None)
    } else {
        ItemOutcome::ok(Some(x * 10))
    }
}

/// Runs a batch on the current runtime, returning the outcome and the counter seen at delivery
async fn run_batch(items: Vec<i32>) -> (Outcome, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();

    let seen = count.clone();
    call_async_for(items, times_ten, 0, move |outcome| {
        let _ = tx.send((outcome, seen.load(Ordering::SeqCst)));
    })
    .expect("runtime is available");
    count.store(1, Ordering::SeqCst);

    rx.await.expect("callback fires")
}

#[tokio::test]
async fn test_maps_without_error() {
    let (outcome, seen) = run_batch(vec![1, 2]).await;

    assert_eq!(outcome.errors, None);
    assert_eq!(outcome.results, vec![Some(10), Some(20)]);
    assert_eq!(seen, 1, "delivered on a later tick");
}

#[tokio::test]
async fn test_maps_with_error() {
    let (outcome, seen) = run_batch(vec![0, 1, 2]).await;

    assert_eq!(outcome.errors, Some(vec![Some("e"), None, None]));
    assert_eq!(outcome.results, vec![None, Some(10), Some(20)]);
    assert_eq!(outcome.failed_count(), 1);
    assert_eq!(seen, 1);
}

#[tokio::test]
async fn test_empty_input_still_delivers_later() {
    let (outcome, seen) = run_batch(vec![]).await;

    assert_eq!(outcome.errors, None);
    assert!(outcome.results.is_empty());
    assert_eq!(seen, 1);
}

#[test]
fn test_mapping_is_synchronous_delivery_is_not() {
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(clock.clone());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let delivered = Arc::new(Mutex::new(None));

    let mapped = calls.clone();
    let slot = delivered.clone();
    deferrer
        .call_async_for(
            vec![3, 1, 2],
            move |x: i32| {
                mapped.lock().push(x);
                ItemOutcome::<i32, String>::ok(x)
            },
            50,
            move |outcome| *slot.lock() = Some(outcome),
        )
        .unwrap();

    // Every element was mapped, in order, before the call returned
    assert_eq!(*calls.lock(), vec![3, 1, 2]);
    assert!(delivered.lock().is_none());

    clock.advance(Duration::from_millis(49));
    assert!(delivered.lock().is_none());

    clock.advance(Duration::from_millis(1));
    let outcome = delivered.lock().take().expect("delivered at 50ms");
    assert!(outcome.is_ok());
    assert_eq!(outcome.results, vec![3, 1, 2]);
}

#[test]
fn test_all_failures_are_reported_in_place() {
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(clock.clone());
    let delivered = Arc::new(Mutex::new(None));

    let slot = delivered.clone();
    deferrer
        .call_async_for(
            ["7", "seven", "", "11"],
            |s: &str| -> ItemOutcome<Option<i32>, String> {
                s.parse::<i32>().map_err(|e| e.to_string()).into()
            },
            (10, 20),
            move |outcome| *slot.lock() = Some(outcome),
        )
        .unwrap();

    clock.advance(Duration::from_millis(20));
    let (errors, results) = delivered.lock().take().unwrap().into_parts();
    let errors = errors.expect("some elements failed");

    assert_eq!(errors.len(), 4);
    assert!(errors[0].is_none());
    assert!(errors[1].is_some());
    assert!(errors[2].is_some());
    assert!(errors[3].is_none());
    assert_eq!(results, vec![Some(7), None, None, Some(11)]);
}

#[test]
fn test_results_are_kept_as_returned() {
    // A failed element may still carry a real result value
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(clock.clone());
    let delivered = Arc::new(Mutex::new(None));

    let slot = delivered.clone();
    deferrer
        .call_async_for(
            vec![-1, 4],
            |x: i32| {
                if x < 0 {
                    ItemOutcome::failed("negative", x.abs())
                } else {
                    ItemOutcome::ok(x)
                }
            },
            0,
            move |outcome| *slot.lock() = Some(outcome),
        )
        .unwrap();

    clock.advance(Duration::ZERO);
    let outcome = delivered.lock().take().unwrap();
    assert_eq!(outcome.errors, Some(vec![Some("negative"), None]));
    assert_eq!(outcome.results, vec![1, 4]);
}

#[test]
fn test_each_batch_schedules_one_delivery() {
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(Arc::new(clock.clone()));
    let deliveries = Arc::new(AtomicUsize::new(0));

    for batch in [vec![1], vec![], vec![1, 2, 3]] {
        let deliveries = deliveries.clone();
        deferrer
            .call_async_for(batch, times_ten, 5, move |_| {
                deliveries.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    assert_eq!(clock.pending(), 3);
    assert_eq!(deferrer.scheduler().pending(), 3);
    clock.advance(Duration::from_millis(5));
    assert_eq!(deliveries.load(Ordering::SeqCst), 3);

    // Scheduling through a shared handle goes to the same clock
    let shared: &dyn Scheduler = deferrer.scheduler();
    shared.schedule(Duration::ZERO, Box::new(|| {})).unwrap();
    assert_eq!(clock.pending(), 1);
}

#[test]
fn test_mapper_may_return_pairs() {
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(clock.clone());
    let delivered = Arc::new(Mutex::new(None));

    let slot = delivered.clone();
    deferrer
        .call_async_for(
            vec![1, 2],
            |x: i32| (None, Some(x * 10)),
            0,
            move |outcome: Outcome| *slot.lock() = Some(outcome),
        )
        .unwrap();

    clock.advance(Duration::ZERO);
    let outcome = delivered.lock().take().unwrap();
    assert_eq!(outcome.errors, None);
    assert_eq!(outcome.results, vec![Some(10), Some(20)]);
}

#[test]
fn test_mapper_panic_schedules_nothing() {
    let clock = VirtualScheduler::new();
    let deferrer = Deferrer::new(clock.clone());
    let delivered = Arc::new(AtomicUsize::new(0));

    let seen = delivered.clone();
    let result = catch_unwind(AssertUnwindSafe(|| {
        deferrer.call_async_for(
            vec![1, 2, 3],
            |x: i32| {
                if x == 2 {
                    panic!("mapper failed on {}", x);
                }
                times_ten(x)
            },
            0,
            move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            },
        )
    }));

    assert!(result.is_err(), "panic reaches the caller");
    assert_eq!(clock.pending(), 0);
    assert_eq!(clock.run_until_idle(), 0);
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
}
