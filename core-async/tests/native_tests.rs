//! Integration tests for core-async on the Tokio runtime.

use core_async::{runtime, sync, task, time};
use std::sync::Arc;

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_task_spawn_blocking() {
    let handle = task::spawn_blocking(|| {
        // Simulate a blocking read
        std::thread::sleep(std::time::Duration::from_millis(10));
        100
    });
    let result = handle.await.unwrap();
    assert_eq!(result, 100);
}

#[test]
fn test_spawn_on_from_foreign_thread() {
    let rt = runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let handle = rt.handle().clone();

    // A plain OS thread (like a host UI thread) has no runtime context.
    let join = std::thread::spawn(move || {
        assert!(runtime::current_handle().is_none());
        task::spawn_on(&handle, async { 7 })
    })
    .join()
    .unwrap();

    assert_eq!(rt.block_on(join).unwrap(), 7);
}

#[tokio::test]
async fn test_current_handle_inside_runtime() {
    assert!(runtime::current_handle().is_some());
}

#[tokio::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_cancellation_token_stops_task() {
    let token = sync::CancellationToken::new();
    let child = token.clone();

    let handle = task::spawn(async move {
        tokio::select! {
            _ = child.cancelled() => "cancelled",
            _ = time::sleep(time::Duration::from_secs(5)) => "finished",
        }
    });

    token.cancel();
    assert_eq!(handle.await.unwrap(), "cancelled");
}

#[tokio::test]
async fn test_child_token_follows_parent() {
    let parent = sync::CancellationToken::new();
    let child = parent.child_token();

    assert!(!child.is_cancelled());
    parent.cancel();
    assert!(child.is_cancelled());
}

#[tokio::test]
async fn test_frame_interval_ticks() {
    let mut ticker = time::frame_interval(time::Duration::from_millis(10));
    let start = time::Instant::now();

    // First tick is immediate
    ticker.tick().await;
    for _ in 0..3 {
        ticker.tick().await;
    }

    assert!(start.elapsed() >= time::Duration::from_millis(30));
}

#[tokio::test]
async fn test_concurrent_task_execution() {
    let counter = Arc::new(sync::Mutex::new(0));
    let mut handles = vec![];

    for _ in 0..10 {
        let counter_clone = counter.clone();
        let handle = task::spawn(async move {
            let mut guard = counter_clone.lock().await;
            *guard += 1;
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let final_count = *counter.lock().await;
    assert_eq!(final_count, 10);
}

#[tokio::test]
async fn test_broadcast_channel() {
    let (tx, mut rx1) = sync::broadcast::channel(10);
    let mut rx2 = tx.subscribe();

    task::spawn(async move {
        for i in 0..5 {
            tx.send(i).unwrap();
        }
    });

    let mut values1 = vec![];
    let mut values2 = vec![];

    for _ in 0..5 {
        values1.push(rx1.recv().await.unwrap());
        values2.push(rx2.recv().await.unwrap());
    }

    assert_eq!(values1, vec![0, 1, 2, 3, 4]);
    assert_eq!(values2, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_block_on() {
    let value = runtime::block_on(async {
        time::sleep(time::Duration::from_millis(1)).await;
        5
    })
    .unwrap();
    assert_eq!(value, 5);
}
