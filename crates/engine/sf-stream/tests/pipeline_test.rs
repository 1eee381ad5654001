//! End-to-end pipeline tests for sf-stream.
//!
//! These tests drive full combinator chains the way library consumers do,
//! rather than exercising single combinators in isolation.
//!
//! ## Test Categories
//!
//! - Buffered mapping pipelines: set equality, ordering, window bounds
//! - Limiting under sequential and overlapping pulls
//! - Batching and stateful transformation pipelines
//! - Short-circuiting terminals and cancellation propagation

use sf_stream::{AsyncStream, StreamError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Initialize logging for test debugging.
///
/// Logs are written to stderr so test output stays clean. Safe to call
/// from every test; only the first call installs the subscriber.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

/// A source of `0..len` counting how many values were actually pulled.
fn counted_source(len: usize) -> (AsyncStream<usize>, Arc<AtomicUsize>) {
    let pulled = Arc::new(AtomicUsize::new(0));
    let probe = pulled.clone();
    let stream = AsyncStream::from_iter((0..len).map(move |i| {
        probe.fetch_add(1, Ordering::SeqCst);
        i
    }));
    (stream, pulled)
}

#[tokio::test]
async fn test_buffered_pipeline_delivers_exact_set() {
    init_logging();

    // Per-item latency varies wildly; the buffered pipeline must still
    // deliver every value exactly once.
    let delays: Vec<u64> = vec![21, 2, 13, 1, 17, 3, 8, 1, 11, 2];
    let len = delays.len();

    let mut pipeline = AsyncStream::from_iter(0..len)
        .map(move |i| {
            let delay = delays[i];
            async move {
                sleep(Duration::from_millis(delay)).await;
                Ok(i)
            }
        })
        .buffered(4);

    let values = pipeline.to_vec().await.unwrap();
    assert_eq!(values.len(), len);
    let unique: HashSet<_> = values.into_iter().collect();
    assert_eq!(unique, (0..len).collect::<HashSet<_>>());
}

#[tokio::test]
async fn test_buffer_of_one_preserves_source_order() {
    init_logging();

    let mut pipeline = AsyncStream::from_iter(0..6)
        .map(|i| async move {
            sleep(Duration::from_millis((6 - i) as u64)).await;
            Ok(i)
        })
        .buffered(1);

    assert_eq!(pipeline.to_vec().await.unwrap(), vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_buffered_limit_pipeline_bounds_delivery() {
    init_logging();

    // The buffering engine issues overlapping pulls against the limiting
    // gate; the gate must never let more than `max` values through.
    let (stream, _pulled) = counted_source(64);
    let mut pipeline = stream
        .map(|i| async move {
            sleep(Duration::from_millis((i % 5) as u64)).await;
            Ok(i)
        })
        .limit(10)
        .buffered(4);

    let values = pipeline.to_vec().await.unwrap();
    assert!(values.len() <= 10, "delivered {} values", values.len());

    // No duplicates even under overlap.
    let unique: HashSet<_> = values.iter().copied().collect();
    assert_eq!(unique.len(), values.len());
}

#[tokio::test]
async fn test_sequential_limit_is_exact() {
    init_logging();

    let (stream, pulled) = counted_source(100);
    let mut pipeline = stream.limit(5);

    assert_eq!(pipeline.to_vec().await.unwrap(), vec![0, 1, 2, 3, 4]);
    // The gate stops the source instead of pulling past the bound.
    assert_eq!(pulled.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_batching_pipeline() {
    init_logging();

    let mut pipeline = AsyncStream::from_iter(1..=7)
        .map(|i| async move { Ok(i * 10) })
        .transform(sf_stream::transformers::BatchTransformer::new(3));

    assert_eq!(
        pipeline.to_vec().await.unwrap(),
        vec![vec![10, 20, 30], vec![40, 50, 60], vec![70]]
    );
}

#[tokio::test]
async fn test_flat_map_then_batch() {
    init_logging();

    let mut pipeline = AsyncStream::from_values(vec![vec![1, 2], vec![], vec![3, 4, 5]])
        .flat_map(AsyncStream::from_values)
        .transform(sf_stream::transformers::BatchTransformer::new(2));

    assert_eq!(
        pipeline.to_vec().await.unwrap(),
        vec![vec![1, 2], vec![3, 4], vec![5]]
    );
}

#[tokio::test]
async fn test_find_first_cancels_buffered_upstream() {
    init_logging();

    let (stream, pulled) = counted_source(8);
    let mut pipeline = stream
        .map(|i| async move {
            sleep(Duration::from_millis(2)).await;
            Ok(i)
        })
        .buffered(3);

    let first = pipeline.find_first().await.unwrap();
    assert!(first.is_some());

    // The window touched at most its own size worth of source items; the
    // rest of the source was never produced.
    let touched = pulled.load(Ordering::SeqCst);
    assert!(touched < 8, "source touched {touched} times");
}

#[tokio::test]
async fn test_terminal_once_discipline_across_pipeline() {
    init_logging();

    let mut pipeline = AsyncStream::from_iter(0..4).buffered(2);
    assert_eq!(pipeline.count().await.unwrap(), 4);

    let error = pipeline.find_first().await.unwrap_err();
    assert!(matches!(error, StreamError::Terminated));
}

#[tokio::test]
async fn test_mapper_failure_fails_buffered_pull() {
    init_logging();

    let mut pipeline = AsyncStream::from_iter(0..6)
        .map(|i| async move {
            if i == 3 {
                Err(anyhow::anyhow!("item {i} failed").into())
            } else {
                Ok(i)
            }
        })
        .buffered(2);

    assert!(pipeline.to_vec().await.is_err());
}

#[tokio::test]
async fn test_mixed_pipeline_end_to_end() {
    init_logging();

    // filter -> map -> buffered -> sorted: the buffer scrambles delivery
    // order, the sort restores a deterministic result.
    let mut pipeline = AsyncStream::from_iter(0..20)
        .filter(|i| {
            let keep = i % 2 == 0;
            async move { Ok(keep) }
        })
        .map(|i| async move {
            sleep(Duration::from_millis((i % 4) as u64)).await;
            Ok(i * 2)
        })
        .buffered(4)
        .sorted(|a, b| a.cmp(b));

    assert_eq!(
        pipeline.to_vec().await.unwrap(),
        (0..10).map(|i| i * 4).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_optional_feeds_pipeline() {
    init_logging();

    let optional = sf_stream::AsyncOptional::of(21).map(|v| async move { Ok(v * 2) });
    let mut stream = optional.into_stream();
    assert_eq!(stream.to_vec().await.unwrap(), vec![42]);
}
