/*!
 * Inflation Concurrency Tests
 * Overlapping inflations, torn-read checks and reset cancellation
 */

use mem_inflator::{
    ChannelEventSink, HostIntrospector, InflationConfig, InflationEngine, InflationError,
    InflationEvent, InflationStatus,
};
use std::time::Duration;

fn engine_with_interval(interval: Duration) -> InflationEngine {
    InflationEngine::new(HostIntrospector::fallback()).with_config(
        InflationConfig::default()
            .with_step_interval(interval)
            .with_progress_reports(false),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inflations_do_not_lose_updates() {
    let engine = engine_with_interval(Duration::from_millis(1));

    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.inflate_to(100, 10).await }
    });
    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.inflate_to(100, 10).await }
    });

    a.await.unwrap().expect("first inflation failed");
    b.await.unwrap().expect("second inflation failed");

    assert_eq!(
        engine.status(),
        InflationStatus {
            allocated_mb: 200,
            block_count: 20
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_is_never_torn() {
    let engine = engine_with_interval(Duration::from_millis(2));

    let inflation = tokio::spawn({
        let engine = engine.clone();
        async move { engine.inflate_to(100, 10).await }
    });

    let mut observed = Vec::new();
    while !inflation.is_finished() {
        observed.push(engine.status());
        tokio::task::yield_now().await;
    }
    inflation.await.unwrap().unwrap();
    observed.push(engine.status());

    for status in &observed {
        assert_eq!(
            status.allocated_mb,
            10 * status.block_count as u64,
            "torn read: {status:?}"
        );
    }
    assert_eq!(observed.last().map(|s| s.block_count), Some(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_cancels_inflight_inflation() {
    let (sink, rx) = ChannelEventSink::unbounded();
    // Long pause so the loop is parked between steps when reset lands
    let engine = engine_with_interval(Duration::from_secs(60)).with_event_sink(sink);

    let inflation = tokio::spawn({
        let engine = engine.clone();
        async move { engine.inflate_to(50, 10).await }
    });

    while engine.block_count() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    engine.reset();

    let result = tokio::time::timeout(Duration::from_secs(5), inflation)
        .await
        .expect("cancelled inflation kept sleeping")
        .unwrap();

    assert_eq!(
        result,
        Err(InflationError::Cancelled {
            completed_mb: 10,
            target_mb: 50
        })
    );
    assert_eq!(engine.status(), InflationStatus::default());
    assert!(rx
        .try_iter()
        .any(|e| matches!(e, InflationEvent::Cancelled { completed_mb: 10, .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_inflation_after_reset_is_unaffected() {
    let engine = engine_with_interval(Duration::from_millis(1));
    engine.inflate_to(5, 5).await.unwrap();
    engine.reset();

    let status = engine.inflate_to(6, 3).await.unwrap();
    assert_eq!(
        status,
        InflationStatus {
            allocated_mb: 6,
            block_count: 2
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_independent_engines_do_not_share_state() {
    let first = engine_with_interval(Duration::from_millis(1));
    let second = engine_with_interval(Duration::from_millis(1));

    first.inflate_to(4, 2).await.unwrap();
    assert_eq!(second.status(), InflationStatus::default());

    second.reset();
    assert_eq!(first.allocated_mb(), 4);
}
