/*!
 * Inflation Service Tests
 * Collaborator contract: start, status, reset
 */

use mem_inflator::{
    HostIntrospector, InflationConfig, InflationEngine, InflationError, InflationService,
    ResetResponse, StatusResponse,
};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn service() -> InflationService {
    InflationService::new(
        InflationEngine::new(HostIntrospector::fallback()).with_config(
            InflationConfig::default()
                .with_step_interval(Duration::from_millis(1))
                .with_progress_reports(false),
        ),
    )
}

#[tokio::test]
async fn test_start_returns_before_inflation_finishes() {
    let service = service();
    let handle = assert_ok!(service.start_inflation(6, 2));

    let status = assert_ok!(handle.await.unwrap());
    assert_eq!(status.allocated_mb, 6);
    assert_eq!(
        service.get_status(),
        StatusResponse {
            allocated_mb: 6,
            block_count: 3
        }
    );
}

#[tokio::test]
async fn test_repeated_requests_add_up() {
    let service = service();
    assert_ok!(service.start_inflation(4, 2).unwrap().await.unwrap());
    assert_ok!(service.start_inflation(4, 2).unwrap().await.unwrap());

    assert_eq!(
        service.get_status(),
        StatusResponse {
            allocated_mb: 8,
            block_count: 4
        }
    );
}

#[tokio::test]
async fn test_negative_target_is_rejected() {
    let service = service();
    let err = assert_err!(service.start_inflation(-5, 10));
    assert!(matches!(err, InflationError::InvalidParameters(_)));
    assert_eq!(service.get_status().allocated_mb, 0);
}

#[tokio::test]
async fn test_non_positive_step_is_clamped() {
    let service = service();
    let handle = assert_ok!(service.start_inflation(2, -1));
    assert_ok!(handle.await.unwrap());
    assert_eq!(service.get_status().block_count, 2);
}

#[tokio::test]
async fn test_reset_reports_zero() {
    let service = service();
    assert_ok!(service.start_inflation(4, 4).unwrap().await.unwrap());

    assert_eq!(service.reset(), ResetResponse { allocated_mb: 0 });
    assert_eq!(
        service.get_status(),
        StatusResponse {
            allocated_mb: 0,
            block_count: 0
        }
    );
}

#[tokio::test]
async fn test_responses_render_as_json() {
    let service = service();
    assert_ok!(service.start_inflation(3, 2).unwrap().await.unwrap());

    let status = serde_json::to_value(service.get_status()).unwrap();
    assert_eq!(status, serde_json::json!({ "allocated_mb": 3, "block_count": 2 }));

    let reset = serde_json::to_value(service.reset()).unwrap();
    assert_eq!(reset, serde_json::json!({ "allocated_mb": 0 }));
}

#[tokio::test]
async fn test_memory_report_for_current_process() {
    let service = service();
    let report = service.memory_report().await;
    assert!(report.subtree_bytes >= report.own_bytes);
}
