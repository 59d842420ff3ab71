//! Graceful shutdown under in-flight load.

use std::time::{Duration, Instant};

use reqwest::StatusCode;

use rpc_gateway::config::GatewayConfig;
use rpc_gateway::health::HealthStatus;
use rpc_gateway::lifecycle::DrainOutcome;

mod common;

fn drain_config(timeout_ms: u64, quiescence_ms: u64) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.shutdown.timeout_ms = timeout_ms;
    config.shutdown.poll_interval_ms = 20;
    config.shutdown.quiescence_ms = quiescence_ms;
    config
}

async fn wait_for_in_flight(gateway: &common::TestGateway, expected: u64) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while gateway.in_flight.active() != expected {
        assert!(Instant::now() < deadline, "in-flight count never reached {expected}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_drain_waits_for_in_flight_requests() {
    const N: u64 = 5;
    let gateway = common::start_gateway(
        drain_config(5_000, 100),
        common::fixed_rpc(r#"{"ok":true}"#, Duration::from_millis(600)),
    )
    .await;
    let client = common::client();

    let pending: Vec<_> = (0..N)
        .map(|_| {
            let request = client.post(gateway.url("/api/svc/1.0/slow")).send();
            tokio::spawn(request)
        })
        .collect();

    wait_for_in_flight(&gateway, N).await;
    assert!(gateway.shutdown.trigger());

    // Yellow until the listener closes, which is after the slow calls finish.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(gateway.health.status(), HealthStatus::Yellow);
    let health_check = client.get(gateway.url("/health/check")).send().await.unwrap();
    assert_eq!(health_check.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health_check.text().await.unwrap(), "gateway is shutting down");

    for request in pending {
        let response = request.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), r#"{"ok":true,"status":1}"#);
    }

    tokio::time::timeout(Duration::from_secs(5), gateway.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    let report = gateway.shutdown.report().expect("shutdown sequence ran");
    assert_eq!(report.outcome, DrainOutcome::Drained);
    assert!(report.attempts < gateway.shutdown.policy().max_attempts());
    assert_eq!(gateway.in_flight.active(), 0);
}

#[tokio::test]
async fn test_drain_budget_exhausted() {
    const N: u64 = 2;
    let gateway = common::start_gateway(
        drain_config(100, 0),
        common::fixed_rpc("{}", Duration::from_millis(3_000)),
    )
    .await;
    let client = common::client();

    let pending: Vec<_> = (0..N)
        .map(|_| tokio::spawn(client.post(gateway.url("/api/svc/1.0/slow")).send()))
        .collect();

    wait_for_in_flight(&gateway, N).await;
    gateway.shutdown.trigger();

    // Connections outliving the drain get one more timeout, then the server returns
    // without waiting for their calls.
    tokio::time::timeout(Duration::from_millis(1_500), gateway.handle)
        .await
        .expect("server kept waiting for open connections")
        .unwrap()
        .unwrap();
    for request in &pending {
        assert!(!request.is_finished());
    }
    for request in pending {
        request.abort();
    }

    let report = gateway.shutdown.report().expect("shutdown sequence ran");
    assert_eq!(report.outcome, DrainOutcome::TimedOut { remaining: N });
    assert_eq!(report.attempts, 5);
}
