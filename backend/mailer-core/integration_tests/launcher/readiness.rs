use mailer_core::config::{ReadinessConfig, ReadinessProbe};
use mailer_core::error::launch::LaunchError;
use mailer_core::launcher::readiness::{check_health, check_port, wait_for_port, wait_for_service};

use crate::helpers::{free_port, test_config};

use std::time::{Duration, Instant};

use serial_test::serial;
use tokio::net::TcpListener;
use tokio::time::sleep;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn short_readiness(timeout: Duration) -> ReadinessConfig {
    ReadinessConfig {
        timeout,
        initial_interval: Duration::from_millis(20),
        max_interval: Duration::from_millis(80),
        ..ReadinessConfig::default()
    }
}

/// **VALUE**: The readiness wait fails with a timeout when nothing ever listens.
///
/// **WHY THIS MATTERS**: A service that crashes silently or binds another port
/// must not hang the caller forever.
///
/// **BUG THIS CATCHES**: Would catch an unbounded backoff (`max_elapsed_time: None`).
#[tokio::test]
#[serial]
async fn given_no_listener_when_waiting_for_port_then_returns_readiness_timeout() {
    // GIVEN
    let address = format!("127.0.0.1:{}", free_port());
    let readiness = short_readiness(Duration::from_millis(300));
    let started = Instant::now();

    // WHEN
    let result = wait_for_port(&address, &readiness).await;

    // THEN
    assert!(matches!(result, Err(LaunchError::ReadinessTimeout { .. })));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "Timeout should be honoured, took {:?}",
        started.elapsed()
    );
}

/// **VALUE**: The wait returns as soon as a listener appears mid-poll.
#[tokio::test]
#[serial]
async fn given_listener_appearing_later_when_waiting_for_port_then_returns_ok() {
    // GIVEN: A listener bound 200ms after the wait starts
    let port = free_port();
    let address = format!("127.0.0.1:{port}");
    let late_listener = tokio::spawn(async move {
        sleep(Duration::from_millis(200)).await;
        TcpListener::bind(("127.0.0.1", port)).await
    });
    let readiness = short_readiness(Duration::from_secs(5));

    // WHEN
    let result = wait_for_port(&address, &readiness).await;

    // THEN
    assert!(result.is_ok(), "Expected ready, got {result:?}");
    drop(late_listener.await);
}

#[tokio::test]
async fn given_unreachable_port_when_check_port_called_then_returns_false() {
    let address = format!("127.0.0.1:{}", free_port());

    assert!(!check_port(&address).await);
}

/// **VALUE**: Verifies `check_health()` handles connection failures gracefully.
#[tokio::test]
async fn given_unreachable_url_when_check_health_called_then_returns_false() {
    let base_url = format!("http://127.0.0.1:{}", free_port());

    assert!(!check_health(&base_url, "/").await);
}

#[tokio::test]
async fn given_malformed_url_when_check_health_called_then_returns_false() {
    assert!(!check_health("not-a-valid-url", "/").await);
    assert!(!check_health("", "").await);
}

/// **VALUE**: Verifies the HTTP probe distinguishes 2xx from error pages.
///
/// **WHY THIS MATTERS**: A service that is up but failing (500 on `/`) should not
/// count as ready when the HTTP probe is configured.
#[tokio::test]
async fn given_stub_service_when_check_health_called_then_follows_status() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hello!</h1>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // WHEN / THEN
    assert!(check_health(&server.uri(), "/").await);
    assert!(!check_health(&server.uri(), "/broken").await);
}

/// **VALUE**: A probe that hangs cannot stretch the readiness window.
///
/// **WHY THIS MATTERS**: Each HTTP probe may wait seconds for a response. A
/// service that accepts connections but never answers would otherwise push the
/// launch far past the configured timeout.
///
/// **BUG THIS CATCHES**: Would catch a probe being awaited without a cap on
/// the time left in the window.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_service_that_never_answers_when_http_probe_waits_then_timeout_is_honoured() {
    // GIVEN: A listener that accepts connections and never responds
    let silent = TcpListener::bind("127.0.0.1:0").await.expect("listener");
    let port = silent.local_addr().unwrap().port();
    let mut config = test_config(port, Duration::from_millis(300));
    config.readiness.probe = ReadinessProbe::Http;
    let mut child = tokio::process::Command::new("sleep")
        .arg("30")
        .kill_on_drop(true)
        .spawn()
        .expect("sleep should be available");
    let address = config.address();
    let base_url = config.base_url();
    let started = Instant::now();

    // WHEN
    let result = wait_for_service(&mut child, &config, &address, &base_url).await;

    // THEN
    assert!(matches!(result, Err(LaunchError::ReadinessTimeout { .. })));
    assert!(
        started.elapsed() < Duration::from_millis(1500),
        "Readiness overran its window: {:?}",
        started.elapsed()
    );
    drop(silent);
}

/// **VALUE**: The HTTP probe only reports ready on a 2xx from the health path.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_http_probe_when_health_path_answers_then_wait_for_service_succeeds() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let port = server.address().port();
    let mut config = test_config(port, Duration::from_secs(5));
    config.readiness.probe = ReadinessProbe::Http;
    config.readiness.health_path = "/health".to_string();
    let mut child = tokio::process::Command::new("sleep")
        .arg("30")
        .kill_on_drop(true)
        .spawn()
        .expect("sleep should be available");
    let address = config.address();
    let base_url = config.base_url();

    // WHEN
    let result = wait_for_service(&mut child, &config, &address, &base_url).await;

    // THEN
    assert!(result.is_ok(), "Expected ready, got {result:?}");
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_http_probe_when_health_path_fails_then_wait_for_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let mut config = test_config(server.address().port(), Duration::from_millis(400));
    config.readiness.probe = ReadinessProbe::Http;
    let mut child = tokio::process::Command::new("sleep")
        .arg("30")
        .kill_on_drop(true)
        .spawn()
        .expect("sleep should be available");
    let address = config.address();
    let base_url = config.base_url();

    let result = wait_for_service(&mut child, &config, &address, &base_url).await;

    assert!(matches!(result, Err(LaunchError::ReadinessTimeout { .. })));
}
