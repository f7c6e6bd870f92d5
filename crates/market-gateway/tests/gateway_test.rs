use market_gateway::mock::{create_mock_transport, expect_request, MockTransport};
use market_gateway::{
    ApiRequest, ApiResponse, BreakerConfig, CancelHandle, CircuitState, Gateway, GatewayConfig,
    GatewayError, Method, RawResponse, TransportError,
};
use serde_json::json;
use std::time::Duration;

const PING: &str = "/products/products_viewsets/";

fn config(threshold: u32) -> GatewayConfig {
    GatewayConfig {
        breaker: BreakerConfig {
            failure_threshold: threshold,
            initial_retry_delay_ms: 1_000,
            max_retry_delay_ms: 30_000,
        },
        ..GatewayConfig::with_base_url("http://api.test/")
    }
}

async fn fail_n(gateway: &Gateway, mock: &MockTransport, n: u32) {
    for _ in 0..n {
        mock.expect(Method::Get, PING)
            .respond(500, json!({"error": "boom"}));
        let response = gateway.call(ApiRequest::get(PING)).await.unwrap();
        assert!(!response.is_success());
    }
}

#[tokio::test(start_paused = true)]
async fn trips_at_threshold_and_rejects_without_sending() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(3), mock.clone());

    fail_n(&gateway, &mock, 2).await;
    assert_eq!(gateway.snapshot().state, CircuitState::Closed);

    fail_n(&gateway, &mock, 1).await;
    assert_eq!(gateway.snapshot().state, CircuitState::Open);

    let rejected = gateway.call(ApiRequest::get(PING)).await;
    assert!(matches!(rejected, Err(GatewayError::CircuitOpen { .. })));
    assert_eq!(mock.call_count(), 3);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn successful_probe_closes_the_circuit() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(2), mock.clone());
    fail_n(&gateway, &mock, 2).await;

    assert_eq!(gateway.snapshot().next_retry_delay, Duration::from_secs(2));
    tokio::time::advance(Duration::from_millis(1_999)).await;
    assert!(gateway.call(ApiRequest::get(PING)).await.is_err());

    tokio::time::advance(Duration::from_millis(1)).await;
    mock.expect(Method::Get, PING).respond(200, json!([]));
    let response = gateway.call(ApiRequest::get(PING)).await.unwrap();
    assert!(response.is_success());

    let snapshot = gateway.snapshot();
    assert_eq!(snapshot.state, CircuitState::Closed);
    assert_eq!(snapshot.failure_count, 0);
    assert_eq!(snapshot.opened_at, None);
    assert_eq!(snapshot.next_retry_delay, Duration::from_secs(1));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn failed_probe_reopens_with_doubled_window() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(1), mock.clone());
    fail_n(&gateway, &mock, 1).await;

    tokio::time::advance(Duration::from_secs(2)).await;
    fail_n(&gateway, &mock, 1).await;

    let snapshot = gateway.snapshot();
    assert_eq!(snapshot.state, CircuitState::Open);
    assert_eq!(snapshot.next_retry_delay, Duration::from_secs(4));

    tokio::time::advance(Duration::from_millis(3_500)).await;
    match gateway.call(ApiRequest::get(PING)).await {
        Err(GatewayError::CircuitOpen { retry_in }) => {
            assert_eq!(retry_in, Duration::from_millis(500))
        }
        other => panic!("expected CircuitOpen, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn backoff_is_capped() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(1), mock.clone());
    fail_n(&gateway, &mock, 1).await;

    let mut windows = vec![gateway.snapshot().next_retry_delay];
    for _ in 0..6 {
        let window = gateway.snapshot().next_retry_delay;
        tokio::time::advance(window).await;
        fail_n(&gateway, &mock, 1).await;
        windows.push(gateway.snapshot().next_retry_delay);
    }
    let secs: Vec<u64> = windows.iter().map(Duration::as_secs).collect();
    assert_eq!(secs, vec![2, 4, 8, 16, 30, 30, 30]);
}

#[tokio::test]
async fn cancel_after_completion_is_a_no_op() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(3), mock.clone());
    let cancel = CancelHandle::new();

    mock.expect(Method::Get, PING).respond(200, json!([{"id": 1}]));
    let response = gateway
        .call_with_cancel(ApiRequest::get(PING), &cancel)
        .await
        .unwrap();
    let before = gateway.snapshot();

    cancel.cancel();
    cancel.cancel();

    assert_eq!(response.data(), Some(&json!([{"id": 1}])));
    assert_eq!(gateway.snapshot(), before);
}

#[tokio::test]
async fn pre_cancelled_call_never_reaches_transport() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(3), mock.clone());
    let cancel = CancelHandle::new();
    cancel.cancel();

    let result = gateway.call_with_cancel(ApiRequest::get(PING), &cancel).await;
    assert_eq!(result, Err(GatewayError::Cancelled));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn cancelling_in_flight_leaves_breaker_untouched() {
    let (transport, mut rx) = create_mock_transport(4);
    let gateway = Gateway::new(config(1), transport);
    let cancel = CancelHandle::new();

    let call = tokio::spawn({
        let gateway = gateway.clone();
        let cancel = cancel.clone();
        async move { gateway.call_with_cancel(ApiRequest::get(PING), &cancel).await }
    });

    let (request, _respond_to) = expect_request(&mut rx).await.unwrap();
    assert_eq!(request.url, "http://api.test/products/products_viewsets/");
    cancel.cancel();

    assert_eq!(call.await.unwrap(), Err(GatewayError::Cancelled));
    assert_eq!(gateway.snapshot().failure_count, 0);
    assert_eq!(gateway.snapshot().state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn cancelled_probe_frees_the_probe_slot() {
    let (transport, mut rx) = create_mock_transport(4);
    let gateway = Gateway::new(config(1), transport);

    let first = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to.send(Ok(RawResponse::new(503, None))).unwrap();
    first.await.unwrap().unwrap();
    assert_eq!(gateway.snapshot().state, CircuitState::Open);

    tokio::time::advance(Duration::from_secs(2)).await;
    let cancel = CancelHandle::new();
    let probe = tokio::spawn({
        let gateway = gateway.clone();
        let cancel = cancel.clone();
        async move { gateway.call_with_cancel(ApiRequest::get(PING), &cancel).await }
    });
    let _held = expect_request(&mut rx).await.unwrap();

    let concurrent = gateway.call(ApiRequest::get(PING)).await;
    assert!(matches!(concurrent, Err(GatewayError::CircuitOpen { .. })));

    cancel.cancel();
    assert_eq!(probe.await.unwrap(), Err(GatewayError::Cancelled));

    let retry = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to.send(Ok(RawResponse::new(200, None))).unwrap();
    assert!(retry.await.unwrap().unwrap().is_success());
    assert_eq!(gateway.snapshot().state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn timed_out_half_open_call_does_not_wedge_the_breaker() {
    let (transport, mut rx) = create_mock_transport(4);
    let gateway = Gateway::new(config(1), transport);

    let first = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to.send(Ok(RawResponse::new(503, None))).unwrap();
    first.await.unwrap().unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    let timed_out = tokio::time::timeout(
        Duration::from_millis(10),
        gateway.call(ApiRequest::get(PING)),
    )
    .await;
    assert!(timed_out.is_err());
    let (_, _abandoned) = expect_request(&mut rx).await.unwrap();

    let snapshot = gateway.snapshot();
    assert_eq!(snapshot.state, CircuitState::Open);
    assert_eq!(snapshot.failure_count, 1);
    assert_eq!(snapshot.next_retry_delay, Duration::from_secs(2));

    let retry = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to.send(Ok(RawResponse::new(200, None))).unwrap();
    assert!(retry.await.unwrap().unwrap().is_success());
    assert_eq!(gateway.snapshot().state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn aborted_half_open_task_frees_the_slot() {
    let (transport, mut rx) = create_mock_transport(4);
    let gateway = Gateway::new(config(1), transport);

    let first = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to
        .send(Err(TransportError::Timeout("read timed out".into())))
        .unwrap();
    first.await.unwrap().unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    let probe = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let _held = expect_request(&mut rx).await.unwrap();
    probe.abort();
    assert!(probe.await.unwrap_err().is_cancelled());

    let retry = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.call(ApiRequest::get(PING)).await }
    });
    let (_, respond_to) = expect_request(&mut rx).await.unwrap();
    respond_to.send(Ok(RawResponse::new(204, None))).unwrap();
    assert!(retry.await.unwrap().unwrap().is_success());
}

#[tokio::test]
async fn success_status_wins_over_error_body() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(1), mock.clone());

    mock.expect(Method::Post, "/cart/cart_operations/add-item-to-cart/")
        .respond(200, json!({"error": "looks bad but is not"}));
    let response = gateway
        .call(ApiRequest::post("/cart/cart_operations/add-item-to-cart/"))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(gateway.snapshot().failure_count, 0);
}

#[tokio::test]
async fn network_error_is_a_statusless_failure() {
    let mock = MockTransport::new();
    let gateway = Gateway::new(config(5), mock.clone());

    mock.expect(Method::Get, PING)
        .fail(TransportError::Connect("connection refused".into()));
    let response = gateway.call(ApiRequest::get(PING)).await.unwrap();

    assert_eq!(
        response,
        ApiResponse::Failure {
            error: None,
            status: None
        }
    );
    assert_eq!(gateway.snapshot().failure_count, 1);
}

#[tokio::test]
async fn resolves_headers_credentials_and_absolute_urls() {
    let mock = MockTransport::new();
    let mut config = config(5);
    config
        .default_headers
        .insert("Accept".into(), "application/json".into());
    config
        .default_headers
        .insert("X-Client".into(), "storefront".into());
    let gateway = Gateway::new(config, mock.clone());

    mock.expect(Method::Get, PING).respond_empty(204);
    mock.expect(Method::Get, "https://cdn.test/banner.json")
        .respond(200, json!({}));

    gateway
        .call(
            ApiRequest::get(PING)
                .with_header("X-Client", "admin")
                .with_credentials(false)
                .with_query("page", "2"),
        )
        .await
        .unwrap();
    gateway
        .call(ApiRequest::get("https://cdn.test/banner.json"))
        .await
        .unwrap();

    let calls = mock.calls();
    assert_eq!(calls[0].url, "http://api.test/products/products_viewsets/");
    assert_eq!(calls[0].headers["X-Client"], "admin");
    assert_eq!(calls[0].headers["Accept"], "application/json");
    assert!(!calls[0].with_credentials);
    assert_eq!(calls[0].query, vec![("page".to_string(), "2".to_string())]);
    assert_eq!(calls[1].url, "https://cdn.test/banner.json");
    assert!(calls[1].with_credentials);
    mock.verify();
}
