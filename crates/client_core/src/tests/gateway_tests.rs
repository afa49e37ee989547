use super::*;

use std::{sync::Arc, time::Duration};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

const SEND_PATH: &str = "/api/v1.0/email/send";

#[derive(Clone)]
struct RelayState {
    tx: Arc<Mutex<Option<oneshot::Sender<RelaySendRequest>>>>,
    status: StatusCode,
    body: &'static str,
    delay: Duration,
}

async fn handle_send(
    State(state): State<RelayState>,
    Json(payload): Json<RelaySendRequest>,
) -> (StatusCode, &'static str) {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body)
}

async fn spawn_relay(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> (String, oneshot::Receiver<RelaySendRequest>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = RelayState {
        tx: Arc::new(Mutex::new(Some(tx))),
        status,
        body,
        delay,
    };
    let app = Router::new()
        .route(SEND_PATH, post(handle_send))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{SEND_PATH}"), rx)
}

fn settings_for(endpoint: String) -> RelaySettings {
    RelaySettings {
        endpoint,
        service_id: "service_abc".into(),
        template_id: "template_xyz".into(),
        public_key: "pk_123".into(),
        ..RelaySettings::default()
    }
}

fn sample_fields() -> FormFields {
    FormFields::new("Ada", "ada@example.com", "Hello from the site")
}

#[test]
fn construction_requires_credentials() {
    let err = EmailRelayGateway::new(RelaySettings::default())
        .err()
        .expect("incomplete settings must fail");
    assert!(err.to_string().contains("service_id"));
}

#[tokio::test]
async fn ok_acknowledgment_is_success_and_payload_carries_fields() {
    let (endpoint, payload_rx) = spawn_relay(StatusCode::OK, "OK", Duration::ZERO).await;
    let mut settings = settings_for(endpoint);
    settings.private_key = Some("sk_456".into());
    let gateway = EmailRelayGateway::new(settings).expect("gateway");

    gateway.send(&sample_fields()).await.expect("send");

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload.service_id, "service_abc");
    assert_eq!(payload.template_id, "template_xyz");
    assert_eq!(payload.user_id, "pk_123");
    assert_eq!(payload.access_token.as_deref(), Some("sk_456"));
    assert_eq!(
        payload.template_params,
        TemplateParams {
            from_name: "Ada".into(),
            reply_to: "ada@example.com".into(),
            to_name: "Prashant".into(),
            message: "Hello from the site".into(),
        }
    );
}

#[tokio::test]
async fn error_status_is_rejected_with_body() {
    let (endpoint, _rx) = spawn_relay(
        StatusCode::BAD_REQUEST,
        "The service ID is invalid",
        Duration::ZERO,
    )
    .await;
    let gateway = EmailRelayGateway::new(settings_for(endpoint)).expect("gateway");

    let err = gateway.send(&sample_fields()).await.expect_err("must fail");
    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 400,
            body: "The service ID is invalid".into(),
        }
    );
}

#[tokio::test]
async fn success_status_without_ack_is_failure() {
    let (endpoint, _rx) = spawn_relay(StatusCode::OK, "Queued", Duration::ZERO).await;
    let gateway = EmailRelayGateway::new(settings_for(endpoint)).expect("gateway");

    let err = gateway.send(&sample_fields()).await.expect_err("must fail");
    assert_eq!(err, GatewayError::UnexpectedAcknowledgment("Queued".into()));
}

#[tokio::test]
async fn slow_relay_times_out() {
    let (endpoint, _rx) = spawn_relay(StatusCode::OK, "OK", Duration::from_secs(5)).await;
    let mut settings = settings_for(endpoint);
    settings.timeout = Duration::from_millis(200);
    let gateway = EmailRelayGateway::new(settings).expect("gateway");

    let err = gateway.send(&sample_fields()).await.expect_err("must time out");
    assert_eq!(err, GatewayError::Timeout);
}

#[tokio::test]
async fn unreachable_relay_is_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let gateway = EmailRelayGateway::new(settings_for(format!("http://{addr}{SEND_PATH}")))
        .expect("gateway");
    let err = gateway.send(&sample_fields()).await.expect_err("must fail");
    assert!(matches!(err, GatewayError::Transport(_)), "unexpected: {err:?}");
}
