//! 集成测试 - 使用模拟后台服务

use passkey_link_core::*;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingAuthenticator {
    created: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    asserted: Mutex<usize>,
}

impl PlatformAuthenticator for RecordingAuthenticator {
    async fn create(&self, options: &PublicKeyCredentialCreationOptions) -> Result<PublicKeyCredential> {
        self.created
            .lock()
            .unwrap()
            .push((options.challenge.clone(), options.user.id.clone()));
        Ok(PublicKeyCredential::from_raw_id(b"new-credential".to_vec()))
    }

    async fn get(&self, _options: &PublicKeyCredentialRequestOptions) -> Result<PublicKeyCredential> {
        *self.asserted.lock().unwrap() += 1;
        Ok(PublicKeyCredential::from_raw_id(b"existing".to_vec()))
    }
}

#[derive(Default)]
struct RecordingUi {
    toasts: Mutex<Vec<Toast>>,
    enabled: Mutex<Vec<bool>>,
    busy: Mutex<Vec<bool>>,
    redirects: Mutex<Vec<(String, Duration)>>,
}

impl UiAdapter for RecordingUi {
    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }

    fn set_action_enabled(&self, enabled: bool) {
        self.enabled.lock().unwrap().push(enabled);
    }

    fn set_busy(&self, busy: bool) {
        self.busy.lock().unwrap().push(busy);
    }

    fn schedule_redirect(&self, uri: &str, delay: Duration) {
        self.redirects.lock().unwrap().push((uri.to_string(), delay));
    }
}

fn get_client(server: &MockServer) -> AuthClient {
    let config = ClientConfig {
        api_url: format!("{}/api/", server.uri()),
        timeout: 5,
        verify_tls: false,
        ..ClientConfig::default()
    };
    AuthClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn test_registration_from_page_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validateLink/"))
        .and(body_json(json!({"token": "abc", "id": "42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isValid": true,
            "createNewCredential": true,
            "credentialOptions": { "publicKey": { "challenge": [1, 2, 3], "user": { "id": [9, 9] } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credential_id = PublicKeyCredential::from_raw_id(b"new-credential".to_vec()).id;
    Mock::given(method("POST"))
        .and(path("/api/authenticateKey/"))
        .and(body_json(json!({"key": credential_id, "token": "abc", "id": "42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"authSuccess": true})))
        .expect(1)
        .mount(&server)
        .await;

    let link = LinkParams::from_url("https://auth.example.com/index.html?token=abc&id=42").unwrap();
    let flow = AuthFlow::new(
        get_client(&server),
        RecordingAuthenticator::default(),
        RecordingUi::default(),
        link,
    );

    assert_eq!(flow.load().await, LoadOutcome::Ready);
    assert_eq!(flow.authenticate().await, AttemptOutcome::Authenticated);

    let created = flow.authenticator().created.lock().unwrap().clone();
    assert_eq!(created, vec![(vec![1, 2, 3], vec![9, 9])]);
    assert_eq!(*flow.authenticator().asserted.lock().unwrap(), 0);

    let ui = flow.ui();
    assert_eq!(*ui.enabled.lock().unwrap(), vec![true]);
    assert_eq!(*ui.busy.lock().unwrap(), vec![true, false]);

    let toasts = ui.toasts.lock().unwrap();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);

    let redirects = ui.redirects.lock().unwrap();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].0, "tg://resolve?domain=https://t.me/t_weather_wiz_bot");
    assert_eq!(redirects[0].1, Duration::from_millis(1500));
}

#[tokio::test]
async fn test_validation_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validateLink/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = get_client(&server);
    let err = client.validate_link(&LinkParams::new("abc", "42")).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert!(err.kind().is_recoverable());

    let flow = AuthFlow::new(client, RecordingAuthenticator::default(), RecordingUi::default(), LinkParams::new("abc", "42"));
    assert_eq!(flow.load().await, LoadOutcome::Failed(ErrorKind::Transport));
    assert_eq!(*flow.ui().enabled.lock().unwrap(), vec![false]);
    assert_eq!(flow.ui().toasts.lock().unwrap()[0].message, messages::LOAD_CONNECTION_FAILED);
}

#[tokio::test]
async fn test_malformed_response_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authenticateKey/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = get_client(&server);
    let err = client
        .authenticate_key("Y3JlZA", &LinkParams::new("abc", "42"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_unreachable_backend() {
    // 端口 9 上没有服务
    let client = AuthClient::with_api_url("http://127.0.0.1:9/api/").unwrap();
    let err = client.validate_link(&LinkParams::new("abc", "42")).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}
