//! 平台凭证仪式
//!
//! 按服务端指示选择创建（注册）或获取（断言）凭证，每份校验结果只用于一次仪式。

use crate::error::{Error, Result};
use crate::protocol::format_credential_options;
use crate::types::*;
use std::future::Future;
use tracing::{debug, info, warn};

/// 平台认证器
///
/// 对应浏览器的 `navigator.credentials`，实现方负责与本地认证器交互。
/// 用户取消、无可用认证器或超时均应返回 [`Error::Ceremony`]。
pub trait PlatformAuthenticator {
    /// 当前环境是否提供平台凭证接口
    fn is_supported(&self) -> bool {
        true
    }

    /// 创建新凭证
    fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
    ) -> impl Future<Output = Result<PublicKeyCredential>>;

    /// 获取已有凭证的断言
    fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
    ) -> impl Future<Output = Result<PublicKeyCredential>>;
}

/// 执行一次凭证仪式
///
/// 消耗校验结果，保证 challenge 不会被第二次仪式复用。
pub async fn perform_credential_ceremony<A>(authenticator: &A, result: ValidationResult) -> Result<PublicKeyCredential>
where
    A: PlatformAuthenticator,
{
    if !result.is_valid {
        return Err(Error::LinkInvalid("ceremony requires a validated link".to_string()));
    }

    let request = format_credential_options(&result)?;
    debug!("Ceremony challenge of {} bytes", request.challenge().len());

    let credential = match &request {
        CeremonyRequest::Create(options) => {
            info!("Creating new platform credential");
            authenticator.create(options).await
        }
        CeremonyRequest::Get(options) => {
            info!("Requesting assertion from platform credential");
            authenticator.get(options).await
        }
    }
    .map_err(|e| {
        warn!("Platform authenticator rejected ceremony: {}", e);
        match e {
            Error::Ceremony(_) => e,
            other => Error::Ceremony(other.to_string()),
        }
    })?;

    info!("Ceremony completed, credential id: {}", credential.id);
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAuthenticator {
        created: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
        asserted: Mutex<Vec<Vec<u8>>>,
        reject: bool,
    }

    impl PlatformAuthenticator for RecordingAuthenticator {
        async fn create(&self, options: &PublicKeyCredentialCreationOptions) -> Result<PublicKeyCredential> {
            if self.reject {
                return Err(Error::Ceremony("NotAllowedError".to_string()));
            }
            self.created
                .lock()
                .unwrap()
                .push((options.challenge.clone(), options.user.id.clone()));
            Ok(PublicKeyCredential::from_raw_id(vec![1, 1]))
        }

        async fn get(&self, options: &PublicKeyCredentialRequestOptions) -> Result<PublicKeyCredential> {
            if self.reject {
                return Err(Error::Network("authenticator unreachable".to_string()));
            }
            self.asserted.lock().unwrap().push(options.challenge.clone());
            Ok(PublicKeyCredential::from_raw_id(vec![2, 2]))
        }
    }

    fn validation(value: serde_json::Value) -> ValidationResult {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_uses_binary_challenge_and_user_id() {
        let authenticator = RecordingAuthenticator::default();
        let result = validation(json!({
            "isValid": true,
            "createNewCredential": true,
            "credentialOptions": { "publicKey": { "challenge": [1, 2, 3], "user": { "id": [9, 9] } } }
        }));

        let credential = perform_credential_ceremony(&authenticator, result).await.unwrap();
        assert_eq!(credential.raw_id, vec![1, 1]);

        let created = authenticator.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0], (vec![1, 2, 3], vec![9, 9]));
        assert!(authenticator.asserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let authenticator = RecordingAuthenticator::default();
        let result = validation(json!({
            "isValid": true,
            "createNewCredential": false,
            "credentialOptions": { "publicKey": { "challenge": [5, 6], "timeout": 60000 } }
        }));

        perform_credential_ceremony(&authenticator, result).await.unwrap();
        assert!(authenticator.created.lock().unwrap().is_empty());
        assert_eq!(*authenticator.asserted.lock().unwrap(), vec![vec![5, 6]]);
    }

    #[tokio::test]
    async fn test_rejection_is_ceremony_error() {
        let authenticator = RecordingAuthenticator {
            reject: true,
            ..Default::default()
        };
        let result = validation(json!({
            "isValid": true,
            "createNewCredential": false,
            "credentialOptions": { "publicKey": { "challenge": [5] } }
        }));

        let err = perform_credential_ceremony(&authenticator, result).await.unwrap_err();
        assert!(matches!(err, Error::Ceremony(_)));
    }

    #[tokio::test]
    async fn test_unvalidated_link_never_reaches_authenticator() {
        let authenticator = RecordingAuthenticator::default();

        let err = perform_credential_ceremony(&authenticator, ValidationResult::invalid())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LinkInvalid(_)));
        assert!(authenticator.created.lock().unwrap().is_empty());
        assert!(authenticator.asserted.lock().unwrap().is_empty());
    }
}
