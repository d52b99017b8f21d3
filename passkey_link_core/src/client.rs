//! 链接认证 HTTP 客户端

use crate::error::{Error, Result};
use crate::types::*;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端 API 基础 URL
    pub api_url: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 是否验证 TLS 证书
    pub verify_tls: bool,
    /// 认证成功后跳转的机器人地址
    pub bot_url: String,
    /// 跳转延迟（毫秒）
    pub redirect_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api/".to_string(),
            timeout: 30,
            verify_tls: true,
            bot_url: "https://t.me/t_weather_wiz_bot".to_string(),
            redirect_delay_ms: 1500,
        }
    }
}

impl ClientConfig {
    /// 机器人深链接
    pub fn redirect_uri(&self) -> String {
        format!("tg://resolve?domain={}", self.bot_url)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// 链接认证客户端
pub struct AuthClient {
    config: ClientConfig,
    http_client: Client,
}

impl AuthClient {
    /// 创建新的客户端实例
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    /// 使用默认配置创建客户端
    pub fn with_api_url(api_url: &str) -> Result<Self> {
        let config = ClientConfig {
            api_url: api_url.to_string(),
            ..ClientConfig::default()
        };
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `POST <api>/<action>/` 的完整地址
    pub fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/", self.config.api_url.trim_end_matches('/'), action)
    }

    /// 校验深链接
    ///
    /// 参数不完整时直接返回无效结果，不发起网络请求。
    pub async fn validate_link(&self, link: &LinkParams) -> Result<ValidationResult> {
        if !link.is_complete() {
            warn!("Link is missing token or id, skipping validation request");
            return Ok(ValidationResult::invalid());
        }

        info!("Validating link for id: {}", link.id);
        let result: ValidationResult = self
            .post(
                "validateLink",
                &ValidateLinkRequest {
                    token: &link.token,
                    id: &link.id,
                },
            )
            .await?;

        debug!(
            "Link validation: valid={}, create_new_credential={}",
            result.is_valid, result.create_new_credential
        );
        Ok(result)
    }

    /// 提交凭证 ID 完成认证
    pub async fn authenticate_key(&self, credential_id: &str, link: &LinkParams) -> Result<AuthResult> {
        info!("Authenticating credential for id: {}", link.id);
        let result: AuthResult = self
            .post(
                "authenticateKey",
                &AuthenticateKeyRequest {
                    key: credential_id,
                    token: &link.token,
                    id: &link.id,
                },
            )
            .await?;

        debug!("Authentication result: {}", result.auth_success);
        Ok(result)
    }

    async fn post<B, R>(&self, action: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(action);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to connect to {}: {}", url, e)))?;

        // 检查 HTTP 状态码
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read response".to_string());
            warn!("HTTP {} from {}: {}", status, url, body);
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse response from {}: {}", url, e)))
    }
}
