//! 数据类型定义

use crate::error::{Error, Result};
use crate::protocol::{base64url_encode, byte_array};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// 深链接参数
///
/// 页面加载时从查询参数中提取，整个页面生命周期内不可变。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkParams {
    pub token: String,
    pub id: String,
}

impl LinkParams {
    pub fn new(token: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            id: id.into(),
        }
    }

    /// 从页面 URL 中解析 `token` 与 `id` 查询参数
    ///
    /// 缺失的参数以空字符串表示，由 [`LinkParams::is_complete`] 判定。
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::InvalidParam(format!("{}: {}", url, e)))?;

        let mut params = LinkParams::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token" => params.token = value.into_owned(),
                "id" => params.id = value.into_owned(),
                _ => {}
            }
        }
        Ok(params)
    }

    /// 两个参数均存在且非空
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.id.is_empty()
    }
}

/// validateLink 请求体
#[derive(Debug, Serialize)]
pub struct ValidateLinkRequest<'a> {
    pub token: &'a str,
    pub id: &'a str,
}

/// authenticateKey 请求体
#[derive(Debug, Serialize)]
pub struct AuthenticateKeyRequest<'a> {
    pub key: &'a str,
    pub token: &'a str,
    pub id: &'a str,
}

/// 链接校验结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub create_new_credential: bool,
    #[serde(default)]
    pub credential_options: Option<RawCredentialOptions>,
}

impl ValidationResult {
    /// 无需访问网络即可判定的无效结果
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// 服务端下发的原始凭证选项，字节字段仍是数字数组
#[derive(Debug, Clone, Deserialize)]
pub struct RawCredentialOptions {
    #[serde(rename = "publicKey")]
    pub public_key: serde_json::Value,
}

/// 认证结果
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResult {
    #[serde(rename = "authSuccess")]
    pub auth_success: bool,
}

/// 依赖方信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelyingParty {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// 用户实体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    #[serde(with = "byte_array")]
    pub id: Vec<u8>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// 公钥算法参数
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialParameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub alg: i64,
}

/// 认证器选择条件
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    #[serde(default)]
    pub resident_key: Option<String>,
    #[serde(default)]
    pub user_verification: Option<String>,
}

/// 凭证描述符
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "byte_array")]
    pub id: Vec<u8>,
    #[serde(default)]
    pub transports: Vec<String>,
}

/// 凭证创建选项（注册）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialCreationOptions {
    #[serde(with = "byte_array")]
    pub challenge: Vec<u8>,
    #[serde(default)]
    pub rp: RelyingParty,
    pub user: UserEntity,
    #[serde(default)]
    pub pub_key_cred_params: Vec<CredentialParameter>,
    #[serde(default)]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub attestation: Option<String>,
}

/// 凭证获取选项（断言）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialRequestOptions {
    #[serde(with = "byte_array")]
    pub challenge: Vec<u8>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub rp_id: Option<String>,
    #[serde(default)]
    pub allow_credentials: Vec<CredentialDescriptor>,
    #[serde(default)]
    pub user_verification: Option<String>,
}

/// 一次凭证仪式的输入
#[derive(Debug, Clone)]
pub enum CeremonyRequest {
    Create(PublicKeyCredentialCreationOptions),
    Get(PublicKeyCredentialRequestOptions),
}

impl CeremonyRequest {
    pub fn challenge(&self) -> &[u8] {
        match self {
            CeremonyRequest::Create(options) => &options.challenge,
            CeremonyRequest::Get(options) => &options.challenge,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, CeremonyRequest::Create(_))
    }
}

/// 平台认证器返回的凭证
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredential {
    /// rawId 的 base64url（无填充）编码
    pub id: String,
    pub raw_id: Vec<u8>,
}

impl PublicKeyCredential {
    pub fn from_raw_id(raw_id: Vec<u8>) -> Self {
        Self {
            id: base64url_encode(&raw_id),
            raw_id,
        }
    }
}
