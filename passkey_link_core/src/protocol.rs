//! 凭证选项编解码
//!
//! 服务端以 JSON 数字数组传输 challenge 与 user.id，平台凭证接口需要二进制缓冲区：
//! 1. `numeric_array_to_buffer` 把单个数字数组映射为字节
//! 2. `format_credential_options` 按 `createNewCredential` 生成创建或获取选项
//! 3. 凭证 ID 使用 base64url（无填充）编码

use crate::error::{Error, Result};
use crate::types::{
    CeremonyRequest, PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    ValidationResult,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use serde_json::Value;

/// 数字数组 → 字节缓冲区
///
/// 每个元素必须是 0..=255 的整数。
pub fn numeric_array_to_buffer(value: &Value) -> Result<Vec<u8>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::Encoding(format!("expected numeric array, got {}", value)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| Error::Encoding(format!("element {} is not a byte: {}", index, item)))
        })
        .collect()
}

/// serde 适配：以数字数组形式反序列化字节字段
pub(crate) mod byte_array {
    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        super::numeric_array_to_buffer(&value).map_err(de::Error::custom)
    }
}

/// 根据校验结果生成本次仪式的选项
///
/// 仅在注册时要求 `user.id`。
pub fn format_credential_options(result: &ValidationResult) -> Result<CeremonyRequest> {
    let raw = result
        .credential_options
        .as_ref()
        .ok_or_else(|| Error::Encoding("missing credentialOptions".to_string()))?;

    if result.create_new_credential {
        let options: PublicKeyCredentialCreationOptions = serde_json::from_value(raw.public_key.clone())
            .map_err(|e| Error::Encoding(format!("creation options: {}", e)))?;
        Ok(CeremonyRequest::Create(options))
    } else {
        let options: PublicKeyCredentialRequestOptions = serde_json::from_value(raw.public_key.clone())
            .map_err(|e| Error::Encoding(format!("request options: {}", e)))?;
        Ok(CeremonyRequest::Get(options))
    }
}

/// Base64url 编码（无填充）
pub fn base64url_encode(data: &[u8]) -> String {
    BASE64URL.encode(data)
}

/// Base64url 解码（无填充）
pub fn base64url_decode(data: &str) -> Result<Vec<u8>> {
    BASE64URL
        .decode(data)
        .map_err(|e| Error::Encoding(format!("base64url: {}", e)))
}
