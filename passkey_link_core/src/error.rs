//! 错误类型定义

use thiserror::Error;

/// 错误类别
///
/// 每个 [`Error`] 都归入以下三类之一，界面层按类别选择提示文案。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 链接无效：用户需要重新获取链接
    LinkInvalid,
    /// 传输错误：网络失败或 HTTP 非成功状态，可稍后重试
    Transport,
    /// 凭证仪式错误：平台拒绝或服务端认证失败，本次尝试终止
    Ceremony,
}

impl ErrorKind {
    /// 是否属于可恢复错误
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorKind::Transport)
    }
}

/// 错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 链接缺少参数或被服务端拒绝
    #[error("Invalid link: {0}")]
    LinkInvalid(String),

    /// 网络错误
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 状态错误
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// 平台认证器拒绝了凭证创建或获取
    #[error("Credential ceremony rejected: {0}")]
    Ceremony(String),

    /// 服务端拒绝了提交的凭证
    #[error("Authentication rejected by server")]
    AuthRejected,

    /// 编解码错误
    #[error("Encoding/Decoding error: {0}")]
    Encoding(String),

    /// 参数错误
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}

impl Error {
    /// 错误所属类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::LinkInvalid(_) | Error::InvalidParam(_) => ErrorKind::LinkInvalid,
            Error::Network(_) | Error::Status { .. } => ErrorKind::Transport,
            Error::Ceremony(_) | Error::AuthRejected | Error::Encoding(_) => ErrorKind::Ceremony,
        }
    }
}

/// 结果类型
pub type Result<T> = std::result::Result<T, Error>;
