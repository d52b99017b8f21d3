//! 深链接 Passkey 认证客户端核心库
//!
//! 驱动机器人绑定流程中的平台凭证认证：
//! - 校验深链接（token/id）
//! - 按服务端选项执行凭证创建或获取
//! - 提交凭证 ID 并在成功后跳转回机器人

pub mod ceremony;
pub mod client;
pub mod error;
pub mod flow;
pub mod protocol;
pub mod types;
pub mod ui;

pub use ceremony::{perform_credential_ceremony, PlatformAuthenticator};
pub use client::{AuthClient, ClientConfig};
pub use error::{Error, ErrorKind, Result};
pub use flow::{AttemptOutcome, AuthFlow, LoadOutcome};
pub use protocol::{format_credential_options, numeric_array_to_buffer};
pub use types::*;
pub use ui::{messages, Toast, ToastKind, UiAdapter};
