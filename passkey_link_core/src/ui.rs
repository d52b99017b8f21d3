//! 界面适配层
//!
//! 把页面上的按钮、加载动画、提示框与跳转抽象为 [`UiAdapter`]，流程逻辑不直接接触界面。

use std::time::Duration;

/// 提示文案
pub mod messages {
    pub const UNSUPPORTED_CLIENT: &str =
        "Error: unsupported client, please try another browser or device.";
    pub const MISSING_LINK_PARAMS: &str = "Invalid link, open the one you received from the bot.";
    pub const LINK_REJECTED: &str =
        "Error: invalid link, request a new one and make sure to use the latest one you received.";
    pub const LOAD_CONNECTION_FAILED: &str =
        "Error connecting to the server, please try again later.";
    pub const CONNECTION_ERROR: &str =
        "There was a problem connecting to the server, try again later.";
    pub const AUTH_ERROR: &str = "Authentication error, please try again.";
    pub const AUTH_FAILED: &str = "Authentication failed, device not registered.";
}

/// 提示类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Success,
}

/// 一条短暂显示的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

impl Toast {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);
    pub const SUCCESS_DURATION: Duration = Duration::from_secs(60);

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            duration: Self::SUCCESS_DURATION,
        }
    }

    /// 认证成功提示，附带跳转失败时的备用链接
    pub fn authenticated(bot_url: &str) -> Self {
        Self::success(format!(
            "Authentication successful, redirecting to Telegram. If nothing happens, open {}",
            bot_url
        ))
    }
}

/// 界面适配器
#[cfg_attr(test, mockall::automock)]
pub trait UiAdapter {
    /// 显示提示
    fn show_toast(&self, toast: Toast);

    /// 启用或禁用操作按钮
    fn set_action_enabled(&self, enabled: bool);

    /// 切换加载状态；`false` 时按钮恢复为可用且显示原文本
    fn set_busy(&self, busy: bool);

    /// 延迟跳转到外部链接
    fn schedule_redirect(&self, uri: &str, delay: Duration);
}
