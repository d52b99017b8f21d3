//! 页面认证流程
//!
//! 流程：
//! 1. 加载：校验深链接，无效则提示并保持按钮禁用，有效则启用按钮
//! 2. 点击：凭证仪式 → authenticateKey → 按 authSuccess 提示并跳转
//! 3. 任一步骤出错即中止后续步骤，结束时按钮总是恢复为可用且非加载状态

use crate::ceremony::{perform_credential_ceremony, PlatformAuthenticator};
use crate::client::AuthClient;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{LinkParams, ValidationResult};
use crate::ui::{messages, Toast, UiAdapter};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// 页面加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 链接有效，按钮已启用
    Ready,
    /// 链接缺少参数或被服务端拒绝
    Invalid,
    /// 校验请求失败
    Failed(ErrorKind),
}

/// 一次点击的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 认证成功并已安排跳转
    Authenticated,
    /// 服务端返回 authSuccess=false
    Rejected,
    /// 某一步骤出错
    Failed(ErrorKind),
    /// 按钮未启用或仍有进行中的仪式
    Ignored,
}

/// 链接认证流程
pub struct AuthFlow<A, U> {
    client: AuthClient,
    authenticator: A,
    ui: U,
    link: LinkParams,
    /// 尚未使用的校验结果（含 challenge）
    pending: RwLock<Option<ValidationResult>>,
    ready: AtomicBool,
    busy: AtomicBool,
}

impl<A, U> AuthFlow<A, U>
where
    A: PlatformAuthenticator,
    U: UiAdapter,
{
    pub fn new(client: AuthClient, authenticator: A, ui: U, link: LinkParams) -> Self {
        Self {
            client,
            authenticator,
            ui,
            link,
            pending: RwLock::new(None),
            ready: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    pub fn link(&self) -> &LinkParams {
        &self.link
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// 按钮是否已启用
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// 页面加载
    pub async fn load(&self) -> LoadOutcome {
        if !self.authenticator.is_supported() {
            warn!("Platform credential API is not available");
            self.ui.show_toast(Toast::error(messages::UNSUPPORTED_CLIENT));
        }

        if !self.link.is_complete() {
            warn!("Link is missing token or id");
            self.disable(messages::MISSING_LINK_PARAMS);
            return LoadOutcome::Invalid;
        }

        match self.client.validate_link(&self.link).await {
            Ok(result) if result.is_valid => {
                *self.pending.write().await = Some(result);
                self.ready.store(true, Ordering::SeqCst);
                self.ui.set_action_enabled(true);
                info!("Link is valid, action enabled");
                LoadOutcome::Ready
            }
            Ok(_) => {
                warn!("Server rejected link for id: {}", self.link.id);
                self.disable(messages::LINK_REJECTED);
                LoadOutcome::Invalid
            }
            Err(e) => {
                error!("Link validation failed: {}", e);
                self.disable(messages::LOAD_CONNECTION_FAILED);
                LoadOutcome::Failed(e.kind())
            }
        }
    }

    /// 用户点击认证按钮
    pub async fn authenticate(&self) -> AttemptOutcome {
        if !self.is_ready() {
            warn!("Action is disabled, ignoring click");
            return AttemptOutcome::Ignored;
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            warn!("Ceremony already in flight, ignoring click");
            return AttemptOutcome::Ignored;
        }

        self.ui.set_busy(true);
        let outcome = match self.run_attempt().await {
            Ok(true) => {
                let config = self.client.config();
                info!("Authentication succeeded, redirecting to bot");
                self.ui.show_toast(Toast::authenticated(&config.bot_url));
                self.ui.schedule_redirect(&config.redirect_uri(), config.redirect_delay());
                AttemptOutcome::Authenticated
            }
            Ok(false) => {
                warn!("Server rejected credential");
                self.ui.show_toast(Toast::error(messages::AUTH_FAILED));
                AttemptOutcome::Rejected
            }
            Err(e) => {
                error!("Authentication attempt failed: {}", e);
                let message = match e.kind() {
                    ErrorKind::Transport => messages::CONNECTION_ERROR,
                    ErrorKind::LinkInvalid => messages::LINK_REJECTED,
                    ErrorKind::Ceremony => messages::AUTH_ERROR,
                };
                self.ui.show_toast(Toast::error(message));
                AttemptOutcome::Failed(e.kind())
            }
        };

        self.ui.set_busy(false);
        if outcome == AttemptOutcome::Failed(ErrorKind::LinkInvalid) {
            self.ready.store(false, Ordering::SeqCst);
            self.ui.set_action_enabled(false);
        }
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_attempt(&self) -> Result<bool> {
        let pending = self.pending.write().await.take();
        let result = match pending {
            Some(result) => result,
            None => {
                // 上一次的 challenge 已使用，重新校验获取新的
                info!("Refreshing credential options for retry");
                let result = self.client.validate_link(&self.link).await?;
                if !result.is_valid {
                    return Err(Error::LinkInvalid("link is no longer valid".to_string()));
                }
                result
            }
        };

        let credential = perform_credential_ceremony(&self.authenticator, result).await?;
        let auth = self.client.authenticate_key(&credential.id, &self.link).await?;
        Ok(auth.auth_success)
    }

    fn disable(&self, message: &str) {
        self.ready.store(false, Ordering::SeqCst);
        self.ui.set_action_enabled(false);
        self.ui.show_toast(Toast::error(message));
    }
}
