//! 深链接 Passkey 认证 CLI 工具

use clap::{Parser, Subcommand};
use passkey_link_core::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "passkey-link")]
#[command(about = "深链接 Passkey 认证客户端工具", long_about = None)]
struct Cli {
    /// 后端 API 地址
    #[arg(short, long, default_value = "http://localhost:5000/api/")]
    api_url: String,

    /// 请求超时（秒）
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// 不验证 TLS 证书
    #[arg(long)]
    insecure: bool,

    /// 认证成功后跳转的机器人地址
    #[arg(long, default_value = "https://t.me/t_weather_wiz_bot")]
    bot_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 校验深链接
    Validate {
        /// 机器人发送的完整链接
        #[arg(short, long)]
        link: String,
    },
    /// 执行完整认证流程
    Authenticate {
        /// 机器人发送的完整链接
        #[arg(short, long)]
        link: String,
        /// 认证器返回的凭证 ID（base64url）
        #[arg(short, long)]
        credential_id: String,
        /// 模拟不支持平台凭证接口的客户端
        #[arg(long)]
        unsupported: bool,
    },
}

/// 以预设凭证应答仪式的认证器
struct PresetAuthenticator {
    credential_id: String,
    supported: bool,
}

impl PresetAuthenticator {
    fn credential(&self) -> Result<PublicKeyCredential> {
        let raw_id = protocol::base64url_decode(&self.credential_id)?;
        Ok(PublicKeyCredential::from_raw_id(raw_id))
    }
}

impl PlatformAuthenticator for PresetAuthenticator {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn create(&self, options: &PublicKeyCredentialCreationOptions) -> Result<PublicKeyCredential> {
        if !self.supported {
            return Err(Error::Ceremony("no platform authenticator".to_string()));
        }
        println!("创建凭证: rp={} user={}", options.rp.name, options.user.name);
        println!("  challenge: {}", hex::encode(&options.challenge));
        println!("  user.id:   {}", hex::encode(&options.user.id));
        self.credential()
    }

    async fn get(&self, options: &PublicKeyCredentialRequestOptions) -> Result<PublicKeyCredential> {
        if !self.supported {
            return Err(Error::Ceremony("no platform authenticator".to_string()));
        }
        println!("获取凭证断言");
        println!("  challenge: {}", hex::encode(&options.challenge));
        self.credential()
    }
}

/// 终端界面
struct TerminalUi;

impl UiAdapter for TerminalUi {
    fn show_toast(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => println!("[错误] {}", toast.message),
            ToastKind::Success => println!("[成功] {}", toast.message),
        }
    }

    fn set_action_enabled(&self, enabled: bool) {
        tracing::debug!("action enabled: {}", enabled);
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            println!("正在认证...");
        }
    }

    fn schedule_redirect(&self, uri: &str, delay: Duration) {
        println!("{} 毫秒后跳转到: {}", delay.as_millis(), uri);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = ClientConfig {
        api_url: cli.api_url.clone(),
        timeout: cli.timeout,
        verify_tls: !cli.insecure,
        bot_url: cli.bot_url.clone(),
        ..ClientConfig::default()
    };

    match cli.command {
        Commands::Validate { link } => {
            do_validate(&config, &link).await?;
        }
        Commands::Authenticate { link, credential_id, unsupported } => {
            do_authenticate(&config, &link, credential_id, !unsupported).await?;
        }
    }

    Ok(())
}

async fn do_validate(config: &ClientConfig, link: &str) -> anyhow::Result<()> {
    let params = LinkParams::from_url(link)?;
    println!("正在校验链接: id={}", params.id);

    let client = AuthClient::new(config.clone())?;
    let result = client.validate_link(&params).await?;

    if !result.is_valid {
        println!("链接无效");
        return Ok(());
    }

    println!("链接有效");
    let request = format_credential_options(&result)?;
    if request.is_create() {
        println!("需要注册新凭证");
    } else {
        println!("使用已有凭证认证");
    }
    println!("challenge: {}", hex::encode(request.challenge()));

    Ok(())
}

async fn do_authenticate(
    config: &ClientConfig,
    link: &str,
    credential_id: String,
    supported: bool,
) -> anyhow::Result<()> {
    let params = LinkParams::from_url(link)?;
    let client = AuthClient::new(config.clone())?;
    let authenticator = PresetAuthenticator {
        credential_id,
        supported,
    };
    let flow = AuthFlow::new(client, authenticator, TerminalUi, params);

    if flow.load().await != LoadOutcome::Ready {
        anyhow::bail!("链接不可用");
    }

    match flow.authenticate().await {
        AttemptOutcome::Authenticated => println!("认证成功!"),
        AttemptOutcome::Rejected => anyhow::bail!("认证失败：设备未注册"),
        AttemptOutcome::Failed(kind) => anyhow::bail!("认证出错: {:?}", kind),
        AttemptOutcome::Ignored => anyhow::bail!("操作未启用"),
    }

    Ok(())
}
