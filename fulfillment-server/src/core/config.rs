/// 服务器配置 - 履约节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/fulfillment | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite:{WORK_DIR}/database/fulfillment.db | SQLite 连接串 |
/// | TIMEZONE | Europe/Madrid | 业务时区 (单据编号按此日期) |
/// | ENVIRONMENT | development | 运行环境 |
/// | RENDERER_BIN | pdf-render-worker | 渲染引擎可执行文件 |
/// | RENDERER_PORT | 9480 | 渲染引擎本地 HTTP 端口 |
/// | MAIL_API_URL | http://localhost:8025/api/send | 发票投递 API |
/// | MAIL_SENDER | facturacion@localhost | 发票发件人 |
/// | CHAT_GATEWAY_URL | (未配置则禁用通知) | 聊天网关地址 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/fulfillment HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志、静态资产 (发票 logo 等)
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 连接串；未设置时从 work_dir 推导
    pub database_url: Option<String>,
    /// 业务时区: 单据编号和显示时间按此时区
    pub timezone: String,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 渲染引擎 ===
    /// 渲染引擎可执行文件 (HTML → PDF sidecar)
    pub renderer_bin: String,
    /// 渲染引擎监听端口
    pub renderer_port: u16,

    // === 发票投递 ===
    /// 投递 HTTP API 地址
    pub mail_api_url: String,
    /// 投递 API key (可选)
    pub mail_api_key: Option<String>,
    /// 发件人地址
    pub mail_sender: String,

    // === 通知网关 ===
    /// 聊天网关地址；未配置时所有通知调用为 no-op
    pub chat_gateway_url: Option<String>,
    /// 聊天网关会话 ID
    pub chat_session_id: String,
    /// 聊天网关 API key (可选)
    pub chat_api_key: Option<String>,

    // === 店铺信息 (发票抬头) ===
    pub store_name: String,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,

    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/fulfillment".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL").ok(),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| "Europe/Madrid".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            renderer_bin: std::env::var("RENDERER_BIN")
                .unwrap_or_else(|_| "pdf-render-worker".into()),
            renderer_port: std::env::var("RENDERER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9480),

            mail_api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "http://localhost:8025/api/send".into()),
            mail_api_key: std::env::var("MAIL_API_KEY").ok(),
            mail_sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "facturacion@localhost".into()),

            chat_gateway_url: std::env::var("CHAT_GATEWAY_URL").ok(),
            chat_session_id: std::env::var("CHAT_SESSION_ID")
                .unwrap_or_else(|_| "default".into()),
            chat_api_key: std::env::var("CHAT_API_KEY").ok(),

            store_name: std::env::var("STORE_NAME").unwrap_or_else(|_| "Obrador Central".into()),
            store_address: std::env::var("STORE_ADDRESS").ok(),
            store_phone: std::env::var("STORE_PHONE").ok(),

            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// SQLite 连接串 (未显式配置时从 work_dir 推导)
    pub fn resolve_database_url(&self) -> String {
        self.database_url.clone().unwrap_or_else(|| {
            format!("sqlite:{}/database/fulfillment.db?mode=rwc", self.work_dir)
        })
    }

    /// 业务时区；解析失败时退回 UTC
    pub fn business_timezone(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
