use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::db::DbService;
use crate::fulfillment::{FulfillmentMachine, OrderIntake};
use crate::invoicing::{
    DocumentRenderer, InvoicePipeline, MailerClient, RenderConfig, RenderPool, StoreIdentity,
};
use crate::notify::{NotificationDispatcher, NotificationKind};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是履约节点的核心数据结构。使用 Arc 实现浅拷贝，
/// 所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | machine | FulfillmentMachine | 订单状态机 |
/// | intake | OrderIntake | 订单创建 |
/// | invoice_pipeline | Arc<InvoicePipeline> | 发票生成与投递管线 |
/// | render_pool | Arc<RenderPool> | 渲染引擎池 (关闭时回收) |
/// | notifier | Arc<NotificationDispatcher> | 聊天通知 |
/// | tasks | BackgroundTasks | 后台任务管理 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 数据库
    pub db: DbService,
    /// 订单状态机
    pub machine: FulfillmentMachine,
    /// 订单创建服务
    pub intake: OrderIntake,
    /// 发票管线
    pub invoice_pipeline: Arc<InvoicePipeline>,
    /// 渲染引擎池 (持有引用以便关闭时回收进程)
    pub render_pool: Arc<RenderPool>,
    /// 通知分发器
    pub notifier: Arc<NotificationDispatcher>,
    /// 后台任务管理器
    pub tasks: BackgroundTasks,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database / logs / assets)
    /// 2. 数据库连接池和迁移
    /// 3. 各服务 (状态机、订单创建、发票管线、通知)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        ensure_work_dirs(&config.work_dir);

        let db = DbService::new(&config.resolve_database_url())
            .await
            .expect("Database initialization failed");

        let tz = config.business_timezone();
        let machine = FulfillmentMachine::new(db.pool.clone());
        let intake = OrderIntake::new(db.pool.clone(), tz);

        let render_pool = Arc::new(RenderPool::new(RenderConfig::from_config(config)));
        let renderer: Arc<dyn DocumentRenderer> = render_pool.clone();
        let transport = Arc::new(MailerClient::from_config(config));
        let invoice_pipeline = Arc::new(InvoicePipeline::new(
            renderer,
            transport,
            StoreIdentity::from_config(config),
        ));

        let notifier = Arc::new(NotificationDispatcher::from_config(config));

        Self {
            config: config.clone(),
            db,
            machine,
            intake,
            invoice_pipeline,
            render_pool,
            notifier,
            tasks: BackgroundTasks::new(),
        }
    }

    /// Fire-and-forget 通知分发
    ///
    /// 调用方不等待投递；没有电话号码时静默跳过。
    pub fn dispatch_notification(&self, phone: Option<String>, kind: NotificationKind) {
        let Some(phone) = phone else {
            tracing::debug!(?kind, "No phone on file, skipping notification");
            return;
        };
        let notifier = self.notifier.clone();
        self.tasks.spawn("notification", TaskKind::Oneshot, async move {
            notifier.notify(&phone, kind).await;
        });
    }

    /// Graceful shutdown: 回收渲染引擎进程并等待在途后台任务
    pub async fn shutdown(&self) {
        self.render_pool.shutdown().await;
        self.tasks
            .shutdown(Duration::from_millis(self.config.shutdown_timeout_ms))
            .await;
    }
}

/// 确保工作目录结构存在
fn ensure_work_dirs(work_dir: &str) {
    for sub in ["database", "logs", "assets"] {
        let path = Path::new(work_dir).join(sub);
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to create work directory");
        }
    }
}
