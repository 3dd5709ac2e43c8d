//! Fulfillment Server - 食品订单履约与开票服务
//!
//! # 架构概述
//!
//! 本模块是履约节点的主入口，提供以下核心功能：
//!
//! - **订单状态机** (`fulfillment`): 订单沿固定产线流转，逐阶段跟踪记录
//! - **时间预估** (`fulfillment::estimation`): 基于产品基线的完成时间投影
//! - **发票管线** (`invoicing`): 模板 → 渲染 → 投递的后台管线
//! - **通知** (`notify`): fire-and-forget 聊天通知
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! fulfillment-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池与仓储
//! ├── fulfillment/   # 状态机、预估、订单创建
//! ├── invoicing/     # 发票生成与投递管线
//! ├── notify/        # 聊天通知
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod fulfillment;
pub mod invoicing;
pub mod notify;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use fulfillment::{FulfillmentMachine, OrderIntake};
pub use invoicing::InvoicePipeline;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ____  _                    _
  / __ \| |                  | |
 | |  | | |__  _ __ __ _  __| | ___  _ __
 | |  | | '_ \| '__/ _` |/ _` |/ _ \| '__|
 | |__| | |_) | | | (_| | (_| | (_) | |
  \____/|_.__/|_|  \__,_|\__,_|\___/|_|

  Fulfillment Server
"#
    );
}

/// 设置运行环境: dotenv + 日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
