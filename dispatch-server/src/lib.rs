//! Dispatch Register Server - 办公室发文登记系统
//!
//! # 架构概述
//!
//! 本模块是发文登记服务的主入口，提供以下核心功能：
//!
//! - **编号分配** (`db::repository::sequence`): 原子化的发文编号分配，
//!   并发提交下不重号、不跳号
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **认证** (`auth`): 按用户名登录 + JWT 会话
//! - **HTTP API** (`api`): RESTful API 接口 (记录、联系人、导出)
//!
//! # 模块结构
//!
//! ```text
//! dispatch-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 会话、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (仓储 + 编号分配)
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: dotenv + 日志
///
/// 日志级别取 `LOG_LEVEL` (默认 info)，生产环境输出 JSON 并写入
/// `WORK_DIR/logs` 下的滚动日志文件。
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let json_format = environment == "production";

    let log_dir = std::env::var("WORK_DIR")
        .map(|dir| format!("{dir}/logs"))
        .ok();

    init_logger_with_file(&level, json_format, log_dir.as_deref())
}

pub fn print_banner() {
    println!(
        r#"
    ____  _                  __       __
   / __ \(_)________  ____ _/ /______/ /_
  / / / / / ___/ __ \/ __ `/ __/ ___/ __ \
 / /_/ / (__  ) /_/ / /_/ / /_/ /__/ / / /
/_____/_/____/ .___/\__,_/\__/\___/_/ /_/
            /_/    ____             _      __
                  / __ \___  ____ _(_)____/ /____  _____
                 / /_/ / _ \/ __ `/ / ___/ __/ _ \/ ___/
                / _, _/  __/ /_/ / (__  ) /_/  __/ /
               /_/ |_|\___/\__, /_/____/\__/\___/_/
                          /____/
    "#
    );
}
