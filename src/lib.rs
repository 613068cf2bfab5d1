//! # RGPV Result Fetch
//!
//! 一个用于批量取回 RGPV 成绩门户记录的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 会话），只暴露能力
//! - `PortalSession` - 唯一的会话 owner，提供门户页面操作能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个输入
//! - `CaptchaSolver` - 验证码预处理 + 识别能力
//! - `ResultExtractor` - 成绩页解析能力
//! - `ResultStore` - 线程安全的结果聚合能力
//! - `CsvExporter` - 导出能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个考号"的完整取回流程
//! - `RollCtx` - 上下文封装（考号 + 学期）
//! - `FetchFlow` - 状态机编排（选课 → 识别 → 提交 → 分类 → 重试）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量取回处理器，管理并发和汇总
//! - `orchestrator/roll_processor` - 单个考号处理器，持有会话生命周期
//! - `api/` - HTTP 触发入口与下载出口
//!
//! ## 模块结构

pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PortalSession;
pub use models::{BatchReport, BatchRequest, Program, ResultRecord, NOT_AVAILABLE};
pub use orchestrator::{run_batch, App};
pub use services::{
    CaptchaSolver, CsvExporter, LlmRecognizer, ResultExtractor, ResultStore, TextRecognizer,
};
pub use workflow::{FetchFlow, FetchResult, RollCtx};
