//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量取回处理器
//! - 管理应用生命周期（初始化、运行）
//! - 把考号区间展开成任务列表
//! - 控制并发数量（Semaphore）
//! - 汇合全部任务后取快照、排序、导出
//!
//! ### `roll_processor` - 单个考号处理器
//! - 为任务创建独占的门户会话
//! - 委托 workflow::FetchFlow 执行状态机
//! - 输出单个考号的结果日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RollCtx>)
//!     ↓
//! roll_processor (处理单个 RollCtx)
//!     ↓
//! workflow::FetchFlow (单个考号的状态机)
//!     ↓
//! services (能力层：solve / extract / store / export)
//!     ↓
//! infrastructure (基础设施：PortalSession)
//! ```

pub mod batch_processor;
pub mod roll_processor;

pub use batch_processor::{expand_tasks, run_batch, App};
pub use roll_processor::process_roll;
