//! 单个考号处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **会话隔离**：为每个考号创建独占的门户会话，任务结束即销毁
//! 2. **流程调度**：创建并运行 FetchFlow
//! 3. **结果日志**：输出单个考号的最终状态

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::PortalSession;
use crate::services::captcha_solver::TextRecognizer;
use crate::services::result_store::ResultStore;
use crate::workflow::{FetchFlow, FetchResult, RollCtx};

/// 处理单个考号
///
/// 所有失败都已在流程层吸收，这里只负责会话创建和结果归类
pub async fn process_roll(
    config: &Config,
    recognizer: Arc<dyn TextRecognizer>,
    ctx: &RollCtx,
    store: &ResultStore,
) -> FetchResult {
    info!("[任务 {}] 开始处理 {}", ctx.task_index, ctx);

    let session = match PortalSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            error!("[任务 {}] ❌ 会话创建失败: {}", ctx.task_index, e);
            return FetchResult::Fatal;
        }
    };

    let flow = FetchFlow::new(config, recognizer);
    let outcome = flow.run(&session, ctx, store).await;

    log_roll_complete(ctx, outcome);
    outcome
}

// ========== 日志辅助函数 ==========

fn log_roll_complete(ctx: &RollCtx, outcome: FetchResult) {
    match outcome {
        FetchResult::Fetched => {
            info!("[任务 {}] ✅ 完成: {} 已入表", ctx.task_index, ctx.roll_no);
        }
        FetchResult::NoRecord => {
            warn!("[任务 {}] ⚠️ 完成: {} 无可解析记录", ctx.task_index, ctx.roll_no);
        }
        FetchResult::Exhausted => {
            info!("[任务 {}] 完成: {} 重试耗尽", ctx.task_index, ctx.roll_no);
        }
        FetchResult::Fatal => {
            warn!("[任务 {}] ⚠️ 完成: {} 已跳过", ctx.task_index, ctx.roll_no);
        }
    }
}
