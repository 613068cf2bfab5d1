//! 批量取回处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量任务的展开、并发控制和汇总。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载配置、创建识别引擎、启动 HTTP 服务
//! 2. **任务展开**：把考号区间展开成 `Vec<RollCtx>`
//! 3. **并发控制**：使用 Semaphore 限制同时在跑的考号数量
//! 4. **汇合屏障**：全部任务结束后才取聚合表快照
//! 5. **收尾**：排序、导出 CSV、产出批次报告
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个考号的细节，向下委托 roll_processor
//! - **无全局状态**：聚合表按批次创建，随批次丢弃

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::api;
use crate::config::Config;
use crate::models::record::{BatchReport, BatchRequest, ResultRecord};
use crate::orchestrator::roll_processor;
use crate::services::captcha_solver::TextRecognizer;
use crate::services::csv_exporter::CsvExporter;
use crate::services::llm_recognizer::LlmRecognizer;
use crate::services::result_store::ResultStore;
use crate::workflow::roll_ctx::{build_roll_no, RollCtx};
use crate::workflow::FetchResult;

/// 应用主结构
pub struct App {
    config: Config,
    recognizer: Arc<dyn TextRecognizer>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 创建识别引擎（整个进程共享一个）
        let recognizer: Arc<dyn TextRecognizer> = Arc::new(LlmRecognizer::new(&config));

        Ok(Self { config, recognizer })
    }

    /// 运行应用主逻辑：启动 HTTP 服务，批量取回由请求触发
    pub async fn run(&self) -> Result<()> {
        api::serve(self.config.clone(), self.recognizer.clone()).await
    }
}

/// 把考号区间展开成任务列表
///
/// [start, end] 闭区间；start > end 时没有任务
pub fn expand_tasks(request: &BatchRequest) -> Vec<RollCtx> {
    (request.start..=request.end)
        .enumerate()
        .map(|(idx, seq)| {
            RollCtx::new(
                build_roll_no(&request.prefix, seq),
                idx + 1,
                request.semester.clone(),
            )
        })
        .collect()
}

/// 执行一次批量取回
///
/// # 参数
/// - `config`: 配置
/// - `recognizer`: 识别引擎（跨任务共享）
/// - `request`: 考号区间请求
///
/// # 返回
/// 返回按考号升序排列的批次报告；单个考号的失败不会让批次失败
pub async fn run_batch(
    config: &Config,
    recognizer: Arc<dyn TextRecognizer>,
    request: &BatchRequest,
) -> Result<BatchReport> {
    let started = Instant::now();

    // 聚合表按批次创建，没有跨批次的全局状态
    let store = Arc::new(ResultStore::new());

    let tasks = expand_tasks(request);
    log_batch_start(request, tasks.len(), config.max_concurrent_rolls);

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_rolls));
    let mut handles = Vec::new();

    for ctx in tasks {
        let permit = semaphore.clone().acquire_owned().await?;
        let config = config.clone();
        let recognizer = recognizer.clone();
        let store = store.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            roll_processor::process_roll(&config, recognizer, &ctx, &store).await
        });
        handles.push(handle);
    }

    // 汇合屏障：快照必须发生在全部任务结束之后
    let mut stats = BatchStats::default();
    for joined in futures::future::join_all(handles).await {
        match joined {
            Ok(outcome) => stats.count(outcome),
            Err(e) => {
                error!("任务执行失败: {}", e);
                stats.failed += 1;
            }
        }
    }

    let mut records = store.snapshot();
    sort_records(&mut records);

    CsvExporter::new(&config.export_csv_file).export(&records)?;

    let elapsed_secs = started.elapsed().as_secs_f64();
    let total = records.len();
    log_batch_complete(&stats, total, elapsed_secs, &config.export_csv_file);

    Ok(BatchReport {
        records,
        elapsed_secs,
        total,
    })
}

/// 按考号升序排序（零填充保证了字典序与数值序一致）
pub fn sort_records(records: &mut [ResultRecord]) {
    records.sort_by(|a, b| a.roll.cmp(&b.roll));
}

/// 批次统计
#[derive(Debug, Default)]
struct BatchStats {
    fetched: usize,
    no_record: usize,
    exhausted: usize,
    fatal: usize,
    failed: usize,
}

impl BatchStats {
    fn count(&mut self, outcome: FetchResult) {
        match outcome {
            FetchResult::Fetched => self.fetched += 1,
            FetchResult::NoRecord => self.no_record += 1,
            FetchResult::Exhausted => self.exhausted += 1,
            FetchResult::Fatal => self.fatal += 1,
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量成绩取回模式");
    info!("📊 最大并发数: {}", config.max_concurrent_rolls);
    info!("🔁 每个考号最多尝试: {} 次", config.max_attempts_per_roll);
    info!("🌐 监听地址: {}", config.listen_addr);
    info!("{}", "=".repeat(60));
}

fn log_batch_start(request: &BatchRequest, task_count: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 开始批量取回: 前缀 {} 区间 [{}, {}] 学期 {}",
        request.prefix, request.start, request.end, request.semester
    );
    info!("📋 共 {} 个考号，并发 {}", task_count, max_concurrent);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(stats: &BatchStats, total: usize, elapsed_secs: f64, export_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批次完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 取回: {}", stats.fetched);
    info!("⚠️ 无记录: {} | 重试耗尽: {}", stats.no_record, stats.exhausted);
    info!("❌ 跳过: {} | 任务异常: {}", stats.fatal, stats.failed);
    info!("⏱️ 耗时: {:.2}s，共导出 {} 条", elapsed_secs, total);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", export_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: u32, end: u32) -> BatchRequest {
        BatchRequest {
            prefix: "0101CS21".to_string(),
            semester: "6".to_string(),
            start,
            end,
        }
    }

    fn record(roll: &str) -> ResultRecord {
        ResultRecord {
            roll: roll.to_string(),
            name: "X".to_string(),
            sgpa: "7.5".to_string(),
            cgpa: "7.2".to_string(),
            result: "Pass".to_string(),
        }
    }

    #[test]
    fn test_expand_tasks_covers_closed_range() {
        let tasks = expand_tasks(&request(1, 3));
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].roll_no, "0101CS21001");
        assert_eq!(tasks[2].roll_no, "0101CS21003");
        assert_eq!(tasks[0].task_index, 1);
        // 区间外不产生任务
        assert!(tasks
            .iter()
            .all(|t| t.roll_no.as_str() >= "0101CS21001" && t.roll_no.as_str() <= "0101CS21003"));
    }

    #[test]
    fn test_expand_tasks_single_roll() {
        let tasks = expand_tasks(&request(7, 7));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].roll_no, "0101CS21007");
    }

    #[test]
    fn test_expand_tasks_empty_when_start_after_end() {
        assert!(expand_tasks(&request(5, 4)).is_empty());
    }

    #[test]
    fn test_sort_records_by_roll_ascending() {
        let mut records = vec![record("B003"), record("A001"), record("A002")];
        sort_records(&mut records);
        let rolls: Vec<&str> = records.iter().map(|r| r.roll.as_str()).collect();
        assert_eq!(rolls, vec!["A001", "A002", "B003"]);
    }
}
