//! 考号取回流程 - 流程层
//!
//! 核心职责：定义"一个考号"的完整取回流程（状态机）
//!
//! 流程顺序：
//! 1. 选择课程（失败 → 整个考号作废，不重试）
//! 2. 尝试循环（最多 max_attempts 次）：
//!    拉取查询页 → 下载验证码 → 识别 → 验收 → 限速 → 提交 → 分类响应
//! 3. 命中成绩页且解析成功 → 写入聚合表，结束

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::PortalSession;
use crate::models::form_state::{self, FormState};
use crate::models::program::Program;
use crate::models::record::ResultRecord;
use crate::services::captcha_solver::{CaptchaSolver, TextRecognizer};
use crate::services::result_extractor::{contains_result_marker, ResultExtractor};
use crate::services::result_store::ResultStore;
use crate::workflow::roll_ctx::RollCtx;

/// 单次尝试的结果
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 识别达标、门户返回了可解析的成绩记录
    Accepted(ResultRecord),
    /// 本次尝试作废，消耗一个重试名额后继续
    Transient(String),
    /// 不可重试的终止（命中结果标记但页面结构解析不出记录）
    Fatal(String),
}

/// 单个考号的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchResult {
    /// 成功取回并写入聚合表
    Fetched,
    /// 命中结果页但没有可解析的记录，提前终止
    NoRecord,
    /// 重试次数耗尽，未取回
    Exhausted,
    /// 课程选择阶段失败，整个考号跳过
    Fatal,
}

/// 考号取回流程
///
/// - 编排单个考号的完整状态机
/// - 不持有会话资源（由编排层传入）
/// - 只依赖业务能力（solver / extractor / store）
pub struct FetchFlow {
    solver: CaptchaSolver,
    extractor: ResultExtractor,
    department: String,
    student_type: String,
    max_attempts: usize,
    confidence_threshold: f32,
    min_captcha_len: usize,
    pacing_min_secs: f64,
    pacing_max_secs: f64,
    verbose_logging: bool,
}

impl FetchFlow {
    /// 创建新的取回流程
    pub fn new(config: &Config, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            solver: CaptchaSolver::new(recognizer),
            extractor: ResultExtractor::new(),
            department: config.department.clone(),
            student_type: config.student_type.clone(),
            max_attempts: config.max_attempts_per_roll,
            confidence_threshold: config.confidence_threshold,
            min_captcha_len: config.min_captcha_len,
            pacing_min_secs: config.pacing_min_secs,
            pacing_max_secs: config.pacing_max_secs,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 运行完整流程
    ///
    /// 所有失败都在这里吸收：向上只返回最终状态，不返回错误
    pub async fn run(
        &self,
        session: &PortalSession,
        ctx: &RollCtx,
        store: &ResultStore,
    ) -> FetchResult {
        // ========== 阶段 1: 课程选择 ==========
        if let Err(e) = self.select_program(session, ctx).await {
            warn!("[任务 {}] ⚠️ 课程选择失败，跳过该考号: {}", ctx.task_index, e);
            return FetchResult::Fatal;
        }

        // ========== 阶段 2: 尝试循环 ==========
        for attempt in 1..=self.max_attempts {
            match self.attempt(session, ctx).await {
                AttemptOutcome::Accepted(record) => {
                    store.put(record);
                    info!(
                        "[任务 {}] ✅ 成绩已取回 (第 {}/{} 次尝试)",
                        ctx.task_index, attempt, self.max_attempts
                    );
                    return FetchResult::Fetched;
                }
                AttemptOutcome::Fatal(reason) => {
                    warn!("[任务 {}] ⚠️ 终止重试: {}", ctx.task_index, reason);
                    return FetchResult::NoRecord;
                }
                AttemptOutcome::Transient(reason) => {
                    debug!(
                        "[任务 {}] 第 {}/{} 次尝试作废: {}",
                        ctx.task_index, attempt, self.max_attempts, reason
                    );
                }
            }
        }

        info!("[任务 {}] 重试次数耗尽，未取回成绩", ctx.task_index);
        FetchResult::Exhausted
    }

    /// 课程选择：拉取选择页 → 提取隐藏令牌和单选项取值 → 提交选择
    ///
    /// 这里失败说明门户或会话不可用，而不是验证码难度问题，所以不重试
    async fn select_program(&self, session: &PortalSession, ctx: &RollCtx) -> anyhow::Result<()> {
        let page = session.fetch_select_page().await?;

        let (form, radio_value) = parse_select_page(&page, &self.department)
            .ok_or_else(|| anyhow::anyhow!("选择页缺少隐藏令牌或课程单选项"))?;

        if let Some(program) = Program::from_code(&self.department) {
            debug!("[任务 {}] 选择课程: {}", ctx.task_index, program.name());
        }

        let params = form_state::program_select_params(&form, &self.department, &radio_value);
        session.submit_select(&params).await?;
        Ok(())
    }

    /// 单次尝试：每一步失败都折叠成 Transient，由循环决定去留
    async fn attempt(&self, session: &PortalSession, ctx: &RollCtx) -> AttemptOutcome {
        // 1. 拉取查询页（令牌每次都要刷新）
        let page = match session.fetch_query_page().await {
            Ok(page) => page,
            Err(e) => return AttemptOutcome::Transient(format!("查询页拉取失败: {}", e)),
        };

        let Some(parsed) = parse_query_page(&page) else {
            return AttemptOutcome::Transient("查询页缺少隐藏令牌".to_string());
        };
        let Some(captcha_src) = parsed.captcha_src else {
            return AttemptOutcome::Transient("查询页未找到验证码图片".to_string());
        };

        // 2. 下载验证码（门户每次都会轮换，必须按次重取；只存内存）
        let image = match session.fetch_image(&captcha_src).await {
            Ok(image) => image,
            Err(e) => return AttemptOutcome::Transient(format!("验证码下载失败: {}", e)),
        };

        // 3. 识别
        let (text, confidence) = self.solver.solve(&image).await;

        // 详细日志（如果启用）
        if self.verbose_logging {
            info!(
                "[任务 {}] 识别结果: '{}' (置信度 {:.2})",
                ctx.task_index, text, confidence
            );
        }

        // 4. 验收策略：不达标的识别绝不提交
        if !self.accepts(&text, confidence) {
            return AttemptOutcome::Transient(format!(
                "识别未达标 (置信度 {:.2}, 长度 {})",
                confidence,
                text.len()
            ));
        }

        // 5. 限速：只有通过验收的尝试才等待
        self.pace(ctx).await;

        // 6. 提交查询
        let params = form_state::result_query_params(
            &parsed.form,
            &ctx.roll_no,
            &ctx.semester,
            &self.student_type,
            &text,
        );
        let body = match session.submit_query(&params).await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::Transient(format!("查询提交失败: {}", e)),
        };

        // 7. 响应分类
        if !contains_result_marker(&body) {
            return AttemptOutcome::Transient("响应不含结果标记".to_string());
        }

        match self.extractor.extract(&body) {
            Some(record) => AttemptOutcome::Accepted(record),
            None => AttemptOutcome::Fatal("命中结果标记但页面结构解析不出记录".to_string()),
        }
    }

    /// 验收策略：置信度与长度双重门槛
    pub fn accepts(&self, text: &str, confidence: f32) -> bool {
        confidence >= self.confidence_threshold && text.len() >= self.min_captcha_len
    }

    /// 提交前随机等待，压低请求频率
    async fn pace(&self, ctx: &RollCtx) {
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.pacing_min_secs..=self.pacing_max_secs)
        };
        debug!("[任务 {}] 限速等待 {:.1}s 后提交", ctx.task_index, delay);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }
}

/// 查询页解析产物
struct QueryPage {
    form: FormState,
    captcha_src: Option<String>,
}

/// 同步解析查询页（解析后的 DOM 不跨 await 持有）
fn parse_query_page(html: &str) -> Option<QueryPage> {
    let doc = Html::parse_document(html);
    let form = FormState::extract(&doc)?;

    let img_selector = Selector::parse("img").ok()?;
    let images: Vec<_> = doc.select(&img_selector).collect();

    // 布局约定：验证码是页面中的第二张图片
    let captcha_src = images
        .get(1)
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    Some(QueryPage { form, captcha_src })
}

/// 同步解析选择页：隐藏令牌 + 指定课程单选项的取值
fn parse_select_page(html: &str, department: &str) -> Option<(FormState, String)> {
    let doc = Html::parse_document(html);
    let form = FormState::extract(&doc)?;
    let value = form_state::input_value_by_id(&doc, &form_state::program_radio_id(department))?;
    Some((form, value))
}
