//! 门户会话 - 基础设施层
//!
//! 持有唯一的 HTTP 会话资源（带 cookie 的 reqwest Client），
//! 只暴露门户的几个页面操作能力
//!
//! 一个会话只服务一个考号任务，任务结束即销毁，绝不跨任务共享

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 门户要求浏览器式 User-Agent，否则部分页面拒绝返回
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// 门户会话
///
/// 职责：
/// - 持有唯一的 Client 资源（cookie 保存服务器侧表单状态）
/// - 暴露选择页 / 查询页 / 图片 / 提交四类能力
/// - 不认识考号和流程
pub struct PortalSession {
    client: Client,
    select_url: String,
    result_url: String,
    base_url: String,
}

impl PortalSession {
    /// 创建新的门户会话
    ///
    /// 每个请求携带固定超时；cookie 存储随会话销毁
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(AppError::session_build_failed)?;

        Ok(Self {
            client,
            select_url: config.program_select_url.clone(),
            result_url: config.result_page_url.clone(),
            base_url: config.portal_base_url.clone(),
        })
    }

    /// 拉取课程选择页
    pub async fn fetch_select_page(&self) -> AppResult<String> {
        self.get_text(&self.select_url).await
    }

    /// 提交课程选择表单
    pub async fn submit_select(&self, params: &[(String, String)]) -> AppResult<String> {
        self.post_form(&self.select_url, params).await
    }

    /// 拉取成绩查询页（含验证码图片引用与最新隐藏令牌）
    pub async fn fetch_query_page(&self) -> AppResult<String> {
        self.get_text(&self.result_url).await
    }

    /// 下载页面引用的图片资源
    ///
    /// 相对路径以门户根地址为基准解析；字节只存内存，不落盘
    pub async fn fetch_image(&self, src: &str) -> AppResult<Vec<u8>> {
        let url = self.resolve(src);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::portal_request_failed(&url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::portal_request_failed(&url, e))?;

        Ok(bytes.to_vec())
    }

    /// 提交成绩查询表单，返回响应页面
    pub async fn submit_query(&self, params: &[(String, String)]) -> AppResult<String> {
        self.post_form(&self.result_url, params).await
    }

    fn resolve(&self, src: &str) -> String {
        if src.starts_with("http://") || src.starts_with("https://") {
            src.to_string()
        } else {
            format!("{}{}", self.base_url, src.trim_start_matches('/'))
        }
    }

    async fn get_text(&self, url: &str) -> AppResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::portal_request_failed(url, e))?;

        response
            .text()
            .await
            .map_err(|e| AppError::portal_request_failed(url, e))
    }

    async fn post_form(&self, url: &str, params: &[(String, String)]) -> AppResult<String> {
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::portal_request_failed(url, e))?;

        response
            .text()
            .await
            .map_err(|e| AppError::portal_request_failed(url, e))
    }
}
