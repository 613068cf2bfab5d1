//! HTTP 路由 - 接口层
//!
//! - `GET /` 查询表单页
//! - `POST /scrape` 触发批量取回，同步等批次结束后返回结果表格
//! - `GET /download` 下载最近一次导出的 CSV，尚未跑过批次时返回 404
//! - `GET /api/report` 最近一次批次报告（JSON）

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};

use crate::config::Config;
use crate::models::program::Program;
use crate::models::record::{BatchReport, BatchRequest};
use crate::orchestrator;
use crate::services::captcha_solver::TextRecognizer;

/// 接口层共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub last_report: Arc<Mutex<Option<BatchReport>>>,
}

/// 启动 HTTP 服务（阻塞直到服务退出）
pub async fn serve(config: Config, recognizer: Arc<dyn TextRecognizer>) -> Result<()> {
    let listen_addr = config.listen_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        recognizer,
        last_report: Arc::new(Mutex::new(None)),
    };

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!("🌐 服务已启动: http://{}", listen_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// 组装路由表
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape", post(scrape))
        .route("/download", get(download))
        .route("/api/report", get(api_report))
        .with_state(state)
}

/// 查询表单页
async fn index(State(state): State<AppState>) -> Html<String> {
    let program_name = Program::from_code(&state.config.department)
        .map(|p| p.name())
        .unwrap_or("Unknown Program");

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Result Fetch</title></head>
<body>
<h2>Batch Result Fetch: {}</h2>
<form action="/scrape" method="post">
  <label>Roll prefix <input name="prefix" value="0101CS21" /></label><br/>
  <label>Semester <input name="semester" value="6" /></label><br/>
  <label>Start <input name="start" type="number" value="1" /></label><br/>
  <label>End <input name="end" type="number" value="10" /></label><br/>
  <button type="submit">Fetch</button>
</form>
<p><a href="/download">Download latest CSV</a></p>
</body>
</html>"#,
        escape_html(program_name)
    ))
}

/// 触发批量取回；整批结束后一次性返回
async fn scrape(
    State(state): State<AppState>,
    Form(request): Form<BatchRequest>,
) -> Result<Html<String>, (StatusCode, String)> {
    let report = orchestrator::run_batch(&state.config, state.recognizer.clone(), &request)
        .await
        .map_err(|e| {
            error!("批量取回失败: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("批量取回失败: {}", e))
        })?;

    let page = render_report(&report);

    let mut guard = state.last_report.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(report);

    Ok(Html(page))
}

/// 下载最近一次导出的 CSV
async fn download(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.config.export_csv_file).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    r#"attachment; filename="results.csv""#,
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "尚未生成结果文件").into_response(),
    }
}

/// 最近一次批次报告
async fn api_report(State(state): State<AppState>) -> Response {
    let guard = state.last_report.lock().unwrap_or_else(|e| e.into_inner());
    match guard.as_ref() {
        Some(report) => Json(report.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "尚未运行任何批次").into_response(),
    }
}

/// 渲染结果表格页
fn render_report(report: &BatchReport) -> String {
    let mut rows = String::new();
    for record in &report.records {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&record.roll),
            escape_html(&record.name),
            escape_html(&record.sgpa),
            escape_html(&record.cgpa),
            escape_html(&record.result),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Result Fetch</title></head>
<body>
<h2>Fetched {} records in {:.2}s</h2>
<table border="1">
<tr><th>Roll</th><th>Name</th><th>SGPA</th><th>CGPA</th><th>Result</th></tr>
{}</table>
<p><a href="/download">Download CSV</a> | <a href="/">Back</a></p>
</body>
</html>"#,
        report.total, report.elapsed_secs, rows
    )
}

/// 门户返回的字段可能含任意文本，插入 HTML 前做最小转义
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::ResultRecord;

    #[test]
    fn test_render_report_escapes_and_lists_rows() {
        let report = BatchReport {
            records: vec![ResultRecord {
                roll: "A001".to_string(),
                name: "<script>".to_string(),
                sgpa: "7.5".to_string(),
                cgpa: "7.2".to_string(),
                result: "Pass".to_string(),
            }],
            elapsed_secs: 1.5,
            total: 1,
        };

        let page = render_report(&report);
        assert!(page.contains("Fetched 1 records in 1.50s"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
