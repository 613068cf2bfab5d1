//! HTTP 接口层测试：表单页与下载端点

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rgpv_result_fetch::api::{router, AppState};
use rgpv_result_fetch::services::captcha_solver::{RecognizeError, TextFragment, TextRecognizer};
use rgpv_result_fetch::Config;

struct NullRecognizer;

#[async_trait]
impl TextRecognizer for NullRecognizer {
    async fn recognize(&self, _image_png: &[u8]) -> Result<Vec<TextFragment>, RecognizeError> {
        Ok(Vec::new())
    }
}

fn export_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rgpv_api_{}_{}.csv", tag, std::process::id()))
}

/// 在临时端口上启动接口层
async fn spawn_app(config: Config) -> String {
    let state = AppState {
        config: Arc::new(config),
        recognizer: Arc::new(NullRecognizer),
        last_report: Arc::new(Mutex::new(None)),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("绑定临时端口");
    let addr = listener.local_addr().expect("读取监听地址");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("接口层退出");
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_index_serves_query_form() {
    let base = spawn_app(Config::default()).await;

    let response = reqwest::get(format!("{}/", base)).await.expect("请求表单页");
    assert!(response.status().is_success());

    let body = response.text().await.expect("读取响应");
    assert!(body.contains("<form action=\"/scrape\""));
    assert!(body.contains("Bachelor of Engineering"));
}

#[tokio::test]
async fn test_download_before_any_batch_is_not_found() {
    let config = Config {
        export_csv_file: export_path("missing").display().to_string(),
        ..Config::default()
    };
    let base = spawn_app(config).await;

    let response = reqwest::get(format!("{}/download", base)).await.expect("请求下载");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_download_serves_exported_csv() {
    let path = export_path("present");
    std::fs::write(&path, "Roll,Name,SGPA,CGPA,Result\nA001,X,7.5,7.2,Pass\n").expect("准备导出文件");

    let config = Config {
        export_csv_file: path.display().to_string(),
        ..Config::default()
    };
    let base = spawn_app(config).await;

    let response = reqwest::get(format!("{}/download", base)).await.expect("请求下载");
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some(r#"attachment; filename="results.csv""#)
    );

    let body = response.text().await.expect("读取响应");
    assert!(body.starts_with("Roll,Name,SGPA,CGPA,Result"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_report_before_any_batch_is_not_found() {
    let base = spawn_app(Config::default()).await;

    let response = reqwest::get(format!("{}/api/report", base)).await.expect("请求报告");
    assert_eq!(response.status().as_u16(), 404);
}
