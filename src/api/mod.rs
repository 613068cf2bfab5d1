//! HTTP 接口层
//!
//! 对外暴露三个入口：查询表单页、批量取回触发、CSV 下载

pub mod routes;

pub use routes::{router, serve, AppState};
