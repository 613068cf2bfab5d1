//! 成绩记录与批次数据模型

use serde::{Deserialize, Serialize};

/// 字段缺失时的占位值
pub const NOT_AVAILABLE: &str = "N/A";

/// 单个考号的成绩记录
///
/// 解析成功后即不可变；聚合表中每个考号至多一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Roll")]
    pub roll: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SGPA")]
    pub sgpa: String,
    #[serde(rename = "CGPA")]
    pub cgpa: String,
    #[serde(rename = "Result")]
    pub result: String,
}

/// 批量取回请求
///
/// 考号 = prefix + 三位零填充序号，范围 [start, end] 闭区间
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub prefix: String,
    pub semester: String,
    pub start: u32,
    pub end: u32,
}

/// 一次批量取回的最终产物
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// 按考号升序排列的记录
    pub records: Vec<ResultRecord>,
    /// 批次耗时（秒）
    pub elapsed_secs: f64,
    /// 取回的记录总数
    pub total: usize,
}
