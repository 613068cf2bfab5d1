//! 成绩页解析 - 业务能力层
//!
//! 只负责"一份响应页面 → 成绩记录"，不关心流程
//!
//! 页面结构是门户的固定契约：
//! - Name / Roll 标签单元格的下一个单元格是取值
//! - CGPA 表头之后的三个数据单元格依次是 (Result, SGPA, CGPA)
//! - CGPA 表头缺失说明整页不是成绩页（与单个字段缺失不同）

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::record::{ResultRecord, NOT_AVAILABLE};

/// 成绩页的标识令牌（结果容器 id），响应分类时不区分大小写
pub const RESULT_MARKER: &str = "resultheader";

/// 判断响应是否命中成绩页标记
pub fn contains_result_marker(body: &str) -> bool {
    body.to_lowercase().contains(RESULT_MARKER)
}

/// 成绩页解析器
pub struct ResultExtractor {
    name_label: Regex,
    roll_label: Regex,
    cgpa_label: Regex,
}

impl ResultExtractor {
    pub fn new() -> Self {
        Self {
            name_label: Regex::new("Name").expect("标签正则是合法的字面量"),
            roll_label: Regex::new("Roll").expect("标签正则是合法的字面量"),
            cgpa_label: Regex::new("CGPA").expect("标签正则是合法的字面量"),
        }
    }

    /// 从响应页面中提取成绩记录
    ///
    /// # 返回
    /// 页面不含 CGPA 表头时返回 None（整页无记录）；
    /// 单个字段缺失只会让该字段取 "N/A"，不会导致整体失败
    pub fn extract(&self, html: &str) -> Option<ResultRecord> {
        let doc = Html::parse_document(html);
        let td_selector = Selector::parse("td").ok()?;
        let th_selector = Selector::parse("th").ok()?;

        let cells: Vec<ElementRef> = doc.select(&td_selector).collect();
        let name = self.label_value(&cells, &self.name_label);
        let roll = self.label_value(&cells, &self.roll_label);

        // CGPA 表头是"这是成绩页"的判据
        let header = doc
            .select(&th_selector)
            .find(|th| self.cgpa_label.is_match(&cell_text(th)))?;

        // 从表头起按文档顺序向后取三个数据单元格：(Result, SGPA, CGPA)
        let data = cells_after(&doc, &header, 3);
        let field = |idx: usize| {
            data.get(idx)
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Some(ResultRecord {
            roll,
            name,
            sgpa: field(1),
            cgpa: field(2),
            result: field(0),
        })
    }

    /// 找到文本匹配标签的单元格，取它的下一个单元格文本
    fn label_value(&self, cells: &[ElementRef], label: &Regex) -> String {
        for (idx, cell) in cells.iter().enumerate() {
            if label.is_match(&cell_text(cell)) {
                return cells
                    .get(idx + 1)
                    .map(clean_text)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            }
        }
        NOT_AVAILABLE.to_string()
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 按文档顺序收集 anchor 之后的前 n 个 td 文本
fn cells_after(doc: &Html, anchor: &ElementRef, n: usize) -> Vec<String> {
    let mut found_anchor = false;
    let mut cells = Vec::new();

    for node in doc.root_element().descendants() {
        if node.id() == anchor.id() {
            found_anchor = true;
            continue;
        }
        if !found_anchor {
            continue;
        }
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "td" {
                cells.push(clean_text(&element));
                if cells.len() == n {
                    break;
                }
            }
        }
    }

    cells
}

fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// 去掉换行并修剪两端空白
fn clean_text(element: &ElementRef) -> String {
    cell_text(element).replace('\n', "").trim().to_string()
}
