//! CSV 导出 - 业务能力层
//!
//! 只负责"一组记录 → 一个 CSV 文件"，每次批量运行整体覆盖

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::record::ResultRecord;

/// 固定列顺序
pub const CSV_HEADER: [&str; 5] = ["Roll", "Name", "SGPA", "CGPA", "Result"];

/// CSV 导出服务
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 导出记录（调用方负责排序），整体覆盖目标文件
    pub fn export(&self, records: &[ResultRecord]) -> AppResult<()> {
        let mut out = String::new();
        write_row(&mut out, &CSV_HEADER);

        for record in records {
            write_row(
                &mut out,
                &[
                    &record.roll,
                    &record.name,
                    &record.sgpa,
                    &record.cgpa,
                    &record.result,
                ],
            );
        }

        fs::write(&self.path, out)
            .map_err(|e| AppError::export_write_failed(self.path.display().to_string(), e))?;

        debug!("已导出 {} 条记录到 {}", records.len(), self.path.display());
        Ok(())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row(out: &mut String, cells: &[&str]) {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roll: &str, name: &str) -> ResultRecord {
        ResultRecord {
            roll: roll.to_string(),
            name: name.to_string(),
            sgpa: "7.5".to_string(),
            cgpa: "7.2".to_string(),
            result: "Pass".to_string(),
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rgpv_export_{}_{}.csv", tag, std::process::id()))
    }

    #[test]
    fn test_export_writes_header_and_rows_in_order() {
        let path = temp_path("order");
        let exporter = CsvExporter::new(&path);
        exporter
            .export(&[record("A001", "FIRST"), record("A002", "SECOND")])
            .expect("导出应成功");

        let content = fs::read_to_string(&path).expect("读回导出文件");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Roll,Name,SGPA,CGPA,Result");
        assert_eq!(lines[1], "A001,FIRST,7.5,7.2,Pass");
        assert_eq!(lines[2], "A002,SECOND,7.5,7.2,Pass");
        assert_eq!(lines.len(), 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_export_quotes_fields_with_commas() {
        let path = temp_path("quote");
        CsvExporter::new(&path)
            .export(&[record("A001", "SHARMA, RAHUL")])
            .expect("导出应成功");

        let content = fs::read_to_string(&path).expect("读回导出文件");
        assert!(content.contains(r#""SHARMA, RAHUL""#));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let path = temp_path("overwrite");
        let exporter = CsvExporter::new(&path);
        exporter.export(&[record("A001", "X"), record("A002", "Y")]).expect("第一次导出");
        exporter.export(&[record("B001", "Z")]).expect("第二次导出");

        let content = fs::read_to_string(&path).expect("读回导出文件");
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("A001"));

        let _ = fs::remove_file(&path);
    }
}
