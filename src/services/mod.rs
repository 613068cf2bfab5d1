//! 业务能力层（Services Layer）
//!
//! 描述"我能做什么"，只处理单个输入，不关心流程顺序
//!
//! - `CaptchaSolver` - 验证码预处理 + 识别能力
//! - `LlmRecognizer` - 视觉 LLM 文本识别引擎
//! - `ResultExtractor` - 成绩页解析能力
//! - `ResultStore` - 线程安全的结果聚合能力
//! - `CsvExporter` - 导出 CSV 能力

pub mod captcha_solver;
pub mod csv_exporter;
pub mod llm_recognizer;
pub mod result_extractor;
pub mod result_store;

pub use captcha_solver::{CaptchaSolver, RecognizeError, TextFragment, TextRecognizer};
pub use csv_exporter::CsvExporter;
pub use llm_recognizer::LlmRecognizer;
pub use result_extractor::{contains_result_marker, ResultExtractor, RESULT_MARKER};
pub use result_store::ResultStore;
