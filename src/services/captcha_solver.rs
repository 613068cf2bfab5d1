//! 验证码求解 - 业务能力层
//!
//! 只负责"一张验证码图片 → (文本, 置信度)"，不关心流程
//!
//! 预处理在本模块完成（解码、2 倍放大、灰度化），
//! 文本识别通过 `TextRecognizer` 委托给外部引擎

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// 识别允许的字符集：区分大小写的字母 + 数字（门户验证码区分大小写）
pub const CAPTCHA_ALLOWLIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 识别引擎返回的单个文本片段
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub confidence: f32,
}

/// 识别引擎错误
#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("识别引擎调用失败: {0}")]
    Engine(String),
    #[error("识别结果解析失败: {0}")]
    Parse(String),
}

/// 文本识别引擎接口
///
/// 输入是预处理后的灰度 PNG 字节，输出按检测顺序排列的片段列表
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image_png: &[u8]) -> Result<Vec<TextFragment>, RecognizeError>;
}

/// 验证码求解器
///
/// 职责：
/// - 图片预处理（放大 + 灰度）
/// - 委托识别引擎
/// - 片段拼接、置信度取平均、过滤字符集外字符
/// - 对任何坏输入返回 ("", 0.0)，从不报错
pub struct CaptchaSolver {
    recognizer: Arc<dyn TextRecognizer>,
    strip_pattern: Regex,
}

impl CaptchaSolver {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            strip_pattern: Regex::new(r"[^A-Za-z0-9]").expect("字符集正则是合法的字面量"),
        }
    }

    /// 求解一张验证码
    ///
    /// # 返回
    /// (识别文本, 平均置信度)；图片无法解码、无片段或引擎失败时返回 ("", 0.0)
    pub async fn solve(&self, image_bytes: &[u8]) -> (String, f32) {
        let Some(prepared) = preprocess(image_bytes) else {
            debug!("验证码图片解码失败，按空结果处理");
            return (String::new(), 0.0);
        };

        let fragments = match self.recognizer.recognize(&prepared).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("验证码识别引擎调用失败: {}", e);
                return (String::new(), 0.0);
            }
        };

        if fragments.is_empty() {
            return (String::new(), 0.0);
        }

        // 按检测顺序拼接，置信度取算术平均
        let mut text = String::new();
        let mut confidence_sum = 0.0f32;
        for fragment in &fragments {
            text.push_str(&fragment.text);
            confidence_sum += fragment.confidence;
        }

        let cleaned = self.strip_pattern.replace_all(&text, "").into_owned();

        (cleaned, confidence_sum / fragments.len() as f32)
    }
}

/// 预处理：解码 → 2 倍放大（平滑插值）→ 灰度 → PNG 重编码
fn preprocess(image_bytes: &[u8]) -> Option<Vec<u8>> {
    let img = image::load_from_memory(image_bytes).ok()?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return None;
    }

    let upscaled = img.resize_exact(width * 2, height * 2, FilterType::CatmullRom);
    let gray = image::DynamicImage::ImageLuma8(upscaled.to_luma8());

    let mut buf = Cursor::new(Vec::new());
    gray.write_to(&mut buf, image::ImageFormat::Png).ok()?;
    Some(buf.into_inner())
}
