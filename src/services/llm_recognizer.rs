//! 视觉 LLM 识别引擎 - 业务能力层
//!
//! `TextRecognizer` 的生产实现：把预处理后的验证码图片
//! 以 data URL 形式发给视觉模型，要求返回 JSON 格式的识别结果
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::config::Config;
use crate::services::captcha_solver::{RecognizeError, TextFragment, TextRecognizer};

const SYSTEM_PROMPT: &str = "你是一个验证码识别助手。用户发给你一张只含字母和数字的验证码图片，\
                             严格区分大小写。只返回 JSON：{\"text\": \"识别出的字符\", \"confidence\": 0到1的小数}，\
                             不要返回任何其他内容。无法辨认时返回 {\"text\": \"\", \"confidence\": 0.0}。";

/// 视觉 LLM 识别引擎
pub struct LlmRecognizer {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmRecognizer {
    /// 创建新的识别引擎（兼容 OpenAI API 的服务）
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }
}

#[async_trait]
impl TextRecognizer for LlmRecognizer {
    async fn recognize(&self, image_png: &[u8]) -> Result<Vec<TextFragment>, RecognizeError> {
        debug!("调用视觉模型识别验证码，模型: {}", self.model_name);

        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(image_png));

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| RecognizeError::Engine(e.to_string()))?;

        // 文本 + 图片的多部分用户消息
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: "识别这张验证码图片".to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: data_url,
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| RecognizeError::Engine(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(64u32)
            .build()
            .map_err(|e| RecognizeError::Engine(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RecognizeError::Engine(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RecognizeError::Parse("返回内容为空".to_string()))?;

        parse_recognition(&content)
    }
}

/// 解析模型返回的识别结果
///
/// 容忍代码块围栏；text 为空视为"没有检测到片段"
fn parse_recognition(content: &str) -> Result<Vec<TextFragment>, RecognizeError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| RecognizeError::Parse(format!("无效 JSON '{}': {}", trimmed, e)))?;

    let text = value
        .get("text")
        .and_then(|t| t.as_str())
        .ok_or_else(|| RecognizeError::Parse(format!("缺少 text 字段: {}", trimmed)))?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let confidence = value
        .get("confidence")
        .and_then(|c| c.as_f64())
        .unwrap_or(0.0) as f32;

    Ok(vec![TextFragment {
        text: text.to_string(),
        confidence: confidence.clamp(0.0, 1.0),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let fragments = parse_recognition(r#"{"text": "Ab3xY", "confidence": 0.97}"#).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "Ab3xY");
        assert!((fragments[0].confidence - 0.97).abs() < 1e-6);
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"text\": \"K9mQ\", \"confidence\": 0.91}\n```";
        let fragments = parse_recognition(content).unwrap();
        assert_eq!(fragments[0].text, "K9mQ");
    }

    #[test]
    fn test_parse_empty_text_means_no_fragments() {
        let fragments = parse_recognition(r#"{"text": "", "confidence": 0.0}"#).unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_parse_missing_confidence_defaults_to_zero() {
        let fragments = parse_recognition(r#"{"text": "Ab3x"}"#).unwrap();
        assert_eq!(fragments[0].confidence, 0.0);
    }

    #[test]
    fn test_parse_out_of_range_confidence_is_clamped() {
        let fragments = parse_recognition(r#"{"text": "Ab3x", "confidence": 1.7}"#).unwrap();
        assert_eq!(fragments[0].confidence, 1.0);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_recognition("我看不清这张图").is_err());
    }
}
