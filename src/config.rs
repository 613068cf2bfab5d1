/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 门户资源根地址（验证码图片等相对路径以此为基准）
    pub portal_base_url: String,
    /// 课程选择页地址
    pub program_select_url: String,
    /// 成绩查询页地址
    pub result_page_url: String,
    /// 课程（院系）代码，对应选择页的单选项
    pub department: String,
    /// 考生类别（G = 普通）
    pub student_type: String,
    /// 同时处理的考号数量
    pub max_concurrent_rolls: usize,
    /// 每个考号的最大尝试次数
    pub max_attempts_per_roll: usize,
    /// 验证码识别置信度门槛
    pub confidence_threshold: f32,
    /// 验证码文本最小长度
    pub min_captcha_len: usize,
    /// 提交前限速等待的下限（秒）
    pub pacing_min_secs: f64,
    /// 提交前限速等待的上限（秒），必须不小于下限
    pub pacing_max_secs: f64,
    /// 单次网络请求超时（秒）
    pub request_timeout_secs: u64,
    /// CSV 导出文件路径
    pub export_csv_file: String,
    /// HTTP 服务监听地址
    pub listen_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 识别引擎（视觉 LLM）配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base_url: "http://result.rgpv.ac.in/Result/".to_string(),
            program_select_url: "http://result.rgpv.ac.in/Result/ProgramSelect.aspx".to_string(),
            result_page_url: "http://result.rgpv.ac.in/Result/BErslt.aspx".to_string(),
            department: "1".to_string(),
            student_type: "G".to_string(),
            max_concurrent_rolls: 4,
            max_attempts_per_roll: 5,
            confidence_threshold: 0.9,
            min_captcha_len: 4,
            pacing_min_secs: 5.0,
            pacing_max_secs: 7.0,
            request_timeout_secs: 15,
            export_csv_file: "result.csv".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            portal_base_url: std::env::var("PORTAL_BASE_URL").unwrap_or(default.portal_base_url),
            program_select_url: std::env::var("PROGRAM_SELECT_URL").unwrap_or(default.program_select_url),
            result_page_url: std::env::var("RESULT_PAGE_URL").unwrap_or(default.result_page_url),
            department: std::env::var("DEPARTMENT").unwrap_or(default.department),
            student_type: std::env::var("STUDENT_TYPE").unwrap_or(default.student_type),
            max_concurrent_rolls: std::env::var("MAX_CONCURRENT_ROLLS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_rolls),
            max_attempts_per_roll: std::env::var("MAX_ATTEMPTS_PER_ROLL").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_attempts_per_roll),
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.confidence_threshold),
            min_captcha_len: std::env::var("MIN_CAPTCHA_LEN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_captcha_len),
            pacing_min_secs: std::env::var("PACING_MIN_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_min_secs),
            pacing_max_secs: std::env::var("PACING_MAX_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_max_secs),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            export_csv_file: std::env::var("EXPORT_CSV_FILE").unwrap_or(default.export_csv_file),
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(default.listen_addr),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
