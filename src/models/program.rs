/// 课程枚举
///
/// 对应门户选择页单选列表的条目顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Program {
    /// 工学学士
    Engineering = 1,
    /// 药学学士
    Pharmacy = 2,
    /// 计算机应用硕士
    Mca = 3,
    /// 工学硕士
    MTech = 4,
    /// 建筑学学士
    Architecture = 5,
    /// 工程专科
    Diploma = 6,
}

impl Program {
    /// 获取课程代码
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Program::Engineering => "Bachelor of Engineering",
            Program::Pharmacy => "Bachelor of Pharmacy",
            Program::Mca => "Master of Computer Applications",
            Program::MTech => "Master of Technology",
            Program::Architecture => "Bachelor of Architecture",
            Program::Diploma => "Diploma in Engineering",
        }
    }

    /// 从门户的课程代码字符串解析
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Program::Engineering),
            "2" => Some(Program::Pharmacy),
            "3" => Some(Program::Mca),
            "4" => Some(Program::MTech),
            "5" => Some(Program::Architecture),
            "6" => Some(Program::Diploma),
            _ => None,
        }
    }
}
