//! ASP.NET 隐藏表单状态
//!
//! 门户的每个页面都带一组隐藏令牌，提交时必须原样带回，
//! 字段名是门户的固定契约

use scraper::{Html, Selector};

pub const VIEWSTATE_FIELD: &str = "__VIEWSTATE";
pub const VIEWSTATE_GENERATOR_FIELD: &str = "__VIEWSTATEGENERATOR";
pub const EVENT_VALIDATION_FIELD: &str = "__EVENTVALIDATION";

pub const PROGRAM_LIST_FIELD: &str = "radlstProgram";
pub const ROLL_FIELD: &str = "ctl00$ContentPlaceHolder1$txtrollno";
pub const SEMESTER_FIELD: &str = "ctl00$ContentPlaceHolder1$drpSemester";
pub const STUDENT_TYPE_FIELD: &str = "ctl00$ContentPlaceHolder1$rbtnlstSType";
pub const CAPTCHA_FIELD: &str = "ctl00$ContentPlaceHolder1$TextBox1";
pub const SUBMIT_FIELD: &str = "ctl00$ContentPlaceHolder1$btnviewresult";
pub const SUBMIT_VALUE: &str = "View Result";

/// 页面隐藏令牌三元组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub viewstate: String,
    pub generator: String,
    pub validation: String,
}

impl FormState {
    /// 从已解析的页面中提取隐藏令牌
    ///
    /// 三个令牌缺一不可，任何一个缺失都视为页面不可用
    pub fn extract(doc: &Html) -> Option<Self> {
        Some(Self {
            viewstate: input_value_by_id(doc, VIEWSTATE_FIELD)?,
            generator: input_value_by_id(doc, VIEWSTATE_GENERATOR_FIELD)?,
            validation: input_value_by_id(doc, EVENT_VALIDATION_FIELD)?,
        })
    }
}

/// 按 id 读取 input 元素的 value 属性
pub fn input_value_by_id(doc: &Html, id: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"input[id="{}"]"#, id)).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// 选择页单选项的 input id
pub fn program_radio_id(department: &str) -> String {
    format!("{}_{}", PROGRAM_LIST_FIELD, department)
}

/// 课程选择提交的事件目标（id 中的 `_` 换成 `$`）
pub fn program_event_target(department: &str) -> String {
    format!("{}${}", PROGRAM_LIST_FIELD, department)
}

/// 构造课程选择请求的表单参数
pub fn program_select_params(
    form: &FormState,
    department: &str,
    radio_value: &str,
) -> Vec<(String, String)> {
    vec![
        ("__EVENTTARGET".to_string(), program_event_target(department)),
        ("__EVENTARGUMENT".to_string(), String::new()),
        ("__LASTFOCUS".to_string(), String::new()),
        (VIEWSTATE_FIELD.to_string(), form.viewstate.clone()),
        (VIEWSTATE_GENERATOR_FIELD.to_string(), form.generator.clone()),
        (EVENT_VALIDATION_FIELD.to_string(), form.validation.clone()),
        (PROGRAM_LIST_FIELD.to_string(), radio_value.to_string()),
    ]
}

/// 构造成绩查询请求的表单参数
pub fn result_query_params(
    form: &FormState,
    roll_no: &str,
    semester: &str,
    student_type: &str,
    captcha_text: &str,
) -> Vec<(String, String)> {
    vec![
        ("__EVENTTARGET".to_string(), String::new()),
        ("__EVENTARGUMENT".to_string(), String::new()),
        ("__LASTFOCUS".to_string(), String::new()),
        (VIEWSTATE_FIELD.to_string(), form.viewstate.clone()),
        (VIEWSTATE_GENERATOR_FIELD.to_string(), form.generator.clone()),
        (EVENT_VALIDATION_FIELD.to_string(), form.validation.clone()),
        (ROLL_FIELD.to_string(), roll_no.to_string()),
        (SEMESTER_FIELD.to_string(), semester.to_string()),
        (STUDENT_TYPE_FIELD.to_string(), student_type.to_string()),
        (CAPTCHA_FIELD.to_string(), captcha_text.to_string()),
        (SUBMIT_FIELD.to_string(), SUBMIT_VALUE.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <html><body><form>
            <input type="hidden" id="__VIEWSTATE" value="vs-token" />
            <input type="hidden" id="__VIEWSTATEGENERATOR" value="gen-token" />
            <input type="hidden" id="__EVENTVALIDATION" value="ev-token" />
            <input type="radio" id="radlstProgram_1" value="B.E." />
        </form></body></html>
    "#;

    #[test]
    fn test_extract_hidden_tokens() {
        let doc = Html::parse_document(SAMPLE_PAGE);
        let form = FormState::extract(&doc).expect("示例页面包含全部令牌");
        assert_eq!(form.viewstate, "vs-token");
        assert_eq!(form.generator, "gen-token");
        assert_eq!(form.validation, "ev-token");
    }

    #[test]
    fn test_extract_missing_token() {
        let doc = Html::parse_document("<html><body><form></form></body></html>");
        assert!(FormState::extract(&doc).is_none());
    }

    #[test]
    fn test_radio_value_lookup() {
        let doc = Html::parse_document(SAMPLE_PAGE);
        assert_eq!(
            input_value_by_id(&doc, &program_radio_id("1")).as_deref(),
            Some("B.E.")
        );
        assert!(input_value_by_id(&doc, &program_radio_id("2")).is_none());
    }

    #[test]
    fn test_program_select_params_echo_tokens() {
        let form = FormState {
            viewstate: "vs".into(),
            generator: "gen".into(),
            validation: "ev".into(),
        };
        let params = program_select_params(&form, "1", "B.E.");
        assert!(params.contains(&("__EVENTTARGET".to_string(), "radlstProgram$1".to_string())));
        assert!(params.contains(&(VIEWSTATE_FIELD.to_string(), "vs".to_string())));
        assert!(params.contains(&(PROGRAM_LIST_FIELD.to_string(), "B.E.".to_string())));
    }

    #[test]
    fn test_result_query_params_carry_all_fields() {
        let form = FormState {
            viewstate: "vs".into(),
            generator: "gen".into(),
            validation: "ev".into(),
        };
        let params = result_query_params(&form, "0101CS211001", "6", "G", "Ab3xY");
        assert!(params.contains(&(ROLL_FIELD.to_string(), "0101CS211001".to_string())));
        assert!(params.contains(&(SEMESTER_FIELD.to_string(), "6".to_string())));
        assert!(params.contains(&(STUDENT_TYPE_FIELD.to_string(), "G".to_string())));
        assert!(params.contains(&(CAPTCHA_FIELD.to_string(), "Ab3xY".to_string())));
        assert!(params.contains(&(SUBMIT_FIELD.to_string(), SUBMIT_VALUE.to_string())));
    }
}
