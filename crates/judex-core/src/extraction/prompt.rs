//! Instruction prompt for structured field extraction.

use crate::models::{
    DocumentType, FIELD_SCHEMA, MULTI_VALUE_DELIMITER, NOT_MENTIONED, truncate_chars,
};

/// Build the single-turn prompt for `text`, keeping at most `max_chars`
/// characters of the document.
pub fn build_prompt(text: &str, max_chars: usize) -> String {
    let fields = FIELD_SCHEMA.join(MULTI_VALUE_DELIMITER);
    let types = DocumentType::ALL
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join("/");
    let other = DocumentType::Other.label();
    let excerpt = truncate_chars(text, max_chars);

    format!(
        "你是资深法院书记员，擅长精准提取各类裁判文书的核心法律结构化要素，严格按照以下要求执行：\n\
         1. 必须提取的核心字段：{fields}\n\
         2. 提取硬性规则（严格遵守）：\n\
         \x20  - 判决日期统一格式化为【YYYY-MM-DD】，无明确判决时间则填「{nm}」；\n\
         \x20  - 多个原告/被告/申请人/被申请人/案由用【顿号{delim}】分隔，无相关信息则填「{nm}」；\n\
         \x20  - 优先提取文书中的案号、审理法院、裁判日期等关键标识信息，不得遗漏；\n\
         \x20  - 诉讼请求、法院认为、判决结果需提炼核心关键内容，不冗余、不删减关键信息，无则填「{nm}」；\n\
         \x20  - 文书类型严格填写【{types}】，无法准确判断则填「{other}」。\n\
         3. 输出唯一强制要求：\n\
         \x20  - 仅输出标准JSON格式字符串，无任何额外文字；\n\
         \x20  - JSON的key与上述提取字段完全一致，不得增删、修改、重命名字段；\n\
         \x20  - 所有value均为字符串类型，空值/无相关信息统一填「{nm}」，禁止出现null。\n\
         \n\
         【裁判文书原文（含OCR识别内容）】\n\
         {excerpt}\n",
        nm = NOT_MENTIONED,
        delim = MULTI_VALUE_DELIMITER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_field() {
        let prompt = build_prompt("正文", 3000);
        assert!(prompt.contains(&FIELD_SCHEMA.join("、")));
        assert!(prompt.contains("【民事/刑事/行政/其他】"));
        assert!(prompt.contains("YYYY-MM-DD"));
        assert!(prompt.ends_with("【裁判文书原文（含OCR识别内容）】\n正文\n"));
    }

    #[test]
    fn test_prompt_truncates_by_characters() {
        let text = "甲".repeat(3100);
        let prompt = build_prompt(&text, 3000);
        assert_eq!(prompt.matches('甲').count(), 3000);
    }
}
