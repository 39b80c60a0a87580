//! 叶子谓词生成
//!
//! 下游规则引擎对叶子节点执行字符串成员检查，谓词格式固定为
//! `input1.Contains("<编码>")`，否定时加 `!` 前缀。

use regex::Regex;
use std::sync::LazyLock;

const NOT_PREFIX: &str = "NOT ";

static PREDICATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?P<negated>!)?input1\.Contains\("(?P<operand>[^"]*)"\)$"#)
        .expect("predicate pattern is a valid regex")
});

/// 拆分操作数记号：去掉 `NOT ` 前缀（关键字不区分大小写）和首尾引号
///
/// 返回 `(编码, 是否否定)`。
pub fn split_operand(value: &str) -> (String, bool) {
    let (rest, negated) = match value.get(..NOT_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(NOT_PREFIX) => {
            (&value[NOT_PREFIX.len()..], true)
        }
        _ => (value, false),
    };

    let literal = rest
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    (literal, negated)
}

/// 生成叶子谓词
pub fn contains_predicate(literal: &str, negated: bool) -> String {
    if negated {
        format!("!input1.Contains(\"{}\")", literal)
    } else {
        format!("input1.Contains(\"{}\")", literal)
    }
}

/// 解析已生成的谓词，返回 `(编码, 是否否定)`
pub fn parse_predicate(expression: &str) -> Option<(String, bool)> {
    let caps = PREDICATE_PATTERN.captures(expression.trim())?;
    let operand = caps.name("operand")?.as_str().to_string();
    Some((operand, caps.name("negated").is_some()))
}
