//! 逻辑操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 逻辑操作符
///
/// 序列化为规则表中 `Operator` 列使用的 `"And"` / `"Or"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// 识别表达式中的操作符关键字（区分大小写）
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    /// 识别规则表中的操作符取值（不区分大小写）
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if label.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// 优先级：AND 高于 OR
    pub fn precedence(self) -> u8 {
        match self {
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// 规则表中 `Operator` 列的取值
    pub fn label(self) -> &'static str {
        match self {
            Self::And => "And",
            Self::Or => "Or",
        }
    }

    /// 表达式中的关键字
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
