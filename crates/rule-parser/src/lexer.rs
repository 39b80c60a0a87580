//! 表达式词法分析
//!
//! 将资格表达式切分为记号序列。匹配规则按优先级依次尝试：
//! 1. 双引号字面量 `"..."`（不支持转义引号）
//! 2. `NOT` + 空白 + 数字串或双引号字面量，整体作为一个记号
//! 3. 单个括号
//! 4. 关键字 `AND` / `OR`
//! 5. 其余非空白、非括号字符组成的裸字面量
//!
//! 空白只作分隔，不产生记号。裸字面量规则兜底；裸字面量中不允许出现引号，
//! 否则生成的谓词会被引号截断。

use crate::error::{Result, RuleError};
use crate::operators::LogicalOperator;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// 记号匹配模式，分支顺序即优先级
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<quoted>"[^"]*")|\bNOT\s+(?P<negated>[0-9]+\b|"[^"]+")|(?P<paren>[()])|\b(?P<keyword>AND|OR)\b|(?P<bare>[^\s()]+)"#,
    )
    .expect("token pattern is a valid regex")
});

/// 词法记号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// 双引号字面量，保留引号
    Quoted(String),
    /// `NOT` 修饰的操作数（不含关键字，保留原始引号）
    Negated(String),
    LParen,
    RParen,
    Operator(LogicalOperator),
    /// 裸字面量（未加引号的编码）
    Literal(String),
}

impl Token {
    pub fn is_operand(&self) -> bool {
        matches!(self, Self::Quoted(_) | Self::Negated(_) | Self::Literal(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quoted(text) | Self::Literal(text) => write!(f, "{}", text),
            Self::Negated(operand) => write!(f, "NOT {}", operand),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Operator(op) => write!(f, "{}", op),
        }
    }
}

/// 将表达式切分为记号序列
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for caps in TOKEN_PATTERN.captures_iter(source) {
        let token = if let Some(m) = caps.name("quoted") {
            Token::Quoted(m.as_str().to_string())
        } else if let Some(m) = caps.name("negated") {
            Token::Negated(m.as_str().to_string())
        } else if let Some(m) = caps.name("paren") {
            if m.as_str() == "(" {
                Token::LParen
            } else {
                Token::RParen
            }
        } else if let Some(m) = caps.name("keyword") {
            match LogicalOperator::from_keyword(m.as_str()) {
                Some(op) => Token::Operator(op),
                None => Token::Literal(m.as_str().to_string()),
            }
        } else if let Some(m) = caps.name("bare") {
            // 以引号开头却没匹配到引号字面量，说明引号未闭合
            if m.as_str().starts_with('"') {
                return Err(RuleError::UnterminatedQuote {
                    position: m.start(),
                });
            }
            if let Some(offset) = m.as_str().find('"') {
                return Err(RuleError::UnexpectedQuote {
                    position: m.start() + offset,
                });
            }
            Token::Literal(m.as_str().to_string())
        } else {
            continue;
        };

        tokens.push(token);
    }

    Ok(tokens)
}
