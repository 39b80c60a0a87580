//! 规则解析错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("表达式为空")]
    EmptyExpression,

    #[error("表达式过长: 长度 {len}, 上限 {max}")]
    ExpressionTooLong { len: usize, max: usize },

    #[error("引号未闭合: 位置 {position}")]
    UnterminatedQuote { position: usize },

    #[error("字面量中出现引号: 位置 {position}")]
    UnexpectedQuote { position: usize },

    #[error("括号不匹配: 第 {position} 个记号")]
    UnbalancedParenthesis { position: usize },

    #[error("操作符 {operator} 缺少操作数: 第 {position} 个后缀记号")]
    MissingOperand { operator: String, position: usize },

    #[error("表达式格式错误: 构建完成后剩余 {count} 个节点")]
    DanglingOperands { count: usize },

    #[error("规则嵌套过深: 深度 {depth}, 上限 {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("无效的规则行 '{rule_name}': {reason}")]
    InvalidRow { rule_name: String, reason: String },

    #[error("规则 '{rule_name}' 的父规则不存在: {parent}")]
    UnknownParent { rule_name: String, parent: String },

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    /// 是否为表达式本身的格式问题（词法或语法）
    pub fn is_malformed_expression(&self) -> bool {
        matches!(
            self,
            Self::EmptyExpression
                | Self::UnterminatedQuote { .. }
                | Self::UnexpectedQuote { .. }
                | Self::UnbalancedParenthesis { .. }
                | Self::MissingOperand { .. }
                | Self::DanglingOperands { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
