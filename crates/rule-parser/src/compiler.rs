//! 表达式编译器
//!
//! 词法分析 → 中缀转后缀（调度场算法）→ 构建二叉表达式树。

use crate::error::{Result, RuleError};
use crate::lexer::{tokenize, Token};
use crate::models::{ExpressionNode, ExpressionTree, NodeId};
use crate::nested::DEFAULT_MAX_NESTING_DEPTH;
use crate::operators::LogicalOperator;
use crate::predicate::split_operand;
use eligibility_shared::config::ParserConfig;
use tracing::{debug, instrument};

/// 编译选项
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// 表达式最大长度（字节）
    pub max_expression_len: usize,
    /// 导出嵌套规则时允许的最大深度
    pub max_nesting_depth: usize,
    /// 新建节点的启用标记
    pub enabled: bool,
    /// 新建节点的表达式类型
    pub expression_type: i32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_expression_len: 64 * 1024,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            enabled: true,
            expression_type: 0,
        }
    }
}

impl From<&ParserConfig> for ParserOptions {
    fn from(config: &ParserConfig) -> Self {
        Self {
            max_expression_len: config.max_expression_len,
            max_nesting_depth: config.max_nesting_depth,
            enabled: config.enabled,
            expression_type: config.expression_type,
        }
    }
}

/// 表达式编译器
#[derive(Debug, Clone, Default)]
pub struct ExpressionCompiler {
    options: ParserOptions,
}

impl ExpressionCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// 解析表达式为表达式树
    #[instrument(skip(self, expression), fields(len = expression.len()))]
    pub fn parse(&self, expression: &str) -> Result<ExpressionTree> {
        if expression.len() > self.options.max_expression_len {
            return Err(RuleError::ExpressionTooLong {
                len: expression.len(),
                max: self.options.max_expression_len,
            });
        }

        let tokens = tokenize(expression)?;
        let token_count = tokens.len();
        let postfix = to_postfix(tokens)?;
        let mut tree = build_tree(postfix)?;

        tree.set_defaults(self.options.enabled, self.options.expression_type);

        debug!(
            tokens = token_count,
            nodes = tree.len(),
            "表达式解析完成"
        );
        Ok(tree)
    }

    /// 解析表达式并固定根节点名称
    pub fn parse_with_root_name(
        &self,
        expression: &str,
        root_name: impl Into<String>,
    ) -> Result<ExpressionTree> {
        let mut tree = self.parse(expression)?;
        tree.set_root_name(root_name);
        Ok(tree)
    }
}

/// 使用默认选项解析表达式
pub fn parse(expression: &str) -> Result<ExpressionTree> {
    ExpressionCompiler::new().parse(expression)
}

/// 表达式的后缀记号序列（诊断用）
pub fn postfix_order(expression: &str) -> Result<Vec<String>> {
    let postfix = to_postfix(tokenize(expression)?)?;
    Ok(postfix.iter().map(ToString::to_string).collect())
}

/// 调度场栈中的待处理项
enum Pending {
    /// 左括号及其记号位置
    Open(usize),
    Operator(LogicalOperator),
}

/// 中缀转后缀
///
/// 遇到操作符时先弹出所有优先级大于等于它的操作符（左结合），括号只作分组标记，
/// 不进入输出。
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut stack: Vec<Pending> = Vec::new();
    let mut output = Vec::with_capacity(tokens.len());

    for (position, token) in tokens.into_iter().enumerate() {
        match token {
            Token::Operator(op) => {
                while let Some(&Pending::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Token::Operator(top));
                    stack.pop();
                }
                stack.push(Pending::Operator(op));
            }
            Token::LParen => stack.push(Pending::Open(position)),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Pending::Operator(op)) => output.push(Token::Operator(op)),
                    Some(Pending::Open(_)) => break,
                    None => return Err(RuleError::UnbalancedParenthesis { position }),
                }
            },
            operand => output.push(operand),
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Operator(op) => output.push(Token::Operator(op)),
            Pending::Open(position) => return Err(RuleError::UnbalancedParenthesis { position }),
        }
    }

    Ok(output)
}

/// 由后缀记号序列构建表达式树
///
/// 操作符弹出两个操作数：先弹出的是右子节点，后弹出的是左子节点。
pub fn build_tree(postfix: Vec<Token>) -> Result<ExpressionTree> {
    let mut nodes: Vec<ExpressionNode> = Vec::with_capacity(postfix.len());
    let mut stack: Vec<NodeId> = Vec::new();

    for (position, token) in postfix.into_iter().enumerate() {
        let node = match token {
            Token::Operator(op) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(RuleError::MissingOperand {
                        operator: op.to_string(),
                        position,
                    });
                };
                ExpressionNode::operator(op, left, right)
            }
            Token::LParen | Token::RParen => {
                return Err(RuleError::UnbalancedParenthesis { position });
            }
            operand => {
                let (literal, negated) = split_operand(&operand.to_string());
                ExpressionNode::operand(literal, negated)
            }
        };

        stack.push(NodeId(nodes.len()));
        nodes.push(node);
    }

    match stack.as_slice() {
        [] => Err(RuleError::EmptyExpression),
        [root] => Ok(ExpressionTree::from_parts(nodes, *root)),
        rest => Err(RuleError::DanglingOperands { count: rest.len() }),
    }
}
