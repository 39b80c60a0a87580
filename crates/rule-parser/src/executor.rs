//! 规则执行器
//!
//! 按生成的谓词语义对输入编码求值：叶子在编码列表包含该编码时成立，否定叶子取反，
//! `And` / `Or` 短路求值。

use crate::error::{Result, RuleError};
use crate::models::{ExpressionTree, NodeId, NodeKind};
use crate::nested::{NestedRule, Workflow};
use crate::operators::LogicalOperator;
use crate::predicate::parse_predicate;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// 表达式树的求值结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub rule_name: Option<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: u64,
}

/// 工作流中单个根规则的求值结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleOutcome {
    pub rule_name: String,
    pub is_success: bool,
}

/// 求值过程中的显式栈帧
enum Frame {
    Enter(NodeId),
    /// 左子树已求值，按结果决定是否继续求值右子树
    AfterLeft {
        id: NodeId,
        op: LogicalOperator,
        right: NodeId,
    },
}

/// 规则执行器
#[derive(Debug, Clone, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 对表达式树求值
    pub fn evaluate<S: AsRef<str>>(&self, tree: &ExpressionTree, codes: &[S]) -> EvaluationResult {
        let start = Instant::now();
        let codes: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        let mut trace = Vec::new();

        let mut value = false;
        let mut stack = vec![Frame::Enter(tree.root())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id) => match &tree.node(id).kind {
                    NodeKind::Operand { literal, negated } => {
                        value = codes.contains(literal.as_str()) != *negated;
                        if self.trace_enabled {
                            let prefix = if *negated { "NOT " } else { "" };
                            trace.push(format!("{}{} => {}", prefix, literal, value));
                        }
                    }
                    NodeKind::Operator { op, left, right } => {
                        stack.push(Frame::AfterLeft {
                            id,
                            op: *op,
                            right: *right,
                        });
                        stack.push(Frame::Enter(*left));
                    }
                },
                Frame::AfterLeft { id, op, right } => {
                    let short_circuit = match op {
                        LogicalOperator::And => !value,
                        LogicalOperator::Or => value,
                    };
                    if short_circuit {
                        if self.trace_enabled {
                            trace.push(format!("{} #{} short-circuit => {}", op, id.index(), value));
                        }
                    } else {
                        // 右子树的结果即为当前节点的结果
                        stack.push(Frame::Enter(right));
                    }
                }
            }
        }

        EvaluationResult {
            matched: value,
            rule_name: tree.root_node().name.clone(),
            evaluation_trace: trace,
            evaluation_time_us: start.elapsed().as_micros() as u64,
        }
    }

    /// 对工作流中的每个根规则求值
    pub fn evaluate_workflow<S: AsRef<str>>(
        &self,
        workflow: &Workflow,
        codes: &[S],
    ) -> Result<Vec<RuleOutcome>> {
        let codes: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        workflow
            .rules
            .iter()
            .map(|rule| {
                Ok(RuleOutcome {
                    rule_name: rule.rule_name.clone(),
                    is_success: evaluate_nested(rule, &codes)?,
                })
            })
            .collect()
    }
}

/// 对嵌套规则求值：`And` 要求全部子规则成立，`Or` 要求任一成立
fn evaluate_nested(root: &NestedRule, codes: &HashSet<&str>) -> Result<bool> {
    // 前序收集后逆序求值，子规则的结果先于父规则得到
    let mut order: Vec<(&NestedRule, Option<usize>)> = Vec::new();
    let mut stack = vec![(root, None)];
    while let Some((rule, parent)) = stack.pop() {
        let index = order.len();
        order.push((rule, parent));
        for child in rule.children().iter().rev() {
            stack.push((child, Some(index)));
        }
    }

    let mut results: Vec<Vec<bool>> = vec![Vec::new(); order.len()];
    let mut root_value = false;
    for (index, &(rule, parent)) in order.iter().enumerate().rev() {
        let value = match rule.operator {
            Some(op) => {
                // 逆序遍历时兄弟节点从右到左出现，结果按逆序累积
                let mut children = std::mem::take(&mut results[index]);
                children.reverse();
                if children.is_empty() {
                    return Err(RuleError::InvalidRow {
                        rule_name: rule.rule_name.clone(),
                        reason: "操作符规则缺少子规则".to_string(),
                    });
                }
                match op {
                    LogicalOperator::And => children.iter().all(|&v| v),
                    LogicalOperator::Or => children.iter().any(|&v| v),
                }
            }
            None => {
                let expression = rule.expression.as_deref().unwrap_or_default();
                let (operand, negated) =
                    parse_predicate(expression).ok_or_else(|| RuleError::InvalidRow {
                        rule_name: rule.rule_name.clone(),
                        reason: format!("无法识别的谓词: {}", expression),
                    })?;
                codes.contains(operand.as_str()) != negated
            }
        };

        match parent {
            Some(p) => results[p].push(value),
            None => root_value = value,
        }
    }

    Ok(root_value)
}
