//! 嵌套规则文档
//!
//! 规则引擎直接加载的嵌套 JSON 形式：操作符规则通过 `Rules` 持有子规则，
//! 叶子规则持有谓词表达式。

use crate::error::{Result, RuleError};
use crate::models::{ExpressionTree, NodeKind};
use crate::naming::IdGenerator;
use crate::operators::LogicalOperator;
use crate::predicate::contains_predicate;
use serde::{Deserialize, Serialize};

/// 嵌套规则文档默认允许的最大深度
///
/// 嵌套规则的序列化与析构按层递归，导出前必须限制深度。
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// 嵌套规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NestedRule {
    pub rule_name: String,
    pub expression: Option<String>,
    pub operator: Option<LogicalOperator>,
    pub rules: Option<Vec<NestedRule>>,
}

impl NestedRule {
    pub fn leaf(rule_name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            expression: Some(expression.into()),
            operator: None,
            rules: None,
        }
    }

    pub fn group(
        rule_name: impl Into<String>,
        operator: LogicalOperator,
        rules: Vec<NestedRule>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            expression: None,
            operator: Some(operator),
            rules: Some(rules),
        }
    }

    /// 子规则（叶子为空切片）
    pub fn children(&self) -> &[NestedRule] {
        self.rules.as_deref().unwrap_or_default()
    }
}

/// 工作流：同一分组标签下的全部根规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workflow {
    pub workflow_name: String,
    pub rules: Vec<NestedRule>,
}

impl Workflow {
    pub fn new(workflow_name: impl Into<String>, rules: Vec<NestedRule>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            rules,
        }
    }
}

impl ExpressionTree {
    /// 转换为嵌套规则（不修改树，未命名节点使用 `ids` 生成的名称）
    ///
    /// 树高超过 `max_depth` 时返回 [`RuleError::NestingTooDeep`]，此时不会生成任何名称。
    pub fn to_nested(&self, ids: &mut dyn IdGenerator, max_depth: usize) -> Result<NestedRule> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(RuleError::NestingTooDeep {
                depth,
                max: max_depth,
            });
        }

        let order: Vec<_> = self.preorder().map(|(id, _)| id).collect();

        // 名称按前序生成，与规则表展开的顺序一致
        let mut names: Vec<String> = vec![String::new(); self.len()];
        for &id in &order {
            names[id.index()] = self
                .node(id)
                .name
                .clone()
                .unwrap_or_else(|| ids.next_id());
        }

        let mut built: Vec<Option<NestedRule>> = vec![None; self.len()];
        for &id in order.iter().rev() {
            let name = std::mem::take(&mut names[id.index()]);
            let rule = match &self.node(id).kind {
                NodeKind::Operand { literal, negated } => {
                    NestedRule::leaf(name, contains_predicate(literal, *negated))
                }
                NodeKind::Operator { op, left, right } => {
                    let children = [left, right]
                        .into_iter()
                        .filter_map(|child| built[child.index()].take())
                        .collect();
                    NestedRule::group(name, *op, children)
                }
            };
            built[id.index()] = Some(rule);
        }

        Ok(built[self.root().index()]
            .take()
            .unwrap_or_else(|| NestedRule::leaf(String::new(), String::new())))
    }

    /// 以当前树为唯一根规则构造工作流
    pub fn to_workflow(
        &self,
        workflow_name: &str,
        ids: &mut dyn IdGenerator,
        max_depth: usize,
    ) -> Result<Workflow> {
        let root = self.to_nested(ids, max_depth)?;
        Ok(Workflow::new(workflow_name, vec![root]))
    }
}
