//! 规则表投影
//!
//! 将表达式树按前序展开为扁平的规则行，每行通过 `RuleNameFK` 引用父规则，
//! 可直接批量写入规则表。

use crate::models::{ExpressionTree, NodeKind};
use crate::naming::IdGenerator;
use crate::operators::LogicalOperator;
use crate::predicate::contains_predicate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

/// 默认工作流名称
pub const DEFAULT_WORKFLOW_NAME: &str = "Eligibility";

/// 规则行，对应规则表中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleRow {
    pub rule_name: String,
    #[serde(default, deserialize_with = "deserialize_operator")]
    pub operator: Option<LogicalOperator>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub rule_expression_type: i32,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(rename = "RuleNameFK", default)]
    pub rule_name_fk: Option<String>,
    #[serde(default)]
    pub workflow_name: String,
}

impl RuleRow {
    pub fn is_root(&self) -> bool {
        self.rule_name_fk.as_deref().is_none_or(str::is_empty)
    }
}

fn default_enabled() -> bool {
    true
}

/// 表中的 `Operator` 列：空值和空串都视为无操作符，取值不区分大小写
fn deserialize_operator<'de, D>(deserializer: D) -> Result<Option<LogicalOperator>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    match label.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => LogicalOperator::from_label(label).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown operator '{}'", label))
        }),
    }
}

/// 将表达式树投影为规则行（不修改树）
///
/// 未命名节点使用 `ids` 生成的名称，多次调用得到的名称不同；
/// 需要稳定名称时使用 [`flatten`]。
pub fn project(
    tree: &ExpressionTree,
    workflow_name: &str,
    ids: &mut dyn IdGenerator,
) -> Vec<RuleRow> {
    let mut resolved: Vec<Option<String>> = vec![None; tree.len()];
    let mut rows = Vec::with_capacity(tree.len());

    for (id, parent) in tree.preorder() {
        let node = tree.node(id);
        let name = node.name.clone().unwrap_or_else(|| ids.next_id());

        let (operator, expression) = match &node.kind {
            NodeKind::Operator { op, .. } => (Some(*op), None),
            NodeKind::Operand { literal, negated } => {
                (None, Some(contains_predicate(literal, *negated)))
            }
        };

        // 前序遍历保证父节点已先处理
        let parent_name = parent.and_then(|p| resolved[p.index()].clone());

        rows.push(RuleRow {
            rule_name: name.clone(),
            operator,
            enabled: node.enabled,
            rule_expression_type: node.expression_type,
            expression,
            rule_name_fk: parent_name,
            workflow_name: workflow_name.to_string(),
        });
        resolved[id.index()] = Some(name);
    }

    rows
}

/// 为未命名节点分配名称后展开为规则行
///
/// 名称写回树中，同一棵树再次展开得到相同的规则名称。
#[instrument(skip(tree, ids), fields(nodes = tree.len()))]
pub fn flatten(
    tree: &mut ExpressionTree,
    workflow_name: &str,
    ids: &mut dyn IdGenerator,
) -> Vec<RuleRow> {
    tree.assign_names(ids);
    let rows = project(tree, workflow_name, ids);
    debug!(rows = rows.len(), "规则表展开完成");
    rows
}
