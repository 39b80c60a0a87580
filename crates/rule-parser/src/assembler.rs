//! 规则行组装
//!
//! 从规则表读出的扁平行按 `RuleNameFK` 重新组装为嵌套规则，并按工作流分组。

use crate::error::{Result, RuleError};
use crate::nested::{NestedRule, Workflow};
use crate::table::RuleRow;
use std::collections::HashMap;
use tracing::{info, instrument};

fn invalid(row: &RuleRow, reason: &str) -> RuleError {
    RuleError::InvalidRow {
        rule_name: row.rule_name.clone(),
        reason: reason.to_string(),
    }
}

/// 校验单行规则
fn validate_row(row: &RuleRow) -> Result<()> {
    if row.rule_name.trim().is_empty() {
        return Err(invalid(row, "RuleName 不能为空"));
    }

    let has_expression = row.expression.as_deref().is_some_and(|e| !e.is_empty());
    match (row.operator, has_expression) {
        (None, false) => Err(invalid(row, "Expression 为空时必须提供 Operator")),
        (Some(_), true) => Err(invalid(row, "提供 Expression 时 Operator 必须为空")),
        _ => Ok(()),
    }
}

/// 将规则行组装为工作流
///
/// 根规则为没有 `RuleNameFK` 的行；子规则按输入顺序挂到父规则下；
/// 工作流按首次出现的顺序返回。任一规则链深度超过 `max_depth` 时拒绝组装。
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn assemble(rows: &[RuleRow], max_depth: usize) -> Result<Vec<Workflow>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        validate_row(row)?;
        if index.insert(row.rule_name.as_str(), i).is_some() {
            return Err(invalid(row, "RuleName 重复"));
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match row.rule_name_fk.as_deref().filter(|fk| !fk.is_empty()) {
            Some(parent) => {
                let &p = index.get(parent).ok_or_else(|| RuleError::UnknownParent {
                    rule_name: row.rule_name.clone(),
                    parent: parent.to_string(),
                })?;
                children[p].push(i);
            }
            None => roots.push(i),
        }
    }

    let mut built: Vec<Option<NestedRule>> = vec![None; rows.len()];
    let mut visited = vec![false; rows.len()];
    for &root in &roots {
        // 显式栈收集前序，逆序构建保证子规则先于父规则完成
        let mut order = Vec::new();
        let mut stack = vec![(root, 1)];
        while let Some((i, depth)) = stack.pop() {
            if depth > max_depth {
                return Err(RuleError::NestingTooDeep {
                    depth,
                    max: max_depth,
                });
            }
            visited[i] = true;
            order.push(i);
            stack.extend(children[i].iter().rev().map(|&c| (c, depth + 1)));
        }

        for &i in order.iter().rev() {
            let row = &rows[i];
            let rule = match row.operator {
                Some(_) if children[i].is_empty() => {
                    return Err(invalid(row, "操作符规则缺少子规则"));
                }
                None if !children[i].is_empty() => {
                    return Err(invalid(row, "叶子规则不能有子规则"));
                }
                Some(op) => {
                    let rules = children[i]
                        .iter()
                        .filter_map(|&c| built[c].take())
                        .collect();
                    NestedRule::group(row.rule_name.clone(), op, rules)
                }
                None => NestedRule::leaf(
                    row.rule_name.clone(),
                    row.expression.clone().unwrap_or_default(),
                ),
            };
            built[i] = Some(rule);
        }
    }

    // 每行只有一个父规则，无法从根到达的行必然处在环中
    if let Some(orphan) = visited.iter().position(|v| !v) {
        return Err(invalid(&rows[orphan], "RuleNameFK 形成环，无法到达根规则"));
    }

    let mut workflows: Vec<Workflow> = Vec::new();
    for &root in &roots {
        let Some(rule) = built[root].take() else {
            continue;
        };
        let name = &rows[root].workflow_name;
        match workflows.iter_mut().find(|w| &w.workflow_name == name) {
            Some(workflow) => workflow.rules.push(rule),
            None => workflows.push(Workflow::new(name.clone(), vec![rule])),
        }
    }

    info!(
        workflows = workflows.len(),
        roots = roots.len(),
        "规则行组装完成"
    );
    Ok(workflows)
}

/// 从规则行 JSON 数组组装工作流
pub fn assemble_json(json: &str, max_depth: usize) -> Result<Vec<Workflow>> {
    let rows: Vec<RuleRow> = serde_json::from_str(json)?;
    assemble(&rows, max_depth)
}
