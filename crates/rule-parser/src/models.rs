//! 表达式树领域模型
//!
//! 树以 arena 方式存放：所有节点保存在一个 `Vec` 中，子节点通过 [`NodeId`] 引用。
//! 遍历一律使用显式栈，嵌套再深也不会耗尽调用栈。

use crate::naming::IdGenerator;
use crate::operators::LogicalOperator;
use std::fmt;

/// 节点在树中的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 节点类型：操作符或操作数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Operator {
        op: LogicalOperator,
        left: NodeId,
        right: NodeId,
    },
    Operand {
        /// 去掉 `NOT` 前缀和引号后的编码
        literal: String,
        negated: bool,
    },
}

/// 表达式树节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    /// 规则名称，未设置时在展开时生成
    pub name: Option<String>,
    pub kind: NodeKind,
    pub enabled: bool,
    pub expression_type: i32,
}

impl ExpressionNode {
    pub fn operand(literal: impl Into<String>, negated: bool) -> Self {
        Self::new(NodeKind::Operand {
            literal: literal.into(),
            negated,
        })
    }

    pub fn operator(op: LogicalOperator, left: NodeId, right: NodeId) -> Self {
        Self::new(NodeKind::Operator { op, left, right })
    }

    fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            enabled: true,
            expression_type: 0,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, NodeKind::Operator { .. })
    }

    /// 子节点（左、右），叶子节点返回 `None`
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Operator { left, right, .. } => Some((left, right)),
            NodeKind::Operand { .. } => None,
        }
    }
}

/// 表达式树
///
/// 由解析器一次性构建，之后结构不再变化，只允许补充节点名称和启用标记等属性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTree {
    nodes: Vec<ExpressionNode>,
    root: NodeId,
}

impl ExpressionTree {
    /// 由解析器调用：`nodes` 中的子节点引用必须都指向已存在的节点
    pub(crate) fn from_parts(nodes: Vec<ExpressionNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &ExpressionNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: NodeId) -> &ExpressionNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ExpressionNode {
        &mut self.nodes[id.0]
    }

    /// 节点总数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 设置节点名称
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.node_mut(id).name = Some(name.into());
    }

    /// 固定根节点名称（如复用业务主键）
    pub fn set_root_name(&mut self, name: impl Into<String>) {
        self.set_name(self.root, name);
    }

    /// 为所有节点设置启用标记和表达式类型
    pub fn set_defaults(&mut self, enabled: bool, expression_type: i32) {
        for node in &mut self.nodes {
            node.enabled = enabled;
            node.expression_type = expression_type;
        }
    }

    /// 为尚未命名的节点分配名称（前序顺序），已命名的节点保持不变
    pub fn assign_names(&mut self, ids: &mut dyn IdGenerator) {
        let order: Vec<NodeId> = self.preorder().map(|(id, _)| id).collect();
        for id in order {
            let node = self.node_mut(id);
            if node.name.is_none() {
                node.name = Some(ids.next_id());
            }
        }
    }

    /// 前序遍历（节点、左子树、右子树），同时给出父节点
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![(self.root, None)],
        }
    }

    /// 树高，单个叶子为 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some((left, right)) = self.node(id).children() {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    /// 叶子节点数量
    pub fn operand_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_operator()).count()
    }

    /// 完全加括号的中缀形式，如 `((A AND B) OR C)`
    pub fn to_infix(&self) -> String {
        let mut rendered: Vec<Option<String>> = vec![None; self.nodes.len()];
        let order: Vec<NodeId> = self.preorder().map(|(id, _)| id).collect();

        // 逆前序保证子节点先于父节点处理
        for id in order.into_iter().rev() {
            let text = match &self.node(id).kind {
                NodeKind::Operand { literal, negated } => {
                    let operand = if literal.is_empty() || literal.contains(char::is_whitespace)
                    {
                        format!("\"{}\"", literal)
                    } else {
                        literal.clone()
                    };
                    if *negated {
                        format!("NOT {}", operand)
                    } else {
                        operand
                    }
                }
                NodeKind::Operator { op, left, right } => {
                    let left = rendered[left.0].take().unwrap_or_default();
                    let right = rendered[right.0].take().unwrap_or_default();
                    format!("({} {} {})", left, op, right)
                }
            };
            rendered[id.0] = Some(text);
        }

        rendered[self.root.0].take().unwrap_or_default()
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_infix())
    }
}

/// 前序遍历迭代器，产出 `(节点, 父节点)`
pub struct PreOrder<'a> {
    tree: &'a ExpressionTree,
    stack: Vec<(NodeId, Option<NodeId>)>,
}

impl Iterator for PreOrder<'_> {
    type Item = (NodeId, Option<NodeId>);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, parent) = self.stack.pop()?;
        if let Some((left, right)) = self.tree.node(id).children() {
            // 右子树先入栈，左子树先出栈
            self.stack.push((right, Some(id)));
            self.stack.push((left, Some(id)));
        }
        Some((id, parent))
    }
}
