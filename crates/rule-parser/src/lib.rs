//! 资格表达式编译器
//!
//! 将人工编写的资格表达式（编码 + AND/OR/NOT + 括号）编译为规则引擎可用的形式：
//! - 词法分析与调度场算法构建二叉表达式树
//! - 展开为通过 `RuleNameFK` 关联父规则的扁平规则表
//! - 导出嵌套规则文档，或从规则表重新组装
//! - 按谓词语义对输入编码求值

pub mod assembler;
pub mod cli;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod models;
pub mod naming;
pub mod nested;
pub mod operators;
pub mod predicate;
pub mod table;

pub use assembler::{assemble, assemble_json};
pub use compiler::{parse, postfix_order, ExpressionCompiler, ParserOptions};
pub use error::{Result, RuleError};
pub use executor::{EvaluationResult, RuleExecutor, RuleOutcome};
pub use lexer::{tokenize, Token};
pub use models::{ExpressionNode, ExpressionTree, NodeId, NodeKind};
pub use naming::{IdGenerator, SequentialIds, UuidGenerator};
pub use nested::{NestedRule, Workflow, DEFAULT_MAX_NESTING_DEPTH};
pub use operators::LogicalOperator;
pub use table::{flatten, project, RuleRow, DEFAULT_WORKFLOW_NAME};
