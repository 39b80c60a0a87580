//! CLI 模块
//!
//! - `table` - 输出扁平规则表
//! - `nested` - 输出嵌套规则文档
//! - `eval` - 用输入编码对表达式求值
//! - `assemble` - 将规则行组装为工作流
//!
//! # 使用示例
//!
//! ```bash
//! expr-to-rules table '97126 AND (97350 OR NOT 97180)' --workflow Eligibility
//! expr-to-rules eval '97126 AND NOT 97180' --codes 97126,97350
//! expr-to-rules table '97126 OR 97350' | expr-to-rules assemble
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
