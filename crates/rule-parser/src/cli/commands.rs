//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

/// 资格表达式编译工具
#[derive(Parser, Debug)]
#[command(name = "expr-to-rules")]
#[command(version, about = "将资格表达式编译为规则表")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，未指定时使用配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 输出扁平规则表（JSON 数组）
    Table {
        /// 资格表达式
        expression: String,

        /// 工作流名称，未指定时使用配置中的默认值
        #[arg(short, long)]
        workflow: Option<String>,

        /// 固定根规则名称
        #[arg(short, long)]
        root_name: Option<String>,
    },

    /// 输出嵌套规则文档
    Nested {
        /// 资格表达式
        expression: String,

        /// 固定根规则名称
        #[arg(short, long)]
        root_name: Option<String>,
    },

    /// 用输入编码对表达式求值
    Eval {
        /// 资格表达式
        expression: String,

        /// 输入编码，逗号分隔
        #[arg(short, long, value_delimiter = ',')]
        codes: Vec<String>,

        /// 输出评估追踪
        #[arg(long)]
        trace: bool,
    },

    /// 将规则行（JSON 数组）组装为工作流
    Assemble {
        /// 规则行文件路径，未指定时从标准输入读取
        #[arg(short, long)]
        input: Option<String>,
    },
}
