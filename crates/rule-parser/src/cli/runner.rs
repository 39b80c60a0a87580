//! 命令执行器
//!
//! 将命令行参数转化为编译、展开、求值调用，结果以 JSON 写入给定输出。

use std::fs;
use std::io::{Read, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use eligibility_shared::config::ParserConfig;

use crate::assembler::assemble_json;
use crate::compiler::{ExpressionCompiler, ParserOptions};
use crate::executor::RuleExecutor;
use crate::models::ExpressionTree;
use crate::naming::UuidGenerator;
use crate::table::flatten;

/// 命令执行器
pub struct CommandRunner {
    compiler: ExpressionCompiler,
    workflow_name: String,
}

impl CommandRunner {
    /// 根据解析配置创建命令执行器
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            compiler: ExpressionCompiler::with_options(ParserOptions::from(config)),
            workflow_name: config.workflow_name.clone(),
        }
    }

    fn parse(&self, expression: &str, root_name: Option<String>) -> Result<ExpressionTree> {
        let tree = match root_name {
            Some(name) => self.compiler.parse_with_root_name(expression, name),
            None => self.compiler.parse(expression),
        };
        tree.with_context(|| format!("表达式解析失败: {}", expression))
    }

    /// 执行 table 命令
    pub fn run_table(
        &self,
        expression: &str,
        workflow: Option<String>,
        root_name: Option<String>,
        out: &mut impl Write,
    ) -> Result<()> {
        let workflow = workflow.unwrap_or_else(|| self.workflow_name.clone());
        let mut tree = self.parse(expression, root_name)?;
        let rows = flatten(&mut tree, &workflow, &mut UuidGenerator);

        info!(rows = rows.len(), workflow = %workflow, "规则表已生成");
        write_json(out, &rows)
    }

    /// 执行 nested 命令
    pub fn run_nested(
        &self,
        expression: &str,
        root_name: Option<String>,
        out: &mut impl Write,
    ) -> Result<()> {
        let tree = self.parse(expression, root_name)?;
        let workflow = tree
            .to_workflow(
                &self.workflow_name,
                &mut UuidGenerator,
                self.compiler.options().max_nesting_depth,
            )
            .context("嵌套规则导出失败")?;
        write_json(out, &workflow)
    }

    /// 执行 eval 命令
    pub fn run_eval(
        &self,
        expression: &str,
        codes: &[String],
        trace: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let tree = self.parse(expression, None)?;
        let executor = if trace {
            RuleExecutor::new().with_trace()
        } else {
            RuleExecutor::new()
        };

        let result = executor.evaluate(&tree, codes);
        info!(matched = result.matched, codes = codes.len(), "表达式求值完成");
        write_json(out, &result)
    }

    /// 执行 assemble 命令
    pub fn run_assemble(&self, input: Option<&str>, out: &mut impl Write) -> Result<()> {
        let content = match input {
            Some(path) => {
                fs::read_to_string(path).with_context(|| format!("无法读取规则行文件: {}", path))?
            }
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("无法读取标准输入")?;
                buffer
            }
        };

        let workflows = assemble_json(&content, self.compiler.options().max_nesting_depth)
            .context("规则行组装失败")?;
        info!(workflows = workflows.len(), "规则行组装完成");
        write_json(out, &workflows)
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
