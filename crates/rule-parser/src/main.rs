//! 资格表达式编译命令行入口

use anyhow::Result;
use clap::Parser;
use eligibility_shared::config::AppConfig;
use eligibility_shared::observability;
use rule_parser::cli::{Cli, CommandRunner, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load("expr-to-rules").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 命令行参数优先于配置文件
    let mut obs_config = config.observability.clone();
    if let Some(level) = cli.log_level {
        obs_config.log_level = level;
    }
    observability::init(&obs_config)?;

    let runner = CommandRunner::new(&config.parser);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Table {
            expression,
            workflow,
            root_name,
        } => runner.run_table(&expression, workflow, root_name, &mut out)?,
        Commands::Nested {
            expression,
            root_name,
        } => runner.run_nested(&expression, root_name, &mut out)?,
        Commands::Eval {
            expression,
            codes,
            trace,
        } => runner.run_eval(&expression, &codes, trace, &mut out)?,
        Commands::Assemble { input } => runner.run_assemble(input.as_deref(), &mut out)?,
    }

    Ok(())
}
