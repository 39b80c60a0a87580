//! 统一可观测性模块
//!
//! 提供日志的统一初始化。所有入口通过单一入口点配置日志输出格式和级别。

pub mod tracing;

use ::tracing::info;
use anyhow::Result;

pub use crate::config::ObservabilityConfig;

/// 统一初始化可观测性
///
/// # Example
///
/// ```ignore
/// use eligibility_shared::config::AppConfig;
/// use eligibility_shared::observability;
///
/// fn main() -> anyhow::Result<()> {
///     let config = AppConfig::load("expr-to-rules")?;
///     observability::init(&config.observability)?;
///
///     // 应用逻辑...
///
///     Ok(())
/// }
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    info!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );
    Ok(())
}
