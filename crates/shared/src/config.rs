//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;

/// 表达式解析配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 规则行默认的工作流名称
    pub workflow_name: String,
    /// 新生成规则的启用标记
    pub enabled: bool,
    /// 新生成规则的表达式类型
    pub expression_type: i32,
    /// 表达式最大长度（字节）
    pub max_expression_len: usize,
    /// 嵌套规则文档的最大深度，超过时拒绝导出
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            workflow_name: "Eligibility".to_string(),
            enabled: true,
            expression_type: 0,
            max_expression_len: 64 * 1024,
            max_nesting_depth: 256,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志级别（如 "info", "debug"），RUST_LOG 优先
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub parser: ParserConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（RULES_ 前缀，层级用双下划线分隔，如
    ///    RULES_PARSER__WORKFLOW_NAME -> parser.workflow_name）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULES_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir), &env, service_name)
    }

    /// 从指定目录加载配置
    pub fn load_from(config_dir: &Path, env: &str, service_name: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(config_dir, env, service_name, None)
    }

    /// `env_vars` 为 `None` 时读取进程环境变量
    fn load_with_env(
        config_dir: &Path,
        env: &str,
        service_name: &str,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("RULES")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "eligibility-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.parser.workflow_name, "Eligibility");
        assert!(config.parser.enabled);
        assert_eq!(config.parser.expression_type, 0);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = scratch_dir("empty");
        let config = AppConfig::load_from(&dir, "development", "expr-to-rules").unwrap();

        assert_eq!(config.service_name, "expr-to-rules");
        assert_eq!(config.environment, "development");
        assert_eq!(config.parser.workflow_name, "Eligibility");
        assert!(!config.is_production());
    }

    #[test]
    fn test_layered_files_override_defaults() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("default.toml"),
            "[parser]\nworkflow_name = \"Base\"\nexpression_type = 1\n",
        )
        .unwrap();
        fs::write(
            dir.join("production.toml"),
            "[parser]\nworkflow_name = \"Eligibility\"\n\n[observability]\njson_logs = true\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir, "production", "expr-to-rules").unwrap();
        assert_eq!(config.parser.workflow_name, "Eligibility");
        assert_eq!(config.parser.expression_type, 1);
        assert!(config.parser.enabled);
        assert!(config.observability.json_logs);
        assert!(config.is_production());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = scratch_dir("env");
        fs::write(
            dir.join("default.toml"),
            "[parser]\nworkflow_name = \"Base\"\nmax_expression_len = 1024\n",
        )
        .unwrap();

        let vars: Map<String, String> = [
            ("RULES_PARSER__WORKFLOW_NAME", "FromEnv"),
            ("RULES_PARSER__MAX_EXPRESSION_LEN", "2048"),
            ("RULES_OBSERVABILITY__JSON_LOGS", "true"),
            ("OTHER_PARSER__WORKFLOW_NAME", "Ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            AppConfig::load_with_env(&dir, "development", "expr-to-rules", Some(vars)).unwrap();
        assert_eq!(config.parser.workflow_name, "FromEnv");
        assert_eq!(config.parser.max_expression_len, 2048);
        assert!(config.observability.json_logs);
        assert_eq!(config.parser.max_nesting_depth, 256);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("default.toml"), "[parser\nworkflow_name = ").unwrap();

        assert!(AppConfig::load_from(&dir, "development", "expr-to-rules").is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
