//! 规则名称生成

use uuid::Uuid;

/// 规则名称来源
///
/// 展开表达式树时为未命名节点提供唯一名称。生产环境使用 [`UuidGenerator`]，
/// 测试可使用 [`SequentialIds`] 获得确定的输出。
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// 随机 UUID v4 名称
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// 按序号递增的名称：`{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
