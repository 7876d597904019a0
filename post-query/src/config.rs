use serde::{Deserialize, Serialize};

/// 查询引擎配置 - 整个会话内固定
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// 每页显示数量
    pub page_size: usize,
    /// 侧边栏“最近发布”的条数
    pub recent_count: usize,
    /// 阅读速度（字/分钟），用于估算阅读时间
    pub chars_per_minute: usize,
    /// 封面资源的根地址，相对封面拼到 `<cover_base>/posts/` 下
    pub cover_base: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: 4,
            recent_count: 2,
            chars_per_minute: 400,
            cover_base: "/r2".to_string(),
        }
    }
}

impl QueryConfig {
    /// 从 JSON 读取配置，缺省字段使用默认值，每页数量至少为 1
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: QueryConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.chars_per_minute = self.chars_per_minute.max(1);
        self
    }
}
