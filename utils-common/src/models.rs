use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 文章记录 - 构建期索引中的一条，加载后只读
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Post {
    /// 文章唯一标识符
    pub id: String,
    /// 文章标题
    pub title: String,
    /// 发布日期（ISO 格式字符串，排序时再解析）
    pub date: String,
    /// 分类（单值）
    pub category: String,
    /// 标签列表，匹配时按集合处理，展示时保留顺序
    pub tags: Vec<String>,
    /// 封面路径或完整 URL
    pub cover: String,
    /// Markdown 源文件的相对路径
    pub link: String,
    /// 文章摘要
    pub summary: String,
    /// 去除 Markdown 语法后的正文，仅用于搜索
    pub content_plain: String,
}

impl Post {
    /// 文章是否带有指定标签
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// 估算阅读时间（分钟），向上取整
    pub fn reading_minutes(&self, chars_per_minute: usize) -> usize {
        let chars = self.content_plain.chars().count();
        chars.div_ceil(chars_per_minute.max(1))
    }

    /// 封面的完整地址：已是 http(s) 链接则原样返回，否则拼到 `<base>/posts/` 下
    pub fn cover_url(&self, base: &str) -> String {
        if self.cover.is_empty() || self.cover.starts_with("http://") || self.cover.starts_with("https://") {
            return self.cover.clone();
        }
        format!("{}/posts/{}", base.trim_end_matches('/'), self.cover.trim_start_matches('/'))
    }
}

/// 宽松的文章结构 - 对应 JSON 索引和 front-matter 中的原始字段
///
/// 缺失的字段取默认值，数字和布尔值会被转成字符串，
/// `tags` 既可以是数组也可以是逗号分隔的字符串。
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawPost {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub cover: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(alias = "contentPlain", deserialize_with = "lenient_string")]
    pub content_plain: String,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        // 同一篇文章内的重复标签只保留第一次出现
        let mut tags: Vec<String> = Vec::with_capacity(raw.tags.len());
        for tag in raw.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Post {
            id: raw.id,
            title: raw.title,
            date: raw.date,
            category: raw.category,
            tags,
            cover: raw.cover,
            link: raw.link,
            summary: raw.summary,
            content_plain: raw.content_plain,
        }
    }
}

/// 把任意标量转成字符串，null、数组和对象视为空字符串
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let tags = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(scalar_to_string)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Value::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    };
    Ok(tags)
}
