use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde_json::Value;
use utils_common::{compression, parse_post_date, Post, RawPost};

use crate::error::LoadError;
use crate::state::QueryState;

/// 文章索引 - 按日期降序保存全部文章和分面
///
/// 加载后只读，重新加载时整体替换。
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    posts: Vec<Post>,
    tags: Vec<String>,
    categories: Vec<String>,
}

/// 一页查询结果
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<'a> {
    /// 当前页的文章
    pub posts: Vec<&'a Post>,
    /// 实际生效的页码（已夹取到有效范围）
    pub page: usize,
    pub total_pages: usize,
    /// 筛选后的文章总数
    pub total: usize,
    pub page_size: usize,
}

impl QueryPage<'_> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 分页条上显示的页码
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages
    }
}

/// 总页数，至少为 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

impl PostIndex {
    /// 由文章列表构建索引：去掉重复 ID，按日期稳定降序，提取分面
    pub fn new(posts: Vec<Post>) -> Self {
        let mut seen = HashSet::with_capacity(posts.len());
        let mut keyed = Vec::with_capacity(posts.len());
        for post in posts {
            if !seen.insert(post.id.clone()) {
                tracing::warn!(id = %post.id, "重复的文章 ID，保留第一篇");
                continue;
            }
            keyed.push((parse_post_date(&post.date), post));
        }

        // 稳定排序：同一天或日期无法解析的文章保持原有顺序，无法解析的排在最后
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let posts: Vec<Post> = keyed.into_iter().map(|(_, post)| post).collect();
        let tags = distinct(posts.iter().flat_map(|p| p.tags.iter()));
        let categories = distinct(posts.iter().map(|p| &p.category));

        tracing::debug!(posts = posts.len(), tags = tags.len(), categories = categories.len(), "文章索引构建完成");

        Self { posts, tags, categories }
    }

    /// 解析构建脚本生成的 JSON 数组
    ///
    /// 根节点必须是数组；不是对象的条目会被跳过，缺失字段取默认值。
    pub fn from_json(data: &[u8]) -> Result<Self, LoadError> {
        let entries: Vec<Value> = serde_json::from_slice(data)?;
        let total = entries.len();

        let posts: Vec<Post> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                if !entry.is_object() {
                    tracing::warn!(index = i, "跳过不是对象的文章条目");
                    return None;
                }
                match serde_json::from_value::<RawPost>(entry) {
                    Ok(raw) => Some(Post::from(raw)),
                    Err(e) => {
                        tracing::warn!(index = i, error = %e, "跳过无法解析的文章条目");
                        None
                    }
                }
            })
            .collect();

        if posts.len() < total {
            tracing::warn!(kept = posts.len(), total, "部分文章条目被跳过");
        }
        Ok(Self::new(posts))
    }

    /// 解析压缩的二进制索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, LoadError> {
        let posts: Vec<Post> = compression::from_compressed(data)?;
        Ok(Self::new(posts))
    }

    /// 按日期降序排列的全部文章
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// 所有标签，按首次出现的顺序
    pub fn all_tags(&self) -> &[String] {
        &self.tags
    }

    /// 所有分类，按首次出现的顺序
    pub fn all_categories(&self) -> &[String] {
        &self.categories
    }

    /// 最近发布：不受筛选影响的最新几篇
    pub fn recent_posts(&self, count: usize) -> &[Post] {
        &self.posts[..count.min(self.posts.len())]
    }

    /// 筛选后的全部文章，保持日期顺序
    pub fn filter<'a>(&'a self, state: &QueryState) -> Vec<&'a Post> {
        self.posts.iter().filter(|post| state.matches(post)).collect()
    }

    /// 筛选并分页
    pub fn query<'a>(&'a self, state: &QueryState) -> QueryPage<'a> {
        let filtered = self.filter(state);
        let page_size = state.page_size();
        let total = filtered.len();
        let total_pages = total_pages(total, page_size);
        let page = state.effective_page(total_pages);

        let start = ((page - 1) * page_size).min(total);
        let end = (start + page_size).min(total);

        QueryPage {
            posts: filtered[start..end].to_vec(),
            page,
            total_pages,
            total,
            page_size,
        }
    }
}

/// 去重并保留首次出现顺序，忽略空字符串
fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if !value.is_empty() && seen.insert(value.as_str()) {
            out.push(value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, date: &str) -> Post {
        Post {
            id: id.to_string(),
            title: format!("标题 {}", id),
            date: date.to_string(),
            ..Post::default()
        }
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn pages_newest_first() {
        let index = PostIndex::new(vec![post("a", "2024-01-01"), post("b", "2024-06-01")]);
        let mut state = QueryState::new(1);

        let page = index.query(&state);
        assert_eq!(page.total_pages, 2);
        assert_eq!(ids(&page.posts), vec!["b"]);
        assert!(page.has_next());
        assert!(!page.has_prev());

        state.set_page(2);
        let page = index.query(&state);
        assert_eq!(ids(&page.posts), vec!["a"]);
        assert!(page.has_prev());
    }

    #[test]
    fn sort_is_stable_and_puts_bad_dates_last() {
        let index = PostIndex::new(vec![
            post("x", "not a date"),
            post("a", "2024-01-01"),
            post("b", "2024-01-01"),
            post("y", ""),
            post("c", "2024-02-01T08:00:00Z"),
        ]);
        let order: Vec<&str> = index.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b", "x", "y"]);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut second = post("a", "2025-01-01");
        second.title = "second".to_string();
        let index = PostIndex::new(vec![post("a", "2024-01-01"), second]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a").unwrap().date, "2024-01-01");
    }

    #[test]
    fn page_beyond_range_is_clamped() {
        let index = PostIndex::new((0..5).map(|i| post(&i.to_string(), "2024-01-01")).collect());
        let mut state = QueryState::new(2);
        state.set_page(99);
        let page = index.query(&state);
        assert_eq!(page.page, 3);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.page_numbers(), 1..=3);
    }

    #[test]
    fn empty_index_has_one_empty_page() {
        let index = PostIndex::default();
        let page = index.query(&QueryState::new(4));
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.posts.is_empty());
        assert!(index.recent_posts(2).is_empty());
    }

    #[test]
    fn recent_posts_ignore_filters() {
        let index = PostIndex::new(vec![
            post("a", "2024-01-01"),
            post("b", "2024-03-01"),
            post("c", "2024-02-01"),
        ]);
        let recent: Vec<&str> = index.recent_posts(2).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(recent, vec!["b", "c"]);
    }

    #[test]
    fn facets_follow_sorted_first_seen_order() {
        let mut old = post("old", "2023-01-01");
        old.tags = vec!["rust".to_string(), "".to_string()];
        old.category = "技术分享".to_string();
        let mut new = post("new", "2024-01-01");
        new.tags = vec!["游戏".to_string(), "rust".to_string()];
        new.category = "游戏人生".to_string();

        let index = PostIndex::new(vec![old, new]);
        assert_eq!(index.all_tags(), ["游戏".to_string(), "rust".to_string()]);
        assert_eq!(index.all_categories(), ["游戏人生".to_string(), "技术分享".to_string()]);
    }

    #[test]
    fn json_loader_tolerates_bad_entries() {
        let json = br#"[
            {"id": "a", "title": "A", "date": "2024-01-01", "tags": ["x"], "content_plain": "body"},
            42,
            {"id": "b", "date": "2024-05-01"}
        ]"#;
        let index = PostIndex::from_json(json).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.posts()[0].id, "b");
        assert!(index.posts()[0].tags.is_empty());
        assert_eq!(index.get("a").unwrap().content_plain, "body");
    }

    #[test]
    fn json_loader_rejects_malformed_input() {
        assert!(matches!(PostIndex::from_json(b"[{"), Err(LoadError::Json(_))));
        assert!(matches!(PostIndex::from_json(br#"{"id": "a"}"#), Err(LoadError::Json(_))));
    }

    #[test]
    fn compressed_loader_round_trips_through_codec() {
        let posts = vec![post("a", "2024-01-01"), post("b", "2024-06-01")];
        let data = compression::to_compressed(&posts, compression::FORMAT_VERSION).unwrap();
        let index = PostIndex::from_compressed(&data).unwrap();
        assert_eq!(index.posts()[0].id, "b");

        assert!(matches!(PostIndex::from_compressed(b"garbage"), Err(LoadError::Codec(_))));
    }
}
