use utils_common::Post;

use crate::snippet::{contains_folded, fold_case};

/// 筛选状态 - 由界面层持有，只能通过下面的方法修改
///
/// 任何筛选条件变化都会把页码重置为 1。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_query: String,
    /// 折叠大小写后的查询，避免每篇文章重复计算
    search_folded: String,
    selected_category: Option<String>,
    selected_tags: Vec<String>,
    current_page: usize,
    page_size: usize,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_query: String::new(),
            search_folded: String::new(),
            selected_category: None,
            selected_tags: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// 已选标签，按选择顺序
    pub fn selected_tags(&self) -> &[String] {
        &self.selected_tags
    }

    /// 调用方设置的页码，可能超出总页数，读取时用 [`QueryState::effective_page`]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 是否有任何筛选条件生效
    pub fn is_filtered(&self) -> bool {
        !self.search_query.is_empty() || self.selected_category.is_some() || !self.selected_tags.is_empty()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.search_folded = fold_case(&self.search_query);
        self.current_page = 1;
    }

    /// 单选分类，`None` 表示全部
    pub fn set_category(&mut self, category: Option<String>) {
        self.selected_category = category;
        self.current_page = 1;
    }

    /// 点击标签：未选中则加入，已选中则移除
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(pos);
        } else {
            self.selected_tags.push(tag.to_string());
        }
        self.current_page = 1;
    }

    /// 整体替换已选标签，重复项只保留一个
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.selected_tags.contains(&tag) {
                self.selected_tags.push(tag);
            }
        }
        self.current_page = 1;
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
        self.current_page = 1;
    }

    /// 清除搜索、分类和标签
    pub fn clear_filters(&mut self) {
        self.search_query.clear();
        self.search_folded.clear();
        self.selected_category = None;
        self.selected_tags.clear();
        self.current_page = 1;
    }

    /// 跳转页码，0 按第 1 页处理，超出部分在读取时夹取
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// 下一页，不超过总页数
    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = (self.effective_page(total_pages) + 1).min(total_pages.max(1));
    }

    /// 上一页，不小于 1
    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// 夹取到 `[1, total_pages]` 的页码
    pub fn effective_page(&self, total_pages: usize) -> usize {
        self.current_page.clamp(1, total_pages.max(1))
    }

    /// 文本条件：查询为空，或标题/摘要/正文包含查询（大小写无关）
    ///
    /// 查询不去空白：只含空格的查询也按普通子串匹配。
    pub fn matches_search(&self, post: &Post) -> bool {
        self.search_query.is_empty()
            || contains_folded(&post.title, &self.search_folded)
            || contains_folded(&post.summary, &self.search_folded)
            || contains_folded(&post.content_plain, &self.search_folded)
    }

    /// 分类条件：未选择，或与文章分类完全相等
    pub fn matches_category(&self, post: &Post) -> bool {
        self.selected_category
            .as_deref()
            .map_or(true, |category| post.category == category)
    }

    /// 标签条件：未选择，或所选标签全部出现在文章中（交集）
    pub fn matches_tags(&self, post: &Post) -> bool {
        self.selected_tags.iter().all(|tag| post.has_tag(tag))
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.matches_search(post) && self.matches_category(post) && self.matches_tags(post)
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(crate::config::QueryConfig::default().page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(category: &str, tags: &[&str]) -> Post {
        Post {
            id: "p".to_string(),
            title: "Rust 入门".to_string(),
            summary: "摘要".to_string(),
            content_plain: "正文里提到了 WebAssembly".to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    #[test]
    fn every_filter_change_resets_page() {
        let mut state = QueryState::new(4);

        state.set_page(3);
        state.set_search_query("rust");
        assert_eq!(state.current_page(), 1);

        state.set_page(3);
        state.set_category(Some("技术分享".to_string()));
        assert_eq!(state.current_page(), 1);

        state.set_page(3);
        state.toggle_tag("wasm");
        assert_eq!(state.current_page(), 1);

        state.set_page(3);
        state.clear_tags();
        assert_eq!(state.current_page(), 1);

        state.set_page(3);
        state.set_tags(["a", "b"]);
        assert_eq!(state.current_page(), 1);

        state.set_page(3);
        state.clear_filters();
        assert_eq!(state.current_page(), 1);
        assert!(!state.is_filtered());
    }

    #[test]
    fn toggle_tag_adds_then_removes() {
        let mut state = QueryState::new(4);
        state.toggle_tag("a");
        state.toggle_tag("b");
        assert_eq!(state.selected_tags(), ["a".to_string(), "b".to_string()]);
        state.toggle_tag("a");
        assert_eq!(state.selected_tags(), ["b".to_string()]);
    }

    #[test]
    fn set_tags_dedupes() {
        let mut state = QueryState::new(4);
        state.set_tags(["a", "a", "b"]);
        assert_eq!(state.selected_tags().len(), 2);
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut state = QueryState::new(4);
        state.prev_page();
        assert_eq!(state.current_page(), 1);

        state.next_page(2);
        state.next_page(2);
        state.next_page(2);
        assert_eq!(state.current_page(), 2);

        state.set_page(0);
        assert_eq!(state.current_page(), 1);

        state.set_page(9);
        assert_eq!(state.effective_page(3), 3);
        state.next_page(3);
        assert_eq!(state.current_page(), 3);
    }

    #[test]
    fn search_matches_any_text_field_case_insensitively() {
        let p = post("技术分享", &[]);
        let mut state = QueryState::new(4);

        state.set_search_query("RUST");
        assert!(state.matches_search(&p));
        state.set_search_query("webassembly");
        assert!(state.matches_search(&p));
        state.set_search_query("摘要");
        assert!(state.matches_search(&p));
        state.set_search_query("python");
        assert!(!state.matches_search(&p));
    }

    #[test]
    fn whitespace_query_is_a_literal_substring() {
        let spaced = post("c", &[]);
        let compact = Post {
            title: "Rust".to_string(),
            summary: "摘要".to_string(),
            content_plain: "正文".to_string(),
            ..Post::default()
        };
        let mut state = QueryState::new(4);
        state.set_search_query(" ");
        assert_eq!(state.search_query(), " ");
        assert!(state.matches_search(&spaced));
        assert!(!state.matches_search(&compact));

        // 片段生成则把空白查询当作没有查询
        assert_eq!(crate::snippet::search_snippet(&compact, " "), crate::snippet::HighlightedText::plain("摘要"));
    }

    #[test]
    fn category_must_match_exactly() {
        let p = post("技术分享", &[]);
        let mut state = QueryState::new(4);
        assert!(state.matches_category(&p));
        state.set_category(Some("技术".to_string()));
        assert!(!state.matches_category(&p));
        state.set_category(Some("技术分享".to_string()));
        assert!(state.matches_category(&p));
    }

    #[test]
    fn tags_use_intersection() {
        let p = post("c", &["rust", "wasm"]);
        let mut state = QueryState::new(4);
        state.set_tags(["rust"]);
        assert!(state.matches_tags(&p));
        state.set_tags(["rust", "wasm"]);
        assert!(state.matches_tags(&p));
        state.set_tags(["rust", "go"]);
        assert!(!state.matches_tags(&p));
    }
}
