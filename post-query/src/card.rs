use serde::Serialize;
use utils_common::Post;

use crate::config::QueryConfig;
use crate::index::QueryPage;
use crate::snippet::{highlight, search_snippet};
use crate::state::QueryState;

/// 列表页上的一张文章卡片
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    /// 标题中命中的查询包裹在 `<mark>` 中
    pub title_html: String,
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
    /// 可直接使用的封面地址，没有封面时为空
    pub cover: String,
    pub link: String,
    /// 摘要或正文片段，已转义并高亮
    pub snippet_html: String,
    pub reading_minutes: usize,
}

impl PostCard {
    pub fn new(post: &Post, query: &str, config: &QueryConfig) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            title_html: highlight(&post.title, query).to_html(),
            date: post.date.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            cover: post.cover_url(&config.cover_base),
            link: post.link.clone(),
            snippet_html: search_snippet(post, query).to_html(),
            reading_minutes: post.reading_minutes(config.chars_per_minute),
        }
    }
}

/// 一页结果的完整视图，交给界面层渲染
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub cards: Vec<PostCard>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub page_numbers: Vec<usize>,
    pub search_query: String,
    pub selected_category: Option<String>,
    pub selected_tags: Vec<String>,
}

impl PageView {
    pub fn new(page: &QueryPage<'_>, state: &QueryState, config: &QueryConfig) -> Self {
        let query = state.search_query();
        Self {
            cards: page
                .posts
                .iter()
                .map(|post| PostCard::new(post, query, config))
                .collect(),
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            page_numbers: page.page_numbers().collect(),
            search_query: query.to_string(),
            selected_category: state.selected_category().map(str::to_string),
            selected_tags: state.selected_tags().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PostIndex;

    #[test]
    fn card_highlights_title_and_snippet() {
        let post = Post {
            id: "p".to_string(),
            title: "Rust <入门>".to_string(),
            summary: "学习 rust 的第一步".to_string(),
            content_plain: "x".repeat(401),
            ..Post::default()
        };
        let card = PostCard::new(&post, "RUST", &QueryConfig::default());
        assert_eq!(card.title_html, "<mark>Rust</mark> &lt;入门&gt;");
        assert_eq!(card.snippet_html, "学习 <mark>rust</mark> 的第一步");
        assert_eq!(card.reading_minutes, 2);
    }

    #[test]
    fn blank_query_leaves_text_plain() {
        let post = Post {
            title: "A & B".to_string(),
            summary: "summary".to_string(),
            ..Post::default()
        };
        let card = PostCard::new(&post, "", &QueryConfig::default());
        assert_eq!(card.title_html, "A &amp; B");
        assert_eq!(card.snippet_html, "summary");
        assert_eq!(card.cover, "");
    }

    #[test]
    fn card_resolves_cover_against_base() {
        let mut post = Post {
            cover: "2024/dragon.png".to_string(),
            ..Post::default()
        };
        let config = QueryConfig {
            cover_base: "https://cdn.example.com/r2/".to_string(),
            ..QueryConfig::default()
        };
        assert_eq!(PostCard::new(&post, "", &config).cover, "https://cdn.example.com/r2/posts/2024/dragon.png");
        assert_eq!(PostCard::new(&post, "", &QueryConfig::default()).cover, "/r2/posts/2024/dragon.png");

        post.cover = "https://img.example.com/a.png".to_string();
        assert_eq!(PostCard::new(&post, "", &config).cover, "https://img.example.com/a.png");
    }

    #[test]
    fn page_view_reflects_state() {
        let posts = (0..5)
            .map(|i| Post {
                id: i.to_string(),
                title: format!("post {}", i),
                date: format!("2024-01-0{}", i + 1),
                ..Post::default()
            })
            .collect();
        let index = PostIndex::new(posts);
        let mut state = QueryState::new(2);
        state.set_search_query("POST");
        state.set_page(3);

        let view = PageView::new(&index.query(&state), &state, &QueryConfig::default());
        assert_eq!(view.page, 3);
        assert_eq!(view.page_numbers, vec![1, 2, 3]);
        assert!(view.has_prev);
        assert!(!view.has_next);
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].title_html, "<mark>post</mark> 0");
    }
}
