use serde::Serialize;
use std::ops::Range;
use utils_common::Post;

/// 匹配位置之前保留的字符数
pub const CONTEXT_BEFORE: usize = 30;
/// 匹配位置之后保留的字符数
pub const CONTEXT_AFTER: usize = 50;
/// 截断时使用的省略号
pub const ELLIPSIS: &str = "...";

/// 大小写折叠（逐字符转小写）
///
/// 过滤和高亮使用同一套折叠规则，保证“能筛出来的文章就能找到匹配位置”。
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// `haystack` 是否包含已折叠的 `folded_needle`
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    folded_needle.is_empty() || fold_case(haystack).contains(folded_needle)
}

/// 折叠后的文本，记录每个折叠字节对应的原文字符区间
struct FoldedText {
    folded: String,
    origin: Vec<(usize, usize)>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());

        for (start, ch) in text.char_indices() {
            let end = start + ch.len_utf8();
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat((start, end)).take(lower.len_utf8()));
            }
        }

        Self { folded, origin }
    }

    /// 所有不重叠的匹配，返回原文中的字节区间
    fn find_all(&self, folded_needle: &str) -> Vec<Range<usize>> {
        if folded_needle.is_empty() {
            return Vec::new();
        }

        let mut ranges = Vec::new();
        let mut last_end = 0;
        for (pos, matched) in self.folded.match_indices(folded_needle) {
            let start = self.origin[pos].0;
            let end = self.origin[pos + matched.len() - 1].1;
            // 一个原文字符展开成多个小写字符时，两次匹配可能落在同一字符上
            if start < last_end {
                continue;
            }
            ranges.push(start..end);
            last_end = end;
        }
        ranges
    }

    fn find_first(&self, folded_needle: &str) -> Option<Range<usize>> {
        if folded_needle.is_empty() {
            return None;
        }
        self.folded.find(folded_needle).map(|pos| {
            let start = self.origin[pos].0;
            let end = self.origin[pos + folded_needle.len() - 1].1;
            start..end
        })
    }
}

/// 带高亮区间的文本
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightedText {
    pub text: String,
    /// 需要强调的字节区间，按位置升序且互不重叠
    pub highlights: Vec<Range<usize>>,
}

impl HighlightedText {
    /// 不带高亮的纯文本
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlights: Vec::new(),
        }
    }

    /// 被高亮的片段
    pub fn marked(&self) -> impl Iterator<Item = &str> {
        self.highlights.iter().map(move |r| &self.text[r.clone()])
    }

    /// 按顺序拆成 (片段, 是否高亮)
    pub fn segments(&self) -> Vec<(&str, bool)> {
        let mut segments = Vec::with_capacity(self.highlights.len() * 2 + 1);
        let mut last = 0;
        for range in &self.highlights {
            if range.start > last {
                segments.push((&self.text[last..range.start], false));
            }
            segments.push((&self.text[range.clone()], true));
            last = range.end;
        }
        if last < self.text.len() {
            segments.push((&self.text[last..], false));
        }
        segments
    }

    /// 渲染为 HTML，高亮部分包裹 `<mark>`，其余文本做转义
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.text.len() + self.highlights.len() * 13);
        for (segment, marked) in self.segments() {
            if marked {
                html.push_str("<mark>");
                push_escaped(&mut html, segment);
                html.push_str("</mark>");
            } else {
                push_escaped(&mut html, segment);
            }
        }
        html
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// 标出 `text` 中所有与 `query` 大小写无关相等的片段
///
/// 查询只有空白时不做高亮。
pub fn highlight(text: &str, query: &str) -> HighlightedText {
    if query.trim().is_empty() {
        return HighlightedText::plain(text);
    }

    let highlights = FoldedText::new(text).find_all(&fold_case(query));
    HighlightedText {
        text: text.to_string(),
        highlights,
    }
}

/// 生成搜索结果中展示的摘要
///
/// 1. 查询为空白：原摘要
/// 2. 标题或摘要命中：带高亮的原摘要
/// 3. 只有正文命中：截取匹配前 30 字、后 50 字的上下文，截断处补省略号
/// 4. 都没有命中：原摘要
pub fn search_snippet(post: &Post, query: &str) -> HighlightedText {
    if query.trim().is_empty() {
        return HighlightedText::plain(post.summary.as_str());
    }

    let needle = fold_case(query);
    if contains_folded(&post.title, &needle) || contains_folded(&post.summary, &needle) {
        return highlight(&post.summary, query);
    }

    let content = post.content_plain.as_str();
    let Some(found) = FoldedText::new(content).find_first(&needle) else {
        return HighlightedText::plain(post.summary.as_str());
    };

    // 窗口按字符计算，避免切在多字节字符中间
    let match_start = content[..found.start].chars().count();
    let match_end = match_start + content[found.clone()].chars().count();
    let total = content.chars().count();

    let window_start = match_start.saturating_sub(CONTEXT_BEFORE);
    let window_end = (match_end + CONTEXT_AFTER).min(total);

    let byte_start = char_to_byte(content, window_start);
    let byte_end = char_to_byte(content, window_end);

    let mut snippet = String::with_capacity(byte_end - byte_start + ELLIPSIS.len() * 2);
    if window_start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(&content[byte_start..byte_end]);
    if window_end < total {
        snippet.push_str(ELLIPSIS);
    }

    highlight(&snippet, query)
}

/// 字符下标转字节下标，越界时返回文本长度
fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
