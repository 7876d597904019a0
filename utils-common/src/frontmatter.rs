/// 拆分后的 Markdown 文档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// `---` 之间的 YAML 原文，没有 front-matter 时为 `None`
    pub meta: Option<&'a str>,
    /// 正文
    pub body: &'a str,
}

const FENCE: &str = "---";

/// 把 Markdown 文本拆成 front-matter 和正文
///
/// 第一行必须恰好是 `---`（允许 BOM 和行尾空白），之后第一条 `---` 行结束元数据。
/// 找不到结束分隔符时整篇视为正文。
pub fn split_front_matter(text: &str) -> FrontMatter<'_> {
    let source = text.strip_prefix('\u{feff}').unwrap_or(text);
    let no_meta = FrontMatter { meta: None, body: text };

    let Some(first_line_end) = source.find('\n') else {
        return no_meta;
    };
    if source[..first_line_end].trim_end() != FENCE {
        return no_meta;
    }

    let meta_start = first_line_end + 1;
    let mut line_start = meta_start;
    while line_start <= source.len() {
        let line_end = source[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(source.len());

        if source[line_start..line_end].trim_end() == FENCE {
            // 元数据不含结束分隔符前的换行
            let meta = source[meta_start..line_start]
                .strip_suffix('\n')
                .map(|m| m.strip_suffix('\r').unwrap_or(m))
                .unwrap_or("");
            let body = if line_end < source.len() { &source[line_end + 1..] } else { "" };
            return FrontMatter { meta: Some(meta), body };
        }

        if line_end == source.len() {
            break;
        }
        line_start = line_end + 1;
    }

    no_meta
}
