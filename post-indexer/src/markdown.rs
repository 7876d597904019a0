use once_cell::sync::Lazy;
use regex::Regex;

// 按顺序应用的替换规则：(正则, 替换内容)
static RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // 代码围栏只去掉围栏行，保留代码
        (r"(?m)^\s*(```|~~~).*$", ""),
        (r"(?m)^\s*\[[^\]]+\]:\s*\S+.*$", ""),
        (r"!\[([^\]]*)\]\([^)]*\)", "$1"),
        (r"\[([^\]]*)\]\([^)]*\)", "$1"),
        (r"\[([^\]]+)\]\[[^\]]*\]", "$1"),
        (r"<(https?://[^>\s]+)>", "$1"),
        (r"</?[A-Za-z][^>]*>", ""),
        (r"(?m)^\s{0,3}#{1,6}\s*", ""),
        (r"(?m)^(\s{0,3}>\s?)+", ""),
        (r"(?m)^\s{0,3}([-*_]\s*){3,}$", ""),
        (r"(?m)^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)*\|?\s*$", ""),
        (r"(?m)^\s*([-*+]|\d+[.)])\s+", ""),
        (r"\|", " "),
        (r"\*\*([^*\n]+)\*\*", "$1"),
        (r"__([^_\n]+)__", "$1"),
        (r"\*([^*\n]+)\*", "$1"),
        (r"\b_([^_\n]+)_\b", "$1"),
        (r"~~([^~\n]+)~~", "$1"),
        (r"`([^`\n]+)`", "$1"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
        Ok(re) => Some((re, replacement)),
        Err(e) => {
            tracing::error!(pattern, error = %e, "无效的正则");
            None
        }
    })
    .collect()
});

static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

/// 去掉 Markdown 语法，换行和连续空白合并为一个空格
pub fn strip_markdown(source: &str) -> String {
    let mut text = source.to_string();
    for (re, replacement) in RULES.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(&text, " ").trim().to_string(),
        None => text.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}
