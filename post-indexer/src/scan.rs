use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use utils_common::{split_front_matter, Post, RawPost};
use walkdir::WalkDir;

use crate::markdown::strip_markdown;

pub const DEFAULT_TITLE: &str = "无标题";
pub const DEFAULT_CATEGORY: &str = "未分类";

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("源目录不存在或不是有效目录: {0:?}")]
    SourceMissing(PathBuf),

    #[error("遍历目录时出错: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("无法读取文件 {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("front-matter 格式错误: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error(transparent)]
    Build(#[from] post_query::BuildError),
}

/// 扫描结果
#[derive(Debug, Default)]
pub struct ScanReport {
    pub posts: Vec<Post>,
    /// 读取或解析失败而跳过的文件数
    pub skipped: usize,
}

/// 扫描 `<source>/<年份>/*.md`，按路径名排序
pub fn scan_posts(source: &Path) -> Result<ScanReport, IndexerError> {
    if !source.is_dir() {
        return Err(IndexerError::SourceMissing(source.to_path_buf()));
    }

    let mut report = ScanReport::default();
    let walker = WalkDir::new(source)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        match read_post(path) {
            Ok(post) => {
                tracing::debug!(id = %post.id, path = %path.display(), "解析文章");
                report.posts.push(post);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "跳过文件");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

fn read_post(path: &Path) -> Result<Post, IndexerError> {
    let text = fs::read_to_string(path).map_err(|source| IndexerError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let name = |p: Option<&Path>| {
        p.and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let year = name(path.parent());
    let file_name = name(Some(path));

    parse_post(&year, &file_name, &text)
}

/// 由年份目录名、文件名和文件内容生成文章记录
pub fn parse_post(year: &str, file_name: &str, text: &str) -> Result<Post, IndexerError> {
    let doc = split_front_matter(text);
    let raw: RawPost = match doc.meta {
        Some(meta) if !meta.trim().is_empty() => serde_yaml::from_str(meta)?,
        _ => RawPost::default(),
    };

    let mut post = Post::from(raw);
    if post.id.is_empty() {
        post.id = file_name.strip_suffix(".md").unwrap_or(file_name).to_string();
    }
    if post.title.is_empty() {
        post.title = DEFAULT_TITLE.to_string();
    }
    if post.category.is_empty() {
        post.category = DEFAULT_CATEGORY.to_string();
    }
    post.cover = cover_path(year, &post.cover);
    post.link = format!("{}/{}", year, file_name);
    post.content_plain = strip_markdown(doc.body);

    Ok(post)
}

/// 封面相对于年份目录，完整 URL 原样保留，没有封面时为空
fn cover_path(year: &str, cover: &str) -> String {
    if cover.is_empty() || cover.starts_with("http://") || cover.starts_with("https://") {
        cover.to_string()
    } else {
        format!("{}/{}", year, cover.trim_start_matches("./"))
    }
}
