use std::fs;
use std::path::Path;

use utils_common::{to_compressed, Post, FORMAT_VERSION};

use crate::error::BuildError;

/// 索引构建器 - 收集文章并写出 JSON 或压缩索引
#[derive(Debug, Default)]
pub struct IndexBuilder {
    posts: Vec<Post>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一篇文章，顺序即写出顺序
    pub fn add_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// 格式化的 JSON 数组
    pub fn to_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(&self.posts)?)
    }

    /// 写出 JSON 索引，自动创建上级目录
    pub fn write_json(&self, path: &Path) -> Result<(), BuildError> {
        let json = self.to_json()?;
        write_file(path, json.as_bytes())?;
        tracing::info!(path = %path.display(), posts = self.posts.len(), bytes = json.len(), "JSON 索引已写入");
        Ok(())
    }

    /// 写出压缩的二进制索引
    pub fn write_compressed(&self, path: &Path) -> Result<(), BuildError> {
        let data = to_compressed(&self.posts, FORMAT_VERSION)?;
        write_file(path, &data)?;
        tracing::info!(path = %path.display(), posts = self.posts.len(), bytes = data.len(), "压缩索引已写入");
        Ok(())
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, data).map_err(io_err)
}
