use std::path::PathBuf;
use thiserror::Error;
use utils_common::CodecError;

/// 索引加载失败
///
/// 只有加载阶段会失败，查询本身是全函数。调用方通过状态位展示错误，不会自动重试。
#[derive(Debug, Error)]
pub enum LoadError {
    /// 调用方报告的获取失败（网络错误、HTTP 状态码等）
    #[error("获取文章索引失败: {0}")]
    Fetch(String),

    /// JSON 语法错误或根节点不是数组
    #[error("解析文章索引失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 压缩索引无法解码
    #[error("解码压缩索引失败: {0}")]
    Codec(#[from] CodecError),
}

/// 索引写出失败
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("无法写入索引文件 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("序列化索引失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("压缩索引失败: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_converts_into_load_error() {
        let err: LoadError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, LoadError::Json(_)));
        assert!(err.to_string().starts_with("解析文章索引失败"));
    }

    #[test]
    fn build_error_names_the_path() {
        let err = BuildError::Io {
            path: PathBuf::from("/tmp/posts.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/posts.json"));
        assert!(msg.contains("denied"));
    }
}
