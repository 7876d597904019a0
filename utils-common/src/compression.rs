use std::io::{self, Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use thiserror::Error;

/// 魔数常量 - 用于标识文章索引文件
pub const MAGIC_BYTES: &[u8] = b"BLGIX";

/// 当前写出的索引格式版本
pub const FORMAT_VERSION: [u8; 2] = [1, 0];

/// 魔数 + 版本号 + 原始长度
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 索引编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    /// 数据不足一个文件头
    #[error("数据太短，无法解析: {len} 字节")]
    TooShort { len: usize },

    /// 魔数不匹配，不是本格式的文件
    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    /// 主版本号高于读取方支持的版本
    #[error("不支持的版本: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// 解压后的长度与文件头记录不一致
    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("序列化失败: {0}")]
    Encode(String),

    #[error("反序列化失败: {0}")]
    Decode(String),

    #[error("压缩流读写失败: {0}")]
    Io(#[from] io::Error),
}

/// 索引文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: [u8; 2],
    /// 解压后的 bincode 数据长度
    pub payload_len: usize,
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serde::encode_to_vec(obj, bincode::config::standard())
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    bincode::serde::decode_from_slice(data, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// 将对象序列化并压缩，写出带文件头的索引数据
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;
    let payload_len = u32::try_from(binary.len())
        .map_err(|_| CodecError::Encode(format!("数据过大: {} 字节", binary.len())))?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(binary.len() / 2), Compression::best());
    encoder.write_all(&binary)?;
    let compressed = encoder.finish()?;

    let mut output = Vec::with_capacity(HEADER_LEN + compressed.len());
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&payload_len.to_le_bytes());
    output.extend_from_slice(&compressed);

    tracing::debug!(raw = binary.len(), compressed = output.len(), "索引压缩完成");
    Ok(output)
}

/// 读取并校验文件头，主版本号不能超过 `max_major`
pub fn read_header(data: &[u8], max_major: u8) -> Result<IndexHeader, CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort { len: data.len() });
    }
    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_major {
        return Err(CodecError::UnsupportedVersion { major: version[0], minor: version[1] });
    }

    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[version_offset + 2..HEADER_LEN]);

    Ok(IndexHeader {
        version,
        payload_len: u32::from_le_bytes(size_bytes) as usize,
    })
}

/// 解压并反序列化索引数据，支持的最大主版本为当前格式版本
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    from_compressed_with_max_version(data, FORMAT_VERSION[0])
}

/// 解压并反序列化索引数据，允许指定支持的最大主版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_major: u8,
) -> Result<T, CodecError> {
    let header = read_header(data, max_major)?;

    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    // 文件头中的长度不可信，预分配设上限
    let mut payload = Vec::with_capacity(header.payload_len.min(16 << 20));
    decoder.read_to_end(&mut payload)?;

    if payload.len() != header.payload_len {
        return Err(CodecError::SizeMismatch {
            expected: header.payload_len,
            actual: payload.len(),
        });
    }

    from_binary(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

    fn sample() -> Vec<Post> {
        vec![Post {
            id: "a".to_string(),
            title: "龙与地下城".to_string(),
            tags: vec!["游戏".to_string()],
            content_plain: "dragon ".repeat(50),
            ..Post::default()
        }]
    }

    #[test]
    fn compressed_index_restores_posts() {
        let data = to_compressed(&sample(), FORMAT_VERSION).unwrap();
        assert!(data.starts_with(MAGIC_BYTES));
        let posts: Vec<Post> = from_compressed(&data).unwrap();
        assert_eq!(posts, sample());
    }

    #[test]
    fn header_reports_version_and_length() {
        let data = to_compressed(&sample(), [1, 3]).unwrap();
        let header = read_header(&data, 1).unwrap();
        assert_eq!(header.version, [1, 3]);
        assert_eq!(header.payload_len, to_binary(&sample()).unwrap().len());
    }

    #[test]
    fn rejects_short_and_foreign_data() {
        assert!(matches!(read_header(b"BLG", 1), Err(CodecError::TooShort { len: 3 })));
        assert!(matches!(read_header(b"NECMP\x03\x00\x00\x00\x00\x00", 9), Err(CodecError::BadMagic)));
    }

    #[test]
    fn rejects_newer_major_version() {
        let data = to_compressed(&sample(), [2, 0]).unwrap();
        let err = from_compressed::<Vec<Post>>(&data).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion { major: 2, minor: 0 }));
        assert!(err.to_string().contains("2.0"));
    }

    #[test]
    fn detects_size_mismatch() {
        let mut data = to_compressed(&sample(), FORMAT_VERSION).unwrap();
        let offset = MAGIC_BYTES.len() + 2;
        data[offset] = data[offset].wrapping_add(1);
        assert!(matches!(
            from_compressed::<Vec<Post>>(&data),
            Err(CodecError::SizeMismatch { .. })
        ));
    }
}
