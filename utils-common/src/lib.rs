pub mod compression;
pub mod dates;
pub mod frontmatter;
pub mod models;

// 重新导出常用类型和函数，方便直接使用
pub use compression::{to_compressed, from_compressed, read_header, CodecError, IndexHeader, FORMAT_VERSION};
pub use dates::parse_post_date;
pub use frontmatter::{split_front_matter, FrontMatter};
pub use models::{Post, RawPost};
