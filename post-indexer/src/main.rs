use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Arg, ArgAction, Command};
use post_query::IndexBuilder;
use tracing_subscriber::EnvFilter;

mod markdown;
mod scan;

use scan::{scan_posts, IndexerError};

// 主函数
fn main() {
    // 设置命令行参数
    let matches = Command::new("文章索引生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("扫描 Markdown 文章，生成博客使用的 posts.json")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("文章源目录，下一级为年份目录")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("public/r2/posts"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_FILE")
            .help("JSON 索引输出路径")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("public/r2/posts.json"))
        .arg(Arg::new("binary")
            .short('b')
            .long("binary")
            .value_name("BINARY_FILE")
            .help("同时输出压缩的二进制索引")
            .value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    // 两个参数都有默认值
    let (Some(source), Some(output)) = (
        matches.get_one::<PathBuf>("source"),
        matches.get_one::<PathBuf>("output"),
    ) else {
        eprintln!("错误: 缺少源目录或输出路径");
        std::process::exit(2);
    };
    let binary = matches.get_one::<PathBuf>("binary");

    tracing::info!(source = %source.display(), output = %output.display(), "开始生成索引");

    if let Err(e) = generate_index(source, output, binary.map(PathBuf::as_path)) {
        tracing::error!(error = %e, "索引生成失败");
        eprintln!("错误: 索引生成失败: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// 扫描文章并写出索引
fn generate_index(source: &Path, output: &Path, binary: Option<&Path>) -> Result<(), IndexerError> {
    let start_time = Instant::now();

    let report = scan_posts(source)?;
    tracing::info!(posts = report.posts.len(), skipped = report.skipped, "扫描完成");
    if report.posts.is_empty() {
        tracing::warn!("没有找到文章，将写出空索引");
    }

    let mut builder = IndexBuilder::new();
    for post in report.posts {
        builder.add_post(post);
    }

    builder.write_json(output)?;
    if let Some(path) = binary {
        builder.write_compressed(path)?;
    }

    tracing::info!(elapsed = ?start_time.elapsed(), "索引生成完成");
    Ok(())
}
