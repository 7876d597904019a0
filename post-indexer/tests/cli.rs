//! 命令行端到端测试：生成索引后用查询引擎读回

use std::fs;
use std::path::Path;
use std::process::Command;

use post_query::{PostIndex, QueryState};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn indexer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_post-indexer-cli"))
}

#[test]
fn builds_json_and_binary_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("posts");
    write(
        &source,
        "2023/old.md",
        "---\ntitle: 旧文章\ndate: 2023-05-01\ncategory: 日常\ntags: [随笔]\n---\n很久以前的故事",
    );
    write(
        &source,
        "2024/dragon.md",
        "---\ntitle: 新文章\ndate: 2024-02-01\ncategory: 技术分享\ntags: [rust]\ncover: dragon.png\n---\n## 龙\n\n关于 **dragon** 的笔记",
    );

    let output = dir.path().join("out/posts.json");
    let binary = dir.path().join("out/posts.bin");
    let status = indexer()
        .arg("--source")
        .arg(&source)
        .arg("--output")
        .arg(&output)
        .arg("--binary")
        .arg(&binary)
        .status()
        .unwrap();
    assert!(status.success());

    let index = PostIndex::from_json(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.posts()[0].id, "dragon");
    assert_eq!(index.posts()[0].cover, "2024/dragon.png");
    assert_eq!(index.posts()[0].content_plain, "龙 关于 dragon 的笔记");
    assert_eq!(index.all_categories(), ["技术分享".to_string(), "日常".to_string()]);

    let mut state = QueryState::default();
    state.set_search_query("DRAGON");
    assert_eq!(index.filter(&state).len(), 1);

    let compressed = PostIndex::from_compressed(&fs::read(&binary).unwrap()).unwrap();
    assert_eq!(compressed.posts(), index.posts());
}

#[test]
fn missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let status = indexer()
        .arg("--source")
        .arg(dir.path().join("missing"))
        .arg("--output")
        .arg(dir.path().join("posts.json"))
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!dir.path().join("posts.json").exists());
}
