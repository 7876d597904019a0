use wasm_bindgen::prelude::*;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod card;
pub mod config;
pub mod error;
pub mod index;
pub mod snippet;
pub mod state;
pub mod store;

pub use builder::IndexBuilder;
pub use card::{PageView, PostCard};
pub use config::QueryConfig;
pub use error::{BuildError, LoadError};
pub use index::{total_pages, PostIndex, QueryPage};
pub use snippet::{highlight, search_snippet, HighlightedText};
pub use state::QueryState;
pub use store::{LoadStatus, LoadTicket, PostStore};
pub use utils_common::Post;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 去掉 Markdown 文件开头的 front-matter，返回正文
#[wasm_bindgen]
pub fn strip_front_matter(text: &str) -> String {
    utils_common::split_front_matter(text).body.to_string()
}

fn log_error(message: &str) -> JsValue {
    console::error_1(&JsValue::from_str(message));
    JsValue::from_str(message)
}

fn to_js<T: serde::Serialize>(value: &T, what: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| log_error(&format!("序列化{}失败: {}", what, e)))
}

fn to_array(values: &[String]) -> js_sys::Array {
    values.iter().map(|v| JsValue::from_str(v)).collect()
}

/// 博客查询 JS 接口 - 每个页面持有一个实例
#[wasm_bindgen]
pub struct BlogQueryJS {
    config: QueryConfig,
    store: PostStore,
    state: QueryState,
}

#[wasm_bindgen]
impl BlogQueryJS {
    /// 创建实例，`config_json` 为空时使用默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BlogQueryJS, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_json.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => QueryConfig::from_json(json).map_err(|e| log_error(&format!("解析查询配置失败: {}", e)))?,
            None => QueryConfig::default(),
        };

        Ok(Self {
            state: QueryState::new(config.page_size),
            store: PostStore::new(),
            config,
        })
    }

    /// 开始加载，返回票据
    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(&mut self) -> u32 {
        self.store.begin_load().id()
    }

    /// 用 JSON 数据完成加载，返回结果是否被采用
    #[wasm_bindgen(js_name = completeLoad)]
    pub fn complete_load(&mut self, ticket: u32, data: &[u8]) -> bool {
        let applied = self.store.finish_json(ticket.into(), data);
        if applied {
            self.report_failure();
        }
        applied
    }

    /// 用压缩索引完成加载
    #[wasm_bindgen(js_name = completeLoadCompressed)]
    pub fn complete_load_compressed(&mut self, ticket: u32, data: &[u8]) -> bool {
        let applied = self.store.finish_compressed(ticket.into(), data);
        if applied {
            self.report_failure();
        }
        applied
    }

    /// 报告获取失败（网络错误、HTTP 状态码）
    #[wasm_bindgen(js_name = failLoad)]
    pub fn fail_load(&mut self, ticket: u32, message: &str) -> bool {
        let applied = self.store.fail(ticket.into(), message);
        if applied {
            self.report_failure();
        }
        applied
    }

    /// "loading" | "ready" | "failed"
    pub fn status(&self) -> String {
        self.store.status().as_str().to_string()
    }

    #[wasm_bindgen(js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        match self.store.status() {
            LoadStatus::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }

    #[wasm_bindgen(js_name = setSearchQuery)]
    pub fn set_search_query(&mut self, query: &str) {
        self.state.set_search_query(query);
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&mut self, category: Option<String>) {
        self.state.set_category(category);
    }

    #[wasm_bindgen(js_name = toggleTag)]
    pub fn toggle_tag(&mut self, tag: &str) {
        self.state.toggle_tag(tag);
    }

    /// 整体替换已选标签，参数为字符串数组
    #[wasm_bindgen(js_name = setTags)]
    pub fn set_tags(&mut self, tags: JsValue) -> Result<(), JsValue> {
        let tags: Vec<String> =
            serde_wasm_bindgen::from_value(tags).map_err(|e| log_error(&format!("解析标签失败: {}", e)))?;
        self.state.set_tags(tags);
        Ok(())
    }

    #[wasm_bindgen(js_name = clearTags)]
    pub fn clear_tags(&mut self) {
        self.state.clear_tags();
    }

    #[wasm_bindgen(js_name = clearFilters)]
    pub fn clear_filters(&mut self) {
        self.state.clear_filters();
    }

    #[wasm_bindgen(js_name = setPage)]
    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) {
        let total = self.store.index().query(&self.state).total_pages;
        self.state.next_page(total);
    }

    #[wasm_bindgen(js_name = prevPage)]
    pub fn prev_page(&mut self) {
        self.state.prev_page();
    }

    /// 当前页的视图：卡片、页码和筛选条件
    pub fn page(&self) -> Result<JsValue, JsValue> {
        let page = self.store.index().query(&self.state);
        let view = PageView::new(&page, &self.state, &self.config);
        to_js(&view, "分页结果")
    }

    /// 最近发布的文章卡片
    #[wasm_bindgen(js_name = recentPosts)]
    pub fn recent_posts(&self) -> Result<JsValue, JsValue> {
        let cards: Vec<PostCard> = self
            .store
            .index()
            .recent_posts(self.config.recent_count)
            .iter()
            .map(|post| PostCard::new(post, "", &self.config))
            .collect();
        to_js(&cards, "最近文章")
    }

    #[wasm_bindgen(js_name = allTags)]
    pub fn all_tags(&self) -> js_sys::Array {
        to_array(self.store.index().all_tags())
    }

    #[wasm_bindgen(js_name = allCategories)]
    pub fn all_categories(&self) -> js_sys::Array {
        to_array(self.store.index().all_categories())
    }

    /// 按 ID 获取文章，不存在时返回 `undefined`
    pub fn post(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.store.index().get(id) {
            Some(post) => to_js(post, "文章"),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// 页面卸载时调用，之后的加载结果不再生效
    pub fn destroy(&mut self) {
        self.store.teardown();
    }
}

impl BlogQueryJS {
    fn report_failure(&self) {
        if let LoadStatus::Failed(e) = self.store.status() {
            console::error_1(&JsValue::from_str(&e.to_string()));
        }
    }
}
