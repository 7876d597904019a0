use crate::error::LoadError;
use crate::index::PostIndex;

/// 加载请求的票据，每次 [`PostStore::begin_load`] 递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u32);

impl LoadTicket {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for LoadTicket {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// 索引的加载状态
#[derive(Debug)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(LoadError),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    /// 状态名，供界面层显示
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Loading => "loading",
            LoadStatus::Ready => "ready",
            LoadStatus::Failed(_) => "failed",
        }
    }
}

/// 文章存储 - 持有当前索引和异步加载状态
///
/// 获取数据由调用方完成：先 `begin_load` 拿到票据，拿到数据后用同一张票据完成。
/// 只有最后发出的票据会被采用，`teardown` 之后的完成一律忽略。
#[derive(Debug)]
pub struct PostStore {
    index: PostIndex,
    status: LoadStatus,
    latest: u32,
    torn_down: bool,
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore {
    /// 新建存储，初始状态为加载中，索引为空
    pub fn new() -> Self {
        Self {
            index: PostIndex::default(),
            status: LoadStatus::Loading,
            latest: 0,
            torn_down: false,
        }
    }

    pub fn index(&self) -> &PostIndex {
        &self.index
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// 开始一次加载，之前发出的票据随即作废
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest = self.latest.wrapping_add(1);
        self.status = LoadStatus::Loading;
        tracing::debug!(ticket = self.latest, "开始加载文章索引");
        LoadTicket(self.latest)
    }

    /// 用加载结果完成票据，返回结果是否被采用
    ///
    /// 失败时保留已有的索引，状态变为 `Failed`。
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<PostIndex, LoadError>) -> bool {
        if self.torn_down {
            tracing::debug!(ticket = ticket.0, "存储已销毁，忽略加载结果");
            return false;
        }
        if ticket.0 != self.latest {
            tracing::debug!(ticket = ticket.0, latest = self.latest, "忽略过期的加载结果");
            return false;
        }

        match result {
            Ok(index) => {
                tracing::debug!(ticket = ticket.0, posts = index.len(), "文章索引加载完成");
                self.index = index;
                self.status = LoadStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = %e, "文章索引加载失败");
                self.status = LoadStatus::Failed(e);
            }
        }
        true
    }

    /// 用 JSON 字节完成加载
    pub fn finish_json(&mut self, ticket: LoadTicket, data: &[u8]) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.complete_load(ticket, PostIndex::from_json(data))
    }

    /// 用压缩索引完成加载
    pub fn finish_compressed(&mut self, ticket: LoadTicket, data: &[u8]) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.complete_load(ticket, PostIndex::from_compressed(data))
    }

    /// 报告获取失败
    pub fn fail(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        self.complete_load(ticket, Err(LoadError::Fetch(message.into())))
    }

    /// 销毁存储，之后的加载结果都不再生效
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    // 过期票据不必解析数据
    fn accepts(&self, ticket: LoadTicket) -> bool {
        !self.torn_down && ticket.0 == self.latest
    }
}
