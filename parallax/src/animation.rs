use crate::controller::ViewportController;

/// 帧调度器 - 每次显示刷新回调一次
///
/// 浏览器中由 `requestAnimationFrame` 实现，测试中用 [`ManualScheduler`] 单步驱动。
pub trait FrameScheduler {
    type Handle: Copy + PartialEq + std::fmt::Debug;

    /// 请求下一帧，失败时返回 `None`
    fn request_frame(&mut self) -> Option<Self::Handle>;

    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// 可取消的循环动画
///
/// 同一时刻最多只有一个待执行的帧；停止后或过期的帧回调直接忽略。
#[derive(Debug)]
pub struct AnimationLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
    running: bool,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 当前等待执行的帧
    pub fn pending(&self) -> Option<S::Handle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// 启动循环，已在运行时什么也不做
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.schedule();
        tracing::debug!(pending = ?self.pending, "动画循环启动");
    }

    /// 停止循环并取消待执行的帧，可重复调用
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.running {
            self.running = false;
            tracing::debug!("动画循环停止");
        }
    }

    /// 帧回调：推进一帧惯性并预约下一帧
    ///
    /// 过期或停止后的回调返回 `None`，否则返回偏移是否变化。
    pub fn on_frame(&mut self, handle: S::Handle, controller: &mut ViewportController) -> Option<bool> {
        if !self.running || self.pending != Some(handle) {
            return None;
        }
        self.pending = None;

        let moved = controller.tick();
        self.schedule();
        Some(moved)
    }

    fn schedule(&mut self) {
        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            tracing::warn!("无法预约下一帧，动画循环停止");
            self.running = false;
        }
    }
}

impl<S: FrameScheduler> Drop for AnimationLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 手动调度器 - 记录预约和取消，由调用方决定何时执行帧
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    outstanding: Option<u64>,
    cancelled: Vec<u64>,
    requested: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尚未执行也未取消的帧
    pub fn outstanding(&self) -> Option<u64> {
        self.outstanding
    }

    pub fn cancelled(&self) -> &[u64] {
        &self.cancelled
    }

    /// 累计预约次数
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u64;

    fn request_frame(&mut self) -> Option<u64> {
        self.next_id += 1;
        self.requested += 1;
        self.outstanding = Some(self.next_id);
        Some(self.next_id)
    }

    fn cancel_frame(&mut self, handle: u64) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
        self.cancelled.push(handle);
    }
}

impl AnimationLoop<ManualScheduler> {
    /// 执行当前预约的帧，没有预约时返回 `None`
    pub fn step(&mut self, controller: &mut ViewportController) -> Option<bool> {
        let handle = self.scheduler.outstanding.take()?;
        self.on_frame(handle, controller)
    }
}
