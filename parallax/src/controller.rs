use serde::Serialize;

use crate::config::{nearest_index, ConfigError, ViewportConfig};
use crate::layers::{container_transform, LayerStyle, LayerTransform};
use crate::vector::Vec2;

/// 指针事件 - 鼠标和触摸已在上游统一
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    Leave,
}

impl PointerEvent {
    /// 由 `down | move | up | leave` 和坐标构造，未知类型返回 `None`
    pub fn from_parts(kind: &str, x: f64, y: f64) -> Option<Self> {
        match kind {
            "down" => Some(PointerEvent::Down(Vec2::new(x, y))),
            "move" => Some(PointerEvent::Move(Vec2::new(x, y))),
            "up" => Some(PointerEvent::Up),
            "leave" => Some(PointerEvent::Leave),
            _ => None,
        }
    }
}

/// 拖拽状态机
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { last: Vec2 },
}

/// 渲染所需的全部状态
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ViewportSnapshot {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub scale: f64,
    pub speed_multiplier: f64,
    pub dragging: bool,
    pub settled: bool,
    pub limits: Vec2,
    pub container_transform: String,
    pub container_transition: String,
    pub layers: Vec<LayerStyle>,
}

/// 视差视口控制器
///
/// 拖拽更新偏移并记录速度，松手后由 [`ViewportController::tick`] 逐帧衰减。
/// 偏移在每次更新、缩放和视口尺寸变化时夹取到边界内。
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    reference_speed: f64,
    viewport: Vec2,
    offset: Vec2,
    velocity: Vec2,
    scale_index: usize,
    speed_index: usize,
    drag: DragState,
    dirty: bool,
}

impl ViewportController {
    /// 校验配置后创建控制器
    ///
    /// 缩放档位、倍速档位和参与边界计算的图层都不能为空，否则返回 [`ConfigError`]。
    pub fn new(config: ViewportConfig, viewport_width: f64, viewport_height: f64) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let scale_index = nearest_index(&config.scale_options, config.initial_scale);
        let speed_index = nearest_index(&config.speed_options, config.initial_speed);
        let reference_speed = config.reference_speed();

        let mut controller = Self {
            config,
            reference_speed,
            viewport: Vec2::ZERO,
            offset: Vec2::ZERO,
            velocity: Vec2::ZERO,
            scale_index,
            speed_index,
            drag: DragState::Idle,
            dirty: true,
        };
        controller.set_viewport_size(viewport_width, viewport_height);
        Ok(controller)
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn scale(&self) -> f64 {
        self.config.scale_options[self.scale_index]
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.config.speed_options[self.speed_index]
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// 没有拖拽，速度也已归零
    pub fn is_settled(&self) -> bool {
        !self.is_dragging() && self.velocity == Vec2::ZERO
    }

    /// 取出并清除“状态已变化”标记
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// 当前缩放下每个轴允许的最大偏移
    pub fn limits(&self) -> Vec2 {
        let scale = self.scale();
        let limit = |content: f64, viewport: f64| ((content * scale - viewport) / 2.0 / self.reference_speed).max(0.0);
        Vec2::new(
            limit(self.config.content_width, self.viewport.x),
            limit(self.config.content_height, self.viewport.y),
        )
    }

    fn set_offset(&mut self, offset: Vec2) {
        let clamped = offset.clamp_symmetric(self.limits());
        if clamped != self.offset {
            self.offset = clamped;
            self.dirty = true;
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up | PointerEvent::Leave => self.pointer_up(),
        }
    }

    /// 开始拖拽：记录位置，速度清零
    pub fn pointer_down(&mut self, pos: Vec2) {
        if !pos.is_finite() {
            return;
        }
        self.drag = DragState::Dragging { last: pos };
        self.velocity = Vec2::ZERO;
        self.dirty = true;
    }

    /// 拖拽中移动：位移乘以倍速后累加到偏移，同时作为速度
    pub fn pointer_move(&mut self, pos: Vec2) {
        let DragState::Dragging { last } = self.drag else {
            return;
        };
        if !pos.is_finite() {
            return;
        }

        let delta = (pos - last) * self.speed_multiplier();
        self.velocity = delta;
        self.set_offset(self.offset + delta);
        self.drag = DragState::Dragging { last: pos };
    }

    /// 结束拖拽，保留最后的速度用于惯性
    pub fn pointer_up(&mut self) {
        if self.is_dragging() {
            self.drag = DragState::Idle;
            self.dirty = true;
        }
    }

    /// 惯性动画的一帧，返回偏移是否变化
    pub fn tick(&mut self) -> bool {
        if self.is_dragging() || self.velocity == Vec2::ZERO {
            return false;
        }
        if self.velocity.within(self.config.epsilon) {
            self.velocity = Vec2::ZERO;
            self.dirty = true;
            return false;
        }

        self.velocity *= self.config.decay;
        let before = self.offset;
        self.set_offset(self.offset + self.velocity);
        self.offset != before
    }

    /// 缩放到离 `target` 最近的档位，返回是否变化
    ///
    /// 偏移按新旧比例缩放，保持视野中心不变，然后重新夹取。
    pub fn zoom_to(&mut self, target: f64) -> bool {
        if !target.is_finite() {
            return false;
        }
        self.zoom_index(nearest_index(&self.config.scale_options, target))
    }

    pub fn zoom_in(&mut self) -> bool {
        let last = self.config.scale_options.len() - 1;
        self.zoom_index((self.scale_index + 1).min(last))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_index(self.scale_index.saturating_sub(1))
    }

    fn zoom_index(&mut self, index: usize) -> bool {
        if index == self.scale_index {
            return false;
        }
        let old = self.scale();
        self.scale_index = index;
        let new = self.scale();

        tracing::debug!(from = old, to = new, "视口缩放");
        self.dirty = true;
        self.set_offset(self.offset * (new / old));
        true
    }

    /// 切换到下一档拖拽倍速，返回新的倍速
    pub fn cycle_speed(&mut self) -> f64 {
        self.speed_index = (self.speed_index + 1) % self.config.speed_options.len();
        self.dirty = true;
        self.speed_multiplier()
    }

    /// 视口尺寸变化，无效值忽略，负数按 0 处理
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if !width.is_finite() || !height.is_finite() {
            return;
        }
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
        self.dirty = true;
        self.set_offset(self.offset);
    }

    fn transition(&self) -> Option<&str> {
        if self.is_dragging() {
            None
        } else {
            Some(self.config.transition.as_str())
        }
    }

    /// 所有图层的变换，按配置顺序
    pub fn layer_transforms(&self) -> Vec<LayerTransform> {
        let transition = self.transition();
        self.config
            .layers
            .iter()
            .map(|layer| LayerTransform::new(layer, self.offset, self.scale(), transition))
            .collect()
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            offset: self.offset,
            velocity: self.velocity,
            scale: self.scale(),
            speed_multiplier: self.speed_multiplier(),
            dragging: self.is_dragging(),
            settled: self.is_settled(),
            limits: self.limits(),
            container_transform: container_transform(self.scale()),
            container_transition: self.config.transition.clone(),
            layers: self.layer_transforms().iter().map(LayerTransform::style).collect(),
        }
    }
}
