use serde::Serialize;

use crate::config::LayerSpec;
use crate::vector::Vec2;

/// 单个图层的渲染变换
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayerTransform {
    pub name: String,
    /// 平移像素 = offset * speed
    pub translate: Vec2,
    pub scale: f64,
    /// 速度越大越靠前
    pub z_index: i32,
    /// 拖拽中为 `None`，跟手不做过渡
    pub transition: Option<String>,
}

impl LayerTransform {
    pub fn new(layer: &LayerSpec, offset: Vec2, current_scale: f64, transition: Option<&str>) -> Self {
        Self {
            name: layer.name.clone(),
            translate: offset * layer.speed,
            scale: 1.0 + (current_scale - 1.0) * layer.scale_factor,
            z_index: (layer.speed * 100.0).floor() as i32,
            transition: transition.map(str::to_string),
        }
    }

    /// CSS `transform`：平移在前，缩放在后
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }

    /// CSS `transition`
    pub fn css_transition(&self) -> &str {
        self.transition.as_deref().unwrap_or("none")
    }

    pub fn style(&self) -> LayerStyle {
        LayerStyle {
            name: self.name.clone(),
            transform: self.css_transform(),
            transition: self.css_transition().to_string(),
            z_index: self.z_index,
        }
    }
}

/// 直接可用的 CSS 样式
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LayerStyle {
    pub name: String,
    pub transform: String,
    pub transition: String,
    pub z_index: i32,
}

/// 外层容器的缩放
pub fn container_transform(scale: f64) -> String {
    format!("scale({})", scale)
}
