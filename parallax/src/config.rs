use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 视差层配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// 层名称，界面层用它找到对应元素
    pub name: String,
    /// 视差速度 (0, 1]：实际位移 = offset * speed
    pub speed: f64,
    /// 缩放权重：层缩放 = 1 + (scale - 1) * scale_factor
    pub scale_factor: f64,
    /// 是否参与边界计算（会露出边缘的图层）
    #[serde(default = "default_bounded")]
    pub bounded: bool,
}

fn default_bounded() -> bool {
    true
}

impl LayerSpec {
    pub fn new(name: &str, speed: f64, scale_factor: f64, bounded: bool) -> Self {
        Self {
            name: name.to_string(),
            speed,
            scale_factor,
            bounded,
        }
    }
}

/// 配置校验失败
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("解析视口配置失败: {0}")]
    Parse(String),

    #[error("内容尺寸必须为正数: {width} x {height}")]
    ContentSize { width: f64, height: f64 },

    #[error("{0} 不能为空")]
    EmptyOptions(&'static str),

    #[error("{what} 中包含无效值 {value}")]
    InvalidOption { what: &'static str, value: f64 },

    #[error("衰减系数必须在 (0, 1) 之间: {0}")]
    Decay(f64),

    #[error("静止阈值必须为正数: {0}")]
    Epsilon(f64),

    #[error("图层 {name} 的参数无效 (speed = {speed}, scale_factor = {scale_factor})")]
    Layer { name: String, speed: f64, scale_factor: f64 },

    #[error("至少需要一个参与边界计算的图层")]
    NoBoundedLayer,
}

/// 视口配置
///
/// 默认值取自地图页面：2000x2000 的内容，三档缩放，五档拖拽倍速，
/// 六个图层中 ui 层不参与边界计算。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub content_width: f64,
    pub content_height: f64,
    /// 可选缩放值，校验后升序去重
    pub scale_options: Vec<f64>,
    pub initial_scale: f64,
    /// 拖拽倍速，按配置顺序循环
    pub speed_options: Vec<f64>,
    pub initial_speed: f64,
    /// 每帧速度衰减系数
    pub decay: f64,
    /// 速度分量都不超过该值时停止惯性
    pub epsilon: f64,
    pub layers: Vec<LayerSpec>,
    /// 非拖拽状态下的 CSS 过渡
    pub transition: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            content_width: 2000.0,
            content_height: 2000.0,
            scale_options: vec![0.8, 1.0, 1.2],
            initial_scale: 1.0,
            speed_options: vec![0.5, 1.0, 2.0, 4.0, 8.0],
            initial_speed: 1.0,
            decay: 0.92,
            epsilon: 0.01,
            layers: vec![
                LayerSpec::new("world", 0.1, 0.1, true),
                LayerSpec::new("flower1", 0.12, 0.12, true),
                LayerSpec::new("shards1", 0.14, 0.14, true),
                LayerSpec::new("shards2", 0.15, 0.15, true),
                LayerSpec::new("flower2", 0.16, 0.16, true),
                LayerSpec::new("ui", 0.5, 0.5, false),
            ],
            transition: "transform 0.5s cubic-bezier(0.2, 0.8, 0.2, 1)".to_string(),
        }
    }
}

impl ViewportConfig {
    /// 从 JSON 读取并校验，缺省字段使用默认值
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ViewportConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()
    }

    /// 校验配置，并把缩放选项整理为升序
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.content_width) || !positive(self.content_height) {
            return Err(ConfigError::ContentSize {
                width: self.content_width,
                height: self.content_height,
            });
        }

        check_options("scale_options", &self.scale_options)?;
        check_options("speed_options", &self.speed_options)?;
        self.scale_options.sort_by(f64::total_cmp);
        self.scale_options.dedup();

        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::Decay(self.decay));
        }
        if !positive(self.epsilon) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }

        for layer in &self.layers {
            let speed_ok = positive(layer.speed) && layer.speed <= 1.0;
            let factor_ok = layer.scale_factor.is_finite() && layer.scale_factor >= 0.0;
            if !speed_ok || !factor_ok {
                return Err(ConfigError::Layer {
                    name: layer.name.clone(),
                    speed: layer.speed,
                    scale_factor: layer.scale_factor,
                });
            }
        }
        if !self.layers.iter().any(|l| l.bounded) {
            return Err(ConfigError::NoBoundedLayer);
        }

        Ok(self)
    }

    /// 参与边界计算的最大层速度：最先露出边缘的图层
    pub fn reference_speed(&self) -> f64 {
        self.layers
            .iter()
            .filter(|l| l.bounded)
            .map(|l| l.speed)
            .fold(0.0, f64::max)
    }
}

fn check_options(what: &'static str, options: &[f64]) -> Result<(), ConfigError> {
    if options.is_empty() {
        return Err(ConfigError::EmptyOptions(what));
    }
    match options.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        Some(&value) => Err(ConfigError::InvalidOption { what, value }),
        None => Ok(()),
    }
}

/// 离 `target` 最近的选项下标，距离相同时取靠前的
pub(crate) fn nearest_index(options: &[f64], target: f64) -> usize {
    let mut best = 0;
    for (i, option) in options.iter().enumerate() {
        if (option - target).abs() < (options[best] - target).abs() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ViewportConfig::default().validate().unwrap();
        assert_eq!(config.reference_speed(), 0.16);
        assert_eq!(config.layers.len(), 6);
    }

    #[test]
    fn json_overrides_some_fields() {
        let config = ViewportConfig::from_json(r#"{"scale_options": [1.5, 0.5, 1.0, 1.0], "decay": 0.95}"#).unwrap();
        assert_eq!(config.scale_options, vec![0.5, 1.0, 1.5]);
        assert_eq!(config.decay, 0.95);
        assert_eq!(config.content_width, 2000.0);
    }

    #[test]
    fn layers_default_to_bounded() {
        let config = ViewportConfig::from_json(r#"{"layers": [{"name": "bg", "speed": 0.3, "scale_factor": 0.2}]}"#).unwrap();
        assert!(config.layers[0].bounded);
        assert_eq!(config.reference_speed(), 0.3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            (r#"{"content_width": 0}"#, "content"),
            (r#"{"scale_options": []}"#, "empty"),
            (r#"{"speed_options": [1, -2]}"#, "option"),
            (r#"{"decay": 1.0}"#, "decay"),
            (r#"{"epsilon": 0}"#, "epsilon"),
            (r#"{"layers": [{"name": "x", "speed": 2.0, "scale_factor": 0}]}"#, "layer"),
            (r#"{"layers": [{"name": "x", "speed": 0.5, "scale_factor": 0, "bounded": false}]}"#, "bounded"),
            (r#"{"decay": "fast"}"#, "parse"),
        ];
        for (json, label) in cases {
            let err = ViewportConfig::from_json(json).unwrap_err();
            let ok = match label {
                "content" => matches!(err, ConfigError::ContentSize { .. }),
                "empty" => matches!(err, ConfigError::EmptyOptions("scale_options")),
                "option" => matches!(err, ConfigError::InvalidOption { value, .. } if value == -2.0),
                "decay" => matches!(err, ConfigError::Decay(_)),
                "epsilon" => matches!(err, ConfigError::Epsilon(_)),
                "layer" => matches!(err, ConfigError::Layer { .. }),
                "bounded" => matches!(err, ConfigError::NoBoundedLayer),
                _ => matches!(err, ConfigError::Parse(_)),
            };
            assert!(ok, "{}: unexpected {:?}", label, err);
        }
    }

    #[test]
    fn nearest_index_snaps() {
        let options = [0.8, 1.0, 1.2];
        assert_eq!(nearest_index(&options, 1.05), 1);
        assert_eq!(nearest_index(&options, 5.0), 2);
        assert_eq!(nearest_index(&options, 0.0), 0);
        assert_eq!(nearest_index(&options, 0.85), 0);
    }
}
