use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::console;

pub mod animation;
pub mod config;
pub mod controller;
pub mod layers;
pub mod vector;

pub use animation::{AnimationLoop, FrameScheduler, ManualScheduler};
pub use config::{ConfigError, LayerSpec, ViewportConfig};
pub use controller::{PointerEvent, ViewportController, ViewportSnapshot};
pub use layers::{LayerStyle, LayerTransform};
pub use vector::Vec2;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

// 初始化错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 默认视口配置（JSON），方便页面在此基础上修改
#[wasm_bindgen]
pub fn default_viewport_config() -> Result<String, JsValue> {
    serde_json::to_string(&ViewportConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// 基于 `requestAnimationFrame` 的帧调度器
struct RafScheduler {
    window: Option<web_sys::Window>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> Option<i32> {
        let window = self.window.as_ref()?;
        let callback = self.callback.as_ref()?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| console::error_2(&JsValue::from_str("预约动画帧失败:"), &e))
            .ok()
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Some(window) = &self.window {
            if let Err(e) = window.cancel_animation_frame(handle) {
                console::error_2(&JsValue::from_str("取消动画帧失败:"), &e);
            }
        }
    }
}

/// 控制器、动画循环和监听器放在一起，帧回调通过弱引用访问
struct Scene {
    controller: ViewportController,
    animation: AnimationLoop<RafScheduler>,
    listener: Option<js_sys::Function>,
}

impl Scene {
    /// 状态有变化且设置了监听器时，返回需要通知的内容
    fn pending_update(&mut self) -> Option<(js_sys::Function, JsValue)> {
        if !self.controller.take_dirty() {
            return None;
        }
        let listener = self.listener.clone()?;
        match serde_wasm_bindgen::to_value(&self.controller.snapshot()) {
            Ok(value) => Some((listener, value)),
            Err(e) => {
                console::error_1(&JsValue::from_str(&format!("序列化视口状态失败: {}", e)));
                None
            }
        }
    }
}

fn on_animation_frame(scene: &Weak<RefCell<Scene>>) {
    let Some(scene) = scene.upgrade() else {
        return;
    };

    let update = {
        let Ok(mut guard) = scene.try_borrow_mut() else {
            console::warn_1(&JsValue::from_str("视口正在更新，跳过本帧"));
            return;
        };
        let scene = &mut *guard;
        let Some(handle) = scene.animation.pending() else {
            return;
        };
        if scene.animation.on_frame(handle, &mut scene.controller).is_none() {
            return;
        }
        scene.pending_update()
    };

    // 监听器可能回调本对象的方法，必须在释放借用后调用
    if let Some((listener, value)) = update {
        if let Err(e) = listener.call1(&JsValue::NULL, &value) {
            console::error_2(&JsValue::from_str("视口监听器出错:"), &e);
        }
    }
}

/// 视差地图 JS 接口
#[wasm_bindgen]
pub struct ParallaxMapJS {
    scene: Rc<RefCell<Scene>>,
}

#[wasm_bindgen]
impl ParallaxMapJS {
    /// 创建视口，`config_json` 为空时使用默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, width: f64, height: f64) -> Result<ParallaxMapJS, JsValue> {
        console_error_panic_hook::set_once();

        let report = |e: ConfigError| {
            console::error_1(&JsValue::from_str(&e.to_string()));
            JsValue::from_str(&e.to_string())
        };
        let config = match config_json.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => ViewportConfig::from_json(json).map_err(report)?,
            None => ViewportConfig::default(),
        };
        let controller = ViewportController::new(config, width, height).map_err(report)?;

        let scene = Rc::new(RefCell::new(Scene {
            controller,
            animation: AnimationLoop::new(RafScheduler {
                window: web_sys::window(),
                callback: None,
            }),
            listener: None,
        }));

        let weak = Rc::downgrade(&scene);
        let callback = Closure::wrap(Box::new(move || on_animation_frame(&weak)) as Box<dyn FnMut()>);
        scene.borrow_mut().animation.scheduler_mut().callback = Some(callback);

        Ok(Self { scene })
    }

    /// 统一的指针入口：`kind` 为 down | move | up | leave
    pub fn pointer(&self, kind: &str, x: f64, y: f64) {
        match PointerEvent::from_parts(kind, x, y) {
            Some(event) => self.scene.borrow_mut().controller.handle(event),
            None => tracing::debug!(kind, "忽略未知的指针事件"),
        }
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64) {
        self.scene.borrow_mut().controller.pointer_down(Vec2::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) {
        self.scene.borrow_mut().controller.pointer_move(Vec2::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) {
        self.scene.borrow_mut().controller.pointer_up();
    }

    /// 缩放到最近的档位，返回实际缩放值
    #[wasm_bindgen(js_name = zoomTo)]
    pub fn zoom_to(&self, scale: f64) -> f64 {
        let mut scene = self.scene.borrow_mut();
        scene.controller.zoom_to(scale);
        scene.controller.scale()
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) -> f64 {
        let mut scene = self.scene.borrow_mut();
        scene.controller.zoom_in();
        scene.controller.scale()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) -> f64 {
        let mut scene = self.scene.borrow_mut();
        scene.controller.zoom_out();
        scene.controller.scale()
    }

    /// 可选的缩放档位
    #[wasm_bindgen(js_name = scaleOptions)]
    pub fn scale_options(&self) -> Vec<f64> {
        self.scene.borrow().controller.config().scale_options.clone()
    }

    /// 切换拖拽倍速，返回新的倍速
    #[wasm_bindgen(js_name = cycleSpeed)]
    pub fn cycle_speed(&self) -> f64 {
        self.scene.borrow_mut().controller.cycle_speed()
    }

    #[wasm_bindgen(js_name = speedMultiplier)]
    pub fn speed_multiplier(&self) -> f64 {
        self.scene.borrow().controller.speed_multiplier()
    }

    #[wasm_bindgen(js_name = setViewportSize)]
    pub fn set_viewport_size(&self, width: f64, height: f64) {
        self.scene.borrow_mut().controller.set_viewport_size(width, height);
    }

    pub fn scale(&self) -> f64 {
        self.scene.borrow().controller.scale()
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.scene.borrow().controller.is_dragging()
    }

    /// 手动推进一帧惯性（不使用内置循环时）
    pub fn tick(&self) -> bool {
        self.scene.borrow_mut().controller.tick()
    }

    /// 当前偏移、缩放和各图层样式
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.scene.borrow().controller.snapshot())
            .map_err(|e| JsValue::from_str(&format!("序列化视口状态失败: {}", e)))
    }

    /// 设置每帧状态变化时的回调，参数为快照
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, listener: Option<js_sys::Function>) {
        self.scene.borrow_mut().listener = listener;
    }

    /// 启动动画循环
    #[wasm_bindgen(js_name = startLoop)]
    pub fn start_loop(&self) {
        self.scene.borrow_mut().animation.start();
    }

    #[wasm_bindgen(js_name = stopLoop)]
    pub fn stop_loop(&self) {
        self.scene.borrow_mut().animation.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.scene.borrow().animation.is_running()
    }

    /// 页面卸载时调用：停止循环并移除监听器
    pub fn destroy(&self) {
        let mut scene = self.scene.borrow_mut();
        scene.animation.stop();
        scene.listener = None;
    }
}
