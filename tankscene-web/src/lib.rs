/// tankscene web - WebGL2 frontend compiled to WASM
///
/// The page owns the canvas and the animation loop: it forwards
/// `keydown`, `wheel` and resize events and calls `frame()` from
/// `requestAnimationFrame`.
use tankscene_core::{App, Key, SceneKind};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, HtmlCanvasElement, WebGl2RenderingContext};

pub mod gl;

pub use gl::WebGlTarget;

fn scene_from_name(name: &str) -> Result<SceneKind, JsValue> {
    match name {
        "tank" => Ok(SceneKind::Tank),
        "arm" => Ok(SceneKind::Arm),
        other => Err(JsValue::from_str(&format!("unknown scene `{other}`"))),
    }
}

#[wasm_bindgen]
pub struct WebApp {
    app: App,
    target: WebGlTarget,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl WebApp {
    /// Attach to the canvas with id `canvas_id` and show `scene` (`tank` or `arm`)
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, scene: &str) -> Result<WebApp, JsValue> {
        let scene = scene_from_name(scene)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{canvas_id}`")))?
            .dyn_into()?;
        let gl = canvas
            .get_context("webgl2")?
            .ok_or_else(|| JsValue::from_str("WebGL2 not available"))?
            .dyn_into::<WebGl2RenderingContext>()?;

        let (width, height) = (canvas.width(), canvas.height());
        let target = WebGlTarget::new(gl)?;
        console::log_1(&format!("tankscene: {scene:?} on {width}x{height} canvas").into());

        Ok(WebApp {
            app: App::new(scene, width.max(1), height.max(1)),
            target,
            width,
            height,
        })
    }

    /// `KeyboardEvent.key`; returns whether the key was bound
    pub fn key_down(&mut self, key: &str) -> bool {
        Key::from_dom(key)
            .and_then(|key| self.app.key_down(key))
            .is_some()
    }

    /// `WheelEvent.deltaY`
    pub fn wheel(&mut self, delta_y: f64) {
        self.app.wheel(delta_y as f32);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.app
            .resize(width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Step the simulation and draw; returns how many targets were hit this frame
    pub fn frame(&mut self) -> usize {
        self.target.clear(self.width, self.height);
        let report = self.app.frame(&mut self.target);
        for index in &report.newly_hit {
            console::log_1(&format!("tankscene: target {index} hit").into());
        }
        report.newly_hit.len()
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console::log_1(&"tankscene WASM module loaded".into());
    Ok(())
}
