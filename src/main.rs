//! MiniHub entry point
//!
//! Native: runs a short headless demo of every game and prints each HUD as
//! JSON. Browser: runs the game named in the URL hash on a WebGPU canvas.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use minihub::consts::SIM_DT;
    use minihub::input::{InputEvent, Key};
    use minihub::renderer::{DrawList, RenderState};
    use minihub::sim::Status;
    use minihub::{Arcade, GameKind, Settings, launch};

    /// Game instance holding all state
    struct Game {
        arcade: Box<dyn Arcade>,
        kind: GameKind,
        settings: Settings,
        render_state: Option<RenderState>,
        list: DrawList,
        last_time: f64,
    }

    impl Game {
        fn new(kind: GameKind, settings: Settings) -> Self {
            let seed = settings.seed_or(js_sys::Date::now() as u64);
            Self {
                arcade: launch(kind, &settings, seed),
                kind,
                settings,
                render_state: None,
                list: DrawList::new(),
                last_time: 0.0,
            }
        }

        /// Swap in a different game, keeping the renderer
        fn switch(&mut self, kind: GameKind) {
            let seed = self.settings.seed_or(js_sys::Date::now() as u64);
            self.arcade = launch(kind, &self.settings, seed);
            self.kind = kind;
            if let Some(ref mut render_state) = self.render_state {
                render_state.set_world(self.arcade.world_size());
            }
            log::info!("Switched to {}", kind.title());
        }

        /// Canvas CSS pixels to world pixels
        fn to_world(&self, canvas: &HtmlCanvasElement, x: i32, y: i32) -> Vec2 {
            let client = Vec2::new(canvas.client_width().max(1) as f32, canvas.client_height().max(1) as f32);
            Vec2::new(x as f32, y as f32) / client * self.arcade.world_size()
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.list) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.arcade.hud();

            if let Some(el) = document.get_element_by_id("hud-title") {
                el.set_text_content(Some(self.kind.title()));
            }
            if let Some(el) = document.get_element_by_id("hud-message") {
                el.set_text_content(Some(&hud.message));
            }
            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&format!("{} - {}", hud.scores.player, hud.scores.opponent)));
            }
            if let Some(el) = document.get_element_by_id("hud-best") {
                match hud.best {
                    Some(best) => {
                        let _ = el.set_attribute("class", "hud-item");
                        el.set_text_content(Some(&best.to_string()));
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }
            if let Some(el) = document.get_element_by_id("round-over") {
                let class = if hud.status.is_terminal() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    /// Game named by the URL hash, e.g. `#chess`
    fn kind_from_hash() -> GameKind {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .and_then(|hash| GameKind::from_str(hash.trim_start_matches('#')))
            .unwrap_or(GameKind::TicTacToe)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("MiniHub starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let kind = kind_from_hash();
        let game = Rc::new(RefCell::new(Game::new(kind, Settings::default())));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let world = game.borrow().arcade.world_size();
        match RenderState::new(surface, &adapter, width, height, world).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("No render device: {}", e),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_new_game_button(game.clone());
        setup_hash_change(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);
        log::info!("{} running!", kind.title());
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let p = g.to_world(&canvas_clone, event.offset_x(), event.offset_y());
                g.arcade.handle_input(&InputEvent::PointerMove(p));
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer down
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let p = g.to_world(&canvas_clone, event.offset_x(), event.offset_y());
                g.arcade.handle_input(&InputEvent::PointerDown(p));
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_dom(&event.key()) else {
                    return;
                };
                if matches!(key, Key::Up | Key::Down | Key::Space) {
                    // Keep the page from scrolling
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                if key == Key::Enter && g.arcade.status().is_terminal() {
                    g.arcade.new_game();
                    return;
                }
                g.arcade.handle_input(&InputEvent::KeyDown(key));
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let Game { arcade, list, .. } = &mut *g;
            arcade.frame(dt, list);
            g.render();
            g.update_hud();
        }
        request_animation_frame(game);
    }

    fn setup_new_game_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().arcade.new_game();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_hash_change(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let kind = kind_from_hash();
            let mut g = game.borrow_mut();
            if kind != g.kind {
                g.switch(kind);
            }
        });
        let _ = window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if g.arcade.status() == Status::Running {
                    g.arcade.toggle_pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Frames each game runs in the headless demo (ten seconds at 60 fps)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_FRAMES: u32 = 600;

/// Frames between scripted inputs
#[cfg(not(target_arch = "wasm32"))]
const INPUT_EVERY: u32 = 12;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use minihub::{GameKind, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("MiniHub (native) starting...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });

    for kind in GameKind::ALL {
        match demo(kind, &settings, seed) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("{}: HUD not serializable: {}", kind.as_str(), e),
        }
    }
}

/// Drive one game with scripted input through a `DrawList`; returns the final HUD as JSON
#[cfg(not(target_arch = "wasm32"))]
fn demo(kind: minihub::GameKind, settings: &minihub::Settings, seed: u64) -> serde_json::Result<String> {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use minihub::input::{InputEvent, Key};
    use minihub::launch;
    use minihub::renderer::DrawList;

    let mut arcade = launch(kind, settings, seed);
    let mut script = Pcg32::seed_from_u64(seed ^ 0x5eed);
    let mut list = DrawList::new();
    let world = arcade.world_size();
    let dt = 1.0 / 60.0;

    for frame in 0..DEMO_FRAMES {
        if frame % INPUT_EVERY == 0 {
            let event = match script.random_range(0..4) {
                0 => {
                    let keys = [Key::Up, Key::Down, Key::Left, Key::Right];
                    InputEvent::KeyDown(keys[script.random_range(0..keys.len())])
                }
                1 => InputEvent::KeyDown(Key::Space),
                2 => InputEvent::KeyDown(Key::Letter(script.random_range(b'a'..=b'z') as char)),
                _ => InputEvent::PointerDown(Vec2::new(
                    script.random_range(0.0..world.x),
                    script.random_range(0.0..world.y),
                )),
            };
            arcade.handle_input(&event);
        }
        arcade.frame(dt, &mut list);
    }

    log::info!("{}: {} vertices in the last frame", kind.as_str(), list.len());
    serde_json::to_string(&arcade.hud())
}
