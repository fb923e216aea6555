//! Encircle entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use encircle::audio::{AudioManager, SoundEffect};
    use encircle::consts::*;
    use encircle::highscores::{HighScores, format_date};
    use encircle::renderer::SdfRenderState;
    use encircle::settings::Settings;
    use encircle::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        /// Device pixel ratio, for mapping client coords onto the surface
        dpr: f32,
        /// Press anchor for the mouse fallback (acts as the second finger)
        mouse_anchor: Option<Vec2>,
        /// Whether the current press sequence ever became a pinch
        had_pinch: bool,
        /// Muted automatically because the tab lost focus
        muted_by_blur: bool,
        // FPS, sampled over half-second windows
        frames_in_window: u32,
        window_start: f64,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                state: GameState::new(seed),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                audio,
                settings,
                highscores: HighScores::load(),
                dpr: 1.0,
                mouse_anchor: None,
                had_pinch: false,
                muted_by_blur: false,
                frames_in_window: 0,
                window_start: 0.0,
                fps: 0,
            }
        }

        /// Map a client-space position onto surface pixels
        fn to_surface(&self, client_x: f32, client_y: f32, rect: &web_sys::DomRect) -> Vec2 {
            Vec2::new(
                (client_x - rect.left() as f32) * self.dpr,
                (client_y - rect.top() as f32) * self.dpr,
            )
        }

        /// Drain the frame's wall time into fixed simulation steps
        fn update(&mut self, dt: f32) {
            // Long stalls (tab resume) collapse into one clamped step batch
            self.accumulator += dt.min(0.1);

            // The streak on the board is the one that just broke
            let streak_before = self.state.streak;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input;
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // skip/restart fire on one tick only
                self.input.skip = false;
                self.input.restart = false;
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::TraceStarted => self.audio.play(SoundEffect::TraceStart),
                    GameEvent::Covered { .. } => self.audio.play(SoundEffect::Covered),
                    GameEvent::Missed { .. } => {
                        self.audio.play(SoundEffect::Missed);
                        self.record_streak(streak_before);
                    }
                    GameEvent::RoundSkipped => self.audio.play(SoundEffect::Skip),
                }
            }
        }

        /// Submit a broken streak to the leaderboard
        fn record_streak(&mut self, streak: u32) {
            if streak == 0 {
                return;
            }
            let rounds = self.state.rounds_played;
            if let Some(rank) = self
                .highscores
                .add_streak(streak, rounds, js_sys::Date::now())
            {
                log::info!("Streak of {} entered the board at rank {}", streak, rank);
                self.highscores.save();
                self.update_leaderboard();
            }
        }

        /// Count frames; the displayed FPS refreshes twice a second
        fn track_fps(&mut self, time: f64) {
            self.frames_in_window += 1;
            let elapsed = time - self.window_start;
            if elapsed >= 500.0 {
                self.fps = (self.frames_in_window as f64 * 1000.0 / elapsed).round() as u32;
                self.frames_in_window = 0;
                self.window_start = time;
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(ref mut render_state) = self.render_state else {
                return;
            };
            match render_state.render(&self.state, &self.settings, time) {
                Ok(_) => {}
                // A lost surface comes back after a reconfigure
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Surface out of memory, rendering halted");
                }
                Err(e) => log::warn!("Frame dropped: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            // Round number (1-based for display)
            if let Some(el) = document.query_selector("#hud-round .hud-value").ok().flatten() {
                el.set_text_content(Some(&(self.state.round + 1).to_string()));
            }

            // Shape kind
            if let Some(el) = document.query_selector("#hud-shape .hud-value").ok().flatten() {
                el.set_text_content(Some(self.state.shape.kind.as_str()));
            }

            // Streak
            if let Some(el) = document
                .query_selector("#hud-streak .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&self.state.streak.to_string()));
            }

            // Best streak (session or leaderboard, whichever is higher)
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                let best = self
                    .state
                    .best_streak
                    .max(self.highscores.top_streak().unwrap_or(0));
                el.set_text_content(Some(&best.to_string()));
            }

            // FPS
            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten()
                    {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            // Trace prompt, only while waiting
            if let Some(el) = document.get_element_by_id("trace-prompt") {
                if self.state.phase == GamePhase::Ready {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Verdict banner during reveal
            if let Some(el) = document.get_element_by_id("verdict") {
                match (self.state.phase, self.state.last_outcome) {
                    (GamePhase::Reveal, Some(result)) => {
                        let px = result.margin.round() as i64;
                        let (text, class) = if result.covered {
                            (format!("Covered! {} px to spare", px), "covered")
                        } else {
                            (format!("Missed - {} px short", px), "missed")
                        };
                        el.set_text_content(Some(&text));
                        let _ = el.set_attribute("class", class);
                    }
                    _ => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        /// Rebuild the leaderboard list in the DOM
        fn update_leaderboard(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            let Some(list) = document.get_element_by_id("streak-list") else {
                return;
            };
            list.set_inner_html("");

            for entry in &self.highscores.entries {
                if let Ok(item) = document.create_element("li") {
                    item.set_text_content(Some(&format!(
                        "{} in a row · {} rounds · {}",
                        entry.streak,
                        entry.rounds,
                        format_date(entry.timestamp)
                    )));
                    let _ = list.append_child(&item);
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Encircle starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Drop the loading indicator now that wasm is up
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Size the backing store to physical pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Seed the session from the clock
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().dpr = dpr as f32;

        log::info!("Game initialized with seed: {}", seed);

        // Bring up the GPU surface
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
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

        let render_state = SdfRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        // Set up input and UI
        setup_input_handlers(&canvas, game.clone());
        setup_keyboard(game.clone());
        setup_restart_button(game.clone());
        setup_auto_mute(game.clone());

        game.borrow().update_leaderboard();

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Hand control to the frame loop
        request_animation_frame(game);

        log::info!("Encircle running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Touch start - a second finger begins the pinch
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();

                let touches = event.touches();
                if touches.length() == 1 {
                    g.had_pinch = false;
                }
                if let (Some(a), Some(b)) = (touches.get(0), touches.get(1)) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let pa = g.to_surface(a.client_x() as f32, a.client_y() as f32, &rect);
                    let pb = g.to_surface(b.client_x() as f32, b.client_y() as f32, &rect);
                    g.input.pinch = Some((pa, pb));
                    g.had_pinch = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move - ring follows the fingers
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let touches = event.touches();
                if let (Some(a), Some(b)) = (touches.get(0), touches.get(1)) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let pa = g.to_surface(a.client_x() as f32, a.client_y() as f32, &rect);
                    let pb = g.to_surface(b.client_x() as f32, b.client_y() as f32, &rect);
                    g.input.pinch = Some((pa, pb));
                    g.had_pinch = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - dropping below two fingers releases the ring; a press
        // that never pinched skips the round
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let remaining = event.touches().length();
                if remaining < 2 {
                    g.input.pinch = None;
                }
                if remaining == 0 {
                    if !g.had_pinch {
                        g.input.skip = true;
                    }
                    g.had_pinch = false;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse fallback: the press anchor is one finger, the cursor the other
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                let rect = canvas_clone.get_bounding_client_rect();
                let pos = g.to_surface(event.client_x() as f32, event.client_y() as f32, &rect);
                g.mouse_anchor = Some(pos);
                g.had_pinch = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let Some(anchor) = g.mouse_anchor else { return };
                let rect = canvas_clone.get_bounding_client_rect();
                let pos = g.to_surface(event.client_x() as f32, event.client_y() as f32, &rect);
                g.input.pinch = Some((anchor, pos));
                g.had_pinch = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.mouse_anchor = None;
                g.input.pinch = None;
                if !g.had_pinch {
                    g.input.skip = true;
                }
                g.had_pinch = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "h" | "H" => {
                    g.settings.show_hint = !g.settings.show_hint;
                    g.settings.save();
                    log::info!("Hint circle: {}", g.settings.show_hint);
                }
                "m" | "M" => {
                    let muted = g.settings.master_volume > 0.0;
                    g.settings.master_volume = if muted { 0.0 } else { 0.8 };
                    g.audio.set_master_volume(g.settings.master_volume);
                    g.settings.save();
                }
                "f" | "F" => {
                    g.settings.show_fps = !g.settings.show_fps;
                    g.settings.save();
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
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

            // First frame has no previous timestamp; pretend one step passed
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.track_fps(time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                // A live streak still counts before the reset wipes it
                let streak = g.state.streak;
                g.record_streak(streak);
                g.input.restart = true;
                log::info!("Session restart requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if !g.settings.mute_on_blur {
                    return;
                }
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.audio.set_muted(true);
                    g.muted_by_blur = true;
                    log::info!("Auto-muted (tab hidden)");
                } else if g.muted_by_blur {
                    g.audio.set_muted(false);
                    g.muted_by_blur = false;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur/focus (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                    g.muted_by_blur = true;
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let window_clone = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.muted_by_blur {
                    g.audio.set_muted(false);
                    g.muted_by_blur = false;
                }
            });
            let _ = window_clone
                .add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Encircle (native) starting...");
    log::info!("The game itself is web-only; native builds run a smoke check");

    println!("\nRunning fit judgement checks...");
    check_fit_judgement();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn check_fit_judgement() {
    use encircle::sim::{judge_fit, shape_for_round};

    // Round 1 of any session is a rectangle
    let shape = shape_for_round(42, 1);
    let span = shape.bounding_span();

    let result = judge_fit(span + 25.0, &shape);
    assert!(result.covered, "Ring wider than the span must cover");

    let result = judge_fit(span - 25.0, &shape);
    assert!(!result.covered, "Ring narrower than the span must miss");

    println!("✓ Fit judgement checks passed!");
}
