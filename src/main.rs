//! Survivor Zombies entry point
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
    use web_sys::{Document, KeyboardEvent, PointerEvent};

    use survivor_zombies::audio::AudioManager;
    use survivor_zombies::platform::{self, browser::BrowserWallet, browser::FarcadeHost};
    use survivor_zombies::puzzle::PuzzleAction;
    use survivor_zombies::render::{self, Camera, CanvasRenderer};
    use survivor_zombies::services::host::HostBridge;
    use survivor_zombies::services::leaderboard::{
        LeaderboardStore, MemoryLeaderboard, PlayerProfile,
    };
    use survivor_zombies::services::wallet::WalletError;
    use survivor_zombies::session::{self, PlayRequest, Session, SessionConfig, SessionPhase};
    use survivor_zombies::settings::Settings;
    use survivor_zombies::sim::shop::ShopItem;
    use survivor_zombies::sim::tick::{MoveKeys, TickInput};
    use survivor_zombies::ui::{self, EndScreenView, HudView, SkyIcon};

    /// Number of pre-built choice buttons on the puzzle board
    const CHOICE_BUTTONS: usize = 8;

    /// Browser-side game instance
    struct Game {
        session: Rc<RefCell<Session>>,
        host: Box<dyn HostBridge>,
        store: Rc<MemoryLeaderboard>,
        audio: AudioManager,
        renderer: Option<CanvasRenderer>,
        keys: MoveKeys,
        /// Pointer in viewport coordinates
        pointer: Option<Vec2>,
        firing: bool,
        /// One-shot commands collected from buttons until the next frame
        pending: TickInput,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64, document: &Document) -> Self {
            let config = SessionConfig {
                seed,
                ..Default::default()
            };
            let settings = Settings::load();
            let renderer = CanvasRenderer::new(document);
            if renderer.is_none() {
                log::warn!("No 2d canvas on #game - world view disabled");
            }
            Self {
                audio: AudioManager::new(&settings),
                renderer,
                session: Rc::new(RefCell::new(Session::new(config, settings))),
                host: platform::host_bridge(),
                store: Rc::new(MemoryLeaderboard::new()),
                keys: MoveKeys::default(),
                pointer: None,
                firing: false,
                pending: TickInput::default(),
                last_time: 0.0,
            }
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                0.0
            };
            self.last_time = time;
            let dt = dt.min(100.0);

            let mut input = std::mem::take(&mut self.pending);
            input.keys = self.keys;
            input.fire = self.firing;

            let mut session = self.session.borrow_mut();
            let camera = Camera::centered_on(session.state.player.pos);
            input.aim = self.pointer.map(|p| camera.to_world(p));
            let events = session.frame(&input, dt);
            for event in session.drain_host_events() {
                self.host.notify(&event);
            }

            // Host mute toggles land in the settings between frames
            self.audio.apply_settings(&session.settings);
            if session.phase() != SessionPhase::Running || session.state.is_day() {
                self.audio.stop_music();
            }
            self.audio.handle_events(&events);
        }

        fn draw(&self) {
            let Some(renderer) = &self.renderer else {
                return;
            };
            let session = self.session.borrow();
            let hit_flash = session.settings.effective_hit_flash();
            renderer.draw(&render::world_draw_list(&session.state, hit_flash));
        }

        fn update_dom(&self, document: &Document) {
            let session = self.session.borrow();
            let phase = session.phase();

            set_hidden(document, "title", !matches!(phase, SessionPhase::Title | SessionPhase::Starting));
            set_hidden(document, "btn-play", !session.can_press_play());
            set_text(
                document,
                "title-status",
                session.entry_status().or(session.entry_message).unwrap_or(""),
            );

            set_hidden(document, "hud", phase != SessionPhase::Running);
            if phase == SessionPhase::Running {
                render_hud(document, &HudView::from_state(&session.state));
            }

            match EndScreenView::from_session(&session) {
                Some(end) => {
                    set_hidden(document, "end-screen", false);
                    set_text(document, "end-stats", &end.stats_text);
                    set_hidden(document, "btn-end-continue", !end.continue_enabled || end.chest_visible);
                    set_hidden(document, "btn-claim", !end.claim_enabled);
                    set_text(
                        document,
                        "claim-status",
                        end.claim_status.or(end.claim_message).unwrap_or(""),
                    );
                    set_hidden(document, "chest", !end.chest_visible);
                    set_text(document, "claim-result", end.reward_text.as_deref().unwrap_or(""));
                    set_hidden(document, "btn-claim-exit", end.reward_text.is_none());
                }
                None => set_hidden(document, "end-screen", true),
            }
        }
    }

    fn render_hud(document: &Document, hud: &HudView) {
        set_text(document, "hud-score", &hud.score_text);
        set_text(document, "hud-cash", &hud.cash_text);
        set_text(document, "hud-clock", &hud.clock_text);
        set_text(document, "hud-phase", &hud.phase_label);
        set_style_width(document, "hud-health-fill", hud.health_fraction);
        set_style_width(document, "hud-mutation-fill", hud.mutation_fraction);
        set_text(
            document,
            "hud-sky",
            match hud.icon {
                SkyIcon::Sun => "☀",
                SkyIcon::Moon => "☾",
            },
        );

        set_hidden(document, "shop-menu", !hud.shop_visible);
        for offer in &hud.offers {
            let id = match offer.item {
                ShopItem::Heal => "btn-heal",
                ShopItem::Shotgun => "btn-shotgun",
            };
            set_text(document, id, &format!("{} ${}", offer.label, offer.cost));
            set_disabled(document, id, !offer.enabled);
        }

        set_hidden(document, "btn-solve", !hud.show_trigger);
        set_hidden(document, "puzzle-success", !hud.puzzle_cleared);
        set_hidden(document, "puzzle-infected", !hud.infected_modal);
        set_hidden(document, "puzzle", hud.puzzle.is_none());
        if let Some(view) = &hud.puzzle {
            set_text(document, "puzzle-title", view.title);
            set_text(document, "puzzle-subtitle", view.subtitle);
            set_text(document, "puzzle-lines", &view.lines.join("\n"));
            set_text(document, "btn-confirm", hud.confirm_label);
            for i in 0..CHOICE_BUTTONS {
                let id = format!("choice-{i}");
                match view.choices.get(i) {
                    Some(choice) => {
                        set_text(document, &id, choice);
                        set_hidden(document, &id, false);
                    }
                    None => set_hidden(document, &id, true),
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("disabled", disabled);
        }
    }

    fn set_style_width(document: &Document, id: &str, fraction: f32) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("style", &format!("width: {:.0}%", fraction * 100.0));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {err}").into());
        }

        log::info!("Survivor Zombies starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(Game::new(platform::clock_seed(), &document)));

        setup_input_handlers(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_host_messages(game.clone());
        setup_teardown(game.clone());

        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, f: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{id}");
            return;
        };
        let mut f = f;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| f());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        // Title: sign the entry transaction, then start
        {
            let session = game.borrow().session.clone();
            on_click(document, "btn-play", move || {
                let session = session.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match BrowserWallet::detect() {
                        Some(wallet) => {
                            session::drive_entry(&session, &wallet).await;
                        }
                        None => {
                            let mut s = session.borrow_mut();
                            if let PlayRequest::NeedsSignature(ticket) = s.press_play() {
                                s.apply_entry_signature(&ticket, Err(WalletError::NoWallet));
                            }
                        }
                    }
                });
            });
        }

        for (id, item) in [("btn-heal", ShopItem::Heal), ("btn-shotgun", ShopItem::Shotgun)] {
            let game = game.clone();
            on_click(document, id, move || game.borrow_mut().pending.purchase = Some(item));
        }

        {
            let game = game.clone();
            on_click(document, "btn-solve", move || {
                game.borrow_mut().pending.accept_puzzle = true;
            });
        }

        for i in 0..CHOICE_BUTTONS {
            let game = game.clone();
            on_click(document, &format!("choice-{i}"), move || {
                game.borrow_mut().pending.puzzle = Some(PuzzleAction::Choose(i));
            });
        }

        for (id, action) in [
            ("btn-confirm", PuzzleAction::Confirm),
            ("btn-clear", PuzzleAction::ClearBuilt),
            ("btn-surrender", PuzzleAction::Surrender),
            ("btn-puzzle-continue", PuzzleAction::Continue),
            ("btn-infected-continue", PuzzleAction::Continue),
        ] {
            let game = game.clone();
            on_click(document, id, move || game.borrow_mut().pending.puzzle = Some(action));
        }

        for id in ["btn-end-continue", "btn-claim-exit"] {
            let session = game.borrow().session.clone();
            on_click(document, id, move || {
                session.borrow_mut().continue_to_title();
            });
        }

        {
            let session = game.borrow().session.clone();
            let store = game.borrow().store.clone();
            on_click(document, "btn-claim", move || {
                let session = session.clone();
                let store = store.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let Some(wallet) = BrowserWallet::detect() else {
                        let mut s = session.borrow_mut();
                        if let Some(ticket) = s.begin_claim() {
                            let _ = s.apply_claim_signature(&ticket, Err(WalletError::NoWallet));
                        }
                        return;
                    };
                    let profile = match FarcadeHost::detect() {
                        Some(host) => host.context().await.profile(),
                        None => PlayerProfile::default(),
                    };
                    if let Err(err) = session::drive_claim(&session, &wallet, &*store, &profile).await {
                        log::warn!("Claim ended early: {err}");
                    }
                });
            });
        }

        {
            let store = game.borrow().store.clone();
            let panel_size = game.borrow().session.borrow().config.leaderboard_panel_size;
            let panel = document.clone();
            on_click(document, "btn-leaderboard", move || {
                let store = store.clone();
                let document = panel.clone();
                set_text(&document, "leaderboard-lines", "Loading...");
                wasm_bindgen_futures::spawn_local(async move {
                    let result = store.fetch_top(panel_size).await;
                    let lines = ui::leaderboard_lines(&result);
                    set_text(&document, "leaderboard-lines", &lines.join("\n"));
                });
            });
        }
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        fn set_key(keys: &mut MoveKeys, key: &str, down: bool) -> bool {
            match key {
                "ArrowLeft" | "a" | "A" => keys.left = down,
                "ArrowRight" | "d" | "D" => keys.right = down,
                "ArrowUp" | "w" | "W" => keys.up = down,
                "ArrowDown" | "s" | "S" => keys.down = down,
                _ => return false,
            }
            true
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                g.audio.resume();
                if set_key(&mut g.keys, &key, true) {
                    event.prevent_default();
                    return;
                }
                if key == "r" || key == "R" {
                    let mut session = g.session.borrow_mut();
                    if session.phase() == SessionPhase::Ended && !session.claim.is_busy() {
                        session.restart();
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                set_key(&mut game.borrow_mut().keys, &event.key(), false);
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(canvas) = document.get_element_by_id("game") else {
            log::warn!("Missing #game surface");
            return;
        };

        // Pointer: aim follows, press fires
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.pointer = Some(Vec2::new(event.offset_x() as f32, event.offset_y() as f32));
                g.firing = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut().pointer =
                    Some(Vec2::new(event.offset_x() as f32, event.offset_y() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().firing = false;
            });
            for name in ["pointerup", "pointerleave"] {
                let _ = canvas
                    .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }
    }

    fn setup_host_messages(game: Rc<RefCell<Game>>) {
        let Some(host) = FarcadeHost::detect() else {
            return;
        };
        let session = game.borrow().session.clone();
        host.on_message(move |message| {
            let mut session = session.borrow_mut();
            session.handle_host_message(message);
            session.settings.save();
        });
    }

    /// Leaving the page releases timers and turns pending awaits into no-ops
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow().session.borrow_mut().teardown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        if !game.borrow().session.borrow().is_alive() {
            return;
        }
        game.borrow_mut().update(time);
        game.borrow().draw();
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            game.borrow().update_dom(&document);
        }
        request_animation_frame(game);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    //! Scripted player for the headless native run

    use std::collections::VecDeque;

    use glam::Vec2;

    use survivor_zombies::consts::*;
    use survivor_zombies::puzzle::{ActivePuzzle, GateState, PuzzleAction, PuzzleInstance};
    use survivor_zombies::sim::shop::ShopItem;
    use survivor_zombies::sim::state::{GameState, Gun};
    use survivor_zombies::sim::tick::{MoveKeys, TickInput};

    /// Keep this far from the nearest hostile
    const COMFORT_DISTANCE: f32 = 220.0;

    #[derive(Debug, Default)]
    pub struct Autopilot {
        queue: VecDeque<PuzzleAction>,
    }

    impl Autopilot {
        pub fn input(&mut self, state: &GameState) -> TickInput {
            let mut input = TickInput::default();
            let gate = &state.gate;

            if matches!(gate.state, GateState::Cleared | GateState::Infected) {
                self.queue.clear();
                input.puzzle = Some(PuzzleAction::Continue);
                return input;
            }
            if let Some(active) = gate.active() {
                if self.queue.is_empty() {
                    self.plan(active);
                }
                input.puzzle = self.queue.pop_front();
                return input;
            }
            input.accept_puzzle = gate.show_solve_puzzle_btn();

            let wanted = Self::wanted_item(state);
            if let (true, Some(item)) = (state.is_day(), wanted) {
                if state.near_shop {
                    input.purchase = Some(item);
                } else {
                    input.keys = Self::toward(state.player.pos, state.world.shop);
                }
                return input;
            }

            let nearest = state
                .zombies
                .iter()
                .filter(|z| z.active)
                .min_by(|a, b| {
                    let da = a.pos.distance_squared(state.player.pos);
                    let db = b.pos.distance_squared(state.player.pos);
                    da.total_cmp(&db)
                });
            if let Some(zombie) = nearest {
                input.aim = Some(zombie.pos);
                input.fire = true;
                if zombie.pos.distance(state.player.pos) < COMFORT_DISTANCE {
                    let away = state.player.pos * 2.0 - zombie.pos;
                    input.keys = Self::toward(state.player.pos, away);
                }
            }
            input
        }

        /// Something worth walking to the shop for
        fn wanted_item(state: &GameState) -> Option<ShopItem> {
            if state.cash >= SHOTGUN_COST && state.player.gun != Gun::Shotgun {
                Some(ShopItem::Shotgun)
            } else if state.cash >= HEAL_COST && state.player.health < MAX_HEALTH {
                Some(ShopItem::Heal)
            } else {
                None
            }
        }

        /// Single-axis step along the larger offset
        fn toward(from: Vec2, to: Vec2) -> MoveKeys {
            let d = to - from;
            let mut keys = MoveKeys::default();
            if d.length() < 1.0 {
                return keys;
            }
            if d.x.abs() > d.y.abs() {
                keys.left = d.x < 0.0;
                keys.right = d.x > 0.0;
            } else {
                keys.up = d.y < 0.0;
                keys.down = d.y > 0.0;
            }
            keys
        }

        /// Try every choice in turn; build puzzles get the complement typed out
        fn plan(&mut self, active: &ActivePuzzle) {
            if let PuzzleInstance::BuildComplement(build) = &active.instance {
                self.queue.push_back(PuzzleAction::ClearBuilt);
                self.queue
                    .extend(build.target.iter().map(|&b| PuzzleAction::PushBase(b)));
                self.queue.push_back(PuzzleAction::Confirm);
                self.queue.push_back(PuzzleAction::Surrender);
                return;
            }
            let choices = active.instance.view().choices.len();
            for i in 0..choices {
                self.queue.push_back(PuzzleAction::Choose(i));
                self.queue.push_back(PuzzleAction::Confirm);
            }
            self.queue.push_back(PuzzleAction::Surrender);
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
    use survivor_zombies::platform;
    use survivor_zombies::session::{RunReport, Session, SessionConfig, SessionPhase};
    use survivor_zombies::settings::Settings;

    env_logger::init();
    log::info!("Survivor Zombies (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(platform::clock_seed);
    let config = SessionConfig {
        seed,
        require_entry_tx: false,
        ..Default::default()
    };
    let host = platform::host_bridge();
    let mut session = Session::new(config, Settings::load());
    session.press_play();

    const FRAME_MS: f32 = 1000.0 / 60.0;
    const MAX_FRAMES: usize = 60 * 60 * 15;
    let mut pilot = autopilot::Autopilot::default();
    for _ in 0..MAX_FRAMES {
        let input = pilot.input(&session.state);
        session.frame(&input, FRAME_MS);
        for event in session.drain_host_events() {
            host.notify(&event);
        }
        if session.phase() == SessionPhase::Ended {
            break;
        }
    }

    let report = session
        .report()
        .cloned()
        .unwrap_or_else(|| RunReport::from_state(&session.state));
    println!("Seed {seed}\n{}", report.text());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
