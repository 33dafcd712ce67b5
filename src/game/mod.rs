//! Browser harness for the whack-a-mole scheduler.
//!
//! Everything timing- and rule-related lives in [`engine`]; this module only
//! wires it to the page: it builds the board, HUD and control elements if
//! they are missing, forwards clicks and control events into the engine, and
//! drives [`Engine::tick`] from a `requestAnimationFrame` loop with
//! `performance.now()` timestamps.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAudioElement, HtmlSelectElement, window};

pub mod config;
pub mod engine;
pub mod rng;

use config::{
    BOARD_SIZES, BoardProfile, DEFAULT_BOARD_SIZE, DEFAULT_DIFFICULTY, DIFFICULTIES, MoleKind,
};
use engine::{Cell, Engine, Presenter};
use rng::GameRng;

use crate::performance_now;

thread_local! {
    static GAME: RefCell<Option<Engine<DomPresenter>>> = const { RefCell::new(None) };
}

fn with_game(f: impl FnOnce(&mut Engine<DomPresenter>)) {
    GAME.with(|cell| {
        if let Some(engine) = cell.borrow_mut().as_mut() {
            f(engine);
        }
    });
}

/// Entry point called from `start_game()`: build the page furniture, create
/// the engine and start the frame loop. The first round starts when the
/// player presses New Game.
pub fn start_whack_mode() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    ensure_layout(&doc)?;

    let presenter = DomPresenter::new();
    let engine = Engine::new(presenter, GameRng::from_clock(performance_now()));
    GAME.with(|cell| cell.replace(Some(engine)));
    apply_selected_profiles(&doc);

    wire_controls(&doc)?;
    update_controls(&doc);
    start_frame_loop();
    Ok(())
}

// --- DOM presenter -----------------------------------------------------------

/// [`Presenter`] over the live document. Cells and HUD fields are looked up
/// by id on each call; missing nodes are skipped (the layout may be rebuilt
/// under us between frames).
struct DomPresenter {
    whack_sound: Option<HtmlAudioElement>,
}

impl DomPresenter {
    fn new() -> Self {
        // Single shared sound element; all kinds play the same smash.
        let whack_sound = HtmlAudioElement::new_with_src("assets/smash.mp3").ok();
        DomPresenter { whack_sound }
    }

    fn cell_element(&self, cell: Cell) -> Option<Element> {
        let doc = window()?.document()?;
        let cols = GAME_COLS.with(|c| c.get());
        let idx = cell.row as usize * cols as usize + cell.col as usize;
        doc.get_element_by_id(&format!("wm-cell-{idx}"))
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }
}

// Column count of the current board, needed to map (row, col) back to cell
// element ids.
thread_local! {
    static GAME_COLS: std::cell::Cell<u8> = const { std::cell::Cell::new(0) };
}

impl Presenter for DomPresenter {
    fn create_cells(&mut self, profile: &'static BoardProfile) {
        let (rows, cols) = (profile.rows, profile.cols);
        GAME_COLS.with(|c| c.set(cols));
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };
        let Some(board) = doc.get_element_by_id("wm-board") else {
            return;
        };
        board.set_class_name(&format!("board {}", profile.class_name));
        board
            .set_attribute(
                "style",
                &format!(
                    "display:grid; grid-template-columns:repeat({cols}, 72px); \
                     grid-auto-rows:72px; gap:10px; justify-content:center; \
                     padding:16px; background:#2e7d32; border-radius:18px;"
                ),
            )
            .ok();
        board.set_inner_html("");
        let total = rows as usize * cols as usize;
        for idx in 0..total {
            if let Ok(hole) = doc.create_element("div") {
                hole.set_id(&format!("wm-cell-{idx}"));
                hole.set_class_name("hole");
                hole.set_attribute(
                    "style",
                    "background:#4e342e; border-radius:50%; font-size:40px; \
                     display:flex; align-items:center; justify-content:center; \
                     cursor:pointer; user-select:none;",
                )
                .ok();
                let row = (idx / cols as usize) as u8;
                let col = (idx % cols as usize) as u8;
                let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                    with_game(|e| e.try_whack(Cell { row, col }, performance_now()));
                }) as Box<dyn FnMut(_)>);
                hole.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                    .ok();
                closure.forget();
                board.append_child(&hole).ok();
            }
        }
        // A fresh board also clears leftover end-of-round chrome.
        self.hide_status();
        if let Some(el) = doc.get_element_by_id("wm-final") {
            el.set_attribute("style", "display:none;").ok();
        }
    }

    fn show_mole(&mut self, cell: Cell, kind: &'static MoleKind) {
        if let Some(el) = self.cell_element(cell) {
            el.set_class_name(&format!("hole has-mole kind-{}", kind.name));
            el.set_text_content(Some(kind.glyph));
        }
    }

    fn show_whacked(&mut self, cell: Cell, kind: &'static MoleKind) {
        if let Some(el) = self.cell_element(cell) {
            let flash = match kind.name {
                "bonus" => " bonus-flash",
                "penalty" => " penalty-flash",
                _ => "",
            };
            el.set_class_name(&format!("hole has-mole whacked kind-{}{flash}", kind.name));
            el.set_text_content(Some("💥"));
        }
    }

    fn clear_cell(&mut self, cell: Cell) {
        if let Some(el) = self.cell_element(cell) {
            el.set_class_name("hole");
            el.set_text_content(Some(""));
        }
    }

    fn set_score(&mut self, score: i32) {
        self.set_text("wm-score", &format!("Score: {score:02}"));
    }

    fn set_time_remaining(&mut self, seconds: u32) {
        self.set_text("wm-time", &format!("Time: {seconds:02}"));
    }

    fn play_whack_sound(&mut self) {
        let Some(audio) = &self.whack_sound else {
            return;
        };
        audio.set_current_time(0.0);
        // Playback rejection (autoplay policy etc.) must never interrupt the
        // game, only leave a trace in the console.
        if let Err(err) = audio.play() {
            web_sys::console::warn_2(&JsValue::from_str("whack sound failed:"), &err);
        }
    }

    fn show_status(&mut self, text: &str) {
        if let Some(el) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("wm-status"))
        {
            el.set_text_content(Some(text));
            el.set_attribute("style", &format!("{OVERLAY_STYLE} display:flex;"))
                .ok();
        }
    }

    fn hide_status(&mut self) {
        if let Some(el) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("wm-status"))
        {
            el.set_attribute("style", "display:none;").ok();
        }
    }

    fn show_final_score(&mut self, score: i32) {
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = doc.get_element_by_id("wm-final-text") {
            el.set_text_content(Some(&format!("Game over! Final score: {score}")));
        }
        if let Some(el) = doc.get_element_by_id("wm-final") {
            el.set_attribute(
                "style",
                &format!("{OVERLAY_STYLE} display:flex; flex-direction:column; gap:12px;"),
            )
            .ok();
        }
    }
}

const OVERLAY_STYLE: &str = "position:fixed; left:50%; top:30%; transform:translateX(-50%); \
     font-family:'Fira Code', monospace; font-size:28px; padding:12px 24px; \
     background:rgba(0,0,0,0.65); border:1px solid #333; border-radius:10px; \
     color:#ffd166; z-index:40; align-items:center; justify-content:center;";

// --- Page furniture ----------------------------------------------------------

fn ensure_layout(doc: &Document) -> Result<(), JsValue> {
    let Some(body) = doc.body() else {
        return Err(JsValue::from_str("no body"));
    };

    if doc.get_element_by_id("wm-score").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("wm-score");
        div.set_text_content(Some("Score: 00"));
        div.set_attribute("style", &hud_style("12px"))?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("wm-time").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("wm-time");
        div.set_text_content(Some("Time: 00"));
        div.set_attribute("style", &hud_style("150px"))?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("wm-status").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("wm-status");
        div.set_attribute("style", "display:none;")?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("wm-final").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("wm-final");
        div.set_attribute("style", "display:none;")?;
        let text = doc.create_element("div")?;
        text.set_id("wm-final-text");
        div.append_child(&text)?;
        let btn = doc.create_element("button")?;
        btn.set_id("wm-play-again");
        btn.set_text_content(Some("Play Again"));
        btn.set_attribute("style", "font-family:inherit; font-size:18px; padding:6px 18px;")?;
        div.append_child(&btn)?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("wm-board").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("wm-board");
        div.set_attribute(
            "style",
            "position:fixed; left:50%; top:45%; transform:translate(-50%,-50%);",
        )?;
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("wm-controls").is_none() {
        let bar = doc.create_element("div")?;
        bar.set_id("wm-controls");
        bar.set_attribute(
            "style",
            "position:fixed; left:50%; bottom:24px; transform:translateX(-50%); \
             display:flex; gap:8px; font-family:'Fira Code', monospace; z-index:30;",
        )?;

        let difficulty = doc.create_element("select")?;
        difficulty.set_id("wm-difficulty");
        for profile in DIFFICULTIES.iter() {
            let option = doc.create_element("option")?;
            option.set_attribute("value", profile.key)?;
            option.set_text_content(Some(profile.key));
            difficulty.append_child(&option)?;
        }
        bar.append_child(&difficulty)?;

        let board_size = doc.create_element("select")?;
        board_size.set_id("wm-board-size");
        for profile in BOARD_SIZES.iter() {
            let option = doc.create_element("option")?;
            option.set_attribute("value", profile.key)?;
            option.set_text_content(Some(profile.key));
            board_size.append_child(&option)?;
        }
        bar.append_child(&board_size)?;

        for (id, label) in [
            ("wm-new-game", "New Game"),
            ("wm-pause", "Pause"),
            ("wm-restart", "Restart"),
        ] {
            let btn = doc.create_element("button")?;
            btn.set_id(id);
            btn.set_text_content(Some(label));
            bar.append_child(&btn)?;
        }
        body.append_child(&bar)?;
    }

    if let Some(sel) = doc
        .get_element_by_id("wm-difficulty")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
    {
        sel.set_value(DEFAULT_DIFFICULTY);
    }
    if let Some(sel) = doc
        .get_element_by_id("wm-board-size")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
    {
        sel.set_value(DEFAULT_BOARD_SIZE);
    }
    Ok(())
}

fn hud_style(left: &str) -> String {
    format!(
        "position:fixed; top:10px; left:{left}; font-family:'Fira Code', monospace; \
         font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); \
         border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;"
    )
}

// --- Controls ----------------------------------------------------------------

fn selected_value(doc: &Document, id: &str) -> Option<String> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        .map(|sel| sel.value())
}

/// Push the current select values into the engine. The engine ignores them
/// while a round is running, matching the "apply on next round" rule.
fn apply_selected_profiles(doc: &Document) {
    let difficulty = selected_value(doc, "wm-difficulty");
    let board_size = selected_value(doc, "wm-board-size");
    with_game(|e| {
        if let Some(key) = &difficulty {
            e.set_difficulty(key);
        }
        if let Some(key) = &board_size {
            e.set_board_size(key);
        }
    });
}

fn wire_controls(doc: &Document) -> Result<(), JsValue> {
    if let Some(btn) = doc.get_element_by_id("wm-new-game") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let Some(doc) = window().and_then(|w| w.document()) else {
                return;
            };
            with_game(|e| e.end_round_cleanup());
            apply_selected_profiles(&doc);
            with_game(|e| e.start_round(performance_now()));
            update_controls(&doc);
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    if let Some(btn) = doc.get_element_by_id("wm-pause") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|e| e.toggle_pause(performance_now()));
            if let Some(doc) = window().and_then(|w| w.document()) {
                update_controls(&doc);
            }
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    if let Some(btn) = doc.get_element_by_id("wm-restart") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|e| {
                e.end_round_cleanup();
                e.start_round(performance_now());
            });
            if let Some(doc) = window().and_then(|w| w.document()) {
                update_controls(&doc);
            }
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Play Again lives inside the final-score panel, visible only once a
    // round has ended; starting the next round rebuilds the board, which
    // hides the panel again.
    if let Some(btn) = doc.get_element_by_id("wm-play-again") {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_game(|e| {
                e.end_round_cleanup();
                e.start_round(performance_now());
            });
            if let Some(doc) = window().and_then(|w| w.document()) {
                update_controls(&doc);
            }
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    for id in ["wm-difficulty", "wm-board-size"] {
        if let Some(sel) = doc.get_element_by_id(id) {
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
                if let Some(doc) = window().and_then(|w| w.document()) {
                    apply_selected_profiles(&doc);
                }
            }) as Box<dyn FnMut(_)>);
            sel.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
    }
    Ok(())
}

fn set_disabled(doc: &Document, id: &str, disabled: bool) {
    if let Some(el) = doc.get_element_by_id(id) {
        if disabled {
            el.set_attribute("disabled", "").ok();
        } else {
            el.remove_attribute("disabled").ok();
        }
    }
}

/// Enable/disable controls for the current round state and keep the pause
/// button label in sync.
fn update_controls(doc: &Document) {
    let mut over = true;
    let mut paused = false;
    GAME.with(|cell| {
        if let Some(e) = cell.borrow().as_ref() {
            over = e.is_over();
            paused = e.is_paused();
        }
    });
    set_disabled(doc, "wm-new-game", !over && !paused);
    set_disabled(doc, "wm-pause", over);
    set_disabled(doc, "wm-restart", over);
    set_disabled(doc, "wm-difficulty", !over);
    set_disabled(doc, "wm-board-size", !over);
    if let Some(btn) = doc.get_element_by_id("wm-pause") {
        btn.set_text_content(Some(if paused { "Resume" } else { "Pause" }));
    }
}

// --- Frame loop --------------------------------------------------------------

type FrameCallback = std::rc::Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_game(|e| e.tick(ts));
        if let Some(doc) = window().and_then(|w| w.document()) {
            update_controls(&doc);
        }
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
