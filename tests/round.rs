// End-to-end round scenarios driven through the public engine API with
// synthetic timestamps. Native-friendly: no wasm/browser APIs.

use whack_a_mole::game::config::{BOARD_SIZES, BoardProfile, DIFFICULTIES, MoleKind};
use whack_a_mole::game::engine::{Cell, Engine, Presenter};
use whack_a_mole::game::rng::GameRng;

/// Presenter that records a readable transcript of every collaborator call.
#[derive(Default)]
struct Transcript {
    lines: Vec<String>,
    scores: Vec<i32>,
    finals: Vec<i32>,
}

impl Presenter for Transcript {
    fn create_cells(&mut self, board: &'static BoardProfile) {
        self.lines.push(format!("cells {}", board.class_name));
    }
    fn show_mole(&mut self, cell: Cell, kind: &'static MoleKind) {
        self.lines
            .push(format!("mole {},{} {}", cell.row, cell.col, kind.name));
    }
    fn show_whacked(&mut self, cell: Cell, _kind: &'static MoleKind) {
        self.lines.push(format!("whacked {},{}", cell.row, cell.col));
    }
    fn clear_cell(&mut self, cell: Cell) {
        self.lines.push(format!("clear {},{}", cell.row, cell.col));
    }
    fn set_score(&mut self, score: i32) {
        self.lines.push(format!("score {score}"));
        self.scores.push(score);
    }
    fn set_time_remaining(&mut self, seconds: u32) {
        self.lines.push(format!("time {seconds}"));
    }
    fn play_whack_sound(&mut self) {
        self.lines.push("sound".to_string());
    }
    fn show_status(&mut self, text: &str) {
        self.lines.push(format!("status {text}"));
    }
    fn hide_status(&mut self) {
        self.lines.push("hide-status".to_string());
    }
    fn show_final_score(&mut self, score: i32) {
        self.lines.push(format!("final {score}"));
        self.finals.push(score);
    }
}

fn engine(difficulty: &str, board: &str, seed: u64) -> Engine<Transcript> {
    let mut e = Engine::new(Transcript::default(), GameRng::new(seed));
    assert!(e.set_difficulty(difficulty));
    assert!(e.set_board_size(board));
    e
}

fn all_cells(e: &Engine<Transcript>) -> Vec<Cell> {
    let (rows, cols) = (e.board().rows, e.board().cols);
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| Cell { row, col }))
        .collect()
}

#[test]
fn every_profile_pair_starts_a_clean_round() {
    for d in DIFFICULTIES.iter() {
        for b in BOARD_SIZES.iter() {
            let mut e = engine(d.key, b.key, 1);
            e.start_round(0.0);
            assert_eq!(e.score(), 0);
            assert_eq!(e.seconds_remaining(), d.round_duration_secs);
            assert!(!e.is_over());
            // The board renderer saw the selected profile's CSS hook.
            let expected = format!("cells {}", b.class_name);
            assert!(e.presenter().lines.contains(&expected));
        }
    }
}

#[test]
fn easy_round_counts_down_to_exactly_zero_and_ends() {
    let mut e = engine("easy", "3x3", 7);
    e.start_round(0.0);
    let mut previous = e.seconds_remaining();
    let mut now = 0.0;
    while !e.is_over() {
        now += 100.0;
        assert!(now <= 61_000.0, "round failed to end after 60 s");
        e.tick(now);
        let seconds = e.seconds_remaining();
        assert!(seconds <= previous, "countdown went back up");
        previous = seconds;
    }
    assert_eq!(e.seconds_remaining(), 0);
    assert_eq!(e.presenter().finals.as_slice(), &[e.score()]);
    // Nothing (spawn, expiry or removal) fires once the round is over.
    let len = e.presenter().lines.len();
    e.tick(now + 3_600_000.0);
    assert_eq!(e.presenter().lines.len(), len);
}

#[test]
fn score_only_moves_by_legal_whack_deltas() {
    let mut e = engine("medium", "4x4", 21);
    let base = e.difficulty().base_score;
    let legal: Vec<i32> = vec![base, 3 * base, -2 * base];
    e.start_round(0.0);
    let cells = all_cells(&e);
    let mut now = 0.0;
    while !e.is_over() {
        now += 150.0;
        e.tick(now);
        for &cell in &cells {
            e.try_whack(cell, now);
        }
    }
    let mut last = 0;
    for &score in &e.presenter().scores {
        if score == 0 && last == 0 {
            continue; // initial display
        }
        assert!(
            legal.contains(&(score - last)),
            "illegal score step {last} -> {score}"
        );
        last = score;
    }
}

#[test]
fn occupancy_respects_the_safety_ceiling_throughout_a_round() {
    let mut e = engine("hard", "5x5", 33);
    e.start_round(0.0);
    let ceiling = e.difficulty().occupancy_ceiling();
    let mut now = 0.0;
    while !e.is_over() {
        now += 50.0;
        e.tick(now);
        assert!(
            e.occupancy() <= ceiling,
            "occupancy {} above ceiling {} at {now}",
            e.occupancy(),
            ceiling
        );
    }
}

#[test]
fn same_seed_and_schedule_replay_identically() {
    let run = || {
        let mut e = engine("hard", "4x4", 99);
        e.start_round(0.0);
        let cells = all_cells(&e);
        let mut now = 0.0;
        while !e.is_over() {
            now += 120.0;
            e.tick(now);
            if (now as u64) % 600 == 0 {
                for &cell in &cells {
                    e.try_whack(cell, now);
                }
            }
        }
        e.into_presenter().lines
    };
    assert_eq!(run(), run());
}

#[test]
fn pause_window_leaves_no_trace_on_the_countdown() {
    let mut e = engine("medium", "3x3", 5);
    e.start_round(0.0);
    e.tick(5000.0);
    let seconds = e.seconds_remaining();
    e.pause(5100.0);
    e.tick(2_000_000.0);
    assert_eq!(e.seconds_remaining(), seconds);
    e.resume(3_000_000.0);
    assert_eq!(e.seconds_remaining(), seconds);
    e.tick(3_001_000.0);
    assert_eq!(e.seconds_remaining(), seconds - 1);
}

#[test]
fn play_again_after_the_final_panel_starts_a_fresh_round() {
    let mut e = engine("medium", "3x3", 12);
    e.start_round(0.0);
    let cells = all_cells(&e);
    let mut now = 0.0;
    while !e.is_over() {
        now += 130.0;
        e.tick(now);
        for &cell in &cells {
            e.try_whack(cell, now);
        }
    }
    assert_eq!(e.presenter().finals.len(), 1);

    // The Play Again control runs cleanup then start on the same engine.
    e.end_round_cleanup();
    e.start_round(now);
    assert!(!e.is_over());
    assert_eq!(e.score(), 0);
    assert_eq!(e.seconds_remaining(), e.difficulty().round_duration_secs);
    assert_eq!(e.presenter().finals.len(), 1);
    // The fresh round's clock is live again.
    e.tick(now + 1000.0);
    assert_eq!(e.seconds_remaining(), e.difficulty().round_duration_secs - 1);
}
