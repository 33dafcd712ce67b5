//! Mole scheduler core: round state, cancellable timers, spawn slots, the
//! mole registry and pause/resume handling.
//!
//! The engine is platform-free. All waiting is expressed as deadline records
//! in a single [`TimerQueue`]; the embedder (the browser harness, or a test)
//! repeatedly calls [`Engine::tick`] with `performance.now()`-style
//! timestamps and every due action runs to completion inside that call.
//! Nothing here is shared across threads; the single-owner `Engine` value is
//! the serialization point.

use std::cmp::Ordering;

use super::config::{
    self, BoardProfile, DifficultyProfile, GAME_TICK_MS, MoleKind, WHACKED_DISPLAY_MS,
};
use super::rng::GameRng;

/// Board position, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    fn index(self, cols: u8) -> usize {
        self.row as usize * cols as usize + self.col as usize
    }

    fn from_index(idx: usize, cols: u8) -> Self {
        Cell {
            row: (idx / cols as usize) as u8,
            col: (idx % cols as usize) as u8,
        }
    }
}

/// Rendering / sound / display collaborators, collapsed into one seam so the
/// engine can be driven headless in tests. The browser harness implements
/// this over the DOM.
pub trait Presenter {
    fn create_cells(&mut self, board: &'static BoardProfile);
    fn show_mole(&mut self, cell: Cell, kind: &'static MoleKind);
    fn show_whacked(&mut self, cell: Cell, kind: &'static MoleKind);
    fn clear_cell(&mut self, cell: Cell);
    fn set_score(&mut self, score: i32);
    fn set_time_remaining(&mut self, seconds: u32);
    fn play_whack_sound(&mut self);
    fn show_status(&mut self, text: &str);
    fn hide_status(&mut self);
    fn show_final_score(&mut self, score: i32);
}

/// Handle to one scheduled action. Cancellation through
/// [`TimerQueue::cancel`] is idempotent: cancelling an already-fired or
/// already-cancelled handle is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TimerId(u64);

#[derive(Clone, Copy, Debug)]
enum TimerAction {
    ClockTick,
    SlotFire(usize),
    Expiry(Cell),
    WhackedRemoval(Cell),
}

struct Timer {
    id: TimerId,
    fire_at: f64,
    action: TimerAction,
}

/// Flat deadline queue. Small enough (a handful of timers per round) that a
/// linear scan beats any real priority structure.
#[derive(Default)]
struct TimerQueue {
    next_id: u64,
    pending: Vec<Timer>,
}

impl TimerQueue {
    fn arm(&mut self, fire_at: f64, action: TimerAction) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(Timer { id, fire_at, action });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|t| t.id != id);
    }

    /// Remove and return the earliest timer with `fire_at <= now`. Equal
    /// deadlines come back in arbitrary order.
    fn pop_due(&mut self, now: f64) -> Option<Timer> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fire_at <= now)
            .min_by(|(_, a), (_, b)| {
                a.fire_at.partial_cmp(&b.fire_at).unwrap_or(Ordering::Equal)
            })
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(idx))
    }

    fn clear(&mut self) {
        self.pending.clear();
    }
}

/// One mole on the board. At most one instance occupies a cell; once whacked
/// it is immune to re-whacking and to natural expiry (the expiry timer is
/// cancelled at whack time).
struct MoleInstance {
    kind: &'static MoleKind,
    whacked: bool,
    /// Planned natural disappearance, absolute.
    expire_at: f64,
    expiry: Option<TimerId>,
    /// Post-whack removal deadline, absolute. Valid while `removal` is armed.
    removal_at: f64,
    removal: Option<TimerId>,
    /// Remaining time captured at pause, restored on resume.
    frozen_remaining: f64,
}

/// One spawn "lane". Exactly `simultaneous_moles` slots exist per round;
/// each is either pending (owns one timer) or idle. A slot only re-arms
/// inside its own fire handler, so the pending count can never drift above
/// the slot count.
#[derive(Clone, Copy, Default)]
struct SpawnSlot {
    pending: Option<TimerId>,
}

/// The whole round: clock, slots, registry and score, owned by a single
/// controller value. `over = true` is the terminal state until the next
/// `start_round`; `paused` is only meaningful while a round runs.
pub struct Engine<P: Presenter> {
    presenter: P,
    rng: GameRng,
    difficulty: &'static DifficultyProfile,
    board: &'static BoardProfile,
    score: i32,
    seconds_remaining: u32,
    paused: bool,
    over: bool,
    timers: TimerQueue,
    clock: Option<TimerId>,
    slots: Vec<SpawnSlot>,
    moles: Vec<Option<MoleInstance>>,
}

impl<P: Presenter> Engine<P> {
    pub fn new(presenter: P, rng: GameRng) -> Self {
        let difficulty = config::difficulty(config::DEFAULT_DIFFICULTY)
            .unwrap_or(&config::DIFFICULTIES[0]);
        let board =
            config::board_size(config::DEFAULT_BOARD_SIZE).unwrap_or(&config::BOARD_SIZES[0]);
        let mut engine = Engine {
            presenter,
            rng,
            difficulty,
            board,
            score: 0,
            seconds_remaining: difficulty.round_duration_secs,
            paused: false,
            over: true,
            timers: TimerQueue::default(),
            clock: None,
            slots: Vec::new(),
            moles: Vec::new(),
        };
        engine.reset_board();
        engine
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn difficulty(&self) -> &'static DifficultyProfile {
        self.difficulty
    }

    pub fn board(&self) -> &'static BoardProfile {
        self.board
    }

    /// Number of moles currently on the board (whacked-but-visible included).
    pub fn occupancy(&self) -> usize {
        self.moles.iter().flatten().count()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Select a difficulty profile by key. Honored only between rounds;
    /// returns false (selection ignored) while a round is running.
    pub fn set_difficulty(&mut self, key: &str) -> bool {
        if !self.over {
            return false;
        }
        let Some(profile) = config::difficulty(key) else {
            return false;
        };
        self.difficulty = profile;
        self.reset_board();
        true
    }

    /// Select a board profile by key, same rules as [`set_difficulty`].
    ///
    /// [`set_difficulty`]: Engine::set_difficulty
    pub fn set_board_size(&mut self, key: &str) -> bool {
        if !self.over {
            return false;
        }
        let Some(profile) = config::board_size(key) else {
            return false;
        };
        self.board = profile;
        self.reset_board();
        true
    }

    /// Rebuild the board and reset score / time displays for the current
    /// profiles. Valid only while no round is running.
    fn reset_board(&mut self) {
        self.score = 0;
        self.seconds_remaining = self.difficulty.round_duration_secs;
        self.moles = (0..self.board.cell_count()).map(|_| None).collect();
        self.slots = vec![SpawnSlot::default(); self.difficulty.simultaneous_moles];
        self.presenter.create_cells(self.board);
        self.presenter.set_score(self.score);
        self.presenter.set_time_remaining(self.seconds_remaining);
    }

    /// Begin a round: start the game clock and arm every spawn slot. No-op
    /// if a round is already running (only one clock per round).
    pub fn start_round(&mut self, now: f64) {
        if !self.over {
            return;
        }
        self.reset_board();
        self.over = false;
        self.paused = false;
        self.clock = Some(self.timers.arm(now + GAME_TICK_MS, TimerAction::ClockTick));
        for i in 0..self.slots.len() {
            self.arm_slot(i, now);
        }
    }

    /// Run every scheduled action whose deadline has passed, in deadline
    /// order. Actions may schedule further actions; those are considered in
    /// the same call if already due.
    pub fn tick(&mut self, now: f64) {
        while let Some(timer) = self.timers.pop_due(now) {
            self.dispatch(timer, now);
        }
    }

    fn dispatch(&mut self, timer: Timer, now: f64) {
        match timer.action {
            TimerAction::ClockTick => {
                self.clock = None;
                self.on_clock_tick(timer.fire_at);
            }
            TimerAction::SlotFire(slot) => {
                self.slots[slot].pending = None;
                self.spawn_mole(now);
                // Self-perpetuating chain: a slot only continues if re-armed
                // here, inside its own fire handler.
                if !self.over && !self.paused {
                    self.arm_slot(slot, now);
                }
            }
            TimerAction::Expiry(cell) => self.remove_mole(cell, now),
            TimerAction::WhackedRemoval(cell) => self.remove_mole(cell, now),
        }
    }

    fn on_clock_tick(&mut self, fired_at: f64) {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        self.presenter.set_time_remaining(self.seconds_remaining);
        if self.seconds_remaining == 0 {
            self.finish_round();
        } else {
            // Re-arm relative to the previous deadline so the 1 s period
            // does not accumulate frame-callback lag.
            self.clock = Some(
                self.timers
                    .arm(fired_at + GAME_TICK_MS, TimerAction::ClockTick),
            );
        }
    }

    fn arm_slot(&mut self, slot: usize, now: f64) {
        let (min, max) = self.difficulty.spawn_interval_ms;
        let delay = self.rng.range_f64(min, max);
        self.slots[slot].pending =
            Some(self.timers.arm(now + delay, TimerAction::SlotFire(slot)));
    }

    /// Spawn one mole into a random empty cell. Silently skipped while
    /// paused or over, when occupancy reached the safety ceiling, or when
    /// the board is full.
    fn spawn_mole(&mut self, now: f64) {
        if self.paused || self.over {
            return;
        }
        if self.occupancy() >= self.difficulty.occupancy_ceiling() {
            return;
        }
        let empty: Vec<usize> = self
            .moles
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(i, _)| i)
            .collect();
        if empty.is_empty() {
            return;
        }
        let idx = empty[self.rng.pick_index(empty.len())];
        let kind = config::select_mole_kind(self.rng.next_f64());
        let (min, max) = self.difficulty.mole_lifetime_ms;
        let lifetime = self.rng.range_f64(min, max);
        let cell = Cell::from_index(idx, self.board.cols);
        let expire_at = now + lifetime;
        let expiry = self.timers.arm(expire_at, TimerAction::Expiry(cell));
        self.moles[idx] = Some(MoleInstance {
            kind,
            whacked: false,
            expire_at,
            expiry: Some(expiry),
            removal_at: 0.0,
            removal: None,
            frozen_remaining: 0.0,
        });
        self.presenter.show_mole(cell, kind);
    }

    /// Player hit on a cell. No-op unless the round is running, unpaused and
    /// the cell holds a not-yet-whacked mole. Scores exactly once, cancels
    /// the expiry timer and schedules removal after the whacked-display
    /// delay.
    pub fn try_whack(&mut self, cell: Cell, now: f64) {
        if self.paused || self.over {
            return;
        }
        let idx = cell.index(self.board.cols);
        if idx >= self.moles.len() {
            return;
        }
        let Some(mole) = self.moles[idx].as_mut() else {
            return;
        };
        if mole.whacked {
            return;
        }
        mole.whacked = true;
        if let Some(id) = mole.expiry.take() {
            self.timers.cancel(id);
        }
        mole.removal_at = now + WHACKED_DISPLAY_MS;
        mole.removal = Some(
            self.timers
                .arm(mole.removal_at, TimerAction::WhackedRemoval(cell)),
        );
        let kind = mole.kind;
        self.score += kind.score_multiplier * self.difficulty.base_score;
        self.presenter.set_score(self.score);
        self.presenter.play_whack_sound();
        self.presenter.show_whacked(cell, kind);
    }

    /// Converging removal path for natural expiry and post-whack removal:
    /// erase the registry entry, cancel outstanding timers (idempotent) and
    /// re-arm idle spawn slots if occupancy dropped below capacity.
    fn remove_mole(&mut self, cell: Cell, now: f64) {
        let idx = cell.index(self.board.cols);
        if idx >= self.moles.len() {
            return;
        }
        let Some(mole) = self.moles[idx].take() else {
            return;
        };
        if let Some(id) = mole.expiry {
            self.timers.cancel(id);
        }
        if let Some(id) = mole.removal {
            self.timers.cancel(id);
        }
        self.presenter.clear_cell(cell);
        if !self.over
            && !self.paused
            && self.occupancy() < self.difficulty.simultaneous_moles
        {
            for i in 0..self.slots.len() {
                if self.slots[i].pending.is_none() {
                    self.arm_slot(i, now);
                }
            }
        }
    }

    /// Freeze the round: stop the clock (keeping the countdown value), drop
    /// all slot timers and capture every mole's remaining display time.
    pub fn pause(&mut self, now: f64) {
        if self.over || self.paused {
            return;
        }
        self.paused = true;
        if let Some(id) = self.clock.take() {
            self.timers.cancel(id);
        }
        for slot in self.slots.iter_mut() {
            if let Some(id) = slot.pending.take() {
                self.timers.cancel(id);
            }
        }
        for mole in self.moles.iter_mut().flatten() {
            if mole.whacked {
                mole.frozen_remaining = match mole.removal.take() {
                    Some(id) => {
                        self.timers.cancel(id);
                        (mole.removal_at - now).max(0.0)
                    }
                    None => 0.0,
                };
            } else {
                mole.frozen_remaining = mole.expire_at - now;
                if let Some(id) = mole.expiry.take() {
                    self.timers.cancel(id);
                }
            }
        }
        self.presenter.show_status("Paused");
    }

    /// Unfreeze: restart the clock on a fresh full second, top spawn slots
    /// back up and restore every mole's captured remaining time. A mole
    /// whose lifetime ran out during the pause is removed immediately.
    pub fn resume(&mut self, now: f64) {
        if self.over || !self.paused {
            return;
        }
        self.paused = false;
        self.presenter.hide_status();
        self.clock = Some(self.timers.arm(now + GAME_TICK_MS, TimerAction::ClockTick));
        for i in 0..self.slots.len() {
            if self.slots[i].pending.is_none() {
                self.arm_slot(i, now);
            }
        }
        let mut expired: Vec<Cell> = Vec::new();
        for (idx, entry) in self.moles.iter_mut().enumerate() {
            let Some(mole) = entry.as_mut() else { continue };
            let cell = Cell::from_index(idx, self.board.cols);
            if mole.whacked {
                mole.removal_at = now + mole.frozen_remaining;
                mole.removal = Some(
                    self.timers
                        .arm(mole.removal_at, TimerAction::WhackedRemoval(cell)),
                );
            } else if mole.frozen_remaining > 0.0 {
                mole.expire_at = now + mole.frozen_remaining;
                mole.expiry = Some(self.timers.arm(mole.expire_at, TimerAction::Expiry(cell)));
            } else {
                expired.push(cell);
            }
        }
        for cell in expired {
            self.remove_mole(cell, now);
        }
    }

    pub fn toggle_pause(&mut self, now: f64) {
        if self.paused {
            self.resume(now);
        } else {
            self.pause(now);
        }
    }

    /// Natural round end (countdown hit zero): tear everything down and
    /// show the final score.
    fn finish_round(&mut self) {
        self.teardown();
        self.presenter.show_final_score(self.score);
    }

    /// Explicit teardown for New Game / Restart: cancel all timers, clear
    /// the board and leave the engine ready for the next `start_round`.
    pub fn end_round_cleanup(&mut self) {
        self.teardown();
        self.presenter.hide_status();
    }

    fn teardown(&mut self) {
        self.over = true;
        self.paused = false;
        self.timers.clear();
        self.clock = None;
        for slot in self.slots.iter_mut() {
            slot.pending = None;
        }
        for idx in 0..self.moles.len() {
            if self.moles[idx].take().is_some() {
                self.presenter
                    .clear_cell(Cell::from_index(idx, self.board.cols));
            }
        }
    }
}
