//! Fixed, enumerated game configuration: difficulty profiles, board sizes and
//! mole kinds. Profiles are immutable statics selected by key; they are not
//! runtime-extensible.

/// One difficulty setting. All durations are milliseconds except the round
/// duration, which counts whole seconds of the game clock.
#[derive(Debug)]
pub struct DifficultyProfile {
    pub key: &'static str,
    /// Inclusive (min, max) range a spawned mole stays up before expiring.
    pub mole_lifetime_ms: (f64, f64),
    /// Inclusive (min, max) range a spawn slot waits before firing again.
    pub spawn_interval_ms: (f64, f64),
    /// Number of concurrent spawn slots; moles on screen may briefly exceed
    /// this (bounded by `occupancy_ceiling`).
    pub simultaneous_moles: usize,
    pub round_duration_secs: u32,
    pub base_score: i32,
}

impl DifficultyProfile {
    /// Safety fence against over-spawn: a spawn attempt is skipped once this
    /// many moles are already on the board.
    pub fn occupancy_ceiling(&self) -> usize {
        self.simultaneous_moles * 2
    }
}

pub static DIFFICULTIES: [DifficultyProfile; 3] = [
    DifficultyProfile {
        key: "easy",
        mole_lifetime_ms: (1000.0, 1800.0),
        spawn_interval_ms: (800.0, 1600.0),
        simultaneous_moles: 1,
        round_duration_secs: 60,
        base_score: 10,
    },
    DifficultyProfile {
        key: "medium",
        mole_lifetime_ms: (600.0, 1200.0),
        spawn_interval_ms: (500.0, 1000.0),
        simultaneous_moles: 1,
        round_duration_secs: 45,
        base_score: 10,
    },
    DifficultyProfile {
        key: "hard",
        mole_lifetime_ms: (350.0, 700.0),
        spawn_interval_ms: (250.0, 600.0),
        simultaneous_moles: 2,
        round_duration_secs: 30,
        base_score: 15,
    },
];

pub const DEFAULT_DIFFICULTY: &str = "medium";

pub fn difficulty(key: &str) -> Option<&'static DifficultyProfile> {
    DIFFICULTIES.iter().find(|d| d.key == key)
}

/// Board dimensions. `class_name` is the CSS hook the DOM harness applies to
/// the board container.
#[derive(Debug)]
pub struct BoardProfile {
    pub key: &'static str,
    pub rows: u8,
    pub cols: u8,
    pub class_name: &'static str,
}

impl BoardProfile {
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

pub static BOARD_SIZES: [BoardProfile; 3] = [
    BoardProfile { key: "3x3", rows: 3, cols: 3, class_name: "size-3x3" },
    BoardProfile { key: "4x4", rows: 4, cols: 4, class_name: "size-4x4" },
    BoardProfile { key: "5x5", rows: 5, cols: 5, class_name: "size-5x5" },
];

pub const DEFAULT_BOARD_SIZE: &str = "3x3";

pub fn board_size(key: &str) -> Option<&'static BoardProfile> {
    BOARD_SIZES.iter().find(|b| b.key == key)
}

/// Category of a spawned mole: score multiplier (may be negative) plus the
/// weight used for random selection. Probabilities across `MOLE_KINDS` sum
/// to 1.
#[derive(Debug)]
pub struct MoleKind {
    pub name: &'static str,
    pub score_multiplier: i32,
    pub probability: f64,
    /// Glyph the DOM harness renders inside the cell.
    pub glyph: &'static str,
}

pub static MOLE_KINDS: [MoleKind; 3] = [
    MoleKind { name: "regular", score_multiplier: 1, probability: 0.70, glyph: "🐹" },
    MoleKind { name: "bonus", score_multiplier: 3, probability: 0.20, glyph: "🐹" },
    MoleKind { name: "penalty", score_multiplier: -2, probability: 0.10, glyph: "🐹" },
];

/// Weighted kind selection: walk the enumerated kinds accumulating
/// probability and return the first whose cumulative weight reaches `r`
/// (uniform in [0,1)). Falls back to the first kind if floating-point
/// rounding exhausts the list without a match.
pub fn select_mole_kind(r: f64) -> &'static MoleKind {
    let mut cumulative = 0.0;
    for kind in MOLE_KINDS.iter() {
        cumulative += kind.probability;
        if r <= cumulative {
            return kind;
        }
    }
    &MOLE_KINDS[0]
}

/// Game clock period.
pub const GAME_TICK_MS: f64 = 1000.0;

/// How long a whacked mole stays visible (inert) before removal.
pub const WHACKED_DISPLAY_MS: f64 = 300.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_key() {
        assert_eq!(difficulty("easy").unwrap().round_duration_secs, 60);
        assert_eq!(board_size("5x5").unwrap().cell_count(), 25);
        assert!(difficulty("nightmare").is_none());
        assert!(board_size("2x2").is_none());
    }

    #[test]
    fn selection_covers_whole_unit_interval() {
        assert_eq!(select_mole_kind(0.0).name, "regular");
        assert_eq!(select_mole_kind(0.69).name, "regular");
        assert_eq!(select_mole_kind(0.75).name, "bonus");
        assert_eq!(select_mole_kind(0.95).name, "penalty");
        // Rounding past the cumulative sum must hit the defined fallback.
        assert_eq!(select_mole_kind(1.5).name, "regular");
    }
}
