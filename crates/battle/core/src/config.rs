//! Engine tunables: field size, chain and stack caps, tie and action limits.

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Hex distance beyond which ranged attacks take the distance penalty.
    pub ranged_limit: i32,
    /// Maximum number of dice rolled for a physical base roll; larger stacks
    /// scale the sum linearly.
    pub dice_cap: i64,
    /// Consecutive rounds with an empty queue before the battle is declared a tie.
    pub max_empty_rounds: u32,
    /// Upper bound on actions a driven session may submit.
    pub max_actions: u32,
}

impl BattleConfig {
    // ===== compile-time constants =====
    /// Stack slots per army.
    pub const MAX_STACKS: usize = 7;
    /// Longest chain a chain spell can make.
    pub const MAX_CHAIN: usize = 5;
    /// Highest spell skill level (expert).
    pub const MAX_SKILL_LEVEL: u8 = 3;
    pub const DEFAULT_FIELD_WIDTH: i32 = 15;
    pub const DEFAULT_FIELD_HEIGHT: i32 = 11;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RANGED_LIMIT: i32 = 10;
    pub const DEFAULT_DICE_CAP: i64 = 10;
    pub const DEFAULT_MAX_EMPTY_ROUNDS: u32 = 16;
    pub const DEFAULT_MAX_ACTIONS: u32 = 2000;

    pub fn new() -> Self {
        Self {
            ranged_limit: Self::DEFAULT_RANGED_LIMIT,
            dice_cap: Self::DEFAULT_DICE_CAP,
            max_empty_rounds: Self::DEFAULT_MAX_EMPTY_ROUNDS,
            max_actions: Self::DEFAULT_MAX_ACTIONS,
        }
    }

    pub fn with_max_actions(max_actions: u32) -> Self {
        Self {
            max_actions,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
