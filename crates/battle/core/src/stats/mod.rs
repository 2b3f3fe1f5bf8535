//! Stat system.
//!
//! ```text
//! [ Unit template + adventure bonus ]
//!      ↓  calculate_stack_on_start
//! [ estimated_on_start snapshot ]
//!      ↓  calculate_stack_stats (effects, guard, locks)
//! [ current snapshot ]
//!      ↓  recalc_stack (adjacency)
//! [ combat math ]
//! ```
//!
//! ## Bonus Stack
//!
//! Spell modifiers on one stat combine in a fixed order:
//! `Flat → %Inc → More → Less`

pub mod bonus;
pub mod pipeline;
pub mod ratio;
pub mod snapshot;

pub use bonus::{Bonus, BonusKind, BonusStack};
pub use pipeline::{
    HeroStartContext, StartContext, calculate_hero_on_start, calculate_stack_on_start,
    calculate_stack_stats, recalc_stack, sum_opponent_bonus, sum_squad_bonus,
};
pub use ratio::BonusRatio;
pub use snapshot::{HeroStats, StackStats};
