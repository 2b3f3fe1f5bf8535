//! Capabilities of the active stack at the start of its turn.

use crate::state::{BattleHero, BattleStack};

/// Attack variants available besides the default one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackAlternatives {
    /// A shooter that could also strike in melee.
    pub force_melee: bool,
    /// A ranged splash that may be aimed at any cell.
    pub free_attack: bool,
}

/// Which commands make sense for the active stack right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AvailableActions {
    pub hero_cast: bool,
    pub move_: bool,
    pub melee: bool,
    pub ranged: bool,
    pub splash: bool,
    pub cast: bool,
    pub wait: bool,
    pub guard: bool,
    /// Any of move, melee, ranged or innate cast.
    pub base_unit_actions: bool,
    pub alternatives: AttackAlternatives,
}

impl AvailableActions {
    /// Derives the flags from the stack snapshot and its side's hero.
    pub fn for_stack(stack: &BattleStack, hero: Option<&BattleHero>) -> Self {
        let cur = stack.current();
        let blocked = cur.range_attack_blocked;

        let move_ = cur.can_move;
        let melee = cur.can_attack_melee;
        let ranged = cur.can_attack_ranged && !blocked;
        let splash = cur.can_attack_free_splash && !blocked;
        let cast = cur.can_cast;

        Self {
            hero_cast: hero.is_some_and(BattleHero::can_cast),
            move_,
            melee,
            ranged,
            splash,
            cast,
            wait: !stack.round_state().waited,
            guard: true,
            base_unit_actions: move_ || melee || ranged || cast,
            alternatives: AttackAlternatives {
                force_melee: ranged && melee,
                free_attack: splash,
            },
        }
    }
}
