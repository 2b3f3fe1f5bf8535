//! Spell areas, spell damage and target eligibility.

use crate::env::{Spell, SpellCastParams, SpellRange};
use crate::field::{BattleField, BattlePosition, PositionSet};
use crate::formula::{FilterBindings, FormulaError, SpellDamageBindings, check, evaluate};
use crate::state::BattleStack;
use crate::stats::BonusRatio;

/// Cells covered by an area spell centred on `pos`.
///
/// Static obstacles are never part of the area. Chain ranges are resolved
/// against stacks by the planner, so they cover only the aimed cell here.
pub fn spell_area(field: &BattleField, obstacles: &PositionSet, pos: BattlePosition, range: SpellRange) -> PositionSet {
    let mut area = match range {
        SpellRange::All => field.all_positions(),
        _ if range.radius() > 0 => field.flood_fill(pos, range.radius()),
        _ => PositionSet::from([pos]),
    };
    area.retain(|cell| !obstacles.contains(cell));
    if range == SpellRange::R1NoCenter {
        area.remove(&pos);
    }
    area
}

/// Damage of an offensive spell on one target before losses.
///
/// The formula result is floored at 1, raised by the caster's `increase`,
/// scaled by the target's `reduce`, and floored at 1 again.
pub fn spell_damage(
    spell: &Spell,
    params: &SpellCastParams,
    target_level: i32,
    target_index: usize,
    increase: BonusRatio,
    reduce: BonusRatio,
) -> Result<i64, FormulaError> {
    let Some(formula) = &spell.damage else {
        return Ok(0);
    };
    let bindings = SpellDamageBindings {
        spell_power: i64::from(params.spell_power),
        skill_level: i64::from(params.skill_level),
        hero_spec_level: params.hero_spec_level.map(i64::from),
        unit_level: i64::from(target_level / 10),
        target_index: i64::try_from(target_index).unwrap_or(i64::MAX),
    };
    let base = BonusRatio::from_int(evaluate(formula, &bindings)?.max(1));
    let damage = (base + base * increase) * reduce;
    Ok(damage.round_down().max(1))
}

/// Whether `spell` may affect `stack` at all: not immune and the spell's
/// target predicate holds.
pub fn is_spell_target(spell: &Spell, stack: &BattleStack) -> Result<bool, FormulaError> {
    if stack.current.immunes.contains(spell) {
        return Ok(false);
    }
    let abilities = &stack.unit.abilities;
    let bindings = FilterBindings {
        unit_type: abilities.unit_type,
        non_living: abilities.non_living,
        unit_level: i64::from(stack.unit.level / 10),
        count: i64::from(stack.count),
    };
    check(&spell.filter, &bindings)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{MagicSchool, NonLivingType, SpellFilter, SpellQualify, SpellType, UnitAbilities, UnitPrimaryParams, UnitTemplate, UnitType};
    use crate::formula::{Formula, Predicate, Var};
    use crate::state::{Side, StackId};

    fn p(x: i32, y: i32) -> BattlePosition {
        BattlePosition::new(x, y)
    }

    fn bolt() -> Spell {
        let mut spell = Spell::new("lightning_bolt", MagicSchool::Air, SpellType::Offensive, SpellQualify::Bad);
        spell.damage = Some(Formula::Sum(vec![
            Formula::Constant(10),
            Formula::Product(vec![Formula::var(Var::SpellPower), Formula::Constant(25)]),
        ]));
        spell
    }

    #[test]
    fn area_excludes_obstacles_and_optional_centre() {
        let field = BattleField::default();
        let obstacles: PositionSet = [p(8, 5)].into_iter().collect();
        assert_eq!(spell_area(&field, &obstacles, p(7, 5), SpellRange::R1).len(), 6);
        assert_eq!(spell_area(&field, &obstacles, p(7, 5), SpellRange::R1NoCenter).len(), 5);
        assert_eq!(spell_area(&field, &obstacles, p(7, 5), SpellRange::Single).len(), 1);
        assert_eq!(spell_area(&field, &obstacles, p(7, 5), SpellRange::All).len(), 164);
    }

    #[test]
    fn damage_applies_increase_and_reduce() {
        let spell = bolt();
        let mut params = SpellCastParams::new(spell.id.clone());
        params.spell_power = 2;
        assert_eq!(spell_damage(&spell, &params, 10, 0, BonusRatio::ZERO, BonusRatio::ONE).unwrap(), 60);
        assert_eq!(
            spell_damage(&spell, &params, 10, 0, BonusRatio::new(1, 2), BonusRatio::new(1, 2)).unwrap(),
            45
        );
        assert_eq!(spell_damage(&spell, &params, 10, 0, BonusRatio::ZERO, BonusRatio::ZERO).unwrap(), 1);
    }

    #[test]
    fn immunity_and_predicate_gate_targets() {
        let unit = UnitTemplate::new(
            "skeleton",
            10,
            UnitPrimaryParams {
                max_health: 6,
                ..UnitPrimaryParams::default()
            },
        )
        .with_abilities(UnitAbilities {
            unit_type: UnitType::NonLiving,
            non_living: NonLivingType::Undead,
            ..UnitAbilities::default()
        });
        let mut stack = BattleStack::new(StackId(0), Side::Defender, 0, Arc::new(unit), 5);

        let mut spell = bolt();
        assert!(is_spell_target(&spell, &stack).unwrap());

        spell.filter = Predicate::UnitType(UnitType::Living);
        assert!(!is_spell_target(&spell, &stack).unwrap());

        spell.filter = Predicate::Always;
        stack.current.immunes = SpellFilter {
            schools: vec![MagicSchool::Air],
            ..SpellFilter::default()
        };
        assert!(!is_spell_target(&spell, &stack).unwrap());
    }
}
