//! Balance table loader.

use std::path::Path;

use battle_core::BattleRules;
use battle_core::env::RngRules;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleRules`] from TOML files.
pub struct RulesLoader;

impl RulesLoader {
    pub fn load(path: &Path) -> LoadResult<BattleRules> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleRules> {
        let rules: BattleRules = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))?;

        check_chances("luck", &rules.luck)?;
        check_chances("morale", &rules.morale)?;
        if rules.limits.stacks == 0 || rules.limits.stacks > battle_core::BattleConfig::MAX_STACKS {
            anyhow::bail!(
                "limits.stacks must be within 1..={}, got {}",
                battle_core::BattleConfig::MAX_STACKS,
                rules.limits.stacks
            );
        }
        Ok(rules)
    }
}

// Chances are fractions in [0, 1].
fn check_chances(table: &str, rules: &RngRules) -> LoadResult<()> {
    let zero = battle_core::BonusRatio::ZERO;
    let one = battle_core::BonusRatio::ONE;
    for chance in rules.positive.iter().chain(&rules.negative) {
        if *chance < zero || *chance > one {
            anyhow::bail!("{} chance {} is outside [0, 1]", table, chance);
        }
    }
    if rules.min_effective > 0 || rules.max_effective < 0 {
        anyhow::bail!("{} effective range must contain 0", table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default_rules() {
        assert_eq!(RulesLoader::parse("").unwrap(), BattleRules::default());
    }

    #[test]
    fn rejects_chance_above_one() {
        let toml = "[luck]\npositive = [[25, 24]]\nnegative = []\nmax_effective = 3\nmin_effective = -3\n";
        let err = RulesLoader::parse(toml).unwrap_err();
        assert!(err.to_string().contains("luck"));
    }
}
