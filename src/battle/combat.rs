//! Melee combat resolution
//!
//! Attacks reach the four orthogonal neighbors only. Resolving an attack
//! applies damage and spends the attacker's action point; removing the
//! dead from the turn order is left to the caller.

use rand::Rng;

use crate::battle::damage::roll_damage;
use crate::battle::grid::TileCoord;
use crate::battle::roster::Roster;
use crate::battle::turn_state::{Controller, TurnResources};
use crate::battle::units::UnitRecord;
use crate::core::types::{Team, UnitId};

/// Result of a single resolved attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub damage: i32,
    pub remaining_life: i32,
    pub defender_died: bool,
}

/// Orthogonal neighbors of `origin` holding a living enemy of `team`
///
/// `occupant_team` reports the team of the living unit on a tile, if any.
pub fn compute_attackable<F>(origin: TileCoord, team: Team, occupant_team: F) -> Vec<TileCoord>
where
    F: Fn(TileCoord) -> Option<Team>,
{
    origin
        .neighbors()
        .into_iter()
        .filter(|tile| occupant_team(*tile).is_some_and(|other| other != team))
        .collect()
}

/// Attackable tiles for a unit, looked up against the roster
pub fn attackable_from_roster(unit: &UnitRecord, roster: &Roster) -> Vec<TileCoord> {
    let Some(origin) = unit.tile else {
        return Vec::new();
    };
    compute_attackable(origin, unit.team, |tile| {
        roster.occupant_at(tile).map(|occupant| occupant.team)
    })
}

/// Can this unit start an attack right now?
pub fn can_attack(
    unit: &UnitRecord,
    resources: &TurnResources,
    sequence_in_flight: bool,
    controller: Controller,
) -> bool {
    let controlled = match controller {
        Controller::Player => unit.is_player_controlled(),
        Controller::Ai => !unit.is_player_controlled(),
    };
    controlled
        && unit.can_act()
        && resources.can_attack()
        && unit.stats.attack > 0
        && !sequence_in_flight
}

/// Apply one melee attack
///
/// Damage comes from the damage formula; the defender's life floors at
/// zero and the attacker pays one action point.
pub fn resolve_attack<R: Rng + ?Sized>(
    attacker: &UnitRecord,
    defender: &mut UnitRecord,
    resources: &mut TurnResources,
    rng: &mut R,
) -> AttackOutcome {
    let damage = roll_damage(attacker.stats.attack, defender.stats.defense, rng);
    let defender_died = defender.apply_damage(damage);
    resources.spend_attack();

    AttackOutcome {
        attacker: attacker.id,
        defender: defender.id,
        damage,
        remaining_life: defender.stats.life,
        defender_died,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::UnitStats;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit(team: Team, tile: (i32, i32), stats: UnitStats) -> UnitRecord {
        UnitRecord::new(UnitId::new(), "soldier".into(), team, stats)
            .placed_at(TileCoord::new(tile.0, tile.1))
    }

    #[test]
    fn test_attackable_only_adjacent_enemies() {
        let hero = unit(Team::Player, (2, 2), UnitStats::default());
        let roster = Roster::new(vec![
            hero.clone(),
            unit(Team::Enemy, (2, 1), UnitStats::default()),
            unit(Team::Player, (3, 2), UnitStats::default()),
            unit(Team::Enemy, (3, 3), UnitStats::default()),
        ]);

        let targets = attackable_from_roster(&hero, &roster);
        assert_eq!(targets, vec![TileCoord::new(2, 1)]);
    }

    #[test]
    fn test_dead_enemies_are_not_targets() {
        let hero = unit(Team::Player, (0, 0), UnitStats::default());
        let mut corpse = unit(Team::Enemy, (1, 0), UnitStats::default());
        corpse.stats.life = 0;
        let roster = Roster::new(vec![hero.clone(), corpse]);
        assert!(attackable_from_roster(&hero, &roster).is_empty());
    }

    #[test]
    fn test_can_attack_rules() {
        let hero = unit(Team::Player, (0, 0), UnitStats::default());
        let resources = TurnResources::fresh(1);

        assert!(can_attack(&hero, &resources, false, Controller::Player));
        assert!(!can_attack(&hero, &resources, true, Controller::Player));
        assert!(!can_attack(&hero, &resources, false, Controller::Ai));
        assert!(!can_attack(&hero, &TurnResources::fresh(0), false, Controller::Player));

        let pacifist = unit(
            Team::Player,
            (0, 0),
            UnitStats {
                attack: 0,
                ..UnitStats::default()
            },
        );
        assert!(!can_attack(&pacifist, &resources, false, Controller::Player));
    }

    #[test]
    fn test_resolve_attack_spends_ap_and_reports_death() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let attacker = unit(
            Team::Player,
            (0, 0),
            UnitStats {
                attack: 10,
                ..UnitStats::default()
            },
        );
        let mut defender = unit(
            Team::Enemy,
            (1, 0),
            UnitStats {
                life: 5,
                max_life: 5,
                defense: 0,
                ..UnitStats::default()
            },
        );
        let mut resources = TurnResources::fresh(2);

        let outcome = resolve_attack(&attacker, &mut defender, &mut resources, &mut rng);
        assert!(outcome.defender_died);
        assert!(outcome.damage == 9 || outcome.damage == 10);
        assert_eq!(outcome.remaining_life, 0);
        assert_eq!(defender.stats.life, 0);
        assert_eq!(resources.action_points, 1);
    }
}
