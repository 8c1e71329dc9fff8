//! Turn scheduler: the battle's top-level state machine
//!
//! Owns the roster, the active-unit pointer, the active unit's turn
//! resources and the battle outcome. Everything is command driven except
//! `tick`, which the host calls every frame to run in-flight action
//! sequences and the AI think timer.
//!
//! State that affects correctness is committed outside of suspension:
//! a move commits tile, AP and has-moved before its sequence starts; an
//! attack commits damage and AP after its sequence ends.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::battle::ai::{BattleAI, DecisionContext};
use crate::battle::animation::{AnimationPort, AnimationState, NullAnimation};
use crate::battle::combat::{self, attackable_from_roster};
use crate::battle::events::{BattleEvent, BattleEventKind, BattleEventLog};
use crate::battle::grid::{Facing, GridBounds, TileCoord};
use crate::battle::pathfinding::{compute_reachable, ReachableSet};
use crate::battle::roster::Roster;
use crate::battle::turn_state::{
    BattleOutcome, Controller, InteractionLock, TurnResources, TurnState,
};
use crate::battle::units::UnitRecord;
use crate::core::config::BattleConfig;
use crate::core::error::Result;
use crate::core::types::{DefinitionId, Team, UnitId};

/// What an in-flight sequence commits when it completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Move,
    Attack { defender: UnitId },
}

/// A move or attack waiting for its animation window to end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSequence {
    pub unit: UnitId,
    pub kind: SequenceKind,
    pub remaining: f32,
}

/// Progress of the AI through its single move and single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiStep {
    AwaitMove,
    AwaitAttack,
    Done,
}

/// Where restoration should look for the active unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUnitRef {
    pub instance_id: Option<UnitId>,
    pub definition: Option<DefinitionId>,
    pub team: Option<Team>,
}

/// Saved turn state handed to `restore_from_save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredTurn {
    pub turn: u32,
    pub active: ActiveUnitRef,
    pub action_points: i64,
    pub has_moved: bool,
}

pub struct TurnScheduler {
    config: BattleConfig,
    bounds: GridBounds,
    roster: Roster,
    state: TurnState,

    // Caches for the active unit
    reachable: Option<ReachableSet>,
    attackable: Vec<TileCoord>,

    sequence: Option<ActionSequence>,
    ai_timer: Option<f32>,
    ai_step: AiStep,

    lock: InteractionLock,
    end_turn_deferred: bool,

    events: BattleEventLog,
    animation: Box<dyn AnimationPort>,
    ai: Option<Box<dyn BattleAI>>,
    rng: ChaCha8Rng,
}

impl TurnScheduler {
    /// Create a scheduler; an invalid config is rejected immediately
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;
        let bounds = GridBounds::new(config.grid_width, config.grid_height);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            bounds,
            roster: Roster::default(),
            state: TurnState::new(),
            reachable: None,
            attackable: Vec::new(),
            sequence: None,
            ai_timer: None,
            ai_step: AiStep::Done,
            lock: InteractionLock::default(),
            end_turn_deferred: false,
            events: BattleEventLog::new(),
            animation: Box::new(NullAnimation),
            ai: None,
            rng,
        })
    }

    pub fn with_animation(mut self, animation: Box<dyn AnimationPort>) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_ai(mut self, ai: Box<dyn BattleAI>) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn set_ai(&mut self, ai: Option<Box<dyn BattleAI>>) {
        self.ai = ai;
    }

    // ===== QUERIES =====

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.active_index
    }

    pub fn active_unit(&self) -> Option<&UnitRecord> {
        self.state
            .active_index
            .and_then(|index| self.roster.at_index(index))
    }

    pub fn resources(&self) -> TurnResources {
        self.state.resources
    }

    pub fn is_ended(&self) -> bool {
        self.state.ended
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.state.outcome
    }

    /// A move or attack sequence is in flight
    pub fn is_busy(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn sequence(&self) -> Option<&ActionSequence> {
        self.sequence.as_ref()
    }

    pub fn is_interaction_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Legal destinations for the active unit
    pub fn reachable_tiles(&self) -> &[TileCoord] {
        self.reachable
            .as_ref()
            .map(|reach| reach.tiles())
            .unwrap_or(&[])
    }

    /// Enemy-occupied tiles the active unit can strike
    pub fn attackable_tiles(&self) -> &[TileCoord] {
        &self.attackable
    }

    /// Path the active unit would walk to reach `tile`
    pub fn path_to(&self, tile: TileCoord) -> Option<Vec<TileCoord>> {
        self.reachable.as_ref()?.build_path(tile)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.events.drain()
    }

    pub fn can_move_to(&self, tile: TileCoord) -> bool {
        self.move_allowed(tile, Controller::Player)
    }

    pub fn can_attack_tile(&self, tile: TileCoord) -> bool {
        self.attack_target(tile, Controller::Player).is_some()
    }

    // ===== LIFECYCLE =====

    /// Start a battle with an explicit list of participants
    pub fn begin_battle(&mut self, units: Vec<UnitRecord>) {
        self.reset_with(units);
        info!(
            units = self.roster.units().len(),
            turn_order = self.roster.len(),
            "Battle started"
        );
        self.log(BattleEventKind::BattleStarted, "Battle has begun!".into());

        if self.roster.is_empty() {
            self.clear_active();
        } else {
            self.state.turn = 1;
            self.activate(0, None);
        }

        self.evaluate_outcome();
    }

    /// Rebuild the battle from a save
    ///
    /// The active unit is located by instance id first, then by
    /// (definition, team). Saved AP and has-moved are reinstated before
    /// the movement and attack caches are rebuilt.
    pub fn restore_from_save(&mut self, units: Vec<UnitRecord>, saved: &RestoredTurn) {
        self.reset_with(units);
        self.state.turn = saved.turn;

        match self.locate_active(&saved.active) {
            Some(index) => {
                let max_ap = self
                    .roster
                    .at_index(index)
                    .map(|u| u.stats.max_action_points)
                    .unwrap_or(0);
                let resources =
                    TurnResources::restored(saved.action_points, max_ap, saved.has_moved);
                self.state.turn = self.state.turn.max(1);
                self.activate(index, Some(resources));
                info!(turn = self.state.turn, "Battle restored from save");
            }
            None => {
                warn!(
                    instance_id = ?saved.active.instance_id,
                    definition = ?saved.active.definition,
                    "Saved active unit matches no living unit; battle has no active unit"
                );
                self.clear_active();
            }
        }

        self.evaluate_outcome();
    }

    fn reset_with(&mut self, units: Vec<UnitRecord>) {
        self.roster = Roster::new(units);
        self.state = TurnState::new();
        self.reachable = None;
        self.attackable.clear();
        self.sequence = None;
        self.ai_timer = None;
        self.ai_step = AiStep::Done;
        self.end_turn_deferred = false;
    }

    fn locate_active(&self, active: &ActiveUnitRef) -> Option<usize> {
        let valid = |index: &usize| self.roster.at_index(*index).is_some_and(|u| u.can_act());

        if let Some(id) = active.instance_id {
            if let Some(index) = self.roster.index_of(id).filter(valid) {
                return Some(index);
            }
        }

        let (Some(definition), Some(team)) = (&active.definition, active.team) else {
            return None;
        };
        self.roster.order().iter().enumerate().find_map(|(index, id)| {
            let unit = self.roster.get(*id)?;
            (unit.definition == *definition && unit.team == team && unit.can_act())
                .then_some(index)
        })
    }

    // ===== TURN FLOW =====

    /// Player asks to end the active unit's turn
    ///
    /// Ignored for AI units and while a sequence is in flight. While the
    /// interaction lock is held the request is deferred until the lock
    /// opens and any running sequence has finished. A change of active
    /// unit drops it.
    pub fn request_end_turn(&mut self) -> bool {
        if self.state.ended {
            return false;
        }
        let Some(active) = self.active_unit() else {
            return false;
        };
        if !active.is_player_controlled() {
            debug!(unit = %active.id, "End turn ignored: active unit is not player-controlled");
            return false;
        }
        if self.lock.is_locked() {
            debug!("End turn deferred: interaction locked");
            self.end_turn_deferred = true;
            return false;
        }
        if self.sequence.is_some() {
            debug!("End turn rejected: action in flight");
            return false;
        }
        self.advance_to_next_unit()
    }

    pub fn lock_interaction(&mut self) {
        self.lock.acquire();
    }

    /// Release one hold on the interaction lock, replaying a deferred
    /// end-turn request once the lock is fully open
    pub fn unlock_interaction(&mut self) {
        if self.lock.release() {
            self.replay_deferred_end_turn();
        }
    }

    /// Run a deferred end-turn once the lock is open and nothing is in
    /// flight; otherwise keep it pending
    fn replay_deferred_end_turn(&mut self) {
        if !self.end_turn_deferred || self.lock.is_locked() || self.sequence.is_some() {
            return;
        }
        self.end_turn_deferred = false;
        debug!("Replaying deferred end turn");
        self.request_end_turn();
    }

    /// Hand the turn to the next valid unit
    ///
    /// Dead units are compacted out first. Returns false if the battle is
    /// over or a sequence is still in flight.
    pub fn advance_to_next_unit(&mut self) -> bool {
        if self.state.ended {
            return false;
        }
        if self.sequence.is_some() {
            debug!("Advance rejected: action in flight");
            return false;
        }

        let compaction = self.roster.compact(self.state.active_index);
        if !compaction.removed.is_empty() {
            debug!(removed = compaction.removed.len(), "Roster compacted");
            let description = format!("{} fallen unit(s) removed", compaction.removed.len());
            self.log(
                BattleEventKind::RosterCompacted {
                    removed: compaction.removed,
                },
                description,
            );
            if self.evaluate_outcome() != BattleOutcome::Undecided {
                return true;
            }
        }

        if self.roster.is_empty() {
            self.clear_active();
            return true;
        }

        let start = compaction.cursor.unwrap_or(-1);
        let len = self.roster.len() as isize;
        let found = (1..=len)
            .map(|step| (start + step).rem_euclid(len) as usize)
            .find(|index| self.roster.at_index(*index).is_some_and(|u| u.can_act()));

        match found {
            Some(index) => {
                if index as isize <= start {
                    self.state.turn = self.state.turn.saturating_add(1);
                    debug!(turn = self.state.turn, "Turn advanced");
                    self.log(
                        BattleEventKind::TurnAdvanced {
                            turn: self.state.turn,
                        },
                        format!("Turn {}", self.state.turn),
                    );
                }
                if self.state.turn == 0 {
                    self.state.turn = 1;
                }
                self.activate(index, None);
            }
            None => self.clear_active(),
        }
        true
    }

    /// Decide the battle if one side has no living units
    ///
    /// Both sides wiped out at once counts as defeat. Once decided the
    /// state is frozen and further calls return the same outcome.
    pub fn evaluate_outcome(&mut self) -> BattleOutcome {
        if self.state.ended {
            return self.state.outcome;
        }

        let counts = self.roster.alive_counts();
        let outcome = match (counts.player, counts.enemy) {
            (0, 0) => BattleOutcome::Defeat,
            (_, 0) => BattleOutcome::Victory,
            (0, _) => BattleOutcome::Defeat,
            _ => BattleOutcome::Undecided,
        };
        if outcome == BattleOutcome::Undecided {
            return outcome;
        }

        self.state.end(outcome);
        self.reachable = None;
        self.attackable.clear();
        self.ai_timer = None;
        self.ai_step = AiStep::Done;
        self.end_turn_deferred = false;

        info!(?outcome, "Battle ended");
        self.log(
            BattleEventKind::BattleEnded { outcome },
            format!("Battle ended: {:?}", outcome),
        );
        outcome
    }

    fn activate(&mut self, index: usize, restored: Option<TurnResources>) {
        let Some(unit) = self.roster.at_index(index) else {
            self.clear_active();
            return;
        };
        let id = unit.id;
        let team = unit.team;
        let max_ap = unit.stats.max_action_points;

        self.state.active_index = Some(index);
        self.end_turn_deferred = false;
        self.state.resources = restored.unwrap_or_else(|| TurnResources::fresh(max_ap));
        self.rebuild_caches();

        if team.is_player() {
            self.ai_timer = None;
            self.ai_step = AiStep::Done;
        } else {
            self.ai_timer = Some(self.config.ai_think_delay);
            self.ai_step = AiStep::AwaitMove;
        }

        debug!(unit = %id, ?team, turn = self.state.turn, "Active unit changed");
        self.log(
            BattleEventKind::ActiveUnitChanged { unit: id, team },
            format!("{:?} unit {} is up", team, id),
        );
    }

    fn clear_active(&mut self) {
        self.state.active_index = None;
        self.end_turn_deferred = false;
        self.state.resources = TurnResources::default();
        self.reachable = None;
        self.attackable.clear();
        self.ai_timer = None;
        self.ai_step = AiStep::Done;
        self.log(BattleEventKind::NoActiveUnit, "No unit can act".into());
    }

    /// Recompute movement and attack eligibility for the active unit
    fn rebuild_caches(&mut self) {
        self.reachable = None;
        self.attackable.clear();
        if self.state.ended {
            return;
        }
        let Some(active) = self.active_unit() else {
            return;
        };
        let Some(origin) = active.tile else {
            return;
        };
        let speed = active.stats.speed;
        let can_strike = active.stats.attack > 0 && self.state.resources.can_attack();
        let attackable = if can_strike {
            attackable_from_roster(active, &self.roster)
        } else {
            Vec::new()
        };

        if self.state.resources.can_move() {
            let roster = &self.roster;
            self.reachable = Some(compute_reachable(origin, speed, self.bounds, |tile| {
                roster.is_occupied(tile)
            }));
        }
        self.attackable = attackable;
    }

    // ===== COMMANDS =====

    /// Player move command for the active unit
    pub fn request_move(&mut self, tile: TileCoord) -> bool {
        self.execute_move(tile, Controller::Player)
    }

    /// Player attack command for the active unit
    pub fn request_attack(&mut self, tile: TileCoord) -> bool {
        self.execute_attack(tile, Controller::Player)
    }

    fn controls(unit: &UnitRecord, controller: Controller) -> bool {
        match controller {
            Controller::Player => unit.is_player_controlled(),
            Controller::Ai => !unit.is_player_controlled(),
        }
    }

    fn move_allowed(&self, tile: TileCoord, controller: Controller) -> bool {
        if self.state.ended || self.sequence.is_some() {
            return false;
        }
        let Some(active) = self.active_unit() else {
            return false;
        };
        Self::controls(active, controller)
            && active.can_act()
            && self.state.resources.can_move()
            && self
                .reachable
                .as_ref()
                .is_some_and(|reach| reach.contains(tile))
    }

    fn execute_move(&mut self, tile: TileCoord, controller: Controller) -> bool {
        if !self.move_allowed(tile, controller) {
            debug!(?tile, ?controller, "Move rejected");
            return false;
        }
        let Some(path) = self.path_to(tile) else {
            return false;
        };
        let Some(index) = self.state.active_index else {
            return false;
        };
        let Some(id) = self.roster.order().get(index).copied() else {
            return false;
        };
        let Some(unit) = self.roster.get_mut(id) else {
            return false;
        };

        let from = unit.tile.unwrap_or(tile);
        unit.tile = Some(tile);
        if let [.., before, last] = path.as_slice() {
            if let Some(facing) = Facing::toward(*before, *last) {
                unit.facing = facing;
            }
        }
        self.state.resources.spend_move();

        debug!(unit = %id, ?from, to = ?tile, steps = path.len().saturating_sub(1), "Unit moved");
        self.animation.play_state(id, AnimationState::Move);
        self.log(
            BattleEventKind::UnitMoved {
                unit: id,
                from,
                to: tile,
                path,
            },
            format!("Unit {} moved to ({}, {})", id, tile.x, tile.y),
        );

        self.rebuild_caches();
        self.start_sequence(id, SequenceKind::Move, self.config.move_duration);
        true
    }

    /// Defender on `tile` if the active unit may attack it now
    fn attack_target(&self, tile: TileCoord, controller: Controller) -> Option<UnitId> {
        if self.state.ended {
            return None;
        }
        let active = self.active_unit()?;
        if !combat::can_attack(
            active,
            &self.state.resources,
            self.sequence.is_some(),
            controller,
        ) {
            return None;
        }
        if !self.attackable.contains(&tile) {
            return None;
        }
        let defender = self.roster.occupant_at(tile)?;
        (defender.team != active.team).then_some(defender.id)
    }

    fn execute_attack(&mut self, tile: TileCoord, controller: Controller) -> bool {
        let Some(defender) = self.attack_target(tile, controller) else {
            debug!(?tile, ?controller, "Attack rejected");
            return false;
        };
        let Some(active) = self.active_unit() else {
            return false;
        };
        let attacker = active.id;

        if let Some(unit) = self.roster.get_mut(attacker) {
            if let Some(facing) = unit.tile.and_then(|from| Facing::toward(from, tile)) {
                unit.facing = facing;
            }
        }
        self.animation.play_state(attacker, AnimationState::Attack);
        self.start_sequence(
            attacker,
            SequenceKind::Attack { defender },
            self.config.attack_duration,
        );
        true
    }

    fn start_sequence(&mut self, unit: UnitId, kind: SequenceKind, duration: f32) {
        let sequence = ActionSequence {
            unit,
            kind,
            remaining: duration,
        };
        if duration <= 0.0 {
            self.finish_sequence(sequence);
        } else {
            self.sequence = Some(sequence);
        }
    }

    fn finish_sequence(&mut self, sequence: ActionSequence) {
        match sequence.kind {
            SequenceKind::Move => {
                self.animation.play_state(sequence.unit, AnimationState::Idle);
            }
            SequenceKind::Attack { defender } => self.land_attack(sequence.unit, defender),
        }
    }

    /// Commit an attack whose wind-up has finished
    fn land_attack(&mut self, attacker_id: UnitId, defender_id: UnitId) {
        if self.state.ended {
            return;
        }
        let attacker = match self.active_unit() {
            Some(unit) if unit.id == attacker_id && unit.is_alive() => unit.clone(),
            _ => {
                warn!(attacker = %attacker_id, "Attack dropped: attacker is no longer active");
                return;
            }
        };
        let Some(defender) = self
            .roster
            .get_mut(defender_id)
            .filter(|unit| unit.is_alive())
        else {
            warn!(defender = %defender_id, "Attack dropped: target is gone");
            return;
        };

        let outcome = combat::resolve_attack(
            &attacker,
            defender,
            &mut self.state.resources,
            &mut self.rng,
        );
        self.animation.play_state(attacker_id, AnimationState::Idle);

        debug!(
            attacker = %attacker_id,
            defender = %defender_id,
            damage = outcome.damage,
            remaining = outcome.remaining_life,
            "Attack resolved"
        );
        self.log(
            BattleEventKind::UnitAttacked {
                attacker: attacker_id,
                defender: defender_id,
                damage: outcome.damage,
                remaining_life: outcome.remaining_life,
            },
            format!(
                "Unit {} hit {} for {} damage",
                attacker_id, defender_id, outcome.damage
            ),
        );

        if outcome.defender_died {
            self.animation.play_state(defender_id, AnimationState::Death);
            debug!(unit = %defender_id, "Unit died");
            self.log(
                BattleEventKind::UnitDied { unit: defender_id },
                format!("Unit {} has fallen", defender_id),
            );
            self.evaluate_outcome();
        } else {
            self.animation.play_state(defender_id, AnimationState::Hurt);
        }

        self.rebuild_caches();
    }

    // ===== FRAME DRIVER =====

    /// Advance timers by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.state.ended {
            return;
        }

        if let Some(sequence) = self.sequence.as_mut() {
            sequence.remaining -= dt;
            if sequence.remaining <= 0.0 {
                if let Some(done) = self.sequence.take() {
                    self.finish_sequence(done);
                }
            }
        }
        if self.state.ended {
            return;
        }
        self.replay_deferred_end_turn();

        if self.sequence.is_none() && self.ai_step != AiStep::Done {
            self.drive_ai();
        }

        if let Some(remaining) = self.ai_timer.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 && self.sequence.is_none() {
                self.ai_timer = None;
                self.ai_step = AiStep::Done;
                self.advance_to_next_unit();
            }
        }
    }

    /// Read-only view of the active unit's options, as the AI sees them
    pub fn decision_context(&self) -> Option<DecisionContext<'_>> {
        let active = self.active_unit()?;
        Some(DecisionContext {
            roster: &self.roster,
            active,
            resources: self.state.resources,
            reachable: self.reachable.as_ref(),
            attackable: &self.attackable,
        })
    }

    /// Let the AI issue its move, then its attack
    fn drive_ai(&mut self) {
        let Some(mut ai) = self.ai.take() else {
            self.ai_step = AiStep::Done;
            return;
        };

        while self.sequence.is_none() && !self.state.ended && self.ai_step != AiStep::Done {
            let Some(context) = self.decision_context() else {
                self.ai_step = AiStep::Done;
                break;
            };
            match self.ai_step {
                AiStep::AwaitMove => {
                    let choice = ai.choose_move(&context);
                    self.ai_step = AiStep::AwaitAttack;
                    if let Some(tile) = choice {
                        self.execute_move(tile, Controller::Ai);
                    }
                }
                AiStep::AwaitAttack => {
                    let choice = ai.choose_attack(&context);
                    self.ai_step = AiStep::Done;
                    if let Some(tile) = choice {
                        self.execute_attack(tile, Controller::Ai);
                    }
                }
                AiStep::Done => {}
            }
        }

        self.ai = Some(ai);
    }

    fn log(&mut self, kind: BattleEventKind, description: String) {
        self.events.push(kind, description, self.state.turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::UnitStats;

    fn config() -> BattleConfig {
        BattleConfig {
            grid_width: 6,
            grid_height: 6,
            ai_think_delay: 1.0,
            move_duration: 0.5,
            attack_duration: 0.5,
            seed: 3,
        }
    }

    fn unit(id: u128, team: Team, initiative: i32, tile: (i32, i32)) -> UnitRecord {
        let stats = UnitStats {
            life: 10,
            max_life: 10,
            attack: 4,
            defense: 0,
            speed: 2,
            initiative,
            max_action_points: 2,
        };
        UnitRecord::new(UnitId::from_u128(id), "soldier".into(), team, stats)
            .placed_at(TileCoord::new(tile.0, tile.1))
    }

    fn scheduler(units: Vec<UnitRecord>) -> TurnScheduler {
        let mut scheduler = TurnScheduler::new(config()).unwrap();
        scheduler.begin_battle(units);
        scheduler
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let bad = BattleConfig {
            grid_width: 0,
            ..config()
        };
        assert!(TurnScheduler::new(bad).is_err());
    }

    #[test]
    fn test_begin_battle_picks_highest_initiative() {
        let s = scheduler(vec![
            unit(1, Team::Player, 5, (0, 0)),
            unit(2, Team::Player, 9, (1, 0)),
            unit(3, Team::Enemy, 7, (5, 5)),
        ]);
        assert_eq!(s.turn(), 1);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        assert_eq!(s.resources().action_points, 2);
        assert!(!s.reachable_tiles().is_empty());
    }

    #[test]
    fn test_begin_battle_with_one_side_empty_ends_immediately() {
        let s = scheduler(vec![unit(1, Team::Player, 5, (0, 0))]);
        assert!(s.is_ended());
        assert_eq!(s.outcome(), BattleOutcome::Victory);
        assert_eq!(s.turn(), 0);
        assert!(s.active_unit().is_none());
    }

    #[test]
    fn test_begin_battle_with_nobody_is_defeat() {
        let s = scheduler(Vec::new());
        assert!(s.is_ended());
        assert_eq!(s.outcome(), BattleOutcome::Defeat);
    }

    #[test]
    fn test_move_consumes_one_ap_regardless_of_distance() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Enemy, 1, (5, 5)),
        ]);
        let destination = TileCoord::new(2, 0);
        assert!(s.can_move_to(destination));
        assert!(s.request_move(destination));

        assert_eq!(s.active_unit().unwrap().tile, Some(destination));
        assert_eq!(s.resources().action_points, 1);
        assert!(s.resources().has_moved);
        assert!(s.is_busy());

        // Second move is rejected while busy and after moving
        assert!(!s.request_move(TileCoord::new(2, 1)));
        s.tick(1.0);
        assert!(!s.is_busy());
        assert!(!s.request_move(TileCoord::new(2, 1)));
    }

    #[test]
    fn test_move_rejects_unreachable_and_occupied() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Player, 5, (1, 0)),
            unit(3, Team::Enemy, 1, (5, 5)),
        ]);
        assert!(!s.request_move(TileCoord::new(1, 0)));
        assert!(!s.request_move(TileCoord::new(4, 4)));
        assert!(!s.request_move(TileCoord::new(0, 0)));
        assert_eq!(s.resources().action_points, 2);
    }

    #[test]
    fn test_attack_lands_after_sequence() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Enemy, 1, (1, 0)),
        ]);
        let target = TileCoord::new(1, 0);
        assert_eq!(s.attackable_tiles(), &[target]);
        assert!(s.request_attack(target));

        // Nothing committed until the wind-up ends
        assert_eq!(s.roster().get(UnitId::from_u128(2)).unwrap().stats.life, 10);
        assert_eq!(s.resources().action_points, 2);
        assert!(!s.request_attack(target));

        s.tick(0.6);
        // attack 4 vs no defense: floor(4 * [0.95, 1.05]) is 3 or 4
        let life = s.roster().get(UnitId::from_u128(2)).unwrap().stats.life;
        assert!(life == 6 || life == 7);
        assert_eq!(s.resources().action_points, 1);
    }

    #[test]
    fn test_player_cannot_command_enemy_turn() {
        let mut s = scheduler(vec![
            unit(1, Team::Enemy, 9, (0, 0)),
            unit(2, Team::Player, 1, (1, 0)),
        ]);
        assert!(!s.request_end_turn());
        assert!(!s.request_attack(TileCoord::new(1, 0)));
        assert!(!s.request_move(TileCoord::new(0, 1)));
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(1));
    }

    #[test]
    fn test_ai_turn_auto_advances_after_delay() {
        let mut s = scheduler(vec![
            unit(1, Team::Enemy, 9, (0, 0)),
            unit(2, Team::Player, 1, (5, 5)),
        ]);
        s.tick(0.5);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(1));
        s.tick(0.6);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        assert_eq!(s.turn(), 1);
    }

    #[test]
    fn test_end_turn_cycles_and_counts_turns() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Player, 8, (0, 2)),
            unit(3, Team::Enemy, 1, (5, 5)),
        ]);
        assert!(s.request_end_turn());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        assert!(s.request_end_turn());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(3));
        assert_eq!(s.turn(), 1);

        s.tick(1.5);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(1));
        assert_eq!(s.turn(), 2);
    }

    #[test]
    fn test_interaction_lock_defers_end_turn() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Player, 8, (0, 2)),
            unit(3, Team::Enemy, 1, (5, 5)),
        ]);
        s.lock_interaction();
        s.lock_interaction();
        assert!(!s.request_end_turn());
        s.unlock_interaction();
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(1));
        s.unlock_interaction();
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
    }

    #[test]
    fn test_deferred_end_turn_waits_for_sequence() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Player, 8, (0, 2)),
            unit(3, Team::Enemy, 1, (5, 5)),
        ]);
        s.lock_interaction();
        assert!(!s.request_end_turn());
        assert!(s.request_move(TileCoord::new(1, 0)));
        assert!(s.is_busy());

        // Still moving, so the request stays pending
        s.unlock_interaction();
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(1));

        s.tick(1.0);
        assert!(!s.is_busy());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        assert_eq!(s.turn(), 1);
    }

    #[test]
    fn test_deferred_end_turn_dropped_when_active_changes() {
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 0)),
            unit(2, Team::Player, 8, (0, 2)),
            unit(3, Team::Enemy, 1, (5, 5)),
        ]);
        s.lock_interaction();
        assert!(!s.request_end_turn());
        assert!(s.advance_to_next_unit());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));

        s.unlock_interaction();
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        s.tick(0.1);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
    }

    #[test]
    fn test_kill_before_cursor_keeps_order_and_turn() {
        let mut weak = unit(2, Team::Enemy, 8, (3, 3));
        weak.stats.life = 1;
        let mut s = scheduler(vec![
            unit(1, Team::Player, 9, (0, 5)),
            weak,
            unit(3, Team::Player, 7, (2, 3)),
            unit(4, Team::Enemy, 6, (5, 0)),
        ]);
        assert!(s.request_end_turn());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(2));
        s.tick(1.5);
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(3));

        assert!(s.request_attack(TileCoord::new(3, 3)));
        s.tick(0.6);
        assert!(!s.roster().get(UnitId::from_u128(2)).unwrap().is_alive());
        assert!(!s.is_ended());

        assert!(s.request_end_turn());
        assert_eq!(s.active_unit().unwrap().id, UnitId::from_u128(4));
        assert_eq!(s.turn(), 1);
        assert_eq!(s.roster().len(), 3);
    }

    #[test]
    fn test_killing_last_enemy_ends_battle() {
        let mut weak = unit(2, Team::Enemy, 1, (1, 0));
        weak.stats.life = 1;
        let mut s = scheduler(vec![unit(1, Team::Player, 9, (0, 0)), weak]);
        s.drain_events();

        assert!(s.request_attack(TileCoord::new(1, 0)));
        s.tick(1.0);

        assert!(s.is_ended());
        assert_eq!(s.outcome(), BattleOutcome::Victory);
        assert_eq!(s.turn(), 0);
        let kinds: Vec<BattleEventKind> = s.drain_events().into_iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&BattleEventKind::UnitDied {
            unit: UnitId::from_u128(2)
        }));
        assert!(kinds.contains(&BattleEventKind::BattleEnded {
            outcome: BattleOutcome::Victory
        }));

        // Frozen
        assert!(!s.request_end_turn());
        assert!(!s.advance_to_next_unit());
        assert_eq!(s.evaluate_outcome(), BattleOutcome::Victory);
    }
}
