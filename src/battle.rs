//! Turn-based battle resolution between two fighters.
//!
//! The resolver is headless: it never sleeps and never touches the terminal.
//! Callers that want pacing drive it one [`Battle::step`] at a time.

use std::collections::VecDeque;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stat used when the provider has no value (or a zero value) for a stat.
pub const DEFAULT_STAT: u16 = 50;
pub const MAX_HEALTH: u16 = 100;
pub const MIN_DAMAGE: u32 = 5;
pub const LOG_CAPACITY: usize = 5;

const DAMAGE_SCALE: u32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Left acts on even turn indices, right on odd ones.
    pub fn for_turn(turn: u32) -> Self {
        if turn % 2 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Fighter {
    id: u16,
    name: String,
    attack: u16,
    defense: u16,
    health: u16,
}

impl Fighter {
    pub fn new(id: u16, name: impl Into<String>, attack: Option<u16>, defense: Option<u16>) -> Self {
        Self {
            id,
            name: name.into(),
            attack: stat_or_default(attack),
            defense: stat_or_default(defense),
            health: MAX_HEALTH,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attack(&self) -> u16 {
        self.attack
    }

    pub fn defense(&self) -> u16 {
        self.defense
    }

    pub fn health(&self) -> u16 {
        self.health
    }

    pub fn is_knocked_out(&self) -> bool {
        self.health == 0
    }

    fn restore(&mut self) {
        self.health = MAX_HEALTH;
    }

    fn take_hit(&mut self, damage: u32) {
        let remaining = u32::from(self.health).saturating_sub(damage);
        self.health = remaining.min(u32::from(MAX_HEALTH)) as u16;
    }
}

fn stat_or_default(value: Option<u16>) -> u16 {
    match value {
        Some(0) | None => DEFAULT_STAT,
        Some(value) => value,
    }
}

/// Damage dealt by `attack` against `defense` for a uniform roll in `[0, 1)`.
///
/// `floor(attack / defense * 15)` plus a variance of `floor(roll * 10) - 5`,
/// never below [`MIN_DAMAGE`].
pub fn damage(attack: u16, defense: u16, roll: f64) -> u32 {
    let base = i64::from(u32::from(attack) * DAMAGE_SCALE / u32::from(defense.max(1)));
    let bucket = ((roll * 10.0).floor() as i64).clamp(0, 9);
    let variance = bucket - 5;
    (base + variance).max(i64::from(MIN_DAMAGE)) as u32
}

/// Source of uniform rolls in `[0, 1)`.
pub trait Dice {
    fn roll(&mut self) -> f64;

    /// Uniform integer in `0..upper`.
    fn pick(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        ((self.roll() * f64::from(upper)).floor() as u32).min(upper - 1)
    }
}

/// Deterministic LCG dice; serializable so replays and state snapshots keep
/// producing the same battles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeededDice {
    seed: u64,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_time() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::new((now.as_secs() << 32) ^ u64::from(now.subsec_nanos()))
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self
            .seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.seed >> 32) as u32
    }
}

impl Dice for SeededDice {
    fn roll(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TurnEvent {
    /// Side of the attacker.
    pub side: Side,
    pub text: String,
    pub damage: u32,
    pub defender_health: u16,
}

/// Most recent turn events, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BattleLog {
    entries: VecDeque<TurnEvent>,
}

impl BattleLog {
    pub fn push(&mut self, event: TurnEvent) {
        self.entries.push_front(event);
        self.entries.truncate(LOG_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TurnEvent> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&TurnEvent> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattlePhase {
    #[default]
    Idle,
    Fighting,
    Resolved {
        winner: Side,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Battle {
    left: Option<Fighter>,
    right: Option<Fighter>,
    turn: u32,
    log: BattleLog,
    phase: BattlePhase,
}

impl Battle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fighters(left: Fighter, right: Fighter) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            ..Self::default()
        }
    }

    pub fn fighter(&self, side: Side) -> Option<&Fighter> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    fn fighter_mut(&mut self, side: Side) -> Option<&mut Fighter> {
        match side {
            Side::Left => self.left.as_mut(),
            Side::Right => self.right.as_mut(),
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_fighting(&self) -> bool {
        self.phase == BattlePhase::Fighting
    }

    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            BattlePhase::Resolved { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn winner_fighter(&self) -> Option<&Fighter> {
        self.winner().and_then(|side| self.fighter(side))
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Places a fighter on one side. Ignored while a resolution is running.
    pub fn select(&mut self, side: Side, fighter: Fighter) -> bool {
        if self.is_fighting() {
            return false;
        }
        match side {
            Side::Left => self.left = Some(fighter),
            Side::Right => self.right = Some(fighter),
        }
        self.clear_progress();
        true
    }

    /// Enters `Fighting`. Returns false (and changes nothing) when a fighter
    /// is missing or a resolution is already in progress.
    pub fn start(&mut self) -> bool {
        if self.is_fighting() || !self.is_ready() {
            return false;
        }
        self.clear_progress();
        self.phase = BattlePhase::Fighting;
        tracing::debug!(
            left = self.left.as_ref().map(Fighter::name),
            right = self.right.as_ref().map(Fighter::name),
            "battle started"
        );
        true
    }

    /// Resolves a single turn.
    pub fn step<D: Dice + ?Sized>(&mut self, dice: &mut D) -> Option<TurnEvent> {
        if !self.is_fighting() {
            return None;
        }
        let attacker_side = Side::for_turn(self.turn);
        let defender_side = attacker_side.opponent();
        let (attacker_name, attack) = {
            let attacker = self.fighter(attacker_side)?;
            (attacker.name().to_string(), attacker.attack())
        };
        let defense = self.fighter(defender_side)?.defense();

        let dealt = damage(attack, defense, dice.roll());
        let defender = self.fighter_mut(defender_side)?;
        defender.take_hit(dealt);
        let defender_health = defender.health();

        let event = TurnEvent {
            side: attacker_side,
            text: format!("{attacker_name} deals {dealt} damage!"),
            damage: dealt,
            defender_health,
        };
        self.log.push(event.clone());
        self.turn += 1;

        if defender_health == 0 {
            self.phase = BattlePhase::Resolved {
                winner: attacker_side,
            };
            tracing::debug!(winner = %attacker_name, turns = self.turn, "battle resolved");
        }
        Some(event)
    }

    /// Starts the battle and runs it to completion, returning every event in
    /// emission order. Empty when the battle could not start.
    pub fn resolve<D: Dice + ?Sized>(&mut self, dice: &mut D) -> Vec<TurnEvent> {
        if !self.start() {
            return Vec::new();
        }
        let mut events = Vec::new();
        while let Some(event) = self.step(dice) {
            events.push(event);
        }
        events
    }

    /// Returns to `Idle` with full health and an empty log. Only valid
    /// between battles.
    pub fn reset(&mut self) -> bool {
        if self.is_fighting() {
            return false;
        }
        self.clear_progress();
        true
    }

    /// Drops a resolution in progress back to `Idle`. Used when no turn is
    /// scheduled to finish it.
    pub fn abort(&mut self) -> bool {
        if !self.is_fighting() {
            return false;
        }
        self.clear_progress();
        true
    }

    fn clear_progress(&mut self) {
        if let Some(left) = self.left.as_mut() {
            left.restore();
        }
        if let Some(right) = self.right.as_mut() {
            right.restore();
        }
        self.turn = 0;
        self.log.clear();
        self.phase = BattlePhase::Idle;
    }
}
