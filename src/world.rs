//! Melee world - owns all actors, swings, and the simulation clock

use ahash::AHashMap;
use glam::Vec3;

use crate::actor::Actor;
use crate::combat::request::AttackOptions;
use crate::combat::swing::SwingArena;
use crate::combat::telemetry::TelemetryLog;
use crate::core::config::EngineConfig;
use crate::core::error::{MeleeError, Result};
use crate::core::types::{ActorId, RequestId, SimTime, Tick};

/// The combat world containing all actors and in-flight swings
pub struct MeleeWorld {
    pub current_tick: Tick,
    /// Absolute simulation time in seconds
    pub now: SimTime,
    /// Fixed per-tick delta in seconds
    pub delta_time: f32,
    pub config: EngineConfig,
    pub(crate) actors: AHashMap<ActorId, Actor>,
    /// Creation-ordered roster: iteration order must be replay-stable,
    /// which the hash map alone does not give
    pub(crate) roster: Vec<ActorId>,
    pub swings: SwingArena,
    pub telemetry: TelemetryLog,
    next_actor_index: u32,
}

impl MeleeWorld {
    pub fn new(delta_time: f32) -> Self {
        Self {
            current_tick: 0,
            now: 0.0,
            delta_time,
            config: EngineConfig::default(),
            actors: AHashMap::new(),
            roster: Vec::new(),
            swings: SwingArena::new(),
            telemetry: TelemetryLog::new(),
            next_actor_index: 0,
        }
    }

    pub fn spawn_actor(&mut self, position: Vec3) -> ActorId {
        let id = ActorId(self.next_actor_index);
        self.next_actor_index += 1;
        self.actors.insert(id, Actor::new(id, position));
        self.roster.push(id);
        id
    }

    /// Remove an actor entirely; in-flight swings defensively treat the id
    /// as "no valid candidate" from then on
    pub fn despawn_actor(&mut self, id: ActorId) {
        self.actors.remove(&id);
        self.roster.retain(|a| *a != id);
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actor ids in spawn order
    pub fn actor_ids(&self) -> &[ActorId] {
        &self.roster
    }

    pub fn actor_count(&self) -> usize {
        self.roster.len()
    }

    /// Queue an attack through the request factory, rejecting unknown actors
    pub fn queue_attack(&mut self, attacker: ActorId, options: AttackOptions) -> Result<RequestId> {
        let actor = self
            .actors
            .get_mut(&attacker)
            .ok_or(MeleeError::UnknownActor(attacker))?;
        actor.queue_attack(options)
    }

    /// Advance the clock one tick; the stages themselves run in
    /// `simulation::run_melee_tick`
    pub fn advance_clock(&mut self) {
        self.current_tick += 1;
        self.now += self.delta_time as SimTime;
    }

    /// Discretized frame token used for RNG seeding and victim dedup.
    ///
    /// The fixed-tick counter already is `floor(now / delta)`; deriving the
    /// token from it instead of float division keeps replay exact.
    pub fn frame_token(&self) -> u32 {
        self.current_tick as u32
    }

    /// Positions of every actor except `exclude`, in spawn order.
    ///
    /// Target gathering works on this snapshot so defender mutation during
    /// the hit loop never aliases the iteration.
    pub fn position_snapshot(&self, exclude: ActorId) -> Vec<(ActorId, Vec3)> {
        self.roster
            .iter()
            .filter(|id| **id != exclude)
            .filter_map(|id| self.actors.get(id).map(|a| (*id, a.position)))
            .collect()
    }
}
