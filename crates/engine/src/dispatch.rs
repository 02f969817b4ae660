//! Decides which map events fire from the player's tile, facing, movement
//! state and input.
//!
//! Every path applies the same rule: an event fires only if its trigger kind
//! matches and the player's facing is in the event's side mask. Events on a
//! tile fire in map order.

use serde::Deserialize;
use tracing::debug;

use crate::world::{EventId, Session, TilePos, TriggerKind};

/// When the set of press events that already fired is forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressDedupPolicy {
    /// Cleared at the end of every poll. A held interact key re-fires the
    /// facing event on every poll.
    #[default]
    PerPoll,
    /// Kept while interact stays held and cleared on release, so each press
    /// fires once.
    PerKeyPress,
}

/// Fires every event at `tile` with the given trigger whose side mask accepts
/// the player's facing, skipping ids in `skip`. Returns the fired ids in map
/// order.
pub fn fire_events(
    session: &mut Session,
    tile: TilePos,
    trigger: TriggerKind,
    skip: &[EventId],
) -> Vec<EventId> {
    let (map, mut ctx) = session.event_scope();
    let facing = ctx.player_facing();
    let mut fired = Vec::new();
    for event in map.events_mut() {
        if event.tile() != tile
            || event.trigger() != trigger
            || skip.contains(&event.id())
            || !event.sides().accepts(facing)
        {
            continue;
        }
        event.fire(&mut ctx);
        debug!(
            event = event.id().0,
            x = tile.x,
            y = tile.y,
            trigger = ?trigger,
            facing = ?facing,
            "event_fired"
        );
        fired.push(event.id());
    }
    fired
}

/// Runs the per-frame hook of every ambient event on the current map.
pub fn tick_ambient(session: &mut Session) {
    let (map, mut ctx) = session.event_scope();
    for event in map.events_mut().iter_mut().filter(|event| event.is_ambient()) {
        event.tick_ambient(&mut ctx);
    }
}

/// Press/occupy/enter dispatch with suppression of repeated press firings.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    policy: PressDedupPolicy,
    fired: Vec<EventId>,
    fired_map: Option<usize>,
}

impl EventDispatcher {
    pub fn new(policy: PressDedupPolicy) -> Self {
        Self {
            policy,
            fired: Vec::new(),
            fired_map: None,
        }
    }

    pub fn policy(&self) -> PressDedupPolicy {
        self.policy
    }

    /// Ids currently suppressed for press dispatch.
    pub fn fired(&self) -> &[EventId] {
        &self.fired
    }

    /// Interaction-press path. Targets the tile in front of the player while
    /// interact is held and the player is not mid-step.
    pub fn dispatch_press(&mut self, session: &mut Session, interact_down: bool) -> Vec<EventId> {
        let map_index = session.maps().current_index();
        if self.fired_map != Some(map_index) {
            self.fired.clear();
            self.fired_map = Some(map_index);
        }

        let mut fired = Vec::new();
        let position = session.player().position();
        if interact_down && !position.is_animating() {
            let target = position.tile().step(position.facing());
            let candidates: Vec<EventId> = session
                .current_map()
                .events_at(target)
                .filter(|event| event.trigger() == TriggerKind::OnInteractPress)
                .map(|event| event.id())
                .collect();
            if !candidates.is_empty() {
                fired = fire_events(session, target, TriggerKind::OnInteractPress, &self.fired);
                self.fired = candidates;
            }
        }

        match self.policy {
            PressDedupPolicy::PerPoll => self.fired.clear(),
            PressDedupPolicy::PerKeyPress if !interact_down => self.fired.clear(),
            PressDedupPolicy::PerKeyPress => {}
        }
        fired
    }

    /// Occupancy path. Fires every poll the player stands still; never
    /// suppressed.
    pub fn dispatch_occupy(&mut self, session: &mut Session) -> Vec<EventId> {
        let position = session.player().position();
        if position.is_moving() {
            return Vec::new();
        }
        let tile = position.tile();
        fire_events(session, tile, TriggerKind::OnOccupyTile, &[])
    }

    /// Entry path. Called once per completed step with the destination tile.
    pub fn dispatch_enter(&mut self, session: &mut Session, tile: TilePos) -> Vec<EventId> {
        fire_events(session, tile, TriggerKind::OnEnterTile, &[])
    }
}
