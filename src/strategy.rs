use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Move {
    Angle(f32),
    Vector(f32, f32),
}

impl Move {
    pub fn angle(&self) -> f32 {
        match *self {
            Move::Angle(a) | Move::Vector(a, _) => a,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Action {
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub movement: Option<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoot: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionState {
    pub tick_counter: u32,
    pub change_tick_threshold: u32,
    pub waiting: bool,
    active_ticks: u32,
}

impl DecisionState {
    pub fn new(active_ticks: u32) -> Self {
        DecisionState {
            tick_counter: 0,
            change_tick_threshold: active_ticks,
            waiting: false,
            active_ticks,
        }
    }

    pub fn is_due(&self) -> bool {
        self.tick_counter >= self.change_tick_threshold
    }

    pub fn swap(&mut self, waiting_ticks: u32) {
        self.waiting = !self.waiting;
        self.tick_counter = 0;
        self.change_tick_threshold = if self.waiting {
            waiting_ticks
        } else {
            self.active_ticks
        };
    }

    /// Enters WAITING from either state, restarting the countdown.
    pub fn enter_waiting(&mut self, waiting_ticks: u32) {
        if self.waiting {
            self.tick_counter = 0;
            self.change_tick_threshold = waiting_ticks;
        } else {
            self.swap(waiting_ticks);
        }
    }

    fn tick(&mut self) {
        self.tick_counter += 1;
    }
}

pub struct Strategy<R = StdRng> {
    config: BotConfig,
    state: DecisionState,
    rng: R,
}

impl Strategy<StdRng> {
    pub fn seeded(config: BotConfig, seed: u64) -> Self {
        Strategy::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: BotConfig) -> Self {
        Strategy::new(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Strategy<R> {
    pub fn new(config: BotConfig, rng: R) -> Self {
        Strategy {
            state: DecisionState::new(config.active_ticks),
            config,
            rng,
        }
    }

    pub fn state(&self) -> &DecisionState {
        &self.state
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn play(&mut self, world: &World) -> Result<Action> {
        let me = world.me()?;
        let enemy = world.enemy()?;

        let zone = match BoundsDetector::from_world(world) {
            Ok(zone) => Some(zone),
            Err(e) if e.is_recoverable() => {
                debug!("{e}, skipping boundary checks");
                None
            }
            Err(e) => return Err(e),
        };

        let mut action = Action::default();

        let emergency = zone
            .as_ref()
            .filter(|z| z.is_near_any_edge(me, self.config.boundary_margin));

        if let Some(zone) = emergency {
            let corner = zone.closest_corner(me);
            let offset = self.jitter(self.config.escape_jitter);
            let angle = normalize_degrees(me.angle_to(corner) + offset);
            debug!("close to the zone edge near {corner:?}, escaping at {angle:.1}");
            action.movement = Some(self.make_move(angle));
            self.state.enter_waiting(self.config.boundary_waiting_ticks);
        } else if !self.state.waiting {
            let pickups = self.eligible_pickups(world, me, zone.as_ref());
            let nearest = pickups
                .iter()
                .copied()
                .min_by(|a, b| a.dist(me).total_cmp(&b.dist(me)));

            match nearest {
                None if self.state.is_due() => {
                    let offset = if self.rng.gen_bool(0.5) {
                        self.config.strafe_offset
                    } else {
                        -self.config.strafe_offset
                    };
                    let angle = normalize_degrees(me.angle_to(enemy) + offset);
                    debug!("strafing at {angle:.1}");
                    action.movement = Some(self.make_move(angle));
                    self.state.swap(self.config.waiting_ticks);
                }
                Some(pickup) => {
                    debug!("heading for pickup at {pickup:?}");
                    action.path = Some(pickup);
                }
                None if me.dist(enemy) > self.config.close_range => {
                    action.path = Some(enemy);
                }
                None => {
                    let offset = self.jitter(self.config.orbit_jitter);
                    let angle = normalize_degrees(me.angle_to(enemy) + 180. + offset);
                    debug!("enemy in close range, orbiting at {angle:.1}");
                    action.movement = Some(self.make_move(angle));
                    self.state.swap(self.config.waiting_ticks);
                }
            }
        } else if self.state.is_due() {
            self.state.swap(self.config.waiting_ticks);
        }

        action.shoot = self.aim(world, me, enemy);
        self.state.tick();

        Ok(action)
    }

    /// Powerups inside the zone that we can reach before it closes over them.
    /// Without an active zone every powerup qualifies.
    fn eligible_pickups(&self, world: &World, me: Vec2, zone: Option<&BoundsDetector>) -> Vec<Vec2> {
        let powerups = world.points_of_kind(ObjectKind::Powerup);
        let Some(zone) = zone else {
            return powerups;
        };

        powerups
            .into_iter()
            .filter(|p| {
                zone.contains_point(*p)
                    && zone.is_reachable_before_closure(
                        me,
                        *p,
                        self.config.agent_speed,
                        self.config.boundary_shrink_speed,
                    )
            })
            .collect()
    }

    fn aim(&self, world: &World, me: Vec2, enemy: Vec2) -> Option<f32> {
        let walls = world.points_of_kind(ObjectKind::Wall);
        let destructibles = world.points_of_kind(ObjectKind::DestructibleWall);

        if shot_clear(me, enemy, &walls, &destructibles) {
            Some(me.angle_to(enemy))
        } else {
            debug!("line of fire blocked, holding fire");
            None
        }
    }

    fn jitter(&mut self, (lo, hi): (i32, i32)) -> f32 {
        self.rng.gen_range(lo.min(hi)..=lo.max(hi)) as f32
    }

    fn make_move(&self, angle: f32) -> Move {
        match self.config.move_magnitude {
            Some(magnitude) => Move::Vector(angle, magnitude),
            None => Move::Angle(angle),
        }
    }
}
