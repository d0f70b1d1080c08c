use super::error::{BotError, Result};
use super::vec2::Vec2;
use super::world::{ObjectKind, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top_left: Vec2,
    pub bot_right: Vec2,
}

impl Bounds {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Bounds {
            top_left: Vec2::new(x1, y1),
            bot_right: Vec2::new(x2, y2),
        }
    }

    /// Smallest axis-aligned box around `points`, whatever their order.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (lt, rb) = rest
            .iter()
            .fold((*first, *first), |(lt, rb), p| (lt.min(*p), rb.max(*p)));
        Some(Bounds {
            top_left: lt,
            bot_right: rb,
        })
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.top_left.x
            && p.x <= self.bot_right.x
            && p.y >= self.top_left.y
            && p.y <= self.bot_right.y
    }

    pub fn get_center(&self) -> Vec2 {
        (self.bot_right + self.top_left) * 0.5
    }
}

/// View over the closing boundary for a single turn.
#[derive(Debug, Clone)]
pub struct BoundsDetector {
    corners: Vec<Vec2>,
    bounds: Bounds,
}

impl BoundsDetector {
    pub fn new(corners: Vec<Vec2>) -> Result<Self> {
        let bounds = Bounds::from_points(&corners).ok_or(BotError::NoActiveBoundary)?;
        Ok(BoundsDetector { corners, bounds })
    }

    pub fn from_world(world: &World) -> Result<Self> {
        let zone = world
            .objects
            .values()
            .find(|o| o.kind == ObjectKind::ClosingBoundary)
            .ok_or(BotError::NoActiveBoundary)?;

        Self::new(zone.position.points().to_vec())
    }

    pub fn active_boundary_corners(&self) -> Vec<Vec2> {
        self.corners.clone()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn closest_corner(&self, pos: Vec2) -> Vec2 {
        let mut best = self.corners[0];
        for &c in &self.corners[1..] {
            if c.dist(pos) < best.dist(pos) {
                best = c;
            }
        }
        best
    }

    /// Axis-aligned proximity to the closest corner, not a true edge distance.
    pub fn is_near_any_edge(&self, pos: Vec2, margin: f32) -> bool {
        let corner = self.closest_corner(pos);
        (pos.x - corner.x).abs() < margin || (pos.y - corner.y).abs() < margin
    }

    pub fn contains_point(&self, pos: Vec2) -> bool {
        self.bounds.contains(pos)
    }

    /// True when the agent gets to `pos` strictly before the zone edge does.
    pub fn is_reachable_before_closure(
        &self,
        agent: Vec2,
        pos: Vec2,
        agent_speed: f32,
        shrink_speed: f32,
    ) -> bool {
        let travel = agent.dist(pos) / agent_speed;
        let closure = pos.dist(self.closest_corner(pos)) / shrink_speed;
        travel < closure
    }
}
