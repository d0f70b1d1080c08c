use super::comms::{Inbound, TurnMessage};
use super::error::{BotError, Result};
use super::vec2::Vec2;

use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;

pub type ObjectId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "i64")]
pub enum ObjectKind {
    Tank,
    Bullet,
    Wall,
    DestructibleWall,
    Boundary,
    ClosingBoundary,
    Powerup,
    Unknown(i64),
}

impl From<i64> for ObjectKind {
    fn from(v: i64) -> Self {
        match v {
            1 => ObjectKind::Tank,
            2 => ObjectKind::Bullet,
            3 => ObjectKind::Wall,
            4 => ObjectKind::DestructibleWall,
            5 => ObjectKind::Boundary,
            6 => ObjectKind::ClosingBoundary,
            7 => ObjectKind::Powerup,
            other => ObjectKind::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Point(Vec2),
    Polygon(Vec<Vec2>),
    /// Any other shape; kept so one odd record cannot reject a whole turn.
    Unrecognized(serde_json::Value),
}

impl Default for Position {
    fn default() -> Self {
        Position::Unrecognized(serde_json::Value::Null)
    }
}

impl Position {
    pub fn point(&self) -> Option<Vec2> {
        match self {
            Position::Point(p) => Some(*p),
            Position::Polygon(_) | Position::Unrecognized(_) => None,
        }
    }

    pub fn points(&self) -> &[Vec2] {
        match self {
            Position::Point(p) => std::slice::from_ref(p),
            Position::Polygon(ps) => ps,
            Position::Unrecognized(_) => &[],
        }
    }

    /// Point used for distance queries: the point itself, or the first vertex.
    pub fn anchor(&self) -> Option<Vec2> {
        self.points().first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub position: Position,
}

impl GameObject {
    pub fn new(kind: ObjectKind, position: Position) -> Self {
        GameObject { kind, position }
    }

    pub fn point(kind: ObjectKind, pos: Vec2) -> Self {
        GameObject::new(kind, Position::Point(pos))
    }

    pub fn polygon(kind: ObjectKind, points: Vec<Vec2>) -> Self {
        GameObject::new(kind, Position::Polygon(points))
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub objects: BTreeMap<ObjectId, GameObject>,
    pub tank_id: ObjectId,
    pub enemy_tank_id: ObjectId,
    pub width: f32,
    pub height: f32,
}

impl World {
    /// Merges the init batches in order and derives the map extent from the
    /// static boundary markers.
    pub fn initialize<I>(
        tank_id: impl Into<ObjectId>,
        enemy_tank_id: impl Into<ObjectId>,
        batches: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = BTreeMap<ObjectId, GameObject>>,
    {
        let mut objects = BTreeMap::new();
        for batch in batches {
            objects.extend(batch);
        }

        let (width, height) = objects
            .values()
            .filter(|o| o.kind == ObjectKind::Boundary)
            .flat_map(|o| o.position.points().iter())
            .fold(None, |acc: Option<(f32, f32)>, p| match acc {
                Some((w, h)) => Some((w.max(p.x), h.max(p.y))),
                None => Some((p.x, p.y)),
            })
            .ok_or(BotError::NoBoundaries)?;

        let world = World {
            objects,
            tank_id: tank_id.into(),
            enemy_tank_id: enemy_tank_id.into(),
            width,
            height,
        };

        info!(
            "world initialized: {} objects, map {}x{}",
            world.objects.len(),
            world.width,
            world.height
        );

        Ok(world)
    }

    /// Applies one inbound message. Returns false once the game is over.
    pub fn apply_turn(&mut self, inbound: &Inbound) -> bool {
        match inbound {
            Inbound::EndGame => false,
            Inbound::EndInit => true,
            Inbound::Message(delta) => {
                self.apply_delta(delta);
                true
            }
        }
    }

    pub fn apply_delta(&mut self, delta: &TurnMessage) {
        for id in &delta.deleted_objects {
            self.objects.remove(id);
        }

        for (id, object) in &delta.updated_objects {
            self.objects.insert(id.clone(), object.clone());
        }

        debug!(
            "delta applied: -{} +{} => {} objects",
            delta.deleted_objects.len(),
            delta.updated_objects.len(),
            self.objects.len()
        );
    }

    pub fn by_kind(&self, kind: ObjectKind) -> BTreeMap<&ObjectId, &GameObject> {
        self.objects.iter().filter(|(_, o)| o.kind == kind).collect()
    }

    /// Point positions of every object of `kind`.
    pub fn points_of_kind(&self, kind: ObjectKind) -> Vec<Vec2> {
        self.objects
            .values()
            .filter(|o| o.kind == kind)
            .filter_map(|o| o.position.point())
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&GameObject> {
        self.objects
            .get(id)
            .ok_or_else(|| BotError::NotFound { id: id.to_string() })
    }

    pub fn position_of(&self, id: &str) -> Result<Vec2> {
        self.get(id)?
            .position
            .point()
            .ok_or_else(|| BotError::NotAPoint { id: id.to_string() })
    }

    pub fn me(&self) -> Result<Vec2> {
        self.position_of(&self.tank_id)
    }

    pub fn enemy(&self) -> Result<Vec2> {
        self.position_of(&self.enemy_tank_id)
    }

    pub fn nearest_of_kind(&self, kind: ObjectKind, from: Vec2) -> Result<&ObjectId> {
        self.objects
            .iter()
            .filter(|(_, o)| o.kind == kind)
            .filter_map(|(id, o)| o.position.anchor().map(|p| (id, p.dist(from))))
            .fold(None, |best: Option<(&ObjectId, f32)>, (id, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((id, d)),
            })
            .map(|(id, _)| id)
            .ok_or(BotError::EmptySet { kind })
    }

    pub fn objects_within(&self, center: Vec2, radius: f32) -> Vec<(&ObjectId, &GameObject)> {
        self.objects
            .iter()
            .filter(|(_, o)| o.position.anchor().is_some_and(|p| p.dist(center) <= radius))
            .collect()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary_batch() -> BTreeMap<ObjectId, GameObject> {
        let corners = vec![
            Vec2::new(0., 1000.),
            Vec2::new(0., 0.),
            Vec2::new(1800., 0.),
            Vec2::new(1800., 1000.),
        ];
        BTreeMap::from([("b1".to_string(), GameObject::polygon(ObjectKind::Boundary, corners))])
    }

    fn tanks_batch() -> BTreeMap<ObjectId, GameObject> {
        BTreeMap::from([
            ("me".to_string(), GameObject::point(ObjectKind::Tank, Vec2::new(100., 100.))),
            ("foe".to_string(), GameObject::point(ObjectKind::Tank, Vec2::new(900., 500.))),
        ])
    }

    fn world() -> World {
        World::initialize("me", "foe", [boundary_batch(), tanks_batch()]).unwrap()
    }

    #[test]
    fn initialize_derives_extent() {
        let w = world();
        assert_eq!(w.width, 1800.);
        assert_eq!(w.height, 1000.);
        assert_eq!(w.center(), Vec2::new(900., 500.));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn initialize_without_boundaries_fails() {
        let err = World::initialize("me", "foe", [tanks_batch()]).unwrap_err();
        assert!(matches!(err, BotError::NoBoundaries));
    }

    #[test]
    fn later_batches_overwrite_earlier_ones() {
        let moved = BTreeMap::from([(
            "me".to_string(),
            GameObject::point(ObjectKind::Tank, Vec2::new(5., 5.)),
        )]);
        let w = World::initialize("me", "foe", [boundary_batch(), tanks_batch(), moved]).unwrap();
        assert_eq!(w.me().unwrap(), Vec2::new(5., 5.));
    }

    #[test]
    fn update_delta_is_idempotent() {
        let mut w = world();
        let delta = TurnMessage {
            updated_objects: BTreeMap::from([(
                "p1".to_string(),
                GameObject::point(ObjectKind::Powerup, Vec2::new(300., 300.)),
            )]),
            ..Default::default()
        };
        w.apply_delta(&delta);
        let once = w.objects.clone();
        w.apply_delta(&delta);
        assert_eq!(w.objects, once);
    }

    #[test]
    fn deleting_absent_id_is_noop() {
        let mut w = world();
        let before = w.objects.clone();
        let delta = TurnMessage {
            deleted_objects: vec!["ghost".to_string()],
            ..Default::default()
        };
        assert!(w.apply_turn(&Inbound::Message(delta)));
        assert_eq!(w.objects, before);
    }

    #[test]
    fn deletes_before_updates() {
        let mut w = world();
        let delta = TurnMessage {
            deleted_objects: vec!["foe".to_string()],
            updated_objects: BTreeMap::from([(
                "foe".to_string(),
                GameObject::point(ObjectKind::Tank, Vec2::new(1., 2.)),
            )]),
            ..Default::default()
        };
        w.apply_delta(&delta);
        assert_eq!(w.enemy().unwrap(), Vec2::new(1., 2.));
    }

    #[test]
    fn end_game_stops_the_loop() {
        let mut w = world();
        assert!(!w.apply_turn(&Inbound::EndGame));
        assert!(w.apply_turn(&Inbound::EndInit));
    }

    #[test]
    fn get_missing_is_not_found() {
        let w = world();
        assert!(matches!(w.get("nope"), Err(BotError::NotFound { .. })));
        assert!(matches!(w.position_of("b1"), Err(BotError::NotAPoint { .. })));
    }

    #[test]
    fn nearest_of_kind_picks_closest_and_first_on_tie() {
        let mut w = world();
        let delta = TurnMessage {
            updated_objects: BTreeMap::from([
                ("pa".to_string(), GameObject::point(ObjectKind::Powerup, Vec2::new(110., 100.))),
                ("pb".to_string(), GameObject::point(ObjectKind::Powerup, Vec2::new(90., 100.))),
                ("pc".to_string(), GameObject::point(ObjectKind::Powerup, Vec2::new(500., 100.))),
            ]),
            ..Default::default()
        };
        w.apply_delta(&delta);
        let me = w.me().unwrap();
        assert_eq!(w.nearest_of_kind(ObjectKind::Powerup, me).unwrap(), "pa");
        assert!(matches!(
            w.nearest_of_kind(ObjectKind::Wall, me),
            Err(BotError::EmptySet { kind: ObjectKind::Wall })
        ));
    }

    #[test]
    fn by_kind_and_radius_queries() {
        let w = world();
        assert_eq!(w.by_kind(ObjectKind::Tank).len(), 2);
        assert_eq!(w.points_of_kind(ObjectKind::Tank).len(), 2);
        let near: Vec<_> = w
            .objects_within(Vec2::new(100., 100.), 50.)
            .into_iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(near, vec!["me"]);
    }

    #[test]
    fn parses_wire_objects() {
        let tank: GameObject =
            serde_json::from_str(r#"{"type": 1, "position": [10, 20], "hp": 5}"#).unwrap();
        assert_eq!(tank, GameObject::point(ObjectKind::Tank, Vec2::new(10., 20.)));

        let zone: GameObject =
            serde_json::from_str(r#"{"type": 6, "position": [[0, 10], [0, 0], [10, 0], [10, 10]]}"#)
                .unwrap();
        assert_eq!(zone.kind, ObjectKind::ClosingBoundary);
        assert_eq!(zone.position.points().len(), 4);

        let odd: GameObject = serde_json::from_str(r#"{"type": 42, "position": [0, 0]}"#).unwrap();
        assert_eq!(odd.kind, ObjectKind::Unknown(42));
    }

    #[test]
    fn tolerates_odd_records() {
        let wide: GameObject = serde_json::from_str(r#"{"type": 70000, "position": [1, 1]}"#).unwrap();
        assert_eq!(wide.kind, ObjectKind::Unknown(70000));

        let shapeless: GameObject =
            serde_json::from_str(r#"{"type": 2, "position": {"x": 1, "y": 2}}"#).unwrap();
        assert_eq!(shapeless.kind, ObjectKind::Bullet);
        assert_eq!(shapeless.position.point(), None);
        assert!(shapeless.position.points().is_empty());

        let bare: GameObject = serde_json::from_str(r#"{"type": 7}"#).unwrap();
        assert_eq!(bare.position, Position::default());
    }

    #[test]
    fn odd_record_in_a_turn_is_stored_and_skipped() {
        let line = r#"{"message": {"updated_objects": {"odd": {"type": 300, "position": "?"}, "p": {"type": 7, "position": [120, 100]}}}}"#;
        let mut w = world();
        assert!(w.apply_turn(&Inbound::parse(line).unwrap()));
        assert_eq!(w.get("odd").unwrap().kind, ObjectKind::Unknown(300));
        let me = w.me().unwrap();
        assert_eq!(w.nearest_of_kind(ObjectKind::Powerup, me).unwrap(), "p");
        assert_eq!(w.objects_within(me, 5000.).len(), 4);
    }
}
