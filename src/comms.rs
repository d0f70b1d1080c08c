//! Line-delimited JSON exchange with the game engine.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use log::{debug, info, warn};
use rand::Rng;
use serde::Deserialize;

use super::error::{BotError, Result};
use super::strategy::{Action, Strategy};
use super::world::{GameObject, ObjectId, World};

pub const END_INIT_SIGNAL: &str = "END_INIT";
pub const END_SIGNAL: &str = "END";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TurnMessage {
    #[serde(rename = "your-tank-id", default)]
    pub tank_id: Option<ObjectId>,
    #[serde(rename = "enemy-tank-id", default)]
    pub enemy_tank_id: Option<ObjectId>,
    #[serde(default)]
    pub updated_objects: BTreeMap<ObjectId, GameObject>,
    #[serde(default)]
    pub deleted_objects: Vec<ObjectId>,
}

#[derive(Deserialize)]
struct Envelope {
    message: TurnMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    EndInit,
    EndGame,
    Message(TurnMessage),
}

impl Inbound {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let signal = match serde_json::from_str::<String>(line) {
            Ok(s) => s,
            Err(_) => line.to_string(),
        };

        match signal.as_str() {
            END_INIT_SIGNAL => Ok(Inbound::EndInit),
            END_SIGNAL => Ok(Inbound::EndGame),
            _ => {
                let envelope: Envelope = serde_json::from_str(line)?;
                Ok(Inbound::Message(envelope.message))
            }
        }
    }
}

pub struct Comms<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> Comms<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Comms {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// Blocks for the next non-empty line.
    pub fn read_message(&mut self) -> Result<Inbound> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(BotError::UnexpectedEof);
            }
            if !self.line.trim().is_empty() {
                return Inbound::parse(&self.line);
            }
        }
    }

    pub fn post_message(&mut self, action: &Action) -> Result<()> {
        serde_json::to_writer(&mut self.writer, action)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads the tank id message and every init batch up to END_INIT.
    pub fn handshake(&mut self) -> Result<World> {
        let ids = match self.read_message()? {
            Inbound::Message(m) => m,
            _ => return Err(BotError::MissingTankIds),
        };
        let (tank_id, enemy_tank_id) = match (ids.tank_id, ids.enemy_tank_id) {
            (Some(me), Some(foe)) => (me, foe),
            _ => return Err(BotError::MissingTankIds),
        };
        info!("playing as {tank_id} against {enemy_tank_id}");

        let mut batches = Vec::new();
        loop {
            match self.read_message()? {
                Inbound::EndInit => break,
                Inbound::EndGame => return Err(BotError::UnexpectedEof),
                Inbound::Message(m) => {
                    debug!("init batch with {} objects", m.updated_objects.len());
                    batches.push(m.updated_objects);
                }
            }
        }

        World::initialize(tank_id, enemy_tank_id, batches)
    }

    /// Answers every turn until the engine sends END. Returns the number of
    /// turns played.
    pub fn play_game<G: Rng>(
        &mut self,
        world: &mut World,
        strategy: &mut Strategy<G>,
    ) -> Result<u32> {
        let mut turns = 0;
        loop {
            let inbound = self.read_message()?;
            if !world.apply_turn(&inbound) {
                return Ok(turns);
            }
            if inbound == Inbound::EndInit {
                warn!("stray END_INIT, not answering it");
                continue;
            }

            let action = strategy.play(world)?;
            self.post_message(&action)?;
            turns += 1;
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
