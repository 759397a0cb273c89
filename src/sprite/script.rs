use crate::engine::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One timed step of an enemy script.
/// JSON form : `{ "type": "move", "direction": 1, "ticks": 60 }`
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Teleport to an absolute world position
    Show { position: Point, ticks: u32 },
    /// Reserved, holds the enemy in place for its duration and nothing else
    Hide { ticks: u32 },
    /// Walk along x, `direction` is -1 (left) or 1 (right)
    Move { direction: i8, ticks: u32 },
    Idle { ticks: u32 },
}

impl Action {
    pub fn ticks(&self) -> u32 {
        match self {
            Action::Show { ticks, .. }
            | Action::Hide { ticks }
            | Action::Move { ticks, .. }
            | Action::Idle { ticks } => *ticks,
        }
    }
}

/// What happens once the last action's ticks run out
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    Loop,
    Once,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Empty,
    ZeroDuration { index: usize },
    BadDirection { index: usize, direction: i8 },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Empty => write!(f, "An enemy script needs at least one action."),
            ScriptError::ZeroDuration { index } => {
                write!(f, "Action {} of the script lasts zero ticks.", index)
            }
            ScriptError::BadDirection { index, direction } => write!(
                f,
                "Action {} moves in direction {}, expected -1 or 1.",
                index, direction
            ),
        }
    }
}

impl std::error::Error for ScriptError {}

#[derive(Deserialize)]
struct RawScript {
    actions: Vec<Action>,
    #[serde(default)]
    repeat: Repeat,
}

/// Validated, non-empty action list. Deserializing goes through
/// `Script::new` so a bad manifest fails at load time, not mid-level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScript")]
pub struct Script {
    actions: Vec<Action>,
    repeat: Repeat,
}

impl TryFrom<RawScript> for Script {
    type Error = ScriptError;

    fn try_from(raw: RawScript) -> Result<Self, Self::Error> {
        Script::new(raw.actions, raw.repeat)
    }
}

impl Script {
    // XNA's MaxWaitTime of 0.5s at 60 ticks per second
    const PATROL_WAIT_TICKS: u32 = 30;
    const PATROL_WALK_TICKS: u32 = 60;

    pub fn new(actions: Vec<Action>, repeat: Repeat) -> Result<Self, ScriptError> {
        if actions.is_empty() {
            return Err(ScriptError::Empty);
        }
        for (index, action) in actions.iter().enumerate() {
            if action.ticks() == 0 {
                return Err(ScriptError::ZeroDuration { index });
            }
            if let Action::Move { direction, .. } = action {
                if *direction != 1 && *direction != -1 {
                    return Err(ScriptError::BadDirection {
                        index,
                        direction: *direction,
                    });
                }
            }
        }
        Ok(Script { actions, repeat })
    }

    /// Pace right, wait, pace back, wait. Used when a level names a
    /// monster the manifest has no script for.
    pub fn patrol(spawn: Point) -> Self {
        Script {
            actions: vec![
                Action::Show {
                    position: spawn,
                    ticks: 1,
                },
                Action::Move {
                    direction: 1,
                    ticks: Self::PATROL_WALK_TICKS,
                },
                Action::Idle {
                    ticks: Self::PATROL_WAIT_TICKS,
                },
                Action::Move {
                    direction: -1,
                    ticks: Self::PATROL_WALK_TICKS,
                },
                Action::Idle {
                    ticks: Self::PATROL_WAIT_TICKS,
                },
            ],
            repeat: Repeat::Loop,
        }
    }

    pub fn get(&self, step: usize) -> Option<&Action> {
        self.actions.get(step)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Index after `step`. With `Repeat::Once` this runs past the end,
    /// which `get` answers with None.
    pub fn next_step(&self, step: usize) -> usize {
        let next = step + 1;
        match self.repeat {
            Repeat::Loop if next >= self.actions.len() => 0,
            Repeat::Loop | Repeat::Once => next.min(self.actions.len()),
        }
    }
}
