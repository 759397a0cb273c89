// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure Analogy                         │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Code Directory    │          Stage Play Equivalent                       │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ src/              │ Theatre                                              │
// │ ├── lib.rs        │ Box Office                                           │
// │ ├── game.rs       │ Tonight's Performance                                │
// │ ├── level/        │ Set Design (where everything stands)                 │
// │ └── sprite/       │ Cast                                                 │
// │     ├── mod.rs    │ Costumes (what the audience sees)                    │
// │     ├── script.rs │ The Script (lines + how long to hold them)           │
// │     ├── state.rs  │ Blocking (which line, where on stage)                │
// │     └── enemy.rs  │ The Actor (reads the script, wears the costume)      │
// └───────────────────┴──────────────────────────────────────────────────────┘
//
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Action → State → Animation                          │
// ├────────────────┬──────────────────────┬──────────────────────────────────┤
// │   Action       │   State              │   Animation                      │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │   show         │   Showing            │   Idle                           │
// │   hide         │   Hidden             │   Idle                           │
// │   move  +1     │   Walking            │   WalkRight (mirrored strip)     │
// │   move  -1     │   Walking            │   WalkLeft                       │
// │   idle         │   Idle               │   Idle                           │
// │   (exhausted)  │   Finished           │   Idle                           │
// └────────────────┴──────────────────────┴──────────────────────────────────┘
pub mod enemy;
pub mod script;
pub mod state;

use std::ops::RangeInclusive;

/// Monster sheets are a single strip of square frames
pub const FRAME_SIZE: f32 = 64.0;
/// Registration point inside a frame: centre of the feet
pub const FRAME_ORIGIN_X: f32 = 32.0;
pub const FRAME_ORIGIN_Y: f32 = 64.0;

/// Visual state handed to the display object
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Animation {
    WalkLeft,
    WalkRight,
    Idle,
}

impl Animation {
    pub fn for_direction(direction: i8) -> Self {
        if direction == 1 {
            Animation::WalkRight
        } else {
            Animation::WalkLeft
        }
    }

    pub fn frames(&self) -> RangeInclusive<u8> {
        match self {
            Animation::WalkLeft | Animation::WalkRight => 0..=9,
            Animation::Idle => 10..=20,
        }
    }

    pub fn first_frame(&self) -> u8 {
        *self.frames().start()
    }

    /// Right facing walk reuses the left facing strip, flipped
    pub fn is_mirrored(&self) -> bool {
        matches!(self, Animation::WalkRight)
    }
}

/// Shared behaviour of the type-level enemy states
pub trait SpriteState {
    fn name() -> &'static str;
    fn animation(direction: i8) -> Animation;
}

#[derive(Debug, Copy, Clone)]
pub struct Showing;

#[derive(Debug, Copy, Clone)]
pub struct Hidden;

#[derive(Debug, Copy, Clone)]
pub struct Walking;

#[derive(Debug, Copy, Clone)]
pub struct Idle;

#[derive(Debug, Copy, Clone)]
pub struct Finished;

impl SpriteState for Showing {
    fn name() -> &'static str {
        "Showing"
    }

    fn animation(_direction: i8) -> Animation {
        Animation::Idle
    }
}

impl SpriteState for Hidden {
    fn name() -> &'static str {
        "Hidden"
    }

    fn animation(_direction: i8) -> Animation {
        Animation::Idle
    }
}

impl SpriteState for Walking {
    fn name() -> &'static str {
        "Walking"
    }

    fn animation(direction: i8) -> Animation {
        Animation::for_direction(direction)
    }
}

impl SpriteState for Idle {
    fn name() -> &'static str {
        "Idle"
    }

    fn animation(_direction: i8) -> Animation {
        Animation::Idle
    }
}

impl SpriteState for Finished {
    fn name() -> &'static str {
        "Finished"
    }

    fn animation(_direction: i8) -> Animation {
        Animation::Idle
    }
}
