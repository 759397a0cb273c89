use crate::engine::{DisplayObject, Point, Rect, Renderer, Size};
use crate::sprite::script::{Action, Script};
use crate::sprite::state::{EnemyContext, EnemyState};
use crate::sprite::{self, Animation, FRAME_ORIGIN_X, FRAME_ORIGIN_Y, FRAME_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four monster looks a level can place, `A` through `D`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MonsterVariant {
    A,
    B,
    C,
    D,
}

impl MonsterVariant {
    pub const ALL: [MonsterVariant; 4] = [
        MonsterVariant::A,
        MonsterVariant::B,
        MonsterVariant::C,
        MonsterVariant::D,
    ];

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'A' => Some(MonsterVariant::A),
            'B' => Some(MonsterVariant::B),
            'C' => Some(MonsterVariant::C),
            'D' => Some(MonsterVariant::D),
            _ => None,
        }
    }

    /// Image name of the variant's sprite strip
    pub fn image_key(&self) -> &'static str {
        match self {
            MonsterVariant::A => "MonsterA",
            MonsterVariant::B => "MonsterB",
            MonsterVariant::C => "MonsterC",
            MonsterVariant::D => "MonsterD",
        }
    }
}

impl fmt::Display for MonsterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.image_key())
    }
}

/// ELI5:
/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  On Update every state (but Finished) :                 │
/// │    1. acts       (Walking moves, the rest stand still)  │
/// │    2. counts     (tick_count += 1)                      │
/// │    3. advances   (tick_count >= ticks → next step)      │
/// ├─────────────────────────────────────────────────────────┤
/// │  Entering step n reads script[n] :                      │
/// │    show  →  Showing   (teleport)                        │
/// │    hide  →  Hidden                                      │
/// │    move  →  Walking   (face direction)                  │
/// │    idle  →  Idle                                        │
/// │    None  →  Finished  (Repeat::Once ran out)            │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone)]
enum EnemyStateMachine {
    Showing(EnemyState<sprite::Showing>),
    Hidden(EnemyState<sprite::Hidden>),
    Walking(EnemyState<sprite::Walking>),
    Idle(EnemyState<sprite::Idle>),
    Finished(EnemyState<sprite::Finished>),
}

impl From<EnemyState<sprite::Showing>> for EnemyStateMachine {
    fn from(state: EnemyState<sprite::Showing>) -> Self {
        EnemyStateMachine::Showing(state)
    }
}

impl From<EnemyState<sprite::Hidden>> for EnemyStateMachine {
    fn from(state: EnemyState<sprite::Hidden>) -> Self {
        EnemyStateMachine::Hidden(state)
    }
}

impl From<EnemyState<sprite::Walking>> for EnemyStateMachine {
    fn from(state: EnemyState<sprite::Walking>) -> Self {
        EnemyStateMachine::Walking(state)
    }
}

impl From<EnemyState<sprite::Idle>> for EnemyStateMachine {
    fn from(state: EnemyState<sprite::Idle>) -> Self {
        EnemyStateMachine::Idle(state)
    }
}

impl From<EnemyState<sprite::Finished>> for EnemyStateMachine {
    fn from(state: EnemyState<sprite::Finished>) -> Self {
        EnemyStateMachine::Finished(state)
    }
}

impl EnemyStateMachine {
    fn start(spawn: Point, script: &Script) -> Self {
        Self::enter(EnemyContext::new(spawn), script)
    }

    fn enter(context: EnemyContext, script: &Script) -> Self {
        match script.get(context.step) {
            Some(Action::Show { position, .. }) => EnemyState::show(context, *position).into(),
            Some(Action::Hide { .. }) => EnemyState::hide(context).into(),
            Some(Action::Move { direction, .. }) => EnemyState::walk(context, *direction).into(),
            Some(Action::Idle { .. }) => EnemyState::idle(context).into(),
            None => EnemyState::finish(context).into(),
        }
    }

    // CONSUMING self and returning the next state, same as every transition
    fn update(self, script: &Script) -> Self {
        use EnemyStateMachine::*;
        let counted: Self = match self {
            Showing(state) => state.count_tick().into(),
            Hidden(state) => state.count_tick().into(),
            Walking(state) => state.update().count_tick().into(),
            Idle(state) => state.count_tick().into(),
            Finished(_) => return self,
        };

        let context = *counted.context();
        let ticks = script.get(context.step).map(Action::ticks).unwrap_or(0);
        if context.tick_count >= ticks {
            Self::enter(context.next_step(script), script)
        } else {
            counted
        }
    }

    fn context(&self) -> &EnemyContext {
        use EnemyStateMachine::*;
        match self {
            Showing(state) => state.context(),
            Hidden(state) => state.context(),
            Walking(state) => state.context(),
            Idle(state) => state.context(),
            Finished(state) => state.context(),
        }
    }

    fn animation(&self) -> Animation {
        use EnemyStateMachine::*;
        match self {
            Showing(state) => state.animation(),
            Hidden(state) => state.animation(),
            Walking(state) => state.animation(),
            Idle(state) => state.animation(),
            Finished(state) => state.animation(),
        }
    }

    fn name(&self) -> &'static str {
        use EnemyStateMachine::*;
        match self {
            Showing(state) => state.name(),
            Hidden(state) => state.name(),
            Walking(state) => state.name(),
            Idle(state) => state.name(),
            Finished(state) => state.name(),
        }
    }
}

/// Enemy
/// - update() -> EnemyStateMachine::update()
/// - pushes position + animation into its display object, it never
///   draws on its own
pub struct Enemy {
    name: String,
    variant: MonsterVariant,
    state: EnemyStateMachine,
    script: Script,
    animation: Animation,
    display: Box<dyn DisplayObject>,
}

impl Enemy {
    // local collision bounds inside the 64x64 frame
    const BOUNDS_WIDTH_RATIO: f32 = 0.35;
    const BOUNDS_HEIGHT_RATIO: f32 = 0.7;

    pub fn new(
        name: String,
        variant: MonsterVariant,
        spawn: Point,
        script: Script,
        mut display: Box<dyn DisplayObject>,
    ) -> Self {
        let state = EnemyStateMachine::start(spawn, &script);
        let animation = state.animation();
        display.move_to(state.context().position);
        display.play(animation);
        Enemy {
            name,
            variant,
            state,
            script,
            animation,
            display,
        }
    }

    pub fn update(&mut self) {
        self.state = self.state.update(&self.script);
        self.display.move_to(self.position());
        let animation = self.state.animation();
        if animation != self.animation {
            self.animation = animation;
            self.display.play(animation);
        }
    }

    pub fn draw(&self, renderer: &Renderer) {
        self.display.draw(renderer);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> MonsterVariant {
        self.variant
    }

    pub fn position(&self) -> Point {
        self.state.context().position
    }

    pub fn direction(&self) -> i8 {
        self.state.context().direction
    }

    pub fn step(&self) -> usize {
        self.state.context().step
    }

    pub fn tick_count(&self) -> u32 {
        self.state.context().tick_count
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.script.get(self.step())
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, EnemyStateMachine::Finished(_))
    }

    /// World space rectangle used to test hits against the hero
    pub fn bounding_box(&self) -> Rect {
        let width = (FRAME_SIZE * Self::BOUNDS_WIDTH_RATIO).trunc();
        let left = ((FRAME_SIZE - width) / 2.0).trunc();
        let height = (FRAME_SIZE * Self::BOUNDS_HEIGHT_RATIO).trunc();
        let top = (FRAME_SIZE - height).trunc();
        let position = self.position();
        Rect::new(
            Point {
                x: (position.x - FRAME_ORIGIN_X).round() + left,
                y: (position.y - FRAME_ORIGIN_Y).round() + top,
            },
            Size { width, height },
        )
    }
}
