/// All code relating to individual enemy states lives here. A state can
/// only be reached through the constructors below :
/// - PUBLIC  : EnemyState and EnemyContext are public
/// - PRIVATE : the marker field and context mutators are private
///
/// Doesn't know about the script. The state machine in enemy.rs reads the
/// script and picks which constructor to call.
use crate::engine::Point;
use crate::sprite::{self, script::Script, SpriteState};

// physics consts
// MOVE_SPEED is px per second, ELAPSED is the fixed game time of one tick
pub const MOVE_SPEED: f32 = 64.0;
pub const ELAPSED: f32 = 17.0 / 1000.0;

#[derive(Debug, Copy, Clone, PartialEq)]
/// Shared data for :
/// - script  : step index + ticks spent in it
/// - physics : position + facing
pub struct EnemyContext {
    pub step: usize,
    pub tick_count: u32,
    pub position: Point,
    pub direction: i8,
}

#[derive(Debug, Copy, Clone)]
pub struct EnemyState<S> {
    context: EnemyContext,
    // phantom marker, only differentiates the states at compile time
    _state: S,
}

impl EnemyContext {
    pub fn new(position: Point) -> Self {
        EnemyContext {
            step: 0,
            tick_count: 0,
            position,
            direction: 1,
        }
    }

    /// Moves on to the next script step and resets the counter
    pub fn next_step(mut self, script: &Script) -> Self {
        self.step = script.next_step(self.step);
        self.tick_count = 0;
        self
    }

    fn count_tick(mut self) -> Self {
        self.tick_count += 1;
        self
    }

    fn walk(mut self) -> Self {
        self.position.x += f32::from(self.direction) * MOVE_SPEED * ELAPSED;
        self
    }

    fn teleport(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    fn face(mut self, direction: i8) -> Self {
        self.direction = direction;
        self
    }
}

/// generic methods shared between all states
impl<S: SpriteState + Copy> EnemyState<S> {
    pub fn context(&self) -> &EnemyContext {
        &self.context
    }

    pub fn animation(&self) -> sprite::Animation {
        S::animation(self.context.direction)
    }

    pub fn name(&self) -> &'static str {
        S::name()
    }

    pub fn count_tick(mut self) -> Self {
        self.context = self.context.count_tick();
        self
    }
}

impl EnemyState<sprite::Showing> {
    pub fn show(context: EnemyContext, target: Point) -> Self {
        EnemyState {
            context: context.teleport(target),
            _state: sprite::Showing,
        }
    }
}

impl EnemyState<sprite::Hidden> {
    pub fn hide(context: EnemyContext) -> Self {
        EnemyState {
            context,
            _state: sprite::Hidden,
        }
    }
}

impl EnemyState<sprite::Walking> {
    pub fn walk(context: EnemyContext, direction: i8) -> Self {
        EnemyState {
            context: context.face(direction),
            _state: sprite::Walking,
        }
    }

    pub fn update(mut self) -> Self {
        self.context = self.context.walk();
        self
    }
}

impl EnemyState<sprite::Idle> {
    pub fn idle(context: EnemyContext) -> Self {
        EnemyState {
            context,
            _state: sprite::Idle,
        }
    }
}

impl EnemyState<sprite::Finished> {
    pub fn finish(context: EnemyContext) -> Self {
        EnemyState {
            context,
            _state: sprite::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn walking_moves_one_step_of_speed_per_update() {
        let start = EnemyContext::new(Point { x: 100.0, y: 96.0 });
        let state = EnemyState::walk(start, -1).update().update();
        assert_relative_eq!(
            state.context().position.x,
            100.0 - 2.0 * MOVE_SPEED * ELAPSED,
            epsilon = 1e-4
        );
        assert_eq!(state.context().position.y, 96.0);
        assert_eq!(state.animation(), sprite::Animation::WalkLeft);
    }

    #[test]
    fn show_replaces_the_position() {
        let start = EnemyContext::new(Point { x: 5.0, y: 5.0 });
        let target = Point { x: 320.0, y: 64.0 };
        let state = EnemyState::show(start, target);
        assert_eq!(state.context().position, target);
        assert_eq!(state.name(), "Showing");
    }

    #[test]
    fn idle_keeps_the_last_facing() {
        let walked = EnemyState::walk(EnemyContext::new(Point::default()), -1);
        let idle = EnemyState::idle(*walked.context());
        assert_eq!(idle.context().direction, -1);
        assert_eq!(idle.animation(), sprite::Animation::Idle);
    }
}
