//! Test doubles for the level and enemy collaborators.
use crate::engine::{DisplayObject, Point, Renderer};
use crate::level::{Content, HEIGHT, WIDTH};
use crate::sprite::enemy::MonsterVariant;
use crate::sprite::script::Script;
use crate::sprite::Animation;
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    MoveTo(Point),
    Play(Animation),
}

/// Clones share one call log, so a test can keep a handle after boxing
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    calls: Rc<RefCell<Vec<DisplayCall>>>,
}

impl RecordingDisplay {
    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.borrow().clone()
    }
}

impl DisplayObject for RecordingDisplay {
    fn move_to(&mut self, position: Point) {
        self.calls.borrow_mut().push(DisplayCall::MoveTo(position));
    }

    fn play(&mut self, animation: Animation) {
        self.calls.borrow_mut().push(DisplayCall::Play(animation));
    }

    fn draw(&self, _renderer: &Renderer) {}
}

#[derive(Default)]
pub struct StubContent {
    scripts: HashMap<MonsterVariant, Script>,
    display_error: Option<String>,
}

impl StubContent {
    pub fn with_script(mut self, variant: MonsterVariant, script: Script) -> Self {
        self.scripts.insert(variant, script);
        self
    }

    pub fn failing_display(mut self, message: &str) -> Self {
        self.display_error = Some(message.to_string());
        self
    }
}

impl Content for StubContent {
    fn enemy_display(&self, _variant: MonsterVariant) -> Result<Box<dyn DisplayObject>> {
        match &self.display_error {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(Box::new(RecordingDisplay::default())),
        }
    }

    fn enemy_script(&self, variant: MonsterVariant) -> Option<Script> {
        self.scripts.get(&variant).cloned()
    }
}

/// Blank 300 character level with `cells` (row, column, char) stamped in
pub fn level_text(cells: &[(usize, usize, char)]) -> String {
    let mut grid = vec!['.'; WIDTH * HEIGHT];
    for (row, column, ch) in cells {
        grid[row * WIDTH + column] = *ch;
    }
    grid.into_iter().collect()
}
