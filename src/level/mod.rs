pub mod tile;

use crate::engine::{DisplayObject, Point, Rect, Size};
use crate::sprite::enemy::{Enemy, MonsterVariant};
use crate::sprite::script::Script;
use anyhow::{Context, Result};
use std::fmt;
use tile::{Tile, TileCollision, TileCoord, TileKind, TILE_HEIGHT, TILE_WIDTH};

/// Level size measured in tiles
pub const WIDTH: usize = 20;
pub const HEIGHT: usize = 15;
const CELL_COUNT: usize = WIDTH * HEIGHT;

/// Lookup the level asks for per-enemy resources while decoding.
/// The browser build backs this with loaded images and the manifest.
pub trait Content {
    fn enemy_display(&self, variant: MonsterVariant) -> Result<Box<dyn DisplayObject>>;
    fn enemy_script(&self, variant: MonsterVariant) -> Option<Script>;
}

/// Reasons a level text is unusable. Load is all or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    MissingStart,
    MissingExit,
    DuplicateStart { coord: TileCoord },
    DuplicateExit { coord: TileCoord },
    UnknownTile { ch: char, coord: TileCoord },
    InvalidLength { found: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingStart => write!(f, "A level must have a starting point."),
            LoadError::MissingExit => write!(f, "A level must have an exit."),
            LoadError::DuplicateStart { coord } => {
                write!(f, "A level may only have one starting point. Second one at {}", coord)
            }
            LoadError::DuplicateExit { coord } => {
                write!(f, "A level may only have one exit. Second one at {}", coord)
            }
            LoadError::UnknownTile { ch, coord } => {
                write!(f, "Unsupported tile type character '{}' at {}", ch, coord)
            }
            LoadError::InvalidLength { found } => write!(
                f,
                "A level is {} tiles ({}x{}), found {}",
                CELL_COUNT, WIDTH, HEIGHT, found
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// A uniform grid of tiles with collections of gems and enemies.
pub struct Level {
    tiles: Vec<Vec<Tile>>,
    start: TileCoord,
    exit: TileCoord,
    gems: Vec<TileCoord>,
    enemies: Vec<Enemy>,
}

impl Level {
    /// Level files on disk are usually one row per line; the decoder
    /// wants the rows glued together.
    pub fn normalize(text: &str) -> String {
        text.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect()
    }

    /// Iterates over every character of the level text and loads its tile.
    /// Start and exit are validated once the whole grid has been read.
    pub fn decode(text: &str, content: &dyn Content) -> Result<Level> {
        let rows = Self::parse_rows(text)?;

        let mut tiles = Vec::with_capacity(HEIGHT);
        let mut start: Option<TileCoord> = None;
        let mut exit: Option<TileCoord> = None;
        let mut gems = Vec::new();
        let mut enemies = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let mut tile_row = Vec::with_capacity(WIDTH);
            for (column, ch) in line.iter().enumerate() {
                let coord = TileCoord { row, column };
                let kind = TileKind::from_char(*ch)
                    .ok_or(LoadError::UnknownTile { ch: *ch, coord })?;

                match kind {
                    TileKind::Start => {
                        if start.is_some() {
                            return Err(LoadError::DuplicateStart { coord }.into());
                        }
                        start = Some(coord);
                    }
                    TileKind::Exit => {
                        if exit.is_some() {
                            return Err(LoadError::DuplicateExit { coord }.into());
                        }
                        exit = Some(coord);
                    }
                    TileKind::Gem => gems.push(coord),
                    TileKind::Enemy(variant) => {
                        let name = format!("Monster{}", enemies.len());
                        enemies.push(Self::load_enemy(name, variant, coord, content)?);
                    }
                    _ => {}
                }

                tile_row.push(Tile::load(kind, coord));
            }
            tiles.push(tile_row);
        }

        let start = start.ok_or(LoadError::MissingStart)?;
        let exit = exit.ok_or(LoadError::MissingExit)?;

        log!(
            "Level loaded : start {} exit {} with {} gems and {} enemies",
            start,
            exit,
            gems.len(),
            enemies.len()
        );

        Ok(Level {
            tiles,
            start,
            exit,
            gems,
            enemies,
        })
    }

    // Transforming the long single line of text into rows of characters
    fn parse_rows(text: &str) -> Result<Vec<Vec<char>>> {
        let cells: Vec<char> = text.chars().collect();
        if cells.len() != CELL_COUNT {
            return Err(LoadError::InvalidLength { found: cells.len() }.into());
        }
        Ok(cells.chunks(WIDTH).map(|row| row.to_vec()).collect())
    }

    fn load_enemy(
        name: String,
        variant: MonsterVariant,
        coord: TileCoord,
        content: &dyn Content,
    ) -> Result<Enemy> {
        let spawn = Self::bounds(coord).bottom_center();
        let script = content.enemy_script(variant).unwrap_or_else(|| {
            log!("No script for {}, {} will patrol", variant, name);
            Script::patrol(spawn)
        });
        let display = content
            .enemy_display(variant)
            .with_context(|| format!("Failed to create display for {} at {}", variant, coord))?;
        Ok(Enemy::new(name, variant, spawn, script, display))
    }

    /// Gets the bounding rectangle of a tile in world space.
    pub fn bounds(coord: TileCoord) -> Rect {
        Rect::new(
            Point {
                x: coord.column as f32 * TILE_WIDTH,
                y: coord.row as f32 * TILE_HEIGHT,
            },
            Size {
                width: TILE_WIDTH,
                height: TILE_HEIGHT,
            },
        )
    }

    /// Collision mode of the tile at (x, y), in tile space. Outside the
    /// level the sides are walls and the top and bottom are open.
    pub fn collision(&self, x: i32, y: i32) -> TileCollision {
        if x < 0 || x >= WIDTH as i32 {
            return TileCollision::Impassable;
        }
        if y < 0 || y >= HEIGHT as i32 {
            return TileCollision::Passable;
        }
        self.tiles[y as usize][x as usize].collision()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(coord.row).and_then(|row| row.get(coord.column))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn start(&self) -> TileCoord {
        self.start
    }

    /// Where the hero's feet go on (re)spawn
    pub fn start_position(&self) -> Point {
        Self::bounds(self.start).bottom_center()
    }

    pub fn exit(&self) -> TileCoord {
        self.exit
    }

    pub fn exit_position(&self) -> Point {
        Self::bounds(self.exit).center()
    }

    pub fn gems(&self) -> &[TileCoord] {
        &self.gems
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Animates each enemy once, in the order they were read
    pub fn update(&mut self) {
        for enemy in self.enemies.iter_mut() {
            enemy.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::script::{Action, Repeat};
    use crate::testing::{level_text, StubContent};

    fn load_error(result: Result<Level>) -> LoadError {
        match result {
            Ok(_) => panic!("level should not load"),
            Err(err) => err
                .downcast_ref::<LoadError>()
                .cloned()
                .unwrap_or_else(|| panic!("not a LoadError : {:#}", err)),
        }
    }

    #[test]
    fn start_and_exit_match_their_grid_positions() {
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X')]);
        let level = Level::decode(&text, &StubContent::default()).unwrap();

        assert_eq!(level.start(), TileCoord { row: 14, column: 2 });
        assert_eq!(level.exit(), TileCoord { row: 3, column: 17 });
        assert_eq!(level.start_position(), Point { x: 100.0, y: 480.0 });
        assert_eq!(level.exit_position(), Point { x: 700.0, y: 112.0 });
        assert_eq!(level.tiles().count(), WIDTH * HEIGHT);
        assert_eq!(
            level.tile(TileCoord { row: 3, column: 17 }).unwrap().texture(),
            Some("Exit")
        );
    }

    #[test]
    fn missing_start_is_reported() {
        let text = level_text(&[(3, 17, 'X')]);
        let result = Level::decode(&text, &StubContent::default());
        assert_eq!(load_error(result), LoadError::MissingStart);
    }

    #[test]
    fn missing_exit_is_reported() {
        let text = level_text(&[(14, 2, '1')]);
        let err = Level::decode(&text, &StubContent::default()).err().unwrap();
        assert_eq!(err.to_string(), "A level must have an exit.");
        assert_eq!(err.downcast_ref::<LoadError>(), Some(&LoadError::MissingExit));
    }

    #[test]
    fn second_start_or_exit_is_rejected() {
        let text = level_text(&[(14, 2, '1'), (14, 3, '1'), (3, 17, 'X')]);
        assert_eq!(
            load_error(Level::decode(&text, &StubContent::default())),
            LoadError::DuplicateStart {
                coord: TileCoord { row: 14, column: 3 }
            }
        );

        let text = level_text(&[(14, 2, '1'), (3, 17, 'X'), (4, 0, 'X')]);
        assert_eq!(
            load_error(Level::decode(&text, &StubContent::default())),
            LoadError::DuplicateExit {
                coord: TileCoord { row: 4, column: 0 }
            }
        );
    }

    #[test]
    fn unknown_character_is_a_load_error() {
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X'), (7, 7, '?')]);
        assert_eq!(
            load_error(Level::decode(&text, &StubContent::default())),
            LoadError::UnknownTile {
                ch: '?',
                coord: TileCoord { row: 7, column: 7 }
            }
        );
    }

    #[test]
    fn wrong_length_is_a_load_error() {
        let mut text = level_text(&[(14, 2, '1'), (3, 17, 'X')]);
        text.pop();
        assert_eq!(
            load_error(Level::decode(&text, &StubContent::default())),
            LoadError::InvalidLength { found: 299 }
        );
    }

    #[test]
    fn normalize_joins_line_delimited_rows() {
        let flat = level_text(&[(14, 2, '1'), (3, 17, 'X')]);
        let chars: Vec<char> = flat.chars().collect();
        let lined: String = chars
            .chunks(WIDTH)
            .map(|row| row.iter().collect::<String>() + "\r\n")
            .collect();

        assert_eq!(Level::normalize(&lined), flat);
        assert!(Level::decode(&Level::normalize(&lined), &StubContent::default()).is_ok());
    }

    #[test]
    fn collision_classes_come_from_the_grid() {
        let text = level_text(&[
            (14, 2, '1'),
            (3, 17, 'X'),
            (10, 0, '#'),
            (10, 1, '-'),
            (10, 2, '~'),
            (10, 3, ':'),
        ]);
        let level = Level::decode(&text, &StubContent::default()).unwrap();

        assert_eq!(level.collision(0, 10), TileCollision::Impassable);
        assert_eq!(level.collision(1, 10), TileCollision::Platform);
        assert_eq!(level.collision(2, 10), TileCollision::Platform);
        assert_eq!(level.collision(3, 10), TileCollision::Passable);
        assert_eq!(level.collision(4, 10), TileCollision::Passable);
    }

    #[test]
    fn outside_the_grid_walls_the_sides_and_opens_top_and_bottom() {
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X')]);
        let level = Level::decode(&text, &StubContent::default()).unwrap();

        assert_eq!(level.collision(-1, 5), TileCollision::Impassable);
        assert_eq!(level.collision(WIDTH as i32, 5), TileCollision::Impassable);
        assert_eq!(level.collision(5, -1), TileCollision::Passable);
        assert_eq!(level.collision(5, HEIGHT as i32), TileCollision::Passable);
    }

    #[test]
    fn gems_and_enemies_are_collected_in_scan_order() {
        let text = level_text(&[
            (14, 2, '1'),
            (3, 17, 'X'),
            (2, 5, 'D'),
            (2, 1, 'B'),
            (9, 0, 'A'),
            (5, 5, 'G'),
            (1, 9, 'G'),
        ]);
        let level = Level::decode(&text, &StubContent::default()).unwrap();

        let variants: Vec<_> = level.enemies().iter().map(Enemy::variant).collect();
        assert_eq!(
            variants,
            vec![MonsterVariant::B, MonsterVariant::D, MonsterVariant::A]
        );
        let names: Vec<_> = level.enemies().iter().map(Enemy::name).collect();
        assert_eq!(names, vec!["Monster0", "Monster1", "Monster2"]);
        assert_eq!(
            level.gems(),
            &[
                TileCoord { row: 1, column: 9 },
                TileCoord { row: 5, column: 5 }
            ]
        );
    }

    #[test]
    fn enemies_spawn_on_their_tile_floor_and_patrol_by_default() {
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X'), (6, 4, 'C')]);
        let level = Level::decode(&text, &StubContent::default()).unwrap();

        let enemy = &level.enemies()[0];
        let spawn = Point { x: 180.0, y: 224.0 };
        assert_eq!(enemy.position(), spawn);
        assert_eq!(enemy.current_action(), Script::patrol(spawn).get(0));
    }

    #[test]
    fn enemies_use_the_script_registered_for_their_variant() {
        let script = Script::new(
            vec![
                Action::Move {
                    direction: -1,
                    ticks: 2,
                },
                Action::Idle { ticks: 2 },
            ],
            Repeat::Loop,
        )
        .unwrap();
        let content = StubContent::default().with_script(MonsterVariant::A, script);
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X'), (6, 4, 'A'), (6, 8, 'B')]);
        let mut level = Level::decode(&text, &content).unwrap();

        level.update();
        level.update();

        assert_eq!(level.enemies()[0].state_name(), "Idle");
        assert!(level.enemies()[0].position().x < 180.0);
        // B has no entry and falls back to patrol, which opens with a 1 tick show
        assert_eq!(level.enemies()[1].state_name(), "Walking");
    }

    #[test]
    fn display_failures_abort_the_load() {
        let content = StubContent::default().failing_display("no image for MonsterA");
        let text = level_text(&[(14, 2, '1'), (3, 17, 'X'), (6, 4, 'A')]);
        let err = Level::decode(&text, &content).err().unwrap();
        assert!(format!("{:#}", err).contains("no image for MonsterA"));
    }

    #[test]
    fn shipped_level_decodes() {
        let text = Level::normalize(include_str!("../../www/assets/levels/0.txt"));
        let level = Level::decode(&text, &StubContent::default()).unwrap();
        assert_eq!(level.enemies().len(), 4);
        assert!(!level.gems().is_empty());
    }
}
