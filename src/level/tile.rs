use crate::sprite::enemy::MonsterVariant;
use std::fmt;

/// Size of a tile in world space (px)
pub const TILE_WIDTH: f32 = 40.0;
pub const TILE_HEIGHT: f32 = 32.0;

/// How many pictures each block family has to pick from
const BLOCK_A_VARIETY: usize = 7;
const BLOCK_B_VARIETY: usize = 2;

/// Controls the collision detection and response behavior of a tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileCollision {
    /// Does not hinder movement at all
    Passable,
    /// Completely solid
    Impassable,
    /// Solid from above only, you can jump up through it
    Platform,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub row: usize,
    pub column: usize,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row {}, column {})", self.row, self.column)
    }
}

/// What a level character stands for
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileKind {
    Blank,
    Exit,
    Gem,
    Platform,
    Enemy(MonsterVariant),
    PlatformBlock,
    PassableBlock,
    Start,
    ImpassableBlock,
}

impl TileKind {
    /// ┌──────┬─────────────────┬────────────┐
    /// │ '.'  │ Blank           │ Passable   │
    /// │ 'X'  │ Exit            │ Passable   │
    /// │ 'G'  │ Gem             │ Passable   │
    /// │ '-'  │ Platform        │ Platform   │
    /// │ 'A'+ │ Enemy           │ Passable   │
    /// │ '~'  │ PlatformBlock   │ Platform   │
    /// │ ':'  │ PassableBlock   │ Passable   │
    /// │ '1'  │ Start           │ Passable   │
    /// │ '#'  │ ImpassableBlock │ Impassable │
    /// └──────┴─────────────────┴────────────┘
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(TileKind::Blank),
            'X' => Some(TileKind::Exit),
            'G' => Some(TileKind::Gem),
            '-' => Some(TileKind::Platform),
            '~' => Some(TileKind::PlatformBlock),
            ':' => Some(TileKind::PassableBlock),
            '1' => Some(TileKind::Start),
            '#' => Some(TileKind::ImpassableBlock),
            other => MonsterVariant::from_char(other).map(TileKind::Enemy),
        }
    }
}

/// Stores the appearance and collision behavior of a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    texture: Option<String>,
    collision: TileCollision,
    coord: TileCoord,
}

impl Tile {
    pub fn new(texture: Option<String>, collision: TileCollision, coord: TileCoord) -> Self {
        Tile {
            texture,
            collision,
            coord,
        }
    }

    /// Builds the tile for `kind` at `coord`. Same input, same tile : block
    /// variety is picked from the position, not from a random source.
    pub fn load(kind: TileKind, coord: TileCoord) -> Self {
        match kind {
            TileKind::Blank
            | TileKind::Gem
            | TileKind::Enemy(_)
            | TileKind::Start => Tile::new(None, TileCollision::Passable, coord),
            TileKind::Exit => Self::named("Exit", TileCollision::Passable, coord),
            TileKind::Platform => Self::named("Platform", TileCollision::Platform, coord),
            TileKind::PlatformBlock => {
                Self::variety("BlockB", BLOCK_B_VARIETY, TileCollision::Platform, coord)
            }
            TileKind::PassableBlock => {
                Self::variety("BlockB", BLOCK_B_VARIETY, TileCollision::Passable, coord)
            }
            TileKind::ImpassableBlock => {
                Self::variety("BlockA", BLOCK_A_VARIETY, TileCollision::Impassable, coord)
            }
        }
    }

    fn named(name: &str, collision: TileCollision, coord: TileCoord) -> Self {
        Tile::new(Some(name.to_string()), collision, coord)
    }

    fn variety(base: &str, count: usize, collision: TileCollision, coord: TileCoord) -> Self {
        let index = (coord.row * 7 + coord.column * 3) % count;
        Tile::new(Some(format!("{}{}", base, index)), collision, coord)
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    pub fn collision(&self) -> TileCollision {
        self.collision
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }
}

/// Every texture name `Tile::load` can hand out, for preloading
pub fn texture_keys() -> Vec<String> {
    let mut keys = vec!["Exit".to_string(), "Platform".to_string()];
    keys.extend((0..BLOCK_A_VARIETY).map(|index| format!("BlockA{}", index)));
    keys.extend((0..BLOCK_B_VARIETY).map(|index| format!("BlockB{}", index)));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, column: usize) -> TileCoord {
        TileCoord { row, column }
    }

    fn tile_for(ch: char) -> Tile {
        Tile::load(TileKind::from_char(ch).unwrap(), at(3, 4))
    }

    #[test]
    fn collision_follows_the_character_table() {
        assert_eq!(tile_for('#').collision(), TileCollision::Impassable);
        assert_eq!(tile_for('-').collision(), TileCollision::Platform);
        assert_eq!(tile_for('~').collision(), TileCollision::Platform);
        assert_eq!(tile_for('.').collision(), TileCollision::Passable);
        assert_eq!(tile_for(':').collision(), TileCollision::Passable);
        assert_eq!(tile_for('X').collision(), TileCollision::Passable);
        assert_eq!(tile_for('1').collision(), TileCollision::Passable);
        assert_eq!(tile_for('G').collision(), TileCollision::Passable);
        assert_eq!(tile_for('C').collision(), TileCollision::Passable);
    }

    #[test]
    fn textures_name_the_tile_family() {
        assert_eq!(tile_for('.').texture(), None);
        assert_eq!(tile_for('X').texture(), Some("Exit"));
        assert_eq!(tile_for('-').texture(), Some("Platform"));
        assert!(tile_for('#').texture().unwrap().starts_with("BlockA"));
        assert!(tile_for('~').texture().unwrap().starts_with("BlockB"));
    }

    #[test]
    fn variety_is_a_function_of_position() {
        let first = Tile::load(TileKind::ImpassableBlock, at(2, 9));
        let again = Tile::load(TileKind::ImpassableBlock, at(2, 9));
        assert_eq!(first, again);

        let keys = texture_keys();
        for row in 0..15 {
            for column in 0..20 {
                let tile = Tile::load(TileKind::ImpassableBlock, at(row, column));
                assert!(keys.iter().any(|key| Some(key.as_str()) == tile.texture()));
            }
        }
    }

    #[test]
    fn unknown_characters_have_no_kind() {
        assert_eq!(TileKind::from_char('?'), None);
        assert_eq!(TileKind::from_char('E'), None);
        assert_eq!(
            TileKind::from_char('B'),
            Some(TileKind::Enemy(MonsterVariant::B))
        );
    }
}
