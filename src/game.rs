use crate::browser;
use crate::engine::{self, DisplayObject, FrameClock, Game, Image, Point, Rect, Renderer, Size};
use crate::level::tile::{self, TILE_HEIGHT, TILE_WIDTH};
use crate::level::{self, Content, Level};
use crate::sprite::enemy::MonsterVariant;
use crate::sprite::script::Script;
use crate::sprite::{Animation, FRAME_ORIGIN_X, FRAME_ORIGIN_Y, FRAME_SIZE};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::join;
use serde::Deserialize;
use std::collections::HashMap;
use web_sys::HtmlImageElement;

// Asset locations, relative to index.html
mod assets {
    pub const MANIFEST_PATH: &str = "assets/manifest.json";
    pub const TILE_DIR: &str = "assets/Tiles/";
    pub const SPRITE_DIR: &str = "assets/Sprites/";
    pub const BACKGROUND_DIR: &str = "assets/Backgrounds/";
    pub const GEM_KEY: &str = "Gem";
}

// Background is 3 stacked layers, each drawn in 3 versions
const BACKGROUND_LAYERS: usize = 3;
const BACKGROUND_VARIANTS: usize = 3;

const GAME_WIDTH: f32 = level::WIDTH as f32 * TILE_WIDTH;
const GAME_HEIGHT: f32 = level::HEIGHT as f32 * TILE_HEIGHT;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │   lib.rs    │  start   │  engine.rs  │  update  │   game.rs   │    │
/// │    │  main_js()  ├─────────►│  GameLoop   ├─────────►│  Platformer │    │
/// │    └─────────────┘          └─────────────┘          └──────┬──────┘    │
/// │                                                             │           │
/// │                                                      ┌──────┴──────┐    │
/// │                                                      │   Scene     │    │
/// │                                                      │   Level     │    │
/// │                                                      │   update()  │    │
/// │                                                      └──────┬──────┘    │
/// │                                                             │           │
/// │                                                      ┌──────┴──────┐    │
/// │                                                      │  Enemy x N  │    │
/// │                                                      │  update()   │    │
/// │                                                      └─────────────┘    │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │  1. initialize() : manifest → images + level text → Level::decode       │
/// │  2. update()     : every fixed step, each enemy advances its script     │
/// │  3. draw()       : background → tiles → gems → enemies → fps label      │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum Platformer {
    /// Initialize state while resources are being loaded
    /// Transition to `Loaded` once initialization is complete
    Loading,

    /// Active game state with the first level decoded
    Loaded(Scene),
}

impl Platformer {
    pub fn new() -> Self {
        Platformer::Loading
    }

    async fn load_manifest() -> Result<Manifest> {
        browser::fetch_json::<Manifest>(assets::MANIFEST_PATH)
            .await
            .with_context(|| format!("Failed to load manifest from : {}", assets::MANIFEST_PATH))
    }

    async fn load_level_text(path: &str) -> Result<String> {
        browser::fetch_text(path)
            .await
            .with_context(|| format!("Failed to load level from : {}", path))
    }
}

impl Default for Platformer {
    fn default() -> Self {
        Platformer::new()
    }
}

#[async_trait(?Send)]
impl Game for Platformer {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Platformer::Loading => {
                let manifest = Self::load_manifest().await?;
                let level_path = manifest
                    .levels
                    .first()
                    .ok_or_else(|| anyhow!("Manifest lists no levels"))?
                    .clone();

                // images and level text are independent, fetch them together
                let (content, level_text) = join!(
                    ContentManager::load(manifest.scripts),
                    Self::load_level_text(&level_path),
                );
                let content = content?;
                let level_text = Level::normalize(&level_text?);

                let level = Level::decode(&level_text, &content)
                    .with_context(|| format!("Level {} is unusable", level_path))?;
                let scene = Scene::new(level, content, browser::random_index(BACKGROUND_VARIANTS)?)?;
                Ok(Box::new(Platformer::Loaded(scene)))
            }
            Platformer::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self) {
        if let Platformer::Loaded(scene) = self {
            scene.update();
        }
    }

    fn draw(&mut self, renderer: &Renderer, clock: &FrameClock) {
        if let Platformer::Loaded(scene) = self {
            scene.draw(renderer, clock);
        }
    }
}

/// `assets/manifest.json`
#[derive(Debug, Deserialize)]
struct Manifest {
    levels: Vec<String>,
    #[serde(default)]
    scripts: HashMap<MonsterVariant, Script>,
}

/// Loaded images plus the per-variant scripts, looked up by key
struct ContentManager {
    tiles: HashMap<String, HtmlImageElement>,
    monsters: HashMap<String, HtmlImageElement>,
    backgrounds: HashMap<String, HtmlImageElement>,
    scripts: HashMap<MonsterVariant, Script>,
}

impl ContentManager {
    async fn load(scripts: HashMap<MonsterVariant, Script>) -> Result<Self> {
        let mut tile_keys = tile::texture_keys();
        tile_keys.push(assets::GEM_KEY.to_string());
        let monster_keys = MonsterVariant::ALL
            .iter()
            .map(|variant| variant.image_key().to_string())
            .collect();
        let background_keys = (0..BACKGROUND_LAYERS)
            .flat_map(|layer| {
                (0..BACKGROUND_VARIANTS).map(move |variant| background_key(layer, variant))
            })
            .collect();

        let (tiles, monsters, backgrounds) = join!(
            load_images(assets::TILE_DIR, tile_keys),
            load_images(assets::SPRITE_DIR, monster_keys),
            load_images(assets::BACKGROUND_DIR, background_keys),
        );

        Ok(ContentManager {
            tiles: tiles?,
            monsters: monsters?,
            backgrounds: backgrounds?,
            scripts,
        })
    }

    fn image(images: &HashMap<String, HtmlImageElement>, key: &str) -> Result<HtmlImageElement> {
        images
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("No image loaded for key : {}", key))
    }
}

impl Content for ContentManager {
    fn enemy_display(&self, variant: MonsterVariant) -> Result<Box<dyn DisplayObject>> {
        let image = Self::image(&self.monsters, variant.image_key())?;
        Ok(Box::new(SpriteDisplay::new(image)))
    }

    fn enemy_script(&self, variant: MonsterVariant) -> Option<Script> {
        self.scripts.get(&variant).cloned()
    }
}

fn background_key(layer: usize, variant: usize) -> String {
    format!("Layer{}_{}", layer, variant)
}

async fn load_images(dir: &str, keys: Vec<String>) -> Result<HashMap<String, HtmlImageElement>> {
    let loads = keys.into_iter().map(|key| async move {
        let path = format!("{}{}.png", dir, key);
        let image = engine::load_image(&path)
            .await
            .with_context(|| format!("Failed to load image resource from : {}", path))?;
        Ok::<_, anyhow::Error>((key, image))
    });
    Ok(try_join_all(loads).await?.into_iter().collect())
}

/// Draws one still frame of a monster strip where the enemy says it is
struct SpriteDisplay {
    image: HtmlImageElement,
    position: Point,
    animation: Animation,
}

impl SpriteDisplay {
    fn new(image: HtmlImageElement) -> Self {
        SpriteDisplay {
            image,
            position: Point::default(),
            animation: Animation::Idle,
        }
    }
}

impl DisplayObject for SpriteDisplay {
    fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    fn play(&mut self, animation: Animation) {
        self.animation = animation;
    }

    fn draw(&self, renderer: &Renderer) {
        let size = Size {
            width: FRAME_SIZE,
            height: FRAME_SIZE,
        };
        let frame = Rect::new(
            Point {
                x: f32::from(self.animation.first_frame()) * FRAME_SIZE,
                y: 0.0,
            },
            size,
        );
        let destination = Rect::new(
            Point {
                x: self.position.x - FRAME_ORIGIN_X,
                y: self.position.y - FRAME_ORIGIN_Y,
            },
            size,
        );
        if self.animation.is_mirrored() {
            renderer.draw_image_mirrored(&self.image, &frame, &destination);
        } else {
            renderer.draw_image(&self.image, &frame, &destination);
        }
    }
}

/// One running level with everything needed to draw it. Dropping the
/// scene releases the level and its enemies.
pub struct Scene {
    level: Level,
    background: Vec<Image>,
    tiles: Vec<Image>,
    gems: Vec<Image>,
}

impl Scene {
    fn new(level: Level, content: ContentManager, background_variant: usize) -> Result<Self> {
        let origin = Point { x: 0.0, y: 0.0 };
        let background = (0..BACKGROUND_LAYERS)
            .map(|layer| {
                let key = background_key(layer, background_variant);
                ContentManager::image(&content.backgrounds, &key)
                    .map(|element| Image::new(element, origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let tiles = level
            .tiles()
            .filter_map(|tile| tile.texture().map(|key| (key, tile.coord())))
            .map(|(key, coord)| {
                ContentManager::image(&content.tiles, key)
                    .map(|element| Image::new(element, Level::bounds(coord).position))
            })
            .collect::<Result<Vec<_>>>()?;

        let gems = level
            .gems()
            .iter()
            .map(|coord| {
                ContentManager::image(&content.tiles, assets::GEM_KEY)
                    .map(|element| Image::new(element, Level::bounds(*coord).position))
            })
            .collect::<Result<Vec<_>>>()?;

        log!(
            "Scene ready : background {} with {} tile images",
            background_variant,
            tiles.len()
        );

        Ok(Scene {
            level,
            background,
            tiles,
            gems,
        })
    }

    fn update(&mut self) {
        self.level.update();
    }

    fn draw(&self, renderer: &Renderer, clock: &FrameClock) {
        renderer.clear(&Rect::new(
            Point { x: 0.0, y: 0.0 },
            Size {
                width: GAME_WIDTH,
                height: GAME_HEIGHT,
            },
        ));
        // Draw order matters : background -> foreground
        self.background.iter().for_each(|layer| layer.draw(renderer));
        self.tiles.iter().for_each(|tile| tile.draw(renderer));
        self.gems.iter().for_each(|gem| gem.draw(renderer));
        self.level
            .enemies()
            .iter()
            .for_each(|enemy| enemy.draw(renderer));
        renderer.draw_text(
            &clock.label(),
            "bold 14px Arial",
            "#000",
            &Point {
                x: GAME_WIDTH - 50.0,
                y: 20.0,
            },
        );
    }
}
