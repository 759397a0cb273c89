use crate::browser;
use crate::sprite::Animation;
use anyhow::{anyhow, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we create the closure and specify the expected type
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self);
    fn draw(&mut self, renderer: &Renderer, clock: &FrameClock);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
    clock: FrameClock,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut game = game.initialize().await?;
        let now = browser::now()?;
        let mut game_loop = GameLoop {
            last_frame: now,
            accumulated_delta: 0.0,
            clock: FrameClock::new(now),
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            // ┌──────────────── Fixed Step ─────────────────┐
            // │ real time  → accumulated_delta              │
            // │ every FRAME_SIZE ms → one game.update()     │
            // │ leftover   → carried into the next frame    │
            // └─────────────────────────────────────────────┘
            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update();
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game_loop.clock.tick(perf);
            game.draw(&renderer, &game_loop.clock);
            if let Some(callback) = f.borrow().as_ref() {
                let _ = browser::request_animation_frame(callback);
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

/// Measured frames per second, refreshed once every elapsed second
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    window_start: f64,
    frames: u32,
    measured_fps: f64,
}

impl FrameClock {
    const WINDOW_MS: f64 = 1000.0;

    pub fn new(now: f64) -> Self {
        FrameClock {
            window_start: now,
            frames: 0,
            measured_fps: 0.0,
        }
    }

    pub fn tick(&mut self, now: f64) {
        self.frames += 1;
        let elapsed = now - self.window_start;
        if elapsed >= Self::WINDOW_MS {
            self.measured_fps = f64::from(self.frames) * 1000.0 / elapsed;
            self.frames = 0;
            self.window_start = now;
        }
    }

    pub fn measured_fps(&self) -> f64 {
        self.measured_fps
    }

    pub fn label(&self) -> String {
        format!("{} fps", self.measured_fps.round() as i64)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width * 0.5,
            y: self.position.y + self.size.height * 0.5,
        }
    }

    /// Feet of anything standing in this rect
    pub fn bottom_center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width * 0.5,
            y: self.bottom(),
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        self.context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.position.x.into(),
                frame.position.y.into(),
                frame.size.width.into(),
                frame.size.height.into(),
                destination.position.x.into(),
                destination.position.y.into(),
                destination.size.width.into(),
                destination.size.height.into(),
            )
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    /// Same as draw_image but flipped around the destination's vertical axis
    pub fn draw_image_mirrored(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        self.context.save();
        let _ = self
            .context
            .translate(destination.right().into(), destination.top().into());
        let _ = self.context.scale(-1.0, 1.0);
        self.draw_image(
            image,
            frame,
            &Rect::new(Point { x: 0.0, y: 0.0 }, destination.size),
        );
        self.context.restore();
    }

    pub fn draw_entire_image(&self, image: &HtmlImageElement, position: &Point) {
        self.context
            .draw_image_with_html_image_element(image, position.x.into(), position.y.into())
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    pub fn draw_text(&self, text: &str, font: &str, color: &str, position: &Point) {
        self.context.set_font(font);
        self.context.set_fill_style_str(color);
        let _ = self
            .context
            .fill_text(text, position.x.into(), position.y.into());
    }
}

/// Render collaborator owned by anything that shows up on the canvas.
/// Game objects push their state into it; they never draw themselves.
pub trait DisplayObject {
    fn move_to(&mut self, position: Point);
    fn play(&mut self, animation: Animation);
    fn draw(&self, renderer: &Renderer);
}

pub struct Image {
    element: HtmlImageElement,
    position: Point,
}

impl Image {
    pub fn new(element: HtmlImageElement, position: Point) -> Self {
        Image { element, position }
    }

    pub fn draw(&self, renderer: &Renderer) {
        renderer.draw_entire_image(&self.element, &self.position)
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = Closure::once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = Closure::once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields channel result : Result<(), Error>
    // - second ? yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_clock_reports_zero_until_a_second_has_passed() {
        let mut clock = FrameClock::new(0.0);
        for frame in 1..30 {
            clock.tick(frame as f64 * 16.0);
        }
        assert_eq!(clock.measured_fps(), 0.0);
        assert_eq!(clock.label(), "0 fps");
    }

    #[test]
    fn frame_clock_measures_frames_over_the_window() {
        let mut clock = FrameClock::new(0.0);
        for frame in 1..60 {
            clock.tick(frame as f64 * 16.0);
        }
        // 60th frame closes the one second window
        clock.tick(1000.0);
        assert_relative_eq!(clock.measured_fps(), 60.0, epsilon = 1e-6);
        assert_eq!(clock.label(), "60 fps");
    }

    #[test]
    fn bottom_center_sits_on_the_rect_floor() {
        let rect = Rect::new(
            Point { x: 40.0, y: 64.0 },
            Size {
                width: 40.0,
                height: 32.0,
            },
        );
        assert_eq!(rect.bottom_center(), Point { x: 60.0, y: 96.0 });
        assert_eq!(rect.center(), Point { x: 60.0, y: 80.0 });
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let size = Size {
            width: 10.0,
            height: 10.0,
        };
        let a = Rect::new(Point { x: 0.0, y: 0.0 }, size);
        let b = Rect::new(Point { x: 10.0, y: 0.0 }, size);
        let c = Rect::new(Point { x: 5.0, y: 5.0 }, size);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }
}
