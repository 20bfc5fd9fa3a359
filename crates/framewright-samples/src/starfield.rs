use anyhow::{Context, Result};
use glam::Vec2;

use framewright_engine::core::Scene;
use framewright_engine::device::{DeviceResources, Gpu, GpuFrame};
use framewright_engine::render::{SpriteBatch, Texture, TextureKind};
use framewright_engine::time::StepTimer;

use crate::animated_texture::AnimatedTexture;
use crate::content::{self, ContentSource};
use crate::scrolling_background::ScrollingBackground;

/// Background scroll speed in pixels per second.
const SCROLL_SPEED: f32 = 500.0;
const SHIP_FPS: u32 = 20;
const SHIP_SCALE: f32 = 2.0;

/// Scrolling starfield with an animated ship in the middle of the screen.
pub struct StarfieldScene {
    content: ContentSource,
    resources: Option<StarfieldResources>,
    ship: AnimatedTexture,
    ship_pos: Vec2,
    background: ScrollingBackground,
}

struct StarfieldResources {
    batch: SpriteBatch,
    stars: Texture,
    ship: Texture,
}

impl StarfieldScene {
    pub fn new(content: ContentSource) -> Self {
        Self {
            content,
            resources: None,
            ship: AnimatedTexture::new(Vec2::ZERO, 0.0, SHIP_SCALE),
            ship_pos: Vec2::ZERO,
            background: ScrollingBackground::default(),
        }
    }

    /// Fits playback state to freshly created textures. Animation frame and
    /// scroll position carry over from before a device loss.
    fn apply_texture_layout(&mut self, stars_size: Vec2, ship_size: Vec2) {
        self.background.load(stars_size);
        self.ship.set_layout(ship_size, content::SHIP_FRAMES, SHIP_FPS);
        self.ship.set_origin(self.ship.frame_size() / 2.0);
    }
}

impl Scene<Gpu> for StarfieldScene {
    fn create_device_dependent_resources(&mut self, gpu: &Gpu) -> Result<()> {
        let ctx = gpu.render_ctx()?;

        let stars = self
            .content
            .texture(&ctx, content::STARFIELD, TextureKind::Color)?;
        let ship = self
            .content
            .texture(&ctx, content::SHIP_STRIP, TextureKind::Color)?;

        self.apply_texture_layout(stars.size(), ship.size());

        self.resources = Some(StarfieldResources {
            batch: SpriteBatch::new(&ctx),
            stars,
            ship,
        });
        Ok(())
    }

    fn create_window_size_dependent_resources(&mut self, gpu: &Gpu) -> Result<()> {
        let viewport = gpu.viewport();
        self.ship_pos = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
        self.background.set_window(viewport.width, viewport.height);
        Ok(())
    }

    fn release_device_dependent_resources(&mut self) {
        self.resources = None;
    }

    fn update(&mut self, timer: &StepTimer) {
        let elapsed = timer.elapsed_seconds() as f32;
        self.ship.update(elapsed);
        self.background.update(elapsed * SCROLL_SPEED);
    }

    fn render(&mut self, gpu: &Gpu, frame: &mut GpuFrame) -> Result<()> {
        let res = self
            .resources
            .as_mut()
            .context("starfield rendered without device resources")?;
        let ctx = gpu.render_ctx()?;

        let mut pass = res.batch.begin();
        self.background.draw(&mut pass, &res.stars);
        self.ship.draw(&mut pass, &res.ship, self.ship_pos);
        pass.end(&ctx, &mut frame.target());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use framewright_engine::time::TimerConfig;

    use super::*;

    const STARS: Vec2 = Vec2::new(512.0, 512.0);
    const SHIP: Vec2 = Vec2::new(256.0, 64.0);

    #[test]
    fn update_scrolls_and_animates_without_device() {
        let mut scene = StarfieldScene::new(ContentSource::Procedural);
        scene.apply_texture_layout(STARS, SHIP);
        scene.background.set_window(800.0, 600.0);

        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());
        timer.tick_at(t0 + Duration::from_millis(60), |t| scene.update(t));

        // 300 + 0.06 s * 500 px/s
        assert!((scene.background.screen_pos().y - 330.0).abs() < 1e-3);
        assert_eq!(scene.ship.frame(), 1);
    }

    #[test]
    fn restored_textures_keep_animation_and_scroll() {
        let mut scene = StarfieldScene::new(ContentSource::Procedural);
        scene.apply_texture_layout(STARS, SHIP);
        scene.background.set_window(800.0, 600.0);

        let t0 = Instant::now();
        let mut timer = StepTimer::starting_at(t0, TimerConfig::default());
        for i in 1..=3 {
            timer.tick_at(t0 + Duration::from_millis(60 * i), |t| scene.update(t));
        }
        let frame = scene.ship.frame();
        let scroll = scene.background.screen_pos();
        assert_eq!(frame, 3);

        // Device lost and restored: textures come back with the same layout.
        scene.release_device_dependent_resources();
        scene.apply_texture_layout(STARS, SHIP);

        assert_eq!(scene.ship.frame(), frame);
        assert_eq!(scene.background.screen_pos(), scroll);
        assert_eq!(scene.ship.frame_size(), Vec2::new(64.0, 64.0));
    }
}
