use glam::Vec2;

use framewright_engine::coords::Rect;
use framewright_engine::render::{Sprite, SpriteBatchPass, Texture};

/// Frame-strip animation: `frame_count` equal frames laid out left to right.
///
/// Holds playback state only. The texture is device-dependent and passed in
/// at draw time, so playback survives device loss.
#[derive(Debug, Clone)]
pub struct AnimatedTexture {
    origin: Vec2,
    rotation: f32,
    scale: Vec2,

    frame_count: u32,
    frame: u32,
    time_per_frame: f32,
    total_elapsed: f32,
    paused: bool,

    frame_width: f32,
    frame_height: f32,
}

impl AnimatedTexture {
    pub fn new(origin: Vec2, rotation: f32, scale: f32) -> Self {
        Self {
            origin,
            rotation,
            scale: Vec2::splat(scale),
            frame_count: 0,
            frame: 0,
            time_per_frame: 0.0,
            total_elapsed: 0.0,
            paused: false,
            frame_width: 0.0,
            frame_height: 0.0,
        }
    }

    /// Sets the strip layout and playback rate, and rewinds to the first frame.
    pub fn load(&mut self, texture_size: Vec2, frame_count: u32, frames_per_second: u32) {
        self.set_layout(texture_size, frame_count, frames_per_second);
        self.reset();
    }

    /// Sets the strip layout and playback rate, keeping the playback position.
    ///
    /// Used when the texture is recreated (device restored) mid-animation.
    pub fn set_layout(&mut self, texture_size: Vec2, frame_count: u32, frames_per_second: u32) {
        self.frame_count = frame_count.max(1);
        self.time_per_frame = 1.0 / frames_per_second.max(1) as f32;
        self.frame_width = texture_size.x / self.frame_count as f32;
        self.frame_height = texture_size.y;
        self.frame %= self.frame_count;
    }

    /// Advances by `elapsed` seconds, at most one frame per call.
    pub fn update(&mut self, elapsed: f32) {
        if self.paused || self.frame_count == 0 {
            return;
        }

        self.total_elapsed += elapsed;
        if self.total_elapsed > self.time_per_frame {
            self.frame = (self.frame + 1) % self.frame_count;
            self.total_elapsed -= self.time_per_frame;
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.frame_width, self.frame_height)
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.total_elapsed = 0.0;
    }

    pub fn stop(&mut self) {
        self.paused = true;
        self.reset();
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Texel rectangle of the current frame.
    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.frame_width * self.frame as f32,
            0.0,
            self.frame_width,
            self.frame_height,
        )
    }

    pub fn sprite(&self, position: Vec2) -> Sprite {
        Sprite::at(position)
            .source(self.source_rect())
            .origin(self.origin)
            .rotation(self.rotation)
            .scale(self.scale)
    }

    pub fn draw<'t>(&self, pass: &mut SpriteBatchPass<'_, 't>, texture: &'t Texture, position: Vec2) {
        pass.draw(texture, self.sprite(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> AnimatedTexture {
        let mut anim = AnimatedTexture::new(Vec2::ZERO, 0.0, 1.0);
        anim.load(Vec2::new(256.0, 64.0), 4, 10);
        anim
    }

    #[test]
    fn advances_one_frame_once_frame_time_is_exceeded() {
        let mut anim = strip();

        anim.update(0.05);
        assert_eq!(anim.frame(), 0);

        anim.update(0.06);
        assert_eq!(anim.frame(), 1);
    }

    #[test]
    fn long_updates_still_advance_a_single_frame() {
        let mut anim = strip();
        anim.update(1.0);
        assert_eq!(anim.frame(), 1);
    }

    #[test]
    fn wraps_after_last_frame() {
        let mut anim = strip();
        for _ in 0..4 {
            anim.update(0.11);
        }
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn source_rect_selects_current_frame() {
        let mut anim = strip();
        assert_eq!(anim.source_rect(), Rect::new(0.0, 0.0, 64.0, 64.0));

        anim.update(0.2);
        anim.update(0.2);
        assert_eq!(anim.source_rect(), Rect::new(128.0, 0.0, 64.0, 64.0));
    }

    #[test]
    fn pause_stop_and_play() {
        let mut anim = strip();
        anim.update(0.2);

        anim.pause();
        anim.update(0.2);
        assert_eq!(anim.frame(), 1);

        anim.play();
        anim.update(0.2);
        assert_eq!(anim.frame(), 2);

        anim.stop();
        assert!(anim.is_paused());
        assert_eq!(anim.frame(), 0);
        anim.update(0.2);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn update_before_load_is_ignored() {
        let mut anim = AnimatedTexture::new(Vec2::ZERO, 0.0, 1.0);
        anim.update(1.0);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn relayout_keeps_playback_position() {
        let mut anim = strip();
        anim.update(0.2);
        anim.update(0.2);
        anim.pause();

        anim.set_layout(Vec2::new(256.0, 64.0), 4, 10);
        assert_eq!(anim.frame(), 2);
        assert!(anim.is_paused());

        anim.set_layout(Vec2::new(128.0, 64.0), 2, 10);
        assert_eq!(anim.frame(), 0);
        assert_eq!(anim.frame_size(), Vec2::new(64.0, 64.0));
    }

    #[test]
    fn sprite_carries_placement() {
        let mut anim = AnimatedTexture::new(Vec2::new(32.0, 32.0), 0.5, 2.0);
        anim.load(Vec2::new(256.0, 64.0), 4, 10);

        let sprite = anim.sprite(Vec2::new(400.0, 300.0));
        assert_eq!(sprite.position, Vec2::new(400.0, 300.0));
        assert_eq!(sprite.origin, Vec2::new(32.0, 32.0));
        assert_eq!(sprite.rotation, 0.5);
        assert_eq!(sprite.scale, Vec2::splat(2.0));
        assert_eq!(sprite.source, Some(Rect::new(0.0, 0.0, 64.0, 64.0)));
    }
}
