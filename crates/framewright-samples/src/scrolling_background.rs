use glam::Vec2;

use framewright_engine::render::{Sprite, SpriteBatchPass, Texture};

/// Vertically wrapping background drawn as two stacked copies of one texture.
#[derive(Debug, Clone, Default)]
pub struct ScrollingBackground {
    screen_pos: Vec2,
    origin: Vec2,
    texture_height: f32,
    screen_height: f32,
}

impl ScrollingBackground {
    /// Takes the texture dimensions; copies are centred horizontally.
    pub fn load(&mut self, texture_size: Vec2) {
        self.texture_height = texture_size.y;
        self.origin = Vec2::new(texture_size.x / 2.0, 0.0);
    }

    pub fn set_window(&mut self, width: f32, height: f32) {
        self.screen_height = height;
        self.screen_pos = Vec2::new(width / 2.0, height / 2.0);
    }

    /// Scrolls down by `delta_y` pixels, wrapping by the texture height.
    pub fn update(&mut self, delta_y: f32) {
        self.screen_pos.y += delta_y;
        if self.texture_height > 0.0 {
            self.screen_pos.y %= self.texture_height;
        }
    }

    pub fn screen_pos(&self) -> Vec2 {
        self.screen_pos
    }

    /// Positions of the copies to draw this frame.
    pub fn placements(&self) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(2);
        if self.screen_pos.y < self.screen_height {
            out.push(self.screen_pos);
        }
        out.push(self.screen_pos - Vec2::new(0.0, self.texture_height));
        out
    }

    pub fn draw<'t>(&self, pass: &mut SpriteBatchPass<'_, 't>, texture: &'t Texture) {
        for position in self.placements() {
            pass.draw(texture, Sprite::at(position).origin(self.origin));
        }
    }
}
