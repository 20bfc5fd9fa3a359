use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glam::Vec3;
use image::{Rgba, RgbaImage};

use framewright_engine::render::{RenderCtx, Texture, TextureKind};

pub const ROCKS: &str = "rocks.jpg";
pub const ROCKS_NORMAL_MAP: &str = "rocks_normalmap.png";
pub const STARFIELD: &str = "starfield.png";
pub const SHIP_STRIP: &str = "shipanimated.png";

/// Number of frames laid out horizontally in [`SHIP_STRIP`].
pub const SHIP_FRAMES: u32 = 4;

const ROCKS_SIZE: u32 = 256;
const ROCKS_CELL: u32 = 16;
const STARFIELD_SIZE: u32 = 512;
const SHIP_FRAME_SIZE: u32 = 64;

/// Where sample textures come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Files named after the asset constants inside this directory.
    Directory(PathBuf),
    /// Generated on the fly.
    Procedural,
}

impl ContentSource {
    pub fn new(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => Self::Directory(dir),
            None => Self::Procedural,
        }
    }

    /// Decodes (or generates) the named image.
    pub fn load_image(&self, name: &str) -> Result<RgbaImage> {
        match self {
            Self::Directory(dir) => load_file(&dir.join(name)),
            Self::Procedural => generate(name),
        }
    }

    pub fn texture(&self, ctx: &RenderCtx<'_>, name: &str, kind: TextureKind) -> Result<Texture> {
        let image = self.load_image(name)?;
        Texture::from_image(ctx, name, &image, kind)
            .with_context(|| format!("failed to upload `{name}`"))
    }
}

fn load_file(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to load {}", path.display()))?
        .to_rgba8();
    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

fn generate(name: &str) -> Result<RgbaImage> {
    let image = match name {
        ROCKS => rocks(),
        ROCKS_NORMAL_MAP => rocks_normal_map(),
        STARFIELD => starfield(),
        SHIP_STRIP => ship_strip(),
        other => bail!("no procedural stand-in for `{other}`"),
    };
    log::debug!("generated {name} ({}x{})", image.width(), image.height());
    Ok(image)
}

/// Integer hash of a lattice point; uniform enough for texture noise.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = x
        .wrapping_mul(0x8da6_b343)
        ^ y.wrapping_mul(0xd816_3841)
        ^ seed.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^ (h >> 15)
}

fn unit(h: u32) -> f32 {
    (h & 0xffff) as f32 / 65_535.0
}

/// Tileable value noise in `[0, 1]`, bilinear between `ROCKS_CELL` lattice points.
fn rock_height(x: u32, y: u32) -> f32 {
    let cells = ROCKS_SIZE / ROCKS_CELL;
    let (cx, cy) = (x / ROCKS_CELL, y / ROCKS_CELL);
    let fx = (x % ROCKS_CELL) as f32 / ROCKS_CELL as f32;
    let fy = (y % ROCKS_CELL) as f32 / ROCKS_CELL as f32;

    let corner = |dx: u32, dy: u32| unit(hash((cx + dx) % cells, (cy + dy) % cells, 7));
    let top = corner(0, 0) + (corner(1, 0) - corner(0, 0)) * fx;
    let bottom = corner(0, 1) + (corner(1, 1) - corner(0, 1)) * fx;
    let coarse = top + (bottom - top) * fy;

    let grain = unit(hash(x, y, 11));
    coarse * 0.85 + grain * 0.15
}

fn rocks() -> RgbaImage {
    RgbaImage::from_fn(ROCKS_SIZE, ROCKS_SIZE, |x, y| {
        let h = rock_height(x, y);
        let shade = |base: f32| ((base * (0.55 + 0.45 * h)) * 255.0) as u8;
        Rgba([shade(0.62), shade(0.52), shade(0.42), 255])
    })
}

fn rocks_normal_map() -> RgbaImage {
    const STRENGTH: f32 = 4.0;
    let wrap = |v: i64| v.rem_euclid(ROCKS_SIZE as i64) as u32;

    RgbaImage::from_fn(ROCKS_SIZE, ROCKS_SIZE, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let dx = rock_height(wrap(x + 1), wrap(y)) - rock_height(wrap(x - 1), wrap(y));
        let dy = rock_height(wrap(x), wrap(y + 1)) - rock_height(wrap(x), wrap(y - 1));
        let n = Vec3::new(-dx * STRENGTH, -dy * STRENGTH, 1.0).normalize();
        let encode = |c: f32| ((c * 0.5 + 0.5) * 255.0).round() as u8;
        Rgba([encode(n.x), encode(n.y), encode(n.z), 255])
    })
}

fn starfield() -> RgbaImage {
    RgbaImage::from_fn(STARFIELD_SIZE, STARFIELD_SIZE, |x, y| {
        let h = hash(x, y, 23);
        if h % 400 == 0 {
            let b = 160 + (h >> 24) as u8 % 96;
            Rgba([b, b, b.saturating_add(20), 255])
        } else {
            Rgba([2, 2, 10, 255])
        }
    })
}

/// A ship seen from above; each frame has a longer exhaust flame.
fn ship_strip() -> RgbaImage {
    let size = SHIP_FRAME_SIZE;
    RgbaImage::from_fn(size * SHIP_FRAMES, size, |x, y| {
        let frame = x / size;
        let (lx, ly) = ((x % size) as f32, y as f32);
        let centre = size as f32 / 2.0;
        let dx = (lx - centre).abs();

        // Hull: a triangle from the nose at the top to the wings at 3/4 height.
        let hull_bottom = size as f32 * 0.75;
        if ly >= 4.0 && ly <= hull_bottom && dx <= (ly - 4.0) * 0.45 {
            return Rgba([200, 205, 215, 255]);
        }

        // Exhaust below the hull.
        let flame = 4.0 + 3.0 * frame as f32;
        if ly > hull_bottom && ly <= hull_bottom + flame && dx <= 3.0 {
            return Rgba([255, 140, 20, 255]);
        }

        Rgba([0, 0, 0, 0])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_rocks_are_opaque_and_tileable_size() {
        let image = ContentSource::Procedural.load_image(ROCKS).unwrap();
        assert_eq!(image.dimensions(), (ROCKS_SIZE, ROCKS_SIZE));
        assert!(image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn procedural_normal_map_holds_unit_normals_facing_out() {
        let image = ContentSource::Procedural.load_image(ROCKS_NORMAL_MAP).unwrap();

        for p in image.pixels().step_by(97) {
            let decode = |c: u8| c as f32 / 255.0 * 2.0 - 1.0;
            let n = Vec3::new(decode(p[0]), decode(p[1]), decode(p[2]));
            assert!((n.length() - 1.0).abs() < 0.02, "normal {n} is not unit length");
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn ship_strip_has_one_square_frame_per_animation_step() {
        let image = ContentSource::Procedural.load_image(SHIP_STRIP).unwrap();
        assert_eq!(image.width(), image.height() * SHIP_FRAMES);

        // Later frames have a longer flame.
        let flame_len = |frame: u32| {
            let x = frame * SHIP_FRAME_SIZE + SHIP_FRAME_SIZE / 2;
            (0..image.height())
                .filter(|&y| image.get_pixel(x, y)[0] == 255)
                .count()
        };
        assert!(flame_len(3) > flame_len(0));
    }

    #[test]
    fn starfield_has_some_stars() {
        let image = ContentSource::Procedural.load_image(STARFIELD).unwrap();
        let stars = image.pixels().filter(|p| p[0] > 100).count();
        assert!(stars > 0);
        assert!(stars < (STARFIELD_SIZE * STARFIELD_SIZE / 100) as usize);
    }

    #[test]
    fn unknown_procedural_asset_is_an_error() {
        let err = ContentSource::Procedural.load_image("cat.png").unwrap_err();
        assert!(err.to_string().contains("cat.png"));
    }

    #[test]
    fn directory_source_decodes_files() {
        let dir = tempfile::tempdir().unwrap();
        let stars = RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255]));
        stars.save(dir.path().join(STARFIELD)).unwrap();

        let source = ContentSource::new(Some(dir.path().to_path_buf()));
        let loaded = source.load_image(STARFIELD).unwrap();

        assert_eq!(loaded.dimensions(), (8, 4));
        assert_eq!(loaded.get_pixel(7, 3), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = ContentSource::Directory(dir.path().to_path_buf());

        let err = source.load_image(ROCKS).unwrap_err();
        assert!(format!("{err:#}").contains(ROCKS));
    }
}
