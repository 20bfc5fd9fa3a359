/// Output surface size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the size with both dimensions raised to at least 1.
    ///
    /// Swap chains cannot be zero-sized; minimized windows report 0×0.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }

    #[inline]
    pub fn viewport(self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }
}

/// Viewport size in pixels.
///
/// Renderers treat this as the coordinate basis for converting pixel positions
/// to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_raises_zero_dimensions() {
        assert_eq!(OutputSize::new(0, 0).clamped(), OutputSize::new(1, 1));
        assert_eq!(OutputSize::new(800, 0).clamped(), OutputSize::new(800, 1));
        assert_eq!(OutputSize::new(800, 600).clamped(), OutputSize::new(800, 600));
    }

    #[test]
    fn viewport_from_output_size() {
        let vp = OutputSize::new(800, 600).viewport();
        assert_eq!(vp, Viewport::new(800.0, 600.0));
        assert!(vp.is_valid());
        assert!(!Viewport::default().is_valid());
    }
}
