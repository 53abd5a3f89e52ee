// SPDX-License-Identifier: GPL-3.0-only

//! CPU render backend
//!
//! Filters run per pixel on RGBA8 data normalised to 0..1. Alpha passes
//! through untouched.

use super::{RenderBackend, RenderContext, Transform, TransformId};
use image::{Rgba, RgbaImage};

/// BT.601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Software renderer for all [`TransformId`]s
///
/// Individual transforms can be switched off to mirror a platform that
/// lacks them.
#[derive(Debug, Clone, Default)]
pub struct CpuBackend {
    unsupported: Vec<TransformId>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses to construct the given transforms
    pub fn without(unsupported: impl IntoIterator<Item = TransformId>) -> Self {
        Self {
            unsupported: unsupported.into_iter().collect(),
        }
    }

    pub fn supports(&self, id: TransformId) -> bool {
        !self.unsupported.contains(&id)
    }
}

impl RenderBackend for CpuBackend {
    type Context = CpuContext;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn make_transform(&self, id: TransformId) -> Option<Transform> {
        self.supports(id).then(|| Transform::new(id))
    }

    fn create_context(&self) -> CpuContext {
        CpuContext
    }
}

/// Render context for one `apply` call
#[derive(Debug, Default)]
pub struct CpuContext;

impl RenderContext for CpuContext {
    fn render(&mut self, transform: &Transform) -> Option<RgbaImage> {
        let source = transform.input()?;
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let id = transform.id();
        let output = RgbaImage::from_fn(width, height, |x, y| {
            let Rgba([r, g, b, a]) = *source.get_pixel(x, y);
            let mut r = r as f32 / 255.0;
            let mut g = g as f32 / 255.0;
            let mut b = b as f32 / 255.0;

            apply_filter_rgb(&mut r, &mut g, &mut b, id);

            Rgba([to_u8(r), to_u8(g), to_u8(b), a])
        });

        Some(output)
    }
}

#[inline]
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

#[inline]
fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Apply transform effect to RGB values in-place
#[inline]
fn apply_filter_rgb(r: &mut f32, g: &mut f32, b: &mut f32, id: TransformId) {
    match id {
        TransformId::PhotoEffectMono => {
            let gray = luminance(*r, *g, *b);
            *r = gray;
            *g = gray;
            *b = gray;
        }

        TransformId::SepiaTone => {
            let luminance = luminance(*r, *g, *b);
            *r = (luminance * 1.2 + 0.1).clamp(0.0, 1.0);
            *g = (luminance * 0.9 + 0.05).clamp(0.0, 1.0);
            *b = (luminance * 0.7).clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(id: TransformId, pixel: [u8; 4]) -> [u8; 4] {
        let mut transform = Transform::new(id);
        transform.bind_input(RgbaImage::from_pixel(1, 1, Rgba(pixel)));
        let mut context = CpuContext;
        let out = context.render(&transform).unwrap();
        out.get_pixel(0, 0).0
    }

    #[test]
    fn test_mono_produces_gray() {
        let [r, g, b, a] = render(TransformId::PhotoEffectMono, [255, 0, 0, 200]);
        assert_eq!(r, g);
        assert_eq!(g, b);
        // 0.299 * 255 = 76.2
        assert_eq!(r, 76);
        assert_eq!(a, 200);
    }

    #[test]
    fn test_mono_keeps_neutral_gray() {
        assert_eq!(
            render(TransformId::PhotoEffectMono, [128, 128, 128, 255]),
            [128, 128, 128, 255]
        );
    }

    #[test]
    fn test_sepia_tints_warm() {
        let [r, g, b, _] = render(TransformId::SepiaTone, [128, 128, 128, 255]);
        assert!(r > g, "red should dominate: {} {}", r, g);
        assert!(g > b, "blue should be weakest: {} {}", g, b);
    }

    #[test]
    fn test_sepia_black_and_white_endpoints() {
        // black lifts to (0.1, 0.05, 0)
        assert_eq!(render(TransformId::SepiaTone, [0, 0, 0, 255]), [26, 13, 0, 255]);
        // white clamps red, dims green and blue
        let [r, g, b, a] = render(TransformId::SepiaTone, [255, 255, 255, 255]);
        assert_eq!((r, g, a), (255, 242, 255));
        assert!((178..=179).contains(&b), "blue was {}", b);
    }

    #[test]
    fn test_render_without_input() {
        let transform = Transform::new(TransformId::SepiaTone);
        assert!(CpuContext.render(&transform).is_none());
    }

    #[test]
    fn test_without_disables_transform() {
        let backend = CpuBackend::without([TransformId::SepiaTone]);
        assert!(backend.make_transform(TransformId::SepiaTone).is_none());
        assert!(backend.make_transform(TransformId::PhotoEffectMono).is_some());
    }
}
