// SPDX-License-Identifier: GPL-3.0-only

//! Photo filter pipeline
//!
//! A [`FilterKind`] resolves to a [`TransformId`]; the [`RenderBackend`]
//! constructs the transform, the input image is bound as its source, and a
//! render context created for the call evaluates it. The result is wrapped
//! in a new [`Bitmap`] carrying the input's scale and orientation.

pub mod cpu;

pub use cpu::CpuBackend;

use crate::bitmap::Bitmap;
use crate::errors::{FilterError, FilterResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Filters offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Sepia tone (warm brownish tint)
    #[default]
    Sepia,
    /// Black & white
    Mono,
}

impl FilterKind {
    /// All filters, in menu order
    pub const ALL: [FilterKind; 2] = [FilterKind::Sepia, FilterKind::Mono];

    /// The named transform implementing this filter
    pub fn transform(self) -> TransformId {
        match self {
            FilterKind::Sepia => TransformId::SepiaTone,
            FilterKind::Mono => TransformId::PhotoEffectMono,
        }
    }

    /// Get display name for the filter
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterKind::Sepia => "Sepia",
            FilterKind::Mono => "Mono",
        }
    }

    /// Short lowercase name used on the command line and in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Sepia => "sepia",
            FilterKind::Mono => "mono",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = FilterKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown filter '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Identifier of a transform a render backend may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformId {
    #[serde(rename = "sepia-tone")]
    SepiaTone,
    #[serde(rename = "photo-effect-mono")]
    PhotoEffectMono,
}

impl TransformId {
    pub const ALL: [TransformId; 2] = [TransformId::SepiaTone, TransformId::PhotoEffectMono];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformId::SepiaTone => "sepia-tone",
            TransformId::PhotoEffectMono => "photo-effect-mono",
        }
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constructed transform with an optional bound source image
#[derive(Debug, Clone)]
pub struct Transform {
    id: TransformId,
    input: Option<RgbaImage>,
}

impl Transform {
    pub fn new(id: TransformId) -> Self {
        Self { id, input: None }
    }

    pub fn id(&self) -> TransformId {
        self.id
    }

    /// Bind the source image, replacing any previous one
    pub fn bind_input(&mut self, image: RgbaImage) {
        self.input = Some(image);
    }

    pub fn input(&self) -> Option<&RgbaImage> {
        self.input.as_ref()
    }
}

/// Image-transform subsystem the engine renders through
pub trait RenderBackend: Send + Sync {
    /// Per-call evaluation state
    type Context: RenderContext;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Construct a transform, or `None` when the backend cannot provide it
    fn make_transform(&self, id: TransformId) -> Option<Transform>;

    /// Acquire a fresh render context
    ///
    /// The engine drops the context before `apply` returns.
    fn create_context(&self) -> Self::Context;
}

/// Evaluates transforms into concrete images
pub trait RenderContext {
    /// Render the transform's output, `None` when nothing can be produced
    fn render(&mut self, transform: &Transform) -> Option<RgbaImage>;
}

/// Applies filters to bitmaps through a render backend
#[derive(Debug, Clone, Default)]
pub struct FilterEngine<B: RenderBackend = CpuBackend> {
    backend: B,
}

impl<B: RenderBackend> FilterEngine<B> {
    /// Create an engine rendering through `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Whether the backend can construct the transform for `filter`
    pub fn is_available(&self, filter: FilterKind) -> bool {
        self.backend.make_transform(filter.transform()).is_some()
    }

    /// Apply `filter` to `image` and return a new bitmap
    ///
    /// The input is never modified. The output keeps the input's dimensions,
    /// scale and orientation.
    ///
    /// # Errors
    ///
    /// [`FilterError::FilterUnavailable`] if the backend lacks the transform,
    /// [`FilterError::RenderFailed`] for empty or malformed input or when the
    /// backend produces no image.
    pub fn apply(&self, image: &Bitmap, filter: FilterKind) -> FilterResult<Bitmap> {
        let id = filter.transform();

        let mut transform = self.backend.make_transform(id).ok_or_else(|| {
            warn!(transform = %id, backend = self.backend.name(), "Transform not supported");
            FilterError::FilterUnavailable(id.as_str())
        })?;

        let source = image.to_rgba_image().ok_or_else(|| {
            let reason = if image.is_empty() {
                format!("empty bitmap ({}x{})", image.width, image.height)
            } else {
                format!(
                    "malformed bitmap: {} bytes for {}x{}",
                    image.data.len(),
                    image.width,
                    image.height
                )
            };
            warn!(transform = %id, %reason, "Rejecting filter input");
            FilterError::RenderFailed(reason)
        })?;

        transform.bind_input(source);

        let output = {
            let mut context = self.backend.create_context();
            context.render(&transform)
        };

        let output = output.ok_or_else(|| {
            warn!(transform = %id, backend = self.backend.name(), "Transform produced no output");
            FilterError::RenderFailed(format!("{} produced no output", id))
        })?;

        if output.dimensions() != (image.width, image.height) {
            let (w, h) = output.dimensions();
            return Err(FilterError::RenderFailed(format!(
                "{} produced {}x{} output for {}x{} input",
                id, w, h, image.width, image.height
            )));
        }

        debug!(
            filter = %filter,
            transform = %id,
            width = image.width,
            height = image.height,
            scale = image.scale,
            orientation = ?image.orientation,
            "Filter applied"
        );

        Ok(Bitmap::from_rgba(output, image.scale, image.orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Orientation;

    /// Backend that constructs every transform but never renders
    struct BlankBackend;

    struct BlankContext;

    impl RenderContext for BlankContext {
        fn render(&mut self, _transform: &Transform) -> Option<RgbaImage> {
            None
        }
    }

    impl RenderBackend for BlankBackend {
        type Context = BlankContext;

        fn name(&self) -> &'static str {
            "blank"
        }

        fn make_transform(&self, id: TransformId) -> Option<Transform> {
            Some(Transform::new(id))
        }

        fn create_context(&self) -> BlankContext {
            BlankContext
        }
    }

    #[test]
    fn test_filter_kind_maps_to_transform() {
        assert_eq!(FilterKind::Sepia.transform(), TransformId::SepiaTone);
        assert_eq!(FilterKind::Mono.transform(), TransformId::PhotoEffectMono);
    }

    #[test]
    fn test_filter_kind_from_str() {
        assert_eq!("sepia".parse::<FilterKind>(), Ok(FilterKind::Sepia));
        assert_eq!(" MONO ".parse::<FilterKind>(), Ok(FilterKind::Mono));
        assert!("vivid".parse::<FilterKind>().is_err());
    }

    #[test]
    fn test_transform_id_serde_names() {
        let json = serde_json::to_string(&TransformId::PhotoEffectMono).unwrap();
        assert_eq!(json, "\"photo-effect-mono\"");
        let kind: FilterKind = serde_json::from_str("\"sepia\"").unwrap();
        assert_eq!(kind, FilterKind::Sepia);
    }

    #[test]
    fn test_no_output_is_render_failed() {
        let engine = FilterEngine::new(BlankBackend);
        let input = Bitmap::filled(4, 4, [200, 100, 50, 255]);
        let result = engine.apply(&input, FilterKind::Sepia);
        assert!(matches!(result, Err(FilterError::RenderFailed(_))));
    }

    #[test]
    fn test_unsupported_transform_is_unavailable() {
        let engine = FilterEngine::new(CpuBackend::without([TransformId::PhotoEffectMono]));
        let input = Bitmap::filled(4, 4, [200, 100, 50, 255]);

        assert!(!engine.is_available(FilterKind::Mono));
        assert_eq!(
            engine.apply(&input, FilterKind::Mono),
            Err(FilterError::FilterUnavailable("photo-effect-mono"))
        );
        assert!(engine.apply(&input, FilterKind::Sepia).is_ok());
    }

    #[test]
    fn test_empty_input_is_render_failed() {
        let engine = FilterEngine::<CpuBackend>::default();
        let input = Bitmap::new(0, 0, Vec::<u8>::new(), 2.0, Orientation::Up);
        assert!(matches!(
            engine.apply(&input, FilterKind::Mono),
            Err(FilterError::RenderFailed(_))
        ));
    }
}
