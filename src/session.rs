// SPDX-License-Identifier: GPL-3.0-only

//! Edit session: the picked photo and what is currently displayed
//!
//! Filters always run on the currently displayed bitmap, so applying a second
//! filter re-runs the pipeline on the first one's output. A failed filter
//! leaves the display untouched.

use crate::bitmap::Bitmap;
use crate::errors::{FilterError, FilterResult};
use crate::filters::{CpuBackend, FilterEngine, FilterKind, RenderBackend};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct EditSession<B: RenderBackend = CpuBackend> {
    engine: Arc<FilterEngine<B>>,
    original: Option<Bitmap>,
    current: Option<Bitmap>,
}

impl<B: RenderBackend + 'static> EditSession<B> {
    pub fn new(engine: Arc<FilterEngine<B>>) -> Self {
        Self {
            engine,
            original: None,
            current: None,
        }
    }

    /// Show a newly picked photo, discarding previous edits
    pub fn load(&mut self, bitmap: Bitmap) {
        self.original = Some(bitmap.clone());
        self.current = Some(bitmap);
    }

    /// The photo as picked
    pub fn original(&self) -> Option<&Bitmap> {
        self.original.as_ref()
    }

    /// The photo as displayed
    pub fn current(&self) -> Option<&Bitmap> {
        self.current.as_ref()
    }

    /// Drop all edits and show the picked photo again
    pub fn revert(&mut self) {
        self.current = self.original.clone();
    }

    /// Filter the displayed photo
    ///
    /// # Errors
    ///
    /// `RenderFailed` when nothing is loaded, otherwise whatever the engine
    /// reports. The displayed photo only changes on success.
    pub fn apply_filter(&mut self, filter: FilterKind) -> FilterResult<&Bitmap> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| FilterError::RenderFailed("no photo loaded".into()))?;

        match self.engine.apply(current, filter) {
            Ok(filtered) => {
                info!(%filter, "Filter applied to displayed photo");
                Ok(&*self.current.insert(filtered))
            }
            Err(e) => {
                warn!(%filter, error = %e, "Filter could not be applied, keeping photo");
                Err(e)
            }
        }
    }

    /// Like [`Self::apply_filter`], with rendering on a blocking worker
    pub async fn apply_filter_async(&mut self, filter: FilterKind) -> FilterResult<&Bitmap> {
        let current = self
            .current
            .clone()
            .ok_or_else(|| FilterError::RenderFailed("no photo loaded".into()))?;
        let engine = Arc::clone(&self.engine);

        let result = tokio::task::spawn_blocking(move || engine.apply(&current, filter))
            .await
            .map_err(|e| FilterError::RenderFailed(format!("filter task error: {}", e)))?;

        match result {
            Ok(filtered) => {
                info!(%filter, "Filter applied to displayed photo");
                Ok(&*self.current.insert(filtered))
            }
            Err(e) => {
                warn!(%filter, error = %e, "Filter could not be applied, keeping photo");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::TransformId;

    fn session() -> EditSession {
        EditSession::new(Arc::new(FilterEngine::default()))
    }

    #[test]
    fn test_apply_without_photo() {
        let mut session = session();
        assert!(matches!(
            session.apply_filter(FilterKind::Sepia),
            Err(FilterError::RenderFailed(_))
        ));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_filters_stack_on_displayed_photo() {
        let mut session = session();
        let photo = Bitmap::filled(8, 8, [30, 160, 220, 255]);
        session.load(photo.clone());

        let sepia = session.apply_filter(FilterKind::Sepia).unwrap().clone();
        let sepia_then_mono = session.apply_filter(FilterKind::Mono).unwrap().clone();

        let engine = FilterEngine::<CpuBackend>::default();
        let expected = engine
            .apply(&engine.apply(&photo, FilterKind::Sepia).unwrap(), FilterKind::Mono)
            .unwrap();
        assert_ne!(sepia, sepia_then_mono);
        assert_eq!(sepia_then_mono, expected);
        assert_eq!(session.original(), Some(&photo));
    }

    #[test]
    fn test_failed_filter_keeps_photo() {
        let engine = FilterEngine::new(CpuBackend::without([TransformId::SepiaTone]));
        let mut session = EditSession::new(Arc::new(engine));
        let photo = Bitmap::filled(4, 4, [30, 160, 220, 255]);
        session.load(photo.clone());

        assert!(matches!(
            session.apply_filter(FilterKind::Sepia),
            Err(FilterError::FilterUnavailable("sepia-tone"))
        ));
        assert_eq!(session.current(), Some(&photo));
    }

    #[test]
    fn test_revert() {
        let mut session = session();
        let photo = Bitmap::filled(4, 4, [30, 160, 220, 255]);
        session.load(photo.clone());
        session.apply_filter(FilterKind::Mono).unwrap();
        assert_ne!(session.current(), Some(&photo));

        session.revert();
        assert_eq!(session.current(), Some(&photo));
    }

    #[tokio::test]
    async fn test_apply_filter_async_matches_sync() {
        let mut session = session();
        let photo = Bitmap::filled(4, 4, [30, 160, 220, 255]);
        session.load(photo.clone());

        let filtered = session.apply_filter_async(FilterKind::Sepia).await.unwrap().clone();
        let expected = FilterEngine::<CpuBackend>::default()
            .apply(&photo, FilterKind::Sepia)
            .unwrap();
        assert_eq!(filtered, expected);
    }
}
