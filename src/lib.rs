// SPDX-License-Identifier: GPL-3.0-only

//! Photo Filter - camera permission gate and photo filter pipeline
//!
//! # Architecture
//!
//! - [`permission`]: camera consent state and the one-shot consent prompt
//! - [`filters`]: sepia/mono transforms rendered through a [`filters::RenderBackend`]
//! - [`bitmap`]: RGBA pixel buffers with scale and orientation
//! - [`session`]: the picked photo and its filtered display copy
//! - [`storage`]: image file loading and saving
//! - [`config`]: user configuration handling
//!
//! # Example
//!
//! ```
//! use photo_filter::{Bitmap, FilterEngine, FilterKind};
//!
//! let engine: FilterEngine = FilterEngine::default();
//! let photo = Bitmap::filled(4, 4, [200, 120, 40, 255]);
//! let sepia = engine.apply(&photo, FilterKind::Sepia).unwrap();
//! assert_eq!((sepia.width, sepia.height), (4, 4));
//! ```

pub mod bitmap;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod permission;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use bitmap::{Bitmap, Orientation};
pub use config::Config;
pub use errors::{AppError, AppResult, FilterError, FilterResult};
pub use filters::{CpuBackend, FilterEngine, FilterKind, TransformId};
pub use permission::{AccessDecision, AuthorizationState, CaptureAuthority, PermissionGate};
pub use session::EditSession;
