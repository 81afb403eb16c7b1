//! Image processing on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3, fit-within or exact |
//! | **Encode** | format of the output extension, JPEG with quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_fit_dimensions, calculate_output_dimensions, fits_within};
pub use operations::{ResizeOptions, ResizedCopy, create_resized_copy, get_dimensions, plan_resize};
pub use params::{Quality, ResizeMode, ResizeParams};
pub use rust_backend::RustBackend;
