//! Shared UI building blocks.

pub mod button;
pub mod field;
pub mod status;
pub mod toaster;

pub use button::{Button, ButtonVariant};
pub use field::{Field, FieldKind};
pub use status::{ErrorView, LoadingView, Skeleton};
pub use toaster::Toaster;
