//! Reference contributors.
//!
//! These are deliberately simple physical models. They exercise the
//! contributor protocol and serve as templates for new contributors.

pub mod drag;
pub mod gravity;

pub use drag::{AtmosphereModel, ConstantCdAndAreaDrag};
pub use gravity::UnidirectionalGravity;
