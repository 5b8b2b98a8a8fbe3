//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own image handling and model inference so route handlers
//! can stay focused on multipart parsing and response shaping.

pub mod image;
pub mod model;
