//! Clients for the remote models behind the try-on service.
//!
//! - [`InferenceClient`] forwards a user photo and a garment photo to a
//!   hosted composite-generation model.
//! - [`LandmarkClient`] asks an HTTP pose service for body landmarks and
//!   maps the answer into [`tryon_models::LandmarkSet`].

pub mod error;
pub mod inference;
pub mod landmarks;

pub use error::{MlError, MlResult};
pub use inference::{InferenceClient, InferenceConfig, DEFAULT_MODEL_URL};
pub use landmarks::LandmarkClient;
