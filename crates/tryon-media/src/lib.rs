//! Pose overlay compositor for virtual try-on.
//!
//! This crate provides:
//! - Image decoding from base64 and `data:` URLs, PNG encoding
//! - Garment placement from shoulder and hip landmarks
//! - Skeleton and garment drawing onto an RGBA canvas
//! - Pose provider traits so detectors can be swapped
//! - An overlay session where the most recent image always wins

pub mod codec;
pub mod compositor;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod placement;
pub mod remote;
pub mod session;
pub mod skeleton;

pub use codec::{decode_base64, decode_base64_image, decode_image, encode_png, encode_png_base64};
pub use compositor::{CompositeFrame, Compositor};
pub use detector::{detect_landmarks, DetectorGuard, FixedPoseProvider, PoseDetector, PoseProvider};
pub use error::{MediaError, MediaResult};
pub use pipeline::render_image;
pub use placement::{compute_placement, PlacementConfig};
pub use remote::RemotePoseProvider;
pub use session::{OverlaySession, SessionEvent};
pub use skeleton::{draw_skeleton, SkeletonStyle};
