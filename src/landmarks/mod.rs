//! Hand landmark data, normalization and per-finger state

pub mod fingers;
pub mod frame;
pub mod handoff;
pub mod normalize;
pub mod replay;
pub mod synthetic;

pub use fingers::{curl, Finger, FingerState, FingerStateClassifier, FingerStates};
pub use frame::{HandLandmark, LandmarkFrame, LANDMARK_COUNT};
pub use handoff::{Detection, LatestFrameSlot};
pub use normalize::NormalizedLandmarkSet;
pub use replay::ReplayRecord;
pub use synthetic::{Pose, SyntheticHand, ThumbPose};
