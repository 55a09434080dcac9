//! Weight model for facial morph-target meshes.
//!
//! A [`FacialRig`] owns the Action Units discovered from a mesh's
//! morph-target names and the fixed set of [`Emotion`]s aggregated over
//! them. All weight writes clamp to `[0, MAX_WEIGHT]` and report the
//! morph-target updates the caller must mirror to the mesh.

pub use action_unit::{au_code, discover_action_units, ActionUnit, RigError, MAX_WEIGHT};
pub use emotion::{Emotion, EMOTION_TABLE};
pub use rig::{FacialRig, WeightSnapshot, WeightUpdate};

mod action_unit;
mod emotion;
mod rig;
