use crate::action_unit::{clamp_weight, ActionUnit};

/// Fixed mapping from emotion name to the action unit codes it drives,
/// after the FACS-style groupings of the source rigs.
pub const EMOTION_TABLE: &[(&str, &[&str])] = &[
    ("Anger", &["AU_04", "AU_05", "AU_07", "AU_23"]),
    ("Disgust", &["AU_09", "AU_15", "AU_16"]),
    (
        "Fear",
        &["AU_01", "AU_02", "AU_04", "AU_05", "AU_07", "AU_20", "AU_26"],
    ),
    ("Happiness", &["AU_06", "AU_12"]),
    ("Sadness", &["AU_01", "AU_04", "AU_15"]),
    ("Surprise", &["AU_01", "AU_02", "AU_05", "AU_26"]),
];

/// A named composite control over a fixed subset of action units.
///
/// Members are indices into the owning rig's action unit list, shared
/// between emotions rather than copied, so every emotion sees the same
/// weight for a given unit. Membership never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Emotion {
    name: &'static str,
    members: Vec<usize>,
    weight: f32,
}

impl Emotion {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Indices of member action units in the rig's unit list, in
    /// discovery order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: f32) {
        self.weight = clamp_weight(weight);
    }
}

/// Resolves [`EMOTION_TABLE`] against a set of discovered action units.
/// Codes the mesh does not expose simply leave gaps; an emotion with no
/// members at all is valid and stays inert.
pub(crate) fn build_emotions(units: &[ActionUnit]) -> Vec<Emotion> {
    EMOTION_TABLE
        .iter()
        .map(|&(name, codes)| {
            let members: Vec<usize> = units
                .iter()
                .enumerate()
                .filter(|(_, au)| codes.contains(&au.code()))
                .map(|(index, _)| index)
                .collect();
            if members.is_empty() {
                tracing::debug!(emotion = name, "emotion resolved no action units");
            }
            Emotion {
                name,
                members,
                weight: 0.0,
            }
        })
        .collect()
}
