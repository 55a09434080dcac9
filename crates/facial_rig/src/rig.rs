use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action_unit::{clamp_weight, discover_action_units, ActionUnit, RigError};
use crate::emotion::{build_emotions, Emotion};

/// A weight write that must be mirrored to the mesh's morph target of the
/// given index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightUpdate {
    pub morph_index: usize,
    pub weight: f32,
}

/// Name-keyed capture of a rig's weights, used to carry slider state from
/// one character to the next.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightSnapshot {
    pub action_units: HashMap<String, f32>,
    pub emotions: HashMap<String, f32>,
}

/// Per-character facial parameter model: the discovered action units and
/// the emotions aggregated over them.
///
/// Every setter clamps to `[0, MAX_WEIGHT]` and returns the morph-target
/// updates the caller is expected to apply to the mesh right away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacialRig {
    action_units: Vec<ActionUnit>,
    emotions: Vec<Emotion>,
}

impl FacialRig {
    /// Builds a rig from a mesh's ordered morph-target names.
    pub fn from_morph_target_names<'a, I>(names: I) -> Result<Self, RigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let action_units = discover_action_units(names)?;
        let emotions = build_emotions(&action_units);
        Ok(Self {
            action_units,
            emotions,
        })
    }

    pub fn action_units(&self) -> &[ActionUnit] {
        &self.action_units
    }

    pub fn emotions(&self) -> &[Emotion] {
        &self.emotions
    }

    pub fn is_empty(&self) -> bool {
        self.action_units.is_empty()
    }

    /// Sets one action unit directly. Emotion weights are write-driven
    /// and stay untouched.
    pub fn set_action_unit_weight(&mut self, index: usize, weight: f32) -> WeightUpdate {
        let au = &mut self.action_units[index];
        au.set_weight(weight);
        WeightUpdate {
            morph_index: au.morph_index(),
            weight: au.weight(),
        }
    }

    /// Sets an emotion's weight and pushes it onto every member action
    /// unit currently below it. Max-combine: a member already at or above
    /// the new weight is never lowered.
    pub fn set_emotion_weight(&mut self, index: usize, weight: f32) -> Vec<WeightUpdate> {
        let weight = clamp_weight(weight);
        self.emotions[index].set_weight(weight);
        let emotion = &self.emotions[index];
        let mut updates = Vec::new();
        for &member in emotion.members() {
            let au = &mut self.action_units[member];
            if au.weight() < weight {
                au.set_weight(weight);
                updates.push(WeightUpdate {
                    morph_index: au.morph_index(),
                    weight,
                });
            }
        }
        updates
    }

    /// Zeroes every action unit and emotion weight, reporting one update
    /// per action unit so the mesh lands back at rest.
    pub fn reset(&mut self) -> Vec<WeightUpdate> {
        for emotion in &mut self.emotions {
            emotion.set_weight(0.0);
        }
        self.action_units
            .iter_mut()
            .map(|au| {
                au.set_weight(0.0);
                WeightUpdate {
                    morph_index: au.morph_index(),
                    weight: 0.0,
                }
            })
            .collect()
    }

    /// Captures current weights keyed by name.
    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot {
            action_units: self
                .action_units
                .iter()
                .map(|au| (au.code().to_owned(), au.weight()))
                .collect(),
            emotions: self
                .emotions
                .iter()
                .map(|e| (e.name().to_owned(), e.weight()))
                .collect(),
        }
    }

    /// Copies name-matched weights from a snapshot into this rig. Entries
    /// absent on either side are left alone; no propagation runs. Returns
    /// the mesh updates for the matched action units.
    pub fn apply_snapshot(&mut self, snapshot: &WeightSnapshot) -> Vec<WeightUpdate> {
        let mut updates = Vec::new();
        for au in &mut self.action_units {
            if let Some(&weight) = snapshot.action_units.get(au.code()) {
                au.set_weight(weight);
                updates.push(WeightUpdate {
                    morph_index: au.morph_index(),
                    weight: au.weight(),
                });
            }
        }
        for emotion in &mut self.emotions {
            if let Some(&weight) = snapshot.emotions.get(emotion.name()) {
                emotion.set_weight(weight);
            }
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anger_rig() -> FacialRig {
        // AU_04, AU_05, AU_07, AU_23 at morph indices 2, 5, 9, 11.
        let names = [
            "Basis", "Smile", "AU_04", "Blink", "Jaw", "AU_05", "Pout", "Cheek", "Wink",
            "AU_07", "Frown", "AU_23",
        ];
        FacialRig::from_morph_target_names(names).unwrap()
    }

    fn emotion_index(rig: &FacialRig, name: &str) -> usize {
        rig.emotions()
            .iter()
            .position(|e| e.name() == name)
            .unwrap()
    }

    #[test]
    fn anger_resolves_the_four_units_in_order() {
        let rig = anger_rig();
        let anger = &rig.emotions()[emotion_index(&rig, "Anger")];
        let resolved: Vec<(&str, usize)> = anger
            .members()
            .iter()
            .map(|&i| {
                let au = &rig.action_units()[i];
                (au.code(), au.morph_index())
            })
            .collect();
        assert_eq!(
            resolved,
            [
                ("AU_04", 2),
                ("AU_05", 5),
                ("AU_07", 9),
                ("AU_23", 11)
            ]
        );
    }

    #[test]
    fn emotion_weight_propagates_to_members_below() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        let updates = rig.set_emotion_weight(anger, 40.0);
        assert_eq!(updates.len(), 4);
        assert!(rig.action_units().iter().all(|au| au.weight() == 40.0));
        assert_eq!(rig.emotions()[anger].weight(), 40.0);
    }

    #[test]
    fn propagation_never_lowers_a_member() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 40.0);
        rig.set_action_unit_weight(0, 80.0); // AU_04
        let updates = rig.set_emotion_weight(anger, 40.0);
        assert!(updates.is_empty());
        assert_eq!(rig.action_units()[0].weight(), 80.0);
        assert!(rig.action_units()[1..]
            .iter()
            .all(|au| au.weight() == 40.0));
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 55.0);
        let first: Vec<f32> = rig.action_units().iter().map(|au| au.weight()).collect();
        let updates = rig.set_emotion_weight(anger, 55.0);
        let second: Vec<f32> = rig.action_units().iter().map(|au| au.weight()).collect();
        assert!(updates.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn member_weights_are_monotonic_across_emotion_writes() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        let fear = emotion_index(&rig, "Fear");
        let mut floor = vec![0.0f32; rig.action_units().len()];
        for (emotion, weight) in [(anger, 30.0), (fear, 60.0), (anger, 10.0), (fear, 45.0)] {
            rig.set_emotion_weight(emotion, weight);
            for (au, prev) in rig.action_units().iter().zip(&mut floor) {
                assert!(au.weight() >= *prev);
                *prev = au.weight();
            }
        }
    }

    #[test]
    fn direct_set_leaves_emotion_weights_alone() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 25.0);
        rig.set_action_unit_weight(0, 90.0);
        assert_eq!(rig.emotions()[anger].weight(), 25.0);
    }

    #[test]
    fn weights_clamp_instead_of_rejecting() {
        let mut rig = anger_rig();
        let update = rig.set_action_unit_weight(0, -10.0);
        assert_eq!(update.weight, 0.0);
        let update = rig.set_action_unit_weight(0, 150.0);
        assert_eq!(update.weight, 100.0);
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 150.0);
        assert_eq!(rig.emotions()[anger].weight(), 100.0);
        assert!(rig.action_units().iter().all(|au| au.weight() == 100.0));
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 70.0);
        rig.set_action_unit_weight(3, 15.0);
        let updates = rig.reset();
        assert_eq!(updates.len(), rig.action_units().len());
        assert!(updates.iter().all(|u| u.weight == 0.0));
        assert!(rig.action_units().iter().all(|au| au.weight() == 0.0));
        assert!(rig.emotions().iter().all(|e| e.weight() == 0.0));
    }

    #[test]
    fn updates_carry_morph_indices() {
        let mut rig = anger_rig();
        let update = rig.set_action_unit_weight(2, 33.0); // AU_07
        assert_eq!(update.morph_index, 9);
        assert_eq!(update.weight, 33.0);
    }

    #[test]
    fn empty_rig_accepts_emotion_writes_inertly() {
        let mut rig = FacialRig::from_morph_target_names(["Basis"]).unwrap();
        assert!(rig.is_empty());
        let anger = emotion_index(&rig, "Anger");
        let updates = rig.set_emotion_weight(anger, 50.0);
        assert!(updates.is_empty());
        assert_eq!(rig.emotions()[anger].weight(), 50.0);
    }

    #[test]
    fn snapshot_transfer_matches_by_name() {
        let mut source =
            FacialRig::from_morph_target_names(["AU_01", "AU_04", "AU_15"]).unwrap();
        source.set_action_unit_weight(0, 20.0);
        source.set_action_unit_weight(1, 35.0);
        let sadness = emotion_index(&source, "Sadness");
        source.set_emotion_weight(sadness, 10.0);
        let snapshot = source.snapshot();

        // Destination shares AU_04 and AU_15 but not AU_01.
        let mut dest =
            FacialRig::from_morph_target_names(["AU_04", "AU_15", "AU_26"]).unwrap();
        dest.set_action_unit_weight(2, 77.0); // AU_26, absent from the snapshot
        let updates = dest.apply_snapshot(&snapshot);

        assert_eq!(updates.len(), 2);
        assert_eq!(dest.action_units()[0].weight(), 35.0); // AU_04
        assert_eq!(dest.action_units()[1].weight(), 10.0); // AU_15 raised by Sadness
        assert_eq!(dest.action_units()[2].weight(), 77.0); // untouched
        assert_eq!(dest.emotions()[sadness].weight(), 10.0);
    }

    #[test]
    fn snapshot_roundtrips_through_serde() {
        let mut rig = anger_rig();
        let anger = emotion_index(&rig, "Anger");
        rig.set_emotion_weight(anger, 40.0);
        let json = serde_json::to_string(&rig.snapshot()).unwrap();
        let restored: WeightSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.action_units["AU_04"], 40.0);
        assert_eq!(restored.emotions["Anger"], 40.0);
    }
}
