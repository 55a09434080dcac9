use bevy::log::{error, info, warn};
use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use bevy::scene::SceneInstance;

use facial_rig::{FacialRig, RigError, WeightUpdate, MAX_WEIGHT};

use crate::viewpoint::{self, ViewpointCamera};

/// One renderable character variant and its facial parameter model.
pub struct Character {
    pub name: String,
    pub root: Entity,
    /// Entity carrying the morph weights for the face mesh, once bound.
    pub morph_entity: Option<Entity>,
    pub rig: FacialRig,
    pub ready: bool,
}

impl Character {
    pub fn new(name: String, root: Entity) -> Self {
        Self {
            name,
            root,
            morph_entity: None,
            rig: FacialRig::default(),
            ready: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Wrapping index arithmetic for character navigation.
pub fn step_wrapping(index: usize, count: usize, direction: Direction) -> usize {
    match direction {
        Direction::Next => (index + 1) % count,
        Direction::Previous => (index + count - 1) % count,
    }
}

/// Everything a switch asks the caller to apply: visibility, mesh weight
/// mirroring and viewpoint height.
pub struct Switch {
    pub previous_root: Entity,
    pub active_root: Entity,
    pub morph_entity: Option<Entity>,
    pub name: String,
    pub updates: Vec<WeightUpdate>,
}

/// Ordered character variants plus the active index. Exactly one variant
/// is visible once activated.
#[derive(Resource, Default)]
pub struct CharacterRegistry {
    pub characters: Vec<Character>,
    pub active: usize,
    pub activated: bool,
}

impl CharacterRegistry {
    pub fn active_character_mut(&mut self) -> Option<&mut Character> {
        if !self.activated {
            return None;
        }
        self.characters.get_mut(self.active)
    }

    /// Steps the active index and carries the outgoing character's slider
    /// state into the incoming rig by name. Action units or emotions the
    /// destination lacks are dropped; ones the snapshot lacks keep their
    /// current weight.
    pub fn switch(&mut self, direction: Direction) -> Option<Switch> {
        if !self.activated || self.characters.is_empty() {
            return None;
        }
        let snapshot = self.characters[self.active].rig.snapshot();
        let previous_root = self.characters[self.active].root;
        self.active = step_wrapping(self.active, self.characters.len(), direction);
        let character = &mut self.characters[self.active];
        let updates = character.rig.apply_snapshot(&snapshot);
        Some(Switch {
            previous_root,
            active_root: character.root,
            morph_entity: character.morph_entity,
            name: character.name.clone(),
            updates,
        })
    }
}

/// Writes rig weight updates through to the mesh's morph weights. Engine
/// morph weights are normalized, rig weights are 0-100.
pub fn mirror_updates(
    morph_entity: Option<Entity>,
    updates: &[WeightUpdate],
    morphs: &mut Query<&mut MorphWeights>,
) {
    let Some(entity) = morph_entity else {
        return;
    };
    let Ok(mut weights) = morphs.get_mut(entity) else {
        return;
    };
    for update in updates {
        if let Some(slot) = weights.weights_mut().get_mut(update.morph_index) {
            *slot = update.weight / MAX_WEIGHT;
        }
    }
}

fn find_morph_entity(
    root: Entity,
    children: &Query<&Children>,
    morphs: &Query<&MorphWeights>,
) -> Option<Entity> {
    // Only the face mesh is expected to carry morph targets.
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if morphs.contains(entity) {
            return Some(entity);
        }
        if let Ok(entries) = children.get(entity) {
            stack.extend(entries.iter().copied());
        }
    }
    None
}

enum Binding {
    Ready(FacialRig),
    Pending,
}

fn build_rig(
    morph_entity: Option<Entity>,
    morphs: &Query<&MorphWeights>,
    meshes: &Assets<Mesh>,
) -> Result<Binding, RigError> {
    let Some(entity) = morph_entity else {
        return Ok(Binding::Ready(FacialRig::default()));
    };
    let Ok(weights) = morphs.get(entity) else {
        return Ok(Binding::Pending);
    };
    let Some(mesh) = weights.first_mesh().and_then(|handle| meshes.get(handle)) else {
        return Ok(Binding::Pending);
    };
    let Some(names) = mesh.morph_target_names() else {
        return Ok(Binding::Ready(FacialRig::default()));
    };
    FacialRig::from_morph_target_names(names.iter().map(String::as_str)).map(Binding::Ready)
}

/// Builds each character's rig once its scene instance has spawned and the
/// face mesh asset is available. A malformed blend shape naming convention
/// aborts the app before first use. When the last rig binds, the first
/// character becomes visible.
pub fn bind_pending_rigs(
    mut registry: ResMut<CharacterRegistry>,
    scenes: Query<&SceneInstance>,
    spawner: Res<SceneSpawner>,
    children: Query<&Children>,
    morphs: Query<&MorphWeights>,
    meshes: Res<Assets<Mesh>>,
    mut visibility: Query<&mut Visibility>,
    mut cameras: Query<&mut Transform, With<ViewpointCamera>>,
    mut exit: EventWriter<AppExit>,
) {
    if registry.activated {
        return;
    }

    for index in 0..registry.characters.len() {
        let (root, ready) = {
            let character = &registry.characters[index];
            (character.root, character.ready)
        };
        if ready {
            continue;
        }
        let Ok(instance) = scenes.get(root) else {
            continue;
        };
        if !spawner.instance_is_ready(**instance) {
            continue;
        }

        let morph_entity = find_morph_entity(root, &children, &morphs);
        match build_rig(morph_entity, &morphs, &meshes) {
            Ok(Binding::Ready(rig)) => {
                let character = &mut registry.characters[index];
                if rig.is_empty() {
                    warn!("{}: no action units on the face mesh", character.name);
                }
                character.morph_entity = morph_entity;
                character.rig = rig;
                character.ready = true;
                info!(
                    "{}: bound {} action units",
                    character.name,
                    character.rig.action_units().len()
                );
            }
            Ok(Binding::Pending) => continue,
            Err(err) => {
                error!(
                    "failed to initialise facial rig for {}: {}",
                    registry.characters[index].name, err
                );
                exit.send(AppExit::error());
                return;
            }
        }
    }

    if !registry.characters.is_empty() && registry.characters.iter().all(|c| c.ready) {
        registry.activated = true;
        registry.active = 0;
        let character = &registry.characters[0];
        if let Ok(mut vis) = visibility.get_mut(character.root) {
            *vis = Visibility::Inherited;
        }
        viewpoint::update_viewpoint(&character.name, &mut cameras);
        info!("active character: {}", character.name);
    }
}

/// Edge-triggered arrow key navigation between characters.
pub fn switch_characters(
    keys: Res<ButtonInput<KeyCode>>,
    mut registry: ResMut<CharacterRegistry>,
    mut visibility: Query<&mut Visibility>,
    mut morphs: Query<&mut MorphWeights>,
    mut cameras: Query<&mut Transform, With<ViewpointCamera>>,
) {
    let direction = if keys.just_pressed(KeyCode::ArrowRight) {
        Direction::Next
    } else if keys.just_pressed(KeyCode::ArrowLeft) {
        Direction::Previous
    } else {
        return;
    };

    let Some(switch) = registry.switch(direction) else {
        return;
    };
    if let Ok(mut vis) = visibility.get_mut(switch.previous_root) {
        *vis = Visibility::Hidden;
    }
    if let Ok(mut vis) = visibility.get_mut(switch.active_root) {
        *vis = Visibility::Inherited;
    }
    mirror_updates(switch.morph_entity, &switch.updates, &mut morphs);
    viewpoint::update_viewpoint(&switch.name, &mut cameras);
    info!("active character: {}", switch.name);
}
