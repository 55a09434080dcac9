use bevy::prelude::*;

pub const MALE_EYE_HEIGHT: f32 = 1.68;
pub const FEMALE_EYE_HEIGHT: f32 = 1.6;
pub const DEFAULT_EYE_HEIGHT: f32 = 1.6;

/// Marker for the camera whose height tracks the active character.
#[derive(Component)]
pub struct ViewpointCamera;

/// Eye height for a character identifier. Closed set: only the Female and
/// Male markers are recognized, checked in that order since "Female"
/// contains "male". Anything else keeps the current height.
pub fn eye_height_for(identifier: &str) -> Option<f32> {
    if identifier.contains("Female") {
        Some(FEMALE_EYE_HEIGHT)
    } else if identifier.contains("Male") {
        Some(MALE_EYE_HEIGHT)
    } else {
        None
    }
}

/// Moves the viewpoint camera to the height matching the identifier,
/// leaving the horizontal position alone.
pub fn update_viewpoint(
    identifier: &str,
    cameras: &mut Query<&mut Transform, With<ViewpointCamera>>,
) {
    let Some(height) = eye_height_for(identifier) else {
        return;
    };
    for mut transform in cameras.iter_mut() {
        transform.translation.y = height;
    }
}
