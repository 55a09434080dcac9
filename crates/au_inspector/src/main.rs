use std::ffi::OsStr;
use std::path::Path;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiSettings};
use clap::Parser;

use crate::characters::{Character, CharacterRegistry};
use crate::viewpoint::ViewpointCamera;

mod characters;
mod ui;
mod viewpoint;

#[derive(Parser, Resource)]
struct Options {
    /// Character scene files (glTF/GLB), cycled with the arrow keys.
    #[arg(required = true)]
    pub characters: Vec<String>,
    /// A global multiplier for the size of all inspector UI elements.
    #[arg(long, default_value = "1.0")]
    pub ui_scale: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let options = Options::parse();

    App::new()
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_plugins(EguiPlugin)
        .insert_resource(CharacterRegistry::default())
        .insert_resource(options)
        .add_systems(Startup, init)
        .add_systems(
            Update,
            (
                characters::bind_pending_rigs,
                characters::switch_characters,
                ui::inspector_ui,
            )
                .chain(),
        )
        .run();
    Ok(())
}

fn init(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut registry: ResMut<CharacterRegistry>,
    mut egui_settings: ResMut<EguiSettings>,
    options: Res<Options>,
) {
    egui_settings.scale_factor = options.ui_scale;

    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(10., 100., 0.).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0., viewpoint::DEFAULT_EYE_HEIGHT, 2.5)
                .looking_at(Vec3::new(0., viewpoint::DEFAULT_EYE_HEIGHT, 0.), Vec3::Y),
            ..default()
        },
        ViewpointCamera,
    ));

    for path in &options.characters {
        let name = Path::new(path)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(path)
            .to_owned();
        let scene = asset_server.load(bevy::gltf::GltfAssetLabel::Scene(0).from_asset(path.clone()));
        let root = commands
            .spawn((
                Name::new(name.clone()),
                SceneBundle {
                    scene,
                    // Everything starts hidden; binding reveals the first
                    // character once all rigs are ready.
                    visibility: Visibility::Hidden,
                    ..default()
                },
            ))
            .id();
        registry.characters.push(Character::new(name, root));
    }
}
