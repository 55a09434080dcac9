use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use bevy_egui::{egui, EguiContexts};

use facial_rig::MAX_WEIGHT;

use crate::characters::{mirror_updates, CharacterRegistry};

/// Draws the per-frame inspector: action unit sliders on the left, emotion
/// sliders on the right, a reset button along the bottom. Every slider
/// edit goes through the rig and is mirrored to the mesh in the same
/// frame.
pub fn inspector_ui(
    mut contexts: EguiContexts,
    mut registry: ResMut<CharacterRegistry>,
    mut morphs: Query<&mut MorphWeights>,
) {
    let ctx = contexts.ctx_mut();
    let Some(character) = registry.active_character_mut() else {
        return;
    };
    let name = character.name.clone();
    let morph_entity = character.morph_entity;
    let rig = &mut character.rig;
    let mut updates = Vec::new();

    egui::TopBottomPanel::top("active_character").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(&name);
            ui.weak("arrow keys switch characters");
        });
    });

    egui::TopBottomPanel::bottom("reset").show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            if ui.button("Reset All").clicked() {
                updates.extend(rig.reset());
            }
        });
    });

    egui::SidePanel::left("action_units")
        .default_width(280.)
        .show(ctx, |ui| {
            ui.heading("Action Units");
            if rig.action_units().is_empty() {
                ui.weak("none discovered");
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for index in 0..rig.action_units().len() {
                    let code = rig.action_units()[index].code().to_owned();
                    let mut weight = rig.action_units()[index].weight();
                    if ui
                        .add(egui::Slider::new(&mut weight, 0.0..=MAX_WEIGHT).text(code))
                        .changed()
                    {
                        updates.push(rig.set_action_unit_weight(index, weight));
                    }
                }
            });
        });

    egui::SidePanel::right("emotions")
        .default_width(280.)
        .show(ctx, |ui| {
            ui.heading("Emotions");
            egui::ScrollArea::vertical().show(ui, |ui| {
                for index in 0..rig.emotions().len() {
                    let label = rig.emotions()[index].name();
                    let mut weight = rig.emotions()[index].weight();
                    if ui
                        .add(egui::Slider::new(&mut weight, 0.0..=MAX_WEIGHT).text(label))
                        .changed()
                    {
                        updates.extend(rig.set_emotion_weight(index, weight));
                    }
                }
            });
        });

    mirror_updates(morph_entity, &updates, &mut morphs);
}
