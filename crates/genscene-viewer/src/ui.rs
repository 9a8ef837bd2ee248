//! Control panel and overlays using bevy_egui

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use genscene_core::SceneDocument;
use tracing::{error, info};

use crate::app::{CurrentScene, GenerationState, GeneratorHandle, ViewState};

/// Example prompts offered below the input field; they submit exactly like
/// manual entry
const SUGGESTED_PROMPTS: &[&str] = &[
    "A futuristic cyberpunk skyscraper with neon accents",
    "A low-poly tree with pink leaves in spring",
    "A retro arcade machine with glowing screen",
    "A solar system model with planets orbiting",
    "A cute robot made of rounded shapes",
    "An abstract sculpture representing chaos and order",
];

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub scene: Res<'w, CurrentScene>,
    pub generation: ResMut<'w, GenerationState>,
    pub view: ResMut<'w, ViewState>,
    pub generator: Res<'w, GeneratorHandle>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, process_generation_results)
            // bevy_egui 0.38 builds widgets in its own schedule pass
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// A submit is accepted only when the trimmed prompt is non-empty and no
/// generation is already in flight
fn can_submit(prompt: &str, in_flight: bool) -> bool {
    !prompt.trim().is_empty() && !in_flight
}

/// Start a generation on a worker thread
fn submit_prompt(generator: &GeneratorHandle, generation: &mut GenerationState, prompt: &str) {
    if !can_submit(prompt, generation.in_flight) {
        return;
    }

    generation.in_flight = true;
    generation.error = None;

    let client = generator.0.clone();
    let slot = generation.pending.clone();
    let prompt = prompt.to_string();
    std::thread::spawn(move || {
        let result = client
            .generate_blocking(&prompt)
            .map_err(|err| err.to_string());
        if let Ok(mut pending) = slot.lock() {
            *pending = Some(result);
        }
    });
}

/// Drain the pending slot filled by the worker thread. The in-flight flag
/// is always cleared when a result arrives; on failure the previous
/// document stays up.
fn process_generation_results(
    mut generation: ResMut<GenerationState>,
    mut scene: ResMut<CurrentScene>,
) {
    // Take the result from the mutex (if any) - this drops the lock
    // immediately
    let result = {
        if let Ok(mut pending) = generation.pending.try_lock() {
            pending.take()
        } else {
            None
        }
    };

    let Some(result) = result else { return };
    apply_generation_result(&mut generation, &mut scene.0, result);
}

/// Commit a finished generation. The in-flight flag always clears; a
/// failure leaves the current document untouched.
fn apply_generation_result(
    generation: &mut GenerationState,
    scene: &mut SceneDocument,
    result: Result<SceneDocument, String>,
) {
    generation.in_flight = false;

    match result {
        Ok(document) => {
            info!(
                title = %document.title,
                objects = document.objects.len(),
                lights = document.lights.len(),
                "Scene generated"
            );
            generation.error = None;
            *scene = document;
        }
        Err(message) => {
            error!("Scene generation failed: {message}");
            generation.error = Some(message);
        }
    }
}

fn ui_system(params: UiParams) {
    let UiParams {
        mut contexts,
        scene,
        mut generation,
        mut view,
        generator,
    } = params;

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("control_panel")
        .default_width(320.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("GenScene");
            ui.label(
                egui::RichText::new("AI scene generator")
                    .small()
                    .color(egui::Color32::GRAY),
            );
            ui.separator();

            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 48.0)
                .show(ui, |ui| {
                    prompt_section(ui, &mut generation, &generator);
                    ui.separator();
                    details_section(ui, &scene);
                    ui.separator();
                    suggestions_section(ui, &mut generation, &generator);
                });

            ui.separator();
            ui.horizontal(|ui| {
                let toggle_text = if view.show_json {
                    "Hide Data"
                } else {
                    "View JSON"
                };
                if ui.button(toggle_text).clicked() {
                    view.show_json = !view.show_json;
                }
                // Share is a placeholder, nothing behind it yet
                let _ = ui.button("Share");
            });
            ui.add_space(2.0);
        });

    if view.show_json {
        json_panel(ctx, &scene);
    } else if generation.in_flight {
        generating_overlay(ctx);
    }
}

fn prompt_section(
    ui: &mut egui::Ui,
    generation: &mut GenerationState,
    generator: &GeneratorHandle,
) {
    ui.label(egui::RichText::new("Generator").small().strong());
    ui.add_space(4.0);

    let mut submit = false;
    ui.horizontal(|ui| {
        let input_width = (ui.available_width() - 80.0).max(80.0);
        let text_edit = egui::TextEdit::singleline(&mut generation.prompt)
            .hint_text("Describe a 3D scene...")
            .desired_width(input_width);
        let response = ui.add_enabled(!generation.in_flight, text_edit);

        if generation.in_flight {
            ui.spinner();
        } else {
            let ready = !generation.prompt.trim().is_empty();
            if ui
                .add_enabled(ready, egui::Button::new("Generate"))
                .clicked()
            {
                submit = true;
            }
        }

        // Also submit on Enter
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }
    });

    if submit {
        let prompt = generation.prompt.clone();
        submit_prompt(generator, generation, &prompt);
    }

    if let Some(error) = &generation.error {
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(format!("Error: {error}"))
                .size(11.0)
                .color(egui::Color32::from_rgb(255, 100, 100)),
        );
    }

    ui.label(
        egui::RichText::new("Press Enter to generate")
            .size(11.0)
            .color(egui::Color32::GRAY),
    );
}

fn details_section(ui: &mut egui::Ui, scene: &CurrentScene) {
    ui.label(egui::RichText::new("Scene").small().strong());
    ui.add_space(4.0);

    let document = &scene.0;
    ui.label(egui::RichText::new(&document.title).strong());
    ui.label(egui::RichText::new(&document.description).size(11.0));
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label(format!("{} objects", document.objects.len()));
        ui.separator();
        ui.label(format!("{} lights", document.lights.len()));
    });
}

fn suggestions_section(
    ui: &mut egui::Ui,
    generation: &mut GenerationState,
    generator: &GeneratorHandle,
) {
    ui.label(egui::RichText::new("Try these").small().strong());
    ui.add_space(4.0);

    for prompt in SUGGESTED_PROMPTS {
        let button = egui::Button::new(egui::RichText::new(*prompt).size(11.0)).wrap();
        if ui.add_enabled(!generation.in_flight, button).clicked() {
            submit_prompt(generator, generation, prompt);
        }
    }
}

/// Raw serialized view of the current document
fn json_panel(ctx: &egui::Context, scene: &CurrentScene) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.label(
            egui::RichText::new("Scene Definition (JSON)")
                .small()
                .strong(),
        );
        ui.separator();
        egui::ScrollArea::both().show(ui, |ui| {
            let json = serde_json::to_string_pretty(&scene.0)
                .unwrap_or_else(|err| format!("serialization error: {err}"));
            ui.label(
                egui::RichText::new(json)
                    .monospace()
                    .size(11.0)
                    .color(egui::Color32::from_rgb(120, 220, 120)),
            );
        });
    });
}

/// Centered status overlay while a generation is in flight
fn generating_overlay(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("generating_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Architecting scene...").strong());
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_guard() {
        assert!(can_submit("a red cube", false));
        assert!(!can_submit("", false));
        assert!(!can_submit("   \t  ", false));
        assert!(!can_submit("a red cube", true));
    }

    #[test]
    fn test_failure_keeps_prior_document() {
        let mut generation = GenerationState {
            in_flight: true,
            ..Default::default()
        };
        let mut scene = SceneDocument::demo();

        apply_generation_result(
            &mut generation,
            &mut scene,
            Err("quota exhausted".to_string()),
        );

        assert!(!generation.in_flight);
        assert_eq!(generation.error.as_deref(), Some("quota exhausted"));
        assert_eq!(scene, SceneDocument::demo());
    }

    #[test]
    fn test_success_replaces_document() {
        let mut generation = GenerationState {
            in_flight: true,
            error: Some("stale error".to_string()),
            ..Default::default()
        };
        let mut scene = SceneDocument::demo();
        let mut replacement = SceneDocument::demo();
        replacement.title = "A tiny forest".to_string();

        apply_generation_result(&mut generation, &mut scene, Ok(replacement.clone()));

        assert!(!generation.in_flight);
        assert!(generation.error.is_none());
        assert_eq!(scene, replacement);
    }
}
