//! Bevy application setup and shared state

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use genscene_core::SceneDocument;
use genscene_gen::SceneGenerator;
use std::sync::{Arc, Mutex};

use crate::objects::ObjectsPlugin;
use crate::scene::ScenePlugin;
use crate::ui::UiPlugin;

/// The scene document currently on display. Replaced wholesale on each
/// successful generation; systems react to change detection on this
/// resource, so re-rendering the same document never rebuilds anything.
#[derive(Debug, Clone, Resource)]
pub struct CurrentScene(pub SceneDocument);

/// Generation client shared with worker threads
#[derive(Clone, Resource)]
pub struct GeneratorHandle(pub Arc<SceneGenerator>);

/// Prompt text and in-flight generation state
#[derive(Resource)]
pub struct GenerationState {
    /// Current text in the prompt field. Deliberately left in place after
    /// a submit.
    pub prompt: String,
    /// Whether a generation is in progress. The prompt control is disabled
    /// for the duration; this is the only concurrency control.
    pub in_flight: bool,
    /// Error message from the last failed generation
    pub error: Option<String>,
    /// Pending generation result (set by the worker thread)
    pub pending: Arc<Mutex<Option<Result<SceneDocument, String>>>>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            in_flight: false,
            error: None,
            pending: Arc::new(Mutex::new(None)),
        }
    }
}

/// Local display toggles, independent of the document
#[derive(Debug, Clone, Default, Resource)]
pub struct ViewState {
    /// Show the raw JSON of the current document instead of the viewport
    pub show_json: bool,
}

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32, // For smooth zoom
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3, // For smooth re-centering
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            // Starts at roughly (0, 2, 8) looking at the origin
            distance: 8.25,
            target_distance: 8.25,
            azimuth: 0.0,
            elevation: 0.25,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }
}

/// Run the Bevy application
pub fn run(generator: SceneGenerator, initial: SceneDocument) {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.06, 0.06, 0.06)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "GenScene".to_string(),
                ..default()
            }),
            ..default()
        }))
        // Picking has to be registered before EguiPlugin, which looks for
        // PickingPlugin at build time; 3D raycasting additionally needs
        // MeshPickingPlugin.
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(CurrentScene(initial))
        .insert_resource(GeneratorHandle(Arc::new(generator)))
        .init_resource::<GenerationState>()
        .init_resource::<ViewState>()
        .init_resource::<CameraSettings>()
        .add_plugins(ScenePlugin)
        .add_plugins(ObjectsPlugin)
        .add_plugins(UiPlugin)
        .run();
}
