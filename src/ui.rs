use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_egui::{
    egui::{self, Align2, Color32, FontId, RichText},
    EguiContexts, EguiPlugin,
};

use crate::levels;
use crate::save::{self, Progress, SaveDir};
use crate::sim::{AppState, HintDismissed, NextLevel, Outcome, RetryLevel, SimSettings};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_systems(Update, splash_ui.run_if(in_state(AppState::Splash)))
            .add_systems(
                Update,
                (pause_panel, hint_overlay, banners).run_if(in_state(AppState::Playing)),
            )
            .add_systems(Update, complete_ui.run_if(in_state(AppState::Complete)));
    }
}

fn save_and_quit(progress: &Progress, dir: &SaveDir, exit: &mut EventWriter<AppExit>) {
    match save::save_to_file(&dir.0, &progress.to_data()) {
        Ok(()) => info!("progress saved to {:?}", dir.0),
        Err(e) => warn!("could not save progress: {e}"),
    }
    exit.send(AppExit::Success);
}

fn splash_ui(
    mut contexts: EguiContexts,
    mut progress: ResMut<Progress>,
    dir: Res<SaveDir>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    egui::Window::new("Gravity Slingshot")
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            if ui.button("New Game").clicked() {
                progress.current_level = 1;
                next_state.set(AppState::Playing);
            }
            if ui.button("Load Game").clicked() {
                let data = save::load_from_file(&dir.0).ok();
                progress.current_level = save::resume_level(data.as_ref());
                next_state.set(AppState::Playing);
            }
            if ui.button("Quit").clicked() {
                exit.send(AppExit::Success);
            }
        });
}

/// Pause menu, also raised when the attempt ends. The top button is
/// rewired to match the outcome, the original's swap-the-listener trick.
fn pause_panel(
    mut contexts: EguiContexts,
    mut settings: ResMut<SimSettings>,
    outcome: Res<Outcome>,
    mut progress: ResMut<Progress>,
    dir: Res<SaveDir>,
    mut ev_retry: EventWriter<RetryLevel>,
    mut ev_next: EventWriter<NextLevel>,
    mut exit: EventWriter<AppExit>,
) {
    if !settings.menu_open {
        return;
    }
    let title = match *outcome {
        Outcome::None => "Game options",
        Outcome::Lost => "Ship Lost!",
        Outcome::Docked => "Success!",
    };
    egui::Window::new(title)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            match *outcome {
                Outcome::None => {
                    if ui.button("Toggle sound").clicked() {
                        progress.sound_enabled = !progress.sound_enabled;
                        // Picking an option dismisses the menu and resumes.
                        settings.paused = false;
                        settings.time_scale = 1.0;
                        settings.menu_open = false;
                    }
                }
                Outcome::Lost => {
                    if ui.button("Retry level").clicked() {
                        ev_retry.send(RetryLevel);
                    }
                }
                Outcome::Docked => {
                    if ui.button("Next level").clicked() {
                        ev_next.send(NextLevel);
                    }
                }
            }
            if ui.button("Save and quit").clicked() {
                save_and_quit(&progress, &dir, &mut exit);
            }
        });
}

fn hint_overlay(
    mut contexts: EguiContexts,
    hint: Res<HintDismissed>,
    progress: Res<Progress>,
) {
    if hint.0 {
        return;
    }
    let Some(text) = levels::level(progress.current_level).and_then(|l| l.hint) else {
        return;
    };
    egui::Area::new("tutorial_hint".into())
        .anchor(Align2::CENTER_BOTTOM, egui::Vec2::new(0.0, -40.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.label(
                RichText::new(text)
                    .font(FontId::proportional(20.0))
                    .color(Color32::LIGHT_GRAY),
            );
        });
}

fn banners(mut contexts: EguiContexts, outcome: Res<Outcome>) {
    match *outcome {
        Outcome::Docked => show_banner(contexts.ctx_mut(), "Success!", Color32::GREEN),
        Outcome::Lost => show_banner(contexts.ctx_mut(), "Ship Lost!", Color32::RED),
        Outcome::None => {}
    }
}

fn show_banner(ctx: &mut egui::Context, text: &str, color: Color32) {
    egui::Area::new("outcome_banner".into())
        .anchor(Align2::CENTER_TOP, egui::Vec2::new(0.0, 60.0))
        .show(ctx, |ui| {
            ui.label(RichText::new(text).font(FontId::proportional(48.0)).color(color));
        });
}

fn complete_ui(
    mut contexts: EguiContexts,
    buttons: Res<ButtonInput<MouseButton>>,
    mut show_credits: Local<bool>,
    mut progress: ResMut<Progress>,
    dir: Res<SaveDir>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    // The credits panel is dismissed with a click. Checked before the
    // buttons so the click that opens it does not close it again.
    if *show_credits && buttons.just_pressed(MouseButton::Left) {
        *show_credits = false;
    }

    egui::Window::new("You made it home")
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            if ui.button("Main menu").clicked() {
                progress.current_level = 0;
                next_state.set(AppState::Splash);
            }
            if ui.button("Credits").clicked() {
                *show_credits = true;
            }
            if ui.button("Quit").clicked() {
                // Back to level 0 first, so a later Load cannot land on
                // this screen.
                progress.current_level = 0;
                save_and_quit(&progress, &dir, &mut exit);
            }
        });

    if *show_credits {
        egui::Area::new("credits_panel".into())
            .anchor(Align2::CENTER_TOP, egui::Vec2::new(0.0, 80.0))
            .show(contexts.ctx_mut(), |ui| {
                ui.label(
                    RichText::new("Thanks for playing.\nDesign, code and levels: the slingshot crew.")
                        .font(FontId::proportional(22.0))
                        .color(Color32::LIGHT_GRAY),
                );
            });
    }
}
