use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::sim::{AppState, HintDismissed, Ship, ShipLaunched, ShipPhase, SimSettings};
use crate::MainCamera;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (aim_ship, launch_ship, pause_toggle).run_if(in_state(AppState::Playing)),
        );
    }
}

fn cursor_world(
    window: &Window,
    cam: (&Camera, &GlobalTransform),
) -> Option<Vec2> {
    let cursor = window.cursor_position()?;
    cam.0.viewport_to_world_2d(cam.1, cursor)
}

/// Until launch, the ship's nose tracks the pointer every frame.
fn aim_ship(
    windows: Query<&Window>,
    q_cam: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut ships: Query<(&Ship, &mut Transform)>,
) {
    let win = windows.single();
    let Some(world) = cursor_world(win, q_cam.single()) else {
        return;
    };
    for (ship, mut transform) in &mut ships {
        if ship.phase != ShipPhase::Aiming {
            continue;
        }
        let dir = world - transform.translation.truncate();
        if dir.length_squared() > f32::EPSILON {
            transform.rotation =
                Quat::from_rotation_z(dir.y.atan2(dir.x) - std::f32::consts::FRAC_PI_2);
        }
    }
}

/// Primary press fires the launch, unless the pointer is over a panel so
/// menu clicks never launch the ship. The same click dismisses the
/// tutorial hint.
fn launch_ship(
    buttons: Res<ButtonInput<MouseButton>>,
    mut contexts: EguiContexts,
    settings: Res<SimSettings>,
    mut hint: ResMut<HintDismissed>,
    mut ships: Query<&mut Ship>,
    mut ev_launched: EventWriter<ShipLaunched>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    hint.0 = true;
    if settings.paused || contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    for mut ship in &mut ships {
        if ship.phase == ShipPhase::Aiming {
            ship.phase = ShipPhase::Launched;
            ev_launched.send(ShipLaunched);
        }
    }
}

/// Escape shows/hides the pause panel and stops/restarts simulation time.
/// After a terminal contact the panel is already up with time running;
/// the first Escape then freezes time, the second dismisses the panel.
fn pause_toggle(keys: Res<ButtonInput<KeyCode>>, mut settings: ResMut<SimSettings>) {
    if keys.just_pressed(KeyCode::Escape) {
        settings.paused = !settings.paused;
        settings.time_scale = if settings.paused { 0.0 } else { 1.0 };
        settings.menu_open = settings.paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_toggles_panel_and_time() {
        let mut app = App::new();
        app.init_resource::<SimSettings>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_systems(Update, pause_toggle);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        {
            let settings = app.world().resource::<SimSettings>();
            assert!(settings.paused);
            assert!(settings.menu_open);
            assert_eq!(settings.time_scale, 0.0);
        }

        // No input plugin in this app, so edge state is managed by hand.
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.clear();
            keys.release(KeyCode::Escape);
            keys.clear();
            keys.press(KeyCode::Escape);
        }
        app.update();
        {
            let settings = app.world().resource::<SimSettings>();
            assert!(!settings.paused);
            assert!(!settings.menu_open);
            assert_eq!(settings.time_scale, 1.0);
        }
    }
}
