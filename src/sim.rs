use bevy::prelude::*;
use rand::Rng;

use crate::levels::{self, LevelDef, SHIP_RADIUS};
use crate::save::Progress;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Splash,
    Playing,
    Complete,
}

/// Launch state machine. Docked and Lost are absorbing: once entered, the
/// burn, gravity, facing, and contact systems all stop touching the ship.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ShipPhase {
    #[default]
    Aiming,
    Launched,
    Docked,
    Lost,
}

/// How the current attempt ended. Drives the pause panel's button wiring.
#[derive(Resource, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Outcome {
    #[default]
    None,
    Docked,
    Lost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LostReason {
    Exploded,
    OutOfBounds,
}

#[derive(Resource, Clone)]
pub struct SimSettings {
    pub launch_speed: f32,
    pub time_scale: f32,
    pub paused: bool,
    /// Pause panel visibility. Raised by Escape together with `paused`,
    /// and by terminal contacts on their own so the outcome menu appears
    /// while game time keeps running.
    pub menu_open: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            launch_speed: 320.0,
            time_scale: 1.0,
            paused: false,
            menu_open: false,
        }
    }
}

#[derive(Component, Default)]
pub struct Ship {
    pub vel: Vec2,
    pub phase: ShipPhase,
    pub burn_done: bool,
}

#[derive(Component)]
pub struct Planet {
    pub attraction: f32,
    pub radius: f32,
}

#[derive(Component)]
pub struct FinishPad {
    pub radius: f32,
}

/// Everything spawned for the current level, cleared on retry/advance.
#[derive(Component)]
pub struct LevelEntity;

#[derive(Component)]
struct Debris {
    vel: Vec2,
    lifespan: f32,
}

const DEBRIS_LIFESPAN: f32 = 0.9;

/// Whether the level's tutorial hint has been clicked away.
#[derive(Resource, Default)]
pub struct HintDismissed(pub bool);

#[derive(Event, Default)]
pub struct ShipLaunched;

#[derive(Event, Default)]
pub struct ShipDocked;

#[derive(Event)]
pub struct ShipLost {
    pub reason: LostReason,
}

#[derive(Event, Default)]
pub struct RetryLevel;

#[derive(Event, Default)]
pub struct NextLevel;

#[derive(Event)]
struct ExplosionBurst {
    center: Vec2,
}

pub struct SimPlugin;
impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimSettings>()
            .init_resource::<Outcome>()
            .init_resource::<HintDismissed>()
            .add_event::<ShipLaunched>()
            .add_event::<ShipDocked>()
            .add_event::<ShipLost>()
            .add_event::<RetryLevel>()
            .add_event::<NextLevel>()
            .add_event::<ExplosionBurst>()
            .add_systems(OnEnter(AppState::Playing), spawn_level)
            .add_systems(OnExit(AppState::Playing), despawn_level)
            .add_systems(
                FixedUpdate,
                (initial_burn, apply_gravity, integrate, face_velocity, check_contacts)
                    .chain()
                    .run_if(in_state(AppState::Playing)),
            )
            .add_systems(
                Update,
                (handle_retry, handle_advance, spawn_debris, update_debris)
                    .run_if(in_state(AppState::Playing)),
            );
    }
}

/// Sum of simplified inverse-square attractions: for each planet,
/// `attraction * normalize(d) / |d|^2` with `d` pointing ship -> planet.
/// A planet at exactly zero distance is skipped rather than producing NaN.
pub fn gravity_accel(ship_pos: Vec2, planets: &[(Vec2, f32)]) -> Vec2 {
    let mut acc = Vec2::ZERO;
    for &(pos, attraction) in planets {
        let d = pos - ship_pos;
        let d2 = d.length_squared();
        if d2 == 0.0 {
            continue;
        }
        acc += attraction * d.normalize() / d2;
    }
    acc
}

/// Rotation facing along `vel`, nose on local +Y. Returns None on a
/// zero-velocity frame so the caller holds the previous heading instead of
/// snapping to a default.
pub fn heading_from_velocity(vel: Vec2) -> Option<Quat> {
    if vel.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_z(
        vel.y.atan2(vel.x) - std::f32::consts::FRAC_PI_2,
    ))
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Finish,
    Planet,
    OutOfBounds,
}

/// Circle tests against the pad and planets, then the bounds rectangle.
/// The pad wins when shapes overlap.
pub fn classify_contact(
    ship_pos: Vec2,
    finish: (Vec2, f32),
    planets: &[(Vec2, f32)],
    bounds_half: Vec2,
) -> Option<Contact> {
    let reach = finish.1 + SHIP_RADIUS;
    if ship_pos.distance_squared(finish.0) <= reach * reach {
        return Some(Contact::Finish);
    }
    for &(pos, radius) in planets {
        let reach = radius + SHIP_RADIUS;
        if ship_pos.distance_squared(pos) <= reach * reach {
            return Some(Contact::Planet);
        }
    }
    if ship_pos.x.abs() > bounds_half.x || ship_pos.y.abs() > bounds_half.y {
        return Some(Contact::OutOfBounds);
    }
    None
}

fn current_level(progress: &Progress) -> Option<&'static LevelDef> {
    levels::level(progress.current_level)
}

fn spawn_level_inner(
    commands: &mut Commands,
    existing: &Query<Entity, With<LevelEntity>>,
    level_index: usize,
    outcome: &mut Outcome,
    hint: &mut HintDismissed,
    settings: &mut SimSettings,
) {
    for e in existing {
        commands.entity(e).despawn_recursive();
    }
    *outcome = Outcome::None;
    hint.0 = false;
    settings.paused = false;
    settings.time_scale = 1.0;
    settings.menu_open = false;

    let Some(def) = levels::level(level_index) else {
        warn!("no level {level_index} to spawn");
        return;
    };
    info!("entering level {level_index}");

    // Decorative starfield.
    let mut rng = rand::thread_rng();
    for _ in 0..180 {
        let pos = Vec2::new(
            rng.gen_range(-def.bounds_half.x..def.bounds_half.x),
            rng.gen_range(-def.bounds_half.y..def.bounds_half.y),
        );
        let size = rng.gen_range(1.0..2.6);
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: Color::srgba(0.8, 0.85, 1.0, rng.gen_range(0.2..0.7)),
                    custom_size: Some(Vec2::splat(size)),
                    ..default()
                },
                transform: Transform::from_translation(pos.extend(-10.0)),
                ..default()
            },
            LevelEntity,
        ));
    }

    for planet in def.planets {
        commands.spawn((
            Planet {
                attraction: planet.attraction,
                radius: planet.radius,
            },
            SpriteBundle {
                sprite: Sprite {
                    color: Color::srgb(0.55, 0.4, 0.9),
                    custom_size: Some(Vec2::splat(planet.radius * 2.0)),
                    ..default()
                },
                transform: Transform::from_translation(planet.pos.extend(0.0)),
                ..default()
            },
            LevelEntity,
        ));
    }

    commands.spawn((
        FinishPad {
            radius: def.finish_radius,
        },
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgb(0.3, 1.0, 0.5),
                custom_size: Some(Vec2::splat(def.finish_radius * 2.0)),
                ..default()
            },
            transform: Transform::from_translation(def.finish_pos.extend(0.0)),
            ..default()
        },
        LevelEntity,
    ));

    commands.spawn((
        Ship::default(),
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgb(0.95, 0.95, 1.0),
                custom_size: Some(Vec2::new(SHIP_RADIUS * 1.4, SHIP_RADIUS * 2.0)),
                ..default()
            },
            transform: Transform::from_translation(def.ship_start.extend(1.0)),
            ..default()
        },
        LevelEntity,
    ));
}

fn spawn_level(
    mut commands: Commands,
    existing: Query<Entity, With<LevelEntity>>,
    progress: Res<Progress>,
    mut outcome: ResMut<Outcome>,
    mut hint: ResMut<HintDismissed>,
    mut settings: ResMut<SimSettings>,
) {
    spawn_level_inner(
        &mut commands,
        &existing,
        progress.current_level,
        &mut outcome,
        &mut hint,
        &mut settings,
    );
}

fn despawn_level(mut commands: Commands, existing: Query<Entity, With<LevelEntity>>) {
    for e in &existing {
        commands.entity(e).despawn_recursive();
    }
}

fn handle_retry(
    mut ev_retry: EventReader<RetryLevel>,
    mut commands: Commands,
    existing: Query<Entity, With<LevelEntity>>,
    progress: Res<Progress>,
    mut outcome: ResMut<Outcome>,
    mut hint: ResMut<HintDismissed>,
    mut settings: ResMut<SimSettings>,
) {
    if ev_retry.is_empty() {
        return;
    }
    ev_retry.clear();
    spawn_level_inner(
        &mut commands,
        &existing,
        progress.current_level,
        &mut outcome,
        &mut hint,
        &mut settings,
    );
}

fn handle_advance(
    mut ev_next: EventReader<NextLevel>,
    mut commands: Commands,
    existing: Query<Entity, With<LevelEntity>>,
    mut progress: ResMut<Progress>,
    mut outcome: ResMut<Outcome>,
    mut hint: ResMut<HintDismissed>,
    mut settings: ResMut<SimSettings>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if ev_next.is_empty() {
        return;
    }
    ev_next.clear();

    progress.current_level += 1;
    if progress.current_level > levels::COUNT {
        info!("all levels cleared");
        next_state.set(AppState::Complete);
        return;
    }
    spawn_level_inner(
        &mut commands,
        &existing,
        progress.current_level,
        &mut outcome,
        &mut hint,
        &mut settings,
    );
}

/// One-shot boost along the nose on the first fixed tick after launch,
/// before gravity takes over.
fn initial_burn(settings: Res<SimSettings>, mut ships: Query<(&mut Ship, &Transform)>) {
    if settings.paused {
        return;
    }
    for (mut ship, transform) in &mut ships {
        if ship.phase == ShipPhase::Launched && !ship.burn_done {
            let nose = (transform.rotation * Vec3::Y).truncate();
            ship.vel += nose * settings.launch_speed;
            ship.burn_done = true;
        }
    }
}

fn apply_gravity(
    settings: Res<SimSettings>,
    time: Res<Time>,
    planets: Query<(&Transform, &Planet)>,
    mut ships: Query<(&mut Ship, &Transform), Without<Planet>>,
) {
    if settings.paused {
        return;
    }
    let dt = time.delta_seconds() * settings.time_scale;

    let field: Vec<(Vec2, f32)> = planets
        .iter()
        .map(|(t, p)| (t.translation.truncate(), p.attraction))
        .collect();

    for (mut ship, transform) in &mut ships {
        if ship.phase != ShipPhase::Launched {
            continue;
        }
        let acc = gravity_accel(transform.translation.truncate(), &field);
        ship.vel += acc * dt;
    }
}

fn integrate(
    settings: Res<SimSettings>,
    time: Res<Time>,
    mut ships: Query<(&Ship, &mut Transform)>,
) {
    if settings.paused {
        return;
    }
    let dt = time.delta_seconds() * settings.time_scale;
    for (ship, mut transform) in &mut ships {
        if ship.phase != ShipPhase::Launched {
            continue;
        }
        let p = transform.translation.truncate() + ship.vel * dt;
        transform.translation.x = p.x;
        transform.translation.y = p.y;
    }
}

fn face_velocity(mut ships: Query<(&Ship, &mut Transform)>) {
    for (ship, mut transform) in &mut ships {
        if ship.phase != ShipPhase::Launched {
            continue;
        }
        // The velocity can read zero on the tick between launch and the
        // burn; holding the heading avoids a one-frame snap to "up".
        if let Some(rotation) = heading_from_velocity(ship.vel) {
            transform.rotation = rotation;
        }
    }
}

fn check_contacts(
    progress: Res<Progress>,
    mut outcome: ResMut<Outcome>,
    mut settings: ResMut<SimSettings>,
    planets: Query<(&Transform, &Planet)>,
    pads: Query<(&Transform, &FinishPad)>,
    mut ships: Query<(&mut Ship, &Transform, &mut Visibility), (Without<Planet>, Without<FinishPad>)>,
    mut ev_docked: EventWriter<ShipDocked>,
    mut ev_lost: EventWriter<ShipLost>,
    mut ev_burst: EventWriter<ExplosionBurst>,
) {
    let Some(def) = current_level(&progress) else {
        return;
    };
    let Some((pad_t, pad)) = pads.iter().next() else {
        return;
    };
    let finish = (pad_t.translation.truncate(), pad.radius);
    let obstacles: Vec<(Vec2, f32)> = planets
        .iter()
        .map(|(t, p)| (t.translation.truncate(), p.radius))
        .collect();

    for (mut ship, transform, mut visibility) in &mut ships {
        if ship.phase != ShipPhase::Launched {
            continue;
        }
        let pos = transform.translation.truncate();
        match classify_contact(pos, finish, &obstacles, def.bounds_half) {
            Some(Contact::Finish) => {
                ship.phase = ShipPhase::Docked;
                ship.vel = Vec2::ZERO;
                // The docking animation belongs to the station; the ship
                // itself disappears into it.
                *visibility = Visibility::Hidden;
                *outcome = Outcome::Docked;
                settings.menu_open = true;
                ev_docked.send(ShipDocked);
            }
            Some(Contact::Planet) => {
                ship.phase = ShipPhase::Lost;
                ship.vel = Vec2::ZERO;
                *visibility = Visibility::Hidden;
                *outcome = Outcome::Lost;
                settings.menu_open = true;
                ev_burst.send(ExplosionBurst { center: pos });
                ev_lost.send(ShipLost {
                    reason: LostReason::Exploded,
                });
            }
            Some(Contact::OutOfBounds) => {
                ship.phase = ShipPhase::Lost;
                ship.vel = Vec2::ZERO;
                *outcome = Outcome::Lost;
                settings.menu_open = true;
                ev_lost.send(ShipLost {
                    reason: LostReason::OutOfBounds,
                });
            }
            None => {}
        }
    }
}

fn spawn_debris(mut ev: EventReader<ExplosionBurst>, mut commands: Commands) {
    let mut rng = rand::thread_rng();
    for burst in ev.read() {
        for _ in 0..40 {
            let ang = rng.gen::<f32>() * std::f32::consts::TAU;
            let speed = rng.gen_range(40.0..220.0);
            let size = rng.gen_range(1.5..4.5);
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::srgb(1.0, 0.6, 0.2),
                        custom_size: Some(Vec2::splat(size)),
                        ..default()
                    },
                    transform: Transform::from_translation(burst.center.extend(2.0)),
                    ..default()
                },
                Debris {
                    vel: Vec2::from_angle(ang) * speed,
                    lifespan: DEBRIS_LIFESPAN,
                },
                LevelEntity,
            ));
        }
    }
}

fn update_debris(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<SimSettings>,
    mut debris: Query<(Entity, &mut Debris, &mut Transform, &mut Sprite)>,
) {
    // Debris obeys the pause time scale like everything else.
    let dt = time.delta_seconds() * settings.time_scale;
    for (e, mut d, mut transform, mut sprite) in &mut debris {
        d.lifespan -= dt;
        if d.lifespan <= 0.0 {
            commands.entity(e).despawn();
            continue;
        }
        let p = transform.translation.truncate() + d.vel * dt;
        transform.translation.x = p.x;
        transform.translation.y = p.y;
        sprite
            .color
            .set_alpha((d.lifespan / DEBRIS_LIFESPAN).clamp(0.0, 1.0));
    }
}
