use bevy::audio::Volume;
use bevy::prelude::*;

use crate::save::Progress;
use crate::sim::{LostReason, ShipDocked, ShipLaunched, ShipLost};

/// One-shot clips, loaded once at startup.
#[derive(Resource)]
struct Sfx {
    engine: Handle<AudioSource>,
    docked: Handle<AudioSource>,
    explosion: Handle<AudioSource>,
    out_of_bounds: Handle<AudioSource>,
}

pub struct GameAudioPlugin;
impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_sfx)
            .add_systems(Update, (play_launch, play_outcomes, apply_volume));
    }
}

fn load_sfx(mut commands: Commands, assets: Res<AssetServer>) {
    commands.insert_resource(Sfx {
        engine: assets.load("sfx/engine.ogg"),
        docked: assets.load("sfx/docked.ogg"),
        explosion: assets.load("sfx/explosion.ogg"),
        out_of_bounds: assets.load("sfx/out_of_bounds.ogg"),
    });
}

fn one_shot(commands: &mut Commands, source: Handle<AudioSource>) {
    commands.spawn(AudioBundle {
        source,
        settings: PlaybackSettings::DESPAWN,
    });
}

fn play_launch(mut ev: EventReader<ShipLaunched>, sfx: Res<Sfx>, mut commands: Commands) {
    for _ in ev.read() {
        one_shot(&mut commands, sfx.engine.clone());
    }
}

fn play_outcomes(
    mut ev_docked: EventReader<ShipDocked>,
    mut ev_lost: EventReader<ShipLost>,
    sfx: Res<Sfx>,
    mut commands: Commands,
) {
    for _ in ev_docked.read() {
        one_shot(&mut commands, sfx.docked.clone());
    }
    for lost in ev_lost.read() {
        let clip = match lost.reason {
            LostReason::Exploded => sfx.explosion.clone(),
            LostReason::OutOfBounds => sfx.out_of_bounds.clone(),
        };
        one_shot(&mut commands, clip);
    }
}

/// Master volume mirrors the saved sound flag: muted is 0, on is 1.
fn apply_volume(progress: Res<Progress>, mut volume: ResMut<GlobalVolume>) {
    if progress.is_changed() {
        let level = if progress.sound_enabled { 1.0 } else { 0.0 };
        volume.volume = Volume::new(level);
    }
}
