use bevy::prelude::*;

/// Collision radius of the ship sprite.
pub const SHIP_RADIUS: f32 = 14.0;

pub struct PlanetDef {
    pub pos: Vec2,
    /// Standard gravitational parameter: G * planet mass folded into one
    /// designer-tuned scalar.
    pub attraction: f32,
    pub radius: f32,
}

pub struct LevelDef {
    pub ship_start: Vec2,
    pub planets: &'static [PlanetDef],
    pub finish_pos: Vec2,
    pub finish_radius: f32,
    /// Half-extents of the playable rectangle, centered on the origin.
    /// Leaving it counts as losing the ship.
    pub bounds_half: Vec2,
    pub hint: Option<&'static str>,
}

/// Level 0 is the splash screen; playable levels are 1-based, so
/// `level(n)` is `Some` exactly for `1..=COUNT`.
pub fn level(n: usize) -> Option<&'static LevelDef> {
    if n == 0 {
        None
    } else {
        LEVELS.get(n - 1)
    }
}

pub const COUNT: usize = 5;

static LEVELS: [LevelDef; COUNT] = [
    // A single planet between the pad and the ship. Aim wide and let
    // gravity bend the path in.
    LevelDef {
        ship_start: Vec2::new(-520.0, -260.0),
        planets: &[PlanetDef {
            pos: Vec2::new(0.0, 0.0),
            attraction: 3.2e6,
            radius: 46.0,
        }],
        finish_pos: Vec2::new(520.0, 260.0),
        finish_radius: 30.0,
        bounds_half: Vec2::new(680.0, 430.0),
        hint: Some("Aim with the mouse, click to launch. Planets pull you in."),
    },
    // Two planets forming a corridor.
    LevelDef {
        ship_start: Vec2::new(-560.0, 0.0),
        planets: &[
            PlanetDef {
                pos: Vec2::new(-120.0, 180.0),
                attraction: 2.4e6,
                radius: 40.0,
            },
            PlanetDef {
                pos: Vec2::new(140.0, -170.0),
                attraction: 2.4e6,
                radius: 40.0,
            },
        ],
        finish_pos: Vec2::new(560.0, 40.0),
        finish_radius: 30.0,
        bounds_half: Vec2::new(680.0, 430.0),
        hint: None,
    },
    // Heavy central planet, the pad hides behind it.
    LevelDef {
        ship_start: Vec2::new(-540.0, -320.0),
        planets: &[PlanetDef {
            pos: Vec2::new(60.0, 0.0),
            attraction: 5.6e6,
            radius: 58.0,
        }],
        finish_pos: Vec2::new(220.0, 330.0),
        finish_radius: 28.0,
        bounds_half: Vec2::new(680.0, 430.0),
        hint: None,
    },
    // Three bodies, staggered.
    LevelDef {
        ship_start: Vec2::new(-560.0, 300.0),
        planets: &[
            PlanetDef {
                pos: Vec2::new(-260.0, -40.0),
                attraction: 2.0e6,
                radius: 36.0,
            },
            PlanetDef {
                pos: Vec2::new(40.0, 180.0),
                attraction: 2.8e6,
                radius: 42.0,
            },
            PlanetDef {
                pos: Vec2::new(320.0, -120.0),
                attraction: 2.0e6,
                radius: 36.0,
            },
        ],
        finish_pos: Vec2::new(560.0, -320.0),
        finish_radius: 28.0,
        bounds_half: Vec2::new(680.0, 430.0),
        hint: None,
    },
    // The gauntlet: a heavy pair the ship must thread at speed.
    LevelDef {
        ship_start: Vec2::new(-560.0, -40.0),
        planets: &[
            PlanetDef {
                pos: Vec2::new(-80.0, 150.0),
                attraction: 4.4e6,
                radius: 50.0,
            },
            PlanetDef {
                pos: Vec2::new(-80.0, -230.0),
                attraction: 4.4e6,
                radius: 50.0,
            },
            PlanetDef {
                pos: Vec2::new(380.0, 60.0),
                attraction: 1.6e6,
                radius: 32.0,
            },
        ],
        finish_pos: Vec2::new(580.0, 340.0),
        finish_radius: 26.0,
        bounds_half: Vec2::new(680.0, 430.0),
        hint: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_splash() {
        assert!(level(0).is_none());
    }

    #[test]
    fn levels_are_one_based() {
        assert!(level(1).is_some());
        assert!(level(COUNT).is_some());
        assert!(level(COUNT + 1).is_none());
    }

    #[test]
    fn geometry_fits_bounds() {
        for n in 1..=COUNT {
            let lvl = level(n).unwrap();
            let inside = |p: Vec2| {
                p.x.abs() <= lvl.bounds_half.x && p.y.abs() <= lvl.bounds_half.y
            };
            assert!(inside(lvl.ship_start), "level {n}: ship starts out of bounds");
            assert!(inside(lvl.finish_pos), "level {n}: pad out of bounds");
            for planet in lvl.planets {
                assert!(inside(planet.pos), "level {n}: planet out of bounds");
                assert!(planet.attraction > 0.0);
                assert!(planet.radius > 0.0);
            }
        }
    }

    #[test]
    fn ship_does_not_start_in_contact() {
        for n in 1..=COUNT {
            let lvl = level(n).unwrap();
            for planet in lvl.planets {
                let min = planet.radius + SHIP_RADIUS;
                assert!(
                    lvl.ship_start.distance(planet.pos) > min,
                    "level {n}: ship spawns inside a planet"
                );
            }
            let min = lvl.finish_radius + SHIP_RADIUS;
            assert!(lvl.ship_start.distance(lvl.finish_pos) > min);
        }
    }
}
