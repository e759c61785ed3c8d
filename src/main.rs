use std::{
    io::Write,
    sync::{Arc, mpsc},
};

use anyhow::anyhow;
use egui::Color32;
use glam::{Vec2, Vec3};
use log::{debug, info};

use esp_overlay::{
    config::{
        ALL, BoxStyle, BoxType, ColorToggle, ColorToggleThickness, Config, HealthBar,
        HealthBarType, SharedEsp, VERSION, get_config_path, parse_config, save_config,
    },
    draw::RecordingDrawList,
    esp::StreamProofEsp,
    game::{
        ClassId, Team,
        weapon::{WeaponId, WeaponInfo, WeaponType},
    },
    game_data::GameData,
    sim::{ResourceEntry, SimEntity, SimGame},
};

const TICK: f32 = 1.0 / 64.0;
const SCREEN_SIZE: Vec2 = Vec2::new(1920.0, 1080.0);
const DEFAULT_FRAMES: i32 = 120;

const LOCAL: i32 = 1;
const ENEMY: i32 = 2;
const ENEMY_RIFLE: i32 = 10;
const DROPPED_RIFLE: i32 = 11;
const CHICKEN: i32 = 20;
const GRENADE: i32 = 30;
const FOG: i32 = 40;

/// Frames the thrown smoke flies before it pops.
const GRENADE_FLIGHT: i32 = 48;
const ENEMY_DORMANT_FRAME: i32 = 80;

enum Message {
    Frame(i32),
}

fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::new();
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(log::LevelFilter::Off)
        .filter_module("esp_overlay", log::LevelFilter::Info)
        .parse_env(env)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let frames = match args.iter().position(|arg| arg == "--frames") {
        Some(i) => args
            .get(i + 1)
            .ok_or_else(|| anyhow!("--frames needs a value"))?
            .parse()?,
        None => DEFAULT_FRAMES,
    };
    info!("esp_overlay {VERSION}, replaying {frames} frames");

    // written back so options added since the last run show up in the file
    let path = get_config_path();
    let mut config = parse_config(&path);
    save_config(&path, &config)?;

    if args.iter().any(|arg| arg == "--showcase") {
        showcase(&mut config);
    }
    let config = Arc::new(config);

    let game_data = Arc::new(GameData::new());
    let (tx, rx) = mpsc::channel();

    let game_thread = {
        let game_data = game_data.clone();
        let config = config.clone();
        std::thread::spawn(move || {
            let mut game = demo_world();
            for frame in 0..frames {
                step(&mut game, frame);
                game_data.update(&game, &config);
                if tx.send(Message::Frame(frame)).is_err() {
                    break;
                }
            }
        })
    };
    info!("started game thread");

    let mut draw = RecordingDrawList::new(SCREEN_SIZE);
    let mut total = 0;
    for message in rx {
        match message {
            Message::Frame(frame) => {
                draw.clear();
                StreamProofEsp::render(&mut draw, &game_data, &config);
                total += draw.len();
                debug!("frame {frame}: {} draw commands", draw.len());
            }
        }
    }

    game_thread
        .join()
        .map_err(|_| anyhow!("game thread panicked"))?;

    let snapshot = game_data.lock();
    info!(
        "done: {total} draw commands, {} players, {} projectiles, latency {} ms",
        snapshot.players().len(),
        snapshot.projectiles().len(),
        game_data.net_outgoing_latency()
    );
    Ok(())
}

fn weapon_info(kind: WeaponType, key: &str, max_clip: i32) -> WeaponInfo {
    WeaponInfo {
        kind,
        name: key.to_owned(),
        max_clip,
    }
}

/// A local player facing +x, an enemy crossing its view, a dropped rifle,
/// a chicken, a smoke grenade and the map's fog controller.
fn demo_world() -> SimGame {
    let mut game = SimGame::new();
    game.latency = Some(0.032);
    game.localization.extend([
        ("#SFUI_WPNHUD_AK47".to_owned(), "AK-47".to_owned()),
        ("#SFUI_WPNHUD_AWP".to_owned(), "AWP".to_owned()),
    ]);

    let local = game.spawn(
        LOCAL,
        SimEntity::player("local", Team::CounterTerrorists, Vec3::ZERO),
    );
    game.local = Some(LOCAL);

    let enemy = game.spawn(
        ENEMY,
        SimEntity::player("enemy", Team::Terrorists, Vec3::new(600.0, -200.0, 0.0)),
    );
    let rifle_handle = game.spawn(
        ENEMY_RIFLE,
        SimEntity {
            owner: enemy,
            ..SimEntity::weapon(
                WeaponId::Ak47,
                weapon_info(WeaponType::Rifle, "#SFUI_WPNHUD_AK47", 30),
                Vec3::ZERO,
            )
        },
    );
    if let Some(enemy) = game.get_mut(ENEMY) {
        enemy.active_weapon = rifle_handle;
        enemy.eye_angles = Vec3::new(0.0, 180.0, 0.0);
    }

    game.spawn(
        DROPPED_RIFLE,
        SimEntity::weapon(
            WeaponId::Awp,
            weapon_info(WeaponType::SniperRifle, "#SFUI_WPNHUD_AWP", 5),
            Vec3::new(300.0, 100.0, 0.0),
        ),
    );
    game.spawn(
        CHICKEN,
        SimEntity::new(ClassId::Chicken, Vec3::new(400.0, 150.0, 0.0)),
    );
    game.spawn(
        GRENADE,
        SimEntity::projectile(
            ClassId::SmokeGrenadeProjectile,
            Vec3::new(0.0, 0.0, 60.0),
            local,
        ),
    );
    game.spawn(FOG, SimEntity::new(ClassId::FogController, Vec3::ZERO));

    if let Some(resource) = game.resource.as_mut() {
        for index in [LOCAL, ENEMY] {
            resource.entries.insert(
                index,
                ResourceEntry {
                    armor: 100,
                    alive: true,
                    health: 100,
                    ..Default::default()
                },
            );
        }
    }

    game.look_through_local_player();
    game
}

fn step(game: &mut SimGame, frame: i32) {
    game.advance(TICK);

    if let Some(enemy) = game.get_mut(ENEMY) {
        enemy.origin.y += 4.0;
        enemy.dormant = frame >= ENEMY_DORMANT_FRAME;
    }

    if let Some(grenade) = game.get_mut(GRENADE) {
        if frame < GRENADE_FLIGHT {
            let t = (frame + 1) as f32 * TICK;
            grenade.origin = Vec3::new(700.0 * t, 0.0, 60.0 + 300.0 * t - 400.0 * t * t);
        } else {
            grenade.did_smoke_effect = true;
        }
    }

    game.look_through_local_player();
}

/// Turns on boxes, names and trails for everything, in memory only.
fn showcase(config: &mut Config) {
    let shared = |color: Color32| SharedEsp {
        name: ColorToggle::enabled(color),
        box_style: BoxStyle {
            color: ColorToggle::enabled(color),
            kind: BoxType::FlatCorners,
            ..Default::default()
        },
        ..SharedEsp::enabled()
    };

    let esp = &mut config.esp;
    for (players, color) in [
        (&mut esp.enemies, Color32::RED),
        (&mut esp.allies, Color32::LIGHT_BLUE),
    ] {
        if let Some(all) = players.get_mut(ALL) {
            all.shared = shared(color);
            all.weapon = ColorToggle::enabled(Color32::WHITE);
            all.health_bar = HealthBar {
                color: ColorToggle::enabled(Color32::GREEN),
                kind: HealthBarType::Gradient,
            };
            all.skeleton = ColorToggleThickness {
                color: ColorToggle::enabled(Color32::WHITE),
                thickness: 1.0,
            };
        }
    }
    if let Some(weapons) = esp.weapons.get_mut(ALL) {
        weapons.shared = shared(Color32::YELLOW);
        weapons.ammo = ColorToggle::enabled(Color32::WHITE);
    }
    if let Some(projectiles) = esp.projectiles.get_mut(ALL) {
        projectiles.shared = shared(Color32::GRAY);
        projectiles.trails.enabled = true;
        projectiles.trails.local_player.color = ColorToggle::enabled(Color32::WHITE);
    }
    if let Some(entities) = esp.other_entities.get_mut(ALL) {
        *entities = shared(Color32::GOLD);
    }
}
