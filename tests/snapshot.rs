use approx::assert_relative_eq;
use glam::Vec3;

use esp_overlay::{
    bvh::{Bvh, Triangle},
    config::Config,
    game::{AVATAR_SIZE, ClassId, Handle, ObserverMode, Team, weapon::WeaponId},
    game_data::{GameData, ObserverData},
    sim::{SimEntity, SimGame},
};

const LOCAL: i32 = 1;
const ENEMY: i32 = 2;

/// Local player at the origin looking down +x, enemy 600 units ahead.
fn world() -> (SimGame, Handle, Handle) {
    let mut game = SimGame::new();
    let local = game.spawn(
        LOCAL,
        SimEntity::player("me", Team::CounterTerrorists, Vec3::ZERO),
    );
    game.local = Some(LOCAL);
    let enemy = game.spawn(
        ENEMY,
        SimEntity::player("them", Team::Terrorists, Vec3::new(600.0, 0.0, 0.0)),
    );
    game.look_through_local_player();
    (game, local, enemy)
}

fn tick(game: &mut SimGame, data: &GameData, config: &Config) {
    game.advance(1.0 / 64.0);
    data.update(game, config);
}

#[test]
fn no_local_player_clears_cross_frame_records() {
    let (mut game, _, _) = world();
    let data = GameData::new();
    let config = Config::default();

    tick(&mut game, &data, &config);
    assert_eq!(data.lock().players().len(), 1);
    assert_eq!(data.lock().game_mode(), "casual");

    game.local = None;
    tick(&mut game, &data, &config);
    let snapshot = data.lock();
    assert!(!snapshot.local().exists);
    assert!(snapshot.players().is_empty());
    assert!(snapshot.projectiles().is_empty());
    assert_eq!(snapshot.game_mode(), "");
}

#[test]
fn visibility_is_refreshed_at_most_every_tenth_of_a_second() {
    let (mut game, _, _) = world();
    let data = GameData::new();
    let config = Config::default();

    game.advance(0.05);
    data.update(&game, &config);
    assert!(data.lock().players()[0].visible);

    game.world = Some(Bvh::from_triangles(vec![Triangle::new(
        Vec3::new(300.0, -500.0, -500.0),
        Vec3::new(300.0, 500.0, -500.0),
        Vec3::new(300.0, 0.0, 500.0),
    )]));
    game.advance(0.05);
    data.update(&game, &config);
    assert!(data.lock().players()[0].visible);

    game.advance(0.1);
    data.update(&game, &config);
    assert!(!data.lock().players()[0].visible);
}

#[test]
fn enemy_in_view_is_tracked_and_visible() {
    let (mut game, _, enemy) = world();
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    let player = snapshot.player_by_handle(enemy).unwrap();
    assert_eq!(player.name, "them");
    assert!(player.enemy);
    assert!(player.alive);
    assert!(player.in_view_frustum);
    assert!(player.visible);
    assert_eq!(player.bones.len(), 18);
    assert_relative_eq!(player.base.distance_to_local, 600.0);
    assert_eq!(player.last_contact_time, snapshot.realtime());
}

#[test]
fn player_behind_camera_is_out_of_frustum() {
    let (mut game, _, enemy) = world();
    game.get_mut(ENEMY).unwrap().origin = Vec3::new(-600.0, 0.0, 0.0);
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    let player = snapshot.player_by_handle(enemy).unwrap();
    assert!(!player.in_view_frustum);
    assert!(!player.visible);
    assert!(player.bones.is_empty());
}

#[test]
fn same_frame_is_not_rebuilt() {
    let (mut game, _, enemy) = world();
    let data = GameData::new();
    let config = Config::default();
    tick(&mut game, &data, &config);

    game.get_mut(ENEMY).unwrap().health = 42;
    data.update(&game, &config);
    assert_eq!(data.lock().player_by_handle(enemy).unwrap().health, 100);

    tick(&mut game, &data, &config);
    assert_eq!(data.lock().player_by_handle(enemy).unwrap().health, 42);
}

#[test]
fn players_are_updated_in_place() {
    let (mut game, _, enemy) = world();
    let data = GameData::new();
    let config = Config::default();

    for _ in 0..5 {
        game.get_mut(ENEMY).unwrap().origin.y += 10.0;
        tick(&mut game, &data, &config);
    }

    let snapshot = data.lock();
    assert_eq!(snapshot.players().len(), 1);
    assert_eq!(snapshot.players()[0].handle, enemy);
    assert_eq!(snapshot.players()[0].origin.y, 50.0);
}

#[test]
fn unresolved_players_are_evicted_immediately() {
    let (mut game, _, enemy) = world();
    let data = GameData::new();
    let config = Config::default();
    tick(&mut game, &data, &config);

    game.remove(ENEMY);
    tick(&mut game, &data, &config);
    assert!(data.lock().player_by_handle(enemy).is_none());
}

#[test]
fn players_are_sorted_farthest_first() {
    let (mut game, _, _) = world();
    game.spawn(
        3,
        SimEntity::player("near", Team::Terrorists, Vec3::new(200.0, 0.0, 0.0)),
    );
    game.spawn(
        4,
        SimEntity::player("far", Team::Terrorists, Vec3::new(900.0, 0.0, 0.0)),
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    let names: Vec<_> = snapshot.players().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["far", "them", "near"]);
}

#[test]
fn dormant_player_keeps_contact_time_and_fades() {
    let (mut game, _, enemy) = world();
    let data = GameData::new();
    let config = Config::default();
    tick(&mut game, &data, &config);
    let contact = data.lock().player_by_handle(enemy).unwrap().last_contact_time;

    game.get_mut(ENEMY).unwrap().dormant = true;
    game.resource
        .as_mut()
        .unwrap()
        .entries
        .entry(ENEMY)
        .or_default()
        .alive = true;
    for _ in 0..64 {
        tick(&mut game, &data, &config);
    }

    let snapshot = data.lock();
    let player = snapshot.player_by_handle(enemy).unwrap();
    assert!(player.dormant);
    assert!(player.alive);
    assert_eq!(player.last_contact_time, contact);
    let alpha = player.fading_alpha(snapshot.realtime());
    assert!(alpha > 0.0 && alpha < 1.0);
}

#[test]
fn in_eye_observer_target_is_skipped() {
    let (mut game, _, enemy) = world();
    {
        let local = game.get_mut(LOCAL).unwrap();
        local.alive = false;
        local.observer_mode = ObserverMode::InEye;
        local.observer_target = enemy;
    }
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    assert!(snapshot.players().is_empty());
    assert_eq!(snapshot.local().origin, Vec3::new(600.0, 0.0, 0.0));
}

#[test]
fn dead_players_spectating_are_observers() {
    let (mut game, local, _) = world();
    let spectator = game.spawn(
        3,
        SimEntity {
            alive: false,
            observer_mode: ObserverMode::Chase,
            observer_target: local,
            ..SimEntity::player("ghost", Team::Terrorists, Vec3::new(50.0, 0.0, 0.0))
        },
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    assert_eq!(
        data.lock().observers(),
        [ObserverData {
            player: spectator,
            target: local,
            target_is_local_player: true,
        }]
    );
}

#[test]
fn only_unowned_weapons_are_listed() {
    let (mut game, _, enemy) = world();
    game.spawn(
        10,
        SimEntity {
            owner: enemy,
            ..SimEntity::weapon(WeaponId::Ak47, Default::default(), Vec3::ZERO)
        },
    );
    game.spawn(
        11,
        SimEntity::weapon(
            WeaponId::Awp,
            Default::default(),
            Vec3::new(100.0, 0.0, 0.0),
        ),
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    assert_eq!(snapshot.weapons().len(), 1);
    assert_eq!(snapshot.weapons()[0].name, "AWP");
}

#[test]
fn dormant_entities_and_unknown_coins_are_skipped() {
    let (mut game, _, _) = world();
    game.spawn(
        20,
        SimEntity::new(ClassId::Chicken, Vec3::new(100.0, 0.0, 0.0)),
    );
    game.spawn(
        21,
        SimEntity {
            dormant: true,
            ..SimEntity::new(ClassId::Chicken, Vec3::new(100.0, 0.0, 0.0))
        },
    );
    game.spawn(
        22,
        SimEntity {
            model: Some("models/props/crate.mdl".into()),
            ..SimEntity::new(ClassId::DynamicProp, Vec3::ZERO)
        },
    );
    game.spawn(
        23,
        SimEntity {
            model: Some("models/inventory_items/challenge_coin.mdl".into()),
            ..SimEntity::new(ClassId::DynamicProp, Vec3::ZERO)
        },
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    let names: Vec<_> = snapshot.entities().iter().map(|e| e.name).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Chicken"));
    assert!(names.contains(&"Collectable Coin"));
}

#[test]
fn trajectory_grows_on_movement_only() {
    let (mut game, local, _) = world();
    game.spawn(
        30,
        SimEntity::projectile(
            ClassId::MolotovProjectile,
            Vec3::new(10.0, 0.0, 60.0),
            local,
        ),
    );
    let data = GameData::new();
    let config = Config::default();

    tick(&mut game, &data, &config);
    tick(&mut game, &data, &config);
    game.get_mut(30).unwrap().origin.x += 20.0;
    tick(&mut game, &data, &config);

    let snapshot = data.lock();
    let projectile = &snapshot.projectiles()[0];
    assert_eq!(projectile.name, "Molotov");
    assert!(projectile.thrown_by_local_player);
    assert!(!projectile.exploded);
    assert_eq!(projectile.trajectory.len(), 2);
    assert_eq!(projectile.trajectory[1].1, Vec3::new(30.0, 0.0, 60.0));
}

#[test]
fn vanished_projectiles_are_kept_for_a_minute() {
    let (mut game, _, enemy) = world();
    game.spawn(
        30,
        SimEntity::projectile(ClassId::DecoyProjectile, Vec3::new(10.0, 0.0, 0.0), enemy),
    );
    let data = GameData::new();
    let config = Config::default();

    // the first sample is taken on the frame after the projectile shows up
    game.advance(0.5);
    data.update(&game, &config);
    game.advance(0.5);
    data.update(&game, &config);
    assert!(data.lock().projectiles()[0].thrown_by_enemy);

    game.remove(30);
    game.advance(59.9);
    data.update(&game, &config);
    {
        let snapshot = data.lock();
        assert_eq!(snapshot.projectiles().len(), 1);
        assert!(snapshot.projectiles()[0].exploded);
    }

    game.advance(0.2);
    data.update(&game, &config);
    assert!(data.lock().projectiles().is_empty());
}

#[test]
fn hidden_grenade_is_marked_exploded() {
    let (mut game, local, _) = world();
    game.spawn(
        30,
        SimEntity::projectile(
            ClassId::BaseCsGrenadeProjectile,
            Vec3::new(10.0, 0.0, 0.0),
            local,
        ),
    );
    let data = GameData::new();
    let config = Config::default();
    tick(&mut game, &data, &config);

    game.get_mut(30).unwrap().should_draw = false;
    tick(&mut game, &data, &config);
    let snapshot = data.lock();
    assert_eq!(snapshot.projectiles().len(), 1);
    assert!(snapshot.projectiles()[0].exploded);
}

#[test]
fn clearing_projectile_list() {
    let (mut game, local, _) = world();
    game.spawn(
        30,
        SimEntity::projectile(ClassId::SnowballProjectile, Vec3::new(10.0, 0.0, 0.0), local),
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());
    assert_eq!(data.lock().projectiles().len(), 1);

    data.clear_projectile_list();
    assert!(data.lock().projectiles().is_empty());
}

#[test]
fn popped_smoke_is_listed() {
    let (mut game, local, _) = world();
    game.spawn(
        30,
        SimEntity {
            did_smoke_effect: true,
            ..SimEntity::projectile(
                ClassId::SmokeGrenadeProjectile,
                Vec3::new(300.0, 0.0, 0.0),
                local,
            )
        },
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    assert_eq!(snapshot.smokes().len(), 1);
    assert_eq!(snapshot.smokes()[0].origin, Vec3::new(300.0, 0.0, 0.0));
    assert_eq!(snapshot.projectiles().len(), 1);
}

#[test]
fn fog_is_written_unless_disabled() {
    let (mut game, _, _) = world();
    game.spawn(40, SimEntity::new(ClassId::FogController, Vec3::ZERO));
    let data = GameData::new();
    let mut config = Config::default();

    tick(&mut game, &data, &config);
    assert_eq!(game.get(40).unwrap().fog.get(), None);

    config.fog.no_fog = false;
    config.fog.enabled = true;
    config.fog.color = [1.0, 0.0, 0.0];
    config.fog.end = 500.0;
    tick(&mut game, &data, &config);

    let fog = game.get(40).unwrap().fog.get().unwrap();
    assert!(fog.enabled);
    assert_eq!(fog.color, [255, 0, 0]);
    assert_eq!(fog.end, 500.0);
}

#[test]
fn latency_is_whole_milliseconds() {
    let (mut game, _, _) = world();
    let data = GameData::new();
    let config = Config::default();

    game.latency = Some(0.0456);
    tick(&mut game, &data, &config);
    assert_eq!(data.net_outgoing_latency(), 45);

    game.latency = None;
    tick(&mut game, &data, &config);
    assert_eq!(data.net_outgoing_latency(), 0);
}

#[test]
fn rank_names_use_game_mode_table() {
    let (mut game, _, enemy) = world();
    game.localization
        .insert("RankName_3".into(), "Silver III".into());
    game.localization
        .insert("skillgroup_3dangerzone".into(), "Hunter".into());
    game.resource
        .as_mut()
        .unwrap()
        .entries
        .entry(ENEMY)
        .or_default()
        .rank = 3;
    let data = GameData::new();
    let config = Config::default();

    tick(&mut game, &data, &config);
    {
        let snapshot = data.lock();
        let player = snapshot.player_by_handle(enemy).unwrap();
        assert_eq!(player.rank_name(&snapshot), "Silver III");
    }

    game.game_mode = "survival".into();
    tick(&mut game, &data, &config);
    let snapshot = data.lock();
    let player = snapshot.player_by_handle(enemy).unwrap();
    assert_eq!(player.rank_name(&snapshot), "Hunter");
}

#[test]
fn bomb_site_follows_nearest_center() {
    let (mut game, _, _) = world();
    {
        let resource = game.resource.as_mut().unwrap();
        resource.bombsite_a = Vec3::new(-1000.0, 0.0, 0.0);
        resource.bombsite_b = Vec3::new(1000.0, 0.0, 0.0);
    }
    game.spawn(
        50,
        SimEntity {
            c4_ticking: true,
            c4_blow_time: 40.0,
            c4_timer_length: 40.0,
            ..SimEntity::new(ClassId::PlantedC4, Vec3::new(800.0, 0.0, 0.0))
        },
    );
    let data = GameData::new();
    tick(&mut game, &data, &Config::default());

    let snapshot = data.lock();
    let bomb = snapshot.planted_c4();
    assert!(bomb.is_ticking());
    assert!(!bomb.is_being_defused());
    assert_eq!(bomb.bombsite, esp_overlay::game_data::Bombsite::B);
}

#[test]
fn avatars_are_dropped_with_their_players() {
    let (mut game, _, _) = world();
    let platform_id = 76_561_198_000_000_001;
    game.avatars
        .insert(platform_id, vec![128; 4 * AVATAR_SIZE * AVATAR_SIZE]);
    let friend = game.spawn(
        3,
        SimEntity {
            platform_id,
            ..SimEntity::player("friend", Team::CounterTerrorists, Vec3::new(100.0, 0.0, 0.0))
        },
    );
    let data = GameData::new();
    let config = Config::default();
    tick(&mut game, &data, &config);
    assert!(data.lock().has_avatar(friend));

    data.clear_unused_avatars();
    assert!(data.lock().has_avatar(friend));

    game.remove(3);
    tick(&mut game, &data, &config);
    data.clear_unused_avatars();
    assert!(!data.lock().has_avatar(friend));
}
