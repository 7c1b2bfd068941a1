use bevy::prelude::*;
use bevy::math::primitives::Circle;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};

use crate::simulation::scenario::Scenario;
use crate::visualization::renderer::{gas_rgba, FLASH_COLOR};

#[derive(Component)]
struct StarIndex(pub usize);

#[derive(Component)]
struct GasLayer;

/// Yellow marker for a supernova, removed after `ttl` frames
#[derive(Component)]
struct FlashMarker {
    ttl: u32,
}

#[derive(Resource)]
struct GasTexture(Handle<Image>);

/// Screen pixels per kpc
const SCALE: f32 = 30.0;
/// Gas texture resolution (independent of the simulation grid)
const GAS_TEXTURE_SIZE: u32 = 256;
const STAR_RADIUS: f32 = 0.6;
const FLASH_RADIUS: f32 = 4.0;
const FLASH_TTL: u32 = 12;

pub fn run_2d(scenario: Scenario) {
    log::info!("run_2d: starting Bevy 2D viewer with {} stars", scenario.stars.len());

    App::new()
        .insert_resource(scenario)
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_scene_system)
        .add_systems(
            Update,
            (physics_step_system, sync_transforms_system, refresh_gas_system, fade_flashes_system).chain(),
        )
        .run();
}

fn gas_image(scenario: &Scenario) -> Image {
    Image::new(
        Extent3d {
            width: GAS_TEXTURE_SIZE,
            height: GAS_TEXTURE_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        gas_rgba(&scenario.gas, GAS_TEXTURE_SIZE),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

fn setup_scene_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    // 2D camera
    commands.spawn(Camera2dBundle::default());

    // Gas as one textured sprite covering the domain, behind the stars
    let texture = images.add(gas_image(&scenario));
    let side = scenario.gas.size_kpc() as f32 * SCALE;
    commands.spawn((
        SpriteBundle {
            texture: texture.clone(),
            sprite: Sprite {
                custom_size: Some(Vec2::splat(side)),
                ..Default::default()
            },
            transform: Transform::from_xyz(0.0, 0.0, -1.0),
            ..Default::default()
        },
        GasLayer,
    ));
    commands.insert_resource(GasTexture(texture));

    // One shared mesh and material for every star
    let mesh = Mesh2dHandle(meshes.add(Circle::new(STAR_RADIUS)));
    let material = materials.add(ColorMaterial::from(Color::WHITE));

    for (i, (x, y)) in scenario.stars.x().iter().zip(scenario.stars.y()).enumerate() {
        commands.spawn((
            MaterialMesh2dBundle {
                mesh: mesh.clone(),
                material: material.clone(),
                transform: Transform::from_xyz(*x as f32 * SCALE, *y as f32 * SCALE, 0.0),
                ..Default::default()
            },
            StarIndex(i),
        ));
    }
}

fn physics_step_system(
    mut commands: Commands,
    mut scenario: ResMut<Scenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut exit: EventWriter<AppExit>,
) {
    if scenario.is_finished() {
        return;
    }

    let out = match scenario.advance() {
        Ok(out) => out,
        Err(e) => {
            log::error!("stopping viewer: {e}");
            exit.send(AppExit::error());
            return;
        }
    };

    let Some(flashes) = out.flashes else {
        return;
    };

    let [r, g, b] = FLASH_COLOR;
    let mesh = Mesh2dHandle(meshes.add(Circle::new(FLASH_RADIUS)));
    let material = materials.add(ColorMaterial::from(Color::srgb_u8(r, g, b)));
    for f in flashes {
        commands.spawn((
            MaterialMesh2dBundle {
                mesh: mesh.clone(),
                material: material.clone(),
                transform: Transform::from_xyz(f.x as f32 * SCALE, f.y as f32 * SCALE, 1.0),
                ..Default::default()
            },
            FlashMarker { ttl: FLASH_TTL },
        ));
    }
}

fn sync_transforms_system(scenario: Res<Scenario>, mut query: Query<(&StarIndex, &mut Transform)>) {
    let (xs, ys) = (scenario.stars.x(), scenario.stars.y());
    for (StarIndex(i), mut transform) in &mut query {
        if let (Some(x), Some(y)) = (xs.get(*i), ys.get(*i)) {
            transform.translation.x = (*x as f32) * SCALE;
            transform.translation.y = (*y as f32) * SCALE;
        }
    }
}

fn refresh_gas_system(scenario: Res<Scenario>, texture: Res<GasTexture>, mut images: ResMut<Assets<Image>>) {
    if let Some(image) = images.get_mut(&texture.0) {
        image.data = gas_rgba(&scenario.gas, GAS_TEXTURE_SIZE);
    }
}

fn fade_flashes_system(mut commands: Commands, mut query: Query<(Entity, &mut FlashMarker)>) {
    for (entity, mut marker) in &mut query {
        if marker.ttl == 0 {
            commands.entity(entity).despawn();
        } else {
            marker.ttl -= 1;
        }
    }
}
