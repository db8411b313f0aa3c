use avian3d::prelude::{
    AngularVelocity, Collider, CollisionLayers, LayerMask as PhysicsLayerMask, RigidBody,
};
use rand::Rng;

use crate::prelude::*;
use crate::simulation::core::components::{Carrier, CelestialBody, Scenery, Terrain};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::resources::SessionLayout;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_lighting_and_camera,
                spawn_body_and_scenery.in_set(SceneBuildSet::World),
                spawn_carrier.in_set(SceneBuildSet::ProcessVehicle),
            ),
        )
        .add_systems(
            FixedUpdate,
            spin_carriers.in_set(SimulationSet::Actuation),
        );
    }
}

/// Physics membership for a collider on `layer`. Colliders do not filter
/// each other; the sensors filter by layer on their side.
fn layer_membership(layer: u8) -> CollisionLayers {
    CollisionLayers::new(
        PhysicsLayerMask(1u32 << (layer as u32 % 32)),
        PhysicsLayerMask::ALL,
    )
}

/// Mesh and material stores. Absent when running without a renderer.
type Meshes<'w> = Option<ResMut<'w, Assets<Mesh>>>;
type Materials<'w> = Option<ResMut<'w, Assets<StandardMaterial>>>;

fn spawn_lighting_and_camera(mut commands: Commands) {
    // --- Spawn Lighting ---
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(50.0, 100.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // --- Spawn Camera ---
    let camera_transform = Transform::from_xyz(-40.0, 35.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y);
    commands.spawn((Camera3d::default(), camera_transform));
}

/// Spawns the celestial body with the ground slab and the seeded box field as
/// its children, so the whole surface turns with the body.
fn spawn_body_and_scenery(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    layout: Res<SessionLayout>,
    mut rng: ResMut<SimulationRng>,
    mut meshes: Meshes,
    mut materials: Materials,
) {
    let body_config = &config.body;
    let world = &config.world;
    info!(
        "[SCENE] Spawning body '{}' with {} obstacles (spin {:.2} deg/s)",
        body_config.name, world.obstacle_count, body_config.spin_rate_deg
    );

    let body = commands
        .spawn((
            Name::new(body_config.name.clone()),
            CelestialBody {
                name: body_config.name.clone(),
            },
            body_config.pose.to_bevy_transform(),
            RigidBody::Kinematic,
            AngularVelocity(Vec3::Y * (body_config.spin_rate_deg.to_radians() as f32)),
        ))
        .id();

    // --- Ground ---
    let extent = world.ground_half_extent.max(1.0) * 2.0;
    let mut ground = commands.spawn((
        Name::new("ground"),
        Terrain,
        Collider::cuboid(extent, 1.0, extent),
        layer_membership(layout.0.terrain),
        // Top face at y = 0.
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));
    if let (Some(meshes), Some(materials)) = (meshes.as_mut(), materials.as_mut()) {
        ground.insert((
            Mesh3d(meshes.add(Cuboid::new(extent, 1.0, extent))),
            MeshMaterial3d(materials.add(Color::srgb(0.35, 0.45, 0.3))),
        ));
    }
    let ground = ground.id();
    commands.entity(body).add_child(ground);

    // --- Scattered boxes ---
    let [min_size, max_size] = world.obstacle_size;
    let (min_size, max_size) = (min_size.min(max_size).max(0.1), max_size.max(min_size).max(0.1));
    let spread = world.obstacle_spread.abs().max(1.0);
    for i in 0..world.obstacle_count {
        let size = Vec3::new(
            rng.0.gen_range(min_size..=max_size),
            rng.0.gen_range(min_size..=max_size),
            rng.0.gen_range(min_size..=max_size),
        );
        let position = Vec3::new(
            rng.0.gen_range(-spread..=spread),
            size.y * 0.5,
            rng.0.gen_range(-spread..=spread),
        );
        let yaw = rng.0.gen_range(0.0..std::f32::consts::TAU);

        let mut obstacle = commands.spawn((
            Name::new(format!("obstacle_{i}")),
            Scenery,
            Collider::cuboid(size.x, size.y, size.z),
            layer_membership(layout.0.scenery),
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
        ));
        if let (Some(meshes), Some(materials)) = (meshes.as_mut(), materials.as_mut()) {
            obstacle.insert((
                Mesh3d(meshes.add(Cuboid::from_size(size))),
                MeshMaterial3d(materials.add(Color::srgb(0.6, 0.55, 0.5))),
            ));
        }
        let obstacle = obstacle.id();
        commands.entity(body).add_child(obstacle);
    }
}

/// Spawns the part the sensors are mounted on. It sits on the parts layer and
/// is moved by script, not by the solver.
fn spawn_carrier(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    layout: Res<SessionLayout>,
    mut meshes: Meshes,
    mut materials: Materials,
) {
    let carrier = &config.carrier;
    info!(
        "[SPAWN] Spawning carrier '{}' (yaw {:.1} deg/s)",
        carrier.name, carrier.yaw_rate_deg
    );

    let mut entity = commands.spawn((
        Name::new(carrier.name.clone()),
        Carrier {
            yaw_rate: carrier.yaw_rate_deg.to_radians() as f32,
        },
        carrier.pose.to_bevy_transform(),
        RigidBody::Kinematic,
        Collider::cylinder(0.3, 2.0),
        layer_membership(layout.0.parts),
    ));
    if let (Some(meshes), Some(materials)) = (meshes.as_mut(), materials.as_mut()) {
        entity.insert((
            Mesh3d(meshes.add(Cylinder::new(0.3, 2.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.8, 0.85))),
        ));
    }
}

/// Turns every carrier about world +Y.
fn spin_carriers(time: Res<Time>, mut carriers: Query<(&Carrier, &mut Transform)>) {
    let dt = time.delta_secs();
    for (carrier, mut transform) in &mut carriers {
        if carrier.yaw_rate != 0.0 {
            transform.rotate_y(carrier.yaw_rate * dt);
        }
    }
}
