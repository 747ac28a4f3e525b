//! Arcade Physics headless demo
//!
//! Drops a seeded pile of boxes and circles onto a floor, walks a kinematic
//! player into a wall through a trigger zone, fires a projectile through
//! the pile and casts a ray down the middle.
//!
//! Usage: `arcade-physics [settings.json] [seed]`

use arcade_physics::{
    ArcadeRigidbody, EntityId, Mover, PhysicsSettings, PhysicsWorld, ProjectileMover, Rect,
    Rigidbodies, Shape, ShapeCollider,
    consts::{ALL_LAYERS, SIM_DT},
    physics::TriggerEvent,
};

mod scene {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use super::*;

    pub const FLOOR: EntityId = EntityId(0);
    pub const WALL: EntityId = EntityId(1);
    pub const ZONE: EntityId = EntityId(2);
    pub const PLAYER: EntityId = EntityId(3);
    pub const BULLET: EntityId = EntityId(4);
    /// Falling bodies get ids from here up
    pub const FIRST_BODY: u32 = 100;

    pub const BODY_COUNT: u32 = 24;
    pub const FLOOR_Y: f32 = 500.0;

    /// Static geometry, the player, the projectile and a seeded pile of
    /// rigidbodies
    pub fn build(world: &mut PhysicsWorld, bodies: &mut Rigidbodies, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);

        world.add_collider(ShapeCollider::new(
            FLOOR,
            Shape::Box(Rect::new(-100.0, FLOOR_Y, 1200.0, 40.0)),
        ));
        world.add_collider(ShapeCollider::new(
            WALL,
            Shape::Box(Rect::new(900.0, FLOOR_Y - 200.0, 20.0, 200.0)),
        ));
        world.add_collider(
            ShapeCollider::new(ZONE, Shape::Box(Rect::new(700.0, FLOOR_Y - 100.0, 80.0, 100.0)))
                .trigger(),
        );
        world.add_collider(ShapeCollider::new(
            PLAYER,
            Shape::Box(Rect::new(600.0, FLOOR_Y - 32.0, 16.0, 32.0)),
        ));
        world.add_collider(ShapeCollider::new(
            BULLET,
            Shape::circle(Vec2::new(-50.0, FLOOR_Y - 20.0), 3.0),
        ));

        for i in 0..BODY_COUNT {
            let entity = EntityId(FIRST_BODY + i);
            let x = rng.random_range(50.0..450.0);
            let y = rng.random_range(0.0..FLOOR_Y - 100.0);

            let shape = if rng.random_bool(0.5) {
                let w = rng.random_range(10.0..30.0);
                let h = rng.random_range(10.0..30.0);
                Shape::Box(Rect::new(x, y, w, h))
            } else {
                Shape::circle(Vec2::new(x, y), rng.random_range(5.0..15.0))
            };
            world.add_collider(ShapeCollider::new(entity, shape));

            let body = ArcadeRigidbody::new()
                .with_mass(rng.random_range(1.0..20.0))
                .with_elasticity(rng.random_range(0.0..0.6))
                .with_friction(rng.random_range(0.2..0.9));
            bodies.insert(entity, body);
        }

        log::info!("Scene built: {} rigidbodies (seed {})", bodies.len(), seed);
    }
}

fn main() {
    use glam::Vec2;

    env_logger::init();
    log::info!("Arcade Physics demo starting...");

    let mut args = std::env::args().skip(1);
    let settings = args
        .next()
        .map(PhysicsSettings::load)
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let mut world = PhysicsWorld::new(settings);
    let mut bodies = Rigidbodies::new();
    scene::build(&mut world, &mut bodies, seed);

    let mut events: Vec<TriggerEvent> = Vec::new();

    // Let the pile settle
    for _ in 0..240 {
        bodies.update(&mut world, SIM_DT);
    }

    let resting = bodies
        .iter()
        .filter(|(_, body)| body.velocity.length() < 5.0)
        .count();
    log::info!("After 4s: {}/{} bodies nearly at rest", resting, bodies.len());

    // Walk the player right until the wall stops it
    let mut player = Mover::new(scene::PLAYER);
    let mut blocked = 0;
    for _ in 0..120 {
        if let Some(hit) = player.move_by(&mut world, Vec2::new(4.0, 0.0), &mut events) {
            log::debug!("Player blocked by {:?}", hit.collider);
            blocked += 1;
        }
    }
    if let Some(&id) = world.colliders_of(scene::PLAYER).first()
        && let Some(collider) = world.collider(id)
    {
        log::info!(
            "Player stopped at x = {:.1} after {} blocked moves",
            collider.shape.bounds().right(),
            blocked
        );
    }

    // Projectile skims along the floor through the pile
    let mut bullet = ProjectileMover::new(scene::BULLET);
    let mut bullet_hits = 0;
    for _ in 0..60 {
        if bullet.move_by(&mut world, Vec2::new(10.0, 0.0), &mut events) {
            bullet_hits += 1;
        }
    }
    log::info!("Projectile overlapped something on {} of 60 steps", bullet_hits);

    let enters = events
        .iter()
        .filter(|e| matches!(e, TriggerEvent::Enter { .. }))
        .count();
    log::info!(
        "Trigger events: {} enter, {} exit",
        enters,
        events.len() - enters
    );

    match world.linecast(
        Vec2::new(250.0, -200.0),
        Vec2::new(250.0, scene::FLOOR_Y + 100.0),
        ALL_LAYERS,
    ) {
        Some(hit) => log::info!(
            "Linecast hit {:?} at ({:.1}, {:.1}), distance {:.1}",
            hit.collider,
            hit.point.x,
            hit.point.y,
            hit.distance
        ),
        None => log::info!("Linecast hit nothing"),
    }

    log::info!(
        "{} colliders in {} grid cells",
        world.all_colliders().len(),
        world.spatial_hash().cell_count()
    );
}
