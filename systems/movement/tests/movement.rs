use std::time::Duration;

use tower_war_core::{ArrivalOutcome, Command, Event, Owner, Position, TowerId};
use tower_war_system_movement::Movement;
use tower_war_world::{self as world, query, World};

fn dispatch(world: &mut World, side: Owner, source: TowerId, target: TowerId) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::DispatchTroops {
            side,
            sources: vec![source],
            target,
        },
        &mut events,
    )
    .expect("valid order");
}

fn pump(world: &mut World, movement: &mut Movement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events).expect("tick");

    let mut commands = Vec::new();
    movement.handle(&events, &query::troop_view(world), &mut commands);

    let mut generated = Vec::new();
    for command in commands {
        world::apply(world, command, &mut generated).expect("movement command");
    }
    generated
}

#[test]
fn troop_reaches_target_after_travel_time() {
    let mut world = World::new(100.0);
    let player = world
        .place_tower(Position::new(0.0, 0.0), Owner::Player, 20, 50, 1)
        .expect("tower");
    let enemy = world
        .place_tower(Position::new(220.0, 0.0), Owner::Enemy, 10, 50, 1)
        .expect("tower");
    dispatch(&mut world, Owner::Player, player, enemy);

    let mut movement = Movement::default();
    let events = pump(&mut world, &mut movement, Duration::from_millis(1_000));
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::TroopAdvanced { .. })));
    let troop = query::troop_view(&world).into_vec().remove(0);
    assert!((troop.position.x() - 110.0).abs() < 0.5);

    let events = pump(&mut world, &mut movement, Duration::from_millis(1_100));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::TroopArrived {
            outcome: ArrivalOutcome::Captured,
            ..
        }
    )));
    assert_eq!(query::troops_in_flight(&world), 0);
    let tower = query::tower(&world, enemy).expect("tower");
    assert_eq!(tower.owner, Owner::Player);
    assert_eq!(tower.troops, 0);
}

#[test]
fn same_tick_arrivals_resolve_first_in_first_out() {
    let mut world = World::new(100.0);
    let player = world
        .place_tower(Position::new(0.0, 0.0), Owner::Player, 30, 50, 1)
        .expect("tower");
    let enemy = world
        .place_tower(Position::new(200.0, 0.0), Owner::Enemy, 24, 50, 1)
        .expect("tower");
    let neutral = world
        .place_tower(Position::new(100.0, 0.0), Owner::Neutral, 10, 50, 1)
        .expect("tower");

    dispatch(&mut world, Owner::Player, player, neutral);
    dispatch(&mut world, Owner::Enemy, enemy, neutral);

    let mut movement = Movement::default();
    let events = pump(&mut world, &mut movement, Duration::from_secs(5));

    let captures: Vec<(Owner, Owner)> = events
        .iter()
        .filter_map(|event| match event {
            Event::TowerCaptured {
                old_owner,
                new_owner,
                ..
            } => Some((*old_owner, *new_owner)),
            _ => None,
        })
        .collect();
    assert_eq!(
        captures,
        vec![(Owner::Neutral, Owner::Player), (Owner::Player, Owner::Enemy)]
    );

    let tower = query::tower(&world, neutral).expect("tower");
    assert_eq!(tower.owner, Owner::Enemy);
    assert_eq!(tower.troops, 7);
}
