use spacewarp::entities::*;
use spacewarp::gates::*;
use spacewarp::room::RoomState;
use spacewarp::tilemap::{GridTilemap, Tilemap};
use spacewarp::tiles::{GateColor, EMPTY};

fn doors() -> Vec<Door> {
    GateColor::ALL.into_iter().map(Door::new).collect()
}

/// A red button at tile (4, 4), i.e. pixel (32, 32).
fn red_button() -> Button {
    let mut button = Button::new(GateColor::Red);
    button.locations.push(TilePos::new(4, 4));
    button
}

fn press_once(x: i32, y: i32) -> u32 {
    let mut button = red_button();
    button.press(x, y, &mut doors());
    button.depression
}

// ── Plain data ────────────────────────────────────────────────────────────────

#[test]
fn tile_pos_pixels_and_display() {
    let pos = TilePos::new(3, 5);
    assert_eq!(pos.to_pixels(), (24, 40));
    assert_eq!(pos.to_string(), "(3, 5)");
}

#[test]
fn difficulty_names() {
    assert_eq!(Difficulty::default(), Difficulty::Normal);
    let labels: Vec<_> = Difficulty::ALL.iter().map(|d| d.label()).collect();
    assert_eq!(labels, ["Easy", "Normal", "Hard", "Lunatic"]);
    assert_eq!(Difficulty::Lunatic.level_name(), "lunatic");
}

// ── Key ───────────────────────────────────────────────────────────────────────

#[test]
fn key_unlocks_only_its_own_color() {
    let mut key = Key::new(GateColor::Green);
    let mut doors = doors();
    key.collect(&mut doors);

    assert!(key.collected);
    assert!(!doors[0].unlocked);
    assert!(doors[1].unlocked);
    assert!(!doors[2].unlocked);
}

#[test]
fn collecting_twice_changes_nothing() {
    let mut key = Key::new(GateColor::Red);
    let mut doors = doors();
    key.collect(&mut doors);
    let (key_after, doors_after) = (key.clone(), doors.clone());
    key.collect(&mut doors);
    assert_eq!(key, key_after);
    assert_eq!(doors, doors_after);
}

#[test]
fn key_tiles_follow_collection() {
    let mut map = GridTilemap::new(4, 4);
    let mut key = Key::new(GateColor::Blue);
    key.locations.push(TilePos::new(1, 2));

    key.apply_tiles(&mut map);
    assert_eq!(map.tile_at(1, 2), GateColor::Blue.key());

    key.collect(&mut doors());
    key.apply_tiles(&mut map);
    assert_eq!(map.tile_at(1, 2), EMPTY);
}

// ── Door ──────────────────────────────────────────────────────────────────────

#[test]
fn unlocked_door_stays_passable() {
    let mut door = Door::new(GateColor::Red);
    door.unlock();
    for _ in 0..500 {
        door.tick();
        assert!(door.is_passable());
    }
    assert_eq!(door.state(), DoorState::Open);
}

#[test]
fn hold_open_never_shortens() {
    let mut door = Door::new(GateColor::Red);
    door.hold_open(FULL_PRESS);
    door.hold_open(2);
    assert_eq!(door.hold_timer, FULL_PRESS);
    door.hold_open(0);
    assert_eq!(door.hold_timer, FULL_PRESS);
}

#[test]
fn full_hold_stays_passable_for_149_ticks() {
    let mut door = Door::new(GateColor::Green);
    door.hold_open(FULL_PRESS);
    for _ in 0..FULL_PRESS - 1 {
        door.tick();
        assert!(door.is_passable());
    }
    door.tick();
    assert!(!door.is_passable());
    assert_eq!(door.state(), DoorState::Closing);
}

#[test]
fn door_tiles_follow_passability() {
    let mut map = GridTilemap::new(4, 4);
    let mut door = Door::new(GateColor::Green);
    door.locations.push(TilePos::new(2, 1));

    door.apply_tiles(&mut map);
    assert_eq!(map.tile_at(2, 1), GateColor::Green.door_top());
    assert_eq!(map.tile_at(2, 2), GateColor::Green.door_bottom());

    door.hold_open(1);
    door.apply_tiles(&mut map);
    assert_eq!(map.tile_at(2, 1), EMPTY);
    assert_eq!(map.tile_at(2, 2), EMPTY);
}

#[test]
fn closed_door_animation_is_idle() {
    let mut door = Door::new(GateColor::Blue);
    door.tick();
    assert_eq!(door.animation_phase, DOOR_CLOSED_PHASE);
    assert_eq!(door.state(), DoorState::Closed);
}

// ── Button ────────────────────────────────────────────────────────────────────

#[test]
fn standing_squarely_is_a_full_press() {
    assert_eq!(press_once(32, 32), FULL_PRESS);
    assert_eq!(press_once(28, 32), FULL_PRESS);
    assert_eq!(press_once(36, 32), FULL_PRESS);
}

#[test]
fn near_miss_is_a_partial_press() {
    assert_eq!(press_once(37, 32), 2);
    assert_eq!(press_once(27, 31), 2);
    // Centred but one pixel above the surface.
    assert_eq!(press_once(32, 31), 2);
}

#[test]
fn edge_contact_is_a_light_press() {
    assert_eq!(press_once(38, 32), 1);
    assert_eq!(press_once(26, 31), 1);
    assert_eq!(press_once(32, 30), 0);
}

#[test]
fn out_of_range_is_no_press() {
    assert_eq!(press_once(39, 32), 0);
    assert_eq!(press_once(25, 32), 0);
    assert_eq!(press_once(32, 33), 0);
}

#[test]
fn shallow_press_never_lowers_a_deeper_one() {
    let mut button = red_button();
    let mut doors = doors();

    button.depression = 100;
    button.press(37, 32, &mut doors);
    assert_eq!(button.depression, 100);

    button.depression = 2;
    button.press(38, 32, &mut doors);
    assert_eq!(button.depression, 2);

    button.depression = 1;
    button.press(37, 32, &mut doors);
    assert_eq!(button.depression, 2);
}

#[test]
fn press_holds_same_color_doors() {
    let mut button = red_button();
    let mut doors = doors();
    button.press(32, 32, &mut doors);

    assert_eq!(doors[0].hold_timer, FULL_PRESS);
    assert_eq!(doors[1].hold_timer, 0);
    assert_eq!(doors[2].hold_timer, 0);
}

#[test]
fn every_location_is_evaluated() {
    let mut button = Button::new(GateColor::Red);
    button.locations.push(TilePos::new(0, 4));
    button.locations.push(TilePos::new(10, 4));
    let mut doors = doors();

    button.press(80, 32, &mut doors);
    assert_eq!(button.depression, FULL_PRESS);

    button.depression = 0;
    button.press(0, 32, &mut doors);
    assert_eq!(button.depression, FULL_PRESS);
}

#[test]
fn button_decays_to_zero() {
    let mut button = red_button();
    button.depression = 2;
    button.tick();
    assert_eq!(button.depression, 1);
    button.tick();
    button.tick();
    assert_eq!(button.depression, 0);
}

// ── RoomState ─────────────────────────────────────────────────────────────────

#[test]
fn room_routes_gate_events_by_color() {
    let mut room = RoomState::default();
    room.collect_key(GateColor::Blue);
    assert!(room.key(GateColor::Blue).collected);
    assert!(room.door(GateColor::Blue).unlocked);
    assert!(!room.door(GateColor::Red).unlocked);
}

#[test]
fn room_snapshot_is_independent() {
    let mut room = RoomState::default();
    let snapshot = room.snapshot();

    room.collect_key(GateColor::Red);
    assert_ne!(room, snapshot);

    room.restore(&snapshot);
    assert_eq!(room, snapshot);
    assert!(!room.key(GateColor::Red).collected);
}

#[test]
fn room_tick_writes_gate_tiles() {
    let mut map = GridTilemap::new(8, 8);
    let mut room = RoomState::default();
    room.keys[0].locations.push(TilePos::new(1, 1));
    room.doors[2].locations.push(TilePos::new(4, 3));

    room.tick(&mut map);
    assert_eq!(map.tile_at(1, 1), GateColor::Red.key());
    assert_eq!(map.tile_at(4, 3), GateColor::Blue.door_top());
    assert_eq!(map.tile_at(4, 4), GateColor::Blue.door_bottom());
}
