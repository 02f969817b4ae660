use std::cell::Cell;
use std::rc::Rc;

use engine::{
    EventContext, Facing, GameMap, MapError, MapEvent, MapRegistry, Player, Position, Session,
    SideMask, Teleport, TilePos, Tilemap, TracingJukebox, TriggerKind,
};
use tracing::{debug, info};

pub(crate) const START_MAP: &str = "player_room";
pub(crate) const START_TILE: TilePos = TilePos::new(4, 3);
pub(crate) const DEFAULT_PLAYER_NAME: &str = "Red";

const GRASS: u16 = 1;
const FLOOR: u16 = 2;
const PATH: u16 = 3;
const WATER: u16 = 4;

const SIGN_COLOR: [u8; 4] = [170, 120, 60, 255];
const NPC_COLOR: [u8; 4] = [220, 140, 200, 255];
const RIVAL_COLOR: [u8; 4] = [220, 80, 70, 255];
const SPRING_COLOR: [u8; 4] = [120, 200, 255, 160];

/// Frames of standing on the spring before it heals.
const SPRING_REST_FRAMES: u32 = 90;
/// Frames between two steps of the village patrol.
const PATROL_STEP_FRAMES: u32 = 40;

/// Builds the demo session: three connected maps with the player in their
/// room.
pub(crate) fn build_session(player_name: &str) -> Result<Session, MapError> {
    let maps = MapRegistry::new(vec![player_room()?, village()?, route_1()?], START_MAP)?;
    let player = Player::new(player_name, Position::new(START_TILE, Facing::Down));
    let mut session = Session::new(maps, player, Box::<TracingJukebox>::default());
    session.play_map_track();
    info!(
        map = START_MAP,
        player = player_name,
        maps = session.maps().len(),
        "session_built"
    );
    Ok(session)
}

/// Collision layer with a solid border, open at `gaps`.
fn walled(width: u32, height: u32, gaps: &[TilePos]) -> Tilemap {
    let mut collision = Tilemap::filled(width, height, 0);
    for x in 0..width as i32 {
        collision.set_tile(TilePos::new(x, 0), 1);
        collision.set_tile(TilePos::new(x, height as i32 - 1), 1);
    }
    for y in 0..height as i32 {
        collision.set_tile(TilePos::new(0, y), 1);
        collision.set_tile(TilePos::new(width as i32 - 1, y), 1);
    }
    for gap in gaps {
        collision.set_tile(*gap, 0);
    }
    collision
}

fn door(tile: TilePos, destination: Teleport) -> MapEvent {
    MapEvent::new(TriggerKind::OnEnterTile, SideMask::all(), move |ctx| {
        ctx.teleport(destination.clone())
    })
    .at(tile)
}

fn sign(tile: TilePos, sides: SideMask, lines: &'static [&'static str]) -> MapEvent {
    MapEvent::new(TriggerKind::OnInteractPress, sides, move |ctx| {
        ctx.open_dialog(lines.iter().copied());
    })
    .at(tile)
    .blocking()
    .with_color(SIGN_COLOR)
}

fn player_room() -> Result<GameMap, MapError> {
    let (width, height) = (8, 6);
    let exit = TilePos::new(4, 5);
    let mut map = GameMap::new(START_MAP, Tilemap::filled(width, height, FLOOR), "home_theme")
        .with_collision(walled(width, height, &[exit]))?;
    map.add_event(door(
        exit,
        Teleport::new("village", TilePos::new(6, 7)).facing(Facing::Down),
    ));
    map.add_event(sign(
        TilePos::new(2, 1),
        SideMask::UP,
        &["A shelf full of travel guides.", "None of them mention Route 1."],
    ));
    Ok(map)
}

fn village() -> Result<GameMap, MapError> {
    let (width, height) = (20, 16);
    let house_door = TilePos::new(6, 6);
    let east_exit = TilePos::new(19, 8);

    let mut paths = Tilemap::filled(width, height, 0);
    for x in 6..width as i32 {
        paths.set_tile(TilePos::new(x, 8), PATH);
    }
    paths.set_tile(TilePos::new(6, 7), PATH);
    let mut collision = walled(width, height, &[east_exit]);
    // The player's house: a solid block with the door on its south face.
    for y in 2..=6 {
        for x in 3..=9 {
            collision.set_tile(TilePos::new(x, y), 1);
        }
    }
    collision.set_tile(house_door, 0);

    let mut map = GameMap::new("village", Tilemap::filled(width, height, GRASS), "village_theme")
        .with_layer(paths)?
        .with_collision(collision)?;
    map.add_event(door(
        house_door,
        Teleport::new(START_MAP, TilePos::new(4, 4)).facing(Facing::Up),
    ));
    map.add_event(door(
        east_exit,
        Teleport::new("route_1", TilePos::new(1, 12)).facing(Facing::Right),
    ));
    map.add_event(sign(
        TilePos::new(11, 7),
        SideMask::all(),
        &["VILLAGE", "East: Route 1"],
    ));
    map.add_event(patrolling_villager(TilePos::new(12, 11), 4));
    map.add_event(healing_spring(TilePos::new(4, 12)));
    Ok(map)
}

/// Villager walking back and forth along a row. Talking to them shows a
/// line; they keep walking while no dialog is open.
fn patrolling_villager(start: TilePos, span: i32) -> MapEvent {
    let mut frame = 0u32;
    let mut step = 1;
    MapEvent::new(TriggerKind::OnInteractPress, SideMask::all(), |ctx| {
        ctx.open_dialog(["Lovely weather for a walk!"]);
    })
    .at(start)
    .blocking()
    .with_color(NPC_COLOR)
    .with_ambient(move |tile: &mut TilePos, ctx: &mut EventContext<'_>| {
        frame += 1;
        if frame % PATROL_STEP_FRAMES != 0 {
            return;
        }
        let next = TilePos::new(tile.x + step, tile.y);
        if next == ctx.player_tile() {
            return;
        }
        *tile = next;
        if tile.x <= start.x || tile.x >= start.x + span {
            step = -step;
        }
    })
}

fn healing_spring(tile: TilePos) -> MapEvent {
    let mut rested = 0u32;
    MapEvent::new(TriggerKind::OnOccupyTile, SideMask::all(), move |ctx| {
        rested += 1;
        if rested < SPRING_REST_FRAMES {
            return;
        }
        rested = 0;
        debug!(event = ctx.event_id().0, "spring_healed");
        ctx.open_dialog(["You rest by the spring.", "Your team is fully healed!"]);
    })
    .at(tile)
    .with_color(SPRING_COLOR)
}

fn route_1() -> Result<GameMap, MapError> {
    let (width, height) = (16, 24);
    let west_exit = TilePos::new(0, 12);
    let rival = TilePos::new(8, 9);

    let mut water = Tilemap::filled(width, height, 0);
    let mut collision = walled(width, height, &[west_exit]);
    for x in 11..15 {
        for y in 16..21 {
            water.set_tile(TilePos::new(x, y), WATER);
            collision.set_tile(TilePos::new(x, y), 1);
        }
    }

    let mut map = GameMap::new("route_1", Tilemap::filled(width, height, GRASS), "route_theme")
        .with_layer(water)?
        .with_collision(collision)?;
    map.add_event(door(
        west_exit,
        Teleport::new("village", TilePos::new(18, 8)).facing(Facing::Left),
    ));

    let defeated = Rc::new(Cell::new(false));
    let talk_flag = Rc::clone(&defeated);
    map.add_event(
        MapEvent::new(TriggerKind::OnInteractPress, SideMask::all(), move |ctx| {
            if talk_flag.get() {
                ctx.open_dialog(["Rival: You got lucky. Next time I win!"]);
            } else {
                ctx.open_dialog(["Rival: Think you can get past me?"]);
            }
        })
        .at(rival)
        .blocking()
        .with_color(RIVAL_COLOR),
    );
    // Line of sight below the rival: stepping into it starts the fight once.
    for y in rival.y + 1..=rival.y + 3 {
        let flag = Rc::clone(&defeated);
        map.add_event(
            MapEvent::new(TriggerKind::OnEnterTile, SideMask::all(), move |ctx| {
                if flag.get() {
                    return;
                }
                ctx.lock_player();
                if ctx.declare_battle("Rival") {
                    flag.set(true);
                }
            })
            .at(TilePos::new(rival.x, y)),
        );
    }
    Ok(map)
}
