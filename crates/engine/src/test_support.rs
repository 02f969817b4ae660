use std::cell::RefCell;
use std::rc::Rc;

use crate::world::{
    Facing, GameMap, Jukebox, MapRegistry, Player, Position, Session, TilePos, Tilemap,
};

pub(crate) type JukeboxLog = Rc<RefCell<Vec<String>>>;

/// Jukebox that records every call as `play:<track>` or `pause`.
#[derive(Default)]
pub(crate) struct RecordingJukebox {
    log: JukeboxLog,
}

impl RecordingJukebox {
    pub(crate) fn new(log: JukeboxLog) -> Self {
        Self { log }
    }
}

impl Jukebox for RecordingJukebox {
    fn play(&mut self, track: &str) {
        self.log.borrow_mut().push(format!("play:{track}"));
    }

    fn pause(&mut self) {
        self.log.borrow_mut().push("pause".to_string());
    }
}

pub(crate) fn open_map(name: &str, width: u32, height: u32) -> GameMap {
    GameMap::new(name, Tilemap::filled(width, height, 0), format!("{name}_theme"))
}

pub(crate) fn session_at(maps: Vec<GameMap>, tile: TilePos, facing: Facing) -> (Session, JukeboxLog) {
    let start = maps
        .first()
        .map(|map| map.name().to_string())
        .unwrap_or_default();
    let registry = MapRegistry::new(maps, &start).expect("registry");
    let log = JukeboxLog::default();
    let player = Player::new("Tester", Position::new(tile, facing));
    let session = Session::new(
        registry,
        player,
        Box::new(RecordingJukebox::new(Rc::clone(&log))),
    );
    (session, log)
}
