/// A battle declared by a map event, waiting to be handed to the battle
/// screen. Resolution of the battle itself happens elsewhere; this only
/// records who is fought and whether it is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredBattle {
    opponent: String,
    finished: bool,
}

impl DeclaredBattle {
    pub fn new(opponent: impl Into<String>) -> Self {
        Self {
            opponent: opponent.into(),
            finished: false,
        }
    }

    pub fn opponent(&self) -> &str {
        &self.opponent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }
}
