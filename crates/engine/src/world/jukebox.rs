use tracing::info;

/// Background music control. Playback itself lives outside the engine.
pub trait Jukebox {
    fn play(&mut self, track: &str);
    fn pause(&mut self);
}

/// Jukebox that tracks what would be playing and logs every change.
#[derive(Debug, Default)]
pub struct TracingJukebox {
    current: Option<String>,
    paused: bool,
}

impl TracingJukebox {
    pub fn current_track(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Jukebox for TracingJukebox {
    fn play(&mut self, track: &str) {
        if !self.paused && self.current.as_deref() == Some(track) {
            return;
        }
        info!(track, resumed = self.paused, "music_play");
        self.current = Some(track.to_string());
        self.paused = false;
    }

    fn pause(&mut self) {
        if self.paused || self.current.is_none() {
            return;
        }
        info!(track = self.current.as_deref().unwrap_or_default(), "music_pause");
        self.paused = true;
    }
}
