#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PlayState {
    #[default]
    Playing,
    Paused,
}

impl PlayState {
    pub fn toggled(self) -> Self {
        match self {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        }
    }

    /// Label for the button that switches *away* from this state.
    pub fn button_label(self) -> &'static str {
        match self {
            PlayState::Playing => "Pause",
            PlayState::Paused => "Play",
        }
    }
}

const HEARTBEAT_FRAMES: u64 = 600;

/// Frame timing for the render loop.
#[derive(Clone, Debug)]
pub struct Playback {
    pub state: PlayState,
    pub speed: f32,
    last_ts_ms: Option<f64>,
    frames: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Playback {
    pub fn new(speed: f32) -> Self {
        Self {
            state: PlayState::Playing,
            speed,
            last_ts_ms: None,
            frames: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn toggle(&mut self) -> PlayState {
        self.state = self.state.toggled();
        self.state
    }

    /// Forgets the previous timestamp so the next frame advances by zero.
    pub fn reset_clock(&mut self) {
        self.last_ts_ms = None;
    }

    /// Registers a frame at `ts_ms` and returns the animation delta in seconds: the scaled time
    /// since the previous frame while playing, zero while paused.
    pub fn tick(&mut self, ts_ms: f64) -> f32 {
        let elapsed = match self.last_ts_ms {
            Some(prev) => ((ts_ms - prev) * 0.001).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ts_ms = Some(ts_ms);

        if self.frames % HEARTBEAT_FRAMES == 0 {
            log::debug!("render loop running, frame {}", self.frames);
        }
        self.frames += 1;

        match self.state {
            PlayState::Playing => elapsed * self.speed.max(0.0),
            PlayState::Paused => 0.0,
        }
    }
}
