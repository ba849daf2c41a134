use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Signals an external scroll source sends to the scroll controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerSignal {
    Started,
    PositionChanged(f32),
    Completed,
}

/// Create a connected trigger sender/receiver pair
pub fn scroll_trigger_channel() -> (Sender<TriggerSignal>, Receiver<TriggerSignal>) {
    unbounded()
}

/// Scroll source driven by a manual trigger.
///
/// Once triggered it advances its own scroll position over
/// `distance / speed` seconds, reporting every step and the end.
#[derive(Resource, Debug)]
pub struct SimpleScrollTrigger {
    speed: f32,
    distance: f32,
    current_position: f32,
    start_position: f32,
    elapsed: f32,
    scrolling: bool,
    sender: Sender<TriggerSignal>,
}

impl SimpleScrollTrigger {
    /// Trigger-side scroll speed in tiles per second
    pub const DEFAULT_SPEED: f32 = 10.0;

    pub fn new(speed: f32, distance: f32) -> Self {
        let (sender, _) = scroll_trigger_channel();
        Self {
            speed,
            distance,
            current_position: 0.0,
            start_position: 0.0,
            elapsed: 0.0,
            scrolling: false,
            sender,
        }
    }

    /// Open a fresh channel for this trigger. Receivers handed out earlier
    /// stop receiving signals.
    pub fn subscribe(&mut self) -> Receiver<TriggerSignal> {
        let (sender, receiver) = scroll_trigger_channel();
        self.sender = sender;
        receiver
    }

    pub fn current_scroll_position(&self) -> f32 {
        self.current_position
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Start a scroll unless one is already running
    pub fn trigger(&mut self) {
        if self.scrolling {
            return;
        }
        self.scrolling = true;
        self.elapsed = 0.0;
        self.start_position = self.current_position;
        self.send(TriggerSignal::Started);
    }

    /// Advance a running scroll by `delta_secs`
    pub fn update(&mut self, delta_secs: f32) {
        if !self.scrolling {
            return;
        }

        self.elapsed += delta_secs;
        let duration = self.distance / self.speed;

        if self.elapsed >= duration {
            self.current_position = self.start_position + self.distance;
            self.scrolling = false;
            self.send(TriggerSignal::PositionChanged(self.current_position));
            self.send(TriggerSignal::Completed);
        } else {
            self.current_position = self.start_position + self.distance * (self.elapsed / duration);
            self.send(TriggerSignal::PositionChanged(self.current_position));
        }
    }

    pub fn reset_scroll_position(&mut self) {
        self.current_position = 0.0;
        self.scrolling = false;
    }

    fn send(&self, signal: TriggerSignal) {
        // Nobody listening is fine
        let _ = self.sender.send(signal);
    }
}

impl Default for SimpleScrollTrigger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPEED, crate::tiles::MAP_HEIGHT as f32)
    }
}
