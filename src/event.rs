use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use keychenga::error::DrillError;
use keychenga::session::{DrillUpdate, FeedbackSink};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    Drill(DrillUpdate),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let reader = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if reader.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if reader.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if reader.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }

    /// Feedback sink that delivers worker updates into this event stream.
    pub fn drill_feedback(&self) -> DrillFeedback {
        DrillFeedback(self.tx.clone())
    }
}

#[derive(Clone)]
pub struct DrillFeedback(mpsc::Sender<AppEvent>);

impl FeedbackSink for DrillFeedback {
    fn send(&self, update: DrillUpdate) -> Result<(), DrillError> {
        self.0
            .send(AppEvent::Drill(update))
            .map_err(|_| DrillError::FeedbackClosed)
    }
}
