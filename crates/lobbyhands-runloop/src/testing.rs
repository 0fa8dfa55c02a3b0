//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use lobbyhands_protocols::{
    Actuator, CollaboratorError, DeathFrameReading, Position, Region, Vision,
};
use parking_lot::Mutex;

/// Scripted reply of `find_action_button`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Button {
    At(i32, i32),
    Absent,
    Fail,
}

/// Vision that replays a button script, then reports the button absent.
#[derive(Default)]
pub(crate) struct ScriptedVision {
    buttons: Mutex<VecDeque<Button>>,
    death_frame: AtomicBool,
    visible_text: Mutex<Vec<String>>,
    pub(crate) text_queries: Mutex<Vec<(String, Region)>>,
}

impl ScriptedVision {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_buttons(&self, replies: impl IntoIterator<Item = Button>) {
        self.buttons.lock().extend(replies);
    }

    pub(crate) fn set_death_frame(&self, detected: bool) {
        self.death_frame.store(detected, Ordering::SeqCst);
    }

    /// Make `find_specific_text` report `pattern` on screen.
    pub(crate) fn show_text(&self, pattern: &str) {
        self.visible_text.lock().push(pattern.to_string());
    }
}

#[async_trait]
impl Vision for ScriptedVision {
    async fn find_action_button(&self) -> Result<Option<Position>, CollaboratorError> {
        match self.buttons.lock().pop_front().unwrap_or(Button::Absent) {
            Button::At(x, y) => Ok(Some(Position::new(x, y))),
            Button::Absent => Ok(None),
            Button::Fail => Err(CollaboratorError::vision("capture failed")),
        }
    }

    async fn find_death_frame_color(&self) -> Result<DeathFrameReading, CollaboratorError> {
        let detected = self.death_frame.load(Ordering::SeqCst);
        Ok(DeathFrameReading {
            detected,
            matched_pixels: if detected { 120 } else { 0 },
        })
    }

    async fn find_specific_text(
        &self,
        pattern: &str,
        region: Region,
    ) -> Result<Option<Position>, CollaboratorError> {
        self.text_queries.lock().push((pattern.to_string(), region));
        if self.visible_text.lock().iter().any(|t| t == pattern) {
            Ok(Some(Position::new(region.x + 10, region.y + 10)))
        } else {
            Ok(None)
        }
    }

    async fn screen_size(&self) -> Result<(u32, u32), CollaboratorError> {
        Ok((1920, 1080))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Act {
    Key(String),
    Click(i32, i32),
    Type(String),
}

/// Actuator that records every call and can be told to fail clicks.
#[derive(Default)]
pub(crate) struct RecordingActuator {
    acts: Mutex<Vec<Act>>,
    fail_clicks: AtomicBool,
}

impl RecordingActuator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acts(&self) -> Vec<Act> {
        self.acts.lock().clone()
    }

    pub(crate) fn clicks(&self) -> Vec<(i32, i32)> {
        self.acts
            .lock()
            .iter()
            .filter_map(|a| match a {
                Act::Click(x, y) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.acts
            .lock()
            .iter()
            .filter_map(|a| match a {
                Act::Key(k) => Some(k.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.acts.lock().clear();
    }

    pub(crate) fn set_fail_clicks(&self, fail: bool) {
        self.fail_clicks.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn press_key(&self, key: &str) -> Result<(), CollaboratorError> {
        self.acts.lock().push(Act::Key(key.to_string()));
        Ok(())
    }

    async fn move_and_click(
        &self,
        x: i32,
        y: i32,
        _click_count: u32,
    ) -> Result<(), CollaboratorError> {
        if self.fail_clicks.load(Ordering::SeqCst) {
            return Err(CollaboratorError::actuation("mouse unavailable"));
        }
        self.acts.lock().push(Act::Click(x, y));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), CollaboratorError> {
        self.acts.lock().push(Act::Type(text.to_string()));
        Ok(())
    }
}
