// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

/// Callback fired by the backend once an utterance finishes or is cut
/// short. Backends may invoke it from another thread.
pub type SpeechDone = Box<dyn FnOnce() + Send>;

pub trait SpeechBackend {
    fn supported(&self) -> bool;

    /// Start speaking `text`. Must call `done` exactly once, whether the
    /// utterance completes or is cancelled.
    fn speak(&self, text: &str, done: SpeechDone) -> Result<()>;

    fn cancel(&self);
}

/// Drives a speech backend with toggle semantics: pressing listen while
/// an utterance is in flight stops it instead of queueing another.
pub struct Narrator<B> {
    backend: B,
    speaking: Arc<AtomicBool>,
}

impl<B: SpeechBackend> Narrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Speak `insight`, or stop the current utterance if one is playing.
    pub fn toggle(&self, insight: &str) -> Result<()> {
        if self.speaking.swap(true, Ordering::SeqCst) {
            self.stop();
            return Ok(());
        }

        let speaking = Arc::clone(&self.speaking);
        let done: SpeechDone = Box::new(move || {
            speaking.store(false, Ordering::SeqCst);
        });

        let text = strip_markup(insight);
        if let Err(error) = self.backend.speak(&text, done) {
            self.speaking.store(false, Ordering::SeqCst);
            return Err(error);
        }
        Ok(())
    }

    pub fn stop(&self) {
        self.backend.cancel();
        self.speaking.store(false, Ordering::SeqCst);
    }
}

/// Headless fallback used where no speech engine is wired up. Reports
/// itself unsupported and completes every utterance immediately.
pub struct UnsupportedSpeech;

impl SpeechBackend for UnsupportedSpeech {
    fn supported(&self) -> bool {
        false
    }

    fn speak(&self, text: &str, done: SpeechDone) -> Result<()> {
        log::warn!("speech engine unavailable, skipping {} chars", text.len());
        done();
        Ok(())
    }

    fn cancel(&self) {}
}

/// Insight text arrives with light markdown decoration that a speech
/// engine would read out loud. Strip the decoration characters.
pub fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '#' | '*' | '`' | '_'))
        .collect()
}
