use std::sync::atomic::{AtomicU64, Ordering};

use rtrb::Consumer;

use crate::synth::{bus::BusSettings, voice::VoiceGraph};

/// Control thread → render thread.
pub enum RenderCommand {
    /// Replace the current voice (if any) with this one.
    Play {
        voice: Box<VoiceGraph>,
        settings: BusSettings,
    },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<RenderCommand>;
}

impl MessageReceiver for Consumer<RenderCommand> {
    fn pop(&mut self) -> Option<RenderCommand> {
        Consumer::pop(self).ok()
    }
}

/// Note ids shared between the engine, the timer and the renderer.
///
/// Ids start at 1 and only grow, so "stop everything up to N" and
/// "everything up to N has finished" each fit in one atomic.
#[derive(Debug, Default)]
pub struct NoteFlags {
    stop_request: AtomicU64,
    finished: AtomicU64,
}

impl NoteFlags {
    pub fn request_stop(&self, note_id: u64) {
        self.stop_request.fetch_max(note_id, Ordering::AcqRel);
    }

    pub fn should_stop(&self, note_id: u64) -> bool {
        self.stop_request.load(Ordering::Acquire) >= note_id
    }

    pub fn mark_finished(&self, note_id: u64) {
        self.finished.fetch_max(note_id, Ordering::AcqRel);
    }

    pub fn has_finished(&self, note_id: u64) -> bool {
        self.finished.load(Ordering::Acquire) >= note_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_requests_cover_older_notes() {
        let flags = NoteFlags::default();
        assert!(!flags.should_stop(1));
        flags.request_stop(3);
        flags.request_stop(2);
        assert!(flags.should_stop(1));
        assert!(flags.should_stop(3));
        assert!(!flags.should_stop(4));
    }

    #[test]
    fn finished_is_monotonic() {
        let flags = NoteFlags::default();
        flags.mark_finished(5);
        flags.mark_finished(4);
        assert!(flags.has_finished(5));
        assert!(!flags.has_finished(6));
    }
}
