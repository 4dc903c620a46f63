use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::debug;

use crate::synth::message::NoteFlags;

/// Stops a note after its duration on the wall clock.
///
/// The timer thread waits on a channel with a timeout: a message (or the
/// sender going away) cancels it, the timeout fires it. `cancel` joins the
/// thread, so once it returns the timer can no longer fire.
pub struct NoteTimer {
    note_id: u64,
    cancel: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    fired: Arc<AtomicBool>,
}

impl NoteTimer {
    pub fn schedule(
        note_id: u64,
        after: Duration,
        flags: Arc<NoteFlags>,
    ) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_flag = Arc::clone(&fired);

        let handle = thread::Builder::new()
            .name(format!("note-timer-{note_id}"))
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(after) {
                    flags.request_stop(note_id);
                    fired_flag.store(true, Ordering::Release);
                    debug!(note_id, "note duration elapsed");
                }
            })?;

        Ok(Self {
            note_id,
            cancel: Some(tx),
            handle: Some(handle),
            fired,
        })
    }

    pub fn note_id(&self) -> u64 {
        self.note_id
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Cancel (if still pending) and wait for the timer thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NoteTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_duration() {
        let flags = Arc::new(NoteFlags::default());
        let timer = NoteTimer::schedule(3, Duration::from_millis(10), Arc::clone(&flags))
            .expect("spawn timer");
        thread::sleep(Duration::from_millis(200));
        assert!(timer.has_fired());
        assert!(flags.should_stop(3));
        timer.cancel();
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let flags = Arc::new(NoteFlags::default());
        let timer = NoteTimer::schedule(1, Duration::from_secs(30), Arc::clone(&flags))
            .expect("spawn timer");
        timer.cancel();
        assert!(!flags.should_stop(1));
    }
}
