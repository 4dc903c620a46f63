use crate::dsp::automation::ParamTimeline;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Scheduled ADSR Envelope
=======================

This module turns attack/decay/sustain/release settings into a gain curve
for a note whose length is known up front.

Vocabulary
----------

  level       The envelope's output value (0.0 to 1.0). It multiplies the
              oscillator's volume to shape amplitude over time.

  breakpoint  A (time, level) pair. The curve is straight lines between
              breakpoints.

  hold point  The moment the sustain plateau ends and release begins.

  note length The fixed duration of the note. There is no gate: the
              release is scheduled to END exactly when the note does.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        0    A   A+D        hold  note length

  Breakpoints, in order:

    (0,          0.0)      start silent
    (A,          1.0)      linear ramp up
    (A + D,      S)        linear ramp down to sustain
    (hold,       S)        plateau
    (length,     0.0)      linear ramp down to silence

  where  hold = max(A + D, length - R)


Overlapping Segments
--------------------

Nothing forces A + D + R <= length. When the release would start before
decay has finished, the plateau collapses to zero length and release
starts right where decay ends:

    A + D = 0.7, R = 0.5, length = 1.0

    hold = max(0.7, 0.5) = 0.7  → release runs from 0.7 to 1.0

Every breakpoint is also clamped into [0, length]. If the attack alone
is longer than the note, the ramp up is cut at the note's end and the
final breakpoint still lands the curve on 0.0 at `length`.

Because the timestamps are computed as a running maximum and clamped to
the same ceiling, they are non-decreasing by construction. The timeline
never sees an out-of-order ramp.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    /// Seconds to ramp 0 → 1
    pub attack: f32,
    /// Seconds to ramp 1 → sustain
    pub decay: f32,
    /// Plateau level (0.0 - 1.0)
    pub sustain: f32,
    /// Seconds to ramp sustain → 0, ending at the note's end
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.2,
            sustain: 0.7,
            release: 0.5,
        }
    }
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Breakpoint times `[attack end, decay end, hold, note end]` for a note
    /// of `note_duration` seconds. Non-decreasing, all within the note.
    pub fn breakpoints(&self, note_duration: f32) -> [f64; 4] {
        let length = f64::from(note_duration.max(0.0));
        let attack_end = f64::from(self.attack.max(0.0)).min(length);
        let decay_end = (f64::from(self.attack.max(0.0)) + f64::from(self.decay.max(0.0)))
            .clamp(attack_end, length);
        let hold = (length - f64::from(self.release.max(0.0))).clamp(decay_end, length);
        [attack_end, decay_end, hold, length]
    }

    /// Schedule the envelope onto `timeline`, starting at time 0.
    ///
    /// Existing events are replaced.
    pub fn apply(&self, timeline: &mut ParamTimeline, note_duration: f32) {
        let [attack_end, decay_end, hold, end] = self.breakpoints(note_duration);

        timeline.clear();
        timeline
            .set_value_at_time(0.0, 0.0)
            .linear_ramp_to_value_at_time(1.0, attack_end)
            .linear_ramp_to_value_at_time(self.sustain, decay_end)
            .set_value_at_time(self.sustain, hold)
            .linear_ramp_to_value_at_time(0.0, end);
    }

    /// Convenience: a fresh timeline carrying this envelope.
    pub fn timeline(&self, note_duration: f32) -> ParamTimeline {
        let mut timeline = ParamTimeline::new(0.0);
        self.apply(&mut timeline, note_duration);
        timeline
    }
}
