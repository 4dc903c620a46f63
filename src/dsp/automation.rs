//! Parameter automation timelines.
//!
//! A timeline is an ordered list of value events for one parameter (here,
//! a gain). It is evaluated like a Web Audio `AudioParam`:
//!
//! - before the first event the parameter holds its default value
//! - `SetValue` jumps to a value at its time
//! - `LinearRamp` ends at its value at its time, ramping linearly from the
//!   previous event
//! - events sharing a timestamp resolve to the one pushed last
//!
//! Events must be pushed in non-decreasing time order. The timeline never
//! reorders them; producers (the envelope) build ordered timestamps.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { time: f64, value: f32 },
    LinearRamp { time: f64, value: f32 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::LinearRamp { time, .. } => {
                time
            }
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. } => value,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTimeline {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl ParamTimeline {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.push(AutomationEvent::SetValue { time, value })
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.push(AutomationEvent::LinearRamp { time, value })
    }

    fn push(&mut self, event: AutomationEvent) -> &mut Self {
        debug_assert!(
            self.events
                .last()
                .map_or(true, |last| last.time() <= event.time()),
            "automation events must be pushed in time order"
        );
        self.events.push(event);
        self
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Drop all events, returning to the default value.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Parameter value at `time` seconds.
    pub fn value_at(&self, time: f64) -> f32 {
        // Index of the first event strictly after `time`
        let next = self.events.partition_point(|e| e.time() <= time);

        let (start_time, start_value) = match next.checked_sub(1) {
            Some(prev) => {
                let event = self.events[prev];
                (event.time(), event.value())
            }
            None => (0.0, self.default_value),
        };

        match self.events.get(next) {
            Some(AutomationEvent::LinearRamp { time: end, value }) if *end > start_time => {
                let progress = ((time - start_time) / (end - start_time)).clamp(0.0, 1.0) as f32;
                start_value + (value - start_value) * progress
            }
            _ => start_value,
        }
    }

    /// Write `out[i] = value_at(start_time + i / sample_rate)`.
    pub fn render(&self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        let step = 1.0 / f64::from(sample_rate);
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * step);
        }
    }
}
