//! Boundary adapter between the UI layer and the link: one encoder call and
//! one transmit per incoming control event.

use protocol::{encode_discrete, encode_motion, encode_stop, AxisSample, DiscreteCommand};
use tracing::warn;

use crate::CommandSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
}

/// Discrete and analog events as delivered by the external UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Press(DiscreteCommand),
    /// Releasing any discrete control sends the generic stop, never a
    /// per-control variant.
    Release,
    AxisMoved { side: AxisSide, raw: i16 },
    AxisReleased(AxisSide),
}

/// Holds the two current raw axis readings and nothing else. Each event is
/// transformed and handed to the sink immediately; there is no history.
pub struct InputDispatcher<S: CommandSink> {
    sink: S,
    left: AxisSample,
    right: AxisSample,
}

impl<S: CommandSink> InputDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            left: AxisSample::CENTERED,
            right: AxisSample::CENTERED,
        }
    }

    pub async fn dispatch(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Press(cmd) => self.sink.send_command(encode_discrete(cmd)).await,
            ControlEvent::Release => self.sink.send_command(encode_stop()).await,
            ControlEvent::AxisMoved { side, raw } => {
                // An out-of-range reading is a caller contract violation;
                // drop the event rather than forward a clamped guess.
                let sample = match AxisSample::new(raw) {
                    Ok(sample) => sample,
                    Err(err) => {
                        warn!(%err, ?side, "dispatch: dropping axis event");
                        return;
                    }
                };
                *self.axis_mut(side) = sample;
                self.send_motion().await;
            }
            ControlEvent::AxisReleased(side) => {
                // A released axis snaps back to center before the recompute,
                // so it never freezes at its last value.
                *self.axis_mut(side) = AxisSample::CENTERED;
                self.send_motion().await;
            }
        }
    }

    fn axis_mut(&mut self, side: AxisSide) -> &mut AxisSample {
        match side {
            AxisSide::Left => &mut self.left,
            AxisSide::Right => &mut self.right,
        }
    }

    async fn send_motion(&self) {
        let frame = encode_motion(self.left.raw(), self.right.raw());
        self.sink.send_command(&frame).await;
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
