/*!
    Life cycle of the transcode loop.
*/

use std::fmt;

/**
    Where the transcode loop is in its life cycle.

    The loop starts in `Normal` and moves through the three flushing states
    in order, one stage at a time, until every buffered unit has reached the
    output. `Finished` and `Aborted` are terminal.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TranscodeState {
    /// Reading packets from the input.
    #[default]
    Normal,
    /// Input exhausted; the decoder has been told and is being drained.
    InputEofFlushing,
    /// Decoder drained; the encoder has been told and is being drained.
    DecoderEofFlushing,
    /// Encoder drained; the muxer's interleaving queue is being flushed.
    EncoderEofFlushing,
    /// Every frame has been written.
    Finished,
    /// A fatal error stopped the loop.
    Aborted,
}

/**
    Something that happened while driving the loop.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The demuxer has no more packets.
    InputExhausted,
    /// The decoder reported end of stream.
    DecoderDrained,
    /// The encoder reported end of stream.
    EncoderDrained,
    /// The muxer's queue has been written out.
    MuxerFlushed,
    /// An operation failed.
    Failed,
}

impl TranscodeState {
    /**
        The state after `event`.

        Events arriving out of order abort the loop. Terminal states stay
        where they are.
    */
    pub fn on(self, event: Event) -> Self {
        use Event::*;
        use TranscodeState::*;

        match (self, event) {
            (Finished | Aborted, _) => self,
            (_, Failed) => Aborted,
            (Normal, InputExhausted) => InputEofFlushing,
            (InputEofFlushing, DecoderDrained) => DecoderEofFlushing,
            (DecoderEofFlushing, EncoderDrained) => EncoderEofFlushing,
            (EncoderEofFlushing, MuxerFlushed) => Finished,
            _ => Aborted,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::InputEofFlushing => "input-eof-flushing",
            Self::DecoderEofFlushing => "decoder-eof-flushing",
            Self::EncoderEofFlushing => "encoder-eof-flushing",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TranscodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_finished() {
        let mut state = TranscodeState::default();
        assert_eq!(state, TranscodeState::Normal);

        for (event, expected) in [
            (Event::InputExhausted, TranscodeState::InputEofFlushing),
            (Event::DecoderDrained, TranscodeState::DecoderEofFlushing),
            (Event::EncoderDrained, TranscodeState::EncoderEofFlushing),
            (Event::MuxerFlushed, TranscodeState::Finished),
        ] {
            assert!(!state.is_terminal());
            state = state.on(event);
            assert_eq!(state, expected);
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn failure_aborts_from_any_live_state() {
        for state in [
            TranscodeState::Normal,
            TranscodeState::InputEofFlushing,
            TranscodeState::DecoderEofFlushing,
            TranscodeState::EncoderEofFlushing,
        ] {
            assert_eq!(state.on(Event::Failed), TranscodeState::Aborted);
        }
    }

    #[test]
    fn out_of_order_events_abort() {
        assert_eq!(
            TranscodeState::Normal.on(Event::DecoderDrained),
            TranscodeState::Aborted
        );
        assert_eq!(
            TranscodeState::Normal.on(Event::MuxerFlushed),
            TranscodeState::Aborted
        );
        assert_eq!(
            TranscodeState::InputEofFlushing.on(Event::EncoderDrained),
            TranscodeState::Aborted
        );
        assert_eq!(
            TranscodeState::DecoderEofFlushing.on(Event::InputExhausted),
            TranscodeState::Aborted
        );
    }

    #[test]
    fn terminal_states_absorb_events() {
        for event in [Event::InputExhausted, Event::MuxerFlushed, Event::Failed] {
            assert_eq!(TranscodeState::Finished.on(event), TranscodeState::Finished);
            assert_eq!(TranscodeState::Aborted.on(event), TranscodeState::Aborted);
        }
    }

    #[test]
    fn states_display_their_names() {
        assert_eq!(TranscodeState::EncoderEofFlushing.to_string(), "encoder-eof-flushing");
        assert_eq!(TranscodeState::Aborted.to_string(), "aborted");
    }
}
