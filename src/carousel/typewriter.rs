use serde::Serialize;

/// Reveal progress of the active card's explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "revealed", rename_all = "snake_case")]
pub enum TypingState {
    #[default]
    Idle,
    /// Number of characters revealed so far.
    Typing(usize),
    Completed,
}

/// What the ticker should do after a typewriter transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerChange {
    Start,
    Stop,
    Keep,
}

#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    state: TypingState,
}

impl Typewriter {
    pub fn state(&self) -> TypingState {
        self.state
    }

    /// Click or Enter/Space on the active card.
    pub fn activate(&mut self, text_len: usize) -> TickerChange {
        match self.state {
            TypingState::Idle if text_len == 0 => {
                self.state = TypingState::Completed;
                TickerChange::Keep
            }
            TypingState::Idle => {
                self.state = TypingState::Typing(0);
                TickerChange::Start
            }
            TypingState::Typing(_) => {
                self.state = TypingState::Idle;
                TickerChange::Stop
            }
            TypingState::Completed => {
                self.state = TypingState::Idle;
                TickerChange::Keep
            }
        }
    }

    /// One timer tick. Ticks outside `Typing` are stale and ignored.
    pub fn tick(&mut self, text_len: usize) -> TickerChange {
        match self.state {
            TypingState::Typing(k) => {
                let next = (k + 1).min(text_len);
                if next >= text_len {
                    self.state = TypingState::Completed;
                    TickerChange::Stop
                } else {
                    self.state = TypingState::Typing(next);
                    TickerChange::Keep
                }
            }
            TypingState::Idle | TypingState::Completed => TickerChange::Keep,
        }
    }

    /// Collapse back to `Idle` (card change, outside click, explicit reset).
    pub fn reset(&mut self) -> TickerChange {
        let was_typing = matches!(self.state, TypingState::Typing(_));
        self.state = TypingState::Idle;
        if was_typing {
            TickerChange::Stop
        } else {
            TickerChange::Keep
        }
    }

    /// Prefix of `text` currently on screen.
    pub fn revealed<'a>(&self, text: &'a str) -> &'a str {
        match self.state {
            TypingState::Idle => "",
            TypingState::Completed => text,
            TypingState::Typing(k) => match text.char_indices().nth(k) {
                Some((byte, _)) => &text[..byte],
                None => text,
            },
        }
    }
}
