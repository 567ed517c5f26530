use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

impl Speaker {
    fn next(self) -> Self {
        match self {
            Speaker::User => Speaker::System,
            Speaker::System => Speaker::User,
        }
    }
}

/// One entry in the accumulated transcript history
#[derive(Debug, Clone, Serialize)]
pub struct Utterance {
    pub turn_index: u64,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated conversation state: transcript history and whose turn it is.
///
/// Only successful turns are appended; failed turns leave the history and
/// the speaker rotation untouched.
#[derive(Debug)]
pub struct DialogueState {
    history: Vec<Utterance>,
    current_speaker: Speaker,
}

impl DialogueState {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            current_speaker: Speaker::User,
        }
    }

    pub fn current_speaker(&self) -> Speaker {
        self.current_speaker
    }

    pub fn append(&mut self, turn_index: u64, text: String) {
        self.history.push(Utterance {
            turn_index,
            speaker: self.current_speaker,
            text,
            timestamp: Utc::now(),
        });
        self.current_speaker = self.current_speaker.next();
    }

    pub fn history(&self) -> &[Utterance] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for DialogueState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_alternates_on_append() {
        let mut dialogue = DialogueState::new();
        assert_eq!(dialogue.current_speaker(), Speaker::User);

        dialogue.append(0, "hello".to_string());
        assert_eq!(dialogue.current_speaker(), Speaker::System);

        dialogue.append(1, "hi there".to_string());
        assert_eq!(dialogue.current_speaker(), Speaker::User);

        assert_eq!(dialogue.len(), 2);
        assert_eq!(dialogue.history()[0].speaker, Speaker::User);
        assert_eq!(dialogue.history()[1].speaker, Speaker::System);
    }
}
