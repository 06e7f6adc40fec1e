use std::collections::VecDeque;

use crate::config::HuesConfig;
use crate::messages::{ChatMessage, MessageType};

pub const JOURNAL_CAPACITY: usize = 200;
const SYSTEM_NAME: &str = "System";
const YOU_SEE: &str = "You see";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEntry {
    pub name: String,
    pub text: String,
    pub hue: u16,
    pub kind: MessageType,
}

/// Maps a chat message to the line the journal shows, or `None` when the
/// message is not journaled.
pub fn route(msg: &ChatMessage, hues: &HuesConfig) -> Option<JournalEntry> {
    if msg.kind == MessageType::Command || msg.text.is_empty() {
        return None;
    }
    let mut hue = msg.hue;
    let name = match msg.kind {
        MessageType::Regular => match msg.parent {
            Some(_) => msg.name.clone(),
            None => SYSTEM_NAME.to_string(),
        },
        MessageType::System => {
            if msg.name.is_empty() || msg.name.eq_ignore_ascii_case("system") {
                SYSTEM_NAME.to_string()
            } else {
                msg.name.clone()
            }
        }
        MessageType::Emote => {
            if hue == 0 {
                hue = hues.emote;
            }
            msg.name.clone()
        }
        MessageType::Label => match msg.parent {
            None => String::new(),
            Some(_) if msg.name.is_empty() => YOU_SEE.to_string(),
            Some(_) => msg.name.clone(),
        },
        MessageType::Spell => msg.name.clone(),
        MessageType::Party => {
            hue = hues.party;
            format!("[Party][{}]", msg.name)
        }
        MessageType::Alliance => {
            hue = hues.alliance;
            format!("[Alliance][{}]", msg.name)
        }
        MessageType::Guild => {
            hue = hues.guild;
            format!("[Guild][{}]", msg.name)
        }
        MessageType::Command => return None,
    };
    Some(JournalEntry {
        name,
        text: msg.text.clone(),
        hue,
        kind: msg.kind,
    })
}

/// Bounded message history, oldest dropped first.
#[derive(Debug)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(JOURNAL_CAPACITY)
    }
}

impl Journal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: JournalEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(kind: MessageType, name: &str, text: &str, parent: Option<u32>) -> ChatMessage {
        ChatMessage {
            kind,
            name: name.into(),
            text: text.into(),
            hue: 0,
            parent,
        }
    }

    #[test]
    fn regular_without_speaker_is_system() {
        let e = route(&msg(MessageType::Regular, "Bob", "hi", None), &HuesConfig::default()).unwrap();
        assert_eq!(e.name, "System");
        let e = route(&msg(MessageType::Regular, "Bob", "hi", Some(7)), &HuesConfig::default()).unwrap();
        assert_eq!(e.name, "Bob");
    }

    #[test]
    fn commands_and_empty_text_are_dropped() {
        let hues = HuesConfig::default();
        assert!(route(&msg(MessageType::Command, "", "/x", None), &hues).is_none());
        assert!(route(&msg(MessageType::System, "", "", None), &hues).is_none());
    }

    #[test]
    fn channel_messages_take_configured_hues() {
        let hues = HuesConfig::default();
        let e = route(&msg(MessageType::Guild, "Ann", "hey", Some(1)), &hues).unwrap();
        assert_eq!(e.hue, hues.guild);
        assert_eq!(e.name, "[Guild][Ann]");
        let e = route(&msg(MessageType::Emote, "Ann", "*waves*", Some(1)), &hues).unwrap();
        assert_eq!(e.hue, hues.emote);
    }

    #[test]
    fn labels_name_the_parent() {
        let hues = HuesConfig::default();
        assert_eq!(route(&msg(MessageType::Label, "", "a chest", Some(3)), &hues).unwrap().name, "You see");
        assert_eq!(route(&msg(MessageType::Label, "", "a chest", None), &hues).unwrap().name, "");
    }

    #[test]
    fn journal_is_bounded() {
        let mut j = Journal::with_capacity(2);
        for i in 0..3 {
            j.push(JournalEntry {
                name: String::new(),
                text: i.to_string(),
                hue: 0,
                kind: MessageType::System,
            });
        }
        assert_eq!(j.len(), 2);
        assert_eq!(j.iter().next().unwrap().text, "1");
        assert_eq!(j.last().unwrap().text, "2");
    }
}
