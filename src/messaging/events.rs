use std::fmt;

use crate::internationalization::Language;

/// Named topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The page language changed. Carries [`BusEvent::ChangeLang`].
    ChangeLang,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::ChangeLang => "changeLang",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload published on the bus. Each variant belongs to exactly one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    ChangeLang(Language),
}

impl BusEvent {
    pub fn channel(&self) -> Channel {
        match self {
            BusEvent::ChangeLang(_) => Channel::ChangeLang,
        }
    }
}
