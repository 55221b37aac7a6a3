#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Moved(Option<usize>),
    Select(usize),
    Commit,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardSession {
    highlighted: Option<usize>,
    len: usize,
}

impl KeyboardSession {
    pub fn reset(&mut self, len: usize) {
        self.highlighted = None;
        self.len = len;
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn index(&self) -> isize {
        self.highlighted.map_or(-1, |index| index as isize)
    }

    pub fn on_key(&mut self, key: Key) -> KeyIntent {
        match key {
            Key::Down => {
                if self.len > 0 {
                    let max = self.len - 1;
                    self.highlighted =
                        Some(self.highlighted.map_or(0, |index| (index + 1).min(max)));
                }
                KeyIntent::Moved(self.highlighted)
            }
            Key::Up => {
                self.highlighted = match self.highlighted {
                    None | Some(0) => None,
                    Some(index) => Some(index - 1),
                };
                KeyIntent::Moved(self.highlighted)
            }
            Key::Enter => match self.highlighted {
                Some(index) if index < self.len => KeyIntent::Select(index),
                _ => KeyIntent::Commit,
            },
            Key::Escape => {
                self.highlighted = None;
                KeyIntent::Close
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyIntent, KeyboardSession};

    #[test]
    fn down_clamps_at_last_entry() {
        let mut session = KeyboardSession::default();
        session.reset(3);
        session.on_key(Key::Down);
        session.on_key(Key::Down);
        assert_eq!(session.index(), 1);
        session.on_key(Key::Down);
        assert_eq!(session.index(), 2);
        session.on_key(Key::Down);
        assert_eq!(session.index(), 2);
    }

    #[test]
    fn up_clamps_at_no_highlight() {
        let mut session = KeyboardSession::default();
        session.reset(2);
        assert_eq!(session.on_key(Key::Up), KeyIntent::Moved(None));
        session.on_key(Key::Down);
        session.on_key(Key::Up);
        assert_eq!(session.index(), -1);
    }

    #[test]
    fn down_on_empty_list_stays_unhighlighted() {
        let mut session = KeyboardSession::default();
        assert_eq!(session.on_key(Key::Down), KeyIntent::Moved(None));
        assert_eq!(session.index(), -1);
    }

    #[test]
    fn enter_selects_highlight_or_commits() {
        let mut session = KeyboardSession::default();
        session.reset(2);
        assert_eq!(session.on_key(Key::Enter), KeyIntent::Commit);
        session.on_key(Key::Down);
        assert_eq!(session.on_key(Key::Enter), KeyIntent::Select(0));
    }

    #[test]
    fn escape_clears_highlight() {
        let mut session = KeyboardSession::default();
        session.reset(2);
        session.on_key(Key::Down);
        assert_eq!(session.on_key(Key::Escape), KeyIntent::Close);
        assert_eq!(session.highlighted(), None);
    }

    #[test]
    fn any_key_sequence_keeps_index_in_bounds() {
        let keys = [Key::Down, Key::Up];
        for len in 0..5 {
            let mut session = KeyboardSession::default();
            session.reset(len);
            // Deterministic pseudo-random walk over the key set.
            let mut state = 7_u32 + len as u32;
            for _ in 0..200 {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let key = keys[(state >> 16) as usize % 2];
                session.on_key(key);
                let index = session.index();
                assert!(index >= -1 && index < len as isize, "len={len} index={index}");
            }
        }
    }
}
