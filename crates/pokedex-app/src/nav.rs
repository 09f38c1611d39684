// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ViewCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Handheld inputs: the d-pad, the A (confirm) and B (cancel) buttons,
/// and the two keyboard shortcuts that jump straight to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadInput {
    Dpad(Direction),
    Confirm,
    Cancel,
    JumpSearch,
    JumpFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOption {
    TypeFilter,
    SortMode,
}

/// Virtual keyboard key. The bottom row carries the three specials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Clear,
    Close,
}

pub const KEYBOARD_ROWS: [&[Key]; 4] = [
    &[
        Key::Char('Q'),
        Key::Char('W'),
        Key::Char('E'),
        Key::Char('R'),
        Key::Char('T'),
        Key::Char('Y'),
        Key::Char('U'),
        Key::Char('I'),
        Key::Char('O'),
        Key::Char('P'),
    ],
    &[
        Key::Char('A'),
        Key::Char('S'),
        Key::Char('D'),
        Key::Char('F'),
        Key::Char('G'),
        Key::Char('H'),
        Key::Char('J'),
        Key::Char('K'),
        Key::Char('L'),
        Key::Char('Ç'),
    ],
    &[
        Key::Char('Z'),
        Key::Char('X'),
        Key::Char('C'),
        Key::Char('V'),
        Key::Char('B'),
        Key::Char('N'),
        Key::Char('M'),
        Key::Char('.'),
        Key::Char('-'),
        Key::Char(' '),
    ],
    &[Key::Delete, Key::Clear, Key::Close],
];

pub fn key_at(row: usize, col: usize) -> Option<Key> {
    KEYBOARD_ROWS.get(row)?.get(col).copied()
}

/// Which screen region owns directional input. Cursor data lives on
/// the variant that needs it, so an out-of-region cursor cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Search,
    Filter { option: FilterOption },
    Keyboard { row: usize, col: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailCursor {
    Header,
    Listen,
    Description,
    Related,
}

impl DetailCursor {
    const ORDER: [Self; 4] = [Self::Header, Self::Listen, Self::Description, Self::Related];

    fn step(self, delta: isize) -> Self {
        let current = Self::ORDER
            .iter()
            .position(|cursor| *cursor == self)
            .unwrap_or(0) as isize;
        let last = Self::ORDER.len() as isize - 1;
        let next = (current + delta).clamp(0, last) as usize;
        Self::ORDER[next]
    }
}

/// Focus state of an open detail view: a four-position vertical cursor
/// with a bounded horizontal sub-cursor over the related-group carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailNav {
    pub cursor: DetailCursor,
    pub related_index: usize,
    pub related_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    FocusChanged(Focus),
    SelectionMoved(usize),
    CriteriaChanged,
    DetailRequested(usize),
    DetailClosed,
    DetailCursorMoved(DetailCursor),
    RelatedMoved(usize),
    RelatedSelected(usize),
    SpeakToggled,
}

/// Top-level navigation state. While a detail view is open all input
/// is delegated to it; the underlying focus is restored on close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub focus: Focus,
    pub list_index: usize,
    pub criteria: ViewCriteria,
    pub detail: Option<DetailNav>,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            focus: Focus::List,
            list_index: 0,
            criteria: ViewCriteria::default(),
            detail: None,
        }
    }
}

impl NavState {
    pub fn dispatch(&mut self, input: PadInput, visible_len: usize) -> Vec<NavEvent> {
        if self.detail.is_some() {
            return self.dispatch_detail(input);
        }

        match input {
            PadInput::Dpad(direction) => self.dispatch_dpad(direction, visible_len),
            PadInput::Confirm => self.dispatch_confirm(visible_len),
            PadInput::Cancel => self.dispatch_cancel(),
            PadInput::JumpSearch => self.set_focus(Focus::Search),
            PadInput::JumpFilter => self.set_focus(Focus::Filter {
                option: FilterOption::TypeFilter,
            }),
        }
    }

    /// Enter the detail view with the cursor on the listen button.
    pub fn open_detail(&mut self, related_len: usize) {
        self.detail = Some(DetailNav {
            cursor: DetailCursor::Listen,
            related_index: 0,
            related_len,
        });
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Reset the selection when the derived view shrank beneath it.
    pub fn clamp_selection(&mut self, visible_len: usize) -> bool {
        if self.list_index > 0 && self.list_index >= visible_len {
            self.list_index = 0;
            return true;
        }
        false
    }

    fn dispatch_dpad(&mut self, direction: Direction, visible_len: usize) -> Vec<NavEvent> {
        match self.focus {
            Focus::List => match direction {
                Direction::Up if self.list_index == 0 => self.set_focus(Focus::Search),
                Direction::Up => {
                    self.list_index -= 1;
                    vec![NavEvent::SelectionMoved(self.list_index)]
                }
                Direction::Down if self.list_index + 1 < visible_len => {
                    self.list_index += 1;
                    vec![NavEvent::SelectionMoved(self.list_index)]
                }
                _ => Vec::new(),
            },
            Focus::Search => match direction {
                Direction::Down => self.set_focus(Focus::List),
                Direction::Up => self.set_focus(Focus::Filter {
                    option: FilterOption::TypeFilter,
                }),
                _ => Vec::new(),
            },
            Focus::Filter { .. } => match direction {
                Direction::Down => self.set_focus(Focus::Search),
                Direction::Left => self.set_focus(Focus::Filter {
                    option: FilterOption::TypeFilter,
                }),
                Direction::Right => self.set_focus(Focus::Filter {
                    option: FilterOption::SortMode,
                }),
                Direction::Up => Vec::new(),
            },
            Focus::Keyboard { row, col } => {
                let (next_row, next_col) = match direction {
                    Direction::Up if row > 0 => (row - 1, clamp_to_row(row - 1, col)),
                    Direction::Down if row + 1 < KEYBOARD_ROWS.len() => {
                        (row + 1, clamp_to_row(row + 1, col))
                    }
                    Direction::Left if col > 0 => (row, col - 1),
                    Direction::Right if col + 1 < KEYBOARD_ROWS[row].len() => (row, col + 1),
                    _ => return Vec::new(),
                };
                self.set_focus(Focus::Keyboard {
                    row: next_row,
                    col: next_col,
                })
            }
        }
    }

    fn dispatch_confirm(&mut self, visible_len: usize) -> Vec<NavEvent> {
        match self.focus {
            Focus::List => {
                if self.list_index < visible_len {
                    vec![NavEvent::DetailRequested(self.list_index)]
                } else {
                    Vec::new()
                }
            }
            Focus::Search => self.set_focus(Focus::Keyboard { row: 0, col: 0 }),
            Focus::Filter { option } => {
                match option {
                    FilterOption::TypeFilter => {
                        self.criteria.type_filter = self.criteria.type_filter.cycle();
                    }
                    FilterOption::SortMode => {
                        self.criteria.sort = self.criteria.sort.cycle();
                    }
                }
                vec![NavEvent::CriteriaChanged]
            }
            Focus::Keyboard { row, col } => match key_at(row, col) {
                Some(Key::Close) => self.set_focus(Focus::List),
                Some(Key::Delete) => {
                    self.criteria.search.pop();
                    vec![NavEvent::CriteriaChanged]
                }
                Some(Key::Clear) => {
                    self.criteria.search.clear();
                    vec![NavEvent::CriteriaChanged]
                }
                Some(Key::Char(ch)) => {
                    self.criteria.search.push(ch);
                    vec![NavEvent::CriteriaChanged]
                }
                None => Vec::new(),
            },
        }
    }

    fn dispatch_cancel(&mut self) -> Vec<NavEvent> {
        if let Focus::Keyboard { .. } = self.focus {
            return self.set_focus(Focus::Search);
        }

        if self.criteria.is_default() {
            return Vec::new();
        }

        self.criteria.reset();
        self.list_index = 0;
        self.focus = Focus::List;
        vec![
            NavEvent::CriteriaChanged,
            NavEvent::SelectionMoved(0),
            NavEvent::FocusChanged(Focus::List),
        ]
    }

    fn dispatch_detail(&mut self, input: PadInput) -> Vec<NavEvent> {
        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };

        match input {
            PadInput::Dpad(direction) => match detail.cursor {
                DetailCursor::Related => match direction {
                    Direction::Left if detail.related_index > 0 => {
                        detail.related_index -= 1;
                        vec![NavEvent::RelatedMoved(detail.related_index)]
                    }
                    Direction::Right if detail.related_index + 1 < detail.related_len => {
                        detail.related_index += 1;
                        vec![NavEvent::RelatedMoved(detail.related_index)]
                    }
                    Direction::Up => {
                        detail.cursor = DetailCursor::Description;
                        vec![NavEvent::DetailCursorMoved(detail.cursor)]
                    }
                    _ => Vec::new(),
                },
                cursor => {
                    let next = match direction {
                        Direction::Up => cursor.step(-1),
                        Direction::Down => cursor.step(1),
                        Direction::Left | Direction::Right => cursor,
                    };
                    if next == cursor {
                        Vec::new()
                    } else {
                        detail.cursor = next;
                        vec![NavEvent::DetailCursorMoved(next)]
                    }
                }
            },
            PadInput::Confirm => match detail.cursor {
                DetailCursor::Header => {
                    self.detail = None;
                    vec![NavEvent::DetailClosed]
                }
                DetailCursor::Listen => vec![NavEvent::SpeakToggled],
                DetailCursor::Description => Vec::new(),
                DetailCursor::Related => {
                    if detail.related_len > 0 {
                        vec![NavEvent::RelatedSelected(detail.related_index)]
                    } else {
                        Vec::new()
                    }
                }
            },
            PadInput::Cancel => {
                self.detail = None;
                vec![NavEvent::DetailClosed]
            }
            PadInput::JumpSearch | PadInput::JumpFilter => Vec::new(),
        }
    }

    fn set_focus(&mut self, focus: Focus) -> Vec<NavEvent> {
        if self.focus == focus {
            return Vec::new();
        }
        self.focus = focus;
        vec![NavEvent::FocusChanged(focus)]
    }
}

fn clamp_to_row(row: usize, col: usize) -> usize {
    let width = KEYBOARD_ROWS[row].len();
    col.min(width.saturating_sub(1))
}
