use super::Id;

/// A single character of a WOOT sequence.
///
/// `previous` and `next` are the neighbours observed when the character
/// was created. They are only used to re-derive the character's place
/// during integration and are never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Char {
    id: Id,
    value: char,
    visible: bool,
    previous: Id,
    next: Id,
}

impl Char {
    /// Create a visible character placed between `previous` and `next`.
    pub fn new(id: Id, value: char, previous: Id, next: Id) -> Self {
        Self {
            id,
            value,
            visible: true,
            previous,
            next,
        }
    }

    /// The two boundary characters every sequence starts with.
    pub(crate) fn genesis() -> [Self; 2] {
        [
            Self::new(Id::Begin, '\0', Id::Begin, Id::Begin),
            Self::new(Id::End, '\0', Id::End, Id::End),
        ]
    }

    /// Identifier of this character.
    #[must_use]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The character itself.
    #[must_use]
    pub fn value(&self) -> char {
        self.value
    }

    /// Whether the character is still part of the visible text.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Left neighbour at creation time.
    #[must_use]
    pub fn previous(&self) -> Id {
        self.previous
    }

    /// Right neighbour at creation time.
    #[must_use]
    pub fn next(&self) -> Id {
        self.next
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
