use std::fmt;

/// Identity of one parsed entity, unique within a single object graph.
///
/// Ids are handed out in document order, starting at zero for the root.
/// They key the location side-channel and take no part in equality of
/// entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub value: u32,
}

impl EntityId {
    pub fn new(value: u32) -> Self {
        EntityId { value }
    }

    /// The id following this one.
    pub(crate) fn next(self) -> Self {
        EntityId {
            value: self.value + 1,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}
