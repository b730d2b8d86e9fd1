use core::any::TypeId;

use dm_utils::hash::HashSet;

/// Types currently being built by one top-level registry call.
///
/// A type that is already in flight is skipped by dependency resolution,
/// which terminates self-referential and mutually referential graphs.
#[derive(Debug, Default)]
pub(crate) struct BuildSession {
    in_flight: HashSet<TypeId>,
}

impl BuildSession {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as in flight, returns `false` if it already was.
    #[inline]
    pub(crate) fn enter(&mut self, id: TypeId) -> bool {
        self.in_flight.insert(id)
    }

    #[inline]
    pub(crate) fn leave(&mut self, id: TypeId) {
        self.in_flight.remove(&id);
    }

    #[inline]
    pub(crate) fn is_building(&self, id: TypeId) -> bool {
        self.in_flight.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::BuildSession;

    #[test]
    fn enter_once() {
        let mut session = BuildSession::new();
        let id = TypeId::of::<u8>();
        assert!(session.enter(id));
        assert!(!session.enter(id));
        assert!(session.is_building(id));
        session.leave(id);
        assert!(!session.is_building(id));
    }
}
