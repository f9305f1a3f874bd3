//! Per-assignment component contexts.
//!
//! Components that keep incremental caches against an assignment (criteria,
//! conflict statistics, tabu lists, metaheuristic state) are stateless
//! themselves; their mutable state lives in a slot of the assignment's
//! [`ContextStore`], keyed by the component id the model hands out at
//! registration. One slot exists per (component, assignment) pair.

use std::any::Any;

/// Arena of per-component context slots owned by one assignment.
#[derive(Default)]
pub struct ContextStore {
    slots: Vec<Option<Box<dyn Any + Send>>>,
}

impl ContextStore {
    /// The component's context for this assignment, created through `init` on
    /// first touch.
    pub fn get_or_insert_with<C: Any + Send>(
        &mut self,
        component: usize,
        init: impl FnOnce() -> C,
    ) -> &mut C {
        if self.slots.len() <= component {
            self.slots.resize_with(component + 1, || None);
        }
        let slot = &mut self.slots[component];
        let stale = match slot {
            Some(existing) => existing.downcast_ref::<C>().is_none(),
            None => true,
        };
        if stale {
            *slot = Some(Box::new(init()));
        }
        match slot.as_mut().and_then(|b| b.downcast_mut::<C>()) {
            Some(ctx) => ctx,
            // Unreachable: the slot was just (re)initialized with a C.
            None => unreachable!("context slot type confusion"),
        }
    }

    /// Read-only view of a context, `None` before first touch.
    pub fn get<C: Any + Send>(&self, component: usize) -> Option<&C> {
        self.slots
            .get(component)
            .and_then(|slot| slot.as_ref())
            .and_then(|b| b.downcast_ref::<C>())
    }
}

/// The cached running total every criterion keeps per assignment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueContext {
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn slot_is_created_once_and_persists() {
        let mut store = ContextStore::default();
        store.get_or_insert_with(3, Counter::default).hits += 1;
        store.get_or_insert_with(3, Counter::default).hits += 1;
        assert_eq!(store.get::<Counter>(3).map(|c| c.hits), Some(2));
        assert!(store.get::<Counter>(0).is_none());
    }

    #[test]
    fn slots_are_independent_per_component() {
        let mut store = ContextStore::default();
        store.get_or_insert_with(0, ValueContext::default).total = 4.0;
        store.get_or_insert_with(1, ValueContext::default).total = 9.0;
        assert_eq!(store.get::<ValueContext>(0).map(|c| c.total), Some(4.0));
        assert_eq!(store.get::<ValueContext>(1).map(|c| c.total), Some(9.0));
    }
}
