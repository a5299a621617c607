//! Enrollment progression engine.
//!
//! The state machine governing an enrollment's module cursor:
//! completing a module either moves the cursor to the next module in
//! the simulation's defined order or, when no module follows, completes
//! the enrollment. The decision itself is a pure function over the
//! ordered module list; persisting the outcome is the caller's job.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A module's identity and position within its simulation.
///
/// Lightweight projection of the catalog's module rows; the progression
/// engine needs nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Module id.
    pub id: Uuid,
    /// Position in the simulation's defined sequence (ascending).
    pub position: i32,
}

/// Outcome of completing one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    /// A module follows: move the enrollment cursor to it.
    NextModule(Uuid),
    /// No module follows: the enrollment is complete.
    Complete,
}

/// Decides how an enrollment advances after `completed_module_id` is
/// evaluated.
///
/// `modules` must be the simulation's full module list ordered by
/// sequence position. If the completed module has a successor, the
/// enrollment moves to it; otherwise it completes. A module id that is
/// not in the list falls through to completion as well, the same as the
/// last module; callers must only invoke this once per evaluated
/// submission (re-supplying an already-advanced-past module id would
/// re-advance from the stale position).
///
/// # Examples
///
/// ```
/// use atelier_domain::{plan_advancement, Advancement, ModuleRef};
/// use uuid::Uuid;
///
/// let m1 = ModuleRef { id: Uuid::new_v4(), position: 1 };
/// let m2 = ModuleRef { id: Uuid::new_v4(), position: 2 };
///
/// assert_eq!(plan_advancement(&[m1, m2], m1.id), Advancement::NextModule(m2.id));
/// assert_eq!(plan_advancement(&[m1, m2], m2.id), Advancement::Complete);
/// ```
#[must_use]
pub fn plan_advancement(modules: &[ModuleRef], completed_module_id: Uuid) -> Advancement {
    let index = modules.iter().position(|m| m.id == completed_module_id);
    match index {
        Some(i) if i + 1 < modules.len() => Advancement::NextModule(modules[i + 1].id),
        // Last module, or an id not in this simulation's list: both
        // settle the enrollment as complete.
        _ => Advancement::Complete,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn modules(n: usize) -> Vec<ModuleRef> {
        (0..n)
            .map(|i| ModuleRef {
                id: Uuid::new_v4(),
                position: i32::try_from(i).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_advances_to_next_module() {
        let mods = modules(3);
        assert_eq!(
            plan_advancement(&mods, mods[0].id),
            Advancement::NextModule(mods[1].id)
        );
        assert_eq!(
            plan_advancement(&mods, mods[1].id),
            Advancement::NextModule(mods[2].id)
        );
    }

    #[test]
    fn test_last_module_completes() {
        let mods = modules(3);
        assert_eq!(plan_advancement(&mods, mods[2].id), Advancement::Complete);
    }

    #[test]
    fn test_single_module_completes() {
        let mods = modules(1);
        assert_eq!(plan_advancement(&mods, mods[0].id), Advancement::Complete);
    }

    #[test]
    fn test_unknown_module_falls_through_to_completion() {
        let mods = modules(3);
        let stale_id = Uuid::new_v4();
        assert_eq!(plan_advancement(&mods, stale_id), Advancement::Complete);
    }

    #[test]
    fn test_empty_module_list_completes() {
        assert_eq!(plan_advancement(&[], Uuid::new_v4()), Advancement::Complete);
    }
}
