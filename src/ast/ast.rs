use crate::type_checker::types::TypeId;

/// The type the checker resolved for a node.
///
/// Starts empty and is written exactly once per checking pass; `Typed::reset`
/// empties it again before the next pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedType(Option<TypeId>);

impl ResolvedType {
    pub fn get(&self) -> Option<TypeId> {
        self.0
    }

    pub fn is_resolved(&self) -> bool {
        self.0.is_some()
    }

    /// Empties the slot ahead of a new checking pass.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Panics on a second write: that is a checker bug, not a user error.
    pub fn set(&mut self, ty: TypeId) {
        if let Some(existing) = self.0 {
            panic!("resolved type written twice ({:?} then {:?})", existing, ty);
        }
        self.0 = Some(ty);
    }
}

/// Walks a subtree counting nodes whose resolved type is still empty.
pub trait Typed {
    fn resolved(&self) -> &ResolvedType;

    fn unresolved_nodes(&self) -> usize;

    /// Clears the resolved type of this node and every node below it.
    fn reset(&mut self);
}

pub(crate) fn count_slot(slot: &ResolvedType) -> usize {
    usize::from(!slot.is_resolved())
}
