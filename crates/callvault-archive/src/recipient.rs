// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped registry between identities and recipient ids.
//!
//! The archive side hands out ids on first reference; the restore side
//! learns them from recipient frames. Neither side ever rebinds an id.

use std::collections::HashMap;

use callvault_core::{Identity, RecipientId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no recipient id assigned to {0}")]
pub struct MissingRecipient(pub Identity);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("recipient id {0} was never registered")]
pub struct UnknownRecipientId(pub RecipientId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recipient id {id} is bound to {existing}, refusing to rebind it to {attempted}")]
pub struct DuplicateRecipientId {
    pub id: RecipientId,
    pub existing: Identity,
    pub attempted: Identity,
}

/// Position in the assignment history, used to undo a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientCheckpoint {
    assigned: usize,
    next: u64,
}

/// Archive-side registry: identity to id, allocated monotonically from 1.
#[derive(Debug)]
pub struct RecipientArchivingContext {
    ids: HashMap<Identity, RecipientId>,
    // Assignment order, for rollback and for emitting recipient frames.
    order: Vec<Identity>,
    next: u64,
}

impl Default for RecipientArchivingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientArchivingContext {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            order: Vec::new(),
            next: 1,
        }
    }

    /// The id of `identity`, allocating the next one on first sight.
    pub fn assign_id(&mut self, identity: Identity) -> RecipientId {
        if let Some(id) = self.ids.get(&identity) {
            return *id;
        }
        let id = RecipientId(self.next);
        self.next += 1;
        self.order.push(identity.clone());
        self.ids.insert(identity, id);
        id
    }

    /// Read-only lookup. Never allocates.
    pub fn recipient_id(&self, identity: &Identity) -> Result<RecipientId, MissingRecipient> {
        self.ids
            .get(identity)
            .copied()
            .ok_or_else(|| MissingRecipient(identity.clone()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn checkpoint(&self) -> RecipientCheckpoint {
        RecipientCheckpoint {
            assigned: self.order.len(),
            next: self.next,
        }
    }

    /// Forget every id assigned after `checkpoint`. Those ids are handed out
    /// again, so nothing referencing them may have been emitted.
    pub fn rollback_to(&mut self, checkpoint: RecipientCheckpoint) {
        let keep = checkpoint.assigned.min(self.order.len());
        for identity in self.order.drain(keep..) {
            self.ids.remove(&identity);
        }
        self.next = checkpoint.next;
    }

    /// Identities assigned after `checkpoint`, with their ids.
    pub fn assigned_since(
        &self,
        checkpoint: RecipientCheckpoint,
    ) -> impl Iterator<Item = (RecipientId, &Identity)> {
        self.order[checkpoint.assigned.min(self.order.len())..]
            .iter()
            .filter_map(|identity| self.ids.get(identity).map(|id| (*id, identity)))
    }
}

/// Restore-side registry: id to identity, as declared by recipient frames.
#[derive(Debug, Default)]
pub struct RecipientRestoringContext {
    identities: HashMap<RecipientId, Identity>,
}

impl RecipientRestoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` could be bound to `identity` without rebinding it.
    pub fn check_address(
        &self,
        id: RecipientId,
        identity: &Identity,
    ) -> Result<(), DuplicateRecipientId> {
        match self.identities.get(&id) {
            Some(existing) if existing != identity => Err(DuplicateRecipientId {
                id,
                existing: existing.clone(),
                attempted: identity.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Bind `id` to `identity`. Registering the same pair twice is a no-op.
    pub fn register_address(
        &mut self,
        id: RecipientId,
        identity: Identity,
    ) -> Result<(), DuplicateRecipientId> {
        self.check_address(id, &identity)?;
        self.identities.entry(id).or_insert(identity);
        Ok(())
    }

    pub fn lookup(&self, id: RecipientId) -> Result<&Identity, UnknownRecipientId> {
        self.identities.get(&id).ok_or(UnknownRecipientId(id))
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callvault_core::{AccountId, GroupId};

    fn contact(aci: &str) -> Identity {
        Identity::Contact(AccountId::from(aci))
    }

    #[test]
    fn ids_start_at_one_and_are_stable() {
        let mut ctx = RecipientArchivingContext::new();
        assert_eq!(ctx.assign_id(Identity::LocalUser), RecipientId(1));
        assert_eq!(ctx.assign_id(contact("a")), RecipientId(2));
        assert_eq!(ctx.assign_id(Identity::LocalUser), RecipientId(1));
        assert_eq!(ctx.recipient_id(&contact("a")), Ok(RecipientId(2)));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn lookup_does_not_allocate() {
        let ctx = RecipientArchivingContext::new();
        assert_eq!(
            ctx.recipient_id(&contact("ghost")),
            Err(MissingRecipient(contact("ghost")))
        );
        assert!(ctx.is_empty());
    }

    #[test]
    fn rollback_releases_ids_assigned_after_checkpoint() {
        let mut ctx = RecipientArchivingContext::new();
        ctx.assign_id(Identity::LocalUser);
        let checkpoint = ctx.checkpoint();
        ctx.assign_id(Identity::Group(GroupId::from("g")));
        ctx.assign_id(contact("b"));
        assert_eq!(ctx.assigned_since(checkpoint).count(), 2);

        ctx.rollback_to(checkpoint);
        assert!(ctx.recipient_id(&contact("b")).is_err());
        assert_eq!(ctx.assigned_since(checkpoint).count(), 0);
        assert_eq!(ctx.assign_id(contact("c")), RecipientId(2));
    }

    #[test]
    fn register_is_idempotent_but_never_rebinds() {
        let mut ctx = RecipientRestoringContext::new();
        ctx.register_address(RecipientId(7), contact("a")).unwrap();
        ctx.register_address(RecipientId(7), contact("a")).unwrap();
        let err = ctx
            .register_address(RecipientId(7), contact("b"))
            .unwrap_err();
        assert_eq!(err.existing, contact("a"));
        assert_eq!(ctx.lookup(RecipientId(7)), Ok(&contact("a")));
        assert_eq!(ctx.lookup(RecipientId(8)), Err(UnknownRecipientId(RecipientId(8))));
    }

    #[test]
    fn check_does_not_bind() {
        let mut ctx = RecipientRestoringContext::new();
        assert_eq!(ctx.check_address(RecipientId(3), &contact("a")), Ok(()));
        assert!(ctx.is_empty());

        ctx.register_address(RecipientId(3), contact("a")).unwrap();
        assert_eq!(ctx.check_address(RecipientId(3), &contact("a")), Ok(()));
        let err = ctx.check_address(RecipientId(3), &contact("b")).unwrap_err();
        assert_eq!(err.attempted, contact("b"));
    }
}
