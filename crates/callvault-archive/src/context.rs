// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session state threaded through every archiver call.

use callvault_core::{AccountId, CallvaultError, ChatThread, Identity, LocalIdentifiers, RecipientId};
use rusqlite::Connection;

use crate::bridge::CallRecordBridge;
use crate::error::{ArchiveFrameError, InvalidProtoData, RestoreFrameError};
use crate::recipient::{MissingRecipient, RecipientArchivingContext, RecipientRestoringContext};

/// State of one archive pass.
pub struct ArchivingContext<'conn> {
    bridge: CallRecordBridge<'conn>,
    recipients: RecipientArchivingContext,
    local: LocalIdentifiers,
    errors: Vec<ArchiveFrameError>,
}

impl<'conn> ArchivingContext<'conn> {
    pub fn new(conn: &'conn Connection, local: LocalIdentifiers) -> Self {
        Self {
            bridge: CallRecordBridge::new(conn),
            recipients: RecipientArchivingContext::new(),
            local,
            errors: Vec::new(),
        }
    }

    pub fn bridge(&self) -> &CallRecordBridge<'conn> {
        &self.bridge
    }

    pub fn recipients(&self) -> &RecipientArchivingContext {
        &self.recipients
    }

    pub fn recipients_mut(&mut self) -> &mut RecipientArchivingContext {
        &mut self.recipients
    }

    pub fn local(&self) -> &LocalIdentifiers {
        &self.local
    }

    /// The identity an account id is archived as. The local account is the
    /// local user, never a contact.
    pub fn identity_for_account(&self, account_id: &AccountId) -> Identity {
        if self.local.account_id.as_ref() == Some(account_id) {
            Identity::LocalUser
        } else {
            Identity::Contact(account_id.clone())
        }
    }

    /// Read-only id lookup for an account referenced from inside an item.
    pub fn account_recipient_id(
        &self,
        account_id: &AccountId,
    ) -> Result<RecipientId, MissingRecipient> {
        self.recipients
            .recipient_id(&self.identity_for_account(account_id))
    }

    pub fn record_errors(&mut self, errors: impl IntoIterator<Item = ArchiveFrameError>) {
        self.errors.extend(errors);
    }

    pub fn errors(&self) -> &[ArchiveFrameError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ArchiveFrameError> {
        self.errors
    }
}

/// State of one restore pass.
pub struct RestoringContext<'conn> {
    bridge: CallRecordBridge<'conn>,
    recipients: RecipientRestoringContext,
    local: LocalIdentifiers,
    errors: Vec<RestoreFrameError>,
}

impl<'conn> RestoringContext<'conn> {
    pub fn new(conn: &'conn Connection, local: LocalIdentifiers) -> Self {
        Self {
            bridge: CallRecordBridge::new(conn),
            recipients: RecipientRestoringContext::new(),
            local,
            errors: Vec::new(),
        }
    }

    pub fn bridge(&self) -> &CallRecordBridge<'conn> {
        &self.bridge
    }

    pub fn recipients(&self) -> &RecipientRestoringContext {
        &self.recipients
    }

    pub fn recipients_mut(&mut self) -> &mut RecipientRestoringContext {
        &mut self.recipients
    }

    pub fn local(&self) -> &LocalIdentifiers {
        &self.local
    }

    /// Resolve a recipient id that must name an account.
    ///
    /// The local user resolves to the local account id when one is known.
    pub fn account_for(&self, id: RecipientId) -> Result<AccountId, InvalidProtoData> {
        match self.recipients.lookup(id)? {
            Identity::Contact(account_id) => Ok(account_id.clone()),
            Identity::LocalUser => self
                .local
                .account_id
                .clone()
                .ok_or(InvalidProtoData::GroupCallRecipientIdNotAnAci(id)),
            Identity::Group(_)
            | Identity::DistributionList(_)
            | Identity::ReleaseNotes
            | Identity::CallLink(_) => Err(InvalidProtoData::GroupCallRecipientIdNotAnAci(id)),
        }
    }

    /// The chat thread for `identity`, created if needed. `None` when the
    /// identity cannot own a chat.
    pub fn thread_for(&self, identity: &Identity) -> Result<Option<ChatThread>, CallvaultError> {
        match identity {
            Identity::Contact(account_id) => self.bridge.contact_thread(account_id).map(Some),
            Identity::Group(group_id) => self.bridge.group_thread(group_id).map(Some),
            Identity::LocalUser => match &self.local.account_id {
                Some(account_id) => self.bridge.contact_thread(account_id).map(Some),
                None => Ok(None),
            },
            Identity::DistributionList(_) | Identity::ReleaseNotes | Identity::CallLink(_) => {
                Ok(None)
            }
        }
    }

    pub fn record_errors(&mut self, errors: impl IntoIterator<Item = RestoreFrameError>) {
        self.errors.extend(errors);
    }

    pub fn errors(&self) -> &[RestoreFrameError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<RestoreFrameError> {
        self.errors
    }
}
