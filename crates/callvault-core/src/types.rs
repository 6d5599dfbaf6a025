// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and identifier types shared by the store and the frame format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account identifier of a contact (or of the local user).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

/// Identifier of a group conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

/// Identifier of a story distribution list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionListId(pub String);

/// Identifier of a call link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallLinkId(pub String);

macro_rules! impl_display_for_id {
    ($($id:ty),*) => {
        $(
            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $id {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

impl_display_for_id!(AccountId, GroupId, DistributionListId, CallLinkId);

/// Every entity a backup can address.
///
/// Used as the key of the archive-side recipient registry and as the value
/// of the restore-side one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    LocalUser,
    Contact(AccountId),
    Group(GroupId),
    DistributionList(DistributionListId),
    ReleaseNotes,
    CallLink(CallLinkId),
}

impl Identity {
    /// The contact account id, if this identity is a contact.
    pub fn as_contact(&self) -> Option<&AccountId> {
        match self {
            Identity::Contact(aci) => Some(aci),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::LocalUser => f.write_str("local_user"),
            Identity::Contact(aci) => write!(f, "contact:{aci}"),
            Identity::Group(id) => write!(f, "group:{id}"),
            Identity::DistributionList(id) => write!(f, "distribution_list:{id}"),
            Identity::ReleaseNotes => f.write_str("release_notes"),
            Identity::CallLink(id) => write!(f, "call_link:{id}"),
        }
    }
}

/// Session-scoped compact id of an [`Identity`] within one frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub u64);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row id of an interaction in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(pub i64);

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The local account, needed to attribute outgoing calls on restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentifiers {
    pub account_id: Option<AccountId>,
}

impl LocalIdentifiers {
    pub fn new(account_id: Option<AccountId>) -> Self {
        Self { account_id }
    }
}
