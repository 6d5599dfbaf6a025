// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-call-kind codec contract and its dispatch.

use callvault_core::{CallvaultError, ChatThread, Interaction, InteractionKindTag};

use crate::context::{ArchivingContext, RestoringContext};
use crate::error::{ArchiveFrameError, FrameOutcome, RestoreFrameError, RestoreFrameId};
use crate::frame::{CallFrame, ChatItemFrame};
use crate::group_call::GroupCallArchiver;
use crate::individual_call::IndividualCallArchiver;

pub type ArchiveItemResult = FrameOutcome<CallFrame, ArchiveFrameError>;
pub type RestoreItemResult = FrameOutcome<(), RestoreFrameError>;

/// Converts one kind of call interaction to and from its frame.
pub trait CallItemArchiver {
    /// The interaction kind this archiver handles.
    fn kind(&self) -> InteractionKindTag;

    /// Build the call frame for `interaction`.
    ///
    /// `Err` is reserved for failures that must abort the whole session,
    /// such as the store failing underneath us.
    fn archive(
        &self,
        interaction: &Interaction,
        ctx: &ArchivingContext<'_>,
    ) -> Result<ArchiveItemResult, CallvaultError>;

    /// Insert the interaction (and call record, when the frame has a call
    /// id) described by `item` into `thread`. Never aborts the session.
    fn restore(
        &self,
        item: &ChatItemFrame,
        thread: &ChatThread,
        ctx: &RestoringContext<'_>,
    ) -> RestoreItemResult;
}

/// The archiver for an interaction kind.
pub fn archiver_for(kind: InteractionKindTag) -> &'static dyn CallItemArchiver {
    match kind {
        InteractionKindTag::IndividualCall => &IndividualCallArchiver,
        InteractionKindTag::GroupCall => &GroupCallArchiver,
    }
}

impl CallFrame {
    /// The interaction kind this call frame restores to.
    pub fn kind(&self) -> InteractionKindTag {
        match self {
            CallFrame::Individual(_) => InteractionKindTag::IndividualCall,
            CallFrame::Group(_) => InteractionKindTag::GroupCall,
        }
    }
}

impl ChatItemFrame {
    pub fn frame_id(&self) -> RestoreFrameId {
        RestoreFrameId::ChatItem {
            chat_recipient_id: self.chat_recipient_id,
            date_sent: self.date_sent,
        }
    }
}
