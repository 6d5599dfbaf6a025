// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session drivers: one full archive pass and one full restore pass.
//!
//! Both run on a connection the caller owns, normally an open transaction.
//! Item problems are collected into the returned summary; only store,
//! savepoint, and stream failures abort a session.

use std::collections::HashMap;

use callvault_core::{
    CallvaultError, ChatThread, Identity, Interaction, LocalIdentifiers, RecipientId,
};
use callvault_storage::queries::interactions;
use rusqlite::Connection;

use crate::archiver::{RestoreItemResult, archiver_for};
use crate::context::{ArchivingContext, RestoringContext};
use crate::error::{
    ArchiveFrameError, ArchiveFrameErrorKind, InvalidProtoData, ItemErrors, RestoreFrameError,
    RestoreFrameErrorKind, RestoreFrameId, log_errors,
};
use crate::frame::{ChatItemFrame, Frame, RecipientFrame};
use crate::stream::FrameSink;
use crate::timestamp::validate_timestamp;

/// Counts and item errors of one archive pass.
#[derive(Debug, Default)]
pub struct ArchiveSummary {
    pub recipient_frames: usize,
    pub chat_items: usize,
    pub partial_items: usize,
    pub failed_items: usize,
    pub errors: Vec<ArchiveFrameError>,
}

impl ArchiveSummary {
    /// Log collected errors, collapsing repeats.
    pub fn log_errors(&self, max_collapsed_ids: usize) -> Vec<String> {
        log_errors(&self.errors, max_collapsed_ids)
    }
}

/// Counts and item errors of one restore pass.
#[derive(Debug, Default)]
pub struct RestoreSummary {
    pub recipient_frames: usize,
    pub chat_items: usize,
    pub partial_items: usize,
    pub failed_items: usize,
    pub errors: Vec<RestoreFrameError>,
}

impl RestoreSummary {
    pub fn log_errors(&self, max_collapsed_ids: usize) -> Vec<String> {
        log_errors(&self.errors, max_collapsed_ids)
    }
}

/// Archive every call interaction in `conn` into `sink`.
///
/// The local user is always recipient 1. Every contact that owns a thread
/// gets a recipient frame up front, since items may reference contacts as
/// ringers or originators. Other chat recipients (groups) are assigned when
/// their first item is archived, and that assignment is undone if the item
/// fails.
pub fn archive_session(
    conn: &Connection,
    local: &LocalIdentifiers,
    sink: &mut dyn FrameSink,
) -> Result<ArchiveSummary, CallvaultError> {
    let mut ctx = ArchivingContext::new(conn, local.clone());
    let mut summary = ArchiveSummary::default();

    let local_id = ctx.recipients_mut().assign_id(Identity::LocalUser);
    sink.write_frame(&Frame::Recipient(RecipientFrame {
        id: local_id,
        identity: Identity::LocalUser,
    }))?;
    summary.recipient_frames += 1;

    let stored_threads = ctx.bridge().list_threads()?;
    let mut threads = HashMap::new();
    for thread in stored_threads {
        if let ChatThread::Contact {
            account_id: Some(account_id),
            ..
        } = &thread
        {
            let identity = ctx.identity_for_account(account_id);
            let checkpoint = ctx.recipients().checkpoint();
            let id = ctx.recipients_mut().assign_id(identity.clone());
            if ctx.recipients().assigned_since(checkpoint).next().is_some() {
                sink.write_frame(&Frame::Recipient(RecipientFrame { id, identity }))?;
                summary.recipient_frames += 1;
            }
        }
        threads.insert(thread.row_id(), thread);
    }

    interactions::for_each_call_interaction(conn, |interaction| {
        archive_item(&mut ctx, &threads, &interaction, &mut *sink, &mut summary)
    })?;

    summary.errors = ctx.into_errors();
    tracing::info!(
        recipients = summary.recipient_frames,
        chat_items = summary.chat_items,
        partial = summary.partial_items,
        failed = summary.failed_items,
        "archive session finished"
    );
    Ok(summary)
}

fn archive_item(
    ctx: &mut ArchivingContext<'_>,
    threads: &HashMap<i64, ChatThread>,
    interaction: &Interaction,
    sink: &mut dyn FrameSink,
    summary: &mut ArchiveSummary,
) -> Result<(), CallvaultError> {
    let checkpoint = ctx.recipients().checkpoint();
    let id = interaction.row_id;

    let chat_identity = match threads.get(&interaction.thread_row_id) {
        None => Err(ArchiveFrameError::new(
            id,
            ArchiveFrameErrorKind::InteractionThreadMissing(interaction.thread_row_id),
        )),
        Some(ChatThread::Contact {
            account_id: Some(account_id),
            ..
        }) => Ok(ctx.identity_for_account(account_id)),
        Some(ChatThread::Contact {
            row_id,
            account_id: None,
        }) => Err(ArchiveFrameError::new(
            id,
            ArchiveFrameErrorKind::ContactThreadMissingAddress(*row_id),
        )),
        Some(ChatThread::Group { group_id, .. }) => Ok(Identity::Group(group_id.clone())),
    };
    let date_sent = validate_timestamp(interaction.timestamp)
        .map_err(|err| ArchiveFrameError::new(id, err));

    let outcome = match (chat_identity, date_sent) {
        (Ok(identity), Ok(date_sent)) => {
            let chat_recipient_id = ctx.recipients_mut().assign_id(identity);
            archiver_for(interaction.kind.tag())
                .archive(interaction, ctx)?
                .map_value(|call| ChatItemFrame {
                    chat_recipient_id,
                    date_sent,
                    call,
                })
        }
        (Err(err), _) | (_, Err(err)) => ItemErrors::new().fail(err),
    };

    let (frame, errors) = outcome.into_parts();
    match frame {
        Some(item) => {
            let pending: Vec<(RecipientId, Identity)> = ctx
                .recipients()
                .assigned_since(checkpoint)
                .map(|(id, identity)| (id, identity.clone()))
                .collect();
            for (id, identity) in pending {
                sink.write_frame(&Frame::Recipient(RecipientFrame { id, identity }))?;
                summary.recipient_frames += 1;
            }
            sink.write_frame(&Frame::ChatItem(item))?;
            summary.chat_items += 1;
            if !errors.is_empty() {
                summary.partial_items += 1;
                tracing::warn!(interaction = %id, errors = errors.len(), "archived with errors");
            }
        }
        None => {
            ctx.recipients_mut().rollback_to(checkpoint);
            summary.failed_items += 1;
            tracing::debug!(interaction = %id, "dropped item");
        }
    }
    ctx.record_errors(errors);
    Ok(())
}

/// Restore `frames` into `conn`, strictly in stream order.
///
/// Each chat item runs inside its own savepoint, so a failed item leaves
/// nothing behind. A reference to a recipient id not yet declared fails
/// only the referencing item.
pub fn restore_session<I>(
    conn: &Connection,
    frames: I,
    local: &LocalIdentifiers,
) -> Result<RestoreSummary, CallvaultError>
where
    I: IntoIterator<Item = Result<Frame, CallvaultError>>,
{
    let mut ctx = RestoringContext::new(conn, local.clone());
    let mut summary = RestoreSummary::default();

    for frame in frames {
        match frame? {
            Frame::Recipient(recipient) => {
                let id = RestoreFrameId::Recipient(recipient.id);
                match restore_recipient(&mut ctx, recipient) {
                    Ok(()) => summary.recipient_frames += 1,
                    Err(kind) => {
                        summary.failed_items += 1;
                        ctx.record_errors([RestoreFrameError::new(id, kind)]);
                    }
                }
            }
            Frame::ChatItem(item) => {
                ctx.bridge().begin_item()?;
                let outcome = restore_chat_item(&ctx, &item);
                if outcome.is_failure() {
                    ctx.bridge().rollback_item()?;
                    summary.failed_items += 1;
                    tracing::debug!(frame = %item.frame_id(), "dropped item");
                } else {
                    ctx.bridge().commit_item()?;
                    summary.chat_items += 1;
                    if !outcome.errors().is_empty() {
                        summary.partial_items += 1;
                        tracing::warn!(frame = %item.frame_id(), "restored with errors");
                    }
                }
                let (_, errors) = outcome.into_parts();
                ctx.record_errors(errors);
            }
        }
    }

    summary.errors = ctx.into_errors();
    tracing::info!(
        recipients = summary.recipient_frames,
        chat_items = summary.chat_items,
        partial = summary.partial_items,
        failed = summary.failed_items,
        "restore session finished"
    );
    Ok(summary)
}

/// Bind a recipient frame's id once its chat thread exists. A frame whose
/// thread cannot be created leaves the id unbound.
fn restore_recipient(
    ctx: &mut RestoringContext<'_>,
    recipient: RecipientFrame,
) -> Result<(), RestoreFrameErrorKind> {
    ctx.recipients()
        .check_address(recipient.id, &recipient.identity)
        .map_err(InvalidProtoData::from)?;
    // Threads exist before their items so row order follows recipient
    // order. The local user's thread is made on demand.
    match &recipient.identity {
        Identity::Contact(_) | Identity::Group(_) => {
            ctx.thread_for(&recipient.identity)?;
        }
        Identity::LocalUser
        | Identity::DistributionList(_)
        | Identity::ReleaseNotes
        | Identity::CallLink(_) => {}
    }
    ctx.recipients_mut()
        .register_address(recipient.id, recipient.identity)
        .map_err(InvalidProtoData::from)?;
    Ok(())
}

fn restore_chat_item(ctx: &RestoringContext<'_>, item: &ChatItemFrame) -> RestoreItemResult {
    let errors = ItemErrors::new();
    let id = item.frame_id();

    if let Err(err) = validate_timestamp(item.date_sent) {
        return errors.fail(RestoreFrameError::new(id, InvalidProtoData::from(err)));
    }
    let identity = match ctx.recipients().lookup(item.chat_recipient_id) {
        Ok(identity) => identity,
        Err(unknown) => {
            return errors.fail(RestoreFrameError::new(id, InvalidProtoData::from(unknown)));
        }
    };
    let thread = match ctx.thread_for(identity) {
        Ok(Some(thread)) => thread,
        Ok(None) => {
            return errors.fail(RestoreFrameError::new(
                id,
                InvalidProtoData::ChatRecipientNotAThread(item.chat_recipient_id),
            ));
        }
        Err(err) => return errors.fail(RestoreFrameError::new(id, err)),
    };

    archiver_for(item.call.kind()).restore(item, &thread, ctx)
}
