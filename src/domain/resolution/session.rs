//! ResolutionSession aggregate - selection state and the resolution document.
//!
//! Holds the per-meeting [`MeetingChoice`]s for one snapshot and keeps the
//! [`ResolutionDocument`] in step with them: every active choice owns exactly
//! one generated block (or is covered by the select-all block), and turning a
//! choice off removes exactly the block it produced.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::foundation::MeetingKey;
use crate::domain::meeting::{Meeting, WorkflowSnapshot};

use super::blocks::{draft_block, replace_conflicts_block, schedule_block, select_all_block};
use super::{BlockId, MeetingChoice, ResolutionDocument, ResolutionError, SubmissionCommand};

/// User-owned resolution state for one workflow snapshot.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    snapshot: WorkflowSnapshot,
    choices: HashMap<MeetingKey, MeetingChoice>,
    document: ResolutionDocument,
}

impl ResolutionSession {
    // ════════════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════════════

    /// Starts with nothing selected and an empty document.
    pub fn new(snapshot: WorkflowSnapshot) -> Self {
        let choices = snapshot
            .keys()
            .map(|key| (key, MeetingChoice::Unselected))
            .collect();
        Self {
            snapshot,
            choices,
            document: ResolutionDocument::new(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════════════

    pub fn snapshot(&self) -> &WorkflowSnapshot {
        &self.snapshot
    }

    pub fn document(&self) -> &ResolutionDocument {
        &self.document
    }

    /// The current resolution text.
    pub fn resolution_text(&self) -> String {
        self.document.render()
    }

    pub fn choice(&self, key: MeetingKey) -> Option<&MeetingChoice> {
        self.choices.get(&key)
    }

    pub fn is_selected(&self, key: MeetingKey) -> bool {
        self.choice(key).is_some_and(MeetingChoice::is_selected)
    }

    /// Selected meetings in scan order.
    pub fn selected_keys(&self) -> Vec<MeetingKey> {
        self.snapshot
            .keys()
            .filter(|key| self.is_selected(*key))
            .collect()
    }

    /// Meetings in replace-conflicts mode, in scan order.
    pub fn replacing_keys(&self) -> Vec<MeetingKey> {
        self.snapshot
            .keys()
            .filter(|key| self.choice(*key).is_some_and(MeetingChoice::is_replacing))
            .collect()
    }

    /// Pending drafts in scan order.
    pub fn drafts(&self) -> Vec<(MeetingKey, &str)> {
        self.snapshot
            .keys()
            .filter_map(|key| self.choice(key).and_then(MeetingChoice::draft).map(|d| (key, d)))
            .collect()
    }

    pub fn draft(&self, key: MeetingKey) -> Option<&str> {
        self.choice(key).and_then(MeetingChoice::draft)
    }

    /// True iff every meeting is selected.
    pub fn is_all_selected(&self) -> bool {
        !self.choices.is_empty() && self.choices.values().all(MeetingChoice::is_selected)
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Toggles
    // ════════════════════════════════════════════════════════════════════════════════

    /// Selects or deselects every meeting at once.
    ///
    /// Checking appends the select-all block; unchecking deselects every
    /// meeting, dropping their blocks and drafts, and removes it again.
    ///
    /// Drafts and replace-conflict flags only exist on a selected meeting
    /// (see [`MeetingChoice`]), so unchecking clears them too.
    pub fn toggle_select_all(&mut self, checked: bool) {
        if checked {
            if self.snapshot.is_empty() {
                return;
            }
            for choice in self.choices.values_mut() {
                if !choice.is_selected() {
                    *choice = MeetingChoice::Scheduled;
                }
            }
            let text = select_all_block(self.snapshot.new_meetings());
            self.document.append_block(BlockId::select_all(), text);
            debug!(meetings = self.choices.len(), "Selected all meetings");
        } else {
            let keys: Vec<MeetingKey> = self.snapshot.keys().collect();
            for key in keys {
                self.clear_meeting(key);
            }
            self.document.remove_block(&BlockId::select_all());
            debug!("Cleared all selections");
        }
    }

    /// Selects or deselects one meeting.
    ///
    /// Deselecting also drops the meeting's replace-conflicts block and
    /// draft. If the select-all block covered the selection it is replaced by
    /// individual schedule blocks for the meetings that stay selected.
    pub fn toggle_meeting_selected(
        &mut self,
        key: MeetingKey,
        checked: bool,
    ) -> Result<(), ResolutionError> {
        let meeting = self.meeting(key)?.clone();
        let selected = self.is_selected(key);

        if checked {
            if selected {
                return Ok(());
            }
            self.choices.insert(key, MeetingChoice::Scheduled);
            self.document
                .append_block(BlockId::schedule(key), schedule_block(&meeting));
            debug!(%key, summary = meeting.summary(), "Meeting selected");
            return Ok(());
        }

        if !selected {
            return Ok(());
        }
        if self.document.remove_block(&BlockId::select_all()) {
            self.materialize_schedule_blocks(key);
        }
        self.clear_meeting(key);
        debug!(%key, summary = meeting.summary(), "Meeting deselected");
        Ok(())
    }

    /// Switches a selected meeting between scheduling as proposed and
    /// replacing its conflicting calendar entries.
    ///
    /// Rejected without any state change if the meeting is not selected.
    /// Enabling replacement discards the meeting's draft.
    pub fn toggle_replace_conflicting(
        &mut self,
        key: MeetingKey,
        checked: bool,
    ) -> Result<(), ResolutionError> {
        let meeting = self.meeting(key)?.clone();
        if !self.is_selected(key) {
            return Err(ResolutionError::MeetingNotSelected(key));
        }
        let replacing = self.choice(key).is_some_and(MeetingChoice::is_replacing);

        if checked {
            if replacing {
                return Ok(());
            }
            let existing = match self.snapshot.conflicts_for(key) {
                Some(group) if !group.existing_events.is_empty() => group.existing_events.clone(),
                _ => return Err(ResolutionError::NoConflicts(key)),
            };
            self.choices.insert(key, MeetingChoice::ReplaceConflicts);
            self.document.append_block(
                BlockId::replace_conflicts(key),
                replace_conflicts_block(&meeting, &existing),
            );
            debug!(%key, conflicts = existing.len(), "Replacing conflicting events");
        } else if replacing {
            self.choices.insert(key, MeetingChoice::Scheduled);
            self.document.remove_block(&BlockId::replace_conflicts(key));
            debug!(%key, "Stopped replacing conflicting events");
        }
        Ok(())
    }

    /// Stores free-text instructions for a selected meeting.
    ///
    /// The text only reaches the document on [`submit`](Self::submit). Blank
    /// text clears the draft.
    pub fn set_draft(&mut self, key: MeetingKey, text: impl Into<String>) -> Result<(), ResolutionError> {
        self.meeting(key)?;
        let text = text.into();
        match self.choice(key) {
            Some(MeetingChoice::Unselected) | None => Err(ResolutionError::DraftUnavailable {
                key,
                reason: "meeting is not selected",
            }),
            Some(MeetingChoice::ReplaceConflicts) => Err(ResolutionError::DraftUnavailable {
                key,
                reason: "meeting replaces its conflicting events",
            }),
            Some(MeetingChoice::Scheduled) | Some(MeetingChoice::CustomText(_)) => {
                let next = if text.trim().is_empty() {
                    MeetingChoice::Scheduled
                } else {
                    MeetingChoice::CustomText(text)
                };
                self.choices.insert(key, next);
                Ok(())
            }
        }
    }

    /// Replaces the document with text the user edited by hand.
    ///
    /// Returns the blocks whose text the edit altered; their toggles stay on
    /// but no longer own any text.
    pub fn edit_document(&mut self, text: &str) -> Vec<BlockId> {
        self.document.apply_edit(text)
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Submission
    // ════════════════════════════════════════════════════════════════════════════════

    /// Materializes pending drafts and returns the command to send.
    ///
    /// Fails with [`ResolutionError::EmptySelection`] and changes nothing if
    /// no meeting is selected. Drafts are consumed: each becomes a draft block
    /// (replacing one from an earlier submission) and the meeting returns to
    /// [`MeetingChoice::Scheduled`]. Selections and replace flags persist.
    pub fn submit(&mut self) -> Result<SubmissionCommand, ResolutionError> {
        let selected_keys = self.selected_keys();
        if selected_keys.is_empty() {
            return Err(ResolutionError::EmptySelection);
        }

        let drafts: Vec<(Meeting, String)> = self
            .drafts()
            .into_iter()
            .filter(|(_, draft)| !draft.trim().is_empty())
            .filter_map(|(key, draft)| {
                self.snapshot
                    .meeting(key)
                    .map(|meeting| (meeting.clone(), draft.to_string()))
            })
            .collect();

        for (meeting, draft) in &drafts {
            let id = BlockId::draft(meeting.key);
            self.document.remove_block(&id);
            self.document.append_block(id, draft_block(meeting, draft));
            self.choices.insert(meeting.key, MeetingChoice::Scheduled);
        }

        debug!(
            selected = selected_keys.len(),
            drafts = drafts.len(),
            "Resolution submitted"
        );

        Ok(SubmissionCommand {
            selected_keys,
            resolution_text: self.document.render(),
        })
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════════════

    fn meeting(&self, key: MeetingKey) -> Result<&Meeting, ResolutionError> {
        self.snapshot
            .meeting(key)
            .ok_or(ResolutionError::UnknownMeeting(key))
    }

    /// Unselects a meeting and drops every block it owns.
    fn clear_meeting(&mut self, key: MeetingKey) {
        self.choices.insert(key, MeetingChoice::Unselected);
        for id in BlockId::owned_by(key) {
            self.document.remove_block(&id);
        }
    }

    /// Gives each selected meeting other than `except` its own schedule block.
    fn materialize_schedule_blocks(&mut self, except: MeetingKey) {
        let meetings: Vec<Meeting> = self
            .snapshot
            .new_meetings()
            .iter()
            .filter(|m| m.key != except && self.is_selected(m.key))
            .cloned()
            .collect();
        for meeting in meetings {
            let id = BlockId::schedule(meeting.key);
            if self.document.contains_block(&id) || self.document.is_detached(&id) {
                continue;
            }
            self.document.append_block(id, schedule_block(&meeting));
        }
    }
}
