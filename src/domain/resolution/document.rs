//! The resolution document: generated blocks interleaved with user text.
//!
//! The document is never searched to find out what a toggle produced.
//! Each generated block is stored with its [`BlockId`], user-authored text
//! is stored as notes between blocks, and the submitted string is the
//! concatenation of all segments.

use serde::Serialize;
use tracing::debug;

use crate::domain::foundation::MeetingKey;

/// What produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    SelectAll,
    Schedule,
    ReplaceConflicts,
    Draft,
}

/// Identity of a generated block: its kind and owning meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockId {
    pub kind: BlockKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingKey>,
}

impl BlockId {
    pub fn select_all() -> Self {
        Self {
            kind: BlockKind::SelectAll,
            meeting: None,
        }
    }

    pub fn schedule(meeting: MeetingKey) -> Self {
        Self {
            kind: BlockKind::Schedule,
            meeting: Some(meeting),
        }
    }

    pub fn replace_conflicts(meeting: MeetingKey) -> Self {
        Self {
            kind: BlockKind::ReplaceConflicts,
            meeting: Some(meeting),
        }
    }

    pub fn draft(meeting: MeetingKey) -> Self {
        Self {
            kind: BlockKind::Draft,
            meeting: Some(meeting),
        }
    }

    /// Every block a meeting can own.
    pub fn owned_by(meeting: MeetingKey) -> [Self; 3] {
        [
            Self::schedule(meeting),
            Self::replace_conflicts(meeting),
            Self::draft(meeting),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Block { id: BlockId, text: String },
    Note(String),
}

/// Ordered blocks and notes making up the free-text resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionDocument {
    segments: Vec<Segment>,
    /// Blocks whose text the user rewrote; their toggles no longer own any text.
    detached: Vec<BlockId>,
}

impl ResolutionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full document text.
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Block { text, .. } => text.as_str(),
                Segment::Note(text) => text.as_str(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the block is present and still owned by its toggle.
    pub fn contains_block(&self, id: &BlockId) -> bool {
        self.block_text(id).is_some()
    }

    /// Returns true if the user rewrote the block's text.
    pub fn is_detached(&self, id: &BlockId) -> bool {
        self.detached.contains(id)
    }

    pub fn block_text(&self, id: &BlockId) -> Option<&str> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Block { id: block, text } if block == id => Some(text.as_str()),
            _ => None,
        })
    }

    /// Generated blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &str)> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Block { id, text } => Some((*id, text.as_str())),
            Segment::Note(_) => None,
        })
    }

    /// User-authored text in document order.
    pub fn notes(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Note(text) => Some(text.as_str()),
            Segment::Block { .. } => None,
        })
    }

    pub fn detached_blocks(&self) -> &[BlockId] {
        &self.detached
    }

    /// Appends a block at the end. Returns false if it is already present.
    pub fn append_block(&mut self, id: BlockId, text: impl Into<String>) -> bool {
        if self.contains_block(&id) {
            return false;
        }
        self.detached.retain(|d| d != &id);
        self.segments.push(Segment::Block {
            id,
            text: text.into(),
        });
        true
    }

    /// Removes exactly the block's text. Returns false if nothing was removed.
    ///
    /// A detached block removes nothing; the user's rewrite stays as a note.
    pub fn remove_block(&mut self, id: &BlockId) -> bool {
        let position = self.segments.iter().position(
            |segment| matches!(segment, Segment::Block { id: block, .. } if block == id),
        );
        match position {
            Some(index) => {
                self.segments.remove(index);
                self.merge_notes();
                true
            }
            None => {
                if self.detached.iter().any(|d| d == id) {
                    debug!(?id, "Block was edited by hand; leaving its text in place");
                    self.detached.retain(|d| d != id);
                }
                false
            }
        }
    }

    /// Replaces the document with hand-edited text.
    ///
    /// Blocks whose exact text still appears, in their original order, stay
    /// attached; everything around them becomes notes. Blocks that can no
    /// longer be found are detached and returned.
    pub fn apply_edit(&mut self, edited: &str) -> Vec<BlockId> {
        let previous = std::mem::take(&mut self.segments);
        let mut newly_detached = Vec::new();
        let mut cursor = 0;

        for segment in previous {
            let Segment::Block { id, text } = segment else {
                continue;
            };
            match edited[cursor..].find(text.as_str()) {
                Some(offset) if !text.is_empty() => {
                    let note = &edited[cursor..cursor + offset];
                    if !note.is_empty() {
                        self.segments.push(Segment::Note(note.to_string()));
                    }
                    cursor += offset + text.len();
                    self.segments.push(Segment::Block { id, text });
                }
                _ => {
                    debug!(?id, "Block no longer present after edit; detaching");
                    newly_detached.push(id);
                }
            }
        }

        let tail = &edited[cursor..];
        if !tail.is_empty() {
            self.segments.push(Segment::Note(tail.to_string()));
        }

        for id in &newly_detached {
            if !self.detached.contains(id) {
                self.detached.push(*id);
            }
        }
        newly_detached
    }

    fn merge_notes(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in std::mem::take(&mut self.segments) {
            match (merged.last_mut(), segment) {
                (Some(Segment::Note(previous)), Segment::Note(next)) => previous.push_str(&next),
                (_, segment) => merged.push(segment),
            }
        }
        self.segments = merged;
    }
}
