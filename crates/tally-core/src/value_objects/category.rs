//! Vote categories - the fixed enums a user can cast toward a figure or comment

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::document::FieldPath;

/// Which exclusive vote a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteKind {
    Attitude,
    Emotion,
    CommentReaction,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attitude => "attitude",
            Self::Emotion => "emotion",
            Self::CommentReaction => "commentReaction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [Self::Attitude, Self::Emotion, Self::CommentReaction]
            .into_iter()
            .find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-choice category belonging to one [`VoteKind`].
///
/// Every implementor names the counter field its votes land in, which is how
/// the toggle engine stays generic over attitude, emotion, and comment votes.
pub trait VoteCategory:
    Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static
{
    const KIND: VoteKind;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Counter field on the target document this category increments
    fn counter_field(self) -> FieldPath;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

/// How a user feels about a figure overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttitudeCategory {
    Neutral,
    Fan,
    Simp,
    Hater,
}

impl VoteCategory for AttitudeCategory {
    const KIND: VoteKind = VoteKind::Attitude;
    const ALL: &'static [Self] = &[Self::Neutral, Self::Fan, Self::Simp, Self::Hater];

    fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Fan => "fan",
            Self::Simp => "simp",
            Self::Hater => "hater",
        }
    }

    fn counter_field(self) -> FieldPath {
        FieldPath::new("attitudeCounts").child(self.as_str())
    }
}

/// Emotional reaction toward a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Joy,
    Sadness,
    Anger,
    Surprise,
    Fear,
    Disgust,
}

impl VoteCategory for EmotionCategory {
    const KIND: VoteKind = VoteKind::Emotion;
    const ALL: &'static [Self] = &[
        Self::Joy,
        Self::Sadness,
        Self::Anger,
        Self::Surprise,
        Self::Fear,
        Self::Disgust,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Anger => "anger",
            Self::Surprise => "surprise",
            Self::Fear => "fear",
            Self::Disgust => "disgust",
        }
    }

    fn counter_field(self) -> FieldPath {
        FieldPath::new("emotionCounts").child(self.as_str())
    }
}

/// Like or dislike on a comment or reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentReaction {
    Like,
    Dislike,
}

impl VoteCategory for CommentReaction {
    const KIND: VoteKind = VoteKind::CommentReaction;
    const ALL: &'static [Self] = &[Self::Like, Self::Dislike];

    fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }

    fn counter_field(self) -> FieldPath {
        match self {
            Self::Like => FieldPath::new("likes"),
            Self::Dislike => FieldPath::new("dislikes"),
        }
    }
}

/// Actions that count toward a daily streak. All kinds weigh the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    Comment,
    CommentVote,
    Vote,
    Share,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::CommentVote => "commentVote",
            Self::Vote => "vote",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
