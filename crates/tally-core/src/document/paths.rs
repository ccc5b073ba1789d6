//! Canonical document locations
//!
//! Every service and fixture builds paths through these helpers so the
//! layout stays in one place.

use super::{CollectionPath, DocPath};
use crate::value_objects::{CommentId, FigureId, ReplyId, UserId, VoteKind};

pub fn figures() -> CollectionPath {
    CollectionPath::root("figures")
}

pub fn figure(figure_id: &FigureId) -> DocPath {
    figures().doc(figure_id.as_str())
}

/// Per-star breakdown sub-document
pub fn rating_stats(figure_id: &FigureId, star: u8) -> DocPath {
    figure(figure_id)
        .collection("ratingStats")
        .doc(&star.to_string())
}

pub fn comments(figure_id: &FigureId) -> CollectionPath {
    figure(figure_id).collection("comments")
}

pub fn comment(figure_id: &FigureId, comment_id: &CommentId) -> DocPath {
    comments(figure_id).doc(comment_id.as_str())
}

pub fn replies(comment: &DocPath) -> CollectionPath {
    comment.collection("replies")
}

pub fn reply(figure_id: &FigureId, comment_id: &CommentId, reply_id: &ReplyId) -> DocPath {
    replies(&comment(figure_id, comment_id)).doc(reply_id.as_str())
}

/// Like/dislike records on a comment or reply
pub fn votes(target: &DocPath) -> CollectionPath {
    target.collection("votes")
}

pub fn vote(target: &DocPath, user_id: &UserId) -> DocPath {
    votes(target).doc(user_id.as_str())
}

/// One-comment-per-user marker
pub fn comment_author(figure_id: &FigureId, user_id: &UserId) -> DocPath {
    figure(figure_id)
        .collection("commentAuthors")
        .doc(user_id.as_str())
}

/// Public streak mirror collection read by leaderboards
pub fn figure_streaks(figure_id: &FigureId) -> CollectionPath {
    figure(figure_id).collection("streaks")
}

pub fn public_streak(figure_id: &FigureId, user_id: &UserId) -> DocPath {
    figure_streaks(figure_id).doc(user_id.as_str())
}

pub fn users() -> CollectionPath {
    CollectionPath::root("users")
}

pub fn user(user_id: &UserId) -> DocPath {
    users().doc(user_id.as_str())
}

pub fn user_vote(user_id: &UserId, figure_id: &FigureId, kind: VoteKind) -> DocPath {
    user(user_id)
        .collection("votes")
        .doc(&format!("{figure_id}_{kind}"))
}

pub fn user_streak(user_id: &UserId, figure_id: &FigureId) -> DocPath {
    user(user_id).collection("streaks").doc(figure_id.as_str())
}
