//! Comment service
//!
//! Handles comment and reply creation and deletion, keeping the figure's
//! rating aggregates and per-star breakdown in step with live comments.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use tally_core::document::read_i64;
use tally_core::{
    clamped_decrement, get_typed, paths, set_typed, Comment, CommentAuthorMarker, CommentId,
    Demographics, DocPath, DomainError, FieldPath, FigureId, Identity, Rating, RatingContribution,
    Reply, ReplyId, RepoResult, Transaction, UserId, UserProfile,
};

use crate::dto::{
    DeleteOutcome, PostCommentRequest, PostCommentResponse, PostReplyRequest, PostReplyResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::transaction::{run_transaction, TransactionBody};

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post the user's single comment on a figure
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn post_comment(
        &self,
        identity: &Identity,
        figure_id: &FigureId,
        request: PostCommentRequest,
    ) -> ServiceResult<PostCommentResponse> {
        request.validate()?;
        let rating = Rating::new(request.rating)?;

        // Cheap rejection before opening a transaction; re-checked inside
        let marker = paths::comment_author(figure_id, &identity.user_id);
        if self.ctx.store().get(&marker).await?.is_some() {
            return Err(DomainError::CommentAlreadyExists {
                figure_id: figure_id.clone(),
            }
            .into());
        }

        let body = PostComment {
            identity: identity.clone(),
            figure_id: figure_id.clone(),
            comment_id: CommentId::generate(),
            rating,
            text: request.text,
            tag: request.tag,
        };
        run_transaction(self.ctx, "post_comment", &body).await?;

        info!(
            figure_id = %figure_id,
            comment_id = %body.comment_id,
            rating = %rating,
            "Comment posted"
        );
        Ok(PostCommentResponse {
            comment_id: body.comment_id,
        })
    }

    /// Delete the user's comment with its replies and votes
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        user_id: &UserId,
        figure_id: &FigureId,
        comment_id: &CommentId,
    ) -> ServiceResult<DeleteOutcome> {
        let body = DeleteComment {
            user_id: user_id.clone(),
            figure_id: figure_id.clone(),
            comment_id: comment_id.clone(),
            cap: self.ctx.limits().max_cascade_children,
        };
        let (deleted, more) = run_transaction(self.ctx, "delete_comment", &body).await?;
        let comment = paths::comment(figure_id, comment_id);
        let mut deferred = 0;
        let orphaned = more && !self.purge_after_delete(&comment, &mut deferred).await;

        info!(
            figure_id = %figure_id,
            comment_id = %comment_id,
            children = deleted + deferred,
            orphaned,
            "Comment deleted"
        );
        Ok(DeleteOutcome {
            children_deleted: deleted,
            children_deferred: deferred,
            children_orphaned: orphaned,
        })
    }

    /// Reply to a comment
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn post_reply(
        &self,
        identity: &Identity,
        figure_id: &FigureId,
        comment_id: &CommentId,
        request: PostReplyRequest,
    ) -> ServiceResult<PostReplyResponse> {
        request.validate()?;

        let body = PostReply {
            identity: identity.clone(),
            figure_id: figure_id.clone(),
            comment_id: comment_id.clone(),
            reply_id: ReplyId::generate(),
            text: request.text,
        };
        run_transaction(self.ctx, "post_reply", &body).await?;

        info!(
            figure_id = %figure_id,
            comment_id = %comment_id,
            reply_id = %body.reply_id,
            "Reply posted"
        );
        Ok(PostReplyResponse {
            reply_id: body.reply_id,
        })
    }

    /// Delete the user's reply with its votes
    #[instrument(skip(self))]
    pub async fn delete_reply(
        &self,
        user_id: &UserId,
        figure_id: &FigureId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
    ) -> ServiceResult<DeleteOutcome> {
        let body = DeleteReply {
            user_id: user_id.clone(),
            figure_id: figure_id.clone(),
            comment_id: comment_id.clone(),
            reply_id: reply_id.clone(),
            cap: self.ctx.limits().max_cascade_children,
        };
        let (deleted, more) = run_transaction(self.ctx, "delete_reply", &body).await?;
        let reply = paths::reply(figure_id, comment_id, reply_id);
        let mut deferred = 0;
        let orphaned = more && !self.purge_after_delete(&reply, &mut deferred).await;

        info!(
            figure_id = %figure_id,
            comment_id = %comment_id,
            reply_id = %reply_id,
            orphaned,
            "Reply deleted"
        );
        Ok(DeleteOutcome {
            children_deleted: deleted,
            children_deferred: deferred,
            children_orphaned: orphaned,
        })
    }

    /// Remove children still left under a deleted comment, or under one of
    /// its deleted replies when `reply_id` is given. Children of an item that
    /// still exists are never touched.
    #[instrument(skip(self))]
    pub async fn purge_orphans(
        &self,
        figure_id: &FigureId,
        comment_id: &CommentId,
        reply_id: Option<&ReplyId>,
    ) -> ServiceResult<DeleteOutcome> {
        let owner = match reply_id {
            Some(reply_id) => paths::reply(figure_id, comment_id, reply_id),
            None => paths::comment(figure_id, comment_id),
        };
        let mut purged = 0;
        self.purge_children(&owner, &mut purged).await?;

        info!(owner = %owner, purged, "Orphaned children purged");
        Ok(DeleteOutcome {
            children_deleted: 0,
            children_deferred: purged,
            children_orphaned: false,
        })
    }

    /// Follow-up purge after a capped delete; `false` when a batch failed
    /// and children were left behind
    async fn purge_after_delete(&self, owner: &DocPath, purged: &mut usize) -> bool {
        match self.purge_children(owner, purged).await {
            Ok(()) => true,
            Err(e) => {
                warn!(owner = %owner, purged = *purged, error = %e, "Child purge stopped early");
                false
            }
        }
    }

    /// Remove the children of a deleted item, one batch per transaction
    async fn purge_children(&self, owner: &DocPath, purged: &mut usize) -> ServiceResult<()> {
        let body = PurgeChildren {
            owner: owner.clone(),
            cap: self.ctx.limits().max_cascade_children,
        };
        loop {
            let (count, more) = run_transaction(self.ctx, "purge_children", &body).await?;
            *purged += count;
            debug!(owner = %owner, batch = count, "Purged child batch");
            if !more || count == 0 {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// Transaction bodies
// ============================================================================

/// Profile demographics when stored, the caller's identity otherwise
async fn demographics_of(
    tx: &mut dyn Transaction,
    identity: &Identity,
) -> RepoResult<Demographics> {
    let profile: Option<UserProfile> = get_typed(tx, &paths::user(&identity.user_id)).await?;
    Ok(profile.map_or_else(|| identity.demographics(), |p| UserProfile::demographics(&p)))
}

/// Collect up to `cap` owned children of `owner`, leaf first: each reply's
/// votes, then the reply, then the owner's own votes. The flag reports
/// whether anything was left out.
async fn collect_children(
    tx: &mut dyn Transaction,
    owner: &DocPath,
    cap: usize,
) -> RepoResult<(Vec<DocPath>, bool)> {
    let mut children = Vec::new();

    let replies = tx.list(&paths::replies(owner), Some(cap + 1)).await?;
    for (reply, _) in replies {
        let votes = tx
            .list(&paths::votes(&reply), Some(cap - children.len() + 1))
            .await?;
        for (vote, _) in votes {
            if children.len() == cap {
                return Ok((children, true));
            }
            children.push(vote);
        }
        if children.len() == cap {
            return Ok((children, true));
        }
        children.push(reply);
    }

    let votes = tx
        .list(&paths::votes(owner), Some(cap - children.len() + 1))
        .await?;
    for (vote, _) in votes {
        if children.len() == cap {
            return Ok((children, true));
        }
        children.push(vote);
    }
    Ok((children, false))
}

struct PostComment {
    identity: Identity,
    figure_id: FigureId,
    comment_id: CommentId,
    rating: Rating,
    text: String,
    tag: Option<String>,
}

#[async_trait]
impl TransactionBody for PostComment {
    type Output = ();

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<()> {
        let figure = paths::figure(&self.figure_id);
        if tx.get(&figure).await?.is_none() {
            return Err(DomainError::FigureNotFound(self.figure_id.clone()).into());
        }
        let marker = paths::comment_author(&self.figure_id, &self.identity.user_id);
        if tx.get(&marker).await?.is_some() {
            return Err(DomainError::CommentAlreadyExists {
                figure_id: self.figure_id.clone(),
            }
            .into());
        }
        let demographics = demographics_of(tx, &self.identity).await?;

        let now = Utc::now();
        let comment = Comment::new(
            self.identity.user_id.clone(),
            self.rating,
            self.text.clone(),
            self.tag.clone(),
            demographics.clone(),
            now,
        );
        set_typed(tx, paths::comment(&self.figure_id, &self.comment_id), &comment)?;
        set_typed(
            tx,
            marker,
            &CommentAuthorMarker {
                comment_id: self.comment_id.clone(),
                created_at: now,
            },
        )?;
        tx.increment(figure.clone(), FieldPath::new("commentCount"), 1);

        if let Some(contribution) = RatingContribution::of(self.rating, demographics) {
            for (field, delta) in contribution.figure_fields() {
                tx.increment(figure.clone(), field, delta);
            }
            let stats = paths::rating_stats(&self.figure_id, contribution.star);
            for field in contribution.breakdown_fields() {
                tx.increment(stats.clone(), field, 1);
            }
        }
        Ok(())
    }
}

struct DeleteComment {
    user_id: UserId,
    figure_id: FigureId,
    comment_id: CommentId,
    cap: usize,
}

#[async_trait]
impl TransactionBody for DeleteComment {
    /// Children deleted, and whether more remain
    type Output = (usize, bool);

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<(usize, bool)> {
        let figure_path = paths::figure(&self.figure_id);
        let figure = tx
            .get(&figure_path)
            .await?
            .ok_or_else(|| DomainError::FigureNotFound(self.figure_id.clone()))?;
        let comment_path = paths::comment(&self.figure_id, &self.comment_id);
        let comment: Comment = get_typed(tx, &comment_path)
            .await?
            .ok_or_else(|| DomainError::CommentNotFound(self.comment_id.clone()))?;
        if !comment.is_authored_by(&self.user_id) {
            return Err(DomainError::NotCommentAuthor.into());
        }

        let marker_path = paths::comment_author(&self.figure_id, &self.user_id);
        let marker: Option<CommentAuthorMarker> = get_typed(tx, &marker_path).await?;
        let contribution = RatingContribution::of(comment.rating, comment.demographics());
        let stats = match &contribution {
            Some(c) => {
                let path = paths::rating_stats(&self.figure_id, c.star);
                let doc = tx.get(&path).await?.unwrap_or_default();
                Some((path, doc))
            }
            None => None,
        };
        let (children, more) = collect_children(tx, &comment_path, self.cap).await?;

        // Inverse deltas, each clamped against the value just read
        let comment_count = FieldPath::new("commentCount");
        tx.increment(
            figure_path.clone(),
            comment_count.clone(),
            clamped_decrement(read_i64(&figure, &comment_count), 1),
        );
        if let Some(contribution) = &contribution {
            for (field, delta) in contribution.figure_fields() {
                let current = read_i64(&figure, &field);
                tx.increment(figure_path.clone(), field, clamped_decrement(current, delta));
            }
        }
        if let (Some(contribution), Some((path, doc))) = (&contribution, stats) {
            for field in contribution.breakdown_fields() {
                let current = read_i64(&doc, &field);
                tx.increment(path.clone(), field, clamped_decrement(current, 1));
            }
        }

        let deleted = children.len();
        for child in children {
            tx.delete(child);
        }
        tx.delete(comment_path);
        if marker.is_some_and(|m| m.comment_id == self.comment_id) {
            tx.delete(marker_path);
        }
        Ok((deleted, more))
    }
}

struct PostReply {
    identity: Identity,
    figure_id: FigureId,
    comment_id: CommentId,
    reply_id: ReplyId,
    text: String,
}

#[async_trait]
impl TransactionBody for PostReply {
    type Output = ();

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<()> {
        let comment = paths::comment(&self.figure_id, &self.comment_id);
        if tx.get(&comment).await?.is_none() {
            return Err(DomainError::CommentNotFound(self.comment_id.clone()).into());
        }
        let demographics = demographics_of(tx, &self.identity).await?;

        let reply = Reply::new(
            self.identity.user_id.clone(),
            self.comment_id.clone(),
            self.text.clone(),
            demographics,
            Utc::now(),
        );
        set_typed(tx, paths::replies(&comment).doc(self.reply_id.as_str()), &reply)?;
        tx.increment(comment, FieldPath::new("replyCount"), 1);
        Ok(())
    }
}

struct DeleteReply {
    user_id: UserId,
    figure_id: FigureId,
    comment_id: CommentId,
    reply_id: ReplyId,
    cap: usize,
}

#[async_trait]
impl TransactionBody for DeleteReply {
    type Output = (usize, bool);

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<(usize, bool)> {
        let comment_path = paths::comment(&self.figure_id, &self.comment_id);
        let comment = tx
            .get(&comment_path)
            .await?
            .ok_or_else(|| DomainError::CommentNotFound(self.comment_id.clone()))?;
        let reply_path = paths::reply(&self.figure_id, &self.comment_id, &self.reply_id);
        let reply: Reply = get_typed(tx, &reply_path)
            .await?
            .ok_or_else(|| DomainError::ReplyNotFound(self.reply_id.clone()))?;
        if !reply.is_authored_by(&self.user_id) {
            return Err(DomainError::NotReplyAuthor.into());
        }
        let (children, more) = collect_children(tx, &reply_path, self.cap).await?;

        let reply_count = FieldPath::new("replyCount");
        let delta = clamped_decrement(read_i64(&comment, &reply_count), 1);
        tx.increment(comment_path, reply_count, delta);

        let deleted = children.len();
        for child in children {
            tx.delete(child);
        }
        tx.delete(reply_path);
        Ok((deleted, more))
    }
}

/// One follow-up batch of a capped delete
struct PurgeChildren {
    owner: DocPath,
    cap: usize,
}

#[async_trait]
impl TransactionBody for PurgeChildren {
    type Output = (usize, bool);

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<(usize, bool)> {
        if tx.get(&self.owner).await?.is_some() {
            debug!(owner = %self.owner, "Owner still live, nothing to purge");
            return Ok((0, false));
        }
        let (children, more) = collect_children(tx, &self.owner, self.cap).await?;
        let count = children.len();
        for child in children {
            tx.delete(child);
        }
        Ok((count, more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use tally_core::document::encode;
    use tally_core::{DocumentStore, ErrorKind, Figure};
    use tally_db::MemoryDocumentStore;

    use crate::services::{EngineLimits, RetryPolicy};

    fn setup(cap: usize) -> (MemoryDocumentStore, ServiceContext, FigureId) {
        let store = MemoryDocumentStore::new();
        let figure_id = FigureId::parse("f1").unwrap();
        store.insert(paths::figure(&figure_id), encode(&Figure::new("Ada")).unwrap());
        let ctx = ServiceContext::new(
            Arc::new(store.clone()),
            RetryPolicy::immediate(3),
            EngineLimits {
                max_cascade_children: cap,
                leaderboard_page_size: 100,
            },
        );
        (store, ctx, figure_id)
    }

    fn peruvian(id: &str) -> Identity {
        Identity::new(UserId::parse(id).unwrap())
            .with_country("PE")
            .with_gender("female")
    }

    fn field(store: &MemoryDocumentStore, path: &DocPath, name: &str) -> serde_json::Value {
        store
            .snapshot()
            .remove(path.as_str())
            .and_then(|d| d.get(name).cloned())
            .unwrap_or(serde_json::Value::Null)
    }

    #[tokio::test]
    async fn test_post_and_delete_rated_comment() {
        let (store, ctx, f) = setup(400);
        let service = CommentService::new(&ctx);
        let user = peruvian("u1");

        let posted = service
            .post_comment(&user, &f, PostCommentRequest::new(4, "solid"))
            .await
            .unwrap();
        let figure = paths::figure(&f);
        assert_eq!(field(&store, &figure, "ratingCount"), json!(1));
        assert_eq!(field(&store, &figure, "ratingSum"), json!(4));
        assert_eq!(field(&store, &figure, "commentCount"), json!(1));
        assert_eq!(
            field(&store, &paths::rating_stats(&f, 4), "countries"),
            json!({ "PE": { "total": 1, "byGender": { "female": 1 } } })
        );

        service
            .delete_comment(&user.user_id, &f, &posted.comment_id)
            .await
            .unwrap();
        assert_eq!(field(&store, &figure, "ratingCount"), json!(0));
        assert_eq!(field(&store, &figure, "ratingSum"), json!(0));
        assert_eq!(field(&store, &figure, "commentCount"), json!(0));
        assert_eq!(
            field(&store, &paths::rating_stats(&f, 4), "countries"),
            json!({ "PE": { "total": 0, "byGender": { "female": 0 } } })
        );
        assert!(!store.contains(&paths::comment_author(&f, &user.user_id)));
    }

    #[tokio::test]
    async fn test_second_comment_rejected() {
        let (_, ctx, f) = setup(400);
        let service = CommentService::new(&ctx);
        let user = peruvian("u1");
        service
            .post_comment(&user, &f, PostCommentRequest::new(-1, "first"))
            .await
            .unwrap();
        let err = service
            .post_comment(&user, &f, PostCommentRequest::new(3, "second"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_store() {
        let (store, ctx, f) = setup(400);
        let err = CommentService::new(&ctx)
            .post_comment(&peruvian("u1"), &f, PostCommentRequest::new(7, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_non_owner_delete_writes_nothing() {
        let (store, ctx, f) = setup(400);
        let service = CommentService::new(&ctx);
        let posted = service
            .post_comment(&peruvian("u1"), &f, PostCommentRequest::new(5, "mine"))
            .await
            .unwrap();
        let before = store.snapshot();

        let err = service
            .delete_comment(&UserId::parse("u2").unwrap(), &f, &posted.comment_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_reply_lifecycle() {
        let (store, ctx, f) = setup(400);
        let service = CommentService::new(&ctx);
        let posted = service
            .post_comment(&peruvian("u1"), &f, PostCommentRequest::new(-1, "topic"))
            .await
            .unwrap();
        let replier = peruvian("u2");
        let reply = service
            .post_reply(&replier, &f, &posted.comment_id, PostReplyRequest::new("agreed"))
            .await
            .unwrap();
        let comment = paths::comment(&f, &posted.comment_id);
        assert_eq!(field(&store, &comment, "replyCount"), json!(1));

        let err = service
            .delete_reply(&UserId::parse("u1").unwrap(), &f, &posted.comment_id, &reply.reply_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        service
            .delete_reply(&replier.user_id, &f, &posted.comment_id, &reply.reply_id)
            .await
            .unwrap();
        assert_eq!(field(&store, &comment, "replyCount"), json!(0));
        assert_eq!(store.paths_under(&comment), vec![comment.as_str().to_string()]);
    }

    #[tokio::test]
    async fn test_capped_cascade_defers_the_rest() {
        let (store, ctx, f) = setup(2);
        let service = CommentService::new(&ctx);
        let author = peruvian("u1");
        let posted = service
            .post_comment(&author, &f, PostCommentRequest::new(2, "busy thread"))
            .await
            .unwrap();
        for i in 0..3 {
            service
                .post_reply(
                    &peruvian(&format!("r{i}")),
                    &f,
                    &posted.comment_id,
                    PostReplyRequest::new("reply"),
                )
                .await
                .unwrap();
        }

        let outcome = service
            .delete_comment(&author.user_id, &f, &posted.comment_id)
            .await
            .unwrap();
        assert_eq!(outcome.children_deleted, 2);
        assert_eq!(outcome.children_deferred, 1);
        let comment = paths::comment(&f, &posted.comment_id);
        assert!(store.paths_under(&comment).is_empty());
        assert_eq!(field(&store, &paths::figure(&f), "ratingCount"), json!(0));
    }

    /// Store whose transactions stop opening after a fixed number of begins
    struct FailingAfter {
        inner: MemoryDocumentStore,
        begins_left: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for FailingAfter {
        async fn get(&self, path: &DocPath) -> RepoResult<Option<tally_core::Document>> {
            self.inner.get(path).await
        }

        async fn list_after(
            &self,
            collection: &tally_core::CollectionPath,
            start_after: Option<&DocPath>,
            limit: Option<usize>,
        ) -> RepoResult<Vec<(DocPath, tally_core::Document)>> {
            self.inner.list_after(collection, start_after, limit).await
        }

        async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
            use std::sync::atomic::Ordering;
            let left = self.begins_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(DomainError::DatabaseError("connection lost".to_string()));
            }
            self.begins_left.store(left - 1, Ordering::SeqCst);
            self.inner.begin().await
        }
    }

    #[tokio::test]
    async fn test_failed_purge_reports_orphans_and_resumes() {
        let (store, ctx, f) = setup(2);
        let service = CommentService::new(&ctx);
        let author = peruvian("u1");
        let posted = service
            .post_comment(&author, &f, PostCommentRequest::new(4, "busy thread"))
            .await
            .unwrap();
        for i in 0..3 {
            service
                .post_reply(
                    &peruvian(&format!("r{i}")),
                    &f,
                    &posted.comment_id,
                    PostReplyRequest::new("reply"),
                )
                .await
                .unwrap();
        }

        let flaky = ServiceContext::new(
            Arc::new(FailingAfter {
                inner: store.clone(),
                begins_left: std::sync::atomic::AtomicUsize::new(1),
            }),
            RetryPolicy::immediate(3),
            ctx.limits(),
        );
        let outcome = CommentService::new(&flaky)
            .delete_comment(&author.user_id, &f, &posted.comment_id)
            .await
            .unwrap();
        assert_eq!(outcome.children_deleted, 2);
        assert_eq!(outcome.children_deferred, 0);
        assert!(outcome.children_orphaned);

        let comment = paths::comment(&f, &posted.comment_id);
        assert!(!store.contains(&comment));
        assert!(!store.paths_under(&comment).is_empty());
        assert_eq!(field(&store, &paths::figure(&f), "ratingCount"), json!(0));

        let resumed = service
            .purge_orphans(&f, &posted.comment_id, None)
            .await
            .unwrap();
        assert_eq!(resumed.children_deferred, 1);
        assert!(store.paths_under(&comment).is_empty());
    }

    #[tokio::test]
    async fn test_purge_orphans_leaves_live_comment_alone() {
        let (store, ctx, f) = setup(2);
        let service = CommentService::new(&ctx);
        let posted = service
            .post_comment(&peruvian("u1"), &f, PostCommentRequest::new(3, "still here"))
            .await
            .unwrap();
        service
            .post_reply(&peruvian("r1"), &f, &posted.comment_id, PostReplyRequest::new("hi"))
            .await
            .unwrap();
        let before = store.snapshot();

        let outcome = service
            .purge_orphans(&f, &posted.comment_id, None)
            .await
            .unwrap();
        assert_eq!(outcome.children_deferred, 0);
        assert_eq!(store.snapshot(), before);
    }
}
