//! Vote service
//!
//! Exclusive toggle votes: attitude and emotion votes on figures, and
//! like/dislike reactions on comments and replies. Each cast runs as one
//! transaction that moves the user's single unit between counters.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use validator::Validate;

use tally_core::{
    clamped_decrement, get_typed, paths, set_typed, AttitudeCategory, Comment, CommentId,
    CommentReaction, CounterTarget, DocPath, DomainError, EmotionCategory, Figure, FigureId,
    Identity, Reply, ReplyId, Transaction, UserProfile, VoteCategory, VoteKind, VoteRecord,
    VoteTransition,
};

use crate::dto::{CastVoteRequest, CastVoteResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::transaction::{run_transaction, TransactionBody};

/// Vote service
pub struct VoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VoteService<'a> {
    /// Create a new VoteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cast, change, or retract a typed figure vote
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id, kind = %C::KIND))]
    pub async fn cast_vote<C>(
        &self,
        identity: &Identity,
        figure_id: &FigureId,
        value: C,
    ) -> ServiceResult<CastVoteResponse>
    where
        C: VoteCategory,
        Figure: CounterTarget<C>,
    {
        let body = ToggleVote::<C, Figure> {
            target: VoteTarget::Figure(figure_id.clone()),
            record: paths::user_vote(&identity.user_id, figure_id, C::KIND),
            identity: identity.clone(),
            value,
            create_profile: true,
            _target: PhantomData,
        };
        let response = run_transaction(self.ctx, "cast_vote", &body).await?;

        info!(
            figure_id = %figure_id,
            previous = ?response.previous_value,
            new = ?response.new_value,
            "Figure vote recorded"
        );
        Ok(response)
    }

    /// Cast a figure vote from an unchecked category name
    ///
    /// # Errors
    /// `InvalidVoteCategory` when `value` is not one of the kind's categories
    pub async fn cast_vote_by_name(
        &self,
        identity: &Identity,
        figure_id: &FigureId,
        kind: VoteKind,
        request: CastVoteRequest,
    ) -> ServiceResult<CastVoteResponse> {
        request.validate()?;
        match kind {
            VoteKind::Attitude => {
                let value = parse_category::<AttitudeCategory>(&request.value)?;
                self.cast_vote(identity, figure_id, value).await
            }
            VoteKind::Emotion => {
                let value = parse_category::<EmotionCategory>(&request.value)?;
                self.cast_vote(identity, figure_id, value).await
            }
            VoteKind::CommentReaction => Err(DomainError::ValidationError(
                "comment reactions target a comment, not a figure".to_string(),
            )
            .into()),
        }
    }

    /// Like or dislike a comment, or a reply when `reply_id` is given
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn vote_on_comment(
        &self,
        identity: &Identity,
        figure_id: &FigureId,
        comment_id: &CommentId,
        reply_id: Option<&ReplyId>,
        reaction: CommentReaction,
    ) -> ServiceResult<CastVoteResponse> {
        let response = match reply_id {
            Some(reply_id) => {
                let target = paths::reply(figure_id, comment_id, reply_id);
                let body = ToggleVote::<CommentReaction, Reply> {
                    record: paths::vote(&target, &identity.user_id),
                    target: VoteTarget::Reply(target, reply_id.clone()),
                    identity: identity.clone(),
                    value: reaction,
                    create_profile: false,
                    _target: PhantomData,
                };
                run_transaction(self.ctx, "vote_on_reply", &body).await?
            }
            None => {
                let target = paths::comment(figure_id, comment_id);
                let body = ToggleVote::<CommentReaction, Comment> {
                    record: paths::vote(&target, &identity.user_id),
                    target: VoteTarget::Comment(target, comment_id.clone()),
                    identity: identity.clone(),
                    value: reaction,
                    create_profile: false,
                    _target: PhantomData,
                };
                run_transaction(self.ctx, "vote_on_comment", &body).await?
            }
        };

        info!(
            figure_id = %figure_id,
            comment_id = %comment_id,
            previous = ?response.previous_value,
            new = ?response.new_value,
            "Comment reaction recorded"
        );
        Ok(response)
    }
}

fn parse_category<C: VoteCategory>(value: &str) -> Result<C, DomainError> {
    C::parse(value).ok_or_else(|| DomainError::InvalidVoteCategory {
        kind: C::KIND.as_str(),
        value: value.to_string(),
    })
}

/// Document holding the counters a vote moves
enum VoteTarget {
    Figure(FigureId),
    Comment(DocPath, CommentId),
    Reply(DocPath, ReplyId),
}

impl VoteTarget {
    fn path(&self) -> DocPath {
        match self {
            Self::Figure(id) => paths::figure(id),
            Self::Comment(path, _) | Self::Reply(path, _) => path.clone(),
        }
    }

    fn not_found(&self) -> DomainError {
        match self {
            Self::Figure(id) => DomainError::FigureNotFound(id.clone()),
            Self::Comment(_, id) => DomainError::CommentNotFound(id.clone()),
            Self::Reply(_, id) => DomainError::ReplyNotFound(id.clone()),
        }
    }
}

/// Toggle one user's vote of kind `C` on a target of type `T`
struct ToggleVote<C, T> {
    target: VoteTarget,
    record: DocPath,
    identity: Identity,
    value: C,
    /// Create the implicit profile of a first-time voter
    create_profile: bool,
    _target: PhantomData<fn() -> T>,
}

#[async_trait]
impl<C, T> TransactionBody for ToggleVote<C, T>
where
    C: VoteCategory,
    T: CounterTarget<C> + DeserializeOwned + Send,
{
    type Output = CastVoteResponse;

    async fn run(&self, tx: &mut dyn Transaction) -> ServiceResult<CastVoteResponse> {
        let target_path = self.target.path();
        let target: T = get_typed(tx, &target_path)
            .await?
            .ok_or_else(|| self.target.not_found())?;
        let record: Option<VoteRecord> = get_typed(tx, &self.record).await?;
        let profile_path = paths::user(&self.identity.user_id);
        let profile: Option<UserProfile> = get_typed(tx, &profile_path).await?;

        let previous = match record {
            Some(r) => Some(r.category::<C>().ok_or_else(|| DomainError::CorruptDocument {
                path: self.record.to_string(),
                reason: format!("unrecognized {} vote value {:?}", C::KIND, r.value),
            })?),
            None => None,
        };
        let transition = VoteTransition::compute(previous, self.value);
        let now = Utc::now();

        if let Some(old) = transition.decrement() {
            let delta = clamped_decrement(target.count(old), 1);
            tx.increment(target_path.clone(), old.counter_field(), delta);
        }
        if let Some(new) = transition.increment() {
            tx.increment(target_path, new.counter_field(), 1);
        }

        let demographics = profile
            .as_ref()
            .map_or_else(|| self.identity.demographics(), UserProfile::demographics);
        match transition.current() {
            Some(value) => {
                set_typed(tx, self.record.clone(), &VoteRecord::new(value, demographics, now))?;
            }
            None => tx.delete(self.record.clone()),
        }

        if profile.is_none() && self.create_profile {
            set_typed(tx, profile_path, &UserProfile::from_identity(&self.identity, now))?;
        }

        Ok(CastVoteResponse {
            previous_value: transition.previous().map(|c| c.as_str().to_string()),
            new_value: transition.current().map(|c| c.as_str().to_string()),
        })
    }
}
