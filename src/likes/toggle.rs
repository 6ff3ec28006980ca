use serde::Serialize;

use crate::dao::{DaoResult, DynLikeDao, DynTuitDao, DynUserDao};
use crate::db::models::TuitStats;
use crate::likes::domain::{CounterPolicy, Counts, Relationship, ToggleAction};
use crate::likes::locks::KeyedLocks;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub user_id: String,
    pub tuit_id: String,
    pub previous: Relationship,
    pub current: Relationship,
    pub stats: TuitStats,
}

/// Runs like/dislike toggles and keeps each tuit's cached counters in step
/// with the Like collection.
///
/// Every toggle and refresh on a tuit runs under that tuit's lock, so two
/// requests can never both read the same "current" counts and then race
/// each other's stats write.
pub struct LikeToggler {
    likes: DynLikeDao,
    tuits: DynTuitDao,
    users: DynUserDao,
    policy: CounterPolicy,
    locks: KeyedLocks,
}

impl LikeToggler {
    pub fn new(
        likes: DynLikeDao,
        tuits: DynTuitDao,
        users: DynUserDao,
        policy: CounterPolicy,
    ) -> Self {
        Self {
            likes,
            tuits,
            users,
            policy,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn toggle(
        &self,
        uid: &str,
        tid: &str,
        action: ToggleAction,
    ) -> DaoResult<ToggleOutcome> {
        let _guard = self.locks.lock(tid).await;

        // Both ends of the reference must exist before anything is written
        let tuit = self.tuits.find_tuit_by_id(tid).await?;
        self.users.find_user_by_id(uid).await?;

        let current = self.likes.find_relationship(uid, tid).await?;
        let before = self.counts(tid).await?;
        let transition = action.apply(current);

        self.likes.set_relationship(uid, tid, transition.to).await?;

        let counts = match self.policy {
            CounterPolicy::Delta => before.plus(transition.delta),
            CounterPolicy::Recount => self.counts(tid).await?,
        };
        let stats = counts.into_stats(tuit.stats);

        if let Err(e) = self.tuits.update_stats(tid, stats).await {
            // Put the relationship back so the pair and the counters agree again
            if let Err(revert) = self
                .likes
                .set_relationship(uid, tid, transition.from)
                .await
            {
                tracing::error!(
                    user_id = %uid,
                    tuit_id = %tid,
                    "failed to revert relationship after stats write error: {}",
                    revert
                );
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %uid,
            tuit_id = %tid,
            ?action,
            from = %transition.from,
            to = %transition.to,
            likes = stats.likes,
            dislikes = stats.dislikes,
            "toggled like state"
        );

        Ok(ToggleOutcome {
            user_id: uid.to_string(),
            tuit_id: tid.to_string(),
            previous: transition.from,
            current: transition.to,
            stats,
        })
    }

    /// Recompute a tuit's cached like/dislike counters from the Like collection.
    pub async fn refresh_stats(&self, tid: &str) -> DaoResult<TuitStats> {
        let _guard = self.locks.lock(tid).await;

        let tuit = self.tuits.find_tuit_by_id(tid).await?;
        let stats = self.counts(tid).await?.into_stats(tuit.stats);
        self.tuits.update_stats(tid, stats).await?;

        if stats != tuit.stats {
            tracing::info!(
                tuit_id = %tid,
                cached_likes = tuit.stats.likes,
                cached_dislikes = tuit.stats.dislikes,
                likes = stats.likes,
                dislikes = stats.dislikes,
                "reconciled drifted tuit stats"
            );
        }

        Ok(stats)
    }

    async fn counts(&self, tid: &str) -> DaoResult<Counts> {
        Ok(Counts {
            likes: self.likes.count_likes(tid).await?,
            dislikes: self.likes.count_dislikes(tid).await?,
        })
    }
}
