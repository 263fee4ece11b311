//! Shared list creation and propagation to invitees.
//!
//! Creating a list persists it first and then hands the list to a detached
//! propagation task that appends the list's code to every invitee's
//! `shared_with_me` set. The caller gets the stored list back without
//! waiting for propagation, so invitees observe the share eventually. A
//! failed delivery is logged and reported in [`ShareReport`]. It does not
//! undo the list or the other deliveries.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

use super::fan_out::FanOut;
use super::list_code::{ListCodeGenerator, TokenSource, map_list_repository_error};
use super::optimistic::{
    AttemptError, DEFAULT_WRITE_ATTEMPTS, map_user_repository_error, retry_on_conflict,
};
use super::ports::{
    ListRepository, ListRepositoryError, SharedListCommand, SharedListQuery, UserRepository,
};
use super::{Error, Invitee, ListCode, NewList, SharedList, TraceId, UserId};

/// A delivery that did not land.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedDelivery {
    /// Invitee whose record was not updated.
    pub user_id: UserId,
    /// Why.
    pub error: Error,
}

/// Per-invitee outcome of one propagation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareReport {
    /// Invitees whose `shared_with_me` now holds the code, in arrival order.
    pub delivered: Vec<UserId>,
    /// Invitees that could not be updated.
    pub failed: Vec<FailedDelivery>,
}

/// A freshly stored list plus its in-flight propagation.
#[derive(Debug)]
pub struct CreatedList {
    /// The stored list.
    pub list: SharedList,
    /// Completes once every invitee has been attempted.
    pub propagation: JoinHandle<Result<ShareReport, Error>>,
}

/// List sharing service implementing the list driving ports.
pub struct ListSharingService<U, L> {
    users: Arc<U>,
    lists: Arc<L>,
    codes: ListCodeGenerator<L>,
    fan_out: FanOut,
    write_attempts: u32,
}

impl<U, L> Clone for ListSharingService<U, L> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            lists: Arc::clone(&self.lists),
            codes: self.codes.clone(),
            fan_out: self.fan_out,
            write_attempts: self.write_attempts,
        }
    }
}

impl<U, L> ListSharingService<U, L> {
    /// Service drawing code candidates from `tokens`.
    pub fn new(users: Arc<U>, lists: Arc<L>, codes: ListCodeGenerator<L>) -> Self {
        Self {
            users,
            lists,
            codes,
            fan_out: FanOut::default(),
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    /// Convenience constructor building the code generator over `lists`.
    pub fn with_tokens(
        users: Arc<U>,
        lists: Arc<L>,
        tokens: Arc<dyn TokenSource>,
        batch_size: usize,
    ) -> Self {
        let codes = ListCodeGenerator::new(Arc::clone(&lists), tokens, batch_size);
        Self::new(users, lists, codes)
    }

    /// Override the fan-out coordinator.
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Override how many attempts each invitee update may take.
    #[must_use]
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts;
        self
    }
}

impl<U, L> ListSharingService<U, L>
where
    U: UserRepository + 'static,
    L: ListRepository + 'static,
{
    /// Persist a new list and start propagating it to its invitees.
    ///
    /// A caller-supplied code that is already taken yields a conflict. A
    /// generated code that loses the race for the store's unique index is
    /// regenerated, up to the configured write attempts.
    pub async fn create_list(&self, new_list: NewList) -> Result<CreatedList, Error> {
        if new_list.name.trim().is_empty() {
            return Err(Error::invalid_request("list name must not be empty").with_details(
                json!({ "field": "name", "code": "empty_name" }),
            ));
        }

        let list = self.persist(new_list).await?;
        info!(
            code = %list.code,
            owner = %list.owner,
            invitees = list.shared_with.len(),
            "list created"
        );

        let this = self.clone();
        let shared = list.clone();
        let span = info_span!("list_propagation", code = %shared.code);
        let propagation = tokio::spawn(TraceId::carry(
            async move { this.share_list_with(&shared).await }.instrument(span),
        ));

        Ok(CreatedList { list, propagation })
    }

    async fn persist(&self, new_list: NewList) -> Result<SharedList, Error> {
        let supplied = new_list.code.is_some();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let code = match &new_list.code {
                Some(code) => code.clone(),
                None => self.codes.generate().await?,
            };
            let list = new_list.clone().into_list(code);
            match self.lists.insert(&list).await {
                Ok(()) => return Ok(list),
                Err(ListRepositoryError::DuplicateCode { code })
                    if !supplied && attempt < self.write_attempts =>
                {
                    warn!(%code, attempt, "generated list code taken at insert, regenerating");
                }
                Err(err) => return Err(map_list_repository_error(err)),
            }
        }
    }

    /// Append `copies` occurrences of `code` to one invitee in a single
    /// read-modify-write.
    async fn deliver(&self, invitee: &UserId, code: &ListCode, copies: usize) -> Result<(), Error> {
        retry_on_conflict(self.write_attempts, |_| async move {
            let mut user = self
                .users
                .find_by_id(invitee)
                .await
                .map_err(map_user_repository_error)?
                .ok_or_else(|| Error::not_found(format!("invitee {invitee} not found")))?;
            for _ in 0..copies {
                user.receive_share(code.clone());
            }
            let expected = user.bump_revision();
            self.users.save(&user, expected).await?;
            Ok::<_, AttemptError>(())
        })
        .await
    }

    /// Append `list.code` to every invitee's `shared_with_me`.
    ///
    /// Invitees are updated concurrently; one failing does not stop the
    /// others. A user named several times is written once and receives one
    /// copy of the code per mention. Only the batch deadline fails the
    /// whole call.
    pub async fn share_list_with(&self, list: &SharedList) -> Result<ShareReport, Error> {
        let report = self
            .fan_out
            .run(group_invitees(&list.shared_with), |(user_id, copies): (UserId, usize)| async move {
                self.deliver(&user_id, &list.code, copies).await
            })
            .await
            .map_err(|err| {
                warn!(code = %list.code, error = %err, "list propagation abandoned");
                Error::from(err)
            })?;

        let mut summary = ShareReport::default();
        for outcome in report.into_outcomes() {
            let (user_id, _) = outcome.key;
            match outcome.result {
                Ok(()) => summary.delivered.push(user_id),
                Err(error) => {
                    warn!(code = %list.code, %user_id, %error, "list share not delivered");
                    summary.failed.push(FailedDelivery { user_id, error });
                }
            }
        }
        info!(
            code = %list.code,
            delivered = summary.delivered.len(),
            failed = summary.failed.len(),
            "list propagation finished"
        );
        Ok(summary)
    }

    /// Fetch a list by its shareable code.
    pub async fn get_list(&self, code: &ListCode) -> Result<SharedList, Error> {
        self.lists
            .find_by_code(code)
            .await
            .map_err(map_list_repository_error)?
            .ok_or_else(|| Error::not_found(format!("list {code} not found")))
    }

    /// Every list owned by `owner`, oldest first. Empty when there are none.
    pub async fn lists_owned_by(&self, owner: &UserId) -> Result<Vec<SharedList>, Error> {
        self.lists
            .find_by_owner(owner)
            .await
            .map_err(map_list_repository_error)
    }

    /// Remove the list carrying `code`.
    ///
    /// Invitees keep the code in `shared_with_me`; reads skip it from then on.
    pub async fn delete_list(&self, code: &ListCode) -> Result<(), Error> {
        let removed = self
            .lists
            .delete(code)
            .await
            .map_err(map_list_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("list {code} not found")));
        }
        info!(%code, "list deleted");
        Ok(())
    }

    /// Lists whose codes appear in `user_id`'s `shared_with_me`.
    pub async fn shared_lists_for(&self, user_id: &UserId) -> Result<Vec<SharedList>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if user.shared_with_me.is_empty() {
            return Ok(Vec::new());
        }

        let mut codes = user.shared_with_me;
        codes.sort_unstable();
        codes.dedup();
        self.lists
            .find_by_codes(&codes)
            .await
            .map_err(map_list_repository_error)
    }
}

/// Distinct invitees in first-mention order, each with its mention count.
fn group_invitees(invitees: &[Invitee]) -> Vec<(UserId, usize)> {
    let mut grouped: Vec<(UserId, usize)> = Vec::with_capacity(invitees.len());
    for invitee in invitees {
        match grouped.iter_mut().find(|(id, _)| *id == invitee.user_id) {
            Some((_, copies)) => *copies += 1,
            None => grouped.push((invitee.user_id, 1)),
        }
    }
    grouped
}

#[async_trait]
impl<U, L> SharedListCommand for ListSharingService<U, L>
where
    U: UserRepository + 'static,
    L: ListRepository + 'static,
{
    async fn create_list(&self, list: NewList) -> Result<SharedList, Error> {
        ListSharingService::create_list(self, list)
            .await
            .map(|created| created.list)
    }

    async fn delete_list(&self, code: &ListCode) -> Result<(), Error> {
        ListSharingService::delete_list(self, code).await
    }
}

#[async_trait]
impl<U, L> SharedListQuery for ListSharingService<U, L>
where
    U: UserRepository + 'static,
    L: ListRepository + 'static,
{
    async fn get_list(&self, code: &ListCode) -> Result<SharedList, Error> {
        ListSharingService::get_list(self, code).await
    }

    async fn shared_lists_for(&self, user_id: &UserId) -> Result<Vec<SharedList>, Error> {
        ListSharingService::shared_lists_for(self, user_id).await
    }

    async fn lists_owned_by(&self, owner: &UserId) -> Result<Vec<SharedList>, Error> {
        ListSharingService::lists_owned_by(self, owner).await
    }
}

#[cfg(test)]
#[path = "list_sharing_tests.rs"]
mod tests;
