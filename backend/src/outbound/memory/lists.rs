//! In-memory [`ListRepository`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{ListRepository, ListRepositoryError};
use crate::domain::{ListCode, SharedList, UserId};

/// List store held in process memory, keyed by code.
#[derive(Debug, Default)]
pub struct InMemoryListRepository {
    by_code: Mutex<HashMap<ListCode, SharedList>>,
}

impl InMemoryListRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `lists`.
    pub fn with_lists(lists: impl IntoIterator<Item = SharedList>) -> Self {
        Self {
            by_code: Mutex::new(
                lists
                    .into_iter()
                    .map(|list| (list.code.clone(), list))
                    .collect(),
            ),
        }
    }

    fn by_code(&self) -> MutexGuard<'_, HashMap<ListCode, SharedList>> {
        self.by_code.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn oldest_first(mut lists: Vec<SharedList>) -> Vec<SharedList> {
    lists.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.code.cmp(&b.code))
    });
    lists
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn find_by_code(
        &self,
        code: &ListCode,
    ) -> Result<Option<SharedList>, ListRepositoryError> {
        Ok(self.by_code().get(code).cloned())
    }

    async fn find_existing_codes(
        &self,
        codes: &[ListCode],
    ) -> Result<Vec<ListCode>, ListRepositoryError> {
        let by_code = self.by_code();
        Ok(codes
            .iter()
            .filter(|code| by_code.contains_key(*code))
            .cloned()
            .collect())
    }

    async fn find_by_codes(
        &self,
        codes: &[ListCode],
    ) -> Result<Vec<SharedList>, ListRepositoryError> {
        let by_code = self.by_code();
        Ok(oldest_first(
            codes
                .iter()
                .filter_map(|code| by_code.get(code).cloned())
                .collect(),
        ))
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<SharedList>, ListRepositoryError> {
        Ok(oldest_first(
            self.by_code()
                .values()
                .filter(|list| list.owner == *owner)
                .cloned()
                .collect(),
        ))
    }

    async fn delete(&self, code: &ListCode) -> Result<bool, ListRepositoryError> {
        Ok(self.by_code().remove(code).is_some())
    }

    async fn insert(&self, list: &SharedList) -> Result<(), ListRepositoryError> {
        let mut by_code = self.by_code();
        if by_code.contains_key(&list.code) {
            return Err(ListRepositoryError::duplicate_code(list.code.to_string()));
        }
        by_code.insert(list.code.clone(), list.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewList;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn list(code: &str) -> SharedList {
        NewList {
            owner: UserId::random(),
            name: "Weekend".into(),
            code: None,
            shared_with: Vec::new(),
            content: json!([]),
        }
        .into_list(ListCode::new(code).expect("valid code"))
    }

    #[tokio::test]
    async fn insert_enforces_unique_codes() {
        let repo = InMemoryListRepository::with_lists([list("aaaa0000")]);
        let err = repo.insert(&list("aaaa0000")).await.expect_err("duplicate");
        assert_eq!(err, ListRepositoryError::duplicate_code("aaaa0000"));
    }

    #[tokio::test]
    async fn existing_codes_are_the_stored_subset() {
        let repo = InMemoryListRepository::with_lists([list("aaaa0000"), list("bbbb0000")]);
        let requested = vec![
            ListCode::new("bbbb0000").expect("valid code"),
            ListCode::new("cccc0000").expect("valid code"),
        ];
        let existing = repo.find_existing_codes(&requested).await.expect("query succeeds");
        assert_eq!(existing, vec![ListCode::new("bbbb0000").expect("valid code")]);
    }

    #[tokio::test]
    async fn find_by_codes_skips_unknown() {
        let stored = list("aaaa0000");
        let repo = InMemoryListRepository::with_lists([stored.clone()]);
        let requested = vec![stored.code.clone(), ListCode::new("dddd0000").expect("valid code")];
        let found = repo.find_by_codes(&requested).await.expect("query succeeds");
        assert_eq!(found, vec![stored]);
    }

    #[tokio::test]
    async fn find_by_codes_returns_oldest_first_whatever_the_request_order() {
        let mut older = list("bbbb0000");
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = list("aaaa0000");
        let repo = InMemoryListRepository::with_lists([older.clone(), newer.clone()]);

        let found = repo
            .find_by_codes(&[newer.code.clone(), older.code.clone()])
            .await
            .expect("query succeeds");
        assert_eq!(found, vec![older, newer]);
    }

    #[tokio::test]
    async fn find_by_owner_keeps_only_that_owners_lists() {
        let mut first = list("aaaa0000");
        first.created_at = Utc::now() - Duration::minutes(5);
        let mut second = list("cccc0000");
        second.owner = first.owner;
        let stranger = list("bbbb0000");
        let repo = InMemoryListRepository::with_lists([second.clone(), stranger, first.clone()]);

        let owned = repo.find_by_owner(&first.owner).await.expect("query succeeds");
        assert_eq!(owned, vec![first, second]);
        let none = repo
            .find_by_owner(&UserId::random())
            .await
            .expect("query succeeds");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_list_was_removed() {
        let stored = list("aaaa0000");
        let repo = InMemoryListRepository::with_lists([stored.clone()]);

        assert!(repo.delete(&stored.code).await.expect("delete succeeds"));
        assert!(!repo.delete(&stored.code).await.expect("delete succeeds"));
        let gone = repo.find_by_code(&stored.code).await.expect("lookup succeeds");
        assert_eq!(gone, None);
    }
}
