//! Unique shareable code generation.
//!
//! Candidates are built in batches from a [`TokenSource`]. Each batch is
//! checked against the list store in a single query and the first
//! candidate, in batch order, that no list holds is returned. A batch in
//! which every candidate collides is discarded and a fresh one drawn; the
//! loop has no attempt cap.
//!
//! The check is advisory: nothing reserves the code between this query and
//! the insert that uses it, so the store's unique index remains the
//! authoritative guard.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::ports::{ListCodeQuery, ListRepository, ListRepositoryError};
use super::{Error, ListCode};

/// Default number of candidates per batch.
pub const DEFAULT_CODE_BATCH_SIZE: usize = 10;

/// Source of four-character lowercase hexadecimal tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenSource: Send + Sync {
    /// Draw the next token.
    fn next_token(&self) -> String;
}

/// [`TokenSource`] backed by a seedable pseudo-random generator.
#[derive(Debug)]
pub struct RngTokenSource {
    rng: Mutex<StdRng>,
}

impl RngTokenSource {
    /// Generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator; two sources built from the same seed yield
    /// the same token sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TokenSource for RngTokenSource {
    fn next_token(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        hex::encode(rng.r#gen::<[u8; 2]>())
    }
}

pub(crate) fn map_list_repository_error(error: ListRepositoryError) -> Error {
    match error {
        ListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("list repository unavailable: {message}"))
        }
        ListRepositoryError::Query { message } => {
            Error::internal(format!("list repository error: {message}"))
        }
        ListRepositoryError::DuplicateCode { code } => {
            Error::conflict(format!("list code {code} is already taken"))
        }
    }
}

/// Generator of codes unused by any stored list.
pub struct ListCodeGenerator<L> {
    lists: Arc<L>,
    tokens: Arc<dyn TokenSource>,
    batch_size: usize,
}

impl<L> Clone for ListCodeGenerator<L> {
    fn clone(&self) -> Self {
        Self {
            lists: Arc::clone(&self.lists),
            tokens: Arc::clone(&self.tokens),
            batch_size: self.batch_size,
        }
    }
}

impl<L> ListCodeGenerator<L> {
    /// Generator drawing batches of `batch_size` candidates (at least one).
    pub fn new(lists: Arc<L>, tokens: Arc<dyn TokenSource>, batch_size: usize) -> Self {
        Self {
            lists,
            tokens,
            batch_size: batch_size.max(1),
        }
    }

    /// Draw one candidate: two independent tokens concatenated.
    fn candidate(&self) -> Result<ListCode, Error> {
        let head = self.tokens.next_token();
        let tail = self.tokens.next_token();
        ListCode::from_tokens(&head, &tail)
            .map_err(|err| Error::internal(format!("token source produced a bad code: {err}")))
    }

    /// Candidates drawn per batch.
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn candidate_batch(&self) -> Result<Vec<ListCode>, Error> {
        (0..self.batch_size).map(|_| self.candidate()).collect()
    }
}

impl<L> ListCodeGenerator<L>
where
    L: ListRepository,
{
    /// Return a code that no stored list held at query time.
    pub async fn generate(&self) -> Result<ListCode, Error> {
        let mut batch_number: u64 = 0;
        loop {
            batch_number += 1;
            let batch = self.candidate_batch()?;
            let taken = self
                .lists
                .find_existing_codes(&batch)
                .await
                .map_err(map_list_repository_error)?;

            if let Some(code) = batch.into_iter().find(|candidate| !taken.contains(candidate)) {
                debug!(%code, batch = batch_number, collisions = taken.len(), "list code issued");
                return Ok(code);
            }
            warn!(
                batch = batch_number,
                size = self.batch_size,
                "every candidate list code collided, drawing a new batch"
            );
        }
    }
}

#[async_trait]
impl<L> ListCodeQuery for ListCodeGenerator<L>
where
    L: ListRepository,
{
    async fn generate_code(&self) -> Result<ListCode, Error> {
        self.generate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockListRepository;
    use std::collections::VecDeque;

    /// Token source replaying a fixed script of tokens.
    struct ScriptedTokens(Mutex<VecDeque<&'static str>>);

    impl ScriptedTokens {
        fn new(tokens: &[&'static str]) -> Self {
            Self(Mutex::new(tokens.iter().copied().collect()))
        }
    }

    impl TokenSource for ScriptedTokens {
        fn next_token(&self) -> String {
            let mut queue = self.0.lock().expect("token script lock");
            queue.pop_front().expect("token script exhausted").to_owned()
        }
    }

    fn code(raw: &str) -> ListCode {
        ListCode::new(raw).expect("valid code")
    }

    fn store_holding(held: Vec<ListCode>) -> MockListRepository {
        let mut repo = MockListRepository::new();
        repo.expect_find_existing_codes().returning(move |codes| {
            Ok(codes.iter().filter(|c| held.contains(c)).cloned().collect())
        });
        repo
    }

    #[tokio::test]
    async fn returns_first_candidate_when_nothing_collides() {
        let tokens = ScriptedTokens::new(&["aaaa", "0001", "bbbb", "0002"]);
        let generator =
            ListCodeGenerator::new(Arc::new(store_holding(vec![])), Arc::new(tokens), 2);

        assert_eq!(generator.generate().await, Ok(code("aaaa0001")));
    }

    #[tokio::test]
    async fn skips_colliding_candidates_in_batch_order() {
        let tokens = ScriptedTokens::new(&["aaaa", "0001", "bbbb", "0002", "cccc", "0003"]);
        let store = store_holding(vec![code("aaaa0001")]);
        let generator = ListCodeGenerator::new(Arc::new(store), Arc::new(tokens), 3);

        assert_eq!(generator.generate().await, Ok(code("bbbb0002")));
    }

    #[tokio::test]
    async fn draws_new_batches_until_a_candidate_is_free() {
        let tokens = ScriptedTokens::new(&[
            "0000", "0001", "0000", "0002", // batch 1
            "0000", "0003", "0000", "0004", // batch 2
            "0000", "0005", "ffff", "0006", // batch 3
        ]);
        let store = store_holding(vec![
            code("00000001"),
            code("00000002"),
            code("00000003"),
            code("00000004"),
            code("00000005"),
        ]);
        let generator = ListCodeGenerator::new(Arc::new(store), Arc::new(tokens), 2);

        assert_eq!(generator.generate().await, Ok(code("ffff0006")));
    }

    #[tokio::test]
    async fn seeded_store_forces_exactly_one_retry() {
        const SEED: u64 = 0x5eed;
        let reference = ListCodeGenerator::new(
            Arc::new(MockListRepository::new()),
            Arc::new(RngTokenSource::seeded(SEED)),
            DEFAULT_CODE_BATCH_SIZE,
        );
        let first_batch = reference.candidate_batch().expect("first batch");
        let second_batch = reference.candidate_batch().expect("second batch");

        let mut store = MockListRepository::new();
        let held = first_batch.clone();
        store
            .expect_find_existing_codes()
            .times(2)
            .returning(move |codes| {
                Ok(codes.iter().filter(|c| held.contains(c)).cloned().collect())
            });
        let generator = ListCodeGenerator::new(
            Arc::new(store),
            Arc::new(RngTokenSource::seeded(SEED)),
            DEFAULT_CODE_BATCH_SIZE,
        );

        let issued = generator.generate().await.expect("code issued");
        assert!(!first_batch.contains(&issued));
        assert!(second_batch.contains(&issued));
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let mut store = MockListRepository::new();
        store
            .expect_find_existing_codes()
            .times(1)
            .return_once(|_| Err(ListRepositoryError::connection("refused")));
        let generator = ListCodeGenerator::new(
            Arc::new(store),
            Arc::new(RngTokenSource::seeded(1)),
            DEFAULT_CODE_BATCH_SIZE,
        );

        let err = generator.generate().await.expect_err("store down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn malformed_tokens_are_internal_errors() {
        let mut tokens = MockTokenSource::new();
        tokens.expect_next_token().returning(|| "xyz".to_owned());
        let generator = ListCodeGenerator::new(
            Arc::new(MockListRepository::new()),
            Arc::new(tokens),
            DEFAULT_CODE_BATCH_SIZE,
        );

        let err = generator.generate().await.expect_err("bad tokens");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn rng_tokens_are_four_hex_chars() {
        let source = RngTokenSource::from_entropy();
        for _ in 0..32 {
            let token = source.next_token();
            assert_eq!(token.len(), 4);
            assert!(token.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        }
    }
}
