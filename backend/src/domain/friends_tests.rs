//! Tests for the friend graph service.

use std::collections::HashMap;
use std::time::Duration;

use super::*;
use crate::domain::ports::{MockUserRepository, UserRepositoryError};
use crate::domain::{ErrorCode, UserProfile};
use mockall::predicate::eq;
use rstest::rstest;

fn person(pseudo: &str) -> User {
    let mut user = User::new(
        UserId::random(),
        UserProfile {
            first_name: pseudo.to_uppercase(),
            last_name: "Tester".into(),
            pseudo: pseudo.into(),
            email: format!("{pseudo}@example.com"),
        },
    );
    user.credentials = Some(crate::domain::Credentials {
        hash: "hash".into(),
        salt: "salt".into(),
    });
    user
}

/// Mock whose lookups are served from `users`.
fn lookups(users: &[User]) -> MockUserRepository {
    let by_id: HashMap<UserId, User> = users.iter().map(|u| (u.id, u.clone())).collect();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.get(id).cloned()));
    repo
}

fn service(repo: MockUserRepository) -> FriendGraphService<MockUserRepository> {
    FriendGraphService::new(Arc::new(repo))
}

#[tokio::test]
async fn list_friends_without_friends_skips_fan_out() {
    let owner = person("ann");
    let stored = owner.clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(owner.id))
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let listing = service(repo)
        .list_friends(&owner.id)
        .await
        .expect("listing succeeds");

    assert!(listing.friends.is_empty());
    assert_eq!(listing.unresolved, 0);
}

#[tokio::test]
async fn list_friends_returns_public_profiles_and_omits_dangling_ids() {
    let bob = person("bob");
    let cat = person("cat");
    let mut owner = person("ann");
    owner.friends = vec![bob.id, UserId::random(), cat.id];

    let listing = service(lookups(&[owner.clone(), bob.clone(), cat.clone()]))
        .list_friends(&owner.id)
        .await
        .expect("listing succeeds");

    assert_eq!(listing.unresolved, 1);
    let mut pseudos: Vec<&str> = listing.friends.iter().map(|f| f.pseudo.as_str()).collect();
    pseudos.sort_unstable();
    assert_eq!(pseudos, vec!["bob", "cat"]);
    for friend in &listing.friends {
        assert!(owner.friends.contains(&friend.id));
        let value = serde_json::to_value(friend).expect("serialise profile");
        assert!(value.get("friends").is_none());
        assert!(value.get("hash").is_none());
        assert!(value.get("salt").is_none());
    }
}

#[tokio::test]
async fn list_friends_for_unknown_user_is_not_found() {
    let err = service(lookups(&[]))
        .list_friends(&UserId::random())
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_friends_surfaces_store_failure_in_a_branch() {
    let bob = person("bob");
    let mut owner = person("ann");
    owner.friends = vec![bob.id];
    let stored = owner.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(owner.id))
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_find_by_id()
        .with(eq(bob.id))
        .return_once(|_| Err(UserRepositoryError::connection("reset by peer")));

    let err = service(repo)
        .list_friends(&owner.id)
        .await
        .expect_err("branch failure surfaces");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

/// Repository whose friend lookups never finish in time.
struct StalledFriends {
    owner: User,
}

#[async_trait]
impl UserRepository for StalledFriends {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        if *id == self.owner.id {
            return Ok(Some(self.owner.clone()));
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn save(&self, _user: &User, _expected: u32) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn list_friends_times_out_on_stalled_lookup() {
    let mut owner = person("ann");
    owner.friends = vec![UserId::random()];
    let service = FriendGraphService::new(Arc::new(StalledFriends {
        owner: owner.clone(),
    }))
    .with_fan_out(FanOut::new(Duration::from_millis(250)));

    let err = service
        .list_friends(&owner.id)
        .await
        .expect_err("deadline trips");
    assert_eq!(err.code(), ErrorCode::Timeout);
}

#[tokio::test]
async fn add_friend_appends_and_saves_with_expected_revision() {
    let owner = person("ann");
    let bob = person("bob");
    let mut repo = lookups(&[owner.clone(), bob.clone()]);
    let bob_id = bob.id;
    repo.expect_save()
        .withf(move |user, expected| *expected == 1 && user.revision == 2 && user.friends == [bob_id])
        .times(1)
        .return_once(|_, _| Ok(()));

    let friends = service(repo)
        .add_friend(&owner.id, &bob.id)
        .await
        .expect("add succeeds");
    assert_eq!(friends, vec![bob.id]);
}

#[tokio::test]
async fn add_existing_friend_is_a_noop() {
    let bob = person("bob");
    let mut owner = person("ann");
    owner.friends = vec![bob.id];
    let mut repo = lookups(&[owner.clone(), bob.clone()]);
    repo.expect_save().times(0);

    let friends = service(repo)
        .add_friend(&owner.id, &bob.id)
        .await
        .expect("add succeeds");
    assert_eq!(friends, vec![bob.id]);
}

#[rstest]
#[case::owner_missing(false, true)]
#[case::friend_missing(true, false)]
#[tokio::test]
async fn add_friend_requires_both_users(#[case] owner_exists: bool, #[case] friend_exists: bool) {
    let owner = person("ann");
    let bob = person("bob");
    let mut known = Vec::new();
    if owner_exists {
        known.push(owner.clone());
    }
    if friend_exists {
        known.push(bob.clone());
    }
    let mut repo = lookups(&known);
    repo.expect_save().times(0);

    let err = service(repo)
        .add_friend(&owner.id, &bob.id)
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_self_is_rejected() {
    let owner = person("ann");
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(0);

    let err = service(repo)
        .add_friend(&owner.id, &owner.id)
        .await
        .expect_err("self friend rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn add_friend_retries_after_conflict() {
    let owner = person("ann");
    let bob = person("bob");
    let mut repo = lookups(&[owner.clone(), bob.clone()]);
    let mut saves = 0;
    repo.expect_save().times(2).returning(move |_, expected| {
        saves += 1;
        if saves == 1 {
            Err(UserRepositoryError::revision_mismatch(expected, expected + 1))
        } else {
            Ok(())
        }
    });

    let friends = service(repo)
        .add_friend(&owner.id, &bob.id)
        .await
        .expect("second attempt wins");
    assert_eq!(friends, vec![bob.id]);
}

#[tokio::test]
async fn add_friend_gives_up_after_repeated_conflicts() {
    let owner = person("ann");
    let bob = person("bob");
    let mut repo = lookups(&[owner.clone(), bob.clone()]);
    repo.expect_save()
        .times(2)
        .returning(|_, expected| Err(UserRepositoryError::revision_mismatch(expected, expected + 1)));

    let err = service(repo)
        .with_write_attempts(2)
        .add_friend(&owner.id, &bob.id)
        .await
        .expect_err("conflict surfaces");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn remove_friend_drops_the_id() {
    let bob = person("bob");
    let cat = person("cat");
    let mut owner = person("ann");
    owner.friends = vec![bob.id, cat.id];
    let mut repo = lookups(&[owner.clone()]);
    let cat_id = cat.id;
    repo.expect_save()
        .withf(move |user, expected| *expected == 1 && user.friends == [cat_id])
        .times(1)
        .return_once(|_, _| Ok(()));

    let friends = service(repo)
        .remove_friend(&owner.id, &bob.id)
        .await
        .expect("remove succeeds");
    assert_eq!(friends, vec![cat.id]);
}

#[tokio::test]
async fn remove_absent_friend_is_a_noop() {
    let owner = person("ann");
    let mut repo = lookups(&[owner.clone()]);
    repo.expect_save().times(0);

    let friends = service(repo)
        .remove_friend(&owner.id, &UserId::random())
        .await
        .expect("remove succeeds");
    assert!(friends.is_empty());
}

#[tokio::test]
async fn look_up_by_email_returns_the_public_profile() {
    let bob = person("bob");
    let stored = bob.clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .withf(|email| email.to_string() == "bob@example.com")
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let profile = service(repo)
        .look_up_by_email("  bob@example.com ")
        .await
        .expect("lookup succeeds");

    assert_eq!(profile.id, bob.id);
    assert_eq!(profile.pseudo, "bob");
    let value = serde_json::to_value(&profile).expect("serialise profile");
    assert!(value.get("hash").is_none());
    assert!(value.get("friends").is_none());
}

#[rstest]
#[case::unknown("nobody@example.com", ErrorCode::NotFound)]
#[case::blank("   ", ErrorCode::InvalidRequest)]
#[tokio::test]
async fn look_up_by_email_rejects_unknown_or_blank(
    #[case] email: &str,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let err = service(repo)
        .look_up_by_email(email)
        .await
        .expect_err("lookup fails");
    assert_eq!(err.code(), expected);
}
