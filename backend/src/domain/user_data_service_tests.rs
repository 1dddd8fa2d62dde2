//! Tests for the user data service.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockUserRecordRepository;
use rstest::{fixture, rstest};

fn make_service(repo: MockUserRecordRepository) -> UserDataService<MockUserRecordRepository> {
    UserDataService::new(Arc::new(repo))
}

#[fixture]
fn user_id() -> UserId {
    UserId::new("u1").expect("valid user id")
}

fn request(user_id: &UserId, ratings: f64, rents: f64) -> UpdateUserDataRequest {
    UpdateUserDataRequest {
        user_id: user_id.clone(),
        total_average_weight_ratings: ratings,
        number_of_rents: rents,
    }
}

fn stored(user_id: &UserId, ratings: f64, rents: f64, at: i64) -> UserRecord {
    let stats = RentalStats::try_new(ratings, rents).expect("valid stats");
    UserRecord::created(user_id.clone(), stats, at)
}

#[rstest]
#[tokio::test]
async fn update_creates_record_when_missing(user_id: UserId) {
    let mut repo = MockUserRecordRepository::new();
    repo.expect_get().times(1).return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .withf(|_, stats| stats.number_of_rents() == 10)
        .return_once(|id, stats| Ok(UserRecord::created(id.clone(), *stats, 1_000)));
    repo.expect_merge().never();

    let record = make_service(repo)
        .update_user_data(request(&user_id, 4.8, 10.0))
        .await
        .expect("update succeeds");

    assert_eq!(record.id, user_id);
    assert_eq!(record.created_at, record.updated_at);
    assert_eq!(record.updated_at, record.recently_active);
}

#[rstest]
#[tokio::test]
async fn update_merges_existing_record(user_id: UserId) {
    let existing = stored(&user_id, 4.8, 10.0, 1_000);
    let mut repo = MockUserRecordRepository::new();
    repo.expect_get()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_create().never();
    repo.expect_merge().times(1).return_once(|id, stats| {
        let mut record = stored(id, 4.8, 10.0, 1_000);
        record.merge_stats(*stats, 2_000);
        Ok(record)
    });

    let record = make_service(repo)
        .update_user_data(request(&user_id, 3.0, 12.0))
        .await
        .expect("update succeeds");

    assert_eq!(record.created_at, 1_000);
    assert!(record.updated_at > record.created_at);
    assert_eq!(record.number_of_rents, 12);
}

#[rstest]
#[tokio::test]
async fn update_merges_when_create_loses_a_race(user_id: UserId) {
    let mut repo = MockUserRecordRepository::new();
    repo.expect_get().times(1).return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .return_once(|id, _| Err(UserRecordRepositoryError::already_exists(id.as_ref())));
    repo.expect_merge()
        .times(1)
        .return_once(|id, stats| Ok(UserRecord::created(id.clone(), *stats, 5)));

    let record = make_service(repo)
        .update_user_data(request(&user_id, 2.0, 3.0))
        .await
        .expect("merge fallback succeeds");

    assert_eq!(record.number_of_rents, 3);
}

#[rstest]
#[case(5.1, 10.0, "totalAverageWeightRatings", "out_of_range")]
#[case(-0.5, 10.0, "totalAverageWeightRatings", "out_of_range")]
#[case(f64::NAN, 10.0, "totalAverageWeightRatings", "out_of_range")]
#[case(3.0, -1.0, "numberOfRents", "out_of_range")]
#[case(3.0, 2.5, "numberOfRents", "not_an_integer")]
#[case(9.0, -1.0, "totalAverageWeightRatings", "out_of_range")]
#[tokio::test]
async fn update_rejects_invalid_input_without_store_calls(
    user_id: UserId,
    #[case] ratings: f64,
    #[case] rents: f64,
    #[case] field: &str,
    #[case] code: &str,
) {
    // No expectations: any repository call fails the test.
    let repo = MockUserRecordRepository::new();

    let err = make_service(repo)
        .update_user_data(request(&user_id, ratings, rents))
        .await
        .expect_err("invalid input");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details present");
    assert_eq!(details["field"], field);
    assert_eq!(details["code"], code);
}

#[rstest]
#[tokio::test]
async fn update_maps_store_failures_to_internal_errors(user_id: UserId) {
    let mut repo = MockUserRecordRepository::new();
    repo.expect_get()
        .times(1)
        .return_once(|_| Err(UserRecordRepositoryError::connection("refused")));

    let err = make_service(repo)
        .update_user_data(request(&user_id, 4.0, 1.0))
        .await
        .expect_err("store down");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(!err.message().contains("refused"));
}

#[rstest]
#[tokio::test]
async fn update_treats_vanished_record_as_internal_error(user_id: UserId) {
    let existing = stored(&user_id, 1.0, 1.0, 1);
    let mut repo = MockUserRecordRepository::new();
    repo.expect_get()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_merge()
        .times(1)
        .return_once(|id, _| Err(UserRecordRepositoryError::vanished(id.as_ref())));

    let err = make_service(repo)
        .update_user_data(request(&user_id, 4.0, 1.0))
        .await
        .expect_err("record vanished");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn fetch_touches_then_reads(user_id: UserId) {
    let record = stored(&user_id, 4.5, 25.0, 7);
    let expected = record.clone();
    let mut seq = mockall::Sequence::new();
    let mut repo = MockUserRecordRepository::new();
    repo.expect_touch_activity()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    repo.expect_get()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(record)));

    let fetched = make_service(repo)
        .fetch_user_data(&user_id)
        .await
        .expect("fetch succeeds");

    assert_eq!(fetched, expected);
}

#[rstest]
#[case(UserRecordRepositoryError::missing("u1"))]
#[case(UserRecordRepositoryError::connection("timeout"))]
#[tokio::test]
async fn fetch_ignores_touch_failures(user_id: UserId, #[case] touch_error: UserRecordRepositoryError) {
    let record = stored(&user_id, 4.5, 25.0, 7);
    let mut repo = MockUserRecordRepository::new();
    repo.expect_touch_activity()
        .times(1)
        .return_once(move |_| Err(touch_error));
    repo.expect_get()
        .times(1)
        .return_once(move |_| Ok(Some(record)));

    let fetched = make_service(repo)
        .fetch_user_data(&user_id)
        .await
        .expect("fetch succeeds despite touch failure");

    assert_eq!(fetched.number_of_rents, 25);
}

#[tokio::test]
async fn fetch_of_missing_user_is_not_found() {
    let user_id = UserId::new("missing-user").expect("valid user id");
    let mut repo = MockUserRecordRepository::new();
    repo.expect_touch_activity()
        .times(1)
        .return_once(|id| Err(UserRecordRepositoryError::missing(id.as_ref())));
    repo.expect_get().times(1).return_once(|_| Ok(None));

    let err = make_service(repo)
        .fetch_user_data(&user_id)
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "User not found");
}

#[rstest]
#[tokio::test]
async fn fetch_maps_read_failures_to_internal_errors(user_id: UserId) {
    let mut repo = MockUserRecordRepository::new();
    repo.expect_touch_activity().times(1).return_once(|_| Ok(()));
    repo.expect_get()
        .times(1)
        .return_once(|_| Err(UserRecordRepositoryError::query("503 Service Unavailable")));

    let err = make_service(repo)
        .fetch_user_data(&user_id)
        .await
        .expect_err("read failed");

    assert_eq!(err.code(), ErrorCode::InternalError);
}
