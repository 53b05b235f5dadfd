mod common;

use color_diary::db::services::{color_service, diary_service, DiaryChanges, DiaryServiceError};
use common::{add_color, create_user, reload_diary, setup_db, write_diary};

#[tokio::test]
async fn test_create_diary_with_own_color() {
    let db = setup_db().await;
    let user = create_user(&db, "alice@example.com").await;
    let color = add_color(&db, user.id, "#336699").await;

    let diary = diary_service::create_diary(&db, user.id, color.id, 7, "a calm day")
        .await
        .unwrap();

    assert_eq!(diary.user_id, user.id);
    assert_eq!(diary.color_id, color.id);
    assert_eq!(diary.color_level, 7);
    assert_eq!(diary.context, "a calm day");
}

#[tokio::test]
async fn test_create_diary_rejects_color_outside_palette() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let bobs_color = add_color(&db, bob.id, "#336699").await;

    let result = diary_service::create_diary(&db, alice.id, bobs_color.id, 5, "").await;

    assert!(matches!(result, Err(DiaryServiceError::ColorNotOwned)));
}

#[tokio::test]
async fn test_create_diary_rejects_level_out_of_range() {
    let db = setup_db().await;
    let user = create_user(&db, "alice@example.com").await;
    let color = add_color(&db, user.id, "#336699").await;

    for level in [0, 11, -1] {
        let result = diary_service::create_diary(&db, user.id, color.id, level, "").await;
        assert!(matches!(result, Err(DiaryServiceError::InvalidLevel(l)) if l == level));
    }
    for level in [1, 10] {
        assert!(diary_service::create_diary(&db, user.id, color.id, level, "").await.is_ok());
    }
}

#[tokio::test]
async fn test_diaries_are_listed_per_user_newest_first() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let color = add_color(&db, alice.id, "#336699").await;
    add_color(&db, bob.id, "#336699").await;

    let first = write_diary(&db, alice.id, color.id).await;
    let second = write_diary(&db, alice.id, color.id).await;
    write_diary(&db, bob.id, color.id).await;

    let ids: Vec<i32> = diary_service::get_diaries_by_user(&db, alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();

    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_update_diary_changes_only_given_fields() {
    let db = setup_db().await;
    let user = create_user(&db, "alice@example.com").await;
    let blue = add_color(&db, user.id, "#0000FF").await;
    let red = add_color(&db, user.id, "#FF0000").await;
    let diary = write_diary(&db, user.id, blue.id).await;

    let updated = diary_service::update_diary(
        &db,
        user.id,
        diary.id,
        DiaryChanges {
            color_id: Some(red.id),
            color_level: Some(9),
            context: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.color_id, red.id);
    assert_eq!(updated.color_level, 9);
    assert_eq!(updated.context, diary.context);
}

#[tokio::test]
async fn test_update_diary_validates_changes() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let color = add_color(&db, alice.id, "#0000FF").await;
    let bobs_color = add_color(&db, bob.id, "#00FF00").await;
    let diary = write_diary(&db, alice.id, color.id).await;

    let bad_level = diary_service::update_diary(
        &db,
        alice.id,
        diary.id,
        DiaryChanges {
            color_level: Some(42),
            ..Default::default()
        },
    )
    .await;
    let bad_color = diary_service::update_diary(
        &db,
        alice.id,
        diary.id,
        DiaryChanges {
            color_id: Some(bobs_color.id),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(bad_level, Err(DiaryServiceError::InvalidLevel(42))));
    assert!(matches!(bad_color, Err(DiaryServiceError::ColorNotOwned)));
}

#[tokio::test]
async fn test_diaries_are_scoped_to_their_owner() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let color = add_color(&db, alice.id, "#0000FF").await;
    let diary = write_diary(&db, alice.id, color.id).await;

    assert!(diary_service::get_diary(&db, bob.id, diary.id).await.unwrap().is_none());
    let update = diary_service::update_diary(
        &db,
        bob.id,
        diary.id,
        DiaryChanges {
            context: Some("not mine".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(update, Err(DiaryServiceError::NotFound)));
    assert!(!diary_service::delete_diary(&db, bob.id, diary.id).await.unwrap());

    assert!(diary_service::delete_diary(&db, alice.id, diary.id).await.unwrap());
    assert!(diary_service::get_diary(&db, alice.id, diary.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_update_leaves_diary_untouched() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let color = add_color(&db, alice.id, "#0000FF").await;
    let bobs_color = add_color(&db, bob.id, "#00FF00").await;
    let diary = write_diary(&db, alice.id, color.id).await;

    let result = diary_service::update_diary(
        &db,
        alice.id,
        diary.id,
        DiaryChanges {
            color_id: Some(bobs_color.id),
            color_level: Some(2),
            context: Some("changed".to_string()),
        },
    )
    .await;

    assert!(matches!(result, Err(DiaryServiceError::ColorNotOwned)));
    let stored = reload_diary(&db, diary.id).await;
    assert_eq!(stored.color_id, diary.color_id);
    assert_eq!(stored.color_level, diary.color_level);
    assert_eq!(stored.context, diary.context);
}

#[tokio::test]
async fn test_removed_color_cannot_be_used_for_new_diaries() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;
    let own = add_color(&db, alice.id, "#FF0000").await;
    let shared = add_color(&db, alice.id, "#00FF00").await;
    add_color(&db, bob.id, "#00FF00").await;

    color_service::remove_color_from_palette(&db, alice.id, own.id)
        .await
        .unwrap();
    color_service::remove_color_from_palette(&db, alice.id, shared.id)
        .await
        .unwrap();

    for color_id in [own.id, shared.id] {
        let result = diary_service::create_diary(&db, alice.id, color_id, 5, "").await;
        assert!(matches!(result, Err(DiaryServiceError::ColorNotOwned)));
    }
    assert!(diary_service::get_diaries_by_user(&db, alice.id).await.unwrap().is_empty());
}
