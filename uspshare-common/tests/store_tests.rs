//! Integration tests for the persistence gateway, read model and dispatcher
//!
//! Each test opens its own SQLite file in a temporary directory.

use tempfile::TempDir;
use uspshare_common::db::{NewResource, NewUser, NotificationKind, Store};
use uspshare_common::notify::{NotificationDispatcher, Trigger};
use uuid::Uuid;

async fn setup_store() -> (Store, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&dir.path().join("test.db")).await.unwrap();
    (store, dir)
}

async fn user(store: &Store, name: &str) -> Uuid {
    store
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn upload(store: &Store, owner: Uuid, course_code: &str, title: &str) -> Uuid {
    store
        .create_resource(NewResource {
            user_id: owner,
            course_code: course_code.to_string(),
            title: title.to_string(),
            resource_type: "pdf".to_string(),
            file_name: format!("{}.pdf", title),
            file_url: format!("/uploads/{}.pdf", Uuid::new_v4()),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_reply_thread_and_notification() {
    let (store, _dir) = setup_store().await;
    let dispatcher = NotificationDispatcher::new(store.clone());
    let ana = user(&store, "Ana").await;
    let bruno = user(&store, "Bruno").await;
    let resource = upload(&store, ana, "MAC0110", "Lista 1").await;

    let c1 = store.create_comment(resource, bruno, None, "Great notes").await.unwrap();
    let c2 = store.create_comment(resource, ana, Some(c1.id), "Thanks!").await.unwrap();

    let sent = dispatcher
        .dispatch(ana, Trigger::Reply { parent: &c1, reply: &c2 })
        .await
        .expect("reply notification");
    assert_eq!(sent.user_id, bruno);
    assert_eq!(sent.actor_name, "Ana");

    let thread = store.comment_thread(resource).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].id, c1.id);
    assert_eq!(thread[0].author_name, "Bruno");
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].id, c2.id);

    let inbox = store.notifications_for_user(bruno, 50).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::Reply);
    assert_eq!(inbox[0].comment_id, Some(c2.id));
}

#[tokio::test]
async fn test_self_reply_and_self_like_notify_nobody() {
    let (store, _dir) = setup_store().await;
    let dispatcher = NotificationDispatcher::new(store.clone());
    let ana = user(&store, "Ana").await;
    let resource_id = upload(&store, ana, "MAC0110", "Lista 1").await;
    let resource = store.find_resource(resource_id).await.unwrap().unwrap();

    let c1 = store.create_comment(resource_id, ana, None, "note").await.unwrap();
    let c2 = store.create_comment(resource_id, ana, Some(c1.id), "addendum").await.unwrap();

    assert!(dispatcher
        .dispatch(ana, Trigger::Reply { parent: &c1, reply: &c2 })
        .await
        .is_none());
    assert!(dispatcher
        .dispatch(ana, Trigger::ResourceLike { resource: &resource })
        .await
        .is_none());

    assert!(store.notifications_for_user(ana, 50).await.unwrap().is_empty());

    let bruno = user(&store, "Bruno").await;
    assert!(dispatcher
        .dispatch(bruno, Trigger::ResourceLike { resource: &resource })
        .await
        .is_some());
    assert_eq!(store.notifications_for_user(ana, 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_dispatch_skips_unknown_actor() {
    let (store, _dir) = setup_store().await;
    let dispatcher = NotificationDispatcher::new(store.clone());
    let ana = user(&store, "Ana").await;
    let resource_id = upload(&store, ana, "MAC0110", "Lista 1").await;
    let resource = store.find_resource(resource_id).await.unwrap().unwrap();

    let sent = dispatcher
        .dispatch(Uuid::new_v4(), Trigger::ResourceLike { resource: &resource })
        .await;
    assert!(sent.is_none());
}

#[tokio::test]
async fn test_resource_view_counts_and_joins() {
    let (store, _dir) = setup_store().await;
    let ana = user(&store, "Ana").await;
    let bruno = user(&store, "Bruno").await;
    let professor_id = Uuid::new_v4();
    store
        .create_professor(professor_id, "Dr. Silva", Some("/uploads/avatars/p.png".to_string()))
        .await
        .unwrap();

    let resource = store
        .create_resource(NewResource {
            user_id: ana,
            professor_id: Some(professor_id),
            course_code: "MAC0110".to_string(),
            title: "Prova".to_string(),
            file_name: "prova.pdf".to_string(),
            file_url: "/uploads/prova.pdf".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    store.toggle_resource_like(bruno, resource.id).await.unwrap();
    store.create_comment(resource.id, bruno, None, "nice").await.unwrap();

    let view = store.resource_view(resource.id).await.unwrap();
    assert_eq!(view.likes, 1);
    assert_eq!(view.comments, 1);
    assert_eq!(view.uploader_name.as_deref(), Some("Ana"));
    assert_eq!(view.uploader_avatar, None);
    assert_eq!(view.professor_name.as_deref(), Some("Dr. Silva"));
    assert_eq!(view.professor_avatar.as_deref(), Some("/uploads/avatars/p.png"));
}

#[tokio::test]
async fn test_resource_view_tolerates_missing_uploader() {
    let (store, _dir) = setup_store().await;
    let ghost = Uuid::new_v4();
    let resource = upload(&store, ghost, "MAC0110", "Orphan").await;

    let view = store.resource_view(resource).await.unwrap();
    assert_eq!(view.uploader_name, None);
    assert_eq!(view.professor_name, None);

    let err = store.resource_view(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, uspshare_common::Error::NotFound(_)));
}

#[tokio::test]
async fn test_user_listing_is_newest_first() {
    let (store, _dir) = setup_store().await;
    let ana = user(&store, "Ana").await;
    let first = upload(&store, ana, "MAC0110", "First").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = upload(&store, ana, "MAC0110", "Second").await;
    upload(&store, user(&store, "Bruno").await, "MAC0110", "Other").await;

    let mine = store.user_resource_views(ana).await.unwrap();
    assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second, first]);
    assert_eq!(store.list_resource_views().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_related_resources_same_course_capped() {
    let (store, _dir) = setup_store().await;
    let ana = user(&store, "Ana").await;
    let current = upload(&store, ana, "MAC0110", "Current").await;
    for i in 0..6 {
        upload(&store, ana, "MAC0110", &format!("Sibling {}", i)).await;
    }
    upload(&store, ana, "MAT0111", "Elsewhere").await;

    let related = store.related_resources(current).await.unwrap();
    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|r| r.id != current));
    assert!(related.iter().all(|r| r.title.starts_with("Sibling")));
}

#[tokio::test]
async fn test_owner_delete_cascades() {
    let (store, _dir) = setup_store().await;
    let ana = user(&store, "Ana").await;
    let bruno = user(&store, "Bruno").await;
    let resource = upload(&store, ana, "MAC0110", "Lista 1").await;

    let comment = store.create_comment(resource, bruno, None, "hi").await.unwrap();
    store.toggle_resource_like(bruno, resource).await.unwrap();
    store.toggle_comment_like(ana, comment.id).await.unwrap();

    let err = store.delete_resource_owned(resource, bruno).await.unwrap_err();
    assert!(matches!(err, uspshare_common::Error::Forbidden(_)));

    store.delete_resource_owned(resource, ana).await.unwrap();

    assert!(store.find_resource(resource).await.unwrap().is_none());
    assert!(store.comment_thread(resource).await.unwrap().is_empty());
    assert_eq!(store.count_resource_likes(resource).await.unwrap(), 0);
    assert!(store.liked_comment_ids(ana).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_stats_and_badges() {
    let (store, _dir) = setup_store().await;
    let ana = user(&store, "Ana").await;
    let resource = upload(&store, ana, "MAC0110", "Lista 1").await;
    store.create_comment(resource, ana, None, "hi").await.unwrap();

    let profile = store.user_profile(ana).await.unwrap();
    assert_eq!(profile.stats.uploads, 1);
    assert_eq!(profile.stats.comments, 1);
    assert_eq!(profile.stats.likes, 0);
    assert_eq!(profile.badges, vec!["New Member", "Contributor"]);
    assert!(profile.avatar.starts_with("https://i.pravatar.cc/150?u="));
}

#[tokio::test]
async fn test_platform_stats_counts_distinct_courses() {
    let (store, _dir) = setup_store().await;
    store.create_course("MAC0110", "Intro to CS").await.unwrap();
    store.create_course("MAT0111", "Calculus I").await.unwrap();

    // catalogued courses count before anything is uploaded
    let stats = store.platform_stats().await.unwrap();
    assert_eq!((stats.users, stats.resources, stats.courses), (0, 0, 2));

    let ana = user(&store, "Ana").await;
    user(&store, "Bruno").await;
    upload(&store, ana, "MAC0110", "A").await;
    upload(&store, ana, "MAC0110", "B").await;
    upload(&store, ana, "FIS0101", "C").await;

    let stats = store.platform_stats().await.unwrap();
    assert_eq!((stats.users, stats.resources, stats.courses), (2, 3, 2));
}
