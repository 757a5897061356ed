use uuid::Uuid;

use crate::domain::entities::user::TokenSubject;
use crate::repositories::user::{InMemoryUserDirectory, UserDirectory};

#[tokio::test]
async fn test_in_memory_directory() {
    let directory = InMemoryUserDirectory::new();
    let subject = TokenSubject::new(Uuid::new_v4(), "a@example.com").with_roles(["admin"]);
    let user_id = subject.user_id;

    assert!(directory.find_subject(user_id).await.unwrap().is_none());

    directory.upsert(subject.clone()).await;
    assert_eq!(directory.find_subject(user_id).await.unwrap(), Some(subject));

    directory.set_enabled(user_id, false).await;
    assert!(!directory.find_subject(user_id).await.unwrap().unwrap().is_enabled);

    directory.remove(user_id).await;
    assert!(directory.find_subject(user_id).await.unwrap().is_none());
}
