#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use quill_core::domain::{Category, Post};
    use quill_core::ports::{
        BaseRepository, CategoryRepository, CommentRepository, PostFilter, PostRepository,
    };

    use crate::database::entity::{category, post};
    use crate::database::memory::{
        InMemoryCategoryRepository, InMemoryPostRepository, InMemoryStore,
    };
    use crate::database::postgres_repo::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    };

    fn post_row(title: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            body: "Body".to_owned(),
            pub_date: now.into(),
            is_published: true,
            author_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            location_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_post_by_id_maps_into_domain() {
        let row = post_row("Test Post");
        let post_id = row.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.title, "Test Post");
        assert_eq!(found.id, post_id);
    }

    #[tokio::test]
    async fn find_category_by_slug_maps_into_domain() {
        let now = Utc::now();
        let row = category::Model {
            id: Uuid::new_v4(),
            title: "Travel".to_owned(),
            description: "On the road".to_owned(),
            slug: "travel".to_owned(),
            is_published: true,
            created_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);

        let result = repo.find_published_by_slug("travel").await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.slug, "travel");
        assert!(found.is_published);
    }

    #[tokio::test]
    async fn deleting_a_missing_comment_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        // Go through the trait object, the way handlers hold repositories
        let repo: std::sync::Arc<dyn CommentRepository> =
            std::sync::Arc::new(PostgresCommentRepository::new(db));

        let result = repo.delete(Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(quill_core::error::RepoError::NotFound)
        ));
    }

    fn seeded_category(slug: &str, is_published: bool) -> Category {
        Category {
            id: Uuid::new_v4(),
            title: slug.to_owned(),
            description: String::new(),
            slug: slug.to_owned(),
            is_published,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_listing_filters_and_orders() {
        let store = InMemoryStore::new();
        let categories = InMemoryCategoryRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store.clone());

        let published = seeded_category("travel", true);
        let hidden = seeded_category("drafts", false);
        categories.save(published.clone()).await.unwrap();
        categories.save(hidden.clone()).await.unwrap();

        let now = Utc::now();
        let author = Uuid::new_v4();

        let mut old = Post::new(
            author,
            published.id,
            None,
            "Old".to_owned(),
            "b".to_owned(),
            now - TimeDelta::days(2),
        );
        old.created_at = now - TimeDelta::days(2);

        let mut new = Post::new(
            author,
            published.id,
            None,
            "New".to_owned(),
            "b".to_owned(),
            now - TimeDelta::days(1),
        );
        new.created_at = now - TimeDelta::days(1);

        let future = Post::new(
            author,
            published.id,
            None,
            "Scheduled".to_owned(),
            "b".to_owned(),
            now + TimeDelta::days(1),
        );

        let in_hidden_category = Post::new(
            author,
            hidden.id,
            None,
            "Hidden".to_owned(),
            "b".to_owned(),
            now - TimeDelta::days(1),
        );

        let mut unpublished = Post::new(
            author,
            published.id,
            None,
            "Draft".to_owned(),
            "b".to_owned(),
            now - TimeDelta::days(1),
        );
        unpublished.is_published = false;

        for post in [&old, &new, &future, &in_hidden_category, &unpublished] {
            posts.save(post.clone()).await.unwrap();
        }

        let filter = PostFilter::default();
        assert_eq!(posts.count_visible(&filter, now).await.unwrap(), 2);

        let listed = posts.list_visible(&filter, now, 0, 10).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);

        let narrowed = PostFilter::in_category("drafts");
        assert_eq!(posts.count_visible(&narrowed, now).await.unwrap(), 0);
    }
}
