//! Blog posts

use super::{encode, Backend};
use crate::cache::QueryKey;
use crate::config::tables::BLOG_POSTS;
use crate::error::Result;
use crate::notify::{Notice, Notifier};
use crate::records::{BlogPost, NewBlogPost, PublishStatus};
use crate::remote::{Direction, Query};

use serde_json::Value;

/// Cache key of the published post list
pub fn list_key() -> QueryKey {
    QueryKey::new(["blog-posts"])
}

/// Cache key of one published post
pub fn post_key(slug: &str) -> QueryKey {
    QueryKey::new(["blog-post", slug])
}

/// Blog post queries and mutations
pub struct BlogPosts {
    backend: Backend,
}

impl BlogPosts {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Published posts, most recently published first
    pub fn published_list(&self) -> Result<Vec<BlogPost>> {
        self.backend.cached(list_key(), BLOG_POSTS, |source| {
            let query = Query::table(BLOG_POSTS)
                .eq("status", PublishStatus::Published.as_str())
                .order_by("published_at", Direction::Descending);
            source.select(&query).map(Value::Array)
        })
    }

    /// The published post at `slug`
    pub fn published(&self, slug: &str) -> Result<BlogPost> {
        self.backend.cached(post_key(slug), BLOG_POSTS, |source| {
            let query = Query::table(BLOG_POSTS)
                .eq("slug", slug)
                .eq("status", PublishStatus::Published.as_str());
            source.select_single(&query)
        })
    }

    /// Create a post
    pub fn create(&self, post: &NewBlogPost, notifier: Option<&dyn Notifier>) -> Result<BlogPost> {
        let row = encode(BLOG_POSTS, post)?;
        self.backend.mutate(
            BLOG_POSTS,
            |source| source.insert(BLOG_POSTS, row),
            &[list_key()],
            notifier,
            Notice::new("Post created", format!("\"{}\" has been created.", post.title)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{harness, Collect};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn post_row(n: u8, slug: &str, status: &str, published_at: Option<&str>) -> Value {
        json!({
            "id": format!("00000000-0000-4000-8000-0000000000{n:02}"),
            "slug": slug,
            "title": slug,
            "content": "",
            "tags": ["health"],
            "status": status,
            "published_at": published_at,
            "created_at": "2026-09-01T00:00:00Z",
            "updated_at": "2026-09-01T00:00:00Z"
        })
    }

    fn seeded() -> (std::sync::Arc<crate::services::testing::RecordingSource>, BlogPosts) {
        let (source, _cache, backend) = harness();
        source.inner.seed(
            BLOG_POSTS,
            vec![
                post_row(1, "vitamin-d", "published", Some("2026-10-01T00:00:00Z")),
                post_row(2, "allergy-guide", "published", Some("2026-10-05T00:00:00Z")),
                post_row(3, "draft-post", "draft", None),
            ],
        );
        (source, BlogPosts::new(backend))
    }

    #[test]
    fn test_published_list_newest_first() {
        let (_source, posts) = seeded();
        let slugs: Vec<String> = posts
            .published_list()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["allergy-guide", "vitamin-d"]);
    }

    #[test]
    fn test_published_single() {
        let (_source, posts) = seeded();
        let post = posts.published("vitamin-d").unwrap();
        assert_eq!(post.tags, vec!["health"]);
        assert!(posts.published("draft-post").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_published_post_shows_in_list() {
        let (_source, posts) = seeded();
        assert_eq!(posts.published_list().unwrap().len(), 2);

        let at = DateTime::parse_from_rfc3339("2026-10-10T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let notices = Collect::default();
        posts
            .create(
                &NewBlogPost::new("flu-shots", "Flu shots", "...")
                    .published_at(at)
                    .with_author("Dr. Reyes"),
                Some(&notices),
            )
            .unwrap();

        let list = posts.published_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].slug, "flu-shots");
        assert_eq!(notices.notices()[0].title, "Post created");
    }
}
