use std::sync::Arc;

use tracing::debug;

use crate::{
    error::AppResult,
    store::TeammateStore,
    teammates::{
        dto::{PageRequest, Pagination, TeammatePage},
        repo_types::TeammateFilter,
    },
};

/// Filtered, paginated reads over the teammate directory.
#[derive(Clone)]
pub struct DirectoryService {
    teammates: Arc<dyn TeammateStore>,
}

impl DirectoryService {
    pub fn new(teammates: Arc<dyn TeammateStore>) -> Self {
        Self { teammates }
    }

    pub fn store(&self) -> &Arc<dyn TeammateStore> {
        &self.teammates
    }

    /// Pages past the end yield no items but still report the full totals.
    pub async fn list(&self, filter: &TeammateFilter, page: PageRequest) -> AppResult<TeammatePage> {
        let (items, total) = self
            .teammates
            .query(filter, page.offset(), page.limit)
            .await?;
        debug!(?filter, total, returned = items.len(), "teammates listed");
        Ok(TeammatePage {
            items,
            pagination: Pagination::new(total, page),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{seed, store::MemoryStore, teammates::repo_types::NewTeammate};

    async fn service_with(teammates: Vec<NewTeammate>) -> DirectoryService {
        let store = Arc::new(MemoryStore::new());
        store.insert_many(teammates).await.unwrap();
        DirectoryService::new(store)
    }

    fn teammate(name: &str, skills: &[&str], availability: &str) -> NewTeammate {
        NewTeammate {
            name: name.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            availability: availability.into(),
            bio: String::new(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn skill_filter_is_case_insensitive_and_literal() {
        let svc = service_with(vec![
            teammate("Cpp Dev", &["C++", "Java"], "Now"),
            teammate("Py Dev", &["Python"], "Now"),
        ])
        .await;
        let page = svc
            .list(
                &TeammateFilter::new(Some("c++".into()), None),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Cpp Dev");
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty_with_metadata() {
        let svc = service_with(seed::sample_teammates()).await;
        let page = svc
            .list(&TeammateFilter::default(), PageRequest { page: 100, limit: 10 })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(
            page.pagination,
            Pagination { total: 5, page: 100, limit: 10, pages: 1 }
        );
    }

    #[tokio::test]
    async fn filters_apply_before_pagination() {
        let svc = service_with(seed::sample_teammates()).await;
        let filter = TeammateFilter::new(None, Some("now".into()));
        let first = svc.list(&filter, PageRequest { page: 1, limit: 1 }).await.unwrap();
        let second = svc.list(&filter, PageRequest { page: 2, limit: 1 }).await.unwrap();

        assert_eq!(first.pagination.total, 2);
        assert_eq!(first.pagination.pages, 2);
        assert_eq!(first.items[0].name, "Alice Johnson");
        assert_eq!(second.items[0].name, "Ethan Wilson");
    }

    #[tokio::test]
    async fn combined_filters_must_both_match() {
        let svc = service_with(seed::sample_teammates()).await;
        let page = svc
            .list(
                &TeammateFilter::new(Some("python".into()), Some("weekend".into())),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.pages, 0);
    }
}
