use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::DEFAULT_PER_PAGE;
use crate::github::IssueQuery;
use crate::types::{FilterSet, Issue, IssueFilter, PageDirection, RepositoryMetadata};

/// Shared across screen instances so a result addressed to a closed screen
/// can never match the generation of a newer one.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Metadata and first issue page, fetched together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    pub generation: u64,
    pub repository: String,
    pub issues: IssueQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuesRequest {
    pub generation: u64,
    pub query: IssueQuery,
}

/// Issue list for one repository, with filter and page state.
///
/// Each method that starts a fetch bumps `generation`; results carrying an older
/// generation are dropped so the latest request always wins.
#[derive(Debug)]
pub struct IssueBrowserScreen {
    pub repository_name: String,
    pub repository: Option<RepositoryMetadata>,
    pub issues: Vec<Issue>,
    pub filters: FilterSet,
    pub page: u32,
    pub status: LoadState,
    pub selected: usize,
    per_page: u8,
    generation: u64,
    mount_generation: u64,
}

impl IssueBrowserScreen {
    pub fn new(repository_name: impl Into<String>, per_page: u8) -> Self {
        Self {
            repository_name: repository_name.into(),
            repository: None,
            issues: Vec::new(),
            filters: FilterSet::default(),
            page: 1,
            status: LoadState::Loading,
            selected: 0,
            per_page: if per_page == 0 { DEFAULT_PER_PAGE } else { per_page },
            generation: 0,
            mount_generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadState::Loading
    }

    pub fn active_filter(&self) -> IssueFilter {
        self.filters.active()
    }

    fn query(&self) -> IssueQuery {
        IssueQuery {
            repository: self.repository_name.clone(),
            filter: self.active_filter(),
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn start_loading(&mut self) -> u64 {
        self.status = LoadState::Loading;
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.generation
    }

    fn is_current(&self, generation: u64, what: &str) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                repository = %self.repository_name,
                "dropping stale {}",
                what
            );
            return false;
        }
        true
    }

    pub fn mount(&mut self) -> MountRequest {
        self.page = 1;
        self.reload()
    }

    /// Re-run the full load for the current filter and page
    pub fn reload(&mut self) -> MountRequest {
        let generation = self.start_loading();
        self.mount_generation = generation;
        MountRequest {
            generation,
            repository: self.repository_name.clone(),
            issues: self.query(),
        }
    }

    pub fn apply_mount(
        &mut self,
        generation: u64,
        result: std::result::Result<(RepositoryMetadata, Vec<Issue>), String>,
    ) {
        // A filter or page change after the mount supersedes its issues but not its metadata
        if generation != self.mount_generation {
            tracing::debug!(generation, repository = %self.repository_name, "dropping stale mount");
            return;
        }
        let current = self.is_current(generation, "mount issues");
        match result {
            Ok((repository, issues)) => {
                self.repository = Some(repository);
                if current {
                    self.set_issues(issues);
                }
            }
            Err(e) if current => self.fail(e),
            Err(e) => tracing::warn!(error = %e, "repository metadata unavailable"),
        }
    }

    /// Switch the active filter and go back to page 1. No-op if already active.
    pub fn change_filter(&mut self, filter: IssueFilter) -> Option<IssuesRequest> {
        if !self.filters.activate(filter) {
            return None;
        }
        self.page = 1;
        let generation = self.start_loading();
        Some(IssuesRequest {
            generation,
            query: self.query(),
        })
    }

    /// Move one page. The page is committed before the fetch resolves and never drops below 1.
    pub fn change_page(&mut self, direction: PageDirection) -> Option<IssuesRequest> {
        let target = match direction {
            PageDirection::Prev => self.page.saturating_sub(1).max(1),
            PageDirection::Next => self.page.saturating_add(1),
        };
        if target == self.page {
            return None;
        }
        self.page = target;
        let generation = self.start_loading();
        Some(IssuesRequest {
            generation,
            query: self.query(),
        })
    }

    pub fn apply_issues(
        &mut self,
        generation: u64,
        result: std::result::Result<Vec<Issue>, String>,
    ) {
        if !self.is_current(generation, "issue page") {
            return;
        }
        match result {
            Ok(issues) => self.set_issues(issues),
            Err(e) => self.fail(e),
        }
    }

    fn set_issues(&mut self, issues: Vec<Issue>) {
        self.issues = issues;
        self.selected = 0;
        self.status = LoadState::Ready;
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(
            repository = %self.repository_name,
            error = %message,
            "issue browser load failed"
        );
        self.status = LoadState::Failed(message);
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.issues.len() {
            self.selected += 1;
        }
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.issues.get(self.selected)
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.selected_issue().map(|i| i.html_url.as_str())
    }
}
