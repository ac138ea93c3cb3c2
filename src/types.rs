use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry in the tracked repository list, keyed by canonical `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
}

/// Account that owns a repository or authored an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Repository metadata as returned by `GET /repos/{owner}/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub full_name: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    pub owner: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[allow(dead_code)]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "Open"),
            IssueState::Closed => write!(f, "Closed"),
        }
    }
}

/// Present on issues that are actually pull requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestMarker {}

/// Issue as returned by `GET /repos/{owner}/{name}/issues`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[allow(dead_code)]
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: IssueState,
    pub user: Account,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pull_request: Option<PullRequestMarker>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Which subset of a repository's issues gets fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueFilter {
    pub const ALL: [IssueFilter; 3] = [IssueFilter::Open, IssueFilter::Closed, IssueFilter::All];

    pub fn as_api_str(&self) -> &'static str {
        match self {
            IssueFilter::Open => "open",
            IssueFilter::Closed => "closed",
            IssueFilter::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueFilter::Open => "Open",
            IssueFilter::Closed => "Closed",
            IssueFilter::All => "All",
        }
    }
}

impl fmt::Display for IssueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub filter: IssueFilter,
    pub label: &'static str,
    pub active: bool,
}

/// The fixed set of issue filters with exactly one marked active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    options: Vec<FilterOption>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::with_active(IssueFilter::default())
    }
}

impl FilterSet {
    pub fn with_active(active: IssueFilter) -> Self {
        let options = IssueFilter::ALL
            .iter()
            .map(|&filter| FilterOption {
                filter,
                label: filter.label(),
                active: filter == active,
            })
            .collect();
        Self { options }
    }

    pub fn active(&self) -> IssueFilter {
        self.options
            .iter()
            .find(|o| o.active)
            .map(|o| o.filter)
            .unwrap_or_default()
    }

    pub fn is_active(&self, filter: IssueFilter) -> bool {
        self.active() == filter
    }

    /// Rebuild the whole set with `filter` active. Returns false if it already was.
    pub fn activate(&mut self, filter: IssueFilter) -> bool {
        if self.is_active(filter) {
            return false;
        }
        *self = Self::with_active(filter);
        true
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Prev,
    Next,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_count(set: &FilterSet) -> usize {
        set.options().iter().filter(|o| o.active).count()
    }

    #[test]
    fn filter_set_defaults_to_open() {
        let set = FilterSet::default();
        assert_eq!(set.active(), IssueFilter::Open);
        assert_eq!(active_count(&set), 1);
        let labels: Vec<_> = set.options().iter().map(|o| o.label).collect();
        assert_eq!(labels, ["Open", "Closed", "All"]);
    }

    #[test]
    fn activate_keeps_exactly_one_active() {
        let mut set = FilterSet::default();
        for filter in [
            IssueFilter::Closed,
            IssueFilter::Closed,
            IssueFilter::All,
            IssueFilter::Open,
        ] {
            set.activate(filter);
            assert_eq!(active_count(&set), 1);
            assert_eq!(set.active(), filter);
        }
    }

    #[test]
    fn activate_already_active_is_noop() {
        let mut set = FilterSet::with_active(IssueFilter::All);
        let before = set.clone();
        assert!(!set.activate(IssueFilter::All));
        assert_eq!(set, before);
    }

    #[test]
    fn repository_ref_serializes_to_name_object() {
        let list = vec![RepositoryRef {
            name: "facebook/react".to_string(),
        }];
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"[{"name":"facebook/react"}]"#
        );
    }

    #[test]
    fn issue_deserializes_github_shape() {
        let json = r#"{
            "id": 1,
            "number": 42,
            "title": "Crash on start",
            "html_url": "https://github.com/o/r/issues/42",
            "state": "open",
            "user": {"login": "octocat", "avatar_url": "https://a/1"},
            "labels": [{"id": 7, "name": "bug", "color": "ff0000"}],
            "comments": 3,
            "created_at": "2024-01-02T03:04:05Z",
            "body": "ignored"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 42);
        assert_eq!(issue.user.login, "octocat");
        assert_eq!(issue.labels[0].name, "bug");
        assert_eq!(issue.state, IssueState::Open);
        assert!(!issue.is_pull_request());
    }
}
