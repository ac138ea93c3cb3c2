pub mod issue_browser;
pub mod repo_list;

pub use issue_browser::{IssueBrowserScreen, IssuesRequest, LoadState, MountRequest};
pub use repo_list::{LookupRequest, RepoListScreen};
