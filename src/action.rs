use crate::error::TrackerError;
use crate::types::{Issue, IssueFilter, PageDirection, RepositoryMetadata};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    Select,

    // Navigation, by route path
    Navigate(String),

    // Repository list
    InputChar(char),
    InputText(String),
    InputBackspace,
    SubmitRepository,
    RepositoryLookedUp {
        result: Result<RepositoryMetadata, String>,
        generation: u64,
    },

    // Issue browser
    RepositoryLoaded {
        result: Result<(RepositoryMetadata, Vec<Issue>), String>,
        generation: u64,
    },
    IssuesLoaded {
        result: Result<Vec<Issue>, String>,
        generation: u64,
    },
    ChangeFilter(IssueFilter),
    ChangePage(PageDirection),
    Reload,

    // Issue links
    OpenInBrowser,
    YankUrl,

    Error(String),
    None,
}

impl Action {
    /// Results delivered by spawned fetches rather than by a keypress
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Action::RepositoryLookedUp { .. }
                | Action::RepositoryLoaded { .. }
                | Action::IssuesLoaded { .. }
                | Action::None
        )
    }
}

impl From<TrackerError> for Action {
    fn from(err: TrackerError) -> Self {
        Action::Error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_results_are_background() {
        let loaded = Action::IssuesLoaded {
            result: Ok(Vec::new()),
            generation: 1,
        };
        assert!(loaded.is_background());
        assert!(Action::RepositoryLookedUp {
            result: Err("missing".to_string()),
            generation: 1,
        }
        .is_background());
        assert!(!Action::ScrollDown.is_background());
        assert!(!Action::ChangeFilter(IssueFilter::Closed).is_background());
    }
}
