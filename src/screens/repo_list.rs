use crate::error::{AddError, Result, TrackerError};
use crate::route::Route;
use crate::store::KeyValueStore;
use crate::types::{RepositoryMetadata, RepositoryRef};

/// Store key holding the JSON-serialized tracked list
pub const REPOSITORIES_KEY: &str = "repositories";

/// A lookup the app should run against `GET /repos/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub generation: u64,
    pub name: String,
}

/// Tracked repository list with the add form.
///
/// Storage is read once in [`RepoListScreen::mount`]; every change to the list is
/// written back through [`RepoListScreen::sync`].
#[derive(Debug, Default)]
pub struct RepoListScreen {
    pub repositories: Vec<RepositoryRef>,
    pub input: String,
    pub loading: bool,
    pub not_found: bool,
    pub selected: usize,
    generation: u64,
    pending: Option<String>,
    /// Set when the stored list could be neither read nor moved aside.
    /// `sync` refuses to write over it.
    read_only: bool,
}

impl RepoListScreen {
    pub fn mount(store: &dyn KeyValueStore) -> Self {
        let mut read_only = false;
        let repositories = match store.get(REPOSITORIES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable repository list, starting empty");
                    if let Err(e) = store.set_aside(REPOSITORIES_KEY) {
                        tracing::warn!(error = %e, "could not move repository list aside");
                        read_only = true;
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read repository list");
                read_only = true;
                Vec::new()
            }
        };
        tracing::debug!(count = repositories.len(), read_only, "repository list hydrated");

        Self {
            repositories,
            read_only,
            ..Self::default()
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.repositories.iter().any(|r| r.name == name)
    }

    /// Start an add for the current input. Blank input starts nothing.
    pub fn begin_add(&mut self) -> Option<LookupRequest> {
        let name = self.input.trim();
        if name.is_empty() {
            return None;
        }
        let name = name.to_string();

        self.loading = true;
        self.not_found = false;
        self.generation += 1;
        self.pending = Some(name.clone());

        Some(LookupRequest {
            generation: self.generation,
            name,
        })
    }

    /// Apply a lookup result. On success the list grows by one and is synced to `store`.
    pub fn finish_add(
        &mut self,
        generation: u64,
        result: std::result::Result<RepositoryMetadata, String>,
        store: &dyn KeyValueStore,
    ) -> std::result::Result<(), AddError> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale lookup");
            return Err(AddError::Stale);
        }
        let submitted = self.pending.take().unwrap_or_default();

        let outcome = match result {
            Err(e) => Err(AddError::Lookup(e)),
            Ok(repo) if self.is_tracked(&submitted) || self.is_tracked(&repo.full_name) => {
                Err(AddError::Duplicate(repo.full_name))
            }
            Ok(repo) => Ok(RepositoryRef {
                name: repo.full_name,
            }),
        };

        self.loading = false;
        match outcome {
            Ok(entry) => {
                tracing::info!(name = %entry.name, "repository added");
                self.repositories.push(entry);
                self.input.clear();
                if let Err(e) = self.sync(store) {
                    tracing::warn!(error = %e, "failed to persist repository list");
                }
                Ok(())
            }
            Err(e) => {
                tracing::info!(name = %submitted, reason = %e, "repository not added");
                self.not_found = true;
                Err(e)
            }
        }
    }

    /// Write the full list to `store`
    pub fn sync(&self, store: &dyn KeyValueStore) -> Result<()> {
        if self.read_only {
            return Err(TrackerError::Storage(
                "stored repository list is unreadable, not overwriting it".to_string(),
            ));
        }
        let serialized = serde_json::to_string(&self.repositories)?;
        store.set(REPOSITORIES_KEY, &serialized)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.repositories.len() {
            self.selected += 1;
        }
    }

    pub fn route_for(&self, index: usize) -> Option<Route> {
        self.repositories
            .get(index)
            .map(|r| Route::repository(r.name.clone()))
    }

    pub fn selected_route(&self) -> Option<Route> {
        self.route_for(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::types::Account;

    fn metadata(full_name: &str) -> RepositoryMetadata {
        let (owner, name) = full_name.split_once('/').unwrap();
        RepositoryMetadata {
            full_name: full_name.to_string(),
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/{}", full_name),
            stargazers_count: 0,
            open_issues_count: 0,
            owner: Account {
                login: owner.to_string(),
                avatar_url: String::new(),
            },
        }
    }

    fn submit(screen: &mut RepoListScreen, input: &str) -> LookupRequest {
        screen.set_input(input);
        screen.begin_add().expect("non-empty input starts a lookup")
    }

    #[test]
    fn mount_with_empty_store_starts_empty() {
        let store = MemoryStore::new();
        let screen = RepoListScreen::mount(&store);
        assert!(screen.repositories.is_empty());
        assert!(!screen.loading);
        assert!(store.get(REPOSITORIES_KEY).unwrap().is_none());
    }

    #[test]
    fn mount_hydrates_from_store() {
        let store = MemoryStore::new();
        store
            .set(REPOSITORIES_KEY, r#"[{"name":"a/b"},{"name":"c/d"}]"#)
            .unwrap();
        let screen = RepoListScreen::mount(&store);
        let names: Vec<_> = screen.repositories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a/b", "c/d"]);
    }

    #[test]
    fn mount_sets_corrupt_value_aside() {
        let store = MemoryStore::new();
        store.set(REPOSITORIES_KEY, "not json").unwrap();
        assert!(RepoListScreen::mount(&store).repositories.is_empty());
        assert!(store.get(REPOSITORIES_KEY).unwrap().is_none());
        assert_eq!(
            store.get("repositories.bak").unwrap().as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn add_after_truncated_file_keeps_old_list_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(
            dir.path().join("repositories.json"),
            r#"[{"name":"a/b"},{"name":"c/"#,
        )
        .unwrap();

        let mut screen = RepoListScreen::mount(&store);
        assert!(screen.repositories.is_empty());

        let request = submit(&mut screen, "x/y");
        screen
            .finish_add(request.generation, Ok(metadata("x/y")), &store)
            .unwrap();

        assert_eq!(
            store.get(REPOSITORIES_KEY).unwrap().as_deref(),
            Some(r#"[{"name":"x/y"}]"#)
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("repositories.json.bak")).unwrap(),
            r#"[{"name":"a/b"},{"name":"c/"#
        );
    }

    #[test]
    fn unreadable_store_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("repositories.json")).unwrap();
        let store = FileStore::new(dir.path());

        let mut screen = RepoListScreen::mount(&store);
        let request = submit(&mut screen, "x/y");
        screen
            .finish_add(request.generation, Ok(metadata("x/y")), &store)
            .unwrap();

        assert_eq!(screen.repositories.len(), 1);
        assert!(matches!(screen.sync(&store), Err(TrackerError::Storage(_))));
        assert!(dir.path().join("repositories.json").is_dir());
    }

    #[test]
    fn input_is_stored_verbatim() {
        let mut screen = RepoListScreen::default();
        for c in " Foo/Bar ".chars() {
            screen.push_char(c);
        }
        screen.backspace();
        assert_eq!(screen.input, " Foo/Bar");
    }

    #[test]
    fn begin_add_ignores_blank_input() {
        let mut screen = RepoListScreen::default();
        screen.set_input("   ");
        assert!(screen.begin_add().is_none());
        assert!(!screen.loading);
    }

    #[test]
    fn begin_add_sets_loading_and_clears_indicator() {
        let mut screen = RepoListScreen {
            not_found: true,
            ..RepoListScreen::default()
        };
        let request = submit(&mut screen, " facebook/react ");
        assert_eq!(request.name, "facebook/react");
        assert!(screen.loading);
        assert!(!screen.not_found);
    }

    #[test]
    fn successful_add_appends_canonical_name_and_persists() {
        let store = MemoryStore::new();
        let mut screen = RepoListScreen::mount(&store);

        let request = submit(&mut screen, "facebook/react");
        screen
            .finish_add(request.generation, Ok(metadata("facebook/react")), &store)
            .unwrap();

        assert_eq!(
            screen.repositories,
            vec![RepositoryRef {
                name: "facebook/react".to_string()
            }]
        );
        assert!(screen.input.is_empty());
        assert!(!screen.loading);
        assert!(!screen.not_found);
        assert_eq!(
            store.get(REPOSITORIES_KEY).unwrap().as_deref(),
            Some(r#"[{"name":"facebook/react"}]"#)
        );
    }

    #[test]
    fn add_uses_canonical_full_name_from_response() {
        let store = MemoryStore::new();
        let mut screen = RepoListScreen::mount(&store);

        let request = submit(&mut screen, "Facebook/React");
        screen
            .finish_add(request.generation, Ok(metadata("facebook/react")), &store)
            .unwrap();

        assert_eq!(screen.repositories[0].name, "facebook/react");
    }

    #[test]
    fn duplicate_add_keeps_list_and_store_unchanged() {
        let store = MemoryStore::new();
        store
            .set(REPOSITORIES_KEY, r#"[{"name":"facebook/react"}]"#)
            .unwrap();
        let mut screen = RepoListScreen::mount(&store);

        let request = submit(&mut screen, "facebook/react");
        let err = screen
            .finish_add(request.generation, Ok(metadata("facebook/react")), &store)
            .unwrap_err();

        assert!(matches!(err, AddError::Duplicate(_)));
        assert_eq!(screen.repositories.len(), 1);
        assert!(screen.not_found);
        assert!(!screen.loading);
        assert_eq!(screen.input, "facebook/react");
        assert_eq!(
            store.get(REPOSITORIES_KEY).unwrap().as_deref(),
            Some(r#"[{"name":"facebook/react"}]"#)
        );
    }

    #[test]
    fn duplicate_by_canonical_name_is_rejected() {
        let store = MemoryStore::new();
        let mut screen = RepoListScreen::mount(&store);
        let first = submit(&mut screen, "facebook/react");
        screen
            .finish_add(first.generation, Ok(metadata("facebook/react")), &store)
            .unwrap();

        let second = submit(&mut screen, "FACEBOOK/react");
        let err = screen
            .finish_add(second.generation, Ok(metadata("facebook/react")), &store)
            .unwrap_err();

        assert!(matches!(err, AddError::Duplicate(_)));
        assert_eq!(screen.repositories.len(), 1);
    }

    #[test]
    fn lookup_failure_sets_indicator_and_skips_store() {
        let store = MemoryStore::new();
        let mut screen = RepoListScreen::mount(&store);

        let request = submit(&mut screen, "nobody/nothing");
        let err = screen
            .finish_add(
                request.generation,
                Err("Repository not found: nobody/nothing".to_string()),
                &store,
            )
            .unwrap_err();

        assert!(matches!(err, AddError::Lookup(_)));
        assert!(screen.repositories.is_empty());
        assert!(screen.not_found);
        assert!(!screen.loading);
        assert!(store.get(REPOSITORIES_KEY).unwrap().is_none());
    }

    #[test]
    fn stale_lookup_is_dropped() {
        let store = MemoryStore::new();
        let mut screen = RepoListScreen::mount(&store);

        let first = submit(&mut screen, "a/one");
        let second = submit(&mut screen, "b/two");

        assert_eq!(
            screen.finish_add(first.generation, Ok(metadata("a/one")), &store),
            Err(AddError::Stale)
        );
        assert!(screen.repositories.is_empty());
        assert!(screen.loading);

        screen
            .finish_add(second.generation, Ok(metadata("b/two")), &store)
            .unwrap();
        assert_eq!(screen.repositories.len(), 1);
        assert_eq!(screen.repositories[0].name, "b/two");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let store = MemoryStore::new();
        store
            .set(REPOSITORIES_KEY, r#"[{"name":"a/b"},{"name":"c/d"}]"#)
            .unwrap();
        let mut screen = RepoListScreen::mount(&store);

        screen.select_prev();
        assert_eq!(screen.selected, 0);
        screen.select_next();
        screen.select_next();
        assert_eq!(screen.selected, 1);
        assert_eq!(
            screen.selected_route().unwrap().path(),
            "/repository/c%2Fd"
        );
    }

    #[test]
    fn route_for_missing_index_is_none() {
        assert!(RepoListScreen::default().route_for(0).is_none());
    }
}
