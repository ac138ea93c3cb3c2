use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::event::Event;
use crate::github::GitHubApi;
use crate::route::Route;
use crate::screens::{
    IssueBrowserScreen, IssuesRequest, LookupRequest, MountRequest, RepoListScreen,
};
use crate::store::KeyValueStore;
use crate::types::{IssueFilter, PageDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    RepoList,     // Tracked repositories + add form
    IssueBrowser, // Issues of one repository
}

pub struct App {
    pub screen: Screen,
    pub repo_list: RepoListScreen,
    pub issue_browser: Option<IssueBrowserScreen>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    per_page: u8,
    github: Arc<dyn GitHubApi>,
    store: Arc<dyn KeyValueStore>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        github: Arc<dyn GitHubApi>,
        store: Arc<dyn KeyValueStore>,
        per_page: u8,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::RepoList,
            repo_list: RepoListScreen::mount(store.as_ref()),
            issue_browser: None,
            error: None,
            notice: None,
            should_quit: false,
            per_page,
            github,
            store,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.screen == Screen::RepoList => Action::InputText(text),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match self.screen {
            Screen::RepoList => self.handle_repo_list_key(key),
            Screen::IssueBrowser => self.handle_issue_browser_key(key),
        }
    }

    fn handle_repo_list_key(&self, key: KeyEvent) -> Action {
        // The add form always has focus, so printable keys go to the input
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Up => Action::ScrollUp,
            KeyCode::Down => Action::ScrollDown,
            KeyCode::Backspace => Action::InputBackspace,
            KeyCode::Enter => {
                if self.repo_list.input.trim().is_empty() {
                    Action::Select
                } else {
                    Action::SubmitRepository
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::InputChar(c)
            }
            _ => Action::None,
        }
    }

    fn handle_issue_browser_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Back,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('h') | KeyCode::Left => Action::ChangePage(PageDirection::Prev),
            KeyCode::Char('l') | KeyCode::Right => Action::ChangePage(PageDirection::Next),
            KeyCode::Char('o') | KeyCode::Char('1') => Action::ChangeFilter(IssueFilter::Open),
            KeyCode::Char('c') | KeyCode::Char('2') => Action::ChangeFilter(IssueFilter::Closed),
            KeyCode::Char('a') | KeyCode::Char('3') => Action::ChangeFilter(IssueFilter::All),
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Enter => Action::OpenInBrowser,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        // Messages stay up until the user does something
        let user_input = !matches!(action, Action::Quit | Action::Back);
        if user_input && !action.is_background() {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::RepoList => {
                    self.should_quit = true;
                }
                Screen::IssueBrowser => {
                    self.navigate(&Route::RepositoryList.path());
                }
            },
            Action::ScrollUp => match self.screen {
                Screen::RepoList => self.repo_list.select_prev(),
                Screen::IssueBrowser => {
                    if let Some(browser) = self.issue_browser.as_mut() {
                        browser.select_prev();
                    }
                }
            },
            Action::ScrollDown => match self.screen {
                Screen::RepoList => self.repo_list.select_next(),
                Screen::IssueBrowser => {
                    if let Some(browser) = self.issue_browser.as_mut() {
                        browser.select_next();
                    }
                }
            },
            Action::Select => {
                if self.screen == Screen::RepoList {
                    if let Some(route) = self.repo_list.selected_route() {
                        self.navigate(&route.path());
                    }
                }
            }
            Action::Navigate(path) => self.navigate(&path),

            // Repository list
            Action::InputChar(c) => self.repo_list.push_char(c),
            Action::InputText(text) => {
                // Pasted text may carry a trailing newline
                let pasted: String = text.chars().filter(|c| !c.is_control()).collect();
                let input = format!("{}{}", self.repo_list.input, pasted);
                self.repo_list.set_input(input);
            }
            Action::InputBackspace => self.repo_list.backspace(),
            Action::SubmitRepository => {
                if let Some(request) = self.repo_list.begin_add() {
                    self.spawn_lookup(request);
                }
            }
            Action::RepositoryLookedUp { result, generation } => {
                if let Err(e) = self
                    .repo_list
                    .finish_add(generation, result, self.store.as_ref())
                {
                    tracing::debug!(error = %e, "add rejected");
                }
            }

            // Issue browser
            Action::RepositoryLoaded { result, generation } => {
                if let Some(browser) = self.issue_browser.as_mut() {
                    browser.apply_mount(generation, result);
                }
            }
            Action::IssuesLoaded { result, generation } => {
                if let Some(browser) = self.issue_browser.as_mut() {
                    browser.apply_issues(generation, result);
                }
            }
            Action::ChangeFilter(filter) => {
                if let Some(request) = self
                    .issue_browser
                    .as_mut()
                    .and_then(|b| b.change_filter(filter))
                {
                    self.spawn_load_issues(request);
                }
            }
            Action::ChangePage(direction) => {
                if let Some(request) = self
                    .issue_browser
                    .as_mut()
                    .and_then(|b| b.change_page(direction))
                {
                    self.spawn_load_issues(request);
                }
            }
            Action::Reload => {
                if let Some(request) = self.issue_browser.as_mut().map(|b| b.reload()) {
                    self.spawn_mount(request);
                }
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.selected_issue_url() {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Failed to open browser: {}", e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_issue_url() {
                    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone())) {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard error: {}", e)),
                    }
                }
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn selected_issue_url(&self) -> Option<String> {
        self.issue_browser
            .as_ref()?
            .selected_url()
            .map(str::to_string)
    }

    fn navigate(&mut self, path: &str) {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(e) => {
                self.update(e.into());
                return;
            }
        };
        tracing::debug!(%route, "navigate");

        match route {
            Route::RepositoryList => {
                self.screen = Screen::RepoList;
                self.issue_browser = None;
            }
            Route::Repository(name) => {
                let mut browser = IssueBrowserScreen::new(name, self.per_page);
                let request = browser.mount();
                self.issue_browser = Some(browser);
                self.screen = Screen::IssueBrowser;
                self.spawn_mount(request);
            }
        }
    }

    fn spawn_lookup(&self, request: LookupRequest) {
        let tx = self.action_tx.clone();
        let github = Arc::clone(&self.github);
        tokio::spawn(async move {
            let result = github
                .get_repository(&request.name)
                .await
                .map_err(|e| e.to_string());
            tx.send(Action::RepositoryLookedUp {
                result,
                generation: request.generation,
            })
            .ok();
        });
    }

    fn spawn_mount(&self, request: MountRequest) {
        let tx = self.action_tx.clone();
        let github = Arc::clone(&self.github);
        tokio::spawn(async move {
            // Fetch metadata and the first issue page in parallel
            let (repo_result, issues_result) = tokio::join!(
                github.get_repository(&request.repository),
                github.list_issues(&request.issues)
            );

            let result = match (repo_result, issues_result) {
                (Ok(repository), Ok(issues)) => Ok((repository, issues)),
                (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
            };
            tx.send(Action::RepositoryLoaded {
                result,
                generation: request.generation,
            })
            .ok();
        });
    }

    fn spawn_load_issues(&self, request: IssuesRequest) {
        let tx = self.action_tx.clone();
        let github = Arc::clone(&self.github);
        tokio::spawn(async move {
            let result = github
                .list_issues(&request.query)
                .await
                .map_err(|e| e.to_string());
            tx.send(Action::IssuesLoaded {
                result,
                generation: request.generation,
            })
            .ok();
        });
    }
}
