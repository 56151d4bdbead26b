use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::backend::Backend;
use crate::connection::CursorConnection;
use crate::event::Event;
use crate::location::Location;
use crate::navigator::{Navigator, OrganizationTab, ProfileNavigator, UserTab};
use crate::paginated::PageRequest;
use crate::profile::Profile;
use crate::route::Route;
use crate::types::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    NotFound,
    Profile,
}

pub struct App {
    pub screen: Screen,
    pub location: Location,
    pub profile: Option<Profile>,
    pub navigator: Option<ProfileNavigator>,
    pub list_index: usize,
    /// A profile request is in flight.
    pub loading: bool,
    pub error: Option<String>,
    /// Text of the location prompt while it is open.
    pub prompt: Option<String>,
    pub should_quit: bool,
    start: String,
    load_id: u64,
    backend: Arc<dyn Backend>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        action_tx: mpsc::UnboundedSender<Action>,
        start: impl Into<String>,
    ) -> Self {
        Self {
            screen: Screen::Home,
            location: Location::default(),
            profile: None,
            navigator: None,
            list_index: 0,
            loading: false,
            error: None,
            prompt: None,
            should_quit: false,
            start: start.into(),
            load_id: 0,
            backend,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Navigate(self.start.clone()),
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.prompt.is_some() {
            return match key.code {
                KeyCode::Esc => Action::ExitPrompt,
                KeyCode::Enter => Action::PromptConfirm,
                KeyCode::Backspace => Action::PromptBackspace,
                KeyCode::Char(c) => Action::PromptInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.screen == Screen::Home {
                    Action::Quit
                } else {
                    Action::Back
                }
            }
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Select,
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => Action::NextTab,
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => Action::PrevTab,
            KeyCode::Char(c @ '1'..='9') => Action::SelectTab(c as usize - '1' as usize),
            KeyCode::Char('m') => Action::LoadMore,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char(':') => Action::EnterPrompt,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::ProfileFailed { .. } | Action::None) {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => {
                if self.screen == Screen::Home {
                    self.should_quit = true;
                } else {
                    if !self.location.back() {
                        self.location.navigate("/");
                    }
                    self.route();
                }
            }
            Action::ScrollUp => {
                self.list_index = self.list_index.saturating_sub(1);
            }
            Action::ScrollDown => {
                if self.list_index + 1 < self.item_count() {
                    self.list_index += 1;
                } else {
                    // Moving past the last item asks for the next page.
                    self.load_more();
                }
            }
            Action::GoToTop => {
                self.list_index = 0;
            }
            Action::GoToBottom => {
                self.list_index = self.item_count().saturating_sub(1);
            }
            Action::Select => {
                let href = match self.selected_entry() {
                    Some(Entry::Person(person)) if !person.login.is_empty() => {
                        format!("/{}", person.login)
                    }
                    _ => return,
                };
                self.update(Action::Navigate(href));
            }
            Action::NextTab => {
                if let Some(nav) = &self.navigator {
                    let next = (nav.tab_index() + 1) % nav.tab_count();
                    self.select_tab(next);
                }
            }
            Action::PrevTab => {
                if let Some(nav) = &self.navigator {
                    let count = nav.tab_count();
                    let prev = (nav.tab_index() + count - 1) % count;
                    self.select_tab(prev);
                }
            }
            Action::SelectTab(index) => {
                self.select_tab(index);
            }

            Action::Navigate(href) => {
                self.location.navigate(&href);
                self.route();
            }
            Action::Refresh => {
                if let Route::Profile(login) = Route::parse(self.location.path()) {
                    self.load_profile(login);
                }
            }

            Action::ProfileLoaded { profile, load_id } => {
                if load_id != self.load_id {
                    tracing::debug!(load_id, current = self.load_id, "dropping stale profile");
                    return;
                }
                self.loading = false;
                self.show_profile(*profile);
            }
            Action::ProfileFailed { message, load_id } => {
                if load_id != self.load_id {
                    tracing::debug!(load_id, current = self.load_id, "dropping stale profile error");
                    return;
                }
                self.loading = false;
                self.error = Some(message);
            }
            Action::OrganizationsLoaded {
                organizations,
                load_id,
            } => {
                if load_id != self.load_id {
                    return;
                }
                if let Some(Profile::User(user)) = &mut self.profile {
                    user.organizations = Some(organizations);
                }
            }

            Action::LoadMore => {
                self.load_more();
            }
            Action::PageLoaded(outcome) => {
                if let Some(nav) = &mut self.navigator {
                    if nav.apply(outcome) {
                        let last = self.item_count().saturating_sub(1);
                        self.list_index = self.list_index.min(last);
                    }
                }
            }

            Action::EnterPrompt => {
                self.prompt = Some(self.location.href());
            }
            Action::ExitPrompt => {
                self.prompt = None;
            }
            Action::PromptInput(c) => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.push(c);
                }
            }
            Action::PromptBackspace => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.pop();
                }
            }
            Action::PromptConfirm => {
                if let Some(input) = self.prompt.take() {
                    let input = input.trim();
                    if !input.is_empty() {
                        self.update(Action::Navigate(input.to_string()));
                    }
                }
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Failed to open {}: {}", url, e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(url));
                    if let Err(e) = copied {
                        self.error = Some(format!("Failed to copy URL: {}", e));
                    }
                }
            }

            Action::None => {}
        }
    }

    /// Entries of the active tab, in server order.
    pub fn entries(&self) -> &[Entry] {
        self.navigator
            .as_ref()
            .map(ProfileNavigator::entries)
            .unwrap_or_default()
    }

    fn item_count(&self) -> usize {
        self.navigator
            .as_ref()
            .and_then(|nav| nav.paginator().data())
            .map_or(0, CursorConnection::len)
    }

    fn selected_entry(&self) -> Option<&Entry> {
        self.entries().get(self.list_index)
    }

    fn selected_url(&self) -> Option<String> {
        self.selected_entry()
            .and_then(|entry| {
                tracing::debug!(id = entry.id(), "selected entry");
                entry.url().map(str::to_string)
            })
            .or_else(|| self.profile.as_ref()?.url().map(str::to_string))
    }

    fn route(&mut self) {
        match Route::parse(self.location.path()) {
            Route::Home => self.leave_profile(Screen::Home),
            Route::NotFound => self.leave_profile(Screen::NotFound),
            Route::Profile(login) => {
                let on_screen =
                    self.profile.as_ref().and_then(Profile::login) == Some(login.as_str());
                if on_screen {
                    if let Some(nav) = &mut self.navigator {
                        self.screen = Screen::Profile;
                        if let Some(request) = nav.sync(&mut self.location) {
                            self.list_index = 0;
                            self.spawn_page(request);
                        }
                        return;
                    }
                }
                self.load_profile(login);
            }
        }
    }

    fn leave_profile(&mut self, screen: Screen) {
        self.screen = screen;
        self.profile = None;
        self.navigator = None;
        self.list_index = 0;
        self.loading = false;
        // Any profile request still in flight is now stale.
        self.load_id += 1;
    }

    fn load_profile(&mut self, login: String) {
        self.leave_profile(Screen::Profile);
        self.loading = true;

        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        let load_id = self.load_id;
        tokio::spawn(async move {
            let profile = match backend.profile(&login).await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::error!(%login, error = %e, "failed to load profile");
                    tx.send(Action::ProfileFailed {
                        message: e.to_string(),
                        load_id,
                    })
                    .ok();
                    return;
                }
            };

            let is_user = matches!(profile, Profile::User(_));
            tx.send(Action::ProfileLoaded {
                profile: Box::new(profile),
                load_id,
            })
            .ok();

            if is_user {
                match backend.organizations(&login).await {
                    Ok(organizations) => {
                        tx.send(Action::OrganizationsLoaded {
                            organizations,
                            load_id,
                        })
                        .ok();
                    }
                    Err(e) => {
                        tracing::error!(%login, error = %e, "failed to load organizations");
                    }
                }
            }
        });
    }

    fn show_profile(&mut self, profile: Profile) {
        let endpoint = self.backend.endpoint();
        let (navigator, request) = match &profile {
            Profile::User(user) => {
                let (nav, request) =
                    Navigator::<UserTab>::mount(endpoint, &user.login, &mut self.location);
                (ProfileNavigator::User(nav), request)
            }
            Profile::Organization(org) => {
                let (nav, request) =
                    Navigator::<OrganizationTab>::mount(endpoint, &org.login, &mut self.location);
                (ProfileNavigator::Organization(nav), request)
            }
            Profile::NotFound => {
                self.screen = Screen::NotFound;
                self.profile = None;
                self.navigator = None;
                return;
            }
        };

        self.screen = Screen::Profile;
        self.profile = Some(profile);
        self.navigator = Some(navigator);
        self.list_index = 0;
        self.spawn_page(request);
    }

    fn select_tab(&mut self, index: usize) {
        if let Some(nav) = &mut self.navigator {
            if let Some(request) = nav.select(index, &mut self.location) {
                self.list_index = 0;
                self.spawn_page(request);
            }
        }
    }

    fn load_more(&mut self) {
        let Some(nav) = &mut self.navigator else {
            return;
        };
        if !nav.paginator().has_next_page() {
            return;
        }
        if let Some(request) = nav.load_more(&mut self.location) {
            self.spawn_page(request);
        }
    }

    fn spawn_page(&self, request: PageRequest) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let result = backend.page(&request.url).await.map_err(|e| e.to_string());
            tx.send(Action::PageLoaded(request.complete(result))).ok();
        });
    }
}
