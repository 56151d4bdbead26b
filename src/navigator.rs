use std::fmt::Debug;
use std::marker::PhantomData;

use crate::connection::edges_to_items;
use crate::location::Location;
use crate::paginated::{PageOutcome, PageRequest, Paginator, AFTER};
use crate::types::{Entry, ItemKind};

pub const TAB: &str = "tab";

/// A fixed, ordered set of profile tabs.
pub trait TabSet: Copy + Eq + Debug + 'static {
    const ALL: &'static [Self];
    /// Owner segment of the collection URLs (`user`, `organization`).
    const SCOPE: &'static str;

    /// Name used in the `tab` query parameter.
    fn name(self) -> &'static str;
    fn label(self) -> &'static str;
    fn item_kind(self) -> ItemKind;

    /// Collection path segment on the backend.
    fn resource(self) -> &'static str {
        self.name()
    }

    /// Index of the tab called `name`, defaulting to the first tab.
    fn index_of(name: Option<&str>) -> usize {
        name.and_then(|name| Self::ALL.iter().position(|tab| tab.name() == name))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTab {
    Repositories,
    StarredRepositories,
    Followers,
    Following,
}

impl TabSet for UserTab {
    const ALL: &'static [Self] = &[
        UserTab::Repositories,
        UserTab::StarredRepositories,
        UserTab::Followers,
        UserTab::Following,
    ];
    const SCOPE: &'static str = "user";

    fn name(self) -> &'static str {
        match self {
            UserTab::Repositories => "repositories",
            UserTab::StarredRepositories => "starredRepositories",
            UserTab::Followers => "followers",
            UserTab::Following => "following",
        }
    }

    fn label(self) -> &'static str {
        match self {
            UserTab::Repositories => "Repositories",
            UserTab::StarredRepositories => "Stars",
            UserTab::Followers => "Followers",
            UserTab::Following => "Following",
        }
    }

    fn item_kind(self) -> ItemKind {
        match self {
            UserTab::Repositories | UserTab::StarredRepositories => ItemKind::Repository,
            UserTab::Followers | UserTab::Following => ItemKind::Person,
        }
    }

    fn resource(self) -> &'static str {
        match self {
            UserTab::StarredRepositories => "starred-repositories",
            other => other.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationTab {
    Repositories,
    People,
}

impl TabSet for OrganizationTab {
    const ALL: &'static [Self] = &[OrganizationTab::Repositories, OrganizationTab::People];
    const SCOPE: &'static str = "organization";

    fn name(self) -> &'static str {
        match self {
            OrganizationTab::Repositories => "repositories",
            OrganizationTab::People => "people",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OrganizationTab::Repositories => "Repositories",
            OrganizationTab::People => "People",
        }
    }

    fn item_kind(self) -> ItemKind {
        match self {
            OrganizationTab::Repositories => ItemKind::Repository,
            OrganizationTab::People => ItemKind::Person,
        }
    }
}

/// Keeps the active tab in sync with the `tab` query parameter and owns the
/// paginator of the collection behind it.
#[derive(Debug)]
pub struct Navigator<T: TabSet> {
    owner_url: String,
    tab_index: usize,
    paginator: Paginator,
    /// Decoded items of the paginator's data, rebuilt when a page lands.
    entries: Vec<Entry>,
    _tabs: PhantomData<T>,
}

impl<T: TabSet> Navigator<T> {
    /// Resolve the active tab from `location`, write its name back and issue
    /// the first page request.
    pub fn mount(endpoint: &str, login: &str, location: &mut Location) -> (Self, PageRequest) {
        let owner_url = format!("{}/{}/{}", endpoint.trim_end_matches('/'), T::SCOPE, login);
        let tab_index = T::index_of(location.param(TAB));
        location.set_param(TAB, Some(T::ALL[tab_index].name()));

        let mut paginator = Paginator::new(collection_url(&owner_url, T::ALL[tab_index]));
        let request = paginator.initial_request(location.query());

        let navigator = Self {
            owner_url,
            tab_index,
            paginator,
            entries: Vec::new(),
            _tabs: PhantomData,
        };
        (navigator, request)
    }

    pub fn tab_index(&self) -> usize {
        self.tab_index
    }

    pub fn tab(&self) -> T {
        T::ALL[self.tab_index]
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Switch to tab `index`. State is reset before anything else happens,
    /// so nothing of the previous tab is shown while the new one loads.
    /// Out of range indexes and the active tab are ignored.
    pub fn select(&mut self, index: usize, location: &mut Location) -> Option<PageRequest> {
        if index >= T::ALL.len() || index == self.tab_index {
            return None;
        }

        let tab = T::ALL[index];
        self.paginator = Paginator::new(collection_url(&self.owner_url, tab));
        self.entries.clear();
        location.set_param(AFTER, None);
        location.set_param(TAB, Some(tab.name()));
        self.tab_index = index;

        Some(self.paginator.initial_request(location.query()))
    }

    /// Follow an externally changed location: another `tab` switches tabs
    /// keeping the given cursor, another `after` refetches the current tab.
    pub fn sync(&mut self, location: &mut Location) -> Option<PageRequest> {
        let index = T::index_of(location.param(TAB));
        location.set_param(TAB, Some(T::ALL[index].name()));

        if index == self.tab_index && !self.paginator.is_stale(location.query()) {
            return None;
        }

        self.tab_index = index;
        self.paginator = Paginator::new(collection_url(&self.owner_url, T::ALL[index]));
        self.entries.clear();
        Some(self.paginator.initial_request(location.query()))
    }

    pub fn load_more(&mut self, location: &mut Location) -> Option<PageRequest> {
        self.paginator.load_more(location)
    }

    pub fn apply(&mut self, outcome: PageOutcome) -> bool {
        if !self.paginator.apply(outcome) {
            return false;
        }
        let kind = self.tab().item_kind();
        self.entries = edges_to_items(self.paginator.data())
            .into_iter()
            .map(|node| Entry::from_node(kind, node))
            .collect();
        true
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

fn collection_url<T: TabSet>(owner_url: &str, tab: T) -> String {
    format!("{}/{}", owner_url, tab.resource())
}

/// The navigator of whichever kind of profile is on screen.
#[derive(Debug)]
pub enum ProfileNavigator {
    User(Navigator<UserTab>),
    Organization(Navigator<OrganizationTab>),
}

macro_rules! delegate {
    ($self:ident, $nav:ident => $body:expr) => {
        match $self {
            ProfileNavigator::User($nav) => $body,
            ProfileNavigator::Organization($nav) => $body,
        }
    };
}

impl ProfileNavigator {
    pub fn tab_count(&self) -> usize {
        match self {
            ProfileNavigator::User(_) => UserTab::ALL.len(),
            ProfileNavigator::Organization(_) => OrganizationTab::ALL.len(),
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        match self {
            ProfileNavigator::User(_) => UserTab::ALL.iter().map(|t| t.label()).collect(),
            ProfileNavigator::Organization(_) => {
                OrganizationTab::ALL.iter().map(|t| t.label()).collect()
            }
        }
    }

    pub fn tab_index(&self) -> usize {
        delegate!(self, nav => nav.tab_index())
    }

    pub fn item_kind(&self) -> ItemKind {
        delegate!(self, nav => nav.tab().item_kind())
    }

    pub fn paginator(&self) -> &Paginator {
        delegate!(self, nav => nav.paginator())
    }

    pub fn entries(&self) -> &[Entry] {
        delegate!(self, nav => nav.entries())
    }

    pub fn select(&mut self, index: usize, location: &mut Location) -> Option<PageRequest> {
        delegate!(self, nav => nav.select(index, location))
    }

    pub fn sync(&mut self, location: &mut Location) -> Option<PageRequest> {
        delegate!(self, nav => nav.sync(location))
    }

    pub fn load_more(&mut self, location: &mut Location) -> Option<PageRequest> {
        delegate!(self, nav => nav.load_more(location))
    }

    pub fn apply(&mut self, outcome: PageOutcome) -> bool {
        delegate!(self, nav => nav.apply(outcome))
    }
}
