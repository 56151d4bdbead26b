use crate::connection::CursorConnection;
use crate::paginated::PageOutcome;
use crate::profile::Profile;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,
    Select,
    NextTab,
    PrevTab,
    SelectTab(usize),

    // Navigation
    Navigate(String),
    Refresh,

    // Profile
    ProfileLoaded {
        profile: Box<Profile>,
        load_id: u64,
    },
    ProfileFailed {
        message: String,
        load_id: u64,
    },
    OrganizationsLoaded {
        organizations: CursorConnection,
        load_id: u64,
    },

    // Pagination
    LoadMore,
    PageLoaded(PageOutcome),

    // Location prompt
    EnterPrompt,
    ExitPrompt,
    PromptInput(char),
    PromptBackspace,
    PromptConfirm,

    OpenInBrowser,
    YankUrl,

    None,
}
