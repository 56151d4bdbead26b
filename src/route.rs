/// Screens reachable from a location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NotFound,
    Profile(String),
}

impl Route {
    /// `/` is home, `/404` is not found, `/<login>` (and anything below it)
    /// is a profile, everything else is not found.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim_start_matches('/');
        if trimmed.is_empty() {
            return Route::Home;
        }

        let segment = trimmed.split('/').next().unwrap_or_default();
        if segment == "404" {
            return Route::NotFound;
        }

        if is_login(segment) {
            Route::Profile(segment.to_string())
        } else {
            Route::NotFound
        }
    }
}

/// A letter followed by one or more word characters or hyphens.
fn is_login(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_alphabetic()
        && segment.len() > 1
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
