use std::fmt;

/// Ordered query string parameters with `URLSearchParams`-like semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();

        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, replacing every previous occurrence, or delete
    /// it when `value` is `None`.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        let Some(value) = value else {
            self.pairs.retain(|(k, _)| k != key);
            return;
        };

        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value.to_string();
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw)
}

/// Oldest history entries are dropped past this many.
pub const HISTORY_LIMIT: usize = 100;

/// The app's address bar: a path, its query, and the history of the most
/// recent addresses that were pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: SearchParams,
    history: Vec<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/")
    }
}

impl Location {
    /// Accepts `login`, `/login` and `/login?tab=..&after=..`.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (path, query) = input.split_once('?').unwrap_or((input, ""));
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Self {
            path,
            query: SearchParams::parse(query),
            history: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &SearchParams {
        &self.query
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key)
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Record the current address in history.
    pub fn push(&mut self) {
        self.history.push(self.href());
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    /// Set (or delete, with `None`) a query parameter and push the result.
    /// Writing the value a parameter already has pushes nothing.
    pub fn set_param(&mut self, key: &str, value: Option<&str>) {
        if self.query.get(key) == value {
            return;
        }
        self.query.set(key, value);
        self.push();
    }

    /// Move to a new address, keeping history.
    pub fn navigate(&mut self, input: &str) {
        let next = Location::parse(input);
        self.path = next.path;
        self.query = next.query;
        self.push();
    }

    /// Step back to the most recent address whose path differs from the
    /// current one. Returns false when there is none.
    pub fn back(&mut self) -> bool {
        let current = self.path.clone();
        while let Some(href) = self.history.pop() {
            let previous = Location::parse(&href);
            if previous.path != current {
                self.path = previous.path;
                self.query = previous.query;
                self.push();
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_query_pairs() {
        let params = SearchParams::parse("?tab=starredRepositories&after=abc");
        assert_eq!(params.get("tab"), Some("starredRepositories"));
        assert_eq!(params.get("after"), Some("abc"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn parse_decodes_values() {
        let params = SearchParams::parse("after=YWJj%3D%3D&q=a+b&flag");
        assert_eq!(params.get("after"), Some("YWJj=="));
        assert_eq!(params.get("q"), Some("a b"));
        assert_eq!(params.get("flag"), Some(""));
    }

    #[test]
    fn set_replaces_and_deletes() {
        let mut params = SearchParams::parse("tab=a&after=x&tab=b");
        params.set("tab", Some("followers"));
        assert_eq!(params.to_string(), "tab=followers&after=x");

        params.set("after", None);
        assert_eq!(params.to_string(), "tab=followers");

        params.set("after", Some("YWJj=="));
        assert_eq!(params.to_string(), "tab=followers&after=YWJj%3D%3D");
    }

    #[test]
    fn location_accepts_bare_login() {
        let location = Location::parse("belchior?tab=followers");
        assert_eq!(location.path(), "/belchior");
        assert_eq!(location.param("tab"), Some("followers"));
        assert_eq!(location.href(), "/belchior?tab=followers");
        assert_eq!(Location::default().href(), "/");
    }

    #[test]
    fn set_param_pushes_history_once_per_change() {
        let mut location = Location::parse("/belchior");
        location.set_param("tab", Some("followers"));
        location.set_param("tab", Some("followers"));
        location.set_param("after", None);
        location.set_param("after", Some("abc"));
        assert_eq!(
            location.history(),
            &[
                "/belchior?tab=followers".to_string(),
                "/belchior?tab=followers&after=abc".to_string(),
            ]
        );
    }

    #[test]
    fn history_keeps_most_recent_entries() {
        let mut location = Location::parse("/belchior");
        for page in 0..HISTORY_LIMIT + 20 {
            location.set_param("after", Some(&page.to_string()));
        }

        let history = location.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0], "/belchior?after=20");
        assert_eq!(
            history.last().map(String::as_str),
            Some(format!("/belchior?after={}", HISTORY_LIMIT + 19).as_str())
        );
    }

    #[test]
    fn back_skips_entries_of_the_current_path() {
        let mut location = Location::default();
        location.navigate("/");
        location.navigate("/tc39?tab=people");
        location.navigate("/belchior");
        location.set_param("tab", Some("followers"));

        assert!(location.back());
        assert_eq!(location.href(), "/tc39?tab=people");

        assert!(location.back());
        assert_eq!(location.href(), "/");

        assert!(!location.back());
    }
}
