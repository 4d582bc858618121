use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY-MM-DD_` followed by at least one more character
static RE_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^[0-9]{4}-[0-9]{2}-[0-9]{2}_(.+)$").unwrap());

static RE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Clean a name before handing it to tmux as a session name.
///
/// Drops a leading date stamp, then folds every run of non-alphanumerics
/// into a single `_`.
pub fn sanitize(name: &str) -> String {
    let stripped = match RE_DATE_PREFIX.captures(name) {
        Some(caps) => caps.get(1).map_or(name, |m| m.as_str()),
        None => name,
    };
    RE_SEPARATORS.replace_all(stripped, "_").into_owned()
}
