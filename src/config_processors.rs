use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strip one pair of surrounding quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every value and removes a matching pair of `"` or `'` around it.
    /// Values without quotes are kept as they are, so `db_path = ./rooms.db`
    /// and `db_path = "./rooms.db"` read the same.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|value| match strip_quotes(value.trim()) {
            Some(inner) => MapAction::Replace(vec![inner.to_owned()]),
            None => MapAction::Keep,
        })
    }
}

fn strip_quotes(value: &str) -> Option<&str> {
    ['"', '\'']
        .iter()
        .find(|quote| value.len() >= 2 && value.starts_with(**quote) && value.ends_with(**quote))
        .map(|_| &value[1..value.len() - 1])
}
