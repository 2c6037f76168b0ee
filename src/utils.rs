//! # Utility Functions Module
//!
//! Helpers that keep external command lines readable.

/// Converts any iterable of string-like items into `Vec<String>`.
///
/// # Example
/// ```rust
/// use style_transfer_studio::utils::to_string_vec;
///
/// let args = to_string_vec(["eval", "--cuda", "0"]);
/// assert_eq!(args, vec!["eval", "--cuda", "0"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from mixed `Display` items.
///
/// # Example
/// ```rust
/// use style_transfer_studio::args;
///
/// let cuda = 0;
/// let args = args!["eval", "--cuda", cuda];
/// assert_eq!(args, vec!["eval", "--cuda", "0"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item.to_string()),*])
    };
}
