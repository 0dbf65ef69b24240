//! Page title encoding and URL template substitution.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The substitution point in URL templates.
pub(crate) const PLACEHOLDER: &str = "%s";

/// The characters of an article title which are percent-encoded. Everything
/// except ASCII alphanumerics and `-._*`, matching form encoding of a path
/// component.
const TITLE_ALPHABET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Encodes a page title for use in an article URL: spaces become underscores
/// and the result is percent-encoded.
pub(crate) fn encode_title(title: &str) -> String {
    utf8_percent_encode(&title.replace(' ', "_"), TITLE_ALPHABET).to_string()
}

/// Counts the substitution points in `template`.
#[inline]
pub(crate) fn placeholders(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}

/// Substitutes `value` into the single placeholder of `template`. Returns
/// `None` if the template does not have exactly one placeholder.
pub(crate) fn substitute(template: &str, value: &str) -> Option<String> {
    (placeholders(template) == 1).then(|| template.replacen(PLACEHOLDER, value, 1))
}
