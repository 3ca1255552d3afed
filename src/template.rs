use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::value::Value;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{<(\w+)>\}").expect("placeholder pattern is valid"));

/// Substitute `{<name>}` placeholders from a mapping context.
///
/// A placeholder whose name is missing from the context, or any placeholder
/// when the context is not a mapping, is replaced by the bare name.
/// Substituted text is not scanned again.
pub fn render(template: &str, context: &Value) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match context.get(name) {
                Some(value) => value.to_text(),
                None => name.to_string(),
            }
        })
        .into_owned()
}
