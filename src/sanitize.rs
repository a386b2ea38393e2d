//! Filename sanitization.
//!
//! Output paths are built from channel names and AI-generated titles, both of
//! which can contain characters that are unsafe or awkward in filenames. The
//! sanitizer applies a fixed, ordered set of rewrite rules and is idempotent.

use regex::Regex;
use std::sync::OnceLock;

struct SanitizeRules {
    non_printable: Regex,
    underscore: Regex,
    colon: Regex,
    multi_space: Regex,
    invalid: Regex,
}

fn rules() -> &'static SanitizeRules {
    static RULES: OnceLock<SanitizeRules> = OnceLock::new();
    RULES.get_or_init(|| SanitizeRules {
        non_printable: Regex::new(r"[\x00-\x1F\x7F]").expect("valid regex"),
        underscore: Regex::new(r"( *)_( *)").expect("valid regex"),
        colon: Regex::new(r" *: *").expect("valid regex"),
        multi_space: Regex::new(r" +").expect("valid regex"),
        invalid: Regex::new(r"[^\w\- ]").expect("valid regex"),
    })
}

/// Sanitize a string for use as a filename.
///
/// Rules are applied in order: strip control characters, replace underscores
/// with spaces (preserving explicit surrounding spacing), replace colons with
/// `" - "`, drop anything that is not a word character, hyphen or space,
/// collapse whitespace runs, then trim. Dropping invalid characters runs
/// before the whitespace collapse: removing a space-flanked character leaves
/// a double space that the collapse must still see.
///
/// The transform is deterministic and idempotent:
/// `sanitize(sanitize(x)) == sanitize(x)`.
///
/// # Example
///
/// ```
/// use notat::sanitize::sanitize;
/// assert_eq!(sanitize("Hello: World!"), "Hello - World");
/// ```
pub fn sanitize(text: &str) -> String {
    let r = rules();
    let s = r.non_printable.replace_all(text, "");
    let s = r.underscore.replace_all(&s, "$1 $2");
    let s = r.colon.replace_all(&s, " - ");
    let s = r.invalid.replace_all(&s, "");
    let s = r.multi_space.replace_all(&s, " ");
    s.trim().to_string()
}
