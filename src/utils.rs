use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Collapses runs of spaces to a single space.
///
/// Joining wrapped value lines leaves doubled spaces behind; only
/// spaces are collapsed, other whitespace is left alone.
pub(crate) fn collapse_spaces(s: &str) -> String {
    SPACE_RUN_REGEX.replace_all(s, " ").into_owned()
}

/// Title-cases a string: a letter that follows a non-letter is
/// upper-cased, every other letter is lower-cased.
///
/// Exports ship titles in inconsistent casing (all-caps journals,
/// lowercase titles), so the whole string is rewritten rather than
/// only capitalizing word starts.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alphabetic = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }
    out
}

/// Classifies a free-text open-access status into `"gold"`, `"green"`
/// or `""`.
///
/// Hybrid access counts as gold. Anything unrecognized maps to the
/// empty string so the raw export text never leaks downstream.
pub(crate) fn classify_oa(raw: &str) -> &'static str {
    let lower = raw.to_lowercase();
    if lower.contains("gold") || lower.contains("hybrid") {
        "gold"
    } else if lower.contains("green") {
        "green"
    } else {
        ""
    }
}

/// Reduces a given-names string to initials.
///
/// Drops ASCII lowercase letters, periods and spaces while keeping
/// everything else, so hyphen separators and pre-abbreviated names
/// survive: `"Jane Ann"` -> `"JA"`, `"Mary-Jane"` -> `"M-J"`,
/// `"J.J."` -> `"JJ"`, `"John"` -> `"J"`.
pub(crate) fn initials(given: &str) -> String {
    given
        .chars()
        .filter(|c| !c.is_ascii_lowercase() && *c != '.' && *c != ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("a  b", "a b")]
    #[case("a     b  c", "a b c")]
    #[case("no runs here", "no runs here")]
    #[case("", "")]
    fn test_collapse_spaces(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(collapse_spaces(input), expected);
    }

    #[rstest]
    #[case("a study of things", "A Study Of Things")]
    #[case("THE DNA STORY", "The Dna Story")]
    #[case("state-of-the-art methods", "State-Of-The-Art Methods")]
    #[case("o'brien et al", "O'Brien Et Al")]
    #[case("", "")]
    fn test_title_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[rstest]
    #[case("Gold Open Access", "gold")]
    #[case("gold", "gold")]
    #[case("Hybrid Gold", "gold")]
    #[case("hybrid", "gold")]
    #[case("Green Published, Green Submitted", "green")]
    #[case("Bronze", "")]
    #[case("", "")]
    fn test_classify_oa(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(classify_oa(input), expected);
    }

    #[rstest]
    #[case("John", "J")]
    #[case("Jane Ann", "JA")]
    #[case("Mary-Jane", "M-J")]
    #[case("J.J.", "JJ")]
    #[case("Jane Ann Marie", "JAM")]
    #[case("McDonald", "MD")]
    fn test_initials(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(initials(input), expected);
    }
}
