use once_cell::sync::Lazy;
use regex::Regex;

const WORDS_PER_MINUTE: usize = 200;

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern compiles"));

/// Builds a URL slug from a post title.
///
/// The title is lower-cased, each run of characters outside `[a-z0-9]`
/// becomes one hyphen, and edge hyphens are trimmed. Titles without any
/// ASCII alphanumerics yield an empty slug.
pub fn derive_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Reading time in whole minutes at 200 words per minute, rounded up.
pub fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    i32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation_runs() {
        assert_eq!(derive_slug("Getting Started: Next.js 14!"), "getting-started-next-js-14");
        assert_eq!(derive_slug("  --Hello,   World--  "), "hello-world");
        assert_eq!(derive_slug("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slug_drops_non_ascii_letters() {
        assert_eq!(derive_slug("Café Déjà Vu"), "caf-d-j-vu");
        assert_eq!(derive_slug("!!!"), "");
    }

    #[test]
    fn read_time_rounds_up_per_200_words() {
        let words = |n: usize| vec!["word"; n].join(" ");
        assert_eq!(estimate_read_time(&words(1)), 1);
        assert_eq!(estimate_read_time(&words(200)), 1);
        assert_eq!(estimate_read_time(&words(400)), 2);
        assert_eq!(estimate_read_time(&words(401)), 3);
    }

    #[test]
    fn read_time_splits_on_any_whitespace() {
        let content = "one\ttwo\nthree   four\r\nfive";
        assert_eq!(content.split_whitespace().count(), 5);
        assert_eq!(estimate_read_time(content), 1);
        assert_eq!(estimate_read_time("   "), 0);
    }
}
