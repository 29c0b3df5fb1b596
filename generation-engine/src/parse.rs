use murmur_core::ActionIntent;

/// Extract an [`ActionIntent`] from a model response tagged with
/// `[LIKE]`, `[RETWEET]`/`[SHARE]`, `[QUOTE]`, `[REPLY]`. Tags may appear
/// anywhere and in any case; anything untagged decodes as "do nothing",
/// which callers treat as a normal skip.
pub fn parse_action_tags(text: &str) -> ActionIntent {
    let upper = text.to_uppercase();
    ActionIntent {
        like: upper.contains("[LIKE]"),
        share: upper.contains("[RETWEET]") || upper.contains("[SHARE]"),
        quote: upper.contains("[QUOTE]"),
        reply: upper.contains("[REPLY]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_tags() {
        let intent = parse_action_tags("[LIKE] [RETWEET] [QUOTE] [REPLY]");
        assert!(intent.like && intent.share && intent.quote && intent.reply);
    }

    #[test]
    fn test_share_alias() {
        assert!(parse_action_tags("[SHARE]").share);
        assert!(parse_action_tags("[RETWEET]").share);
    }

    #[test]
    fn test_case_insensitive_and_embedded() {
        let intent = parse_action_tags("I would [like] this one.\nMaybe [Reply] too.");
        assert!(intent.like);
        assert!(intent.reply);
        assert!(!intent.quote);
    }

    #[test]
    fn test_untagged_text_means_no_actions() {
        let intent = parse_action_tags("Nothing here is worth engaging with.");
        assert!(intent.is_empty());
    }

    #[test]
    fn test_bare_words_without_brackets_are_ignored() {
        let intent = parse_action_tags("I like replies and quotes in general.");
        assert!(intent.is_empty());
    }
}
