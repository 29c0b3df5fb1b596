//! Pure text transforms enforcing the platform length budget. All limits
//! count characters, not bytes, so multi-byte text never splits inside a
//! code point.

const ELLIPSIS: &str = "...";

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Replace literal `\n` escapes that generation engines tend to emit and
/// trim surrounding whitespace.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\\n", "\n").trim().to_string()
}

/// Fit `text` into `limit` characters. Fallback order is the contract:
/// a sentence-terminated prefix beats a whitespace-bounded prefix with an
/// ellipsis, which beats a hard cut with an ellipsis.
pub fn truncate_to_limit(text: &str, limit: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return text.to_string();
    }
    if limit <= ELLIPSIS.len() {
        return chars[..limit].iter().collect();
    }

    // Longest prefix ending at a sentence terminator within the limit.
    let window = &chars[..limit];
    if let Some(idx) = window.iter().rposition(|c| is_sentence_end(*c)) {
        let cut: String = chars[..=idx].iter().collect();
        let cut = cut.trim();
        if !cut.is_empty() {
            return cut.to_string();
        }
    }

    // Longest whitespace-bounded prefix, leaving room for the ellipsis.
    let room = limit - ELLIPSIS.len();
    let head = &chars[..room];
    if let Some(idx) = head.iter().rposition(|c| c.is_whitespace()) {
        let cut: String = chars[..idx].iter().collect();
        let cut = cut.trim_end();
        if !cut.is_empty() {
            return format!("{cut}{ELLIPSIS}");
        }
    }

    let hard: String = chars[..room].iter().collect();
    format!("{}{ELLIPSIS}", hard.trim_end())
}

/// Split `text` into ordered chunks of at most `limit` characters.
/// Paragraphs (blank-line separated) pack greedily; a paragraph that
/// alone exceeds the limit is split on sentences, an oversized sentence
/// on words, and an oversized word is hard-cut as the last resort.
pub fn split_into_chunks(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let candidate = joined(&current, "\n\n", paragraph);
        if char_len(&candidate) <= limit {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if char_len(paragraph) <= limit {
            current = paragraph.to_string();
        } else {
            let mut pieces = split_paragraph(paragraph, limit);
            // Keep the tail open so a following short paragraph can pack
            // onto it.
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current = last;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_paragraph(paragraph: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(paragraph) {
        let candidate = joined(&current, " ", &sentence);
        if char_len(&candidate) <= limit {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if char_len(&sentence) <= limit {
            current = sentence;
        } else {
            pack_words(&sentence, limit, &mut chunks, &mut current);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn pack_words(sentence: &str, limit: usize, chunks: &mut Vec<String>, current: &mut String) {
    for word in sentence.split_whitespace() {
        let candidate = joined(current, " ", word);
        if char_len(&candidate) <= limit {
            *current = candidate;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(current));
        }
        if char_len(word) <= limit {
            *current = word.to_string();
        } else {
            // Single word longer than the whole budget: hard-cut it.
            let mut remaining: Vec<char> = word.chars().collect();
            while remaining.len() > limit {
                chunks.push(remaining[..limit].iter().collect());
                remaining.drain(..limit);
            }
            *current = remaining.into_iter().collect();
        }
    }
}

/// Sentences keep their terminators; a trailing fragment without one is
/// still a sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminator = false;

    for c in text.chars() {
        let terminator = is_sentence_end(c);
        if in_terminator && !terminator {
            let done = current.trim();
            if !done.is_empty() {
                sentences.push(done.to_string());
            }
            current.clear();
            in_terminator = false;
        }
        current.push(c);
        if terminator {
            in_terminator = true;
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn joined(current: &str, separator: &str, next: &str) -> String {
    if current.is_empty() {
        next.to_string()
    } else {
        format!("{current}{separator}{next}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_to_limit("hello", 280), "hello");
        assert_eq!(truncate_to_limit("", 10), "");
    }

    #[test]
    fn test_sentence_boundary_beats_hard_cut() {
        // Longest sentence-bounded prefix within 5 characters.
        assert_eq!(truncate_to_limit("A. B. C.", 5), "A. B.");
    }

    #[test]
    fn test_word_boundary_fallback_appends_ellipsis() {
        let result = truncate_to_limit("hello there my friend", 12);
        assert!(result.ends_with("..."));
        assert!(char_len(&result) <= 12);
        assert!(result.starts_with("hello"));
    }

    #[test]
    fn test_hard_cut_when_no_boundaries() {
        let result = truncate_to_limit("abcdefghijklmnop", 10);
        assert_eq!(result, "abcdefg...");
        assert_eq!(char_len(&result), 10);
    }

    #[test]
    fn test_result_never_exceeds_limit() {
        let samples = [
            "One sentence. Another one! And a question? Plus a trailing fragment",
            "nowhitespaceatallinthisverylongsinglewordinput",
            "short",
            "Multi byte: ééééé ûûûûû ööööö ададад 你好你好你好",
        ];
        for text in samples {
            for limit in [4, 10, 20, 40, 280] {
                let result = truncate_to_limit(text, limit);
                assert!(
                    char_len(&result) <= limit,
                    "{result:?} exceeds {limit} for input {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // Five two-byte chars fit a limit of five exactly.
        assert_eq!(truncate_to_limit("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_split_packs_paragraphs_greedily() {
        let text = "first para\n\nsecond para\n\nthird para";
        let chunks = split_into_chunks(text, 25);
        assert_eq!(chunks, vec!["first para\n\nsecond para", "third para"]);
    }

    #[test]
    fn test_split_preserves_order_and_limit() {
        let text = "Alpha sentence one. Alpha sentence two.\n\nBeta paragraph here.\n\nGamma closing thought.";
        for limit in [20, 30, 50, 120] {
            let chunks = split_into_chunks(text, limit);
            for chunk in &chunks {
                assert!(char_len(chunk) <= limit, "{chunk:?} exceeds {limit}");
            }
            let rejoined = chunks.join(" ");
            let alpha = rejoined.find("Alpha").unwrap();
            let beta = rejoined.find("Beta").unwrap();
            let gamma = rejoined.find("Gamma").unwrap();
            assert!(alpha < beta && beta < gamma);
        }
    }

    #[test]
    fn test_oversized_paragraph_splits_on_sentences() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let chunks = split_into_chunks(text, 25);
        assert!(chunks.len() >= 3);
        assert!(chunks[0].starts_with("First"));
        assert!(chunks.iter().all(|c| char_len(c) <= 25));
    }

    #[test]
    fn test_oversized_word_is_hard_cut() {
        let chunks = split_into_chunks("abcdefghijklmnopqrstuvwxyz", 10);
        assert!(chunks.iter().all(|c| char_len(c) <= 10));
        assert_eq!(chunks.concat(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn test_sentence_splitter_keeps_terminators() {
        let sentences = split_sentences("One. Two! Three? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("  a\\nb  "), "a\nb");
    }
}
