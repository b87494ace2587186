/// A student name split over the two display lines of the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameLines {
    pub first_line: String,
    pub second_line: String,
}

impl NameLines {
    pub fn has_second_line(&self) -> bool {
        !self.second_line.is_empty()
    }
}

/// Splits a free-form name by word count, uppercased for display.
///
/// One word stays alone on the first line; two words take a line each; with
/// three, the first word leads and the other two share the second line; with
/// four or more, the first two words lead and the rest follow. Order is kept
/// and no attempt is made to tell given names from surnames.
pub fn segment_name(raw: &str) -> NameLines {
    let words: Vec<String> = raw.split_whitespace().map(str::to_uppercase).collect();
    let split = match words.len() {
        0 => return NameLines::default(),
        1..=3 => 1,
        _ => 2,
    };
    NameLines {
        first_line: words[..split].join(" "),
        second_line: words[split..].join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(first: &str, second: &str) -> NameLines {
        NameLines {
            first_line: first.to_string(),
            second_line: second.to_string(),
        }
    }

    #[test]
    fn single_word_has_no_second_line() {
        let out = segment_name("madonna");
        assert_eq!(out, lines("MADONNA", ""));
        assert!(!out.has_second_line());
    }

    #[test]
    fn two_words_take_a_line_each() {
        assert_eq!(segment_name("Juan Pablo"), lines("JUAN", "PABLO"));
    }

    #[test]
    fn three_words_keep_surnames_together() {
        let out = segment_name("Ana María López");
        assert_eq!(out, lines("ANA", "MARÍA LÓPEZ"));
        assert_eq!(out.second_line.split(' ').count(), 2);
    }

    #[test]
    fn four_or_more_words_lead_with_two() {
        assert_eq!(
            segment_name("Barbara Andrea Arias Buroz"),
            lines("BARBARA ANDREA", "ARIAS BUROZ")
        );
        let out = segment_name("a b c d e f");
        assert_eq!(out, lines("A B", "C D E F"));
        assert_eq!(out.first_line.split(' ').count(), 2);
    }

    #[test]
    fn whitespace_is_trimmed_and_collapsed() {
        assert_eq!(
            segment_name("  juan \t  pablo\n"),
            lines("JUAN", "PABLO")
        );
    }

    #[test]
    fn token_count_policy_holds_for_every_length() {
        for n in 1..=8 {
            let raw = (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
            let out = segment_name(&raw);
            assert!(!out.first_line.is_empty());
            let first = out.first_line.split(' ').count();
            let second = if out.second_line.is_empty() {
                0
            } else {
                out.second_line.split(' ').count()
            };
            assert_eq!(first + second, n);
            match n {
                1 => assert_eq!(second, 0),
                2 | 3 => assert_eq!((first, second), (1, n - 1)),
                _ => assert_eq!(first, 2),
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_lines() {
        assert_eq!(segment_name("   "), NameLines::default());
    }
}
