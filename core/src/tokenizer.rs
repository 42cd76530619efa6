use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"\p{P}").expect("valid regex");
    // ZWNJ (U+200C) joins the parts of one Persian word, e.g. the prefix of می‌روم.
    static ref WORD: Regex =
        Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}\p{M}]*(?:['_\x{200C}][\p{L}\p{N}\p{M}]+)*")
            .expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<String> = {
        let english: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        let persian: &[&str] = &[
            "و","در","به","از","که","این","را","با","است","برای","آن","یک","تا","هم","بر","می","نمی",
            "شود","شده","شد","کرد","کرده","کند","کنند","بود","باشد","خود","نیز","اما","یا","باید","هر",
            "پس","اگر","همه","دیگر","او","ما","من","تو","شما","آنها","ایشان","چه","چون","بی","نه",
            "ها","های","هایی","ای","اند","ایم","دارد","داشت","وی","آنکه","همین","همان","چنین","روی",
            "زیرا","سپس","بین","پیش","بعد","قبل","طی","درباره","مانند","بدون","نیست","هست","شوند",
        ];
        // Normalized forms too, so matching works whether or not normalization ran.
        english
            .iter()
            .chain(persian)
            .flat_map(|w| [w.to_string(), normalize(w)])
            .collect()
    };
}

/// Switches for each stage of the normalization pipeline.
///
/// The same options must be used for the corpus and for queries, which is why
/// they are persisted alongside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    pub remove_punctuation: bool,
    pub normalize_text: bool,
    /// Stop words are dropped unless this is set.
    pub keep_stop_words: bool,
    pub lemmatize: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            remove_punctuation: true,
            normalize_text: true,
            keep_stop_words: false,
            lemmatize: true,
        }
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Arabic code points that Persian text commonly uses in place of the Persian ones.
fn persian_letter(c: char) -> char {
    match c {
        '\u{0643}' => '\u{06A9}',              // ك -> ک
        '\u{064A}' | '\u{0649}' => '\u{06CC}', // ي ى -> ی
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
        _ => c,
    }
}

fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(persian_letter)
        .collect::<String>()
        .to_lowercase()
}

/// Turn raw text into the ordered sequence of normalized terms the index works on.
///
/// Stages run in a fixed order: punctuation removal, NFKD + diacritic stripping +
/// Arabic-to-Persian letters and digits + lowercasing, word splitting, stop word
/// removal (English and Persian), English stemming.
pub fn normalize_and_tokenize(text: &str, options: &TokenizerOptions) -> Vec<String> {
    let mut text = if options.remove_punctuation {
        PUNCT.replace_all(text, "").into_owned()
    } else {
        text.to_owned()
    };
    if options.normalize_text {
        text = normalize(&text);
    }

    let mut tokens = Vec::new();
    for mat in WORD.find_iter(&text) {
        let token = mat.as_str();
        if !options.keep_stop_words && is_stopword(token) { continue; }
        if options.lemmatize {
            tokens.push(STEMMER.stem(token).into_owned());
        } else {
            tokens.push(token.to_owned());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = normalize_and_tokenize("Running, runner's run!", &TokenizerOptions::default());
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn punctuation_is_removed_before_splitting() {
        let opts = TokenizerOptions { lemmatize: false, ..Default::default() };
        assert_eq!(normalize_and_tokenize("e-mail", &opts), vec!["email"]);

        let keep = TokenizerOptions { remove_punctuation: false, ..opts };
        assert_eq!(normalize_and_tokenize("e-mail", &keep), vec!["e", "mail"]);
    }

    #[test]
    fn zwnj_stays_inside_a_word() {
        let t = normalize_and_tokenize("می\u{200c}روم", &TokenizerOptions::default());
        assert_eq!(t, vec!["می\u{200c}روم"]);
    }

    #[test]
    fn arabic_letters_fold_to_persian() {
        let opts = TokenizerOptions::default();
        let arabic = normalize_and_tokenize("كتابي", &opts);
        assert_eq!(arabic, normalize_and_tokenize("کتابی", &opts));
        assert_eq!(normalize_and_tokenize("۱۴۰۲", &opts), vec!["1402"]);
    }

    #[test]
    fn persian_stop_words_are_dropped() {
        let opts = TokenizerOptions::default();
        assert_eq!(normalize_and_tokenize("کتاب از و به", &opts), vec!["کتاب"]);
        assert_eq!(normalize_and_tokenize("آن کتاب", &opts), vec!["کتاب"]);

        let keep = TokenizerOptions { keep_stop_words: true, ..opts };
        assert_eq!(normalize_and_tokenize("کتاب از", &keep).len(), 2);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(normalize_and_tokenize("  ?! ...", &TokenizerOptions::default()).is_empty());
    }
}
