//! Path classification.
//!
//! The [`Classifier`] turns a file path into a [`Classification`] without
//! touching the filesystem. The path is split into components on `/` and
//! `\`, each component into words on `_` and `.`, and every word is offered
//! to an ordered list of token matchers. The first matcher that accepts a
//! word consumes it.
//!
//! | Order | Token       | Pattern (whole word)                    | Case      |
//! |-------|-------------|-----------------------------------------|-----------|
//! | 1     | source      | `sourcedata`, `derivatives`, `templates`| sensitive |
//! | 2     | subject     | `sub-<alnum>`                           | sensitive |
//! | 3     | session     | `ses-<alnum>`                           | sensitive |
//! | 4     | option      | `acq-`, `space-`, `desc-` + `<alnum>`   | sensitive |
//! | 5     | anatomical  | `T<1-9>` with optional `w`              | ignored   |
//! | 6     | diffusion   | `dwi`                                   | ignored   |
//! | 7     | ct          | `ct`                                    | ignored   |
//!
//! A word that no matcher accepts as a whole is split on `-` and read left
//! to right: a `key-value` pair of pieces is offered first, then the single
//! piece. `sub-01-T1w` yields a subject and a scan, `derivatives-old` a
//! source and `MPRAGE-T1` a scan.
//!
//! Later tokens override earlier ones for source, subject, session and scan,
//! except that a `templates` source is never replaced. Options accumulate in
//! discovery order without duplicates. Scan labels keep the case they were
//! written in; a weighting without its trailing `w` gets one appended.

use bids_core::{Classification, DataSource, DataType};
use regex::{Regex, RegexBuilder};

/// What a token matcher recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Source,
    Subject,
    Session,
    Option,
    Anatomical,
    Diffusion,
    Ct,
}

/// A recognized token with its typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Source(DataSource),
    Subject(&'a str),
    Session(&'a str),
    Option(&'a str),
    Scan(DataType, String),
}

/// One independent token matcher.
#[derive(Debug, Clone)]
struct TokenMatcher {
    kind: TokenKind,
    pattern: Regex,
}

impl TokenMatcher {
    fn new(kind: TokenKind, pattern: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self { kind, pattern })
    }

    fn token<'a>(&self, text: &'a str) -> Option<Token<'a>> {
        let token = match self.kind {
            TokenKind::Source => Token::Source(text.parse().ok()?),
            TokenKind::Subject => Token::Subject(text),
            TokenKind::Session => Token::Session(text),
            TokenKind::Option => Token::Option(text),
            TokenKind::Anatomical => Token::Scan(DataType::Anat, with_weighting(text)),
            TokenKind::Diffusion => Token::Scan(DataType::Dwi, text.to_owned()),
            TokenKind::Ct => Token::Scan(DataType::Ct, text.to_owned()),
        };
        Some(token)
    }
}

/// Appends the `w` of a bare weighting: `T1` becomes `T1w`, `t2` becomes
/// `t2w`; `T1w` and `T1W` are kept.
fn with_weighting(text: &str) -> String {
    if text.ends_with(['w', 'W']) {
        text.to_owned()
    } else {
        format!("{text}w")
    }
}

/// Extracts structured attributes from file paths.
///
/// # Examples
///
/// ```
/// use bids_catalog::Classifier;
/// use bids_core::{DataSource, DataType};
///
/// let classifier = Classifier::new()?;
/// let class = classifier.classify("/data/sourcedata/sub-07/ses-01/sub-07_ses-01_T1.dcm");
///
/// assert_eq!(class.data_source, DataSource::Sourcedata);
/// assert_eq!(class.subject, "sub-07");
/// assert_eq!(class.session, "ses-01");
/// assert_eq!(class.data_type, DataType::Anat);
/// assert_eq!(class.data_scan, "T1w");
/// # Ok::<(), bids_catalog::CatalogError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    matchers: Vec<TokenMatcher>,
}

impl Classifier {
    /// Compiles the token matchers.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`](crate::CatalogError::Pattern) if a
    /// pattern fails to compile.
    pub fn new() -> Result<Self, crate::CatalogError> {
        let matchers = vec![
            TokenMatcher::new(TokenKind::Source, r"^(?:sourcedata|derivatives|templates)$", false)?,
            TokenMatcher::new(TokenKind::Subject, r"^sub-[A-Za-z0-9]+$", false)?,
            TokenMatcher::new(TokenKind::Session, r"^ses-[A-Za-z0-9]+$", false)?,
            TokenMatcher::new(TokenKind::Option, r"^(?:acq|space|desc)-[A-Za-z0-9]+$", false)?,
            TokenMatcher::new(TokenKind::Anatomical, r"^t[1-9]w?$", true)?,
            TokenMatcher::new(TokenKind::Diffusion, r"^dwi$", true)?,
            TokenMatcher::new(TokenKind::Ct, r"^ct$", true)?,
        ];
        Ok(Self { matchers })
    }

    /// Classifies a path.
    ///
    /// Pure function of the string: the path does not need to exist.
    #[must_use]
    pub fn classify(&self, path: &str) -> Classification {
        let mut class = Classification::default();

        for token in self.tokens(path) {
            match token {
                Token::Source(source) => {
                    if class.data_source != DataSource::Templates {
                        class.data_source = source;
                    }
                }
                Token::Subject(subject) => subject.clone_into(&mut class.subject),
                Token::Session(session) => session.clone_into(&mut class.session),
                Token::Option(option) => {
                    if !class.options.iter().any(|known| known == option) {
                        class.options.push(option.to_owned());
                    }
                }
                Token::Scan(data_type, label) => {
                    class.data_type = data_type;
                    class.data_scan = label;
                }
            }
        }

        class
    }

    /// Returns the tokens of a path in order of appearance.
    fn tokens<'a>(&self, path: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        for word in path
            .split(['/', '\\'])
            .flat_map(|component| component.split(['_', '.']))
            .filter(|word| !word.is_empty())
        {
            self.word_tokens(word, &mut tokens);
        }
        tokens
    }

    /// Collects the tokens of one word.
    ///
    /// The whole word wins if a matcher accepts it. Otherwise the
    /// `-`-separated pieces are read left to right, trying each piece
    /// together with its successor before the piece alone.
    fn word_tokens<'a>(&self, word: &'a str, tokens: &mut Vec<Token<'a>>) {
        if let Some(token) = self.match_text(word) {
            tokens.push(token);
            return;
        }
        if !word.contains('-') {
            return;
        }

        // Byte ranges of the pieces, so pairs can be sliced out of `word`
        let mut pieces = Vec::new();
        let mut start = 0;
        for piece in word.split('-') {
            pieces.push((start, start + piece.len()));
            start += piece.len() + 1;
        }

        let mut i = 0;
        while i < pieces.len() {
            let (start, end) = pieces[i];
            if let Some(&(_, pair_end)) = pieces.get(i + 1) {
                if let Some(token) = self.match_text(&word[start..pair_end]) {
                    tokens.push(token);
                    i += 2;
                    continue;
                }
            }
            if let Some(token) = self.match_text(&word[start..end]) {
                tokens.push(token);
            }
            i += 1;
        }
    }

    /// Offers `text` to the matchers in order; the first that accepts it
    /// produces the token.
    fn match_text<'a>(&self, text: &'a str) -> Option<Token<'a>> {
        self.matchers
            .iter()
            .find(|matcher| matcher.pattern.is_match(text))
            .and_then(|matcher| matcher.token(text))
    }
}
