//! Channel name normalization
//!
//! Turns a noisy, human-authored channel name into a canonical lowercase
//! alphanumeric matching key, extracting league and call-sign signals on
//! the way. The transformation steps are order-sensitive: reordering them
//! changes output for real playlist data.

use regex::Regex;

use crate::matching::tables;
use crate::models::{CallSign, CountryCode, LeagueCode};

/// Minimum length an article-stripped remainder must keep. Shorter names
/// like `AandE` would otherwise be mangled into `nde`-style stubs.
const MIN_ARTICLE_REMAINDER_LEN: usize = 4;

/// Name normalizer with all patterns compiled once at construction.
pub struct NameNormalizer {
    /// `107 | `, `2.2 - `, `24: `, `107. ` channel-number prefixes.
    channel_number_sep: Regex,
    /// `3 ABC` channel-number prefixes with no explicit separator.
    channel_number_bare: Regex,
    /// `US:` / `FRA|` country prefixes (validated against the country table).
    country_prefix: Regex,
    /// Leading 2-letter country token in a stream or group name.
    country_token: Regex,
    quality_suffix: Regex,
    timezone_suffix: Regex,
    /// Leading `the`/`an`/`a` as a standalone word. Word-level, so fused
    /// keys like `aande` or `amcplus` are never torn apart.
    article_word: Regex,
    call_sign: Regex,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self {
            channel_number_sep: Regex::new(r"^\d+(?:\.\d+)?\s*[|\-:.]\s+")
                .expect("invalid channel number pattern"),
            channel_number_bare: Regex::new(r"^\d+(?:\.\d+)?\s+([A-Za-z].*)$")
                .expect("invalid channel number pattern"),
            country_prefix: Regex::new(r"^([A-Za-z]{2,3})\s*[:|]\s*")
                .expect("invalid country prefix pattern"),
            country_token: Regex::new(r"^([A-Za-z]{2})(?:[\s:|\-]|$)")
                .expect("invalid country token pattern"),
            quality_suffix: Regex::new(&format!(
                r"(?i)[\s\-|:]+(?:{})$",
                tables::QUALITY_SUFFIXES.join("|")
            ))
            .expect("invalid quality suffix pattern"),
            timezone_suffix: Regex::new(&format!(
                r"(?i)[\s\-|:]+(?:{})$",
                tables::TIMEZONE_SUFFIXES.join("|")
            ))
            .expect("invalid timezone suffix pattern"),
            article_word: Regex::new(r"^(?i)(the|an|a)\s+\S").expect("invalid article pattern"),
            call_sign: Regex::new(r"\b([KW][A-Z]{2,4})(?:-(?:DT|TV|HD|LP|CD|CA|LD))?\b")
                .expect("invalid call sign pattern"),
        }
    }

    /// Canonical matching key for a display name.
    pub fn normalize(&self, name: &str) -> String {
        self.normalize_impl(name, true).0
    }

    /// Canonical matching key plus the league prefix found on the way, if
    /// any.
    pub fn normalize_with_league(&self, name: &str) -> (String, Option<LeagueCode>) {
        self.normalize_impl(name, true)
    }

    /// Normalization variant for identifier remainders: league prefixes are
    /// left untouched because the league was already taken from the tvg-id
    /// suffix.
    pub(crate) fn normalize_identifier_name(&self, name: &str) -> String {
        self.normalize_impl(name, false).0
    }

    fn normalize_impl(&self, name: &str, extract_league: bool) -> (String, Option<LeagueCode>) {
        let mut current = name.trim().to_string();

        // Channel-number prefix: `107 | ESPN`, `2.2 - ABC`, `3 ABC`.
        if let Some(m) = self.channel_number_sep.find(&current) {
            current = current[m.end()..].to_string();
        } else if let Some(caps) = self.channel_number_bare.captures(&current) {
            current = caps[1].to_string();
        }

        // Country prefix: `US: ESPN`, `FRA| TF1`.
        current = self.strip_country_prefix(&current).to_string();

        // League prefix: `NFL: Arizona Cardinals`.
        let mut league = None;
        if extract_league {
            if let Some((code, remainder)) = self.extract_league_prefix(&current) {
                league = Some(code);
                current = remainder.to_string();
            }
        }

        // Trailing quality marker, then trailing timezone marker.
        current = self.quality_suffix.replace(&current, "").to_string();
        current = self.timezone_suffix.replace(&current, "").to_string();

        // Semantic symbol substitution before the alphanumeric filter so
        // `AMC+` and `A&E` keep their meaning.
        current = current.replace('+', "plus").replace('&', "and");

        // The article must be a standalone word at this point; once the
        // filter below fuses everything together, `aande` would look like
        // it starts with an article too.
        let article_len = self
            .article_word
            .captures(current.trim_start())
            .map(|caps| caps[1].len())
            .unwrap_or(0);

        let mut key: String = current
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        // Residual numeric prefixes whose separator was not recognized
        // above, e.g. `107ESPN`.
        key = key.trim_start_matches(|c: char| c.is_ascii_digit()).to_string();

        // Drop the leading article, but only when the remainder is long
        // enough to stay recognizable.
        if article_len > 0 && key.len() > article_len {
            let remainder = &key[article_len..];
            if remainder.len() >= MIN_ARTICLE_REMAINDER_LEN {
                key = remainder.to_string();
            }
        }

        (key, league)
    }

    /// Strips a leading 2-3 letter country prefix (`US:`, `FRA|`) when the
    /// token is a known country code. Unknown tokens such as `ABC:` or
    /// `NFL:` pass through untouched.
    pub fn strip_country_prefix<'s>(&self, name: &'s str) -> &'s str {
        if let Some(caps) = self.country_prefix.captures(name) {
            let token = caps[1].to_lowercase();
            if tables::is_country_code(&token) {
                return &name[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
            }
        }
        name
    }

    /// Leading 2-letter country token of a stream or group name, used for
    /// per-channel country detection.
    pub fn leading_country_token(&self, name: &str) -> Option<CountryCode> {
        let trimmed = name.trim_start();
        let caps = self.country_token.captures(trimmed)?;
        let token = caps[1].to_lowercase();
        if tables::is_country_code(&token) {
            Some(CountryCode::new(token))
        } else {
            None
        }
    }

    /// Matches a leading league token (`NFL`, `PREMIER LEAGUE`, ...)
    /// followed by `:`, `|` or `-`. Returns the league code and the
    /// remaining text.
    pub fn extract_league_prefix<'s>(&self, name: &'s str) -> Option<(LeagueCode, &'s str)> {
        let trimmed = name.trim_start();
        for token in tables::LEAGUE_TOKENS {
            if trimmed.len() < token.len() || !trimmed.is_char_boundary(token.len()) {
                continue;
            }
            if !trimmed[..token.len()].eq_ignore_ascii_case(token) {
                continue;
            }
            let rest = trimmed[token.len()..].trim_start();
            let mut chars = rest.chars();
            match chars.next() {
                Some(':') | Some('|') | Some('-') => {}
                _ => continue,
            }
            let remainder = chars.as_str().trim();
            if remainder.is_empty() {
                continue;
            }
            return Some((LeagueCode::new(*token), remainder));
        }
        None
    }

    /// Extracts a North-American broadcast call sign (`K`/`W` + 2-4
    /// letters) from anywhere in a name. An operational suffix like `-DT`
    /// or `-TV` is discarded.
    pub fn extract_broadcast_call_sign(&self, name: &str) -> Option<CallSign> {
        self.call_sign
            .captures(name)
            .map(|caps| CallSign::new(&caps[1]))
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
