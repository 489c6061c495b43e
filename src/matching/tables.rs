//! Fixed lookup tables used by the normalizer and ranker.
//!
//! Process-wide immutable constants, compiled into the binary and shared by
//! reference. Nothing here is mutated or lazily rebuilt at runtime.

/// League tokens recognized as channel-name prefixes and, in their
/// lowercase space-stripped form, as tvg-id suffixes.
///
/// Length-sorted, longest first: prefix matching walks this list top to
/// bottom and must see `PREMIER LEAGUE` before `EPL` would get a chance to
/// misfire on partial input.
pub const LEAGUE_TOKENS: &[&str] = &[
    "CHAMPIONS LEAGUE",
    "NCAA BASKETBALL",
    "NATIONS LEAGUE",
    "PREMIER LEAGUE",
    "NCAA FOOTBALL",
    "EUROPA LEAGUE",
    "BUNDESLIGA",
    "FORMULA 1",
    "LA LIGA",
    "LIGUE 1",
    "SERIE A",
    "NASCAR",
    "NCAAB",
    "NCAAF",
    "MILB",
    "UEFA",
    "USFL",
    "WNBA",
    "AHL",
    "CFL",
    "EPL",
    "MLB",
    "MLS",
    "NBA",
    "NFL",
    "NHL",
    "PGA",
    "UFC",
    "WWE",
    "XFL",
    "F1",
];

/// Trailing quality markers stripped during normalization.
pub const QUALITY_SUFFIXES: &[&str] = &[
    "FHD", "UHD", "4K", "HD", "SD", "1080P", "1080I", "720P", "480P", "2160P", "HEVC", "H264",
    "H265",
];

/// Trailing timezone/feed markers stripped during normalization.
pub const TIMEZONE_SUFFIXES: &[&str] = &["EAST", "WEST", "ET", "PT", "CT", "MT"];

/// Quality suffixes that may trail a call sign inside a tvg-id
/// annotation, e.g. `(KATUHD)`. Longest first so `FHD` is not split into
/// `F` + `HD`.
pub const CALL_SIGN_QUALITY_SUFFIXES: &[&str] = &["fhd", "uhd", "hd", "sd"];

/// Punctuation treated as a deliberate naming signal when shared between a
/// channel name and a catalog entry.
pub const SPECIAL_PUNCTUATION: &[char] = &['!', '@', '#', '$', '%', '^', '*'];

/// Country codes accepted as channel-name prefixes and tvg-id suffixes.
///
/// ISO 3166-1 alpha-2 plus the alpha-3 and pseudo codes that playlist
/// authors actually use (`uk`, `usa`, `ger`, `ara`, `lat`, `int`). League
/// tokens are deliberately absent: `NFL:` must survive country stripping
/// so league extraction can see it.
pub const COUNTRY_CODES: &[&str] = &[
    // alpha-2
    "ad", "ae", "af", "al", "am", "ar", "at", "au", "az", "ba", "bd", "be", "bg", "bh", "bo", "br",
    "by", "ca", "ch", "cl", "cn", "co", "cr", "cu", "cy", "cz", "de", "dk", "do", "dz", "ec", "ee",
    "eg", "es", "fi", "fr", "ge", "gh", "gr", "gt", "hk", "hn", "hr", "ht", "hu", "id", "ie", "il",
    "in", "iq", "ir", "is", "it", "jm", "jo", "jp", "ke", "kr", "kw", "kz", "lb", "lk", "lt", "lu",
    "lv", "ly", "ma", "md", "me", "mk", "mt", "mx", "my", "ng", "ni", "nl", "no", "np", "nz", "om",
    "pa", "pe", "ph", "pk", "pl", "pt", "py", "qa", "ro", "rs", "ru", "sa", "se", "sg", "si", "sk",
    "sv", "sy", "th", "tn", "tr", "tt", "tw", "ua", "us", "uy", "ve", "vn", "za",
    // alpha-3 and playlist conventions
    "uk", "usa", "can", "gbr", "ger", "deu", "fra", "esp", "ita", "por", "ned", "nld", "pol",
    "tur", "gre", "swe", "nor", "den", "fin", "irl", "bel", "sui", "aut", "rou", "rus", "ukr",
    "ind", "pak", "chn", "jpn", "kor", "aus", "nzl", "rsa", "bra", "arg", "mex", "ara", "lat",
    "int",
];

/// True when `code` (already lowercase) is a recognized country code.
pub fn is_country_code(code: &str) -> bool {
    COUNTRY_CODES.contains(&code)
}

/// Strips one trailing call-sign quality suffix (`katuhd` -> `katu`).
/// Returns the input unchanged when no suffix applies or stripping would
/// leave nothing.
pub fn strip_call_sign_quality(sign: &str) -> &str {
    for suffix in CALL_SIGN_QUALITY_SUFFIXES {
        if sign.len() > suffix.len() && sign.ends_with(suffix) {
            return &sign[..sign.len() - suffix.len()];
        }
    }
    sign
}

/// Looks up the lowercase space-stripped league code for a known league
/// token suffix, e.g. `nfl` or `premierleague`.
pub fn is_league_code(code: &str) -> bool {
    LEAGUE_TOKENS
        .iter()
        .any(|token| token.to_lowercase().replace(' ', "") == code)
}
