//! Composite axis keys: composing labels from parameter values and
//! parsing them back.
//!
//! The only irregularity in the key grammar is the person markers: they
//! fuse with the following value without a separator ("1PL", never
//! "1.PL"), so parsing has to split them back off with a longest-first
//! prefix match ("1+2PL" is "1+2" + "PL", not "1" + "+2PL").

use smallvec::SmallVec;

use crate::error::ParadigmError;

/// Person markers that fuse with the following value.
pub const PERSON_TOKENS: [&str; 5] = ["1", "2", "3", "1+3", "1+2"];

/// The same tokens ordered longest-first, the order candidates are tried
/// in when matching a fragment prefix.
const PERSON_TOKENS_LONGEST_FIRST: [&str; 5] = ["1+3", "1+2", "1", "2", "3"];

/// A parsed composite key: one value per expected parameter, `None` for
/// trailing parameters the key did not encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub values: SmallVec<[Option<String>; 4]>,
    /// How many trailing parameters were padded as missing.
    pub padded: usize,
}

impl ParsedKey {
    /// The values that were actually present in the key.
    pub fn present(&self) -> Vec<String> {
        self.values.iter().flatten().cloned().collect()
    }
}

pub fn is_person_token(value: &str) -> bool {
    PERSON_TOKENS.contains(&value)
}

/// Splits a leading person token off a fragment, trying the longest
/// candidates first.
fn split_person_prefix(fragment: &str) -> Option<(&'static str, &str)> {
    for token in PERSON_TOKENS_LONGEST_FIRST {
        if let Some(rest) = fragment.strip_prefix(token) {
            return Some((token, rest));
        }
    }
    None
}

/// Composes a single key from parameter values.
///
/// Each value is followed by the separator unless it is a person token.
/// Leading/trailing separators are stripped and runs of doubled
/// separators (left behind by consecutive suppressions or empty values)
/// are collapsed to one.
pub fn compose_key<'a, I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for value in values {
        out.push_str(value);
        if !is_person_token(value) {
            out.push_str(separator);
        }
    }
    normalize_separators(&out, separator)
}

/// Strips the separator from both ends and collapses doubled separators.
fn normalize_separators(key: &str, separator: &str) -> String {
    if separator.is_empty() {
        return key.to_string();
    }
    let mut out = key.to_string();
    let doubled = format!("{separator}{separator}");
    while out.contains(&doubled) {
        out = out.replace(&doubled, separator);
    }
    while out.starts_with(separator) {
        out.drain(..separator.len());
    }
    while out.ends_with(separator) {
        out.truncate(out.len() - separator.len());
    }
    out
}

/// Splits a key on any of the separator strings. At equal positions the
/// longest separator wins. Fragments are returned as-is, empties
/// included (the caller discards them).
fn split_on_separators<'a>(key: &'a str, separators: &[String]) -> Vec<&'a str> {
    let mut fragments = Vec::new();
    let mut rest = key;
    loop {
        let mut next: Option<(usize, usize)> = None;
        for separator in separators {
            if separator.is_empty() {
                continue;
            }
            if let Some(pos) = rest.find(separator.as_str()) {
                let better = match next {
                    None => true,
                    Some((best_pos, best_len)) => {
                        pos < best_pos || (pos == best_pos && separator.len() > best_len)
                    }
                };
                if better {
                    next = Some((pos, separator.len()));
                }
            }
        }
        match next {
            Some((pos, len)) => {
                fragments.push(&rest[..pos]);
                rest = &rest[pos + len..];
            }
            None => {
                fragments.push(rest);
                return fragments;
            }
        }
    }
}

/// Parses a composite key back into one value per expected parameter.
///
/// The key is split on the configured separators; fused person tokens are
/// split off fragment prefixes. Fewer values than parameters is
/// recoverable (trailing parameters become `None`, recorded in `padded`);
/// more values than parameters is fatal, since it means the separators or
/// the token table do not match the data.
pub fn split_key(
    key: &str,
    parameters: &[String],
    separators: &[String],
) -> Result<ParsedKey, ParadigmError> {
    let mut values: Vec<String> = Vec::new();
    for fragment in split_on_separators(key, separators) {
        if fragment.is_empty() {
            continue;
        }
        match split_person_prefix(fragment) {
            Some((token, rest)) => {
                values.push(token.to_string());
                if !rest.is_empty() {
                    values.push(rest.to_string());
                }
            }
            None => values.push(fragment.to_string()),
        }
    }

    if values.len() > parameters.len() {
        return Err(ParadigmError::TooManyValues {
            expected: parameters.to_vec(),
            values,
        });
    }

    let padded = parameters.len() - values.len();
    if padded > 0 {
        log::warn!(
            "fewer values ({:?}) than specified: {:?}",
            values,
            parameters
        );
    }
    let mut parsed: SmallVec<[Option<String>; 4]> =
        values.into_iter().map(Some).collect();
    for _ in 0..padded {
        parsed.push(None);
    }
    Ok(ParsedKey {
        values: parsed,
        padded,
    })
}

/// Collapses the joiner after person tokens across a whole flattened
/// label. Applied once after labels are joined, so fusion holds even
/// across parts that were composed separately.
pub fn collapse_person_joins(label: &str, joiner: &str) -> String {
    if joiner.is_empty() {
        return label.to_string();
    }
    let mut out = label.to_string();
    for token in PERSON_TOKENS {
        let fused = format!("{token}{joiner}");
        if out.contains(&fused) {
            out = out.replace(&fused, token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seps(strings: &[&str]) -> Vec<String> {
        strings.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compose_plain_values() {
        assert_eq!(compose_key(["NOM", "SG"], "."), "NOM.SG");
        assert_eq!(compose_key(["NOM"], "."), "NOM");
        assert_eq!(compose_key([], "."), "");
    }

    #[test]
    fn test_compose_person_fusion() {
        assert_eq!(compose_key(["1+2", "PL"], "."), "1+2PL");
        assert_eq!(compose_key(["1", "PL"], "."), "1PL");
        // A person token at the tail leaves nothing to fuse with.
        assert_eq!(compose_key(["IND", "1"], "."), "IND.1");
    }

    #[test]
    fn test_compose_empty_values_collapse() {
        assert_eq!(compose_key(["PRS", "", "IND"], "."), "PRS.IND");
        assert_eq!(compose_key(["", "SG"], "."), "SG");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose_key(["1+2", "PL", "PST"], ".");
        let b = compose_key(["1+2", "PL", "PST"], ".");
        assert_eq!(a, b);
        assert_eq!(a, "1+2PL.PST");
    }

    #[test]
    fn test_split_simple() {
        let parsed = split_key("NOM.SG", &params(&["Case", "Number"]), &seps(&["."])).unwrap();
        assert_eq!(parsed.present(), vec!["NOM", "SG"]);
        assert_eq!(parsed.padded, 0);
    }

    #[test]
    fn test_split_person_fusion() {
        let parsed =
            split_key("1+2PL", &params(&["Person", "Number"]), &seps(&["."])).unwrap();
        assert_eq!(parsed.present(), vec!["1+2", "PL"]);
    }

    #[test]
    fn test_split_prefers_longest_person_token() {
        // "1" also matches as a prefix of "1+2PL"; the longer token must win.
        let parsed =
            split_key("1+3SG", &params(&["Person", "Number"]), &seps(&["."])).unwrap();
        assert_eq!(parsed.present(), vec!["1+3", "SG"]);
    }

    #[test]
    fn test_split_multiple_separators() {
        let parsed = split_key(
            "PRS:IND-ACT",
            &params(&["Tense", "Mood", "Voice"]),
            &seps(&[":", "-"]),
        )
        .unwrap();
        assert_eq!(parsed.present(), vec!["PRS", "IND", "ACT"]);
    }

    #[test]
    fn test_split_undercount_pads_trailing() {
        let parsed = split_key(
            "NOM",
            &params(&["Case", "Number", "Gender"]),
            &seps(&["."]),
        )
        .unwrap();
        assert_eq!(parsed.padded, 2);
        assert_eq!(
            parsed.values.as_slice(),
            &[Some("NOM".to_string()), None, None]
        );
    }

    #[test]
    fn test_split_overcount_is_fatal() {
        let err = split_key("A.B.C", &params(&["P1", "P2"]), &seps(&["."])).unwrap_err();
        match err {
            ParadigmError::TooManyValues { expected, values } => {
                assert_eq!(expected, params(&["P1", "P2"]));
                assert_eq!(values, vec!["A", "B", "C"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_split_discards_empty_fragments() {
        let parsed = split_key(".NOM..SG.", &params(&["Case", "Number"]), &seps(&["."])).unwrap();
        assert_eq!(parsed.present(), vec!["NOM", "SG"]);
    }

    #[test]
    fn test_roundtrip_through_parse() {
        let key = compose_key(["1+2", "PL"], ".");
        let parsed = split_key(&key, &params(&["Person", "Number"]), &seps(&["."])).unwrap();
        assert_eq!(parsed.present(), vec!["1+2", "PL"]);
    }

    #[test]
    fn test_collapse_person_joins() {
        assert_eq!(collapse_person_joins("1.PL", "."), "1PL");
        assert_eq!(collapse_person_joins("1+2.PL.PST", "."), "1+2PL.PST");
        assert_eq!(collapse_person_joins("NOM.SG", "."), "NOM.SG");
    }
}
