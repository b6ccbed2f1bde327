//! Candidate text encodings for the source file.
//!
//! Decoding is strict: a candidate either maps every byte or is rejected, so
//! the first candidate that succeeds is the one that wins.

use encoding_rs::{EUC_KR, Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    /// Windows code page 949 (Unified Hangul Code).
    Cp949,
    /// EUC-KR. Decoded with the same table as CP949, which is a superset.
    EucKr,
    /// UTF-8 with an optional leading byte-order mark.
    Utf8Sig,
    Utf8,
}

/// Order tried when nothing is configured.
pub const DEFAULT_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Cp949,
    TextEncoding::EucKr,
    TextEncoding::Utf8Sig,
    TextEncoding::Utf8,
];

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Cp949 => "cp949",
            TextEncoding::EucKr => "euc-kr",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
        }
    }

    fn codec(&self) -> &'static Encoding {
        match self {
            TextEncoding::Cp949 | TextEncoding::EucKr => EUC_KR,
            TextEncoding::Utf8Sig | TextEncoding::Utf8 => UTF_8,
        }
    }

    /// Decodes `bytes`, returning `None` on any malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let bytes = match self {
            TextEncoding::Utf8Sig => bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes),
            _ => bytes,
        };
        self.codec()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
    }
}

/// Tries each candidate in order; the first clean decode wins.
pub fn decode_first(bytes: &[u8], candidates: &[TextEncoding]) -> Option<(String, TextEncoding)> {
    candidates
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (text, *encoding)))
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cp949" | "windows-949" | "uhc" => Ok(TextEncoding::Cp949),
            "euc-kr" | "euckr" => Ok(TextEncoding::EucKr),
            "utf-8-sig" | "utf8-sig" => Ok(TextEncoding::Utf8Sig),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            other => Err(format!("unsupported encoding '{other}'")),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.label().to_string()
    }
}

/// Parses a comma separated list such as `cp949,utf-8`.
pub fn parse_list(list: &str) -> Result<Vec<TextEncoding>, String> {
    list.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_sig_strips_bom() {
        let bytes = b"\xEF\xBB\xBFop,line";
        assert_eq!(TextEncoding::Utf8Sig.decode(bytes).unwrap(), "op,line");
        assert_eq!(TextEncoding::Utf8.decode(bytes).unwrap(), "\u{feff}op,line");
    }

    #[test]
    fn test_cp949_round_trips_hangul() {
        let (encoded, _, had_errors) = EUC_KR.encode("5시30분,상행");
        assert!(!had_errors);
        assert_eq!(TextEncoding::Cp949.decode(&encoded).unwrap(), "5시30분,상행");
        assert!(TextEncoding::Utf8.decode(&encoded).is_none());
    }

    #[test]
    fn test_decode_first_falls_through() {
        let bytes = "역명,상행".as_bytes();
        let (text, used) = decode_first(bytes, &[TextEncoding::Cp949, TextEncoding::Utf8]).unwrap();
        assert_eq!(text, "역명,상행");
        assert_eq!(used, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_first_none_when_all_fail() {
        let bytes = [0xFF, 0xFE, 0xFD];
        assert!(decode_first(&bytes, &[TextEncoding::Utf8, TextEncoding::Utf8Sig]).is_none());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("CP949, utf_8 ,").unwrap(),
            vec![TextEncoding::Cp949, TextEncoding::Utf8]
        );
        assert!(parse_list("latin1").is_err());
    }
}
