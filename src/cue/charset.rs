use chardet::{charset2encoding, detect};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251, X_MAC_CYRILLIC};
use log::{debug, warn};

/// Detections below this confidence leave the bytes undecoded.
pub const MIN_CONFIDENCE: f32 = 0.25;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

/// Keywords whose values are natural language and therefore feed the detector.
const SAMPLE_KEYWORDS: [&[u8]; 4] = [b"PERFORMER", b"SONGWRITER", b"TITLE", b"FILE"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
    /// Whether the text was re-decoded from a detected legacy charset.
    pub detected: bool,
}

/// Turns raw CUE sheet bytes into UTF-8 text.
///
/// Valid UTF-8 is passed through (minus a BOM). Anything else is run through
/// statistical charset detection on the sheet's natural-language fields; when
/// the detector is at least [`MIN_CONFIDENCE`] sure of an encoding we know, the
/// whole sheet is decoded with it. Otherwise the bytes are decoded lossily as
/// UTF-8, never failing.
pub fn decode_cue_text(raw: &[u8]) -> DecodedText {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);

    if let Ok(text) = std::str::from_utf8(raw) {
        return DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
            detected: false,
        };
    }

    let mut sample = natural_language_sample(raw);
    if sample.is_empty() {
        sample = raw.to_vec();
    }

    match detect_encoding(&sample) {
        Some(encoding) => {
            let (text, had_errors) = encoding.decode_without_bom_handling(raw);
            if had_errors {
                debug!("Some bytes are not valid {}", encoding.name());
            }
            DecodedText {
                text: text.into_owned(),
                encoding: encoding.name(),
                detected: true,
            }
        }
        None => {
            warn!("Could not detect the CUE sheet encoding, non UTF-8 characters may be garbled");
            DecodedText {
                text: String::from_utf8_lossy(raw).into_owned(),
                encoding: UTF_8.name(),
                detected: false,
            }
        }
    }
}

fn detect_encoding(sample: &[u8]) -> Option<&'static Encoding> {
    let (charset, confidence, _language) = detect(&sample.to_vec());
    debug!("Charset detection: {charset} ({confidence:.2})");

    if confidence < MIN_CONFIDENCE {
        return None;
    }

    Encoding::for_label(charset2encoding(&charset).as_bytes()).map(prefer_common_encoding)
}

/// The detector cannot tell Windows-1251 from Mac Cyrillic on short text, and
/// only the former shows up in practice.
fn prefer_common_encoding(encoding: &'static Encoding) -> &'static Encoding {
    if encoding == X_MAC_CYRILLIC {
        WINDOWS_1251
    } else {
        encoding
    }
}

/// Concatenates the values of PERFORMER, SONGWRITER, TITLE and FILE lines.
fn natural_language_sample(raw: &[u8]) -> Vec<u8> {
    let mut sample = Vec::new();

    for line in raw.split(|b| *b == b'\n') {
        let line = line.trim_ascii();
        let Some(rest) = SAMPLE_KEYWORDS.iter().find_map(|keyword| {
            line.strip_prefix(*keyword)
                .filter(|rest| rest.first().is_some_and(u8::is_ascii_whitespace))
        }) else {
            continue;
        };

        let value = match (
            rest.iter().position(|b| *b == b'"'),
            rest.iter().rposition(|b| *b == b'"'),
        ) {
            (Some(start), Some(end)) if start < end => &rest[start + 1..end],
            _ => rest.trim_ascii(),
        };

        if !value.is_empty() {
            if !sample.is_empty() {
                sample.push(b' ');
            }
            sample.extend_from_slice(value);
        }
    }

    sample
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom_from_utf8() {
        let mut raw = UTF8_BOM.to_vec();
        raw.extend_from_slice("TITLE \"Ünïcödé\"\n".as_bytes());

        let decoded = decode_cue_text(&raw);
        assert_eq!(decoded.text, "TITLE \"Ünïcödé\"\n");
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(!decoded.detected);
    }

    #[test]
    fn sample_contains_only_natural_language_values() {
        let raw = b"REM DATE 1999\r\nPERFORMER \"Band\"\r\nTITLE Album\r\nFILE \"a b.wav\" WAVE\r\n  TRACK 01 AUDIO\r\n    TITLE \"Song\"\r\n    INDEX 01 00:00:00\r\n";
        assert_eq!(natural_language_sample(raw), b"Band Album a b.wav Song".to_vec());
    }

    #[test]
    fn ignores_keywords_that_are_only_prefixes() {
        let raw = b"TITLEX \"nope\"\nFILENAME \"nope\"\n";
        assert!(natural_language_sample(raw).is_empty());
    }

    fn assert_round_trip(encoding: &'static Encoding, sheet: &str) {
        let (encoded, _, unmappable) = encoding.encode(sheet);
        assert!(!unmappable);
        assert!(std::str::from_utf8(&encoded).is_err());

        let decoded = decode_cue_text(&encoded);
        assert!(decoded.detected);
        assert_eq!(decoded.text, sheet, "decoded as {}", decoded.encoding);
    }

    #[test]
    fn decodes_windows_1251_sheets() {
        assert_round_trip(
            encoding_rs::WINDOWS_1251,
            "PERFORMER \"Группа Кино\"\nTITLE \"Группа крови на рукаве\"\nFILE \"Кино - Группа крови.flac\" WAVE\n  TRACK 01 AUDIO\n    TITLE \"Звезда по имени Солнце\"\n    INDEX 01 00:00:00\n",
        );
    }

    #[test]
    fn decodes_windows_1252_sheets() {
        assert_round_trip(
            encoding_rs::WINDOWS_1252,
            "PERFORMER \"Die Ärzte\"\nTITLE \"Übermäßig schön für Straßenmusik\"\nFILE \"Die Ärzte - Übermäßig.flac\" WAVE\n  TRACK 01 AUDIO\n    TITLE \"Größer als Köln\"\n    INDEX 01 00:00:00\n",
        );
    }

    #[test]
    fn decodes_shift_jis_sheets() {
        assert_round_trip(
            encoding_rs::SHIFT_JIS,
            "PERFORMER \"椎名林檎\"\nTITLE \"無罪モラトリアム\"\nFILE \"椎名林檎 - 無罪モラトリアム.flac\" WAVE\n  TRACK 01 AUDIO\n    TITLE \"歌舞伎町の女王\"\n    INDEX 01 00:00:00\n  TRACK 02 AUDIO\n    TITLE \"ここでキスして。\"\n    INDEX 01 04:12:00\n",
        );
    }

    #[test]
    fn mac_cyrillic_guess_is_read_as_windows_1251() {
        assert_eq!(prefer_common_encoding(X_MAC_CYRILLIC), WINDOWS_1251);
        assert_eq!(prefer_common_encoding(encoding_rs::KOI8_R), encoding_rs::KOI8_R);
    }
}
