//! Filename clean-up stages applied to evaluated names.
//!
//! Every function here is total: any input string produces an output.

use regex::Regex;
use std::sync::LazyLock;

use crate::script::Metadata;

/// Characters Windows does not allow in file names
static WIN_INCOMPATIBLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["*:<>?|]"#).expect("invalid windows charset regex"));

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Replace path separators in tag values so a value never creates a directory
pub fn path_safe_metadata(metadata: &Metadata, windows_compatibility: bool) -> Metadata {
    metadata
        .iter()
        .map(|(key, value)| {
            let mut value = value.replace('/', "_");
            if windows_compatibility {
                value = value.replace('\\', "_");
            }
            (key.clone(), value)
        })
        .collect()
}

/// Drop characters a naming format may emit for readability only
pub fn strip_control(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\r' | '\0'))
        .collect()
}

/// Transliterate to ASCII; unknown characters become `_`
pub fn to_ascii(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some(replacement) = transliterate(c) {
            out.push_str(replacement);
        } else {
            out.push('_');
        }
    }
    out
}

fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ď' | 'Đ' | 'Ð' => "D",
        'ď' | 'đ' | 'ð' => "d",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => "N",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Þ' => "Th",
        'þ' => "th",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ý' | 'Ÿ' | 'Ŷ' => "Y",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        '‘' | '’' | '‚' | '′' => "'",
        '“' | '”' | '„' | '″' => "\"",
        '‐' | '‑' | '–' | '—' | '−' => "-",
        '…' => "...",
        '«' => "<<",
        '»' => ">>",
        '×' => "x",
        '\u{a0}' => " ",
        _ => return None,
    })
}

/// Make every path component acceptable to Windows filesystems
pub fn windows_compatible(path: &str) -> String {
    let replaced = WIN_INCOMPATIBLE_RE.replace_all(path, "_");
    replaced
        .split('/')
        .map(|component| component.trim_end_matches(['.', ' ']))
        .collect::<Vec<_>>()
        .join("/")
}

/// Collapse duplicate separators, `.` and `..` components
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let sep = std::path::MAIN_SEPARATOR.to_string();
    let absolute = path.starts_with(is_separator);
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split(is_separator) {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join(&sep);
    if absolute {
        format!("{sep}{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
