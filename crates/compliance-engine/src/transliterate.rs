//! Uzbek Latin <-> Cyrillic transliteration and script detection

use shared_types::Script;

/// Multi-character Latin sequences, matched before single letters
const LATIN_DIGRAPHS: &[(&str, &str)] = &[
    ("sh", "ш"),
    ("Sh", "Ш"),
    ("SH", "Ш"),
    ("ch", "ч"),
    ("Ch", "Ч"),
    ("CH", "Ч"),
    ("ng", "нг"),
    ("Ng", "Нг"),
    ("NG", "НГ"),
    ("o'", "ў"),
    ("O'", "Ў"),
    ("g'", "ғ"),
    ("G'", "Ғ"),
    ("oʻ", "ў"),
    ("Oʻ", "Ў"),
    ("gʻ", "ғ"),
    ("Gʻ", "Ғ"),
];

fn latin_letter(c: char) -> Option<char> {
    let mapped = match c {
        'a' => 'а',
        'b' => 'б',
        'd' => 'д',
        'e' => 'е',
        'f' => 'ф',
        'g' => 'г',
        'h' => 'ҳ',
        'i' => 'и',
        'j' => 'ж',
        'k' => 'к',
        'l' => 'л',
        'm' => 'м',
        'n' => 'н',
        'o' => 'о',
        'p' => 'п',
        'q' => 'қ',
        'r' => 'р',
        's' => 'с',
        't' => 'т',
        'u' => 'у',
        'v' => 'в',
        'x' => 'х',
        'y' => 'й',
        'z' => 'з',
        'A' => 'А',
        'B' => 'Б',
        'D' => 'Д',
        'E' => 'Е',
        'F' => 'Ф',
        'G' => 'Г',
        'H' => 'Ҳ',
        'I' => 'И',
        'J' => 'Ж',
        'K' => 'К',
        'L' => 'Л',
        'M' => 'М',
        'N' => 'Н',
        'O' => 'О',
        'P' => 'П',
        'Q' => 'Қ',
        'R' => 'Р',
        'S' => 'С',
        'T' => 'Т',
        'U' => 'У',
        'V' => 'В',
        'X' => 'Х',
        'Y' => 'Й',
        'Z' => 'З',
        _ => return None,
    };
    Some(mapped)
}

fn cyrillic_letter(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ж' => "j",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "x",
        'ч' => "ch",
        'ш' => "sh",
        'ў' => "o'",
        'қ' => "q",
        'ғ' => "g'",
        'ҳ' => "h",
        'ё' => "yo",
        'ю' => "yu",
        'я' => "ya",
        'ц' => "ts",
        'э' => "e",
        'ъ' => "'",
        'ь' => "",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ж' => "J",
        'З' => "Z",
        'И' => "I",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "X",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Ў' => "O'",
        'Қ' => "Q",
        'Ғ' => "G'",
        'Ҳ' => "H",
        'Ё' => "Yo",
        'Ю' => "Yu",
        'Я' => "Ya",
        'Ц' => "Ts",
        'Э' => "E",
        'Ъ' => "'",
        'Ь' => "",
        _ => return None,
    };
    Some(mapped)
}

/// Cyrillic if Cyrillic letters outnumber Latin ones, Latin otherwise
pub fn detect_script(text: &str) -> Script {
    let cyrillic = text
        .chars()
        .filter(|c| ('\u{0400}'..='\u{04FF}').contains(c))
        .count();
    let latin = text.chars().filter(|c| c.is_ascii_alphabetic()).count();

    if cyrillic > latin {
        Script::Cyrillic
    } else {
        Script::Latin
    }
}

pub fn transliterate(text: &str, to: Script) -> String {
    match to {
        Script::Cyrillic => to_cyrillic(text),
        Script::Latin => to_latin(text),
    }
}

pub fn to_cyrillic(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    'outer: while let Some(c) = rest.chars().next() {
        for (latin, cyrillic) in LATIN_DIGRAPHS {
            if rest.starts_with(latin) {
                out.push_str(cyrillic);
                rest = &rest[latin.len()..];
                continue 'outer;
            }
        }
        out.push(latin_letter(c).unwrap_or(c));
        rest = &rest[c.len_utf8()..];
    }

    out
}

pub fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match cyrillic_letter(c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}
