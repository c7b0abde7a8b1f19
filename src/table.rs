// src/table.rs
// International Morse code table, built once and shared read-only

use std::collections::HashMap;
use std::sync::LazyLock;

const MORSE_CODE: &[(&str, char)] = &[
    (".-", 'a'),
    ("-...", 'b'),
    ("-.-.", 'c'),
    ("-..", 'd'),
    (".", 'e'),
    ("..-.", 'f'),
    ("--.", 'g'),
    ("....", 'h'),
    ("..", 'i'),
    (".---", 'j'),
    ("-.-", 'k'),
    (".-..", 'l'),
    ("--", 'm'),
    ("-.", 'n'),
    ("---", 'o'),
    (".--.", 'p'),
    ("--.-", 'q'),
    (".-.", 'r'),
    ("...", 's'),
    ("-", 't'),
    ("..-", 'u'),
    ("...-", 'v'),
    (".--", 'w'),
    ("-..-", 'x'),
    ("-.--", 'y'),
    ("--..", 'z'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
    ("-----", '0'),
    (".-.-.-", '.'),
    ("--..--", ','),
    ("..--..", '?'),
    (".----.", '\''),
    ("-.-.--", '!'),
    ("-..-.", '/'),
    ("-.--.", '('),
    ("-.--.-", ')'),
    (".-...", '&'),
    ("---...", ':'),
    ("-.-.-.", ';'),
    ("-...-", '='),
    (".-.-.", '+'),
    ("-....-", '-'),
    (".-..-.", '"'),
    ("...-..-", '$'),
    (".--.-.", '@'),
    // '_' (..--.-) is left out: it is the placeholder for unmapped groups.
];

static DECODE: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| MORSE_CODE.iter().copied().collect());

static ENCODE: LazyLock<HashMap<char, &'static str>> =
    LazyLock::new(|| MORSE_CODE.iter().map(|&(code, c)| (c, code)).collect());

/// Character for a dot/dash group, if it is in the table.
pub fn lookup(group: &str) -> Option<char> {
    DECODE.get(group).copied()
}

/// Dot/dash group for a character. Letters match case-insensitively.
pub fn encode_char(c: char) -> Option<&'static str> {
    ENCODE.get(&c.to_ascii_lowercase()).copied()
}
