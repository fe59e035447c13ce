//! Kana classification and mora splitting.
//!
//! Both the notation parser and the bundled romanizer walk text through
//! [`split_moras`], so a contracted sound is grouped the same way no matter
//! which of the two looks at it.

/// Small kana that contract with the preceding base character.
const CONTRACTING_MARKS: [char; 16] = [
    'ゃ', 'ゅ', 'ょ', 'ぁ', 'ぃ', 'ぅ', 'ぇ', 'ぉ', 'ャ', 'ュ', 'ョ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ',
];

const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

pub const LONG_VOWEL_MARK: char = 'ー';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoraKind {
    /// A single kana.
    Plain,
    /// A base kana followed by a small contracting kana (youon).
    Contracted,
    /// The small tsu (sokuon); borrows a consonant from the next mora.
    Gemination,
    /// Anything outside the phonetic script, typed verbatim.
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMora<'a> {
    pub text: &'a str,
    pub kind: MoraKind,
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3041}'..='\u{3096}').contains(&c) || ('\u{309D}'..='\u{309F}').contains(&c)
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30A1}'..='\u{30FA}').contains(&c) || ('\u{30FD}'..='\u{30FF}').contains(&c)
}

/// Phonetic script: hiragana, katakana and the long vowel mark.
/// The katakana middle dot is punctuation and does not count.
pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || c == LONG_VOWEL_MARK
}

pub fn is_sokuon(c: char) -> bool {
    c == 'っ' || c == 'ッ'
}

pub fn is_contracting_mark(c: char) -> bool {
    CONTRACTING_MARKS.contains(&c)
}

/// Folds katakana onto the hiragana block. Characters without a hiragana
/// counterpart (`ヷ`..`ヺ`, `ー`, non-kana) come back unchanged.
pub fn to_hiragana(c: char) -> char {
    match c {
        '\u{30A1}'..='\u{30F6}' | '\u{30FD}'..='\u{30FE}' => {
            char::from_u32(c as u32 - 0x60).unwrap_or(c)
        }
        _ => c,
    }
}

fn can_contract(base: char) -> bool {
    is_kana(base) && !is_sokuon(base) && !is_contracting_mark(base) && base != LONG_VOWEL_MARK
}

/// Splits `text` into moras. A base kana immediately followed by a
/// contracting mark becomes one two-character mora; every other character is
/// its own mora.
pub fn split_moras(text: &str) -> Vec<RawMora<'_>> {
    let mut moras = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        let kind = if !is_kana(c) {
            MoraKind::PassThrough
        } else if is_sokuon(c) {
            MoraKind::Gemination
        } else if let Some(&(next_start, next)) = chars.peek().filter(|_| can_contract(c)) {
            if is_contracting_mark(next) {
                chars.next();
                end = next_start + next.len_utf8();
                MoraKind::Contracted
            } else {
                MoraKind::Plain
            }
        } else {
            MoraKind::Plain
        };

        moras.push(RawMora {
            text: &text[start..end],
            kind,
        });
    }

    moras
}

/// The consonant a gemination mark borrows from the romanized mora that
/// follows it, if that mora starts with one.
pub fn gemination_consonant(next_romaji: &str) -> Option<char> {
    next_romaji
        .chars()
        .next()
        .filter(|c| CONSONANTS.contains(c.to_ascii_lowercase()))
}
