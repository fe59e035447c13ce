//! Kana to romaji transliteration.

use crate::kana::{self, gemination_consonant, split_moras, MoraKind};

/// Transliteration capability consumed by the notation parser.
///
/// Implementations must be deterministic, and romanizing a contracted pair
/// must give the same result whether it is passed alone or inside a longer
/// string.
pub trait Transliterator {
    fn romanize(&self, text: &str) -> String;
    fn is_phonetic_script(&self, text: &str) -> bool;
}

/// Table driven Hepburn romanization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hepburn;

impl Hepburn {
    pub fn new() -> Self {
        Self
    }

    /// Romanizes a single mora (one kana, or a base plus contracting mark).
    /// Returns an empty string for kana the table does not know.
    fn romanize_mora(&self, mora: &str) -> String {
        let mut chars = mora.chars();
        let (Some(base), mark) = (chars.next(), chars.next()) else {
            return String::new();
        };

        match (base_romaji(base), mark) {
            (Some(romaji), None) => romaji.to_string(),
            (Some(romaji), Some(mark)) => contract(romaji, mark),
            (None, _) => String::new(),
        }
    }
}

impl Transliterator for Hepburn {
    fn romanize(&self, text: &str) -> String {
        let moras = split_moras(text);
        let mut parts: Vec<String> = moras
            .iter()
            .map(|mora| match mora.kind {
                MoraKind::PassThrough => mora.text.to_string(),
                MoraKind::Gemination => String::new(),
                MoraKind::Plain | MoraKind::Contracted => self.romanize_mora(mora.text),
            })
            .collect();

        // right to left so a run of marks all borrow the same consonant
        for idx in (0..moras.len()).rev() {
            if moras[idx].kind == MoraKind::Gemination {
                parts[idx] = parts
                    .get(idx + 1)
                    .and_then(|next| gemination_consonant(next))
                    .map(String::from)
                    .unwrap_or_default();
            }
        }

        parts.concat()
    }

    fn is_phonetic_script(&self, text: &str) -> bool {
        !text.is_empty() && text.chars().all(kana::is_kana)
    }
}

fn base_romaji(c: char) -> Option<&'static str> {
    let romaji = match kana::to_hiragana(c) {
        'あ' => "a",
        'い' => "i",
        'う' => "u",
        'え' => "e",
        'お' => "o",
        'か' | 'ゕ' => "ka",
        'き' => "ki",
        'く' => "ku",
        'け' | 'ゖ' => "ke",
        'こ' => "ko",
        'が' => "ga",
        'ぎ' => "gi",
        'ぐ' => "gu",
        'げ' => "ge",
        'ご' => "go",
        'さ' => "sa",
        'し' => "shi",
        'す' => "su",
        'せ' => "se",
        'そ' => "so",
        'ざ' => "za",
        'じ' | 'ぢ' => "ji",
        'ず' | 'づ' => "zu",
        'ぜ' => "ze",
        'ぞ' => "zo",
        'た' => "ta",
        'ち' => "chi",
        'つ' => "tsu",
        'て' => "te",
        'と' => "to",
        'だ' => "da",
        'で' => "de",
        'ど' => "do",
        'な' => "na",
        'に' => "ni",
        'ぬ' => "nu",
        'ね' => "ne",
        'の' => "no",
        'は' => "ha",
        'ひ' => "hi",
        'ふ' => "fu",
        'へ' => "he",
        'ほ' => "ho",
        'ば' => "ba",
        'び' => "bi",
        'ぶ' => "bu",
        'べ' => "be",
        'ぼ' => "bo",
        'ぱ' => "pa",
        'ぴ' => "pi",
        'ぷ' => "pu",
        'ぺ' => "pe",
        'ぽ' => "po",
        'ま' => "ma",
        'み' => "mi",
        'む' => "mu",
        'め' => "me",
        'も' => "mo",
        'や' => "ya",
        'ゆ' => "yu",
        'よ' => "yo",
        'ら' => "ra",
        'り' => "ri",
        'る' => "ru",
        'れ' => "re",
        'ろ' => "ro",
        'わ' | 'ゎ' => "wa",
        'ゐ' => "wi",
        'ゑ' => "we",
        'を' => "wo",
        'ん' => "n",
        'ゔ' => "vu",
        'ヷ' => "va",
        'ヸ' => "vi",
        'ヹ' => "ve",
        'ヺ' => "vo",
        'ぁ' => "a",
        'ぃ' => "i",
        'ぅ' => "u",
        'ぇ' => "e",
        'ぉ' => "o",
        'ゃ' => "ya",
        'ゅ' => "yu",
        'ょ' => "yo",
        kana::LONG_VOWEL_MARK => "-",
        _ => return None,
    };
    Some(romaji)
}

/// Combines a base syllable with a small contracting kana.
fn contract(base: &str, mark: char) -> String {
    let mark = kana::to_hiragana(mark);
    let stem = &base[..base.len() - 1];

    let vowel = match mark {
        'ゃ' | 'ゅ' | 'ょ' => {
            let vowel = match mark {
                'ゃ' => 'a',
                'ゅ' => 'u',
                _ => 'o',
            };
            return match base {
                "shi" | "chi" | "ji" => format!("{stem}{vowel}"),
                b if b.len() > 1 && b.ends_with('i') => format!("{stem}y{vowel}"),
                b => format!("{b}y{vowel}"),
            };
        }
        'ぁ' => 'a',
        'ぃ' => 'i',
        'ぅ' => 'u',
        'ぇ' => 'e',
        _ => 'o',
    };

    match (base, vowel) {
        ("u", v) => format!("w{v}"),
        ("i", 'e') => "ye".to_string(),
        ("fu" | "tsu" | "vu", v) => format!("{stem}{v}"),
        ("te" | "de", 'i') | ("to" | "do", 'u') => format!("{stem}{vowel}"),
        ("shi" | "chi" | "ji", 'e') => format!("{stem}e"),
        ("ku" | "gu", v) => format!("{stem}w{v}"),
        (b, v) if b.len() > 1 && b.ends_with('i') => format!("{stem}y{v}"),
        (b, v) => format!("{b}{v}"),
    }
}
