use rand::seq::index;
use rand::{Rng, RngCore};

use crate::language::Language;

/// Pool used when the caller supplies no words at all.
const PADDING_FR: [&str; 3] = ["Écho", "Son", "Rêve"];
const PADDING_EN: [&str; 3] = ["Echo", "Sound", "Dream"];

/// Number of title patterns per language.
const PATTERN_COUNT: usize = 8;

/// Generate a title from two words of `words`, the `theme`, and one of eight
/// language-specific patterns. Both words and pattern are drawn at random.
///
/// An empty pool is replaced by a fixed triplet; a single word is used twice.
pub fn generate_title<S: AsRef<str>>(
    words: &[S],
    theme: &str,
    language: Language,
    rng: &mut dyn RngCore,
) -> String {
    let mut pool: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
    if pool.is_empty() {
        pool = match language {
            Language::French => PADDING_FR.to_vec(),
            Language::English => PADDING_EN.to_vec(),
        };
    } else if pool.len() == 1 {
        pool.push(pool[0]);
    }

    let picked = index::sample(rng, pool.len(), 2);
    let pattern = rng.gen_range(0..PATTERN_COUNT);
    render(pattern, pool[picked.index(0)], pool[picked.index(1)], theme, language)
}

/// Render pattern `n` (0..8) with words `a`, `b` and `theme`.
fn render(n: usize, a: &str, b: &str, theme: &str, language: Language) -> String {
    let cap = capitalize(theme);
    match language {
        Language::French => match n {
            0 => format!("{a} {theme}"),
            1 => format!("{a} // {b}"),
            2 => format!("{cap} de {}", a.to_lowercase()),
            3 => format!("{a} dans la {theme}"),
            4 => format!("{a} et {b}"),
            5 => format!("Le {} {theme}", a.to_lowercase()),
            6 => format!("{a} sans {}", b.to_lowercase()),
            _ => format!("{cap} : {a}"),
        },
        Language::English => match n {
            0 => format!("{a} {theme}"),
            1 => format!("{a} // {b}"),
            2 => format!("{cap} of {a}"),
            3 => format!("{a} in the {theme}"),
            4 => format!("{a} & {b}"),
            5 => format!("The {a} {theme}"),
            6 => format!("{a} without {b}"),
            _ => format!("{cap}: {a}"),
        },
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{}{}", upper, chars.as_str().to_lowercase())
        }
    }
}
