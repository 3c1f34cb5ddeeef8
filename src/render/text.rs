//! Title markup (`#chi^{2}`, `p_{T}`) to plain Unicode for drawing.

use regex::{Captures, Regex};
use std::sync::OnceLock;

const GREEK: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("eta", "η"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Sigma", "Σ"),
    ("Phi", "Φ"),
    ("Omega", "Ω"),
    ("pm", "±"),
    ("times", "×"),
];

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        _ => return None,
    })
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"#([A-Za-z]+)|\^\{([^}]*)\}|_\{([^}]*)\}").expect("static markup regex")
    })
}

/// Replace Greek escapes and super/subscript groups. Groups without a
/// Unicode form fall back to `^x` for superscripts and plain text for
/// subscripts; unknown escapes are left as written.
pub fn markup_to_unicode(s: &str) -> String {
    markup_re()
        .replace_all(s, |caps: &Captures| {
            if let Some(name) = caps.get(1) {
                return GREEK
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_else(|| caps[0].to_string());
            }
            if let Some(sup) = caps.get(2) {
                return sup
                    .as_str()
                    .chars()
                    .map(superscript)
                    .collect::<Option<String>>()
                    .unwrap_or_else(|| format!("^{}", sup.as_str()));
            }
            let sub = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            sub.chars()
                .map(subscript)
                .collect::<Option<String>>()
                .unwrap_or_else(|| sub.to_string())
        })
        .into_owned()
}
