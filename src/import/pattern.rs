use std::sync::OnceLock;

use regex::Regex;

use crate::ir::MovementKind;

/// Movement keyword followed by the first digit run after it. The `.*?` is
/// non-greedy: the shortest span up to a digit decides which number is
/// taken, even when the narrative carries earlier incidental digits.
/// Matches anywhere in the text, including inside longer words.
pub const MOVEMENT_PATTERN: &str = r"(?i)(AQUISICAO|PAGAMENTO).*?(\d+)";

fn movement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MOVEMENT_PATTERN).expect("movement regex"))
}

/// Extract the movement kind and invoice number from a history text, or
/// `None` when the text carries no recognizable movement.
pub fn match_movement(text: &str) -> Option<(MovementKind, String)> {
    let captures = movement_re().captures(text)?;
    let kind = if captures[1].eq_ignore_ascii_case("AQUISICAO") {
        MovementKind::Acquisition
    } else {
        MovementKind::Payment
    };
    Some((kind, captures[2].to_string()))
}
