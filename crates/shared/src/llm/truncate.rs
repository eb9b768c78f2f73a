use crate::history::{Role, Turn};

/// A partially fitting turn is only kept when more than this many characters remain.
pub const TRUNCATION_SLACK_CHARS: i64 = 50;

/// Bounds a conversation to `max_chars` characters of content.
///
/// System turns are always kept, even when they alone exceed the budget. The most
/// recent turns are kept whole while they fit; the first turn that does not fit
/// contributes its tail when the remaining budget is larger than
/// [`TRUNCATION_SLACK_CHARS`]. A budget of zero or less means "no limit".
///
/// The result is chronological, system turns first.
pub fn truncate_history(turns: &[Turn], max_chars: i64) -> Vec<Turn> {
    if max_chars <= 0 {
        return turns.to_vec();
    }

    let total: i64 = turns.iter().map(char_len).sum();
    if total <= max_chars {
        return turns.to_vec();
    }

    let system_turns = turns
        .iter()
        .filter(|turn| turn.role == Role::System)
        .cloned()
        .collect::<Vec<_>>();
    let mut used: i64 = system_turns.iter().map(char_len).sum();

    let mut kept_newest_first = Vec::new();
    for turn in turns.iter().rev().filter(|turn| turn.role != Role::System) {
        let len = char_len(turn);
        if used + len <= max_chars {
            kept_newest_first.push(turn.clone());
            used += len;
            continue;
        }

        let remaining = max_chars - used;
        if remaining > TRUNCATION_SLACK_CHARS {
            kept_newest_first.push(Turn {
                content: tail_chars(&turn.content, remaining as usize),
                ..turn.clone()
            });
        }
        break;
    }

    let mut result = system_turns;
    result.extend(kept_newest_first.into_iter().rev());
    result
}

fn char_len(turn: &Turn) -> i64 {
    turn.char_len() as i64
}

fn tail_chars(value: &str, count: usize) -> String {
    let skip = value.chars().count().saturating_sub(count);
    value.chars().skip(skip).collect()
}
