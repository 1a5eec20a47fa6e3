//! Score derivations over a match snapshot.
//!
//! Everything here is a pure projection of a [`Match`] as last fetched from the API. Nothing
//! mutates the snapshot and nothing fails: missing or inconsistent data (a set the API has not
//! reported yet, a `current_set` outside `1..=total_sets`) is clamped or replaced by a neutral
//! value, because transient inconsistency between polls is expected.

use crate::{Match, MatchConfig, MatchStatus, SetScore, Side};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Placeholder shown when a time value is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Result of comparing set wins. `winner` is `None` and `is_draw` is set whenever the tally is
/// level, including before any set has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub winner: Option<Side>,
    pub is_draw: bool,
}

/// What the scorer can do once the current set is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    NextSet,
    EndMatch,
}

/// `current_set` clamped into `1..=total_sets`.
fn current_set_number(m: &Match) -> u32 {
    m.current_set.clamp(1, m.config.total_sets.max(1))
}

fn counts_towards_tally(m: &Match, set: &SetScore) -> bool {
    set.completed && (1..=m.config.total_sets).contains(&set.set_number)
}

pub fn current_set(m: &Match) -> SetScore {
    let number = current_set_number(m);
    m.scores
        .iter()
        .find(|s| s.set_number == number)
        .cloned()
        .unwrap_or_else(|| SetScore::empty(number))
}

pub fn is_deuce(m: &Match) -> bool {
    if !m.config.deuce_enabled {
        return false;
    }
    let set = current_set(m);
    let threshold = m.config.max_points.saturating_sub(1);
    set.player1_score >= threshold
        && set.player2_score >= threshold
        && set.player1_score.abs_diff(set.player2_score) < 2
}

/// Winner of a single set. Only completed sets have one, and a level completed set has none.
pub fn set_winner(set: &SetScore) -> Option<Side> {
    if !set.completed {
        return None;
    }
    match set.player1_score.cmp(&set.player2_score) {
        std::cmp::Ordering::Greater => Some(Side::Player1),
        std::cmp::Ordering::Less => Some(Side::Player2),
        std::cmp::Ordering::Equal => None,
    }
}

/// Completed sets won by `side`. A set number reported more than once counts once, by its
/// first completed record.
pub fn set_wins(m: &Match, side: Side) -> u32 {
    let mut seen = BTreeSet::new();
    m.scores
        .iter()
        .filter(|s| counts_towards_tally(m, s))
        .filter(|s| seen.insert(s.set_number))
        .filter(|s| set_winner(s) == Some(side))
        .count() as u32
}

pub fn match_outcome(m: &Match) -> MatchOutcome {
    let p1 = set_wins(m, Side::Player1);
    let p2 = set_wins(m, Side::Player2);
    let winner = match p1.cmp(&p2) {
        std::cmp::Ordering::Greater => Some(Side::Player1),
        std::cmp::Ordering::Less => Some(Side::Player2),
        std::cmp::Ordering::Equal => None,
    };
    MatchOutcome { winner, is_draw: winner.is_none() }
}

pub fn final_score_label(m: &Match) -> String {
    format!("{}-{}", set_wins(m, Side::Player1), set_wins(m, Side::Player2))
}

/// The current set's record is marked completed. Looked up by set number, like
/// [`current_set`], so a gap in `scores` cannot make the two disagree.
pub fn is_set_just_completed(m: &Match) -> bool {
    current_set(m).completed
}

/// `HH:MM:SS` between `start` and `now`, floored to whole seconds.
pub fn elapsed_since(start: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(start) = start else {
        return NOT_AVAILABLE.to_owned();
    };
    let secs = (now - start).num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Duration in the API's own `"{h}h {m}m"` format.
pub fn duration_between(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return NOT_AVAILABLE.to_owned();
    };
    let mins = (end - start).num_minutes().max(0);
    format!("{}h {}m", mins / 60, mins % 60)
}

/// The completion rule the API applies after every score change.
pub fn is_set_won(config: &MatchConfig, player1_score: u32, player2_score: u32) -> bool {
    let reached = |own: u32, other: u32| {
        own >= config.max_points && (!config.deuce_enabled || own >= other + 2)
    };
    reached(player1_score, player2_score) || reached(player2_score, player1_score)
}

/// Side that closes the current set with its next point.
pub fn game_point(m: &Match) -> Option<Side> {
    let set = current_set(m);
    if set.completed {
        return None;
    }
    [Side::Player1, Side::Player2].into_iter().find(|side| {
        let (p1, p2) = match side {
            Side::Player1 => (set.player1_score + 1, set.player2_score),
            Side::Player2 => (set.player1_score, set.player2_score + 1),
        };
        is_set_won(&m.config, p1, p2)
    })
}

/// Side ahead in the current set. A level set has no leader.
pub fn leading_side(m: &Match) -> Option<Side> {
    let set = current_set(m);
    match set.player1_score.cmp(&set.player2_score) {
        std::cmp::Ordering::Greater => Some(Side::Player1),
        std::cmp::Ordering::Less => Some(Side::Player2),
        std::cmp::Ordering::Equal => None,
    }
}

pub fn can_score(m: &Match) -> bool {
    m.status == MatchStatus::Live && !current_set(m).completed
}

pub fn next_step(m: &Match) -> Option<NextStep> {
    if m.status != MatchStatus::Live || !is_set_just_completed(m) {
        return None;
    }
    if current_set_number(m) < m.config.total_sets {
        Some(NextStep::NextSet)
    } else {
        Some(NextStep::EndMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn set(n: u32, p1: u32, p2: u32, completed: bool) -> SetScore {
        SetScore {
            set_number: n,
            player1_score: p1,
            player2_score: p2,
            completed,
            updated_at: None,
        }
    }

    fn live_match(current_set: u32, scores: Vec<SetScore>) -> Match {
        Match {
            id: 7,
            player1: "Axelsen".into(),
            player2: "Momota".into(),
            status: MatchStatus::Live,
            config: MatchConfig::default(),
            current_set,
            scores,
            ..Match::default()
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid test timestamp")
    }

    #[test]
    fn current_set_synthesizes_missing_record() {
        let m = live_match(1, Vec::new());
        assert_eq!(current_set(&m), SetScore::empty(1));
    }

    #[test]
    fn current_set_clamps_out_of_range_index() {
        let m = live_match(9, vec![set(1, 21, 10, true), set(2, 5, 4, false), set(3, 1, 0, false)]);
        assert_eq!(current_set(&m).set_number, 3);

        let m = live_match(0, vec![set(1, 3, 2, false)]);
        assert_eq!(current_set(&m).player1_score, 3);
    }

    #[test]
    fn deuce_needs_both_sides_at_cap_minus_one() {
        assert!(is_deuce(&live_match(1, vec![set(1, 20, 20, false)])));
        assert!(!is_deuce(&live_match(1, vec![set(1, 20, 19, false)])));
        assert!(is_deuce(&live_match(1, vec![set(1, 24, 23, false)])));
        assert!(!is_deuce(&live_match(1, vec![set(1, 25, 23, false)])));
    }

    #[test]
    fn deuce_is_off_when_disabled() {
        let mut m = live_match(1, vec![set(1, 20, 20, false)]);
        m.config.deuce_enabled = false;
        assert!(!is_deuce(&m));
    }

    #[test]
    fn three_set_tally_picks_player_one() {
        let mut m = live_match(
            3,
            vec![set(1, 21, 15, true), set(2, 18, 21, true), set(3, 21, 19, true)],
        );
        m.status = MatchStatus::Completed;
        assert_eq!(set_wins(&m, Side::Player1), 2);
        assert_eq!(set_wins(&m, Side::Player2), 1);
        assert_eq!(
            match_outcome(&m),
            MatchOutcome { winner: Some(Side::Player1), is_draw: false }
        );
        assert_eq!(final_score_label(&m), "2-1");
    }

    #[test]
    fn tied_completed_set_counts_for_nobody() {
        let m = live_match(2, vec![set(1, 15, 15, true), set(2, 0, 0, false)]);
        assert_eq!(set_wins(&m, Side::Player1), 0);
        assert_eq!(set_wins(&m, Side::Player2), 0);
        assert_eq!(set_winner(&m.scores[0]), None);
    }

    #[test]
    fn each_completed_set_credits_at_most_one_side() {
        let scores = vec![set(1, 21, 15, true), set(2, 19, 21, true), set(3, 7, 7, true)];
        for n in 1..=scores.len() {
            let m = live_match(n as u32, scores[..n].to_vec());
            let total = set_wins(&m, Side::Player1) + set_wins(&m, Side::Player2);
            let decided = m.scores.iter().filter(|s| set_winner(s).is_some()).count() as u32;
            assert_eq!(total, decided);
        }
    }

    #[test]
    fn level_tally_is_a_draw_not_a_default_winner() {
        let m = live_match(3, vec![set(1, 21, 15, true), set(2, 10, 21, true), set(3, 0, 0, false)]);
        assert_eq!(match_outcome(&m), MatchOutcome { winner: None, is_draw: true });

        let fresh = live_match(1, Vec::new());
        assert_eq!(match_outcome(&fresh), MatchOutcome { winner: None, is_draw: true });
    }

    #[test]
    fn two_set_wins_in_best_of_three_decide_the_match() {
        let mut m = live_match(2, vec![set(1, 21, 3, true), set(2, 21, 19, true), set(3, 0, 0, false)]);
        m.status = MatchStatus::Completed;
        assert_eq!(match_outcome(&m).winner, Some(Side::Player1));
    }

    #[test]
    fn final_score_ignores_sets_beyond_total() {
        let mut m = live_match(
            1,
            vec![set(1, 21, 3, true), set(2, 21, 3, true), set(3, 21, 3, true), set(4, 21, 3, true)],
        );
        m.config.total_sets = 3;
        assert_eq!(final_score_label(&m), "3-0");
    }

    #[test]
    fn set_just_completed_follows_current_set() {
        let m = live_match(1, vec![set(1, 21, 10, true), set(2, 0, 0, false)]);
        assert!(is_set_just_completed(&m));
        let m = live_match(2, vec![set(1, 21, 10, true), set(2, 0, 0, false)]);
        assert!(!is_set_just_completed(&m));
        assert!(!is_set_just_completed(&live_match(1, Vec::new())));
    }

    #[test]
    fn elapsed_formats_whole_seconds() {
        let start = at(10, 0, 0);
        let now = start + chrono::Duration::seconds(3725) + chrono::Duration::milliseconds(900);
        assert_eq!(elapsed_since(Some(start), now), "01:02:05");
        assert_eq!(elapsed_since(None, now), NOT_AVAILABLE);
        assert_eq!(elapsed_since(Some(now), start), "00:00:00");
    }

    #[test]
    fn elapsed_does_not_wrap_after_a_day() {
        let start = at(0, 0, 0);
        let now = start + chrono::Duration::hours(25);
        assert_eq!(elapsed_since(Some(start), now), "25:00:00");
    }

    #[test]
    fn duration_matches_server_format() {
        assert_eq!(duration_between(Some(at(9, 0, 0)), Some(at(10, 5, 59))), "1h 5m");
        assert_eq!(duration_between(Some(at(9, 0, 0)), None), NOT_AVAILABLE);
    }

    #[test]
    fn set_completion_rule_with_and_without_deuce() {
        let deuce = MatchConfig::default();
        assert!(is_set_won(&deuce, 21, 19));
        assert!(!is_set_won(&deuce, 21, 20));
        assert!(is_set_won(&deuce, 20, 22));

        let sudden = MatchConfig { deuce_enabled: false, ..deuce };
        assert!(is_set_won(&sudden, 21, 20));
        assert!(!is_set_won(&sudden, 20, 20));
    }

    #[test]
    fn game_point_and_leader() {
        let m = live_match(1, vec![set(1, 20, 18, false)]);
        assert_eq!(game_point(&m), Some(Side::Player1));
        assert_eq!(leading_side(&m), Some(Side::Player1));

        let m = live_match(1, vec![set(1, 20, 20, false)]);
        assert_eq!(game_point(&m), None);
        assert_eq!(leading_side(&m), None);

        let m = live_match(1, vec![set(1, 20, 21, false)]);
        assert_eq!(game_point(&m), Some(Side::Player2));
    }

    #[test]
    fn controls_follow_set_and_match_state() {
        let m = live_match(1, vec![set(1, 21, 10, true), set(2, 0, 0, false), set(3, 0, 0, false)]);
        assert!(!can_score(&m));
        assert_eq!(next_step(&m), Some(NextStep::NextSet));

        let m = live_match(3, vec![set(1, 21, 10, true), set(2, 9, 21, true), set(3, 21, 2, true)]);
        assert_eq!(next_step(&m), Some(NextStep::EndMatch));

        let mut m = live_match(1, vec![set(1, 3, 2, false)]);
        assert!(can_score(&m));
        assert_eq!(next_step(&m), None);
        m.status = MatchStatus::Scheduled;
        assert!(!can_score(&m));
    }

    #[test]
    fn gap_in_scores_still_offers_next_set() {
        let m = live_match(2, vec![set(2, 21, 10, true)]);
        assert!(current_set(&m).completed);
        assert!(is_set_just_completed(&m));
        assert!(!can_score(&m));
        assert_eq!(next_step(&m), Some(NextStep::NextSet));
    }

    #[test]
    fn repeated_set_record_is_tallied_once() {
        let mut m = live_match(
            3,
            vec![set(1, 21, 5, true), set(1, 21, 5, true), set(1, 21, 5, true), set(2, 21, 8, true)],
        );
        m.config.total_sets = 3;
        assert_eq!(set_wins(&m, Side::Player1), 2);
        assert_eq!(final_score_label(&m), "2-0");

        let m = live_match(2, vec![set(1, 21, 5, true), set(1, 5, 21, true)]);
        assert_eq!(set_wins(&m, Side::Player1) + set_wins(&m, Side::Player2), 1);
    }
}
