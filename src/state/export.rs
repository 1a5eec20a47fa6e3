use anyhow::Context;
use courtside_api::format::{
    format_court, format_date, format_duration, format_event_type, format_match_number,
};
use courtside_api::scoring::{self, NOT_AVAILABLE};
use courtside_api::Match;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Plain-text scoresheet for printing.
pub fn scoresheet_text(m: &Match) -> String {
    let timestamp = |t: Option<chrono::NaiveDateTime>| {
        t.map(|t| t.format("%b %-d, %Y, %I:%M %p").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "SCORESHEET  {}  {}",
        format_match_number(&m.match_number),
        format_event_type(&m.event_type)
    );
    let _ = writeln!(out, "{}  {} {}", format_court(&m.court), format_date(&m.date), m.time);
    let _ = writeln!(
        out,
        "Umpire: {}  Service judge: {}",
        m.umpire.as_deref().unwrap_or("-"),
        m.service_judge.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Player 1: {}", m.player1);
    let _ = writeln!(out, "Player 2: {}", m.player2);
    let _ = writeln!(
        out,
        "Rules: {} points, best of {}, deuce {}",
        m.config.max_points,
        m.config.total_sets,
        if m.config.deuce_enabled { "on" } else { "off" }
    );
    let _ = writeln!(out);

    for set in &m.scores {
        let winner = match scoring::set_winner(set) {
            Some(side) => m.player_name(side).to_string(),
            None if set.completed => "level".to_string(),
            None => "not finished".to_string(),
        };
        let _ = writeln!(
            out,
            "Set {}: {:>2}-{:<2}  {winner}",
            set.set_number, set.player1_score, set.player2_score
        );
    }

    let outcome = scoring::match_outcome(m);
    let result = match outcome.winner {
        Some(side) => format!("{} wins", m.player_name(side)),
        None => "Draw".to_string(),
    };
    let _ = writeln!(out, "Result: {result} {}", scoring::final_score_label(m));
    let _ = writeln!(out);
    let _ = writeln!(out, "Started: {}", timestamp(m.start_time));
    let _ = writeln!(out, "Ended: {}", timestamp(m.end_time));
    let duration = match m.duration.as_deref() {
        Some(d) => format_duration(Some(d)),
        None => scoring::duration_between(m.start_time, m.end_time),
    };
    let _ = writeln!(out, "Duration: {duration}");
    let _ = writeln!(out, "Shuttles used: {}", m.shuttles_used);
    out
}

pub fn scoresheet_file_name(m: &Match) -> String {
    let number: String = m
        .match_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if number.is_empty() {
        format!("scoresheet-{}.txt", m.id)
    } else {
        format!("scoresheet-{}-{number}.txt", m.id)
    }
}

/// Write the scoresheet into `dir`, returning the file written.
pub fn write_scoresheet(dir: &Path, m: &Match) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(scoresheet_file_name(m));
    std::fs::write(&path, scoresheet_text(m))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Name of the side that won, for log lines.
pub fn winner_name(m: &Match) -> Option<&str> {
    scoring::match_outcome(m).winner.map(|side| m.player_name(side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_api::{MatchConfig, MatchStatus, SetScore};

    fn set(n: u32, p1: u32, p2: u32) -> SetScore {
        SetScore { set_number: n, player1_score: p1, player2_score: p2, completed: true, updated_at: None }
    }

    fn final_match() -> Match {
        Match {
            id: 31,
            event_type: "mixed doubles".into(),
            match_number: "qf-1".into(),
            date: "2024-05-01".into(),
            time: "14:00".into(),
            court: "court2".into(),
            umpire: Some("Ng".into()),
            player1: "Zheng/Huang".into(),
            player2: "Watanabe/Higashino".into(),
            status: MatchStatus::Completed,
            config: MatchConfig::default(),
            current_set: 3,
            scores: vec![set(1, 21, 15), set(2, 18, 21), set(3, 21, 19)],
            duration: Some("1h 5m".into()),
            shuttles_used: 14,
            ..Match::default()
        }
    }

    #[test]
    fn scoresheet_lists_sets_and_result() {
        let text = scoresheet_text(&final_match());
        assert!(text.starts_with("SCORESHEET  QF-1  Mixed Doubles\n"));
        assert!(text.contains("Court 2  May 1, 2024 14:00"));
        assert!(text.contains("Umpire: Ng  Service judge: -"));
        assert!(text.contains("Set 2: 18-21  Watanabe/Higashino"));
        assert!(text.contains("Result: Zheng/Huang wins 2-1"));
        assert!(text.contains("Duration: 1h 5m"));
        assert!(text.contains("Shuttles used: 14"));
        assert_eq!(winner_name(&final_match()), Some("Zheng/Huang"));
    }

    #[test]
    fn level_match_reads_as_draw() {
        let mut m = final_match();
        m.scores.pop();
        assert!(scoresheet_text(&m).contains("Result: Draw 1-1"));
        assert_eq!(winner_name(&m), None);
    }

    #[test]
    fn file_name_is_safe() {
        let mut m = final_match();
        m.match_number = "QF 1/a".into();
        assert_eq!(scoresheet_file_name(&m), "scoresheet-31-QF_1_a.txt");
        m.match_number.clear();
        assert_eq!(scoresheet_file_name(&m), "scoresheet-31.txt");
    }

    #[test]
    fn writes_into_export_dir() {
        let dir = std::env::temp_dir().join(format!("courtside-export-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = write_scoresheet(&dir, &final_match()).unwrap();
        assert_eq!(path, dir.join("scoresheet-31-qf-1.txt"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Shuttles used: 14"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
