use chrono::{Local, NaiveDateTime};
use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::scorecard::{BigScore, DIGIT_HEIGHT};
use crate::state::app_state::{
    AdminView, FormField, HistoryState, PlayerField, SettingsField, result_label,
};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use courtside_api::format::{
    format_court, format_datetime, format_duration, format_event_type, format_match_number,
};
use courtside_api::scoring::{self, NOT_AVAILABLE, NextStep};
use courtside_api::{Match, MatchStatus, Side, SortOrder};

static TABS: &[&str; 4] = &["Dashboard", "Scoring", "History", "Admin"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let now = Local::now().naive_local();

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Dashboard => draw_dashboard(f, layout.main, app, now),
            MenuItem::Scoring => draw_scoring(f, layout.main, app, now),
            MenuItem::History => draw_history(f, layout.main, app),
            MenuItem::Admin => draw_admin(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Dashboard => 0,
        MenuItem::Scoring => 1,
        MenuItem::History => 2,
        MenuItem::Admin => 3,
        MenuItem::Help => match app.state.previous_tab {
            MenuItem::Scoring => 1,
            MenuItem::History => 2,
            MenuItem::Admin => 3,
            _ => 0,
        },
    };

    let titles: Vec<Line> = TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {t}", i + 1)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else {
        let auth = if app.state.auth.is_admin {
            "admin"
        } else if app.state.auth.authenticated {
            "signed in"
        } else {
            "read-only"
        };
        let updated = app
            .state
            .dashboard
            .last_updated
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        Line::from(Span::styled(
            format!(" {}  |  {auth}  |  updated {updated}", app.settings.api_url),
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App, now: NaiveDateTime) {
    let block = default_border(Color::White).title(" Dashboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let dashboard = &app.state.dashboard;
    let stats = &dashboard.stats;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Live ", Style::default().fg(Color::DarkGray)),
            Span::styled(stats.live_matches.to_string(), Style::default().fg(Color::Green)),
            Span::styled("   Completed today ", Style::default().fg(Color::DarkGray)),
            Span::raw(stats.completed_today.to_string()),
            Span::styled("   Active courts ", Style::default().fg(Color::DarkGray)),
            Span::raw(stats.active_courts.to_string()),
            Span::styled("   Avg duration ", Style::default().fg(Color::DarkGray)),
            Span::raw(stats.avg_duration.clone()),
        ]),
        Line::from(Span::styled(
            "j/k select  Enter open  r refresh",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        section_title("LIVE"),
    ];

    if dashboard.live.is_empty() {
        lines.push(Line::from(Span::styled("  No live matches", Style::default().fg(Color::DarkGray))));
    }
    for (idx, m) in dashboard.live.iter().enumerate() {
        lines.push(live_row(m, idx == dashboard.selected, now));
    }

    lines.push(Line::from(""));
    lines.push(section_title("SCHEDULED"));
    if dashboard.scheduled.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No scheduled matches",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (idx, m) in dashboard.scheduled.iter().enumerate() {
        let selected = dashboard.live.len() + idx == dashboard.selected;
        lines.push(scheduled_row(m, selected));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    ))
}

fn marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled("> ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    }
}

fn player_style(m: &Match, side: Side) -> Style {
    if scoring::leading_side(m) == Some(side) {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn live_row(m: &Match, selected: bool, now: NaiveDateTime) -> Line<'static> {
    let set = scoring::current_set(m);
    let mut spans = vec![
        marker(selected),
        Span::styled(format!("{:<8} ", format_court(&m.court)), Style::default().fg(Color::DarkGray)),
        Span::styled(m.player1.clone(), player_style(m, Side::Player1)),
        Span::raw(" vs "),
        Span::styled(m.player2.clone(), player_style(m, Side::Player2)),
        Span::raw(format!(
            "   set {}: {}-{}   sets {}   ",
            set.set_number,
            set.player1_score,
            set.player2_score,
            scoring::final_score_label(m)
        )),
        Span::styled(scoring::elapsed_since(m.start_time, now), Style::default().fg(Color::Cyan)),
    ];
    spans.extend(badges(m));
    Line::from(spans)
}

fn scheduled_row(m: &Match, selected: bool) -> Line<'static> {
    Line::from(vec![
        marker(selected),
        Span::styled(format!("{:<8} ", format_court(&m.court)), Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            "{} {}  {} vs {}  ({}, {})",
            m.date,
            m.time,
            m.player1,
            m.player2,
            format_event_type(&m.event_type),
            format_match_number(&m.match_number)
        )),
    ])
}

/// DEUCE / GAME POINT / SET OVER markers for the current set.
fn badges(m: &Match) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if scoring::is_deuce(m) {
        spans.push(Span::styled(
            " DEUCE ",
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    if let Some(side) = scoring::game_point(m) {
        spans.push(Span::styled(
            format!(" GAME POINT {} ", m.player_name(side)),
            Style::default().fg(Color::Black).bg(Color::Magenta),
        ));
        spans.push(Span::raw(" "));
    }
    if m.is_live() && scoring::is_set_just_completed(m) {
        spans.push(Span::styled(
            " SET OVER ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ));
    }
    if !spans.is_empty() {
        spans.insert(0, Span::raw("  "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn draw_scoring(f: &mut Frame, area: Rect, app: &App, now: NaiveDateTime) {
    let block = default_border(Color::White).title(" Scoring ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(m) = app.state.scoring.snapshot.as_ref() else {
        let msg = match (app.state.scoring.match_id, app.state.last_error.as_deref()) {
            (Some(_), Some(err)) => format!("Match load failed:\n{err}"),
            (Some(id), None) => format!("Loading match {id}..."),
            (None, _) => "Open a match from the Dashboard or History tab with Enter".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let [header, players, score, badge_row, info, sets, controls] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(DIGIT_HEIGHT + 2),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .areas(inner);

    let status_style = match m.status {
        MatchStatus::Live => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        MatchStatus::Completed => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        MatchStatus::Scheduled => Style::default().fg(Color::DarkGray),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("[{}] ", m.status.label()), status_style),
            Span::raw(format!(
                "{}  {}  {}",
                format_match_number(&m.match_number),
                format_event_type(&m.event_type),
                format_court(&m.court)
            )),
        ]))
        .alignment(Alignment::Center),
        header,
    );

    let [p1_area, p2_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(players);
    for (side, area) in [(Side::Player1, p1_area), (Side::Player2, p2_area)] {
        let text = vec![
            Line::from(Span::styled(m.player_name(side).to_string(), player_style(m, side))),
            Line::from(Span::styled(
                format!("sets won: {}", scoring::set_wins(m, side)),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
    }

    let set = scoring::current_set(m);
    f.render_widget(
        BigScore {
            left: set.player1_score,
            right: set.player2_score,
            left_style: player_style(m, Side::Player1),
            right_style: player_style(m, Side::Player2),
        },
        score,
    );

    f.render_widget(Paragraph::new(Line::from(badges(m))).alignment(Alignment::Center), badge_row);

    let clock = match m.status {
        MatchStatus::Live => format!("elapsed {}", scoring::elapsed_since(m.start_time, now)),
        MatchStatus::Completed => format!(
            "duration {}",
            m.duration
                .clone()
                .unwrap_or_else(|| scoring::duration_between(m.start_time, m.end_time))
        ),
        MatchStatus::Scheduled => format!("scheduled {} {}", m.date, m.time),
    };
    let rules = format!(
        "Set {} of {}  |  to {}{}  |  {clock}  |  shuttles {}",
        set.set_number,
        m.config.total_sets,
        m.config.max_points,
        if m.config.deuce_enabled { ", deuce" } else { "" },
        m.shuttles_used
    );
    let officials = format!(
        "Umpire {}  |  Service judge {}",
        m.umpire.as_deref().unwrap_or(NOT_AVAILABLE),
        m.service_judge.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    f.render_widget(
        Paragraph::new(vec![Line::from(rules), Line::from(officials)])
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        info,
    );

    f.render_widget(Paragraph::new(set_history(m)), sets);
    f.render_widget(Paragraph::new(scoring_controls(m, app.state.scoring.updating)), controls);
}

fn set_history(m: &Match) -> Vec<Line<'static>> {
    let mut lines = vec![section_title("SETS")];
    for number in 1..=m.config.total_sets {
        let record = m.scores.iter().find(|s| s.set_number == number);
        let line = match record {
            Some(s) if s.completed => {
                let winner = scoring::set_winner(s)
                    .map(|side| m.player_name(side).to_string())
                    .unwrap_or_else(|| "no winner".to_string());
                format!("  Set {number}  {:>2}-{:<2}  {winner}", s.player1_score, s.player2_score)
            }
            Some(s) => format!("  Set {number}  {:>2}-{:<2}  in progress", s.player1_score, s.player2_score),
            None => format!("  Set {number}   -"),
        };
        lines.push(Line::from(line));
    }

    let outcome = scoring::match_outcome(m);
    let verdict = match (m.status, outcome.winner) {
        (MatchStatus::Completed, Some(side)) => format!("Winner: {}", m.player_name(side)),
        (MatchStatus::Completed, None) => "Draw".to_string(),
        (_, Some(side)) => format!("{} leads", m.player_name(side)),
        (_, None) => "Level".to_string(),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  Sets {}  {verdict}", scoring::final_score_label(m)),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines
}

fn scoring_controls(m: &Match, updating: bool) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    if updating {
        return vec![Line::from(Span::styled("updating...", Style::default().fg(Color::Yellow)))];
    }
    let keys = match (m.status, scoring::next_step(m)) {
        (MatchStatus::Scheduled, _) => "s start match".to_string(),
        (MatchStatus::Live, Some(NextStep::NextSet)) => "n next set  x end abruptly".to_string(),
        (MatchStatus::Live, Some(NextStep::EndMatch)) => "e end match  x end abruptly".to_string(),
        (MatchStatus::Live, None) => {
            "a/z +/- player 1  k/m +/- player 2  +/- shuttles  x end abruptly".to_string()
        }
        (MatchStatus::Completed, _) => format!("ended {}", format_datetime_opt(m.end_time)),
    };
    vec![Line::from(""), Line::from(Span::styled(keys, dim))]
}

fn format_datetime_opt(t: Option<NaiveDateTime>) -> String {
    let raw = t.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string());
    format_datetime(raw.as_deref())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn draw_history(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" History ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let history = &app.state.history;
    let court = history.court.as_deref().map(format_court).unwrap_or_else(|| "All courts".to_string());
    let order = match history.sort_order {
        SortOrder::Desc => "newest first",
        SortOrder::Asc => "oldest first",
    };
    let search = if history.editing_search {
        Span::styled(format!("/{}_", history.search), Style::default().fg(Color::Yellow))
    } else if history.search.is_empty() {
        Span::styled("/ search", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("/{}", history.search))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("{court}  |  {order}  |  ")),
            search,
        ]),
        Line::from(Span::styled(
            "c court  o order  / search  j/k select  Enter details  p export scoresheet",
            Style::default().fg(Color::DarkGray),
        )),
        history_stats_line(history),
    ];
    if let Some(notice) = history.notice.as_deref() {
        lines.push(Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Cyan))));
    }
    lines.push(Line::from(""));

    let visible = history.visible();
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No completed matches",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let max_rows = inner.height.saturating_sub(lines.len() as u16) as usize;
    let offset = history.selected.saturating_sub(max_rows.saturating_sub(1));
    for (idx, m) in visible.iter().enumerate().skip(offset).take(max_rows.max(1)) {
        lines.push(Line::from(vec![
            marker(idx == history.selected),
            Span::styled(format!("{:<8} ", format_court(&m.court)), Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{} vs {}  ", m.player1, m.player2)),
            Span::styled(
                format!("{} ({})", result_label(m), scoring::final_score_label(m)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {}  {}  ended {}  {}",
                    format_event_type(&m.event_type),
                    format_match_number(&m.match_number),
                    format_datetime_opt(m.end_time),
                    format_duration(m.duration.as_deref())
                ),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn history_stats_line(history: &HistoryState) -> Line<'static> {
    let stats = &history.stats;
    let mut events: Vec<_> = stats.event_distribution.iter().collect();
    events.sort();
    let events = events
        .iter()
        .map(|(event, count)| format!("{} {count}", format_event_type(event)))
        .collect::<Vec<_>>()
        .join(", ");
    Line::from(Span::styled(
        format!(
            "{} matches  {} shuttles ({:.1} per match)  {events}",
            stats.total_matches, stats.total_shuttles, stats.avg_shuttles_per_match
        ),
        Style::default().fg(Color::Gray),
    ))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

fn draw_admin(f: &mut Frame, area: Rect, app: &App) {
    let [views_area, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let admin = &app.state.admin;
    let mut spans = Vec::new();
    for view in AdminView::ALL {
        let style = if view == admin.view {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", view.label()), style));
    }
    let auth = if app.state.auth.authenticated { "L sign out" } else { "L sign in" };
    spans.push(Span::styled(format!("  v switch  {auth}"), Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(Line::from(spans)), views_area);

    match admin.view {
        AdminView::Schedule => draw_admin_schedule(f, body, app),
        AdminView::Players => draw_admin_players(f, body, app),
        AdminView::Settings => draw_admin_settings(f, body, app),
    }
}

fn admin_footer(lines: &mut Vec<Line<'static>>, app: &App) {
    if let Some(notice) = app.state.admin.notice.as_deref() {
        lines.push(Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Cyan))));
    }
    if !app.state.auth.authenticated {
        lines.push(Line::from(Span::styled(
            "Not signed in: set COURTSIDE_USER and COURTSIDE_PASSWORD",
            Style::default().fg(Color::Red),
        )));
    }
}

fn field_label(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("{label:<18}"), style)
}

fn draw_admin_schedule(f: &mut Frame, area: Rect, app: &App) {
    let [form_area, list_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let admin = &app.state.admin;
    let form_color = if admin.focus.is_some() { Color::Yellow } else { Color::White };
    let block = default_border(form_color).title(" Schedule match ");
    let inner = block.inner(form_area);
    f.render_widget(block, form_area);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = admin.focus == Some(field);
        let value = admin.form.value(field);
        let value = match (focused, field.is_choice()) {
            (true, true) => format!("< {value} >"),
            (true, false) => format!("{value}_"),
            (false, _) => value,
        };
        lines.push(Line::from(vec![field_label(field.label(), focused), Span::raw(value)]));
    }
    lines.push(Line::from(""));
    let hint = if admin.focus.is_some() {
        "Tab/BackTab field  ←/→ or space choose  Enter submit  Esc done"
    } else {
        "Tab edit form"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
    admin_footer(&mut lines, app);
    f.render_widget(Paragraph::new(lines), inner);

    let block = default_border(Color::White).title(" Scheduled ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    let mut lines = vec![
        Line::from(Span::styled(
            "j/k select  s start  d delete",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    if app.state.dashboard.scheduled.is_empty() {
        lines.push(Line::from(Span::styled("  Nothing scheduled", Style::default().fg(Color::DarkGray))));
    }
    for (idx, m) in app.state.dashboard.scheduled.iter().enumerate() {
        lines.push(scheduled_row(m, admin.focus.is_none() && idx == admin.selected));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_admin_players(f: &mut Frame, area: Rect, app: &App) {
    let [list_area, form_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
    let admin = &app.state.admin;

    let block = default_border(Color::White).title(" Players ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    let mut lines = vec![
        Line::from(Span::styled(
            "j/k select  a add  e edit  d delete",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    if admin.players.is_empty() {
        lines.push(Line::from(Span::styled("  No players", Style::default().fg(Color::DarkGray))));
    }
    let max_rows = inner.height.saturating_sub(lines.len() as u16) as usize;
    let offset = admin.player_selected.saturating_sub(max_rows.saturating_sub(1));
    for (idx, player) in admin.players.iter().enumerate().skip(offset).take(max_rows.max(1)) {
        lines.push(Line::from(vec![
            marker(admin.player_focus.is_none() && idx == admin.player_selected),
            Span::raw(format!("{:<24}", player.name)),
            Span::styled(
                player.team.clone().unwrap_or_default(),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }
    f.render_widget(Paragraph::new(lines), inner);

    let title = match (admin.player_focus, admin.player_form.editing) {
        (Some(_), Some(_)) => " Edit player ",
        (Some(_), None) => " Add player ",
        (None, _) => " Player ",
    };
    let color = if admin.player_focus.is_some() { Color::Yellow } else { Color::White };
    let block = default_border(color).title(title);
    let inner = block.inner(form_area);
    f.render_widget(block, form_area);

    let mut lines = Vec::new();
    if admin.player_focus.is_some() {
        for field in PlayerField::ALL {
            let focused = admin.player_focus == Some(field);
            let value = admin.player_form.value(field);
            let value = if focused { format!("{value}_") } else { value.to_string() };
            lines.push(Line::from(vec![field_label(field.label(), focused), Span::raw(value)]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab/BackTab field  Enter save  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));
    } else if let Some(player) = admin.selected_player() {
        let rows = [
            ("Name", Some(player.name.as_str())),
            ("Team", player.team.as_deref()),
            ("Email", player.email.as_deref()),
            ("Phone", player.phone.as_deref()),
        ];
        for (label, value) in rows {
            lines.push(Line::from(vec![
                field_label(label, false),
                Span::raw(value.unwrap_or("-").to_string()),
            ]));
        }
    }
    admin_footer(&mut lines, app);
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_admin_settings(f: &mut Frame, area: Rect, app: &App) {
    let admin = &app.state.admin;
    let block = default_border(Color::White).title(" Tournament defaults ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "j/k select  ←/→ change  Enter save",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    for (idx, field) in SettingsField::ALL.into_iter().enumerate() {
        let selected = idx == admin.settings_selected;
        let value = field.value(&admin.settings_draft);
        let value = if selected { format!("< {value} >") } else { value };
        let changed = field.value(&admin.settings_draft) != field.value(&admin.settings);
        lines.push(Line::from(vec![
            marker(selected),
            field_label(field.label(), selected),
            Span::raw(value),
            Span::styled(if changed { "  *" } else { "" }, Style::default().fg(Color::Yellow)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Courts: {}   Events: {}",
            admin.settings.default_courts.join(", "),
            admin.settings.default_event_types.join(", ")
        ),
        Style::default().fg(Color::Gray),
    )));
    if admin.settings_dirty() {
        lines.push(Line::from(Span::styled("Unsaved changes", Style::default().fg(Color::Yellow))));
    }
    admin_footer(&mut lines, app);
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = [
        ("1 2 3 4", "Dashboard / Scoring / History / Admin"),
        ("? / Esc", "open / close help"),
        ("r", "refresh now"),
        ("f", "full screen"),
        ("\"", "toggle logs"),
        ("q, Ctrl-C", "quit"),
        ("", ""),
        ("a / z", "player 1 point / undo"),
        ("k / m", "player 2 point / undo"),
        ("n", "next set"),
        ("e / x", "end match / end abruptly"),
        ("s", "start match"),
        ("+ / -", "shuttles used"),
        ("", ""),
        ("c / o / /", "history: court, order, search"),
        ("p", "history: export scoresheet"),
        ("", ""),
        ("v", "admin: schedule / players / settings"),
        ("L", "admin: sign in / out"),
        ("Tab", "admin: edit form"),
        ("s / d", "admin: start / delete scheduled match"),
        ("a / e / d", "admin: add / edit / delete player"),
        ("←/→ Enter", "admin: change / save defaults"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>12}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
