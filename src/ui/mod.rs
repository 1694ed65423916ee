use chrono::Datelike;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{AccountAction, App, Notice, View};
use crate::calendar::{DayCell, MonthPanel};
use crate::prediction::Phase;

/// Width of one month panel: 7 cells of 4 columns plus borders.
const PANEL_W: u16 = 30;
/// Height of one month panel: header, rule, up to 6 weeks, borders.
const PANEL_H: u16 = 10;

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );

    // Layout: [ header(3) | calendar | info(5) | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(PANEL_H),
            Constraint::Length(5),
            Constraint::Length(1),
        ]).split(area);

    draw_header(f, app, root[0]);
    draw_months(f, app, root[1]);
    draw_info(f, app, root[2]);
    draw_statusbar(f, app, root[3]);

    match app.view {
        View::Account => draw_account(f, area, app),
        View::Help    => draw_help(f, area, app),
        _ => {}
    }
}

// ─── Header: prediction or form title ────────────────────────────────────────

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = match app.view {
        View::Create => {
            let picked = match app.create.selection() {
                Some(iv) => format!(
                    "{} – {}  ({} {})",
                    iv.start().format("%-d %b"), iv.end().format("%-d %b"),
                    iv.len_days(), if iv.len_days() == 1 { "day" } else { "days" },
                ),
                None => "nothing selected".to_owned(),
            };
            Line::from(vec![
                Span::styled(" Insert Period  ", Style::default().fg(t.accent()).add_modifier(Modifier::BOLD)),
                Span::styled(picked, Style::default().fg(t.fg())),
            ])
        }
        _ => match &app.summary {
            Some(s) => {
                let color = match s.event {
                    Phase::Menstruation => t.period_highlight().0,
                    Phase::Ovulation    => t.ovulation(),
                };
                Line::from(vec![
                    Span::styled(" ● ", Style::default().fg(color)),
                    Span::styled(s.headline(), Style::default().fg(t.fg()).add_modifier(Modifier::BOLD)),
                ])
            }
            None => Line::from(Span::styled(" No prediction available", Style::default().fg(t.fg_dim()))),
        },
    };

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Menstra ",
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border()))
        .style(Style::default().bg(t.bg()));
    f.render_widget(Paragraph::new(line).block(block), area);
}

// ─── Month panels ────────────────────────────────────────────────────────────

fn draw_months(f: &mut Frame, app: &App, area: Rect) {
    let panels   = app.calendar().panels();
    let per_row  = (area.width / PANEL_W).max(1) as usize;
    let rows     = (area.height / PANEL_H).max(1) as usize;
    let visible  = per_row * rows;

    // Scroll so the cursor's month is always on screen.
    let focus = app.calendar().locate(app.cursor).map(|(p, _)| p).unwrap_or(0);
    let first = if focus < visible { 0 } else { (focus + 1 - visible).div_ceil(per_row) * per_row };

    for (i, panel) in panels.iter().enumerate().skip(first).take(visible) {
        let slot = i - first;
        let rect = Rect {
            x:      area.x + (slot % per_row) as u16 * PANEL_W,
            y:      area.y + (slot / per_row) as u16 * PANEL_H,
            width:  PANEL_W.min(area.width),
            height: PANEL_H.min(area.height),
        };
        draw_month(f, app, panel, rect, i == focus);
    }
}

fn draw_month(f: &mut Frame, app: &App, panel: &MonthPanel, area: Rect, focused: bool) {
    let t     = &app.theme;
    let bs    = Style::default().fg(if focused { t.border_active() } else { t.border() });
    let title = Line::from(Span::styled(
        format!(" {} ", panel.title()),
        Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
    ));

    let block = Block::default()
        .title(Title::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(bs)
        .style(Style::default().bg(t.bg()));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = vec![];

    let hdrs: Vec<Span> = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"].iter()
        .map(|d| Span::styled(format!(" {d} "), Style::default().fg(t.fg_dim()).add_modifier(Modifier::BOLD)))
        .collect();
    lines.push(Line::from(hdrs));
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(t.border()),
    )));

    for week in panel.weeks() {
        let spans: Vec<Span> = week.iter().map(|cell| day_span(app, cell)).collect();
        lines.push(Line::from(spans));
    }

    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(t.bg())).alignment(Alignment::Left),
        inner,
    );
}

fn day_span<'a>(app: &App, cell: &DayCell) -> Span<'a> {
    let t     = &app.theme;
    let state = app.calendar().cell_state(cell);
    let label = format!(" {:>2} ", cell.date.day());

    let base = if state.shaded {
        Style::default().bg(t.shaded())
    } else {
        Style::default().bg(t.bg())
    };

    let style = if !state.outside_month && cell.date == app.cursor {
        let (bg, fg) = t.cursor_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if state.active {
        let (bg, fg) = t.period_highlight();
        Style::default().bg(bg).fg(fg)
    } else if state.today {
        let (bg, fg) = t.today_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if state.outside_month {
        base.fg(t.outside())
    } else if state.clickable {
        base.fg(t.fg()).add_modifier(Modifier::UNDERLINED)
    } else {
        base.fg(t.fg())
    };
    Span::styled(label, style)
}

// ─── Info box ────────────────────────────────────────────────────────────────

fn draw_info(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (text, color) = match &app.notice {
        Some(Notice::Success(m)) => (m.as_str(), t.success()),
        Some(Notice::Error(m))   => (m.as_str(), t.error()),
        None => match app.view {
            View::Create => ("Space: pick start/end   Enter: save   c/Esc: cancel", t.fg_dim()),
            _            => ("n: insert period   a: account   r: refresh", t.fg_dim()),
        },
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border()))
        .style(Style::default().bg(t.bg()));
    f.render_widget(
        Paragraph::new(format!(" {text}")).block(block)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let mode = match app.view {
        View::Dashboard => " DASHBOARD ",
        View::Create    => " INSERT ",
        View::Account   => " ACCOUNT ",
        View::Help      => " HELP ",
    };
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode, Style::default().bg(t.accent()).fg(t.bg()).add_modifier(Modifier::BOLD)),
        Span::styled(
            "  hjkl:nav  [:prev  ]:next  t:today  T:theme  ?:help  q:quit",
            Style::default().fg(t.fg_dim()),
        ),
        Span::styled(
            format!("  {}", app.cursor.format("%A, %B %-d")),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2()));
    f.render_widget(bar, area);
}

// ─── Account overlay ─────────────────────────────────────────────────────────

fn draw_account(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(64, 60, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Delete your account or data ",
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let (sel_bg, sel_fg) = t.cursor_highlight();
    let mut lines = vec![Line::from("")];
    for (i, action) in AccountAction::ALL.iter().enumerate() {
        let selected = i == app.account_cursor;
        let label = if selected {
            Style::default().bg(sel_bg).fg(sel_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg()).add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(if selected { " ▶ " } else { "   " }),
            Span::styled(format!(" {} ", action.label()), label),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", action.description()),
            Style::default().fg(t.fg_dim()),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "   j/k: choose   Enter: confirm   Esc: back",
        Style::default().fg(t.fg_dim()),
    )));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Help overlay ────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(60, 70, area);
    f.render_widget(Clear, rect);

    let title = Line::from(Span::styled(
        " Keyboard Shortcuts ",
        Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
    ));
    let block = Block::default()
        .title(Title::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim());
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Navigation", accent)),
        Line::from(Span::styled("  h/j/k/l  ←↓↑→     Move by day / week", dim)),
        Line::from(Span::styled("  [ / ]              Prev / Next month", dim)),
        Line::from(Span::styled("  t                  Jump to today", dim)),
        Line::from(""),
        Line::from(Span::styled("  Periods", accent)),
        Line::from(Span::styled("  n                  Insert a period", dim)),
        Line::from(Span::styled("    Space              Pick start, then end", dim)),
        Line::from(Span::styled("    Enter / s          Save", dim)),
        Line::from(Span::styled("    c / Esc            Cancel", dim)),
        Line::from(Span::styled("  r                  Reload periods and prediction", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  a                  Account and data deletion", dim)),
        Line::from(Span::styled("  T                  Cycle theme", dim)),
        Line::from(Span::styled("  ?                  Toggle help", dim)),
        Line::from(Span::styled("  q                  Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg()))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}
