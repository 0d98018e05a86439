//! Text console front-end: command parsing and rendering.
//!
//! Only translates between lines of text and session calls; all state lives
//! in [`crate::domain::session::SimulationSession`].

use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::order::{OrderRequest, Side};
use crate::domain::session::{ChartView, CommandOutcome, SessionCommand, Snapshot};
use crate::domain::trade::Trade;

pub const DISPLAY_DATE_FORMAT: &str = "%m-%d-%Y";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Session(SessionCommand),
    Status,
    Trades,
    Chart,
    Load(String),
    Open(PathBuf),
    Export(PathBuf),
    Datasets,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  next [n]                 move forward n days (default 1)
  prev [n]                 move back n days (default 1)
  goto <day>               jump to a day index
  buy <n> [limit <price>]  buy n shares at market or with a limit
  sell <n> [limit <price>] sell n shares at market or with a limit
  status                   show day, price and portfolio
  trades                   show trade history
  chart [days]             show the visible price window
  reset                    ask to reset the portfolio (confirm with yes/no)
  yes | no                 confirm or cancel a pending reset
  load <name>              load a dataset from the data directory
  open <path>              load a CSV file
  export <path>            write the trade log as CSV
  datasets                 list datasets
  help                     show this help
  quit                     leave the simulator";

/// Parse one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match verb.as_str() {
        "next" | "n" => ConsoleCommand::Session(SessionCommand::Advance(count_arg(&args)?)),
        "prev" | "p" => ConsoleCommand::Session(SessionCommand::Retreat(count_arg(&args)?)),
        "goto" => {
            let day = single_arg(&args, "goto <day>")?;
            ConsoleCommand::Session(SessionCommand::Seek(parse_usize(day)?))
        }
        "buy" | "sell" => {
            let side = Side::from_str(&verb)?;
            ConsoleCommand::Session(SessionCommand::PlaceOrder(parse_order(side, &args)?))
        }
        "status" | "s" => ConsoleCommand::Status,
        "trades" => ConsoleCommand::Trades,
        "chart" => match args.as_slice() {
            [] => ConsoleCommand::Chart,
            [days] => ConsoleCommand::Session(SessionCommand::SetChartDays(parse_usize(days)?)),
            _ => return Err("usage: chart [days]".into()),
        },
        "reset" => ConsoleCommand::Session(SessionCommand::RequestReset),
        "yes" | "y" => ConsoleCommand::Session(SessionCommand::ConfirmReset),
        "no" => ConsoleCommand::Session(SessionCommand::CancelReset),
        "load" => ConsoleCommand::Load(single_arg(&args, "load <name>")?.to_string()),
        "open" => ConsoleCommand::Open(PathBuf::from(rest(line, "open <path>")?)),
        "export" => ConsoleCommand::Export(PathBuf::from(rest(line, "export <path>")?)),
        "datasets" => ConsoleCommand::Datasets,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command: {other} (try help)")),
    };
    Ok(Some(command))
}

fn count_arg(args: &[&str]) -> Result<usize, String> {
    match args {
        [] => Ok(1),
        [n] => parse_usize(n),
        _ => Err("expected at most one number".into()),
    }
}

fn single_arg<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    match args {
        [one] => Ok(*one),
        _ => Err(format!("usage: {usage}")),
    }
}

/// Everything after the verb, so paths may contain spaces.
fn rest<'a>(line: &'a str, usage: &str) -> Result<&'a str, String> {
    let tail = line
        .split_once(char::is_whitespace)
        .map(|(_, tail)| tail.trim())
        .unwrap_or_default();
    if tail.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(tail)
    }
}

fn parse_usize(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .map_err(|_| format!("expected a non-negative whole number, got {s:?}"))
}

fn parse_order(side: Side, args: &[&str]) -> Result<OrderRequest, String> {
    let usage = format!("usage: {} <shares> [limit <price>]", side.as_str().to_lowercase());
    let (shares, limit) = match args {
        [shares] => (*shares, None),
        [shares, kw, price] if kw.eq_ignore_ascii_case("limit") => (*shares, Some(*price)),
        _ => return Err(usage),
    };
    // negative or zero counts are passed through so the engine reports them
    let shares = shares
        .parse::<i64>()
        .map_err(|_| format!("shares must be a whole number, got {shares:?}"))?;
    match limit {
        None => Ok(OrderRequest::market(side, shares)),
        Some(price) => {
            let price = Decimal::from_str(price.trim_start_matches('$'))
                .map_err(|_| format!("limit price must be a number, got {price:?}"))?;
            Ok(OrderRequest::limit(side, shares, price))
        }
    }
}

/// Money with thousands separators and two decimals: `$98,998.00`.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac_part}")
}

/// Signed percent with two decimals: `+0.10%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{rounded:.2}%")
    } else {
        format!("+{:.2}%", rounded.abs())
    }
}

pub fn render_status(snap: &Snapshot<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Stock:     {}", snap.dataset);
    let _ = writeln!(out, "Day:       {} / {}", snap.current_day, snap.last_index);
    let _ = writeln!(out, "Date:      {}", snap.date.format(DISPLAY_DATE_FORMAT));
    let _ = writeln!(out, "Price:     {}", format_money(snap.price));
    let _ = writeln!(out, "Position:  {} shares", snap.position);
    let _ = writeln!(out, "Cash:      {}", format_money(snap.cash));
    let _ = writeln!(
        out,
        "Value:     {}",
        format_money(snap.valuation.portfolio_value)
    );
    let _ = write!(
        out,
        "P/L:       {} ({})",
        format_money(snap.valuation.total_pnl),
        format_percent(snap.valuation.total_pnl_pct)
    );
    if snap.reset_pending {
        let _ = write!(
            out,
            "\nReset pending: this will clear all trades and reset your portfolio. yes/no?"
        );
    }
    out
}

pub fn render_trades(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades yet.".to_string();
    }
    let mut out = String::new();
    let _ = write!(
        out,
        "{:<10}  {:<6}  {:>6}  {:>12}  {:>10}  {:>14}",
        "date", "action", "shares", "price", "commission", "total"
    );
    for t in trades {
        let _ = write!(
            out,
            "\n{:<10}  {:<6}  {:>6}  {:>12}  {:>10}  {:>14}",
            t.date.format(DISPLAY_DATE_FORMAT),
            t.action,
            t.shares,
            format_money(t.execution_price),
            format_money(t.commission),
            format_money(t.total)
        );
    }
    out
}

pub fn render_chart(chart: &ChartView<'_>) -> String {
    let mut out = String::new();
    for (i, bar) in chart.bars.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "{}  {:>12}",
            bar.date.format(DISPLAY_DATE_FORMAT),
            format_money(bar.close)
        );
        for t in chart.markers.iter().filter(|t| t.date == bar.date) {
            let arrow = match t.action {
                Side::Buy => "^",
                Side::Sell => "v",
            };
            let _ = write!(out, "  {arrow} {} ({})", t.action, t.shares);
        }
    }
    out
}

pub fn render_outcome(outcome: &CommandOutcome, market_price: Decimal) -> String {
    match outcome {
        CommandOutcome::Moved { day } => format!("Day {day}"),
        CommandOutcome::Filled(trade) => {
            let verb = match trade.action {
                Side::Buy => "Bought",
                Side::Sell => "Sold",
            };
            format!(
                "{verb} {} shares at {} (market: {})",
                trade.shares,
                format_money(trade.execution_price),
                format_money(market_price)
            )
        }
        CommandOutcome::ResetRequested => {
            "Are you sure you want to reset? This will clear all trades and reset your portfolio. (yes/no)"
                .to_string()
        }
        CommandOutcome::ResetConfirmed => "Portfolio reset.".to_string(),
        CommandOutcome::ResetCancelled => "Reset cancelled.".to_string(),
        CommandOutcome::ChartDays(days) => format!("Showing {days} days"),
        CommandOutcome::DatasetLoaded { name, bars } => format!("Loaded {name} ({bars} days)"),
    }
}
