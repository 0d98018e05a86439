//! Simulation session: the single owner of market data, portfolio, day
//! cursor and reset gate for one user.
//!
//! All mutation goes through `&mut SimulationSession`, either through the
//! named operations or through [`SimulationSession::dispatch`] with a
//! [`SessionCommand`]. Front-ends read state back with
//! [`SimulationSession::snapshot`] and [`SimulationSession::chart`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::cursor::DayCursor;
use super::error::{OrderRejection, SimulatorError};
use super::execution::execute;
use super::market_data::MarketData;
use super::order::OrderRequest;
use super::portfolio::Portfolio;
use super::price_bar::PriceBar;
use super::reset::ResetGate;
use super::sim_config::SimulatorConfig;
use super::trade::Trade;
use super::valuation::Valuation;
use crate::ports::data_port::MarketDataPort;

/// Smallest chart window a user can pick, unless the series is shorter.
pub const MIN_CHART_DAYS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Advance(usize),
    Retreat(usize),
    Seek(usize),
    ResetCursor,
    PlaceOrder(OrderRequest),
    RequestReset,
    ConfirmReset,
    CancelReset,
    SetChartDays(usize),
    ReplaceDataset(MarketData),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Moved { day: usize },
    Filled(Trade),
    ResetRequested,
    ResetConfirmed,
    ResetCancelled,
    ChartDays(usize),
    DatasetLoaded { name: String, bars: usize },
}

/// Read-only view of the session at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub dataset: &'a str,
    pub current_day: usize,
    pub last_index: usize,
    pub date: NaiveDate,
    pub price: Decimal,
    pub cash: Decimal,
    pub position: u64,
    pub trades: &'a [Trade],
    pub valuation: Valuation,
    pub reset_pending: bool,
    pub chart_days: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartView<'a> {
    pub bars: &'a [PriceBar],
    pub markers: Vec<&'a Trade>,
}

#[derive(Debug, Clone)]
pub struct SimulationSession {
    config: SimulatorConfig,
    market: MarketData,
    portfolio: Portfolio,
    cursor: DayCursor,
    reset_gate: ResetGate,
    chart_days: usize,
}

impl SimulationSession {
    pub fn new(config: SimulatorConfig, market: MarketData) -> Self {
        let portfolio = Portfolio::new(config.initial_cash);
        let cursor = DayCursor::new(market.last_index(), config.start_day);
        let chart_days = config.chart_days.min(market.len());
        info!(
            dataset = market.name(),
            bars = market.len(),
            day = cursor.current_day(),
            "session started"
        );
        SimulationSession {
            config,
            market,
            portfolio,
            cursor,
            reset_gate: ResetGate::default(),
            chart_days,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn current_day(&self) -> usize {
        self.cursor.current_day()
    }

    pub fn current_bar(&self) -> &PriceBar {
        // the cursor is clamped to the series, so the index is always valid
        &self.market.bars()[self.cursor.current_day()]
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_gate.is_pending()
    }

    pub fn chart_days(&self) -> usize {
        self.chart_days
    }

    // === NAVIGATION ===

    pub fn advance(&mut self, n: usize) -> usize {
        self.cursor.advance(n)
    }

    pub fn retreat(&mut self, n: usize) -> usize {
        self.cursor.retreat(n)
    }

    pub fn seek(&mut self, day: usize) -> usize {
        self.cursor.seek(day)
    }

    pub fn reset_cursor(&mut self) -> usize {
        self.cursor.reset()
    }

    // === ORDERS ===

    /// Execute an order at the current bar's close.
    pub fn place_order(&mut self, request: &OrderRequest) -> Result<Trade, OrderRejection> {
        let bar = &self.market.bars()[self.cursor.current_day()];
        execute(&mut self.portfolio, request, bar, &self.config.execution)
    }

    // === RESET ===

    pub fn request_reset(&mut self) {
        self.reset_gate.request();
    }

    /// Wipe the portfolio and return the cursor to the start day. Only valid
    /// after [`SimulationSession::request_reset`].
    pub fn confirm_reset(&mut self) -> Result<(), SimulatorError> {
        self.reset_gate.confirm()?;
        self.portfolio.reset();
        let day = self.cursor.reset();
        info!(day, "session reset");
        Ok(())
    }

    pub fn cancel_reset(&mut self) {
        self.reset_gate.cancel();
    }

    // === DATASETS ===

    /// Swap in a new series and start over on it.
    pub fn replace_dataset(&mut self, market: MarketData) {
        info!(
            dataset = market.name(),
            bars = market.len(),
            previous = self.market.name(),
            "dataset loaded"
        );
        self.portfolio = Portfolio::new(self.config.initial_cash);
        self.cursor = DayCursor::new(market.last_index(), self.config.start_day);
        self.chart_days = self.config.chart_days.min(market.len());
        self.reset_gate = ResetGate::default();
        self.market = market;
    }

    /// Load `name` from `port`. On failure the session is left untouched.
    pub fn load_from(
        &mut self,
        port: &dyn MarketDataPort,
        name: &str,
    ) -> Result<(), SimulatorError> {
        let market = port.load(name).inspect_err(|e| {
            warn!(dataset = name, error = %e, "dataset load failed");
        })?;
        self.replace_dataset(market);
        Ok(())
    }

    // === VIEWS ===

    /// Clamp to `[min(10, len), len]` and store.
    pub fn set_chart_days(&mut self, days: usize) -> usize {
        let len = self.market.len();
        self.chart_days = days.clamp(MIN_CHART_DAYS.min(len), len);
        self.chart_days
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let bar = self.current_bar();
        Snapshot {
            dataset: self.market.name(),
            current_day: self.cursor.current_day(),
            last_index: self.cursor.last_index(),
            date: bar.date,
            price: bar.close,
            cash: self.portfolio.cash(),
            position: self.portfolio.position(),
            trades: self.portfolio.trades(),
            valuation: Valuation::compute(&self.portfolio, bar.close),
            reset_pending: self.reset_gate.is_pending(),
            chart_days: self.chart_days,
        }
    }

    /// Bars up to and including the current day, with the trades made on
    /// them.
    pub fn chart(&self) -> ChartView<'_> {
        let day = self.cursor.current_day();
        ChartView {
            bars: self.market.window(day, self.chart_days),
            markers: self
                .market
                .markers(self.portfolio.trades(), day, self.chart_days),
        }
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Result<CommandOutcome, SimulatorError> {
        let outcome = match command {
            SessionCommand::Advance(n) => CommandOutcome::Moved {
                day: self.advance(n),
            },
            SessionCommand::Retreat(n) => CommandOutcome::Moved {
                day: self.retreat(n),
            },
            SessionCommand::Seek(day) => CommandOutcome::Moved {
                day: self.seek(day),
            },
            SessionCommand::ResetCursor => CommandOutcome::Moved {
                day: self.reset_cursor(),
            },
            SessionCommand::PlaceOrder(request) => {
                CommandOutcome::Filled(self.place_order(&request)?)
            }
            SessionCommand::RequestReset => {
                self.request_reset();
                CommandOutcome::ResetRequested
            }
            SessionCommand::ConfirmReset => {
                self.confirm_reset()?;
                CommandOutcome::ResetConfirmed
            }
            SessionCommand::CancelReset => {
                self.cancel_reset();
                CommandOutcome::ResetCancelled
            }
            SessionCommand::SetChartDays(days) => {
                CommandOutcome::ChartDays(self.set_chart_days(days))
            }
            SessionCommand::ReplaceDataset(market) => {
                let name = market.name().to_string();
                let bars = market.len();
                self.replace_dataset(market);
                CommandOutcome::DatasetLoaded { name, bars }
            }
        };
        Ok(outcome)
    }
}
