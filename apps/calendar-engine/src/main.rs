//! Calendar Engine Binary
//!
//! Command line front end for the calendar-spread engine.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p calendar-engine -- find SPY --delta 0.35 --option-type call
//! cargo run -p calendar-engine -- open SPY --quantity 2 --price 1.25 --preview
//! cargo run -p calendar-engine -- stream-market SPY QQQ --http
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRADIER_ACCESS_TOKEN`: Brokerage API token
//!
//! ## Optional
//! - `TRADIER_USE_SANDBOX`: true | false (default: false)
//! - `SPREAD_ALLOWED_UNDERLYINGS`: comma list (default: SPY,XSP,QQQ,DIA)
//! - `METRICS_PORT`: Prometheus listener port (default: disabled)
//! - `RUST_LOG`: Log filter (default: calendar_engine=info)
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;

use calendar_engine::application::services::{OptionChainResolver, StreamingSessionManager};
use calendar_engine::application::use_cases::{
    BuildCalendarSpreadUseCase, CloseCalendarSpreadUseCase, CloseSpreadRequest,
    EstimateNextDayUseCase, ListPositionsUseCase, ManageOrdersUseCase, OpenCalendarSpreadUseCase,
    OpenSpreadRequest, PreviewCalendarSpreadUseCase, RollCalendarSpreadUseCase,
};
use calendar_engine::config::EngineConfig;
use calendar_engine::domain::calendar_spread::SpreadRequest;
use calendar_engine::domain::option_chain::OptionType;
use calendar_engine::domain::order_composition::{OrderChange, OrderDuration, OrderType};
use calendar_engine::domain::streaming::StreamingSession;
use calendar_engine::error::{Categorized, ErrorReport, roll_category};
use calendar_engine::infrastructure::streaming::{
    AccountSubscription, HttpStreamClient, MarketSubscription, StreamConfig, StreamError,
    StreamEvent, Subscription, WebSocketStreamClient,
};
use calendar_engine::infrastructure::telemetry::{self, TelemetryConfig};
use calendar_engine::infrastructure::tradier::TradierAdapter;

/// Calendar spread engine for the Tradier brokerage API.
#[derive(Debug, Parser)]
#[command(name = "calendar-engine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List option expirations with their trading-day distance.
    Expirations {
        /// Underlying symbol.
        symbol: String,
    },
    /// List strikes for one expiration.
    Strikes {
        /// Underlying symbol.
        symbol: String,
        /// Expiration date (YYYY-MM-DD).
        expiration: NaiveDate,
    },
    /// Find the calendar spread matching a target delta.
    Find(SpreadArgs),
    /// Estimate the spread's price one trading day forward.
    Estimate(SpreadArgs),
    /// Show the greeks a new spread would add to the account.
    Preview {
        #[command(flatten)]
        spread: SpreadArgs,
        /// Number of spreads.
        #[arg(long, default_value = "1")]
        quantity: Decimal,
    },
    /// Open a calendar spread.
    Open {
        #[command(flatten)]
        spread: SpreadArgs,
        #[command(flatten)]
        order: OrderArgs,
        /// Ask the brokerage for a cost preview instead of placing the order.
        #[arg(long)]
        preview: bool,
    },
    /// Close the legs held in an underlying.
    Close {
        /// Underlying symbol.
        symbol: String,
        /// Contracts per leg; defaults to the whole position.
        #[arg(long)]
        quantity: Option<Decimal>,
    },
    /// Close the held legs and open a fresh spread.
    Roll {
        #[command(flatten)]
        spread: SpreadArgs,
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Classified positions and balances.
    Positions {
        /// Restrict to one underlying.
        symbol: Option<String>,
    },
    /// Orders in the account.
    Orders,
    /// Modify an open order.
    ChangeOrder {
        /// Order id.
        order_id: u64,
        /// New order type.
        #[arg(long = "type")]
        order_type: Option<OrderType>,
        /// New time in force.
        #[arg(long)]
        duration: Option<OrderDuration>,
        /// New limit price.
        #[arg(long)]
        price: Option<Decimal>,
        /// New stop price.
        #[arg(long)]
        stop: Option<Decimal>,
        /// New tag.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Cancel an open order.
    CancelOrder {
        /// Order id.
        order_id: u64,
    },
    /// Stream market events until interrupted.
    StreamMarket {
        /// Symbols to stream.
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Event types (trade, quote, summary, timesale, tradex).
        #[arg(long, value_delimiter = ',')]
        filter: Vec<String>,
        /// Use the HTTP feed instead of the WebSocket.
        #[arg(long)]
        http: bool,
        /// Send HTTP parameters as a POST form.
        #[arg(long, requires = "http")]
        post: bool,
        /// Include extra quote and trade fields.
        #[arg(long)]
        advanced_details: bool,
    },
    /// Stream account order events until interrupted.
    StreamAccount {
        /// Account numbers to leave out.
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
    },
}

#[derive(Debug, Clone, Args)]
struct SpreadArgs {
    /// Underlying symbol.
    symbol: String,
    /// Target delta magnitude; defaults to SPREAD_DEFAULT_TARGET_DELTA.
    #[arg(long)]
    delta: Option<f64>,
    /// call or put.
    #[arg(long, default_value = "call")]
    option_type: OptionType,
    /// Shift the strike by this many exchange increments.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    strike_offset: i32,
    /// Shift both expirations by this many positions.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    expiration_offset: i32,
}

#[derive(Debug, Clone, Args)]
struct OrderArgs {
    /// Number of spreads.
    #[arg(long, default_value = "1")]
    quantity: Decimal,
    /// Net debit limit; market order when absent.
    #[arg(long)]
    price: Option<Decimal>,
    /// Time in force.
    #[arg(long, default_value = "day")]
    duration: OrderDuration,
    /// Overrides the generated tag.
    #[arg(long)]
    tag: Option<String>,
}

/// Wired adapters shared by the commands.
struct Engine {
    config: EngineConfig,
    adapter: Arc<TradierAdapter>,
}

impl Engine {
    fn builder(&self) -> BuildCalendarSpreadUseCase<TradierAdapter> {
        BuildCalendarSpreadUseCase::with_config(
            Arc::clone(&self.adapter),
            self.config.spread.to_builder_config(),
        )
    }

    fn spread_request(&self, args: &SpreadArgs) -> SpreadRequest {
        SpreadRequest::new(
            &args.symbol,
            args.delta.unwrap_or(self.config.spread.default_target_delta),
            args.option_type,
        )
        .with_strike_offset(args.strike_offset)
        .with_expiration_offset(args.expiration_offset)
    }

    fn open_request(&self, spread: &SpreadArgs, order: &OrderArgs, preview: bool) -> OpenSpreadRequest {
        let mut request = OpenSpreadRequest::new(self.spread_request(spread), order.quantity);
        request.price = order.price;
        request.duration = order.duration;
        request.tag.clone_from(&order.tag);
        request.preview = preview;
        request
    }

    fn stream_config(&self) -> StreamConfig {
        self.config.streams.to_stream_config()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Already installed is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    load_dotenv_from_ancestors();
    let cli = Cli::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => return Ok(fail(&e.report())),
    };

    let telemetry_config = TelemetryConfig::default().with_metrics_port(config.metrics_port);
    telemetry::init(&telemetry_config).context("failed to initialize telemetry")?;

    let adapter = match TradierAdapter::new(&config.tradier.to_tradier_config()) {
        Ok(adapter) => Arc::new(adapter),
        Err(e) => return Ok(fail(&e.report())),
    };
    tracing::info!(environment = %adapter.environment(), "Configuration loaded");

    let engine = Engine { config, adapter };
    run(&engine, cli.command).await
}

async fn run(engine: &Engine, command: Command) -> anyhow::Result<ExitCode> {
    let today = Local::now().date_naive();
    match command {
        Command::Expirations { symbol } => {
            let resolver = OptionChainResolver::new(Arc::clone(&engine.adapter));
            match resolver.expiration_set(&symbol.to_uppercase(), today).await {
                Ok(set) => emit(&set),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Strikes { symbol, expiration } => {
            let resolver = OptionChainResolver::new(Arc::clone(&engine.adapter));
            match resolver.strikes(&symbol.to_uppercase(), expiration).await {
                Ok(strikes) => emit(&strikes),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Find(args) => match engine.builder().execute(&engine.spread_request(&args)).await {
            Ok(spread) => emit(&spread),
            Err(e) => Ok(fail(&e.report())),
        },
        Command::Estimate(args) => {
            let spread = match engine.builder().execute(&engine.spread_request(&args)).await {
                Ok(spread) => spread,
                Err(e) => return Ok(fail(&e.report())),
            };
            let estimator = EstimateNextDayUseCase::new(Arc::clone(&engine.adapter));
            match estimator.execute(&spread, today).await {
                Ok(estimate) => emit(&estimate),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Preview { spread, quantity } => {
            let use_case =
                PreviewCalendarSpreadUseCase::new(engine.builder(), Arc::clone(&engine.adapter));
            match use_case.execute(&engine.spread_request(&spread), quantity).await {
                Ok(preview) => emit(&preview),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Open {
            spread,
            order,
            preview,
        } => {
            let use_case =
                OpenCalendarSpreadUseCase::new(engine.builder(), Arc::clone(&engine.adapter));
            match use_case.execute(&engine.open_request(&spread, &order, preview)).await {
                Ok(response) => emit(&response),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Close { symbol, quantity } => {
            let use_case = CloseCalendarSpreadUseCase::new(Arc::clone(&engine.adapter));
            let request = CloseSpreadRequest {
                underlying: symbol.to_uppercase(),
                quantity: quantity.unwrap_or(Decimal::MAX),
                date: today,
            };
            match use_case.execute(&request).await {
                Ok(response) => emit(&response),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Roll { spread, order } => {
            let use_case =
                RollCalendarSpreadUseCase::new(engine.builder(), Arc::clone(&engine.adapter));
            let response = use_case
                .execute(&engine.open_request(&spread, &order, false))
                .await;
            print_json(&response)?;
            Ok(roll_category(&response)
                .map_or(ExitCode::SUCCESS, |category| exit_code(category.exit_code())))
        }
        Command::Positions { symbol } => {
            let use_case = ListPositionsUseCase::new(Arc::clone(&engine.adapter));
            let symbol = symbol.map(|s| s.to_uppercase());
            match use_case.execute(symbol.as_deref()).await {
                Ok(view) => emit(&view),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::Orders => match ManageOrdersUseCase::new(Arc::clone(&engine.adapter)).list().await {
            Ok(orders) => emit(&orders),
            Err(e) => Ok(fail(&e.report())),
        },
        Command::ChangeOrder {
            order_id,
            order_type,
            duration,
            price,
            stop,
            tag,
        } => {
            let change = OrderChange {
                order_type,
                duration,
                price,
                stop,
                tag,
            };
            let use_case = ManageOrdersUseCase::new(Arc::clone(&engine.adapter));
            match use_case.change(order_id, &change).await {
                Ok(ack) => emit(&ack),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::CancelOrder { order_id } => {
            match ManageOrdersUseCase::new(Arc::clone(&engine.adapter))
                .cancel(order_id)
                .await
            {
                Ok(ack) => emit(&ack),
                Err(e) => Ok(fail(&e.report())),
            }
        }
        Command::StreamMarket {
            symbols,
            filter,
            http,
            post,
            advanced_details,
        } => {
            let symbols: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
            let subscription = MarketSubscription::new(symbols)
                .with_filter(filter)
                .with_advanced_details(advanced_details);
            if http {
                stream_market_http(engine, subscription, post).await
            } else {
                stream_websocket(engine, Subscription::Market(subscription)).await
            }
        }
        Command::StreamAccount { exclude } => {
            let subscription = Subscription::Account(AccountSubscription {
                exclude_accounts: exclude,
                ..AccountSubscription::default()
            });
            stream_websocket(engine, subscription).await
        }
    }
}

async fn stream_websocket(engine: &Engine, subscription: Subscription) -> anyhow::Result<ExitCode> {
    let sessions = StreamingSessionManager::new(Arc::clone(&engine.adapter));
    let streams = engine.adapter.streams();
    let (url, session) = match subscription {
        Subscription::Market(_) => (&streams.ws_market_url, sessions.create_market_session().await),
        Subscription::Account(_) => (&streams.ws_account_url, sessions.create_account_session().await),
    };
    let mut session = match session {
        Ok(session) => session,
        Err(e) => return Ok(fail(&e.report())),
    };

    let (client, mut events) =
        WebSocketStreamClient::new(url.clone(), subscription, &engine.stream_config());
    client.update_session(session.session_id());
    if let Err(e) = client.connect() {
        return Ok(fail(&e.report()));
    }

    let code = pump_events(&mut events, &sessions, &mut session, |id| {
        client.update_session(id);
    })
    .await;
    client.disconnect();
    code
}

async fn stream_market_http(
    engine: &Engine,
    subscription: MarketSubscription,
    use_post: bool,
) -> anyhow::Result<ExitCode> {
    let sessions = StreamingSessionManager::new(Arc::clone(&engine.adapter));
    let mut session = match sessions.create_market_session().await {
        Ok(session) => session,
        Err(e) => return Ok(fail(&e.report())),
    };

    let (client, mut events) = HttpStreamClient::new(
        engine.adapter.streams().http_market_url.clone(),
        engine.config.tradier.access_token.clone(),
        subscription,
        &engine.stream_config(),
    );
    let client = client.with_post(use_post);
    client.update_session(session.session_id());
    if let Err(e) = client.start() {
        return Ok(fail(&e.report()));
    }

    let code = pump_events(&mut events, &sessions, &mut session, |id| {
        client.update_session(id);
    })
    .await;
    client.stop();
    code
}

/// Print events as JSON lines until Ctrl-C, a stop, or exhausted
/// reconnects. The session is renewed before each reconnect attempt and
/// handed to the client through `update_session`.
async fn pump_events<F>(
    events: &mut mpsc::UnboundedReceiver<StreamEvent>,
    sessions: &StreamingSessionManager<TradierAdapter>,
    session: &mut StreamingSession,
    update_session: F,
) -> anyhow::Result<ExitCode>
where
    F: Fn(&str),
{
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(ExitCode::SUCCESS);
                };
                match event {
                    StreamEvent::Data(value) => println!("{value}"),
                    StreamEvent::Reconnecting { attempt, delay } => {
                        tracing::info!(attempt, delay_ms = delay.as_millis(), "Stream reconnecting");
                        *session = renew(sessions, session.clone()).await;
                        update_session(session.session_id());
                    }
                    StreamEvent::Error(e) => {
                        tracing::warn!(error = %e, "Stream error");
                        if matches!(e, StreamError::ReconnectExhausted { .. }) {
                            return Ok(fail(&e.report()));
                        }
                    }
                    StreamEvent::Stopped => return Ok(ExitCode::SUCCESS),
                    other => tracing::debug!(event = ?other, "Stream event"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted, stopping stream");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }
}

/// Renew `session` when close to expiry; keep it when renewal fails.
async fn renew(
    sessions: &StreamingSessionManager<TradierAdapter>,
    session: StreamingSession,
) -> StreamingSession {
    match sessions.refresh(session.clone()).await {
        Ok(renewed) => renewed,
        Err(e) => {
            tracing::warn!(error = %e, "Session renewal failed, reusing current session");
            session
        }
    }
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<ExitCode> {
    print_json(value)?;
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn fail(report: &ErrorReport) -> ExitCode {
    tracing::error!(category = %report.category, error = %report.error, "Command failed");
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{}", report.error),
    }
    exit_code(report.category.exit_code())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
