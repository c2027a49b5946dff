//! City weather browser

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cityweather::action::Action;
use cityweather::api::{
    ApiClient, ApiConfig, DEFAULT_CITIES_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_WEATHER_URL,
};
use cityweather::components::{
    CityTable, CityTableProps, Component, FilterOverlay, FilterOverlayProps, Toasts, ToastsProps,
    WeatherReport, WeatherReportProps,
};
use cityweather::effect::Effect;
use cityweather::reducer::reducer;
use cityweather::tasks::run_effect;
use cityweather::state::{AppState, City, Screen, TICK_MS, UnitSystem};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext,
};
use tui_dispatch_components::centered_rect;
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// Browse world cities and check the weather in any of them
#[derive(Parser, Debug)]
#[command(name = "cityweather")]
#[command(about = "Paginated city table with country filter and per-city weather")]
struct Args {
    /// Cities dataset endpoint (`limit` and `offset` are appended)
    #[arg(long, env = "CITIES_API", default_value = DEFAULT_CITIES_URL)]
    cities_url: String,

    /// Current-weather endpoint prefix (`q`, `appid` and `units` are appended)
    #[arg(long, env = "CITY_WEATHER", default_value = DEFAULT_WEATHER_URL)]
    weather_url: String,

    /// Weather API key
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Initial unit system: metric or imperial
    #[arg(long, default_value = "metric", value_parser = parse_units)]
    units: UnitSystem,

    /// Per-request timeout in seconds (minimum 1)
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout: u64,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    match value.to_ascii_lowercase().as_str() {
        "metric" => Ok(UnitSystem::Metric),
        "imperial" => Ok(UnitSystem::Imperial),
        other => Err(format!(
            "unknown unit system '{other}' (expected metric or imperial)"
        )),
    }
}

/// The terminal belongs to the UI, so logs only go to a file when asked.
fn init_tracing(log_file: Option<&PathBuf>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum CityComponentId {
    Table,
    Filter,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum CityContext {
    Table,
    Filter,
    Detail,
}

impl EventRoutingState<CityComponentId, CityContext> for AppState {
    fn focused(&self) -> Option<CityComponentId> {
        match self.screen {
            Screen::Detail => Some(CityComponentId::Detail),
            Screen::Table if self.filter_mode => Some(CityComponentId::Filter),
            Screen::Table => Some(CityComponentId::Table),
        }
    }

    fn modal(&self) -> Option<CityComponentId> {
        if self.screen == Screen::Table && self.filter_mode {
            Some(CityComponentId::Filter)
        } else {
            None
        }
    }

    fn binding_context(&self, id: CityComponentId) -> CityContext {
        match id {
            CityComponentId::Table => CityContext::Table,
            CityComponentId::Filter => CityContext::Filter,
            CityComponentId::Detail => CityContext::Detail,
        }
    }

    fn default_context(&self) -> CityContext {
        CityContext::Table
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        cities_url,
        weather_url,
        api_key,
        units,
        request_timeout,
        log_file,
        debug: debug_args,
    } = Args::parse();

    init_tracing(log_file.as_ref())?;

    let client = ApiClient::new(ApiConfig {
        cities_url,
        weather_url,
        api_key,
        timeout: Duration::from_secs(request_timeout),
    })
    .map_err(io::Error::other)?;
    if client.config().api_key.is_none() {
        tracing::warn!("no weather API key configured; weather requests will fail");
    }

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let mut state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(units))
        })
        .await
        .map_err(debug_error)?;
    if let Ok(size) = crossterm::terminal::size() {
        state.terminal_size = size;
    }

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!("starting");
    let result = run_app(&mut terminal, &debug, store, replay_actions, client).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct CityUi {
    table: CityTable,
    filter: FilterOverlay,
    detail: WeatherReport,
    toasts: Toasts,
}

impl CityUi {
    fn new() -> Self {
        Self {
            table: CityTable,
            filter: FilterOverlay::new(),
            detail: WeatherReport,
            toasts: Toasts,
        }
    }

    fn filter_props<'a>(
        state: &'a AppState,
        suggestions: &'a [City],
        is_focused: bool,
    ) -> FilterOverlayProps<'a> {
        FilterOverlayProps {
            query: &state.filter_input,
            suggestions,
            selected: state.filter_selected,
            is_focused,
            is_reloading: state.filter.is_reloading(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<CityComponentId>,
    ) {
        match state.screen {
            Screen::Table => {
                event_ctx.set_component_area(CityComponentId::Table, area);
                event_ctx.component_areas.remove(&CityComponentId::Detail);
                let props = CityTableProps {
                    state,
                    is_focused: render_ctx.is_focused() && !state.filter_mode,
                };
                self.table.render(frame, area, props);
            }
            Screen::Detail => {
                event_ctx.set_component_area(CityComponentId::Detail, area);
                event_ctx.component_areas.remove(&CityComponentId::Table);
                let props = WeatherReportProps {
                    state,
                    is_focused: render_ctx.is_focused(),
                };
                self.detail.render(frame, area, props);
            }
        }

        let filter_open = state.screen == Screen::Table && state.filter_mode;
        self.filter.set_open(filter_open);
        if filter_open {
            event_ctx.set_component_area(CityComponentId::Filter, centered_rect(64, 14, area));
            let suggestions = state.filter_suggestions();
            let props = Self::filter_props(state, &suggestions, render_ctx.is_focused());
            self.filter.render(frame, area, props);
        } else {
            event_ctx.component_areas.remove(&CityComponentId::Filter);
        }

        self.toasts.render(
            frame,
            area,
            ToastsProps {
                notifications: &state.notifications,
            },
        );
    }

    fn handle_table_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = CityTableProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.table.handle_event(event, props).into_iter().collect();
        respond(actions)
    }

    fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = WeatherReportProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.detail.handle_event(event, props).into_iter().collect();
        respond(actions)
    }

    fn handle_filter_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.filter.set_open(state.filter_mode);
        let suggestions = state.filter_suggestions();
        let props = Self::filter_props(state, &suggestions, true);
        let actions: Vec<_> = self.filter.handle_event(event, props).into_iter().collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn respond(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    client: ApiClient,
) -> io::Result<DebugRunOutput<AppState>> {
    let client = Arc::new(client);
    let ui = Rc::new(RefCell::new(CityUi::new()));
    let mut bus: EventBus<AppState, Action, CityComponentId, CityContext> = EventBus::new();
    let keybindings: Keybindings<CityContext> = Keybindings::new();

    let ui_table = Rc::clone(&ui);
    bus.register(CityComponentId::Table, move |event, state| {
        ui_table.borrow_mut().handle_table_event(&event.kind, state)
    });

    let ui_filter = Rc::clone(&ui);
    bus.register(CityComponentId::Filter, move |event, state| {
        ui_filter.borrow_mut().handle_filter_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(CityComponentId::Detail, move |event, state| {
        ui_detail.borrow_mut().handle_detail_event(&event.kind, state)
    });

    // The viewport height drives page size and the scroll trigger
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::CitiesFetch),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| run_effect(effect, ctx.tasks(), &client),
        )
        .await
}
