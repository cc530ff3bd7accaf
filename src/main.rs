use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tracing::warn;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use pokeduel::action::Action;
use pokeduel::battle;
use pokeduel::catalog::{CatalogClient, PokeApiCatalog};
use pokeduel::config::{Args, RuntimeConfig};
use pokeduel::effect::Effect;
use pokeduel::logging;
use pokeduel::persist::SaveStore;
use pokeduel::reducer::reducer;
use pokeduel::state::AppState;
use pokeduel::ui;

/// Collaborators the effect handler needs, shared across tasks.
struct Services {
    catalog: Arc<dyn CatalogClient>,
    store: SaveStore,
    fetch_timeout: Duration,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = RuntimeConfig::from_args(&args);
    logging::init(&config.log_file)?;

    let debug = DebugSession::new(args.debug);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;

    let default_sizes = config.default_sizes;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(default_sizes))
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let mut catalog = PokeApiCatalog::new(config.catalog_url.clone());
    if let Some(cache_root) = config.cache_root.clone() {
        catalog = catalog.with_cache(cache_root);
    }
    let services = Arc::new(Services {
        catalog: Arc::new(catalog),
        store: SaveStore::new(config.save_dir.clone()),
        fetch_timeout: config.fetch_timeout,
    });

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, services).await;

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
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    services: Arc<Services>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, services.clone()),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: Arc<Services>) {
    match effect {
        Effect::LoadMatch => {
            ctx.tasks().spawn(TaskKey::new("load_match"), async move {
                let saved = services.store.load().await;
                Action::MatchDidLoad(saved.map(Box::new))
            });
        }
        Effect::InitializeMatch { sizes } => {
            ctx.tasks().spawn(TaskKey::new("initialize_match"), async move {
                match battle::initialize(services.catalog.clone(), sizes, services.fetch_timeout)
                    .await
                {
                    Ok(state) => Action::MatchDidInitialize(Box::new(state)),
                    Err(error) => {
                        warn!(error = %error, "match initialization failed");
                        Action::MatchDidError(error.to_string())
                    }
                }
            });
        }
        // Saves and clears share a key so a restart cancels a pending save.
        Effect::SaveMatch { state } => {
            ctx.tasks().spawn(TaskKey::new("match_store"), async move {
                match services.store.save(&state).await {
                    Ok(()) => Action::PersistDidSave,
                    Err(error) => {
                        warn!(error = %error, "failed to save match");
                        Action::PersistDidFail(error.to_string())
                    }
                }
            });
        }
        Effect::ClearMatch => {
            ctx.tasks().spawn(TaskKey::new("match_store"), async move {
                match services.store.clear().await {
                    Ok(()) => Action::PersistDidSave,
                    Err(error) => {
                        warn!(error = %error, "failed to clear saved match");
                        Action::PersistDidFail(error.to_string())
                    }
                }
            });
        }
    }
}
