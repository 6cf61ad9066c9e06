//! PokéArena - Pokédex browser and battle arena TUI

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use pokearena::action::Action;
use pokearena::api::{self, ApiClient};
use pokearena::battle::{Battle, SeededDice, Side};
use pokearena::effect::Effect;
use pokearena::pokemon::format_name;
use pokearena::prefs::{self, Preferences};
use pokearena::reducer::reducer;
use pokearena::state::{AppState, LoadTarget, Settings};
use pokearena::logging;
use pokearena::ui::PokeArenaUi;

const TICK_MS: u64 = 100;

#[derive(Parser, Debug)]
#[command(name = "pokearena")]
#[command(about = "Browse the Pokédex and pit two Pokémon against each other")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,

    #[command(subcommand)]
    command: Option<Command>,

    /// Delay between battle turns in milliseconds
    #[arg(long, default_value_t = 800)]
    turn_delay_ms: u64,

    /// Number of Pokémon offered in the arena roster
    #[arg(long, default_value_t = 151)]
    roster_size: u16,

    /// Pokédex page size
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..))]
    page_size: u16,

    /// Language of the localized search names
    #[arg(long, default_value = "fr")]
    name_lang: String,

    /// Skip downloading the localized name index
    #[arg(long)]
    no_name_index: bool,

    /// Seed for battle rolls and random picks
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a battle without the TUI and print every turn
    Duel {
        /// Dex number or name of the left fighter
        left: String,
        /// Dex number or name of the right fighter
        right: String,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Debug)]
struct RuntimeConfig {
    api: ApiClient,
    prefs_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let log_dir = args.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let _log_guard = logging::init(&log_dir)?;

    let api = ApiClient::new(
        args.cache_dir
            .clone()
            .unwrap_or_else(api::default_cache_dir),
    );

    if let Some(Command::Duel { left, right, seed }) = &args.command {
        let seed = seed.or(args.seed);
        return run_duel(&api, left, right, seed).await;
    }

    let debug = DebugSession::new(args.debug);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let prefs_path = match prefs::default_path() {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::warn!(%err, "theme will not be persisted");
            None
        }
    };
    let preferences = match &prefs_path {
        Some(path) => prefs::load(path).await,
        None => Preferences::default(),
    };

    let settings = Settings {
        turn_delay_ms: args.turn_delay_ms,
        page_size: args.page_size,
        roster_size: args.roster_size,
        name_lang: args.name_lang.clone(),
        name_index_enabled: !args.no_name_index,
    };
    let dice = args
        .seed
        .map(SeededDice::new)
        .unwrap_or_else(SeededDice::from_time);
    let theme = preferences.theme;

    let mut state = debug
        .load_state_or_else_async(|| {
            let settings = settings.clone();
            let dice = dice.clone();
            async move {
                Ok::<AppState, io::Error>(AppState::new(settings, theme, dice))
            }
        })
        .await
        .map_err(debug_error)?;
    state.settings = settings;
    state.settle();

    let config = RuntimeConfig { api, prefs_path };
    tracing::info!(
        cache_dir = %config.api.cache_dir().display(),
        theme = state.theme.label(),
        "starting pokearena"
    );

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, config).await;

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
    config: RuntimeConfig,
) -> io::Result<DebugRunOutput<AppState>> {
    let config = Arc::new(config);
    let ui = Rc::new(RefCell::new(PokeArenaUi::new()));
    let ui_events = Rc::clone(&ui);
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui.borrow_mut().render(frame, area, state, render_ctx);
            },
            move |event, state| -> EventOutcome<Action> {
                ui_events.borrow_mut().handle_event(event, state)
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, config.clone()),
        )
        .await
}

fn target_key(target: LoadTarget) -> String {
    match target {
        LoadTarget::Showcase(side) => format!("showcase_{}", side_key(side)),
        LoadTarget::Detail => "detail_pokemon".to_string(),
        LoadTarget::Fighter(side) => format!("fighter_{}", side_key(side)),
    }
}

fn side_key(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, config: Arc<RuntimeConfig>) {
    tracing::debug!(?effect, "handling effect");
    match effect {
        Effect::LoadModels => {
            let api = config.api.clone();
            ctx.tasks().spawn(TaskKey::new("models"), async move {
                match api.models().await {
                    Ok(catalog) => Action::ModelsDidLoad(catalog),
                    Err(error) => {
                        tracing::warn!(%error, "3D model catalog unavailable");
                        Action::ModelsDidError(error.to_string())
                    }
                }
            });
        }
        Effect::LoadNameIndex { lang } => {
            let api = config.api.clone();
            ctx.tasks().spawn(TaskKey::new("name_index"), async move {
                match api.name_index(&lang).await {
                    Ok(index) => Action::NamesDidLoad(index),
                    Err(error) => {
                        tracing::warn!(%error, %lang, "name index unavailable");
                        Action::NamesDidError(error.to_string())
                    }
                }
            });
        }
        Effect::LoadPage { offset, limit } => {
            let api = config.api.clone();
            ctx.tasks()
                .spawn(TaskKey::new(format!("page_{offset}")), async move {
                    match api.page(limit, offset).await {
                        Ok(entries) => Action::PokedexDidLoad { offset, entries },
                        Err(error) => Action::PokedexDidError {
                            offset,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadRoster { size } => {
            let api = config.api.clone();
            ctx.tasks().spawn(TaskKey::new("roster"), async move {
                match api.roster(size).await {
                    Ok(roster) => Action::RosterDidLoad(roster),
                    Err(error) => Action::RosterDidError(error.to_string()),
                }
            });
        }
        Effect::LoadPokemon { target, id } => {
            let api = config.api.clone();
            ctx.tasks()
                .spawn(TaskKey::new(target_key(target)), async move {
                    match api.pokemon(&id.to_string()).await {
                        Ok(pokemon) => Action::PokemonDidLoad { target, pokemon },
                        Err(error) => Action::PokemonDidError {
                            target,
                            id,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::LoadSpecies { id } => {
            let api = config.api.clone();
            ctx.tasks().spawn(TaskKey::new("detail_species"), async move {
                match api.species(id).await {
                    Ok(species) => Action::DetailSpeciesDidLoad { id, species },
                    Err(error) => Action::DetailSpeciesDidError {
                        id,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::LoadEvolution { id, url } => {
            let api = config.api.clone();
            ctx.tasks()
                .spawn(TaskKey::new("detail_evolution"), async move {
                    match api.evolution_chain(&url).await {
                        Ok(stages) => Action::DetailEvolutionDidLoad { id, stages },
                        Err(error) => Action::DetailEvolutionDidError {
                            id,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::ScheduleTurn { delay_ms } => {
            ctx.tasks().debounce(
                TaskKey::new("battle_turn"),
                Duration::from_millis(delay_ms),
                async move { Action::BattleTurn },
            );
        }
        Effect::SavePrefs { theme } => {
            let path = config.prefs_path.clone();
            ctx.tasks().spawn(TaskKey::new("save_prefs"), async move {
                let Some(path) = path else {
                    return Action::PrefsDidError("no config directory".to_string());
                };
                match prefs::save(&path, &Preferences { theme }).await {
                    Ok(()) => Action::PrefsDidSave,
                    Err(error) => {
                        tracing::warn!(%error, path = %path.display(), "saving preferences failed");
                        Action::PrefsDidError(error.to_string())
                    }
                }
            });
        }
    }
}

async fn run_duel(api: &ApiClient, left: &str, right: &str, seed: Option<u64>) -> io::Result<()> {
    let (left, right) = tokio::join!(api.pokemon(left), api.pokemon(right));
    let left = left.map_err(io::Error::other)?;
    let right = right.map_err(io::Error::other)?;

    let mut dice = seed.map(SeededDice::new).unwrap_or_else(SeededDice::from_time);
    let mut battle = Battle::with_fighters(left.to_fighter(), right.to_fighter());
    tracing::info!(left = %left.name, right = %right.name, ?seed, "headless duel");

    println!(
        "{} vs {}",
        format_name(&left.name),
        format_name(&right.name)
    );
    for event in battle.resolve(&mut dice) {
        println!("{}", event.text);
    }
    match battle.winner_fighter() {
        Some(winner) => println!("{} wins after {} turns!", format_name(winner.name()), battle.turn()),
        None => println!("No winner"),
    }
    Ok(())
}
