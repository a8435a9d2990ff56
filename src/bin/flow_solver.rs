use anyhow::{bail, Context, Result};
use clap::Parser;
use flow_solver::engine::{Color, Direction, GameInfo, GameState, RuleOptions};
use flow_solver::solver::{solve, SearchConfig, SearchOutcome, SearchResult, DEFAULT_MAX_MB};
use flow_solver::utils::{format_moves, game_from_file, replay_moves};
use log::LevelFilter;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board files to solve (one square grid per file, '.' for free cells)
    board_files: Vec<PathBuf>,

    /// Solve a randomly generated board with this seed
    #[clap(long)]
    random: Option<u64>,

    /// Side length of the random board
    #[clap(long, default_value_t = 5)]
    size: usize,

    /// Number of color pairs on the random board
    #[clap(long, default_value_t = 3)]
    colors: usize,

    /// Maximum number of nodes in the frontier (0 derives it from --max-mb)
    #[clap(short = 'n', long, default_value_t = 0)]
    max_nodes: usize,

    /// Memory budget in megabytes, used when --max-nodes is 0
    #[clap(short = 'm', long, default_value_t = DEFAULT_MAX_MB)]
    max_mb: f64,

    /// Keep dead-end states instead of pruning them
    #[clap(long)]
    no_dead_ends: bool,

    /// Move colors in board order instead of most-constrained first
    #[clap(long)]
    no_constrained: bool,

    /// Allow paths to touch themselves
    #[clap(long)]
    no_touch: bool,

    /// Print only the one-line summary per board
    #[clap(short, long)]
    quiet: bool,

    /// Replay the solution move by move
    #[clap(short, long)]
    animate: bool,

    /// Delay between animation frames in milliseconds
    #[clap(long, default_value_t = 100)]
    delay_ms: u64,

    /// Show the cheapest pending board when the node budget runs out
    #[clap(short, long)]
    diagnostics: bool,

    /// Print boards without ANSI colors
    #[clap(long)]
    no_color: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn animate_solution(
    info: &GameInfo,
    initial: &GameState,
    moves: &[(Color, Direction)],
    ansi: bool,
    delay: Duration,
) {
    for (step, frame) in replay_moves(info, initial, moves).iter().enumerate() {
        println!("Move {}:\n{}\n", step + 1, info.view(frame, ansi));
        thread::sleep(delay);
    }
}

fn report(args: &Args, info: &GameInfo, initial: &GameState, outcome: &SearchOutcome<GameState>) {
    let ansi = !args.no_color;
    match outcome.result {
        SearchResult::Success => {
            if let (Some(solution), Some(final_state)) = (&outcome.solution, &outcome.final_state) {
                println!(
                    "Moves ({}): {}",
                    solution.moves.len(),
                    format_moves(info, &solution.moves)
                );
                if args.animate {
                    animate_solution(
                        info,
                        initial,
                        &solution.moves,
                        ansi,
                        Duration::from_millis(args.delay_ms),
                    );
                }
                println!("Final board state:\n{}\n", info.view(final_state, ansi));
            }
        }
        SearchResult::Full => {
            println!("Node budget of {} exhausted.", outcome.stats.max_nodes);
            if args.diagnostics {
                if let Some(pending) = &outcome.lowest_pending {
                    println!(
                        "Lowest cost pending board (cost {}, {} free cells):\n{}\n",
                        pending.cost_to_node,
                        pending.state.num_free(),
                        info.view(&pending.state, ansi)
                    );
                }
            }
        }
        SearchResult::Unreachable => println!("No solution exists.\n"),
    }
    println!(
        "Nodes created: {}, expanded: {}, dead ends pruned: {}, peak frontier: {}\n",
        outcome.stats.nodes_created,
        outcome.stats.nodes_expanded,
        outcome.stats.dead_ends_pruned,
        outcome.stats.peak_frontier
    );
}

fn run_board(
    args: &Args,
    config: &SearchConfig,
    name: &str,
    info: &GameInfo,
    state: &GameState,
) -> Result<()> {
    if !args.quiet {
        println!("Loaded board from {}\n", name);
        println!("Initial board state:\n{}\n", info.view(state, !args.no_color));
    }

    let outcome =
        solve(info, state, config).with_context(|| format!("Search failed for {}", name))?;
    println!(
        "{} {} {:.3}s {} nodes",
        name,
        outcome.result,
        outcome.elapsed.as_secs_f64(),
        outcome.nodes_processed
    );

    if !args.quiet {
        report(args, info, state, &outcome);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SearchConfig {
        max_nodes: args.max_nodes,
        max_mb: args.max_mb,
        check_dead_ends: !args.no_dead_ends,
    };
    let options = RuleOptions {
        most_constrained: !args.no_constrained,
        check_touch: !args.no_touch,
    };

    let mut boards = Vec::new();
    if let Some(seed) = args.random {
        let info = GameInfo::random_with_seed(args.size, args.colors, seed)
            .with_context(|| format!("Failed to generate a random board with seed {}", seed))?;
        let state = info.initial_state();
        boards.push((format!("random:{}", seed), info, state));
    }
    for path in &args.board_files {
        let (info, state) = game_from_file(path)
            .with_context(|| format!("Failed to read board from file: {}", path.display()))?;
        boards.push((path.display().to_string(), info, state));
    }
    if boards.is_empty() {
        bail!("no board given; pass board files or --random SEED");
    }

    for (name, info, state) in boards {
        let info = info.with_options(options);
        run_board(&args, &config, &name, &info, &state)?;
    }
    Ok(())
}
