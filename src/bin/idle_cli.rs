use clap::{Parser, Subcommand};
use idlesim::goal::Goal;
use idlesim::interactions;
use idlesim::rates::estimate_rates;
use idlesim::solver::{self, SolverLimits, SolverOutcome};
use idlesim::{consume_ticks, GlobalState, Registries, SimRng, Skill, StateUpdateBuilder};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "idle_cli")]
#[command(about = "CLI tools for the idle progression simulator and planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an action for a number of ticks and report the changes
    Simulate {
        /// Action id or name (e.g. "demo:normal_tree" or "Normal Tree")
        action: String,
        /// Tick budget (100ms each)
        #[arg(short, long, default_value_t = 36_000)]
        ticks: i64,
        /// RNG seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Optional save-game JSON to start from
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Search for a plan reaching skill level goals
    Solve {
        /// Goals as "skill:level" pairs (e.g. "woodcutting:50")
        #[arg(required = true)]
        goals: Vec<String>,
        /// RNG seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Node expansion limit
        #[arg(long, default_value_t = 100_000)]
        max_nodes: usize,
    },
    /// Search for a plan reaching a GP target
    SolveGp {
        amount: i64,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
    /// Show projected per-hour rates for an action
    Rates {
        /// Action id or name
        action: String,
    },
    /// Validate a save-game JSON file
    Validate { save: PathBuf },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            action,
            ticks,
            seed,
            save,
        } => run_simulate(&action, ticks, seed, save.as_deref()),
        Commands::Solve {
            goals,
            seed,
            max_nodes,
        } => run_solve(&goals, seed, max_nodes),
        Commands::SolveGp { amount, seed } => {
            run_solve_goal(Goal::ReachGp { amount }, seed, 100_000)
        }
        Commands::Rates { action } => run_rates(&action),
        Commands::Validate { save } => run_validate(&save),
    }
}

fn registries() -> Arc<Registries> {
    Arc::new(Registries::demo())
}

fn resolve_action(reg: &Registries, name: &str) -> Option<idlesim::Id> {
    idlesim::Id::parse(name)
        .ok()
        .filter(|id| reg.action(id).is_some())
        .or_else(|| reg.action_id_by_name(name))
}

fn load_state(reg: Arc<Registries>, save: Option<&std::path::Path>) -> GlobalState {
    match save {
        Some(path) => {
            let content = fs::read_to_string(path).expect("Failed to read save file");
            let value: serde_json::Value =
                serde_json::from_str(&content).expect("Failed to parse save JSON");
            GlobalState::from_json(reg, &value).expect("Failed to load save")
        }
        None => GlobalState::empty(reg),
    }
}

fn run_simulate(action: &str, ticks: i64, seed: u64, save: Option<&std::path::Path>) {
    let reg = registries();
    let Some(action_id) = resolve_action(&reg, action) else {
        println!("[ERROR] Unknown action: {}", action);
        return;
    };
    let state = load_state(Arc::clone(&reg), save);

    let mut b = StateUpdateBuilder::new(state);
    if let Err(e) = interactions::start_action(&mut b, &action_id) {
        println!("[ERROR] Cannot start {}: {}", action_id, e);
        return;
    }
    let mut rng = SimRng::seeded(seed);
    consume_ticks(&mut b, ticks, &mut rng);
    let (end_state, changes) = b.build();

    println!("=== Simulation Report ===");
    println!(
        "Action: {}  Budget: {} ticks  Seed: {}\n",
        action_id, ticks, seed
    );
    println!("Ticks consumed: {}", changes.ticks_consumed);
    if !changes.skill_xp_changes.is_empty() {
        println!("\nXP gained:");
        for (skill, xp) in &changes.skill_xp_changes {
            println!("  {:<14} +{}", skill.to_string(), xp);
        }
    }
    if !changes.skill_level_changes.is_empty() {
        println!("\nLevels:");
        for (skill, (from, to)) in &changes.skill_level_changes {
            println!("  {:<14} {} -> {}", skill.to_string(), from, to);
        }
    }
    if !changes.inventory_changes.is_empty() {
        println!("\nInventory:");
        for (item, delta) in &changes.inventory_changes {
            println!("  {:<24} {:+}", item.to_string(), delta);
        }
    }
    if !changes.dropped_items.is_empty() {
        println!("\nDropped (inventory full):");
        for (item, count) in &changes.dropped_items {
            println!("  {:<24} {}", item.to_string(), count);
        }
    }
    if changes.gp_change != 0 {
        println!("\nGP: {:+}", changes.gp_change);
    }
    println!(
        "\nEnd: {} slots used, activity {}",
        end_state.inventory.used_slots(),
        if end_state.active_activity.is_some() {
            "still running"
        } else {
            "cleared"
        }
    );
}

fn parse_skill(name: &str) -> Option<Skill> {
    Skill::ALL
        .iter()
        .copied()
        .find(|s| s.name().eq_ignore_ascii_case(name))
}

fn run_solve(goals: &[String], seed: u64, max_nodes: usize) {
    let mut levels = Vec::new();
    for goal_arg in goals {
        let Some((skill_name, level_str)) = goal_arg.split_once(':') else {
            println!("[ERROR] Bad goal '{}'; use skill:level", goal_arg);
            return;
        };
        let Some(skill) = parse_skill(skill_name) else {
            println!("[ERROR] Unknown skill '{}'", skill_name);
            return;
        };
        let Ok(level) = level_str.parse::<u32>() else {
            println!("[ERROR] Bad level '{}'", level_str);
            return;
        };
        levels.push((skill, level));
    }
    run_solve_goal(Goal::multi_skill(levels), seed, max_nodes);
}

fn run_solve_goal(goal: Goal, seed: u64, max_nodes: usize) {
    let reg = registries();
    let state = GlobalState::empty(reg);
    let limits = SolverLimits {
        max_expanded_nodes: max_nodes,
        ..SolverLimits::default()
    };

    println!("Solving: {}\n", goal.describe());
    match solver::solve(&state, &goal, &limits, seed) {
        SolverOutcome::Success(solution) => {
            print!("{}", solution.plan.pretty_print());
            println!(
                "\nSearch: {} nodes expanded, {} replans, cache {}/{} hit/miss",
                solution.stats.expanded_nodes,
                solution.stats.replans,
                solution.stats.cache_hits,
                solution.stats.cache_misses
            );
        }
        SolverOutcome::Failure(failure) => {
            println!("[ERROR] No plan: {}", failure.message);
            println!(
                "Search: {} nodes expanded, {} replans",
                failure.stats.expanded_nodes, failure.stats.replans
            );
        }
    }
}

fn run_rates(action: &str) {
    let reg = registries();
    let Some(action_id) = resolve_action(&reg, action) else {
        println!("[ERROR] Unknown action: {}", action);
        return;
    };
    let state = GlobalState::empty(Arc::clone(&reg));
    let mut b = StateUpdateBuilder::new(state);
    if let Err(e) = interactions::start_action(&mut b, &action_id) {
        println!("[ERROR] Cannot start {}: {}", action_id, e);
        return;
    }
    let (state, _) = b.build();
    let rates = estimate_rates(&state);

    const TICKS_PER_HOUR: f64 = 36_000.0;
    println!("=== Projected Rates: {} ===\n", action_id);
    for (skill, rate) in &rates.xp_per_tick_by_skill {
        println!("  {:<14} {:>10.0} XP/h", skill.to_string(), rate * TICKS_PER_HOUR);
    }
    if rates.mastery_xp_per_tick > 0.0 {
        println!(
            "  {:<14} {:>10.0} mastery XP/h",
            "Mastery",
            rates.mastery_xp_per_tick * TICKS_PER_HOUR
        );
    }
    for (item, flow) in &rates.item_flows_per_tick {
        println!(
            "  {:<24} {:>+9.0} /h",
            item.to_string(),
            flow * TICKS_PER_HOUR
        );
    }
    if rates.direct_gp_per_tick > 0.0 {
        println!("  {:<14} {:>10.0} GP/h", "GP", rates.direct_gp_per_tick * TICKS_PER_HOUR);
    }
}

fn run_validate(save: &std::path::Path) {
    println!("=== Validating Save ===\n");
    let content = match fs::read_to_string(save) {
        Ok(c) => c,
        Err(e) => {
            println!("[ERROR] Failed to read file: {}", e);
            return;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            println!("[ERROR] Invalid JSON: {}", e);
            return;
        }
    };
    match GlobalState::from_json(registries(), &value) {
        Ok(state) => {
            println!("[INFO] Save loads cleanly.");
            println!("  GP: {}", state.gp);
            println!("  Inventory: {}/{} slots", state.inventory.used_slots(), state.inventory.capacity());
            let mut levels: Vec<String> = Vec::new();
            for skill in Skill::ALL {
                let level = state.skill_level(skill);
                if level > 1 {
                    levels.push(format!("{} {}", skill, level));
                }
            }
            if !levels.is_empty() {
                println!("  Levels: {}", levels.join(", "));
            }
        }
        Err(e) => println!("[ERROR] {}", e),
    }
}
