use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use hydro_core::progress::{filled_segments, BAR_SEGMENTS};
use hydro_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hydro")]
#[command(about = "Daily water and calorie goal tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// User to act as
    #[arg(long, global = true, default_value_t = 1)]
    user: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage your profile and daily goals
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Log water you drank
    Water {
        /// Amount in ml (1-2000)
        amount_ml: u32,
    },

    /// Log food you ate
    Food {
        /// Product name
        #[arg(long)]
        name: String,

        /// Calories per 100 g of the product
        #[arg(long = "per-100g")]
        per_100g: f64,

        /// Portion weight in grams
        #[arg(long)]
        grams: f64,
    },

    /// Log a workout
    Workout {
        /// Workout type (run, walk, bike, swim, yoga, strength, cardio, dance, ...)
        #[arg(long)]
        kind: String,

        /// Duration in minutes (1-300)
        #[arg(long)]
        minutes: u32,
    },

    /// List known workout types and their burn rates
    Workouts,

    /// Show today's progress
    Progress,

    /// Move the event log into the CSV archive
    Rollup {
        /// Delete processed event logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save a profile from flags
    Set(ProfileArgs),

    /// Answer the profile questions one at a time
    Setup {
        /// Current temperature in °C, if known
        #[arg(long, allow_hyphen_values = true)]
        temperature: Option<f64>,
    },

    /// Show the saved profile and goals
    Show,

    /// Delete the saved profile (logged events are kept)
    Reset,
}

#[derive(Args)]
struct ProfileArgs {
    /// Weight in kg (30-300)
    #[arg(long)]
    weight: f64,

    /// Height in cm (100-250)
    #[arg(long)]
    height: f64,

    /// Age in years (14-100)
    #[arg(long)]
    age: u32,

    /// male or female
    #[arg(long)]
    gender: String,

    /// Average activity minutes per day (0-480)
    #[arg(long, default_value_t = 0)]
    activity: u32,

    /// City you live in
    #[arg(long)]
    city: String,

    /// Current temperature in °C, if known
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,
}

type FileTracker = Tracker<JsonlLedger, JsonProfileStore>;

struct Paths {
    data_dir: PathBuf,
    ledger_dir: PathBuf,
    ledger: PathBuf,
    archive: PathBuf,
    profiles: PathBuf,
}

impl Paths {
    fn new(data_dir: PathBuf) -> Self {
        let ledger_dir = data_dir.join("ledger");
        Self {
            ledger: ledger_dir.join("events.jsonl"),
            archive: data_dir.join("ledger.csv"),
            profiles: data_dir.join("profiles.json"),
            ledger_dir,
            data_dir,
        }
    }
}

fn main() -> ExitCode {
    hydro_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(data_dir);
    let user = UserId(cli.user);
    tracing::debug!("Using data directory {:?} for user {}", paths.data_dir, user);

    std::fs::create_dir_all(&paths.data_dir)?;
    let mut tracker = Tracker::new(
        JsonlLedger::new(&paths.ledger).with_archive(&paths.archive),
        JsonProfileStore::new(&paths.profiles),
        config.day.boundary()?,
    );

    match cli.command {
        Commands::Profile { action } => match action {
            ProfileAction::Set(args) => cmd_profile_set(&mut tracker, user, args),
            ProfileAction::Setup { temperature } => {
                cmd_profile_setup(&mut tracker, user, temperature)
            }
            ProfileAction::Show => cmd_profile_show(&tracker, user),
            ProfileAction::Reset => cmd_profile_reset(&mut tracker, user),
        },
        Commands::Water { amount_ml } => cmd_water(&mut tracker, user, amount_ml),
        Commands::Food {
            name,
            per_100g,
            grams,
        } => cmd_food(&mut tracker, user, &name, per_100g, grams),
        Commands::Workout { kind, minutes } => cmd_workout(&mut tracker, user, &kind, minutes),
        Commands::Workouts => {
            cmd_workouts();
            Ok(())
        }
        Commands::Progress => cmd_progress(&tracker, user),
        Commands::Rollup { cleanup } => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_profile_set(tracker: &mut FileTracker, user: UserId, args: ProfileArgs) -> Result<()> {
    let input = ProfileInput {
        weight_kg: args.weight,
        height_cm: args.height,
        age: args.age,
        gender: args.gender.parse()?,
        activity_minutes: args.activity,
        city: args.city.trim().to_string(),
    };
    let profile = tracker.save_profile(user, input, args.temperature, Utc::now())?;
    display_goals(&profile);
    Ok(())
}

fn cmd_profile_setup(
    tracker: &mut FileTracker,
    user: UserId,
    temperature: Option<f64>,
) -> Result<()> {
    let mut setup = ProfileSetup::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", setup.prompt());
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(Error::InvalidInput(
                    "profile setup aborted before all questions were answered".into(),
                ))
            }
        };

        match setup.feed(&line) {
            Ok(SetupStep::Complete) => break,
            Ok(SetupStep::Next(_)) => {}
            Err(e) => println!("\n✗ {} Try again.", e),
        }
    }
    println!();

    let profile = tracker.save_profile(user, setup.finish()?, temperature, Utc::now())?;
    display_goals(&profile);
    Ok(())
}

fn cmd_profile_show(tracker: &FileTracker, user: UserId) -> Result<()> {
    let profile = tracker.profile(user)?;
    println!("Profile (user {})", user);
    println!("  Weight:   {} kg", profile.weight_kg);
    println!("  Height:   {} cm", profile.height_cm);
    println!("  Age:      {}", profile.age);
    println!("  Gender:   {}", profile.gender);
    println!("  Activity: {} min/day", profile.activity_minutes);
    println!("  City:     {}", profile.city);
    if let Some(t) = profile.ambient_temperature_c {
        println!("  Temperature at setup: {}°C", t);
    }
    println!();
    println!("  Water goal:   {} ml", profile.water_goal_ml);
    println!("  Calorie goal: {} kcal", profile.calorie_goal);
    Ok(())
}

fn cmd_profile_reset(tracker: &mut FileTracker, user: UserId) -> Result<()> {
    if tracker.reset_profile(user)? {
        println!("✓ Profile reset. Run `hydro profile set` to create a new one.");
    } else {
        println!("No profile to reset.");
    }
    Ok(())
}

fn cmd_water(tracker: &mut FileTracker, user: UserId, amount_ml: u32) -> Result<()> {
    let now = Utc::now();
    tracker.log_water(user, amount_ml, now)?;
    println!("✓ Logged {} ml of water", amount_ml);

    let day = tracker.progress(user, now)?;
    let water = day.report.water;
    println!();
    println!("  {}", bar(water.percent));
    println!(
        "  {} ml of {} ml ({}%)",
        water.consumed_ml, water.goal_ml, water.percent
    );
    println!("  Remaining: {} ml", water.remaining_ml);
    Ok(())
}

fn cmd_food(
    tracker: &mut FileTracker,
    user: UserId,
    name: &str,
    per_100g: f64,
    grams: f64,
) -> Result<()> {
    let now = Utc::now();
    let event = tracker.log_food(user, name, per_100g, grams, now)?;
    if let LedgerEntry::FoodIntake {
        product_name,
        calories,
        weight_g,
    } = &event.entry
    {
        println!("✓ Logged {} ({} g): {} kcal", product_name, weight_g, calories);
    }

    let day = tracker.progress(user, now)?;
    let calories = day.report.calories;
    println!();
    println!("  Consumed: {} kcal", calories.consumed);
    println!("  Burned:   {} kcal", calories.burned);
    println!(
        "  Balance:  {} kcal ({}% of goal)",
        calories.balance, calories.percent
    );
    println!("  Remaining: {} kcal", calories.remaining);
    Ok(())
}

fn cmd_workout(tracker: &mut FileTracker, user: UserId, kind: &str, minutes: u32) -> Result<()> {
    let now = Utc::now();
    let event = tracker.log_workout(user, kind, minutes, now)?;
    if let LedgerEntry::Workout {
        workout_type,
        duration_min,
        calories_burned,
        water_needed_ml,
    } = &event.entry
    {
        println!("✓ Logged workout: {} ({} min)", workout_type, duration_min);
        println!("  Burned: {} kcal", calories_burned);
        println!("  Drink an extra {} ml of water", water_needed_ml);
    }

    let day = tracker.progress(user, now)?;
    println!();
    println!("  Burned today: {} kcal", day.totals.calories_burned);
    println!(
        "  Extra water from workouts today: {} ml",
        day.totals.workout_water_ml
    );
    Ok(())
}

fn cmd_workouts() {
    println!("Known workouts (kcal/min at 70 kg):");
    for kind in WorkoutKind::all_known() {
        println!("  {:<10} {}", kind.key(), kind.rate_per_minute());
    }
    println!(
        "  {:<10} {}",
        "other",
        hydro_core::catalog::DEFAULT_RATE_PER_MINUTE
    );
}

fn cmd_progress(tracker: &FileTracker, user: UserId) -> Result<()> {
    let day = tracker.progress(user, Utc::now())?;
    let water = day.report.water;
    let calories = day.report.calories;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROGRESS FOR {}", day.day.format("%Y-%m-%d"));
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  WATER");
    println!("  {}", bar(water.percent));
    println!(
        "  {} ml of {} ml ({}%)",
        water.consumed_ml, water.goal_ml, water.percent
    );
    if water.complete {
        println!("  ✓ Goal reached!");
    } else {
        println!("  Remaining: {} ml", water.remaining_ml);
    }
    println!(
        "  From workouts: +{} ml recommended",
        water.workout_extra_ml
    );
    println!();
    println!("  CALORIES");
    println!("  {}", bar(calories.percent));
    println!("  Consumed: {} kcal", calories.consumed);
    println!("  Burned:   {} kcal", calories.burned);
    println!(
        "  Balance:  {} kcal ({}%)",
        calories.balance, calories.percent
    );
    if calories.exceeded {
        println!("  ⚠ Over your calorie goal!");
    } else {
        println!("  ✓ Within goal");
    }
    println!("  Remaining: {} kcal", calories.remaining);
    println!();
    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.ledger.exists() {
        println!("No event log found - nothing to roll up.");
        return Ok(());
    }

    let count = hydro_core::csv_rollup::roll_up(&paths.ledger, &paths.archive)?;

    println!("✓ Rolled up {} events to CSV", count);
    println!("  CSV: {}", paths.archive.display());

    if cleanup {
        let cleaned = hydro_core::csv_rollup::remove_processed_logs(&paths.ledger_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed event logs", cleaned);
        }
    }

    Ok(())
}

fn display_goals(profile: &Profile) {
    println!("✓ Profile saved!");
    println!();
    println!("  Daily goals:");
    println!("  Water:    {} ml", profile.water_goal_ml);
    if let Some(t) = profile.ambient_temperature_c {
        println!("            (temperature in {}: {}°C)", profile.city, t);
    }
    println!("  Calories: {} kcal", profile.calorie_goal);
}

fn bar(percent: i64) -> String {
    let filled = filled_segments(percent);
    let empty = BAR_SEGMENTS as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
