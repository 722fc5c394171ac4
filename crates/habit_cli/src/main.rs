//! `habit` - command-line surface over the habit tracker core.
//!
//! # Responsibility
//! - Resolve configuration, logging and the database, then dispatch to the
//!   core services.
//! - Print every result as pretty JSON on stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use habit_core::{
    calendar, core_version, init_logging_from_config, open_db, ping, CompletionService,
    CoreConfig, Frequency, HabitId, HabitService, NewHabit, ReferenceZone,
    SqliteCompletionRepository, SqliteHabitRepository, SqliteUserRepository, StatsService,
    ToggleOutcome, User, UserService,
};
use log::info;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "habit")]
#[command(about = "Track daily habits, streaks and completion statistics")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/habit-tracker/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Zone for day boundaries: `local`, `UTC` or an IANA name
    #[arg(long, global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the core library is linked
    Ping,
    /// Sign in by email, creating the user on first use
    SignIn {
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a habit
    Add {
        #[arg(long)]
        email: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// daily | weekly | custom
        #[arg(long, default_value = "daily", value_parser = parse_frequency)]
        frequency: Frequency,
        /// Reminder time as HH:MM; repeatable
        #[arg(long = "reminder")]
        reminders: Vec<String>,
        /// Display color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        goal: Option<u32>,
    },
    /// List habits with today's completion state
    List {
        #[arg(long)]
        email: String,
    },
    /// Complete a habit for today, or undo today's completion
    Toggle {
        #[arg(long)]
        email: String,
        habit: HabitId,
    },
    /// Delete a habit and all of its completions
    Remove {
        #[arg(long)]
        email: String,
        habit: HabitId,
    },
    /// Current and longest streak per habit
    Streaks {
        #[arg(long)]
        email: String,
    },
    /// Aggregate statistics for today
    Stats {
        #[arg(long)]
        email: String,
    },
}

fn parse_frequency(value: &str) -> Result<Frequency, String> {
    Frequency::parse(&value.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown frequency `{value}`; expected daily|weekly|custom"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ping never touches config or storage.
    if matches!(cli.command, Command::Ping) {
        return print_json(&ping_json());
    }

    let config = match &cli.config {
        Some(path) => CoreConfig::load_from(path),
        None => CoreConfig::load(),
    }
    .context("failed to load configuration")?;

    init_logging_from_config(&config).context("failed to initialize logging")?;

    let zone_override = cli
        .timezone
        .as_deref()
        .map(str::parse::<ReferenceZone>)
        .transpose()
        .context("invalid --timezone")?;
    let default_zone = match zone_override {
        Some(zone) => zone,
        None => config
            .reference_zone()
            .context("invalid calendar.timezone")?,
    };

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let session = Session {
        conn: &conn,
        zone_override,
        default_zone,
        now_ms: calendar::now_ms(),
    };
    let output = session.run(cli.command)?;
    print_json(&output)
}

struct Session<'conn> {
    conn: &'conn Connection,
    zone_override: Option<ReferenceZone>,
    default_zone: ReferenceZone,
    now_ms: i64,
}

impl<'conn> Session<'conn> {
    fn run(&self, command: Command) -> Result<Value> {
        match command {
            Command::Ping => Ok(ping_json()),
            Command::SignIn { email, name } => self.sign_in(&email, name),
            Command::Add {
                email,
                name,
                description,
                category,
                frequency,
                reminders,
                color,
                icon,
                goal,
            } => {
                let user = self.require_user(&email)?;
                let habit = self.habits()?.create_habit(
                    NewHabit {
                        user_id: user.uuid,
                        name,
                        description,
                        category,
                        frequency,
                        reminder_times: reminders,
                        color,
                        icon,
                        goal,
                    },
                    self.now_ms,
                )?;
                Ok(serde_json::to_value(habit)?)
            }
            Command::List { email } => {
                let user = self.require_user(&email)?;
                let completions = self.completions(&user)?;
                let mut listed = Vec::new();
                for habit in self.habits()?.list_habits(user.uuid)? {
                    let done = completions.is_completed_today(habit.uuid, self.now_ms)?;
                    listed.push(json!({ "habit": habit, "completed_today": done }));
                }
                Ok(Value::Array(listed))
            }
            Command::Toggle { email, habit } => {
                let user = self.require_user(&email)?;
                let outcome = self
                    .completions(&user)?
                    .toggle_completion(habit, user.uuid, self.now_ms)?;
                Ok(match outcome {
                    ToggleOutcome::Completed(completion_id) => json!({
                        "habit_id": habit,
                        "completed": true,
                        "completion_id": completion_id,
                    }),
                    ToggleOutcome::Uncompleted { removed } => json!({
                        "habit_id": habit,
                        "completed": false,
                        "removed": removed,
                    }),
                })
            }
            Command::Remove { email, habit } => {
                let user = self.require_user(&email)?;
                self.habits()?.delete_user_habit(habit, user.uuid)?;
                Ok(json!({ "habit_id": habit, "deleted": true }))
            }
            Command::Streaks { email } => {
                let user = self.require_user(&email)?;
                let records = self.stats(&user)?.user_streaks(user.uuid, self.now_ms)?;
                Ok(serde_json::to_value(records)?)
            }
            Command::Stats { email } => {
                let user = self.require_user(&email)?;
                let statistics = self.stats(&user)?.statistics(user.uuid, self.now_ms)?;
                Ok(serde_json::to_value(statistics)?)
            }
        }
    }

    fn sign_in(&self, email: &str, name: Option<String>) -> Result<Value> {
        let users = self.users()?;
        let user = users.sign_in(email, name, self.now_ms)?;
        let settings = users.settings(user.uuid)?;
        info!("event=cli_sign_in module=cli status=ok user_id={}", user.uuid);
        Ok(json!({ "user": user, "settings": settings }))
    }

    fn require_user(&self, email: &str) -> Result<User> {
        match self.users()?.find_by_email(email)? {
            Some(user) => Ok(user),
            None => bail!("no user signed in as `{email}`; run `habit sign-in {email}` first"),
        }
    }

    /// `--timezone` wins over the user's stored zone.
    fn zone_for(&self, user: &User) -> Result<ReferenceZone> {
        match self.zone_override {
            Some(zone) => Ok(zone),
            None => Ok(self.users()?.reference_zone(user.uuid)?),
        }
    }

    fn users(&self) -> Result<UserService<SqliteUserRepository<'conn>>> {
        Ok(UserService::new(
            SqliteUserRepository::try_new(self.conn)?,
            self.default_zone,
        ))
    }

    fn habits(&self) -> Result<HabitService<SqliteHabitRepository<'conn>>> {
        Ok(HabitService::new(SqliteHabitRepository::try_new(self.conn)?))
    }

    fn completions(
        &self,
        user: &User,
    ) -> Result<CompletionService<SqliteCompletionRepository<'conn>>> {
        Ok(CompletionService::new(
            SqliteCompletionRepository::try_new(self.conn)?,
            self.zone_for(user)?,
        ))
    }

    fn stats(
        &self,
        user: &User,
    ) -> Result<StatsService<SqliteHabitRepository<'conn>, SqliteCompletionRepository<'conn>>> {
        Ok(StatsService::new(
            SqliteHabitRepository::try_new(self.conn)?,
            SqliteCompletionRepository::try_new(self.conn)?,
            self.zone_for(user)?,
        ))
    }
}

fn ping_json() -> Value {
    json!({ "ping": ping(), "version": core_version() })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
