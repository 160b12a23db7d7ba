#![allow(dead_code)]

use chrono::{Local, NaiveDate, NaiveDateTime};

use planit::api::gateway::{TaskDraft, TaskGateway, TaskPatch};
use planit::config::PlanitConfig;
use planit::core::task::{Priority, Task, TaskStatus};
use planit::session::{self, Session};
use planit::sync::TaskManager;

const USAGE: &str = "\
Usage: planit [--debug] <command>

  signup <username> <email> <password>
  login <username> <password>
  logout
  list
  add <title> [--due YYYY-MM-DD] [--priority Low|Medium|High] [--desc TEXT]
  edit <id> [--title TEXT] [--due YYYY-MM-DD] [--priority P] [--desc TEXT] [--status S]
  complete <id>
  delete <id>
  share <id> <email>
  remind <id> <YYYY-MM-DD HH:MM>
";

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let debug = args.iter().any(|a| a == "--debug");
    args.retain(|a| a != "--debug");

    // Log to the systemd user journal (`journalctl --user -t planit -f`).
    // planit targets at info/debug per the flag, everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("planit") {
                    let max = if planit::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        planit::set_debug_logging(debug);

        if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
            let journal = journal.with_syslog_identifier("planit".to_string());
            let _ = log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }));
            log::set_max_level(log::LevelFilter::Debug);
        }
    }

    let config = PlanitConfig::load();
    if let Err(e) = config.ensure_dirs() {
        eprintln!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    let gateway = match TaskGateway::new(&config.base_url) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let Some(command) = args.first().cloned() else {
        eprint!("{}", USAGE);
        std::process::exit(2);
    };
    let rest = &args[1..];

    let result = match command.as_str() {
        "signup" => cmd_signup(&gateway, rest).await,
        "login" => cmd_login(&gateway, &config, rest).await,
        "logout" => cmd_logout(&config),
        "list" => cmd_list(gateway, &config).await,
        "add" => cmd_add(gateway, &config, rest).await,
        "edit" => cmd_edit(gateway, &config, rest).await,
        "complete" => cmd_complete(gateway, &config, rest).await,
        "delete" => cmd_delete(gateway, &config, rest).await,
        "share" => cmd_share(&gateway, &config, rest).await,
        "remind" => cmd_remind(&gateway, &config, rest).await,
        _ => {
            eprint!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn require_session(config: &PlanitConfig) -> Result<Session, String> {
    session::load(&config.session_path())
        .ok_or_else(|| "Not logged in. Run `planit login <username> <password>` first.".to_string())
}

/// Extract the value following `--name`, if present.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date {:?}, expected YYYY-MM-DD", s))
}

async fn cmd_signup(gateway: &TaskGateway, args: &[String]) -> Result<(), String> {
    let [username, email, password] = args else {
        return Err("Usage: planit signup <username> <email> <password>".to_string());
    };
    gateway
        .signup(username, email, password)
        .await
        .map_err(|e| e.to_string())?;
    println!("User registered. Now: planit login {} <password>", username);
    Ok(())
}

async fn cmd_login(
    gateway: &TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let [username, password] = args else {
        return Err("Usage: planit login <username> <password>".to_string());
    };
    let login = gateway
        .login(username, password)
        .await
        .map_err(|e| e.to_string())?;
    let sess = Session::new(login.access_token, login.user);
    session::save(&config.session_path(), &sess)
        .map_err(|e| format!("Failed to persist session: {}", e))?;
    println!("Logged in as {}", sess.user.username);
    Ok(())
}

fn cmd_logout(config: &PlanitConfig) -> Result<(), String> {
    session::clear(&config.session_path());
    println!("Logged out.");
    Ok(())
}

async fn cmd_list(gateway: TaskGateway, config: &PlanitConfig) -> Result<(), String> {
    let sess = require_session(config)?;
    let mut manager = TaskManager::new(gateway);
    manager
        .refresh(&sess.token)
        .await
        .map_err(|e| e.to_string())?;

    let today = Local::now().date_naive();
    let groups = manager.store().group_by_status();

    for (heading, tasks) in [
        ("Pending", &groups.pending),
        ("In Progress", &groups.in_progress),
        ("Completed", &groups.completed),
    ] {
        if tasks.is_empty() {
            continue;
        }
        println!("=== {} ({}) ===", heading, tasks.len());
        for task in tasks {
            print_task(task, today);
        }
        println!();
    }

    let stats = manager.store().stats(today);
    println!(
        "{} total — {} pending, {} completed, {} overdue",
        stats.total, stats.pending, stats.completed, stats.overdue
    );
    Ok(())
}

fn print_task(task: &Task, today: NaiveDate) {
    let mut line = format!("  [{}] {}", task.identity, task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due));
    }
    if task.is_overdue(today) {
        line.push_str("  OVERDUE");
    }
    if task.priority != Priority::Medium {
        line.push_str(&format!("  ({})", task.priority.as_label()));
    }
    println!("{}", line);
    if let Some(ref desc) = task.description {
        println!("      {}", desc);
    }
}

async fn cmd_add(
    gateway: TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let Some(title) = args.first() else {
        return Err("Usage: planit add <title> [--due YYYY-MM-DD] ...".to_string());
    };

    let mut draft = TaskDraft::new(title.clone());
    if let Some(due) = flag_value(args, "--due") {
        draft.due_date = Some(parse_date(&due)?);
    }
    if let Some(p) = flag_value(args, "--priority") {
        draft.priority =
            Some(Priority::from_label(&p).ok_or_else(|| format!("Unknown priority {:?}", p))?);
    }
    draft.description = flag_value(args, "--desc");

    let mut manager = TaskManager::new(gateway);
    let created = manager
        .create(&sess.token, &draft)
        .await
        .map_err(|e| e.to_string())?;
    println!("Added [{}] {}", created.identity, created.title);
    Ok(())
}

async fn cmd_edit(
    gateway: TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let Some(id) = args.first() else {
        return Err("Usage: planit edit <id> [--title ...] ...".to_string());
    };

    let mut patch = TaskPatch::default();
    patch.title = flag_value(args, "--title");
    patch.description = flag_value(args, "--desc");
    if let Some(due) = flag_value(args, "--due") {
        patch.due_date = Some(parse_date(&due)?);
    }
    if let Some(p) = flag_value(args, "--priority") {
        patch.priority =
            Some(Priority::from_label(&p).ok_or_else(|| format!("Unknown priority {:?}", p))?);
    }
    if let Some(s) = flag_value(args, "--status") {
        patch.status =
            Some(TaskStatus::from_label(&s).ok_or_else(|| format!("Unknown status {:?}", s))?);
    }

    let mut manager = TaskManager::new(gateway);
    match manager.update(&sess.token, id, &patch).await {
        Ok(Some(updated)) => {
            println!("Updated [{}] {} ({})", updated.identity, updated.title, updated.status.as_label());
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

async fn cmd_complete(
    gateway: TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let Some(id) = args.first() else {
        return Err("Usage: planit complete <id>".to_string());
    };

    let mut manager = TaskManager::new(gateway);
    match manager.quick_complete(&sess.token, id).await {
        Ok(Some(task)) => {
            println!("Completed [{}] {}", task.identity, task.title);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

async fn cmd_delete(
    gateway: TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let Some(id) = args.first() else {
        return Err("Usage: planit delete <id>".to_string());
    };

    let mut manager = TaskManager::new(gateway);
    if manager
        .delete(&sess.token, id)
        .await
        .map_err(|e| e.to_string())?
    {
        println!("Deleted [{}]", id);
    }
    Ok(())
}

async fn cmd_share(
    gateway: &TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let [id, recipient] = args else {
        return Err("Usage: planit share <id> <email>".to_string());
    };
    gateway
        .share_task(&sess.token, id, recipient)
        .await
        .map_err(|e| e.to_string())?;
    println!("Shared [{}] with {}", id, recipient);
    Ok(())
}

async fn cmd_remind(
    gateway: &TaskGateway,
    config: &PlanitConfig,
    args: &[String],
) -> Result<(), String> {
    let sess = require_session(config)?;
    let [id, when] = args else {
        return Err("Usage: planit remind <id> <YYYY-MM-DD HH:MM>".to_string());
    };
    let reminder = NaiveDateTime::parse_from_str(when, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("Invalid reminder {:?}, expected YYYY-MM-DD HH:MM", when))?;
    gateway
        .set_reminder(&sess.token, id, reminder)
        .await
        .map_err(|e| e.to_string())?;
    println!("Reminder set for [{}] at {}", id, when);
    Ok(())
}
