// Line-oriented operator console
//
// Connects to the agent backend named by BOT_CONSOLE_BACKEND_URL, mirrors its
// state and reads operator commands from stdin. Set RUST_LOG=debug to see
// channel transitions.

use anyhow::Result;
use bot_console::format::{format_elapsed, format_list};
use bot_console::{CommandOutcome, ConsoleOptions, RemoteConsole, StoreChange, WaypointId};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: status | start | pause | stop | save | capture <name> | \
                    delete <waypoint-id> | waypoints | emergency | reset | sessions | stats | quit";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let options = ConsoleOptions::from_env()?;
    log::info!("bot-console {} -> {}", bot_console::VERSION, options.base_url);

    let console = RemoteConsole::remote(options)?;
    match console.api().health().await {
        Ok(true) => log::info!("Backend healthy"),
        Ok(false) => log::warn!("Backend answered but did not report healthy"),
        Err(e) => log::warn!("Backend health check failed: {e}"),
    }

    let report = console.start().await;
    if !report.is_complete() {
        log::warn!("Initial load incomplete: {report:?}");
    }

    let mut notifications = console.notifications().subscribe();
    let mut changes = console.store().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Ok(()) = notifications.changed() => {
                if let Some(notification) = notifications.borrow_and_update().clone() {
                    println!("[{:?}] {}", notification.severity, notification.message);
                }
            }
            Ok(change) = changes.recv() => {
                if change == StoreChange::Status {
                    let status = console.store().status();
                    log::debug!(
                        "{:?} {} hp {:.0}% mp {:.0}%",
                        status.run_state(),
                        format_elapsed(status.stats.time_running),
                        status.game_state.hp_percent,
                        status.game_state.mp_percent,
                    );
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_command(&console, line.trim()).await {
                    break;
                }
            }
        }
    }

    console.shutdown().await;
    Ok(())
}

/// Execute one operator line; returns false on `quit`
async fn run_command(console: &RemoteConsole, line: &str) -> bool {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let dispatcher = console.dispatcher();

    let outcome = match verb {
        "" => return true,
        "quit" | "exit" => return false,
        "status" => {
            let status = console.store().status();
            println!(
                "{:?} ({}) connection {:?}, session {}, kills {}, loot {}, exp {}",
                status.run_state(),
                format_elapsed(status.stats.time_running),
                console.connection().state(),
                status.session_id.as_ref().map_or("-", |id| id.as_str()),
                status.stats.creatures_killed,
                status.stats.items_looted,
                status.stats.exp_gained,
            );
            return true;
        }
        "waypoints" => {
            let configuration = console.store().configuration();
            for waypoint in &configuration.waypoints {
                println!("{} {} ({}, {})", waypoint.id, waypoint.name, waypoint.x, waypoint.y);
            }
            println!("targets: {}", format_list(&configuration.target_creatures));
            return true;
        }
        "sessions" => {
            let outcome = dispatcher.refresh_sessions().await;
            for session in console.store().sessions() {
                println!(
                    "{} {} kills {} exp {}",
                    session.stats.session_id.as_ref().map_or("-", |id| id.as_str()),
                    format_elapsed(session.stats.time_running),
                    session.stats.creatures_killed,
                    session.exp_gained(),
                );
            }
            outcome
        }
        "stats" => {
            let outcome = dispatcher.refresh_statistics().await;
            if let Some(statistics) = console.store().statistics() {
                let totals = statistics.historical;
                println!(
                    "{} sessions, {} total, {} kills, {} items",
                    totals.total_sessions,
                    format_elapsed(totals.total_time),
                    totals.total_creatures,
                    totals.total_items,
                );
            }
            outcome
        }
        "start" => dispatcher.start().await,
        "pause" => dispatcher.pause().await,
        "stop" => dispatcher.stop().await,
        "save" => dispatcher.save_configuration().await,
        "emergency" => dispatcher.emergency_stop().await,
        "reset" => dispatcher.reset_stats().await,
        "capture" => {
            let name = rest.to_string();
            dispatcher.capture_position(|_| async move { Some(name) }).await
        }
        "delete" => {
            // Provisional ids print as numbers; match on the printed form
            let id = console
                .store()
                .configuration()
                .waypoints
                .into_iter()
                .map(|waypoint| waypoint.id)
                .find(|id| id.to_string() == rest.trim())
                .unwrap_or_else(|| WaypointId::from(rest.trim()));
            dispatcher.delete_waypoint(&id).await
        }
        _ => {
            println!("{HELP}");
            return true;
        }
    };

    if outcome == CommandOutcome::Declined {
        println!("{verb}: not available in the current state");
    }
    true
}
