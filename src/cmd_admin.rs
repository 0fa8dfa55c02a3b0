//! One-shot administrative commands.

use std::sync::Arc;

use lobbyhands_config::Config;
use lobbyhands_desktop::DesktopActuator;
use lobbyhands_runloop::TriggerEngine;
use lobbyhands_store::{
    ClickStep, CounterStore, CycleCounters, StatsJournal, StatsSnapshot, TriggerBookStore,
};
use serde_json::json;

use crate::cli::{EntityAction, TriggerAction};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Human-readable counters and statistics.
pub(crate) fn format_stats(counters: &CycleCounters, stats: &StatsSnapshot) -> String {
    let stamp = |at: Option<chrono::DateTime<chrono::Utc>>| {
        at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
    };

    let mut out = String::new();
    out.push_str("Infinite mode\n");
    out.push_str(&format!("  cycles:        {}\n", counters.total_cycles));
    out.push_str(&format!("  entries:       {}\n", counters.total_entries));
    out.push_str(&format!("  exits:         {}\n", counters.total_exits));
    out.push_str(&format!("  hero deaths:   {}\n", counters.incapacitation_count));
    out.push_str(&format!("  last entry:    {}\n", stamp(counters.last_entry_at)));
    out.push_str(&format!("  last exit:     {}\n", stamp(counters.last_exit_at)));
    out.push_str("Totals\n");
    if stats.totals.is_empty() {
        out.push_str("  (none)\n");
    }
    for (key, value) in &stats.totals {
        out.push_str(&format!("  {:<22} {}\n", key, value));
    }
    out.push_str(&format!(
        "Session started: {}\n",
        stamp(stats.session_started_at)
    ));
    out
}

pub(crate) async fn show_stats(config: &Config, as_json: bool) -> CmdResult {
    let counters = CounterStore::open(config.storage.counters_path()).await?;
    let stats = StatsJournal::open(config.storage.stats_path()).await?;

    if as_json {
        let doc = json!({
            "counters": counters.snapshot(),
            "statistics": stats.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    print!("{}", format_stats(&counters.snapshot(), &stats.snapshot()));
    let recent = stats.recent(10);
    if !recent.is_empty() {
        println!("Recent events");
        for event in recent {
            println!(
                "  {}  {}",
                event.at.format("%Y-%m-%d %H:%M:%S"),
                serde_json::to_string(&event.kind)?
            );
        }
    }
    Ok(())
}

pub(crate) async fn clear_stats(config: &Config) -> CmdResult {
    CounterStore::open(config.storage.counters_path())
        .await?
        .clear()
        .await?;
    StatsJournal::open(config.storage.stats_path())
        .await?
        .clear()
        .await?;
    println!("Counters and statistics cleared.");
    Ok(())
}

async fn open_engine(config: &Config) -> Result<TriggerEngine, Box<dyn std::error::Error>> {
    let store = TriggerBookStore::new(config.storage.triggers_path());
    Ok(TriggerEngine::open(store, Arc::new(DesktopActuator::new())).await?)
}

pub(crate) async fn triggers(config: &Config, action: TriggerAction) -> CmdResult {
    let engine = open_engine(config).await?;
    match action {
        TriggerAction::List => {
            let lines = engine.list();
            if lines.is_empty() {
                println!("No entities configured.");
            }
            for line in lines {
                println!("{}", line);
            }
        }
        TriggerAction::Add { entity, threshold } => {
            engine.add_trigger(&entity, threshold).await?;
            println!("Added trigger {}@{}.", entity, threshold);
        }
        TriggerAction::Remove { entity, threshold } => {
            engine.remove_trigger(&entity, threshold).await?;
            println!("Removed trigger {}@{}.", entity, threshold);
        }
        TriggerAction::Enable { entity, threshold } => {
            engine.set_trigger_enabled(&entity, threshold, true).await?;
            println!("Enabled trigger {}@{}.", entity, threshold);
        }
        TriggerAction::Disable { entity, threshold } => {
            engine.set_trigger_enabled(&entity, threshold, false).await?;
            println!("Disabled trigger {}@{}.", entity, threshold);
        }
    }
    Ok(())
}

/// Parse `x,y` or `x,y:description`.
pub(crate) fn parse_click(step: &str) -> Result<ClickStep, String> {
    let (coords, description) = match step.split_once(':') {
        Some((coords, description)) => (coords, description.trim().to_string()),
        None => (step, String::new()),
    };
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected x,y in '{}'", step))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("bad x coordinate in '{}'", step))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("bad y coordinate in '{}'", step))?;
    Ok(ClickStep { x, y, description })
}

pub(crate) async fn entities(config: &Config, action: EntityAction) -> CmdResult {
    let engine = open_engine(config).await?;
    match action {
        EntityAction::Add { id, name } => {
            let name = name.unwrap_or_else(|| id.clone());
            engine.add_entity(&id, &name).await?;
            println!("Added entity {} ({}).", id, name);
        }
        EntityAction::Remove { id } => {
            engine.remove_entity(&id).await?;
            println!("Removed entity {}.", id);
        }
        EntityAction::Delay { id, secs } => {
            engine.set_click_delay(&id, secs).await?;
            println!("Click delay of {} set to {}s.", id, secs);
        }
        EntityAction::Clicks { id, steps } => {
            let clicks = steps
                .iter()
                .map(|s| parse_click(s))
                .collect::<Result<Vec<_>, _>>()?;
            let count = clicks.len();
            engine.set_clicks(&id, clicks).await?;
            println!("{} now has {} clicks.", id, count);
        }
    }
    Ok(())
}
