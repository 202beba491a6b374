use anyhow::Result;
use clap::Subcommand;

use crate::{
    engine::{duration::DurationFormatter, TimeEngine},
    settings::{PersistedSettings, SettingsStore},
    utils::time::{format_clock_time, parse_clock_time},
};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Print current settings")]
    Show,
    #[command(about = "Change settings. Only the given options are touched")]
    Set(SetOptions),
    #[command(about = "Remove every setting. Tracking stops until onboarding is completed again")]
    Clear,
}

#[derive(clap::Args, Debug, Default)]
pub struct SetOptions {
    #[arg(long, help = "Daily work limit in minutes")]
    daily_limit: Option<i64>,
    #[arg(long, help = "Time at which a new day starts, as HH:MM. 04:00 by default")]
    reset: Option<String>,
    #[arg(long, help = "Send reminders while over the limit")]
    notifications: Option<bool>,
    #[arg(long, help = "Minutes without input after which time counts as idle")]
    idle_threshold: Option<i64>,
    #[arg(long, help = "Minutes between repeated over-limit reminders")]
    reminder: Option<i64>,
}

pub async fn process_config_command(
    store: &impl SettingsStore,
    command: ConfigCommand,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let settings = store.load().await?;
            println!("{}", describe_settings(&settings));
        }
        ConfigCommand::Set(options) => {
            let mut settings = store.load().await?;
            apply_options(&mut settings, options)?;
            store.save(&settings).await?;
            println!("{}", describe_settings(&settings));
        }
        ConfigCommand::Clear => {
            store.save(&PersistedSettings::default()).await?;
            println!("Settings cleared");
        }
    }
    Ok(())
}

fn apply_options(settings: &mut PersistedSettings, options: SetOptions) -> Result<()> {
    // Reset goes first so an explicit value wins over the default a new limit brings.
    if let Some(reset) = options.reset {
        settings.set_reset_time(parse_clock_time(&reset)?);
    }
    if let Some(daily_limit) = options.daily_limit {
        settings.set_daily_limit(daily_limit);
    }
    if let Some(notifications) = options.notifications {
        settings.notifications_enabled = Some(notifications);
    }
    if let Some(idle_threshold) = options.idle_threshold {
        settings.idle_threshold_minutes = Some(idle_threshold);
    }
    if let Some(reminder) = options.reminder {
        settings.over_limit_reminder_minutes = Some(reminder);
    }
    Ok(())
}

fn describe_settings(settings: &PersistedSettings) -> String {
    let engine = TimeEngine::new();
    let formatter = DurationFormatter;

    let daily_limit = settings
        .daily_limit_minutes
        .map_or("not set".into(), |minutes| {
            formatter.compact_duration(minutes.saturating_mul(60))
        });
    let reset = settings
        .day_reset_minutes_from_midnight
        .map_or("not set".into(), format_clock_time);
    let notifications = match settings.notifications_enabled {
        Some(true) => "on",
        Some(false) => "off",
        None => "not set",
    };

    [
        engine.gate_state(settings).message().to_string(),
        format!("Daily limit:       {daily_limit}"),
        format!("Day reset:         {reset}"),
        format!("Notifications:     {notifications}"),
        format!(
            "Idle threshold:    {}m",
            engine.idle_threshold_minutes(settings)
        ),
        format!(
            "Reminder interval: {}m",
            engine.reminder_interval_minutes(settings)
        ),
    ]
    .join("\n")
}
