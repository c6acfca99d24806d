use clap::Subcommand;
use tomata_core::{Mode, TimerConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as TOML
    Show,
    /// Get a single value (keys: focus, short-break, long-break, focus-limit)
    Get { key: String },
    /// Set a value and save
    Set { key: String, value: String },
    /// Print the configuration file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = TimerConfig::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = TimerConfig::load()?;
            match get(&config, &key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = TimerConfig::load()?;
            set(&mut config, &key, &value)?;
            config.save()?;
        }
        ConfigAction::Path => {
            println!("{}", TimerConfig::path()?.display());
        }
    }
    Ok(())
}

fn get(config: &TimerConfig, key: &str) -> Option<String> {
    match key {
        "focus" => Some(config.duration_secs(Mode::Focus).to_string()),
        "short-break" => Some(config.duration_secs(Mode::ShortBreak).to_string()),
        "long-break" => Some(config.duration_secs(Mode::LongBreak).to_string()),
        "focus-limit" => Some(config.focus_limit().to_string()),
        _ => None,
    }
}

fn set(
    config: &mut TimerConfig,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "focus" => config.set_duration_secs(Mode::Focus, value.parse()?)?,
        "short-break" => config.set_duration_secs(Mode::ShortBreak, value.parse()?)?,
        "long-break" => config.set_duration_secs(Mode::LongBreak, value.parse()?)?,
        "focus-limit" => config.set_focus_limit(value.parse()?)?,
        _ => return Err(format!("unknown config key: {key}").into()),
    }
    Ok(())
}
