//! Configuration and CLI argument handling

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "pomodoro-clock")]
#[command(about = "A terminal pomodoro clock alternating session and break countdowns")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Audio player command used for the phase-completion beep
    #[arg(long, default_value = "paplay")]
    pub alarm_command: String,

    /// Path to the beep sound file
    #[arg(long, default_value = "arcade-beep.wav")]
    pub sound: String,

    /// Disable the audio alarm
    #[arg(long)]
    pub no_sound: bool,

    /// Disable desktop notifications on phase completion
    #[arg(long)]
    pub no_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
