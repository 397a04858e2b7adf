use blasterx_types::{DspFeature, GlobalProfileFlag, OutputMode};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
pub struct Cli {
    /// Minimum log level to print out
    #[clap(long, value_enum, default_value = "warn")]
    pub log_level: LevelFilter,

    /// How long to wait for the reply to a query, in milliseconds
    #[clap(long, default_value = "1000")]
    pub reply_timeout: u64,

    /// How long the device has to stay quiet after a change, in milliseconds
    #[clap(long, default_value = "500")]
    pub drain_timeout: u64,

    #[clap(subcommand)]
    pub command: SubCommands,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Print the identify flags, serial, hardware id and firmware
    Info,

    /// Read every known DSP feature
    List {
        /// Print as JSON instead of a table
        #[clap(long)]
        json: bool,
    },

    /// Read a single DSP feature
    Get {
        #[clap(value_enum)]
        feature: DspFeature,
    },

    /// Write a DSP feature, switching on anything it depends on. Values outside
    /// the usual range are sent with a warning
    Set {
        #[clap(value_enum)]
        feature: DspFeature,

        /// Raw value, 0 / 1 for toggles
        #[clap(allow_negative_numbers = true)]
        value: f32,

        /// Only write the feature itself
        #[clap(long)]
        unmanaged: bool,
    },

    /// Flip a toggle
    Toggle {
        #[clap(value_enum)]
        feature: DspFeature,
    },

    /// Read a feature by family and id, including ones without a name
    RawRead {
        #[clap(long, value_parser = parse_byte, default_value = "0x96")]
        family: u8,

        #[clap(long, value_parser = parse_byte)]
        id: u8,
    },

    /// Write a feature by family and id, the id doesn't have to be known
    RawWrite {
        #[clap(long, value_parser = parse_byte, default_value = "0x96")]
        family: u8,

        #[clap(long, value_parser = parse_byte)]
        id: u8,

        #[clap(long, allow_negative_numbers = true)]
        value: f32,
    },

    /// Show the global profile, or change one of its flags
    Profile {
        #[clap(value_enum)]
        flag: Option<GlobalProfileFlag>,

        #[clap(value_enum, requires = "flag")]
        state: Option<State>,
    },

    /// Show the current output, or switch it
    Output {
        #[clap(value_enum)]
        mode: Option<OutputMode>,
    },

    /// Switch SBX and Scout Mode off and set every DSP feature back to zero,
    /// the output is kept
    Reset,
}

#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum State {
    On,
    Off,
}

#[repr(usize)]
#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum LevelFilter {
    /// A level lower than all log levels.
    Off,
    /// Corresponds to the `Error` log level.
    Error,
    /// Corresponds to the `Warn` log level.
    Warn,
    /// Corresponds to the `Info` log level.
    Info,
    /// Corresponds to the `Debug` log level.
    Debug,
    /// Corresponds to the `Trace` log level.
    Trace,
}

fn parse_byte(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    parsed.map_err(|error| format!("{value} is not a byte: {error}"))
}
