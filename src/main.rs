use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kirigamine_lib::command::{Extend08Fields, GeneralFields};
use kirigamine_lib::crypto::{EnvelopeKey, decrypt_payload, encrypt_payload};
use kirigamine_lib::general::{DriveMode, FanSpeed, GeneralState, HorizontalVane, Power, VerticalVane};
use kirigamine_lib::payload::{hex_command_request, open_response, wrap_envelope};
use kirigamine_lib::state::DeviceState;

/// Offline codec for Mitsubishi Electric Wi-Fi adaptor traffic.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Envelope key; shorter secrets are zero-padded, longer ones truncated.
    #[arg(short, long, global = true)]
    key: Option<String>,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode hex frames into a device snapshot
    Decode {
        /// Hex-encoded frames, in the order they were received
        #[arg(required = true)]
        frames: Vec<String>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a General command frame
    GeneralCommand(GeneralArgs),
    /// Build an extended (08) command frame
    Extend08Command(Extend08Args),
    /// Encrypt a plaintext payload into a request body
    Encrypt {
        plaintext: String,
        /// Fixed IV as 32 hex digits instead of a random one
        #[arg(long)]
        iv: Option<String>,
        /// Print only the base64 envelope, without the XML wrapper
        #[arg(long)]
        bare: bool,
    },
    /// Decrypt a base64 envelope
    Decrypt { envelope: String },
    /// Decrypt a response body (file or `-` for stdin) and decode its frames
    Response {
        input: String,
        /// The input is already decrypted XML
        #[arg(long)]
        plain: bool,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct GeneralArgs {
    /// Start from this General state frame instead of the defaults
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    power: Option<PowerArg>,
    #[arg(long)]
    mode: Option<ModeArg>,
    /// Target temperature in °C, half-degree resolution
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    fan: Option<FanArg>,
    #[arg(long)]
    vane: Option<VaneArg>,
    #[arg(long)]
    wide_vane: Option<WideVaneArg>,
    /// Wrap the frame into an encrypted request body
    #[arg(long)]
    encrypt: bool,
}

#[derive(Args, Debug)]
struct Extend08Args {
    /// Dehumidify level byte
    #[arg(long)]
    dehumidify: Option<u8>,
    #[arg(long)]
    power_saving: Option<bool>,
    /// Wind and wind-break byte
    #[arg(long)]
    wind_break: Option<u8>,
    /// Sound the buzzer on reception
    #[arg(long)]
    buzzer: bool,
    /// Wrap the frame into an encrypted request body
    #[arg(long)]
    encrypt: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PowerArg {
    On,
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Auto,
    Heat,
    Dry,
    Cool,
    Fan,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FanArg {
    Auto,
    Quiet,
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    #[value(name = "3")]
    Three,
    #[value(name = "4")]
    Four,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VaneArg {
    Auto,
    #[value(name = "1")]
    V1,
    #[value(name = "2")]
    V2,
    #[value(name = "3")]
    V3,
    #[value(name = "4")]
    V4,
    #[value(name = "5")]
    V5,
    Swing,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WideVaneArg {
    Auto,
    FarLeft,
    Left,
    Center,
    Right,
    FarRight,
    LeftCenter,
    CenterRight,
    Split,
    LeftCenterRight,
    Swing,
}

impl From<PowerArg> for Power {
    fn from(arg: PowerArg) -> Self {
        match arg {
            PowerArg::On => Power::On,
            PowerArg::Off => Power::Off,
        }
    }
}

impl From<ModeArg> for DriveMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => DriveMode::Auto,
            ModeArg::Heat => DriveMode::Heater,
            ModeArg::Dry => DriveMode::Dehumidify,
            ModeArg::Cool => DriveMode::Cooler,
            ModeArg::Fan => DriveMode::Fan,
        }
    }
}

impl From<FanArg> for FanSpeed {
    fn from(arg: FanArg) -> Self {
        match arg {
            FanArg::Auto => FanSpeed::Auto,
            FanArg::Quiet => FanSpeed::Quiet,
            FanArg::One => FanSpeed::Level1,
            FanArg::Two => FanSpeed::Level2,
            FanArg::Three => FanSpeed::Level3,
            FanArg::Four => FanSpeed::Level4,
        }
    }
}

impl From<VaneArg> for VerticalVane {
    fn from(arg: VaneArg) -> Self {
        match arg {
            VaneArg::Auto => VerticalVane::Auto,
            VaneArg::V1 => VerticalVane::V1,
            VaneArg::V2 => VerticalVane::V2,
            VaneArg::V3 => VerticalVane::V3,
            VaneArg::V4 => VerticalVane::V4,
            VaneArg::V5 => VerticalVane::V5,
            VaneArg::Swing => VerticalVane::Swing,
        }
    }
}

impl From<WideVaneArg> for HorizontalVane {
    fn from(arg: WideVaneArg) -> Self {
        match arg {
            WideVaneArg::Auto => HorizontalVane::Auto,
            WideVaneArg::FarLeft => HorizontalVane::FarLeft,
            WideVaneArg::Left => HorizontalVane::Left,
            WideVaneArg::Center => HorizontalVane::Center,
            WideVaneArg::Right => HorizontalVane::Right,
            WideVaneArg::FarRight => HorizontalVane::FarRight,
            WideVaneArg::LeftCenter => HorizontalVane::LeftCenter,
            WideVaneArg::CenterRight => HorizontalVane::CenterRight,
            WideVaneArg::Split => HorizontalVane::Split,
            WideVaneArg::LeftCenterRight => HorizontalVane::LeftCenterRight,
            WideVaneArg::Swing => HorizontalVane::Swing,
        }
    }
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    // Logs go to stderr so stdout stays clean for frames and payloads
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

fn parse_iv(hex_iv: &str) -> Result<[u8; 16]> {
    let bytes = hex::decode(hex_iv.trim()).context("IV is not valid hex")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("IV must be 16 bytes, got {}", b.len()))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

fn print_state(state: &DeviceState, json: bool) -> Result<()> {
    if json {
        println!("{}", state.to_json()?);
    } else {
        println!("{}", state);
    }
    Ok(())
}

fn print_command(frame: &[u8], encrypt: bool, key: &EnvelopeKey) {
    if encrypt {
        let payload = hex_command_request(frame);
        println!("{}", wrap_envelope(&encrypt_payload(&payload, key, None)));
    } else {
        println!("{}", hex::encode(frame));
    }
}

fn general_command(args: GeneralArgs, key: &EnvelopeKey) -> Result<()> {
    let mut state = match &args.from {
        Some(frame) => {
            let data = hex::decode(frame.trim()).context("Base frame is not valid hex")?;
            GeneralState::from_bytes(&data).context("Base frame is not a valid General frame")?
        }
        None => GeneralState::default(),
    };

    let mut fields = GeneralFields::default();
    if let Some(power) = args.power {
        state.power = power.into();
        fields |= GeneralFields::POWER;
    }
    if let Some(mode) = args.mode {
        state.set_drive_mode(mode.into());
        fields |= GeneralFields::MODE;
    }
    if let Some(temperature) = args.temperature {
        state.set_temperature(temperature)?;
        fields |= GeneralFields::TEMPERATURE;
    }
    if let Some(fan) = args.fan {
        state.fan_speed = fan.into();
        fields |= GeneralFields::FAN_SPEED;
    }
    if let Some(vane) = args.vane {
        state.vertical_vane_left = vane.into();
        fields |= GeneralFields::VERTICAL_VANE;
    }
    if let Some(wide_vane) = args.wide_vane {
        state.horizontal_vane = wide_vane.into();
        fields |= GeneralFields::HORIZONTAL_VANE;
    }

    debug!(?fields, "Selected fields");
    let frame = state.general_command(fields)?;
    print_command(&frame, args.encrypt, key);
    Ok(())
}

fn extend08_command(args: Extend08Args, key: &EnvelopeKey) -> Result<()> {
    let mut state = GeneralState::default();
    let mut fields = Extend08Fields::empty();
    if let Some(level) = args.dehumidify {
        state.dehumidify_setting = level;
        fields |= Extend08Fields::DEHUMIDIFY;
    }
    if let Some(power_saving) = args.power_saving {
        state.power_saving = power_saving;
        fields |= Extend08Fields::POWER_SAVING;
    }
    if let Some(wind_break) = args.wind_break {
        state.wind_and_wind_break = wind_break;
        fields |= Extend08Fields::WIND_BREAK;
    }
    if args.buzzer {
        fields |= Extend08Fields::BUZZER;
    }
    if fields.is_empty() {
        bail!("Select at least one of --dehumidify, --power-saving, --wind-break or --buzzer");
    }

    debug!(?fields, "Selected fields");
    let frame = state.extend08_command(fields);
    print_command(&frame, args.encrypt, key);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file, &cli.verbose)?;

    let key = match &cli.key {
        Some(secret) => EnvelopeKey::from_secret(secret.as_bytes()),
        None => EnvelopeKey::default(),
    };

    match cli.command {
        Command::Decode { frames, json } => {
            let state = DeviceState::aggregate_hex(&frames);
            if state.is_empty() {
                bail!("None of the {} frames could be decoded", frames.len());
            }
            print_state(&state, json)?;
        }
        Command::GeneralCommand(args) => general_command(args, &key)?,
        Command::Extend08Command(args) => extend08_command(args, &key)?,
        Command::Encrypt { plaintext, iv, bare } => {
            let iv = iv.as_deref().map(parse_iv).transpose()?;
            let encrypted = encrypt_payload(&plaintext, &key, iv);
            if bare {
                println!("{}", encrypted);
            } else {
                println!("{}", wrap_envelope(&encrypted));
            }
        }
        Command::Decrypt { envelope } => {
            let plaintext = decrypt_payload(&envelope, &key).context("Failed to decrypt envelope")?;
            println!("{}", plaintext);
        }
        Command::Response { input, plain, json } => {
            let body = read_input(&input)?;
            let xml = if plain {
                body
            } else {
                open_response(&body, &key).context("Failed to open response body")?
            };
            debug!(len = xml.len(), "Response payload");
            let state = DeviceState::from_response(&xml);
            print_state(&state, json)?;
        }
    }

    Ok(())
}
