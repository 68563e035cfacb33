use std::io::{self, Read as _};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use msgseal::keys::{generate_secret, load_secret, DEFAULT_SECRET_LEN};
use msgseal::serialize::{decode_payload, deserialize_record, split_token};
use msgseal::types::Record;
use msgseal::{Secret, Verifier, VerifierOptions};

#[derive(Parser)]
#[command(name = "msgseal", about = "Tamper-evident signed messages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct KeyArgs {
    /// Secret key file. Raw key bytes, or hex with --hex-key.
    #[arg(short, long)]
    key: Option<String>,

    /// Interpret the key file as hex-encoded.
    #[arg(long, default_value_t = false)]
    hex_key: bool,

    /// Secret given directly. Used when --key is not set.
    #[arg(long, env = "MSGSEAL_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a JSON value and print the token.
    Sign {
        #[command(flatten)]
        key: KeyArgs,

        /// JSON value to sign. If omitted, reads from stdin.
        #[arg(short, long)]
        value: Option<String>,

        /// Bind the token to a purpose.
        #[arg(short, long)]
        purpose: Option<String>,

        /// Token validity duration (e.g. "4d", "1h", "30m"). No expiry if omitted.
        #[arg(short, long)]
        expires_in: Option<String>,
    },

    /// Verify a token and print its value as JSON.
    Verify {
        #[command(flatten)]
        key: KeyArgs,

        /// Previous secret key file to keep accepting (repeatable, tried in order).
        #[arg(long)]
        rotate: Vec<String>,

        /// Token string. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,

        /// Purpose the token must be bound to.
        #[arg(short, long)]
        purpose: Option<String>,

        /// Reject tokens whose expiry timestamp cannot be parsed.
        #[arg(long, default_value_t = false)]
        strict_expiry: bool,
    },

    /// Decode a token and display its record WITHOUT checking the signature.
    Inspect {
        /// Token string. If omitted, reads from stdin.
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Generate a random secret and print it as hex.
    GenerateKey {
        /// Secret length in bytes.
        #[arg(short, long, default_value_t = DEFAULT_SECRET_LEN)]
        length: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Sign {
            key,
            value,
            purpose,
            expires_in,
        } => cmd_sign(&key, value, purpose.as_deref(), expires_in.as_deref()),
        Command::Verify {
            key,
            rotate,
            token,
            purpose,
            strict_expiry,
        } => cmd_verify(&key, &rotate, token, purpose.as_deref(), strict_expiry),
        Command::Inspect { token } => cmd_inspect(token),
        Command::GenerateKey { length } => cmd_generate_key(length),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn cmd_sign(
    key: &KeyArgs,
    value_arg: Option<String>,
    purpose: Option<&str>,
    expires_in: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let verifier = Verifier::new(read_secret(key)?);
    let value: serde_json::Value = serde_json::from_str(&read_input(value_arg)?)
        .map_err(|e| format!("value is not valid JSON: {e}"))?;

    let expires_at = match expires_in {
        Some(s) => {
            let duration: std::time::Duration = s
                .parse::<humantime::Duration>()
                .map_err(|e| format!("invalid duration '{s}': {e}"))?
                .into();
            let duration = chrono::Duration::from_std(duration)
                .map_err(|_| format!("duration '{s}' is out of range"))?;
            Some(
                Utc::now()
                    .checked_add_signed(duration)
                    .ok_or("duration overflow")?,
            )
        }
        None => None,
    };

    println!("{}", verifier.generate(&value, expires_at, purpose)?);
    Ok(())
}

fn cmd_verify(
    key: &KeyArgs,
    rotations: &[String],
    token_arg: Option<String>,
    purpose: Option<&str>,
    strict_expiry: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = if strict_expiry {
        VerifierOptions::strict()
    } else {
        VerifierOptions::default()
    };
    let verifier = Verifier::with_options(read_secret(key)?, options);
    for path in rotations {
        verifier.rotate(load_secret(path, key.hex_key)?);
    }

    let token = read_input(token_arg)?;
    let value: serde_json::Value = verifier.verify(&token, purpose)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_inspect(token_arg: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let token = read_input(token_arg)?;
    let signed = split_token(&token)?;
    let record: Record<serde_json::Value> = deserialize_record(&decode_payload(signed.payload)?)?;

    let output = serde_json::json!({
        "record": record,
        "digest_hex": signed.digest,
        "total_bytes": token.len(),
        "authenticated": false,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_generate_key(length: usize) -> Result<(), Box<dyn std::error::Error>> {
    if length == 0 {
        return Err("key length must be positive".into());
    }
    let secret = generate_secret(length);
    println!("{}", hex::encode(secret.as_bytes()));
    Ok(())
}

/// Resolve the signing secret from --key or --secret / MSGSEAL_SECRET.
fn read_secret(args: &KeyArgs) -> Result<Secret, Box<dyn std::error::Error>> {
    match (&args.key, &args.secret) {
        (Some(path), _) => Ok(load_secret(path, args.hex_key)?),
        (None, Some(secret)) => Ok(Secret::from(secret.as_str())),
        (None, None) => Err("no secret given: pass --key or set MSGSEAL_SECRET".into()),
    }
}

/// Read an argument, or stdin when it is absent, trimming whitespace.
fn read_input(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(s.trim().to_string()),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf.trim().to_string())
        }
    }
}
