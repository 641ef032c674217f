//! # Protoclosure CLI Entry Point
//!
//! The main executable for the protoclosure tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Installs the log subscriber and parses arguments using [`cli::Cli`].
//! 2. **Schema**: Loads the message type from the given file descriptor set.
//! 3. **Execution**: Delegates the conversion to [`commands`].
//! 4. **Presentation**: Writes the converted message to standard output, or a formatted error
//!    to standard error.
mod cli;
mod commands;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands};
use commands::CommandError;
use formatter::FormattedString;
use protoclosure_core::{prost_reflect::MessageDescriptor, schema::schema_for};
use std::{
    io::{self, Read, Write},
    path::Path,
    process,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();
    let descriptor = or_exit(load_message(&args.file_descriptor_set, &args.message));

    match args.command {
        Commands::Convert { from, to, input } => {
            let input = or_exit(read_input(input.as_deref()));
            println!("{}", or_exit(commands::convert(descriptor, from, to, &input)));
        }
        Commands::FromBinary { to, input } => {
            let input = or_exit(read_input(input.as_deref()));
            println!("{}", or_exit(commands::from_binary(descriptor, to, &input)));
        }
        Commands::ToBinary { from, input } => {
            let input = or_exit(read_input(input.as_deref()));
            let bytes = or_exit(commands::to_binary(descriptor, from, &input));
            or_exit(write_binary(&bytes));
        }
        Commands::Describe => {
            let schema = schema_for(&descriptor);
            println!("{}", FormattedString::from(schema.as_ref()));
        }
    }
}

fn or_exit<T>(result: Result<T, CommandError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn load_message(path: &Path, name: &str) -> Result<MessageDescriptor, CommandError> {
    let bytes = std::fs::read(path)?;
    commands::load_message(&bytes, name)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CommandError> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_binary(bytes: &[u8]) -> Result<(), CommandError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}
