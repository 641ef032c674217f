//! # CLI
//!
//! This module defines the command-line interface of `protoclosure` using `clap`.
//!
//! Every command works on a single message type, looked up by name in a binary
//! `FileDescriptorSet` (as produced by `protoc --descriptor_set_out`).
use clap::{Parser, Subcommand, ValueEnum};
use protoclosure_core::Format;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "protoclosure",
    version,
    about = "Convert protobuf messages to and from closure-library JSON"
)]
pub struct Cli {
    /// Path to the descriptor set (.bin) holding the message type
    #[arg(long)]
    pub file_descriptor_set: PathBuf,

    /// Fully qualified message name (e.g. my.package.Message)
    #[arg(long)]
    pub message: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a JSON message from one format into another
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// echo '[null,101]' | protoclosure --file-descriptor-set app.bin --message app.Msg \
    ///     convert --from pblite --to object-key-name
    /// ```
    Convert {
        #[arg(long, value_enum)]
        from: TextFormat,

        #[arg(long, value_enum)]
        to: TextFormat,

        /// Input file, read from stdin when omitted
        input: Option<PathBuf>,
    },

    /// Convert a binary (wire format) message into JSON
    FromBinary {
        #[arg(long, value_enum)]
        to: TextFormat,

        /// Input file, read from stdin when omitted
        input: Option<PathBuf>,
    },

    /// Convert a JSON message into binary (wire format), written to stdout
    ToBinary {
        #[arg(long, value_enum)]
        from: TextFormat,

        /// Input file, read from stdin when omitted
        input: Option<PathBuf>,
    },

    /// Show the fields of the message as the JSON codecs see them
    Describe,
}

/// The JSON formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextFormat {
    Pblite,
    PbliteZeroIndex,
    ObjectKeyName,
    ObjectKeyTag,
    /// The canonical protobuf JSON mapping
    Proto3,
}

impl TextFormat {
    /// The closure-library format, `None` for canonical protobuf JSON.
    pub fn closure_format(self) -> Option<Format> {
        match self {
            TextFormat::Pblite => Some(Format::PbLite),
            TextFormat::PbliteZeroIndex => Some(Format::PbLiteZeroIndex),
            TextFormat::ObjectKeyName => Some(Format::ObjectKeyName),
            TextFormat::ObjectKeyTag => Some(Format::ObjectKeyTag),
            TextFormat::Proto3 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = [
            "protoclosure",
            "--file-descriptor-set",
            "app.bin",
            "--message",
            "app.Msg",
        ];
        Cli::try_parse_from(base.iter().chain(args))
    }

    #[test]
    fn test_parse_convert() {
        let cli = parse(&["convert", "--from", "pblite-zero-index", "--to", "proto3", "in.json"])
            .unwrap();

        assert_eq!(cli.file_descriptor_set, PathBuf::from("app.bin"));
        assert_eq!(cli.message, "app.Msg");

        let Commands::Convert { from, to, input } = cli.command else {
            panic!("Expected the convert command");
        };
        assert_eq!(from, TextFormat::PbliteZeroIndex);
        assert_eq!(to, TextFormat::Proto3);
        assert_eq!(input, Some(PathBuf::from("in.json")));
    }

    #[test]
    fn test_input_defaults_to_stdin() {
        let cli = parse(&["from-binary", "--to", "object-key-tag"]).unwrap();

        let Commands::FromBinary { to, input } = cli.command else {
            panic!("Expected the from-binary command");
        };
        assert_eq!(to, TextFormat::ObjectKeyTag);
        assert_eq!(input, None);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(parse(&["to-binary", "--from", "xml"]).is_err());
    }

    #[test]
    fn test_requires_message() {
        let result = Cli::try_parse_from([
            "protoclosure",
            "--file-descriptor-set",
            "app.bin",
            "describe",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_names_match_core() {
        for format in Format::ALL {
            let parsed = TextFormat::from_str(format.as_str(), false).unwrap();
            assert_eq!(parsed.closure_format(), Some(format));
        }
        assert_eq!(TextFormat::Proto3.closure_format(), None);
    }
}
