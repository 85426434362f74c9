use std::env;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{anyhow, Result};
use colored::Colorize;

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct Args {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub debug: bool,
    pub show_tokens: bool,
    pub show_ast: bool,
    pub show_ir: bool,
}

impl Args {
    pub fn parse() -> Result<Self> {
        Self::from_iter(env::args().skip(1))
    }

    fn from_iter(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut inputs = Vec::new();
        let mut output: Option<PathBuf> = None;
        let mut debug = false;
        let mut show_tokens = false;
        let mut show_ast = false;
        let mut show_ir = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "-help" | "--help" => Self::usage(),
                "-v" | "--version" => Self::version(),
                "-d" | "--debug" => debug = true,
                "-t" | "--show-tokens" => show_tokens = true,
                "-a" | "--show-ast" => show_ast = true,
                "--show-ir" => show_ir = true,
                "-o" | "--output" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("Missing output file after {arg}"))?;
                    if let Some(previous) = &output {
                        return Err(anyhow!(
                            "Output file already set to {}",
                            previous.display()
                        ));
                    }
                    output = Some(PathBuf::from(value));
                }
                _ if arg.starts_with('-') => return Err(anyhow!("Unknown argument: {arg}")),
                _ => inputs.push(PathBuf::from(arg)),
            }
        }

        if inputs.is_empty() {
            return Err(anyhow!("No input files provided"));
        }

        Ok(Self {
            inputs,
            output: output.unwrap_or_else(|| PathBuf::from("out.bin")),
            debug,
            show_tokens,
            show_ast,
            show_ir,
        })
    }

    fn print_option(flags: &str, description: &str) {
        println!("  {}   {}", flags.yellow(), description.bright_black());
    }

    fn usage() -> ! {
        println!(
            "{} {} {} {}\n",
            "USAGE:".bold(),
            "cplus".green(),
            "[options]".yellow(),
            "<input.cp>".blue()
        );
        println!("{}", "OPTIONS:".bold());
        Self::print_option("-v,  --version", "Show version information");
        Self::print_option("-help, --help", " Show this help message");
        Self::print_option("-d,  --debug", "  Enable debug mode");
        Self::print_option("-o,  --output", " Output file");
        Self::print_option("-t,  --show-tokens", " Show Tokens");
        Self::print_option("-a,  --show-ast", " Show AST");
        Self::print_option("     --show-ir", " Print IR to stdout as well");
        println!();
        exit(0)
    }

    fn version() -> ! {
        println!(
            "{} v.{}",
            "CPlus".bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!("Not C, not C++, just {}", "C+".red().bold());
        println!("{}", "Copyright (c) 2025-2026 CPlus Contributors".yellow());
        exit(0)
    }
}

#[cfg(test)]
mod args_tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Args> {
        Args::from_iter(args.iter().map(ToString::to_string))
    }

    #[test]
    fn test_defaults() {
        let args = parse_args(&["main.cp"]).unwrap();
        assert_eq!(vec![PathBuf::from("main.cp")], args.inputs);
        assert_eq!(PathBuf::from("out.bin"), args.output);
        assert!(!args.debug && !args.show_tokens && !args.show_ast && !args.show_ir);
    }

    #[test]
    fn test_flags_and_output() {
        let args = parse_args(&["-d", "-t", "-a", "--show-ir", "-o", "a.out", "main.cp"]).unwrap();
        assert!(args.debug && args.show_tokens && args.show_ast && args.show_ir);
        assert_eq!(PathBuf::from("a.out"), args.output);
    }

    #[test]
    fn test_multiple_inputs() {
        let args = parse_args(&["one.cp", "two.cp"]).unwrap();
        assert_eq!(2, args.inputs.len());
    }

    #[test]
    fn test_output_set_twice() {
        let err = parse_args(&["-o", "a", "-o", "b", "main.cp"]).unwrap_err();
        assert!(err.to_string().starts_with("Output file already set"));
    }

    #[test]
    fn test_missing_output_value() {
        let err = parse_args(&["main.cp", "-o"]).unwrap_err();
        assert!(err.to_string().starts_with("Missing output file"));
    }

    #[test]
    fn test_unknown_argument() {
        let err = parse_args(&["--frobnicate", "main.cp"]).unwrap_err();
        assert_eq!("Unknown argument: --frobnicate", err.to_string());
    }

    #[test]
    fn test_no_inputs() {
        let err = parse_args(&["-d"]).unwrap_err();
        assert_eq!("No input files provided", err.to_string());
    }
}
