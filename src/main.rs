#![deny(unused_must_use)]
#![warn(clippy::pedantic)]

mod args;

use args::Args;
use cplus::driver::{self, Config};
use cplus::lexer::FileContent;
use cplus::logger;

use std::fs;

use anyhow::{anyhow, Result};

fn main() -> Result<()> {
    let args = Args::parse()?;
    let config = Config {
        debug: args.debug,
        show_tokens: args.show_tokens,
        show_ast: args.show_ast,
        show_ir: args.show_ir,
    };

    let mut compiled = String::new();
    for input in &args.inputs {
        let metadata = fs::metadata(input)
            .map_err(|_| anyhow!("Input file does not exist: {}", input.display()))?;
        if !metadata.is_file() {
            return Err(anyhow!(
                "Input file is not a regular file: {}",
                input.display()
            ));
        }

        let content = fs::read_to_string(input)?;
        let source = FileContent::new(input.display().to_string(), content);

        match driver::compile(&source, &config) {
            Ok(ir) => compiled.push_str(&ir),
            Err(err) => {
                logger::error(&err);
                return Err(anyhow!("failed to compile module {}", source.file_name));
            }
        }
    }

    fs::write(&args.output, compiled)
        .map_err(|err| anyhow!("Failed to open output file {}: {err}", args.output.display()))?;

    Ok(())
}
