//! the main compiler binary. takes a C source file and an output format
//! (RV32 assembly by default).
//!
//! run with `--help` for more info.

use rvcc::{back::*, front::*};

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input file
    file: String,
    /// the output format
    #[arg(value_enum, long, default_value_t = Output::Asm)]
    out: Output,
    /// write the output here instead of stdout
    #[arg(short = 'o')]
    output: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
enum Output {
    /// the list of tokens
    Tokens,
    /// the ast data structure
    Ast,
    /// the resulting assembly code
    Asm,
}

fn main() {
    use Output::*;
    let args = Args::parse();

    let input = String::from_utf8(std::fs::read(&args.file).expect("file should be readable"))
        .expect("input characters should be utf8");

    match args.out {
        Tokens => {
            let mut lexer = lex::Lexer::new(&input);
            while let Some(token) = lexer.next().unwrap() {
                println!("{token}");
            }
        }
        Ast => {
            println!("{:#?}", parse(&input).unwrap());
        }
        Asm => {
            let program = parse(&input).unwrap();
            let asm = generate(&program).unwrap();
            match &args.output {
                Some(path) => std::fs::write(path, asm).expect("output file should be writable"),
                None => print!("{asm}"),
            }
        }
    }
}
