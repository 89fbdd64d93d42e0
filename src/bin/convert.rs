// Editor DOM to Markdown from the command line.
//
//   mdbridge [html|wysiwyg|ir|block] < input.html

use std::io::{self, Read};
use std::process::ExitCode;

use mdbridge::{dom_to_markdown_with, Dialect, Options};

fn main() -> ExitCode {
    let dialect = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<Dialect>() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("mdbridge: {e}");
                return ExitCode::from(2);
            }
        },
        None => Dialect::Html,
    };

    let mut html = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut html) {
        eprintln!("mdbridge: reading stdin: {e}");
        return ExitCode::FAILURE;
    }

    match dom_to_markdown_with(&html, dialect, &Options::default()) {
        Ok(md) => {
            print!("{md}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mdbridge: {e}");
            ExitCode::FAILURE
        }
    }
}
