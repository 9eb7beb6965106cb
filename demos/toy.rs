// Copyright 2016 The Fancy Regex Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! A simple test app for exercising and debugging the parser.

use std::env;
use std::io;
use std::process;

fn main() {
    let mut args = env::args().skip(1);
    let result = match (args.next().as_deref(), args.next()) {
        (Some("parse"), Some(re)) => show_tree(&re, &mut io::stdout()),
        (Some("tokens"), Some(re)) => show_tokens(&re, &mut io::stdout()),
        (Some("flags"), Some(flags)) => show_flags(&flags, &mut io::stdout()),
        _ => {
            println!("commands: parse|tokens <pattern>, flags <flags>");
            return;
        }
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

type ToyResult = Result<(), Box<dyn std::error::Error>>;

fn show_tree(re: &str, writer: &mut dyn io::Write) -> ToyResult {
    let tree = regex_cst::parse(re)?;
    writeln!(writer, "{}", tree)?;
    Ok(())
}

fn show_tokens(re: &str, writer: &mut dyn io::Write) -> ToyResult {
    let tree = regex_cst::parse(re)?;
    for token in tree.tokens() {
        writeln!(writer, "{:>3}..{:<3} {}", token.span.start, token.span.end, token)?;
    }
    Ok(())
}

fn show_flags(flags: &str, writer: &mut dyn io::Write) -> ToyResult {
    let node = regex_cst::parse_flags(flags)?;
    for (name, value) in node.attributes() {
        writeln!(writer, "{}: {}", name, value)?;
    }
    Ok(())
}
