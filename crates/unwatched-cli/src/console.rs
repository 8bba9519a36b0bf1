use colored::*;
use indicatif::HumanBytes;
use std::io::{self, Write};
use unwatched_core::report::Bucket;
use unwatched_core::prompt::Prompter;

/// Reads answers from stdin, one line per question.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(input.trim().to_string())
    }
}

pub fn print_buckets(buckets: &[Bucket]) {
    if buckets.is_empty() {
        println!("\n{}", "No unwatched items found.".yellow());
        return;
    }
    for bucket in buckets {
        println!("\n{}", bucket.heading().bold());
        for path in &bucket.paths {
            println!("  {}", path);
        }
    }
}

/// `"<n> candidates, <size>"` for the end-of-report summary.
pub fn summary_line(count: usize, bytes: u64) -> String {
    format!("{} candidates, {}", count, HumanBytes(bytes))
}
