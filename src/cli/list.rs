use clap::Parser;
use relcheck::{Config, Store, format_description};
use tracing::instrument;

use super::{Selection, load_document, terminal::Colorize};

/// Command arguments for `relcheck list`.
#[derive(Debug, Parser, Default)]
#[command(about = "List the checklist items of the selected product and OS")]
pub struct List {
    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    pub quiet: bool,

    /// Show item descriptions under each row.
    #[arg(long)]
    pub descriptions: bool,

    /// Which (product, OS) bucket to list.
    #[command(flatten)]
    pub selection: Selection,
}

impl List {
    /// Renders the selected bucket as a table (or tab-separated rows).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be read.
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        let (product, os) = self.selection.resolve(config);
        let document = load_document(store, config)?;

        let entries: Vec<_> = document
            .bucket(&product, os)
            .map(|bucket| bucket.entries().collect())
            .unwrap_or_default();

        if entries.is_empty() {
            if !self.quiet {
                println!("No checklist items for {product}/{os}");
            }
            return Ok(());
        }

        if self.quiet {
            for entry in &entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.task_id,
                    entry.name,
                    if entry.automated { "automated" } else { "manual" },
                    entry.description,
                );
            }
            return Ok(());
        }

        println!("Checklist for {product}/{os} ({} items)", entries.len());
        println!();

        let headers = ["#", "TASK ID", "ITEM", "STATUS"];
        let mut data: Vec<[String; 4]> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            data.push([
                index.to_string(),
                entry.task_id.to_string(),
                entry.name.to_string(),
                if entry.automated {
                    "✓ Automated".to_string()
                } else {
                    "○ Manual".to_string()
                },
            ]);
        }

        // Determine column widths for alignment.
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                data.iter()
                    .map(|row| row[idx].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(header.len())
            })
            .collect();

        for (header, width) in headers.iter().zip(&widths) {
            print!("{header:<width$}  ");
        }
        println!();
        for width in &widths {
            print!("{:-<width$}  ", "");
        }
        println!();

        for (row, entry) in data.iter().zip(&entries) {
            for (value, width) in row.iter().zip(&widths) {
                print!("{value:<width$}  ");
            }
            println!();

            if self.descriptions && !entry.description.is_empty() {
                for line in format_description(entry.description).lines() {
                    println!("    {}", line.dim());
                }
            }
        }

        Ok(())
    }
}
