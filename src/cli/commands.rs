use crate::archive::{ArchiveExtractor, ArchiveInspector};
use crate::cli::args::{Cli, Commands};
use crate::pipeline::{format_preview, run_stage_one, run_stage_two, StageOneResult};
use crate::processors::Cleaner;
use crate::retrieval::{write_credentials_file, AdsClient, Retriever};
use crate::settings::Settings;
use crate::utils::filename::processed_filename;
use crate::utils::progress::ProgressReporter;
use anyhow::Context;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Extract {
            output,
            year,
            work_dir,
            skip_credentials_file,
        } => {
            if let Some(year) = year {
                settings.request.year = year;
            }
            let output = output.unwrap_or_else(|| settings.stage1_output());
            let work_dir = work_dir.unwrap_or_else(|| settings.work_dir(&output));

            println!("Extracting air-quality observations...");
            println!(
                "Country: {}, Year: {}, Species: {}",
                settings.request.country,
                settings.request.year,
                settings.request.variables.join(", ")
            );
            println!("Output file: {}", output.display());

            let result = run_stage_one(
                || {
                    let credentials = settings.credentials()?;
                    if !skip_credentials_file {
                        let path = settings.credentials_file()?;
                        write_credentials_file(&path, &credentials)?;
                        println!("Credentials file: {}", path.display());
                    }

                    let client = AdsClient::new(credentials, settings.poll_interval())?;
                    Ok(Retriever::new(client, &settings.request.dataset, settings.request_template())
                        .with_monthly_pause(settings.monthly_pause())
                        .with_progress(true))
                },
                &output,
                &work_dir,
            )
            .context("Retrieval failed")?;

            match result {
                StageOneResult::AlreadyPresent(info) => {
                    println!("\nOutput already exists, skipping retrieval.");
                    println!("{}", info.summary());
                }
                StageOneResult::Written { outcome, info } => {
                    println!("\n{}", outcome.summary());
                    println!("{}", info.summary());
                    println!("Extraction complete!");
                }
                StageOneResult::NoData(outcome) => {
                    println!("\n{}", outcome.summary());
                    println!("No data retrieved - no output file written");
                }
            }
        }

        Commands::Preprocess { input, output } => {
            let output = match (&input, output) {
                (_, Some(output)) => output,
                (Some(input), None) => processed_filename(input),
                (None, None) => settings.stage2_output(),
            };
            let input = input.unwrap_or_else(|| settings.stage1_output());

            println!("Preprocessing air-quality observations...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output.display());

            let progress = ProgressReporter::new_spinner("Processing data...", false);
            let report = run_stage_two(&input, &output, Some(&progress))
                .with_context(|| format!("Failed to preprocess {}", input.display()))?;
            progress.finish_with_message(&format!(
                "Processed {} records",
                report.statistics.total_records
            ));

            println!("\nInput Columns: {}", report.input_columns.join(", "));
            println!("\n{}", Cleaner::new().generate_summary(&report.cleaning));
            println!("{}", report.statistics.detailed_summary());
            println!("\n{}", report.statistics.region_table());
            println!("{}", report.statistics.temporal_summary());
            println!("\n{}", report.info.summary());
            println!(
                "\nFirst {} rows:\n{}",
                report.preview.len(),
                format_preview(&report.preview)
            );
            println!("\nPreprocessing complete!");
        }

        Commands::Inspect { bundle } => {
            println!("Inspecting bundle: {}", bundle.display());

            let metadata = ArchiveInspector::inspect_zip(&bundle)
                .with_context(|| format!("Failed to open {}", bundle.display()))?;
            println!("\n{}", metadata.display_summary());

            let (table, reports) = ArchiveExtractor::new()
                .extract_with_report(&bundle)
                .with_context(|| format!("Failed to read {}", bundle.display()))?;

            println!("\nEntries:");
            for report in &reports {
                match (&report.rows, &report.error) {
                    (Some(rows), _) => println!("  {}: {} rows", report.name, rows),
                    (None, Some(error)) => println!("  {}: unreadable ({})", report.name, error),
                    (None, None) => println!("  {}: empty", report.name),
                }
            }

            match table {
                Some(table) => println!(
                    "\nCombined: {} rows, columns: {}",
                    table.len(),
                    table.columns().join(", ")
                ),
                None => println!("\nNo tabular data could be extracted"),
            }
        }
    }

    Ok(())
}
