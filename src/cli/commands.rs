//! CLI command implementations.

use console::style;

use crate::config::Settings;
use crate::models::RunStatus;
use crate::repository::{migrations, CompanyRepository, RunRepository};
use crate::services;

/// Initialize the database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    migrations::run_migrations(&settings.database_url()).await?;
    println!(
        "{} Database ready at {}",
        style("✓").green(),
        settings.database_path.display()
    );
    Ok(())
}

/// Run one research batch in the foreground and print the outcome.
pub async fn cmd_run(
    settings: &Settings,
    range: Option<String>,
    max_records: Option<u32>,
    no_mirror: bool,
    description: String,
) -> anyhow::Result<()> {
    migrations::run_migrations(&settings.database_url()).await?;

    let service = services::build_service(settings)?;

    let mut options = settings.default_run_options();
    if let Some(range) = range {
        options.source_range = range;
    }
    if max_records.is_some() {
        options.max_records = max_records;
    }
    if no_mirror {
        options.mirror_to_sink = false;
    }
    options.description = description;

    println!(
        "{} Researching {} (cap: {})",
        style("→").cyan(),
        options.source_range,
        options
            .max_records
            .map(|n| n.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );

    let run = service.run_to_completion(options).await?;

    match run.status {
        RunStatus::Completed => {
            println!(
                "{} Processed {}/{} companies",
                style("✓").green(),
                run.processed_count,
                run.total_count,
            );
        }
        _ => {
            println!("{} Run {}", style("✗").red(), run.status.as_str());
        }
    }

    if !run.error_log.is_empty() {
        println!("{} Failures:", style("!").yellow());
        for line in run.error_log.lines() {
            println!("  {line}");
        }
    }

    Ok(())
}

/// List recent runs.
pub async fn cmd_runs(settings: &Settings, limit: i64) -> anyhow::Result<()> {
    let runs = RunRepository::new(settings.create_pool());

    let recent = runs.recent(limit).await?;
    if recent.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    for run in recent {
        let glyph = match run.status {
            RunStatus::Completed => style("✓").green(),
            RunStatus::Failed => style("✗").red(),
            _ => style("…").cyan(),
        };
        println!(
            "{} {}  {:9}  {}/{}  {}",
            glyph,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.status.as_str(),
            run.processed_count,
            run.total_count,
            run.id,
        );
        if !run.description.is_empty() {
            println!("    {}", run.description);
        }
    }

    Ok(())
}

/// Show one stored company with its roster and locations.
pub async fn cmd_show(settings: &Settings, corporate_number: &str) -> anyhow::Result<()> {
    let companies = CompanyRepository::new(settings.create_pool());

    let Some(company) = companies.get(corporate_number).await? else {
        println!("{} No company with number {corporate_number}", style("✗").red());
        return Ok(());
    };

    println!(
        "{} {} ({})",
        style("●").cyan(),
        company.company_name,
        company.corporate_number
    );
    for (field, value) in company.scalar_fields() {
        if !value.is_empty() {
            println!("  {field}: {value}");
        }
    }

    let roster = companies.get_roster(corporate_number).await?;
    if !roster.is_empty() {
        println!("Roster:");
        for entry in roster {
            println!("  {}. {} {}", entry.sort_order, entry.position, entry.name);
        }
    }

    let locations = companies.get_locations(corporate_number).await?;
    if !locations.is_empty() {
        println!("Locations:");
        for entry in locations {
            println!("  {}. {} {}", entry.sort_order, entry.name, entry.address);
        }
    }

    Ok(())
}
