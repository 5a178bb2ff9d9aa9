use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use student_analytics::classify::{self, Thresholds};
use student_analytics::config::EngineConfig;
use student_analytics::models::{Student, StudentField};
use student_analytics::query::{self, SortDirection};
use student_analytics::report::{self, ExportFormat, ReportKind};
use student_analytics::roster::DashboardHost;
use student_analytics::{aggregate, codec, insights, integrity, roster};

#[derive(Parser)]
#[command(name = "student-analytics")]
#[command(about = "Cognitive-performance analytics over student CSV data", long_about = None)]
struct Cli {
    /// JSON file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline metrics, insights and data issues
    Summary {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Check the data for duplicate ids, missing fields and bad scores
    Validate {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Per-class rollups
    Classes {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Correlations between skills and scores
    Correlations {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score histogram and persona breakdown
    Distribution {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Search and sort the student table
    List {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "assessment_score")]
        sort: StudentField,
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Tier, persona, risk and advice for one student
    Profile {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// Write a report in CSV, JSON or PDF-style text form
    Export {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        #[arg(long = "report", required = true)]
        reports: Vec<ReportKind>,
        /// Only export these student ids
        #[arg(long = "id")]
        ids: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the sample CSV, optionally with generated students appended
    Sample {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        generate: usize,
    },
}

/// The command line's copy of the active collection.
struct Session {
    students: Vec<Student>,
    thresholds: Thresholds,
}

impl Session {
    fn new(thresholds: Thresholds) -> Self {
        Self {
            students: Vec::new(),
            thresholds,
        }
    }

    fn open(path: &Path, config: &EngineConfig) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let students = codec::parse_with(&text, &config.import_options())
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!("loaded {} students from {}", students.len(), path.display());

        let mut session = Self::new(config.thresholds);
        session.on_data_upload(students);
        Ok(session)
    }
}

impl DashboardHost for Session {
    fn on_data_upload(&mut self, records: Vec<Student>) {
        self.students = records;
    }

    fn on_data_update(&mut self, records: Vec<Student>) {
        info!("collection now holds {} students", records.len());
        self.students = records;
    }

    fn on_student_select(&mut self, student: &Student) {
        println!("{} ({}, {})", student.name, student.student_id, student.class);
        println!(
            "Performance: {} ({:.1})",
            classify::performance_tier(student.assessment_score).label(),
            student.assessment_score
        );
        println!("Persona: {}", classify::learning_persona(student).label());
        let concerns = self.thresholds.risk_concerns(student);
        if concerns.is_empty() {
            println!("At risk: no");
        } else {
            let labels: Vec<&str> = concerns.iter().map(|concern| concern.label()).collect();
            println!("At risk: yes ({})", labels.join(", "));
        }
        println!("Recommendations:");
        for advice in classify::recommendations(student) {
            println!("- {}: {}", advice.title, advice.description);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let thresholds = config.thresholds;

    match cli.command {
        Commands::Summary { csv } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            let overview = aggregate::overview_with(students, &thresholds);

            println!("Students: {}", overview.total_students);
            println!("Average score: {:.1}", overview.mean_score);
            println!("Average comprehension: {:.1}", overview.mean_comprehension);
            println!("Average attention: {:.1}", overview.mean_attention);
            println!("Average engagement: {:.1} min", overview.mean_engagement);
            println!("High performers: {}", overview.high_performers);
            println!("Needs support: {}", overview.needs_support);
            println!("At risk: {}", overview.at_risk);

            let cards = insights::insights(students, &thresholds);
            if !cards.is_empty() {
                println!();
                println!("Insights:");
                for card in cards {
                    println!("- {} ({}): {}", card.title, card.value, card.description);
                }
            }

            let issues = integrity::validate_collection(students);
            if !issues.is_empty() {
                println!();
                println!("Data issues:");
                for issue in issues {
                    println!("- {issue}");
                }
            }
        }
        Commands::Validate { csv } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            let issues = integrity::validate_collection(students);
            if issues.is_empty() {
                println!("No data issues found in {} students.", students.len());
                return Ok(());
            }
            for issue in &issues {
                println!("- {issue}");
            }
            std::process::exit(1);
        }
        Commands::Classes { csv } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            for group in aggregate::group_by_class_with(students, &thresholds) {
                println!(
                    "- {}: {} students, avg score {:.1}, avg engagement {:.1} min, {} high performers, {} need support",
                    group.class,
                    group.count,
                    group.mean_score,
                    group.mean_engagement,
                    group.high_performer_count,
                    group.needs_support_count
                );
            }
        }
        Commands::Correlations { csv } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            for pair in aggregate::correlation_matrix(students) {
                println!(
                    "- {}: {:.3} ({} correlation)",
                    pair.pair,
                    pair.value,
                    pair.strength.label()
                );
            }
        }
        Commands::Distribution { csv } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            println!("Score distribution:");
            for bucket in aggregate::score_distribution(students) {
                println!("- {}: {}", bucket.label, bucket.count);
            }
            println!();
            println!("Learning personas:");
            for entry in aggregate::persona_breakdown(students) {
                println!("- {}: {}", entry.persona.label(), entry.count);
            }
            println!();
            println!("Skill gaps:");
            for gap in aggregate::skill_gaps_with(students, &thresholds) {
                println!("- {}: avg {:.1}, gap {:.1}", gap.skill, gap.average, gap.gap);
            }
        }
        Commands::List {
            csv,
            search,
            sort,
            direction,
            limit,
        } => {
            let session = Session::open(&csv, &config)?;
            let students = &session.students;
            let view = query::filter_and_sort(students, &search, sort, direction);
            println!("Showing {} of {} students", view.len().min(limit), students.len());
            for student in view.iter().take(limit) {
                println!(
                    "- {} {} ({}) score {:.1}, {}",
                    student.student_id,
                    student.name,
                    student.class,
                    student.assessment_score,
                    classify::learning_persona(student).label()
                );
            }
            if view.len() > limit {
                println!("Showing first {limit} results. Use --search to filter further.");
            }
        }
        Commands::Profile { csv, id } => {
            let mut session = Session::open(&csv, &config)?;
            let student = session
                .students
                .iter()
                .find(|student| student.student_id == id)
                .cloned()
                .with_context(|| format!("no student with id {id}"))?;
            session.on_student_select(&student);
        }
        Commands::Export {
            csv,
            format,
            reports,
            ids,
            out,
        } => {
            let mut session = Session::open(&csv, &config)?;
            if !ids.is_empty() {
                let selected = roster::select_students(&session.students, &ids);
                session.on_data_update(selected);
            }
            let students = &session.students;
            let now = Utc::now();
            let content = match format {
                ExportFormat::Csv => codec::serialize(students)?,
                ExportFormat::Json => {
                    report::build_export(students, &reports, format, now, &thresholds)
                        .to_json_pretty()?
                }
                ExportFormat::Pdf => report::build_markdown_report(students, &reports, now, &thresholds),
            };
            let extension = match format {
                ExportFormat::Csv => "csv",
                ExportFormat::Json => "json",
                ExportFormat::Pdf => "md",
            };
            let out = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "student-performance-report-{}.{extension}",
                    now.format("%Y-%m-%d")
                ))
            });
            std::fs::write(&out, content)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Exported {} students ({} estimated pages) to {}.",
                students.len(),
                report::estimated_pages(&reports, students.len()),
                out.display()
            );
        }
        Commands::Sample { out, generate } => {
            let mut session = Session::new(thresholds);
            session.on_data_upload(codec::parse(codec::sample_csv())?);
            let mut rng = match config.sample_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            for _ in 0..generate {
                let updated = roster::generate_sample(&session.students, &mut rng);
                session.on_data_update(updated);
            }
            let students = &session.students;
            let content = codec::serialize(students)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, content)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!("Wrote {} students to {}.", students.len(), out.display());
                }
                None => print!("{content}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_defaults_to_descending_score() {
        let cli = Cli::try_parse_from(["student-analytics", "list", "--csv", "data.csv"]).unwrap();
        match cli.command {
            Commands::List { sort, direction, limit, .. } => {
                assert_eq!(sort, StudentField::AssessmentScore);
                assert_eq!(direction, SortDirection::Desc);
                assert_eq!(limit, 50);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn list_takes_explicit_direction() {
        let cli = Cli::try_parse_from([
            "student-analytics", "list", "--csv", "data.csv", "--sort", "name", "--direction", "asc",
        ])
        .unwrap();
        match cli.command {
            Commands::List { sort, direction, .. } => {
                assert_eq!(sort, StudentField::Name);
                assert_eq!(direction, SortDirection::Asc);
            }
            _ => panic!("expected list"),
        }
        assert!(Cli::try_parse_from(["student-analytics", "list", "--csv", "x", "--desc"]).is_err());
    }
}
