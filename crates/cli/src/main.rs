use anyhow::{bail, Context};
use api_shared::{DiagnoseRes, Disease, DiseaseSummary, HealthService, ListSymptomsRes};
use clap::{Parser, Subcommand};
use ddx_core::{DdxConfig, DiagnosisService, EnvValues, QueryOptions};
use serde_json::{Map, Number, Value};

#[derive(Parser)]
#[command(name = "ddx")]
#[command(about = "Rank candidate diagnoses from reported symptoms")]
struct Cli {
    /// Dataset directory (overrides DDX_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<String>,
    /// Disease profile file name inside the dataset directory (overrides DDX_PROFILES_FILE)
    #[arg(long, global = true)]
    profiles: Option<String>,
    /// Symptom library file name inside the dataset directory (overrides DDX_SYMPTOM_LIBRARY_FILE)
    #[arg(long, global = true)]
    library: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every recognised symptom
    Symptoms {
        #[arg(long)]
        json: bool,
    },
    /// Autocomplete symptom names
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List diseases, or show one in detail
    Diseases {
        /// Disease identifier to show in detail
        id: Option<String>,
        /// Only list diseases in this category
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Rank diagnoses for the given symptoms
    Diagnose {
        /// Symptoms reported present
        symptoms: Vec<String>,
        /// Symptoms explicitly reported absent
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        /// Follow-up answer as SYMPTOM.QUESTION=VALUE (implies the symptom is present)
        #[arg(long)]
        answer: Vec<String>,
        #[arg(long)]
        top_n: Option<i64>,
        #[arg(long)]
        min_confidence: Option<f64>,
        /// Print the full JSON response instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Load the dataset and report what was found
    Validate,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ddx=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'ddx --help' for commands");
        return Ok(());
    };

    let mut env = EnvValues::from_process_env();
    env.data_dir = cli.data_dir.or(env.data_dir);
    env.profiles_file = cli.profiles.or(env.profiles_file);
    env.symptom_library_file = cli.library.or(env.symptom_library_file);
    let config = DdxConfig::from_env_values(env).context("invalid configuration")?;
    let service = DiagnosisService::load(&config).context("failed to load dataset")?;

    match command {
        Commands::Symptoms { json } => {
            let res = ListSymptomsRes::from(service.catalog());
            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                for symptom in &res.symptoms {
                    println!("{:<28} {}", symptom.id, symptom.display_name);
                }
            }
        }
        Commands::Search { query, limit } => {
            let hits = service.search_symptoms(&query, limit);
            if hits.is_empty() {
                println!("No matching symptoms.");
            }
            for symptom in hits {
                println!("{:<28} {}", symptom.id, symptom.display_name);
            }
        }
        Commands::Diseases {
            id: Some(id),
            json,
            ..
        } => {
            let Some(disease) = service.disease(&id) else {
                bail!("no such disease: {id}");
            };
            let disease = Disease::from(disease);
            if json {
                println!("{}", serde_json::to_string_pretty(&disease)?);
            } else {
                println!(
                    "{} ({}), {}, {} cases",
                    disease.common_name, disease.id, disease.category, disease.case_count
                );
                for a in &disease.symptoms {
                    println!(
                        "  {:<28} importance {:>3}%  frequency {:>3}%  {}",
                        a.symptom, a.importance, a.frequency, a.role
                    );
                }
            }
        }
        Commands::Diseases {
            id: None,
            category,
            json,
        } => {
            let diseases: Vec<DiseaseSummary> = service
                .diseases(category.as_deref())
                .into_iter()
                .map(Into::into)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&diseases)?);
            } else {
                for d in &diseases {
                    println!("{:<28} {:<32} {}", d.id, d.common_name, d.category);
                }
            }
        }
        Commands::Diagnose {
            symptoms,
            absent,
            answer,
            top_n,
            min_confidence,
            json,
        } => {
            let evidence = build_evidence(&symptoms, &absent, &answer)?;
            let outcome = service.diagnose(
                &evidence,
                QueryOptions {
                    top_n,
                    min_confidence,
                },
            )?;
            let res = DiagnoseRes::from(&outcome);
            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                print_diagnoses(&res);
            }
        }
        Commands::Validate => {
            let health = HealthService::check_health(&service);
            println!(
                "Dataset OK: {} diseases, {} symptoms ({})",
                health.diseases,
                health.symptoms,
                config.profiles_path().display()
            );
        }
    }

    Ok(())
}

fn print_diagnoses(res: &DiagnoseRes) {
    for warning in &res.warnings {
        eprintln!("warning: {warning}");
    }
    if res.diagnoses.is_empty() {
        println!("No diagnoses.");
        return;
    }
    for (rank, d) in res.diagnoses.iter().enumerate() {
        println!("{:>2}. {:>5.1}  {} ({})", rank + 1, d.confidence, d.common_name, d.disease);
        println!("           {}", d.explanation);
    }
}

/// Turn command-line symptom lists into the evidence object the service accepts.
fn build_evidence(
    present: &[String],
    absent: &[String],
    answers: &[String],
) -> anyhow::Result<Map<String, Value>> {
    let mut evidence = Map::new();
    for symptom in present {
        evidence.insert(symptom.clone(), Value::Object(Map::new()));
    }
    for symptom in absent {
        if evidence.contains_key(symptom) {
            bail!("{symptom} is listed as both present and absent");
        }
        evidence.insert(symptom.clone(), Value::Bool(false));
    }

    for answer in answers {
        let (target, raw) = answer
            .split_once('=')
            .with_context(|| format!("answer {answer:?} must look like SYMPTOM.QUESTION=VALUE"))?;
        let (symptom, question) = target
            .split_once('.')
            .with_context(|| format!("answer {answer:?} must look like SYMPTOM.QUESTION=VALUE"))?;

        let entry = evidence
            .entry(symptom.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(fields) = entry else {
            bail!("{symptom} is reported absent but has an answer");
        };
        fields.insert(question.to_string(), answer_value(raw));
    }

    Ok(evidence)
}

fn answer_value(raw: &str) -> Value {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(raw.trim().to_string()), Value::Number)
}
