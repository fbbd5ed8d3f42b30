//! Models command - inspect enrichment model artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use docex_core::models::config::LLM_MODEL_PATH_ENV;
use docex_core::models::DocexConfig;
use docex_core::{Capability, ModelProvider};

use super::load_config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model artifacts are present
    Status(StatusArgs),
}

#[derive(Args)]
struct StatusArgs {
    /// Also try to load every capability
    #[arg(long)]
    load: bool,
}

/// An artifact a capability needs on disk.
struct Artifact {
    label: &'static str,
    path: PathBuf,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    match args.command {
        ModelsCommand::Status(status_args) => {
            tokio::task::spawn_blocking(move || check_status(status_args, &config)).await?
        }
    }
}

fn artifacts(config: &DocexConfig, capability: Capability) -> Option<Vec<Artifact>> {
    let models = &config.models;
    match capability {
        Capability::EntityTagging => models.tagger_model.as_ref().map(|model| {
            vec![
                Artifact { label: "model", path: models.model_path(model) },
                Artifact { label: "tokenizer", path: models.model_path(&models.tagger_tokenizer) },
                Artifact { label: "labels", path: models.model_path(&models.tagger_labels) },
            ]
        }),
        Capability::QuestionAnswering => models.qa_model.as_ref().map(|model| {
            vec![
                Artifact { label: "model", path: models.model_path(model) },
                Artifact { label: "tokenizer", path: models.model_path(&models.qa_tokenizer) },
            ]
        }),
        Capability::InstructionFollowing => Some(vec![Artifact {
            label: "weights",
            path: models.llm_model_path(),
        }]),
        Capability::Summarization => models.enable_summarization.then(|| {
            vec![Artifact {
                label: "weights",
                path: models.llm_model_path(),
            }]
        }),
    }
}

fn check_status(args: StatusArgs, config: &DocexConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("Model directory: {}", config.models.model_dir.display());
    if std::env::var_os(LLM_MODEL_PATH_ENV).is_some() {
        println!("Instruction model path overridden by {}", LLM_MODEL_PATH_ENV);
    }
    println!();

    let provider = args.load.then(|| ModelProvider::from_config(config));

    for capability in Capability::ALL {
        println!("{}", style(format!("▸ {}", capability)).bold());

        let Some(artifacts) = artifacts(config, capability) else {
            println!("    {} disabled in configuration", style("-").dim());
            println!();
            continue;
        };

        let mut all_present = true;
        for artifact in &artifacts {
            let (status, detail) = match fs::metadata(&artifact.path) {
                Ok(meta) if meta.is_file() => (style("✓").green(), format_size(meta.len())),
                _ => {
                    all_present = false;
                    (style("✗").red(), "missing".to_string())
                }
            };
            println!(
                "    {} {:<10} {} ({})",
                status,
                artifact.label,
                display(&artifact.path),
                detail
            );
        }

        if capability == Capability::InstructionFollowing {
            println!("    {} endpoint   {}", style("ℹ").blue(), config.models.llm_endpoint);
        }

        if let Some(provider) = &provider {
            let loaded = match capability {
                Capability::EntityTagging => provider.tagger().map(|_| ()),
                Capability::Summarization => provider.summarizer().map(|_| ()),
                Capability::QuestionAnswering => provider.question_answerer().map(|_| ()),
                Capability::InstructionFollowing => provider.instruction_model().map(|_| ()),
            };
            match loaded {
                Ok(()) => println!("    {} Loaded", style("✓").green()),
                Err(e) => println!("    {} {}", style("✗").red(), e),
            }
        } else if all_present {
            println!("    {} Ready", style("✓").green());
        } else {
            println!("    {} Not available", style("⚠").yellow());
        }
        println!();
    }

    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(4 * 1024 * 1024 * 1024), "4.0 GB");
    }

    #[test]
    fn test_disabled_capabilities_have_no_artifacts() {
        let mut config = DocexConfig::default();
        config.models.tagger_model = None;
        assert!(artifacts(&config, Capability::EntityTagging).is_none());
        assert!(artifacts(&config, Capability::Summarization).is_none());
        assert_eq!(artifacts(&config, Capability::QuestionAnswering).map(|a| a.len()), Some(2));
    }
}
