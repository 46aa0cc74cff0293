//! CLI interface for vocab-trainer
//!
//! Thin consumer of the library: clap subcommands dispatch into the
//! vocabulary store, quiz engine, enrichment client and translator.
//! List positions shown to the user are 1-based.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::credentials;
use crate::enrich::{Enrichment, EnrichmentClient};
use crate::quiz::{AnswerOutcome, QuizEngine, SessionState};
use crate::storage::{KeyValueStore, SqliteStore};
use crate::translate::Translator;
use crate::vocab::{VocabStore, WordPatch};

#[derive(Parser)]
#[command(name = "vocab-trainer")]
#[command(about = "Personal vocabulary trainer with multiple-choice quizzes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage word categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage words in the selected category
    Word {
        #[command(subcommand)]
        command: WordCommands,
    },
    /// Run an interactive quiz over the selected category
    Quiz,
    /// Look up synonyms, antonyms and an example sentence for a word
    Enrich {
        /// The word to enrich
        word: String,
    },
    /// Translate a word or short phrase
    Translate {
        /// Text to translate
        text: String,
        /// Source language ("en" or "bn")
        #[arg(long, default_value = "en")]
        from: String,
    },
    /// Configure the trainer
    Config {
        /// Set the OpenRouter API key
        #[arg(long)]
        set_api_key: Option<String>,
        /// Delete the stored API key
        #[arg(long)]
        delete_api_key: bool,
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories with word counts and quiz progress
    List,
    /// Add a new category
    Add { name: String },
    /// Rename a category
    Rename { position: usize, name: String },
    /// Delete a category
    Delete { position: usize },
    /// Select the active category
    Select { position: usize },
}

#[derive(Subcommand)]
enum WordCommands {
    /// List the selected category's words
    List {
        /// Fetch synonyms/antonyms/example per word (sequential, throttled)
        #[arg(long)]
        enrich: bool,
    },
    /// Add a word to the selected category
    Add {
        english: String,
        german: String,
        /// Fill the Bengali field via machine translation
        #[arg(long)]
        translate: bool,
    },
    /// Edit fields of a word
    Edit {
        position: usize,
        #[arg(long)]
        en: Option<String>,
        #[arg(long)]
        bn: Option<String>,
        #[arg(long)]
        de: Option<String>,
    },
    /// Delete a word
    Delete { position: usize },
}

/// Parse arguments and dispatch
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Category { command } => {
            let (mut vocab, _) = open_vocab(&config).await?;
            handle_category(&mut vocab, command).await
        }
        Commands::Word { command } => {
            let (mut vocab, store) = open_vocab(&config).await?;
            handle_word(&config, &mut vocab, store, command).await
        }
        Commands::Quiz => {
            let (mut vocab, _) = open_vocab(&config).await?;
            run_quiz(&mut vocab).await
        }
        Commands::Enrich { word } => {
            let store = open_store(&config).await?;
            let client = enrichment_client(&config, store);
            print_enrichment(&word, &client.lookup(&word).await);
            Ok(())
        }
        Commands::Translate { text, from } => {
            let translator = Translator::new(config.translation.endpoint.clone());
            let result = translator.translate(&text, &from).await;
            println!("en: {}", dash_if_empty(&result.en));
            println!("bn: {}", dash_if_empty(&result.bn));
            println!("de: {}", dash_if_empty(&result.de));
            Ok(())
        }
        Commands::Config {
            set_api_key,
            delete_api_key,
            show,
            path,
        } => handle_config(set_api_key, delete_api_key, show, path),
    }
}

async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let db_path = config.database_path()?;
    let store = SqliteStore::open(&db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    Ok(Arc::new(store))
}

async fn open_vocab(config: &Config) -> Result<(VocabStore, Arc<SqliteStore>)> {
    let store = open_store(config).await?;
    let kv: Arc<dyn KeyValueStore> = store.clone();
    let vocab = VocabStore::open(kv).await?;
    Ok((vocab, store))
}

fn enrichment_client(config: &Config, store: Arc<SqliteStore>) -> EnrichmentClient {
    EnrichmentClient::new(
        store,
        config.enrichment.providers.clone(),
        credentials::get_api_key(),
    )
}

/// CLI positions are 1-based; convert and reject 0
fn to_index(position: usize) -> Result<usize> {
    if position == 0 {
        bail!("positions start at 1");
    }
    Ok(position - 1)
}

async fn handle_category(vocab: &mut VocabStore, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::List => {
            let selected = vocab.selected_index();
            for (i, cat) in vocab.categories().iter().enumerate() {
                let marker = if Some(i) == selected { "*" } else { " " };
                let eligible = cat.eligible_words().len();
                println!(
                    "{} {}. {:<24} {} words, progress {}/{}",
                    marker,
                    i + 1,
                    cat.name,
                    cat.words.len(),
                    cat.progress.len(),
                    eligible,
                );
            }
            Ok(())
        }
        CategoryCommands::Add { name } => {
            vocab.create_category(&name).await?;
            println!("Added category \"{}\"", name.trim());
            Ok(())
        }
        CategoryCommands::Rename { position, name } => {
            vocab.rename_category(to_index(position)?, &name).await?;
            println!("Renamed category {} to \"{}\"", position, name.trim());
            Ok(())
        }
        CategoryCommands::Delete { position } => {
            vocab.delete_category(to_index(position)?).await?;
            println!("Deleted category {position}");
            Ok(())
        }
        CategoryCommands::Select { position } => {
            let index = to_index(position)?;
            vocab.select_category(index).await?;
            println!(
                "Selected \"{}\"",
                vocab.category(index).map(|c| c.name.as_str()).unwrap_or("")
            );
            Ok(())
        }
    }
}

async fn handle_word(
    config: &Config,
    vocab: &mut VocabStore,
    store: Arc<SqliteStore>,
    command: WordCommands,
) -> Result<()> {
    match command {
        WordCommands::List { enrich } => {
            let Some(category) = vocab.selected_category() else {
                println!("No category selected.");
                return Ok(());
            };
            if category.words.is_empty() {
                println!("\"{}\" has no words yet.", category.name);
                return Ok(());
            }

            println!("Words in \"{}\":", category.name);
            println!("   {:<20} {:<20} {:<20}", "EN", "BN", "DE");
            for (i, word) in category.words.iter().enumerate() {
                println!(
                    "{}. {:<20} {:<20} {:<20}",
                    i + 1,
                    dash_if_empty(&word.en),
                    dash_if_empty(&word.bn),
                    dash_if_empty(&word.de),
                );
            }

            if enrich {
                let words: Vec<String> = category
                    .words
                    .iter()
                    .filter(|w| !w.en.is_empty())
                    .map(|w| w.en.clone())
                    .collect();
                let client = enrichment_client(config, store);
                let cancel = AtomicBool::new(false);
                println!();
                for (word, enrichment) in client.lookup_batch(&words, &cancel).await {
                    print_enrichment(&word, &enrichment);
                }
            }
            Ok(())
        }
        WordCommands::Add {
            english,
            german,
            translate,
        } => {
            let index = vocab
                .selected_index()
                .context("No category selected; run `vocab-trainer category select` first")?;
            vocab.add_word(Some(index), &english, &german).await?;
            println!("Added \"{}\" / \"{}\"", english.trim(), german.trim());

            if translate {
                let translator = Translator::new(config.translation.endpoint.clone());
                let result = translator.translate(english.trim(), "en").await;
                if result.bn.is_empty() {
                    println!("Bengali translation unavailable; field left empty.");
                } else {
                    let word_index = vocab
                        .category(index)
                        .map(|c| c.words.len().saturating_sub(1))
                        .unwrap_or(0);
                    vocab
                        .update_word(
                            index,
                            word_index,
                            WordPatch {
                                bn: Some(result.bn.clone()),
                                ..Default::default()
                            },
                        )
                        .await?;
                    println!("Bengali: {}", result.bn);
                }
            }
            Ok(())
        }
        WordCommands::Edit { position, en, bn, de } => {
            let index = vocab.selected_index().context("No category selected")?;
            if en.is_none() && bn.is_none() && de.is_none() {
                println!("Nothing to change; pass --en, --bn or --de.");
                return Ok(());
            }
            vocab
                .update_word(
                    index,
                    to_index(position)?,
                    WordPatch {
                        original: None,
                        en,
                        bn,
                        de,
                    },
                )
                .await?;
            println!("Updated word {position}");
            Ok(())
        }
        WordCommands::Delete { position } => {
            let index = vocab.selected_index().context("No category selected")?;
            vocab.delete_word(index, to_index(position)?).await?;
            println!("Deleted word {position}");
            Ok(())
        }
    }
}

/// Interactive quiz loop over the selected category
async fn run_quiz(vocab: &mut VocabStore) -> Result<()> {
    let Some(index) = vocab.selected_index() else {
        println!("No category selected.");
        return Ok(());
    };

    let mut engine = QuizEngine::new();
    let mut editor = DefaultEditor::new()?;

    loop {
        let Some(category) = vocab.category(index) else {
            break;
        };
        engine.sync(category);

        match engine.state() {
            SessionState::Uninitialized => {
                println!(
                    "\"{}\" has no quiz-eligible words (need both English and German).",
                    category.name
                );
                break;
            }
            SessionState::InProgress => {
                let prompt = engine.current_prompt().expect("in progress").clone();
                println!("\nWhat is the German for \"{}\"?", prompt.question);
                for (i, option) in prompt.options.iter().enumerate() {
                    println!("  {}. {}", i + 1, option);
                }

                let line = match editor.readline("answer (1-4, q to quit) > ") {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                    Err(e) => return Err(e.into()),
                };
                let line = line.trim();
                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                let Ok(choice @ 1..=4) = line.parse::<usize>() else {
                    println!("Enter a number from 1 to 4.");
                    continue;
                };

                match engine.answer(choice - 1) {
                    Some(AnswerOutcome::Correct { word_id, .. }) => {
                        println!("Correct!");
                        vocab.mark_answered(index, word_id).await?;
                    }
                    Some(AnswerOutcome::Incorrect) => println!("Try again."),
                    None => {}
                }
            }
            SessionState::Exhausted => {
                if engine.take_exhaustion_notice() {
                    let line = match editor.readline("All done — start again? [y/N] ") {
                        Ok(line) => line,
                        Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                        Err(e) => return Err(e.into()),
                    };
                    if line.trim().eq_ignore_ascii_case("y") {
                        vocab.reset_progress(index).await?;
                        engine.restart();
                        continue;
                    }
                }
                break;
            }
        }
    }

    println!(
        "Progress: {}/{}",
        vocab.progress_count(index),
        vocab
            .category(index)
            .map(|c| c.eligible_words().len())
            .unwrap_or(0)
    );
    Ok(())
}

fn handle_config(
    set_api_key: Option<String>,
    delete_api_key: bool,
    show: bool,
    path: bool,
) -> Result<()> {
    let mut acted = false;

    if let Some(key) = set_api_key {
        credentials::set_api_key(key.trim())?;
        println!("API key stored securely.");
        acted = true;
    }
    if delete_api_key {
        credentials::delete_api_key()?;
        println!("API key deleted.");
        acted = true;
    }
    if path {
        println!("{}", config::config_path()?.display());
        acted = true;
    }
    if show || !acted {
        config::show_config()?;
    }
    Ok(())
}

fn print_enrichment(word: &str, enrichment: &Enrichment) {
    println!("{}:", word);
    println!("  example:  {}", enrichment.example);
    let render = |entries: &[crate::enrich::LexEntry]| -> String {
        entries
            .iter()
            .map(|e| format!("{} / {} / {}", e.en, e.de, e.bn))
            .collect::<Vec<_>>()
            .join("; ")
    };
    println!("  synonyms: {}", render(&enrichment.synonyms));
    println!("  antonyms: {}", render(&enrichment.antonyms));
}

fn dash_if_empty(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
