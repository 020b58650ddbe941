//! CLI module for the islands application
//!
//! This module handles the command-line interface: the editor-side
//! mutations, peer synchronization and the read-only idea queries.
use std::{
    fs::read_to_string,
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{
    number_ideas, read_content_file, Commands, Config, DeleteMode, HttpPeer, IdeaList,
    IslandError, IslandPatch, IslandQuery, IslandStorage, IslandStore, RemoteOutcome, Result,
    SyncCoordinator, SyncReport,
};

/// CLI Application handler - processes CLI commands against the island store
pub struct App {
    /// Local store, mutated by editor commands
    store: IslandStore,

    /// Peer replication; absent when no peer is configured
    sync: Option<SyncCoordinator<HttpPeer>>,

    /// Read side, reloading from disk per query
    query: IslandQuery,

    /// Application configuration
    config: Config,

    /// Where `config --write` saves to
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application from the given config
    pub fn new(config: Config, config_path: PathBuf, verbose: bool) -> Result<Self> {
        let storage = IslandStorage::new(config.data_file.clone());
        let store = IslandStore::open(storage.clone())?;
        let query = IslandQuery::new(storage);

        let sync = match &config.peer_url {
            Some(url) => {
                info!("Replicating to peer at {}", url);
                Some(SyncCoordinator::new(HttpPeer::new(url, config.peer_timeout())?))
            }
            None => {
                debug!("No peer configured, running local-only");
                None
            }
        };

        Ok(Self {
            store,
            sync,
            query,
            config,
            config_path,
            verbose,
        })
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create { name } => self.handle_create(name).await,

            Commands::Update {
                id,
                name,
                content,
                file,
                edit,
            } => self.handle_update(id, name, content, file, edit).await,

            Commands::Delete { id, force_local } => self.handle_delete(id, force_local).await,

            Commands::List { json } => self.handle_list(json),

            Commands::Ideas {
                id,
                count,
                all,
                json,
            } => self.handle_ideas(id, count, all, json),

            Commands::Raw { id, json } => self.handle_raw(id, json),

            Commands::Sync { yes } => self.handle_full_sync(yes).await,

            Commands::Config { show, write } => self.handle_config(show, write),
        }
    }

    async fn handle_create(&mut self, name: String) -> Result<()> {
        let report = match &self.sync {
            Some(sync) => sync.create(&mut self.store, &name).await?,
            None => SyncReport {
                id: self.store.create_island(&name)?,
                remote: RemoteOutcome::Skipped,
            },
        };

        println!("Island created with ID: {}", report.id);
        self.print_remote(&report.remote, "Island kept locally");
        Ok(())
    }

    async fn handle_update(
        &mut self,
        id: String,
        name: Option<String>,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        let content = match (content, file, edit) {
            (Some(c), _, _) => Some(c),
            (None, Some(path), _) => Some(read_content_file(&path)?),
            (None, None, true) => {
                let island = self.store.get(&id)?;
                Some(self.open_editor_with_content(&island.content)?)
            }
            (None, None, false) => None,
        };

        let patch = IslandPatch { name, content };
        if patch.is_empty() {
            return Err(IslandError::invalid_input(
                "nothing to update: pass --name, --content, --file or --edit",
            ));
        }

        let report = match &self.sync {
            Some(sync) => sync.update(&mut self.store, &id, &patch).await?,
            None => {
                self.store.update_island(&id, &patch)?;
                SyncReport {
                    id: id.clone(),
                    remote: RemoteOutcome::Skipped,
                }
            }
        };

        let island = self.store.get(&report.id)?;
        println!(
            "Island '{}' updated ({} ideas).",
            island.name,
            island.ideas().len()
        );
        self.print_remote(&report.remote, "Local changes kept");
        Ok(())
    }

    async fn handle_delete(&mut self, id: String, force_local: bool) -> Result<()> {
        // Fetch first so unknown ids fail before the peer is contacted
        let island = self.store.get(&id)?.clone();

        let Some(sync) = &self.sync else {
            self.store.delete_island(&id)?;
            println!("Island '{}' ({}) has been deleted.", island.name, island.id);
            return Ok(());
        };

        let mode = if force_local {
            DeleteMode::ForceLocal
        } else {
            DeleteMode::RequirePeer
        };

        let outcome = sync.delete(&mut self.store, &id, mode).await;
        match outcome {
            Ok(report) => {
                println!("Island '{}' ({}) has been deleted.", island.name, island.id);
                self.print_remote(&report.remote, "Deleted locally only");
                Ok(())
            }
            Err(e) if e.is_remote() => {
                eprintln!("The peer did not delete the island: {}", e);
                println!("Deleting it here only leaves '{}' on the peer.", island.name);

                if !confirm("Delete it locally anyway? [y/N]: ")? {
                    println!("Deletion cancelled. The island was kept.");
                    return Ok(());
                }

                self.store.delete_island(&id)?;
                println!(
                    "Island '{}' ({}) has been deleted locally only.",
                    island.name, island.id
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn handle_list(&self, json: bool) -> Result<()> {
        let islands = self.query.list_islands()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&islands)?);
            return Ok(());
        }

        if islands.is_empty() {
            println!("You don't have any islands yet. Create one with `islands create <name>`.");
            return Ok(());
        }

        for island in islands {
            println!("{}  {}", island.id, island.name);
        }
        Ok(())
    }

    fn handle_ideas(&self, id: String, count: Option<usize>, all: bool, json: bool) -> Result<()> {
        let ideas = if all {
            self.query.list_all_ideas(&id)?
        } else {
            let count = count.unwrap_or(self.config.default_idea_count);
            self.query.list_ideas(&id, count)?
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&ideas)?);
        } else {
            self.display_ideas(&ideas);
        }
        Ok(())
    }

    fn display_ideas(&self, ideas: &IdeaList) {
        println!("{}", ideas.island_name);
        if ideas.ideas.is_empty() {
            println!("No ideas found! Add some content (one idea per line).");
            return;
        }
        for line in number_ideas(&ideas.ideas) {
            println!("  {}", line);
        }
    }

    fn handle_raw(&self, id: String, json: bool) -> Result<()> {
        let raw = self.query.get_raw_content(&id)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&raw)?);
        } else {
            print!("{}", raw.content);
            if !raw.content.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }

    async fn handle_full_sync(&self, yes: bool) -> Result<()> {
        let Some(sync) = &self.sync else {
            return Err(IslandError::ConfigError {
                message: "no peer configured; set peer_url or pass --peer".to_string(),
            });
        };

        if !yes {
            println!(
                "This replaces ALL islands on the peer with the {} local ones.",
                self.store.islands().len()
            );
            println!("Islands that exist only on the peer will be lost.");
            if !confirm("Continue? [y/N]: ")? {
                println!("Sync cancelled.");
                return Ok(());
            }
        }

        sync.full_sync(&self.store).await?;
        println!(
            "Peer now holds the {} local islands.",
            self.store.islands().len()
        );
        Ok(())
    }

    fn handle_config(&self, show: bool, write: bool) -> Result<()> {
        if write {
            self.config.save(&self.config_path)?;
            println!("Configuration written to {}", self.config_path.display());
        }
        if show || !write {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    fn print_remote(&self, outcome: &RemoteOutcome, kept: &str) {
        match outcome {
            RemoteOutcome::Synced => println!("Synced to peer."),
            RemoteOutcome::Failed(reason) => {
                eprintln!("Warning: peer not updated ({}). {}.", reason, kept)
            }
            RemoteOutcome::Skipped if self.verbose => println!("No peer configured; local only."),
            RemoteOutcome::Skipped => {}
        }
    }

    // Edits existing content in a temporary file and returns the result
    fn open_editor_with_content(&self, existing_content: &str) -> Result<String> {
        let mut temp_file = Builder::new().suffix(".txt").tempfile()?;
        temp_file.write_all(existing_content.as_bytes())?;
        temp_file.flush()?;

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor. One idea per line; save and exit when done...");
        self.launch_editor(&editor_cmd, temp_file.path())?;

        Ok(read_to_string(temp_file.path())?)
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| IslandError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(IslandError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(rest)
            .arg(file_path)
            .status()
            .map_err(|e| IslandError::EditorError {
                message: format!("Failed to execute editor command: {}", e),
            })?;

        if !status.success() {
            return Err(IslandError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

/// Asks a yes/no question on stdin; anything but y/yes is a no
fn confirm(question: &str) -> Result<bool> {
    print!("{}", question);
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
