//! Read-only access to islands, reloaded from disk on every call.
use log::debug;
use rand::Rng;

use crate::{
    sampling, Island, IdeaList, IslandCollection, IslandError, IslandStorage, IslandSummary,
    RawContent, Result,
};

/// Serves idea queries from its own copy of the collection
pub struct IslandQuery {
    storage: IslandStorage,
}

impl IslandQuery {
    pub fn new(storage: IslandStorage) -> Self {
        Self { storage }
    }

    fn load(&self) -> Result<IslandCollection> {
        self.storage.load()
    }

    fn find(islands: &IslandCollection, id: &str) -> Result<Island> {
        islands
            .get(id)
            .cloned()
            .ok_or_else(|| IslandError::not_found(id))
    }

    /// Every island's id and name
    pub fn list_islands(&self) -> Result<Vec<IslandSummary>> {
        Ok(self
            .load()?
            .iter()
            .map(|island| IslandSummary {
                id: island.id.clone(),
                name: island.name.clone(),
            })
            .collect())
    }

    /// Up to `count` random distinct ideas from one island
    pub fn list_ideas(&self, id: &str, count: usize) -> Result<IdeaList> {
        self.list_ideas_with(id, count, &mut rand::thread_rng())
    }

    /// [`IslandQuery::list_ideas`] with a caller-supplied generator
    pub fn list_ideas_with<R: Rng + ?Sized>(
        &self,
        id: &str,
        count: usize,
        rng: &mut R,
    ) -> Result<IdeaList> {
        let island = Self::find(&self.load()?, id)?;
        let ideas = sampling::sample_ideas(&island.content, count, rng);
        debug!("Picked {} ideas from island {}", ideas.len(), id);
        Ok(IdeaList {
            island_name: island.name,
            ideas,
        })
    }

    /// Every idea of one island, in file order
    pub fn list_all_ideas(&self, id: &str) -> Result<IdeaList> {
        let island = Self::find(&self.load()?, id)?;
        Ok(IdeaList {
            ideas: island.ideas(),
            island_name: island.name,
        })
    }

    pub fn get_raw_content(&self, id: &str) -> Result<RawContent> {
        let island = Self::find(&self.load()?, id)?;
        Ok(RawContent {
            island_name: island.name,
            content: island.content,
        })
    }
}
