//! In-memory actor store for tests and one-shot runs.

use async_trait::async_trait;
use dashmap::DashMap;
use sheetforge_domain::{Actor, ActorId};

use crate::infrastructure::ports::{ActorRepo, RepoError};

#[derive(Default)]
pub struct InMemoryActorRepo {
    actors: DashMap<ActorId, Actor>,
}

impl InMemoryActorRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        let repo = Self::new();
        for actor in actors {
            repo.actors.insert(actor.id, actor);
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[async_trait]
impl ActorRepo for InMemoryActorRepo {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, RepoError> {
        Ok(self.actors.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, actor: &Actor) -> Result<(), RepoError> {
        self.actors.insert(actor.id, actor.clone());
        Ok(())
    }

    async fn delete(&self, id: ActorId) -> Result<(), RepoError> {
        self.actors
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Actor", id))
    }

    async fn list(&self) -> Result<Vec<Actor>, RepoError> {
        let mut actors: Vec<Actor> = self
            .actors
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        actors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(actors)
    }

    async fn list_by_template(&self, template_id: ActorId) -> Result<Vec<Actor>, RepoError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|actor| !actor.is_template() && actor.template_id == Some(template_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_filters_by_template() {
        let template = Actor::template("Adventurer");
        let mut character = Actor::character("Aria");
        character.template_id = Some(template.id);
        let repo = InMemoryActorRepo::with_actors([template.clone(), character.clone()]);

        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(character.id).await.unwrap(), Some(character.clone()));

        let built = repo.list_by_template(template.id).await.unwrap();
        assert_eq!(built, vec![character.clone()]);

        repo.delete(character.id).await.unwrap();
        assert!(repo.delete(character.id).await.unwrap_err().is_not_found());
    }
}
