//! JSON file actor store - one `<actor-id>.json` file per actor.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sheetforge_domain::{Actor, ActorId};

use crate::infrastructure::ports::{ActorRepo, RepoError};

const EXTENSION: &str = "json";

pub struct JsonFileActorRepo {
    dir: PathBuf,
}

impl JsonFileActorRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: ActorId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }

    async fn read_actor(path: &Path) -> Result<Option<Actor>, RepoError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepoError::storage("read_actor", e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| RepoError::serialization(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ActorRepo for JsonFileActorRepo {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, RepoError> {
        Self::read_actor(&self.path_for(id)).await
    }

    async fn save(&self, actor: &Actor) -> Result<(), RepoError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RepoError::storage("save_actor", e))?;

        let json = serde_json::to_string_pretty(actor).map_err(RepoError::serialization)?;

        // Write-then-rename so a crash never leaves a truncated document
        let path = self.path_for(actor.id);
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| RepoError::storage("save_actor", e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| RepoError::storage("save_actor", e))?;

        tracing::debug!(actor_id = %actor.id, path = %path.display(), "Actor saved");
        Ok(())
    }

    async fn delete(&self, id: ActorId) -> Result<(), RepoError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RepoError::not_found("Actor", id)),
            Err(e) => Err(RepoError::storage("delete_actor", e)),
        }
    }

    async fn list(&self) -> Result<Vec<Actor>, RepoError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::storage("list_actors", e)),
        };

        let mut actors = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage("list_actors", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::read_actor(&path).await {
                Ok(Some(actor)) => actors.push(actor),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable actor file");
                }
            }
        }

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
    async fn save_get_list_delete() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileActorRepo::new(temp_dir.path().join("actors"));

        let template = Actor::template("Adventurer");
        let mut character = Actor::character("Aria").with_prop("str", 2);
        character.template_id = Some(template.id);
        let loner = Actor::character("Bram");

        assert!(repo.list().await.expect("empty list").is_empty());

        for actor in [&template, &character, &loner] {
            repo.save(actor).await.expect("save");
        }

        let loaded = repo.get(character.id).await.expect("get").expect("present");
        assert_eq!(loaded, character);

        let all = repo.list().await.expect("list");
        assert_eq!(
            all.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["Adventurer", "Aria", "Bram"]
        );

        let built = repo.list_by_template(template.id).await.expect("by template");
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].id, character.id);

        repo.delete(loner.id).await.expect("delete");
        assert!(repo.get(loner.id).await.expect("get").is_none());
        assert!(repo.delete(loner.id).await.expect_err("gone").is_not_found());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileActorRepo::new(temp_dir.path());
        let id = ActorId::new();
        tokio::fs::write(temp_dir.path().join(format!("{}.json", id)), "{ not json")
            .await
            .expect("write");

        let err = repo.get(id).await.expect_err("corrupt");
        assert!(matches!(err, RepoError::Serialization(_)));
        assert!(repo.list().await.expect("list skips corrupt files").is_empty());
    }
}
