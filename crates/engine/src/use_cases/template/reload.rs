//! Reload template use case.
//!
//! Pushes a template's current layout into the characters built from it.

use std::sync::Arc;

use serde::Serialize;
use sheetforge_domain::{Actor, ActorId, TemplateReload};

use crate::infrastructure::ports::ActorRepo;

use super::error::TemplateError;

/// Reload result for one character.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorReload {
    pub actor_id: ActorId,
    pub actor_name: String,
    pub reload: TemplateReload,
}

pub struct ReloadTemplate {
    actor_repo: Arc<dyn ActorRepo>,
}

impl ReloadTemplate {
    pub fn new(actor_repo: Arc<dyn ActorRepo>) -> Self {
        Self { actor_repo }
    }

    /// Reload one character.
    ///
    /// `template_id` assigns or switches the template; `None` reloads from
    /// the one the character was built from.
    pub async fn execute(
        &self,
        actor_id: ActorId,
        template_id: Option<ActorId>,
    ) -> Result<ActorReload, TemplateError> {
        let actor = self
            .actor_repo
            .get(actor_id)
            .await?
            .ok_or(TemplateError::ActorNotFound(actor_id))?;
        let template_id = template_id
            .or(actor.template_id)
            .ok_or(TemplateError::NoTemplate(actor_id))?;
        let template = self.load_template(template_id).await?;

        self.reload(actor, &template).await
    }

    /// Reload every character built from `template_id`.
    pub async fn reload_all(&self, template_id: ActorId) -> Result<Vec<ActorReload>, TemplateError> {
        let template = self.load_template(template_id).await?;
        let actors = self.actor_repo.list_by_template(template_id).await?;

        let mut reloads = Vec::with_capacity(actors.len());
        for actor in actors {
            reloads.push(self.reload(actor, &template).await?);
        }

        tracing::info!(
            template_id = %template_id,
            actors = reloads.len(),
            "Template reloaded into all characters"
        );
        Ok(reloads)
    }

    async fn load_template(&self, template_id: ActorId) -> Result<Actor, TemplateError> {
        self.actor_repo
            .get(template_id)
            .await?
            .ok_or(TemplateError::TemplateNotFound(template_id))
    }

    async fn reload(&self, mut actor: Actor, template: &Actor) -> Result<ActorReload, TemplateError> {
        let reload = actor.reload_template(template)?;
        self.actor_repo.save(&actor).await?;

        for tombstone in &reload.tombstones {
            tracing::debug!(
                actor_id = %actor.id,
                target = ?tombstone.target,
                key = %tombstone.key,
                "Entry removed by template reload"
            );
        }

        Ok(ActorReload {
            actor_id: actor.id,
            actor_name: actor.name,
            reload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryActorRepo;
    use crate::infrastructure::ports::MockActorRepo;
    use crate::use_cases::test_support::{sheet, template};
    use sheetforge_domain::{
        BarDefinition, Component, Container, NumberField, SheetLayout, Tombstone, TombstoneTarget,
    };

    #[tokio::test]
    async fn reload_all_tombstones_undeclared_entries() {
        let mut template = template();
        let mut aria = sheet();
        aria.template_id = Some(template.id);
        aria = aria.with_prop("notes", "left over");
        aria.layout
            .attribute_bars
            .insert("stress".to_string(), BarDefinition::new(6.0));
        let mut bram = sheet();
        bram.name = "Bram".to_string();
        bram.template_id = Some(template.id);
        let stranger = sheet();

        template.layout = SheetLayout {
            body: Some(Component::Panel(Container::new(vec![
                Component::NumberField(NumberField::keyed("str")),
                Component::NumberField(NumberField::keyed("hp").with_max("10")),
            ]))),
            ..SheetLayout::default()
        };
        let template_id = template.id;
        let (aria_id, stranger_id) = (aria.id, stranger.id);

        let repo = Arc::new(InMemoryActorRepo::with_actors([
            template,
            aria,
            bram,
            stranger.clone(),
        ]));
        let use_case = ReloadTemplate::new(repo.clone());

        let reloads = use_case.reload_all(template_id).await.expect("reloaded");
        assert_eq!(reloads.len(), 2);

        let aria_reload = reloads
            .iter()
            .find(|reload| reload.actor_id == aria_id)
            .expect("aria reloaded");
        assert_eq!(
            aria_reload.reload.tombstones,
            vec![
                Tombstone {
                    target: TombstoneTarget::Property,
                    key: "attacks".to_string(),
                },
                Tombstone {
                    target: TombstoneTarget::Property,
                    key: "notes".to_string(),
                },
                Tombstone {
                    target: TombstoneTarget::AttributeBar,
                    key: "stress".to_string(),
                },
            ]
        );

        let stored = repo.get(aria_id).await.unwrap().unwrap();
        assert!(!stored.props.contains("attacks"));
        assert!(stored.props.contains("hp"));
        assert!(stored.layout.attribute_bars.is_empty());

        assert_eq!(repo.get(stranger_id).await.unwrap(), Some(stranger));
    }

    #[tokio::test]
    async fn single_reload_requires_a_template() {
        let mut orphan = sheet();
        orphan.template_id = None;
        let orphan_id = orphan.id;
        let character = sheet();
        let character_id = character.id;

        let mut repo = MockActorRepo::new();
        repo.expect_get().returning(move |id| {
            if id == orphan_id {
                Ok(Some(orphan.clone()))
            } else if id == character_id {
                Ok(Some(character.clone()))
            } else {
                Ok(None)
            }
        });
        repo.expect_save().never();

        let use_case = ReloadTemplate::new(Arc::new(repo));
        assert!(matches!(
            use_case.execute(orphan_id, None).await,
            Err(TemplateError::NoTemplate(_))
        ));
        // The fixture's template is never stored
        assert!(matches!(
            use_case.execute(character_id, None).await,
            Err(TemplateError::TemplateNotFound(_))
        ));
    }

    #[tokio::test]
    async fn assigns_and_switches_templates() {
        let first = template();
        let mut second = template();
        second.id = ActorId::new();
        second.name = "Mage".to_string();
        second.layout = SheetLayout {
            body: Some(Component::Panel(Container::new(vec![
                Component::NumberField(NumberField::keyed("str")),
                Component::NumberField(NumberField::keyed("mana")),
            ]))),
            ..SheetLayout::default()
        };
        let mut orphan = sheet();
        orphan.template_id = None;
        orphan.layout = SheetLayout::default();
        let (orphan_id, first_id, second_id) = (orphan.id, first.id, second.id);

        let repo = Arc::new(InMemoryActorRepo::with_actors([first, second, orphan]));
        let use_case = ReloadTemplate::new(repo.clone());

        let assigned = use_case
            .execute(orphan_id, Some(first_id))
            .await
            .expect("template assigned");
        assert_eq!(assigned.reload.template_id, first_id);
        assert!(assigned.reload.tombstones.is_empty());

        let stored = repo.get(orphan_id).await.unwrap().unwrap();
        assert_eq!(stored.template_id, Some(first_id));
        assert!(stored.layout.find_dynamic_table("attacks").is_some());

        let switched = use_case
            .execute(orphan_id, Some(second_id))
            .await
            .expect("template switched");
        assert_eq!(switched.reload.template_id, second_id);
        assert!(switched
            .reload
            .tombstones
            .iter()
            .any(|tombstone| tombstone.key == "attacks"));

        let stored = repo.get(orphan_id).await.unwrap().unwrap();
        assert_eq!(stored.template_id, Some(second_id));

        // Without an explicit id the stored template is used again
        let again = use_case.execute(orphan_id, None).await.expect("reloaded");
        assert_eq!(again.reload.template_id, second_id);
    }
}
