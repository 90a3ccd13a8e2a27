//! Application state and composition.

use std::sync::Arc;

use sheetforge_domain::{ExpressionEvaluator, FormulaEvaluator};

use crate::infrastructure::{
    chat::TracingChat,
    clock::{RandomDiceRoller, SystemClock, SystemRandom},
    config::EngineConfig,
    json_store::JsonFileActorRepo,
    ports::{ActorRepo, ChatPort, ClockPort, RandomPort},
};
use crate::use_cases::{
    actor_sheet::{
        ActorSheetUseCases, AdjustBar, AttachItems, DetachItem, PrepareDerivedData, RollProperty,
        TableRows,
    },
    template::{AddTableColumns, ReloadTemplate, TemplateUseCases},
};

/// Main application state.
///
/// Holds the actor store and all use cases wired to one formula evaluator.
pub struct App {
    pub actors: Arc<dyn ActorRepo>,
    pub evaluator: Arc<dyn FormulaEvaluator>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub actor_sheet: ActorSheetUseCases,
    pub template: TemplateUseCases,
}

impl App {
    /// Production wiring: JSON files under `config.data_dir`, chat to the log.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config,
            Arc::new(JsonFileActorRepo::new(config.data_dir.clone())),
            Arc::new(TracingChat::new()),
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
        )
    }

    pub fn new(
        config: &EngineConfig,
        actors: Arc<dyn ActorRepo>,
        chat: Arc<dyn ChatPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let evaluator: Arc<dyn FormulaEvaluator> = Arc::new(ExpressionEvaluator::new(Arc::new(
            RandomDiceRoller::new(random),
        )));

        let actor_sheet = ActorSheetUseCases::new(
            Arc::new(PrepareDerivedData::new(actors.clone(), evaluator.clone())),
            Arc::new(RollProperty::new(
                actors.clone(),
                evaluator.clone(),
                chat,
                clock,
                config.post_rolls,
            )),
            Arc::new(AdjustBar::new(actors.clone(), evaluator.clone())),
            Arc::new(AttachItems::new(actors.clone())),
            Arc::new(DetachItem::new(actors.clone())),
            Arc::new(TableRows::new(actors.clone())),
        );

        let template = TemplateUseCases::new(
            Arc::new(ReloadTemplate::new(actors.clone())),
            Arc::new(AddTableColumns::new(actors.clone())),
        );

        Self {
            actors,
            evaluator,
            use_cases: UseCases {
                actor_sheet,
                template,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::memory::InMemoryActorRepo;
    use crate::infrastructure::ports::MockChatPort;
    use crate::use_cases::actor_sheet::RollRequest;
    use crate::use_cases::test_support::{sheet, template};
    use chrono::Utc;
    use sheetforge_domain::PropertyValue;

    #[tokio::test]
    async fn wires_dice_through_the_random_port() {
        let template = template();
        let mut actor = sheet();
        actor.template_id = Some(template.id);
        let id = actor.id;

        let mut chat = MockChatPort::new();
        chat.expect_post().times(1).returning(|_| Ok(()));

        let app = App::new(
            &EngineConfig::default(),
            Arc::new(InMemoryActorRepo::with_actors([template, actor])),
            Arc::new(chat),
            Arc::new(FixedClock(Utc::now())),
            Arc::new(FixedRandom(4)),
        );

        let outcome = app
            .use_cases
            .actor_sheet
            .roll
            .execute(id, RollRequest::new("attacks(weapon=Axe).toHit"))
            .await
            .expect("roll");
        assert_eq!(outcome.phrase.result, PropertyValue::Number(7.0));
        assert_eq!(outcome.phrase.explanation.as_deref(), Some("[1d20: 4] + 3"));

        let reload = app
            .use_cases
            .template
            .reload
            .execute(id, None)
            .await
            .expect("reload");
        assert!(reload.reload.tombstones.is_empty());
    }
}
