use crate::{
    error::AppResult,
    models::{template, Template, TemplateModel},
    services::event::Channel,
    utils::render::{self, Node},
};
use dashmap::DashMap;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

/// Fallback language when no variant exists for the requested one. Every
/// emitted (type, channel) pair ships a template in this language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A template with its patterns parsed once at load time. Rendering only
/// evaluates the cached ASTs against the event payload.
pub struct CompiledTemplate {
    pub event_type: String,
    pub language: String,
    pub channel: String,
    pub priority: String,
    title: Vec<Node>,
    message: Vec<Node>,
    subject: Option<Vec<Node>>,
    html: Option<Vec<Node>>,
}

/// Rendered output for one (template, payload) pair. `subject`/`html` are
/// only present on email templates.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub title: String,
    pub message: String,
    pub subject: Option<String>,
    pub html: Option<String>,
}

impl CompiledTemplate {
    fn compile(model: &TemplateModel) -> Self {
        Self {
            event_type: model.event_type.clone(),
            language: model.language.clone(),
            channel: model.channel.clone(),
            priority: model.priority.clone(),
            title: render::parse(&model.title_pattern),
            message: render::parse(&model.message_pattern),
            subject: model.email_subject_pattern.as_deref().map(render::parse),
            html: model.email_html_pattern.as_deref().map(render::parse),
        }
    }

    pub fn render(&self, vars: &serde_json::Value) -> Rendered {
        Rendered {
            title: render::eval(&self.title, vars),
            message: render::eval(&self.message, vars),
            subject: self.subject.as_deref().map(|n| render::eval(n, vars)),
            html: self.html.as_deref().map(|n| render::eval(n, vars)),
        }
    }
}

/// In-memory store of compiled templates, keyed by (event type, language,
/// channel). Read-mostly and shared across concurrent routers without
/// locking; reloaded wholesale when seed data changes.
#[derive(Clone, Default)]
pub struct TemplateService {
    cache: Arc<DashMap<(String, String, String), Arc<CompiledTemplate>>>,
}

impl TemplateService {
    /// Load and compile every active template row.
    pub async fn load(db: &DatabaseConnection) -> AppResult<Self> {
        let rows = Template::find()
            .filter(template::Column::IsActive.eq(true))
            .all(db)
            .await?;
        tracing::info!(count = rows.len(), "loaded notification templates");
        Ok(Self::from_models(&rows))
    }

    pub fn from_models(models: &[TemplateModel]) -> Self {
        let cache = DashMap::new();
        for model in models {
            cache.insert(
                (
                    model.event_type.clone(),
                    model.language.clone(),
                    model.channel.clone(),
                ),
                Arc::new(CompiledTemplate::compile(model)),
            );
        }
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Exact-match lookup, then the default-language variant. A total miss
    /// skips only this (channel, recipient) pairing; the gap is logged, the
    /// event is not suppressed elsewhere.
    pub fn resolve(
        &self,
        event_type: &str,
        language: &str,
        channel: Channel,
    ) -> Option<Arc<CompiledTemplate>> {
        let key = (
            event_type.to_string(),
            language.to_string(),
            channel.as_str().to_string(),
        );
        if let Some(tpl) = self.cache.get(&key) {
            return Some(tpl.clone());
        }
        if language != DEFAULT_LANGUAGE {
            let fallback = (
                event_type.to_string(),
                DEFAULT_LANGUAGE.to_string(),
                channel.as_str().to_string(),
            );
            if let Some(tpl) = self.cache.get(&fallback) {
                return Some(tpl.clone());
            }
        }
        tracing::warn!(
            event_type,
            language,
            channel = channel.as_str(),
            "no template found, skipping this channel"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(event_type: &str, language: &str, channel: &str) -> TemplateModel {
        TemplateModel {
            id: 0,
            event_type: event_type.to_string(),
            language: language.to_string(),
            channel: channel.to_string(),
            title_pattern: format!("[{language}] title"),
            message_pattern: "Hello {{customerName}}".to_string(),
            email_subject_pattern: None,
            email_html_pattern: None,
            priority: "medium".to_string(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_exact_match() {
        let svc = TemplateService::from_models(&[
            model("order_created", "en", "in_app"),
            model("order_created", "de", "in_app"),
        ]);
        let tpl = svc.resolve("order_created", "de", Channel::InApp).unwrap();
        assert_eq!(tpl.language, "de");
    }

    #[test]
    fn test_default_language_fallback() {
        let svc = TemplateService::from_models(&[model("order_created", "en", "in_app")]);
        let tpl = svc.resolve("order_created", "fr", Channel::InApp).unwrap();
        assert_eq!(tpl.language, "en");
    }

    #[test]
    fn test_total_miss_returns_none() {
        let svc = TemplateService::from_models(&[model("order_created", "en", "in_app")]);
        assert!(svc.resolve("order_created", "en", Channel::Email).is_none());
        assert!(svc.resolve("stock_out", "en", Channel::InApp).is_none());
    }

    #[test]
    fn test_compiled_render() {
        let svc = TemplateService::from_models(&[model("order_created", "en", "in_app")]);
        let tpl = svc.resolve("order_created", "en", Channel::InApp).unwrap();
        let out = tpl.render(&json!({"customerName": "Iris"}));
        assert_eq!(out.message, "Hello Iris");
        assert!(out.subject.is_none());
    }
}
