//! MiniJinja template engine wrapper for the chat page.

use crate::types::Turn;
use anyhow::Result;
use minijinja::{context, Environment, Error, Value};

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_debug(cfg!(debug_assertions));

        env.add_template("chat.html", include_str!("../web/templates/chat.html"))?;
        env.add_filter("clock_time", clock_time);

        Ok(Self { env })
    }

    /// Render a template with context
    pub fn render(&self, template_name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(template_name)?;
        Ok(template.render(ctx)?)
    }

    /// Render the chat page with the session's replayed history.
    pub fn render_chat_page(&self, turns: &[Turn]) -> Result<String> {
        self.render(
            "chat.html",
            context! {
                turns => turns,
                version => env!("CARGO_PKG_VERSION"),
            },
        )
    }
}

/// Format an RFC 3339 timestamp as HH:MM for message bubbles.
fn clock_time(value: Value) -> Result<Value, Error> {
    let raw = value.as_str().ok_or_else(|| {
        Error::new(minijinja::ErrorKind::InvalidOperation, "expected string")
    })?;
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(Value::from(dt.format("%H:%M").to_string())),
        Err(_) => Ok(Value::from(raw)),
    }
}
