use std::fmt::Display;

use url::Url;

use crate::error::{DblError, Result};

pub const DEFAULT_BASE_URL: &str = "https://discordbots.org/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A DBL endpoint. Templated routes carry `{}` placeholders that must be
/// filled through [`Route::format_url`].
#[derive(Debug, Clone)]
pub struct Route {
    template: String,
    method: Method,
}

impl Route {
    fn new(template: String, method: Method) -> Self {
        Self { template, method }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn requires_format(&self) -> bool {
        self.template.contains("{}")
    }

    /// The plain URL of a route without placeholders.
    pub fn url(&self) -> Result<&str> {
        if self.requires_format() {
            return Err(DblError::RequireFormatting {
                route: self.template.clone(),
            });
        }
        Ok(&self.template)
    }

    /// Fills the `{}` placeholders in order. Placeholders without a matching
    /// argument are left in place.
    pub fn format_url<A: Display>(&self, args: &[A]) -> String {
        let mut out = String::with_capacity(self.template.len() + 20);
        let mut parts = self.template.split("{}");
        if let Some(first) = parts.next() {
            out.push_str(first);
        }
        let mut args = args.iter();
        for part in parts {
            match args.next() {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push_str("{}"),
            }
            out.push_str(part);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    base_url: String,
    pub bot_search: Route,
    pub bot_get: Route,
    pub bot_votes: Route,
    pub bot_stats: Route,
    pub bot_upload_stats: Route,
    pub user_get: Route,
    pub widget_get: Route,
    pub widget_owner: Route,
}

impl Router {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Url::parse(&base_url)?;

        let bots = format!("{base_url}bots");
        let users = format!("{base_url}users/");
        let widget = format!("{base_url}widget/");

        Ok(Self {
            bot_search: Route::new(bots.clone(), Method::Get),
            bot_get: Route::new(format!("{bots}/{{}}"), Method::Get),
            bot_votes: Route::new(format!("{bots}/{{}}/votes"), Method::Get),
            bot_stats: Route::new(format!("{bots}/{{}}/stats"), Method::Get),
            bot_upload_stats: Route::new(format!("{bots}/{{}}/stats"), Method::Post),
            user_get: Route::new(format!("{users}{{}}"), Method::Get),
            widget_get: Route::new(format!("{widget}{{}}.svg"), Method::Get),
            widget_owner: Route::new(format!("{widget}owner/{{}}.svg"), Method::Get),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
