//! Named route table used to check whether a URL resolves.
//!
//! The axum router serves requests. The [`RouteTable`] mirrors its routes
//! so the middleware can ask "does `GET /devices/1/channels` exist?" without
//! dispatching a request. The matchers are built on first lookup and reused.

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::http::Method;

#[derive(Debug, Clone)]
struct RouteDefinition {
    methods: Vec<Method>,
    pattern: String,
    name: String,
}

/// Outcome of [`RouteTable::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingResult {
    Found {
        name: String,
        params: Vec<(String, String)>,
    },
    /// The path exists for other methods only.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

struct Dispatcher {
    by_method: HashMap<Method, matchit::Router<String>>,
}

/// Routes (methods, pattern, name) mounted under a common base path.
///
/// Patterns use the axum syntax, e.g. `/devices/{id}`.
pub struct RouteTable {
    base_path: String,
    definitions: Vec<RouteDefinition>,
    dispatcher: OnceLock<Dispatcher>,
}

impl RouteTable {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            definitions: Vec::new(),
            dispatcher: OnceLock::new(),
        }
    }

    /// Add a route. Has no effect on lookups once the table is compiled.
    pub fn route(mut self, methods: &[Method], pattern: impl Into<String>, name: impl Into<String>) -> Self {
        self.definitions.push(RouteDefinition {
            methods: methods.to_vec(),
            pattern: pattern.into(),
            name: name.into(),
        });
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Match `path` (no query string) for `method`.
    pub fn dispatch(&self, method: &Method, path: &str) -> RoutingResult {
        let dispatcher = self.dispatcher.get_or_init(|| self.compile());

        if let Some(matched) = dispatcher.by_method.get(method).and_then(|r| r.at(path).ok()) {
            return RoutingResult::Found {
                name: matched.value.clone(),
                params: matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            };
        }

        let mut allowed: Vec<Method> = dispatcher
            .by_method
            .iter()
            .filter(|(m, router)| *m != method && router.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            RoutingResult::NotFound
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            RoutingResult::MethodNotAllowed(allowed)
        }
    }

    fn compile(&self) -> Dispatcher {
        let mut by_method: HashMap<Method, matchit::Router<String>> = HashMap::new();
        for def in &self.definitions {
            let full = format!("{}{}", self.base_path, def.pattern);
            for method in &def.methods {
                let router = by_method
                    .entry(method.clone())
                    .or_insert_with(matchit::Router::new);
                if let Err(e) = router.insert(full.clone(), def.name.clone()) {
                    tracing::warn!(route = %full, %method, error = %e, "skipping conflicting route");
                }
            }
        }
        tracing::debug!(routes = self.definitions.len(), "route table compiled");
        Dispatcher { by_method }
    }
}
