//! Route authorization rules
//!
//! An ordered list of `(pattern, requirement)` pairs. The first pattern that
//! matches the request path decides; paths matching nothing fall back to
//! requiring any authenticated identity.

use crate::principal::Role;

/// What a route demands from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// No authentication at all; credentials are not even inspected
    PermitAll,
    /// Any authenticated identity, whatever its role
    Authenticated,
    /// An authenticated identity holding one of these roles
    AnyRole(Vec<Role>),
}

impl Requirement {
    pub fn any_of(roles: &[Role]) -> Self {
        Requirement::AnyRole(roles.to_vec())
    }

    pub fn requires_authentication(&self) -> bool {
        !matches!(self, Requirement::PermitAll)
    }

    /// Whether an authenticated identity with `role` satisfies this requirement
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Requirement::PermitAll | Requirement::Authenticated => true,
            Requirement::AnyRole(roles) => roles.contains(&role),
        }
    }
}

/// Path matcher: an exact path, or `prefix/**` for a subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct AccessRule {
    pattern: PathPattern,
    requirement: Requirement,
}

/// First-match route → requirement table
#[derive(Debug, Clone)]
pub struct RouteRules {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl RouteRules {
    /// An empty table whose unmatched paths get `fallback`
    pub fn new(fallback: Requirement) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule covering every pattern in `patterns`
    pub fn rule(mut self, patterns: &[&str], requirement: Requirement) -> Self {
        for pattern in patterns {
            self.rules.push(AccessRule {
                pattern: PathPattern::parse(pattern),
                requirement: requirement.clone(),
            });
        }
        self
    }

    /// Requirement of the first rule matching `path`
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback)
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        RouteRules::new(Requirement::Authenticated)
            .rule(&["/public", "/health", "/healthz"], Requirement::PermitAll)
            .rule(&["/user"], Requirement::any_of(&[Role::User, Role::Admin]))
            .rule(&["/admin", "/users", "/metrics"], Requirement::any_of(&[Role::Admin]))
    }
}
