use serde::{Serialize, Deserialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// GET and HEAD read, every other method writes
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" => Action::Read,
            _ => Action::Write,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize
)]
pub struct Rule {
    pub effect: Effect,
    pub action: Action,
    pub resource: String,
}

impl Rule {
    pub fn matches(&self, action: Action, resource: &str) -> bool {
        self.action == action && resource_match(&self.resource, resource)
    }
}

/// a single trailing '*' makes the pattern a prefix match, anything
/// else is compared byte for byte
pub fn resource_match(pattern: &str, resource: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        resource.starts_with(prefix)
    } else {
        pattern == resource
    }
}

/// flattened rule evaluation. any matching deny wins, otherwise any
/// matching allow wins, otherwise the request is denied
pub fn evaluate<'a, I>(rules: I, action: Action, resource: &str) -> bool
where
    I: IntoIterator<Item = &'a Rule>
{
    let mut allowed = false;

    for rule in rules {
        if !rule.matches(action, resource) {
            continue;
        }

        match rule.effect {
            Effect::Deny => return false,
            Effect::Allow => allowed = true,
        }
    }

    allowed
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule(effect: Effect, action: Action, resource: &str) -> Rule {
        Rule {
            effect,
            action,
            resource: resource.to_owned(),
        }
    }

    #[test]
    pub fn action_from_method() {
        assert_eq!(Action::from_method("GET"), Action::Read);
        assert_eq!(Action::from_method("HEAD"), Action::Read);
        assert_eq!(Action::from_method("POST"), Action::Write);
        assert_eq!(Action::from_method("PUT"), Action::Write);
        assert_eq!(Action::from_method("DELETE"), Action::Write);
    }

    #[test]
    pub fn resource_match_exact_and_prefix() {
        assert!(resource_match("/users", "/users"));
        assert!(!resource_match("/users", "/users/abc"));
        assert!(resource_match("/users/*", "/users/abc"));
        assert!(resource_match("/users/*", "/users/"));
        assert!(!resource_match("/users/*", "/groups/abc"));
        assert!(resource_match("*", "/anything"));
    }

    #[test]
    pub fn empty_rule_set_denies() {
        let rules: [Rule; 0] = [];

        assert!(!evaluate(rules.iter(), Action::Read, "/users"));
    }

    #[test]
    pub fn allow_requires_matching_action() {
        let rules = [rule(Effect::Allow, Action::Read, "/users/*")];

        assert!(evaluate(rules.iter(), Action::Read, "/users/abc"));
        assert!(!evaluate(rules.iter(), Action::Write, "/users/abc"));
    }

    #[test]
    pub fn deny_wins_over_allow() {
        let rules = [
            rule(Effect::Allow, Action::Read, "/*"),
            rule(Effect::Deny, Action::Read, "/users/secret"),
        ];

        assert!(!evaluate(rules.iter(), Action::Read, "/users/secret"));
        assert!(evaluate(rules.iter(), Action::Read, "/users/other"));
    }

    #[test]
    pub fn deny_wins_in_any_order() {
        let rules = [
            rule(Effect::Deny, Action::Read, "/users/secret"),
            rule(Effect::Allow, Action::Read, "/*"),
        ];

        assert!(!evaluate(rules.iter(), Action::Read, "/users/secret"));
    }

    #[test]
    pub fn unrelated_deny_does_not_block() {
        let rules = [
            rule(Effect::Allow, Action::Read, "/users/*"),
            rule(Effect::Deny, Action::Write, "/users/*"),
        ];

        assert!(evaluate(rules.iter(), Action::Read, "/users/abc"));
    }
}
