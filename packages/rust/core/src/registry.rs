//! Path-scoped conversion rules and their dispatcher.
//!
//! A rule is matched by a [`PathPattern`]: a bare element name (`physdesc`)
//! or a parent/name pair (`indexentry/ref`) scoped to the nearest enclosing
//! element of that name, at any depth. Every matching rule runs, most specific first, profile overrides
//! before the structural defaults they sit on, then in registration order.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use eadbridge_shared::{EadBridgeError, Result};

use crate::scope::{NodeView, RuleContext};

/// Boxed rule body. Shared across threads with the registry.
pub type Handler = Box<dyn Fn(&mut RuleContext<'_>, &NodeView<'_>) -> Result<()> + Send + Sync>;

// ---------------------------------------------------------------------------
// PathPattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    parent: Option<String>,
    name: String,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let segments: Vec<&str> = pattern.split('/').collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(EadBridgeError::registry(format!(
                "pattern '{pattern}' has an empty segment"
            )));
        }
        match segments.as_slice() {
            [name] => Ok(Self {
                parent: None,
                name: name.to_string(),
            }),
            [parent, name] => Ok(Self {
                parent: Some(parent.to_string()),
                name: name.to_string(),
            }),
            _ => Err(EadBridgeError::registry(format!(
                "pattern '{pattern}' has more than two segments"
            ))),
        }
    }

    /// Element name the pattern fires on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `enclosing` yields the names of the open ancestors, innermost first.
    pub fn matches<'s>(&self, name: &str, mut enclosing: impl Iterator<Item = &'s str>) -> bool {
        self.name == name
            && match &self.parent {
                Some(expected) => enclosing.any(|ancestor| ancestor == expected),
                None => true,
            }
    }

    /// 2 for `parent/name`, 1 for a bare name.
    pub fn specificity(&self) -> u8 {
        if self.parent.is_some() { 2 } else { 1 }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{parent}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Which rule set a rule belongs to. Profile rules override structural ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Profile,
    Structure,
}

/// Whether a rule still runs once the node scope has been flagged ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    UnlessIgnored,
}

/// A rule waiting to be registered.
pub struct Rule {
    pattern: String,
    layer: Layer,
    guard: Guard,
    after: Vec<String>,
    handler: Handler,
}

impl Rule {
    /// A stock rule that builds the basic record structure.
    pub fn structure<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut RuleContext<'_>, &NodeView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(pattern, Layer::Structure, handler)
    }

    /// A profile rule layered over the stock rules.
    pub fn profile<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut RuleContext<'_>, &NodeView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(pattern, Layer::Profile, handler)
    }

    fn new<F>(pattern: impl Into<String>, layer: Layer, handler: F) -> Self
    where
        F: Fn(&mut RuleContext<'_>, &NodeView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            pattern: pattern.into(),
            layer,
            guard: Guard::Always,
            after: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    /// Require a rule with `pattern` to be registered before this one.
    pub fn after(mut self, pattern: impl Into<String>) -> Self {
        self.after.push(pattern.into());
        self
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .field("layer", &self.layer)
            .field("guard", &self.guard)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Registered {
    pattern: PathPattern,
    layer: Layer,
    guard: Guard,
    handler: Handler,
}

/// Ordered rule table, built once per converter.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Registered>,
    by_name: HashMap<String, Vec<usize>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a rule with exactly this pattern is registered.
    pub fn contains(&self, pattern: &str) -> bool {
        self.rules.iter().any(|r| r.pattern.to_string() == pattern)
    }

    pub fn register(&mut self, rule: Rule) -> Result<()> {
        let pattern = PathPattern::parse(&rule.pattern)?;

        for prerequisite in &rule.after {
            if !self.contains(prerequisite) {
                return Err(EadBridgeError::registry(format!(
                    "rule '{pattern}' must be registered after '{prerequisite}'"
                )));
            }
        }

        let index = self.rules.len();
        self.by_name
            .entry(pattern.name().to_string())
            .or_default()
            .push(index);
        debug!(%pattern, layer = ?rule.layer, guard = ?rule.guard, "registered rule");

        self.rules.push(Registered {
            pattern,
            layer: rule.layer,
            guard: rule.guard,
            handler: rule.handler,
        });
        Ok(())
    }

    /// Run every rule matching `view`. Returns the number of handlers invoked.
    pub fn dispatch(&self, view: &NodeView<'_>, ctx: &mut RuleContext<'_>) -> Result<usize> {
        let Some(candidates) = self.by_name.get(view.name()) else {
            return Ok(0);
        };

        let mut matching: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| self.rules[i].pattern.matches(view.name(), view.enclosing_names()))
            .collect();
        matching.sort_by_key(|&i| {
            let rule = &self.rules[i];
            (std::cmp::Reverse(rule.pattern.specificity()), rule.layer, i)
        });

        let mut invoked = 0;
        for i in matching {
            let rule = &self.rules[i];
            if rule.guard == Guard::UnlessIgnored && ctx.is_ignored() {
                trace!(pattern = %rule.pattern, "skipped ignored rule");
                continue;
            }
            trace!(pattern = %rule.pattern, "dispatching rule");
            (rule.handler)(ctx, view)
                .map_err(|e| EadBridgeError::rule(rule.pattern.to_string(), e))?;
            invoked += 1;
        }
        Ok(invoked)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.pattern.to_string()))
            .finish()
    }
}
