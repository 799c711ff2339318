use crate::error::CaseError;
use core_types::ThingKind;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use things::Thing;

pub type CaseFuture = LocalBoxFuture<'static, Result<bool, CaseError>>;
pub type SyncEvaluate = Rc<dyn Fn(&Thing<'_>, &Value) -> Result<bool, CaseError>>;
/// Builds the evaluation future. Anything the future needs from the thing
/// must be copied out before it is returned.
pub type AsyncEvaluate = Rc<dyn Fn(&Thing<'_>, &Value) -> CaseFuture>;

#[derive(Clone)]
pub enum Evaluator {
    Sync(SyncEvaluate),
    Async(AsyncEvaluate),
}

impl Evaluator {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Thing<'_>, &Value) -> Result<bool, CaseError> + 'static,
    {
        Self::Sync(Rc::new(f))
    }

    pub fn asynchronous<F>(f: F) -> Self
    where
        F: Fn(&Thing<'_>, &Value) -> CaseFuture + 'static,
    {
        Self::Async(Rc::new(f))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

/// Input widget of the expression editor, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Select {
        id: String,
        /// `(label, value)` pairs.
        options: Vec<(String, String)>,
    },
    Checkset {
        id: String,
        items: Vec<String>,
    },
}

/// A filter predicate: metadata for the expression editor plus the
/// evaluation function. Stateless; per-use configuration lives in the
/// expression that references the case.
#[derive(Clone)]
pub struct CaseDef {
    pub name: String,
    pub contexts: Vec<ThingKind>,
    pub text: String,
    pub fields: Vec<Field>,
    /// Cost tier; lower tiers are evaluated first.
    pub slow: u8,
    /// At most one use per expression.
    pub unique: bool,
    pub default_conditions: Value,
    pub pattern: Option<String>,
    pub parse: Option<fn(&str) -> Value>,
    pub validate: Option<fn(&Value) -> bool>,
    /// Criterion describing an existing thing, for "filter things like this".
    pub serialize: Option<Rc<dyn Fn(&Thing<'_>) -> String>>,
    pub label: Option<fn(&Value) -> String>,
    pub disabled: Option<Rc<dyn Fn() -> bool>>,
    pub evaluator: Evaluator,
}

impl CaseDef {
    pub fn new(name: impl Into<String>, contexts: &[ThingKind], evaluator: Evaluator) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            name,
            contexts: contexts.to_vec(),
            fields: Vec::new(),
            slow: 0,
            unique: false,
            default_conditions: Value::Null,
            pattern: None,
            parse: None,
            validate: None,
            serialize: None,
            label: None,
            disabled: None,
            evaluator,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn slow(mut self, tier: u8) -> Self {
        self.slow = tier;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn defaults(mut self, conditions: Value) -> Self {
        self.default_conditions = conditions;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn parse_with(mut self, parse: fn(&str) -> Value) -> Self {
        self.parse = Some(parse);
        self
    }

    pub fn validate_with(mut self, validate: fn(&Value) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn serialize_with(mut self, serialize: impl Fn(&Thing<'_>) -> String + 'static) -> Self {
        self.serialize = Some(Rc::new(serialize));
        self
    }

    pub fn label_with(mut self, label: fn(&Value) -> String) -> Self {
        self.label = Some(label);
        self
    }

    pub fn disabled_when(mut self, disabled: impl Fn() -> bool + 'static) -> Self {
        self.disabled = Some(Rc::new(disabled));
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.as_ref().is_some_and(|d| d())
    }

    pub fn applies_to(&self, kind: ThingKind) -> bool {
        self.contexts.contains(&kind)
    }

    pub fn is_valid(&self, config: &Value) -> bool {
        self.validate.is_none_or(|v| v(config))
    }

    /// Label shown when the case matched.
    pub fn true_text(&self, config: &Value) -> String {
        match self.label {
            Some(label) => label(config),
            None => self.text.to_lowercase(),
        }
    }

    /// Label shown when the case did not match.
    pub fn false_text(&self, config: &Value) -> String {
        format!("¬ {}", self.true_text(config))
    }

    /// Criterion text describing `thing`, when the case can describe one.
    pub fn criterion_for(&self, thing: &Thing<'_>) -> Option<String> {
        self.serialize.as_ref().map(|serialize| serialize(thing))
    }

    /// Configuration parsed from the editor's free-text input.
    pub fn parse_criterion(&self, input: &str) -> Value {
        match self.parse {
            Some(parse) => parse(input),
            None => Value::String(input.to_string()),
        }
    }
}

impl fmt::Debug for CaseDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseDef")
            .field("name", &self.name)
            .field("contexts", &self.contexts)
            .field("slow", &self.slow)
            .field("unique", &self.unique)
            .field("async", &self.evaluator.is_async())
            .finish_non_exhaustive()
    }
}
