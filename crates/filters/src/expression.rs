use crate::case::CaseDef;
use crate::engine::{CaseEngine, Combine, Verdict};
use crate::error::CaseError;
use serde::Deserialize;
use serde_json::Value;
use std::rc::Rc;
use things::Thing;

/// One case referenced by an expression, with its configuration.
#[derive(Clone, Debug)]
pub struct CaseUse {
    pub case: Rc<CaseDef>,
    pub config: Value,
}

/// Stored form of an expression, as it appears in configuration files.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExpressionSpec {
    pub combine: Combine,
    pub cases: Vec<CaseUseSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CaseUseSpec {
    pub case: String,
    /// Configuration value; omitted means the case's default conditions.
    #[serde(default)]
    pub config: Option<Value>,
    /// Editor free-text input, parsed by the case.
    #[serde(default)]
    pub criterion: Option<String>,
}

/// A list of case uses combined with AND or OR.
#[derive(Clone, Debug, Default)]
pub struct Expression {
    combine: Combine,
    uses: Vec<CaseUse>,
}

impl Expression {
    pub fn new(combine: Combine) -> Self {
        Self {
            combine,
            uses: Vec::new(),
        }
    }

    pub fn from_spec(engine: &CaseEngine, spec: &ExpressionSpec) -> Result<Self, CaseError> {
        let mut expression = Self::new(spec.combine);
        for u in &spec.cases {
            match (&u.config, &u.criterion) {
                (Some(config), _) => expression.add(engine, &u.case, config.clone())?,
                (None, Some(input)) => expression.add_criterion(engine, &u.case, input)?,
                (None, None) => expression.add_default(engine, &u.case)?,
            };
        }
        Ok(expression)
    }

    pub fn combine(&self) -> Combine {
        self.combine
    }

    pub fn uses(&self) -> &[CaseUse] {
        &self.uses
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }

    /// Add a use of the case `name`. A second use of a unique case and a
    /// configuration the case rejects are errors.
    pub fn add(&mut self, engine: &CaseEngine, name: &str, config: Value) -> Result<&mut Self, CaseError> {
        let case = engine
            .get(name)
            .ok_or_else(|| CaseError::UnknownCase(name.to_string()))?;
        if case.unique && self.uses.iter().any(|u| u.case.name == case.name) {
            return Err(CaseError::DuplicateUnique(case.name.clone()));
        }
        if !case.is_valid(&config) {
            return Err(CaseError::InvalidConfig {
                case: case.name.clone(),
                config: config.to_string(),
            });
        }
        self.uses.push(CaseUse { case, config });
        Ok(self)
    }

    pub fn add_criterion(&mut self, engine: &CaseEngine, name: &str, input: &str) -> Result<&mut Self, CaseError> {
        let config = engine
            .get(name)
            .map(|case| case.parse_criterion(input))
            .ok_or_else(|| CaseError::UnknownCase(name.to_string()))?;
        self.add(engine, name, config)
    }

    pub fn add_default(&mut self, engine: &CaseEngine, name: &str) -> Result<&mut Self, CaseError> {
        let config = engine
            .get(name)
            .map(|case| case.default_conditions.clone())
            .ok_or_else(|| CaseError::UnknownCase(name.to_string()))?;
        self.add(engine, name, config)
    }

    /// Labels of the uses, joined by the combinator.
    pub fn label(&self) -> String {
        let joiner = match self.combine {
            Combine::All => " & ",
            Combine::Any => " | ",
        };
        self.uses
            .iter()
            .map(|u| u.case.true_text(&u.config))
            .collect::<Vec<_>>()
            .join(joiner)
    }

    pub fn evaluate(&self, engine: &CaseEngine, thing: &Thing<'_>) -> Verdict {
        engine.evaluate_all(&self.uses, thing, self.combine)
    }
}
