use crate::case::{CaseDef, CaseFuture, Evaluator};
use crate::error::CaseError;
use crate::expression::CaseUse;
use core_types::ThingKind;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use things::Thing;

/// How the uses of an expression combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combine {
    #[default]
    All,
    Any,
}

impl Combine {
    /// Result of an expression with no uses.
    fn identity(self) -> bool {
        matches!(self, Combine::All)
    }

    /// A single result that decides the whole expression.
    fn decides(self, value: bool) -> bool {
        value != self.identity()
    }
}

/// Result of evaluating one case.
pub enum Evaluation {
    Ready(bool),
    Pending(CaseFuture),
}

/// Result of evaluating a set of case uses.
pub enum Verdict {
    Ready(Result<bool, CaseError>),
    Pending(PendingVerdict),
}

impl Verdict {
    /// Wait for the verdict, resuming the remaining cases against `thing`
    /// after each asynchronous one settles.
    pub async fn resolve(self, thing: &Thing<'_>) -> Result<bool, CaseError> {
        let mut verdict = self;
        loop {
            match verdict {
                Verdict::Ready(result) => return result,
                Verdict::Pending(pending) => {
                    let (future, rest) = pending.into_parts();
                    let result = future.await;
                    verdict = rest.resume(thing, result);
                }
            }
        }
    }
}

/// An asynchronous case in flight, followed by the uses not yet invoked.
pub struct PendingVerdict {
    future: CaseFuture,
    rest: Remaining,
}

impl PendingVerdict {
    pub fn into_parts(self) -> (CaseFuture, Remaining) {
        (self.future, self.rest)
    }
}

/// Uses still to run once the case in flight settles, in tier order.
pub struct Remaining {
    uses: VecDeque<CaseUse>,
    combine: Combine,
}

impl Remaining {
    /// Continue with the result of the case that was in flight.
    pub fn resume(self, thing: &Thing<'_>, result: Result<bool, CaseError>) -> Verdict {
        match result {
            Ok(value) if self.combine.decides(value) => Verdict::Ready(Ok(value)),
            Ok(_) => walk(self.uses, thing, self.combine),
            Err(err) => Verdict::Ready(Err(err)),
        }
    }
}

/// Registry of case definitions, indexed by name and by the thing kinds
/// each one applies to.
#[derive(Default)]
pub struct CaseEngine {
    by_name: HashMap<String, Rc<CaseDef>>,
    by_kind: HashMap<ThingKind, Vec<Rc<CaseDef>>>,
}

impl CaseEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_case(&mut self, def: CaseDef) -> Result<Rc<CaseDef>, CaseError> {
        if self.by_name.contains_key(&def.name) {
            return Err(CaseError::DuplicateCase(def.name));
        }
        let def = Rc::new(def);
        for kind in &def.contexts {
            self.by_kind.entry(*kind).or_default().push(Rc::clone(&def));
        }
        self.by_name.insert(def.name.clone(), Rc::clone(&def));
        log::debug!(target: "filters", "registered case {:?} for {:?}", def.name, def.contexts);
        Ok(def)
    }

    pub fn get(&self, name: &str) -> Option<Rc<CaseDef>> {
        self.by_name.get(name).cloned()
    }

    pub fn is_unique(&self, name: &str) -> Option<bool> {
        self.by_name.get(name).map(|d| d.unique)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Cases offered for `kind` in the expression editor, in registration
    /// order. Disabled cases are left out.
    pub fn cases_for(&self, kind: ThingKind) -> Vec<Rc<CaseDef>> {
        self.by_kind
            .get(&kind)
            .map(|defs| defs.iter().filter(|d| !d.is_disabled()).cloned().collect())
            .unwrap_or_default()
    }

    /// Evaluate a single case.
    pub fn evaluate(
        &self,
        def: &CaseDef,
        thing: &Thing<'_>,
        config: &Value,
    ) -> Result<Evaluation, CaseError> {
        check(def, thing)?;
        match &def.evaluator {
            Evaluator::Sync(f) => f(thing, config).map(Evaluation::Ready),
            Evaluator::Async(f) => Ok(Evaluation::Pending(f(thing, config))),
        }
    }

    /// Evaluate `uses` combined with `combine`.
    ///
    /// Disabled uses are skipped. The rest run lowest tier first, whatever
    /// their kind, and stop as soon as one decides the result. Synchronous
    /// cases run inline; the first asynchronous one suspends the walk, and
    /// later cases are only invoked once it has settled.
    pub fn evaluate_all(&self, uses: &[CaseUse], thing: &Thing<'_>, combine: Combine) -> Verdict {
        let mut active: Vec<CaseUse> = Vec::with_capacity(uses.len());
        for u in uses {
            if u.case.is_disabled() {
                log::debug!(target: "filters", "skipping disabled case {:?}", u.case.name);
                continue;
            }
            if let Err(err) = check(&u.case, thing) {
                return Verdict::Ready(Err(err));
            }
            active.push(u.clone());
        }
        active.sort_by_key(|u| u.case.slow);
        walk(active.into(), thing, combine)
    }
}

fn walk(mut uses: VecDeque<CaseUse>, thing: &Thing<'_>, combine: Combine) -> Verdict {
    while let Some(u) = uses.pop_front() {
        match &u.case.evaluator {
            Evaluator::Sync(f) => match f(thing, &u.config) {
                Ok(value) if combine.decides(value) => return Verdict::Ready(Ok(value)),
                Ok(_) => {}
                Err(err) => return Verdict::Ready(Err(err)),
            },
            Evaluator::Async(f) => {
                let future = f(thing, &u.config);
                return Verdict::Pending(PendingVerdict {
                    future,
                    rest: Remaining { uses, combine },
                });
            }
        }
    }
    Verdict::Ready(Ok(combine.identity()))
}

fn check(def: &CaseDef, thing: &Thing<'_>) -> Result<(), CaseError> {
    if def.is_disabled() {
        return Err(CaseError::Disabled(def.name.clone()));
    }
    if !def.applies_to(thing.kind()) {
        return Err(CaseError::NotApplicable {
            case: def.name.clone(),
            kind: thing.kind(),
        });
    }
    Ok(())
}
