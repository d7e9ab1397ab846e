//! Statement rules of the body analyzer.
//!
//! Control flow is tracked only as far as variable types need it: each
//! branch runs on a copy of the variable table and the copies are merged
//! back as unions. Branches that always leave the block do not contribute.

use pinfer_ast::{Catch, Expr, Stmt, SwitchCase};
use pinfer_solver::visitor::contains_references;
use pinfer_solver::utils::iterable_key_value;
use pinfer_solver::{TypeId, widen_type};
use rustc_hash::FxHashMap;

use crate::analyzer::FunctionAnalyzer;

type Variables = FxHashMap<String, TypeId>;

/// Whether control never reaches the statement after `body`.
fn terminates(body: &[Stmt]) -> bool {
    match body.last() {
        Some(Stmt::Return(_) | Stmt::Throw(_) | Stmt::Break | Stmt::Continue) => true,
        Some(Stmt::Expr(Expr::Throw(_))) => true,
        Some(Stmt::Block(inner)) => terminates(inner),
        _ => false,
    }
}

impl FunctionAnalyzer<'_> {
    pub fn analyze_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.analyze_stmt(stmt);
        }
    }

    pub fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.infer_expr(expr);
            }
            Stmt::Return(value) => {
                let ty = match value {
                    Some(value) => self.infer_expr(value),
                    None => TypeId::VOID,
                };
                self.returns.push(ty);
            }
            Stmt::If {
                condition,
                then,
                else_ifs,
                otherwise,
            } => {
                self.infer_expr(condition);
                let before = self.scope.variables().clone();
                let mut branches = vec![self.run_branch(&before, then)];
                for else_if in else_ifs {
                    self.scope.replace_variables(before.clone());
                    self.infer_expr(&else_if.condition);
                    let start = self.scope.variables().clone();
                    branches.push(self.run_branch(&start, &else_if.body));
                }
                match otherwise {
                    Some(body) => branches.push(self.run_branch(&before, body)),
                    None => branches.push(Some(before.clone())),
                }
                self.merge_branches(before, branches);
            }
            Stmt::While { condition, body } => {
                self.infer_expr(condition);
                self.run_loop(|analyzer| {
                    analyzer.analyze_body(body);
                    analyzer.infer_expr(condition);
                });
            }
            Stmt::DoWhile { body, condition } => {
                self.analyze_body(body);
                self.infer_expr(condition);
                self.run_loop(|analyzer| {
                    analyzer.analyze_body(body);
                    analyzer.infer_expr(condition);
                });
            }
            Stmt::For {
                init,
                condition,
                step,
                body,
            } => {
                for expr in init.iter().chain(condition) {
                    self.infer_expr(expr);
                }
                self.run_loop(|analyzer| {
                    analyzer.analyze_body(body);
                    for expr in step.iter().chain(condition) {
                        analyzer.infer_expr(expr);
                    }
                });
            }
            Stmt::Foreach {
                subject,
                key,
                value,
                body,
            } => {
                let mut subject_type = self.infer_expr(subject);
                if contains_references(self.ctx.interner(), subject_type) {
                    subject_type = self.ctx.resolve(&self.scope.context, subject_type);
                }
                let (key_type, value_type) =
                    iterable_key_value(self.ctx.interner(), subject_type)
                        .unwrap_or((TypeId::UNKNOWN, TypeId::UNKNOWN));
                self.run_loop(|analyzer| {
                    if let Some(key) = key {
                        analyzer.assign_to(key, key_type, None);
                    }
                    analyzer.assign_to(value, value_type, None);
                    analyzer.analyze_body(body);
                });
            }
            Stmt::Switch { subject, cases } => self.switch(subject, cases),
            Stmt::Try {
                body,
                catches,
                finally,
            } => self.try_catch(body, catches, finally.as_deref()),
            Stmt::Throw(value) => {
                let thrown = self.infer_expr(value);
                self.throws.push(thrown);
            }
            Stmt::Echo(values) => {
                for value in values {
                    self.infer_expr(value);
                }
            }
            Stmt::Unset(targets) => {
                for target in targets {
                    if let Expr::Variable(name) = target {
                        self.scope.remove_variable(name);
                    }
                }
            }
            Stmt::Block(body) => self.analyze_body(body),
            Stmt::Break | Stmt::Continue | Stmt::Nop => {}
        }
    }

    /// Run `body` from `start`; `None` when the branch never falls through.
    fn run_branch(&mut self, start: &Variables, body: &[Stmt]) -> Option<Variables> {
        self.scope.replace_variables(start.clone());
        self.analyze_body(body);
        (!terminates(body)).then(|| self.scope.variables().clone())
    }

    /// Union the variable tables of the branches that fall through.
    fn merge_branches(&mut self, before: Variables, branches: Vec<Option<Variables>>) {
        let live: Vec<Variables> = branches.into_iter().flatten().collect();
        if live.is_empty() {
            self.scope.replace_variables(before);
            return;
        }
        let interner = self.ctx.interner();
        let mut names: Vec<&String> = Vec::new();
        for branch in &live {
            for name in branch.keys() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        let mut merged = Variables::default();
        for name in names {
            let mut types: Vec<TypeId> = Vec::new();
            for ty in live.iter().filter_map(|branch| branch.get(name)) {
                if !types.contains(ty) {
                    types.push(*ty);
                }
            }
            merged.insert(name.clone(), interner.union(types));
        }
        self.scope.replace_variables(merged);
    }

    /// Run a loop body once and fold the values it assigns back into the
    /// values the loop was entered with.
    fn run_loop(&mut self, body: impl FnOnce(&mut Self)) {
        let before = self.scope.variables().clone();
        body(self);
        let after = self.scope.variables().clone();
        let interner = self.ctx.interner();
        let widen = self.ctx.options().widen_loop_assignments;
        let mut merged = before.clone();
        for (name, ty) in after {
            let combined = match before.get(&name) {
                Some(previous) if *previous == ty => ty,
                Some(previous) if widen => widen_type(interner, interner.union2(*previous, ty)),
                Some(previous) => interner.union2(*previous, ty),
                None => ty,
            };
            merged.insert(name, combined);
        }
        self.scope.replace_variables(merged);
    }

    fn switch(&mut self, subject: &Expr, cases: &[SwitchCase]) {
        self.infer_expr(subject);
        let before = self.scope.variables().clone();
        let mut branches = Vec::with_capacity(cases.len() + 1);
        let mut has_default = false;
        for case in cases {
            self.scope.replace_variables(before.clone());
            match &case.condition {
                Some(condition) => {
                    self.infer_expr(condition);
                }
                None => has_default = true,
            }
            // Fallthrough into a case with an empty body is the same branch.
            if case.body.is_empty() {
                continue;
            }
            let body = case.body.as_slice();
            self.analyze_body(body);
            let leaves = matches!(body.last(), Some(Stmt::Return(_) | Stmt::Throw(_)))
                || matches!(body.last(), Some(Stmt::Expr(Expr::Throw(_))));
            branches.push((!leaves).then(|| self.scope.variables().clone()));
        }
        if !has_default {
            branches.push(Some(before.clone()));
        }
        self.merge_branches(before, branches);
    }

    fn try_catch(&mut self, body: &[Stmt], catches: &[Catch], finally: Option<&[Stmt]>) {
        let interner = self.ctx.interner();
        let before = self.scope.variables().clone();
        let mut branches = vec![self.run_branch(&before, body)];
        for catch in catches {
            self.scope.replace_variables(before.clone());
            if let Some(var) = &catch.var {
                let caught: Vec<TypeId> = catch
                    .types
                    .iter()
                    .map(|name| interner.object(&self.scope.resolve_class_name(name)))
                    .collect();
                let caught = interner.union(caught);
                self.scope.set_variable(var, caught);
            }
            let start = self.scope.variables().clone();
            branches.push(self.run_branch(&start, &catch.body));
        }
        self.merge_branches(before, branches);
        if let Some(finally) = finally {
            self.analyze_body(finally);
        }
    }
}

#[cfg(test)]
#[path = "../tests/statements_tests.rs"]
mod statements_tests;
