//! Lowering pass: flattens the program into curry declarations, named
//! pipes and invocations.
//!
//! A single depth-first walk decides, for every call site, whether it goes
//! through an auto-curried wrapper:
//!
//! | Call site                               | Curried? |
//! |-----------------------------------------|----------|
//! | `fn` (no arguments)                     | no       |
//! | `fn a b`                                | yes      |
//! | `fn a b` as the first step of a pipe    | no, `a` becomes the pipe input |
//! | `pipeName a` (a declared `->` pipe)     | no, called positionally |
//! | `fn ... a`, `defer fn a`, `wrap fn a`   | no       |
//! | `fn flip a b`                           | yes, arguments reversed |
//!
//! Curried names and pipe names are recorded once, at their first
//! occurrence. Every pipe body is walked, including the body of a
//! duplicate declaration that is itself dropped.

use std::collections::HashSet;

use crate::ast::*;
use crate::errors::{CompileError, Result};
use tracing::trace;

/// Lower a parsed program for code generation.
pub fn transform(program: Program) -> Result<TransformedProgram> {
    let mut transformer = Transformer::default();
    for statement in program {
        match statement {
            Statement::Pipe(pipe) => transformer.pipe_statement(pipe),
            Statement::Invocation(invocation) => transformer.pipe_invocation(invocation)?,
        }
    }
    Ok(transformer.output)
}

#[derive(Default)]
struct Transformer {
    output: TransformedProgram,
    curried: HashSet<String>,
    pipes: HashSet<String>,
}

impl Transformer {
    fn pipe_statement(&mut self, mut pipe: PipeStatement) {
        // The name is visible inside its own body.
        let first = self.pipes.insert(pipe.name.clone());
        // A duplicate is still walked: its calls declare curried names.
        self.steps(&mut pipe.steps);
        if first {
            self.output.pipes.push(pipe);
        } else {
            trace!(name = %pipe.name, "dropping duplicate pipe statement");
        }
    }

    fn pipe_invocation(&mut self, mut invocation: PipeInvocation) -> Result<()> {
        if let Some(Step::Function(first)) = invocation.steps.first_mut() {
            first.initial = true;
            if first.args.len() > 1 {
                return Err(CompileError::transform(format!(
                    "Initial function {} of a pipe invocation accepts at most one argument, found {}",
                    first.name,
                    first.args.len()
                )));
            }
            invocation.argument = first.args.pop();
        }
        self.steps(&mut invocation.steps);
        self.output.invocations.push(invocation);
        Ok(())
    }

    fn steps(&mut self, steps: &mut [Step]) {
        for step in steps {
            match step {
                Step::Function(function) => self.function(function),
                Step::Union(union) => {
                    for member in &mut union.members {
                        self.function(member);
                    }
                }
                Step::Method(_) | Step::SideEffect(_) | Step::Switch(_) => {}
            }
        }
    }

    fn function(&mut self, function: &mut Function) {
        if self.pipes.contains(&function.name) {
            function.disable_auto_currying = true;
        } else {
            if matches!(function.modifier, Some(Modifier::Defer | Modifier::Wrap)) {
                function.disable_auto_currying = true;
            }
            if !function.args.is_empty() && !function.initial && !function.disable_auto_currying {
                if self.curried.insert(function.name.clone()) {
                    trace!(name = %function.name, "curried");
                    self.output.curried.push(function.name.clone());
                }
                if function.modifier == Some(Modifier::Flip) {
                    function.args.reverse();
                }
            }
        }

        if let Some(branch) = function.if_branch.as_deref_mut() {
            self.function(branch);
        }
        if let Some(branch) = function.else_branch.as_deref_mut() {
            self.function(branch);
        }
    }
}
